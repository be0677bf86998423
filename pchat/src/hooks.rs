//! Turn lifecycle hooks.
//!
//! ```rust
//! use pchat::{NoopTurnHooks, TurnHooks};
//!
//! fn install(_hooks: &dyn TurnHooks) {}
//!
//! install(&NoopTurnHooks);
//! ```

use std::time::Duration;

use pcommon::SessionId;

use crate::{ChatError, ChatTurnResult, RouterMode};

pub trait TurnHooks: Send + Sync {
    fn on_turn_start(&self, _session_id: &SessionId, _mode: RouterMode) {}

    /// Called for every recorded turn, including ones whose route failed.
    fn on_turn_complete(&self, _result: &ChatTurnResult, _elapsed: Duration) {}

    /// Called when `run_turn` returns `Err`.
    fn on_turn_error(&self, _session_id: &SessionId, _error: &ChatError) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTurnHooks;

impl TurnHooks for NoopTurnHooks {}
