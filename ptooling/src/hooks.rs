//! Observation points around each tool call.
//!
//! ```rust
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::time::Duration;
//!
//! use pprovider::ToolCall;
//! use ptooling::{ToolExecutionContext, ToolOutcome, ToolRuntimeHooks};
//!
//! #[derive(Default)]
//! struct FailureCount(AtomicUsize);
//!
//! impl ToolRuntimeHooks for FailureCount {
//!     fn on_tool_finish(
//!         &self,
//!         _call: &ToolCall,
//!         _context: &ToolExecutionContext,
//!         outcome: ToolOutcome<'_>,
//!         _elapsed: Duration,
//!     ) {
//!         if outcome.is_err() {
//!             self.0.fetch_add(1, Ordering::Relaxed);
//!         }
//!     }
//! }
//!
//! let hooks: &dyn ToolRuntimeHooks = &FailureCount::default();
//! hooks.on_tool_start(
//!     &ToolCall {
//!         id: "call_1".to_string(),
//!         name: "get_weather".to_string(),
//!         arguments: "{}".to_string(),
//!     },
//!     &ToolExecutionContext::new("s-1"),
//! );
//! ```

use std::time::Duration;

use pprovider::ToolCall;

use crate::{ToolError, ToolExecutionContext, ToolExecutionResult};

/// What one call produced, as seen by hooks.
pub type ToolOutcome<'a> = Result<&'a ToolExecutionResult, &'a ToolError>;

/// Observer for every call made through [`crate::DefaultToolRuntime`].
///
/// Hooks run inline on the turn's task and must not block.
pub trait ToolRuntimeHooks: Send + Sync {
    /// Fires before the registry lookup, so calls to unknown tools are seen too.
    fn on_tool_start(&self, _call: &ToolCall, _context: &ToolExecutionContext) {}

    /// Fires exactly once per started call; `elapsed` spans lookup and invocation.
    fn on_tool_finish(
        &self,
        _call: &ToolCall,
        _context: &ToolExecutionContext,
        _outcome: ToolOutcome<'_>,
        _elapsed: Duration,
    ) {
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopToolRuntimeHooks;

impl ToolRuntimeHooks for NoopToolRuntimeHooks {}
