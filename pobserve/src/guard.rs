//! Panic isolation for hook implementations.
//!
//! ```rust
//! use pobserve::{Guarded, TracingTelemetry};
//! use ptooling::ToolRuntimeHooks;
//!
//! fn install(_hooks: &dyn ToolRuntimeHooks) {}
//!
//! install(&Guarded::new(TracingTelemetry));
//! ```

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;

use pchat::{ChatError, ChatTurnResult, RouterMode, TurnHooks};
use pcommon::SessionId;
use pprovider::{ProviderError, ProviderId, ProviderOperationHooks, ToolCall};
use ptooling::{ToolExecutionContext, ToolOutcome, ToolRuntimeHooks};

use crate::names;

/// Runs every callback of `H` under `catch_unwind`; a panic is counted and
/// logged, then dropped.
#[derive(Debug, Clone, Default)]
pub struct Guarded<H> {
    inner: H,
}

impl<H> Guarded<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &H {
        &self.inner
    }

    fn run(&self, callback: &'static str, f: impl FnOnce(&H)) {
        if catch_unwind(AssertUnwindSafe(|| f(&self.inner))).is_err() {
            tracing::error!(target: "parley::hooks", callback, "hook panicked");
            metrics::counter!(names::HOOK_PANICS, "callback" => callback).increment(1);
        }
    }
}

impl<H: ProviderOperationHooks> ProviderOperationHooks for Guarded<H> {
    fn on_attempt_start(&self, provider: ProviderId, operation: &str, attempt: u32) {
        self.run("on_attempt_start", |hooks| {
            hooks.on_attempt_start(provider, operation, attempt)
        });
    }

    fn on_retry_scheduled(
        &self,
        provider: ProviderId,
        operation: &str,
        attempt: u32,
        delay: Duration,
        error: &ProviderError,
    ) {
        self.run("on_retry_scheduled", |hooks| {
            hooks.on_retry_scheduled(provider, operation, attempt, delay, error)
        });
    }

    fn on_success(&self, provider: ProviderId, operation: &str, attempts: u32) {
        self.run("on_success", |hooks| {
            hooks.on_success(provider, operation, attempts)
        });
    }

    fn on_failure(
        &self,
        provider: ProviderId,
        operation: &str,
        attempts: u32,
        error: &ProviderError,
    ) {
        self.run("on_failure", |hooks| {
            hooks.on_failure(provider, operation, attempts, error)
        });
    }
}

impl<H: ToolRuntimeHooks> ToolRuntimeHooks for Guarded<H> {
    fn on_tool_start(&self, call: &ToolCall, context: &ToolExecutionContext) {
        self.run("on_tool_start", |hooks| hooks.on_tool_start(call, context));
    }

    fn on_tool_finish(
        &self,
        call: &ToolCall,
        context: &ToolExecutionContext,
        outcome: ToolOutcome<'_>,
        elapsed: Duration,
    ) {
        self.run("on_tool_finish", |hooks| {
            hooks.on_tool_finish(call, context, outcome, elapsed)
        });
    }
}

impl<H: TurnHooks> TurnHooks for Guarded<H> {
    fn on_turn_start(&self, session_id: &SessionId, mode: RouterMode) {
        self.run("on_turn_start", |hooks| hooks.on_turn_start(session_id, mode));
    }

    fn on_turn_complete(&self, result: &ChatTurnResult, elapsed: Duration) {
        self.run("on_turn_complete", |hooks| {
            hooks.on_turn_complete(result, elapsed)
        });
    }

    fn on_turn_error(&self, session_id: &SessionId, error: &ChatError) {
        self.run("on_turn_error", |hooks| hooks.on_turn_error(session_id, error));
    }
}
