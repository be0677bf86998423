use std::time::Duration;

use pchat::{ChatError, ChatTurnResult, RouterMode, TurnHooks};
use pcommon::SessionId;
use pprovider::{ProviderError, ProviderId, ProviderOperationHooks, ToolCall};
use ptooling::{ToolExecutionContext, ToolOutcome, ToolRuntimeHooks};

/// Structured `tracing` events for every hook callback.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingTelemetry;

/// Counters and histograms recorded through the `metrics` facade.
///
/// Nothing is exported unless the binary installs a recorder.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsTelemetry;

/// Both sinks, tracing first.
#[derive(Debug, Clone, Copy, Default)]
pub struct Telemetry {
    pub tracing: TracingTelemetry,
    pub metrics: MetricsTelemetry,
}

impl ProviderOperationHooks for Telemetry {
    fn on_attempt_start(&self, provider: ProviderId, operation: &str, attempt: u32) {
        self.tracing.on_attempt_start(provider, operation, attempt);
        self.metrics.on_attempt_start(provider, operation, attempt);
    }

    fn on_retry_scheduled(
        &self,
        provider: ProviderId,
        operation: &str,
        attempt: u32,
        delay: Duration,
        error: &ProviderError,
    ) {
        self.tracing
            .on_retry_scheduled(provider, operation, attempt, delay, error);
        self.metrics
            .on_retry_scheduled(provider, operation, attempt, delay, error);
    }

    fn on_success(&self, provider: ProviderId, operation: &str, attempts: u32) {
        self.tracing.on_success(provider, operation, attempts);
        self.metrics.on_success(provider, operation, attempts);
    }

    fn on_failure(
        &self,
        provider: ProviderId,
        operation: &str,
        attempts: u32,
        error: &ProviderError,
    ) {
        self.tracing.on_failure(provider, operation, attempts, error);
        self.metrics.on_failure(provider, operation, attempts, error);
    }
}

impl ToolRuntimeHooks for Telemetry {
    fn on_tool_start(&self, call: &ToolCall, context: &ToolExecutionContext) {
        self.tracing.on_tool_start(call, context);
        self.metrics.on_tool_start(call, context);
    }

    fn on_tool_finish(
        &self,
        call: &ToolCall,
        context: &ToolExecutionContext,
        outcome: ToolOutcome<'_>,
        elapsed: Duration,
    ) {
        self.tracing.on_tool_finish(call, context, outcome, elapsed);
        self.metrics.on_tool_finish(call, context, outcome, elapsed);
    }
}

impl TurnHooks for Telemetry {
    fn on_turn_start(&self, session_id: &SessionId, mode: RouterMode) {
        self.tracing.on_turn_start(session_id, mode);
        self.metrics.on_turn_start(session_id, mode);
    }

    fn on_turn_complete(&self, result: &ChatTurnResult, elapsed: Duration) {
        self.tracing.on_turn_complete(result, elapsed);
        self.metrics.on_turn_complete(result, elapsed);
    }

    fn on_turn_error(&self, session_id: &SessionId, error: &ChatError) {
        self.tracing.on_turn_error(session_id, error);
        self.metrics.on_turn_error(session_id, error);
    }
}
