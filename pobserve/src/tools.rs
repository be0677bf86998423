//! Tool execution telemetry.

use std::time::Duration;

use pprovider::ToolCall;
use ptooling::{ToolExecutionContext, ToolOutcome, ToolRuntimeHooks};

use crate::names;
use crate::{MetricsTelemetry, TracingTelemetry};

impl ToolRuntimeHooks for TracingTelemetry {
    fn on_tool_start(&self, call: &ToolCall, context: &ToolExecutionContext) {
        tracing::debug!(
            target: "parley::tool",
            tool = %call.name,
            call_id = %call.id,
            session = %context.session_id,
            iteration = context.iteration,
            "tool started"
        );
    }

    fn on_tool_finish(
        &self,
        call: &ToolCall,
        context: &ToolExecutionContext,
        outcome: ToolOutcome<'_>,
        elapsed: Duration,
    ) {
        let elapsed_ms = elapsed.as_millis() as u64;
        match outcome {
            Ok(result) => tracing::info!(
                target: "parley::tool",
                tool = %call.name,
                call_id = %call.id,
                session = %context.session_id,
                output_bytes = result.output.len(),
                elapsed_ms,
                "tool finished"
            ),
            Err(error) => tracing::warn!(
                target: "parley::tool",
                tool = %call.name,
                call_id = %call.id,
                session = %context.session_id,
                error_kind = ?error.kind,
                %error,
                elapsed_ms,
                "tool failed"
            ),
        }
    }
}

impl ToolRuntimeHooks for MetricsTelemetry {
    fn on_tool_finish(
        &self,
        call: &ToolCall,
        _context: &ToolExecutionContext,
        outcome: ToolOutcome<'_>,
        elapsed: Duration,
    ) {
        let status = match outcome {
            Ok(_) => "ok".to_string(),
            Err(error) => format!("{:?}", error.kind),
        };
        metrics::counter!(
            names::TOOL_CALLS,
            "tool" => call.name.clone(),
            "status" => status
        )
        .increment(1);
        metrics::histogram!(names::TOOL_DURATION, "tool" => call.name.clone())
            .record(elapsed.as_secs_f64());
    }
}
