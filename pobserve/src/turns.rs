//! Chat turn telemetry.

use std::time::Duration;

use pchat::{ChatError, ChatTurnResult, RouterMode, TurnHooks, TurnOutcome};
use pcommon::SessionId;

use crate::names;
use crate::{MetricsTelemetry, TracingTelemetry};

impl TurnHooks for TracingTelemetry {
    fn on_turn_start(&self, session_id: &SessionId, mode: RouterMode) {
        tracing::debug!(target: "parley::turn", session = %session_id, %mode, "turn started");
    }

    fn on_turn_complete(&self, result: &ChatTurnResult, elapsed: Duration) {
        let elapsed_ms = elapsed.as_millis() as u64;
        match &result.outcome {
            TurnOutcome::Answered => tracing::info!(
                target: "parley::turn",
                session = %result.session_id,
                route = %result.route,
                tool_calls = result.tool_calls.len(),
                total_tokens = result.usage.total_tokens,
                elapsed_ms,
                "turn answered"
            ),
            TurnOutcome::Fallback { kind, detail } => tracing::warn!(
                target: "parley::turn",
                session = %result.session_id,
                route = %result.route,
                fallback = ?kind,
                detail = %detail,
                elapsed_ms,
                "turn fell back"
            ),
            TurnOutcome::Failed { kind, detail } => tracing::error!(
                target: "parley::turn",
                session = %result.session_id,
                route = %result.route,
                error_kind = ?kind,
                detail = %detail,
                elapsed_ms,
                "turn failed"
            ),
        }
    }

    fn on_turn_error(&self, session_id: &SessionId, error: &ChatError) {
        tracing::warn!(
            target: "parley::turn",
            session = %session_id,
            error_kind = ?error.kind,
            %error,
            "turn rejected"
        );
    }
}

impl TurnHooks for MetricsTelemetry {
    fn on_turn_start(&self, _session_id: &SessionId, mode: RouterMode) {
        metrics::counter!(names::TURNS_STARTED, "mode" => mode.to_string()).increment(1);
    }

    fn on_turn_complete(&self, result: &ChatTurnResult, elapsed: Duration) {
        let route = result.route.as_str();
        metrics::counter!(
            names::TURNS,
            "route" => route,
            "outcome" => result.outcome.label()
        )
        .increment(1);
        metrics::histogram!(names::TURN_DURATION, "route" => route).record(elapsed.as_secs_f64());

        // Keyword routes that never reach the model report zero usage.
        if result.usage.total_tokens > 0 {
            metrics::counter!(names::TURN_TOKENS, "direction" => "input")
                .increment(u64::from(result.usage.input_tokens));
            metrics::counter!(names::TURN_TOKENS, "direction" => "output")
                .increment(u64::from(result.usage.output_tokens));
        }
        if !result.tool_calls.is_empty() {
            metrics::histogram!(names::TURN_TOOL_CALLS).record(result.tool_calls.len() as f64);
        }
    }

    fn on_turn_error(&self, _session_id: &SessionId, error: &ChatError) {
        metrics::counter!(names::TURNS_REJECTED, "error_kind" => format!("{:?}", error.kind))
            .increment(1);
    }
}
