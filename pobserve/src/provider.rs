//! Provider attempt telemetry.

use std::time::Duration;

use pprovider::{ProviderError, ProviderId, ProviderOperationHooks};

use crate::names;
use crate::{MetricsTelemetry, TracingTelemetry};

impl ProviderOperationHooks for TracingTelemetry {
    fn on_attempt_start(&self, provider: ProviderId, operation: &str, attempt: u32) {
        tracing::debug!(target: "parley::provider", %provider, operation, attempt, "attempt started");
    }

    fn on_retry_scheduled(
        &self,
        provider: ProviderId,
        operation: &str,
        attempt: u32,
        delay: Duration,
        error: &ProviderError,
    ) {
        tracing::warn!(
            target: "parley::provider",
            %provider,
            operation,
            attempt,
            delay_ms = delay.as_millis() as u64,
            error_kind = ?error.kind,
            %error,
            "retry scheduled"
        );
    }

    fn on_success(&self, provider: ProviderId, operation: &str, attempts: u32) {
        tracing::info!(target: "parley::provider", %provider, operation, attempts, "provider call succeeded");
    }

    fn on_failure(
        &self,
        provider: ProviderId,
        operation: &str,
        attempts: u32,
        error: &ProviderError,
    ) {
        tracing::error!(
            target: "parley::provider",
            %provider,
            operation,
            attempts,
            error_kind = ?error.kind,
            retryable = error.retryable,
            %error,
            "provider call failed"
        );
    }
}

impl ProviderOperationHooks for MetricsTelemetry {
    fn on_attempt_start(&self, provider: ProviderId, operation: &str, _attempt: u32) {
        metrics::counter!(
            names::PROVIDER_ATTEMPTS,
            "provider" => provider.to_string(),
            "operation" => operation.to_string()
        )
        .increment(1);
    }

    fn on_retry_scheduled(
        &self,
        provider: ProviderId,
        operation: &str,
        _attempt: u32,
        delay: Duration,
        error: &ProviderError,
    ) {
        metrics::counter!(
            names::PROVIDER_RETRIES,
            "provider" => provider.to_string(),
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
        metrics::histogram!(
            names::PROVIDER_RETRY_DELAY,
            "provider" => provider.to_string(),
            "operation" => operation.to_string()
        )
        .record(delay.as_secs_f64());
    }

    fn on_success(&self, provider: ProviderId, operation: &str, attempts: u32) {
        record_call(provider, operation, attempts, "ok");
    }

    fn on_failure(
        &self,
        provider: ProviderId,
        operation: &str,
        attempts: u32,
        error: &ProviderError,
    ) {
        record_call(provider, operation, attempts, &format!("{:?}", error.kind));
    }
}

fn record_call(provider: ProviderId, operation: &str, attempts: u32, status: &str) {
    metrics::counter!(
        names::PROVIDER_CALLS,
        "provider" => provider.to_string(),
        "operation" => operation.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!(
        names::PROVIDER_ATTEMPTS_PER_CALL,
        "provider" => provider.to_string()
    )
    .record(f64::from(attempts));
}
