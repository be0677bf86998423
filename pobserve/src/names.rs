//! Metric names recorded by [`crate::MetricsTelemetry`].

pub const PROVIDER_ATTEMPTS: &str = "parley_provider_attempts_total";
pub const PROVIDER_RETRIES: &str = "parley_provider_retries_total";
pub const PROVIDER_RETRY_DELAY: &str = "parley_provider_retry_delay_seconds";
pub const PROVIDER_CALLS: &str = "parley_provider_calls_total";
pub const PROVIDER_ATTEMPTS_PER_CALL: &str = "parley_provider_attempts_per_call";

pub const TOOL_CALLS: &str = "parley_tool_calls_total";
pub const TOOL_DURATION: &str = "parley_tool_duration_seconds";

pub const TURNS_STARTED: &str = "parley_turns_started_total";
pub const TURNS: &str = "parley_turns_total";
pub const TURN_DURATION: &str = "parley_turn_duration_seconds";
pub const TURN_TOKENS: &str = "parley_turn_tokens_total";
pub const TURN_TOOL_CALLS: &str = "parley_turn_tool_calls";
pub const TURNS_REJECTED: &str = "parley_turns_rejected_total";

/// Incremented by [`crate::Guarded`] when a wrapped hook panics.
pub const HOOK_PANICS: &str = "parley_hook_panics_total";
