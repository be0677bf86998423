//! Observability for the three hook seams of the assistant: provider attempts,
//! tool executions and chat turns.
//!
//! [`TracingTelemetry`] emits structured events, [`MetricsTelemetry`] feeds the
//! `metrics` facade, and [`Telemetry`] fans out to both. Wrap any of them in
//! [`Guarded`] so a panicking hook cannot take a turn down with it.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use pchat::TurnHooks;
//! use pobserve::{Guarded, Telemetry};
//! use pprovider::ProviderOperationHooks;
//!
//! let telemetry = Arc::new(Guarded::new(Telemetry::default()));
//! let _turns: Arc<dyn TurnHooks> = telemetry.clone();
//! let _provider: Arc<dyn ProviderOperationHooks> = telemetry;
//! ```

mod guard;
pub mod names;
mod provider;
mod telemetry;
mod tools;
mod turns;

pub use guard::Guarded;
pub use telemetry::{MetricsTelemetry, Telemetry, TracingTelemetry};

pub mod prelude {
    pub use crate::{Guarded, MetricsTelemetry, Telemetry, TracingTelemetry};
}
