//! Tool contract and runtime used by the delegated tool-calling turn strategy.
//!
//! A [`ToolRegistry`] maps tool names to [`Tool`] implementations; the
//! [`ToolRuntime`] resolves a model-issued [`pprovider::ToolCall`] against it.

mod args;
mod error;
mod hooks;
mod registry;
mod runtime;
mod tool;
mod types;

pub mod prelude {
    pub use crate::{
        DefaultToolRuntime, NoopToolRuntimeHooks, Tool, ToolError, ToolErrorKind,
        ToolExecutionContext, ToolExecutionResult, ToolFuture, ToolOutcome, ToolRegistry,
        ToolRuntime, ToolRuntimeHooks,
    };
}

pub use args::{no_arguments, parse_json_object, required_string};
pub use error::{ToolError, ToolErrorKind};
pub use hooks::{NoopToolRuntimeHooks, ToolOutcome, ToolRuntimeHooks};
pub use registry::ToolRegistry;
pub use runtime::{DEFAULT_TOOL_TIMEOUT, DefaultToolRuntime, ToolRuntime};
pub use tool::{Tool, ToolFuture};
pub use types::{ToolExecutionContext, ToolExecutionResult};
