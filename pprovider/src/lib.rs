//! Model adapter layer: provider-agnostic chat-completion types and hosted provider adapters.
//!
//! The [`ModelProvider`] trait is the only seam the turn pipeline depends on;
//! concrete adapters live under [`adapters`] behind cargo features.

mod credentials;
mod error;
mod model;
mod provider;
mod resilience;

pub mod adapters;
pub mod prelude;

pub use credentials::SecureCredentialManager;
pub use error::{ProviderError, ProviderErrorKind};
pub use model::{
    Message, ModelRequest, ModelRequestBuilder, ModelResponse, OutputItem, ProviderId, Role,
    StopReason, TokenUsage, ToolCall, ToolDefinition, ToolExchange, ToolResult,
};
pub use pcommon::{BoxFuture, GenerationOptions, MetadataMap, SecretString};
pub use provider::{ModelProvider, ProviderFuture};
pub use resilience::{
    NoopOperationHooks, ProviderOperationHooks, RetryPolicy, execute_with_retry,
};
