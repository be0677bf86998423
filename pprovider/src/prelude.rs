//! Common `pprovider` imports for downstream crates.

pub use crate::{
    Message, ModelProvider, ModelRequest, ModelRequestBuilder, ModelResponse, NoopOperationHooks,
    OutputItem, ProviderError, ProviderErrorKind, ProviderFuture, ProviderId,
    ProviderOperationHooks, RetryPolicy, Role, StopReason, TokenUsage, ToolCall, ToolDefinition,
    ToolExchange, ToolResult, execute_with_retry,
};
pub use pcommon::{BoxFuture, GenerationOptions, MetadataMap};
