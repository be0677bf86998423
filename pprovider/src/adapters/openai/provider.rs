//! [`ModelProvider`] for any host speaking the chat-completions format.

use std::sync::Arc;

use crate::{
    ModelProvider, ModelRequest, ModelResponse, NoopOperationHooks, ProviderError, ProviderFuture,
    ProviderId, ProviderOperationHooks, RetryPolicy, SecretString, SecureCredentialManager,
    execute_with_retry,
};

use super::transport::OpenAiTransport;
use super::wire::ChatCompletionRequest;

const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

#[derive(Clone)]
pub struct OpenAiProvider {
    provider: ProviderId,
    credentials: Arc<SecureCredentialManager>,
    transport: Arc<dyn OpenAiTransport>,
    retry_policy: RetryPolicy,
    hooks: Arc<dyn ProviderOperationHooks>,
    fallback_model: String,
}

impl OpenAiProvider {
    pub fn new(
        credentials: Arc<SecureCredentialManager>,
        transport: Arc<dyn OpenAiTransport>,
    ) -> Self {
        Self {
            provider: ProviderId::OpenAi,
            credentials,
            transport,
            retry_policy: RetryPolicy::default(),
            hooks: Arc::new(NoopOperationHooks),
            fallback_model: DEFAULT_OPENAI_MODEL.to_string(),
        }
    }

    /// Reports as `provider` and reads that provider's key.
    pub fn with_provider_id(mut self, provider: ProviderId) -> Self {
        self.provider = provider;
        self
    }

    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn ProviderOperationHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn with_fallback_model(mut self, model: impl Into<String>) -> Self {
        self.fallback_model = model.into();
        self
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    fn api_key(&self) -> Result<SecretString, ProviderError> {
        self.credentials.api_key(self.provider)?.ok_or_else(|| {
            ProviderError::authentication(format!("no {} API key configured", self.provider))
        })
    }
}

impl std::fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("provider", &self.provider)
            .field("transport", &self.transport)
            .field("fallback_model", &self.fallback_model)
            .finish_non_exhaustive()
    }
}

impl ModelProvider for OpenAiProvider {
    fn id(&self) -> ProviderId {
        self.provider
    }

    fn complete<'a>(
        &'a self,
        request: ModelRequest,
    ) -> ProviderFuture<'a, Result<ModelResponse, ProviderError>> {
        Box::pin(async move {
            request.validate()?;
            let api_key = self.api_key()?;
            let body = ChatCompletionRequest::from_model_request(request, &self.fallback_model)?;

            let response = execute_with_retry(
                self.provider,
                "complete",
                &self.retry_policy,
                self.hooks.as_ref(),
                |_| self.transport.send(&body, &api_key),
                tokio::time::sleep,
            )
            .await?;

            response.into_model_response(self.provider)
        })
    }
}
