//! Groq provider implemented over the OpenAI-compatible transport.
//!
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use pprovider::adapters::groq::{GroqProvider, DEFAULT_GROQ_MODEL};
//! use pprovider::{ModelProvider, ProviderId, RetryPolicy, SecureCredentialManager};
//!
//! let credentials = Arc::new(SecureCredentialManager::with_api_key(ProviderId::Groq, "gsk_x").unwrap());
//! let provider = GroqProvider::http(credentials, Duration::from_secs(30))
//!     .unwrap()
//!     .with_retry_policy(RetryPolicy::from_retry_count(2));
//! assert_eq!(provider.id(), ProviderId::Groq);
//! assert_eq!(DEFAULT_GROQ_MODEL, "llama-3.3-70b-versatile");
//! ```

use std::sync::Arc;
use std::time::Duration;

use crate::adapters::openai::{OpenAiHttpTransport, OpenAiProvider, OpenAiTransport, http_client};
use crate::{
    ModelProvider, ModelRequest, ModelResponse, ProviderError, ProviderFuture, ProviderId,
    ProviderOperationHooks, RetryPolicy, SecureCredentialManager,
};

pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_GROQ_MODEL: &str = "llama-3.3-70b-versatile";

#[derive(Clone, Debug)]
pub struct GroqProvider {
    inner: OpenAiProvider,
}

impl GroqProvider {
    pub fn new(
        credentials: Arc<SecureCredentialManager>,
        transport: Arc<dyn OpenAiTransport>,
    ) -> Self {
        Self {
            inner: OpenAiProvider::new(credentials, transport)
                .with_provider_id(ProviderId::Groq)
                .with_fallback_model(DEFAULT_GROQ_MODEL),
        }
    }

    /// Provider backed by a reqwest transport pointed at [`GROQ_BASE_URL`].
    pub fn http(
        credentials: Arc<SecureCredentialManager>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let transport = Self::default_http_transport(http_client(timeout)?);
        Ok(Self::new(credentials, Arc::new(transport)))
    }

    pub fn default_http_transport(client: reqwest::Client) -> OpenAiHttpTransport {
        OpenAiHttpTransport::new(client).with_base_url(GROQ_BASE_URL)
    }

    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.inner = self.inner.with_retry_policy(retry_policy);
        self
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn ProviderOperationHooks>) -> Self {
        self.inner = self.inner.with_hooks(hooks);
        self
    }

    pub fn with_fallback_model(mut self, model: impl Into<String>) -> Self {
        self.inner = self.inner.with_fallback_model(model);
        self
    }
}

impl ModelProvider for GroqProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Groq
    }

    fn complete<'a>(
        &'a self,
        request: ModelRequest,
    ) -> ProviderFuture<'a, Result<ModelResponse, ProviderError>> {
        self.inner.complete(request)
    }
}
