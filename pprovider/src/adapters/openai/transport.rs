//! Where chat-completion bodies are sent: a trait seam plus the reqwest client.

use std::time::Duration;

use reqwest::{Client, StatusCode};

use crate::{ProviderError, ProviderFuture, SecretString};

use super::wire::{ChatCompletionRequest, ChatCompletionResponse, error_message};

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

const COMPLETIONS_PATH: &str = "chat/completions";

/// Builds a client whose requests give up after `timeout`.
pub fn http_client(timeout: Duration) -> Result<Client, ProviderError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|err| ProviderError::transport(format!("failed to build http client: {err}")))
}

/// Delivers one request body with a bearer key. Called once per retry attempt.
pub trait OpenAiTransport: Send + Sync + std::fmt::Debug {
    fn send<'a>(
        &'a self,
        body: &'a ChatCompletionRequest,
        api_key: &'a SecretString,
    ) -> ProviderFuture<'a, Result<ChatCompletionResponse, ProviderError>>;
}

#[derive(Debug, Clone)]
pub struct OpenAiHttpTransport {
    client: Client,
    base_url: String,
}

impl OpenAiHttpTransport {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: OPENAI_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn completions_url(&self) -> String {
        format!("{}/{COMPLETIONS_PATH}", self.base_url.trim_end_matches('/'))
    }
}

pub(crate) fn error_for_status(status: StatusCode, message: String) -> ProviderError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::authentication(message),
        StatusCode::TOO_MANY_REQUESTS => ProviderError::rate_limited(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => ProviderError::timeout(message),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            ProviderError::invalid_request(message)
        }
        StatusCode::SERVICE_UNAVAILABLE | StatusCode::BAD_GATEWAY => {
            ProviderError::unavailable(message)
        }
        _ => ProviderError::transport(message),
    }
}

fn send_error(err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::timeout(err.to_string())
    } else {
        ProviderError::transport(err.to_string())
    }
}

impl OpenAiTransport for OpenAiHttpTransport {
    fn send<'a>(
        &'a self,
        body: &'a ChatCompletionRequest,
        api_key: &'a SecretString,
    ) -> ProviderFuture<'a, Result<ChatCompletionResponse, ProviderError>> {
        Box::pin(async move {
            let response = self
                .client
                .post(self.completions_url())
                .bearer_auth(api_key.expose())
                .json(body)
                .send()
                .await
                .map_err(send_error)?;

            let status = response.status();
            if !status.is_success() {
                let text = response.text().await.unwrap_or_default();
                let message = error_message(&text)
                    .unwrap_or_else(|| format!("chat completion failed with status {status}"));
                return Err(error_for_status(status, message));
            }

            response
                .json::<ChatCompletionResponse>()
                .await
                .map_err(|err| ProviderError::malformed(err.to_string()))
        })
    }
}
