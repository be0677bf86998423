#![cfg(feature = "provider-groq")]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use pprovider::adapters::groq::{DEFAULT_GROQ_MODEL, GroqProvider};
use pprovider::adapters::openai::{
    ChatCompletionRequest, ChatCompletionResponse, OpenAiTransport, WireRole,
};
use pprovider::{
    Message, ModelProvider, ModelRequest, ProviderError, ProviderErrorKind, ProviderFuture,
    ProviderId, RetryPolicy, SecretString, SecureCredentialManager, StopReason, ToolDefinition,
};
use serde_json::json;

#[derive(Debug, Default)]
struct FakeTransport {
    captured_key: Mutex<Option<String>>,
    captured_request: Mutex<Option<ChatCompletionRequest>>,
    failures_before_success: AtomicU32,
    failure_kind: Mutex<Option<ProviderErrorKind>>,
    calls: AtomicU32,
}

impl FakeTransport {
    fn failing(times: u32, kind: ProviderErrorKind) -> Self {
        let transport = Self::default();
        transport.failures_before_success.store(times, Ordering::SeqCst);
        *transport.failure_kind.lock().expect("kind lock") = Some(kind);
        transport
    }
}

fn tool_call_response() -> ChatCompletionResponse {
    serde_json::from_value(json!({
        "model": DEFAULT_GROQ_MODEL,
        "choices": [{
            "message": {
                "content": null,
                "tool_calls": [{
                    "id": "call_1",
                    "type": "function",
                    "function": { "name": "get_weather", "arguments": "{\"city\":\"Mumbai\"}" }
                }]
            },
            "finish_reason": "tool_calls"
        }],
        "usage": { "prompt_tokens": 20, "completion_tokens": 5, "total_tokens": 25 }
    }))
    .expect("valid completion body")
}

impl OpenAiTransport for FakeTransport {
    fn send<'a>(
        &'a self,
        body: &'a ChatCompletionRequest,
        api_key: &'a SecretString,
    ) -> ProviderFuture<'a, Result<ChatCompletionResponse, ProviderError>> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.captured_key.lock().expect("key lock") = Some(api_key.expose().to_string());
            *self.captured_request.lock().expect("request lock") = Some(body.clone());

            let remaining = self.failures_before_success.load(Ordering::SeqCst);
            if remaining > 0 {
                self.failures_before_success.store(remaining - 1, Ordering::SeqCst);
                let kind = self
                    .failure_kind
                    .lock()
                    .expect("kind lock")
                    .unwrap_or(ProviderErrorKind::Transport);
                return Err(match kind {
                    ProviderErrorKind::RateLimited => ProviderError::rate_limited("slow down"),
                    ProviderErrorKind::Authentication => ProviderError::authentication("bad key"),
                    _ => ProviderError::transport("connection reset"),
                });
            }

            Ok(tool_call_response())
        })
    }
}

fn credentials() -> Arc<SecureCredentialManager> {
    Arc::new(SecureCredentialManager::with_api_key(ProviderId::Groq, "gsk_live").expect("key"))
}

fn fast_retries(retries: u32) -> RetryPolicy {
    RetryPolicy::from_retry_count(retries).with_initial_backoff(Duration::from_millis(1))
}

fn weather_tool() -> ToolDefinition {
    ToolDefinition {
        name: "get_weather".to_string(),
        description: "Current weather for a city".to_string(),
        input_schema: r#"{"type":"object","properties":{"city":{"type":"string"}}}"#.to_string(),
    }
}

#[tokio::test]
async fn complete_sends_groq_key_options_and_tools() {
    let transport = Arc::new(FakeTransport::default());
    let provider = GroqProvider::new(credentials(), transport.clone());

    let request = ModelRequest::builder(DEFAULT_GROQ_MODEL)
        .message(Message::system("You are a helpful assistant."))
        .message(Message::user("weather in Mumbai?"))
        .temperature(0.7)
        .max_tokens(1024)
        .tools(vec![weather_tool()])
        .build()
        .expect("valid request");

    let response = provider.complete(request).await.expect("completes");

    assert_eq!(response.provider, ProviderId::Groq);
    assert_eq!(response.stop_reason, StopReason::ToolUse);
    assert_eq!(response.tool_calls()[0].name, "get_weather");
    assert_eq!(response.usage.input_tokens, 20);

    assert_eq!(
        transport.captured_key.lock().expect("key lock").as_deref(),
        Some("gsk_live")
    );
    let captured = transport
        .captured_request
        .lock()
        .expect("request lock")
        .clone()
        .expect("request captured");
    assert_eq!(captured.model, DEFAULT_GROQ_MODEL);
    assert_eq!(captured.temperature, Some(0.7));
    assert_eq!(captured.max_tokens, Some(1024));
    assert_eq!(captured.tools.len(), 1);
    assert_eq!(captured.messages[0].role, WireRole::System);
    assert_eq!(captured.messages[1].role, WireRole::User);
}

#[tokio::test]
async fn missing_groq_key_fails_before_transport() {
    let transport = Arc::new(FakeTransport::default());
    let provider = GroqProvider::new(Arc::new(SecureCredentialManager::new()), transport.clone());

    let error = provider
        .complete(ModelRequest::new(DEFAULT_GROQ_MODEL, vec![Message::user("hi")]))
        .await
        .expect_err("no key configured");

    assert_eq!(error.kind, ProviderErrorKind::Authentication);
    assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn rate_limits_are_retried_up_to_the_retry_count() {
    let transport = Arc::new(FakeTransport::failing(2, ProviderErrorKind::RateLimited));
    let provider =
        GroqProvider::new(credentials(), transport.clone()).with_retry_policy(fast_retries(2));

    provider
        .complete(ModelRequest::new(DEFAULT_GROQ_MODEL, vec![Message::user("hi")]))
        .await
        .expect("third attempt succeeds");

    assert_eq!(transport.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn retries_stop_once_exhausted() {
    let transport = Arc::new(FakeTransport::failing(5, ProviderErrorKind::Transport));
    let provider =
        GroqProvider::new(credentials(), transport.clone()).with_retry_policy(fast_retries(2));

    let error = provider
        .complete(ModelRequest::new(DEFAULT_GROQ_MODEL, vec![Message::user("hi")]))
        .await
        .expect_err("all attempts fail");

    assert_eq!(error.kind, ProviderErrorKind::Transport);
    assert_eq!(transport.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn authentication_failures_are_not_retried() {
    let transport = Arc::new(FakeTransport::failing(1, ProviderErrorKind::Authentication));
    let provider =
        GroqProvider::new(credentials(), transport.clone()).with_retry_policy(fast_retries(2));

    let error = provider
        .complete(ModelRequest::new(DEFAULT_GROQ_MODEL, vec![Message::user("hi")]))
        .await
        .expect_err("auth failure surfaces");

    assert_eq!(error.kind, ProviderErrorKind::Authentication);
    assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn invalid_requests_never_reach_the_transport() {
    let transport = Arc::new(FakeTransport::default());
    let provider = GroqProvider::new(credentials(), transport.clone());

    let error = provider
        .complete(ModelRequest::new(DEFAULT_GROQ_MODEL, Vec::new()))
        .await
        .expect_err("empty conversation");

    assert_eq!(error.kind, ProviderErrorKind::InvalidRequest);
    assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
}
