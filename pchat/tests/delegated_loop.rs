use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use chrono::{TimeZone, Utc};
use pchat::prelude::*;
use pchat::{EMPTY_ANSWER_REPLY, FallbackKind, ITERATION_LIMIT_REPLY};
use pcommon::BoxFuture;
use pprovider::{
    Message, ModelProvider, ModelRequest, ModelResponse, OutputItem, ProviderError,
    ProviderFuture, ProviderId, Role, StopReason, TokenUsage, ToolCall,
};
use pservices::{
    DEFAULT_MAX_RESULTS, FixedClock, SearchResults, SearchService, ServiceError, WeatherFormat, WeatherService,
    assistant_tools,
};
use ptooling::DefaultToolRuntime;

enum Step {
    Call(&'static str, &'static str),
    Answer(&'static str),
    Fail(ProviderError),
}

#[derive(Default)]
struct ScriptedProvider {
    script: Mutex<VecDeque<Step>>,
    always_call: bool,
    requests: Mutex<Vec<ModelRequest>>,
}

impl ScriptedProvider {
    fn new(steps: Vec<Step>) -> Self {
        Self {
            script: Mutex::new(steps.into()),
            ..Self::default()
        }
    }

    fn looping() -> Self {
        Self {
            always_call: true,
            ..Self::default()
        }
    }

    fn requests(&self) -> Vec<ModelRequest> {
        self.requests.lock().expect("requests lock").clone()
    }
}

impl ModelProvider for ScriptedProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Groq
    }

    fn complete<'a>(
        &'a self,
        request: ModelRequest,
    ) -> ProviderFuture<'a, Result<ModelResponse, ProviderError>> {
        Box::pin(async move {
            let round = {
                let mut requests = self.requests.lock().expect("requests lock");
                requests.push(request.clone());
                requests.len()
            };

            let step = if self.always_call {
                Step::Call("get_current_datetime", "{}")
            } else {
                self.script
                    .lock()
                    .expect("script lock")
                    .pop_front()
                    .unwrap_or(Step::Answer("done"))
            };

            let (output, stop_reason) = match step {
                Step::Fail(error) => return Err(error),
                Step::Answer(text) => (
                    vec![OutputItem::Message(Message::new(Role::Assistant, text))],
                    StopReason::EndTurn,
                ),
                Step::Call(name, arguments) => (
                    vec![OutputItem::ToolCall(ToolCall {
                        id: format!("call_{round}"),
                        name: name.to_string(),
                        arguments: arguments.to_string(),
                    })],
                    StopReason::ToolUse,
                ),
            };

            Ok(ModelResponse {
                provider: ProviderId::Groq,
                model: request.model,
                output,
                stop_reason,
                usage: TokenUsage {
                    input_tokens: 10,
                    output_tokens: 2,
                    total_tokens: 12,
                },
            })
        })
    }
}

struct StubWeather;

impl WeatherService for StubWeather {
    fn lookup<'a>(
        &'a self,
        city: &'a str,
        _format: WeatherFormat,
    ) -> BoxFuture<'a, Result<String, ServiceError>> {
        Box::pin(async move { Ok(format!("Weather in {city}: Sunny")) })
    }
}

struct StubSearch;

impl SearchService for StubSearch {
    fn search<'a>(
        &'a self,
        _query: &'a str,
        _max_results: usize,
    ) -> BoxFuture<'a, Result<SearchResults, ServiceError>> {
        Box::pin(async { Ok(SearchResults::default()) })
    }
}

fn service(provider: Arc<ScriptedProvider>) -> (ChatService, Arc<InMemoryConversationStore>) {
    let instant = Utc
        .with_ymd_and_hms(2026, 10, 14, 4, 0, 0)
        .single()
        .expect("valid instant");
    let clock = Arc::new(FixedClock::new(instant, chrono_tz::Asia::Kolkata));
    let registry = assistant_tools(
        clock,
        Arc::new(StubWeather),
        Arc::new(StubSearch),
        DEFAULT_MAX_RESULTS,
    );
    let runtime = Arc::new(DefaultToolRuntime::new(Arc::new(registry)));

    let router = DelegatedRouter::new(provider, runtime).with_system_prompt("be helpful");
    let store = Arc::new(InMemoryConversationStore::new());
    (ChatService::new(Arc::new(router), store.clone()), store)
}

#[tokio::test]
async fn context_is_system_then_history_then_input() {
    let provider = Arc::new(ScriptedProvider::new(vec![Step::Answer("hi again")]));
    let (service, store) = service(provider.clone());
    store
        .append(
            &SessionId::default(),
            vec![Turn::user("my name is Asha"), Turn::assistant("Hello Asha")],
        )
        .await
        .expect("seed history");

    let result = service
        .run_turn(ChatTurnRequest::new("default", "what is my name?"))
        .await
        .expect("turn");

    assert_eq!(result.assistant_message, "hi again");
    assert_eq!(result.route, RouteKind::Delegated);

    let requests = provider.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].messages,
        vec![
            Message::system("be helpful"),
            Message::user("my name is Asha"),
            Message::assistant("Hello Asha"),
            Message::user("what is my name?"),
        ]
    );
    let tool_names = requests[0]
        .tools
        .iter()
        .map(|tool| tool.name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(tool_names, vec!["get_current_datetime", "get_weather", "web_search"]);
    assert!(requests[0].scratchpad.is_empty());
}

#[tokio::test]
async fn tool_results_are_replayed_in_the_scratchpad() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        Step::Call("get_weather", r#"{"city":"Tokyo"}"#),
        Step::Answer("It is sunny in Tokyo."),
    ]));
    let (service, _) = service(provider.clone());

    let result = service
        .run_turn(ChatTurnRequest::new("default", "how is Tokyo today?"))
        .await
        .expect("turn");

    assert_eq!(result.assistant_message, "It is sunny in Tokyo.");
    assert_eq!(result.tool_calls.len(), 1);
    assert_eq!(result.usage.total_tokens, 24);

    let requests = provider.requests();
    assert_eq!(requests.len(), 2);
    let exchange = &requests[1].scratchpad[0];
    assert_eq!(exchange.calls[0].name, "get_weather");
    assert_eq!(exchange.results[0].tool_call_id, "call_1");
    assert_eq!(exchange.results[0].output, "Weather in Tokyo: Sunny");
    assert_eq!(requests[1].messages, requests[0].messages);
}

#[tokio::test]
async fn tool_failures_are_fed_back_to_the_model() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        Step::Call("launch_rocket", "{}"),
        Step::Call("get_weather", "not json"),
        Step::Answer("Sorry, I could not do that."),
    ]));
    let (service, _) = service(provider.clone());

    let result = service
        .run_turn(ChatTurnRequest::new("default", "do something odd"))
        .await
        .expect("turn");

    assert!(result.outcome.is_answered());
    let requests = provider.requests();
    assert_eq!(requests.len(), 3);
    assert_eq!(
        requests[1].scratchpad[0].results[0].output,
        "Error: tool 'launch_rocket' is not registered"
    );
    assert!(
        requests[2].scratchpad[1].results[0]
            .output
            .starts_with("Error: invalid JSON arguments")
    );
}

#[tokio::test]
async fn tool_loop_stops_at_iteration_limit() {
    let provider = Arc::new(ScriptedProvider::looping());
    let (service, store) = service(provider.clone());

    let result = service
        .run_turn(ChatTurnRequest::new("default", "loop forever"))
        .await
        .expect("turn");

    assert_eq!(provider.requests().len(), 5);
    assert_eq!(result.assistant_message, ITERATION_LIMIT_REPLY);
    assert!(matches!(
        result.outcome,
        TurnOutcome::Fallback {
            kind: FallbackKind::IterationLimit,
            ..
        }
    ));

    let saved = store.load(&SessionId::default()).await.expect("load");
    assert_eq!(saved[1], Turn::assistant(ITERATION_LIMIT_REPLY));
}

#[tokio::test]
async fn empty_answer_becomes_fixed_reply() {
    let provider = Arc::new(ScriptedProvider::new(vec![Step::Answer("  ")]));
    let (service, _) = service(provider);

    let result = service
        .run_turn(ChatTurnRequest::new("default", "say nothing"))
        .await
        .expect("turn");

    assert_eq!(result.assistant_message, EMPTY_ANSWER_REPLY);
}

#[tokio::test]
async fn provider_failure_is_recorded_as_warning() {
    let provider = Arc::new(ScriptedProvider::new(vec![Step::Fail(
        ProviderError::authentication("invalid api key"),
    )]));
    let (service, store) = service(provider);

    let result = service
        .run_turn(ChatTurnRequest::new("default", "hello"))
        .await
        .expect("routing failures are not errors");

    assert_eq!(result.assistant_message, "⚠️ Error: Authentication: invalid api key");
    assert!(result.outcome.is_failed());
    assert_eq!(store.load(&SessionId::default()).await.expect("load").len(), 2);
}
