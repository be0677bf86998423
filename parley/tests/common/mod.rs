#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{TimeZone, Utc};
use parley::config::ParleyConfig;
use parley::pcommon::BoxFuture;
use parley::pprovider::{
    Message, ModelProvider, ModelRequest, ModelResponse, OutputItem, ProviderError,
    ProviderFuture, ProviderId, Role, StopReason, TokenUsage,
};
use parley::pservices::{
    FixedClock, SearchHit, SearchResults, SearchService, ServiceError, WeatherFormat,
    WeatherService,
};
use parley::{Assistant, Collaborators};

/// Answers with `model: {last message}` and keeps every request.
#[derive(Default)]
pub struct EchoProvider {
    requests: Mutex<Vec<ModelRequest>>,
}

impl EchoProvider {
    pub fn calls(&self) -> usize {
        self.requests.lock().expect("requests lock").len()
    }

    pub fn requests(&self) -> Vec<ModelRequest> {
        self.requests.lock().expect("requests lock").clone()
    }
}

impl ModelProvider for EchoProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Groq
    }

    fn complete<'a>(
        &'a self,
        request: ModelRequest,
    ) -> ProviderFuture<'a, Result<ModelResponse, ProviderError>> {
        Box::pin(async move {
            let last = request
                .messages
                .last()
                .map(|message| message.content.clone())
                .unwrap_or_default();
            self.requests
                .lock()
                .expect("requests lock")
                .push(request.clone());

            Ok(ModelResponse {
                provider: ProviderId::Groq,
                model: request.model,
                output: vec![OutputItem::Message(Message::new(
                    Role::Assistant,
                    format!("model: {last}"),
                ))],
                stop_reason: StopReason::EndTurn,
                usage: TokenUsage::default(),
            })
        })
    }
}

#[derive(Default)]
pub struct CannedWeather {
    pub lookups: AtomicUsize,
}

impl WeatherService for CannedWeather {
    fn lookup<'a>(
        &'a self,
        city: &'a str,
        _format: WeatherFormat,
    ) -> BoxFuture<'a, Result<String, ServiceError>> {
        Box::pin(async move {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            Ok(format!("{city}: ⛅️ +18°C"))
        })
    }
}

pub struct CannedSearch;

impl SearchService for CannedSearch {
    fn search<'a>(
        &'a self,
        query: &'a str,
        _max_results: usize,
    ) -> BoxFuture<'a, Result<SearchResults, ServiceError>> {
        Box::pin(async move {
            Ok(SearchResults {
                answer: None,
                items: vec![SearchHit {
                    title: "Result".to_string(),
                    url: "https://example.com".to_string(),
                    content: format!("found: {query}"),
                }],
            })
        })
    }
}

pub struct Harness {
    pub assistant: Assistant,
    pub provider: Arc<EchoProvider>,
    pub weather: Arc<CannedWeather>,
}

pub fn assistant(config: &ParleyConfig) -> Harness {
    let provider = Arc::new(EchoProvider::default());
    let weather = Arc::new(CannedWeather::default());
    let instant = Utc
        .with_ymd_and_hms(2026, 10, 14, 6, 30, 0)
        .single()
        .expect("valid instant");

    let assistant = Assistant::assemble(
        config,
        Collaborators {
            clock: Arc::new(FixedClock::new(instant, config.timezone)),
            weather: weather.clone(),
            search: Arc::new(CannedSearch),
            provider: provider.clone(),
        },
    );

    Harness {
        assistant,
        provider,
        weather,
    }
}
