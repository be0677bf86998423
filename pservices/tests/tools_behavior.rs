use std::sync::{Arc, Mutex};

use chrono::{TimeZone, Utc};
use pcommon::BoxFuture;
use pprovider::ToolCall;
use pservices::{
    DATETIME_TOOL, DEFAULT_MAX_RESULTS, FixedClock, NO_RESULTS, SearchHit, SearchResults, SearchService, ServiceError,
    WEATHER_TOOL, WEB_SEARCH_TOOL, WeatherFormat, WeatherService, assistant_tools,
};
use ptooling::{DefaultToolRuntime, ToolErrorKind, ToolExecutionContext, ToolRuntime};

#[derive(Default)]
struct FakeWeather {
    fail: bool,
    requests: Mutex<Vec<(String, WeatherFormat)>>,
}

impl WeatherService for FakeWeather {
    fn lookup<'a>(
        &'a self,
        city: &'a str,
        format: WeatherFormat,
    ) -> BoxFuture<'a, Result<String, ServiceError>> {
        Box::pin(async move {
            self.requests
                .lock()
                .expect("requests lock")
                .push((city.to_string(), format));
            if self.fail {
                Err(ServiceError::timeout("weather", "deadline exceeded"))
            } else {
                Ok(format!("Weather in {city}: Clear"))
            }
        })
    }
}

#[derive(Default)]
struct FakeSearch {
    results: SearchResults,
    fail: bool,
}

impl SearchService for FakeSearch {
    fn search<'a>(
        &'a self,
        _query: &'a str,
        max_results: usize,
    ) -> BoxFuture<'a, Result<SearchResults, ServiceError>> {
        Box::pin(async move {
            if self.fail {
                return Err(ServiceError::unauthorized("search", "bad key"));
            }
            let mut results = self.results.clone();
            results.items.truncate(max_results);
            Ok(results)
        })
    }
}

fn runtime(weather: Arc<FakeWeather>, search: FakeSearch) -> DefaultToolRuntime {
    runtime_with_max_results(weather, search, DEFAULT_MAX_RESULTS)
}

fn runtime_with_max_results(
    weather: Arc<FakeWeather>,
    search: FakeSearch,
    max_results: usize,
) -> DefaultToolRuntime {
    let instant = Utc
        .with_ymd_and_hms(2026, 10, 14, 4, 0, 0)
        .single()
        .expect("valid instant");
    let clock = Arc::new(FixedClock::new(instant, chrono_tz::Asia::Kolkata));
    DefaultToolRuntime::new(Arc::new(assistant_tools(
        clock,
        weather,
        Arc::new(search),
        max_results,
    )))
}

fn call(name: &str, arguments: &str) -> ToolCall {
    ToolCall {
        id: format!("call_{name}"),
        name: name.to_string(),
        arguments: arguments.to_string(),
    }
}

#[tokio::test]
async fn registry_advertises_three_tools() {
    let runtime = runtime(Arc::default(), FakeSearch::default());
    let names = runtime
        .definitions()
        .into_iter()
        .map(|definition| definition.name)
        .collect::<Vec<_>>();
    assert_eq!(names, vec![DATETIME_TOOL, WEATHER_TOOL, WEB_SEARCH_TOOL]);
}

#[tokio::test]
async fn datetime_tool_reads_the_clock() {
    let runtime = runtime(Arc::default(), FakeSearch::default());
    let result = runtime
        .execute(call(DATETIME_TOOL, "{}"), ToolExecutionContext::new("s"))
        .await
        .expect("clock never fails");
    assert_eq!(result.output, "2026-10-14 09:30:00 (IST)");
}

#[tokio::test]
async fn weather_tool_uses_json_format_and_falls_back() {
    let weather = Arc::new(FakeWeather::default());
    let ok = runtime(weather.clone(), FakeSearch::default())
        .execute(call(WEATHER_TOOL, r#"{"city":"Tokyo"}"#), ToolExecutionContext::new("s"))
        .await
        .expect("lookup succeeds");
    assert_eq!(ok.output, "Weather in Tokyo: Clear");
    assert_eq!(
        weather.requests.lock().expect("requests lock").as_slice(),
        &[("Tokyo".to_string(), WeatherFormat::Json)]
    );

    let failing = Arc::new(FakeWeather {
        fail: true,
        ..FakeWeather::default()
    });
    let fallback = runtime(failing, FakeSearch::default())
        .execute(call(WEATHER_TOOL, r#"{"city":"Tokyo"}"#), ToolExecutionContext::new("s"))
        .await
        .expect("fallback is still an output");
    assert_eq!(fallback.output, "Could not fetch weather for Tokyo");
}

#[tokio::test]
async fn weather_tool_requires_a_city() {
    let error = runtime(Arc::default(), FakeSearch::default())
        .execute(call(WEATHER_TOOL, "{}"), ToolExecutionContext::new("s"))
        .await
        .expect_err("city missing");
    assert_eq!(error.kind, ToolErrorKind::InvalidArguments);
}

#[tokio::test]
async fn search_tool_returns_digest_or_no_results() {
    let search = FakeSearch {
        results: SearchResults {
            answer: None,
            items: vec![SearchHit {
                title: "Rust".to_string(),
                url: "https://rust-lang.org".to_string(),
                content: "A language empowering everyone".to_string(),
            }],
        },
        fail: false,
    };
    let result = runtime(Arc::default(), search)
        .execute(call(WEB_SEARCH_TOOL, r#"{"query":"rust"}"#), ToolExecutionContext::new("s"))
        .await
        .expect("search succeeds");
    assert_eq!(result.output, "1. Rust (https://rust-lang.org): A language empowering everyone");

    let empty = runtime(Arc::default(), FakeSearch::default())
        .execute(call(WEB_SEARCH_TOOL, r#"{"query":"zzz"}"#), ToolExecutionContext::new("s"))
        .await
        .expect("empty search succeeds");
    assert_eq!(empty.output, NO_RESULTS);
}

fn hit(title: &str) -> SearchHit {
    SearchHit {
        title: title.to_string(),
        url: format!("https://example.com/{title}"),
        content: format!("{title} content"),
    }
}

#[tokio::test]
async fn search_tool_honours_the_configured_result_limit() {
    let search = FakeSearch {
        results: SearchResults {
            answer: None,
            items: vec![hit("first"), hit("second")],
        },
        fail: false,
    };
    let result = runtime_with_max_results(Arc::default(), search, 1)
        .execute(call(WEB_SEARCH_TOOL, r#"{"query":"rust"}"#), ToolExecutionContext::new("s"))
        .await
        .expect("search succeeds");

    assert_eq!(result.output, "1. first (https://example.com/first): first content");
}

#[tokio::test]
async fn search_failures_become_fallback_text() {
    let search = FakeSearch {
        fail: true,
        ..FakeSearch::default()
    };
    let result = runtime(Arc::default(), search)
        .execute(call(WEB_SEARCH_TOOL, r#"{"query":"rust"}"#), ToolExecutionContext::new("s"))
        .await
        .expect("fallback is still an output");
    assert_eq!(result.output, "Could not search the web for \"rust\"");
}
