//! Web search through the Tavily API.

use std::time::Duration;

use pcommon::{BoxFuture, SecretString};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::ServiceError;

pub const TAVILY_SEARCH_URL: &str = "https://api.tavily.com/search";
pub const DEFAULT_MAX_RESULTS: usize = 3;
pub const DEFAULT_SEARCH_TIMEOUT: Duration = Duration::from_secs(10);
pub const NO_RESULTS: &str = "No results found.";

const SERVICE: &str = "search";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchResults {
    pub answer: Option<String>,
    pub items: Vec<SearchHit>,
}

impl SearchResults {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Content of the highest-ranked hit that has any, or [`NO_RESULTS`].
    pub fn first_content(&self) -> String {
        self.items
            .iter()
            .map(|hit| hit.content.trim())
            .find(|content| !content.is_empty())
            .map_or_else(|| NO_RESULTS.to_string(), ToString::to_string)
    }

    /// Multi-line digest handed to the model as a tool output.
    pub fn digest(&self) -> String {
        if self.items.is_empty() {
            return NO_RESULTS.to_string();
        }

        let mut lines = Vec::with_capacity(self.items.len() + 1);
        if let Some(answer) = self.answer.as_deref().filter(|answer| !answer.trim().is_empty()) {
            lines.push(format!("Answer: {answer}"));
        }
        for (index, hit) in self.items.iter().enumerate() {
            lines.push(format!("{}. {} ({}): {}", index + 1, hit.title, hit.url, hit.content));
        }
        lines.join("\n")
    }
}

pub trait SearchService: Send + Sync {
    fn search<'a>(
        &'a self,
        query: &'a str,
        max_results: usize,
    ) -> BoxFuture<'a, Result<SearchResults, ServiceError>>;
}

#[derive(Debug, Clone)]
pub struct TavilySearchClient {
    client: Client,
    api_key: SecretString,
    endpoint: String,
    timeout: Duration,
}

impl TavilySearchClient {
    pub fn new(client: Client, api_key: SecretString) -> Self {
        Self {
            client,
            api_key,
            endpoint: TAVILY_SEARCH_URL.to_string(),
            timeout: DEFAULT_SEARCH_TIMEOUT,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct TavilyRequest<'a> {
    query: &'a str,
    max_results: usize,
    search_depth: &'static str,
    include_answer: bool,
    include_raw_content: bool,
}

impl<'a> TavilyRequest<'a> {
    pub(crate) fn basic(query: &'a str, max_results: usize) -> Self {
        Self {
            query,
            max_results,
            search_depth: "basic",
            include_answer: true,
            include_raw_content: false,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct TavilyResponse {
    #[serde(default)]
    answer: Option<String>,
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Debug, Deserialize)]
struct TavilyResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: String,
}

impl TavilyResponse {
    pub(crate) fn into_results(self, max_results: usize) -> SearchResults {
        SearchResults {
            answer: self.answer,
            items: self
                .results
                .into_iter()
                .take(max_results)
                .map(|result| SearchHit {
                    title: result.title,
                    url: result.url,
                    content: result.content,
                })
                .collect(),
        }
    }
}

impl SearchService for TavilySearchClient {
    fn search<'a>(
        &'a self,
        query: &'a str,
        max_results: usize,
    ) -> BoxFuture<'a, Result<SearchResults, ServiceError>> {
        Box::pin(async move {
            let response = self
                .client
                .post(&self.endpoint)
                .bearer_auth(self.api_key.expose())
                .timeout(self.timeout)
                .json(&TavilyRequest::basic(query, max_results))
                .send()
                .await
                .map_err(|err| ServiceError::from_reqwest(SERVICE, err))?;

            let status = response.status();
            if !status.is_success() {
                return Err(ServiceError::from_status(SERVICE, status));
            }

            let parsed: TavilyResponse = response
                .json()
                .await
                .map_err(|err| ServiceError::malformed(SERVICE, err.to_string()))?;

            let results = parsed.into_results(max_results);
            tracing::debug!(hits = results.items.len(), "search completed");
            Ok(results)
        })
    }
}
