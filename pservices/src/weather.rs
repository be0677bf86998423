//! Current-conditions lookup against wttr.in.
//!
//! Two response shapes are supported: `format=3`, a one-line plain-text
//! summary, and `format=j1`, JSON from which a fixed sentence is rendered.

use std::time::Duration;

use pcommon::BoxFuture;
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::ServiceError;

pub const WTTR_BASE_URL: &str = "https://wttr.in";
pub const DEFAULT_WEATHER_TIMEOUT: Duration = Duration::from_secs(10);

const SERVICE: &str = "weather";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WeatherFormat {
    #[default]
    Plain,
    Json,
}

impl WeatherFormat {
    fn query_value(self) -> &'static str {
        match self {
            Self::Plain => "3",
            Self::Json => "j1",
        }
    }
}

/// Display text used when a lookup fails.
pub fn weather_fallback(city: &str) -> String {
    format!("Could not fetch weather for {city}")
}

pub trait WeatherService: Send + Sync {
    fn lookup<'a>(
        &'a self,
        city: &'a str,
        format: WeatherFormat,
    ) -> BoxFuture<'a, Result<String, ServiceError>>;
}

#[derive(Debug, Clone)]
pub struct WttrWeatherClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl WttrWeatherClient {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: WTTR_BASE_URL.to_string(),
            timeout: DEFAULT_WEATHER_TIMEOUT,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// `{base}/{city}?format=..`, with the city percent-encoded as one path segment.
    pub fn lookup_url(&self, city: &str, format: WeatherFormat) -> Result<Url, ServiceError> {
        let mut url = Url::parse(&self.base_url).map_err(|err| {
            ServiceError::transport(SERVICE, format!("invalid weather base url: {err}"))
        })?;

        url.path_segments_mut()
            .map_err(|_| ServiceError::transport(SERVICE, "weather base url cannot take a path"))?
            .pop_if_empty()
            .push(city);
        url.query_pairs_mut().append_pair("format", format.query_value());
        Ok(url)
    }
}

impl WeatherService for WttrWeatherClient {
    fn lookup<'a>(
        &'a self,
        city: &'a str,
        format: WeatherFormat,
    ) -> BoxFuture<'a, Result<String, ServiceError>> {
        Box::pin(async move {
            let url = self.lookup_url(city, format)?;
            tracing::debug!(%url, "weather lookup");

            let response = self
                .client
                .get(url)
                .timeout(self.timeout)
                .send()
                .await
                .map_err(|err| ServiceError::from_reqwest(SERVICE, err))?;

            let status = response.status();
            if !status.is_success() {
                return Err(ServiceError::from_status(SERVICE, status));
            }

            let body = response
                .text()
                .await
                .map_err(|err| ServiceError::from_reqwest(SERVICE, err))?;

            match format {
                WeatherFormat::Plain => render_plain(&body),
                WeatherFormat::Json => render_conditions(city, &body),
            }
        })
    }
}

pub(crate) fn render_plain(body: &str) -> Result<String, ServiceError> {
    let line = body.trim();
    if line.is_empty() {
        return Err(ServiceError::malformed(SERVICE, "empty weather response"));
    }
    Ok(line.to_string())
}

#[derive(Debug, Deserialize)]
struct WttrReport {
    current_condition: Vec<WttrCondition>,
}

#[derive(Debug, Deserialize)]
struct WttrCondition {
    #[serde(rename = "weatherDesc")]
    weather_desc: Vec<WttrText>,
    #[serde(rename = "temp_C")]
    temp_c: String,
    #[serde(rename = "FeelsLikeC")]
    feels_like_c: String,
    humidity: String,
}

#[derive(Debug, Deserialize)]
struct WttrText {
    value: String,
}

pub(crate) fn render_conditions(city: &str, body: &str) -> Result<String, ServiceError> {
    let report: WttrReport = serde_json::from_str(body)
        .map_err(|err| ServiceError::malformed(SERVICE, format!("weather payload: {err}")))?;

    let current = report
        .current_condition
        .first()
        .ok_or_else(|| ServiceError::malformed(SERVICE, "no current_condition entry"))?;
    let description = current
        .weather_desc
        .first()
        .map(|text| text.value.trim())
        .ok_or_else(|| ServiceError::malformed(SERVICE, "no weatherDesc entry"))?;

    Ok(format!(
        "Weather in {city}: {description}, Temperature: {}°C (feels like {}°C), Humidity: {}%",
        current.temp_c, current.feels_like_c, current.humidity
    ))
}
