//! Keyword-routed turn strategy.
//!
//! Rules are checked in order against the lowercased input; the first rule
//! with a trigger contained in the input wins. Input that matches no rule is
//! sent to the model as the only prompt message.
//!
//! ```rust
//! use pchat::{CityExtraction, KeywordRules, RouteDecision};
//!
//! let rules = KeywordRules::default();
//! assert_eq!(rules.decide("What TIME is it?"), RouteDecision::Clock);
//! assert_eq!(
//!     rules.decide("weather in Paris"),
//!     RouteDecision::Weather { city: "in paris".to_string() }
//! );
//!
//! let phrase = KeywordRules::default().with_city_extraction(CityExtraction::AfterLastPreposition);
//! assert_eq!(
//!     phrase.decide("weather in Paris"),
//!     RouteDecision::Weather { city: "paris".to_string() }
//! );
//! ```

use std::sync::Arc;

use pcommon::SessionId;
use pprovider::{Message, ModelProvider, ModelRequest};
use pservices::{
    Clock, DEFAULT_MAX_RESULTS, SearchService, WeatherFormat, WeatherService, weather_fallback,
};

use crate::{
    ChatFuture, FallbackKind, ModelSettings, RouteFailure, RouteKind, RouteReply, RouterMode,
    Turn, TurnOutcome, TurnRouter,
};

pub const DEFAULT_CITY: &str = "Delhi";

const PREPOSITIONS: &[&str] = &["in", "for", "at", "of", "near"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordRule {
    pub route: RouteKind,
    pub triggers: Vec<String>,
}

impl KeywordRule {
    pub fn new(route: RouteKind, triggers: &[&str]) -> Self {
        Self {
            route,
            triggers: triggers.iter().map(|trigger| trigger.to_lowercase()).collect(),
        }
    }

    fn matches(&self, lowered: &str) -> bool {
        self.triggers
            .iter()
            .any(|trigger| !trigger.is_empty() && lowered.contains(trigger.as_str()))
    }
}

/// How the weather route turns the input into a city name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CityExtraction {
    /// Lowercased input with the trigger removed; "weather in Tokyo" asks for "in tokyo".
    #[default]
    Literal,
    /// Literal extraction, then only the words after the last preposition.
    AfterLastPreposition,
}

impl CityExtraction {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "literal" => Some(Self::Literal),
            "phrase" | "after-preposition" => Some(Self::AfterLastPreposition),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    Clock,
    Weather { city: String },
    Search { query: String },
    Model { prompt: String },
}

impl RouteDecision {
    pub fn kind(&self) -> RouteKind {
        match self {
            Self::Clock => RouteKind::Clock,
            Self::Weather { .. } => RouteKind::Weather,
            Self::Search { .. } => RouteKind::Search,
            Self::Model { .. } => RouteKind::Model,
        }
    }
}

/// Ordered rule list plus weather-city settings; deciding is pure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordRules {
    rules: Vec<KeywordRule>,
    default_city: String,
    city_extraction: CityExtraction,
}

impl Default for KeywordRules {
    fn default() -> Self {
        Self::new(vec![
            KeywordRule::new(RouteKind::Clock, &["time", "date"]),
            KeywordRule::new(RouteKind::Weather, &["weather"]),
            KeywordRule::new(RouteKind::Search, &["search", "news"]),
        ])
    }
}

impl KeywordRules {
    pub fn new(rules: Vec<KeywordRule>) -> Self {
        Self {
            rules,
            default_city: DEFAULT_CITY.to_string(),
            city_extraction: CityExtraction::default(),
        }
    }

    pub fn with_default_city(mut self, city: impl Into<String>) -> Self {
        self.default_city = city.into();
        self
    }

    pub fn with_city_extraction(mut self, extraction: CityExtraction) -> Self {
        self.city_extraction = extraction;
        self
    }

    pub fn rules(&self) -> &[KeywordRule] {
        &self.rules
    }

    pub fn decide(&self, text: &str) -> RouteDecision {
        let lowered = text.to_lowercase();

        let Some(rule) = self.rules.iter().find(|rule| rule.matches(&lowered)) else {
            return RouteDecision::Model {
                prompt: text.to_string(),
            };
        };

        match rule.route {
            RouteKind::Clock => RouteDecision::Clock,
            RouteKind::Weather => RouteDecision::Weather {
                city: self.extract_city(&lowered, rule),
            },
            RouteKind::Search => RouteDecision::Search {
                query: text.to_string(),
            },
            RouteKind::Model | RouteKind::Delegated => RouteDecision::Model {
                prompt: text.to_string(),
            },
        }
    }

    fn extract_city(&self, lowered: &str, rule: &KeywordRule) -> String {
        let mut remainder = lowered.to_string();
        for trigger in rule.triggers.iter().filter(|trigger| !trigger.is_empty()) {
            remainder = remainder.replace(trigger.as_str(), "");
        }

        let city = match self.city_extraction {
            CityExtraction::Literal => remainder.trim().to_string(),
            CityExtraction::AfterLastPreposition => place_phrase(&remainder),
        };

        if city.is_empty() {
            self.default_city.clone()
        } else {
            city
        }
    }
}

fn place_phrase(remainder: &str) -> String {
    let words = remainder
        .split_whitespace()
        .map(|word| word.trim_matches(|c: char| !c.is_alphanumeric() && c != '-'))
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>();

    let start = words
        .iter()
        .rposition(|word| PREPOSITIONS.contains(word))
        .map_or(0, |index| index + 1);

    words[start..].join(" ")
}

pub struct KeywordRouter {
    rules: KeywordRules,
    clock: Arc<dyn Clock>,
    weather: Arc<dyn WeatherService>,
    search: Arc<dyn SearchService>,
    provider: Arc<dyn ModelProvider>,
    settings: ModelSettings,
    max_results: usize,
}

impl KeywordRouter {
    pub fn new(
        clock: Arc<dyn Clock>,
        weather: Arc<dyn WeatherService>,
        search: Arc<dyn SearchService>,
        provider: Arc<dyn ModelProvider>,
    ) -> Self {
        Self {
            rules: KeywordRules::default(),
            clock,
            weather,
            search,
            provider,
            settings: ModelSettings::default(),
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    pub fn with_rules(mut self, rules: KeywordRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_model_settings(mut self, settings: ModelSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn decide(&self, text: &str) -> RouteDecision {
        self.rules.decide(text)
    }

    async fn run(&self, decision: RouteDecision) -> Result<RouteReply, RouteFailure> {
        match decision {
            RouteDecision::Clock => Ok(RouteReply::answered(
                RouteKind::Clock,
                self.clock.current_datetime(),
            )),
            RouteDecision::Weather { city } => {
                match self.weather.lookup(&city, WeatherFormat::Plain).await {
                    Ok(report) => Ok(RouteReply::answered(RouteKind::Weather, report)),
                    Err(error) => {
                        tracing::warn!(%city, %error, "weather lookup failed");
                        Ok(RouteReply::answered(RouteKind::Weather, weather_fallback(&city))
                            .with_outcome(TurnOutcome::fallback(
                                FallbackKind::WeatherUnavailable,
                                error.to_string(),
                            )))
                    }
                }
            }
            RouteDecision::Search { query } => {
                let results = self
                    .search
                    .search(&query, self.max_results)
                    .await
                    .map_err(|error| RouteFailure::new(RouteKind::Search, error))?;
                Ok(RouteReply::answered(RouteKind::Search, results.first_content()))
            }
            RouteDecision::Model { prompt } => {
                let request = ModelRequest::builder(self.settings.model.clone())
                    .message(Message::user(prompt))
                    .options(self.settings.options)
                    .build()
                    .map_err(|error| RouteFailure::new(RouteKind::Model, error))?;

                let response = self
                    .provider
                    .complete(request)
                    .await
                    .map_err(|error| RouteFailure::new(RouteKind::Model, error))?;

                Ok(RouteReply::answered(RouteKind::Model, response.text()).with_usage(response.usage))
            }
        }
    }
}

impl TurnRouter for KeywordRouter {
    fn mode(&self) -> RouterMode {
        RouterMode::Keyword
    }

    fn route<'a>(
        &'a self,
        session_id: &'a SessionId,
        _history: &'a [Turn],
        input: &'a str,
    ) -> ChatFuture<'a, Result<RouteReply, RouteFailure>> {
        Box::pin(async move {
            let decision = self.decide(input);
            tracing::info!(session = %session_id, route = %decision.kind(), "keyword route chosen");
            self.run(decision).await
        })
    }
}
