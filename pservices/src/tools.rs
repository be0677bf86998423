//! [`ptooling::Tool`] wrappers exposing each collaborator to the model.
//!
//! Collaborator failures never fail the call: the tool returns the same
//! display fallback the keyword router would show and logs the typed error.
//! Only malformed arguments surface as [`ToolError`]s.

use std::sync::Arc;

use pprovider::ToolDefinition;
use ptooling::{
    Tool, ToolError, ToolExecutionContext, ToolFuture, ToolRegistry, no_arguments,
    parse_json_object, required_string,
};

use crate::{Clock, DEFAULT_MAX_RESULTS, SearchService, WeatherFormat, WeatherService, weather_fallback};

pub const DATETIME_TOOL: &str = "get_current_datetime";
pub const WEATHER_TOOL: &str = "get_weather";
pub const WEB_SEARCH_TOOL: &str = "web_search";

pub struct DateTimeTool {
    clock: Arc<dyn Clock>,
}

impl DateTimeTool {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }
}

impl Tool for DateTimeTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: DATETIME_TOOL.to_string(),
            description: "Returns the current date and time.".to_string(),
            input_schema: r#"{"type":"object","properties":{}}"#.to_string(),
        }
    }

    fn invoke<'a>(
        &'a self,
        args_json: &'a str,
        _context: &'a ToolExecutionContext,
    ) -> ToolFuture<'a, Result<String, ToolError>> {
        Box::pin(async move {
            no_arguments(args_json)?;
            Ok(self.clock.current_datetime())
        })
    }
}

pub struct WeatherTool {
    weather: Arc<dyn WeatherService>,
}

impl WeatherTool {
    pub fn new(weather: Arc<dyn WeatherService>) -> Self {
        Self { weather }
    }
}

impl Tool for WeatherTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: WEATHER_TOOL.to_string(),
            description: "Returns the current weather for a city.".to_string(),
            input_schema: r#"{"type":"object","properties":{"city":{"type":"string","description":"City name"}},"required":["city"]}"#.to_string(),
        }
    }

    fn invoke<'a>(
        &'a self,
        args_json: &'a str,
        context: &'a ToolExecutionContext,
    ) -> ToolFuture<'a, Result<String, ToolError>> {
        Box::pin(async move {
            let args = parse_json_object(args_json)?;
            let city = required_string(&args, "city")?;

            match self.weather.lookup(&city, WeatherFormat::Json).await {
                Ok(report) => Ok(report),
                Err(error) => {
                    tracing::warn!(session = %context.session_id, %city, %error, "weather tool fell back");
                    Ok(weather_fallback(&city))
                }
            }
        })
    }
}

pub struct WebSearchTool {
    search: Arc<dyn SearchService>,
    max_results: usize,
}

impl WebSearchTool {
    pub fn new(search: Arc<dyn SearchService>) -> Self {
        Self {
            search,
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }
}

/// Display text used when a search call fails.
pub fn search_fallback(query: &str) -> String {
    format!("Could not search the web for \"{query}\"")
}

impl Tool for WebSearchTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: WEB_SEARCH_TOOL.to_string(),
            description: "Searches the web for recent information.".to_string(),
            input_schema: r#"{"type":"object","properties":{"query":{"type":"string","description":"Search query"}},"required":["query"]}"#.to_string(),
        }
    }

    fn invoke<'a>(
        &'a self,
        args_json: &'a str,
        context: &'a ToolExecutionContext,
    ) -> ToolFuture<'a, Result<String, ToolError>> {
        Box::pin(async move {
            let args = parse_json_object(args_json)?;
            let query = required_string(&args, "query")?;

            match self.search.search(&query, self.max_results).await {
                Ok(results) => Ok(results.digest()),
                Err(error) => {
                    tracing::warn!(session = %context.session_id, %error, "search tool fell back");
                    Ok(search_fallback(&query))
                }
            }
        })
    }
}

/// Registry holding the three assistant tools; searches return at most `max_results` hits.
pub fn assistant_tools(
    clock: Arc<dyn Clock>,
    weather: Arc<dyn WeatherService>,
    search: Arc<dyn SearchService>,
    max_results: usize,
) -> ToolRegistry {
    ToolRegistry::new()
        .with_tool(DateTimeTool::new(clock))
        .with_tool(WeatherTool::new(weather))
        .with_tool(WebSearchTool::new(search).with_max_results(max_results))
}
