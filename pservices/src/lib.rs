//! Side collaborators the assistant can consult instead of (or on behalf of) the model.
//!
//! Every client returns a typed [`ServiceError`]; the rendered fallback strings
//! ([`weather_fallback`], [`NO_RESULTS`]) are applied by callers when a result
//! is flattened for display.

mod clock;
mod error;
mod search;
mod tools;
mod weather;

pub use clock::{Clock, DATETIME_FORMAT, DEFAULT_TIMEZONE, FixedClock, SystemClock};
pub use error::{ServiceError, ServiceErrorKind};
pub use search::{
    DEFAULT_MAX_RESULTS, DEFAULT_SEARCH_TIMEOUT, NO_RESULTS, SearchHit, SearchResults,
    SearchService, TAVILY_SEARCH_URL, TavilySearchClient,
};
pub use tools::{
    DATETIME_TOOL, DateTimeTool, WEATHER_TOOL, WEB_SEARCH_TOOL, WeatherTool, WebSearchTool,
    assistant_tools, search_fallback,
};
pub use weather::{
    DEFAULT_WEATHER_TIMEOUT, WTTR_BASE_URL, WeatherFormat, WeatherService, WttrWeatherClient,
    weather_fallback,
};
