//! Parley: a conversational assistant over a hosted chat-completion model.
//!
//! This crate ties the workspace together. [`config`] resolves settings and
//! secrets, [`Assistant`] assembles the turn pipeline for the configured
//! [`RouterMode`], and [`server`] / [`repl`] expose it over HTTP or a terminal.
//!
//! ```rust,no_run
//! use parley::config::{Credentials, ParleyConfig};
//! use parley::Assistant;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ParleyConfig::load(None)?;
//! let assistant = Assistant::from_config(&config, Credentials::from_env(&config)?)?;
//! let reply = assistant.chat("default", "what time is it?").await?;
//! println!("{reply}");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod repl;
pub mod runtime;
pub mod server;

pub use pchat;
pub use pcommon;
pub use pobserve;
pub use pprovider;
pub use pservices;
pub use ptooling;

pub use config::{ConfigError, ConfigErrorKind, Credentials, ParleyConfig};
pub use pchat::{ChatError, ChatErrorKind, ChatTurnResult, RouteKind, RouterMode, TurnOutcome};
pub use pcommon::SessionId;
pub use runtime::{Assistant, Collaborators};

pub mod prelude {
    pub use crate::{
        Assistant, ChatError, Collaborators, Credentials, ParleyConfig, RouteKind, RouterMode,
        SessionId, TurnOutcome,
    };
}
