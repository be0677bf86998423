//! Turn strategy contract shared by the keyword and delegated routers.

use pcommon::{GenerationOptions, SessionId};

use crate::{ChatError, ChatFuture, RouteKind, RouteReply, RouterMode, Turn};

pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Model id and sampling options used for every completion a router issues.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSettings {
    pub model: String,
    pub options: GenerationOptions,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            options: GenerationOptions::new(DEFAULT_TEMPERATURE, DEFAULT_MAX_TOKENS),
        }
    }
}

impl ModelSettings {
    pub fn new(model: impl Into<String>, options: GenerationOptions) -> Self {
        Self {
            model: model.into(),
            options,
        }
    }
}

/// A route that could not produce a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteFailure {
    pub route: RouteKind,
    pub error: ChatError,
}

impl RouteFailure {
    pub fn new(route: RouteKind, error: impl Into<ChatError>) -> Self {
        Self {
            route,
            error: error.into(),
        }
    }
}

pub trait TurnRouter: Send + Sync {
    fn mode(&self) -> RouterMode;

    /// Produces the assistant reply for `input` given the session's prior turns.
    fn route<'a>(
        &'a self,
        session_id: &'a SessionId,
        history: &'a [Turn],
        input: &'a str,
    ) -> ChatFuture<'a, Result<RouteReply, RouteFailure>>;
}
