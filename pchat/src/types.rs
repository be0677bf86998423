//! Turn request, result, and outcome types.

use std::fmt::{Display, Formatter};

use pcommon::SessionId;
use pprovider::{TokenUsage, ToolCall};

use crate::ChatErrorKind;

/// Which turn strategy a [`crate::ChatService`] is assembled with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RouterMode {
    #[default]
    Keyword,
    Delegated,
}

impl RouterMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "keyword" | "keywords" => Some(Self::Keyword),
            "delegated" | "agent" | "tools" => Some(Self::Delegated),
            _ => None,
        }
    }
}

impl Display for RouterMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Keyword => "keyword",
            Self::Delegated => "delegated",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    Clock,
    Weather,
    Search,
    Model,
    Delegated,
}

impl RouteKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Clock => "clock",
            Self::Weather => "weather",
            Self::Search => "search",
            Self::Model => "model",
            Self::Delegated => "delegated",
        }
    }
}

impl Display for RouteKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackKind {
    WeatherUnavailable,
    IterationLimit,
    EmptyAnswer,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    Answered,
    Fallback { kind: FallbackKind, detail: String },
    Failed { kind: ChatErrorKind, detail: String },
}

impl TurnOutcome {
    pub fn fallback(kind: FallbackKind, detail: impl Into<String>) -> Self {
        Self::Fallback {
            kind,
            detail: detail.into(),
        }
    }

    pub fn is_answered(&self) -> bool {
        matches!(self, Self::Answered)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Answered => "answered",
            Self::Fallback { .. } => "fallback",
            Self::Failed { .. } => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurnRequest {
    pub session_id: SessionId,
    pub user_input: String,
}

impl ChatTurnRequest {
    pub fn new(session_id: impl Into<SessionId>, user_input: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            user_input: user_input.into(),
        }
    }
}

/// What a router produced for one input, before it is recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteReply {
    pub route: RouteKind,
    pub text: String,
    pub outcome: TurnOutcome,
    pub tool_calls: Vec<ToolCall>,
    pub usage: TokenUsage,
}

impl RouteReply {
    pub fn answered(route: RouteKind, text: impl Into<String>) -> Self {
        Self {
            route,
            text: text.into(),
            outcome: TurnOutcome::Answered,
            tool_calls: Vec::new(),
            usage: TokenUsage::default(),
        }
    }

    pub fn with_outcome(mut self, outcome: TurnOutcome) -> Self {
        self.outcome = outcome;
        self
    }

    pub fn with_usage(mut self, usage: TokenUsage) -> Self {
        self.usage = usage;
        self
    }

    pub fn with_tool_calls(mut self, tool_calls: Vec<ToolCall>) -> Self {
        self.tool_calls = tool_calls;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurnResult {
    pub session_id: SessionId,
    pub assistant_message: String,
    pub route: RouteKind,
    pub outcome: TurnOutcome,
    pub tool_calls: Vec<ToolCall>,
    pub usage: TokenUsage,
}
