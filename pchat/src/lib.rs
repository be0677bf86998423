//! Conversational turn pipeline: per-session history plus the two routing strategies.
//!
//! [`ChatService`] is the turn boundary. It owns a [`ConversationStore`] and a
//! [`TurnRouter`], either the [`KeywordRouter`] (fixed trigger rules, then a
//! single model call) or the [`DelegatedRouter`] (model-driven tool calling).

mod delegated;
mod error;
mod history;
mod hooks;
mod keyword;
mod router;
mod service;
mod store;
mod types;

pub mod prelude {
    pub use crate::{
        ChatError, ChatErrorKind, ChatService, ChatTurnRequest, ChatTurnResult,
        ConversationStore, DelegatedRouter, History, InMemoryConversationStore, KeywordRouter,
        ModelSettings, RouteKind, RouterMode, Turn, TurnOutcome, TurnRouter,
    };
    pub use pcommon::SessionId;
}

pub use delegated::{
    DEFAULT_MAX_ITERATIONS, DEFAULT_SYSTEM_PROMPT, DelegatedRouter, EMPTY_ANSWER_REPLY,
    ITERATION_LIMIT_REPLY,
};
pub use error::{ChatError, ChatErrorKind};
pub use history::{DEFAULT_HISTORY_CAPACITY, History, Speaker, Turn};
pub use hooks::{NoopTurnHooks, TurnHooks};
pub use keyword::{
    CityExtraction, DEFAULT_CITY, KeywordRouter, KeywordRule, KeywordRules, RouteDecision,
};
pub use pcommon::SessionId;
pub use router::{
    DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_TEMPERATURE, ModelSettings, RouteFailure,
    TurnRouter,
};
pub use service::ChatService;
pub use store::{
    ChatFuture, ConversationStore, InMemoryConversationStore, SessionGuard, SessionLocks,
};
pub use types::{
    ChatTurnRequest, ChatTurnResult, FallbackKind, RouteKind, RouteReply, RouterMode, TurnOutcome,
};
