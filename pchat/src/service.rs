//! Turn boundary: serializes a session, routes the input, records the exchange.
//!
//! Route failures never escape [`ChatService::run_turn`]; they become a
//! `⚠️ Error: ...` reply with a [`TurnOutcome::Failed`] outcome and the turn
//! is recorded like any other.

use std::sync::Arc;
use std::time::Instant;

use pprovider::TokenUsage;

use crate::{
    ChatError, ChatTurnRequest, ChatTurnResult, ConversationStore, NoopTurnHooks, RouteReply,
    RouterMode, SessionLocks, Turn, TurnHooks, TurnOutcome, TurnRouter,
};

#[derive(Clone)]
pub struct ChatService {
    router: Arc<dyn TurnRouter>,
    store: Arc<dyn ConversationStore>,
    locks: Arc<SessionLocks>,
    hooks: Arc<dyn TurnHooks>,
}

impl ChatService {
    pub fn new(router: Arc<dyn TurnRouter>, store: Arc<dyn ConversationStore>) -> Self {
        Self {
            router,
            store,
            locks: Arc::new(SessionLocks::new()),
            hooks: Arc::new(NoopTurnHooks),
        }
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn TurnHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn mode(&self) -> RouterMode {
        self.router.mode()
    }

    pub fn store(&self) -> Arc<dyn ConversationStore> {
        Arc::clone(&self.store)
    }

    pub async fn run_turn(&self, request: ChatTurnRequest) -> Result<ChatTurnResult, ChatError> {
        let session_id = request.session_id.clone();
        let result = self.run_locked(request).await;
        if let Err(error) = &result {
            tracing::warn!(session = %session_id, %error, "turn rejected");
            self.hooks.on_turn_error(&session_id, error);
        }
        result
    }

    async fn run_locked(&self, request: ChatTurnRequest) -> Result<ChatTurnResult, ChatError> {
        let ChatTurnRequest {
            session_id,
            user_input,
        } = request;

        if user_input.trim().is_empty() {
            return Err(ChatError::invalid_request("user_input must not be empty"));
        }

        let _guard = self.locks.acquire(&session_id).await?;
        self.hooks.on_turn_start(&session_id, self.router.mode());
        let started = Instant::now();

        let history = self.store.load(&session_id).await?;
        let reply = match self.router.route(&session_id, &history, &user_input).await {
            Ok(reply) => reply,
            Err(failure) => {
                tracing::warn!(
                    session = %session_id,
                    route = %failure.route,
                    error = %failure.error,
                    "route failed"
                );
                RouteReply {
                    route: failure.route,
                    text: failure.error.display_reply(),
                    outcome: TurnOutcome::Failed {
                        kind: failure.error.kind,
                        detail: failure.error.message,
                    },
                    tool_calls: Vec::new(),
                    usage: TokenUsage::default(),
                }
            }
        };

        self.store
            .append(
                &session_id,
                vec![Turn::user(user_input), Turn::assistant(reply.text.clone())],
            )
            .await?;

        let result = ChatTurnResult {
            session_id,
            assistant_message: reply.text,
            route: reply.route,
            outcome: reply.outcome,
            tool_calls: reply.tool_calls,
            usage: reply.usage,
        };

        tracing::info!(
            session = %result.session_id,
            route = %result.route,
            outcome = result.outcome.label(),
            "turn recorded"
        );
        self.hooks.on_turn_complete(&result, started.elapsed());
        Ok(result)
    }
}
