//! Delegated tool-calling turn strategy.
//!
//! The model sees the registered tool definitions and decides which to call.
//! Each round trip sends, in order: the system instructions, the session
//! history, the new input, and the tool exchanges made so far this turn.

use std::sync::Arc;

use pcommon::SessionId;
use pprovider::{Message, ModelProvider, ModelRequest, TokenUsage, ToolExchange};
use ptooling::{ToolExecutionContext, ToolExecutionResult, ToolRuntime};

use crate::{
    ChatFuture, FallbackKind, ModelSettings, RouteFailure, RouteKind, RouteReply, RouterMode,
    Turn, TurnOutcome, TurnRouter,
};

pub const DEFAULT_MAX_ITERATIONS: usize = 5;
pub const ITERATION_LIMIT_REPLY: &str = "Agent stopped due to iteration limit.";
pub const EMPTY_ANSWER_REPLY: &str = "No response generated.";

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful AI assistant.
You have access to tools for:
- Current date & time
- Weather lookup
- Web search

Use tools when required.
Be clear, concise, and conversational.";

pub struct DelegatedRouter {
    provider: Arc<dyn ModelProvider>,
    tools: Arc<dyn ToolRuntime>,
    settings: ModelSettings,
    system_prompt: String,
    max_iterations: usize,
}

impl DelegatedRouter {
    pub fn new(provider: Arc<dyn ModelProvider>, tools: Arc<dyn ToolRuntime>) -> Self {
        Self {
            provider,
            tools,
            settings: ModelSettings::default(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    pub fn with_model_settings(mut self, settings: ModelSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }

    /// At least one round trip is always made.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations.max(1);
        self
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// Fixed-order prompt preceding the scratchpad.
    pub fn context_messages(&self, history: &[Turn], input: &str) -> Vec<Message> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        if !self.system_prompt.trim().is_empty() {
            messages.push(Message::system(self.system_prompt.clone()));
        }
        messages.extend(history.iter().map(Turn::to_message));
        messages.push(Message::user(input));
        messages
    }

    async fn run(
        &self,
        session_id: &SessionId,
        history: &[Turn],
        input: &str,
    ) -> Result<RouteReply, RouteFailure> {
        let context = self.context_messages(history, input);
        let tool_definitions = self.tools.definitions();

        let mut scratchpad: Vec<ToolExchange> = Vec::new();
        let mut all_calls = Vec::new();
        let mut usage = TokenUsage::default();

        for iteration in 1..=self.max_iterations {
            let request = ModelRequest::builder(self.settings.model.clone())
                .messages(context.iter().cloned())
                .options(self.settings.options)
                .tools(tool_definitions.clone())
                .scratchpad(scratchpad.clone())
                .metadata("session_id", session_id.as_str())
                .build()
                .map_err(|error| RouteFailure::new(RouteKind::Delegated, error))?;

            let response = self
                .provider
                .complete(request)
                .await
                .map_err(|error| RouteFailure::new(RouteKind::Delegated, error))?;
            usage.accumulate(response.usage);

            let calls = response.tool_calls();
            if calls.is_empty() {
                let text = response.text();
                tracing::debug!(session = %session_id, iteration, "delegated turn answered");

                let reply = if text.trim().is_empty() {
                    RouteReply::answered(RouteKind::Delegated, EMPTY_ANSWER_REPLY).with_outcome(
                        TurnOutcome::fallback(FallbackKind::EmptyAnswer, "model returned no text"),
                    )
                } else {
                    RouteReply::answered(RouteKind::Delegated, text)
                };
                return Ok(reply.with_tool_calls(all_calls).with_usage(usage));
            }

            let tool_context = ToolExecutionContext::new(session_id.clone()).with_iteration(iteration);
            let mut results = Vec::with_capacity(calls.len());
            for call in &calls {
                let result = match self.tools.execute(call.clone(), tool_context.clone()).await {
                    Ok(result) => result,
                    Err(error) => ToolExecutionResult::from_error(call, &error),
                };
                results.push(result.into_tool_result());
            }

            tracing::debug!(
                session = %session_id,
                iteration,
                calls = calls.len(),
                "delegated tool exchange"
            );
            all_calls.extend(calls.iter().cloned());
            scratchpad.push(ToolExchange::new(calls, results));
        }

        tracing::warn!(
            session = %session_id,
            max_iterations = self.max_iterations,
            "delegated turn hit iteration limit"
        );
        Ok(RouteReply::answered(RouteKind::Delegated, ITERATION_LIMIT_REPLY)
            .with_outcome(TurnOutcome::fallback(
                FallbackKind::IterationLimit,
                format!("{} model round trips", self.max_iterations),
            ))
            .with_tool_calls(all_calls)
            .with_usage(usage))
    }
}

impl TurnRouter for DelegatedRouter {
    fn mode(&self) -> RouterMode {
        RouterMode::Delegated
    }

    fn route<'a>(
        &'a self,
        session_id: &'a SessionId,
        history: &'a [Turn],
        input: &'a str,
    ) -> ChatFuture<'a, Result<RouteReply, RouteFailure>> {
        Box::pin(self.run(session_id, history, input))
    }
}
