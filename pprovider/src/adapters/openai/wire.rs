//! Chat-completions JSON payloads and their mapping to the shared model types.
//!
//! Requests are built from a [`ModelRequest`]: the conversation messages
//! first, then each scratchpad exchange as one assistant `tool_calls`
//! message followed by its `tool` results.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    Message, ModelRequest, ModelResponse, OutputItem, ProviderError, ProviderId, Role, StopReason,
    TokenUsage, ToolCall, ToolDefinition, ToolExchange,
};

const FUNCTION: &str = "function";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireRole {
    System,
    User,
    Assistant,
    Tool,
}

impl From<Role> for WireRole {
    fn from(role: Role) -> Self {
        match role {
            Role::System => Self::System,
            Role::User => Self::User,
            Role::Assistant => Self::Assistant,
            Role::Tool => Self::Tool,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<WireTool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    pub stream: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WireMessage {
    pub role: WireRole,
    /// `null` on assistant turns that only request tools.
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<WireToolCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireToolCall {
    pub id: String,
    #[serde(rename = "type", default = "function_type")]
    pub kind: String,
    pub function: WireFunctionCall,
}

fn function_type() -> String {
    FUNCTION.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireFunctionCall {
    pub name: String,
    pub arguments: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WireTool {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub function: WireFunction,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WireFunction {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

impl From<ToolCall> for WireToolCall {
    fn from(call: ToolCall) -> Self {
        Self {
            id: call.id,
            kind: function_type(),
            function: WireFunctionCall {
                name: call.name,
                arguments: call.arguments,
            },
        }
    }
}

impl From<WireToolCall> for ToolCall {
    fn from(call: WireToolCall) -> Self {
        Self {
            id: call.id,
            name: call.function.name,
            arguments: call.function.arguments,
        }
    }
}

impl TryFrom<ToolDefinition> for WireTool {
    type Error = ProviderError;

    fn try_from(tool: ToolDefinition) -> Result<Self, Self::Error> {
        let parameters = serde_json::from_str::<Value>(&tool.input_schema).map_err(|err| {
            ProviderError::invalid_request(format!("tool '{}' has an invalid schema: {err}", tool.name))
        })?;

        Ok(Self {
            kind: FUNCTION,
            function: WireFunction {
                name: tool.name,
                description: tool.description,
                parameters,
            },
        })
    }
}

impl TryFrom<Message> for WireMessage {
    type Error = ProviderError;

    fn try_from(message: Message) -> Result<Self, Self::Error> {
        if message.content.trim().is_empty() && message.role != Role::Tool {
            return Err(ProviderError::invalid_request(format!(
                "{:?} message content must not be empty",
                message.role
            )));
        }

        Ok(Self {
            role: message.role.into(),
            content: Some(message.content),
            tool_calls: Vec::new(),
            tool_call_id: None,
        })
    }
}

fn exchange_messages(exchange: ToolExchange) -> impl Iterator<Item = WireMessage> {
    let request = WireMessage {
        role: WireRole::Assistant,
        content: None,
        tool_calls: exchange.calls.into_iter().map(WireToolCall::from).collect(),
        tool_call_id: None,
    };
    let results = exchange.results.into_iter().map(|result| WireMessage {
        role: WireRole::Tool,
        content: Some(result.output),
        tool_calls: Vec::new(),
        tool_call_id: Some(result.tool_call_id),
    });

    std::iter::once(request).chain(results)
}

impl ChatCompletionRequest {
    /// Non-streaming request body; `fallback_model` replaces a blank model id.
    pub fn from_model_request(
        request: ModelRequest,
        fallback_model: &str,
    ) -> Result<Self, ProviderError> {
        let model = if request.model.trim().is_empty() {
            fallback_model.to_string()
        } else {
            request.model
        };

        let mut messages = request
            .messages
            .into_iter()
            .map(WireMessage::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        if messages.is_empty() {
            return Err(ProviderError::invalid_request(
                "chat completion request requires at least one message",
            ));
        }
        messages.extend(request.scratchpad.into_iter().flat_map(exchange_messages));

        let tools = request
            .tools
            .into_iter()
            .map(WireTool::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            model,
            messages,
            tools,
            temperature: request.options.temperature,
            max_tokens: request.options.max_tokens,
            stream: false,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChatCompletionResponse {
    pub model: String,
    pub choices: Vec<WireChoice>,
    #[serde(default)]
    pub usage: Option<WireUsage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WireChoice {
    pub message: WireAssistantMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WireAssistantMessage {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub tool_calls: Option<Vec<WireToolCall>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct WireUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

pub fn stop_reason(finish_reason: Option<&str>) -> StopReason {
    match finish_reason {
        Some("stop") => StopReason::EndTurn,
        Some("length") => StopReason::MaxTokens,
        Some("tool_calls" | "function_call") => StopReason::ToolUse,
        _ => StopReason::Other,
    }
}

impl ChatCompletionResponse {
    /// First choice as a [`ModelResponse`]; a response without choices is malformed.
    pub fn into_model_response(self, provider: ProviderId) -> Result<ModelResponse, ProviderError> {
        let choice = self
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::malformed("chat completion did not include choices"))?;

        let mut output = Vec::new();
        if let Some(text) = choice.message.content.filter(|text| !text.is_empty()) {
            output.push(OutputItem::Message(Message::assistant(text)));
        }
        output.extend(
            choice
                .message
                .tool_calls
                .unwrap_or_default()
                .into_iter()
                .map(|call| OutputItem::ToolCall(call.into())),
        );

        let usage = self.usage.unwrap_or_default();
        Ok(ModelResponse {
            provider,
            model: self.model,
            output,
            stop_reason: stop_reason(choice.finish_reason.as_deref()),
            usage: TokenUsage {
                input_tokens: usage.prompt_tokens,
                output_tokens: usage.completion_tokens,
                total_tokens: usage.total_tokens,
            },
        })
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// `error.message` from an OpenAI-style error body, if the body is one.
pub(crate) fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .map(|envelope| envelope.error.message)
}
