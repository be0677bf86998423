//! Tool runtime context and execution result types.

use pcommon::SessionId;
use pprovider::{ToolCall, ToolResult};

use crate::ToolError;

/// Which conversation, and which model round trip of its turn, issued a call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolExecutionContext {
    pub session_id: SessionId,
    /// 1-based; 0 when the call did not come from the delegated loop.
    pub iteration: usize,
}

impl ToolExecutionContext {
    pub fn new(session_id: impl Into<SessionId>) -> Self {
        Self {
            session_id: session_id.into(),
            iteration: 0,
        }
    }

    pub fn with_iteration(mut self, iteration: usize) -> Self {
        self.iteration = iteration;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolExecutionResult {
    pub tool_call_id: String,
    pub output: String,
}

impl ToolExecutionResult {
    pub fn new(tool_call_id: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            output: output.into(),
        }
    }

    pub fn from_call(call: &ToolCall, output: impl Into<String>) -> Self {
        Self::new(call.id.clone(), output)
    }

    /// Failed call reported to the model as `Error: ...` output.
    pub fn from_error(call: &ToolCall, error: &ToolError) -> Self {
        Self::new(call.id.clone(), error.model_feedback())
    }

    pub fn into_tool_result(self) -> ToolResult {
        ToolResult {
            tool_call_id: self.tool_call_id,
            output: self.output,
        }
    }
}
