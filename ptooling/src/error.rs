//! Why a tool call produced no output.
//!
//! None of these end a turn: the delegated loop hands
//! [`ToolError::model_feedback`] to the model as the call's result.
//!
//! ```rust
//! use ptooling::ToolError;
//!
//! let error = ToolError::invalid_arguments("missing required string: 'city'");
//! assert_eq!(error.model_feedback(), "Error: missing required string: 'city'");
//! ```

use std::error::Error;
use std::fmt::{Display, Formatter};

use pprovider::ToolCall;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolErrorKind {
    /// The model named a tool the registry does not hold.
    NotFound,
    InvalidArguments,
    Execution,
    Timeout,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolError {
    pub kind: ToolErrorKind,
    pub message: String,
    /// `(tool name, call id)` once the runtime knows which call failed.
    pub call: Option<(String, String)>,
}

impl ToolError {
    pub fn new(kind: ToolErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            call: None,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::NotFound, message)
    }

    pub fn invalid_arguments(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::InvalidArguments, message)
    }

    pub fn execution(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::Execution, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::Timeout, message)
    }

    pub fn for_call(mut self, call: &ToolCall) -> Self {
        self.call = Some((call.name.clone(), call.id.clone()));
        self
    }

    pub fn tool_name(&self) -> Option<&str> {
        self.call.as_ref().map(|(name, _)| name.as_str())
    }

    /// Text handed back to the model in place of a tool output.
    pub fn model_feedback(&self) -> String {
        format!("Error: {}", self.message)
    }
}

impl Display for ToolError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.call {
            Some((name, id)) => write!(f, "{:?} in {name} ({id}): {}", self.kind, self.message),
            None => write!(f, "{:?}: {}", self.kind, self.message),
        }
    }
}

impl Error for ToolError {}
