//! The contract every model-callable capability implements.
//!
//! ```rust
//! use pprovider::ToolDefinition;
//! use ptooling::{Tool, ToolError, ToolExecutionContext, ToolFuture};
//!
//! struct Uptime;
//!
//! impl Tool for Uptime {
//!     fn definition(&self) -> ToolDefinition {
//!         ToolDefinition {
//!             name: "uptime".to_string(),
//!             description: "Seconds since start".to_string(),
//!             input_schema: r#"{"type":"object","properties":{}}"#.to_string(),
//!         }
//!     }
//!
//!     fn invoke<'a>(
//!         &'a self,
//!         _args_json: &'a str,
//!         _context: &'a ToolExecutionContext,
//!     ) -> ToolFuture<'a, Result<String, ToolError>> {
//!         Box::pin(async { Ok("42".to_string()) })
//!     }
//! }
//!
//! assert_eq!(Uptime.definition().name, "uptime");
//! ```

use pcommon::BoxFuture;
use pprovider::ToolDefinition;

use crate::{ToolError, ToolExecutionContext};

pub type ToolFuture<'a, T> = BoxFuture<'a, T>;

/// A capability the model may call by name during a delegated turn.
///
/// `invoke` receives the raw JSON argument string chosen by the model.
pub trait Tool: Send + Sync {
    fn definition(&self) -> ToolDefinition;

    fn invoke<'a>(
        &'a self,
        args_json: &'a str,
        context: &'a ToolExecutionContext,
    ) -> ToolFuture<'a, Result<String, ToolError>>;
}
