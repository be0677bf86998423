//! Name-keyed set of the tools offered to the model.

use std::sync::Arc;

use pcommon::Registry;
use pprovider::ToolDefinition;

use crate::Tool;

#[derive(Default)]
pub struct ToolRegistry {
    tools: Registry<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `tool` under its definition name; a later tool with the same name wins.
    pub fn with_tool<T>(mut self, tool: T) -> Self
    where
        T: Tool + 'static,
    {
        let name = tool.definition().name;
        if self.tools.insert(name.clone(), Arc::new(tool)).is_some() {
            tracing::debug!(tool = %name, "replaced registered tool");
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Definitions in name order, as advertised to the model.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|tool| tool.definition()).collect()
    }
}
