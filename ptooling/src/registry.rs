//! Tool registry with lookup by tool definition name.

use std::future::Future;
use std::sync::Arc;

use pcommon::Registry;
use pprovider::ToolDefinition;
use serde_json::Value;

use crate::{FunctionTool, NOT_IMPLEMENTED, Tool, ToolError, ToolExecutionContext, parse_json_value};

#[derive(Default)]
pub struct ToolRegistry {
    tools: Registry<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `tool` under its definition name, replacing any earlier tool
    /// with the same name.
    pub fn register<T>(&mut self, tool: T)
    where
        T: Tool + 'static,
    {
        let name = tool.definition().name;
        self.tools.insert(name, Arc::new(tool));
    }

    pub fn register_fn<F, Fut>(&mut self, definition: ToolDefinition, handler: F)
    where
        F: Fn(Value, ToolExecutionContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, ToolError>> + Send + 'static,
    {
        self.register(FunctionTool::new(definition, handler));
    }

    pub fn register_sync_fn<F>(&mut self, definition: ToolDefinition, handler: F)
    where
        F: Fn(Value, ToolExecutionContext) -> Result<Value, ToolError> + Send + Sync + 'static,
    {
        self.register_fn(definition, move |args, context| {
            let output = handler(args, context);
            async move { output }
        });
    }

    pub fn lookup(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.remove(name)
    }

    /// Definitions in name order.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|tool| tool.definition()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Looks up `name`, parses `args_json`, and runs the tool.
    pub async fn try_invoke(
        &self,
        name: &str,
        args_json: &str,
        context: &ToolExecutionContext,
    ) -> Result<Value, ToolError> {
        let tool = self
            .lookup(name)
            .ok_or_else(|| ToolError::not_found(NOT_IMPLEMENTED))?;
        let args = parse_json_value(args_json)?;
        tool.invoke(args, context).await
    }

    /// Like [`try_invoke`](Self::try_invoke) but failures come back as
    /// `{"error": message}` values.
    pub async fn invoke(&self, name: &str, args_json: &str, context: &ToolExecutionContext) -> Value {
        match self.try_invoke(name, args_json, context).await {
            Ok(value) => value,
            Err(error) => error.to_result_value(),
        }
    }
}
