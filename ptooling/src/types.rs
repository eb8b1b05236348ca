//! Tool runtime context and execution result types.

use pcommon::{ExchangeId, MetadataMap, TraceId};
use pprovider::{Message, ToolCall};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolExecutionContext {
    pub exchange_id: ExchangeId,
    pub trace_id: Option<TraceId>,
    pub metadata: MetadataMap,
}

impl ToolExecutionContext {
    pub fn new(exchange_id: impl Into<ExchangeId>) -> Self {
        Self {
            exchange_id: exchange_id.into(),
            trace_id: None,
            metadata: MetadataMap::new(),
        }
    }

    pub fn with_trace_id(mut self, trace_id: impl Into<TraceId>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Outcome of one tool call. Failures are carried as `{"error": ...}` output
/// with `is_error` set, never as an `Err`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolExecutionResult {
    pub tool_call_id: String,
    pub tool_name: String,
    pub output: Value,
    pub is_error: bool,
}

impl ToolExecutionResult {
    pub fn from_call(call: &ToolCall, output: Value, is_error: bool) -> Self {
        Self {
            tool_call_id: call.id.clone(),
            tool_name: call.name.clone(),
            output,
            is_error,
        }
    }

    /// JSON text placed in the tool message.
    pub fn content(&self) -> String {
        self.output.to_string()
    }

    pub fn into_message(self) -> Message {
        let content = self.content();
        Message::tool_result(self.tool_call_id, self.tool_name, content)
    }
}
