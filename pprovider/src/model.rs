//! Backend-agnostic conversation, tool, and reply types.
//!
//! ```rust
//! use pprovider::{Message, Reply, Role, ToolCall};
//!
//! let call = ToolCall::new("1", "get_current_weather", r#"{"location":"Warsaw"}"#);
//! let reply = Reply::new("").with_tool_calls(vec![call.clone()]);
//! let message = reply.into_message();
//!
//! assert_eq!(message.role, Role::Assistant);
//! assert_eq!(message.tool_calls, vec![call]);
//! ```

use std::fmt::{Display, Formatter};

use pcommon::GenerationOptions;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{BackendConfig, ProviderError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Tool => "tool",
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
            name: None,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Answers the tool call `tool_call_id` with already-serialized result JSON.
    pub fn tool_result(
        tool_call_id: impl Into<String>,
        name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            role: Role::Tool,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: Some(tool_call_id.into()),
            name: Some(name.into()),
        }
    }

    pub fn with_tool_calls(mut self, tool_calls: Vec<ToolCall>) -> Self {
        self.tool_calls = tool_calls;
        self
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

impl ToolDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>, parameters: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }
}

/// A model's request to run a registered tool. `arguments` is the raw JSON text
/// exactly as the backend produced it and may not be valid JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: String,
}

impl ToolCall {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments: arguments.into(),
        }
    }
}

/// One backend reply after all of its frames have been folded together.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Reply {
    pub content: String,
    pub tool_calls: Vec<ToolCall>,
}

impl Reply {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            tool_calls: Vec::new(),
        }
    }

    pub fn with_tool_calls(mut self, tool_calls: Vec<ToolCall>) -> Self {
        self.tool_calls = tool_calls;
        self
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }

    pub fn into_message(self) -> Message {
        Message::assistant(self.content).with_tool_calls(self.tool_calls)
    }
}

/// A piece of a tool call streamed as argument text deltas. Backends that stream
/// calls this way send the id and name once and the arguments over many deltas.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ToolCallFragment {
    pub index: u32,
    pub id: Option<String>,
    pub name: Option<String>,
    pub arguments: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyDelta {
    Content(String),
    ToolCallFragment(ToolCallFragment),
    /// A complete set of tool calls. A later non-empty set replaces an earlier one.
    ToolCalls(Vec<ToolCall>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct BackendRequest {
    pub config: BackendConfig,
    pub model: Option<String>,
    pub messages: Vec<Message>,
    pub tools: Vec<ToolDefinition>,
    pub options: GenerationOptions,
    pub stream: bool,
}

impl BackendRequest {
    pub fn new(config: BackendConfig, messages: Vec<Message>) -> Self {
        Self {
            config,
            model: None,
            messages,
            tools: Vec::new(),
            options: GenerationOptions::default(),
            stream: false,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn streaming(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    /// The model named on the request, or the backend's default.
    pub fn model(&self) -> &str {
        match self.model.as_deref() {
            Some(model) if !model.trim().is_empty() => model,
            _ => &self.config.default_model,
        }
    }

    pub fn validate(&self) -> Result<(), ProviderError> {
        if self.config.framing.is_none() {
            return Err(ProviderError::invalid_request(format!(
                "backend '{}' does not accept chat-completion requests",
                self.config.selector
            )));
        }

        if self.model().trim().is_empty() {
            return Err(ProviderError::invalid_request("model must not be empty"));
        }

        if self.messages.is_empty() {
            return Err(ProviderError::invalid_request(
                "at least one message is required",
            ));
        }

        if let Some(max_tokens) = self.options.max_tokens
            && max_tokens == 0
        {
            return Err(ProviderError::invalid_request(
                "max_tokens must be greater than zero",
            ));
        }

        if let Some(temperature) = self.options.temperature
            && !(0.0..=2.0).contains(&temperature)
        {
            return Err(ProviderError::invalid_request(
                "temperature must be in the inclusive range 0.0..=2.0",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ProviderErrorKind, ProviderSelector};

    fn ollama() -> BackendConfig {
        ProviderSelector::new()
            .resolve(Some("ollama"))
            .expect("ollama should resolve")
    }

    #[test]
    fn request_falls_back_to_backend_default_model() {
        let request = BackendRequest::new(ollama(), vec![Message::user("hi")]);
        assert_eq!(request.model(), crate::OLLAMA_DEFAULT_MODEL);

        let request = request.with_model("llama3.2");
        assert_eq!(request.model(), "llama3.2");

        let blank = BackendRequest::new(ollama(), vec![Message::user("hi")]).with_model("  ");
        assert_eq!(blank.model(), crate::OLLAMA_DEFAULT_MODEL);
    }

    #[test]
    fn validate_rejects_bad_requests() {
        let empty = BackendRequest::new(ollama(), Vec::new());
        assert_eq!(
            empty.validate().expect_err("no messages").kind(),
            ProviderErrorKind::InvalidRequest
        );

        let hot = BackendRequest::new(ollama(), vec![Message::user("hi")])
            .with_options(GenerationOptions::default().with_temperature(3.0));
        assert!(hot.validate().is_err());

        let broadcast = ProviderSelector::new()
            .resolve(Some("local"))
            .expect("local should resolve");
        let request = BackendRequest::new(broadcast, vec![Message::user("hi")]);
        assert!(request.validate().is_err());
    }

    #[test]
    fn message_serializes_without_empty_optional_fields() {
        let json = serde_json::to_value(Message::user("hello")).expect("serialize");
        assert_eq!(json, serde_json::json!({"role": "user", "content": "hello"}));

        let tool = Message::tool_result("call_1", "lookup", "{\"ok\":true}");
        let json = serde_json::to_value(&tool).expect("serialize");
        assert_eq!(json["tool_call_id"], "call_1");
        assert_eq!(json["name"], "lookup");
    }
}
