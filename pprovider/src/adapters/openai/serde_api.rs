//! OpenAI chat-completions payload serde models.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{BackendRequest, Message, Role, ToolCall, ToolDefinition};

pub(crate) fn build_api_request(request: &BackendRequest) -> OpenAiApiRequest {
    let tools = if request.tools.is_empty() {
        None
    } else {
        Some(request.tools.iter().map(OpenAiApiTool::from).collect())
    };

    OpenAiApiRequest {
        model: request.model().to_string(),
        messages: request.messages.iter().map(OpenAiApiMessage::from).collect(),
        tools,
        temperature: request.options.temperature,
        max_tokens: request.options.max_tokens,
        stream: request.stream,
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct OpenAiApiRequest {
    pub model: String,
    pub messages: Vec<OpenAiApiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<OpenAiApiTool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    pub stream: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct OpenAiApiMessage {
    pub role: &'static str,
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<OpenAiApiToolCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl From<&Message> for OpenAiApiMessage {
    fn from(value: &Message) -> Self {
        // Assistant turns that only call tools are sent with null content.
        let content = if value.content.is_empty() && value.has_tool_calls() {
            None
        } else {
            Some(value.content.clone())
        };

        Self {
            role: value.role.as_str(),
            content,
            tool_calls: value.tool_calls.iter().map(OpenAiApiToolCall::from).collect(),
            tool_call_id: value.tool_call_id.clone(),
            name: match value.role {
                Role::Tool => None,
                _ => value.name.clone(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct OpenAiApiToolCall {
    pub id: String,
    pub r#type: &'static str,
    pub function: OpenAiApiFunctionCall,
}

impl From<&ToolCall> for OpenAiApiToolCall {
    fn from(value: &ToolCall) -> Self {
        Self {
            id: value.id.clone(),
            r#type: "function",
            function: OpenAiApiFunctionCall {
                name: value.name.clone(),
                arguments: value.arguments.clone(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct OpenAiApiFunctionCall {
    pub name: String,
    pub arguments: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct OpenAiApiTool {
    pub r#type: &'static str,
    pub function: OpenAiApiFunction,
}

impl From<&ToolDefinition> for OpenAiApiTool {
    fn from(value: &ToolDefinition) -> Self {
        Self {
            r#type: "function",
            function: OpenAiApiFunction {
                name: value.name.clone(),
                description: value.description.clone(),
                parameters: value.parameters.clone(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct OpenAiApiFunction {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// Shared shape of non-streaming responses and streaming chunks.
#[derive(Debug, Deserialize)]
pub(crate) struct OpenAiApiChunk {
    #[serde(default)]
    pub choices: Vec<OpenAiApiChoice>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAiApiChoice {
    pub message: Option<OpenAiApiReplyBody>,
    pub delta: Option<OpenAiApiReplyBody>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAiApiReplyBody {
    pub content: Option<String>,
    pub tool_calls: Option<Vec<OpenAiApiToolCallPart>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAiApiToolCallPart {
    pub index: Option<u32>,
    pub id: Option<String>,
    pub function: Option<OpenAiApiFunctionPart>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAiApiFunctionPart {
    pub name: Option<String>,
    pub arguments: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAiApiModelList {
    #[serde(default)]
    pub data: Vec<OpenAiApiModel>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAiApiModel {
    pub id: String,
}
