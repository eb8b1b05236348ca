//! Ollama `/api/chat` request bodies and reply normalization.
//!
//! Ollama replies carry tool calls complete (never as argument deltas), either as
//! a `tool_calls` array, a single object, or a `tool_call` field. Argument
//! objects are re-serialized to JSON text and missing ids are synthesized.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{BackendRequest, Frame, Message, ProviderError, ReplyDelta, ToolCall, ToolDefinition};

use super::sentinel::{ExtractedCall, SentinelExtractor, SentinelOutput};

pub const CHAT_PATH: &str = "api/chat";
pub const MODELS_PATH: &str = "api/tags";
pub const GENERATE_PATH: &str = "api/generate";
pub const SHOW_PATH: &str = "api/show";

pub(crate) fn request_body(request: &BackendRequest) -> Result<Value, ProviderError> {
    let tools = if request.tools.is_empty() {
        None
    } else {
        Some(request.tools.iter().map(OllamaApiTool::from).collect())
    };

    let options = (!request.options.is_empty()).then(|| OllamaApiOptions {
        temperature: request.options.temperature,
        num_predict: request.options.max_tokens,
    });

    let body = OllamaApiRequest {
        model: request.model().to_string(),
        messages: request.messages.iter().map(OllamaApiMessage::from).collect(),
        tools,
        options,
        stream: request.stream,
    };

    serde_json::to_value(body)
        .map_err(|err| ProviderError::invalid_request(format!("unserializable request: {err}")))
}

pub(crate) fn parse_model_list(body: &Value) -> Result<Vec<String>, ProviderError> {
    let parsed = serde_json::from_value::<OllamaTagsResponse>(body.clone())
        .map_err(|err| ProviderError::decode(body.to_string(), err.to_string()))?;

    let mut ids = parsed
        .models
        .into_iter()
        .map(|m| m.name)
        .collect::<Vec<_>>();
    ids.sort();
    Ok(ids)
}

/// Body for a streamed `/api/generate` completion.
pub(crate) fn generate_body(model: &str, prompt: &str) -> Result<Value, ProviderError> {
    serde_json::to_value(OllamaGenerateRequest {
        model,
        prompt,
        stream: true,
    })
    .map_err(|err| ProviderError::invalid_request(format!("unserializable request: {err}")))
}

pub(crate) fn show_body(model: &str) -> Value {
    serde_json::json!({ "model": model })
}

/// Text carried by one `/api/generate` record. Records without a `response`
/// field contribute nothing; error records fail the completion.
pub(crate) fn generated_text<'a>(selector: &str, record: &'a Value) -> Result<&'a str, ProviderError> {
    if let Some(error) = record.get("error") {
        return Err(ProviderError::transport(selector, super::error_message(error)));
    }
    Ok(record.get("response").and_then(Value::as_str).unwrap_or_default())
}

#[derive(Debug)]
pub struct OllamaNormalizer {
    selector: String,
    sentinel: SentinelExtractor,
    calls: Vec<ToolCall>,
}

impl OllamaNormalizer {
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            sentinel: SentinelExtractor::default(),
            calls: Vec::new(),
        }
    }

    pub fn normalize(&mut self, frame: &Frame) -> Result<Vec<ReplyDelta>, ProviderError> {
        if let Some(error) = frame.value.get("error") {
            return Err(ProviderError::transport(
                self.selector.clone(),
                super::error_message(error),
            ));
        }

        let message = frame.value.get("message").unwrap_or(&frame.value);
        let known = self.calls.len();
        let mut deltas = Vec::new();

        if let Some(content) = message.get("content").and_then(Value::as_str) {
            let output = self.sentinel.push(content);
            self.absorb(output, &mut deltas);
        }

        let native = message
            .get("tool_calls")
            .filter(|value| !value.is_null())
            .or_else(|| message.get("tool_call"));
        match native {
            Some(Value::Array(entries)) => {
                for entry in entries {
                    self.push_native(entry);
                }
            }
            Some(entry) if entry.is_object() => self.push_native(entry),
            _ => {}
        }

        if self.calls.len() > known {
            deltas.push(ReplyDelta::ToolCalls(self.calls.clone()));
        }

        Ok(deltas)
    }

    pub fn finish(&mut self) -> Vec<ReplyDelta> {
        let known = self.calls.len();
        let mut deltas = Vec::new();
        let output = self.sentinel.finish();
        self.absorb(output, &mut deltas);

        if self.calls.len() > known {
            deltas.push(ReplyDelta::ToolCalls(self.calls.clone()));
        }
        deltas
    }

    fn absorb(&mut self, output: SentinelOutput, deltas: &mut Vec<ReplyDelta>) {
        if !output.text.is_empty() {
            deltas.push(ReplyDelta::Content(output.text));
        }
        for ExtractedCall { name, arguments } in output.calls {
            let id = self.next_id();
            self.calls.push(ToolCall::new(id, name, arguments));
        }
    }

    fn push_native(&mut self, entry: &Value) {
        let function = entry.get("function").unwrap_or(entry);
        let Some(name) = function
            .get("name")
            .and_then(Value::as_str)
            .filter(|name| !name.is_empty())
        else {
            return;
        };

        let arguments = match function.get("arguments") {
            Some(Value::String(text)) if !text.trim().is_empty() => text.clone(),
            Some(Value::Null) | Some(Value::String(_)) | None => "{}".to_string(),
            Some(other) => other.to_string(),
        };

        let id = entry
            .get("id")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| self.next_id());

        self.calls.push(ToolCall::new(id, name, arguments));
    }

    fn next_id(&self) -> String {
        format!("call_{}", self.calls.len())
    }
}

#[derive(Debug, Serialize)]
struct OllamaApiRequest {
    model: String,
    messages: Vec<OllamaApiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<OllamaApiTool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<OllamaApiOptions>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct OllamaApiOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

#[derive(Debug, Serialize)]
struct OllamaApiMessage {
    role: &'static str,
    content: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<OllamaApiToolCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_name: Option<String>,
}

impl From<&Message> for OllamaApiMessage {
    fn from(value: &Message) -> Self {
        Self {
            role: value.role.as_str(),
            content: value.content.clone(),
            tool_calls: value.tool_calls.iter().map(OllamaApiToolCall::from).collect(),
            tool_name: value.tool_call_id.as_ref().and(value.name.clone()),
        }
    }
}

#[derive(Debug, Serialize)]
struct OllamaApiToolCall {
    function: OllamaApiFunctionCall,
}

impl From<&ToolCall> for OllamaApiToolCall {
    fn from(value: &ToolCall) -> Self {
        // Ollama expects argument objects, not JSON text.
        let arguments = serde_json::from_str::<Value>(&value.arguments)
            .unwrap_or_else(|_| Value::String(value.arguments.clone()));

        Self {
            function: OllamaApiFunctionCall {
                name: value.name.clone(),
                arguments,
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct OllamaApiFunctionCall {
    name: String,
    arguments: Value,
}

#[derive(Debug, Serialize)]
struct OllamaApiTool {
    r#type: &'static str,
    function: OllamaApiFunction,
}

impl From<&ToolDefinition> for OllamaApiTool {
    fn from(value: &ToolDefinition) -> Self {
        Self {
            r#type: "function",
            function: OllamaApiFunction {
                name: value.name.clone(),
                description: value.description.clone(),
                parameters: value.parameters.clone(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct OllamaApiFunction {
    name: String,
    description: String,
    parameters: Value,
}

#[derive(Debug, Deserialize)]
struct OllamaTagsResponse {
    #[serde(default)]
    models: Vec<OllamaModelTag>,
}

#[derive(Debug, Deserialize)]
struct OllamaModelTag {
    name: String,
}

#[derive(Debug, Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}
