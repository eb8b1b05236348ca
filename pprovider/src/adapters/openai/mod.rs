//! OpenAI chat-completions request bodies and reply normalization.

mod serde_api;
mod tests;

use serde_json::Value;

use crate::{BackendRequest, Frame, ProviderError, ReplyDelta, ToolCall, ToolCallFragment};

use serde_api::{OpenAiApiChunk, OpenAiApiModelList, OpenAiApiReplyBody, build_api_request};

pub const CHAT_PATH: &str = "chat/completions";
pub const MODELS_PATH: &str = "models";

pub(crate) fn request_body(request: &BackendRequest) -> Result<Value, ProviderError> {
    serde_json::to_value(build_api_request(request))
        .map_err(|err| ProviderError::invalid_request(format!("unserializable request: {err}")))
}

pub(crate) fn parse_model_list(body: &Value) -> Result<Vec<String>, ProviderError> {
    let parsed = serde_json::from_value::<OpenAiApiModelList>(body.clone())
        .map_err(|err| ProviderError::decode(body.to_string(), err.to_string()))?;

    let mut ids = parsed.data.into_iter().map(|model| model.id).collect::<Vec<_>>();
    ids.sort();
    Ok(ids)
}

/// Maps `choices[0].message` (complete replies) and `choices[0].delta`
/// (streamed chunks) onto reply deltas.
#[derive(Debug)]
pub struct OpenAiNormalizer {
    selector: String,
}

impl OpenAiNormalizer {
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
        }
    }

    pub fn normalize(&mut self, frame: &Frame) -> Result<Vec<ReplyDelta>, ProviderError> {
        if let Some(error) = frame.value.get("error") {
            return Err(ProviderError::transport(
                self.selector.clone(),
                super::error_message(error),
            ));
        }

        let chunk = serde_json::from_value::<OpenAiApiChunk>(frame.value.clone())
            .map_err(|err| ProviderError::decode(frame.value.to_string(), err.to_string()))?;

        let Some(choice) = chunk.choices.into_iter().next() else {
            return Ok(Vec::new());
        };

        let mut deltas = Vec::new();
        if let Some(message) = choice.message {
            push_content(&mut deltas, &message);
            let calls = complete_calls(message);
            if !calls.is_empty() {
                deltas.push(ReplyDelta::ToolCalls(calls));
            }
        }

        if let Some(delta) = choice.delta {
            push_content(&mut deltas, &delta);
            for (position, part) in delta.tool_calls.unwrap_or_default().into_iter().enumerate() {
                let function = part.function;
                deltas.push(ReplyDelta::ToolCallFragment(ToolCallFragment {
                    index: part.index.unwrap_or(position as u32),
                    id: part.id,
                    name: function.as_ref().and_then(|function| function.name.clone()),
                    arguments: function
                        .and_then(|function| function.arguments)
                        .unwrap_or_default(),
                }));
            }
        }

        Ok(deltas)
    }
}

fn push_content(deltas: &mut Vec<ReplyDelta>, body: &OpenAiApiReplyBody) {
    if let Some(content) = body.content.as_deref()
        && !content.is_empty()
    {
        deltas.push(ReplyDelta::Content(content.to_string()));
    }
}

fn complete_calls(message: OpenAiApiReplyBody) -> Vec<ToolCall> {
    message
        .tool_calls
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .filter_map(|(position, part)| {
            let function = part.function?;
            let name = function.name.filter(|name| !name.is_empty())?;
            let arguments = function
                .arguments
                .filter(|arguments| !arguments.trim().is_empty())
                .unwrap_or_else(|| "{}".to_string());
            let id = part
                .id
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| format!("call_{position}"));

            Some(ToolCall::new(id, name, arguments))
        })
        .collect()
}
