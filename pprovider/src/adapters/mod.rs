//! Backend-specific wire formats, kept apart from the generic transport.

pub mod broadcast;
pub mod ollama;
pub mod openai;
mod sentinel;

use serde_json::Value;

use crate::{BackendConfig, BackendKind, BackendRequest, Frame, ProviderError, ReplyDelta};

pub use ollama::OllamaNormalizer;
pub use openai::OpenAiNormalizer;

/// Turns decoded frames from one backend into reply deltas.
#[derive(Debug)]
pub enum ReplyNormalizer {
    OpenAi(OpenAiNormalizer),
    Ollama(OllamaNormalizer),
}

impl ReplyNormalizer {
    pub fn for_backend(config: &BackendConfig) -> Result<Self, ProviderError> {
        match config.kind {
            BackendKind::OpenAi => Ok(Self::OpenAi(OpenAiNormalizer::new(&config.selector))),
            BackendKind::Ollama => Ok(Self::Ollama(OllamaNormalizer::new(&config.selector))),
            BackendKind::LocalBroadcast => Err(not_a_model_backend(config)),
        }
    }

    pub fn normalize(&mut self, frame: &Frame) -> Result<Vec<ReplyDelta>, ProviderError> {
        match self {
            Self::OpenAi(normalizer) => normalizer.normalize(frame),
            Self::Ollama(normalizer) => normalizer.normalize(frame),
        }
    }

    /// Flushes anything held back while waiting for more content.
    pub fn finish(&mut self) -> Vec<ReplyDelta> {
        match self {
            Self::OpenAi(_) => Vec::new(),
            Self::Ollama(normalizer) => normalizer.finish(),
        }
    }
}

pub(crate) fn chat_endpoint(config: &BackendConfig) -> Result<String, ProviderError> {
    match config.kind {
        BackendKind::OpenAi => Ok(config.endpoint(openai::CHAT_PATH)),
        BackendKind::Ollama => Ok(config.endpoint(ollama::CHAT_PATH)),
        BackendKind::LocalBroadcast => Err(not_a_model_backend(config)),
    }
}

pub(crate) fn models_endpoint(config: &BackendConfig) -> Result<String, ProviderError> {
    match config.kind {
        BackendKind::OpenAi => Ok(config.endpoint(openai::MODELS_PATH)),
        BackendKind::Ollama => Ok(config.endpoint(ollama::MODELS_PATH)),
        BackendKind::LocalBroadcast => Err(not_a_model_backend(config)),
    }
}

/// `/api/generate` endpoint; only Ollama serves plain prompt completions.
pub(crate) fn generate_endpoint(config: &BackendConfig) -> Result<String, ProviderError> {
    match config.kind {
        BackendKind::Ollama => Ok(config.endpoint(ollama::GENERATE_PATH)),
        _ => Err(unsupported_operation(config, "prompt completions")),
    }
}

pub(crate) fn show_endpoint(config: &BackendConfig) -> Result<String, ProviderError> {
    match config.kind {
        BackendKind::Ollama => Ok(config.endpoint(ollama::SHOW_PATH)),
        _ => Err(unsupported_operation(config, "model details")),
    }
}

pub(crate) fn request_body(request: &BackendRequest) -> Result<Value, ProviderError> {
    match request.config.kind {
        BackendKind::OpenAi => openai::request_body(request),
        BackendKind::Ollama => ollama::request_body(request),
        BackendKind::LocalBroadcast => Err(not_a_model_backend(&request.config)),
    }
}

pub(crate) fn parse_model_list(
    config: &BackendConfig,
    body: &Value,
) -> Result<Vec<String>, ProviderError> {
    match config.kind {
        BackendKind::OpenAi => openai::parse_model_list(body),
        BackendKind::Ollama => ollama::parse_model_list(body),
        BackendKind::LocalBroadcast => Err(not_a_model_backend(config)),
    }
}

/// Pulls a readable message out of an error body: `{"error":"..."}`,
/// `{"error":{"message":"..."}}` or plain text.
pub(crate) fn error_body_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    match serde_json::from_str::<Value>(trimmed) {
        Ok(value) => value.get("error").map(error_message),
        Err(_) => Some(trimmed.to_string()),
    }
}

pub(crate) fn error_message(error: &Value) -> String {
    match error {
        Value::String(message) => message.clone(),
        Value::Object(fields) => fields
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string()),
        other => other.to_string(),
    }
}

fn not_a_model_backend(config: &BackendConfig) -> ProviderError {
    ProviderError::invalid_request(format!(
        "backend '{}' does not accept chat-completion requests",
        config.selector
    ))
}

fn unsupported_operation(config: &BackendConfig, operation: &str) -> ProviderError {
    ProviderError::invalid_request(format!(
        "backend '{}' does not serve {operation}",
        config.selector
    ))
}
