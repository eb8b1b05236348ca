//! Small convenience constructors for common types.

use crate::{BackendKind, ExchangeRequest, Message, Role};

pub fn system_message(content: impl Into<String>) -> Message {
    Message::new(Role::System, content)
}

pub fn user_message(content: impl Into<String>) -> Message {
    Message::new(Role::User, content)
}

pub fn assistant_message(content: impl Into<String>) -> Message {
    Message::new(Role::Assistant, content)
}

pub fn tool_message(
    tool_call_id: impl Into<String>,
    name: impl Into<String>,
    content: impl Into<String>,
) -> Message {
    Message::tool_result(tool_call_id, name, content)
}

pub fn exchange(selector: impl Into<String>, user_input: impl Into<String>) -> ExchangeRequest {
    ExchangeRequest::new(user_input).with_selector(selector)
}

pub fn streaming_exchange(
    selector: impl Into<String>,
    user_input: impl Into<String>,
) -> ExchangeRequest {
    exchange(selector, user_input).enable_streaming()
}

pub fn parse_backend_kind(value: &str) -> Option<BackendKind> {
    BackendKind::parse(value)
}

#[cfg(test)]
mod tests {
    use crate::{BackendKind, Role};

    use super::{exchange, parse_backend_kind, streaming_exchange, tool_message, user_message};

    #[test]
    fn parse_backend_kind_supports_aliases() {
        assert_eq!(parse_backend_kind("openai"), Some(BackendKind::OpenAi));
        assert_eq!(parse_backend_kind("Cloud"), Some(BackendKind::OpenAi));
        assert_eq!(parse_backend_kind(" self-hosted "), Some(BackendKind::Ollama));
        assert_eq!(parse_backend_kind("broadcast"), Some(BackendKind::LocalBroadcast));
        assert_eq!(parse_backend_kind("anthropic"), None);
    }

    #[test]
    fn message_and_exchange_helpers_apply_expected_defaults() {
        let message = user_message("hello");
        assert_eq!(message.role, Role::User);

        let result = tool_message("call_1", "get_weather", "{}");
        assert_eq!(result.role, Role::Tool);
        assert_eq!(result.name.as_deref(), Some("get_weather"));

        let non_streaming = exchange("ollama", "hello");
        let streaming = streaming_exchange("ollama", "hello");

        assert_eq!(non_streaming.selector.as_deref(), Some("ollama"));
        assert!(!non_streaming.stream);
        assert!(streaming.stream);
    }
}
