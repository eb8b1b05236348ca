//! Server-sent-event encoding of exchange streams for upward delivery.
//!
//! ```rust
//! use pchat::sse;
//!
//! assert_eq!(
//!     sse::content_event("Hel"),
//!     "data: {\"delta\":{\"content\":\"Hel\"}}\n\n"
//! );
//! assert_eq!(sse::DONE_EVENT, "data: [DONE]\n\n");
//! ```

use futures_core::Stream;
use futures_util::StreamExt;
use serde_json::json;

use crate::{ChatError, ExchangeEvent, ExchangeStream};

pub const DONE_EVENT: &str = "data: [DONE]\n\n";

pub fn content_event(fragment: &str) -> String {
    data_event(&json!({ "delta": { "content": fragment } }).to_string())
}

pub fn error_event(error: &ChatError) -> String {
    data_event(&json!({ "error": { "message": error.to_string() } }).to_string())
}

/// Encodes one exchange event. Tool lifecycle events have no upward form.
pub fn encode_event(event: &ExchangeEvent) -> Option<String> {
    match event {
        ExchangeEvent::ContentDelta(fragment) => Some(content_event(fragment)),
        ExchangeEvent::Completed(_) => Some(DONE_EVENT.to_string()),
        ExchangeEvent::ToolCallStarted(_) | ExchangeEvent::ToolCallFinished(_) => None,
    }
}

/// Maps an exchange stream to encoded events. A failure produces one error
/// event and no `[DONE]` marker.
pub fn encode_stream<'a>(stream: ExchangeStream<'a>) -> impl Stream<Item = String> + Send + 'a {
    stream.filter_map(|event| async move {
        match event {
            Ok(event) => encode_event(&event),
            Err(err) => Some(error_event(&err)),
        }
    })
}

fn data_event(payload: &str) -> String {
    format!("data: {payload}\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_is_json_escaped() {
        assert_eq!(
            content_event("say \"hi\"\n"),
            "data: {\"delta\":{\"content\":\"say \\\"hi\\\"\\n\"}}\n\n"
        );
    }

    #[test]
    fn tool_events_are_not_encoded() {
        let call = pprovider::ToolCall::new("call_1", "get_time", "{}");
        assert_eq!(encode_event(&ExchangeEvent::ToolCallStarted(call)), None);
    }

    #[test]
    fn errors_are_reported_as_data_events() {
        assert_eq!(
            error_event(&ChatError::IterationLimitExceeded { limit: 2 }),
            "data: {\"error\":{\"message\":\"tool-call loop exceeded 2 round trips\"}}\n\n"
        );
    }
}
