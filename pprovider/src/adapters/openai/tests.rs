//! Focused unit tests for OpenAI adapter internals.

#![cfg(test)]

use serde_json::json;

use crate::{
    BackendRequest, Frame, Message, ProviderErrorKind, ProviderSelector, ReplyAccumulator,
    ReplyDelta, ToolCall, ToolDefinition,
};

use super::{OpenAiNormalizer, parse_model_list, request_body};

fn openai_request(messages: Vec<Message>) -> BackendRequest {
    let config = ProviderSelector::new()
        .resolve(Some("openai"))
        .expect("openai should resolve");
    BackendRequest::new(config, messages)
}

#[test]
fn request_body_carries_tools_and_tool_messages() {
    let call = ToolCall::new("call_1", "get_current_weather", "{\"location\":\"Warsaw\"}");
    let request = openai_request(vec![
        Message::user("weather?"),
        Message::assistant("").with_tool_calls(vec![call]),
        Message::tool_result("call_1", "get_current_weather", "{\"temperature\":\"15\"}"),
    ])
    .with_tools(vec![ToolDefinition::new(
        "get_current_weather",
        "Current weather",
        json!({"type": "object"}),
    )])
    .streaming(true);

    let body = request_body(&request).expect("body should serialize");

    assert_eq!(body["model"], "gpt-3.5-turbo");
    assert_eq!(body["stream"], true);
    assert_eq!(body["tools"][0]["type"], "function");
    assert_eq!(body["tools"][0]["function"]["name"], "get_current_weather");
    assert_eq!(body["messages"][1]["content"], serde_json::Value::Null);
    assert_eq!(
        body["messages"][1]["tool_calls"][0]["function"]["arguments"],
        "{\"location\":\"Warsaw\"}"
    );
    assert_eq!(body["messages"][2]["role"], "tool");
    assert_eq!(body["messages"][2]["tool_call_id"], "call_1");
    assert!(body["messages"][2].get("name").is_none());
}

#[test]
fn request_body_omits_tools_when_none_registered() {
    let body = request_body(&openai_request(vec![Message::user("hi")])).expect("body");
    assert!(body.get("tools").is_none());
    assert_eq!(body["stream"], false);
}

#[test]
fn complete_message_yields_content_and_tool_call_set() {
    let mut normalizer = OpenAiNormalizer::new("openai");
    let frame = Frame::new(
        json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_abc",
                        "type": "function",
                        "function": {"name": "get_current_weather", "arguments": "{\"location\":\"Warsaw\"}"}
                    }]
                },
                "finish_reason": "tool_calls"
            }]
        }),
        true,
    );

    let deltas = normalizer.normalize(&frame).expect("normalize");
    assert_eq!(
        deltas,
        vec![ReplyDelta::ToolCalls(vec![ToolCall::new(
            "call_abc",
            "get_current_weather",
            "{\"location\":\"Warsaw\"}"
        )])]
    );
}

#[test]
fn streamed_argument_deltas_accumulate_across_chunks() {
    let mut normalizer = OpenAiNormalizer::new("openai");
    let chunks = [
        json!({"choices": [{"delta": {"role": "assistant", "content": null, "tool_calls": [
            {"index": 0, "id": "call_1", "type": "function", "function": {"name": "get_current_weather", "arguments": ""}}
        ]}}]}),
        json!({"choices": [{"delta": {"tool_calls": [{"index": 0, "function": {"arguments": "{\"loc"}}]}}]}),
        json!({"choices": [{"delta": {"tool_calls": [{"index": 0, "function": {"arguments": "ation\":\"Warsaw\"}"}}]}}]}),
        json!({"choices": [{"delta": {}, "finish_reason": "tool_calls"}]}),
    ];

    let mut accumulator = ReplyAccumulator::default();
    for chunk in chunks {
        for delta in normalizer.normalize(&Frame::new(chunk, false)).expect("normalize") {
            accumulator.push(delta);
        }
    }

    let reply = accumulator.finish();
    assert_eq!(reply.content, "");
    assert_eq!(
        reply.tool_calls,
        vec![ToolCall::new(
            "call_1",
            "get_current_weather",
            "{\"location\":\"Warsaw\"}"
        )]
    );
}

#[test]
fn error_payload_is_a_transport_failure() {
    let mut normalizer = OpenAiNormalizer::new("openai");
    let err = normalizer
        .normalize(&Frame::new(
            json!({"error": {"message": "model overloaded", "type": "server_error"}}),
            true,
        ))
        .expect_err("error payload");

    assert_eq!(err.kind(), ProviderErrorKind::Transport);
    assert!(err.to_string().contains("model overloaded"));
}

#[test]
fn unexpected_shape_is_a_decode_error() {
    let mut normalizer = OpenAiNormalizer::new("openai");
    let err = normalizer
        .normalize(&Frame::new(json!({"choices": "nope"}), true))
        .expect_err("choices must be an array");

    assert_eq!(err.kind(), ProviderErrorKind::Decode);
}

#[test]
fn model_list_is_sorted() {
    let models = parse_model_list(&json!({"data": [{"id": "gpt-4o"}, {"id": "gpt-3.5-turbo"}]}))
        .expect("parse");
    assert_eq!(models, vec!["gpt-3.5-turbo", "gpt-4o"]);
}
