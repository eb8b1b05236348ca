//! Reply delta streams and folding them into a complete [`Reply`].
//!
//! ```rust
//! use pprovider::{ReplyAccumulator, ReplyDelta, ToolCallFragment};
//!
//! let mut accumulator = ReplyAccumulator::default();
//! accumulator.push(ReplyDelta::Content("Checking".into()));
//! accumulator.push(ReplyDelta::ToolCallFragment(ToolCallFragment {
//!     index: 0,
//!     id: Some("call_a".into()),
//!     name: Some("lookup".into()),
//!     arguments: "{\"q\":".into(),
//! }));
//! accumulator.push(ReplyDelta::ToolCallFragment(ToolCallFragment {
//!     index: 0,
//!     arguments: "\"rust\"}".into(),
//!     ..ToolCallFragment::default()
//! }));
//!
//! let reply = accumulator.finish();
//! assert_eq!(reply.content, "Checking");
//! assert_eq!(reply.tool_calls[0].arguments, "{\"q\":\"rust\"}");
//! ```

use std::collections::{HashMap, VecDeque};
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;
use futures_util::StreamExt;

use crate::{ProviderError, Reply, ReplyDelta, ToolCall, ToolCallFragment};

/// Reply stream contract.
///
/// - Deltas are emitted in the order the backend produced them.
/// - After an error item the stream yields nothing further.
/// - Once the stream yields `None`, it must not yield additional items.
pub trait ReplyEventStream: Stream<Item = Result<ReplyDelta, ProviderError>> + Send {}

impl<T> ReplyEventStream for T where T: Stream<Item = Result<ReplyDelta, ProviderError>> + Send {}

pub type ReplyStream<'a> = Pin<Box<dyn ReplyEventStream + 'a>>;

#[derive(Debug)]
pub struct VecReplyStream {
    deltas: VecDeque<Result<ReplyDelta, ProviderError>>,
}

impl VecReplyStream {
    pub fn new(deltas: Vec<Result<ReplyDelta, ProviderError>>) -> Self {
        Self {
            deltas: deltas.into(),
        }
    }
}

impl Stream for VecReplyStream {
    type Item = Result<ReplyDelta, ProviderError>;

    fn poll_next(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
    ) -> Poll<Option<Result<ReplyDelta, ProviderError>>> {
        Poll::Ready(self.deltas.pop_front())
    }
}

#[derive(Debug)]
struct PendingToolCall {
    index: u32,
    id: Option<String>,
    name: String,
    arguments: String,
}

/// Folds deltas into a reply: content is concatenated, argument fragments are
/// accumulated per call, and the last non-empty complete call set wins over
/// fragments.
///
/// A fragment carrying a new id opens a new call even when its index is already
/// taken by a call with a different id. Fragments without an id extend the
/// call most recently opened at their index.
#[derive(Debug, Default)]
pub struct ReplyAccumulator {
    content: String,
    pending: Vec<PendingToolCall>,
    slots_by_id: HashMap<String, usize>,
    latest_by_index: HashMap<u32, usize>,
    complete: Vec<ToolCall>,
}

impl ReplyAccumulator {
    pub fn push(&mut self, delta: ReplyDelta) {
        match delta {
            ReplyDelta::Content(fragment) => self.content.push_str(&fragment),
            ReplyDelta::ToolCallFragment(fragment) => self.push_fragment(fragment),
            ReplyDelta::ToolCalls(calls) => {
                if !calls.is_empty() {
                    self.complete = calls;
                }
            }
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.complete.is_empty() || !self.pending.is_empty()
    }

    pub fn finish(self) -> Reply {
        let tool_calls = if self.complete.is_empty() {
            let mut pending = self.pending;
            pending.sort_by_key(|call| call.index);
            pending
                .into_iter()
                .filter(|call| !call.name.is_empty())
                .map(|call| {
                    let arguments = if call.arguments.trim().is_empty() {
                        "{}".to_string()
                    } else {
                        call.arguments
                    };
                    ToolCall {
                        id: call.id.unwrap_or_else(|| format!("call_{}", call.index)),
                        name: call.name,
                        arguments,
                    }
                })
                .collect()
        } else {
            self.complete
        };

        Reply {
            content: self.content,
            tool_calls,
        }
    }

    fn push_fragment(&mut self, fragment: ToolCallFragment) {
        let id = fragment.id.filter(|id| !id.is_empty());
        let slot = match &id {
            Some(id) => match self.slots_by_id.get(id) {
                Some(&slot) => slot,
                None => {
                    let slot = match self.latest_by_index.get(&fragment.index) {
                        Some(&slot) if self.pending[slot].id.is_none() => slot,
                        _ => self.open_slot(fragment.index),
                    };
                    self.slots_by_id.insert(id.clone(), slot);
                    slot
                }
            },
            None => match self.latest_by_index.get(&fragment.index) {
                Some(&slot) => slot,
                None => self.open_slot(fragment.index),
            },
        };

        let pending = &mut self.pending[slot];
        if id.is_some() {
            pending.id = id;
        }
        if let Some(name) = fragment.name.filter(|name| !name.is_empty()) {
            pending.name = name;
        }
        pending.arguments.push_str(&fragment.arguments);
    }

    fn open_slot(&mut self, index: u32) -> usize {
        let slot = self.pending.len();
        self.pending.push(PendingToolCall {
            index,
            id: None,
            name: String::new(),
            arguments: String::new(),
        });
        self.latest_by_index.insert(index, slot);
        slot
    }
}

/// Drains a reply stream to completion.
pub async fn collect_reply(mut stream: ReplyStream<'_>) -> Result<Reply, ProviderError> {
    let mut accumulator = ReplyAccumulator::default();
    while let Some(delta) = stream.next().await {
        accumulator.push(delta?);
    }
    Ok(accumulator.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fragment(index: u32, id: Option<&str>, name: Option<&str>, arguments: &str) -> ReplyDelta {
        ReplyDelta::ToolCallFragment(ToolCallFragment {
            index,
            id: id.map(str::to_string),
            name: name.map(str::to_string),
            arguments: arguments.to_string(),
        })
    }

    #[test]
    fn interleaved_argument_fragments_assemble_per_call() {
        let mut accumulator = ReplyAccumulator::default();
        for delta in [
            fragment(0, Some("call_a"), Some("get_current_weather"), ""),
            fragment(1, Some("call_b"), Some("get_time"), "{\"tz\""),
            fragment(0, None, None, "{\"location\":"),
            fragment(1, None, None, ":\"UTC\"}"),
            fragment(0, None, None, "\"Warsaw\"}"),
        ] {
            accumulator.push(delta);
        }

        let reply = accumulator.finish();
        assert_eq!(
            reply.tool_calls,
            vec![
                ToolCall::new("call_a", "get_current_weather", "{\"location\":\"Warsaw\"}"),
                ToolCall::new("call_b", "get_time", "{\"tz\":\"UTC\"}"),
            ]
        );
    }

    #[test]
    fn distinct_ids_sharing_an_index_stay_separate_calls() {
        let mut accumulator = ReplyAccumulator::default();
        for delta in [
            fragment(0, Some("call_a"), Some("get_current_weather"), "{\"location\":"),
            fragment(0, None, None, "\"Warsaw\"}"),
            fragment(0, Some("call_b"), Some("get_time"), "{\"tz\":"),
            fragment(0, None, None, "\"UTC\"}"),
        ] {
            accumulator.push(delta);
        }

        let reply = accumulator.finish();
        assert_eq!(
            reply.tool_calls,
            vec![
                ToolCall::new("call_a", "get_current_weather", "{\"location\":\"Warsaw\"}"),
                ToolCall::new("call_b", "get_time", "{\"tz\":\"UTC\"}"),
            ]
        );
    }

    #[test]
    fn missing_ids_and_arguments_are_filled_in() {
        let mut accumulator = ReplyAccumulator::default();
        accumulator.push(fragment(2, None, Some("ping"), ""));

        let reply = accumulator.finish();
        assert_eq!(reply.tool_calls, vec![ToolCall::new("call_2", "ping", "{}")]);
    }

    #[test]
    fn last_non_empty_complete_set_wins() {
        let first = vec![ToolCall::new("1", "a", "{}")];
        let second = vec![ToolCall::new("2", "b", "{}")];

        let mut accumulator = ReplyAccumulator::default();
        accumulator.push(ReplyDelta::ToolCalls(first));
        accumulator.push(ReplyDelta::ToolCalls(second.clone()));
        accumulator.push(ReplyDelta::ToolCalls(Vec::new()));
        accumulator.push(ReplyDelta::Content("done".to_string()));

        let reply = accumulator.finish();
        assert_eq!(reply.tool_calls, second);
        assert_eq!(reply.content, "done");
    }

    #[tokio::test]
    async fn collect_reply_stops_at_first_error() {
        let stream = VecReplyStream::new(vec![
            Ok(ReplyDelta::Content("partial".to_string())),
            Err(ProviderError::decode("{", "EOF while parsing")),
            Ok(ReplyDelta::Content("unreachable".to_string())),
        ]);

        let err = collect_reply(Box::pin(stream))
            .await
            .expect_err("decode error should surface");
        assert_eq!(err.raw_fragment(), Some("{"));
    }
}
