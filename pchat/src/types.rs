//! Conversation, exchange request, and exchange event types.

use std::sync::atomic::{AtomicU64, Ordering};

use pcommon::{ExchangeId, GenerationOptions, TraceId};
use pprovider::{BackendKind, BroadcastReport, Message, Role, ToolCall};
use ptooling::ToolExecutionResult;
use tokio_util::sync::CancellationToken;

use crate::ExchangeStream;

static NEXT_EXCHANGE: AtomicU64 = AtomicU64::new(1);

/// Ordered messages of one exchange.
///
/// Seeded with an optional system message, prior history and exactly one new
/// user message. Only the engine appends to it while an exchange runs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded(
        system_prompt: Option<&str>,
        history: Vec<Message>,
        user_input: impl Into<String>,
    ) -> Self {
        let mut messages = Vec::with_capacity(history.len() + 2);
        if let Some(system_prompt) = system_prompt {
            messages.push(Message::system(system_prompt));
        }
        messages.extend(history);
        messages.push(Message::user(user_input));

        Self { messages }
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn last_assistant(&self) -> Option<&Message> {
        self.messages
            .iter()
            .rev()
            .find(|message| message.role == Role::Assistant)
    }
}

#[derive(Debug, Clone)]
pub struct ExchangeRequest {
    pub selector: Option<String>,
    pub system_prompt: Option<String>,
    pub history: Vec<Message>,
    pub user_input: String,
    pub model: Option<String>,
    pub options: GenerationOptions,
    pub stream: bool,
    pub exchange_id: ExchangeId,
    pub trace_id: Option<TraceId>,
    pub cancel: CancellationToken,
}

impl ExchangeRequest {
    pub fn new(user_input: impl Into<String>) -> Self {
        let sequence = NEXT_EXCHANGE.fetch_add(1, Ordering::Relaxed);

        Self {
            selector: None,
            system_prompt: None,
            history: Vec::new(),
            user_input: user_input.into(),
            model: None,
            options: GenerationOptions::default(),
            stream: false,
            exchange_id: ExchangeId::new(format!("exchange-{sequence}")),
            trace_id: None,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_selector(mut self, selector: impl Into<String>) -> Self {
        self.selector = Some(selector.into());
        self
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }

    pub fn with_history(mut self, history: Vec<Message>) -> Self {
        self.history = history;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.options.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.options.max_tokens = Some(max_tokens);
        self
    }

    pub fn enable_streaming(mut self) -> Self {
        self.stream = true;
        self
    }

    pub fn with_exchange_id(mut self, exchange_id: impl Into<ExchangeId>) -> Self {
        self.exchange_id = exchange_id.into();
        self
    }

    pub fn with_trace_id(mut self, trace_id: impl Into<TraceId>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }

    /// Cancelling `cancel` aborts the exchange at its next suspension point.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeOutcome {
    pub exchange_id: ExchangeId,
    pub backend: BackendKind,
    pub answer: String,
    pub conversation: Conversation,
    /// Completed tool rounds; zero when the first reply had no tool calls.
    pub tool_rounds: usize,
    /// Per-device outcomes for broadcast exchanges.
    pub broadcast: Option<BroadcastReport>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExchangeEvent {
    ContentDelta(String),
    ToolCallStarted(ToolCall),
    ToolCallFinished(ToolExecutionResult),
    Completed(ExchangeOutcome),
}

pub enum Answer<'a> {
    Complete(ExchangeOutcome),
    Streaming(ExchangeStream<'a>),
}

impl Answer<'_> {
    pub fn is_streaming(&self) -> bool {
        matches!(self, Self::Streaming(_))
    }
}
