//! Tool-call loop engine for non-streaming and streaming exchanges.
//!
//! Every exchange resolves its backend from the request selector, then either
//! fans the user message out to local devices or runs the tool-call loop:
//! send the conversation, execute any requested tools, append their results,
//! and repeat until the backend answers without tool calls.

use std::sync::Arc;

use async_stream::try_stream;
use futures_util::StreamExt;
use pcommon::{ExchangeId, GenerationOptions, TraceId};
use pprovider::{
    BackendConfig, BackendRequest, BackendTransport, DeviceBroadcaster, Message, ProviderSelector,
    ReplyAccumulator, ReplyDelta,
};
use ptooling::{DefaultToolRuntime, ToolExecutionContext, ToolRuntime};
use tokio_util::sync::CancellationToken;

use crate::stream::EventStream;
use crate::{
    Answer, ChatError, Conversation, ExchangeEvent, ExchangeHooks, ExchangeOutcome,
    ExchangeRequest, ExchangeStream, NoopExchangeHooks,
};

pub const DEFAULT_MAX_TOOL_ROUND_TRIPS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatPolicy {
    /// Tool rounds allowed per exchange. A reply that still requests tools
    /// after this many rounds fails the exchange.
    pub max_tool_round_trips: usize,
}

impl Default for ChatPolicy {
    fn default() -> Self {
        Self {
            max_tool_round_trips: DEFAULT_MAX_TOOL_ROUND_TRIPS,
        }
    }
}

impl ChatPolicy {
    pub fn with_max_tool_round_trips(mut self, max_tool_round_trips: usize) -> Self {
        self.max_tool_round_trips = max_tool_round_trips;
        self
    }
}

#[derive(Clone)]
pub struct ExchangeEngine {
    selector: ProviderSelector,
    transport: Arc<dyn BackendTransport>,
    broadcaster: Option<Arc<dyn DeviceBroadcaster>>,
    tools: Arc<dyn ToolRuntime>,
    hooks: Arc<dyn ExchangeHooks>,
    policy: ChatPolicy,
}

pub struct ExchangeEngineBuilder {
    selector: ProviderSelector,
    transport: Arc<dyn BackendTransport>,
    broadcaster: Option<Arc<dyn DeviceBroadcaster>>,
    tools: Arc<dyn ToolRuntime>,
    hooks: Arc<dyn ExchangeHooks>,
    policy: ChatPolicy,
}

impl ExchangeEngineBuilder {
    pub fn new(transport: Arc<dyn BackendTransport>) -> Self {
        Self {
            selector: ProviderSelector::default(),
            transport,
            broadcaster: None,
            tools: Arc::new(DefaultToolRuntime::default()),
            hooks: Arc::new(NoopExchangeHooks),
            policy: ChatPolicy::default(),
        }
    }

    pub fn selector(mut self, selector: ProviderSelector) -> Self {
        self.selector = selector;
        self
    }

    pub fn broadcaster(mut self, broadcaster: Arc<dyn DeviceBroadcaster>) -> Self {
        self.broadcaster = Some(broadcaster);
        self
    }

    pub fn tool_runtime(mut self, tools: Arc<dyn ToolRuntime>) -> Self {
        self.tools = tools;
        self
    }

    pub fn hooks(mut self, hooks: Arc<dyn ExchangeHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn policy(mut self, policy: ChatPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn max_tool_round_trips(mut self, max_tool_round_trips: usize) -> Self {
        self.policy.max_tool_round_trips = max_tool_round_trips;
        self
    }

    pub fn build(self) -> ExchangeEngine {
        ExchangeEngine {
            selector: self.selector,
            transport: self.transport,
            broadcaster: self.broadcaster,
            tools: self.tools,
            hooks: self.hooks,
            policy: self.policy,
        }
    }
}

struct PreparedExchange {
    exchange_id: ExchangeId,
    trace_id: Option<TraceId>,
    config: BackendConfig,
    model: Option<String>,
    options: GenerationOptions,
    user_input: String,
    conversation: Conversation,
}

impl ExchangeEngine {
    pub fn new(transport: Arc<dyn BackendTransport>) -> Self {
        Self::builder(transport).build()
    }

    pub fn builder(transport: Arc<dyn BackendTransport>) -> ExchangeEngineBuilder {
        ExchangeEngineBuilder::new(transport)
    }

    pub fn policy(&self) -> ChatPolicy {
        self.policy
    }

    pub fn selector(&self) -> &ProviderSelector {
        &self.selector
    }

    /// Runs `request` in the mode it asks for.
    pub async fn run(&self, request: ExchangeRequest) -> Result<Answer<'_>, ChatError> {
        if request.stream {
            return Ok(Answer::Streaming(self.stream_exchange(request)?));
        }

        Ok(Answer::Complete(self.run_exchange(request).await?))
    }

    pub async fn run_exchange(&self, request: ExchangeRequest) -> Result<ExchangeOutcome, ChatError> {
        self.start(request, false)?.finish().await
    }

    /// Starts a streaming exchange. Selector and request validation failures are
    /// returned here, before any network activity.
    pub fn stream_exchange(&self, request: ExchangeRequest) -> Result<ExchangeStream<'_>, ChatError> {
        self.start(request, true)
    }

    fn start(&self, request: ExchangeRequest, streaming: bool) -> Result<ExchangeStream<'_>, ChatError> {
        let cancel = request.cancel.child_token();
        let exchange = self.prepare(request)?;
        let exchange_id = exchange.exchange_id.clone();

        let events = if exchange.config.kind.is_broadcast() {
            let broadcaster = self.broadcaster.clone().ok_or_else(|| {
                ChatError::invalid_request("local broadcast has no configured devices")
            })?;
            broadcast_events(broadcaster, exchange, streaming, cancel.clone())
        } else {
            self.tool_loop(exchange, streaming, cancel.clone())
        };

        Ok(ExchangeStream::new(
            events,
            cancel,
            exchange_id,
            Arc::clone(&self.hooks),
        ))
    }

    fn prepare(&self, request: ExchangeRequest) -> Result<PreparedExchange, ChatError> {
        let config = self.selector.resolve(request.selector.as_deref())?;

        if request.user_input.trim().is_empty() {
            return Err(ChatError::invalid_request("user input must not be empty"));
        }

        let ExchangeRequest {
            system_prompt,
            history,
            user_input,
            model,
            options,
            exchange_id,
            trace_id,
            ..
        } = request;

        let conversation = Conversation::seeded(system_prompt.as_deref(), history, user_input.clone());

        Ok(PreparedExchange {
            exchange_id,
            trace_id,
            config,
            model,
            options,
            user_input,
            conversation,
        })
    }

    fn tool_loop<'a>(
        &'a self,
        exchange: PreparedExchange,
        streaming: bool,
        cancel: CancellationToken,
    ) -> EventStream<'a> {
        let stream = try_stream! {
            let PreparedExchange {
                exchange_id,
                trace_id,
                config,
                model,
                options,
                mut conversation,
                ..
            } = exchange;

            let definitions = self.tools.definitions();
            let limit = self.policy.max_tool_round_trips;
            let mut context = ToolExecutionContext::new(exchange_id.clone());
            if let Some(trace_id) = trace_id {
                context = context.with_trace_id(trace_id);
            }
            let mut tool_rounds = 0;

            loop {
                let round = tool_rounds + 1;
                self.hooks.on_round_start(&exchange_id, config.kind, round);

                let mut request = BackendRequest::new(config.clone(), conversation.messages().to_vec())
                    .with_tools(definitions.clone())
                    .with_options(options)
                    .streaming(streaming);
                if let Some(model) = &model {
                    request = request.with_model(model.clone());
                }

                let reply = if streaming {
                    let mut deltas = self.transport.stream(request, cancel.clone()).await?;
                    let mut accumulator = ReplyAccumulator::default();
                    while let Some(delta) = deltas.next().await {
                        let delta = delta?;
                        if let ReplyDelta::Content(fragment) = &delta {
                            if !fragment.is_empty() {
                                yield ExchangeEvent::ContentDelta(fragment.clone());
                            }
                        }
                        accumulator.push(delta);
                    }
                    accumulator.finish()
                } else {
                    self.transport.complete(request, cancel.clone()).await?
                };

                if !reply.has_tool_calls() {
                    let answer = reply.content.clone();
                    conversation.push(reply.into_message());
                    yield ExchangeEvent::Completed(ExchangeOutcome {
                        exchange_id: exchange_id.clone(),
                        backend: config.kind,
                        answer,
                        conversation: conversation.clone(),
                        tool_rounds,
                        broadcast: None,
                    });
                    break;
                }

                if tool_rounds >= limit {
                    Err::<(), _>(ChatError::IterationLimitExceeded { limit })?;
                }

                let calls = reply.tool_calls.clone();
                conversation.push(reply.into_message());

                let mut results = Vec::with_capacity(calls.len());
                for call in calls {
                    if streaming {
                        yield ExchangeEvent::ToolCallStarted(call.clone());
                    }

                    let executed = tokio::select! {
                        biased;
                        _ = cancel.cancelled() => None,
                        result = self.tools.execute(call, context.clone()) => Some(result),
                    };
                    let result = match executed {
                        Some(result) => result,
                        None => Err(ChatError::Cancelled)?,
                    };

                    conversation.push(result.clone().into_message());
                    if streaming {
                        yield ExchangeEvent::ToolCallFinished(result.clone());
                    }
                    results.push(result);
                }

                tool_rounds += 1;
                self.hooks.on_tool_round_complete(&exchange_id, round, &results);
            }
        };

        Box::pin(stream) as EventStream<'a>
    }
}

fn broadcast_events<'a>(
    broadcaster: Arc<dyn DeviceBroadcaster>,
    exchange: PreparedExchange,
    streaming: bool,
    cancel: CancellationToken,
) -> EventStream<'a> {
    let stream = try_stream! {
        let PreparedExchange {
            exchange_id,
            config,
            user_input,
            mut conversation,
            ..
        } = exchange;

        let report = broadcaster.broadcast(&user_input, cancel).await?;
        let answer = report.answer();
        if streaming && !answer.is_empty() {
            yield ExchangeEvent::ContentDelta(answer.clone());
        }

        conversation.push(Message::assistant(answer.clone()));
        yield ExchangeEvent::Completed(ExchangeOutcome {
            exchange_id,
            backend: config.kind,
            answer,
            conversation,
            tool_rounds: 0,
            broadcast: Some(report),
        });
    };

    Box::pin(stream) as EventStream<'a>
}
