//! Lazily produced exchange events with explicit close.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Instant;

use futures_core::Stream;
use futures_util::StreamExt;
use pcommon::ExchangeId;
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::{ChatError, ExchangeEvent, ExchangeHooks, ExchangeOutcome};

pub(crate) type EventStream<'a> =
    Pin<Box<dyn Stream<Item = Result<ExchangeEvent, ChatError>> + Send + 'a>>;

/// Events of one running exchange.
///
/// The stream ends after [`ExchangeEvent::Completed`] or the first error.
/// [`close`](Self::close) cancels the exchange and ends the stream; dropping the
/// stream cancels it as well.
pub struct ExchangeStream<'a> {
    events: EventStream<'a>,
    cancel: CancellationToken,
    _cancel_on_drop: DropGuard,
    exchange_id: ExchangeId,
    hooks: Arc<dyn ExchangeHooks>,
    started: Instant,
    finished: bool,
}

impl<'a> ExchangeStream<'a> {
    pub(crate) fn new(
        events: EventStream<'a>,
        cancel: CancellationToken,
        exchange_id: ExchangeId,
        hooks: Arc<dyn ExchangeHooks>,
    ) -> Self {
        Self {
            events,
            _cancel_on_drop: cancel.clone().drop_guard(),
            cancel,
            exchange_id,
            hooks,
            started: Instant::now(),
            finished: false,
        }
    }

    pub fn exchange_id(&self) -> &ExchangeId {
        &self.exchange_id
    }

    pub fn is_closed(&self) -> bool {
        self.finished
    }

    /// Cancels the exchange. In-flight backend or tool calls are abandoned and
    /// the stream yields nothing further.
    pub fn close(&mut self) {
        self.cancel.cancel();
        if !self.finished {
            self.finished = true;
            self.hooks
                .on_exchange_failure(&self.exchange_id, &ChatError::Cancelled, self.started.elapsed());
        }
    }

    /// Drains the stream and returns the final outcome.
    pub async fn finish(mut self) -> Result<ExchangeOutcome, ChatError> {
        while let Some(event) = self.next().await {
            if let ExchangeEvent::Completed(outcome) = event? {
                return Ok(outcome);
            }
        }

        Err(ChatError::Cancelled)
    }

    /// Drains the stream, returning only the content fragments in order.
    pub async fn collect_content(mut self) -> Result<Vec<String>, ChatError> {
        let mut fragments = Vec::new();
        while let Some(event) = self.next().await {
            if let ExchangeEvent::ContentDelta(fragment) = event? {
                fragments.push(fragment);
            }
        }
        Ok(fragments)
    }
}

impl Stream for ExchangeStream<'_> {
    type Item = Result<ExchangeEvent, ChatError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.finished {
            return Poll::Ready(None);
        }

        let polled = self.events.as_mut().poll_next(cx);
        match &polled {
            Poll::Ready(Some(Ok(ExchangeEvent::Completed(outcome)))) => {
                self.finished = true;
                self.hooks
                    .on_exchange_complete(&self.exchange_id, outcome, self.started.elapsed());
            }
            Poll::Ready(Some(Err(err))) => {
                self.finished = true;
                self.hooks
                    .on_exchange_failure(&self.exchange_id, err, self.started.elapsed());
            }
            Poll::Ready(None) => self.finished = true,
            _ => {}
        }
        polled
    }
}
