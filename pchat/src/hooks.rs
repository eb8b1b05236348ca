//! Exchange lifecycle hooks.

use std::time::Duration;

use pcommon::ExchangeId;
use pprovider::BackendKind;
use ptooling::ToolExecutionResult;

use crate::{ChatError, ExchangeOutcome};

pub trait ExchangeHooks: Send + Sync {
    /// Called before each backend call. `round` starts at 1.
    fn on_round_start(&self, _exchange_id: &ExchangeId, _backend: BackendKind, _round: usize) {}

    fn on_tool_round_complete(
        &self,
        _exchange_id: &ExchangeId,
        _round: usize,
        _results: &[ToolExecutionResult],
    ) {
    }

    fn on_exchange_complete(
        &self,
        _exchange_id: &ExchangeId,
        _outcome: &ExchangeOutcome,
        _elapsed: Duration,
    ) {
    }

    fn on_exchange_failure(&self, _exchange_id: &ExchangeId, _error: &ChatError, _elapsed: Duration) {
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopExchangeHooks;

impl ExchangeHooks for NoopExchangeHooks {}
