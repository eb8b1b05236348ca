//! Tracing-based observability hooks for transport, tool runtime, and exchange phases.
//!
//! ```rust
//! use pchat::ExchangeHooks;
//! use pobserve::TracingObservabilityHooks;
//!
//! fn accepts_exchange_hooks(_hooks: &dyn ExchangeHooks) {}
//!
//! let hooks = TracingObservabilityHooks;
//! accepts_exchange_hooks(&hooks);
//! ```

use std::time::Duration;

use pchat::{ChatError, ExchangeHooks, ExchangeOutcome};
use pcommon::ExchangeId;
use pprovider::{BackendKind, Device, ProviderError, ToolCall, TransportHooks};
use ptooling::{ToolError, ToolExecutionContext, ToolExecutionResult, ToolRuntimeHooks};

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObservabilityHooks;

impl TransportHooks for TracingObservabilityHooks {
    fn on_request_start(&self, backend: BackendKind, model: &str, streaming: bool) {
        tracing::info!(
            phase = "transport",
            event = "request_start",
            backend = %backend,
            model,
            streaming
        );
    }

    fn on_request_success(
        &self,
        backend: BackendKind,
        model: &str,
        streaming: bool,
        elapsed: Duration,
    ) {
        tracing::info!(
            phase = "transport",
            event = "request_success",
            backend = %backend,
            model,
            streaming,
            elapsed_ms = elapsed.as_millis() as u64
        );
    }

    fn on_request_failure(
        &self,
        backend: BackendKind,
        model: &str,
        streaming: bool,
        error: &ProviderError,
        elapsed: Duration,
    ) {
        tracing::error!(
            phase = "transport",
            event = "request_failure",
            backend = %backend,
            model,
            streaming,
            elapsed_ms = elapsed.as_millis() as u64,
            error_kind = ?error.kind(),
            status = error.status(),
            error = %error
        );
    }

    fn on_device_failure(&self, device: &Device, error: &ProviderError) {
        tracing::warn!(
            phase = "transport",
            event = "device_failure",
            device = %device,
            error_kind = ?error.kind(),
            error = %error
        );
    }
}

impl ToolRuntimeHooks for TracingObservabilityHooks {
    fn on_unknown_tool(&self, tool_call: &ToolCall, context: &ToolExecutionContext) {
        tracing::warn!(
            phase = "tool",
            event = "unknown_tool",
            tool_name = tool_call.name,
            tool_call_id = tool_call.id,
            exchange_id = %context.exchange_id
        );
    }

    fn on_execution_start(&self, tool_call: &ToolCall, context: &ToolExecutionContext) {
        tracing::info!(
            phase = "tool",
            event = "execution_start",
            tool_name = tool_call.name,
            tool_call_id = tool_call.id,
            exchange_id = %context.exchange_id,
            trace_id = context.trace_id.as_ref().map(|id| id.as_str())
        );
    }

    fn on_execution_success(
        &self,
        tool_call: &ToolCall,
        context: &ToolExecutionContext,
        _result: &ToolExecutionResult,
        elapsed: Duration,
    ) {
        tracing::info!(
            phase = "tool",
            event = "execution_success",
            tool_name = tool_call.name,
            tool_call_id = tool_call.id,
            exchange_id = %context.exchange_id,
            trace_id = context.trace_id.as_ref().map(|id| id.as_str()),
            elapsed_ms = elapsed.as_millis() as u64
        );
    }

    fn on_execution_failure(
        &self,
        tool_call: &ToolCall,
        context: &ToolExecutionContext,
        error: &ToolError,
        elapsed: Duration,
    ) {
        tracing::warn!(
            phase = "tool",
            event = "execution_failure",
            tool_name = tool_call.name,
            tool_call_id = tool_call.id,
            exchange_id = %context.exchange_id,
            trace_id = context.trace_id.as_ref().map(|id| id.as_str()),
            elapsed_ms = elapsed.as_millis() as u64,
            error_kind = ?error.kind,
            error = %error
        );
    }
}

impl ExchangeHooks for TracingObservabilityHooks {
    fn on_round_start(&self, exchange_id: &ExchangeId, backend: BackendKind, round: usize) {
        tracing::debug!(
            phase = "exchange",
            event = "round_start",
            exchange_id = %exchange_id,
            backend = %backend,
            round
        );
    }

    fn on_tool_round_complete(
        &self,
        exchange_id: &ExchangeId,
        round: usize,
        results: &[ToolExecutionResult],
    ) {
        tracing::info!(
            phase = "exchange",
            event = "tool_round_complete",
            exchange_id = %exchange_id,
            round,
            tool_calls = results.len(),
            tool_errors = results.iter().filter(|result| result.is_error).count()
        );
    }

    fn on_exchange_complete(
        &self,
        exchange_id: &ExchangeId,
        outcome: &ExchangeOutcome,
        elapsed: Duration,
    ) {
        tracing::info!(
            phase = "exchange",
            event = "complete",
            exchange_id = %exchange_id,
            backend = %outcome.backend,
            tool_rounds = outcome.tool_rounds,
            answer_chars = outcome.answer.chars().count(),
            elapsed_ms = elapsed.as_millis() as u64
        );
    }

    fn on_exchange_failure(&self, exchange_id: &ExchangeId, error: &ChatError, elapsed: Duration) {
        tracing::error!(
            phase = "exchange",
            event = "failure",
            exchange_id = %exchange_id,
            elapsed_ms = elapsed.as_millis() as u64,
            error_kind = ?error.kind(),
            user_error = error.is_user_error(),
            error = %error
        );
    }
}
