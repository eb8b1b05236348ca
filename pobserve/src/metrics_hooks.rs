//! Metrics-based observability hooks for transport, tool runtime, and exchange phases.
//!
//! ```rust
//! use pobserve::MetricsObservabilityHooks;
//! use pprovider::TransportHooks;
//!
//! fn accepts_transport_hooks(_hooks: &dyn TransportHooks) {}
//!
//! let hooks = MetricsObservabilityHooks;
//! accepts_transport_hooks(&hooks);
//! ```

use std::time::Duration;

use pchat::{ChatError, ExchangeHooks, ExchangeOutcome};
use pcommon::ExchangeId;
use pprovider::{BackendKind, Device, ProviderError, ToolCall, TransportHooks};
use ptooling::{ToolError, ToolExecutionContext, ToolExecutionResult, ToolRuntimeHooks};

#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsObservabilityHooks;

impl TransportHooks for MetricsObservabilityHooks {
    fn on_request_start(&self, backend: BackendKind, _model: &str, streaming: bool) {
        metrics::counter!(
            "parley_transport_request_start_total",
            "backend" => backend.to_string(),
            "streaming" => streaming.to_string()
        )
        .increment(1);
    }

    fn on_request_success(
        &self,
        backend: BackendKind,
        _model: &str,
        streaming: bool,
        elapsed: Duration,
    ) {
        metrics::counter!(
            "parley_transport_request_success_total",
            "backend" => backend.to_string(),
            "streaming" => streaming.to_string()
        )
        .increment(1);
        metrics::histogram!(
            "parley_transport_request_duration_seconds",
            "backend" => backend.to_string(),
            "status" => "success"
        )
        .record(elapsed.as_secs_f64());
    }

    fn on_request_failure(
        &self,
        backend: BackendKind,
        _model: &str,
        streaming: bool,
        error: &ProviderError,
        elapsed: Duration,
    ) {
        metrics::counter!(
            "parley_transport_request_failure_total",
            "backend" => backend.to_string(),
            "streaming" => streaming.to_string(),
            "error_kind" => format!("{:?}", error.kind())
        )
        .increment(1);
        metrics::histogram!(
            "parley_transport_request_duration_seconds",
            "backend" => backend.to_string(),
            "status" => "failure"
        )
        .record(elapsed.as_secs_f64());
    }

    fn on_device_failure(&self, _device: &Device, error: &ProviderError) {
        metrics::counter!(
            "parley_broadcast_device_failure_total",
            "error_kind" => format!("{:?}", error.kind())
        )
        .increment(1);
    }
}

impl ToolRuntimeHooks for MetricsObservabilityHooks {
    fn on_unknown_tool(&self, tool_call: &ToolCall, _context: &ToolExecutionContext) {
        metrics::counter!(
            "parley_tool_unknown_total",
            "tool_name" => tool_call.name.clone()
        )
        .increment(1);
    }

    fn on_execution_start(&self, tool_call: &ToolCall, _context: &ToolExecutionContext) {
        metrics::counter!(
            "parley_tool_execution_start_total",
            "tool_name" => tool_call.name.clone()
        )
        .increment(1);
    }

    fn on_execution_success(
        &self,
        tool_call: &ToolCall,
        _context: &ToolExecutionContext,
        _result: &ToolExecutionResult,
        elapsed: Duration,
    ) {
        metrics::counter!(
            "parley_tool_execution_success_total",
            "tool_name" => tool_call.name.clone()
        )
        .increment(1);
        metrics::histogram!(
            "parley_tool_execution_duration_seconds",
            "tool_name" => tool_call.name.clone(),
            "status" => "success"
        )
        .record(elapsed.as_secs_f64());
    }

    fn on_execution_failure(
        &self,
        tool_call: &ToolCall,
        _context: &ToolExecutionContext,
        error: &ToolError,
        elapsed: Duration,
    ) {
        metrics::counter!(
            "parley_tool_execution_failure_total",
            "tool_name" => tool_call.name.clone(),
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
        metrics::histogram!(
            "parley_tool_execution_duration_seconds",
            "tool_name" => tool_call.name.clone(),
            "status" => "failure"
        )
        .record(elapsed.as_secs_f64());
    }
}

impl ExchangeHooks for MetricsObservabilityHooks {
    fn on_round_start(&self, _exchange_id: &ExchangeId, backend: BackendKind, _round: usize) {
        metrics::counter!("parley_exchange_round_total", "backend" => backend.to_string())
            .increment(1);
    }

    fn on_exchange_complete(
        &self,
        _exchange_id: &ExchangeId,
        outcome: &ExchangeOutcome,
        elapsed: Duration,
    ) {
        metrics::counter!(
            "parley_exchange_complete_total",
            "backend" => outcome.backend.to_string()
        )
        .increment(1);
        metrics::histogram!(
            "parley_exchange_tool_rounds",
            "backend" => outcome.backend.to_string()
        )
        .record(outcome.tool_rounds as f64);
        metrics::histogram!(
            "parley_exchange_duration_seconds",
            "backend" => outcome.backend.to_string(),
            "status" => "success"
        )
        .record(elapsed.as_secs_f64());
    }

    fn on_exchange_failure(&self, _exchange_id: &ExchangeId, error: &ChatError, elapsed: Duration) {
        metrics::counter!(
            "parley_exchange_failure_total",
            "error_kind" => format!("{:?}", error.kind())
        )
        .increment(1);
        metrics::histogram!("parley_exchange_duration_seconds", "status" => "failure")
            .record(elapsed.as_secs_f64());
    }
}
