use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;

use pchat::{ChatError, ExchangeHooks, ExchangeOutcome};
use pcommon::ExchangeId;
use pprovider::{BackendKind, Device, ProviderError, ToolCall, TransportHooks};
use ptooling::{ToolError, ToolExecutionContext, ToolExecutionResult, ToolRuntimeHooks};

pub struct SafeTransportHooks<H> {
    inner: H,
}

impl<H> SafeTransportHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

impl<H> TransportHooks for SafeTransportHooks<H>
where
    H: TransportHooks,
{
    fn on_request_start(&self, backend: BackendKind, model: &str, streaming: bool) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_request_start(backend, model, streaming)
        }));
    }

    fn on_request_success(
        &self,
        backend: BackendKind,
        model: &str,
        streaming: bool,
        elapsed: Duration,
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner
                .on_request_success(backend, model, streaming, elapsed)
        }));
    }

    fn on_request_failure(
        &self,
        backend: BackendKind,
        model: &str,
        streaming: bool,
        error: &ProviderError,
        elapsed: Duration,
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner
                .on_request_failure(backend, model, streaming, error, elapsed)
        }));
    }

    fn on_device_failure(&self, device: &Device, error: &ProviderError) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_device_failure(device, error)
        }));
    }
}

pub struct SafeToolHooks<H> {
    inner: H,
}

impl<H> SafeToolHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

impl<H> ToolRuntimeHooks for SafeToolHooks<H>
where
    H: ToolRuntimeHooks,
{
    fn on_unknown_tool(&self, tool_call: &ToolCall, context: &ToolExecutionContext) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_unknown_tool(tool_call, context)
        }));
    }

    fn on_execution_start(&self, tool_call: &ToolCall, context: &ToolExecutionContext) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_execution_start(tool_call, context)
        }));
    }

    fn on_execution_success(
        &self,
        tool_call: &ToolCall,
        context: &ToolExecutionContext,
        result: &ToolExecutionResult,
        elapsed: Duration,
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner
                .on_execution_success(tool_call, context, result, elapsed)
        }));
    }

    fn on_execution_failure(
        &self,
        tool_call: &ToolCall,
        context: &ToolExecutionContext,
        error: &ToolError,
        elapsed: Duration,
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner
                .on_execution_failure(tool_call, context, error, elapsed)
        }));
    }
}

pub struct SafeExchangeHooks<H> {
    inner: H,
}

impl<H> SafeExchangeHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

impl<H> ExchangeHooks for SafeExchangeHooks<H>
where
    H: ExchangeHooks,
{
    fn on_round_start(&self, exchange_id: &ExchangeId, backend: BackendKind, round: usize) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_round_start(exchange_id, backend, round)
        }));
    }

    fn on_tool_round_complete(
        &self,
        exchange_id: &ExchangeId,
        round: usize,
        results: &[ToolExecutionResult],
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner
                .on_tool_round_complete(exchange_id, round, results)
        }));
    }

    fn on_exchange_complete(
        &self,
        exchange_id: &ExchangeId,
        outcome: &ExchangeOutcome,
        elapsed: Duration,
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner
                .on_exchange_complete(exchange_id, outcome, elapsed)
        }));
    }

    fn on_exchange_failure(&self, exchange_id: &ExchangeId, error: &ChatError, elapsed: Duration) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_exchange_failure(exchange_id, error, elapsed)
        }));
    }
}
