use std::sync::{Arc, Mutex};
use std::time::Duration;

use pchat::{ChatError, Conversation, ExchangeHooks, ExchangeOutcome};
use pcommon::ExchangeId;
use pprovider::{BackendKind, Device, ProviderError, ToolCall, TransportHooks};
use ptooling::{ToolError, ToolExecutionContext, ToolExecutionResult, ToolRuntimeHooks};
use serde_json::json;

use crate::{
    MetricsObservabilityHooks, SafeExchangeHooks, SafeToolHooks, SafeTransportHooks,
    TracingObservabilityHooks,
};

fn sample_tool_call() -> ToolCall {
    ToolCall::new("call-1", "get_current_weather", "{\"location\":\"Warsaw\"}")
}

fn sample_tool_context() -> ToolExecutionContext {
    ToolExecutionContext::new("exchange-1").with_trace_id("trace-1")
}

fn sample_tool_result() -> ToolExecutionResult {
    ToolExecutionResult::from_call(&sample_tool_call(), json!({"temperature": "22"}), false)
}

fn sample_outcome() -> ExchangeOutcome {
    ExchangeOutcome {
        exchange_id: ExchangeId::from("exchange-1"),
        backend: BackendKind::Ollama,
        answer: "It is 22C and cloudy.".to_string(),
        conversation: Conversation::seeded(None, Vec::new(), "weather in Warsaw?"),
        tool_rounds: 1,
        broadcast: None,
    }
}

fn exercise_transport_hooks(hooks: &dyn TransportHooks) {
    let error = ProviderError::http_status("openai", 503, "service unavailable", None);

    hooks.on_request_start(BackendKind::OpenAi, "gpt-3.5-turbo", true);
    hooks.on_request_success(
        BackendKind::OpenAi,
        "gpt-3.5-turbo",
        true,
        Duration::from_millis(10),
    );
    hooks.on_request_failure(
        BackendKind::OpenAi,
        "gpt-3.5-turbo",
        false,
        &error,
        Duration::from_millis(10),
    );
    hooks.on_device_failure(
        &Device::new("10.0.0.2", 8080),
        &ProviderError::transport("local", "connection refused"),
    );
}

fn exercise_tool_hooks(hooks: &dyn ToolRuntimeHooks) {
    hooks.on_execution_start(&sample_tool_call(), &sample_tool_context());
    hooks.on_execution_success(
        &sample_tool_call(),
        &sample_tool_context(),
        &sample_tool_result(),
        Duration::from_millis(20),
    );
    hooks.on_execution_failure(
        &sample_tool_call(),
        &sample_tool_context(),
        &ToolError::execution("weather service offline"),
        Duration::from_millis(20),
    );
    hooks.on_unknown_tool(&sample_tool_call(), &sample_tool_context());
}

fn exercise_exchange_hooks(hooks: &dyn ExchangeHooks) {
    let exchange_id = ExchangeId::from("exchange-1");

    hooks.on_round_start(&exchange_id, BackendKind::Ollama, 1);
    hooks.on_tool_round_complete(&exchange_id, 1, &[sample_tool_result()]);
    hooks.on_exchange_complete(&exchange_id, &sample_outcome(), Duration::from_millis(30));
    hooks.on_exchange_failure(
        &exchange_id,
        &ChatError::IterationLimitExceeded { limit: 8 },
        Duration::from_millis(30),
    );
}

#[test]
fn tracing_hooks_smoke_test_all_callbacks() {
    let hooks = TracingObservabilityHooks;

    exercise_transport_hooks(&hooks);
    exercise_tool_hooks(&hooks);
    exercise_exchange_hooks(&hooks);
}

#[test]
fn metrics_hooks_smoke_test_all_callbacks() {
    let hooks = MetricsObservabilityHooks;

    exercise_transport_hooks(&hooks);
    exercise_tool_hooks(&hooks);
    exercise_exchange_hooks(&hooks);
}

#[derive(Default, Clone)]
struct RecordingHooks {
    events: Arc<Mutex<Vec<&'static str>>>,
}

impl RecordingHooks {
    fn record(&self, event: &'static str) {
        self.events.lock().expect("events lock").push(event);
    }
}

impl TransportHooks for RecordingHooks {
    fn on_request_start(&self, _backend: BackendKind, _model: &str, _streaming: bool) {
        self.record("request_start");
    }

    fn on_request_success(
        &self,
        _backend: BackendKind,
        _model: &str,
        _streaming: bool,
        _elapsed: Duration,
    ) {
        self.record("request_success");
    }

    fn on_request_failure(
        &self,
        _backend: BackendKind,
        _model: &str,
        _streaming: bool,
        _error: &ProviderError,
        _elapsed: Duration,
    ) {
        self.record("request_failure");
    }

    fn on_device_failure(&self, _device: &Device, _error: &ProviderError) {
        self.record("device_failure");
    }
}

impl ToolRuntimeHooks for RecordingHooks {
    fn on_unknown_tool(&self, _tool_call: &ToolCall, _context: &ToolExecutionContext) {
        self.record("unknown");
    }

    fn on_execution_start(&self, _tool_call: &ToolCall, _context: &ToolExecutionContext) {
        self.record("start");
    }

    fn on_execution_success(
        &self,
        _tool_call: &ToolCall,
        _context: &ToolExecutionContext,
        _result: &ToolExecutionResult,
        _elapsed: Duration,
    ) {
        self.record("success");
    }

    fn on_execution_failure(
        &self,
        _tool_call: &ToolCall,
        _context: &ToolExecutionContext,
        _error: &ToolError,
        _elapsed: Duration,
    ) {
        self.record("failure");
    }
}

impl ExchangeHooks for RecordingHooks {
    fn on_round_start(&self, _exchange_id: &ExchangeId, _backend: BackendKind, _round: usize) {
        self.record("round_start");
    }

    fn on_tool_round_complete(
        &self,
        _exchange_id: &ExchangeId,
        _round: usize,
        _results: &[ToolExecutionResult],
    ) {
        self.record("tool_round_complete");
    }

    fn on_exchange_complete(
        &self,
        _exchange_id: &ExchangeId,
        _outcome: &ExchangeOutcome,
        _elapsed: Duration,
    ) {
        self.record("exchange_complete");
    }

    fn on_exchange_failure(&self, _exchange_id: &ExchangeId, _error: &ChatError, _elapsed: Duration) {
        self.record("exchange_failure");
    }
}

struct PanicHooks;

impl TransportHooks for PanicHooks {
    fn on_request_start(&self, _backend: BackendKind, _model: &str, _streaming: bool) {
        panic!("request_start panic");
    }

    fn on_request_success(
        &self,
        _backend: BackendKind,
        _model: &str,
        _streaming: bool,
        _elapsed: Duration,
    ) {
        panic!("request_success panic");
    }

    fn on_request_failure(
        &self,
        _backend: BackendKind,
        _model: &str,
        _streaming: bool,
        _error: &ProviderError,
        _elapsed: Duration,
    ) {
        panic!("request_failure panic");
    }

    fn on_device_failure(&self, _device: &Device, _error: &ProviderError) {
        panic!("device_failure panic");
    }
}

impl ToolRuntimeHooks for PanicHooks {
    fn on_unknown_tool(&self, _tool_call: &ToolCall, _context: &ToolExecutionContext) {
        panic!("unknown panic");
    }

    fn on_execution_start(&self, _tool_call: &ToolCall, _context: &ToolExecutionContext) {
        panic!("start panic");
    }

    fn on_execution_success(
        &self,
        _tool_call: &ToolCall,
        _context: &ToolExecutionContext,
        _result: &ToolExecutionResult,
        _elapsed: Duration,
    ) {
        panic!("success panic");
    }

    fn on_execution_failure(
        &self,
        _tool_call: &ToolCall,
        _context: &ToolExecutionContext,
        _error: &ToolError,
        _elapsed: Duration,
    ) {
        panic!("failure panic");
    }
}

impl ExchangeHooks for PanicHooks {
    fn on_round_start(&self, _exchange_id: &ExchangeId, _backend: BackendKind, _round: usize) {
        panic!("round_start panic");
    }

    fn on_tool_round_complete(
        &self,
        _exchange_id: &ExchangeId,
        _round: usize,
        _results: &[ToolExecutionResult],
    ) {
        panic!("tool_round_complete panic");
    }

    fn on_exchange_complete(
        &self,
        _exchange_id: &ExchangeId,
        _outcome: &ExchangeOutcome,
        _elapsed: Duration,
    ) {
        panic!("exchange_complete panic");
    }

    fn on_exchange_failure(&self, _exchange_id: &ExchangeId, _error: &ChatError, _elapsed: Duration) {
        panic!("exchange_failure panic");
    }
}

#[test]
fn safe_transport_hooks_delegate_when_inner_succeeds() {
    let inner = RecordingHooks::default();
    let events = Arc::clone(&inner.events);

    exercise_transport_hooks(&SafeTransportHooks::new(inner));

    assert_eq!(
        *events.lock().expect("events lock"),
        vec![
            "request_start",
            "request_success",
            "request_failure",
            "device_failure"
        ]
    );
}

#[test]
fn safe_tool_hooks_delegate_when_inner_succeeds() {
    let inner = RecordingHooks::default();
    let events = Arc::clone(&inner.events);

    exercise_tool_hooks(&SafeToolHooks::new(inner));

    assert_eq!(
        *events.lock().expect("events lock"),
        vec!["start", "success", "failure", "unknown"]
    );
}

#[test]
fn safe_exchange_hooks_delegate_when_inner_succeeds() {
    let inner = RecordingHooks::default();
    let events = Arc::clone(&inner.events);

    exercise_exchange_hooks(&SafeExchangeHooks::new(inner));

    assert_eq!(events.lock().expect("events lock").len(), 4);
}

#[test]
fn safe_hooks_swallow_panics() {
    exercise_transport_hooks(&SafeTransportHooks::new(PanicHooks));
    exercise_tool_hooks(&SafeToolHooks::new(PanicHooks));
    exercise_exchange_hooks(&SafeExchangeHooks::new(PanicHooks));
}
