//! Unified facade over the parley workspace crates.
//!
//! This crate is meant to be the single dependency for most applications.
//! It re-exports the core parley crates and adds environment configuration,
//! engine wiring, and macros for common request-building flows.
//!
//! ```rust
//! use parley::{EngineConfig, ToolRegistry, build_engine, parley_request};
//!
//! let engine = build_engine(&EngineConfig::new(), ToolRegistry::new()).expect("engine");
//! let request = parley_request!(openai, "Hello there").enable_streaming();
//!
//! assert_eq!(engine.policy().max_tool_round_trips, 8);
//! assert!(request.stream);
//! ```

mod config;
mod macros;

pub mod prelude;
pub mod runtime;
pub mod util;

pub use pchat;
pub use pcommon;
pub use pobserve;
pub use pprovider;
pub use ptooling;

pub use pchat::sse;
pub use pchat::{
    Answer, CancellationToken, ChatError, ChatErrorKind, ChatPolicy, Conversation,
    DEFAULT_MAX_TOOL_ROUND_TRIPS, ExchangeEngine, ExchangeEngineBuilder, ExchangeEvent,
    ExchangeHooks, ExchangeOutcome, ExchangeRequest, ExchangeStream, NoopExchangeHooks,
};
pub use pcommon::{BoxFuture, ExchangeId, GenerationOptions, MetadataMap, TraceId};
pub use pobserve::{
    MetricsObservabilityHooks, SafeExchangeHooks, SafeToolHooks, SafeTransportHooks,
    TracingObservabilityHooks,
};
pub use pprovider::{
    BackendConfig, BackendKind, BackendRequest, BackendTransport, BroadcastReport, Device,
    DeviceBroadcaster, DeviceOutcome, FramingMode, HttpDeviceBroadcaster, HttpTransport, Message,
    NoopTransportHooks, ProviderError, ProviderErrorKind, ProviderFuture, ProviderSelector, Reply,
    ReplyDelta, ReplyStream, Role, SecretString, ToolCall, ToolDefinition, TransportHooks,
};
pub use ptooling::{
    DefaultToolRuntime, FunctionTool, NoopToolRuntimeHooks, Tool, ToolError, ToolErrorKind,
    ToolExecutionContext, ToolExecutionResult, ToolFuture, ToolRegistry, ToolRuntime,
    ToolRuntimeHooks, object_arguments, optional_string, parse_json_object, parse_json_value,
    required_string,
};

pub use config::{
    ConfigError, DEFAULT_HTTP_TIMEOUT, DEVICES_VAR, EngineConfig, HTTP_TIMEOUT_VAR,
    MAX_TOOL_ROUNDS_VAR, OLLAMA_BASE_VAR, OLLAMA_MODEL_VAR, OPENAI_API_KEY_VAR, OPENAI_BASE_VAR,
    OPENAI_MODEL_VAR, Observability, parse_devices,
};
pub use runtime::{build_engine, build_engine_from_env};
pub use util::{
    assistant_message, exchange, parse_backend_kind, streaming_exchange, system_message,
    tool_message, user_message,
};
