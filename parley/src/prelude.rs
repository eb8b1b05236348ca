//! Common imports for most parley applications.

pub use crate::{
    assistant_message, build_engine, build_engine_from_env, exchange, parse_backend_kind,
    streaming_exchange, system_message, tool_message, user_message,
};
pub use crate::{parley_messages, parley_msg, parley_request};
pub use crate::{
    Answer, BackendKind, BoxFuture, CancellationToken, ChatError, ChatErrorKind, ChatPolicy,
    ConfigError, Conversation, DefaultToolRuntime, Device, EngineConfig, ExchangeEngine,
    ExchangeEngineBuilder, ExchangeEvent, ExchangeId, ExchangeOutcome, ExchangeRequest,
    ExchangeStream, Message, Observability, ProviderError, ProviderErrorKind, ProviderSelector,
    Role, Tool, ToolCall, ToolDefinition, ToolError, ToolExecutionContext, ToolExecutionResult,
    ToolRegistry, ToolRuntime,
};
