//! Conversational orchestration over chat-completion backends with tool calls.
//!
//! ```rust
//! use pchat::{ChatPolicy, ExchangeRequest};
//!
//! let request = ExchangeRequest::new("weather in Warsaw?")
//!     .with_selector("self-hosted")
//!     .with_system_prompt("answer briefly")
//!     .enable_streaming();
//!
//! assert_eq!(request.selector.as_deref(), Some("self-hosted"));
//! assert_eq!(ChatPolicy::default().max_tool_round_trips, 8);
//! ```

mod engine;
mod error;
mod hooks;
pub mod sse;
mod stream;
mod types;

pub mod prelude {
    pub use crate::{
        Answer, ChatError, ChatErrorKind, ChatPolicy, Conversation, ExchangeEngine,
        ExchangeEngineBuilder, ExchangeEvent, ExchangeHooks, ExchangeOutcome, ExchangeRequest,
        ExchangeStream,
    };
    pub use pcommon::{ExchangeId, MetadataMap, TraceId};
    pub use ptooling::{
        DefaultToolRuntime, Tool, ToolError, ToolErrorKind, ToolExecutionContext,
        ToolExecutionResult, ToolRegistry, ToolRuntime,
    };
}

pub use engine::{ChatPolicy, DEFAULT_MAX_TOOL_ROUND_TRIPS, ExchangeEngine, ExchangeEngineBuilder};
pub use error::{ChatError, ChatErrorKind};
pub use hooks::{ExchangeHooks, NoopExchangeHooks};
pub use pcommon::{ExchangeId, MetadataMap, TraceId};
pub use ptooling::{
    DefaultToolRuntime, Tool, ToolError, ToolErrorKind, ToolExecutionContext, ToolExecutionResult,
    ToolRegistry, ToolRuntime,
};
pub use stream::ExchangeStream;
pub use tokio_util::sync::CancellationToken;
pub use types::{Answer, Conversation, ExchangeEvent, ExchangeOutcome, ExchangeRequest};
