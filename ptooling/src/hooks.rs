//! Lifecycle callbacks around every tool call the runtime executes.
//!
//! ```rust
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! use pprovider::ToolCall;
//! use ptooling::{ToolExecutionContext, ToolRuntimeHooks};
//!
//! #[derive(Default)]
//! struct UnknownToolCounter(AtomicUsize);
//!
//! impl ToolRuntimeHooks for UnknownToolCounter {
//!     fn on_unknown_tool(&self, _tool_call: &ToolCall, _context: &ToolExecutionContext) {
//!         self.0.fetch_add(1, Ordering::Relaxed);
//!     }
//! }
//!
//! let counter = UnknownToolCounter::default();
//! counter.on_unknown_tool(&ToolCall::new("call_0", "fly", "{}"), &ToolExecutionContext::new("exchange-1"));
//! assert_eq!(counter.0.load(Ordering::Relaxed), 1);
//! ```

use std::time::Duration;

use pprovider::ToolCall;

use crate::{ToolError, ToolExecutionContext, ToolExecutionResult};

pub trait ToolRuntimeHooks: Send + Sync {
    /// The model asked for a tool name the registry does not know. Fired before
    /// `on_execution_failure` for the same call.
    fn on_unknown_tool(&self, _tool_call: &ToolCall, _context: &ToolExecutionContext) {}

    fn on_execution_start(&self, _tool_call: &ToolCall, _context: &ToolExecutionContext) {}

    fn on_execution_success(
        &self,
        _tool_call: &ToolCall,
        _context: &ToolExecutionContext,
        _result: &ToolExecutionResult,
        _elapsed: Duration,
    ) {
    }

    fn on_execution_failure(
        &self,
        _tool_call: &ToolCall,
        _context: &ToolExecutionContext,
        _error: &ToolError,
        _elapsed: Duration,
    ) {
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopToolRuntimeHooks;

impl ToolRuntimeHooks for NoopToolRuntimeHooks {}
