//! Capability layer for registering and executing tools.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use pprovider::ToolDefinition;
//! use ptooling::{DefaultToolRuntime, ToolRegistry, ToolRuntime};
//! use serde_json::json;
//!
//! let mut registry = ToolRegistry::new();
//! registry.register_sync_fn(
//!     ToolDefinition::new("get_time", "Current time", json!({"type": "object"})),
//!     |_args, _ctx| Ok(json!({"time": "12:00"})),
//! );
//!
//! let runtime = DefaultToolRuntime::new(Arc::new(registry));
//! assert_eq!(runtime.definitions()[0].name, "get_time");
//! ```

mod args;
mod error;
mod hooks;
mod registry;
mod runtime;
mod tool;
mod types;

pub mod prelude {
    pub use crate::{
        DefaultToolRuntime, FunctionTool, Tool, ToolError, ToolErrorKind, ToolExecutionContext,
        ToolExecutionResult, ToolFuture, ToolRegistry, ToolRuntime, ToolRuntimeHooks,
    };
}

pub use args::{
    object_arguments, optional_string, parse_json_object, parse_json_value, required_string,
};
pub use error::{INVALID_ARGUMENTS, NOT_IMPLEMENTED, ToolError, ToolErrorKind};
pub use hooks::{NoopToolRuntimeHooks, ToolRuntimeHooks};
pub use registry::ToolRegistry;
pub use runtime::{DefaultToolRuntime, ToolRuntime};
pub use tool::{FunctionTool, Tool, ToolFuture};
pub use types::{ToolExecutionContext, ToolExecutionResult};
