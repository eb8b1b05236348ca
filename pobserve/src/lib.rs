//! Production-friendly observability hooks for transport, tool, and exchange phases.
//!
//! ```rust
//! use pobserve::{MetricsObservabilityHooks, SafeTransportHooks, TracingObservabilityHooks};
//!
//! let _transport_hooks = SafeTransportHooks::new(TracingObservabilityHooks);
//! let _metrics = MetricsObservabilityHooks;
//! ```

mod metrics_hooks;
mod safe_hooks;
mod tracing_hooks;

pub use metrics_hooks::MetricsObservabilityHooks;
pub use safe_hooks::{SafeExchangeHooks, SafeToolHooks, SafeTransportHooks};
pub use tracing_hooks::TracingObservabilityHooks;

pub mod prelude {
    pub use crate::{
        MetricsObservabilityHooks, SafeExchangeHooks, SafeToolHooks, SafeTransportHooks,
        TracingObservabilityHooks,
    };
}

#[cfg(test)]
mod tests;
