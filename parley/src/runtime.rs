//! Engine wiring helpers.

use std::sync::Arc;

use pchat::{ExchangeEngine, ExchangeHooks};
use pobserve::{
    MetricsObservabilityHooks, SafeExchangeHooks, SafeToolHooks, SafeTransportHooks,
    TracingObservabilityHooks,
};
use pprovider::{
    BackendTransport, DeviceBroadcaster, HttpDeviceBroadcaster, HttpTransport, TransportHooks,
};
use ptooling::{DefaultToolRuntime, ToolRegistry, ToolRuntime, ToolRuntimeHooks};

use crate::{ConfigError, EngineConfig, Observability};

struct HookSet {
    transport: Arc<dyn TransportHooks>,
    tools: Arc<dyn ToolRuntimeHooks>,
    exchange: Arc<dyn ExchangeHooks>,
}

impl HookSet {
    fn for_mode(observability: Observability) -> Option<Self> {
        match observability {
            Observability::Disabled => None,
            Observability::Tracing => Some(Self::wrapping(TracingObservabilityHooks)),
            Observability::Metrics => Some(Self::wrapping(MetricsObservabilityHooks)),
        }
    }

    fn wrapping<H>(hooks: H) -> Self
    where
        H: TransportHooks + ToolRuntimeHooks + ExchangeHooks + Clone + 'static,
    {
        Self {
            transport: Arc::new(SafeTransportHooks::new(hooks.clone())),
            tools: Arc::new(SafeToolHooks::new(hooks.clone())),
            exchange: Arc::new(SafeExchangeHooks::new(hooks)),
        }
    }
}

/// Builds an engine that talks HTTP to the configured backends and devices.
///
/// The broadcaster is only attached when at least one device is configured, so
/// a `local` selector without devices fails the exchange as an invalid request.
pub fn build_engine(config: &EngineConfig, tools: ToolRegistry) -> Result<ExchangeEngine, ConfigError> {
    let hooks = HookSet::for_mode(config.observability);

    let mut transport =
        HttpTransport::with_timeout(config.http_timeout).map_err(ConfigError::HttpClient)?;
    let mut broadcaster = (!config.devices.is_empty())
        .then(|| HttpDeviceBroadcaster::new(transport.client().clone(), config.devices.clone()));
    let mut runtime = DefaultToolRuntime::new(Arc::new(tools));
    if let Some(timeout) = config.tool_timeout {
        runtime = runtime.with_timeout(timeout);
    }

    if let Some(hooks) = &hooks {
        transport = transport.with_hooks(Arc::clone(&hooks.transport));
        broadcaster = broadcaster.map(|b| b.with_hooks(Arc::clone(&hooks.transport)));
        runtime = runtime.with_hooks(Arc::clone(&hooks.tools));
    }

    let transport: Arc<dyn BackendTransport> = Arc::new(transport);
    let runtime: Arc<dyn ToolRuntime> = Arc::new(runtime);
    let mut builder = ExchangeEngine::builder(transport)
        .selector(config.selector())
        .tool_runtime(runtime)
        .max_tool_round_trips(config.max_tool_round_trips);

    if let Some(broadcaster) = broadcaster {
        let broadcaster: Arc<dyn DeviceBroadcaster> = Arc::new(broadcaster);
        builder = builder.broadcaster(broadcaster);
    }
    if let Some(hooks) = hooks {
        builder = builder.hooks(hooks.exchange);
    }

    Ok(builder.build())
}

/// Same as [`build_engine`] with the configuration read from the environment.
pub fn build_engine_from_env(tools: ToolRegistry) -> Result<ExchangeEngine, ConfigError> {
    build_engine(&EngineConfig::from_env()?, tools)
}
