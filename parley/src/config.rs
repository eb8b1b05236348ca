//! Engine configuration collected from builder calls or the process environment.
//!
//! ```rust
//! use std::time::Duration;
//!
//! use parley::EngineConfig;
//!
//! let config = EngineConfig::from_lookup(|name| match name {
//!     "OLLAMA_MODEL" => Some("llama3.2".to_string()),
//!     "PARLEY_DEVICES" => Some("10.0.0.7:8080, 10.0.0.8:8080".to_string()),
//!     _ => None,
//! })
//! .expect("valid configuration");
//!
//! assert_eq!(config.ollama_model.as_deref(), Some("llama3.2"));
//! assert_eq!(config.devices.len(), 2);
//! assert_eq!(config.http_timeout, Duration::from_secs(90));
//! ```

use std::time::Duration;

use pchat::DEFAULT_MAX_TOOL_ROUND_TRIPS;
use pprovider::{BackendKind, Device, ProviderError, ProviderSelector, SecretString};
use thiserror::Error;

pub const OPENAI_API_KEY_VAR: &str = "OPENAI_API_KEY";
pub const OPENAI_BASE_VAR: &str = "OPENAI_BASE";
pub const OPENAI_MODEL_VAR: &str = "OPENAI_MODEL";
pub const OLLAMA_BASE_VAR: &str = "OLLAMA_BASE";
pub const OLLAMA_MODEL_VAR: &str = "OLLAMA_MODEL";
pub const DEVICES_VAR: &str = "PARLEY_DEVICES";
pub const MAX_TOOL_ROUNDS_VAR: &str = "PARLEY_MAX_TOOL_ROUNDS";
pub const HTTP_TIMEOUT_VAR: &str = "PARLEY_HTTP_TIMEOUT_SECS";

pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(90);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{variable}: invalid value '{value}': {reason}")]
    InvalidValue {
        variable: &'static str,
        value: String,
        reason: String,
    },
    #[error("{variable}: {source}")]
    InvalidDevice {
        variable: &'static str,
        #[source]
        source: ProviderError,
    },
    #[error("failed to build http client: {0}")]
    HttpClient(#[source] ProviderError),
}

/// Which observability hooks [`build_engine`](crate::build_engine) attaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Observability {
    #[default]
    Disabled,
    Tracing,
    Metrics,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub openai_base: Option<String>,
    pub openai_model: Option<String>,
    pub openai_api_key: Option<SecretString>,
    pub ollama_base: Option<String>,
    pub ollama_model: Option<String>,
    pub devices: Vec<Device>,
    pub max_tool_round_trips: usize,
    pub tool_timeout: Option<Duration>,
    pub http_timeout: Duration,
    pub observability: Observability,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            openai_base: None,
            openai_model: None,
            openai_api_key: None,
            ollama_base: None,
            ollama_model: None,
            devices: Vec::new(),
            max_tool_round_trips: DEFAULT_MAX_TOOL_ROUND_TRIPS,
            tool_timeout: None,
            http_timeout: DEFAULT_HTTP_TIMEOUT,
            observability: Observability::Disabled,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads every setting through `lookup`; unset and blank values keep defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self {
            openai_base: read(OPENAI_BASE_VAR),
            openai_model: read(OPENAI_MODEL_VAR),
            openai_api_key: read(OPENAI_API_KEY_VAR).map(SecretString::new),
            ollama_base: read(OLLAMA_BASE_VAR),
            ollama_model: read(OLLAMA_MODEL_VAR),
            ..Self::default()
        };

        if let Some(devices) = read(DEVICES_VAR) {
            config.devices = parse_devices(&devices).map_err(|source| {
                ConfigError::InvalidDevice {
                    variable: DEVICES_VAR,
                    source,
                }
            })?;
        }

        if let Some(value) = read(MAX_TOOL_ROUNDS_VAR) {
            config.max_tool_round_trips = parse_number(MAX_TOOL_ROUNDS_VAR, &value)?;
        }

        if let Some(value) = read(HTTP_TIMEOUT_VAR) {
            let seconds = parse_number(HTTP_TIMEOUT_VAR, &value)?;
            if seconds == 0 {
                return Err(ConfigError::InvalidValue {
                    variable: HTTP_TIMEOUT_VAR,
                    value,
                    reason: "timeout must be at least one second".to_string(),
                });
            }
            config.http_timeout = Duration::from_secs(seconds as u64);
        }

        Ok(config)
    }

    pub fn with_openai_base(mut self, base: impl Into<String>) -> Self {
        self.openai_base = Some(base.into());
        self
    }

    pub fn with_openai_model(mut self, model: impl Into<String>) -> Self {
        self.openai_model = Some(model.into());
        self
    }

    pub fn with_openai_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.openai_api_key = Some(SecretString::new(api_key));
        self
    }

    pub fn with_ollama_base(mut self, base: impl Into<String>) -> Self {
        self.ollama_base = Some(base.into());
        self
    }

    pub fn with_ollama_model(mut self, model: impl Into<String>) -> Self {
        self.ollama_model = Some(model.into());
        self
    }

    pub fn with_device(mut self, device: Device) -> Self {
        self.devices.push(device);
        self
    }

    pub fn with_devices(mut self, devices: Vec<Device>) -> Self {
        self.devices = devices;
        self
    }

    pub fn with_max_tool_round_trips(mut self, max_tool_round_trips: usize) -> Self {
        self.max_tool_round_trips = max_tool_round_trips;
        self
    }

    pub fn with_tool_timeout(mut self, timeout: Duration) -> Self {
        self.tool_timeout = Some(timeout);
        self
    }

    pub fn with_http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }

    pub fn with_observability(mut self, observability: Observability) -> Self {
        self.observability = observability;
        self
    }

    /// Applies the backend overrides on top of the built-in defaults.
    pub fn selector(&self) -> ProviderSelector {
        let mut selector = ProviderSelector::new();

        if let Some(base) = &self.openai_base {
            selector = selector.with_endpoint(BackendKind::OpenAi, base.clone());
        }
        if let Some(model) = &self.openai_model {
            selector = selector.with_default_model(BackendKind::OpenAi, model.clone());
        }
        if let Some(api_key) = &self.openai_api_key {
            selector = selector.with_api_key(BackendKind::OpenAi, api_key.clone());
        }
        if let Some(base) = &self.ollama_base {
            selector = selector.with_endpoint(BackendKind::Ollama, base.clone());
        }
        if let Some(model) = &self.ollama_model {
            selector = selector.with_default_model(BackendKind::Ollama, model.clone());
        }

        selector
    }
}

/// Parses a comma-separated `host:port` list, skipping empty entries.
pub fn parse_devices(value: &str) -> Result<Vec<Device>, ProviderError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::parse::<Device>)
        .collect()
}

fn parse_number(variable: &'static str, value: &str) -> Result<usize, ConfigError> {
    value
        .parse::<usize>()
        .map_err(|err| ConfigError::InvalidValue {
            variable,
            value: value.to_string(),
            reason: err.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let values = pairs
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect::<HashMap<_, _>>();
        move |name| values.get(name).cloned()
    }

    #[test]
    fn empty_environment_keeps_defaults() {
        let config = EngineConfig::from_lookup(|_| None).expect("defaults");

        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.max_tool_round_trips, DEFAULT_MAX_TOOL_ROUND_TRIPS);
        assert_eq!(config.http_timeout, DEFAULT_HTTP_TIMEOUT);
        assert!(config.devices.is_empty());
    }

    #[test]
    fn environment_overrides_flow_into_the_selector() {
        let config = EngineConfig::from_lookup(lookup_from(&[
            (OPENAI_API_KEY_VAR, " sk-test "),
            (OPENAI_BASE_VAR, "http://proxy.internal/v1"),
            (OLLAMA_MODEL_VAR, "llama3.2"),
            (MAX_TOOL_ROUNDS_VAR, "3"),
            (HTTP_TIMEOUT_VAR, "15"),
            (OLLAMA_BASE_VAR, "   "),
        ]))
        .expect("valid configuration");

        assert_eq!(config.max_tool_round_trips, 3);
        assert_eq!(config.http_timeout, Duration::from_secs(15));
        assert_eq!(config.ollama_base, None);

        let selector = config.selector();
        let openai = selector.resolve(Some("openai")).expect("openai");
        assert_eq!(openai.endpoint_base, "http://proxy.internal/v1");
        assert_eq!(
            openai.api_key.as_ref().map(SecretString::expose),
            Some("sk-test")
        );

        let ollama = selector.resolve(Some("ollama")).expect("ollama");
        assert_eq!(ollama.default_model, "llama3.2");
        assert_eq!(ollama.endpoint_base, pprovider::OLLAMA_BASE_URL);
    }

    #[test]
    fn devices_are_parsed_from_a_comma_separated_list() {
        let config = EngineConfig::from_lookup(lookup_from(&[(
            DEVICES_VAR,
            "10.0.0.7:8080, ,kitchen.local:9000",
        )]))
        .expect("valid devices");

        assert_eq!(
            config.devices,
            vec![
                Device::new("10.0.0.7", 8080),
                Device::new("kitchen.local", 9000)
            ]
        );
    }

    #[test]
    fn invalid_values_name_the_variable() {
        let err = EngineConfig::from_lookup(lookup_from(&[(DEVICES_VAR, "10.0.0.7")]))
            .expect_err("port missing");
        assert!(matches!(err, ConfigError::InvalidDevice { variable, .. } if variable == DEVICES_VAR));

        let err = EngineConfig::from_lookup(lookup_from(&[(MAX_TOOL_ROUNDS_VAR, "many")]))
            .expect_err("not a number");
        assert!(err.to_string().starts_with(MAX_TOOL_ROUNDS_VAR));

        let err = EngineConfig::from_lookup(lookup_from(&[(HTTP_TIMEOUT_VAR, "0")]))
            .expect_err("zero timeout");
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn builder_methods_override_fields() {
        let config = EngineConfig::new()
            .with_ollama_base("http://gpu-box:11434")
            .with_device(Device::new("a", 1))
            .with_tool_timeout(Duration::from_millis(250))
            .with_observability(Observability::Tracing);

        assert_eq!(config.ollama_base.as_deref(), Some("http://gpu-box:11434"));
        assert_eq!(config.devices.len(), 1);
        assert_eq!(config.tool_timeout, Some(Duration::from_millis(250)));
        assert_eq!(config.observability, Observability::Tracing);
    }
}
