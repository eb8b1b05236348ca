//! Resolution of caller-supplied selector strings into backend configuration.
//!
//! ```rust
//! use pprovider::{BackendKind, FramingMode, ProviderSelector};
//!
//! let selector = ProviderSelector::new().with_default_model(BackendKind::Ollama, "llama3.2");
//! let config = selector.resolve(Some(" Self-Hosted ")).expect("alias should resolve");
//!
//! assert_eq!(config.kind, BackendKind::Ollama);
//! assert_eq!(config.selector, "ollama");
//! assert_eq!(config.default_model, "llama3.2");
//! assert_eq!(config.framing, Some(FramingMode::Ndjson));
//! ```

use std::fmt::{Display, Formatter};

use crate::{FramingMode, ProviderError, SecretString};

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const OPENAI_DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const OLLAMA_BASE_URL: &str = "http://localhost:11434";
pub const OLLAMA_DEFAULT_MODEL: &str = "MFDoom/deepseek-r1-tool-calling:8b";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BackendKind {
    OpenAi,
    Ollama,
    LocalBroadcast,
}

impl BackendKind {
    pub const ALL: [BackendKind; 3] = [Self::OpenAi, Self::Ollama, Self::LocalBroadcast];

    /// Canonical selector name.
    pub fn selector(self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Ollama => "ollama",
            Self::LocalBroadcast => "local",
        }
    }

    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::OpenAi => &["openai", "cloud"],
            Self::Ollama => &["ollama", "self-hosted", "selfhosted"],
            Self::LocalBroadcast => &["local", "broadcast", "local-broadcast"],
        }
    }

    /// Case-insensitive, whitespace-trimmed alias lookup.
    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.aliases().contains(&normalized.as_str()))
    }

    /// `None` for the broadcast backend, which exchanges no framed replies.
    pub fn framing(self) -> Option<FramingMode> {
        match self {
            Self::OpenAi => Some(FramingMode::EventStream),
            Self::Ollama => Some(FramingMode::Ndjson),
            Self::LocalBroadcast => None,
        }
    }

    pub fn is_broadcast(self) -> bool {
        matches!(self, Self::LocalBroadcast)
    }
}

impl Display for BackendKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.selector())
    }
}

/// Resolved once per exchange and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    pub kind: BackendKind,
    pub selector: String,
    pub endpoint_base: String,
    pub default_model: String,
    pub framing: Option<FramingMode>,
    pub api_key: Option<SecretString>,
}

impl BackendConfig {
    /// Joins `path` onto the endpoint base without doubling slashes.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.endpoint_base.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct BackendProfile {
    endpoint_base: String,
    default_model: String,
    api_key: Option<SecretString>,
}

impl BackendProfile {
    fn new(endpoint_base: &str, default_model: &str) -> Self {
        Self {
            endpoint_base: endpoint_base.to_string(),
            default_model: default_model.to_string(),
            api_key: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSelector {
    openai: BackendProfile,
    ollama: BackendProfile,
}

impl Default for ProviderSelector {
    fn default() -> Self {
        Self {
            openai: BackendProfile::new(OPENAI_BASE_URL, OPENAI_DEFAULT_MODEL),
            ollama: BackendProfile::new(OLLAMA_BASE_URL, OLLAMA_DEFAULT_MODEL),
        }
    }
}

impl ProviderSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_endpoint(mut self, kind: BackendKind, endpoint_base: impl Into<String>) -> Self {
        if let Some(profile) = self.profile_mut(kind) {
            profile.endpoint_base = endpoint_base.into();
        }
        self
    }

    pub fn with_default_model(mut self, kind: BackendKind, model: impl Into<String>) -> Self {
        if let Some(profile) = self.profile_mut(kind) {
            profile.default_model = model.into();
        }
        self
    }

    pub fn with_api_key(mut self, kind: BackendKind, api_key: SecretString) -> Self {
        if let Some(profile) = self.profile_mut(kind) {
            profile.api_key = (!api_key.is_empty()).then_some(api_key);
        }
        self
    }

    pub fn resolve(&self, selector: Option<&str>) -> Result<BackendConfig, ProviderError> {
        let raw = match selector.map(str::trim) {
            Some(value) if !value.is_empty() => value,
            _ => return Err(ProviderError::SelectorRequired),
        };

        let kind = BackendKind::parse(raw)
            .ok_or_else(|| ProviderError::UnsupportedProvider(raw.to_string()))?;

        let config = match kind {
            BackendKind::OpenAi => self.config_for(kind, &self.openai),
            BackendKind::Ollama => self.config_for(kind, &self.ollama),
            BackendKind::LocalBroadcast => BackendConfig {
                kind,
                selector: kind.selector().to_string(),
                endpoint_base: String::new(),
                default_model: String::new(),
                framing: None,
                api_key: None,
            },
        };

        Ok(config)
    }

    fn config_for(&self, kind: BackendKind, profile: &BackendProfile) -> BackendConfig {
        BackendConfig {
            kind,
            selector: kind.selector().to_string(),
            endpoint_base: profile.endpoint_base.clone(),
            default_model: profile.default_model.clone(),
            framing: kind.framing(),
            api_key: profile.api_key.clone(),
        }
    }

    fn profile_mut(&mut self, kind: BackendKind) -> Option<&mut BackendProfile> {
        match kind {
            BackendKind::OpenAi => Some(&mut self.openai),
            BackendKind::Ollama => Some(&mut self.ollama),
            BackendKind::LocalBroadcast => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ProviderErrorKind;

    #[test]
    fn missing_or_blank_selector_is_required() {
        let selector = ProviderSelector::new();

        assert_eq!(selector.resolve(None), Err(ProviderError::SelectorRequired));
        assert_eq!(
            selector.resolve(Some("   ")),
            Err(ProviderError::SelectorRequired)
        );
    }

    #[test]
    fn unknown_selector_is_rejected_without_fallback() {
        let err = ProviderSelector::new()
            .resolve(Some("gemini"))
            .expect_err("gemini is not a backend");

        assert_eq!(err.kind(), ProviderErrorKind::UnsupportedProvider);
        assert_eq!(err, ProviderError::UnsupportedProvider("gemini".to_string()));
    }

    #[test]
    fn aliases_resolve_case_insensitively() {
        let selector = ProviderSelector::new();

        for (input, kind) in [
            ("OpenAI", BackendKind::OpenAi),
            ("cloud", BackendKind::OpenAi),
            ("ollama", BackendKind::Ollama),
            ("SELFHOSTED", BackendKind::Ollama),
            (" local ", BackendKind::LocalBroadcast),
            ("Broadcast", BackendKind::LocalBroadcast),
        ] {
            let config = selector.resolve(Some(input)).expect("alias should resolve");
            assert_eq!(config.kind, kind, "input {input:?}");
            assert_eq!(config.selector, kind.selector());
        }
    }

    #[test]
    fn backends_carry_their_defaults() {
        let selector = ProviderSelector::new();

        let openai = selector.resolve(Some("openai")).expect("openai");
        assert_eq!(openai.endpoint_base, OPENAI_BASE_URL);
        assert_eq!(openai.default_model, OPENAI_DEFAULT_MODEL);
        assert_eq!(openai.framing, Some(FramingMode::EventStream));

        let ollama = selector.resolve(Some("ollama")).expect("ollama");
        assert_eq!(ollama.endpoint("/api/chat"), "http://localhost:11434/api/chat");

        let local = selector.resolve(Some("local")).expect("local");
        assert_eq!(local.framing, None);
        assert!(local.kind.is_broadcast());
    }

    #[test]
    fn overrides_apply_to_the_named_backend_only() {
        let selector = ProviderSelector::new()
            .with_endpoint(BackendKind::OpenAi, "http://proxy.local/v1/")
            .with_api_key(BackendKind::OpenAi, SecretString::new("sk-test"))
            .with_api_key(BackendKind::Ollama, SecretString::new(""));

        let openai = selector.resolve(Some("openai")).expect("openai");
        assert_eq!(
            openai.endpoint("chat/completions"),
            "http://proxy.local/v1/chat/completions"
        );
        assert_eq!(
            openai.api_key.as_ref().map(SecretString::expose),
            Some("sk-test")
        );

        let ollama = selector.resolve(Some("ollama")).expect("ollama");
        assert!(ollama.api_key.is_none());
        assert_eq!(ollama.endpoint_base, OLLAMA_BASE_URL);
    }
}
