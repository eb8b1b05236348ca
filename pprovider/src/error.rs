//! Provider error taxonomy.
//!
//! ```rust
//! use pprovider::{ProviderError, ProviderErrorKind};
//!
//! let err = ProviderError::transport("ollama", "connection refused");
//! assert_eq!(err.kind(), ProviderErrorKind::Transport);
//! assert!(!err.is_user_error());
//!
//! let err = ProviderError::UnsupportedProvider("gemini".to_string());
//! assert!(err.is_user_error());
//! ```

use thiserror::Error;

const PREVIEW_LIMIT: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    SelectorRequired,
    UnsupportedProvider,
    Transport,
    Decode,
    InvalidRequest,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("a backend selector is required")]
    SelectorRequired,

    #[error("unsupported provider '{0}'")]
    UnsupportedProvider(String),

    #[error("{selector} backend unavailable: {detail}")]
    TransportFailure {
        selector: String,
        detail: String,
        status: Option<u16>,
        payload: Option<String>,
    },

    #[error("malformed backend data ({reason}): {}", preview(.raw))]
    Decode { raw: String, reason: String },

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("exchange cancelled")]
    Cancelled,
}

impl ProviderError {
    pub fn transport(selector: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::TransportFailure {
            selector: selector.into(),
            detail: detail.into(),
            status: None,
            payload: None,
        }
    }

    pub fn http_status(
        selector: impl Into<String>,
        status: u16,
        detail: impl Into<String>,
        payload: Option<String>,
    ) -> Self {
        Self::TransportFailure {
            selector: selector.into(),
            detail: detail.into(),
            status: Some(status),
            payload,
        }
    }

    pub fn decode(raw: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Decode {
            raw: raw.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    pub fn kind(&self) -> ProviderErrorKind {
        match self {
            Self::SelectorRequired => ProviderErrorKind::SelectorRequired,
            Self::UnsupportedProvider(_) => ProviderErrorKind::UnsupportedProvider,
            Self::TransportFailure { .. } => ProviderErrorKind::Transport,
            Self::Decode { .. } => ProviderErrorKind::Decode,
            Self::InvalidRequest(_) => ProviderErrorKind::InvalidRequest,
            Self::Cancelled => ProviderErrorKind::Cancelled,
        }
    }

    /// True when the caller can fix the failure by changing its input.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self.kind(),
            ProviderErrorKind::SelectorRequired
                | ProviderErrorKind::UnsupportedProvider
                | ProviderErrorKind::InvalidRequest
        )
    }

    /// The undecodable text, for decode errors.
    pub fn raw_fragment(&self) -> Option<&str> {
        match self {
            Self::Decode { raw, .. } => Some(raw),
            _ => None,
        }
    }

    /// HTTP status of a non-2xx backend or device reply.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::TransportFailure { status, .. } => *status,
            _ => None,
        }
    }

    /// The backend's own error body, for transport failures that received one.
    pub fn payload(&self) -> Option<&str> {
        match self {
            Self::TransportFailure { payload, .. } => payload.as_deref(),
            _ => None,
        }
    }
}

fn preview(raw: &str) -> String {
    if raw.len() <= PREVIEW_LIMIT {
        return raw.to_string();
    }

    let mut end = PREVIEW_LIMIT;
    while !raw.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &raw[..end])
}
