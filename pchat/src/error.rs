//! Chat-layer errors and classification.
//!
//! ```rust
//! use pchat::{ChatError, ChatErrorKind};
//! use pprovider::ProviderError;
//!
//! let err = ChatError::from(ProviderError::UnsupportedProvider("gemini".into()));
//! assert_eq!(err.kind(), ChatErrorKind::Selector);
//! assert!(err.is_user_error());
//!
//! let err = ChatError::from(ProviderError::transport("ollama", "connection refused"));
//! assert_eq!(err.kind(), ChatErrorKind::Transport);
//! assert!(!err.is_user_error());
//! ```

use pprovider::{ProviderError, ProviderErrorKind};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatErrorKind {
    InvalidRequest,
    Selector,
    Transport,
    Decode,
    IterationLimit,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    #[error(transparent)]
    Provider(ProviderError),

    #[error("tool-call loop exceeded {limit} round trips")]
    IterationLimitExceeded { limit: usize },

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("exchange cancelled")]
    Cancelled,
}

impl ChatError {
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    pub fn kind(&self) -> ChatErrorKind {
        match self {
            Self::Provider(err) => match err.kind() {
                ProviderErrorKind::SelectorRequired | ProviderErrorKind::UnsupportedProvider => {
                    ChatErrorKind::Selector
                }
                ProviderErrorKind::Transport => ChatErrorKind::Transport,
                ProviderErrorKind::Decode => ChatErrorKind::Decode,
                ProviderErrorKind::InvalidRequest => ChatErrorKind::InvalidRequest,
                ProviderErrorKind::Cancelled => ChatErrorKind::Cancelled,
            },
            Self::IterationLimitExceeded { .. } => ChatErrorKind::IterationLimit,
            Self::InvalidRequest(_) => ChatErrorKind::InvalidRequest,
            Self::Cancelled => ChatErrorKind::Cancelled,
        }
    }

    /// True when the caller can fix the failure by changing the request.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self.kind(),
            ChatErrorKind::InvalidRequest | ChatErrorKind::Selector
        )
    }

    pub fn provider(&self) -> Option<&ProviderError> {
        match self {
            Self::Provider(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ProviderError> for ChatError {
    fn from(value: ProviderError) -> Self {
        match value {
            ProviderError::Cancelled => Self::Cancelled,
            other => Self::Provider(other),
        }
    }
}
