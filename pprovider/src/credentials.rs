//! Redacted in-memory API keys.
//!
//! ```rust
//! use pprovider::SecretString;
//!
//! let key = SecretString::new("sk-test");
//! assert_eq!(key.expose(), "sk-test");
//! assert_eq!(format!("{key:?}"), "[REDACTED]");
//! ```

#[derive(Clone, PartialEq, Eq)]
pub struct SecretString {
    value: String,
}

impl SecretString {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    pub fn expose(&self) -> &str {
        self.value.as_str()
    }

    pub fn is_empty(&self) -> bool {
        self.value.trim().is_empty()
    }
}

impl std::fmt::Debug for SecretString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl Drop for SecretString {
    fn drop(&mut self) {
        // Zero bytes are valid UTF-8, so the string stays well-formed.
        unsafe {
            self.value.as_mut_vec().fill(0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SecretString;

    #[test]
    fn debug_output_never_shows_the_key() {
        let key = SecretString::new("sk-live-123");
        let config = format!("{:?}", Some(key.clone()));

        assert!(!config.contains("sk-live-123"));
        assert_eq!(key.expose(), "sk-live-123");
    }

    #[test]
    fn whitespace_key_counts_as_empty() {
        assert!(SecretString::new("  ").is_empty());
        assert!(!SecretString::new("k").is_empty());
    }
}
