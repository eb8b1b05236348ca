//! Shared newtypes, future aliases, and small containers used across the parley crates.
//!
//! ```rust
//! use pcommon::{ExchangeId, GenerationOptions, MetadataMap, TraceId};
//!
//! let exchange = ExchangeId::from("exchange-1");
//! let trace = TraceId::new("trace-1");
//! let mut metadata = MetadataMap::new();
//! metadata.insert("channel".to_string(), "web".to_string());
//!
//! let options = GenerationOptions::default().with_temperature(0.3);
//! assert_eq!(exchange.as_str(), "exchange-1");
//! assert_eq!(trace.to_string(), "trace-1");
//! assert_eq!(options.temperature, Some(0.3));
//! ```

pub mod future {
    //! Boxed future alias used by object-safe async traits.
    //!
    //! ```rust
    //! use pcommon::BoxFuture;
    //!
    //! fn word_count<'a>(value: &'a str) -> BoxFuture<'a, usize> {
    //!     Box::pin(async move { value.split_whitespace().count() })
    //! }
    //!
    //! let _future = word_count("two words");
    //! ```

    use std::future::Future;
    use std::pin::Pin;

    pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
}

pub mod context {
    //! Identifier newtypes that travel with an exchange.

    use std::collections::HashMap;
    use std::fmt::{Display, Formatter};

    pub type MetadataMap = HashMap<String, String>;

    macro_rules! string_id {
        ($(#[$meta:meta])* $name:ident) => {
            $(#[$meta])*
            #[derive(Debug, Clone, PartialEq, Eq, Hash)]
            pub struct $name(String);

            impl $name {
                pub fn new(value: impl Into<String>) -> Self {
                    Self(value.into())
                }

                pub fn as_str(&self) -> &str {
                    self.0.as_str()
                }
            }

            impl Display for $name {
                fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                    f.write_str(&self.0)
                }
            }

            impl From<String> for $name {
                fn from(value: String) -> Self {
                    Self(value)
                }
            }

            impl From<&str> for $name {
                fn from(value: &str) -> Self {
                    Self(value.to_string())
                }
            }
        };
    }

    string_id!(
        /// Identifies one exchange, from the user message to the final answer.
        ExchangeId
    );

    string_id!(
        /// Correlates log and metric events emitted for the same caller request.
        TraceId
    );
}

pub mod model {
    //! Sampling settings forwarded to chat-completion backends.
    //!
    //! ```rust
    //! use pcommon::GenerationOptions;
    //!
    //! let options = GenerationOptions::default()
    //!     .with_temperature(0.2)
    //!     .with_max_tokens(128);
    //!
    //! assert_eq!(options.temperature, Some(0.2));
    //! assert_eq!(options.max_tokens, Some(128));
    //! assert!(!options.is_empty());
    //! ```

    #[derive(Debug, Clone, Copy, PartialEq, Default)]
    pub struct GenerationOptions {
        pub temperature: Option<f32>,
        pub max_tokens: Option<u32>,
    }

    impl GenerationOptions {
        pub fn with_temperature(mut self, temperature: f32) -> Self {
            self.temperature = Some(temperature);
            self
        }

        pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
            self.max_tokens = Some(max_tokens);
            self
        }

        pub fn is_empty(&self) -> bool {
            self.temperature.is_none() && self.max_tokens.is_none()
        }
    }
}

pub mod registry {
    //! Name-keyed map used by the tool registry.
    //!
    //! ```rust
    //! use pcommon::Registry;
    //!
    //! let mut registry = Registry::new();
    //! registry.insert("get_time".to_string(), 1_u32);
    //!
    //! assert_eq!(registry.get("get_time"), Some(&1));
    //! assert_eq!(registry.keys().collect::<Vec<_>>(), vec!["get_time"]);
    //! ```

    use std::borrow::Borrow;
    use std::collections::BTreeMap;

    /// Ordered by key so listings (for example tool declarations sent to a
    /// backend) are stable between calls.
    #[derive(Debug, Clone)]
    pub struct Registry<K, V> {
        items: BTreeMap<K, V>,
    }

    impl<K: Ord, V> Default for Registry<K, V> {
        fn default() -> Self {
            Self {
                items: BTreeMap::new(),
            }
        }
    }

    impl<K: Ord, V> Registry<K, V> {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn insert(&mut self, key: K, value: V) -> Option<V> {
            self.items.insert(key, value)
        }

        pub fn get<Q>(&self, key: &Q) -> Option<&V>
        where
            K: Borrow<Q>,
            Q: Ord + ?Sized,
        {
            self.items.get(key)
        }

        pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
        where
            K: Borrow<Q>,
            Q: Ord + ?Sized,
        {
            self.items.remove(key)
        }

        pub fn contains_key<Q>(&self, key: &Q) -> bool
        where
            K: Borrow<Q>,
            Q: Ord + ?Sized,
        {
            self.items.contains_key(key)
        }

        pub fn keys(&self) -> impl Iterator<Item = &K> {
            self.items.keys()
        }

        pub fn values(&self) -> impl Iterator<Item = &V> {
            self.items.values()
        }

        pub fn len(&self) -> usize {
            self.items.len()
        }

        pub fn is_empty(&self) -> bool {
            self.items.is_empty()
        }
    }
}

pub use context::{ExchangeId, MetadataMap, TraceId};
pub use future::BoxFuture;
pub use model::GenerationOptions;
pub use registry::Registry;

#[cfg(test)]
mod tests {
    use super::{ExchangeId, GenerationOptions, Registry, TraceId};

    #[test]
    fn id_newtypes_display_their_inner_value() {
        let exchange = ExchangeId::new("exchange-1");
        let trace = TraceId::from("trace-1".to_string());

        assert_eq!(exchange.as_str(), "exchange-1");
        assert_eq!(exchange.to_string(), "exchange-1");
        assert_eq!(trace.as_str(), "trace-1");
    }

    #[test]
    fn default_generation_options_are_empty() {
        assert!(GenerationOptions::default().is_empty());
        assert!(!GenerationOptions::default().with_max_tokens(5).is_empty());
    }

    #[test]
    fn registry_iterates_in_key_order() {
        let mut registry = Registry::new();
        registry.insert("zeta".to_string(), 3_u32);
        registry.insert("alpha".to_string(), 1_u32);
        registry.insert("mid".to_string(), 2_u32);

        let keys = registry.keys().cloned().collect::<Vec<_>>();
        assert_eq!(keys, vec!["alpha", "mid", "zeta"]);
        assert_eq!(registry.values().copied().collect::<Vec<_>>(), vec![1, 2, 3]);

        assert_eq!(registry.remove("mid"), Some(2));
        assert_eq!(registry.len(), 2);
        assert!(!registry.contains_key("mid"));
    }
}
