//! Shared identifiers, generation settings, and small containers used across parley crates.
//!
//! ```rust
//! use pcommon::{GenerationOptions, MetadataMap, SessionId};
//!
//! let session = SessionId::from("session-1");
//! let mut metadata = MetadataMap::new();
//! metadata.insert("route".to_string(), "model".to_string());
//!
//! let options = GenerationOptions::default().with_temperature(0.7).with_max_tokens(1024);
//! assert_eq!(session.as_str(), "session-1");
//! assert_eq!(options.max_tokens, Some(1024));
//! ```

pub mod future {
    //! Boxed future alias shared by the object-safe async traits.
    //!
    //! ```rust
    //! use pcommon::BoxFuture;
    //!
    //! fn word_count<'a>(value: &'a str) -> BoxFuture<'a, usize> {
    //!     Box::pin(async move { value.split_whitespace().count() })
    //! }
    //!
    //! let _future = word_count("weather in tokyo");
    //! ```

    use std::future::Future;
    use std::pin::Pin;

    pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
}

pub mod context {
    //! Conversation keys and free-form request metadata.
    //!
    //! ```rust
    //! use pcommon::SessionId;
    //!
    //! assert_eq!(SessionId::default().as_str(), SessionId::DEFAULT);
    //! assert!(SessionId::parse("  ").is_none());
    //! assert_eq!(SessionId::parse(" abc ").unwrap().as_str(), "abc");
    //! ```

    use std::collections::HashMap;
    use std::fmt::{Display, Formatter};

    pub type MetadataMap = HashMap<String, String>;

    /// Key of one independent conversation.
    #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub struct SessionId(String);

    impl SessionId {
        pub const DEFAULT: &'static str = "default";

        pub fn new(value: impl Into<String>) -> Self {
            Self(value.into())
        }

        /// Trims the value and rejects blank identifiers.
        pub fn parse(value: &str) -> Option<Self> {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(Self(trimmed.to_string()))
            }
        }

        pub fn as_str(&self) -> &str {
            self.0.as_str()
        }
    }

    impl Default for SessionId {
        fn default() -> Self {
            Self(Self::DEFAULT.to_string())
        }
    }

    impl Display for SessionId {
        fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
            f.write_str(&self.0)
        }
    }

    impl From<String> for SessionId {
        fn from(value: String) -> Self {
            Self(value)
        }
    }

    impl From<&str> for SessionId {
        fn from(value: &str) -> Self {
            Self(value.to_string())
        }
    }

    impl AsRef<str> for SessionId {
        fn as_ref(&self) -> &str {
            self.as_str()
        }
    }
}

pub mod model {
    //! Sampling settings attached to every model request.

    #[derive(Debug, Clone, Copy, PartialEq, Default)]
    pub struct GenerationOptions {
        pub temperature: Option<f32>,
        pub max_tokens: Option<u32>,
    }

    impl GenerationOptions {
        pub fn new(temperature: f32, max_tokens: u32) -> Self {
            Self {
                temperature: Some(temperature),
                max_tokens: Some(max_tokens),
            }
        }

        pub fn with_temperature(mut self, temperature: f32) -> Self {
            self.temperature = Some(temperature);
            self
        }

        pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
            self.max_tokens = Some(max_tokens);
            self
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
    //! registry.insert("get_weather".to_string(), 1_u32);
    //!
    //! assert_eq!(registry.get("get_weather"), Some(&1));
    //! assert_eq!(registry.insert("get_weather".to_string(), 2), Some(1));
    //! ```

    use std::borrow::Borrow;
    use std::collections::BTreeMap;

    /// Ordered by key so tool definitions are offered to the model in a stable order.
    #[derive(Debug, Clone)]
    pub struct Registry<K, V> {
        items: BTreeMap<K, V>,
    }

    impl<K, V> Default for Registry<K, V>
    where
        K: Ord,
    {
        fn default() -> Self {
            Self {
                items: BTreeMap::new(),
            }
        }
    }

    impl<K, V> Registry<K, V>
    where
        K: Ord,
    {
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

        pub fn values(&self) -> impl Iterator<Item = &V> {
            self.items.values()
        }
    }
}

pub mod secret {
    //! Credential wrapper that never prints its value.
    //!
    //! ```rust
    //! use pcommon::SecretString;
    //!
    //! let key = SecretString::new("tvly-123");
    //! assert_eq!(format!("{key:?}"), "[REDACTED]");
    //! assert_eq!(key.expose(), "tvly-123");
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

        pub fn is_blank(&self) -> bool {
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
            // SAFETY: zero bytes are valid UTF-8.
            unsafe {
                self.value.as_mut_vec().fill(0);
            }
        }
    }
}

pub use context::{MetadataMap, SessionId};
pub use future::BoxFuture;
pub use model::GenerationOptions;
pub use registry::Registry;
pub use secret::SecretString;
