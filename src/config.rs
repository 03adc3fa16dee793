//! Registry configuration.
//!
//! ```ignore
//! use spark_head::{RegistryConfig, GroupRegistry, host::{MemoryHead, memory_host}};
//!
//! let head = MemoryHead::new();
//! let registry = GroupRegistry::new(
//!     RegistryConfig::default().with_host(memory_host(&head)),
//! );
//! ```

use std::fmt;

use crate::host::HostSource;

/// Prefix used for synthesized anonymous group names.
pub const DEFAULT_ANONYMOUS_PREFIX: &str = "anonymous";

/// Settings for one [`GroupRegistry`](crate::engine::GroupRegistry).
#[derive(Clone)]
pub struct RegistryConfig {
    /// Prefix of the group names `add` synthesizes when no group is given.
    pub anonymous_prefix: String,

    /// Where the render sink mounts. `None` runs headless.
    pub host: Option<HostSource>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            anonymous_prefix: DEFAULT_ANONYMOUS_PREFIX.to_string(),
            host: None,
        }
    }
}

impl RegistryConfig {
    /// Use `host` as the render sink's target.
    pub fn with_host(mut self, host: HostSource) -> Self {
        self.host = Some(host);
        self
    }

    /// Change the anonymous group prefix.
    pub fn with_anonymous_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.anonymous_prefix = prefix.into();
        self
    }
}

impl fmt::Debug for RegistryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryConfig")
            .field("anonymous_prefix", &self.anonymous_prefix)
            .field("host", &self.host.as_ref().map(|_| "<host source>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::no_host;

    #[test]
    fn test_defaults() {
        let config = RegistryConfig::default();
        assert_eq!(config.anonymous_prefix, "anonymous");
        assert!(config.host.is_none());
    }

    #[test]
    fn test_builder() {
        let config = RegistryConfig::default()
            .with_anonymous_prefix("anon")
            .with_host(no_host());

        assert_eq!(config.anonymous_prefix, "anon");
        assert!(config.host.is_some());
        assert!(format!("{config:?}").contains("<host source>"));
    }
}
