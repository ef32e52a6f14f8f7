// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Tether configuration - constants and registry-wide defaults.
//!
//! # Architecture
//!
//! - **Level 1 (Static)**: compile-time constants (queue sizes)
//! - **Level 2 (Dynamic)**: [`RegistryConfig`], held by each
//!   [`TopicRegistry`](crate::TopicRegistry) behind an `ArcSwap` so it can be
//!   replaced at runtime without locking the data path
//!
//! # Example
//!
//! ```rust
//! use tether::config::RegistryConfig;
//! use tether::OverflowPolicy;
//!
//! let config = RegistryConfig::builder()
//!     .default_overflow(OverflowPolicy::DropNewest)
//!     .max_queue_size(1024)
//!     .build();
//! assert_eq!(config.clamp_queue_size(4096), 1024);
//! ```

use crate::queue::OverflowPolicy;

/// Queue size meaning "no capacity limit".
pub const UNBOUNDED: usize = 0;

/// Queue size used by [`SubscriberOptions::default`](crate::SubscriberOptions).
pub const DEFAULT_QUEUE_SIZE: usize = 10;

/// Default namespace for nodes created without one.
pub const ROOT_NAMESPACE: &str = "/";

/// Registry-wide defaults applied to subscriptions at creation time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Overflow policy used when a subscription does not pick one.
    pub default_overflow: OverflowPolicy,
    /// Upper bound applied to requested queue sizes (`UNBOUNDED` = no clamp).
    pub max_queue_size: usize,
    /// When true, callback subscribers also buffer into a queue.
    pub buffer_with_callback: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            default_overflow: OverflowPolicy::DropOldest,
            max_queue_size: UNBOUNDED,
            buffer_with_callback: false,
        }
    }
}

impl RegistryConfig {
    /// Start a fluent builder from the defaults.
    pub fn builder() -> RegistryConfigBuilder {
        RegistryConfigBuilder {
            config: RegistryConfig::default(),
        }
    }

    /// Apply `max_queue_size` to a requested capacity.
    ///
    /// An unbounded request becomes the clamp itself when a clamp is set.
    pub fn clamp_queue_size(&self, requested: usize) -> usize {
        match (self.max_queue_size, requested) {
            (UNBOUNDED, n) => n,
            (max, UNBOUNDED) => max,
            (max, n) => n.min(max),
        }
    }
}

/// Builder for [`RegistryConfig`].
#[derive(Debug, Clone)]
pub struct RegistryConfigBuilder {
    config: RegistryConfig,
}

impl RegistryConfigBuilder {
    /// Set the default overflow policy.
    #[must_use]
    pub fn default_overflow(mut self, policy: OverflowPolicy) -> Self {
        self.config.default_overflow = policy;
        self
    }

    /// Clamp every queue to at most `size` entries (`UNBOUNDED` disables).
    #[must_use]
    pub fn max_queue_size(mut self, size: usize) -> Self {
        self.config.max_queue_size = size;
        self
    }

    /// Let callback subscribers buffer as well.
    #[must_use]
    pub fn buffer_with_callback(mut self, enabled: bool) -> Self {
        self.config.buffer_with_callback = enabled;
        self
    }

    /// Finish building.
    pub fn build(self) -> RegistryConfig {
        self.config
    }
}

#[cfg(feature = "config-loaders")]
mod yaml {
    //! YAML loader for [`RegistryConfig`].
    //!
    //! ```yaml
    //! registry:
    //!   default_overflow: DROP_NEWEST
    //!   max_queue_size: 512
    //!   buffer_with_callback: true
    //! ```

    use super::RegistryConfig;
    use crate::queue::OverflowPolicy;
    use crate::{Error, Result};
    use serde::Deserialize;
    use std::path::Path;

    #[derive(Debug, Deserialize)]
    struct YamlDocument {
        #[serde(default)]
        registry: YamlRegistry,
    }

    #[derive(Debug, Deserialize, Default)]
    #[serde(default)]
    struct YamlRegistry {
        default_overflow: Option<String>,
        max_queue_size: Option<usize>,
        buffer_with_callback: Option<bool>,
    }

    fn parse_overflow(value: &str) -> Result<OverflowPolicy> {
        match value.to_ascii_uppercase().as_str() {
            "DROP_OLDEST" => Ok(OverflowPolicy::DropOldest),
            "DROP_NEWEST" => Ok(OverflowPolicy::DropNewest),
            other => Err(Error::InvalidConfig(format!(
                "unknown overflow policy '{}' (expected DROP_OLDEST or DROP_NEWEST)",
                other
            ))),
        }
    }

    impl RegistryConfig {
        /// Parse a YAML document; missing keys keep their defaults.
        pub fn from_yaml_str(text: &str) -> Result<Self> {
            let doc: YamlDocument =
                serde_yaml::from_str(text).map_err(|e| Error::InvalidConfig(e.to_string()))?;

            let mut builder = RegistryConfig::builder();
            if let Some(policy) = doc.registry.default_overflow.as_deref() {
                builder = builder.default_overflow(parse_overflow(policy)?);
            }
            if let Some(size) = doc.registry.max_queue_size {
                builder = builder.max_queue_size(size);
            }
            if let Some(enabled) = doc.registry.buffer_with_callback {
                builder = builder.buffer_with_callback(enabled);
            }
            Ok(builder.build())
        }

        /// Load a YAML file from disk.
        pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
            let path = path.as_ref();
            if !path.exists() {
                return Err(Error::ConfigFileNotFound(path.display().to_string()));
            }
            let text = std::fs::read_to_string(path)?;
            Self::from_yaml_str(&text)
        }
    }

}
