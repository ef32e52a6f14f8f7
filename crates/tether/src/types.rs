// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Message type identity.
//!
//! Types are late-bound: callers hand over a type name and a content hash
//! (typically the MD5 of the message definition) and the registry compares
//! them by equality when an endpoint registers.

use std::sync::Arc;

/// Message type descriptor: `(name, content_hash)`.
///
/// Immutable once built. Two descriptors are compatible iff both fields
/// match exactly. Cloning is cheap (shared strings).
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct TypeDescriptor {
    name: Arc<str>,
    content_hash: Arc<str>,
}

impl TypeDescriptor {
    /// Build a descriptor from a type name and a caller-supplied hash.
    pub fn new(name: impl Into<Arc<str>>, content_hash: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            content_hash: content_hash.into(),
        }
    }

    /// Build a descriptor whose hash is the lowercase hex MD5 of `definition`.
    ///
    /// ```rust
    /// use tether::TypeDescriptor;
    ///
    /// let a = TypeDescriptor::from_definition("std_msgs/String", "string data\n");
    /// let b = TypeDescriptor::from_definition("std_msgs/String", "string data\n");
    /// assert!(a.is_compatible(&b));
    /// assert_eq!(a.content_hash().len(), 32);
    /// ```
    pub fn from_definition(name: impl Into<Arc<str>>, definition: &str) -> Self {
        use md5::{Digest, Md5};
        let mut hasher = Md5::new();
        hasher.update(definition.as_bytes());
        let digest = hasher.finalize();

        let mut hex = String::with_capacity(digest.len() * 2);
        for byte in digest.iter() {
            hex.push_str(&format!("{:02x}", byte));
        }

        Self::new(name, hex)
    }

    /// Type name (e.g. `sensor_msgs/LaserScan`).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Content hash as supplied at construction.
    pub fn content_hash(&self) -> &str {
        &self.content_hash
    }

    /// True when both name and hash match.
    pub fn is_compatible(&self, other: &TypeDescriptor) -> bool {
        self == other
    }
}

impl std::fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("name", &self.name)
            .field("content_hash", &self.content_hash)
            .finish()
    }
}

impl std::fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}[{}]", self.name, self.content_hash)
    }
}
