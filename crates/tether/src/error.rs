// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error type shared by every tether operation.

use crate::types::TypeDescriptor;

/// Errors returned by tether operations.
///
/// Every failure is an explicit value: nothing panics on an invalid handle or
/// a mismatched type. Queue overflow is deliberately absent, it is absorbed by
/// the subscriber's [`OverflowPolicy`](crate::OverflowPolicy) and only shows
/// up in [`QueueStats`](crate::QueueStats).
///
/// # Example
///
/// ```rust
/// use tether::{Error, Node, TopicRegistry, TypeDescriptor};
/// use std::sync::Arc;
///
/// let node = Node::with_registry("talker", Arc::new(TopicRegistry::new()));
/// let _pub = node.create_publisher("chatter", TypeDescriptor::new("std_msgs/String", "992ce8a1"))?;
///
/// match node.create_subscriber("chatter", TypeDescriptor::new("std_msgs/Int32", "da5909fb"), 10) {
///     Err(Error::TypeMismatch { topic, .. }) => assert_eq!(topic, "/chatter"),
///     other => panic!("unexpected: {:?}", other.map(|_| ())),
/// }
/// # Ok::<(), tether::Error>(())
/// ```
#[derive(Debug)]
pub enum Error {
    // ========================================================================
    // Registration Errors
    // ========================================================================
    /// The topic already carries a different type than the one requested.
    TypeMismatch {
        /// Fully resolved topic name.
        topic: String,
        /// Type recorded by the first endpoint on the topic.
        expected: TypeDescriptor,
        /// Type the rejected endpoint asked for.
        requested: TypeDescriptor,
    },
    /// Topic name is empty or otherwise unusable.
    InvalidTopicName(String),

    // ========================================================================
    // Lookup Errors
    // ========================================================================
    /// Handle or endpoint id is not (or no longer) registered.
    UnknownHandle(u64),
    /// No live topic with this name.
    UnknownTopic(String),
    /// Subscriber delivers through a callback only and owns no queue.
    NoQueue(u64),
    /// Node was destroyed; it can no longer create endpoints.
    NodeDestroyed(String),

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration value rejected by validation.
    InvalidConfig(String),
    /// Configuration file not found at specified path.
    ConfigFileNotFound(String),
    /// I/O error while reading configuration.
    IoError(std::io::Error),
    /// Global logger was already installed.
    AlreadyInitialized,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::TypeMismatch {
                topic,
                expected,
                requested,
            } => write!(
                f,
                "Type mismatch on topic '{}': topic carries {}, requested {}",
                topic, expected, requested
            ),
            Error::InvalidTopicName(name) => write!(f, "Invalid topic name: '{}'", name),
            Error::UnknownHandle(id) => write!(f, "Unknown handle: {}", id),
            Error::UnknownTopic(name) => write!(f, "Unknown topic: '{}'", name),
            Error::NoQueue(id) => write!(f, "Subscriber {} has no delivery queue", id),
            Error::NodeDestroyed(name) => write!(f, "Node '{}' was destroyed", name),
            Error::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
            Error::ConfigFileNotFound(path) => write!(f, "Config file not found: {}", path),
            Error::IoError(e) => write!(f, "I/O error: {}", e),
            Error::AlreadyInitialized => write!(f, "Logger already initialized"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::IoError(e)
    }
}

/// Convenient alias for results using the crate [`Error`].
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_mismatch_display_names_both_types() {
        let err = Error::TypeMismatch {
            topic: "/scan".to_string(),
            expected: TypeDescriptor::new("sensor_msgs/LaserScan", "90c7ef2d"),
            requested: TypeDescriptor::new("std_msgs/String", "992ce8a1"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/scan"));
        assert!(msg.contains("sensor_msgs/LaserScan"));
        assert!(msg.contains("std_msgs/String"));
    }

    #[test]
    fn test_io_error_source() {
        use std::error::Error as _;
        let err = Error::from(std::io::Error::new(std::io::ErrorKind::Other, "boom"));
        assert!(err.source().is_some());
        assert!(Error::UnknownHandle(7).source().is_none());
    }
}
