// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Handle-based boundary API.
//!
//! A host runtime on the other side of a language boundary cannot own Rust
//! objects. `Session` keeps every node, publisher and subscriber in its own
//! tables and hands out opaque integer handles instead. Handles are never
//! reused, so a stale handle can only ever yield
//! [`Error::UnknownHandle`], never another endpoint.
//!
//! ```text
//! Session
//! +-- nodes:       DashMap<handle, Node>
//! +-- publishers:  DashMap<handle, (owner node, Arc<Publisher>)>
//! +-- subscribers: DashMap<handle, (owner node, Arc<Subscriber>)>
//! ```
//!
//! Endpoints are cloned out of the tables before use, so no table lock is
//! held while a publish runs push handlers (which may call back into the
//! session).
//!
//! # Example
//!
//! ```rust
//! use tether::{Session, TopicRegistry, TypeDescriptor};
//! use std::sync::Arc;
//!
//! let session = Session::with_registry(Arc::new(TopicRegistry::new()));
//! let ty = TypeDescriptor::new("std_msgs/String", "992ce8a1687cec8c8bd883ec73ca41d1");
//!
//! let node = session.create_node("talker");
//! let sub = session.create_subscriber(node, "chatter", ty.clone(), 10, None)?;
//! let publisher = session.create_publisher(node, "chatter", ty)?;
//!
//! session.publish(publisher, b"hello")?;
//! assert_eq!(session.pending_count(sub)?, 1);
//! assert_eq!(&*session.drain(sub, 10)?[0], b"hello");
//!
//! session.destroy_node(node)?;
//! assert!(session.publish(publisher, b"late").is_err());
//! # Ok::<(), tether::Error>(())
//! ```

use crate::handler::MessageHandler;
use crate::node::{Node, Publisher, Subscriber};
use crate::queue::Payload;
use crate::registry::{SubscriberOptions, TopicInfo, TopicRegistry};
use crate::types::TypeDescriptor;
use crate::{Error, Result};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

macro_rules! opaque_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[repr(transparent)]
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub struct $name(u64);

        impl $name {
            /// Raw value for crossing the boundary.
            pub fn raw(self) -> u64 {
                self.0
            }

            /// Rebuild from a raw value received from the host.
            pub fn from_raw(raw: u64) -> Self {
                Self(raw)
            }
        }
    };
}

opaque_handle!(
    /// Opaque node handle.
    NodeHandle
);
opaque_handle!(
    /// Opaque publisher handle.
    PublisherHandle
);
opaque_handle!(
    /// Opaque subscriber handle.
    SubscriberHandle
);

struct Owned<T> {
    owner: NodeHandle,
    endpoint: Arc<T>,
}

/// Table of live nodes and endpoints addressed by opaque handles.
pub struct Session {
    registry: Arc<TopicRegistry>,
    next_handle: AtomicU64,
    nodes: DashMap<u64, Node>,
    publishers: DashMap<u64, Owned<Publisher>>,
    subscribers: DashMap<u64, Owned<Subscriber>>,
}

impl Session {
    /// Session on the process-wide registry.
    pub fn new() -> Self {
        Self::with_registry(TopicRegistry::global())
    }

    /// Session on an explicit registry.
    pub fn with_registry(registry: Arc<TopicRegistry>) -> Self {
        Self {
            registry,
            next_handle: AtomicU64::new(1),
            nodes: DashMap::new(),
            publishers: DashMap::new(),
            subscribers: DashMap::new(),
        }
    }

    /// Registry shared by every node of this session.
    pub fn registry(&self) -> &Arc<TopicRegistry> {
        &self.registry
    }

    fn next_handle(&self) -> u64 {
        self.next_handle.fetch_add(1, Ordering::Relaxed)
    }

    // ========================================================================
    // Nodes
    // ========================================================================

    /// Create a node in the root namespace.
    pub fn create_node(&self, name: &str) -> NodeHandle {
        self.create_node_in(name, crate::config::ROOT_NAMESPACE)
    }

    /// Create a node in `namespace`.
    pub fn create_node_in(&self, name: &str, namespace: &str) -> NodeHandle {
        let node = Node::builder(name)
            .namespace(namespace)
            .registry(Arc::clone(&self.registry))
            .build();
        let handle = NodeHandle(self.next_handle());
        self.nodes.insert(handle.0, node);
        handle
    }

    /// Destroy a node and every endpoint it created.
    ///
    /// # Errors
    /// `UnknownHandle` when the node was already destroyed.
    pub fn destroy_node(&self, handle: NodeHandle) -> Result<()> {
        let (_, node) = self
            .nodes
            .remove(&handle.0)
            .ok_or(Error::UnknownHandle(handle.0))?;

        let released = node.destroy();
        self.publishers.retain(|_, entry| entry.owner != handle);
        self.subscribers.retain(|_, entry| entry.owner != handle);

        log::debug!(
            "[session] node {} ('{}') destroyed, {} endpoints released",
            handle.0,
            node.name(),
            released
        );
        Ok(())
    }

    // ========================================================================
    // Publishers
    // ========================================================================

    /// Advertise `topic` on `node`.
    pub fn create_publisher(
        &self,
        node: NodeHandle,
        topic: &str,
        type_desc: TypeDescriptor,
    ) -> Result<PublisherHandle> {
        let publisher = {
            let entry = self
                .nodes
                .get(&node.0)
                .ok_or(Error::UnknownHandle(node.0))?;
            entry.create_publisher(topic, type_desc)?
        };

        let handle = PublisherHandle(self.next_handle());
        self.publishers.insert(
            handle.0,
            Owned {
                owner: node,
                endpoint: Arc::new(publisher),
            },
        );
        Ok(handle)
    }

    fn publisher(&self, handle: PublisherHandle) -> Result<Arc<Publisher>> {
        self.publishers
            .get(&handle.0)
            .map(|entry| Arc::clone(&entry.endpoint))
            .ok_or(Error::UnknownHandle(handle.0))
    }

    /// Publish `payload` through `handle`.
    pub fn publish(&self, handle: PublisherHandle, payload: &[u8]) -> Result<()> {
        self.publisher(handle)?.publish(payload)
    }

    /// Number of subscribers `handle` currently reaches.
    pub fn subscriber_count(&self, handle: PublisherHandle) -> Result<usize> {
        self.publisher(handle)?.subscriber_count()
    }

    /// Unregister and forget a publisher.
    pub fn destroy_publisher(&self, handle: PublisherHandle) -> Result<()> {
        let (_, entry) = self
            .publishers
            .remove(&handle.0)
            .ok_or(Error::UnknownHandle(handle.0))?;
        entry.endpoint.shutdown()
    }

    // ========================================================================
    // Subscribers
    // ========================================================================

    /// Subscribe on `node`; with `handler`, delivery is push-mode.
    pub fn create_subscriber(
        &self,
        node: NodeHandle,
        topic: &str,
        type_desc: TypeDescriptor,
        queue_size: usize,
        handler: Option<Arc<dyn MessageHandler>>,
    ) -> Result<SubscriberHandle> {
        let mut options = SubscriberOptions::new(queue_size);
        if let Some(handler) = handler {
            options = options.handler(handler);
        }

        let subscriber = {
            let entry = self
                .nodes
                .get(&node.0)
                .ok_or(Error::UnknownHandle(node.0))?;
            entry.create_subscriber_with(topic, type_desc, &options)?
        };

        let handle = SubscriberHandle(self.next_handle());
        self.subscribers.insert(
            handle.0,
            Owned {
                owner: node,
                endpoint: Arc::new(subscriber),
            },
        );
        Ok(handle)
    }

    fn subscriber(&self, handle: SubscriberHandle) -> Result<Arc<Subscriber>> {
        self.subscribers
            .get(&handle.0)
            .map(|entry| Arc::clone(&entry.endpoint))
            .ok_or(Error::UnknownHandle(handle.0))
    }

    /// Take up to `max_count` pending payloads.
    pub fn drain(&self, handle: SubscriberHandle, max_count: usize) -> Result<Vec<Payload>> {
        self.subscriber(handle)?.drain(max_count)
    }

    /// Pending payload count.
    pub fn pending_count(&self, handle: SubscriberHandle) -> Result<usize> {
        self.subscriber(handle)?.peek_pending_count()
    }

    /// Unregister and forget a subscriber.
    pub fn destroy_subscriber(&self, handle: SubscriberHandle) -> Result<()> {
        let (_, entry) = self
            .subscribers
            .remove(&handle.0)
            .ok_or(Error::UnknownHandle(handle.0))?;
        entry.endpoint.shutdown()
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    /// Live topics on the session's registry.
    pub fn topics(&self) -> Vec<TopicInfo> {
        self.registry.topics()
    }

    /// Number of live nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("nodes", &self.nodes.len())
            .field("publishers", &self.publishers.len())
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
