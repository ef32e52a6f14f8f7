// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Node: factory and owner of publishers and subscribers.
//!
//! ## Entity Hierarchy
//!
//! ```text
//! Node ("/robot/driver")
//! +-- Publisher  ------> TopicRegistry["/robot/cmd_vel"]
//! +-- Subscriber <------ TopicRegistry["/robot/scan"]
//! ```
//!
//! A node shares its [`TopicRegistry`] with other nodes (the process-wide
//! one by default) and owns every endpoint it creates: destroying the node,
//! explicitly or by drop, unregisters all of them. Endpoint handles outlive
//! the node safely; once it is gone their operations return
//! [`Error::UnknownHandle`].
//!
//! ## Name Resolution
//!
//! | Input       | Namespace `/robot`, node `driver` |
//! |-------------|-----------------------------------|
//! | `/scan`     | `/scan`                           |
//! | `scan`      | `/robot/scan`                     |
//! | `~status`   | `/robot/driver/status`            |

mod publisher;
mod subscriber;

pub use publisher::Publisher;
pub use subscriber::Subscriber;

use crate::config::ROOT_NAMESPACE;
use crate::registry::{EndpointId, PublisherOptions, SubscriberOptions, TopicRegistry};
use crate::types::TypeDescriptor;
use crate::{Error, Result};
use parking_lot::Mutex;
use std::sync::Arc;

/// State shared between a node and the endpoints it created.
pub(crate) struct NodeState {
    name: String,
    namespace: String,
    registry: Arc<TopicRegistry>,
    /// Endpoints still owned; `None` once the node is destroyed.
    owned: Mutex<Option<Vec<EndpointId>>>,
}

impl NodeState {
    pub(crate) fn registry(&self) -> &TopicRegistry {
        &self.registry
    }

    /// Give up ownership of one endpoint and unregister it.
    pub(crate) fn release(&self, id: EndpointId) -> Result<()> {
        if let Some(owned) = self.owned.lock().as_mut() {
            owned.retain(|e| *e != id);
        }
        self.registry.unregister(id)
    }

    fn destroy(&self) -> usize {
        let Some(owned) = self.owned.lock().take() else {
            return 0;
        };

        let mut released = 0;
        for id in owned {
            match self.registry.unregister(id) {
                Ok(()) => released += 1,
                Err(e) => log::debug!("[node] '{}' skipping {}: {}", self.name, id.raw(), e),
            }
        }
        log::debug!("[node] '{}' destroyed, {} endpoints released", self.name, released);
        released
    }
}

/// Builder for [`Node`].
///
/// ```rust
/// use tether::{Node, TopicRegistry};
/// use std::sync::Arc;
///
/// let node = Node::builder("driver")
///     .namespace("/robot")
///     .registry(Arc::new(TopicRegistry::new()))
///     .build();
/// assert_eq!(node.resolve_name("scan")?, "/robot/scan");
/// # Ok::<(), tether::Error>(())
/// ```
pub struct NodeBuilder {
    name: String,
    namespace: String,
    registry: Option<Arc<TopicRegistry>>,
}

impl NodeBuilder {
    /// Namespace for relative topic names (leading `/` optional).
    #[must_use]
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Registry to register endpoints in (defaults to the process-wide one).
    #[must_use]
    pub fn registry(mut self, registry: Arc<TopicRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Create the node.
    pub fn build(self) -> Node {
        let namespace = normalize_namespace(&self.namespace);
        let registry = self.registry.unwrap_or_else(TopicRegistry::global);
        log::debug!("[node] '{}' created in namespace '{}'", self.name, namespace);

        Node {
            state: Arc::new(NodeState {
                name: self.name,
                namespace,
                registry,
                owned: Mutex::new(Some(Vec::new())),
            }),
        }
    }
}

/// Factory for publishers and subscribers on a shared [`TopicRegistry`].
pub struct Node {
    state: Arc<NodeState>,
}

impl Node {
    /// Node in the root namespace on the process-wide registry.
    pub fn new(name: impl Into<String>) -> Self {
        Self::builder(name).build()
    }

    /// Node in the root namespace on an explicit registry.
    pub fn with_registry(name: impl Into<String>, registry: Arc<TopicRegistry>) -> Self {
        Self::builder(name).registry(registry).build()
    }

    /// Start a [`NodeBuilder`].
    pub fn builder(name: impl Into<String>) -> NodeBuilder {
        NodeBuilder {
            name: name.into(),
            namespace: ROOT_NAMESPACE.to_string(),
            registry: None,
        }
    }

    /// Node name.
    pub fn name(&self) -> &str {
        &self.state.name
    }

    /// Normalized namespace (always starts with `/`).
    pub fn namespace(&self) -> &str {
        &self.state.namespace
    }

    /// Registry this node registers into.
    pub fn registry(&self) -> &Arc<TopicRegistry> {
        &self.state.registry
    }

    /// Resolve a topic name against this node's namespace.
    pub fn resolve_name(&self, topic: &str) -> Result<String> {
        resolve(&self.state.namespace, &self.state.name, topic)
    }

    /// Advertise `topic` with `type_desc`.
    ///
    /// # Errors
    /// `TypeMismatch` from the registry, `InvalidTopicName`, or
    /// `NodeDestroyed`.
    pub fn create_publisher(&self, topic: &str, type_desc: TypeDescriptor) -> Result<Publisher> {
        self.create_publisher_with(topic, type_desc, &PublisherOptions::default())
    }

    /// Advertise with options (message definition).
    pub fn create_publisher_with(
        &self,
        topic: &str,
        type_desc: TypeDescriptor,
        options: &PublisherOptions,
    ) -> Result<Publisher> {
        let resolved = self.resolve_name(topic)?;
        let id = self.adopt(|registry| {
            registry.register_publisher_with(&resolved, &type_desc, options)
        })?;
        Ok(Publisher::new(id, resolved, type_desc, Arc::clone(&self.state)))
    }

    /// Subscribe in pull mode with a queue of `queue_size` (`0` = unbounded).
    pub fn create_subscriber(
        &self,
        topic: &str,
        type_desc: TypeDescriptor,
        queue_size: usize,
    ) -> Result<Subscriber> {
        self.create_subscriber_with(topic, type_desc, &SubscriberOptions::new(queue_size))
    }

    /// Subscribe with full options (overflow policy, push callback).
    pub fn create_subscriber_with(
        &self,
        topic: &str,
        type_desc: TypeDescriptor,
        options: &SubscriberOptions,
    ) -> Result<Subscriber> {
        let resolved = self.resolve_name(topic)?;
        let id = self.adopt(|registry| {
            registry.register_subscriber_with(&resolved, &type_desc, options)
        })?;
        Ok(Subscriber::new(id, resolved, type_desc, Arc::clone(&self.state)))
    }

    /// Number of endpoints this node still owns.
    pub fn endpoint_count(&self) -> usize {
        self.state.owned.lock().as_ref().map_or(0, Vec::len)
    }

    /// True once [`destroy`](Self::destroy) ran.
    pub fn is_destroyed(&self) -> bool {
        self.state.owned.lock().is_none()
    }

    /// Unregister every endpoint created by this node.
    ///
    /// Idempotent: later calls do nothing and return 0. Returns the number
    /// of endpoints actually released.
    pub fn destroy(&self) -> usize {
        self.state.destroy()
    }

    /// Register under the ownership lock so `destroy` cannot interleave.
    fn adopt<T, F>(&self, register: F) -> Result<T>
    where
        T: Copy + Into<EndpointId>,
        F: FnOnce(&TopicRegistry) -> Result<T>,
    {
        let mut owned = self.state.owned.lock();
        let Some(list) = owned.as_mut() else {
            return Err(Error::NodeDestroyed(self.state.name.clone()));
        };

        let id = register(&self.state.registry)?;
        list.push(id.into());
        Ok(id)
    }
}

impl Drop for Node {
    fn drop(&mut self) {
        self.state.destroy();
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.state.name)
            .field("namespace", &self.state.namespace)
            .field("endpoint_count", &self.endpoint_count())
            .finish()
    }
}

fn normalize_namespace(namespace: &str) -> String {
    let trimmed = namespace.trim_matches('/');
    if trimmed.is_empty() {
        ROOT_NAMESPACE.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

fn resolve(namespace: &str, node_name: &str, topic: &str) -> Result<String> {
    if topic.is_empty() || topic == "~" || topic.ends_with('/') {
        return Err(Error::InvalidTopicName(topic.to_string()));
    }

    let base = namespace.trim_end_matches('/');
    let resolved = if topic.starts_with('/') {
        topic.to_string()
    } else if let Some(private) = topic.strip_prefix("~/").or_else(|| topic.strip_prefix('~')) {
        format!("{}/{}/{}", base, node_name, private)
    } else {
        format!("{}/{}", base, topic)
    };
    Ok(resolved)
}
