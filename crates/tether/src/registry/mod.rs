// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Topic registry: topic name -> publishers + subscribers.
//!
//! # Architecture
//!
//! ```text
//! TopicRegistry
//! +-- state: RwLock<RegistryState>
//! |   +-- topics:    HashMap<topic, TopicEntry>
//! |   |               +-- type_desc (fixed by first endpoint)
//! |   |               +-- publishers:  Vec<PublisherId>   (registration order)
//! |   |               +-- subscribers: Vec<Route>         (registration order)
//! |   +-- endpoints: HashMap<EndpointId, topic>           (reverse index)
//! +-- config: ArcSwap<RegistryConfig>
//! ```
//!
//! # Thread Safety
//!
//! One `RwLock` guards the whole structure. Registration and unregistration
//! take the write lock; routing snapshots take the read lock. Because
//! unregistration and snapshotting share that lock, a publish either sees a
//! subscriber or it does not - never half of one. Queues have their own
//! locks and are pushed to after the registry lock is released.
//!
//! # Lifecycle
//!
//! Topics are created on the first registration and removed as soon as their
//! last publisher and last subscriber are gone.

mod options;
mod topic;

pub use options::{PublisherOptions, SubscriberOptions};
pub use topic::{EndpointId, PublisherId, SubscriberId, TopicInfo};

pub(crate) use topic::Route;

use crate::config::RegistryConfig;
use crate::queue::DeliveryQueue;
use crate::types::TypeDescriptor;
use crate::{Error, Result};
use arc_swap::ArcSwap;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use topic::TopicEntry;

#[derive(Default)]
struct RegistryState {
    topics: HashMap<Arc<str>, TopicEntry>,
    endpoints: HashMap<EndpointId, Arc<str>>,
}

/// Routing snapshot handed to a publisher.
pub(crate) struct RouteSnapshot {
    pub(crate) topic: Arc<str>,
    pub(crate) routes: Vec<Route>,
}

/// Registry of live topics and their endpoints.
///
/// Usually shared: nodes hold an `Arc<TopicRegistry>`. A process-wide
/// instance is available through [`TopicRegistry::global`], but nothing
/// in the crate depends on it.
pub struct TopicRegistry {
    state: RwLock<RegistryState>,
    next_id: AtomicU64,
    config: ArcSwap<RegistryConfig>,
}

impl TopicRegistry {
    /// Create an empty registry with default configuration.
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create an empty registry with the given configuration.
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            state: RwLock::new(RegistryState::default()),
            next_id: AtomicU64::new(1),
            config: ArcSwap::from_pointee(config),
        }
    }

    /// Process-wide registry, created on first use.
    pub fn global() -> Arc<TopicRegistry> {
        static REGISTRY: OnceLock<Arc<TopicRegistry>> = OnceLock::new();
        Arc::clone(REGISTRY.get_or_init(|| {
            log::info!("[registry] created process-wide topic registry");
            Arc::new(TopicRegistry::new())
        }))
    }

    /// Current configuration.
    pub fn config(&self) -> Arc<RegistryConfig> {
        self.config.load_full()
    }

    /// Replace the configuration. Existing subscriptions keep their queues.
    pub fn set_config(&self, config: RegistryConfig) {
        log::debug!("[registry] configuration replaced: {:?}", config);
        self.config.store(Arc::new(config));
    }

    // ========================================================================
    // Registration
    // ========================================================================

    /// Register a publisher on `name`, creating the topic if needed.
    ///
    /// # Errors
    /// `TypeMismatch` if the topic exists with another type.
    pub fn register_publisher(&self, name: &str, type_desc: &TypeDescriptor) -> Result<PublisherId> {
        self.register_publisher_with(name, type_desc, &PublisherOptions::default())
    }

    /// Register a publisher with options (message definition).
    pub fn register_publisher_with(
        &self,
        name: &str,
        type_desc: &TypeDescriptor,
        options: &PublisherOptions,
    ) -> Result<PublisherId> {
        let id = PublisherId(self.next_id());
        let mut state = self.state.write();

        let (topic, entry) = Self::claim_topic(&mut state, name, type_desc)?;
        if entry.definition.is_none() {
            entry.definition = options.message_definition.as_deref().map(Arc::from);
        }
        entry.publishers.push(id);
        state.endpoints.insert(EndpointId::Publisher(id), topic);

        log::debug!("[registry] publisher {} registered on '{}'", id.0, name);
        Ok(id)
    }

    /// Register a pull-mode subscriber with a queue of `queue_size`
    /// (`0` = unbounded), using the configured default overflow policy.
    ///
    /// # Errors
    /// `TypeMismatch` if the topic exists with another type.
    pub fn register_subscriber(
        &self,
        name: &str,
        type_desc: &TypeDescriptor,
        queue_size: usize,
    ) -> Result<SubscriberId> {
        self.register_subscriber_with(name, type_desc, &SubscriberOptions::new(queue_size))
    }

    /// Register a subscriber with full options (overflow policy, handler).
    ///
    /// A handler-only subscription gets no queue unless
    /// `buffer_with_callback` is enabled (per options or registry config).
    pub fn register_subscriber_with(
        &self,
        name: &str,
        type_desc: &TypeDescriptor,
        options: &SubscriberOptions,
    ) -> Result<SubscriberId> {
        let config = self.config();
        let buffer = options.handler.is_none()
            || options
                .buffer_with_callback
                .unwrap_or(config.buffer_with_callback);

        let queue = buffer.then(|| {
            Arc::new(DeliveryQueue::new(
                config.clamp_queue_size(options.queue_size),
                options.overflow.unwrap_or(config.default_overflow),
            ))
        });

        let id = SubscriberId(self.next_id());
        let route = Route {
            id,
            queue,
            handler: options.handler.clone(),
        };

        let mut state = self.state.write();
        let (topic, entry) = Self::claim_topic(&mut state, name, type_desc)?;
        entry.subscribers.push(route);
        state.endpoints.insert(EndpointId::Subscriber(id), topic);

        log::debug!(
            "[registry] subscriber {} registered on '{}' (buffered={})",
            id.0,
            name,
            buffer
        );
        Ok(id)
    }

    /// Remove an endpoint; drops the topic once it has no endpoints left.
    ///
    /// # Errors
    /// `UnknownHandle` if `id` is not registered (already removed or never
    /// created).
    pub fn unregister(&self, id: impl Into<EndpointId>) -> Result<()> {
        let id = id.into();
        let mut state = self.state.write();

        let topic = state
            .endpoints
            .remove(&id)
            .ok_or(Error::UnknownHandle(id.raw()))?;

        let now_empty = match state.topics.get_mut(&topic) {
            Some(entry) => {
                entry.remove(id);
                entry.is_empty()
            }
            None => false,
        };

        if now_empty {
            state.topics.remove(&topic);
            log::debug!("[registry] topic '{}' removed (no endpoints left)", topic);
        }

        log::debug!("[registry] endpoint {} unregistered from '{}'", id.raw(), topic);
        Ok(())
    }

    // ========================================================================
    // Routing
    // ========================================================================

    /// Snapshot of subscriber ids on `name`, in registration order.
    ///
    /// Unknown topics yield an empty vector.
    pub fn subscribers_of(&self, name: &str) -> Vec<SubscriberId> {
        let state = self.state.read();
        state
            .topics
            .get(name)
            .map(|entry| entry.subscribers.iter().map(|r| r.id).collect())
            .unwrap_or_default()
    }

    /// Snapshot of publisher ids on `name`, in registration order.
    pub fn publishers_of(&self, name: &str) -> Vec<PublisherId> {
        let state = self.state.read();
        state
            .topics
            .get(name)
            .map(|entry| entry.publishers.clone())
            .unwrap_or_default()
    }

    /// Queue of a subscriber, for drain operations.
    ///
    /// # Errors
    /// `UnknownHandle` for an unregistered id, `NoQueue` for a handler-only
    /// subscriber.
    pub fn lookup_queue(&self, id: SubscriberId) -> Result<Arc<DeliveryQueue>> {
        let state = self.state.read();
        let route = Self::route_of(&state, id)?;
        route.queue.clone().ok_or(Error::NoQueue(id.0))
    }

    /// Resolve a publisher's topic and take the subscriber snapshot, in one
    /// read-lock acquisition.
    pub(crate) fn routes_for(&self, id: PublisherId) -> Result<RouteSnapshot> {
        let state = self.state.read();
        let topic = state
            .endpoints
            .get(&EndpointId::Publisher(id))
            .ok_or(Error::UnknownHandle(id.0))?;

        let routes = state
            .topics
            .get(topic)
            .map(|entry| entry.subscribers.clone())
            .unwrap_or_default();

        Ok(RouteSnapshot {
            topic: Arc::clone(topic),
            routes,
        })
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    /// True while `id` is registered.
    pub fn contains(&self, id: impl Into<EndpointId>) -> bool {
        self.state.read().endpoints.contains_key(&id.into())
    }

    /// Topic an endpoint is registered on.
    pub fn topic_of(&self, id: impl Into<EndpointId>) -> Result<String> {
        let id = id.into();
        let state = self.state.read();
        state
            .endpoints
            .get(&id)
            .map(|t| t.to_string())
            .ok_or(Error::UnknownHandle(id.raw()))
    }

    /// Description of one live topic.
    ///
    /// # Errors
    /// `UnknownTopic` when no endpoint is registered on `name`.
    pub fn topic_info(&self, name: &str) -> Result<TopicInfo> {
        let state = self.state.read();
        state
            .topics
            .get(name)
            .map(|entry| entry.info(name))
            .ok_or_else(|| Error::UnknownTopic(name.to_string()))
    }

    /// All live topics, sorted by name.
    pub fn topics(&self) -> Vec<TopicInfo> {
        let state = self.state.read();
        let mut infos: Vec<TopicInfo> = state
            .topics
            .iter()
            .map(|(name, entry)| entry.info(name))
            .collect();
        infos.sort_by(|a, b| a.name.cmp(&b.name));
        infos
    }

    /// Number of live topics.
    pub fn topic_count(&self) -> usize {
        self.state.read().topics.len()
    }

    /// Number of registered endpoints across all topics.
    pub fn endpoint_count(&self) -> usize {
        self.state.read().endpoints.len()
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Find or create the topic, enforcing type compatibility.
    fn claim_topic<'a>(
        state: &'a mut RegistryState,
        name: &str,
        type_desc: &TypeDescriptor,
    ) -> Result<(Arc<str>, &'a mut TopicEntry)> {
        if name.is_empty() {
            return Err(Error::InvalidTopicName(name.to_string()));
        }

        if let Some((key, existing)) = state.topics.get_key_value(name) {
            if !existing.type_desc.is_compatible(type_desc) {
                log::warn!(
                    "[registry] rejected {} on '{}': topic carries {}",
                    type_desc,
                    name,
                    existing.type_desc
                );
                return Err(Error::TypeMismatch {
                    topic: name.to_string(),
                    expected: existing.type_desc.clone(),
                    requested: type_desc.clone(),
                });
            }
            let key = Arc::clone(key);
            let entry = state
                .topics
                .get_mut(&key)
                .ok_or_else(|| Error::UnknownTopic(name.to_string()))?;
            return Ok((key, entry));
        }

        let key: Arc<str> = Arc::from(name);
        log::debug!("[registry] topic '{}' created with type {}", name, type_desc);
        let entry = state
            .topics
            .entry(Arc::clone(&key))
            .or_insert_with(|| TopicEntry::new(type_desc.clone()));
        Ok((key, entry))
    }

    fn route_of(state: &RegistryState, id: SubscriberId) -> Result<&Route> {
        let topic = state
            .endpoints
            .get(&EndpointId::Subscriber(id))
            .ok_or(Error::UnknownHandle(id.0))?;
        state
            .topics
            .get(topic)
            .and_then(|entry| entry.subscribers.iter().find(|r| r.id == id))
            .ok_or(Error::UnknownHandle(id.0))
    }
}

impl Default for TopicRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TopicRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TopicRegistry")
            .field("topic_count", &self.topic_count())
            .field("endpoint_count", &self.endpoint_count())
            .finish()
    }
}
