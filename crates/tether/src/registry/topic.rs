// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Topic entries, endpoint ids and delivery routes.

use crate::handler::MessageHandler;
use crate::queue::{DeliveryQueue, Payload};
use crate::types::TypeDescriptor;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

/// Identifier of a registered publisher.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PublisherId(pub(crate) u64);

/// Identifier of a registered subscriber.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(pub(crate) u64);

impl PublisherId {
    /// Raw numeric id (unique across both endpoint kinds).
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl SubscriberId {
    /// Raw numeric id (unique across both endpoint kinds).
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Either kind of endpoint id, as accepted by
/// [`TopicRegistry::unregister`](super::TopicRegistry::unregister).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EndpointId {
    /// Publisher endpoint.
    Publisher(PublisherId),
    /// Subscriber endpoint.
    Subscriber(SubscriberId),
}

impl EndpointId {
    /// Raw numeric id.
    pub fn raw(self) -> u64 {
        match self {
            EndpointId::Publisher(id) => id.0,
            EndpointId::Subscriber(id) => id.0,
        }
    }
}

impl From<PublisherId> for EndpointId {
    fn from(id: PublisherId) -> Self {
        EndpointId::Publisher(id)
    }
}

impl From<SubscriberId> for EndpointId {
    fn from(id: SubscriberId) -> Self {
        EndpointId::Subscriber(id)
    }
}

/// Where a publish lands for one subscriber.
///
/// Cloned out of the registry under its lock; the clone keeps the queue
/// alive, so a publish racing with unsubscription completes against a
/// detached queue instead of a dangling one.
#[derive(Clone)]
pub(crate) struct Route {
    pub(crate) id: SubscriberId,
    pub(crate) queue: Option<Arc<DeliveryQueue>>,
    pub(crate) handler: Option<Arc<dyn MessageHandler>>,
}

impl Route {
    /// Enqueue and/or invoke the handler. Never blocks, never panics.
    pub(crate) fn deliver(&self, topic: &str, seq: u64, payload: &Payload) {
        if let Some(queue) = &self.queue {
            queue.push(Arc::clone(payload));
        }

        if let Some(handler) = &self.handler {
            let outcome = catch_unwind(AssertUnwindSafe(|| {
                handler.on_message(topic, seq, payload);
            }));
            if outcome.is_err() {
                log::error!(
                    "[registry] handler of subscriber {} panicked on '{}' seq={}",
                    self.id.0,
                    topic,
                    seq
                );
            }
        }
    }
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("id", &self.id)
            .field("has_queue", &self.queue.is_some())
            .field("has_handler", &self.handler.is_some())
            .finish()
    }
}

/// One live topic.
#[derive(Debug)]
pub(crate) struct TopicEntry {
    pub(crate) type_desc: TypeDescriptor,
    pub(crate) definition: Option<Arc<str>>,
    /// Registration order.
    pub(crate) publishers: Vec<PublisherId>,
    /// Registration order.
    pub(crate) subscribers: Vec<Route>,
}

impl TopicEntry {
    pub(crate) fn new(type_desc: TypeDescriptor) -> Self {
        Self {
            type_desc,
            definition: None,
            publishers: Vec::new(),
            subscribers: Vec::new(),
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.publishers.is_empty() && self.subscribers.is_empty()
    }

    /// Drop `id` from whichever set holds it.
    pub(crate) fn remove(&mut self, id: EndpointId) {
        match id {
            EndpointId::Publisher(p) => self.publishers.retain(|x| *x != p),
            EndpointId::Subscriber(s) => self.subscribers.retain(|r| r.id != s),
        }
    }

    pub(crate) fn info(&self, name: &str) -> TopicInfo {
        TopicInfo {
            name: name.to_string(),
            type_desc: self.type_desc.clone(),
            message_definition: self.definition.as_deref().map(str::to_string),
            publisher_count: self.publishers.len(),
            subscriber_count: self.subscribers.len(),
        }
    }
}

/// Introspection snapshot of a topic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TopicInfo {
    /// Fully resolved topic name.
    pub name: String,
    /// Type fixed by the first endpoint.
    pub type_desc: TypeDescriptor,
    /// Message definition text supplied by a publisher, if any.
    pub message_definition: Option<String>,
    /// Live publishers.
    pub publisher_count: usize,
    /// Live subscribers.
    pub subscriber_count: usize,
}
