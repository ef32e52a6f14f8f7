// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Subscriber endpoint.

use super::NodeState;
use crate::queue::{DeliveryQueue, Payload, QueueStats};
use crate::registry::{EndpointId, SubscriberId};
use crate::types::TypeDescriptor;
use crate::{Error, Result};
use std::sync::Arc;

/// Subscribing endpoint bound to one topic and type.
///
/// Pull mode: consumers call [`drain`](Self::drain) on their own schedule.
/// Push mode: the handler given at creation receives each message on the
/// publishing thread; a handler-only subscriber has no queue, so `drain`
/// returns nothing and the pending count stays 0.
pub struct Subscriber {
    id: SubscriberId,
    topic: String,
    type_desc: TypeDescriptor,
    node: Arc<NodeState>,
}

impl Subscriber {
    pub(crate) fn new(
        id: SubscriberId,
        topic: String,
        type_desc: TypeDescriptor,
        node: Arc<NodeState>,
    ) -> Self {
        Self {
            id,
            topic,
            type_desc,
            node,
        }
    }

    /// Queue lookup; `Ok(None)` for handler-only subscribers.
    fn queue(&self) -> Result<Option<Arc<DeliveryQueue>>> {
        match self.node.registry().lookup_queue(self.id) {
            Ok(queue) => Ok(Some(queue)),
            Err(Error::NoQueue(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Remove up to `max_count` oldest pending payloads, oldest first.
    ///
    /// # Errors
    /// `UnknownHandle` once the subscriber (or its node) was destroyed.
    pub fn drain(&self, max_count: usize) -> Result<Vec<Payload>> {
        Ok(self
            .queue()?
            .map(|queue| queue.drain(max_count))
            .unwrap_or_default())
    }

    /// Remove everything pending.
    pub fn drain_all(&self) -> Result<Vec<Payload>> {
        self.drain(usize::MAX)
    }

    /// Pending payload count, for flow-control decisions.
    pub fn peek_pending_count(&self) -> Result<usize> {
        Ok(self.queue()?.map_or(0, |queue| queue.len()))
    }

    /// Queue counters (all zero for handler-only subscribers).
    pub fn stats(&self) -> Result<QueueStats> {
        Ok(self.queue()?.map(|queue| queue.stats()).unwrap_or_default())
    }

    /// True when messages are buffered for `drain`.
    pub fn is_buffered(&self) -> Result<bool> {
        Ok(self.queue()?.is_some())
    }

    /// Number of publishers currently on the topic.
    pub fn publisher_count(&self) -> Result<usize> {
        let registry = self.node.registry();
        let topic = registry.topic_of(self.id)?;
        Ok(registry.publishers_of(&topic).len())
    }

    /// Unregister now instead of at drop.
    ///
    /// # Errors
    /// `UnknownHandle` when already unregistered.
    pub fn shutdown(&self) -> Result<()> {
        self.node.release(EndpointId::Subscriber(self.id))
    }

    /// Registry id.
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Fully resolved topic name.
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Type this subscriber was created with.
    pub fn type_desc(&self) -> &TypeDescriptor {
        &self.type_desc
    }
}

impl Drop for Subscriber {
    fn drop(&mut self) {
        let _ = self.node.release(EndpointId::Subscriber(self.id));
    }
}

impl std::fmt::Debug for Subscriber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscriber")
            .field("id", &self.id)
            .field("topic", &self.topic)
            .field("type_desc", &self.type_desc)
            .finish()
    }
}
