// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Publisher endpoint.

use super::NodeState;
use crate::queue::Payload;
use crate::registry::{EndpointId, PublisherId};
use crate::types::TypeDescriptor;
use crate::Result;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Publishing endpoint bound to one topic and type.
///
/// Holds no reference to subscribers: every [`publish`](Self::publish)
/// asks the registry for the current subscriber set, so subscribers can
/// come and go without the publisher noticing. Dropping the publisher
/// unregisters it.
pub struct Publisher {
    id: PublisherId,
    topic: String,
    type_desc: TypeDescriptor,
    node: Arc<NodeState>,
    seq: AtomicU64,
}

impl Publisher {
    pub(crate) fn new(
        id: PublisherId,
        topic: String,
        type_desc: TypeDescriptor,
        node: Arc<NodeState>,
    ) -> Self {
        Self {
            id,
            topic,
            type_desc,
            node,
            seq: AtomicU64::new(0),
        }
    }

    /// Deliver `payload` to every subscriber registered right now.
    ///
    /// The subscriber set is snapshotted once (registration order);
    /// subscribers joining after the snapshot do not get this message.
    /// Full queues apply their overflow policy; this call never blocks on
    /// a consumer. Push-mode handlers run on the calling thread.
    ///
    /// # Errors
    /// `UnknownHandle` once the publisher (or its node) was destroyed.
    pub fn publish(&self, payload: &[u8]) -> Result<()> {
        self.publish_shared(Arc::from(payload))
    }

    /// Same as [`publish`](Self::publish) without copying the payload.
    pub fn publish_shared(&self, payload: Payload) -> Result<()> {
        let snapshot = self.node.registry().routes_for(self.id)?;
        let seq = self.seq.fetch_add(1, Ordering::Relaxed) + 1;

        for route in &snapshot.routes {
            route.deliver(&snapshot.topic, seq, &payload);
        }

        log::trace!(
            "[publisher] {} seq={} -> {} subscribers on '{}'",
            self.id.raw(),
            seq,
            snapshot.routes.len(),
            snapshot.topic
        );
        Ok(())
    }

    /// Number of subscribers currently on the topic.
    pub fn subscriber_count(&self) -> Result<usize> {
        Ok(self.node.registry().routes_for(self.id)?.routes.len())
    }

    /// Messages published so far.
    pub fn sequence(&self) -> u64 {
        self.seq.load(Ordering::Relaxed)
    }

    /// Unregister now instead of at drop.
    ///
    /// # Errors
    /// `UnknownHandle` when already unregistered.
    pub fn shutdown(&self) -> Result<()> {
        self.node.release(EndpointId::Publisher(self.id))
    }

    /// Registry id.
    pub fn id(&self) -> PublisherId {
        self.id
    }

    /// Fully resolved topic name.
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Type this publisher was created with.
    pub fn type_desc(&self) -> &TypeDescriptor {
        &self.type_desc
    }
}

impl Drop for Publisher {
    fn drop(&mut self) {
        // Already gone when shut down explicitly or when the node was destroyed.
        let _ = self.node.release(EndpointId::Publisher(self.id));
    }
}

impl std::fmt::Debug for Publisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Publisher")
            .field("id", &self.id)
            .field("topic", &self.topic)
            .field("type_desc", &self.type_desc)
            .field("seq", &self.sequence())
            .finish()
    }
}
