// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Per-endpoint creation options.

use crate::config::DEFAULT_QUEUE_SIZE;
use crate::handler::{CallbackHandler, MessageHandler};
use crate::queue::{OverflowPolicy, Payload};
use std::sync::Arc;

/// Options for advertising a topic.
#[derive(Clone, Debug, Default)]
pub struct PublisherOptions {
    /// Full message definition text, recorded on the topic for introspection.
    ///
    /// The first publisher that supplies one wins.
    pub message_definition: Option<String>,
}

impl PublisherOptions {
    /// Attach a message definition.
    #[must_use]
    pub fn message_definition(mut self, definition: impl Into<String>) -> Self {
        self.message_definition = Some(definition.into());
        self
    }
}

/// Options for subscribing to a topic.
///
/// `None` fields fall back to the registry's
/// [`RegistryConfig`](crate::config::RegistryConfig).
///
/// # Example
///
/// ```rust
/// use tether::{OverflowPolicy, SubscriberOptions};
///
/// let opts = SubscriberOptions::new(100)
///     .overflow(OverflowPolicy::DropNewest)
///     .callback(|topic, seq, payload| println!("{} #{}: {:?}", topic, seq, payload));
/// assert!(opts.handler.is_some());
/// ```
#[derive(Clone)]
pub struct SubscriberOptions {
    /// Queue capacity (`0` = unbounded).
    pub queue_size: usize,
    /// Overflow policy for the queue.
    pub overflow: Option<OverflowPolicy>,
    /// Push-mode handler.
    pub handler: Option<Arc<dyn MessageHandler>>,
    /// Buffer into a queue even when a handler is present.
    pub buffer_with_callback: Option<bool>,
}

impl SubscriberOptions {
    /// Pull-mode options with the given queue capacity.
    pub fn new(queue_size: usize) -> Self {
        Self {
            queue_size,
            overflow: None,
            handler: None,
            buffer_with_callback: None,
        }
    }

    /// Pick the overflow policy.
    #[must_use]
    pub fn overflow(mut self, policy: OverflowPolicy) -> Self {
        self.overflow = Some(policy);
        self
    }

    /// Deliver through a handler object.
    #[must_use]
    pub fn handler(mut self, handler: Arc<dyn MessageHandler>) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Deliver through a closure.
    #[must_use]
    pub fn callback<F>(self, callback: F) -> Self
    where
        F: Fn(&str, u64, &Payload) + Send + Sync + 'static,
    {
        self.handler(Arc::new(CallbackHandler::new(callback)))
    }

    /// Keep buffering alongside the handler.
    #[must_use]
    pub fn buffer_with_callback(mut self, enabled: bool) -> Self {
        self.buffer_with_callback = Some(enabled);
        self
    }
}

impl Default for SubscriberOptions {
    fn default() -> Self {
        Self::new(DEFAULT_QUEUE_SIZE)
    }
}

impl std::fmt::Debug for SubscriberOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriberOptions")
            .field("queue_size", &self.queue_size)
            .field("overflow", &self.overflow)
            .field("has_handler", &self.handler.is_some())
            .field("buffer_with_callback", &self.buffer_with_callback)
            .finish()
    }
}
