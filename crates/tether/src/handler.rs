// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Push-mode delivery: handlers invoked synchronously by `publish()`.

use crate::queue::Payload;

/// Receiver for push-mode subscriptions.
///
/// # Thread Safety
/// Implementations must be Send + Sync: `on_message` runs on whatever thread
/// called [`Publisher::publish`](crate::Publisher::publish), possibly several
/// at once. No registry lock is held during the call, so a handler may
/// publish or create endpoints itself.
///
/// # Panics
/// A panicking handler is caught by the publisher; delivery to the remaining
/// subscribers continues and the panic is logged.
///
/// # Examples
/// ```no_run
/// use tether::MessageHandler;
/// use tether::queue::Payload;
///
/// struct Printer;
///
/// impl MessageHandler for Printer {
///     fn on_message(&self, topic: &str, seq: u64, payload: &Payload) {
///         println!("{} #{}: {} bytes", topic, seq, payload.len());
///     }
/// }
/// ```
pub trait MessageHandler: Send + Sync {
    /// Called once per message reaching this subscription.
    ///
    /// `seq` is the publishing endpoint's sequence number (starts at 1).
    fn on_message(&self, topic: &str, seq: u64, payload: &Payload);
}

/// Closure adapter for [`MessageHandler`].
///
/// # Examples
/// ```no_run
/// use tether::CallbackHandler;
/// use std::sync::Arc;
///
/// let handler = Arc::new(CallbackHandler::new(|topic, seq, payload| {
///     println!("{} #{} ({} bytes)", topic, seq, payload.len());
/// }));
/// ```
pub struct CallbackHandler<F>
where
    F: Fn(&str, u64, &Payload) + Send + Sync,
{
    callback: F,
}

impl<F> CallbackHandler<F>
where
    F: Fn(&str, u64, &Payload) + Send + Sync,
{
    /// Wrap a closure.
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> MessageHandler for CallbackHandler<F>
where
    F: Fn(&str, u64, &Payload) + Send + Sync,
{
    fn on_message(&self, topic: &str, seq: u64, payload: &Payload) {
        (self.callback)(topic, seq, payload);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_callback_handler_invoked() {
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = Arc::clone(&counter);

        let handler = CallbackHandler::new(move |topic, seq, payload| {
            assert_eq!(topic, "/test_topic");
            assert_eq!(seq, 42);
            assert_eq!(payload.len(), 10);
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });

        let payload: Payload = Arc::from(vec![0u8; 10]);
        handler.on_message("/test_topic", 42, &payload);

        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_handler_as_trait_object() {
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = Arc::clone(&counter);

        let handler: Arc<dyn MessageHandler> =
            Arc::new(CallbackHandler::new(move |_topic, _seq, _payload| {
                counter_clone.fetch_add(1, Ordering::SeqCst);
            }));

        let payload: Payload = Arc::from(vec![1u8, 2, 3]);
        for seq in 1..=3 {
            handler.on_message("/t", seq, &payload);
        }

        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }
}
