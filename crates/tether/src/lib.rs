// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # tether - in-process typed pub/sub
//!
//! Topic-based publish/subscribe between components of one process. Nodes
//! create publishers and subscribers on named topics; a shared registry
//! binds each topic to exactly one type and routes every published payload
//! to the subscribers registered at that instant. Payloads are opaque bytes:
//! serialization belongs to the caller.
//!
//! ## Quick Start
//!
//! ```rust
//! use tether::{Node, TopicRegistry, TypeDescriptor};
//! use std::sync::Arc;
//!
//! let registry = Arc::new(TopicRegistry::new());
//! let talker = Node::with_registry("talker", Arc::clone(&registry));
//! let listener = Node::with_registry("listener", registry);
//!
//! let ty = TypeDescriptor::from_definition("std_msgs/String", "string data\n");
//! let sub = listener.create_subscriber("chatter", ty.clone(), 10)?;
//! let publisher = talker.create_publisher("chatter", ty)?;
//!
//! publisher.publish(b"hello")?;
//! let received = sub.drain(10)?;
//! assert_eq!(&*received[0], b"hello");
//! # Ok::<(), tether::Error>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +---------------------------------------------------------------------+
//! |                      Boundary (Session handles)                     |
//! |   NodeHandle | PublisherHandle | SubscriberHandle -> DashMap tables |
//! +---------------------------------------------------------------------+
//! |                           Node Layer                                |
//! |   Node -> Publisher / Subscriber | name resolution | ownership      |
//! +---------------------------------------------------------------------+
//! |                         Topic Registry                              |
//! |   topic -> (type, publishers, subscriber routes) | RwLock + ArcSwap |
//! +---------------------------------------------------------------------+
//! |                         Delivery Queues                             |
//! |   bounded FIFO | DropOldest / DropNewest | push-mode handlers       |
//! +---------------------------------------------------------------------+
//! ```
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`TypeDescriptor`] | Message type name plus content hash |
//! | [`TopicRegistry`] | Topic table and routing, process-wide or explicit |
//! | [`Node`] | Factory and owner of endpoints |
//! | [`Publisher`] | Sends payloads to current subscribers |
//! | [`Subscriber`] | Receives payloads by drain or push callback |
//! | [`Session`] | Opaque-handle API for host runtimes |

pub mod config;
mod error;
mod handler;
pub mod logging;
mod node;
pub mod queue;
mod registry;
pub mod session;
mod types;

pub use error::{Error, Result};
pub use handler::{CallbackHandler, MessageHandler};
pub use node::{Node, NodeBuilder, Publisher, Subscriber};
pub use queue::{DeliveryQueue, OverflowPolicy, Payload, QueueStats};
pub use registry::{
    EndpointId, PublisherId, PublisherOptions, SubscriberId, SubscriberOptions, TopicInfo,
    TopicRegistry,
};
pub use session::{NodeHandle, PublisherHandle, Session, SubscriberHandle};
pub use types::TypeDescriptor;
