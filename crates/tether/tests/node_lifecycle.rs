// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Node, namespace and push-mode integration tests

use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tether::config::RegistryConfig;
use tether::{
    Error, MessageHandler, Node, Payload, PublisherOptions, SubscriberOptions, TopicRegistry,
    TypeDescriptor,
};

const STRING_DEF: &str = "string data\n";

fn string() -> TypeDescriptor {
    TypeDescriptor::from_definition("std_msgs/String", STRING_DEF)
}

#[test]
fn test_namespaced_nodes_share_absolute_topics() {
    let registry = Arc::new(TopicRegistry::new());
    let driver = Node::builder("driver")
        .namespace("robot")
        .registry(Arc::clone(&registry))
        .build();
    let monitor = Node::with_registry("monitor", Arc::clone(&registry));

    let publisher = driver.create_publisher("scan", string()).expect("publisher");
    let status = driver.create_publisher("~status", string()).expect("publisher");
    assert_eq!(publisher.topic(), "/robot/scan");
    assert_eq!(status.topic(), "/robot/driver/status");

    let sub = monitor
        .create_subscriber("/robot/scan", string(), 4)
        .expect("subscriber");
    publisher.publish(b"ranges").expect("publish");
    assert_eq!(sub.peek_pending_count().expect("pending"), 1);

    let names: Vec<String> = registry.topics().into_iter().map(|t| t.name).collect();
    assert_eq!(names, vec!["/robot/driver/status", "/robot/scan"]);
}

#[test]
fn test_push_mode_runs_on_publishing_thread() {
    let registry = Arc::new(TopicRegistry::new());
    let n = Node::with_registry("push", registry);
    let seen = Arc::new(Mutex::new(Vec::<(String, u64, Vec<u8>)>::new()));

    let sink = Arc::clone(&seen);
    let options = SubscriberOptions::new(10).callback(move |topic, seq, payload| {
        sink.lock().push((topic.to_string(), seq, payload.to_vec()));
    });
    let sub = n.create_subscriber_with("chatter", string(), &options).expect("subscriber");
    let publisher = n.create_publisher("chatter", string()).expect("publisher");

    publisher.publish(b"one").expect("publish");
    publisher.publish(b"two").expect("publish");

    let seen = seen.lock();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0], ("/chatter".to_string(), 1, b"one".to_vec()));
    assert_eq!(seen[1].1, 2);

    // Handler-only: nothing buffered.
    assert!(!sub.is_buffered().expect("buffered"));
    assert!(sub.drain_all().expect("drain").is_empty());
    assert_eq!(sub.peek_pending_count().expect("pending"), 0);
}

#[test]
fn test_push_and_pull_together() {
    struct Counter(AtomicUsize);

    impl MessageHandler for Counter {
        fn on_message(&self, _topic: &str, _seq: u64, _payload: &Payload) {
            self.0.fetch_add(1, Ordering::Relaxed);
        }
    }

    let registry = Arc::new(TopicRegistry::with_config(
        RegistryConfig::builder().buffer_with_callback(true).build(),
    ));
    let n = Node::with_registry("both", registry);
    let counter = Arc::new(Counter(AtomicUsize::new(0)));
    let options = SubscriberOptions::new(8).handler(Arc::clone(&counter) as Arc<dyn MessageHandler>);

    let sub = n.create_subscriber_with("t", string(), &options).expect("subscriber");
    let publisher = n.create_publisher("t", string()).expect("publisher");
    for _ in 0..3 {
        publisher.publish(b"m").expect("publish");
    }

    assert_eq!(counter.0.load(Ordering::Relaxed), 3);
    assert_eq!(sub.drain_all().expect("drain").len(), 3);
}

#[test]
fn test_panicking_handler_does_not_stop_delivery() {
    let registry = Arc::new(TopicRegistry::new());
    let n = Node::with_registry("panicky", registry);
    let bad = SubscriberOptions::new(1).callback(|_, _, _| panic!("handler failure"));
    let _bad = n.create_subscriber_with("t", string(), &bad).expect("subscriber");
    let good = n.create_subscriber("t", string(), 4).expect("subscriber");
    let publisher = n.create_publisher("t", string()).expect("publisher");

    publisher.publish(b"still delivered").expect("publish");
    assert_eq!(good.peek_pending_count().expect("pending"), 1);
}

#[test]
fn test_message_definition_exposed_by_topic_info() {
    let registry = Arc::new(TopicRegistry::new());
    let n = Node::with_registry("definer", Arc::clone(&registry));
    let options = PublisherOptions::default().message_definition(STRING_DEF);
    let _publisher = n
        .create_publisher_with("chatter", string(), &options)
        .expect("publisher");
    let _sub = n.create_subscriber("chatter", string(), 1).expect("subscriber");

    let info = registry.topic_info("/chatter").expect("topic info");
    assert_eq!(info.type_desc, string());
    assert_eq!(info.message_definition.as_deref(), Some(STRING_DEF));
    assert_eq!(info.publisher_count, 1);
    assert_eq!(info.subscriber_count, 1);

    assert!(matches!(
        registry.topic_info("/missing"),
        Err(Error::UnknownTopic(_))
    ));
}

#[test]
fn test_endpoint_shutdown_before_node() {
    let registry = Arc::new(TopicRegistry::new());
    let n = Node::with_registry("n", Arc::clone(&registry));
    let publisher = n.create_publisher("t", string()).expect("publisher");
    let sub = n.create_subscriber("t", string(), 1).expect("subscriber");

    publisher.shutdown().expect("shutdown");
    assert!(matches!(publisher.shutdown(), Err(Error::UnknownHandle(_))));
    assert!(matches!(publisher.publish(b"x"), Err(Error::UnknownHandle(_))));
    assert_eq!(sub.publisher_count().expect("count"), 0);
    assert_eq!(n.endpoint_count(), 1);

    drop(sub);
    assert_eq!(n.endpoint_count(), 0);
    assert_eq!(registry.topic_count(), 0);
}

#[test]
fn test_endpoints_outlive_their_node() {
    let registry = Arc::new(TopicRegistry::new());
    let publisher = {
        let n = Node::with_registry("short-lived", Arc::clone(&registry));
        n.create_publisher("t", string()).expect("publisher")
    };

    assert_eq!(registry.endpoint_count(), 0);
    assert!(matches!(publisher.publish(b"x"), Err(Error::UnknownHandle(_))));
}

#[test]
fn test_queue_size_clamped_by_config() {
    let registry = Arc::new(TopicRegistry::with_config(
        RegistryConfig::builder().max_queue_size(2).build(),
    ));
    let n = Node::with_registry("clamped", registry);
    let sub = n.create_subscriber("t", string(), 100).expect("subscriber");
    let publisher = n.create_publisher("t", string()).expect("publisher");

    for i in 0..5u8 {
        publisher.publish(&[i]).expect("publish");
    }
    let kept: Vec<u8> = sub.drain_all().expect("drain").iter().map(|p| p[0]).collect();
    assert_eq!(kept, vec![3, 4]);
}
