// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Opaque-handle boundary tests
//!
//! Exercises the `Session` tables the way a host runtime would: raw u64
//! handles in, raw bytes out.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tether::{
    CallbackHandler, Error, MessageHandler, NodeHandle, Payload, PublisherHandle, Session,
    SubscriberHandle, TopicRegistry, TypeDescriptor,
};

fn pose() -> TypeDescriptor {
    TypeDescriptor::new("geometry_msgs/Pose", "e45d45a5a1ce597b249e23fb30fc871f")
}

fn session() -> Session {
    Session::with_registry(Arc::new(TopicRegistry::new()))
}

#[test]
fn test_round_trip_through_raw_handles() {
    let s = session();
    let node = NodeHandle::from_raw(s.create_node("host").raw());
    let sub = SubscriberHandle::from_raw(
        s.create_subscriber(node, "pose", pose(), 16, None)
            .expect("subscriber")
            .raw(),
    );
    let publisher = PublisherHandle::from_raw(
        s.create_publisher(node, "pose", pose()).expect("publisher").raw(),
    );

    for i in 0..4u8 {
        s.publish(publisher, &[i; 8]).expect("publish");
    }
    assert_eq!(s.pending_count(sub).expect("pending"), 4);

    let first = s.drain(sub, 3).expect("drain");
    assert_eq!(first.len(), 3);
    assert_eq!(&*first[0], &[0u8; 8]);
    assert_eq!(s.pending_count(sub).expect("pending"), 1);
}

#[test]
fn test_nodes_in_one_session_communicate() {
    let s = session();
    let talker = s.create_node_in("talker", "/ns");
    let listener = s.create_node("listener");

    let sub = s
        .create_subscriber(listener, "/ns/chatter", pose(), 4, None)
        .expect("subscriber");
    let publisher = s.create_publisher(talker, "chatter", pose()).expect("publisher");

    s.publish(publisher, b"hi").expect("publish");
    assert_eq!(s.pending_count(sub).expect("pending"), 1);

    let topics = s.topics();
    assert_eq!(topics.len(), 1);
    assert_eq!(topics[0].name, "/ns/chatter");
}

#[test]
fn test_push_subscriber_through_session() {
    let s = session();
    let node = s.create_node("push");
    let last_seq = Arc::new(AtomicU64::new(0));

    let seen = Arc::clone(&last_seq);
    let handler: Arc<dyn MessageHandler> =
        Arc::new(CallbackHandler::new(move |_: &str, seq: u64, _: &Payload| {
            seen.store(seq, Ordering::SeqCst);
        }));
    let sub = s
        .create_subscriber(node, "pose", pose(), 4, Some(handler))
        .expect("subscriber");
    let publisher = s.create_publisher(node, "pose", pose()).expect("publisher");

    s.publish(publisher, b"a").expect("publish");
    s.publish(publisher, b"b").expect("publish");
    assert_eq!(last_seq.load(Ordering::SeqCst), 2);
    assert_eq!(s.pending_count(sub).expect("pending"), 0);
}

#[test]
fn test_type_mismatch_across_handles() {
    let s = session();
    let node = s.create_node("typed");
    let _publisher = s.create_publisher(node, "pose", pose()).expect("publisher");

    let other = TypeDescriptor::new("std_msgs/String", "992ce8a1687cec8c8bd883ec73ca41d1");
    assert!(matches!(
        s.create_subscriber(node, "pose", other, 4, None),
        Err(Error::TypeMismatch { .. })
    ));
}

#[test]
fn test_stale_handles_never_alias() {
    let s = session();
    let node = s.create_node("first");
    let publisher = s.create_publisher(node, "pose", pose()).expect("publisher");
    s.destroy_publisher(publisher).expect("destroy publisher");

    let again = s.create_publisher(node, "pose", pose()).expect("publisher");
    assert_ne!(again, publisher);
    assert!(matches!(s.publish(publisher, b"x"), Err(Error::UnknownHandle(_))));
    s.publish(again, b"x").expect("publish through new handle");
}

#[test]
fn test_concurrent_publish_through_session() {
    const N: usize = 500;
    let s = session();
    let node = s.create_node("threads");
    let sub = s
        .create_subscriber(node, "pose", pose(), 0, None)
        .expect("subscriber");
    let handles: Vec<PublisherHandle> = (0..4)
        .map(|_| s.create_publisher(node, "pose", pose()).expect("publisher"))
        .collect();

    std::thread::scope(|scope| {
        for &publisher in &handles {
            let s = &s;
            scope.spawn(move || {
                for _ in 0..N {
                    s.publish(publisher, b"p").expect("publish");
                }
            });
        }
    });

    assert_eq!(s.pending_count(sub).expect("pending"), handles.len() * N);
    s.destroy_node(node).expect("destroy");
    assert_eq!(s.node_count(), 0);
    assert_eq!(s.registry().topic_count(), 0);
}
