//! Subscription bus integration tests

use std::{cell::RefCell, rc::Rc};

use pathstore::bus::{Event, EventBus, topics};
use serde_json::json;

#[test]
fn test_topics_are_isolated() {
    let bus = EventBus::new();
    let log = Rc::new(RefCell::new(Vec::new()));

    for topic in ["name", "name.first", topics::VALUE] {
        let sink = Rc::clone(&log);
        bus.on(topic, move |event: &Event| {
            sink.borrow_mut().push((topic, event.value()));
        });
    }

    bus.emit("name", &Event::Value(json!("Homer")));
    assert_eq!(*log.borrow(), [("name", Some(json!("Homer")))]);
}

#[test]
fn test_unsubscribe_from_other_topic_mid_emit() {
    let bus = EventBus::new();
    let other = bus.on("other", |_| panic!("unsubscribed listener must not run"));
    let other = Rc::new(other);

    let handle = Rc::clone(&other);
    let emitter = bus.clone();
    bus.on("trigger", move |_| {
        handle.unsubscribe();
        emitter.emit("other", &Event::Dirty(Vec::new()));
    });

    bus.emit("trigger", &Event::Dirty(Vec::new()));
    assert!(!other.is_active());
    assert_eq!(bus.listener_count("other"), 0);
}

#[test]
fn test_listener_resubscribes_itself() {
    let bus = EventBus::new();
    let calls = Rc::new(RefCell::new(0));

    let counter = Rc::clone(&calls);
    let handle = bus.clone();
    bus.on("tick", move |_| {
        *counter.borrow_mut() += 1;
        let nested = Rc::clone(&counter);
        handle.on("tock", move |_| *nested.borrow_mut() += 10);
    });

    bus.emit("tick", &Event::Dirty(Vec::new()));
    bus.emit("tock", &Event::Dirty(Vec::new()));
    assert_eq!(*calls.borrow(), 11);
}

#[test]
fn test_event_accessors() {
    let event = Event::Dirty(Vec::new());
    assert_eq!(event.as_dirty().map(<[_]>::len), Some(0));
    assert!(event.value().is_none());
    assert!(event.as_errors().is_none());
    assert!(Event::Value(json!(1)).as_changed().is_none());
}
