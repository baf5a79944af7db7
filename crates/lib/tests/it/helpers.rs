use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use pathstore::{Event, Store, StoreConfig, Subscription, ValidationMode};
use serde_json::{Value, json};

// ==========================
// STORE FACTORIES
// ==========================

/// The two-friend document used across the store tests.
pub fn friends_value() -> Value {
    json!({
        "friends": [
            {"name": "Homer"},
            {"name": "Barney"}
        ]
    })
}

pub fn friends_store() -> Store {
    Store::new(friends_value())
}

/// A store that validates on every change.
pub fn on_change_store(initial: Value) -> Store {
    Store::with_config(
        initial,
        StoreConfig::default().with_mode(ValidationMode::OnChange),
    )
}

// ==========================
// LISTENER HELPERS
// ==========================

/// Records every event delivered on `topic`.
pub fn record(store: &Store, topic: &str) -> (Rc<RefCell<Vec<Event>>>, Subscription) {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    let subscription = store.on(topic, move |event| sink.borrow_mut().push(event.clone()));
    (log, subscription)
}

/// Counts deliveries on `topic`.
pub fn count(store: &Store, topic: &str) -> Rc<Cell<usize>> {
    let counter = Rc::new(Cell::new(0));
    let sink = Rc::clone(&counter);
    store.on(topic, move |_| sink.set(sink.get() + 1));
    counter
}

/// Records the topic of every event delivered on any of `topics`, in order.
pub fn record_order(store: &Store, topics: &[&str]) -> Rc<RefCell<Vec<String>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    for topic in topics {
        let sink = Rc::clone(&log);
        let name = topic.to_string();
        store.on(*topic, move |_| sink.borrow_mut().push(name.clone()));
    }
    log
}
