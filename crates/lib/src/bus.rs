//! Named-topic publish/subscribe registry.
//!
//! The bus is the only way observers learn about store changes. A topic is
//! either a node's display path or one of the reserved names in [`topics`].
//! Emitting is synchronous: every listener registered on the topic runs, in
//! registration order, before `emit` returns.
//!
//! Listeners are allowed to call back into the bus (and into the store that
//! owns it). The listener list is snapshotted before dispatch and no borrow
//! is held while a listener runs, so subscribing or unsubscribing from inside
//! a listener is safe. Nested emits are bounded by a depth limit; an emit
//! past the limit is dropped and logged.
//!
//! ```rust
//! use std::{cell::Cell, rc::Rc};
//! use pathstore::bus::{Event, EventBus};
//!
//! let bus = EventBus::new();
//! let seen = Rc::new(Cell::new(0));
//! let counter = Rc::clone(&seen);
//! let subscription = bus.on("name", move |_event: &Event| counter.set(counter.get() + 1));
//!
//! bus.emit("name", &Event::Value("Homer".into()));
//! subscription.unsubscribe();
//! bus.emit("name", &Event::Value("Marge".into()));
//! assert_eq!(seen.get(), 1);
//! ```

use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    fmt,
    rc::{Rc, Weak},
};

use serde_json::Value;

use crate::node::{FlatNode, Node, NodeId};

/// Reserved topic names. Every other topic is a display path.
pub mod topics {
    /// Any value mutation; payload [`Event::Changed`](super::Event::Changed)
    pub const VALUE: &str = "value";
    /// Any metadata mutation; payload [`Event::Changed`](super::Event::Changed)
    pub const META: &str = "meta";
    /// Dirty-id set changed; payload [`Event::Dirty`](super::Event::Dirty)
    pub const DIRTY: &str = "dirty";
    /// Error list changed; payload [`Event::Errors`](super::Event::Errors)
    pub const ERRORS: &str = "errors";
    /// Whole tree replaced; payload [`Event::Reset`](super::Event::Reset)
    pub const RESET: &str = "reset";
}

/// Default bound on nested emits.
pub const DEFAULT_MAX_EMIT_DEPTH: usize = 32;

/// Payload delivered to listeners.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// New parsed value of the node at the topic's path
    Value(Value),
    /// Snapshot of the node at the topic's path after a structural or
    /// metadata change
    Node(Node),
    /// Path-qualified snapshot, for the generic `"value"` and `"meta"` topics
    Changed(FlatNode),
    /// The full dirty-id set
    Dirty(Vec<NodeId>),
    /// The full error list
    Errors(Vec<FlatNode>),
    /// The new root after a reset
    Reset(Node),
}

impl Event {
    /// Returns the plain value carried by this event, parsing node snapshots.
    ///
    /// `None` for the dirty and error list payloads.
    pub fn value(&self) -> Option<Value> {
        match self {
            Event::Value(value) => Some(value.clone()),
            Event::Node(node) | Event::Reset(node) => Some(node.to_value()),
            Event::Changed(entry) => Some(entry.node.to_value()),
            Event::Dirty(_) | Event::Errors(_) => None,
        }
    }

    pub fn as_changed(&self) -> Option<&FlatNode> {
        match self {
            Event::Changed(entry) => Some(entry),
            _ => None,
        }
    }

    pub fn as_dirty(&self) -> Option<&[NodeId]> {
        match self {
            Event::Dirty(ids) => Some(ids),
            _ => None,
        }
    }

    pub fn as_errors(&self) -> Option<&[FlatNode]> {
        match self {
            Event::Errors(entries) => Some(entries),
            _ => None,
        }
    }
}

type Listener = Rc<dyn Fn(&Event)>;

struct ListenerEntry {
    id: u64,
    active: Rc<Cell<bool>>,
    callback: Listener,
}

struct BusInner {
    topics: RefCell<HashMap<String, Vec<ListenerEntry>>>,
    next_id: Cell<u64>,
    depth: Cell<usize>,
    max_depth: usize,
}

impl BusInner {
    fn remove(&self, topic: &str, id: u64) {
        // If the registry is busy the entry is already inactive and gets
        // pruned on the next registration.
        let Ok(mut topics) = self.topics.try_borrow_mut() else {
            return;
        };
        if let Some(listeners) = topics.get_mut(topic) {
            listeners.retain(|entry| entry.id != id);
            if listeners.is_empty() {
                topics.remove(topic);
            }
        }
    }
}

/// Decrements the emit depth when dispatch finishes, even on unwind.
struct DepthGuard<'a>(&'a Cell<usize>);

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.0.set(self.0.get().saturating_sub(1));
    }
}

/// Handle to a topic registry. Clones share the same registry.
#[derive(Clone)]
pub struct EventBus {
    inner: Rc<BusInner>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let topics = self
            .inner
            .topics
            .try_borrow()
            .map(|topics| topics.len())
            .unwrap_or_default();
        f.debug_struct("EventBus")
            .field("topics", &format!("<{topics} topics>"))
            .field("max_depth", &self.inner.max_depth)
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_max_depth(DEFAULT_MAX_EMIT_DEPTH)
    }

    /// Creates a bus that drops emits nested deeper than `max_depth`.
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            inner: Rc::new(BusInner {
                topics: RefCell::new(HashMap::new()),
                next_id: Cell::new(0),
                depth: Cell::new(0),
                max_depth,
            }),
        }
    }

    /// Registers `listener` under `topic`.
    ///
    /// The listener stays registered until [`Subscription::unsubscribe`] is
    /// called or the bus is dropped. Dropping the returned handle does not
    /// unsubscribe.
    pub fn on<F>(&self, topic: impl Into<String>, listener: F) -> Subscription
    where
        F: Fn(&Event) + 'static,
    {
        let topic = topic.into();
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        let active = Rc::new(Cell::new(true));

        {
            let mut topics = self.inner.topics.borrow_mut();
            let listeners = topics.entry(topic.clone()).or_default();
            listeners.retain(|entry| entry.active.get());
            listeners.push(ListenerEntry {
                id,
                active: Rc::clone(&active),
                callback: Rc::new(listener),
            });
        }
        tracing::trace!(topic = %topic, listener = id, "Registered listener");

        Subscription {
            bus: Rc::downgrade(&self.inner),
            topic,
            id,
            active,
        }
    }

    /// Invokes every listener currently registered on `topic`.
    ///
    /// Unknown topics are a no-op. Listeners unsubscribed by an earlier
    /// listener of the same emit are skipped.
    pub fn emit(&self, topic: &str, event: &Event) {
        let snapshot: Vec<(Rc<Cell<bool>>, Listener)> = {
            let topics = self.inner.topics.borrow();
            match topics.get(topic) {
                Some(listeners) => listeners
                    .iter()
                    .filter(|entry| entry.active.get())
                    .map(|entry| (Rc::clone(&entry.active), Rc::clone(&entry.callback)))
                    .collect(),
                None => return,
            }
        };

        let depth = self.inner.depth.get();
        if depth >= self.inner.max_depth {
            tracing::error!(
                topic = %topic,
                depth,
                max_depth = self.inner.max_depth,
                "Dropping emit: listener recursion exceeded the maximum depth"
            );
            return;
        }
        self.inner.depth.set(depth + 1);
        let _guard = DepthGuard(&self.inner.depth);

        tracing::trace!(topic = %topic, listeners = snapshot.len(), depth, "Emitting event");
        for (active, callback) in snapshot {
            if active.get() {
                callback(event);
            }
        }
    }

    /// Number of active listeners on `topic`.
    pub fn listener_count(&self, topic: &str) -> usize {
        self.inner
            .topics
            .borrow()
            .get(topic)
            .map(|listeners| listeners.iter().filter(|entry| entry.active.get()).count())
            .unwrap_or(0)
    }

    /// Returns true if any active listener is registered on `topic`.
    pub fn has_listeners(&self, topic: &str) -> bool {
        self.listener_count(topic) > 0
    }

    /// Nesting depth of the emit currently running, 0 when idle.
    pub fn depth(&self) -> usize {
        self.inner.depth.get()
    }
}

/// Registration handle returned by [`EventBus::on`].
///
/// Holds only a weak reference to the bus, so it never keeps the bus alive.
pub struct Subscription {
    bus: Weak<BusInner>,
    topic: String,
    id: u64,
    active: Rc<Cell<bool>>,
}

impl Subscription {
    /// Removes the listener. Safe to call any number of times, from any
    /// listener, at any point of an emit.
    pub fn unsubscribe(&self) {
        if !self.active.replace(false) {
            return;
        }
        if let Some(bus) = self.bus.upgrade() {
            bus.remove(&self.topic, self.id);
        }
        tracing::trace!(topic = %self.topic, listener = self.id, "Unsubscribed listener");
    }

    pub fn is_active(&self) -> bool {
        self.active.get() && self.bus.strong_count() > 0
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("topic", &self.topic)
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}
