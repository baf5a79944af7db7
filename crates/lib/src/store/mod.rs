//! The reactive store.
//!
//! A [`Store`] owns one node tree, the set of dirty node ids, the list of
//! paths currently in error, the default values used by [`Store::reset`],
//! and an [`EventBus`]. Every operation runs to completion before it
//! returns; change notifications are delivered synchronously on the bus
//! once the tree has been updated.
//!
//! # Topics
//!
//! | topic | emitted by | payload |
//! |---|---|---|
//! | display path | `set_value`, `reset`, `publish` | [`Event::Value`] |
//! | display path | array ops, `set_meta`, errors | [`Event::Node`] |
//! | `"value"` | `set_value`, array ops | [`Event::Changed`] |
//! | `"meta"` | `set_meta`, errors | [`Event::Changed`] |
//! | `"dirty"` | dirty set changes, `reset` | [`Event::Dirty`] |
//! | `"errors"` | error list changes, `reset` | [`Event::Errors`] |
//! | `"reset"` | `reset` | [`Event::Reset`] |
//!
//! Listeners may call back into the store. The store never holds its state
//! borrowed while a listener, a custom rule or a validator runs.
//!
//! # Example
//!
//! ```rust
//! use pathstore::{path, Store};
//! use serde_json::json;
//!
//! let store = Store::new(json!({"friends": [{"name": "Homer"}, {"name": "Barney"}]}));
//!
//! store.array().append(path!["friends"], json!({"name": ""}))?;
//! assert!(store.is_dirty());
//!
//! store.array().remove(path!["friends"], 2)?;
//! assert!(!store.is_dirty());
//!
//! store.set_value(path!["friends", 0, "name"], "Lenny")?;
//! assert_eq!(store.get(path!["friends", 0, "name"]), Some(json!("Lenny")));
//! # Ok::<(), pathstore::Error>(())
//! ```

use std::{
    cell::{Ref, RefCell, RefMut},
    collections::{HashMap, HashSet},
    fmt,
    rc::Rc,
};

use serde_json::Value;

use crate::{
    Result,
    bus::{Event, EventBus, Subscription, topics},
    node::{
        FlatNode, MetaUpdate, Node, NodeId, NodeValue, WriteOptions, flatten, resolve,
        resolve_mut, walk, write,
    },
    path::Path,
    validation::RuleSet,
    value::values_equal,
};

mod array;
mod config;
mod errors;
mod validate;

pub use array::ArrayOps;
pub use config::{StoreConfig, ValidationMode};
pub use errors::StoreError;
pub use validate::{ErrorOptions, Validator};

/// A path-addressed reactive data store.
///
/// `Store` is a cheap handle: clones share the same tree and bus, so a
/// listener can capture a clone and call back into the store.
#[derive(Clone)]
pub struct Store {
    inner: Rc<StoreInner>,
}

struct StoreInner {
    state: RefCell<StoreState>,
    bus: EventBus,
    config: StoreConfig,
}

struct StoreState {
    root: Node,
    dirty_ids: Vec<NodeId>,
    /// Ids of the nodes in error, in insertion order
    errors: Vec<NodeId>,
    default_values: Value,
}

impl StoreState {
    fn new(defaults: Value) -> Self {
        Self {
            root: Node::from_value(&defaults),
            dirty_ids: Vec::new(),
            errors: Vec::new(),
            default_values: defaults,
        }
    }

    /// Adds or removes `id` from the dirty set. Returns true if the set changed.
    fn mark_dirty(&mut self, id: NodeId, dirty: bool) -> bool {
        let position = self.dirty_ids.iter().position(|existing| *existing == id);
        match (dirty, position) {
            (true, None) => {
                self.dirty_ids.push(id);
                true
            }
            (false, Some(position)) => {
                self.dirty_ids.remove(position);
                true
            }
            _ => false,
        }
    }

    fn flat(&self, path: &Path) -> Option<FlatNode> {
        resolve(&self.root, &path.to_storage_path())
            .map(|node| FlatNode::new(path.clone(), node.clone()))
    }

    /// The error list resolved to node snapshots at their current paths.
    fn error_entries(&self) -> Vec<FlatNode> {
        if self.errors.is_empty() {
            return Vec::new();
        }
        let mut found = HashMap::new();
        walk(&self.root, &Path::new(), &mut |path, node| {
            if self.errors.contains(&node.id()) {
                found.insert(node.id(), FlatNode::new(path.clone(), node.clone()));
            }
        });
        self.errors.iter().filter_map(|id| found.remove(id)).collect()
    }

    /// Drops dirty and error ids whose nodes are no longer in the tree.
    ///
    /// Returns whether the dirty set and the error list changed.
    fn prune_detached(&mut self) -> (bool, bool) {
        if self.dirty_ids.is_empty() && self.errors.is_empty() {
            return (false, false);
        }
        let mut live = HashSet::new();
        walk(&self.root, &Path::new(), &mut |_, node| {
            live.insert(node.id());
        });

        let dirty_before = self.dirty_ids.len();
        let errors_before = self.errors.len();
        self.dirty_ids.retain(|id| live.contains(id));
        self.errors.retain(|id| live.contains(id));
        (
            self.dirty_ids.len() != dirty_before,
            self.errors.len() != errors_before,
        )
    }

    /// Queues `"dirty"` and `"errors"` for whichever list changed.
    fn queue_lists(&self, outbox: &mut Outbox, dirty_changed: bool, errors_changed: bool) {
        if dirty_changed {
            outbox.push(topics::DIRTY, Event::Dirty(self.dirty_ids.clone()));
        }
        if errors_changed {
            outbox.push(topics::ERRORS, Event::Errors(self.error_entries()));
        }
    }
}

/// Events collected while the state is borrowed, emitted once it is released.
#[derive(Default)]
struct Outbox {
    events: Vec<(String, Event)>,
}

impl Outbox {
    fn push(&mut self, topic: impl Into<String>, event: Event) {
        self.events.push((topic.into(), event));
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("Store");
        debug.field("config", &self.inner.config);
        if let Ok(state) = self.inner.state.try_borrow() {
            debug
                .field("dirty_ids", &state.dirty_ids.len())
                .field("errors", &state.errors.len());
        }
        debug.field("bus", &self.inner.bus).finish()
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new(Value::Object(Default::default()))
    }
}

impl Store {
    /// Creates a store from initial plain data, with the default configuration.
    pub fn new(initial: impl Into<Value>) -> Self {
        Self::with_config(initial, StoreConfig::default())
    }

    pub fn with_config(initial: impl Into<Value>, config: StoreConfig) -> Self {
        let defaults = initial.into();
        tracing::debug!(mode = %config.mode, "Creating store");
        Self {
            inner: Rc::new(StoreInner {
                state: RefCell::new(StoreState::new(defaults)),
                bus: EventBus::with_max_depth(config.max_emit_depth),
                config,
            }),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    pub fn mode(&self) -> ValidationMode {
        self.inner.config.mode
    }

    /// The bus the store publishes on.
    pub fn bus(&self) -> &EventBus {
        &self.inner.bus
    }

    fn state(&self) -> Ref<'_, StoreState> {
        self.inner.state.borrow()
    }

    fn state_mut(&self, operation: &'static str) -> Result<RefMut<'_, StoreState>> {
        self.inner
            .state
            .try_borrow_mut()
            .map_err(|_| StoreError::ReentrantAccess { operation }.into())
    }

    fn flush(&self, outbox: Outbox) {
        for (topic, event) in outbox.events {
            self.inner.bus.emit(&topic, &event);
        }
    }

    // ----- reads -------------------------------------------------------------

    /// The parsed snapshot of the whole tree.
    pub fn get_values(&self) -> Value {
        self.state().root.to_value()
    }

    /// The parsed value at `path`, or `None` if no node lives there.
    pub fn get(&self, path: impl AsRef<Path>) -> Option<Value> {
        let state = self.state();
        resolve(&state.root, &path.as_ref().to_storage_path()).map(Node::to_value)
    }

    /// A snapshot of the node at `path`.
    pub fn node(&self, path: impl AsRef<Path>) -> Option<Node> {
        let state = self.state();
        resolve(&state.root, &path.as_ref().to_storage_path()).cloned()
    }

    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        let state = self.state();
        resolve(&state.root, &path.as_ref().to_storage_path()).is_some()
    }

    /// A snapshot of the root node.
    pub fn root(&self) -> Node {
        self.state().root.clone()
    }

    /// The pre-order flattening of the current tree.
    pub fn flatten(&self) -> Vec<FlatNode> {
        flatten(&self.state().root)
    }

    /// Calls `visit` for every node of a snapshot of the tree, in pre-order.
    pub fn for_each_node<F>(&self, mut visit: F)
    where
        F: FnMut(&FlatNode),
    {
        for entry in self.flatten() {
            visit(&entry);
        }
    }

    /// Every path in the tree, in pre-order.
    pub fn paths(&self) -> Vec<Path> {
        let state = self.state();
        let mut paths = Vec::new();
        walk(&state.root, &Path::new(), &mut |path, _| paths.push(path.clone()));
        paths
    }

    /// Returns true if any node differs from its default.
    pub fn is_dirty(&self) -> bool {
        !self.state().dirty_ids.is_empty()
    }

    pub fn dirty_ids(&self) -> Vec<NodeId> {
        self.state().dirty_ids.clone()
    }

    /// The nodes currently in the global error list, in insertion order.
    pub fn errors(&self) -> Vec<FlatNode> {
        self.state().error_entries()
    }

    /// The default values the next [`Store::reset`] rebuilds from.
    pub fn default_values(&self) -> Value {
        self.state().default_values.clone()
    }

    // ----- subscriptions -----------------------------------------------------

    /// Registers a listener on any topic.
    pub fn on<F>(&self, topic: impl Into<String>, listener: F) -> Subscription
    where
        F: Fn(&Event) + 'static,
    {
        self.inner.bus.on(topic, listener)
    }

    /// Registers a listener on the display-path topic of `path`.
    pub fn subscribe_path<F>(&self, path: impl AsRef<Path>, listener: F) -> Subscription
    where
        F: Fn(&Event) + 'static,
    {
        self.inner.bus.on(path.as_ref().to_display_path(), listener)
    }

    /// Re-emits the current value of `path` on its display-path topic.
    pub fn publish(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let display = path.to_display_path();
        let value = self
            .get(path)
            .ok_or_else(|| StoreError::path_not_found(&display))?;
        self.inner.bus.emit(&display, &Event::Value(value));
        Ok(())
    }

    // ----- mutation ----------------------------------------------------------

    /// Sets the value at `path`.
    ///
    /// A path with no node is created silently: the node is written and the
    /// change is published, but it is neither marked dirty nor validated.
    ///
    /// Otherwise nothing happens if the node holds the same primitive value.
    /// A primitive replaces the node's value in place; an object or array is
    /// rebuilt as a new subtree under the same node; descendants that drop out
    /// of the tree leave the dirty set and the error list. The node is then
    /// compared with its default, the dirty set is updated, and in
    /// [`ValidationMode::OnChange`] the node is validated before the change
    /// is published on its display-path topic and on `"value"`.
    pub fn set_value(&self, path: impl AsRef<Path>, value: impl Into<Value>) -> Result<()> {
        let path = path.as_ref();
        let value = value.into();
        let storage = path.to_storage_path();
        let display = path.to_display_path();
        let mut outbox = Outbox::default();

        let created = {
            let mut guard = self.state_mut("set_value")?;
            let state = &mut *guard;
            match resolve_mut(&mut state.root, &storage) {
                None => {
                    let written = write(
                        &mut state.root,
                        &storage,
                        Node::from_value(&value),
                        WriteOptions::default(),
                    );
                    if !written {
                        return Err(StoreError::path_conflict(&display).into());
                    }
                    true
                }
                Some(node) => {
                    if !node.differs_from(&value) {
                        return Ok(());
                    }
                    let had_children = !matches!(node.value, NodeValue::Primitive(_));
                    node.replace_value(&value);
                    let dirty = !values_equal(&value, &node.meta.default_value);
                    let was_dirty = node.meta.dirty;
                    node.meta.dirty = dirty;
                    let id = node.id();

                    let mut dirty_changed = dirty != was_dirty && state.mark_dirty(id, dirty);
                    let mut errors_changed = false;
                    if had_children {
                        let (dirty_pruned, errors_pruned) = state.prune_detached();
                        dirty_changed |= dirty_pruned;
                        errors_changed = errors_pruned;
                    }
                    state.queue_lists(&mut outbox, dirty_changed, errors_changed);
                    false
                }
            }
        };

        if created {
            tracing::debug!(path = %path, "Created node on first write");
        } else {
            tracing::debug!(path = %path, "Set value");
        }
        self.flush(outbox);

        if !created && self.mode().is_on_change() {
            self.validate(path)?;
        }

        self.inner.bus.emit(&display, &Event::Value(value));
        self.emit_changed(topics::VALUE, path);
        Ok(())
    }

    /// Shallow-merges `update` into the metadata of the node at `path`.
    pub fn set_meta(&self, path: impl AsRef<Path>, update: MetaUpdate) -> Result<()> {
        let path = path.as_ref();
        let display = path.to_display_path();
        let snapshot = {
            let mut state = self.state_mut("set_meta")?;
            let node = resolve_mut(&mut state.root, &path.to_storage_path())
                .ok_or_else(|| StoreError::path_not_found(&display))?;
            node.meta.apply(update);
            node.clone()
        };

        tracing::debug!(path = %path, "Updated meta");
        self.inner.bus.emit(&display, &Event::Node(snapshot));
        self.emit_changed(topics::META, path);
        Ok(())
    }

    /// Marks the node at `path` as touched.
    pub fn touch(&self, path: impl AsRef<Path>) -> Result<()> {
        self.set_meta(path, MetaUpdate::new().touched(true))
    }

    /// Registers every rule list of `rules` on its node.
    pub fn apply_rules(&self, rules: &RuleSet) -> Result<()> {
        for (path, node_rules) in rules.iter() {
            self.set_meta(&path, MetaUpdate::new().validations(node_rules.to_vec()))?;
        }
        Ok(())
    }

    /// Returns the parsed value at `path`, seeding it with `default` first if
    /// no node lives there.
    ///
    /// Seeding publishes nothing and leaves the new node clean.
    pub fn value_or_insert(&self, path: impl AsRef<Path>, default: impl Into<Value>) -> Result<Value> {
        let storage = path.as_ref().to_storage_path();
        let mut state = self.state_mut("value_or_insert")?;
        if let Some(node) = resolve(&state.root, &storage) {
            return Ok(node.to_value());
        }

        let default = default.into();
        let written = write(
            &mut state.root,
            &storage,
            Node::from_value(&default),
            WriteOptions::default(),
        );
        if !written {
            return Err(StoreError::path_conflict(&path.as_ref().to_display_path()).into());
        }
        tracing::debug!(path = %path.as_ref(), "Seeded node with default value");
        Ok(default)
    }

    /// Writes a node built from `value` at `path` unless one already exists,
    /// and returns the id of the node at `path`.
    ///
    /// With `validate_ancestors`, containers synthesized along the way
    /// capture their current value as their defaults.
    pub fn ensure_node(
        &self,
        path: impl AsRef<Path>,
        value: impl Into<Value>,
        validate_ancestors: bool,
    ) -> Result<NodeId> {
        let path = path.as_ref();
        let storage = path.to_storage_path();
        let mut state = self.state_mut("ensure_node")?;
        if let Some(node) = resolve(&state.root, &storage) {
            return Ok(node.id());
        }

        let node = Node::from_value(&value.into());
        let id = node.id();
        let options = WriteOptions { validate_ancestors };
        if !write(&mut state.root, &storage, node, options) {
            return Err(StoreError::path_conflict(&path.to_display_path()).into());
        }
        tracing::debug!(path = %path, id = %id, "Established node");
        Ok(id)
    }

    /// Applies `edit` to the children of the array at `path`, then recomputes
    /// the array's dirtiness from its child identities. Removed items leave
    /// the dirty set and the error list.
    pub(crate) fn mutate_array<F>(&self, path: &Path, operation: &'static str, edit: F) -> Result<()>
    where
        F: FnOnce(&mut Vec<Node>),
    {
        let display = path.to_display_path();
        let mut outbox = Outbox::default();

        let snapshot = {
            let mut guard = self.state_mut(operation)?;
            let state = &mut *guard;
            let node = resolve_mut(&mut state.root, &path.to_storage_path())
                .ok_or_else(|| StoreError::not_an_array(&display))?;
            let NodeValue::Array {
                items,
                default_field_ids,
            } = &mut node.value
            else {
                return Err(StoreError::not_an_array(&display).into());
            };

            edit(items);
            let dirty = !items.iter().map(Node::id).eq(default_field_ids.iter().copied());
            node.meta.dirty = dirty;
            let id = node.id();
            let snapshot = node.clone();

            let dirty_changed = state.mark_dirty(id, dirty);
            let (dirty_pruned, errors_pruned) = state.prune_detached();
            state.queue_lists(&mut outbox, dirty_changed || dirty_pruned, errors_pruned);
            snapshot
        };

        tracing::debug!(path = %path, operation, dirty = snapshot.meta.dirty, "Mutated array");
        self.flush(outbox);
        self.inner.bus.emit(&display, &Event::Node(snapshot));
        self.emit_changed(topics::VALUE, path);
        Ok(())
    }

    /// Array operations on this store.
    pub fn array(&self) -> ArrayOps<'_> {
        ArrayOps::new(self)
    }

    /// Rebuilds the tree from the current default values.
    pub fn reset(&self) -> Result<()> {
        self.rebuild(None)
    }

    /// Replaces the default values and rebuilds the tree from them.
    pub fn reset_to(&self, defaults: impl Into<Value>) -> Result<()> {
        self.rebuild(Some(defaults.into()))
    }

    /// Every node gets a new id. The dirty set and the error list are
    /// cleared. Each node's topic then fires once with its new value, in
    /// pre-order, followed by `"dirty"`, `"errors"` and `"reset"`.
    fn rebuild(&self, defaults: Option<Value>) -> Result<()> {
        let (entries, root) = {
            let mut state = self.state_mut("reset")?;
            if let Some(defaults) = defaults {
                state.default_values = defaults;
            }
            state.root = Node::from_value(&state.default_values);
            state.dirty_ids.clear();
            state.errors.clear();
            (flatten(&state.root), state.root.clone())
        };

        tracing::debug!(nodes = entries.len(), "Reset store");
        for entry in entries {
            self.inner
                .bus
                .emit(&entry.display_path, &Event::Value(entry.node.to_value()));
        }
        self.inner.bus.emit(topics::DIRTY, &Event::Dirty(Vec::new()));
        self.inner.bus.emit(topics::ERRORS, &Event::Errors(Vec::new()));
        self.inner.bus.emit(topics::RESET, &Event::Reset(root));
        Ok(())
    }

    /// Emits a path-qualified snapshot of `path` on a generic topic.
    fn emit_changed(&self, topic: &str, path: &Path) {
        if !self.inner.bus.has_listeners(topic) {
            return;
        }
        let entry = self.state().flat(path);
        if let Some(entry) = entry {
            self.inner.bus.emit(topic, &Event::Changed(entry));
        }
    }
}
