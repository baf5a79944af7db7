//! Validation and error bookkeeping on a [`Store`].

use serde_json::Value;

use super::{Outbox, Store, StoreError};
use crate::{
    Result,
    bus::{Event, topics},
    node::{FlatNode, resolve, resolve_mut, walk},
    path::{Path, StoragePath},
    validation::{FieldError, Rule},
};

/// Options for [`Store::add_error_with`] and [`Store::clear_error_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorOptions {
    /// Emit `"errors"` when the global list changes
    pub publish: bool,
}

impl Default for ErrorOptions {
    fn default() -> Self {
        Self { publish: true }
    }
}

impl ErrorOptions {
    /// Options that leave `"errors"` quiet.
    pub fn silent() -> Self {
        Self { publish: false }
    }
}

/// An external validation pass, substituted for [`Store::validate_store`]
/// during [`Store::submit`].
///
/// The validator receives the parsed values and the store; it reports
/// problems per node through [`Store::add_error`] and blocks the submission
/// by returning an error. Closures with the matching signature implement it.
pub trait Validator {
    fn validate(&self, values: &Value, store: &Store) -> Result<()>;
}

impl<F> Validator for F
where
    F: Fn(&Value, &Store) -> Result<()>,
{
    fn validate(&self, values: &Value, store: &Store) -> Result<()> {
        self(values, store)
    }
}

impl Store {
    /// Runs the rules registered on the node at `path`.
    ///
    /// In [`ValidationMode::OnChange`](super::ValidationMode::OnChange) an
    /// existing error is cleared first. Rules run in order and the first
    /// failing rule becomes the node's error; a node that already carries an
    /// error is not re-checked.
    pub fn validate(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let storage = path.to_storage_path();

        let (rules, has_error) = {
            let state = self.state();
            let node = resolve(&state.root, &storage)
                .ok_or_else(|| StoreError::path_not_found(&path.to_display_path()))?;
            match node.meta.validations() {
                Some(rules) => (rules.to_vec(), node.meta.error.is_some()),
                None => return Ok(()),
            }
        };

        let has_error = if has_error && self.mode().is_on_change() {
            self.clear_error(path)?;
            false
        } else {
            has_error
        };
        if has_error {
            return Ok(());
        }

        let mut custom_inputs = None;
        let failing = rules
            .iter()
            .find(|rule| self.rule_fails(rule, &storage, &mut custom_inputs));

        if let Some(rule) = failing {
            tracing::debug!(path = %path, rule = rule.kind(), "Validation rule failed");
            self.add_error(path, FieldError::from(rule))?;
        }
        Ok(())
    }

    /// Evaluates one rule against the current node at `storage`.
    ///
    /// Custom predicates get the node's parsed value and the parsed store,
    /// computed on first use and run with no borrow held.
    fn rule_fails(
        &self,
        rule: &Rule,
        storage: &StoragePath,
        custom_inputs: &mut Option<Option<(Value, Value)>>,
    ) -> bool {
        let Rule::Custom {
            value: predicate, ..
        } = rule
        else {
            let state = self.state();
            return resolve(&state.root, storage).is_some_and(|node| rule.fails(node, &Value::Null));
        };

        let inputs = custom_inputs.get_or_insert_with(|| {
            let state = self.state();
            resolve(&state.root, storage).map(|node| (node.to_value(), state.root.to_value()))
        });
        inputs
            .as_ref()
            .is_some_and(|(value, values)| !predicate.check(value, values))
    }

    /// Validates every node, then fails with every node left in error.
    pub fn validate_store(&self) -> Result<()> {
        let paths = self.paths();
        tracing::debug!(nodes = paths.len(), "Validating store");
        for path in &paths {
            self.validate(path)?;
        }

        let entries = {
            let state = self.state();
            let mut entries = Vec::new();
            walk(&state.root, &Path::new(), &mut |path, node| {
                if node.meta.error.is_some() {
                    entries.push(FlatNode::new(path.clone(), node.clone()));
                }
            });
            entries
        };

        if entries.is_empty() {
            return Ok(());
        }
        tracing::debug!(errors = entries.len(), "Store validation failed");
        Err(StoreError::ValidationFailed { entries }.into())
    }

    pub fn add_error(&self, path: impl AsRef<Path>, error: FieldError) -> Result<()> {
        self.add_error_with(path, error, ErrorOptions::default())
    }

    /// Sets the node's error and records the node in the global error list.
    ///
    /// The list holds each node at most once; `"errors"` fires only when the
    /// list grows. The node's topic and `"meta"` always fire.
    pub fn add_error_with(
        &self,
        path: impl AsRef<Path>,
        error: FieldError,
        options: ErrorOptions,
    ) -> Result<()> {
        let path = path.as_ref();
        let display = path.to_display_path();
        let mut outbox = Outbox::default();

        let snapshot = {
            let mut guard = self.state_mut("add_error")?;
            let state = &mut *guard;
            let node = resolve_mut(&mut state.root, &path.to_storage_path())
                .ok_or_else(|| StoreError::path_not_found(&display))?;
            node.meta.error = Some(error);
            let snapshot = node.clone();

            if !state.errors.contains(&snapshot.id()) {
                state.errors.push(snapshot.id());
                if options.publish {
                    outbox.push(topics::ERRORS, Event::Errors(state.error_entries()));
                }
            }
            snapshot
        };

        self.flush(outbox);
        self.inner.bus.emit(&display, &Event::Node(snapshot));
        self.emit_changed(topics::META, path);
        Ok(())
    }

    pub fn clear_error(&self, path: impl AsRef<Path>) -> Result<()> {
        self.clear_error_with(path, ErrorOptions::default())
    }

    /// Clears the node's error and drops the node from the global error list.
    ///
    /// `"errors"` fires only when the list shrinks; the node's topic and
    /// `"meta"` always fire.
    pub fn clear_error_with(&self, path: impl AsRef<Path>, options: ErrorOptions) -> Result<()> {
        let path = path.as_ref();
        let display = path.to_display_path();
        let mut outbox = Outbox::default();

        let snapshot = {
            let mut guard = self.state_mut("clear_error")?;
            let state = &mut *guard;
            let node = resolve_mut(&mut state.root, &path.to_storage_path())
                .ok_or_else(|| StoreError::path_not_found(&display))?;
            node.meta.error = None;
            let snapshot = node.clone();

            if let Some(position) = state.errors.iter().position(|id| *id == snapshot.id()) {
                state.errors.remove(position);
                if options.publish {
                    outbox.push(topics::ERRORS, Event::Errors(state.error_entries()));
                }
            }
            snapshot
        };

        self.flush(outbox);
        self.inner.bus.emit(&display, &Event::Node(snapshot));
        self.emit_changed(topics::META, path);
        Ok(())
    }

    /// Clears the error of every node in the tree.
    pub fn clear_errors(&self) -> Result<()> {
        for path in self.paths() {
            self.clear_error(&path)?;
        }
        Ok(())
    }

    /// Runs a submission: snapshot the values, clear every error, validate.
    ///
    /// With a `validator` the external pass replaces [`Store::validate_store`].
    /// Returns the values snapshot when validation passes.
    pub fn submit(&self, validator: Option<&dyn Validator>) -> Result<Value> {
        let values = self.get_values();
        self.clear_errors()?;

        match validator {
            Some(validator) => validator.validate(&values, self)?,
            None => self.validate_store()?,
        }
        tracing::debug!("Submission accepted");
        Ok(values)
    }
}
