// Copyright 2025 Eric Jingryd (tidynest@proton.me)
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! src/core/registry.rs
//!
//! Registry capability
//!
//! A registry is an externally-owned collection of named bindings identified
//! by a schema id (e.g. `org.gnome.shell.keybindings`). The engine only ever
//! talks to registries through the [`Registry`] trait, so the real settings
//! backend stays behind an adapter.
//!
//! Registries may hold keys that are not accelerator lists (booleans,
//! strings). Adapters filter those out: `accelerators()` returns `None` for
//! them, exactly as for unknown names.
//!
//! # Threading
//! Registries are single-threaded and use interior mutability. Change
//! callbacks run synchronously inside `set_accelerators`, after all internal
//! borrows are released, so a callback may read or write the registry again.

use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;
use thiserror::Error;

use crate::core::types::Binding;

/// Callback invoked with the name of a binding whose value changed
pub type ChangeCallback = Rc<dyn Fn(&str)>;

/// Handle returned by [`Registry::connect_changed`]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct SubscriptionId(pub u64);

/// Errors raised when writing to a registry
#[derive(Debug, Error, PartialEq)]
pub enum RegistryError {
    /// Name is not part of this registry
    #[error("Unknown binding '{name}' in schema '{schema_id}'")]
    UnknownBinding { schema_id: String, name: String },

    /// Name exists but does not hold an accelerator list
    #[error("Key '{name}' in schema '{schema_id}' is not an accelerator list")]
    NotAcceleratorList { schema_id: String, name: String },

    /// Backend failed to persist the change
    #[error("Failed to persist schema '{schema_id}': {message}")]
    Backend { schema_id: String, message: String },
}

/// Capability over one externally-owned keybinding registry
pub trait Registry {
    /// Stable schema identifier
    fn schema_id(&self) -> &str;

    /// All key names, including keys that are not accelerator lists
    fn list_binding_names(&self) -> Vec<String>;

    /// Current accelerator strings for `name`
    ///
    /// Returns `None` if the name is unknown or its value is not a list of
    /// strings.
    fn accelerators(&self, name: &str) -> Option<Vec<String>>;

    /// Replaces the accelerator strings for `name` and notifies subscribers
    fn set_accelerators(&self, name: &str, accelerators: &[String]) -> Result<(), RegistryError>;

    /// Subscribes to change notifications
    fn connect_changed(&self, callback: ChangeCallback) -> SubscriptionId;

    /// Removes a subscription; unknown ids are ignored
    fn disconnect(&self, id: SubscriptionId);

    /// All accelerator-list bindings, in enumeration order
    fn bindings(&self) -> Vec<Binding> {
        self.list_binding_names()
            .into_iter()
            .filter_map(|name| {
                let accelerators = self.accelerators(&name)?;
                Some(Binding::new(name, accelerators))
            })
            .collect()
    }
}

/// Returns the value as an accelerator list if it is an array of strings
pub fn as_accelerator_list(value: &Value) -> Option<Vec<String>> {
    value
        .as_array()?
        .iter()
        .map(|item| item.as_str().map(str::to_string))
        .collect()
}

/// In-memory registry
///
/// Keys are enumerated in name order. Values are JSON values so that
/// non-accelerator keys can live alongside bindings, as they do in real
/// settings schemas.
///
/// # Example
/// ```
/// use keybind_overrider::core::{MemoryRegistry, Registry};
///
/// let registry = MemoryRegistry::new("org.example.keybindings")
///     .with_binding("open-terminal", &["<Super>t"])
///     .with_value("enabled", serde_json::json!(true));
///
/// assert_eq!(registry.accelerators("open-terminal"), Some(vec!["<Super>t".to_string()]));
/// assert_eq!(registry.accelerators("enabled"), None);
/// ```
pub struct MemoryRegistry {
    schema_id: String,
    values: RefCell<BTreeMap<String, Value>>,
    subscribers: RefCell<Vec<(SubscriptionId, ChangeCallback)>>,
    next_subscription: Cell<u64>,
}

impl MemoryRegistry {
    pub fn new(schema_id: impl Into<String>) -> Self {
        Self {
            schema_id: schema_id.into(),
            values: RefCell::new(BTreeMap::new()),
            subscribers: RefCell::new(Vec::new()),
            next_subscription: Cell::new(1),
        }
    }

    /// Builds a registry from a name → value table
    pub fn from_values(schema_id: impl Into<String>, values: BTreeMap<String, Value>) -> Self {
        let registry = Self::new(schema_id);
        *registry.values.borrow_mut() = values;
        registry
    }

    /// Builder: adds an accelerator-list binding
    pub fn with_binding(self, name: &str, accelerators: &[&str]) -> Self {
        self.insert_value(name, Value::from(accelerators.to_vec()));
        self
    }

    /// Builder: adds an arbitrary value
    pub fn with_value(self, name: &str, value: Value) -> Self {
        self.insert_value(name, value);
        self
    }

    /// Inserts or replaces a raw value without notifying subscribers
    pub fn insert_value(&self, name: &str, value: Value) {
        self.values.borrow_mut().insert(name.to_string(), value);
    }

    /// Removes a key without notifying subscribers
    pub fn remove_value(&self, name: &str) -> Option<Value> {
        self.values.borrow_mut().remove(name)
    }

    /// Raw value for `name`
    pub fn value(&self, name: &str) -> Option<Value> {
        self.values.borrow().get(name).cloned()
    }

    /// Snapshot of every key and value
    pub fn values(&self) -> BTreeMap<String, Value> {
        self.values.borrow().clone()
    }

    /// Replaces the accelerator list without notifying subscribers
    ///
    /// Used by adapters that must persist before announcing a change.
    pub fn store_accelerators(&self, name: &str, accelerators: &[String]) -> Result<(), RegistryError> {
        let mut values = self.values.borrow_mut();
        let slot = values.get_mut(name).ok_or_else(|| RegistryError::UnknownBinding {
            schema_id: self.schema_id.clone(),
            name: name.to_string(),
        })?;

        if as_accelerator_list(slot).is_none() {
            return Err(RegistryError::NotAcceleratorList {
                schema_id: self.schema_id.clone(),
                name: name.to_string(),
            });
        }

        *slot = Value::from(accelerators.to_vec());
        Ok(())
    }

    /// Invokes every subscriber with `name`
    ///
    /// The subscriber list is cloned first so callbacks may subscribe,
    /// unsubscribe or write to this registry.
    pub fn emit_changed(&self, name: &str) {
        let callbacks: Vec<ChangeCallback> = self
            .subscribers
            .borrow()
            .iter()
            .map(|(_, callback)| Rc::clone(callback))
            .collect();

        for callback in callbacks {
            callback(name);
        }
    }

    /// Number of live subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }
}

impl Registry for MemoryRegistry {
    fn schema_id(&self) -> &str {
        &self.schema_id
    }

    fn list_binding_names(&self) -> Vec<String> {
        self.values.borrow().keys().cloned().collect()
    }

    fn accelerators(&self, name: &str) -> Option<Vec<String>> {
        self.values.borrow().get(name).and_then(as_accelerator_list)
    }

    fn set_accelerators(&self, name: &str, accelerators: &[String]) -> Result<(), RegistryError> {
        self.store_accelerators(name, accelerators)?;
        self.emit_changed(name);
        Ok(())
    }

    fn connect_changed(&self, callback: ChangeCallback) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription.get());
        self.next_subscription.set(id.0 + 1);
        self.subscribers.borrow_mut().push((id, callback));
        id
    }

    fn disconnect(&self, id: SubscriptionId) {
        self.subscribers.borrow_mut().retain(|(sub, _)| *sub != id);
    }
}
