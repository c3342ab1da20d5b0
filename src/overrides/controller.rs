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

//! Override Controller - keeps foreign registries clear of the user's shortcuts
//!
//! # Responsibilities
//!
//! - Detect conflicts between the user registry and the conflict registries
//! - Disable conflicting foreign bindings and record their originals
//! - Restore recorded bindings on demand
//! - Re-check conflicts when the user changes a binding
//!
//! # Architecture
//!
//! The controller owns its registry handles and the ledger. It is shared
//! through `Rc` so the user registry's change callback can reach it, and
//! all state uses interior mutability. A single `overriding` flag keeps
//! at most one override pass active: writes made during a pass may fire
//! change callbacks that call back into the controller, and those calls
//! return without doing anything.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use tracing::{debug, info, warn};

use crate::config::{ConfigError, Ledger, OverrideEntry, OverrideLedger, SettingsStore};
use crate::core::{find_conflicts, Conflict, Registry, SubscriptionId};

/// Clears the `overriding` flag when dropped, including on early return.
struct OverridingGuard<'a>(&'a Cell<bool>);

impl<'a> OverridingGuard<'a> {
    /// Sets the flag; returns `None` if it was already set.
    fn acquire(flag: &'a Cell<bool>) -> Option<Self> {
        if flag.replace(true) {
            None
        } else {
            Some(Self(flag))
        }
    }
}

impl Drop for OverridingGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// Orchestrates conflict detection, the override ledger and registry writes
///
/// # Example
///
/// ```
/// use keybind_overrider::config::MemoryStore;
/// use keybind_overrider::core::{MemoryRegistry, Registry};
/// use keybind_overrider::overrides::OverrideController;
/// use std::rc::Rc;
///
/// let user = Rc::new(MemoryRegistry::new("org.example.user").with_binding("toggle", &["<Super>t"]));
/// let shell = Rc::new(MemoryRegistry::new("org.example.shell").with_binding("open-terminal", &["<Super>t"]));
///
/// let controller = OverrideController::new(
///     user,
///     vec![shell.clone() as Rc<dyn Registry>],
///     Rc::new(MemoryStore::new()),
/// );
///
/// controller.override_conflicts(None)?;
/// assert_eq!(shell.accelerators("open-terminal"), Some(Vec::new()));
///
/// controller.restore_conflicts()?;
/// assert_eq!(shell.accelerators("open-terminal"), Some(vec!["<Super>t".to_string()]));
/// # Ok::<(), keybind_overrider::config::ConfigError>(())
/// ```
pub struct OverrideController {
    /// Source of truth for the user's own bindings
    user: Rc<dyn Registry>,
    /// Registries that may hold conflicting bindings, in priority order
    conflict_registries: RefCell<Vec<Rc<dyn Registry>>>,
    /// Persisted record of disabled foreign bindings
    ledger: OverrideLedger,
    /// True while an override pass is running
    overriding: Cell<bool>,
    /// Live subscription on the user registry, if enabled
    subscription: Cell<Option<SubscriptionId>>,
}

impl OverrideController {
    /// Creates a controller; call [`enable`](Self::enable) to start
    /// listening for user binding changes.
    pub fn new(
        user: Rc<dyn Registry>,
        conflict_registries: Vec<Rc<dyn Registry>>,
        store: Rc<dyn SettingsStore>,
    ) -> Rc<Self> {
        Rc::new(Self {
            user,
            conflict_registries: RefCell::new(conflict_registries),
            ledger: OverrideLedger::new(store),
            overriding: Cell::new(false),
            subscription: Cell::new(None),
        })
    }

    /// Subscribes to the user registry's change notifications
    ///
    /// Calling it twice has no further effect. The callback holds a weak
    /// reference, so it never keeps the controller alive.
    pub fn enable(self: &Rc<Self>) {
        if self.subscription.get().is_some() {
            return;
        }

        let weak: Weak<Self> = Rc::downgrade(self);
        let id = self.user.connect_changed(Rc::new(move |name: &str| {
            let Some(controller) = weak.upgrade() else {
                return;
            };
            if let Err(e) = controller.conflict_key_changed(name) {
                warn!(binding = name, error = %e, "Failed to re-check conflicts");
            }
        }));

        self.subscription.set(Some(id));
        debug!(schema_id = self.user.schema_id(), "Listening for user binding changes");
    }

    /// Removes the user registry subscription, if any
    pub fn disable(&self) {
        if let Some(id) = self.subscription.take() {
            self.user.disconnect(id);
            debug!(schema_id = self.user.schema_id(), "Stopped listening for user binding changes");
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.subscription.get().is_some()
    }

    /// True while an override pass is running
    pub fn is_overriding(&self) -> bool {
        self.overriding.get()
    }

    /// Appends a conflict registry
    pub fn add_conflict_registry(&self, registry: Rc<dyn Registry>) {
        self.conflict_registries.borrow_mut().push(registry);
    }

    /// Removes every conflict registry with `schema_id`, returning whether any was removed
    pub fn remove_conflict_registry(&self, schema_id: &str) -> bool {
        let mut registries = self.conflict_registries.borrow_mut();
        let before = registries.len();
        registries.retain(|r| r.schema_id() != schema_id);
        registries.len() != before
    }

    /// Schema ids of the conflict registries, in priority order
    pub fn conflict_schema_ids(&self) -> Vec<String> {
        self.conflict_registries
            .borrow()
            .iter()
            .map(|r| r.schema_id().to_string())
            .collect()
    }

    /// Current override ledger
    pub fn saved_overrides(&self) -> Ledger {
        self.ledger.load()
    }

    /// Runs `f` over the current conflicts without mutating anything
    pub fn with_conflicts<T>(&self, f: impl FnOnce(&[Conflict<'_>]) -> T) -> T {
        let registries = self.registries();
        let conflicts = find_conflicts(self.user.as_ref(), &registries);
        f(&conflicts)
    }

    /// Disables every foreign binding that conflicts with a user binding
    ///
    /// Previously recorded overrides are restored first, so each pass starts
    /// from the registries' original values. Returns whether `check_key`
    /// ended up in the ledger. Returns `Ok(false)` without touching anything
    /// if a pass is already running.
    ///
    /// # Errors
    ///
    /// Returns an error if the ledger cannot be saved. A write rejected by a
    /// single foreign registry is logged and skipped.
    pub fn override_conflicts(&self, check_key: Option<&str>) -> Result<bool, ConfigError> {
        let Some(_guard) = OverridingGuard::acquire(&self.overriding) else {
            debug!("Override pass already running, skipping nested call");
            return Ok(false);
        };

        self.restore_conflicts()?;

        let registries = self.registries();
        let conflicts = find_conflicts(self.user.as_ref(), &registries);

        let mut ledger = self.ledger.load();
        let mut disable_all: Vec<(&dyn Registry, &str)> = Vec::new();

        for conflict in &conflicts {
            debug!(%conflict, "Found conflict");

            for name in &conflict.conflicting_bindings {
                let current = conflict.registry.accelerators(name).unwrap_or_default();
                let entry = OverrideEntry::new(&current, conflict.schema_id())?;

                if let Some(previous) = ledger.insert(name.clone(), entry) {
                    if previous.schema_id != conflict.schema_id() {
                        warn!(
                            binding = %name,
                            replaced = %previous.schema_id,
                            schema_id = conflict.schema_id(),
                            "Override entry replaced by a binding of the same name, the replaced one will not be restored"
                        );
                    }
                }
                disable_all.push((conflict.registry, name.as_str()));
            }
        }

        self.ledger.save(&ledger)?;

        let mut rejected = Vec::new();
        for (registry, name) in disable_all {
            if let Err(e) = registry.set_accelerators(name, &[]) {
                warn!(binding = name, schema_id = registry.schema_id(), error = %e, "Failed to disable conflicting binding");
                rejected.push((registry.schema_id(), name));
            }
        }

        // Entries only exist for bindings that were actually disabled
        if !rejected.is_empty() {
            for (schema_id, name) in rejected {
                if ledger.get(name).is_some_and(|entry| entry.schema_id == schema_id) {
                    ledger.remove(name);
                }
            }
            self.ledger.save(&ledger)?;
        }

        info!(conflicts = conflicts.len(), overrides = ledger.len(), "Override pass complete");

        Ok(check_key.is_some_and(|key| ledger.contains_key(key)))
    }

    /// Restores every recorded binding whose registry is known
    ///
    /// Entries for unknown schemas stay in the ledger for a later pass.
    pub fn restore_conflicts(&self) -> Result<(), ConfigError> {
        let mut ledger = self.ledger.load();
        let registries = self.registries();

        let mut restored = Vec::new();
        for (name, entry) in &ledger {
            let Some(registry) = find_registry(&registries, &entry.schema_id) else {
                debug!(binding = %name, schema_id = %entry.schema_id, "Registry unavailable, keeping override");
                continue;
            };

            match entry.accelerators() {
                Ok(accelerators) => {
                    if let Err(e) = registry.set_accelerators(name, &accelerators) {
                        warn!(binding = %name, error = %e, "Failed to restore binding");
                        continue;
                    }
                }
                Err(e) => {
                    warn!(binding = %name, error = %e, "Dropping override with unreadable saved value");
                }
            }
            restored.push(name.clone());
        }

        for name in &restored {
            ledger.remove(name);
        }
        self.ledger.save(&ledger)?;

        if !restored.is_empty() {
            info!(restored = restored.len(), "Restored overridden bindings");
        }
        Ok(())
    }

    /// Refreshes recorded originals from the registries' current values
    ///
    /// A binding that is currently empty is still disabled by us, so its
    /// recorded value is kept.
    pub fn update_overrides(&self) -> Result<(), ConfigError> {
        let mut ledger = self.ledger.load();
        let registries = self.registries();

        for (name, entry) in ledger.iter_mut() {
            let Some(registry) = find_registry(&registries, &entry.schema_id) else {
                continue;
            };
            let Some(current) = registry.accelerators(name) else {
                continue;
            };
            if current.is_empty() {
                continue;
            }

            *entry = OverrideEntry::new(&current, registry.schema_id())?;
            debug!(binding = %name, "Updated saved binding");
        }

        self.ledger.save(&ledger)
    }

    /// Brings the ledger in line with conflict registries edited elsewhere
    ///
    /// Call after a conflict registry picked up outside changes (e.g. a
    /// reloaded snapshot). Saved originals are refreshed from the current
    /// values, then a full override pass runs so newly colliding bindings
    /// are disabled too. Does nothing while a pass is running.
    pub fn conflict_registry_changed(&self) -> Result<(), ConfigError> {
        if self.overriding.get() {
            return Ok(());
        }

        self.update_overrides()?;
        self.override_conflicts(None)?;
        Ok(())
    }

    /// Handles a change to the user's binding `name`
    ///
    /// Clearing a user binding needs no re-check. Otherwise the ledger entry
    /// keyed by `name` is dropped without restoring it, then a full override
    /// pass runs. Returns whether `name` is in the ledger afterwards.
    pub fn conflict_key_changed(&self, name: &str) -> Result<bool, ConfigError> {
        if self.overriding.get() {
            return Ok(false);
        }

        if self.user.accelerators(name).is_some_and(|a| a.is_empty()) {
            debug!(binding = name, "User binding cleared, nothing to check");
            return Ok(false);
        }

        self.ledger.remove(name)?;

        self.override_conflicts(Some(name))
    }

    /// Snapshot of the registry list, so no borrow is held across registry writes
    fn registries(&self) -> Vec<Rc<dyn Registry>> {
        self.conflict_registries.borrow().clone()
    }
}

impl Drop for OverrideController {
    fn drop(&mut self) {
        self.disable();
    }
}

fn find_registry<'a>(registries: &'a [Rc<dyn Registry>], schema_id: &str) -> Option<&'a dyn Registry> {
    registries
        .iter()
        .find(|r| r.schema_id() == schema_id)
        .map(|r| r.as_ref())
}
