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

//! Override ledger persistence
//!
//! The ledger records every foreign binding the engine has disabled, with
//! the accelerators it held beforehand and the schema it belongs to. It is
//! stored as a single JSON object under [`RESTORE_KEYBINDS_KEY`]:
//!
//! ```json
//! {
//!   "toggle-overview": { "bind": "[\"<Super>s\"]", "schema_id": "org.gnome.shell.keybindings" }
//! }
//! ```
//!
//! An entry exists if and only if its binding is disabled by the engine and
//! not yet restored. Corrupt state reads as an empty ledger.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::rc::Rc;
use tracing::warn;

use crate::config::{store::SettingsStore, ConfigError, RESTORE_KEYBINDS_KEY};

/// Binding name → override entry
pub type Ledger = BTreeMap<String, OverrideEntry>;

/// Saved state of one disabled foreign binding
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct OverrideEntry {
    /// JSON-encoded accelerator list in effect before disabling
    pub bind: String,

    /// Schema of the registry the binding belongs to
    pub schema_id: String,
}

impl OverrideEntry {
    /// Creates an entry from the accelerators in effect before disabling
    pub fn new(accelerators: &[String], schema_id: impl Into<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            bind: serde_json::to_string(accelerators)?,
            schema_id: schema_id.into(),
        })
    }

    /// Decodes the saved accelerator list
    pub fn accelerators(&self) -> Result<Vec<String>, ConfigError> {
        Ok(serde_json::from_str(&self.bind)?)
    }
}

/// Read/write access to the persisted ledger
///
/// Every call goes to the store; there is no caching and no transaction
/// spanning several calls. Callers sequence load/modify/save themselves.
pub struct OverrideLedger {
    store: Rc<dyn SettingsStore>,
}

impl OverrideLedger {
    pub fn new(store: Rc<dyn SettingsStore>) -> Self {
        Self { store }
    }

    /// Loads the ledger
    ///
    /// Never fails: a missing slot, an unreadable store or unparsable JSON
    /// all yield an empty ledger.
    pub fn load(&self) -> Ledger {
        let raw = match self.store.get_string(RESTORE_KEYBINDS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Ledger::new(),
            Err(e) => {
                warn!(error = %e, "Failed to read override ledger, treating as empty");
                return Ledger::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(ledger) => ledger,
            Err(e) => {
                warn!(error = %e, "Override ledger is corrupt, treating as empty");
                Ledger::new()
            }
        }
    }

    /// Persists the whole ledger in one write
    pub fn save(&self, ledger: &Ledger) -> Result<(), ConfigError> {
        let raw = serde_json::to_string(ledger)?;
        self.store.set_string(RESTORE_KEYBINDS_KEY, &raw)
    }

    /// True if `name` has an entry
    pub fn has(&self, name: &str) -> bool {
        self.load().contains_key(name)
    }

    /// Entry for `name`, if any
    pub fn get(&self, name: &str) -> Option<OverrideEntry> {
        self.load().remove(name)
    }

    /// Inserts or replaces the entry for `name`
    pub fn set(&self, name: &str, entry: OverrideEntry) -> Result<(), ConfigError> {
        let mut ledger = self.load();
        ledger.insert(name.to_string(), entry);
        self.save(&ledger)
    }

    /// Removes the entry for `name`, returning whether one existed
    ///
    /// Saves even when nothing was removed, so a corrupt slot is replaced
    /// by a valid empty ledger.
    pub fn remove(&self, name: &str) -> Result<bool, ConfigError> {
        let mut ledger = self.load();
        let removed = ledger.remove(name).is_some();
        self.save(&ledger)?;
        Ok(removed)
    }
}
