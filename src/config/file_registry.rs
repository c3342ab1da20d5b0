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

//! Registry backed by a JSON snapshot file
//!
//! Snapshot format:
//!
//! ```json
//! {
//!   "schema_id": "org.gnome.shell.keybindings",
//!   "keys": {
//!     "toggle-overview": ["<Super>s"],
//!     "switch-to-application-1": ["<Super>1"],
//!     "some-flag": true
//!   }
//! }
//! ```
//!
//! Values that are not arrays of strings are kept and written back
//! untouched, but the registry reports them as "not applicable".
//!
//! # Safety
//! - **Atomic writes**: every change rewrites the file via temp-file-then-rename
//! - **Automatic backup**: the first write in a process saves a timestamped
//!   copy to `backups/` next to the snapshot
//! - **Rollback on failure**: a failed write leaves the in-memory value unchanged

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cell::Cell;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::{create_timestamped_backup, write_atomically, ConfigError};
use crate::core::{ChangeCallback, MemoryRegistry, Registry, RegistryError, SubscriptionId};

/// On-disk shape of a registry snapshot
#[derive(Debug, Deserialize, Serialize)]
struct RegistrySnapshot {
    schema_id: String,
    #[serde(default)]
    keys: BTreeMap<String, Value>,
}

/// Registry persisted to a JSON snapshot file
pub struct FileRegistry {
    path: PathBuf,
    backup_dir: PathBuf,
    inner: MemoryRegistry,
    backed_up: Cell<bool>,
}

impl FileRegistry {
    /// Opens a snapshot file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` if the file doesn't exist and
    /// `ConfigError::InvalidRegistry` if it isn't a valid snapshot.
    pub fn open(path: PathBuf) -> Result<Self, ConfigError> {
        let snapshot = read_snapshot(&path)?;

        let backup_dir = path
            .parent()
            .map(|parent| parent.join("backups"))
            .ok_or_else(|| ConfigError::BackupDirNotWritable(path.clone()))?;

        debug!(
            schema_id = %snapshot.schema_id,
            keys = snapshot.keys.len(),
            path = %path.display(),
            "Opened registry snapshot"
        );

        Ok(Self {
            inner: MemoryRegistry::from_values(snapshot.schema_id, snapshot.keys),
            path,
            backup_dir,
            backed_up: Cell::new(false),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    /// Re-reads the snapshot and notifies subscribers of every changed key
    ///
    /// Returns the changed key names in order. The schema id may not change.
    pub fn reload(&self) -> Result<Vec<String>, ConfigError> {
        let snapshot = read_snapshot(&self.path)?;
        if snapshot.schema_id != self.inner.schema_id() {
            return Err(ConfigError::InvalidRegistry {
                path: self.path.clone(),
                message: format!(
                    "schema id changed from '{}' to '{}'",
                    self.inner.schema_id(),
                    snapshot.schema_id
                ),
            });
        }

        let current = self.inner.values();
        let names: BTreeSet<&String> = current.keys().chain(snapshot.keys.keys()).collect();

        let mut changed = Vec::new();
        for name in names {
            let new_value = snapshot.keys.get(name);
            if current.get(name) == new_value {
                continue;
            }
            match new_value {
                Some(value) => self.inner.insert_value(name, value.clone()),
                None => {
                    self.inner.remove_value(name);
                }
            }
            changed.push(name.clone());
        }

        for name in &changed {
            self.inner.emit_changed(name);
        }

        if !changed.is_empty() {
            info!(schema_id = %self.inner.schema_id(), changed = changed.len(), "Reloaded registry snapshot");
        }
        Ok(changed)
    }

    /// Copies the snapshot to `backups/<file>.<timestamp>`
    pub fn create_timestamped_backup(&self) -> Result<PathBuf, ConfigError> {
        create_timestamped_backup(&self.path, &self.backup_dir)
    }

    fn persist(&self) -> Result<(), ConfigError> {
        if !self.backed_up.get() {
            let backup = self.create_timestamped_backup()?;
            debug!(backup = %backup.display(), "Backed up registry snapshot");
            self.backed_up.set(true);
        }

        let snapshot = RegistrySnapshot {
            schema_id: self.inner.schema_id().to_string(),
            keys: self.inner.values(),
        };
        let content = serde_json::to_string_pretty(&snapshot)?;
        write_atomically(&self.path, &content)
    }
}

impl Registry for FileRegistry {
    fn schema_id(&self) -> &str {
        self.inner.schema_id()
    }

    fn list_binding_names(&self) -> Vec<String> {
        self.inner.list_binding_names()
    }

    fn accelerators(&self, name: &str) -> Option<Vec<String>> {
        self.inner.accelerators(name)
    }

    fn set_accelerators(&self, name: &str, accelerators: &[String]) -> Result<(), RegistryError> {
        let previous = self.inner.value(name);
        self.inner.store_accelerators(name, accelerators)?;

        if let Err(e) = self.persist() {
            if let Some(previous) = previous {
                self.inner.insert_value(name, previous);
            }
            return Err(RegistryError::Backend {
                schema_id: self.schema_id().to_string(),
                message: e.to_string(),
            });
        }

        self.inner.emit_changed(name);
        Ok(())
    }

    fn connect_changed(&self, callback: ChangeCallback) -> SubscriptionId {
        self.inner.connect_changed(callback)
    }

    fn disconnect(&self, id: SubscriptionId) {
        self.inner.disconnect(id)
    }
}

fn read_snapshot(path: &Path) -> Result<RegistrySnapshot, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }

    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| ConfigError::InvalidRegistry {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}
