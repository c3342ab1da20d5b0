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

//! String-valued settings slots
//!
//! The override ledger is persisted as one string under one well-known key.
//! [`SettingsStore`] is the capability the ledger needs; hosts back it with
//! whatever settings system they use.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::config::{write_atomically, ConfigError};

/// Get/set access to string-valued settings slots
pub trait SettingsStore {
    /// Current value of `key`, or `None` if never written
    fn get_string(&self, key: &str) -> Result<Option<String>, ConfigError>;

    /// Replaces the value of `key` in a single write
    fn set_string(&self, key: &str, value: &str) -> Result<(), ConfigError>;
}

/// In-memory store for hosts without persistence, and for tests
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: RefCell<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemoryStore {
    fn get_string(&self, key: &str) -> Result<Option<String>, ConfigError> {
        Ok(self.slots.borrow().get(key).cloned())
    }

    fn set_string(&self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.slots
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Store backed by a JSON object file (`{ "key": "value", ... }`)
///
/// Every write rewrites the whole file atomically. A missing file reads as
/// an empty store.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_slots(&self) -> Result<BTreeMap<String, String>, ConfigError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&content).map_err(|e| ConfigError::InvalidStore {
            path: self.path.clone(),
            message: e.to_string(),
        })
    }
}

impl SettingsStore for FileStore {
    fn get_string(&self, key: &str) -> Result<Option<String>, ConfigError> {
        Ok(self.read_slots()?.get(key).cloned())
    }

    fn set_string(&self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut slots = match self.read_slots() {
            Ok(slots) => slots,
            Err(ConfigError::InvalidStore { path, message }) => {
                warn!(path = %path.display(), %message, "Replacing unreadable settings store");
                BTreeMap::new()
            }
            Err(e) => return Err(e),
        };

        slots.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(&slots)?;
        write_atomically(&self.path, &content)
    }
}
