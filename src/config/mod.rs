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

//! Persistence for override state and registry snapshots.
//!
//! This module provides the storage side of the engine:
//!
//! - **Settings store**: the string slot holding the override ledger
//! - **Override ledger**: which foreign bindings were disabled, and their
//!   original accelerators
//! - **File registry**: a JSON-snapshot-backed [`Registry`](crate::core::Registry)
//! - **Atomic writes**: temp-file-then-rename so files are never half-written
//! - **Automatic backups**: snapshots are copied before their first change
//!
//! # Example
//!
//! ```no_run
//! use keybind_overrider::config::{FileStore, OverrideLedger};
//! use std::rc::Rc;
//!
//! let store = Rc::new(FileStore::new("/tmp/keybind-overrider/settings.json".into()));
//! let ledger = OverrideLedger::new(store);
//!
//! for (name, entry) in ledger.load() {
//!     println!("{} disabled in {}", name, entry.schema_id);
//! }
//! ```

use atomic_write_file::AtomicWriteFile;
use chrono::Local;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub mod error;
pub mod file_registry;
pub mod ledger;
pub mod store;
pub mod watcher;

pub use error::ConfigError;
pub use file_registry::FileRegistry;
pub use ledger::{Ledger, OverrideEntry, OverrideLedger};
pub use store::{FileStore, MemoryStore, SettingsStore};
pub use watcher::FileWatcher;

/// Store key holding the serialized override ledger.
pub const RESTORE_KEYBINDS_KEY: &str = "restore-keybinds";

/// Schema of the user's own keybindings.
pub const USER_KEYBINDINGS_SCHEMA: &str = "org.gnome.shell.extensions.paperwm.keybindings";

/// Schemas that may contain conflicting keybindings, in priority order.
///
/// Hosts may add or remove schemas at setup time.
pub const DEFAULT_CONFLICT_SCHEMAS: [&str; 4] = [
    "org.gnome.mutter.keybindings",
    "org.gnome.mutter.wayland.keybindings",
    "org.gnome.desktop.wm.keybindings",
    "org.gnome.shell.keybindings",
];

/// Writes `content` to `path` atomically.
///
/// The file is either fully replaced or left untouched.
pub fn write_atomically(path: &Path, content: &str) -> Result<(), ConfigError> {
    let mut file = AtomicWriteFile::options()
        .open(path)
        .map_err(|e| ConfigError::WriteFailed(format!("Failed to open for atomic write: {}", e)))?;

    file.write_all(content.as_bytes())
        .map_err(|e| ConfigError::WriteFailed(format!("Failed to write content: {}", e)))?;

    file.commit()
        .map_err(|e| ConfigError::WriteFailed(format!("Failed to commit atomic write: {}", e)))?;

    Ok(())
}

/// Copies `path` into `backup_dir` as `<file name>.<YYYY-MM-DD_HHMMSS>`.
///
/// Creates `backup_dir` if needed and returns the backup's path.
pub fn create_timestamped_backup(path: &Path, backup_dir: &Path) -> Result<PathBuf, ConfigError> {
    if !backup_dir.exists() {
        fs::create_dir_all(backup_dir)
            .map_err(|_| ConfigError::BackupDirNotWritable(backup_dir.to_path_buf()))?;
    }

    let content = fs::read_to_string(path)?;

    let timestamp = Local::now().format("%Y-%m-%d_%H%M%S");

    let original_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| ConfigError::BackupFailed(format!("Invalid file name: {}", path.display())))?;

    let backup_path = backup_dir.join(format!("{}.{}", original_name, timestamp));
    fs::write(&backup_path, content)
        .map_err(|e| ConfigError::BackupFailed(format!("{}: {}", backup_path.display(), e)))?;

    Ok(backup_path)
}

#[cfg(test)]
mod tests;
