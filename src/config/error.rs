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

use std::path::PathBuf;
use thiserror::Error;

use crate::core::RegistryError;

/// Errors that can occur while persisting override state or registry snapshots.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Registry snapshot or store file does not exist.
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    /// Backup directory cannot be created or written to.
    #[error("Backup directory not writable: {0}")]
    BackupDirNotWritable(PathBuf),
    /// Failed to create backup file.
    #[error("Failed to create backup: {0}")]
    BackupFailed(String),
    /// Atomic write operation failed.
    #[error("Atomic write failed: {0}")]
    WriteFailed(String),
    /// Registry snapshot is not shaped like `{ "schema_id": ..., "keys": {...} }`.
    #[error("Invalid registry snapshot {path}: {message}")]
    InvalidRegistry { path: PathBuf, message: String },
    /// Store file is not a JSON object of strings.
    #[error("Invalid settings store {path}: {message}")]
    InvalidStore { path: PathBuf, message: String },
    /// Serialisation failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// Registry rejected a write.
    #[error(transparent)]
    Registry(#[from] RegistryError),
    /// File watcher could not be set up.
    #[error("Failed to watch file: {0}")]
    Watch(String),
    /// Generic I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
