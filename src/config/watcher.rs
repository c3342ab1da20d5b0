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

//! File system watcher for live registry snapshot monitoring
//!
//! Uses OS-level file watching (Linux inotify) via the notify crate.
//! The parent directory is watched rather than the file itself, because
//! atomic writes replace the file's inode on every save.

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::{
    path::{Path, PathBuf},
    sync::mpsc::{channel, Receiver},
};

use crate::config::ConfigError;

/// Watches one file for modifications
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
    rx: Receiver<notify::Result<Event>>,
    file_name: PathBuf,
}

impl FileWatcher {
    pub fn new(path: &Path) -> Result<Self, ConfigError> {
        let (tx, rx) = channel();

        let file_name = path
            .file_name()
            .map(PathBuf::from)
            .ok_or_else(|| ConfigError::Watch(format!("{} has no file name", path.display())))?;
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let mut watcher = RecommendedWatcher::new(
            move |res| {
                let _ = tx.send(res);
            },
            Config::default(),
        )
        .map_err(|e| ConfigError::Watch(e.to_string()))?;

        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .map_err(|e| ConfigError::Watch(e.to_string()))?;

        Ok(FileWatcher {
            _watcher: watcher,
            rx,
            file_name,
        })
    }

    /// Checks for modification events on the watched file (non-blocking)
    ///
    /// Drains every pending event.
    pub fn check_for_changes(&self) -> bool {
        let mut changed = false;
        while let Ok(event_result) = self.rx.try_recv() {
            let Ok(event) = event_result else {
                continue;
            };
            if !matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                continue;
            }
            if event
                .paths
                .iter()
                .any(|p| p.file_name() == Some(self.file_name.as_os_str()))
            {
                changed = true;
            }
        }
        changed
    }
}
