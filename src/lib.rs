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

//! Keybinding Overrider
//!
//! A keybinding conflict resolution engine. Given the user's own shortcuts
//! and several independently-owned shortcut registries, it finds shortcuts
//! that collide on the same key combination, disables the colliding foreign
//! bindings, and remembers what it disabled so everything can be restored.
//!
//! # Features
//!
//! - **Canonical Combos:** `<Shift><Ctrl>T` and `<Control><Shift>t` are the same shortcut
//! - **Cross-Registry Detection:** User bindings checked against every conflict schema
//! - **Restorable Overrides:** Original accelerators kept in a persisted ledger
//! - **Live Updates:** Re-checks conflicts when the user changes a binding
//! - **Atomic Operations:** Safe file writes with automatic backups
//!
//! # Architecture
//!
//! - **`core`:** Business logic (types, canonicalizer, registry capability, conflict detection)
//! - **`config`:** Persistence (settings store, override ledger, file-backed registries)
//! - **`overrides`:** The override controller tying detection to the ledger
//!
//! # Examples
//!
//! ## Canonicalizing accelerators
//!
//! ```
//! use keybind_overrider::core::parser::canonicalize;
//!
//! assert_eq!(canonicalize("<Super>Above_Tab"), canonicalize("<SUPER>grave"));
//! ```
//!
//! ## Detecting conflicts
//!
//! ```
//! use keybind_overrider::core::{find_conflicts, MemoryRegistry, Registry};
//! use std::rc::Rc;
//!
//! let user = MemoryRegistry::new("org.example.user").with_binding("toggle", &["<Super>t"]);
//! let shell: Rc<dyn Registry> = Rc::new(
//!     MemoryRegistry::new("org.gnome.shell.keybindings").with_binding("open-terminal", &["<Super>T"]),
//! );
//!
//! let foreign = [shell];
//! let conflicts = find_conflicts(&user, &foreign);
//! assert_eq!(conflicts.len(), 1);
//! assert_eq!(conflicts[0].conflicting_bindings, vec!["open-terminal"]);
//! ```
//!
//! ## Overriding from snapshot files
//!
//! ```no_run
//! use keybind_overrider::config::{FileRegistry, FileStore};
//! use keybind_overrider::core::Registry;
//! use keybind_overrider::overrides::OverrideController;
//! use std::rc::Rc;
//!
//! let user = Rc::new(FileRegistry::open("/tmp/user.json".into())?);
//! let shell = Rc::new(FileRegistry::open("/tmp/shell.json".into())?);
//! let store = Rc::new(FileStore::new("/tmp/settings.json".into()));
//!
//! let controller = OverrideController::new(user, vec![shell as Rc<dyn Registry>], store);
//! controller.enable();
//! controller.override_conflicts(None)?;
//! # Ok::<(), keybind_overrider::config::ConfigError>(())
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

pub mod config;
pub mod core;
pub mod overrides;

// Re-export commonly used types for convenience
pub use core::{Binding, KeyCombo, Modifier};
pub use overrides::OverrideController;
