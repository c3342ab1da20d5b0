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

//! Cross-registry keybinding conflict detection
//!
//! This module builds a combo index per registry and intersects the user's
//! index with each foreign registry's index. A conflict is a canonical key
//! combination bound both by the user and by a foreign registry.
//!
//! # Performance
//! - Build index: O(n) where n = total accelerator strings in the registry
//! - Lookup: O(1) average case
//! - Find conflicts: O(u * f) where u = user combos, f = foreign registries
//!
//! Indexes are rebuilt on every detection pass and never persisted.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::core::parser::canonicalize;
use crate::core::registry::Registry;
use crate::core::types::KeyCombo;

/// Maps each canonical combo to the binding names using it.
///
/// Combos iterate in first-seen order, and each bucket lists names in
/// first-seen order with no duplicates.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ComboIndex {
    /// Position of each combo in `buckets`
    positions: HashMap<KeyCombo, usize>,
    /// Buckets in insertion order
    buckets: Vec<(KeyCombo, Vec<String>)>,
}

impl ComboIndex {
    /// Creates a new empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `name` uses `combo`.
    pub fn insert(&mut self, combo: KeyCombo, name: &str) {
        let position = match self.positions.get(&combo) {
            Some(&position) => position,
            None => {
                self.buckets.push((combo.clone(), Vec::new()));
                self.positions.insert(combo, self.buckets.len() - 1);
                self.buckets.len() - 1
            }
        };

        let names = &mut self.buckets[position].1;
        if !names.iter().any(|existing| existing == name) {
            names.push(name.to_string());
        }
    }

    /// Binding names using `combo`, if any.
    pub fn get(&self, combo: &KeyCombo) -> Option<&[String]> {
        self.positions
            .get(combo)
            .map(|&position| self.buckets[position].1.as_slice())
    }

    /// Iterates `(combo, names)` in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&KeyCombo, &[String])> {
        self.buckets
            .iter()
            .map(|(combo, names)| (combo, names.as_slice()))
    }

    /// Number of distinct combos.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

/// Builds the combo index of a registry.
///
/// Keys whose value is not an accelerator list are skipped. A binding with
/// several accelerators lands in several buckets.
pub fn build_index(registry: &dyn Registry) -> ComboIndex {
    let mut index = ComboIndex::new();

    for name in registry.list_binding_names() {
        let Some(accelerators) = registry.accelerators(&name) else {
            continue;
        };

        for accelerator in &accelerators {
            index.insert(canonicalize(accelerator), &name);
        }
    }

    index
}

/// A combo bound by both the user and a foreign registry.
#[derive(Clone)]
pub struct Conflict<'a> {
    /// First user binding owning the combo
    pub user_binding: String,

    /// Foreign registry holding the colliding bindings
    pub registry: &'a dyn Registry,

    /// Every foreign binding using the combo (always 1 or more)
    pub conflicting_bindings: Vec<String>,

    /// The shared combo
    pub key_combo: KeyCombo,
}

impl Conflict<'_> {
    /// Schema id of the foreign registry
    pub fn schema_id(&self) -> &str {
        self.registry.schema_id()
    }
}

impl fmt::Debug for Conflict<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Conflict")
            .field("user_binding", &self.user_binding)
            .field("schema_id", &self.schema_id())
            .field("conflicting_bindings", &self.conflicting_bindings)
            .field("key_combo", &self.key_combo)
            .finish()
    }
}

impl fmt::Display for Conflict<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) conflicts with {} in {}",
            self.user_binding,
            self.key_combo.to_accelerator(),
            self.conflicting_bindings.join(", "),
            self.schema_id()
        )
    }
}

/// Finds every combo shared by the user registry and a foreign registry.
///
/// Emission order: foreign registries in the given order, then combos in
/// the user index's insertion order. The unset combo never conflicts.
pub fn find_conflicts<'a>(user: &dyn Registry, foreign: &'a [Rc<dyn Registry>]) -> Vec<Conflict<'a>> {
    let user_index = build_index(user);
    let mut conflicts = Vec::new();

    for registry in foreign {
        let against = build_index(registry.as_ref());

        for (combo, user_names) in user_index.iter() {
            if combo.is_unset() {
                continue;
            }
            let Some(user_binding) = user_names.first() else {
                continue;
            };
            let Some(conflicting) = against.get(combo) else {
                continue;
            };

            conflicts.push(Conflict {
                user_binding: user_binding.clone(),
                registry: registry.as_ref(),
                conflicting_bindings: conflicting.to_vec(),
                key_combo: combo.clone(),
            });
        }
    }

    conflicts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::registry::MemoryRegistry;

    #[test]
    fn test_empty_registry_builds_empty_index() {
        let registry = MemoryRegistry::new("org.example.empty");
        let index = build_index(&registry);
        assert!(index.is_empty());
        assert_eq!(index.len(), 0);
    }

    #[test]
    fn test_duplicate_name_in_bucket_is_recorded_once() {
        let registry = MemoryRegistry::new("org.example")
            .with_binding("toggle", &["<Super>t", "<SUPER>T"]);

        let index = build_index(&registry);
        assert_eq!(index.len(), 1);
        assert_eq!(
            index.get(&canonicalize("<Super>t")),
            Some(&["toggle".to_string()][..])
        );
    }
}
