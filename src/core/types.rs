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

//! src/core/types.rs
//!
//! Core type definitions for conflict resolution
//!
//! This module defines the fundamental types used throughout the crate:
//! - `Modifier`: Accelerator modifier tokens and their GDK mask bits
//! - `KeyCombo`: The canonical (mask, key) pair used as the conflict key
//! - `Binding`: A named list of accelerator strings
//!
//! `KeyCombo` is hashable and ordered so it can index HashMaps and produce
//! stable, comparable output.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Accelerator modifier keys
///
/// Each modifier maps to a fixed GDK modifier mask bit. Several token
/// spellings map to the same modifier (`<Ctrl>`, `<Control>` and
/// `<Primary>` are all Control).
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Modifier {
    /// Shift key
    Shift,
    /// Control key (also `Ctrl`, `Primary`)
    Control,
    /// Alt key
    Alt,
    /// Super/Windows/Command key
    Super,
    /// Hyper key
    Hyper,
    /// Meta key
    Meta,
}

impl Modifier {
    /// All modifiers in mask-bit order
    pub const ALL: [Modifier; 6] = [
        Modifier::Shift,
        Modifier::Control,
        Modifier::Alt,
        Modifier::Super,
        Modifier::Hyper,
        Modifier::Meta,
    ];

    /// GDK mask bit for this modifier
    ///
    /// Values follow `GdkModifierType` (gdkenums.h).
    pub const fn mask_bit(self) -> u32 {
        match self {
            Modifier::Shift => 1 << 0,
            Modifier::Control => 1 << 2,
            Modifier::Alt => 1 << 3,
            Modifier::Super => 1 << 26,
            Modifier::Hyper => 1 << 27,
            Modifier::Meta => 1 << 28,
        }
    }

    /// Maps a bracketed token such as `<Shift>` to its modifier
    ///
    /// Matching is case-insensitive. Unknown tokens return `None`.
    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_lowercase().as_str() {
            "<shift>" => Some(Modifier::Shift),
            "<control>" | "<ctrl>" | "<primary>" => Some(Modifier::Control),
            "<alt>" => Some(Modifier::Alt),
            "<super>" => Some(Modifier::Super),
            "<hyper>" => Some(Modifier::Hyper),
            "<meta>" => Some(Modifier::Meta),
            _ => None,
        }
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Modifier::Shift => write!(f, "Shift"),
            Modifier::Control => write!(f, "Control"),
            Modifier::Alt => write!(f, "Alt"),
            Modifier::Super => write!(f, "Super"),
            Modifier::Hyper => write!(f, "Hyper"),
            Modifier::Meta => write!(f, "Meta"),
        }
    }
}

/// A canonical key combination
///
/// Two accelerator strings a user would perceive as the same shortcut
/// produce equal `KeyCombo`s, regardless of modifier order, token spelling
/// or letter case. Build one with [`crate::core::parser::canonicalize`].
///
/// # Display
/// Formats as `mask|key`, e.g. `67108864|t` for `<Super>t`.
#[derive(Clone, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct KeyCombo {
    /// Bitwise OR of the recognised modifiers' mask bits
    pub mask: u32,

    /// Base key name, lower-cased, with modifier tokens removed
    pub key: String,
}

impl KeyCombo {
    pub fn new(mask: u32, key: impl Into<String>) -> Self {
        Self {
            mask,
            key: key.into(),
        }
    }

    /// True for the combo produced by an empty accelerator string
    pub fn is_unset(&self) -> bool {
        self.mask == 0 && self.key.is_empty()
    }

    /// Decodes the mask back into modifiers, in mask-bit order
    pub fn modifiers(&self) -> Vec<Modifier> {
        Modifier::ALL
            .into_iter()
            .filter(|m| self.mask & m.mask_bit() != 0)
            .collect()
    }

    /// Human-readable accelerator form, e.g. `<Control><Shift>t`
    pub fn to_accelerator(&self) -> String {
        let mut out = String::new();
        for modifier in self.modifiers() {
            out.push('<');
            out.push_str(&modifier.to_string());
            out.push('>');
        }
        out.push_str(&self.key);
        out
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.mask, self.key)
    }
}

/// A named binding and its accelerator strings
///
/// # Example
/// ```
/// use keybind_overrider::core::Binding;
///
/// let binding = Binding::new("open-terminal", vec!["<Super>t".to_string()]);
/// assert_eq!(binding.to_string(), "open-terminal = [<Super>t]");
/// ```
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Binding {
    /// Identifier, unique within its registry
    pub name: String,

    /// Accelerator strings in registry order (may be empty)
    pub accelerators: Vec<String>,
}

impl Binding {
    pub fn new(name: impl Into<String>, accelerators: Vec<String>) -> Self {
        Self {
            name: name.into(),
            accelerators,
        }
    }

    /// A binding with no accelerators is disabled
    pub fn is_disabled(&self) -> bool {
        self.accelerators.is_empty()
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = [{}]", self.name, self.accelerators.join(", "))
    }
}
