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

//! src/core/parser.rs
//!
//! Accelerator string canonicalizer
//!
//! Accelerator strings look like `<Control><Alt>t`: zero or more bracketed
//! modifier tokens followed by a base key name. Different strings can name
//! the same physical shortcut:
//! - Modifier order varies (`<Shift><Control>` vs `<Control><Shift>`)
//! - Token spelling varies (`<Ctrl>`, `<Control>`, `<Primary>`)
//! - Case varies (`T` vs `t`, `<SUPER>` vs `<Super>`)
//! - The legacy key name `Above_Tab` is an alias of `grave`
//!
//! `canonicalize` folds all of these into one `KeyCombo`.
//!
//! # Security
//! The parser never fails: unknown tokens contribute no modifier bits and
//! malformed input degrades to whatever text remains after stripping tokens.

use regex::Regex;
use std::sync::LazyLock;

use crate::core::types::{KeyCombo, Modifier};

/// Legacy key name normalised to [`CANONICAL_ALIAS`]
pub const LEGACY_ALIAS: &str = "Above_Tab";

/// Spelling used for the key above Tab
pub const CANONICAL_ALIAS: &str = "grave";

#[allow(clippy::expect_used)]
static MODIFIER_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<.*?>").expect("modifier token pattern should be valid regex"));

/// Returns every `<...>` token in the accelerator, in original order
///
/// Duplicates are preserved.
///
/// # Example
/// ```
/// use keybind_overrider::core::parser::modifier_tokens;
///
/// assert_eq!(modifier_tokens("<Control><Alt>t"), vec!["<Control>", "<Alt>"]);
/// assert!(modifier_tokens("F1").is_empty());
/// ```
pub fn modifier_tokens(accelerator: &str) -> Vec<&str> {
    MODIFIER_TOKEN
        .find_iter(accelerator)
        .map(|m| m.as_str())
        .collect()
}

/// Returns the GDK modifier mask for an accelerator
///
/// Unrecognised tokens contribute nothing.
pub fn modifier_mask(accelerator: &str) -> u32 {
    modifier_tokens(accelerator)
        .into_iter()
        .filter_map(Modifier::from_token)
        .fold(0, |mask, modifier| mask | modifier.mask_bit())
}

/// Canonicalizes an accelerator string
///
/// Steps:
/// 1. Replace the legacy `Above_Tab` name with `grave`
/// 2. Compute the modifier mask
/// 3. Remove every modifier token
/// 4. Trim and lower-case what remains
///
/// An empty accelerator canonicalizes to the unset combo `(0, "")`.
///
/// # Example
/// ```
/// use keybind_overrider::core::parser::canonicalize;
///
/// let a = canonicalize("<Control><Shift>t");
/// let b = canonicalize("<Shift><Ctrl>T");
/// assert_eq!(a, b);
/// assert_eq!(a.to_string(), "5|t");
/// ```
pub fn canonicalize(accelerator: &str) -> KeyCombo {
    let accelerator = accelerator.replacen(LEGACY_ALIAS, CANONICAL_ALIAS, 1);

    let mask = modifier_mask(&accelerator);

    let mut remainder = accelerator.clone();
    for token in modifier_tokens(&accelerator) {
        remainder = remainder.replacen(token, "", 1);
    }

    KeyCombo::new(mask, remainder.trim().to_lowercase())
}
