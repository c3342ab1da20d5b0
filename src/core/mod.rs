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

//! src/core/mod.rs
//!
//! Core business logic module
//!
//! This module contains the fundamental data structures and algorithms
//! for conflict resolution, including:
//! - Type definitions for modifiers, canonical combos and bindings
//! - Accelerator canonicalization
//! - The registry capability and an in-memory implementation
//! - Combo indexing and cross-registry conflict detection
//!
//! Nothing here touches the filesystem, so everything is unit-testable
//! without a settings backend.

pub mod conflict;
pub mod parser;
pub mod registry;
pub mod types;

pub use conflict::{build_index, find_conflicts, ComboIndex, Conflict};
pub use registry::{ChangeCallback, MemoryRegistry, Registry, RegistryError, SubscriptionId};
pub use types::*;

#[cfg(test)]
mod tests;
