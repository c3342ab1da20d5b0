//! Core module tests
//!
//! Contains test suites for core functionality:
//! - Accelerator canonicalization tests
//! - Combo index and conflict detection tests
//! - Registry capability tests
//! - Type tests (Modifier, KeyCombo, Binding)

#[cfg(test)]
mod conflict_tests;
#[cfg(test)]
mod parser_tests;
