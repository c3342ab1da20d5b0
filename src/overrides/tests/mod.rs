//! Override controller tests
//!
//! - Override/restore round trips against in-memory registries
//! - Re-entrancy guard behaviour
//! - Ledger reconciliation (update_overrides)
//! - User binding change handling
