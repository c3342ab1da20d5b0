//! Persistence tests
//!
//! Contains test suites for the storage side of the engine:
//! - Ledger tests (load/save, corrupt state, entry encoding)
//! - File registry tests (snapshots, atomic writes, reload notifications)
//! - Backup tests (timestamped copies)

#[cfg(test)]
mod backup_tests;
