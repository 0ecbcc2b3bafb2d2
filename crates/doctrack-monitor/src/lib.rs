//! The SLA monitor pass: one transactional sweep over all monitored entity
//! kinds, producing notifications and document audit entries.
//!
//! [`runner::SlaMonitor`] owns the database handle plus an immutable rule
//! table and business-hours calendar; [`dispatch`] fans alerts out to
//! recipients with per-recipient dedupe; [`guard::RunGuard`] keeps passes
//! from overlapping within one process.

pub mod dispatch;
pub mod error;
pub mod guard;
pub mod runner;


pub use error::{MonitorError, Result};
pub use guard::RunGuard;
pub use runner::SlaMonitor;
