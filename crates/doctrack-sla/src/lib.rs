//! Pure SLA evaluation engine for workflow entities.
//!
//! This crate holds everything the monitor pass needs that does not touch
//! the database: the business-hours calendar, the per-(kind, status) rule
//! table with environment overrides, severity classification, and the
//! document anchor reset policy. All of it is deterministic; the caller
//! supplies every timestamp.

pub mod anchor;
pub mod business_hours;
pub mod classify;
pub mod rules;

#[cfg(test)]
mod tests;

pub use anchor::reset_actions;
pub use business_hours::BusinessCalendar;
pub use classify::{classify, elapsed_hours};
pub use rules::{RuleTable, SlaRule};
