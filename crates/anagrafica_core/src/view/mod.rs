//! Derived views over a registry snapshot.
//!
//! # Responsibility
//! - Classify documents by expiry and order them.
//! - Build reminders, relationship lookups and aggregate statistics.
//!
//! # Invariants
//! - Every view is a pure function of its inputs: no locking, no I/O,
//!   no mutation of the snapshot it reads.

pub mod expiry;
pub mod relationship_index;
pub mod reminder;
pub mod statistics;
