//! Repository layer: the registry contract and its in-memory store.
//!
//! # Responsibility
//! - Define the use-case oriented registry API (`PersonRepository`).
//! - Own the only mutable registry state and its change notifications.
//!
//! # Invariants
//! - Write paths validate drafts before any state changes.
//! - Repository APIs return semantic errors (`NotFound`, `InvalidReference`,
//!   `Validation`) instead of panicking.

pub mod clock;
pub mod notify;
pub mod person_repo;
pub mod registry_store;
