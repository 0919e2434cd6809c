//! Contact domain model.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//!
//! # Invariants
//! - Every contact is identified by a storage-assigned `ContactId`.
//! - Deletion is a hard delete; there are no tombstones.

pub mod contact;
