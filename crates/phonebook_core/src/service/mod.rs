//! View-model services.
//!
//! # Responsibility
//! - Bridge UI workflows to the shared contact store.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod contact_view_model;
