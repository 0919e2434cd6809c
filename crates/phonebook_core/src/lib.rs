//! Core domain logic for the phonebook app.
//! This crate is the single source of truth for contact invariants.

pub mod db;
pub mod dialer;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;
pub mod workflow;

pub use dialer::{dispatch_call, CallOutcome, CallPlatform, CallRequest, Keypad, KeypadKey};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::contact::{
    is_valid_phone_number, validate_contact_fields, Contact, ContactId, ContactValidationError,
};
pub use repo::contact_repo::{ContactRepository, RepoError, RepoResult, SqliteContactRepository};
pub use service::contact_view_model::ContactViewModel;
pub use store::{ContactStore, ContactsWatch, StoreError, StoreResult};
pub use workflow::contact_list::{
    filter_contacts, ContactCommands, ContactListState, SubmitOutcome,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
