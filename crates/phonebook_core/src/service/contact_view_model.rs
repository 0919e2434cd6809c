//! Contact list view-model.
//!
//! # Responsibility
//! - Expose the live ordered contact list to UI callers.
//! - Forward add/update/delete intents to the store without blocking the
//!   caller.
//!
//! # Invariants
//! - Write results are observed only through the next live snapshot; they
//!   never flow back into workflow edit state.
//! - A missing id on update/delete is logged and otherwise ignored.

use crate::model::contact::{Contact, ContactId};
use crate::store::{ContactStore, ContactsWatch, StoreResult};
use crate::workflow::contact_list::ContactCommands;
use log::{error, warn};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// View-model over a shared [`ContactStore`].
#[derive(Clone)]
pub struct ContactViewModel {
    store: ContactStore,
    runtime: Handle,
}

impl ContactViewModel {
    /// Creates a view-model dispatching writes on `runtime`'s blocking pool.
    pub fn new(store: ContactStore, runtime: Handle) -> Self {
        Self { store, runtime }
    }

    /// Creates a view-model bound to the runtime of the current task.
    ///
    /// # Panics
    /// Panics when called outside a tokio runtime, like `Handle::current`.
    pub fn with_current_runtime(store: ContactStore) -> Self {
        Self::new(store, Handle::current())
    }

    /// Latest ordered contact list.
    pub fn all_contacts(&self) -> Vec<Contact> {
        self.store.snapshot()
    }

    /// Live subscription to the ordered contact list.
    pub fn subscribe(&self) -> ContactsWatch {
        self.store.subscribe()
    }

    /// Schedules an insert. The returned handle may be dropped.
    pub fn add_contact(&self, name: String, phone_number: String) -> JoinHandle<()> {
        let store = self.store.clone();
        self.dispatch("contact_add", move || {
            store.insert(&name, &phone_number).map(|_| ())
        })
    }

    /// Schedules an update of `contact.id` with the given field values.
    pub fn update_contact(&self, contact: Contact) -> JoinHandle<()> {
        let store = self.store.clone();
        self.dispatch("contact_update", move || store.update(&contact))
    }

    /// Schedules a delete of `contact.id`.
    pub fn delete_contact(&self, contact: Contact) -> JoinHandle<()> {
        self.delete_contact_by_id(contact.id)
    }

    /// Schedules a delete of the contact with `id`.
    pub fn delete_contact_by_id(&self, id: ContactId) -> JoinHandle<()> {
        let store = self.store.clone();
        self.dispatch("contact_delete", move || {
            store.delete_by_id(id).map(|_| ())
        })
    }

    /// Handle to the underlying store, for revision polling.
    pub fn store(&self) -> &ContactStore {
        &self.store
    }

    fn dispatch(
        &self,
        intent: &'static str,
        write: impl FnOnce() -> StoreResult<()> + Send + 'static,
    ) -> JoinHandle<()> {
        self.runtime.spawn_blocking(move || match write() {
            Ok(()) => {}
            Err(err) => match err.not_found_id() {
                Some(contact_id) => warn!(
                    "event={intent} module=view_model status=ignored error_code=not_found contact_id={contact_id}"
                ),
                None => error!("event={intent} module=view_model status=error error={err}"),
            },
        })
    }
}

impl ContactCommands for ContactViewModel {
    fn add_contact(&self, name: String, phone_number: String) {
        drop(ContactViewModel::add_contact(self, name, phone_number));
    }

    fn update_contact(&self, contact: Contact) {
        drop(ContactViewModel::update_contact(self, contact));
    }

    fn delete_contact(&self, contact: Contact) {
        drop(ContactViewModel::delete_contact(self, contact));
    }
}
