//! Contact list screen workflow.
//!
//! # Responsibility
//! - Hold UI-local edit buffers, search text and the optional
//!   selected/editing/deleting contact references.
//! - Validate form input before any write intent leaves the UI.
//! - Filter the live snapshot for display.
//!
//! # Invariants
//! - `editing_contact` is `Some` exactly while an edit is in progress.
//! - A rejected submit leaves every field of the state untouched.
//! - Write intents are fire-and-forget; results arrive via the live list.

use crate::dialer::{dispatch_call, CallOutcome, CallPlatform};
use crate::model::contact::{validate_contact_fields, Contact, ContactId, ContactValidationError};
use log::debug;

const ADD_LABEL: &str = "Add contact";
const UPDATE_LABEL: &str = "Update contact";

/// Write intents the workflow emits.
///
/// Implemented by the view-model; tests can substitute a recorder.
pub trait ContactCommands {
    fn add_contact(&self, name: String, phone_number: String);
    fn update_contact(&self, contact: Contact);
    fn delete_contact(&self, contact: Contact);
}

/// Result of an accepted submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Added,
    Updated(ContactId),
}

/// UI-local state of the contacts screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactListState {
    pub name_input: String,
    pub phone_input: String,
    pub search_query: String,
    selected_contact: Option<Contact>,
    editing_contact: Option<Contact>,
    deleting_contact: Option<Contact>,
}

impl ContactListState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_contact(&self) -> Option<&Contact> {
        self.selected_contact.as_ref()
    }

    pub fn editing_contact(&self) -> Option<&Contact> {
        self.editing_contact.as_ref()
    }

    pub fn deleting_contact(&self) -> Option<&Contact> {
        self.deleting_contact.as_ref()
    }

    pub fn set_name_input(&mut self, value: impl Into<String>) {
        self.name_input = value.into();
    }

    pub fn set_phone_input(&mut self, value: impl Into<String>) {
        self.phone_input = value.into();
    }

    pub fn set_search_query(&mut self, value: impl Into<String>) {
        self.search_query = value.into();
    }

    /// Contacts to display for the current search text.
    pub fn visible_contacts(&self, contacts: &[Contact]) -> Vec<Contact> {
        filter_contacts(contacts, &self.search_query)
    }

    /// Label of the single add/update button.
    pub fn submit_label(&self) -> &'static str {
        if self.editing_contact.is_some() {
            UPDATE_LABEL
        } else {
            ADD_LABEL
        }
    }

    /// Starts editing `contact`, pre-filling both buffers.
    pub fn begin_edit(&mut self, contact: &Contact) {
        self.name_input = contact.name.clone();
        self.phone_input = contact.phone_number.clone();
        self.editing_contact = Some(contact.clone());
    }

    /// Validates buffers and emits an add or update intent.
    ///
    /// # Errors
    /// - `BlankName`/`BlankPhoneNumber` when a trimmed buffer is empty.
    /// - `InvalidPhoneNumber` when the trimmed phone is not 10 digits; the
    ///   caller shows [`ContactValidationError::user_message`].
    pub fn submit(
        &mut self,
        commands: &impl ContactCommands,
    ) -> Result<SubmitOutcome, ContactValidationError> {
        let name = self.name_input.trim();
        let phone_number = self.phone_input.trim();
        validate_contact_fields(name, phone_number)?;

        let outcome = match self.editing_contact.take() {
            None => {
                commands.add_contact(name.to_string(), phone_number.to_string());
                SubmitOutcome::Added
            }
            Some(editing) => {
                let updated = editing.with_fields(name, phone_number);
                commands.update_contact(updated);
                SubmitOutcome::Updated(editing.id)
            }
        };

        debug!("event=contact_submit module=workflow status=ok outcome={outcome:?}");
        self.name_input.clear();
        self.phone_input.clear();
        Ok(outcome)
    }

    /// Opens the delete confirmation for `contact`.
    pub fn begin_delete(&mut self, contact: &Contact) {
        self.deleting_contact = Some(contact.clone());
    }

    /// Prompt text for the pending delete confirmation.
    pub fn delete_prompt(&self) -> Option<String> {
        self.deleting_contact
            .as_ref()
            .map(|contact| format!("Delete {}?", contact.name))
    }

    /// Emits a delete intent for the pending contact and closes the prompt.
    ///
    /// Returns the id that was targeted, or `None` when nothing was pending.
    pub fn confirm_delete(&mut self, commands: &impl ContactCommands) -> Option<ContactId> {
        let contact = self.deleting_contact.take()?;
        let id = contact.id;
        commands.delete_contact(contact);
        Some(id)
    }

    /// Closes the delete prompt without touching storage.
    pub fn cancel_delete(&mut self) {
        self.deleting_contact = None;
    }

    /// Opens the detail view for `contact`.
    pub fn select(&mut self, contact: &Contact) {
        self.selected_contact = Some(contact.clone());
    }

    /// Closes the detail view.
    pub fn close_detail(&mut self) {
        self.selected_contact = None;
    }

    /// Calls the selected contact and closes the detail view.
    ///
    /// Returns `None` when no contact is selected.
    pub fn call_selected(&mut self, platform: &impl CallPlatform) -> Option<CallOutcome> {
        let contact = self.selected_contact.take()?;
        Some(dispatch_call(platform, &contact.phone_number))
    }
}

/// Filters contacts by name (case-insensitive) or phone (literal substring).
///
/// The query is used as typed; an empty query keeps every contact in order.
pub fn filter_contacts(contacts: &[Contact], query: &str) -> Vec<Contact> {
    if query.is_empty() {
        return contacts.to_vec();
    }

    let lowered = query.to_lowercase();
    contacts
        .iter()
        .filter(|contact| {
            contact.name.to_lowercase().contains(&lowered) || contact.phone_number.contains(query)
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{filter_contacts, ContactListState};
    use crate::model::contact::Contact;

    fn sample() -> Vec<Contact> {
        vec![
            Contact::new(2, "Le Thi B", "0987654321"),
            Contact::new(1, "Nguyen Van A", "0123456789"),
        ]
    }

    #[test]
    fn filter_by_phone_substring() {
        let hits = filter_contacts(&sample(), "0123");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Nguyen Van A");
    }

    #[test]
    fn filter_by_name_ignores_case() {
        let hits = filter_contacts(&sample(), "a");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Nguyen Van A");
        assert_eq!(filter_contacts(&sample(), "E").len(), 2);
        assert_eq!(filter_contacts(&sample(), "NGUYEN").len(), 1);
    }

    #[test]
    fn empty_query_keeps_full_list_in_order() {
        let contacts = sample();
        assert_eq!(filter_contacts(&contacts, ""), contacts);
    }

    #[test]
    fn filter_is_idempotent() {
        let contacts = sample();
        let once = filter_contacts(&contacts, "thi");
        let twice = filter_contacts(&contacts, "thi");
        assert_eq!(once, twice);
        assert_eq!(filter_contacts(&once, "thi"), once);
    }

    #[test]
    fn query_is_not_trimmed() {
        assert!(filter_contacts(&sample(), " 0123").is_empty());
    }

    #[test]
    fn submit_label_tracks_edit_mode() {
        let mut state = ContactListState::new();
        assert_eq!(state.submit_label(), "Add contact");
        state.begin_edit(&Contact::new(1, "A", "0123456789"));
        assert_eq!(state.submit_label(), "Update contact");
    }

    #[test]
    fn delete_prompt_names_pending_contact() {
        let mut state = ContactListState::new();
        assert_eq!(state.delete_prompt(), None);
        state.begin_delete(&Contact::new(1, "Le Thi B", "0987654321"));
        assert_eq!(state.delete_prompt().as_deref(), Some("Delete Le Thi B?"));
    }
}
