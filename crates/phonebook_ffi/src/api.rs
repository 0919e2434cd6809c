//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose contact list/add/update/delete and dial helpers to Dart via FRB.
//! - Keep error semantics simple: envelopes with `ok` + `message`.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - All calls share one process-wide contact store and runtime.
//! - Writes are only scheduled here. Their effect reaches Dart through the
//!   next snapshot revision (`contacts_wait_for_change` + `contacts_list`).

use log::warn;
use once_cell::sync::OnceCell;
use phonebook_core::{
    core_version as core_version_inner, filter_contacts, init_logging as init_logging_inner,
    ping as ping_inner, validate_contact_fields, CallRequest, Contact, ContactId, ContactStore,
    ContactViewModel,
};
use std::path::PathBuf;
use std::time::Duration;
use tokio::runtime::{Builder, Runtime};

const DB_FILE_NAME: &str = "phonebook.sqlite3";
const DB_PATH_ENV: &str = "PHONEBOOK_DB_PATH";
static FFI_CONTEXT: OnceCell<FfiContext> = OnceCell::new();

struct FfiContext {
    runtime: Runtime,
    view_model: ContactViewModel,
}

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// One row of the contact list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactItem {
    pub id: i64,
    pub name: String,
    pub phone_number: String,
}

impl From<Contact> for ContactItem {
    fn from(value: Contact) -> Self {
        Self {
            id: value.id,
            name: value.name,
            phone_number: value.phone_number,
        }
    }
}

/// List response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactListResponse {
    /// Filtered contacts ordered by name.
    pub items: Vec<ContactItem>,
    /// Number of stored contacts before filtering.
    pub total: u32,
    /// Snapshot revision the items were read at.
    pub revision: u64,
    pub message: String,
}

/// Write action response envelope.
///
/// `ok` means the write passed validation and was scheduled; the stored
/// result shows up in a later snapshot revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactActionResponse {
    pub ok: bool,
    /// Targeted contact id, when known up front.
    pub contact_id: Option<i64>,
    /// User-facing notice text.
    pub message: String,
}

impl ContactActionResponse {
    fn scheduled(contact_id: Option<ContactId>) -> Self {
        Self {
            ok: true,
            contact_id,
            message: String::new(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            contact_id: None,
            message: message.into(),
        }
    }
}

/// Lists contacts matching `query` (name case-insensitive, phone literal).
///
/// # FFI contract
/// - Reads the in-memory snapshot; the first call of the process also opens
///   the database.
/// - Empty query returns every contact.
/// - Never panics; store failures return an empty list with a message.
#[flutter_rust_bridge::frb(sync)]
pub fn contacts_list(query: String) -> ContactListResponse {
    let store = match ffi_context() {
        Ok(context) => context.view_model.store(),
        Err(message) => {
            return ContactListResponse {
                items: Vec::new(),
                total: 0,
                revision: 0,
                message,
            };
        }
    };

    let revision = store.revision();
    let snapshot = store.snapshot();
    let items = filter_contacts(&snapshot, &query)
        .into_iter()
        .map(ContactItem::from)
        .collect::<Vec<_>>();
    let message = if items.is_empty() {
        "No contacts.".to_string()
    } else {
        format!("Found {} contact(s).", items.len())
    };
    ContactListResponse {
        items,
        total: u32::try_from(snapshot.len()).unwrap_or(u32::MAX),
        revision,
        message,
    }
}

/// Waits until a snapshot newer than `since_revision` is published, or
/// `timeout_ms` elapses, and returns the revision current at that point.
///
/// # FFI contract
/// - Async on the Dart side (runs on the FRB worker pool, never the UI
///   isolate).
/// - Must not be called from inside a tokio runtime.
pub fn contacts_wait_for_change(since_revision: u64, timeout_ms: u32) -> u64 {
    let context = match ffi_context() {
        Ok(context) => context,
        Err(_) => return since_revision,
    };
    let store = context.view_model.store();
    context.runtime.block_on(async {
        tokio::time::timeout(
            Duration::from_millis(u64::from(timeout_ms)),
            store.changed_since(since_revision),
        )
        .await
        .unwrap_or_else(|_| store.revision())
    })
}

/// Schedules an insert after trimming and validating both fields.
///
/// Validation failures are returned synchronously with the user notice.
#[flutter_rust_bridge::frb(sync)]
pub fn contact_add(name: String, phone_number: String) -> ContactActionResponse {
    let name = name.trim();
    let phone_number = phone_number.trim();
    if let Err(err) = validate_contact_fields(name, phone_number) {
        return ContactActionResponse::failure(err.user_message());
    }

    match ffi_context() {
        Ok(context) => {
            drop(
                context
                    .view_model
                    .add_contact(name.to_string(), phone_number.to_string()),
            );
            ContactActionResponse::scheduled(None)
        }
        Err(message) => ContactActionResponse::failure(message),
    }
}

/// Schedules replacing name/phone of contact `id`.
///
/// A vanished contact is ignored in the background, not re-created.
#[flutter_rust_bridge::frb(sync)]
pub fn contact_update(id: i64, name: String, phone_number: String) -> ContactActionResponse {
    let name = name.trim();
    let phone_number = phone_number.trim();
    if let Err(err) = validate_contact_fields(name, phone_number) {
        return ContactActionResponse::failure(err.user_message());
    }

    match ffi_context() {
        Ok(context) => {
            drop(
                context
                    .view_model
                    .update_contact(Contact::new(id, name, phone_number)),
            );
            ContactActionResponse::scheduled(Some(id))
        }
        Err(message) => ContactActionResponse::failure(message),
    }
}

/// Schedules deleting contact `id`. Deleting an absent contact is a no-op.
#[flutter_rust_bridge::frb(sync)]
pub fn contact_delete(id: i64) -> ContactActionResponse {
    match ffi_context() {
        Ok(context) => {
            drop(context.view_model.delete_contact_by_id(id));
            ContactActionResponse::scheduled(Some(id))
        }
        Err(message) => ContactActionResponse::failure(message),
    }
}

/// Returns the `tel:` URI the host should hand to the platform dialer.
///
/// The number is not validated, matching keypad behavior.
#[flutter_rust_bridge::frb(sync)]
pub fn dial_uri(number: String) -> String {
    CallRequest::for_number(number.trim()).uri().to_string()
}

fn ffi_context() -> Result<&'static FfiContext, String> {
    FFI_CONTEXT.get_or_try_init(|| {
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("phonebook-ffi")
            .enable_time()
            .build()
            .map_err(|err| {
                warn!("event=ffi_runtime_start module=ffi status=error error={err}");
                format!("contact runtime start failed: {err}")
            })?;
        let store = ContactStore::open(resolve_db_path()).map_err(|err| {
            warn!("event=ffi_store_open module=ffi status=error error={err}");
            format!("contact DB open failed: {err}")
        })?;
        let view_model = ContactViewModel::new(store, runtime.handle().clone());
        Ok(FfiContext {
            runtime,
            view_model,
        })
    })
}

fn resolve_db_path() -> PathBuf {
    if let Ok(raw) = std::env::var(DB_PATH_ENV) {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }
    std::env::temp_dir().join(DB_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::{
        contact_add, contact_delete, contact_update, contacts_list, contacts_wait_for_change,
        core_version, dial_uri, init_logging, ping,
    };
    use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "/tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn dial_uri_uses_tel_scheme_without_validation() {
        assert_eq!(dial_uri(" 113 ".to_string()), "tel:113");
        assert_eq!(dial_uri("*#06#".to_string()), "tel:*#06#");
    }

    #[test]
    fn contact_add_rejects_malformed_phone() {
        let response = contact_add("Someone".to_string(), "12345".to_string());
        assert!(!response.ok);
        assert_eq!(response.message, "Phone number must be exactly 10 digits!");
    }

    #[test]
    fn contact_update_rejects_blank_name_synchronously() {
        let response = contact_update(1, "   ".to_string(), "0123456789".to_string());
        assert!(!response.ok);
        assert_eq!(response.contact_id, None);
    }

    #[test]
    fn wait_for_change_returns_current_revision_on_timeout() {
        let current = contacts_list(String::new()).revision;
        let waited = contacts_wait_for_change(u64::MAX, 20);
        assert!(waited >= current);
        assert!(waited < u64::MAX);
    }

    #[test]
    fn writes_are_scheduled_and_observed_through_later_revisions() {
        let token = unique_token("ffi-contact");
        let added = contact_add(format!("  {token}  "), " 0123456789 ".to_string());
        assert!(added.ok, "{}", added.message);
        assert_eq!(added.contact_id, None);

        assert!(wait_until(|| contacts_list(token.to_uppercase()).items.len() == 1));
        let listed = contacts_list(token.to_uppercase());
        assert_eq!(listed.items[0].name, token);
        assert_eq!(listed.items[0].phone_number, "0123456789");
        assert!(listed.total >= 1);
        let id = listed.items[0].id;

        let renamed = format!("{token}-renamed");
        let updated = contact_update(id, renamed.clone(), "0987654321".to_string());
        assert!(updated.ok, "{}", updated.message);
        assert_eq!(updated.contact_id, Some(id));
        assert!(wait_until(|| {
            contacts_list(renamed.clone())
                .items
                .first()
                .is_some_and(|item| item.id == id && item.phone_number == "0987654321")
        }));

        assert!(contact_delete(id).ok);
        assert!(wait_until(|| contacts_list(token.clone()).items.is_empty()));

        assert!(contact_delete(id).ok);
        assert!(contact_update(id, "Ghost".to_string(), "0123456789".to_string()).ok);
        let settled = contacts_wait_for_change(contacts_list(String::new()).revision, 50);
        assert!(settled >= 1);
        assert!(contacts_list(token).items.is_empty());
        assert!(contacts_list("Ghost".to_string())
            .items
            .iter()
            .all(|item| item.id != id));
    }

    fn wait_until(mut ready: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut revision = contacts_list(String::new()).revision;
        while !ready() {
            if Instant::now() >= deadline {
                return false;
            }
            revision = contacts_wait_for_change(revision, 100);
        }
        true
    }

    fn unique_token(prefix: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos();
        format!("{prefix}-{nanos}")
    }
}
