//! Shared contact store with a live, name-ordered query.
//!
//! # Responsibility
//! - Own the single SQLite connection used for contact reads/writes.
//! - Publish a fresh ordered snapshot after every write that changed rows.
//!
//! # Invariants
//! - Writes are serialized by the connection mutex.
//! - Snapshots are published while the write lock is still held, so
//!   subscribers observe them in write order.
//! - Subscribers never see a partially applied write.

use crate::db::{open_db, open_db_in_memory};
use crate::model::contact::{Contact, ContactId};
use crate::repo::contact_repo::{
    ContactRepository, RepoError, RepoResult, SqliteContactRepository,
};
use log::{info, warn};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;

/// Live receiver for the ordered contact list.
///
/// Always holds the latest snapshot; `changed().await` resolves on the next
/// publication.
pub type ContactsWatch = watch::Receiver<Vec<Contact>>;

pub type StoreResult<T> = Result<T, StoreError>;

/// Store-level error wrapping repository failures.
#[derive(Debug)]
pub enum StoreError {
    Repo(RepoError),
    /// A writer panicked while holding the connection lock.
    LockPoisoned,
}

impl StoreError {
    /// Returns the missing id when the error is a not-found signal.
    pub fn not_found_id(&self) -> Option<ContactId> {
        match self {
            Self::Repo(RepoError::NotFound(id)) => Some(*id),
            _ => None,
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::LockPoisoned => write!(f, "contact store lock poisoned"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::LockPoisoned => None,
        }
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<crate::db::DbError> for StoreError {
    fn from(value: crate::db::DbError) -> Self {
        Self::Repo(RepoError::Db(value))
    }
}

struct StoreInner {
    conn: Mutex<Connection>,
    contacts_tx: watch::Sender<Vec<Contact>>,
    /// Bumped once per published snapshot.
    revision: AtomicU64,
}

/// Cloneable handle to the contact store.
#[derive(Clone)]
pub struct ContactStore {
    inner: Arc<StoreInner>,
}

impl ContactStore {
    /// Opens (and migrates) a file-backed store.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Self::from_connection(open_db(path)?)
    }

    /// Opens an empty in-memory store.
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::from_connection(open_db_in_memory()?)
    }

    /// Wraps a migrated connection and publishes the initial snapshot.
    ///
    /// # Errors
    /// - Repository readiness errors when `conn` was not opened via `db`.
    pub fn from_connection(conn: Connection) -> StoreResult<Self> {
        let initial = SqliteContactRepository::try_new(&conn)?.list_contacts()?;
        info!(
            "event=store_open module=store status=ok contacts={}",
            initial.len()
        );
        let (contacts_tx, _) = watch::channel(initial);
        Ok(Self {
            inner: Arc::new(StoreInner {
                conn: Mutex::new(conn),
                contacts_tx,
                revision: AtomicU64::new(0),
            }),
        })
    }

    /// Subscribes to the live ordered contact list.
    pub fn subscribe(&self) -> ContactsWatch {
        self.inner.contacts_tx.subscribe()
    }

    /// Returns the latest published snapshot.
    pub fn snapshot(&self) -> Vec<Contact> {
        self.inner.contacts_tx.borrow().clone()
    }

    /// Number of snapshots published since the store was opened.
    pub fn revision(&self) -> u64 {
        self.inner.revision.load(Ordering::SeqCst)
    }

    /// Resolves with the current revision once it is newer than `since`.
    ///
    /// Returns immediately when a newer snapshot was already published.
    pub async fn changed_since(&self, since: u64) -> u64 {
        let mut contacts = self.subscribe();
        loop {
            let current = self.revision();
            if current > since {
                return current;
            }
            if contacts.changed().await.is_err() {
                return self.revision();
            }
        }
    }

    /// Inserts a contact and publishes the refreshed list.
    pub fn insert(&self, name: &str, phone_number: &str) -> StoreResult<ContactId> {
        self.write("contact_insert", |repo| {
            repo.insert_contact(name, phone_number).map(|id| (id, true))
        })
    }

    /// Replaces fields of an existing contact, keeping its id.
    ///
    /// # Errors
    /// - `StoreError::Repo(RepoError::NotFound)` when the id is gone.
    pub fn update(&self, contact: &Contact) -> StoreResult<()> {
        self.write("contact_update", |repo| {
            repo.update_contact(contact).map(|()| ((), true))
        })
    }

    /// Deletes a contact. Returns `false` when it was already absent.
    pub fn delete(&self, contact: &Contact) -> StoreResult<bool> {
        self.delete_by_id(contact.id)
    }

    /// Deletes the contact with `id` under a single lock acquisition.
    pub fn delete_by_id(&self, id: ContactId) -> StoreResult<bool> {
        self.write("contact_delete", |repo| {
            repo.delete_contact_by_id(id)
                .map(|removed| (removed, removed))
        })
    }

    /// Reads one contact directly from storage.
    pub fn get(&self, id: ContactId) -> StoreResult<Option<Contact>> {
        let conn = self.lock()?;
        Ok(SqliteContactRepository::new_unchecked(&conn).get_contact(id)?)
    }

    /// Runs one write under the lock and republishes when rows changed.
    ///
    /// A committed write is reported as success even if re-reading the list
    /// fails; subscribers then catch up on the next successful write.
    fn write<T>(
        &self,
        event: &'static str,
        op: impl FnOnce(&SqliteContactRepository<'_>) -> RepoResult<(T, bool)>,
    ) -> StoreResult<T> {
        let conn = self.lock()?;
        let repo = SqliteContactRepository::new_unchecked(&conn);

        let (value, changed) = match op(&repo) {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!("event={event} module=store status=error error={err}");
                return Err(err.into());
            }
        };

        if !changed {
            info!("event={event} module=store status=noop");
            return Ok(value);
        }

        match repo.list_contacts() {
            Ok(fresh) => {
                let count = fresh.len();
                self.publish(fresh);
                info!("event={event} module=store status=ok contacts={count}");
            }
            Err(err) => warn!(
                "event={event} module=store status=stale error_code=refresh_failed error={err}"
            ),
        }

        Ok(value)
    }

    fn publish(&self, fresh: Vec<Contact>) {
        self.inner.contacts_tx.send_if_modified(|current| {
            if *current == fresh {
                return false;
            }
            *current = fresh;
            self.inner.revision.fetch_add(1, Ordering::SeqCst);
            true
        });
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.inner.conn.lock().map_err(|_| StoreError::LockPoisoned)
    }
}
