//! Contact repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide insert/update/delete/list APIs over the `contacts` table.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths validate name/phone before any SQL mutation.
//! - Read paths return rows as stored; legacy rows are not re-validated.
//! - Listing is ordered by `name ASC` (BINARY collation), then `id ASC`.

use crate::db::migrations::{latest_version, schema_version};
use crate::db::DbError;
use crate::model::contact::{validate_contact_fields, Contact, ContactId, ContactValidationError};
use log::debug;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const CONTACT_SELECT_SQL: &str = "SELECT
    id,
    name,
    phoneNumber
FROM contacts";

const REQUIRED_CONTACT_COLUMNS: &[&str] = &["id", "name", "phoneNumber"];

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for contact persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ContactValidationError),
    Db(DbError),
    NotFound(ContactId),
    InvalidData(String),
    /// Connection was not bootstrapped through `db::open_db*`.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "contact not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted contact data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}; open it via db::open_db"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table missing: {table}"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column missing: {table}.{column}")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ContactValidationError> for RepoError {
    fn from(value: ContactValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for contact CRUD operations.
pub trait ContactRepository {
    /// Inserts a new contact and returns its storage-assigned id.
    fn insert_contact(&self, name: &str, phone_number: &str) -> RepoResult<ContactId>;
    /// Replaces name/phone of the row with `contact.id`.
    ///
    /// Returns `RepoError::NotFound` when no such row exists.
    fn update_contact(&self, contact: &Contact) -> RepoResult<()>;
    /// Removes the row with `contact.id`.
    ///
    /// Returns `false` when nothing was removed.
    fn delete_contact(&self, contact: &Contact) -> RepoResult<bool> {
        self.delete_contact_by_id(contact.id)
    }
    /// Removes the row with `id`; `false` when nothing was removed.
    fn delete_contact_by_id(&self, id: ContactId) -> RepoResult<bool>;
    fn get_contact(&self, id: ContactId) -> RepoResult<Option<Contact>>;
    /// Lists all contacts ordered by name.
    fn list_contacts(&self) -> RepoResult<Vec<Contact>>;
}

/// SQLite-backed contact repository.
pub struct SqliteContactRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteContactRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when `user_version` is not the latest.
    /// - `MissingRequiredTable`/`MissingRequiredColumn` when the schema
    ///   was tampered with.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }

    /// Skips readiness checks for connections the caller already verified.
    pub(crate) fn new_unchecked(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ContactRepository for SqliteContactRepository<'_> {
    fn insert_contact(&self, name: &str, phone_number: &str) -> RepoResult<ContactId> {
        validate_contact_fields(name, phone_number)?;

        self.conn.execute(
            "INSERT INTO contacts (name, phoneNumber) VALUES (?1, ?2);",
            params![name, phone_number],
        )?;
        let id = self.conn.last_insert_rowid();
        debug!("event=contact_insert module=repo status=ok contact_id={id}");
        Ok(id)
    }

    fn update_contact(&self, contact: &Contact) -> RepoResult<()> {
        contact.validate()?;

        let changed = self.conn.execute(
            "UPDATE contacts
             SET
                name = ?1,
                phoneNumber = ?2
             WHERE id = ?3;",
            params![
                contact.name.as_str(),
                contact.phone_number.as_str(),
                contact.id
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(contact.id));
        }

        debug!(
            "event=contact_update module=repo status=ok contact_id={}",
            contact.id
        );
        Ok(())
    }

    fn delete_contact_by_id(&self, id: ContactId) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM contacts WHERE id = ?1;", [id])?;
        debug!(
            "event=contact_delete module=repo status=ok contact_id={id} removed={}",
            changed > 0
        );
        Ok(changed > 0)
    }

    fn get_contact(&self, id: ContactId) -> RepoResult<Option<Contact>> {
        self.conn
            .query_row(
                &format!("{CONTACT_SELECT_SQL} WHERE id = ?1;"),
                [id],
                |row| Ok(parse_contact_row(row)),
            )
            .optional()?
            .transpose()
    }

    fn list_contacts(&self) -> RepoResult<Vec<Contact>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CONTACT_SELECT_SQL} ORDER BY name ASC, id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut contacts = Vec::new();

        while let Some(row) = rows.next()? {
            contacts.push(parse_contact_row(row)?);
        }

        Ok(contacts)
    }
}

fn parse_contact_row(row: &Row<'_>) -> RepoResult<Contact> {
    let id: ContactId = row.get("id")?;
    let name: Option<String> = row.get("name")?;
    let phone_number: Option<String> = row.get("phoneNumber")?;

    match (name, phone_number) {
        (Some(name), Some(phone_number)) => Ok(Contact {
            id,
            name,
            phone_number,
        }),
        _ => Err(RepoError::InvalidData(format!(
            "contact {id} has NULL name or phoneNumber"
        ))),
    }
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = schema_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, "contacts")? {
        return Err(RepoError::MissingRequiredTable("contacts"));
    }

    for &column in REQUIRED_CONTACT_COLUMNS {
        if !table_has_column(conn, "contacts", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "contacts",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
