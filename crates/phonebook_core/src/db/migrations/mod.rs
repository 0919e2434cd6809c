//! Schema steps for the contact database.
//!
//! `PRAGMA user_version` records the last applied step. Steps are ordered by
//! version and pending ones run inside a single transaction, so a crash
//! mid-upgrade leaves the previous schema intact.

use crate::db::DbError;
use log::{debug, info};
use rusqlite::Connection;

/// `(version, label, sql)`; versions strictly increase.
const SCHEMA_STEPS: &[(u32, &str, &str)] = &[(
    1,
    "contacts",
    include_str!("0001_contacts.sql"),
)];

/// Schema version this build writes and expects.
pub fn latest_version() -> u32 {
    SCHEMA_STEPS.last().map_or(0, |&(version, _, _)| version)
}

/// Reads `PRAGMA user_version` from the connection.
pub fn schema_version(conn: &Connection) -> Result<u32, DbError> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}

/// Brings the connection up to [`latest_version`].
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the file is ahead of this build.
pub fn apply_migrations(conn: &mut Connection) -> Result<(), DbError> {
    let from_version = schema_version(conn)?;
    let to_version = latest_version();

    if from_version > to_version {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from_version,
            latest_supported: to_version,
        });
    }
    if from_version == to_version {
        debug!("event=db_migrate module=db status=noop version={from_version}");
        return Ok(());
    }

    let tx = conn.transaction()?;
    for &(version, label, sql) in SCHEMA_STEPS
        .iter()
        .skip_while(|&&(version, _, _)| version <= from_version)
    {
        tx.execute_batch(sql)?;
        tx.pragma_update(None, "user_version", version)?;
        debug!("event=db_migrate_step module=db status=ok version={version} step={label}");
    }
    tx.commit()?;

    info!("event=db_migrate module=db status=ok from_version={from_version} to_version={to_version}");
    Ok(())
}
