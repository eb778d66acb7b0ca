//! Record mirror contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist the full record sequence as one serialized slot payload.
//! - Reload and validate the persisted sequence at process start.
//!
//! # Invariants
//! - The whole collection is written on every save; there are no
//!   incremental diffs, so reload never needs merge logic.
//! - A save overwrites the slot in a single upsert statement; readers
//!   observe either the previous or the new payload, never a partial one.
//! - Loaded payloads that fail decoding or record validation surface as
//!   `CorruptData`, which hydration treats as an empty store.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::person::{Person, PersonValidationError};
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Slot key holding the serialized record collection.
pub const RECORDS_SLOT: &str = "@users";

pub type MirrorResult<T> = Result<T, MirrorError>;

/// Mirror persistence and decoding errors.
#[derive(Debug)]
pub enum MirrorError {
    Validation(PersonValidationError),
    Db(DbError),
    /// Stored payload exists but cannot be decoded into valid records.
    CorruptData { slot: String, message: String },
    /// Payload could not be serialized for writing.
    Encode(String),
    /// Connection has no applied migrations.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Migrations reported as applied, but a required table is missing.
    MissingRequiredTable(&'static str),
}

impl Display for MirrorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::CorruptData { slot, message } => {
                write!(f, "corrupt payload in slot `{slot}`: {message}")
            }
            Self::Encode(message) => write!(f, "failed to encode snapshot payload: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection not initialized: schema version {actual_version}, expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "required table `{table}` is missing")
            }
        }
    }
}

impl Error for MirrorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<PersonValidationError> for MirrorError {
    fn from(value: PersonValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for MirrorError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for MirrorError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Persistence contract for the record mirror.
pub trait MirrorRepository {
    /// Reads and decodes the stored collection.
    ///
    /// Returns an empty sequence when no prior payload exists.
    fn load_all(&self) -> MirrorResult<Vec<Person>>;

    /// Serializes and overwrites the stored collection.
    fn save_all(&self, records: &[Person]) -> MirrorResult<()>;
}

/// SQLite-backed mirror writing one JSON payload per slot.
pub struct SqliteMirrorRepository {
    conn: Connection,
    slot: String,
}

impl SqliteMirrorRepository {
    /// Wraps a migrated connection using the default `@users` slot.
    ///
    /// Rejects connections whose schema has not been initialized, so a
    /// mis-wired caller fails at construction instead of first use.
    pub fn try_new(conn: Connection) -> MirrorResult<Self> {
        Self::with_slot(conn, RECORDS_SLOT)
    }

    /// Wraps a migrated connection using a caller-chosen slot key.
    pub fn with_slot(conn: Connection, slot: impl Into<String>) -> MirrorResult<Self> {
        let actual_version =
            conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
        let expected_version = latest_version();
        if actual_version < expected_version {
            return Err(MirrorError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }

        let has_table = conn
            .query_row(
                "SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'snapshots';",
                [],
                |row| row.get::<_, String>(0),
            )
            .optional()?
            .is_some();
        if !has_table {
            return Err(MirrorError::MissingRequiredTable("snapshots"));
        }

        Ok(Self {
            conn,
            slot: slot.into(),
        })
    }

    /// Borrow of the underlying connection, for diagnostics.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl MirrorRepository for SqliteMirrorRepository {
    fn load_all(&self) -> MirrorResult<Vec<Person>> {
        let payload = self
            .conn
            .query_row(
                "SELECT payload FROM snapshots WHERE slot = ?1;",
                params![self.slot.as_str()],
                |row| row.get::<_, String>(0),
            )
            .optional()?;

        let Some(payload) = payload else {
            return Ok(Vec::new());
        };

        let records: Vec<Person> =
            serde_json::from_str(&payload).map_err(|err| MirrorError::CorruptData {
                slot: self.slot.clone(),
                message: err.to_string(),
            })?;

        for (index, person) in records.iter().enumerate() {
            person.validate().map_err(|err| MirrorError::CorruptData {
                slot: self.slot.clone(),
                message: format!("record {index} invalid: {err}"),
            })?;
            if records[..index].iter().any(|other| other.id == person.id) {
                return Err(MirrorError::CorruptData {
                    slot: self.slot.clone(),
                    message: format!("duplicate id {} at record {index}", person.id),
                });
            }
        }

        Ok(records)
    }

    fn save_all(&self, records: &[Person]) -> MirrorResult<()> {
        for person in records {
            person.validate()?;
        }

        let payload =
            serde_json::to_string(records).map_err(|err| MirrorError::Encode(err.to_string()))?;

        self.conn.execute(
            "INSERT INTO snapshots (slot, payload, updated_at)
             VALUES (?1, ?2, strftime('%s', 'now') * 1000)
             ON CONFLICT(slot) DO UPDATE SET
                payload = excluded.payload,
                updated_at = excluded.updated_at;",
            params![self.slot.as_str(), payload],
        )?;

        Ok(())
    }
}
