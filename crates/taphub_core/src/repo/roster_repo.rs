//! Roster store contract and SQLite implementation.
//!
//! # Responsibility
//! - Resolve or create locations by name.
//! - Load persisted item names and apply per-location diffs atomically.
//!
//! # Invariants
//! - `get_or_create_location` is idempotent for the same name.
//! - `apply_changes` runs in one immediate transaction.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::roster::{Item, Location, LocationId};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const LOCATION_SELECT_SQL: &str = "SELECT location_uuid, name, created_at FROM locations";

const ITEM_SELECT_SQL: &str = "SELECT
    item_uuid,
    location_uuid,
    name,
    first_seen_at
FROM items";

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors from roster store operations.
#[derive(Debug)]
pub enum StoreError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Location name is blank after trim.
    InvalidLocationName,
    /// Handle refers to a location that no longer exists.
    LocationNotFound(LocationId),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Persisted data cannot be converted to a valid read model.
    InvalidData(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidLocationName => write!(f, "location name must not be blank"),
            Self::LocationNotFound(id) => write!(f, "location not found: {id}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "roster store requires schema version {expected_version}, got {actual_version}"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted roster data: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Store contract consumed by the poll cycle.
pub trait RosterStore {
    /// Returns the location named `name`, creating it on first sight.
    fn get_or_create_location(&self, name: &str) -> StoreResult<Location>;
    /// Returns the names currently persisted for `location`.
    fn load_current_items(&self, location: &Location) -> StoreResult<BTreeSet<String>>;
    /// Deletes `removed` and inserts `added` as one unit.
    ///
    /// New items get `first_seen_at` set to the time of application, in epoch
    /// milliseconds truncated to the second.
    fn apply_changes(
        &self,
        location: &Location,
        added: &BTreeSet<String>,
        removed: &BTreeSet<String>,
    ) -> StoreResult<()>;
    /// Lists all known locations ordered by name.
    fn list_locations(&self) -> StoreResult<Vec<Location>>;
    /// Lists persisted items of `location` ordered by name.
    fn list_items(&self, location: &Location) -> StoreResult<Vec<Item>>;
}

impl<S: RosterStore + ?Sized> RosterStore for &S {
    fn get_or_create_location(&self, name: &str) -> StoreResult<Location> {
        (**self).get_or_create_location(name)
    }

    fn load_current_items(&self, location: &Location) -> StoreResult<BTreeSet<String>> {
        (**self).load_current_items(location)
    }

    fn apply_changes(
        &self,
        location: &Location,
        added: &BTreeSet<String>,
        removed: &BTreeSet<String>,
    ) -> StoreResult<()> {
        (**self).apply_changes(location, added, removed)
    }

    fn list_locations(&self) -> StoreResult<Vec<Location>> {
        (**self).list_locations()
    }

    fn list_items(&self, location: &Location) -> StoreResult<Vec<Item>> {
        (**self).list_items(location)
    }
}

/// SQLite-backed roster store.
pub struct SqliteRosterStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRosterStore<'conn> {
    /// Creates a store from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        let expected_version = latest_version();
        let actual_version = current_user_version(conn)?;
        if actual_version != expected_version {
            return Err(StoreError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }
        Ok(Self { conn })
    }
}

impl RosterStore for SqliteRosterStore<'_> {
    fn get_or_create_location(&self, name: &str) -> StoreResult<Location> {
        if name.trim().is_empty() {
            return Err(StoreError::InvalidLocationName);
        }

        self.conn.execute(
            "INSERT INTO locations (location_uuid, name, created_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(name) DO NOTHING;",
            params![Uuid::new_v4().to_string(), name],
        )?;

        let mut stmt = self
            .conn
            .prepare(&format!("{LOCATION_SELECT_SQL} WHERE name = ?1;"))?;
        let mut rows = stmt.query([name])?;
        match rows.next()? {
            Some(row) => parse_location_row(row),
            None => Err(StoreError::InvalidData(format!(
                "location `{name}` missing right after insert"
            ))),
        }
    }

    fn load_current_items(&self, location: &Location) -> StoreResult<BTreeSet<String>> {
        ensure_location_exists(self.conn, location.uuid)?;

        let mut stmt = self
            .conn
            .prepare("SELECT name FROM items WHERE location_uuid = ?1;")?;
        let names = stmt
            .query_map([location.uuid.to_string()], |row| row.get::<_, String>(0))?
            .collect::<Result<BTreeSet<_>, _>>()?;
        Ok(names)
    }

    fn apply_changes(
        &self,
        location: &Location,
        added: &BTreeSet<String>,
        removed: &BTreeSet<String>,
    ) -> StoreResult<()> {
        if added.is_empty() && removed.is_empty() {
            return Ok(());
        }

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        ensure_location_exists(&tx, location.uuid)?;

        for name in removed {
            tx.execute(
                "DELETE FROM items WHERE location_uuid = ?1 AND name = ?2;",
                params![location.uuid.to_string(), name],
            )?;
        }

        for name in added {
            tx.execute(
                "INSERT INTO items (item_uuid, location_uuid, name, first_seen_at)
                 VALUES (?1, ?2, ?3, (strftime('%s', 'now') * 1000));",
                params![Uuid::new_v4().to_string(), location.uuid.to_string(), name],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    fn list_locations(&self) -> StoreResult<Vec<Location>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{LOCATION_SELECT_SQL} ORDER BY name ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut locations = Vec::new();
        while let Some(row) = rows.next()? {
            locations.push(parse_location_row(row)?);
        }
        Ok(locations)
    }

    fn list_items(&self, location: &Location) -> StoreResult<Vec<Item>> {
        ensure_location_exists(self.conn, location.uuid)?;

        let mut stmt = self.conn.prepare(&format!(
            "{ITEM_SELECT_SQL} WHERE location_uuid = ?1 ORDER BY name ASC;"
        ))?;
        let mut rows = stmt.query([location.uuid.to_string()])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_item_row(row)?);
        }
        Ok(items)
    }
}

fn ensure_location_exists(conn: &Connection, location_uuid: LocationId) -> StoreResult<()> {
    let found = conn
        .query_row(
            "SELECT 1 FROM locations WHERE location_uuid = ?1;",
            [location_uuid.to_string()],
            |row| row.get::<_, i64>(0),
        )
        .optional()?;
    match found {
        Some(_) => Ok(()),
        None => Err(StoreError::LocationNotFound(location_uuid)),
    }
}

fn parse_location_row(row: &Row<'_>) -> StoreResult<Location> {
    let uuid_text: String = row.get("location_uuid")?;
    let name: String = row.get("name")?;
    if name.trim().is_empty() {
        return Err(StoreError::InvalidData(format!(
            "blank name for location `{uuid_text}`"
        )));
    }

    Ok(Location {
        uuid: parse_uuid(&uuid_text, "locations.location_uuid")?,
        name,
        created_at: row.get("created_at")?,
    })
}

fn parse_item_row(row: &Row<'_>) -> StoreResult<Item> {
    let item_uuid: String = row.get("item_uuid")?;
    let location_uuid: String = row.get("location_uuid")?;

    Ok(Item {
        uuid: parse_uuid(&item_uuid, "items.item_uuid")?,
        location_uuid: parse_uuid(&location_uuid, "items.location_uuid")?,
        name: row.get("name")?,
        first_seen_at: row.get("first_seen_at")?,
    })
}

fn parse_uuid(value: &str, column: &'static str) -> StoreResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| StoreError::InvalidData(format!("invalid uuid `{value}` in {column}")))
}
