//! Database initialization and table definitions
//!
//! Records are stored as JSON-serialized strings keyed by u64 identifiers.
//! Two secondary index tables give efficient lookups of inquiries by the
//! property or user they reference, using composite keys that keep entries
//! in chronological order.

use chrono::{DateTime, Utc};
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use std::sync::Arc;

use crate::config::AppConfig;
use crate::error::ApiError;
use crate::model::Property;

/// Main table for property listings
///
/// Key: auto-assigned property id
/// Value: JSON-serialized Property
pub const TABLE_PROPERTIES: TableDefinition<u64, &str> = TableDefinition::new("properties_v1");

/// Main table for property-linked and general contact-form inquiries
pub const TABLE_INQUIRIES: TableDefinition<u64, &str> = TableDefinition::new("inquiries_v1");

/// Standalone contact-form records with a client-supplied inquiry type
pub const TABLE_GENERAL_INQUIRIES: TableDefinition<u64, &str> =
    TableDefinition::new("general_inquiries_v1");

/// Index of inquiries by the property they reference
///
/// Key: composite key `"{property_id:020}:{timestamp_micros}"`
/// Value: inquiry id in [`TABLE_INQUIRIES`]
///
/// The zero-padded id prefix keeps the lexicographic key order grouped by
/// property; the timestamp suffix keeps each group chronological and unique.
pub const TABLE_INQUIRY_PROPERTY_INDEX: TableDefinition<&str, u64> =
    TableDefinition::new("inquiry_property_index_v1");

/// Index of inquiries by the authenticated user who submitted them
///
/// Same composite-key layout as [`TABLE_INQUIRY_PROPERTY_INDEX`].
pub const TABLE_INQUIRY_USER_INDEX: TableDefinition<&str, u64> =
    TableDefinition::new("inquiry_user_index_v1");

/// Application state shared across all request handlers
#[derive(Clone)]
pub struct AppState {
    /// Thread-safe reference to the embedded database
    pub db: Arc<Database>,

    /// Explicit runtime configuration (base URL, upload directory, secrets)
    pub config: Arc<AppConfig>,
}

/// Builds the composite index key for an inquiry reference
pub fn index_key(referenced_id: u64, created_at: &DateTime<Utc>) -> String {
    format!("{:020}:{}", referenced_id, created_at.timestamp_micros())
}

/// Range bounds covering every index entry for one referenced id
///
/// ';' is the character after ':' in ASCII, so `start..end` spans exactly
/// the keys carrying this id prefix.
pub fn index_bounds(referenced_id: u64) -> (String, String) {
    (
        format!("{:020}:", referenced_id),
        format!("{:020};", referenced_id),
    )
}

/// Initializes the embedded database and creates all tables
///
/// Tables are opened once inside a write transaction so that later read
/// transactions never observe a missing table.
pub fn init_db(db_path: &str) -> Result<Database, redb::Error> {
    let db = Database::create(db_path)?;

    let write_txn = db.begin_write()?;
    {
        write_txn.open_table(TABLE_PROPERTIES)?;
        write_txn.open_table(TABLE_INQUIRIES)?;
        write_txn.open_table(TABLE_GENERAL_INQUIRIES)?;
        write_txn.open_table(TABLE_INQUIRY_PROPERTY_INDEX)?;
        write_txn.open_table(TABLE_INQUIRY_USER_INDEX)?;
    }
    write_txn.commit()?;

    Ok(db)
}

/// Reads every property record in id order
///
/// The query engine filters in memory; the property table is small enough
/// that a full scan is the straightforward access path.
pub fn scan_properties(db: &Database) -> Result<Vec<Property>, ApiError> {
    let read_txn = db.begin_read()?;
    let table = read_txn.open_table(TABLE_PROPERTIES)?;

    let mut properties = Vec::new();
    for entry in table.iter()? {
        let (_, value) = entry?;
        properties.push(serde_json::from_str(value.value())?);
    }

    Ok(properties)
}

/// Fetches a single property record by id
pub fn fetch_property(db: &Database, id: u64) -> Result<Option<Property>, ApiError> {
    let read_txn = db.begin_read()?;
    let table = read_txn.open_table(TABLE_PROPERTIES)?;

    match table.get(id)? {
        Some(guard) => Ok(Some(serde_json::from_str(guard.value())?)),
        None => Ok(None),
    }
}
