//! Database schema for the settings database.

use crate::sqlite_column;
use crate::sqlite_persistence::{SqlType, Table, VersionedSchema};

const SETTINGS_TABLE_V0: Table = Table {
    name: "settings",
    columns: &[
        sqlite_column!("key", &SqlType::Text, is_primary_key = true),
        sqlite_column!("value", &SqlType::Text, non_null = true),
        sqlite_column!("updated_at", &SqlType::Integer, non_null = true),
    ],
    indices: &[],
};

pub const SETTINGS_VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: &[SETTINGS_TABLE_V0],
    migration: None,
}];
