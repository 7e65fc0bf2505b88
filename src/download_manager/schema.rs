//! Database schema for the MMS notification records.
//!
//! Version 1 adds the optional `sub_id` (subscription id) column. Databases
//! still at version 0 lack it until migrated, which is what the capability
//! probe looks for.

use anyhow::Result;
use rusqlite::Connection;

use crate::sqlite_column;
use crate::sqlite_persistence::{SqlType, Table, VersionedSchema};

pub const MMS_NOTIFICATIONS_TABLE: &str = "mms_notifications";

/// Column probed to decide whether subscription ids can be queried.
pub const SUBSCRIPTION_ID_COLUMN: &str = "sub_id";

const MMS_NOTIFICATIONS_TABLE_V0: Table = Table {
    name: MMS_NOTIFICATIONS_TABLE,
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("status", &SqlType::Integer),
        sqlite_column!("expiry", &SqlType::Integer, non_null = true),
        sqlite_column!("subject", &SqlType::Text),
        sqlite_column!("created_at", &SqlType::Integer, non_null = true),
    ],
    indices: &[("idx_mms_notifications_status", "status")],
};

const MMS_NOTIFICATIONS_TABLE_V1: Table = Table {
    name: MMS_NOTIFICATIONS_TABLE,
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("status", &SqlType::Integer),
        sqlite_column!("expiry", &SqlType::Integer, non_null = true),
        sqlite_column!("subject", &SqlType::Text),
        sqlite_column!("created_at", &SqlType::Integer, non_null = true),
        sqlite_column!("sub_id", &SqlType::Integer),
    ],
    indices: &[("idx_mms_notifications_status", "status")],
};

fn migrate_v0_to_v1(conn: &Connection) -> Result<()> {
    conn.execute(
        "ALTER TABLE mms_notifications ADD COLUMN sub_id INTEGER",
        [],
    )?;
    Ok(())
}

pub const MMS_NOTIFICATIONS_VERSIONED_SCHEMAS: &[VersionedSchema] = &[
    VersionedSchema {
        version: 0,
        tables: &[MMS_NOTIFICATIONS_TABLE_V0],
        migration: None,
    },
    VersionedSchema {
        version: 1,
        tables: &[MMS_NOTIFICATIONS_TABLE_V1],
        migration: Some(migrate_v0_to_v1),
    },
];
