//! SQLite helpers shared by the record store and the settings store.

mod versioned_schema;

pub use versioned_schema::{Column, SqlType, Table, VersionedSchema, BASE_DB_VERSION};

use anyhow::{bail, Context, Result};
use rusqlite::Connection;
use std::path::Path;
use tracing::info;

/// Open (or create) a database at `db_path` against a list of versioned schemas.
///
/// New files get the latest schema. Existing files are validated against the
/// schema matching their stored version and migrated forward.
pub fn open_versioned<P: AsRef<Path>>(
    db_path: P,
    schemas: &'static [VersionedSchema],
    label: &str,
) -> Result<Connection> {
    let db_path = db_path.as_ref();
    let conn = if db_path.exists() {
        Connection::open(db_path)
            .with_context(|| format!("Failed to open {} database at {:?}", label, db_path))?
    } else {
        let conn = Connection::open(db_path)
            .with_context(|| format!("Failed to create {} database at {:?}", label, db_path))?;
        schemas.last().context("No schemas defined")?.create(&conn)?;
        info!("Created new {} database at {:?}", label, db_path);
        conn
    };

    let version = read_schema_version(&conn, label)?;
    if version >= schemas.len() {
        bail!(
            "{} database version {} is too new (max supported: {})",
            label,
            version,
            schemas.len() - 1
        );
    }

    schemas
        .get(version)
        .context("Failed to get schema")?
        .validate(&conn)?;
    migrate_if_needed(&conn, schemas, version, label)?;

    Ok(conn)
}

/// Create an in-memory database with the latest schema.
pub fn open_in_memory(schemas: &'static [VersionedSchema]) -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    schemas.last().context("No schemas defined")?.create(&conn)?;
    Ok(conn)
}

fn read_schema_version(conn: &Connection, label: &str) -> Result<usize> {
    let db_version = conn
        .query_row("PRAGMA user_version;", [], |row| row.get::<usize, i64>(0))
        .context("Failed to read database version")?
        - BASE_DB_VERSION as i64;

    if db_version < 0 {
        bail!(
            "{} database version {} is too old, does not contain base db version {}",
            label,
            db_version,
            BASE_DB_VERSION
        );
    }
    Ok(db_version as usize)
}

fn migrate_if_needed(
    conn: &Connection,
    schemas: &'static [VersionedSchema],
    current_version: usize,
    label: &str,
) -> Result<()> {
    let target_version = schemas.len() - 1;
    if current_version >= target_version {
        return Ok(());
    }

    info!(
        "Migrating {} database from version {} to {}",
        label, current_version, target_version
    );

    for schema in schemas.iter().skip(current_version + 1) {
        if let Some(migration_fn) = schema.migration {
            info!("Running {} migration to version {}", label, schema.version);
            migration_fn(conn)?;
        }
    }

    conn.execute(
        &format!("PRAGMA user_version = {}", BASE_DB_VERSION + target_version),
        [],
    )?;
    Ok(())
}

/// Whether `table` currently has a column named `column`.
pub fn table_has_column(conn: &Connection, table: &str, column: &str) -> Result<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({});", table))?;
    let names = stmt
        .query_map([], |row| row.get::<usize, String>(1))?
        .collect::<rusqlite::Result<Vec<String>>>()?;
    if names.is_empty() {
        bail!("Table {} does not exist", table);
    }
    Ok(names.iter().any(|name| name == column))
}
