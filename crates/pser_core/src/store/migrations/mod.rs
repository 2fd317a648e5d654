//! Primary store schema versions.
//!
//! # Invariants
//! - `version` values are strictly increasing.
//! - Migrations only create missing objects; rows survive every bump.
//! - Applied version is mirrored to `PRAGMA user_version`.

use crate::store::StoreFault;
use log::info;
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        sql: include_str!("0001_init.sql"),
    },
    Migration {
        version: 2,
        sql: include_str!("0002_lookup_indexes.sql"),
    },
];

/// Returns the schema version this binary writes.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Brings the schema up to [`latest_version`] in one transaction.
pub fn apply_migrations(conn: &mut Connection) -> Result<(), StoreFault> {
    let current = current_user_version(conn)?;
    let latest = latest_version();

    if current > latest {
        return Err(StoreFault::UnsupportedSchemaVersion {
            db_version: current,
            latest_supported: latest,
        });
    }
    if current == latest {
        return Ok(());
    }

    let pending = pending_migrations(current);
    let tx = conn.transaction()?;
    for migration in pending {
        tx.execute_batch(migration.sql)?;
        tx.pragma_update(None, "user_version", migration.version)?;
    }
    tx.commit()?;

    info!(
        "event=schema_migrate module=store status=ok from_version={current} to_version={latest} steps={}",
        pending.len()
    );
    Ok(())
}

/// Migrations newer than `current`, in ascending order.
fn pending_migrations(current: u32) -> &'static [Migration] {
    let start = MIGRATIONS.partition_point(|migration| migration.version <= current);
    &MIGRATIONS[start..]
}

pub(crate) fn current_user_version(conn: &Connection) -> Result<u32, StoreFault> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::{apply_migrations, current_user_version, latest_version, pending_migrations};
    use rusqlite::Connection;

    #[test]
    fn pending_migrations_skip_applied_versions() {
        assert_eq!(pending_migrations(0).len(), 2);
        assert_eq!(pending_migrations(1)[0].version, 2);
        assert!(pending_migrations(latest_version()).is_empty());
    }

    #[test]
    fn applying_twice_is_a_noop() {
        let mut conn = Connection::open_in_memory().unwrap();
        apply_migrations(&mut conn).unwrap();
        apply_migrations(&mut conn).unwrap();
        assert_eq!(current_user_version(&conn).unwrap(), latest_version());
    }
}
