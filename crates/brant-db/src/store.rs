use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use brant_common::{Error, Result};
use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params};
use tracing::info;

use crate::migrations::Migration;

/// Persistent bookkeeping and execution engine for schema migrations.
///
/// Applied versions are recorded in a `_migrations` table next to the
/// application schema. Each migration unit executes inside its own IMMEDIATE
/// transaction together with its bookkeeping insert, so a failed unit leaves
/// no trace and a concurrent runner cannot apply the same unit twice.
pub struct MigrationStore {
    conn: Mutex<Connection>,
}

/// What `apply` did with a single unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    AlreadyApplied,
}

const BOOKKEEPING_SQL: &str = "
CREATE TABLE IF NOT EXISTS _migrations (
    version INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);
";

impl MigrationStore {
    pub fn open(db_path: &Path) -> Result<Self> {
        info!("opening migration store at {}", db_path.display());
        let conn = Connection::open(db_path)
            .map_err(|e| Error::Database(format!("failed to open database: {e}")))?;
        Self::init(conn)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::Database(format!("failed to open in-memory database: {e}")))?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            "PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON; PRAGMA busy_timeout=5000;",
        )
        .map_err(|e| Error::Database(format!("failed to set pragmas: {e}")))?;

        conn.execute_batch(BOOKKEEPING_SQL)
            .map_err(|e| Error::Database(format!("failed to create bookkeeping table: {e}")))?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn connection(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::Database("migration store lock poisoned".into()))
    }

    /// Apply one migration unit.
    ///
    /// Takes an IMMEDIATE transaction, re-checks the bookkeeping row under
    /// that transaction, runs the unit's SQL batch and records the version.
    /// Any error rolls the whole unit back, bookkeeping included.
    pub fn apply(&self, migration: &Migration) -> Result<ApplyOutcome> {
        let mut conn = self.connection()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|e| Error::Database(format!("failed to begin transaction: {e}")))?;

        let already: Option<i64> = tx
            .query_row(
                "SELECT 1 FROM _migrations WHERE version = ?1",
                params![migration.version],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| Error::Database(format!("failed to check bookkeeping: {e}")))?;
        if already.is_some() {
            return Ok(ApplyOutcome::AlreadyApplied);
        }

        tx.execute_batch(migration.sql)
            .map_err(|e| Error::MigrationFailed {
                version: migration.version,
                name: migration.name.to_string(),
                detail: e.to_string(),
            })?;

        tx.execute(
            "INSERT INTO _migrations (version, name) VALUES (?1, ?2)",
            params![migration.version, migration.name],
        )
        .map_err(|e| {
            Error::Database(format!(
                "failed to record migration {}: {e}",
                migration.version
            ))
        })?;

        tx.commit()
            .map_err(|e| Error::Database(format!("failed to commit migration: {e}")))?;

        Ok(ApplyOutcome::Applied)
    }

    /// Versions recorded as applied, ascending.
    pub fn applied_versions(&self) -> Result<Vec<u32>> {
        let conn = self.connection()?;
        let mut stmt = conn
            .prepare("SELECT version FROM _migrations ORDER BY version")
            .map_err(|e| Error::Database(format!("failed to prepare query: {e}")))?;

        let rows = stmt
            .query_map([], |row| row.get(0))
            .map_err(|e| Error::Database(format!("failed to query applied versions: {e}")))?;

        let mut versions = Vec::new();
        for row in rows {
            versions
                .push(row.map_err(|e| Error::Database(format!("failed to read version: {e}")))?);
        }
        Ok(versions)
    }

    pub fn is_applied(&self, version: u32) -> Result<bool> {
        let conn = self.connection()?;
        let row: Option<i64> = conn
            .query_row(
                "SELECT 1 FROM _migrations WHERE version = ?1",
                params![version],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| Error::Database(format!("failed to check version: {e}")))?;
        Ok(row.is_some())
    }

    /// Highest applied version, or `None` on a fresh database.
    pub fn schema_version(&self) -> Result<Option<u32>> {
        let conn = self.connection()?;
        conn.query_row("SELECT MAX(version) FROM _migrations", [], |row| row.get(0))
            .map_err(|e| Error::Database(format!("failed to read schema version: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CREATE_ACCOUNTS: Migration = Migration {
        version: 1,
        name: "create_accounts",
        sql: "CREATE TABLE accounts (id INTEGER PRIMARY KEY, email TEXT NOT NULL);",
    };

    // Second statement references a table that does not exist, so the batch
    // fails after the first statement succeeded.
    const BROKEN_UNIT: Migration = Migration {
        version: 2,
        name: "broken_unit",
        sql: "CREATE TABLE broken_partial (id INTEGER PRIMARY KEY);
              INSERT INTO missing_table VALUES (1);",
    };

    fn table_exists(store: &MigrationStore, name: &str) -> bool {
        let conn = store.connection().unwrap();
        let row: Option<i64> = conn
            .query_row(
                "SELECT 1 FROM sqlite_master WHERE type='table' AND name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()
            .unwrap();
        row.is_some()
    }

    #[test]
    fn fresh_store_has_no_applied_versions() {
        let store = MigrationStore::in_memory().unwrap();
        assert!(store.applied_versions().unwrap().is_empty());
        assert_eq!(store.schema_version().unwrap(), None);
    }

    #[test]
    fn apply_records_version_and_name() {
        let store = MigrationStore::in_memory().unwrap();
        assert_eq!(
            store.apply(&CREATE_ACCOUNTS).unwrap(),
            ApplyOutcome::Applied
        );

        assert_eq!(store.applied_versions().unwrap(), vec![1]);
        assert!(store.is_applied(1).unwrap());
        assert!(table_exists(&store, "accounts"));

        let conn = store.connection().unwrap();
        let (name, applied_at): (String, String) = conn
            .query_row(
                "SELECT name, applied_at FROM _migrations WHERE version = 1",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert_eq!(name, "create_accounts");
        assert!(!applied_at.is_empty());
    }

    #[test]
    fn reapply_is_skipped() {
        let store = MigrationStore::in_memory().unwrap();
        store.apply(&CREATE_ACCOUNTS).unwrap();
        assert_eq!(
            store.apply(&CREATE_ACCOUNTS).unwrap(),
            ApplyOutcome::AlreadyApplied
        );
        assert_eq!(store.applied_versions().unwrap(), vec![1]);
    }

    #[test]
    fn failed_unit_rolls_back_completely() {
        let store = MigrationStore::in_memory().unwrap();
        store.apply(&CREATE_ACCOUNTS).unwrap();

        let err = store.apply(&BROKEN_UNIT).unwrap_err();
        match err {
            brant_common::Error::MigrationFailed { version, name, .. } => {
                assert_eq!(version, 2);
                assert_eq!(name, "broken_unit");
            }
            other => panic!("expected MigrationFailed, got: {other:?}"),
        }

        // The unit's first statement must not have survived the rollback.
        assert!(!table_exists(&store, "broken_partial"));
        assert_eq!(store.applied_versions().unwrap(), vec![1]);
        assert!(!store.is_applied(2).unwrap());
    }

    #[test]
    fn bookkeeping_survives_reopen() {
        let dir = std::env::temp_dir().join(format!("brant-store-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let db_path = dir.join("reopen.db");
        let _ = std::fs::remove_file(&db_path);

        {
            let store = MigrationStore::open(&db_path).unwrap();
            store.apply(&CREATE_ACCOUNTS).unwrap();
        }

        let store = MigrationStore::open(&db_path).unwrap();
        assert_eq!(store.applied_versions().unwrap(), vec![1]);
        assert_eq!(store.schema_version().unwrap(), Some(1));
    }
}
