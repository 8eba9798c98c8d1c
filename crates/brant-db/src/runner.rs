use std::borrow::Cow;
use std::sync::Arc;

use brant_common::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::migrations::{Migration, REGISTRY};
use crate::store::{ApplyOutcome, MigrationStore};

/// One unit applied by a single run.
#[derive(Debug, Clone, Serialize)]
pub struct AppliedMigration {
    pub version: u32,
    pub name: &'static str,
}

/// Outcome of one successful run. Produced and discarded per invocation;
/// never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct MigrationReport {
    pub run_id: Uuid,
    pub applied: Vec<AppliedMigration>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MigrationStatus {
    pub schema_version: Option<u32>,
    pub applied: usize,
    pub pending: usize,
}

/// Applies pending migrations from a registry to a store, in ascending
/// version order.
///
/// The store is the only mutable collaborator; the registry is fixed at
/// construction so callers (and tests) decide exactly which units exist.
#[derive(Clone)]
pub struct Migrator {
    store: Arc<MigrationStore>,
    migrations: Cow<'static, [Migration]>,
}

impl Migrator {
    /// A runner over the authored registry.
    pub fn new(store: Arc<MigrationStore>) -> Self {
        Self::with_migrations(store, REGISTRY)
    }

    /// A runner over an explicit migration set.
    pub fn with_migrations(
        store: Arc<MigrationStore>,
        migrations: impl Into<Cow<'static, [Migration]>>,
    ) -> Self {
        Self {
            store,
            migrations: migrations.into(),
        }
    }

    pub fn store(&self) -> &MigrationStore {
        &self.store
    }

    /// Registered units not yet recorded as applied, ascending.
    pub fn pending(&self) -> Result<Vec<Migration>> {
        let applied = self.store.applied_versions()?;
        let mut pending: Vec<Migration> = self
            .migrations
            .iter()
            .filter(|m| !applied.contains(&m.version))
            .cloned()
            .collect();
        pending.sort_by_key(|m| m.version);
        Ok(pending)
    }

    /// Apply every pending unit, stopping at the first failure.
    ///
    /// Units another runner applied in the meantime are skipped, so repeated
    /// or overlapping invocations with nothing left to do are no-ops that
    /// still succeed.
    pub fn run(&self) -> Result<MigrationReport> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let pending = self.pending()?;

        if pending.is_empty() {
            info!("no pending migrations");
        }

        let mut applied = Vec::new();
        for migration in &pending {
            match self.store.apply(migration)? {
                ApplyOutcome::Applied => {
                    info!("applied migration {} ({})", migration.version, migration.name);
                    applied.push(AppliedMigration {
                        version: migration.version,
                        name: migration.name,
                    });
                }
                ApplyOutcome::AlreadyApplied => {
                    info!(
                        "migration {} ({}) already applied, skipping",
                        migration.version, migration.name
                    );
                }
            }
        }

        let finished_at = Utc::now();
        info!(
            "migration run {run_id} finished: {} unit(s) applied",
            applied.len()
        );

        Ok(MigrationReport {
            run_id,
            applied,
            started_at,
            finished_at,
        })
    }

    pub fn status(&self) -> Result<MigrationStatus> {
        let applied = self.store.applied_versions()?;
        let pending = self
            .migrations
            .iter()
            .filter(|m| !applied.contains(&m.version))
            .count();

        Ok(MigrationStatus {
            schema_version: applied.last().copied(),
            applied: applied.len(),
            pending,
        })
    }
}
