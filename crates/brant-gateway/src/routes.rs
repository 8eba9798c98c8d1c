use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;
use brant_common::Error;
use serde_json::json;
use tracing::{error, info};

use crate::error::ApiError;
use crate::state::SharedState;

/// Liveness probe.
pub async fn health() -> &'static str {
    "ok"
}

/// Current bookkeeping status of the configured database.
pub async fn status(State(state): State<SharedState>) -> Result<impl IntoResponse, ApiError> {
    let migrator = state.migrator.clone();
    let status = tokio::task::spawn_blocking(move || migrator.status())
        .await
        .map_err(|e| Error::Gateway(format!("status task failed: {e}")))??;

    Ok(Json(json!({
        "status": "running",
        "database": state.config.database_path().display().to_string(),
        "schema_version": status.schema_version,
        "applied": status.applied,
        "pending": status.pending,
    })))
}

/// Apply all pending migrations to the configured database.
///
/// The run executes off the async executor; the request waits until it
/// completes or fails. On failure the full detail is logged exactly once
/// here, then an opaque error status goes back to the caller.
pub async fn migrate(State(state): State<SharedState>) -> Result<&'static str, ApiError> {
    let migrator = state.migrator.clone();
    let result = tokio::task::spawn_blocking(move || migrator.run())
        .await
        .map_err(|e| Error::Gateway(format!("migration task failed: {e}")))?;

    match result {
        Ok(report) => {
            info!(
                run_id = %report.run_id,
                applied = report.applied.len(),
                "migration run succeeded"
            );
            Ok("Migrated!")
        }
        Err(e) => {
            error!(detail = ?e, "migration run failed");
            Err(ApiError(e))
        }
    }
}
