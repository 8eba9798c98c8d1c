use std::borrow::Cow;
use std::sync::Arc;

use brant_common::{Error, Result};
use brant_config::AppConfig;
use brant_db::{Migration, MigrationStore, Migrator, REGISTRY};
use tokio::net::TcpListener;
use tracing::info;

use crate::router::build_router;
use crate::state::AppState;

/// The main gateway server that binds to a port and serves the migration API.
pub struct GatewayServer {
    config: AppConfig,
    migrations: Cow<'static, [Migration]>,
}

impl GatewayServer {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            migrations: Cow::Borrowed(REGISTRY),
        }
    }

    /// Serve an explicit migration set instead of the authored registry.
    pub fn with_migrations(mut self, migrations: impl Into<Cow<'static, [Migration]>>) -> Self {
        self.migrations = migrations.into();
        self
    }

    pub async fn run(self) -> Result<()> {
        let addr = format!("{}:{}", self.config.gateway.host, self.config.gateway.port);

        let store = self.open_store()?;
        let migrator = Migrator::with_migrations(Arc::new(store), self.migrations);
        let state = Arc::new(AppState::new(self.config, migrator));
        let app = build_router(state);

        let listener = TcpListener::bind(&addr).await?;
        info!("brant gateway listening on {addr}");

        axum::serve(listener, app)
            .await
            .map_err(|e| Error::Gateway(format!("server error: {e}")))?;

        Ok(())
    }

    fn open_store(&self) -> Result<MigrationStore> {
        let db_path = self.config.database_path();
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        MigrationStore::open(&db_path)
    }
}
