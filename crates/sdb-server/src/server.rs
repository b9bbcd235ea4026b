use std::sync::Arc;

use sdb_core::Database;
use sdb_store::{EntityStore, FileEntityStore, InMemoryEntityStore};
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::router::{build_router, SharedDatabase};

/// sdb HTTP server.
pub struct SdbServer {
    config: ServerConfig,
    db: SharedDatabase,
}

impl SdbServer {
    /// Open the backend named by `config` (file snapshot or in-memory).
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let store: Box<dyn EntityStore> = match &config.data_path {
            Some(path) => Box::new(FileEntityStore::open(path)?),
            None => Box::new(InMemoryEntityStore::new()),
        };
        Ok(Self::with_database(config, Arc::new(Database::new(store))))
    }

    pub fn with_database(config: ServerConfig, db: SharedDatabase) -> Self {
        Self { config, db }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn database(&self) -> &SharedDatabase {
        &self.db
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(Arc::clone(&self.db))
    }

    /// Start serving requests.
    pub async fn serve(self) -> ServerResult<()> {
        let app = self.router();
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        tracing::info!(
            "sdb server listening on {} ({})",
            self.config.bind_addr,
            match &self.config.data_path {
                Some(path) => path.display().to_string(),
                None => "in-memory".to_string(),
            }
        );
        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}
