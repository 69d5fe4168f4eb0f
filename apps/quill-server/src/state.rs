//! Application state - shared across all handlers.

use std::sync::Arc;

use quill_core::ports::{CommentRepository, PasswordService, PostRepository, UserRepository};
use quill_infra::InMemoryStore;

use crate::templates::Templates;

#[cfg(feature = "database")]
use quill_infra::{DatabaseConfig, SeaCommentRepository, SeaPostRepository, SeaUserRepository};

/// Failures while assembling the application state.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("database unavailable: {0}")]
    Database(String),

    #[error("migration failed: {0}")]
    Migration(String),
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub passwords: Arc<dyn PasswordService>,
    pub templates: Arc<Templates>,
}

impl AppState {
    /// State backed by the in-memory store. Data is lost on restart.
    pub fn in_memory(templates: Templates, passwords: Arc<dyn PasswordService>) -> Self {
        let store = Arc::new(InMemoryStore::new());

        Self {
            users: store.clone(),
            posts: store.clone(),
            comments: store,
            passwords,
            templates: Arc::new(templates),
        }
    }

    /// Connect to the configured database, optionally bringing its schema up to date.
    #[cfg(feature = "database")]
    pub async fn connect(
        config: &DatabaseConfig,
        auto_migrate: bool,
        templates: Templates,
        passwords: Arc<dyn PasswordService>,
    ) -> Result<Self, StartupError> {
        use migration::{Migrator, MigratorTrait};

        let conn = quill_infra::database::connect(config)
            .await
            .map_err(|e| StartupError::Database(e.to_string()))?;

        if auto_migrate {
            Migrator::up(&conn, None)
                .await
                .map_err(|e| StartupError::Migration(e.to_string()))?;
            tracing::info!("Database schema is up to date");
        }

        let conn = Arc::new(conn);
        Ok(Self {
            users: Arc::new(SeaUserRepository::new(conn.clone())),
            posts: Arc::new(SeaPostRepository::new(conn.clone())),
            comments: Arc::new(SeaCommentRepository::new(conn)),
            passwords,
            templates: Arc::new(templates),
        })
    }
}
