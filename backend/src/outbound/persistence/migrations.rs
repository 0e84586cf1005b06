//! Embedded schema migrations for the optimisation tables.

use diesel::{Connection, PgConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Errors raised while applying migrations.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    /// Could not open a synchronous connection.
    #[error("failed to connect for migrations: {0}")]
    Connect(#[from] diesel::ConnectionError),
    /// A migration failed to apply.
    #[error("failed to apply migrations: {0}")]
    Apply(String),
    /// The blocking migration task panicked or was cancelled.
    #[error("migration task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Apply pending migrations on a blocking thread.
pub async fn run_pending_migrations(database_url: &str) -> Result<usize, MigrationError> {
    let database_url = database_url.to_owned();
    tokio::task::spawn_blocking(move || {
        let mut connection = PgConnection::establish(&database_url)?;
        let applied = connection
            .run_pending_migrations(MIGRATIONS)
            .map_err(|error| MigrationError::Apply(error.to_string()))?;
        Ok(applied.len())
    })
    .await?
}
