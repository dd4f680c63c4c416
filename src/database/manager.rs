use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

/// Errors from the document store
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl DatabaseError {
    /// True when the store could not be reached at all, as opposed to a failed query.
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            DatabaseError::Sqlx(
                sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) | sqlx::Error::Tls(_)
            )
        )
    }
}

const SCHEMA_STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS accounts (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS tickets (
        id UUID PRIMARY KEY,
        user_id UUID NOT NULL REFERENCES accounts(id),
        product TEXT NOT NULL,
        description TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'new' CHECK (status IN ('new', 'open', 'closed')),
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS tickets_user_id_idx ON tickets (user_id)",
];

/// Builds the connection pool for the configured database
pub struct DatabaseManager;

impl DatabaseManager {
    pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        let url = config
            .url
            .as_deref()
            .ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await?;

        info!("Created database pool (max {} connections)", config.max_connections);
        Ok(pool)
    }

    /// Create tables and indexes if they do not exist yet. Safe to run on every start.
    pub async fn ensure_schema(pool: &PgPool) -> Result<(), DatabaseError> {
        for statement in SCHEMA_STATEMENTS {
            sqlx::query(statement).execute(pool).await?;
        }
        info!("Database schema ready");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn connect_requires_url() {
        let config = DatabaseConfig {
            url: None,
            max_connections: 1,
            connection_timeout: 1,
        };
        let err = DatabaseManager::connect(&config).await.unwrap_err();
        assert!(matches!(err, DatabaseError::ConfigMissing("DATABASE_URL")));
    }

    #[test]
    fn pool_timeout_is_connection_error() {
        assert!(DatabaseError::Sqlx(sqlx::Error::PoolTimedOut).is_connection_error());
        assert!(!DatabaseError::QueryError("boom".into()).is_connection_error());
    }
}
