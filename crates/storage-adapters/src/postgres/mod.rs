//! # PostgreSQL adapter
//!
//! Implements every repository port on [`PgStore`]. Rows are mapped through
//! private `FromRow` structs so the domain crate stays free of sqlx.
//! Multi-statement writes (full replaces, list creation) run inside one
//! transaction: a failure between the delete and the insert rolls back to
//! the previous set instead of leaving it empty.

mod activity;
mod lists;
mod rankings;
mod reviews;
mod users;


use std::time::Duration;

use domains::errors::DomainError;
use domains::models::MediaType;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{error, info};

/// Connection pool tuning.
#[derive(Debug, Clone)]
pub struct PoolSettings {
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 10,
            acquire_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(600),
        }
    }
}

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(url: &str, settings: &PoolSettings) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(settings.acquire_timeout)
            .idle_timeout(settings.idle_timeout)
            .connect(url)
            .await?;
        info!(max_connections = settings.max_connections, "connected to PostgreSQL");
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies the embedded migrations.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Translates a driver error into the port error.
///
/// Unique violations become `Conflict` (services rely on this to detect
/// toggle/upsert races); everything else is logged and hidden.
pub(crate) fn db_error(err: sqlx::Error) -> DomainError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            DomainError::Conflict(db.constraint().unwrap_or("unique constraint").to_owned())
        }
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
            DomainError::not_found("referenced record")
        }
        _ => {
            error!(error = %err, "database failure");
            DomainError::internal("database failure")
        }
    }
}

pub(crate) fn media_type(raw: &str) -> Result<MediaType, DomainError> {
    raw.parse()
        .map_err(|_| DomainError::internal(format!("unknown media type {raw:?} in database")))
}
