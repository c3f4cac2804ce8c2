//! SQLite-backed closed-position store.

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnection, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use tracing::info;

use super::{normalize_id, ClosedPositionStore, StoreError};

/// Durable store for the closed-position set, shared across sessions.
#[derive(Debug, Clone)]
pub struct SqliteClosedPositionStore {
    pool: SqlitePool,
}

impl SqliteClosedPositionStore {
    /// Open (creating if needed) the database at `db_path` and run the
    /// schema migration.
    pub async fn open(db_path: &str) -> Result<Self, StoreError> {
        if let Some(parent) = Path::new(db_path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).ok();
            }
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .after_connect(|conn, _meta| Box::pin(async move { configure_pragmas_conn(conn).await }))
            .connect(&format!("sqlite:{}?mode=rwc", db_path))
            .await?;

        run_migrations(&pool).await?;

        info!("Closed-position store initialized at {}", db_path);
        Ok(Self { pool })
    }
}

async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let schema_sql = include_str!("schema.sql");

    for statement in schema_sql.split(';') {
        let trimmed = statement.trim();
        if !trimmed.is_empty() {
            sqlx::query(trimmed).execute(pool).await?;
        }
    }

    Ok(())
}

async fn configure_pragmas_conn(conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    // journal_mode returns the actual mode set; must use fetch to get result
    sqlx::query("PRAGMA journal_mode = WAL")
        .fetch_one(&mut *conn)
        .await?;
    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&mut *conn)
        .await?;
    sqlx::query("PRAGMA synchronous = NORMAL")
        .execute(&mut *conn)
        .await?;

    Ok(())
}

#[async_trait]
impl ClosedPositionStore for SqliteClosedPositionStore {
    async fn contains(&self, position_id: &str) -> Result<bool, StoreError> {
        let row: Option<(i64,)> =
            sqlx::query_as("SELECT 1 FROM closed_positions WHERE position_id = ?")
                .bind(normalize_id(position_id))
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.is_some())
    }

    async fn insert(&self, position_id: &str) -> Result<(), StoreError> {
        sqlx::query("INSERT OR IGNORE INTO closed_positions (position_id) VALUES (?)")
            .bind(normalize_id(position_id))
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
