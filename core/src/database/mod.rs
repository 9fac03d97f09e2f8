//! Database module
//!
//! SQLite connection handling and schema migrations for the
//! `SqliteBackend` key-value table.

pub mod schema;

pub use schema::initialize_database;

use crate::error::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Connections for the store: the persistence writer plus startup loads.
const STORE_POOL_SIZE: u32 = 2;

/// Open a pool on the store file: WAL journal, `NORMAL` sync, 5s busy timeout
async fn connect(db_path: &Path, max_connections: u32) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&format!("sqlite://{}", db_path.display()))?
        .create_if_missing(true)
        .busy_timeout(Duration::from_secs(5))
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;
    Ok(pool)
}

/// Open the store database at `db_path`, creating it and its directory on
/// first run and bringing the `kv_store` schema up to date.
///
/// The migration step gets its own single connection, closed before the
/// store pool opens.
pub async fn create_pool(db_path: &Path) -> Result<SqlitePool> {
    tracing::info!("Opening store database at {:?}", db_path);

    if let Some(parent) = db_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let migrator = connect(db_path, 1).await?;
    initialize_database(&migrator).await?;
    migrator.close().await;

    let pool = connect(db_path, STORE_POOL_SIZE).await?;

    tracing::debug!("Store database ready ({} connections)", STORE_POOL_SIZE);

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_create_pool_makes_directory_and_schema() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("nested").join("ourdays.db");

        let pool = create_pool(&db_path).await.unwrap();

        assert!(db_path.exists());
        let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM kv_store")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(rows, 0);
    }

    #[tokio::test]
    async fn test_reopen_keeps_data_and_migrations() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("ourdays.db");

        let pool = create_pool(&db_path).await.unwrap();
        sqlx::query("INSERT INTO kv_store (key, value, updated_at) VALUES ('albums', '[]', 'now')")
            .execute(&pool)
            .await
            .unwrap();
        pool.close().await;

        let pool = create_pool(&db_path).await.unwrap();
        let value: String = sqlx::query_scalar("SELECT value FROM kv_store WHERE key = 'albums'")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(value, "[]");

        let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM migrations")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(applied, 1);
    }
}
