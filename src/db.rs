use std::{path::Path, time::Duration};

use anyhow::Context;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    Connection, SqlitePool,
};
use time::{OffsetDateTime, UtcOffset};

/// Opens (creating if needed) the SQLite database at `path`.
pub async fn connect(path: &str) -> anyhow::Result<SqlitePool> {
    if let Some(dir) = Path::new(path).parent() {
        if !dir.as_os_str().is_empty() {
            tokio::fs::create_dir_all(dir)
                .await
                .with_context(|| format!("create database directory {}", dir.display()))?;
        }
    }

    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(options)
        .await
        .with_context(|| format!("open database {path}"))?;

    ping(&pool).await.context("ping database")?;
    Ok(pool)
}

pub async fn migrate(pool: &SqlitePool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("run database migrations")?;
    Ok(())
}

pub async fn ping(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let mut conn = pool.acquire().await?;
    conn.ping().await
}

/// UTC, whole seconds. Every timestamp we write goes through this so the
/// stored text sorts chronologically.
pub fn normalize_timestamp(ts: OffsetDateTime) -> OffsetDateTime {
    let utc = ts.to_offset(UtcOffset::UTC);
    utc - time::Duration::nanoseconds(i64::from(utc.nanosecond()))
}

pub fn now() -> OffsetDateTime {
    normalize_timestamp(OffsetDateTime::now_utc())
}

/// Fresh migrated in-memory database. One connection, never recycled,
/// otherwise the database disappears with it.
#[cfg(test)]
pub(crate) async fn memory_pool() -> SqlitePool {
    use std::str::FromStr;

    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .expect("in-memory sqlite url")
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .expect("open in-memory sqlite");
    migrate(&pool).await.expect("migrations apply");
    pool
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn normalize_drops_subseconds_and_offset() {
        let ts = datetime!(2024-03-10 23:30:15.987654321 -2);
        let n = normalize_timestamp(ts);
        assert_eq!(n, datetime!(2024-03-11 01:30:15 UTC));
        assert_eq!(n.offset(), UtcOffset::UTC);
        assert_eq!(n.nanosecond(), 0);
    }

    #[tokio::test]
    async fn memory_pool_is_migrated_and_pingable() {
        let pool = memory_pool().await;
        ping(&pool).await.unwrap();
        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name IN ('users', 'weights') ORDER BY name",
        )
        .fetch_all(&pool)
        .await
        .unwrap();
        assert_eq!(tables, vec!["users".to_string(), "weights".to_string()]);
    }

    #[tokio::test]
    async fn memory_pool_enforces_foreign_keys() {
        let pool = memory_pool().await;
        let orphan = sqlx::query(
            "INSERT INTO weights (user_id, weight_kg, recorded_at, created_at, updated_at) \
             VALUES (999, 80.0, '2024-01-01 00:00:00', '2024-01-01 00:00:00', '2024-01-01 00:00:00')",
        )
        .execute(&pool)
        .await;
        assert!(orphan.is_err());
    }

    #[tokio::test]
    async fn ping_fails_on_closed_pool() {
        let pool = memory_pool().await;
        pool.close().await;
        assert!(ping(&pool).await.is_err());
    }

    #[tokio::test]
    async fn connect_creates_parent_directory() {
        let dir = std::env::temp_dir().join(format!("weight-tracker-{}", uuid::Uuid::new_v4()));
        let path = dir.join("nested").join("weights.db");
        let pool = connect(path.to_str().unwrap()).await.unwrap();
        migrate(&pool).await.unwrap();
        assert!(path.exists());
        pool.close().await;
        let _ = std::fs::remove_dir_all(&dir);
    }
}
