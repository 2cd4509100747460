use sqlx::SqlitePool;
use time::{Date, Duration, OffsetDateTime};
use tracing::instrument;

use super::repo_types::{NewWeightEntry, WeightEntry};
use crate::{db, error::StoreError};

/// Owns the `weights` table. Every query that touches an existing row is
/// scoped by `user_id`.
#[derive(Clone)]
pub struct WeightStore {
    db: SqlitePool,
}

impl WeightStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn create(&self, entry: &NewWeightEntry) -> Result<WeightEntry, StoreError> {
        let now = db::now();
        let row = sqlx::query_as::<_, WeightEntry>(
            r#"
            INSERT INTO weights (user_id, weight_kg, recorded_at, notes, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING id, user_id, weight_kg, recorded_at, notes, created_at, updated_at
            "#,
        )
        .bind(entry.user_id)
        .bind(entry.weight_kg)
        .bind(db::normalize_timestamp(entry.recorded_at))
        .bind(&entry.notes)
        .bind(now)
        .bind(now)
        .fetch_one(&self.db)
        .await?;
        Ok(row)
    }

    /// The user's entry for `date`, compared on the calendar day only.
    pub async fn get_by_date(&self, user_id: i64, date: Date) -> Result<WeightEntry, StoreError> {
        sqlx::query_as::<_, WeightEntry>(
            r#"
            SELECT id, user_id, weight_kg, recorded_at, notes, created_at, updated_at
            FROM weights
            WHERE user_id = ? AND DATE(recorded_at) = DATE(?)
            ORDER BY recorded_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(date)
        .fetch_optional(&self.db)
        .await?
        .ok_or(StoreError::NotFound)
    }

    /// Overwrites weight, recorded time and notes, bumping `updated_at`.
    /// `NotFound` if no row matches both id and owner.
    #[instrument(skip(self))]
    pub async fn update(&self, entry: &WeightEntry) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE weights
            SET weight_kg = ?, recorded_at = ?, notes = ?, updated_at = ?
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(entry.weight_kg)
        .bind(db::normalize_timestamp(entry.recorded_at))
        .bind(&entry.notes)
        .bind(db::now())
        .bind(entry.id)
        .bind(entry.user_id)
        .execute(&self.db)
        .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    /// Up to `limit` entries, newest first.
    pub async fn recent(&self, user_id: i64, limit: i64) -> Result<Vec<WeightEntry>, StoreError> {
        let rows = sqlx::query_as::<_, WeightEntry>(
            r#"
            SELECT id, user_id, weight_kg, recorded_at, notes, created_at, updated_at
            FROM weights
            WHERE user_id = ?
            ORDER BY recorded_at DESC
            LIMIT ?
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    /// Owner-scoped delete. Deleting someone else's or a missing row is a
    /// silent no-op so callers learn nothing about other users' ids.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64, user_id: i64) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM weights WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.db)
            .await?;
        Ok(())
    }

    /// Entries from the trailing `days` days (counting whole calendar days
    /// back from today), oldest first.
    pub async fn chart_data(&self, user_id: i64, days: u32) -> Result<Vec<WeightEntry>, StoreError> {
        let since = OffsetDateTime::now_utc().date() - Duration::days(i64::from(days));
        self.chart_data_since(user_id, since).await
    }

    pub async fn chart_data_since(
        &self,
        user_id: i64,
        since: Date,
    ) -> Result<Vec<WeightEntry>, StoreError> {
        let rows = sqlx::query_as::<_, WeightEntry>(
            r#"
            SELECT id, user_id, weight_kg, recorded_at, notes, created_at, updated_at
            FROM weights
            WHERE user_id = ? AND DATE(recorded_at) >= DATE(?)
            ORDER BY recorded_at ASC
            "#,
        )
        .bind(user_id)
        .bind(since)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::UserStore;

    struct Fixture {
        pool: SqlitePool,
        store: WeightStore,
        alice: i64,
        bob: i64,
    }

    async fn fixture() -> Fixture {
        let pool = db::memory_pool().await;
        let users = UserStore::new(pool.clone());
        let alice = users.create("alice", "password1").await.unwrap().id;
        let bob = users.create("bob", "password2").await.unwrap().id;
        Fixture {
            store: WeightStore::new(pool.clone()),
            pool,
            alice,
            bob,
        }
    }

    fn entry(user_id: i64, kg: f64, days_ago: i64) -> NewWeightEntry {
        NewWeightEntry {
            user_id,
            weight_kg: kg,
            recorded_at: OffsetDateTime::now_utc() - Duration::days(days_ago),
            notes: String::new(),
        }
    }

    async fn count(pool: &SqlitePool) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM weights")
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn create_assigns_id_and_normalizes_time() {
        let f = fixture().await;
        let created = f.store.create(&entry(f.alice, 81.2, 0)).await.unwrap();
        assert!(created.id > 0);
        assert_eq!(created.user_id, f.alice);
        assert_eq!(created.weight_kg, 81.2);
        assert_eq!(created.recorded_at.nanosecond(), 0);
    }

    #[tokio::test]
    async fn get_by_date_matches_calendar_day_only() {
        let f = fixture().await;
        let today = OffsetDateTime::now_utc().date();
        let morning = NewWeightEntry {
            recorded_at: today.midnight().assume_utc() + Duration::hours(7),
            ..entry(f.alice, 80.0, 0)
        };
        let created = f.store.create(&morning).await.unwrap();

        let found = f.store.get_by_date(f.alice, today).await.unwrap();
        assert_eq!(found.id, created.id);

        let yesterday = today - Duration::days(1);
        assert!(matches!(
            f.store.get_by_date(f.alice, yesterday).await,
            Err(StoreError::NotFound)
        ));
        assert!(matches!(
            f.store.get_by_date(f.bob, today).await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn update_is_owner_scoped() {
        let f = fixture().await;
        let mut e = f.store.create(&entry(f.alice, 80.0, 0)).await.unwrap();

        e.weight_kg = 79.4;
        e.notes = "after run".into();
        f.store.update(&e).await.unwrap();
        let stored = f.store.get_by_date(f.alice, e.recorded_at.date()).await.unwrap();
        assert_eq!(stored.weight_kg, 79.4);
        assert_eq!(stored.notes, "after run");
        assert!(stored.updated_at >= e.updated_at);

        let mut forged = stored.clone();
        forged.user_id = f.bob;
        forged.weight_kg = 120.0;
        assert!(matches!(f.store.update(&forged).await, Err(StoreError::NotFound)));
        let untouched = f.store.get_by_date(f.alice, e.recorded_at.date()).await.unwrap();
        assert_eq!(untouched.weight_kg, 79.4);
    }

    #[tokio::test]
    async fn recent_is_newest_first_and_limited() {
        let f = fixture().await;
        for (kg, days_ago) in [(82.0, 3), (81.0, 1), (83.0, 5), (80.0, 0)] {
            f.store.create(&entry(f.alice, kg, days_ago)).await.unwrap();
        }
        f.store.create(&entry(f.bob, 100.0, 0)).await.unwrap();

        let all = f.store.recent(f.alice, 10).await.unwrap();
        let weights: Vec<f64> = all.iter().map(|e| e.weight_kg).collect();
        assert_eq!(weights, vec![80.0, 81.0, 82.0, 83.0]);

        let two = f.store.recent(f.alice, 2).await.unwrap();
        assert_eq!(two.len(), 2);
        assert_eq!(two[0].weight_kg, 80.0);
    }

    #[tokio::test]
    async fn delete_ignores_rows_of_other_users() {
        let f = fixture().await;
        let alices = f.store.create(&entry(f.alice, 80.0, 0)).await.unwrap();

        f.store.delete(alices.id, f.bob).await.unwrap();
        assert_eq!(count(&f.pool).await, 1);

        f.store.delete(9999, f.alice).await.unwrap();
        assert_eq!(count(&f.pool).await, 1);

        f.store.delete(alices.id, f.alice).await.unwrap();
        assert_eq!(count(&f.pool).await, 0);
    }

    #[tokio::test]
    async fn chart_data_is_windowed_and_ascending() {
        let f = fixture().await;
        for (kg, days_ago) in [(70.0, 100), (71.0, 30), (72.0, 89), (73.0, 0)] {
            f.store.create(&entry(f.alice, kg, days_ago)).await.unwrap();
        }
        f.store.create(&entry(f.bob, 99.0, 1)).await.unwrap();

        let rows = f.store.chart_data(f.alice, 90).await.unwrap();
        let weights: Vec<f64> = rows.iter().map(|e| e.weight_kg).collect();
        assert_eq!(weights, vec![72.0, 71.0, 73.0]);
    }
}
