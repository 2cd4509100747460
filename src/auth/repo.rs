use sqlx::SqlitePool;
use tracing::{error, instrument};

use crate::{
    auth::{
        password,
        repo_types::{User, MIN_PASSWORD_LEN, MIN_USERNAME_LEN},
    },
    db,
    error::StoreError,
};

/// Owns the `users` table.
#[derive(Clone)]
pub struct UserStore {
    db: SqlitePool,
}

impl UserStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Validates, hashes and inserts a new user.
    #[instrument(skip(self, password))]
    pub async fn create(&self, username: &str, password: &str) -> Result<User, StoreError> {
        validate_credentials(username, password)?;

        let plain = password.to_owned();
        let hash = tokio::task::spawn_blocking(move || password::hash_password(&plain))
            .await
            .map_err(|e| StoreError::Hash(e.to_string()))?
            .map_err(|e| StoreError::Hash(e.to_string()))?;

        let now = db::now();
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password_hash, created_at, updated_at)
            VALUES (?, ?, ?, ?)
            RETURNING id, username, password_hash, created_at, updated_at
            "#,
        )
        .bind(username)
        .bind(&hash)
        .bind(now)
        .bind(now)
        .fetch_one(&self.db)
        .await
        .map_err(StoreError::from_insert)?;
        Ok(user)
    }

    pub async fn get_by_username(&self, username: &str) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, created_at, updated_at
            FROM users
            WHERE username = ?
            "#,
        )
        .bind(username)
        .fetch_optional(&self.db)
        .await?
        .ok_or(StoreError::NotFound)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, created_at, updated_at
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or(StoreError::NotFound)
    }

    /// Constant-time hash comparison off the async executor.
    pub async fn verify_password(&self, user: &User, plain: &str) -> bool {
        let hash = user.password_hash.clone();
        let plain = plain.to_owned();
        match tokio::task::spawn_blocking(move || password::verify_password(&plain, &hash)).await {
            Ok(ok) => ok,
            Err(e) => {
                error!(error = %e, user_id = user.id, "password verification task failed");
                false
            }
        }
    }
}

fn validate_credentials(username: &str, password: &str) -> Result<(), StoreError> {
    if username.is_empty() || password.is_empty() {
        return Err(StoreError::Validation(
            "Username and password cannot be empty".into(),
        ));
    }
    if username.chars().count() < MIN_USERNAME_LEN {
        return Err(StoreError::Validation(format!(
            "Username must be at least {MIN_USERNAME_LEN} characters"
        )));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(StoreError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}
