use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // Argon2 hash, not exposed in JSON
    pub age: Option<i32>,
    pub weight: Option<f64>,
    pub dietary_goals: Option<String>,
    pub allergies: Option<String>,
    pub created_at: OffsetDateTime,
}

#[derive(Debug)]
pub struct NewUser<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
}

/// Partial profile update; only set fields are written.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ProfilePatch {
    pub age: Option<i32>,
    pub weight: Option<f64>,
    pub dietary_goals: Option<String>,
    pub allergies: Option<String>,
}

impl ProfilePatch {
    pub fn is_empty(&self) -> bool {
        self.age.is_none()
            && self.weight.is_none()
            && self.dietary_goals.is_none()
            && self.allergies.is_none()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Unique index violation on email or username. Also covers the race
    /// between two concurrent registrations of the same email.
    #[error("duplicate email or username")]
    Duplicate,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Persistence seam for user records. Injected into the auth service so
/// tests can swap in `MemoryUserStore`.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create(&self, new: NewUser<'_>) -> Result<User, StoreError>;
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;
    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<User>>;
    async fn update_password(&self, id: i64, password_hash: &str) -> anyhow::Result<()>;
    /// Applies the set fields of `patch`; returns false if the user is gone.
    async fn update_profile(&self, id: i64, patch: &ProfilePatch) -> anyhow::Result<bool>;
}

pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

const USER_COLUMNS: &str =
    "id, username, email, password_hash, age, weight, dietary_goals, allergies, created_at";

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, new: NewUser<'_>) -> Result<User, StoreError> {
        let sql = format!(
            "INSERT INTO users (username, email, password_hash) \
             VALUES ($1, $2, $3) RETURNING {USER_COLUMNS}"
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(new.username)
            .bind(new.email)
            .bind(new.password_hash)
            .fetch_one(&self.db)
            .await
            .map_err(|e| {
                if matches!(&e, sqlx::Error::Database(db_err) if db_err.is_unique_violation()) {
                    StoreError::Duplicate
                } else {
                    StoreError::Other(e.into())
                }
            })?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }

    async fn update_password(&self, id: i64, password_hash: &str) -> anyhow::Result<()> {
        sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(&self.db)
            .await?;
        Ok(())
    }

    async fn update_profile(&self, id: i64, patch: &ProfilePatch) -> anyhow::Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET age = COALESCE($2, age),
                weight = COALESCE($3, weight),
                dietary_goals = COALESCE($4, dietary_goals),
                allergies = COALESCE($5, allergies)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(patch.age)
        .bind(patch.weight)
        .bind(patch.dietary_goals.as_deref())
        .bind(patch.allergies.as_deref())
        .execute(&self.db)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
