//! services/api/src/adapters/db.rs
//!
//! The database adapter: the concrete implementation of the `IdentityStore`
//! and `ProgressStore` ports from the core crate, backed by PostgreSQL via
//! `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{error::ErrorKind, FromRow, PgPool};
use uuid::Uuid;

use bhasha_core::{
    CoreError, CoreResult, IdentityStore, Language, NewUser, Progress, ProgressStore, User,
};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter implementing both storage ports over a shared pool.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Runs the embedded database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

fn storage_err(e: sqlx::Error) -> CoreError {
    CoreError::Storage(e.to_string())
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    id: Uuid,
    fullname: String,
    username: String,
    email: String,
    password_hash: String,
    age: i32,
    native_language: String,
    learning_language: String,
    specially_abled: bool,
    created_at: DateTime<Utc>,
}

impl UserRecord {
    fn into_domain(self) -> CoreResult<User> {
        // The language columns only ever hold the enum's canonical strings;
        // anything else means the row was written outside the application.
        let parse = |column: &str, value: &str| {
            value.parse::<Language>().map_err(|e| {
                CoreError::Storage(format!("corrupt {column} for user {}: {e}", self.id))
            })
        };
        let native_language = parse("native_language", &self.native_language)?;
        let learning_language = parse("learning_language", &self.learning_language)?;
        Ok(User {
            id: self.id,
            fullname: self.fullname,
            username: self.username,
            email: self.email,
            password_hash: self.password_hash,
            age: self.age,
            native_language,
            learning_language,
            specially_abled: self.specially_abled,
            created_at: self.created_at,
        })
    }
}

#[derive(FromRow)]
struct ProgressRecord {
    user_id: String,
    level_file: String,
    last_lesson: i32,
}

impl ProgressRecord {
    fn into_domain(self) -> Progress {
        Progress {
            user_id: self.user_id,
            level_file: self.level_file,
            last_lesson: self.last_lesson,
        }
    }
}

const USER_COLUMNS: &str = "id, fullname, username, email, password_hash, age, \
                            native_language, learning_language, specially_abled, created_at";

//=========================================================================================
// `IdentityStore` Implementation
//=========================================================================================

#[async_trait]
impl IdentityStore for DbAdapter {
    async fn create_user(&self, user: NewUser) -> CoreResult<User> {
        let sql = format!(
            "INSERT INTO users \
             (id, fullname, username, email, password_hash, age, \
              native_language, learning_language, specially_abled) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {USER_COLUMNS}"
        );
        let record = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(Uuid::new_v4())
            .bind(&user.fullname)
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.age)
            .bind(user.native_language.as_str())
            .bind(user.learning_language.as_str())
            .bind(user.specially_abled)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                // The unique indexes close the caller's check-then-insert race.
                let is_unique = e
                    .as_database_error()
                    .map(|db| matches!(db.kind(), ErrorKind::UniqueViolation))
                    .unwrap_or(false);
                if is_unique {
                    CoreError::Conflict(
                        "Username or email already exists. Please choose a different one."
                            .to_string(),
                    )
                } else {
                    storage_err(e)
                }
            })?;
        record.into_domain()
    }

    async fn find_user_by_username(&self, username: &str) -> CoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1");
        sqlx::query_as::<_, UserRecord>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_err)?
            .map(UserRecord::into_domain)
            .transpose()
    }

    async fn find_user_by_email(&self, email: &str) -> CoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as::<_, UserRecord>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_err)?
            .map(UserRecord::into_domain)
            .transpose()
    }

    async fn find_user_by_id(&self, id: Uuid) -> CoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, UserRecord>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_err)?
            .map(UserRecord::into_domain)
            .transpose()
    }
}

//=========================================================================================
// `ProgressStore` Implementation
//=========================================================================================

#[async_trait]
impl ProgressStore for DbAdapter {
    async fn get_progress(&self, user_id: &str, level_file: &str)
        -> CoreResult<Option<Progress>> {
        let record = sqlx::query_as::<_, ProgressRecord>(
            "SELECT user_id, level_file, last_lesson FROM progress \
             WHERE user_id = $1 AND level_file = $2",
        )
        .bind(user_id)
        .bind(level_file)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_err)?;
        Ok(record.map(ProgressRecord::into_domain))
    }

    async fn upsert_progress(
        &self,
        user_id: &str,
        level_file: &str,
        last_lesson: i32,
    ) -> CoreResult<Progress> {
        // Atomic at the single-row level; concurrent saves are
        // last-writer-wins by arrival order at the database.
        let record = sqlx::query_as::<_, ProgressRecord>(
            "INSERT INTO progress (user_id, level_file, last_lesson) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (user_id, level_file) \
             DO UPDATE SET last_lesson = EXCLUDED.last_lesson \
             RETURNING user_id, level_file, last_lesson",
        )
        .bind(user_id)
        .bind(level_file)
        .bind(last_lesson)
        .fetch_one(&self.pool)
        .await
        .map_err(storage_err)?;
        Ok(record.into_domain())
    }
}
