/// User persistence
///
/// Keyed lookup, full-record update, cascade delete, and paginated login
/// history. Every method runs on the caller's transaction; duplicate-key
/// violations surface as `StoreError::Duplicate` via the error module.

use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::domain::{LoginEvent, User};
use crate::error::StoreError;

/// Equality filter for user lookup. The three keys are all unique columns,
/// so a filter matches at most one row.
#[derive(Debug, Clone)]
pub enum UserFilter {
    Id(Uuid),
    Username(String),
    Email(String),
}

impl UserFilter {
    /// Short description used in not-found errors
    pub fn describe(&self) -> String {
        match self {
            UserFilter::Id(id) => format!("user(id={})", id),
            UserFilter::Username(username) => format!("user(username={})", username),
            UserFilter::Email(email) => format!("user(email={})", email),
        }
    }
}

pub struct UserStore<'a> {
    tx: &'a mut Transaction<'static, Postgres>,
}

impl<'a> UserStore<'a> {
    pub(crate) fn new(tx: &'a mut Transaction<'static, Postgres>) -> Self {
        Self { tx }
    }

    /// Insert a new user and return the stored row
    ///
    /// # Errors
    /// `StoreError::Duplicate` if the username or email is already taken
    pub async fn create(&mut self, user: &User) -> Result<User, StoreError> {
        let created = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username, email, password_hash, first_name, last_name, created_at, token_version)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, username, email, password_hash, first_name, last_name, created_at, token_version
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.created_at)
        .bind(user.token_version)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(created)
    }

    /// Single-entity lookup; zero matches is an error
    ///
    /// # Errors
    /// `StoreError::NotFound` if no row matches the filter
    pub async fn get(&mut self, filter: &UserFilter) -> Result<User, StoreError> {
        self.filter(filter)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::NotFound(filter.describe()))
    }

    /// Equality lookup returning all matches. Zero matches is an empty
    /// vector, not an error, which keeps existence checks cheap.
    pub async fn filter(&mut self, filter: &UserFilter) -> Result<Vec<User>, StoreError> {
        let users = match filter {
            UserFilter::Id(id) => {
                sqlx::query_as::<_, User>(
                    r#"
                    SELECT id, username, email, password_hash, first_name, last_name, created_at, token_version
                    FROM users WHERE id = $1
                    "#,
                )
                .bind(id)
                .fetch_all(&mut *self.tx)
                .await?
            }
            UserFilter::Username(username) => {
                sqlx::query_as::<_, User>(
                    r#"
                    SELECT id, username, email, password_hash, first_name, last_name, created_at, token_version
                    FROM users WHERE username = $1
                    "#,
                )
                .bind(username)
                .fetch_all(&mut *self.tx)
                .await?
            }
            UserFilter::Email(email) => {
                sqlx::query_as::<_, User>(
                    r#"
                    SELECT id, username, email, password_hash, first_name, last_name, created_at, token_version
                    FROM users WHERE email = $1
                    "#,
                )
                .bind(email)
                .fetch_all(&mut *self.tx)
                .await?
            }
        };

        Ok(users)
    }

    /// Full-record replace by id. Identity columns (`id`, `created_at`) and
    /// login history are left untouched.
    ///
    /// # Errors
    /// - `StoreError::NotFound` if the id does not exist
    /// - `StoreError::Duplicate` if the new username or email is taken
    pub async fn update(&mut self, user: &User) -> Result<User, StoreError> {
        let updated = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET username = $2, email = $3, password_hash = $4,
                first_name = $5, last_name = $6, token_version = $7
            WHERE id = $1
            RETURNING id, username, email, password_hash, first_name, last_name, created_at, token_version
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.token_version)
        .fetch_optional(&mut *self.tx)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("user(id={})", user.id)))?;

        Ok(updated)
    }

    /// Remove a user; login history rows cascade with it
    ///
    /// # Errors
    /// `StoreError::NotFound` if the id does not exist
    pub async fn delete(&mut self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("user(id={})", id)));
        }

        Ok(())
    }

    /// Append one login event
    pub async fn record_login(
        &mut self,
        user_id: Uuid,
        user_agent: Option<&str>,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO login_history (user_id, user_agent, login_date) VALUES ($1, $2, $3)",
        )
        .bind(user_id)
        .bind(user_agent)
        .bind(chrono::Utc::now())
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }

    /// A user plus one page of their login history (newest first) and the
    /// total number of recorded events
    ///
    /// # Errors
    /// `StoreError::NotFound` if the id does not exist
    pub async fn get_with_history(
        &mut self,
        id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<(User, Vec<LoginEvent>, i64), StoreError> {
        let user = self.get(&UserFilter::Id(id)).await?;

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM login_history WHERE user_id = $1",
        )
        .bind(id)
        .fetch_one(&mut *self.tx)
        .await?;

        let events = sqlx::query_as::<_, LoginEvent>(
            r#"
            SELECT id, user_id, user_agent, login_date
            FROM login_history
            WHERE user_id = $1
            ORDER BY login_date DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&mut *self.tx)
        .await?;

        Ok((user, events, total))
    }
}
