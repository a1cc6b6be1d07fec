use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// One registered account.
///
/// `token_version` is the invalidation counter: credential-affecting
/// mutations increment it, and a token is honored only while the version
/// embedded in it equals this stored value.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub token_version: i32,
}

impl User {
    /// Build a fresh account record: random id, current timestamp, token
    /// version zero. The password must already be hashed.
    pub fn create(
        username: String,
        email: String,
        password_hash: String,
        first_name: Option<String>,
        last_name: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            username,
            email,
            password_hash,
            first_name,
            last_name,
            created_at: Utc::now(),
            token_version: 0,
        }
    }
}
