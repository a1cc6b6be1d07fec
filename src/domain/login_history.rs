use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// One recorded login. Append-only; rows are removed together with their
/// owning user.
#[derive(Debug, Clone, FromRow)]
pub struct LoginEvent {
    pub id: i64,
    pub user_id: Uuid,
    pub user_agent: Option<String>,
    pub login_date: DateTime<Utc>,
}
