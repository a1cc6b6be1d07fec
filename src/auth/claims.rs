/// JWT Claims structure
///
/// Represents the payload of an access token: user identity plus the
/// standard JWT claims (RFC 7519) this service uses.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::User;
use crate::error::{AppError, AuthError};

/// Claims for access tokens
///
/// `token_version` is a snapshot of the user's invalidation counter at
/// issue time. A token whose snapshot trails the stored counter is stale
/// and must be rejected, no matter how far its `exp` lies in the future.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject (user ID as UUID string)
    pub sub: String,
    /// Username at issue time
    pub username: String,
    /// Email at issue time
    pub email: String,
    /// Invalidation counter snapshot
    pub token_version: i32,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
}

impl Claims {
    /// Snapshot a user into claims valid for `ttl_minutes` from now.
    pub fn for_user(user: &User, ttl_minutes: i64) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            sub: user.id.to_string(),
            username: user.username.clone(),
            email: user.email.clone(),
            token_version: user.token_version,
            exp: now + ttl_minutes * 60,
            iat: now,
        }
    }

    /// Extract the user ID from the subject claim
    ///
    /// # Errors
    /// Returns an authentication error if the subject is not a valid UUID
    pub fn subject_id(&self) -> Result<Uuid, AppError> {
        Uuid::parse_str(&self.sub).map_err(|_| AppError::Unauthorized(AuthError::InvalidToken))
    }
}
