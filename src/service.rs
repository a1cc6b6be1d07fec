/// Authentication service
///
/// The flows behind the account endpoints. Each function drives one
/// request through the same lifecycle: resolve the caller (credentials or
/// bearer token), mutate through the unit of work, commit exactly once,
/// then mint a token reflecting the post-commit state.
///
/// # Security Notes
/// - Unknown identifier and wrong password produce the same error
/// - The unknown-identifier path still burns a bcrypt verification, so the
///   two cases are not separable by timing either
/// - Tokens carry the account's version counter; bumping the counter is
///   the only invalidation mechanism

use crate::auth::{hash_password, verify_against_fallback, verify_password, Claims, TokenCodec};
use crate::domain::{LoginEvent, User};
use crate::error::{AppError, AuthError, StoreError};
use crate::store::{UnitOfWork, UserFilter};

/// Registration input, already validated
#[derive(Debug)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Partial profile update; `None` leaves a field unchanged
#[derive(Debug, Default)]
pub struct ProfileChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl ProfileChanges {
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.email.is_none()
            && self.password.is_none()
            && self.first_name.is_none()
            && self.last_name.is_none()
    }
}

/// Look up an account by identifier and check the password
async fn resolve_credentials(
    uow: &mut UnitOfWork,
    ident: &UserFilter,
    password: &str,
) -> Result<User, AppError> {
    let candidate = uow.users().filter(ident).await?.into_iter().next();

    match candidate {
        Some(user) if verify_password(password, &user.password_hash) => Ok(user),
        Some(_) => Err(AuthError::InvalidCredentials.into()),
        None => {
            verify_against_fallback(password);
            Err(AuthError::InvalidCredentials.into())
        }
    }
}

/// Register a new account and hand back its first token (version zero)
///
/// # Errors
/// - `AppError::Duplicate` if the username or email is already taken
pub async fn register(
    codec: &TokenCodec,
    mut uow: UnitOfWork,
    account: NewAccount,
) -> Result<String, AppError> {
    // Explicit duplicate check inside the transaction; the unique
    // constraints remain the backstop for concurrent registrations.
    let email_taken = !uow
        .users()
        .filter(&UserFilter::Email(account.email.clone()))
        .await?
        .is_empty();
    let username_taken = !uow
        .users()
        .filter(&UserFilter::Username(account.username.clone()))
        .await?
        .is_empty();
    if email_taken || username_taken {
        return Err(AppError::Duplicate);
    }

    let password_hash = hash_password(&account.password)?;
    let user = User::create(
        account.username,
        account.email,
        password_hash,
        account.first_name,
        account.last_name,
    );
    let created = uow.users().create(&user).await?;
    uow.commit().await?;

    tracing::info!(
        user_id = %created.id,
        username = %created.username,
        "User registered successfully"
    );

    codec.issue(&created)
}

/// Authenticate with username or email plus password; records one login
/// event before handing out the token
pub async fn login(
    codec: &TokenCodec,
    mut uow: UnitOfWork,
    ident: UserFilter,
    password: &str,
    user_agent: Option<&str>,
) -> Result<String, AppError> {
    let user = resolve_credentials(&mut uow, &ident, password).await?;

    uow.users().record_login(user.id, user_agent).await?;
    uow.commit().await?;

    tracing::info!(
        user_id = %user.id,
        "User logged in successfully"
    );

    codec.issue(&user)
}

/// Exchange a still-valid token for a fresh one with the same claims
///
/// Pure re-issuance: the stored version counter is not touched, and the
/// new expiry is the ordinary TTL from now. A token that is expired,
/// stale, or tied to a deleted account buys nothing.
pub async fn refresh(
    codec: &TokenCodec,
    mut uow: UnitOfWork,
    token: &str,
) -> Result<String, AppError> {
    let claims = codec.decode(token)?;
    let subject = claims.subject_id()?;

    let user = match uow.users().get(&UserFilter::Id(subject)).await {
        Ok(user) => user,
        Err(StoreError::NotFound(_)) => return Err(AuthError::UnknownSubject.into()),
        Err(other) => return Err(other.into()),
    };

    if user.token_version != claims.token_version {
        return Err(AuthError::StaleToken.into());
    }

    uow.commit().await?;

    tracing::info!(
        user_id = %user.id,
        "Token refreshed successfully"
    );

    codec.issue(&user)
}

/// Set a new password and invalidate every outstanding token
///
/// The version bump means the returned token is the only one the account
/// can use from here on.
pub async fn change_password(
    codec: &TokenCodec,
    mut uow: UnitOfWork,
    ident: UserFilter,
    password: &str,
    new_password: &str,
) -> Result<String, AppError> {
    let mut user = resolve_credentials(&mut uow, &ident, password).await?;

    user.password_hash = hash_password(new_password)?;
    user.token_version += 1;
    let updated = uow.users().update(&user).await?;
    uow.commit().await?;

    tracing::info!(
        user_id = %updated.id,
        token_version = updated.token_version,
        "Password changed"
    );

    codec.issue(&updated)
}

/// Apply a partial profile update
///
/// The version counter is bumped whichever fields changed, so tokens
/// issued before the update go stale even for a pure name change.
///
/// # Errors
/// - `AppError::Duplicate` if a new username or email is already taken
pub async fn update_profile(
    codec: &TokenCodec,
    mut uow: UnitOfWork,
    ident: UserFilter,
    password: &str,
    changes: ProfileChanges,
) -> Result<String, AppError> {
    let mut user = resolve_credentials(&mut uow, &ident, password).await?;

    if let Some(username) = changes.username {
        user.username = username;
    }
    if let Some(email) = changes.email {
        user.email = email;
    }
    if let Some(new_password) = changes.password {
        user.password_hash = hash_password(&new_password)?;
    }
    if let Some(first_name) = changes.first_name {
        user.first_name = Some(first_name);
    }
    if let Some(last_name) = changes.last_name {
        user.last_name = Some(last_name);
    }
    user.token_version += 1;

    let updated = uow.users().update(&user).await?;
    uow.commit().await?;

    tracing::info!(
        user_id = %updated.id,
        token_version = updated.token_version,
        "Profile updated"
    );

    codec.issue(&updated)
}

/// Delete an account; its login history cascades with it
///
/// Returns the deleted username for the confirmation message.
pub async fn delete_account(
    mut uow: UnitOfWork,
    ident: UserFilter,
    password: &str,
) -> Result<String, AppError> {
    let user = resolve_credentials(&mut uow, &ident, password).await?;

    uow.users().delete(user.id).await?;
    uow.commit().await?;

    tracing::info!(
        user_id = %user.id,
        username = %user.username,
        "User deleted"
    );

    Ok(user.username)
}

/// Profile plus paginated login history for the bearer of a valid token
///
/// The middleware already checked the signature and expiry; the version
/// comparison happens here because it needs the stored record.
pub async fn account_overview(
    mut uow: UnitOfWork,
    claims: &Claims,
    limit: i64,
    offset: i64,
) -> Result<(User, Vec<LoginEvent>, i64), AppError> {
    let subject = claims.subject_id()?;

    let (user, events, total) = match uow.users().get_with_history(subject, limit, offset).await {
        Ok(found) => found,
        Err(StoreError::NotFound(_)) => return Err(AuthError::UnknownSubject.into()),
        Err(other) => return Err(other.into()),
    };

    if user.token_version != claims.token_version {
        return Err(AuthError::StaleToken.into());
    }

    uow.commit().await?;

    Ok((user, events, total))
}
