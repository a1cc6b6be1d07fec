/// Account Routes
///
/// Registration, login, token refresh, password change, profile update,
/// account deletion, and the authenticated account overview. Handlers
/// validate input, open one unit of work, and delegate to the service
/// layer; every mutation responds with a freshly minted token.

use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::auth::{Claims, TokenCodec};
use crate::error::{AppError, AuthError, ValidationError};
use crate::service::{self, NewAccount, ProfileChanges};
use crate::store::UnitOfWork;
use crate::validators::{
    is_valid_email, is_valid_name, is_valid_password, is_valid_username, login_identifier,
};

const DEFAULT_HISTORY_PAGE: i64 = 10;
const MAX_HISTORY_PAGE: i64 = 100;

/// User registration request
#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Credentials addressing one account by username XOR email
#[derive(Deserialize)]
pub struct CredentialsRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: String,
}

/// Token refresh request body (alternative to the Authorization header)
#[derive(Deserialize)]
pub struct RefreshRequest {
    pub token: String,
}

/// Password change request
#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: String,
    pub new_password: String,
}

/// Profile update request: credentials plus the fields to change
#[derive(Deserialize)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: String,
    pub updates: UserUpdates,
}

/// Fields that may change; absent fields stay as they are
#[derive(Deserialize)]
pub struct UserUpdates {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Token response returned by every credential-bearing operation
#[derive(Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub info: String,
}

impl TokenResponse {
    fn bearer(access_token: String, info: &str) -> Self {
        Self {
            access_token,
            token_type: "Bearer".to_string(),
            info: info.to_string(),
        }
    }
}

/// Account deletion confirmation
#[derive(Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Serialize)]
pub struct LoginEventResponse {
    pub id: i64,
    pub user_agent: Option<String>,
    pub login_date: String,
}

/// Profile with one page of login history
#[derive(Serialize)]
pub struct AccountResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub created_at: String,
    pub login_history: Vec<LoginEventResponse>,
    pub total_logins: i64,
}

#[derive(Deserialize)]
pub struct HistoryParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// POST /api/v1/user/registration
///
/// Register a new account with username, email, password and optional
/// names. Returns the account's first access token on success.
///
/// # Errors
/// - 400: Validation errors, or the username/email is already taken
/// - 500: Internal server error
pub async fn register(
    form: web::Json<RegisterRequest>,
    pool: web::Data<PgPool>,
    codec: web::Data<TokenCodec>,
) -> Result<HttpResponse, AppError> {
    let form = form.into_inner();

    // Validate inputs
    let username = is_valid_username(&form.username)?;
    let email = is_valid_email(&form.email)?;
    is_valid_password(&form.password)?;
    let first_name = form
        .first_name
        .as_deref()
        .map(|name| is_valid_name("first_name", name))
        .transpose()?;
    let last_name = form
        .last_name
        .as_deref()
        .map(|name| is_valid_name("last_name", name))
        .transpose()?;

    let uow = UnitOfWork::begin(pool.get_ref()).await?;
    let token = service::register(
        codec.get_ref(),
        uow,
        NewAccount {
            username,
            email,
            password: form.password,
            first_name,
            last_name,
        },
    )
    .await?;

    Ok(HttpResponse::Ok().json(TokenResponse::bearer(
        token,
        "User registration was successful.",
    )))
}

/// POST /api/v1/user/login
///
/// Authenticate with username or email plus password.
///
/// # Errors
/// - 400: Both or neither identifier fields present
/// - 401: Wrong password or unknown identifier (indistinguishable)
/// - 500: Internal server error
pub async fn login(
    req: HttpRequest,
    form: web::Json<CredentialsRequest>,
    pool: web::Data<PgPool>,
    codec: web::Data<TokenCodec>,
) -> Result<HttpResponse, AppError> {
    let form = form.into_inner();

    let ident = login_identifier(form.username.as_deref(), form.email.as_deref())?;
    is_valid_password(&form.password)?;

    let user_agent = req
        .headers()
        .get(header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    let uow = UnitOfWork::begin(pool.get_ref()).await?;
    let token = service::login(
        codec.get_ref(),
        uow,
        ident,
        &form.password,
        user_agent.as_deref(),
    )
    .await?;

    Ok(HttpResponse::Ok().json(TokenResponse::bearer(
        token,
        "User logged in successfully.",
    )))
}

/// POST /api/v1/user/refresh
///
/// Exchange a still-valid token for a fresh one. The token is read from
/// the Authorization header first; a JSON body `{"token": ...}` is the
/// fallback for clients that cannot set headers.
///
/// # Errors
/// - 401: Missing, invalid, expired or stale token
/// - 500: Internal server error
pub async fn refresh(
    req: HttpRequest,
    body: Option<web::Json<RefreshRequest>>,
    pool: web::Data<PgPool>,
    codec: web::Data<TokenCodec>,
) -> Result<HttpResponse, AppError> {
    let header_token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string);

    let token = header_token
        .or_else(|| body.map(|body| body.into_inner().token))
        .ok_or(AuthError::MissingToken)?;

    let uow = UnitOfWork::begin(pool.get_ref()).await?;
    let fresh = service::refresh(codec.get_ref(), uow, &token).await?;

    Ok(HttpResponse::Ok().json(TokenResponse::bearer(fresh, "Token refresh success.")))
}

/// PATCH /api/v1/user/change_password
///
/// Set a new password. Every token issued before this call stops working;
/// the response carries the only currently valid one.
///
/// # Errors
/// - 400: Validation errors
/// - 401: Wrong password or unknown identifier
/// - 500: Internal server error
pub async fn change_password(
    form: web::Json<ChangePasswordRequest>,
    pool: web::Data<PgPool>,
    codec: web::Data<TokenCodec>,
) -> Result<HttpResponse, AppError> {
    let form = form.into_inner();

    let ident = login_identifier(form.username.as_deref(), form.email.as_deref())?;
    is_valid_password(&form.password)?;
    is_valid_password(&form.new_password)?;

    let uow = UnitOfWork::begin(pool.get_ref()).await?;
    let token = service::change_password(
        codec.get_ref(),
        uow,
        ident,
        &form.password,
        &form.new_password,
    )
    .await?;

    Ok(HttpResponse::Ok().json(TokenResponse::bearer(
        token,
        "Password changed successfully.",
    )))
}

/// PATCH /api/v1/user/update_user
///
/// Apply a partial profile update. Requires current credentials; at least
/// one field must be present in `updates`. Invalidates older tokens even
/// when only a name changed.
///
/// # Errors
/// - 400: Validation errors, empty update, or username/email taken
/// - 401: Wrong password or unknown identifier
/// - 500: Internal server error
pub async fn update_user(
    form: web::Json<UpdateUserRequest>,
    pool: web::Data<PgPool>,
    codec: web::Data<TokenCodec>,
) -> Result<HttpResponse, AppError> {
    let form = form.into_inner();

    let ident = login_identifier(form.username.as_deref(), form.email.as_deref())?;
    is_valid_password(&form.password)?;

    let updates = form.updates;
    let changes = ProfileChanges {
        username: updates
            .username
            .as_deref()
            .map(is_valid_username)
            .transpose()?,
        email: updates.email.as_deref().map(is_valid_email).transpose()?,
        password: match updates.password {
            Some(password) => {
                is_valid_password(&password)?;
                Some(password)
            }
            None => None,
        },
        first_name: updates
            .first_name
            .as_deref()
            .map(|name| is_valid_name("first_name", name))
            .transpose()?,
        last_name: updates
            .last_name
            .as_deref()
            .map(|name| is_valid_name("last_name", name))
            .transpose()?,
    };
    if changes.is_empty() {
        return Err(ValidationError::EmptyUpdate.into());
    }

    let uow = UnitOfWork::begin(pool.get_ref()).await?;
    let token =
        service::update_profile(codec.get_ref(), uow, ident, &form.password, changes).await?;

    Ok(HttpResponse::Ok().json(TokenResponse::bearer(
        token,
        "User updated successfully.",
    )))
}

/// DELETE /api/v1/user/delete
///
/// Delete the account named by the credentials, along with its login
/// history.
///
/// # Errors
/// - 400: Validation errors
/// - 401: Wrong password or unknown identifier
/// - 500: Internal server error
pub async fn delete_user(
    form: web::Json<CredentialsRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let form = form.into_inner();

    let ident = login_identifier(form.username.as_deref(), form.email.as_deref())?;
    is_valid_password(&form.password)?;

    let uow = UnitOfWork::begin(pool.get_ref()).await?;
    let username = service::delete_account(uow, ident, &form.password).await?;

    Ok(HttpResponse::Ok().json(DeleteResponse {
        success: true,
        message: format!("User {} has been deleted.", username),
    }))
}

/// GET /api/v1/user/me
///
/// Current account's profile plus a page of login history.
/// **Requires a valid access token** in the Authorization header; the
/// token must also carry the account's current version.
///
/// # Errors
/// - 401: Missing, invalid, stale token, or deleted account
/// - 500: Internal server error
pub async fn account_overview(
    claims: web::ReqData<Claims>,
    query: web::Query<HistoryParams>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let claims = claims.into_inner();

    let limit = query
        .limit
        .unwrap_or(DEFAULT_HISTORY_PAGE)
        .clamp(1, MAX_HISTORY_PAGE);
    let offset = query.offset.unwrap_or(0).max(0);

    let uow = UnitOfWork::begin(pool.get_ref()).await?;
    let (user, events, total) = service::account_overview(uow, &claims, limit, offset).await?;

    Ok(HttpResponse::Ok().json(AccountResponse {
        id: user.id.to_string(),
        username: user.username,
        email: user.email,
        first_name: user.first_name,
        last_name: user.last_name,
        created_at: user.created_at.to_rfc3339(),
        login_history: events
            .into_iter()
            .map(|event| LoginEventResponse {
                id: event.id,
                user_agent: event.user_agent,
                login_date: event.login_date.to_rfc3339(),
            })
            .collect(),
        total_logins: total,
    }))
}
