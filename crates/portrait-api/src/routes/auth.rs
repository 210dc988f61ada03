//! Authentication extractor and account routes

use axum::{
    Json, Router,
    extract::{FromRef, FromRequestParts, State, rejection::JsonRejection},
    http::request::Parts,
    routing::{get, post},
};
use portrait_auth::{authenticate, hash_password, verify_password};
use portrait_db::{DbError, NewUser, User};
use tracing::{debug, info, warn};

use crate::error::ApiError;
use crate::response::ApiResponse;
use crate::state::AppState;

use super::types::{LoginRequest, RegisterRequest, TokenResponse};
use super::validation::{
    FieldErrors, normalize_email, validate_email, validate_password, validate_username,
};

// ==================== Auth Extractor ====================

/// Extractor for the authenticated user (required)
///
/// Resolves the bearer token to a live user row; anything else is a 401.
pub struct CurrentUser(pub User);

impl<S> FromRequestParts<S> for CurrentUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        match authenticate(&parts.headers, &app_state.jwt, &app_state.db).await {
            Ok(user) => Ok(CurrentUser(user)),
            Err(e) if e.is_client_error() => {
                debug!("Rejected request: {}", e);
                Err(ApiError::unauthorized("unauthorized"))
            }
            Err(e) => Err(ApiError::Auth(e)),
        }
    }
}

// ==================== Account Routes ====================

const REGISTER_FAILED: &str = "failed to create account";
const LOGIN_FAILED: &str = "login failed";

/// Issue a token, mapping failures to a 500
fn issue_token(state: &AppState, user: &User) -> Result<String, ApiError> {
    state.jwt.generate_token(user.id).map_err(|e| {
        warn!("Token generation failed for user {}: {}", user.id, e);
        ApiError::Internal(format!("token generation failed: {}", e))
    })
}

/// POST /api/v1/users/register
async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<ApiResponse<TokenResponse>, ApiError> {
    let Json(request) =
        payload.map_err(|e| ApiError::validation(REGISTER_FAILED, vec![e.body_text()]))?;

    let mut errors = FieldErrors::new();
    let username = errors.require("username", &request.username).map(str::trim);
    let email = errors.require("email", &request.email).map(normalize_email);
    let password = errors.require("password", &request.password);
    if let Some(username) = username {
        errors.check(validate_username(username));
    }
    if let Some(email) = &email {
        errors.check(validate_email(email));
    }
    if let Some(password) = password {
        errors.check(validate_password(password));
    }
    errors.finish(REGISTER_FAILED)?;

    let (Some(username), Some(email), Some(password)) = (username, email, password) else {
        return Err(ApiError::validation(REGISTER_FAILED, vec![]));
    };

    debug!("Registering account for {}", email);

    let password_hash = hash_password(password)?;

    let user = match state
        .db
        .insert_user(NewUser {
            username: username.to_string(),
            email,
            password_hash,
        })
        .await
    {
        Ok(user) => user,
        Err(DbError::Duplicate(msg)) => {
            debug!("Registration rejected: {}", msg);
            return Err(ApiError::bad_request(REGISTER_FAILED));
        }
        Err(e) => return Err(e.into()),
    };

    let token = issue_token(&state, &user)?;

    metrics::counter!("portrait_registrations_total").increment(1);
    info!("Created account {} ({})", user.username, user.id);

    Ok(ApiResponse::ok(
        "your account has been created",
        TokenResponse {
            user: user.into(),
            token,
        },
    ))
}

/// GET /api/v1/users/login
///
/// Credentials travel in a JSON body.
async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<ApiResponse<TokenResponse>, ApiError> {
    let Json(request) =
        payload.map_err(|e| ApiError::validation(LOGIN_FAILED, vec![e.body_text()]))?;

    let mut errors = FieldErrors::new();
    let email = errors.require("email", &request.email).map(normalize_email);
    let password = errors.require("password", &request.password);
    if let Some(email) = &email {
        errors.check(validate_email(email));
    }
    errors.finish(LOGIN_FAILED)?;

    let (Some(email), Some(password)) = (email, password) else {
        return Err(ApiError::validation(LOGIN_FAILED, vec![]));
    };

    debug!("Login attempt for {}", email);

    let Some(user) = state.db.get_user_by_email(&email).await? else {
        metrics::counter!("portrait_logins_total", "outcome" => "unknown_user").increment(1);
        return Err(ApiError::bad_request(LOGIN_FAILED));
    };

    match verify_password(password, &user.password_hash) {
        Ok(true) => {}
        Ok(false) => {
            metrics::counter!("portrait_logins_total", "outcome" => "bad_password").increment(1);
            return Err(ApiError::unauthorized(LOGIN_FAILED));
        }
        Err(e) => {
            warn!("Stored hash for user {} is unusable: {}", user.id, e);
            return Err(ApiError::Auth(e));
        }
    }

    let token = issue_token(&state, &user)?;

    metrics::counter!("portrait_logins_total", "outcome" => "success").increment(1);
    info!("User {} logged in successfully", user.username);

    Ok(ApiResponse::ok(
        "login success",
        TokenResponse {
            user: user.into(),
            token,
        },
    ))
}

/// Create account routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/users/register", post(register))
        .route("/api/v1/users/login", get(login))
}
