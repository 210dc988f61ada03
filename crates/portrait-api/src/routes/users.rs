//! Profile management routes

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    routing::put,
};
use portrait_auth::hash_password;
use portrait_db::{DbError, UpdateUser};
use tracing::{debug, info, warn};

use crate::error::ApiError;
use crate::response::ApiResponse;
use crate::state::AppState;

use super::auth::CurrentUser;
use super::types::{DeleteResponse, UpdateUserRequest, UserResponse};
use super::validation::{
    FieldErrors, normalize_email, validate_email, validate_password, validate_username,
};

const UPDATE_FAILED: &str = "failed to update profile";

/// Only the account owner may act on `/users/{id}`
fn ensure_owner(current: &CurrentUser, user_id: i64) -> Result<(), ApiError> {
    if current.0.id != user_id {
        debug!("User {} attempted to modify user {}", current.0.id, user_id);
        return Err(ApiError::unauthorized("unauthorized"));
    }
    Ok(())
}

/// PUT /api/v1/users/{userId}
async fn update_user(
    current: CurrentUser,
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<ApiResponse<UserResponse>, ApiError> {
    ensure_owner(&current, user_id)?;

    let Json(request) =
        payload.map_err(|e| ApiError::validation(UPDATE_FAILED, vec![e.body_text()]))?;

    let username = request.username.as_deref().map(str::trim);
    let email = request.email.as_deref().map(normalize_email);

    let mut errors = FieldErrors::new();
    if let Some(username) = username {
        errors.check(validate_username(username));
    }
    if let Some(email) = &email {
        errors.check(validate_email(email));
    }
    if let Some(password) = &request.password {
        errors.check(validate_password(password));
    }
    errors.finish(UPDATE_FAILED)?;

    let update = UpdateUser {
        username: username.map(str::to_string),
        email,
        password_hash: request.password.as_deref().map(hash_password).transpose()?,
    };

    if update.is_empty() {
        return Ok(ApiResponse::ok("profile updated", current.0.into()));
    }

    let user = match state.db.update_user(user_id, update).await {
        Ok(Some(user)) => user,
        Ok(None) => return Err(ApiError::bad_request(UPDATE_FAILED)),
        Err(DbError::Duplicate(msg)) => {
            debug!("Profile update rejected: {}", msg);
            return Err(ApiError::bad_request(UPDATE_FAILED));
        }
        Err(e) => return Err(e.into()),
    };

    info!("Updated user: {}", user.id);

    Ok(ApiResponse::ok("profile updated", user.into()))
}

/// DELETE /api/v1/users/{userId}
///
/// Removes the account, its photo row, and the stored photo file.
async fn delete_user(
    current: CurrentUser,
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<ApiResponse<DeleteResponse>, ApiError> {
    ensure_owner(&current, user_id)?;

    debug!("Deleting user: {}", user_id);

    let photo = state.db.get_user_photo(user_id).await?;

    if !state.db.delete_user(user_id).await? {
        return Err(ApiError::bad_request_with(
            "failed to delete account",
            serde_json::json!({ "is_deleted": false }),
        ));
    }

    if let Some(photo) = photo.filter(|p| p.has_file())
        && let Err(e) = state.storage.delete(&photo.photo_url).await
    {
        warn!("Failed to remove photo file {}: {}", photo.photo_url, e);
    }

    info!("Deleted user: {}", user_id);

    Ok(ApiResponse::ok(
        "account deleted",
        DeleteResponse { is_deleted: true },
    ))
}

/// Create user routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/api/v1/users/{user_id}", put(update_user).delete(delete_user))
}
