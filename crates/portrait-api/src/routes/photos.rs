//! Profile photo routes
//!
//! Each user owns at most one photo row. Uploading creates it, updating
//! replaces any of title, caption and file, and removing clears the stored
//! URL while keeping the row.

use axum::{
    Router,
    extract::{Multipart, State},
    routing::get,
};
use bytes::Bytes;
use chrono::Utc;
use portrait_db::{DbError, NewUserPhoto};
use portrait_storage::photo_object_path;
use serde_json::json;
use tracing::{debug, error, info, warn};

use crate::error::ApiError;
use crate::response::ApiResponse;
use crate::state::AppState;

use super::auth::CurrentUser;
use super::types::{DeleteResponse, PhotoResponse, UploadResponse};
use super::validation::{FieldErrors, photo_extension};

const UPLOAD_FAILED: &str = "failed to upload user photo";
const UPDATE_FAILED: &str = "failed to update user photo";
const DELETE_FAILED: &str = "failed to delete user photo";

/// File part of a photo form
struct UploadedFile {
    file_name: String,
    data: Bytes,
}

/// Parsed `multipart/form-data` photo form
#[derive(Default)]
struct PhotoForm {
    title: Option<String>,
    caption: Option<String>,
    file: Option<UploadedFile>,
}

/// Read the `title`, `caption` and `file` parts of a photo form
///
/// Unknown parts are ignored. Empty text values count as absent.
async fn read_photo_form(
    mut multipart: Multipart,
    max_file_size: usize,
    message: &str,
) -> Result<PhotoForm, ApiError> {
    let mut form = PhotoForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation(message, vec![e.body_text()]))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        match name.as_str() {
            "title" | "caption" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::validation(message, vec![e.body_text()]))?;
                let value = Some(value.trim().to_string()).filter(|v| !v.is_empty());
                if name == "title" {
                    form.title = value;
                } else {
                    form.caption = value;
                }
            }
            "file" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::validation(message, vec![e.body_text()]))?;
                if data.len() > max_file_size {
                    return Err(ApiError::validation(
                        message,
                        vec![format!(
                            "file too large; maximum size is {} bytes",
                            max_file_size
                        )],
                    ));
                }
                if !data.is_empty() {
                    form.file = Some(UploadedFile { file_name, data });
                }
            }
            other => debug!("Ignoring form field: {}", other),
        }
    }

    Ok(form)
}

/// Delete a just-written file after a failed insert
///
/// Uploads landing in the same second share a path, so the file stays when
/// the user's row already points at it.
async fn remove_unless_recorded(state: &AppState, user_id: i64, path: &str) {
    match state.db.get_user_photo(user_id).await {
        Ok(Some(photo)) if photo.photo_url == path => {
            debug!("Keeping {}, recorded by a concurrent upload", path);
        }
        Ok(_) => {
            if let Err(e) = state.storage.delete(path).await {
                warn!("Failed to remove orphaned photo {}: {}", path, e);
            }
        }
        Err(e) => warn!("Leaving {} in place, photo lookup failed: {}", path, e),
    }
}

/// POST /api/v1/photos
async fn upload_photo(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<ApiResponse<UploadResponse>, ApiError> {
    let not_uploaded = || json!({ "is_uploaded": false });

    if state.db.count_user_photos(user.id).await? > 0 {
        return Err(ApiError::bad_request_with("photo already exist", not_uploaded()));
    }

    let form = read_photo_form(multipart, state.upload.max_file_size, UPLOAD_FAILED).await?;

    let mut errors = FieldErrors::new();
    let title = errors.require("title", &form.title).map(str::to_string);
    let caption = errors.require("caption", &form.caption).map(str::to_string);
    let extension = match &form.file {
        Some(file) => photo_extension(&file.file_name).map_err(|e| errors.push(e)).ok(),
        None => {
            errors.push("file is required");
            None
        }
    };
    errors.finish(UPLOAD_FAILED)?;

    let (Some(title), Some(caption), Some(extension), Some(file)) =
        (title, caption, extension, form.file)
    else {
        return Err(ApiError::validation(UPLOAD_FAILED, vec![]));
    };

    let path = photo_object_path(user.id, Utc::now(), &extension);
    if let Err(e) = state.storage.write(&path, file.data).await {
        error!("Failed to store photo for user {}: {}", user.id, e);
        return Err(ApiError::bad_request_with(UPLOAD_FAILED, not_uploaded()));
    }

    let inserted = state
        .db
        .insert_user_photo(NewUserPhoto {
            user_id: user.id,
            title,
            caption,
            photo_url: path.clone(),
        })
        .await;

    if let Err(e) = inserted {
        // Lost a race with a concurrent upload, or the insert failed outright
        remove_unless_recorded(&state, user.id, &path).await;
        return Err(match e {
            DbError::Duplicate(_) => {
                ApiError::bad_request_with("photo already exist", not_uploaded())
            }
            other => {
                error!("Failed to record photo for user {}: {}", user.id, other);
                ApiError::bad_request_with(UPLOAD_FAILED, not_uploaded())
            }
        });
    }

    metrics::counter!("portrait_photo_uploads_total").increment(1);
    info!("User {} uploaded photo {}", user.id, path);

    Ok(ApiResponse::ok(
        "upload user photo success",
        UploadResponse { is_uploaded: true },
    ))
}

/// GET /api/v1/photos
async fn get_photo(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<ApiResponse<PhotoResponse>, ApiError> {
    let photo = state
        .db
        .get_user_photo(user.id)
        .await?
        .filter(|p| p.has_file())
        .ok_or_else(|| ApiError::bad_request("user photo still empty"))?;

    Ok(ApiResponse::ok("", photo.into()))
}

/// PUT /api/v1/photos
async fn update_photo(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<ApiResponse<PhotoResponse>, ApiError> {
    let mut photo = state
        .db
        .get_user_photo(user.id)
        .await?
        .ok_or_else(|| ApiError::bad_request("photo not created yet"))?;

    let form = read_photo_form(multipart, state.upload.max_file_size, UPDATE_FAILED).await?;

    let previous_url = photo.photo_url.clone();
    let mut replaced_file = false;

    if let Some(file) = form.file {
        let extension = photo_extension(&file.file_name)
            .map_err(|e| ApiError::validation(UPDATE_FAILED, vec![e]))?;
        let path = photo_object_path(user.id, Utc::now(), &extension);

        if let Err(e) = state.storage.write(&path, file.data).await {
            error!("Failed to store photo for user {}: {}", user.id, e);
            return Err(ApiError::bad_request(UPDATE_FAILED));
        }

        photo.photo_url = path;
        replaced_file = true;
    }

    if let Some(title) = form.title {
        photo.title = title;
    }
    if let Some(caption) = form.caption {
        photo.caption = caption;
    }

    let photo = match state.db.save_user_photo(&photo).await {
        Ok(saved) => saved,
        Err(e) => {
            error!("Failed to save photo for user {}: {}", user.id, e);
            if replaced_file {
                remove_unless_recorded(&state, user.id, &photo.photo_url).await;
            }
            return Err(ApiError::bad_request(UPDATE_FAILED));
        }
    };

    if replaced_file
        && !previous_url.is_empty()
        && previous_url != photo.photo_url
        && let Err(e) = state.storage.delete(&previous_url).await
    {
        warn!("Failed to remove replaced photo {}: {}", previous_url, e);
    }

    info!("User {} updated photo {}", user.id, photo.id);

    Ok(ApiResponse::ok("update user photo success", photo.into()))
}

/// DELETE /api/v1/photos
///
/// Clears the photo URL; the row stays so a later upload goes through PUT.
async fn delete_photo(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<ApiResponse<DeleteResponse>, ApiError> {
    let not_deleted = || json!({ "is_deleted": false });

    let Some(photo) = state.db.get_user_photo(user.id).await? else {
        return Err(ApiError::bad_request_with(DELETE_FAILED, not_deleted()));
    };

    match state.db.clear_user_photo_url(user.id).await {
        Ok(true) => {}
        Ok(false) => return Err(ApiError::bad_request_with(DELETE_FAILED, not_deleted())),
        Err(e) => {
            error!("Failed to clear photo for user {}: {}", user.id, e);
            return Err(ApiError::bad_request_with(DELETE_FAILED, not_deleted()));
        }
    }

    if photo.has_file()
        && let Err(e) = state.storage.delete(&photo.photo_url).await
    {
        warn!("Failed to remove photo file {}: {}", photo.photo_url, e);
    }

    info!("User {} removed photo {}", user.id, photo.id);

    Ok(ApiResponse::ok(
        "delete user photo success",
        DeleteResponse { is_deleted: true },
    ))
}

/// Create photo routes
pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/api/v1/photos",
        get(get_photo)
            .post(upload_photo)
            .put(update_photo)
            .delete(delete_photo),
    )
}
