//! Request/Response DTOs

use portrait_db::{User, UserPhoto};
use serde::{Deserialize, Serialize};

// ==================== Account Types ====================

/// Registration request
///
/// Fields are optional so that every missing field is reported at once.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Login request
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Profile update request; absent fields are left unchanged
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Public view of a user (without password hash)
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
        }
    }
}

/// Registration/login payload
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub user: UserResponse,
    pub token: String,
}

// ==================== Photo Types ====================

/// Public view of a user's photo
#[derive(Debug, Serialize)]
pub struct PhotoResponse {
    pub id: i64,
    pub title: String,
    pub caption: String,
    pub photo_url: String,
    pub user_id: i64,
}

impl From<UserPhoto> for PhotoResponse {
    fn from(photo: UserPhoto) -> Self {
        Self {
            id: photo.id,
            title: photo.title,
            caption: photo.caption,
            photo_url: photo.photo_url,
            user_id: photo.user_id,
        }
    }
}

/// Upload outcome
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub is_uploaded: bool,
}

/// Deletion outcome
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub is_deleted: bool,
}
