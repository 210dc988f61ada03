//! User photo operations

use chrono::Utc;
use sqlx::Row;

use crate::error::DbError;
use crate::models::{NewUserPhoto, UserPhoto};

use super::Database;

impl Database {
    /// Insert the photo row for a user
    ///
    /// A user owns at most one row; a second insert fails with `DbError::Duplicate`.
    pub async fn insert_user_photo(&self, photo: NewUserPhoto) -> Result<UserPhoto, DbError> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO user_photos (user_id, title, caption, photo_url, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(photo.user_id)
        .bind(&photo.title)
        .bind(&photo.caption)
        .bind(&photo.photo_url)
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DbError::from_insert(e, format!("Photo for user {}", photo.user_id)))?;

        Ok(UserPhoto {
            id: result.get("id"),
            user_id: photo.user_id,
            title: photo.title,
            caption: photo.caption,
            photo_url: photo.photo_url,
            created_at: now,
            updated_at: now,
        })
    }

    /// Get the photo row owned by a user
    pub async fn get_user_photo(&self, user_id: i64) -> Result<Option<UserPhoto>, DbError> {
        let result = sqlx::query(
            r#"
            SELECT id, user_id, title, caption, photo_url, created_at, updated_at
            FROM user_photos
            WHERE user_id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        result.map(|row| UserPhoto::try_from(&row).map_err(DbError::from)).transpose()
    }

    /// Count photo rows for a user, including rows whose URL was cleared
    pub async fn count_user_photos(&self, user_id: i64) -> Result<i64, DbError> {
        let result = sqlx::query("SELECT COUNT(*) as count FROM user_photos WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(result.get("count"))
    }

    /// Persist title, caption and URL of an existing photo row
    pub async fn save_user_photo(&self, photo: &UserPhoto) -> Result<UserPhoto, DbError> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE user_photos
            SET title = ?, caption = ?, photo_url = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&photo.title)
        .bind(&photo.caption)
        .bind(&photo.photo_url)
        .bind(now.to_rfc3339())
        .bind(photo.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound(format!("Photo: {}", photo.id)));
        }

        Ok(UserPhoto {
            updated_at: now,
            ..photo.clone()
        })
    }

    /// Clear the stored URL of a user's photo, keeping the row
    pub async fn clear_user_photo_url(&self, user_id: i64) -> Result<bool, DbError> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE user_photos
            SET photo_url = '', updated_at = ?
            WHERE user_id = ?
            "#,
        )
        .bind(now.to_rfc3339())
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
