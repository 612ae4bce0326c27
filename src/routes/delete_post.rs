use std::sync::Arc;

use axum::extract::{Path, State};
use hyper::StatusCode;
use tracing::warn;

use crate::extractors::auth_extractor::AuthUser;
use crate::structs::user::Role;
use crate::utils::app_error::AppError;
use crate::AppState;

pub async fn delete_post_route(
    State(app_state): State<Arc<AppState>>,
    AuthUser(auth_user): AuthUser,
    Path(post_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let Some(auth_user) = auth_user else {
        return Err(AppError::unauthorized());
    };

    let author_id: Option<i64> = sqlx::query_scalar("SELECT author_id FROM posts WHERE id = $1")
        .bind(post_id)
        .fetch_optional(&app_state.pool)
        .await
        .map_err(|e| {
            warn!("Error fetching post {post_id} : {e}");
            AppError::internal_server_error()
        })?;

    let Some(author_id) = author_id else {
        return Err(AppError::not_found("Post not found."));
    };
    if author_id != auth_user.id && auth_user.role != Role::Admin {
        return Err(AppError::forbidden("You can only delete your own posts."));
    }

    // Comments, likes, tag links and notifications go with it (FK cascade).
    sqlx::query("DELETE FROM posts WHERE id = $1")
        .bind(post_id)
        .execute(&app_state.pool)
        .await
        .map_err(|e| {
            warn!("Error deleting post {post_id} : {e}");
            AppError::internal_server_error()
        })?;

    Ok(StatusCode::OK)
}
