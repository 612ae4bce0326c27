use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use tracing::warn;

use crate::extractors::auth_extractor::AuthUser;
use crate::utils::app_error::AppError;
use crate::AppState;

#[derive(Serialize)]
pub struct SaveResponse {
    pub saved: bool,
}

async fn check_post_exists(app_state: &AppState, post_id: i64) -> Result<(), AppError> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM posts WHERE id = $1)")
        .bind(post_id)
        .fetch_one(&app_state.pool)
        .await
        .map_err(|e| {
            warn!("Error checking post {post_id} : {e}");
            AppError::internal_server_error()
        })?;

    if exists {
        Ok(())
    } else {
        Err(AppError::not_found("Post not found."))
    }
}

pub async fn get_saved_state_route(
    State(app_state): State<Arc<AppState>>,
    AuthUser(auth_user): AuthUser,
    Path(post_id): Path<i64>,
) -> Result<Json<SaveResponse>, AppError> {
    let Some(auth_user) = auth_user else {
        return Err(AppError::unauthorized());
    };

    check_post_exists(&app_state, post_id).await?;

    let saved: bool = sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM interested_posts WHERE user_id = $1 AND post_id = $2)",
    )
    .bind(auth_user.id)
    .bind(post_id)
    .fetch_one(&app_state.pool)
    .await
    .map_err(|e| {
        warn!("Error checking saved state of post {post_id} : {e}");
        AppError::internal_server_error()
    })?;

    Ok(Json(SaveResponse { saved }))
}

/// Same toggle shape as the like route, without the notification side
/// effect.
pub async fn toggle_save_route(
    State(app_state): State<Arc<AppState>>,
    AuthUser(auth_user): AuthUser,
    Path(post_id): Path<i64>,
) -> Result<Json<SaveResponse>, AppError> {
    let Some(auth_user) = auth_user else {
        return Err(AppError::unauthorized());
    };

    check_post_exists(&app_state, post_id).await?;

    let deleted = sqlx::query("DELETE FROM interested_posts WHERE user_id = $1 AND post_id = $2")
        .bind(auth_user.id)
        .bind(post_id)
        .execute(&app_state.pool)
        .await
        .map_err(|e| {
            warn!("Error removing saved post {post_id} of user {} : {e}", auth_user.id);
            AppError::internal_server_error()
        })?
        .rows_affected();

    if deleted > 0 {
        return Ok(Json(SaveResponse { saved: false }));
    }

    sqlx::query(
        "INSERT INTO interested_posts (user_id, post_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
    )
    .bind(auth_user.id)
    .bind(post_id)
    .execute(&app_state.pool)
    .await
    .map_err(|e| {
        warn!("Error saving post {post_id} for user {} : {e}", auth_user.id);
        AppError::internal_server_error()
    })?;

    Ok(Json(SaveResponse { saved: true }))
}
