use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use tracing::warn;

use crate::extractors::auth_extractor::AuthUser;
use crate::utils::app_error::AppError;
use crate::utils::notifications::{notify_best_effort, NewNotification};
use crate::AppState;

#[derive(Serialize)]
pub struct LikeResponse {
    pub liked: bool,
}

#[derive(sqlx::FromRow)]
struct PostTarget {
    author_id: i64,
    title: String,
}

pub async fn like_post_route(
    State(app_state): State<Arc<AppState>>,
    AuthUser(auth_user): AuthUser,
    Path(post_id): Path<i64>,
) -> Result<Json<LikeResponse>, AppError> {
    let Some(auth_user) = auth_user else {
        return Err(AppError::unauthorized());
    };

    let post = sqlx::query_as::<_, PostTarget>("SELECT author_id, title FROM posts WHERE id = $1")
        .bind(post_id)
        .fetch_optional(&app_state.pool)
        .await
        .map_err(|e| {
            warn!("Error fetching post {post_id} : {e}");
            AppError::internal_server_error()
        })?
        .ok_or_else(|| AppError::not_found("Post not found."))?;

    // Toggle in two single-row statements : the delete wins when a like
    // exists, otherwise the insert does, and the unique key absorbs any
    // concurrent duplicate.
    let deleted = sqlx::query("DELETE FROM likes WHERE user_id = $1 AND post_id = $2")
        .bind(auth_user.id)
        .bind(post_id)
        .execute(&app_state.pool)
        .await
        .map_err(|e| {
            warn!("Error removing like of user {} on post {post_id} : {e}", auth_user.id);
            AppError::internal_server_error()
        })?
        .rows_affected();

    if deleted > 0 {
        return Ok(Json(LikeResponse { liked: false }));
    }

    let inserted = sqlx::query(
        "INSERT INTO likes (user_id, post_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
    )
    .bind(auth_user.id)
    .bind(post_id)
    .execute(&app_state.pool)
    .await
    .map_err(|e| {
        warn!("Error inserting like of user {} on post {post_id} : {e}", auth_user.id);
        AppError::internal_server_error()
    })?
    .rows_affected();

    if inserted > 0 {
        notify_best_effort(
            &app_state.pool,
            NewNotification::like(post.author_id, auth_user.id, &auth_user.name, post_id, &post.title),
        )
        .await;
    }

    Ok(Json(LikeResponse { liked: true }))
}
