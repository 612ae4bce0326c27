use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use tracing::warn;

use crate::extractors::auth_extractor::AuthUser;
use crate::structs::post::{PublicPost, UpdatePost};
use crate::utils::app_error::AppError;
use crate::utils::notifications::notify_interested_users;
use crate::utils::post::{fetch_post_row, load_public_posts};
use crate::AppState;

pub async fn update_post_route(
    State(app_state): State<Arc<AppState>>,
    AuthUser(auth_user): AuthUser,
    Path(post_id): Path<i64>,
    Json(update): Json<UpdatePost>,
) -> Result<Json<PublicPost>, AppError> {
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
    if author_id != auth_user.id {
        return Err(AppError::forbidden("You can only edit your own posts."));
    }

    let title = update.title.as_deref().map(str::trim);
    let content = update.content.as_deref().map(str::trim);
    if title.is_some_and(str::is_empty) {
        return Err(AppError::bad_request("The title of a post cannot be empty."));
    }
    if content.is_some_and(str::is_empty) {
        return Err(AppError::bad_request("The content of a post cannot be empty."));
    }

    let new_title: String = sqlx::query_scalar(
        "UPDATE posts SET title = COALESCE($1, title), content = COALESCE($2, content), \
         image_url = COALESCE($3, image_url) WHERE id = $4 RETURNING title",
    )
    .bind(title)
    .bind(content)
    .bind(&update.image_url)
    .bind(post_id)
    .fetch_one(&app_state.pool)
    .await
    .map_err(|e| {
        warn!("Error updating post {post_id} : {e}");
        AppError::internal_server_error()
    })?;

    notify_interested_users(&app_state.pool, post_id, auth_user.id, &new_title).await;

    let row = fetch_post_row(&app_state.pool, post_id)
        .await?
        .ok_or_else(AppError::internal_server_error)?;
    let mut posts = load_public_posts(&app_state.pool, vec![row]).await?;

    Ok(Json(posts.remove(0)))
}
