use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use hyper::StatusCode;
use tracing::warn;

use crate::extractors::auth_extractor::AuthUser;
use crate::structs::post::{NewPost, PublicPost};
use crate::utils::app_error::AppError;
use crate::utils::post::{fetch_post_row, load_public_posts};
use crate::utils::tags::upsert_tags;
use crate::utils::validation::check_new_post_data;
use crate::AppState;

pub async fn publish_post_route(
    State(app_state): State<Arc<AppState>>,
    AuthUser(auth_user): AuthUser,
    Json(new_post): Json<NewPost>,
) -> Result<(StatusCode, Json<PublicPost>), AppError> {
    let Some(auth_user) = auth_user else {
        warn!("User not connected");
        return Err(AppError::unauthorized());
    };

    let title = new_post.title.trim();
    let content = new_post.content.trim();

    check_new_post_data(auth_user.id, title, content)?;

    let post_id: i64 = sqlx::query_scalar(
        "INSERT INTO posts (title, content, image_url, author_id) VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind(title)
    .bind(content)
    .bind(&new_post.image_url)
    .bind(auth_user.id)
    .fetch_one(&app_state.pool)
    .await
    .map_err(|e| {
        warn!("Error inserting post with author {} : {e}", auth_user.id);
        AppError::internal_server_error()
    })?;

    if let Some(tags) = &new_post.tags {
        let tags = upsert_tags(&app_state.pool, tags).await?;
        for tag in &tags {
            sqlx::query("INSERT INTO post_tags (post_id, tag_id) VALUES ($1, $2) ON CONFLICT DO NOTHING")
                .bind(post_id)
                .bind(tag.id)
                .execute(&app_state.pool)
                .await
                .map_err(|e| {
                    warn!("Error linking tag {} to post {post_id} : {e}", tag.id);
                    AppError::internal_server_error()
                })?;
        }
    }

    let row = fetch_post_row(&app_state.pool, post_id)
        .await?
        .ok_or_else(AppError::internal_server_error)?;
    let mut posts = load_public_posts(&app_state.pool, vec![row]).await?;

    Ok((StatusCode::CREATED, Json(posts.remove(0))))
}
