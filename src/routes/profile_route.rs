use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use time::OffsetDateTime;
use tracing::warn;

use crate::extractors::auth_extractor::AuthUser;
use crate::structs::post::PublicPost;
use crate::utils::app_error::AppError;
use crate::utils::notifications::{notify_best_effort, NewNotification};
use crate::utils::post::{build_author_listing_query, load_public_posts, PostRow};
use crate::AppState;

const RECENT_POSTS: i64 = 5;

#[derive(sqlx::FromRow)]
struct ProfileRow {
    id: i64,
    name: String,
    image: Option<String>,
    created_at: OffsetDateTime,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub id: i64,
    pub name: String,
    pub image: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub post_count: i64,
    pub posts: Vec<PublicPost>,
}

pub async fn profile_route(
    State(app_state): State<Arc<AppState>>,
    AuthUser(auth_user): AuthUser,
    Path(user_id): Path<i64>,
) -> Result<Json<ProfileResponse>, AppError> {
    let profile = sqlx::query_as::<_, ProfileRow>(
        "SELECT id, name, image, created_at FROM users WHERE id = $1",
    )
    .bind(user_id)
    .fetch_optional(&app_state.pool)
    .await
    .map_err(|e| {
        warn!("Error fetching user {user_id} : {e}");
        AppError::internal_server_error()
    })?
    .ok_or_else(|| AppError::not_found("User not found."))?;

    let post_count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM posts WHERE author_id = $1 AND published = TRUE",
    )
    .bind(user_id)
    .fetch_one(&app_state.pool)
    .await
    .map_err(|e| {
        warn!("Error counting posts of user {user_id} : {e}");
        AppError::internal_server_error()
    })?;

    let rows: Vec<PostRow> = build_author_listing_query(user_id, RECENT_POSTS)
        .build_query_as()
        .fetch_all(&app_state.pool)
        .await
        .map_err(|e| {
            warn!("Error fetching posts of user {user_id} : {e}");
            AppError::internal_server_error()
        })?;
    let posts = load_public_posts(&app_state.pool, rows).await?;

    // The view notification must never delay the page, so it runs after the
    // handler as a detached task.
    if let Some(viewer) = auth_user {
        if viewer.id != user_id {
            let pool = app_state.pool.clone();
            tokio::spawn(async move {
                notify_best_effort(
                    &pool,
                    NewNotification::profile_view(user_id, viewer.id, &viewer.name),
                )
                .await;
            });
        }
    }

    Ok(Json(ProfileResponse {
        id: profile.id,
        name: profile.name,
        image: profile.image,
        created_at: profile.created_at,
        post_count,
        posts,
    }))
}
