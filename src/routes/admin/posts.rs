use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use hyper::StatusCode;
use tracing::warn;

use crate::extractors::auth_extractor::AdminUser;
use crate::structs::post::PublicPost;
use crate::utils::app_error::AppError;
use crate::utils::post::{build_admin_listing_query, load_public_posts, PostRow};
use crate::AppState;

pub async fn admin_list_posts_route(
    State(app_state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
) -> Result<Json<Vec<PublicPost>>, AppError> {
    let rows: Vec<PostRow> = build_admin_listing_query()
        .build_query_as()
        .fetch_all(&app_state.pool)
        .await
        .map_err(|e| {
            warn!("Error listing posts for moderation : {e}");
            AppError::internal_server_error()
        })?;

    let posts = load_public_posts(&app_state.pool, rows).await?;
    Ok(Json(posts))
}

pub async fn admin_post_action_route(
    State(app_state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    Path((post_id, action)): Path<(i64, String)>,
) -> Result<StatusCode, AppError> {
    if !matches!(action.as_str(), "approve" | "reject" | "delete") {
        return Err(AppError::not_found("Unknown action."));
    }

    let published: Option<bool> = sqlx::query_scalar("SELECT published FROM posts WHERE id = $1")
        .bind(post_id)
        .fetch_optional(&app_state.pool)
        .await
        .map_err(|e| {
            warn!("Error fetching post {post_id} : {e}");
            AppError::internal_server_error()
        })?;

    let Some(published) = published else {
        return Err(AppError::not_found("Post not found."));
    };

    let query = match action.as_str() {
        "approve" => {
            if published {
                return Err(AppError::conflict("This post is already published."));
            }
            "UPDATE posts SET published = TRUE WHERE id = $1"
        }
        "reject" => {
            if !published {
                return Err(AppError::conflict("This post is already unpublished."));
            }
            "UPDATE posts SET published = FALSE WHERE id = $1"
        }
        _ => "DELETE FROM posts WHERE id = $1",
    };

    sqlx::query(query)
        .bind(post_id)
        .execute(&app_state.pool)
        .await
        .map_err(|e| {
            warn!("Error applying `{action}` to post {post_id} : {e}");
            AppError::internal_server_error()
        })?;

    Ok(StatusCode::OK)
}
