use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;

use crate::extractors::auth_extractor::AuthUser;
use crate::structs::post::PublicPost;
use crate::structs::user::Role;
use crate::utils::app_error::AppError;
use crate::utils::post::{fetch_post_row, load_public_posts};
use crate::AppState;

pub async fn get_post_route(
    State(app_state): State<Arc<AppState>>,
    AuthUser(auth_user): AuthUser,
    Path(post_id): Path<i64>,
) -> Result<Json<PublicPost>, AppError> {
    let row = fetch_post_row(&app_state.pool, post_id)
        .await?
        .ok_or_else(|| AppError::not_found("Post not found."))?;

    // Drafts are only visible to their author and to admins.
    if !row.published {
        let allowed = auth_user
            .as_ref()
            .map(|user| user.id == row.author_id || user.role == Role::Admin)
            .unwrap_or(false);
        if !allowed {
            return Err(AppError::not_found("Post not found."));
        }
    }

    let mut posts = load_public_posts(&app_state.pool, vec![row]).await?;
    Ok(Json(posts.remove(0)))
}
