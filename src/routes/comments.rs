use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use hyper::StatusCode;
use time::OffsetDateTime;
use tracing::warn;

use crate::extractors::auth_extractor::AuthUser;
use crate::structs::comment::{NewComment, PublicComment};
use crate::structs::user::UserSummary;
use crate::utils::app_error::AppError;
use crate::utils::notifications::{notify_best_effort, NewNotification};
use crate::AppState;

#[derive(sqlx::FromRow)]
struct CommentRow {
    id: i64,
    content: String,
    post_id: i64,
    created_at: OffsetDateTime,
    author_id: i64,
    author_name: String,
    author_image: Option<String>,
}

impl From<CommentRow> for PublicComment {
    fn from(row: CommentRow) -> Self {
        PublicComment {
            id: row.id,
            content: row.content,
            post_id: row.post_id,
            created_at: row.created_at,
            author: UserSummary {
                id: row.author_id,
                name: row.author_name,
                image: row.author_image,
            },
        }
    }
}

pub async fn get_comments_route(
    State(app_state): State<Arc<AppState>>,
    Path(post_id): Path<i64>,
) -> Result<Json<Vec<PublicComment>>, AppError> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM posts WHERE id = $1)")
        .bind(post_id)
        .fetch_one(&app_state.pool)
        .await
        .map_err(|e| {
            warn!("Error checking post {post_id} : {e}");
            AppError::internal_server_error()
        })?;
    if !exists {
        return Err(AppError::not_found("Post not found."));
    }

    let comments = sqlx::query_as::<_, CommentRow>(
        "SELECT c.id, c.content, c.post_id, c.created_at, \
         u.id AS author_id, u.name AS author_name, u.image AS author_image \
         FROM comments c JOIN users u ON u.id = c.author_id \
         WHERE c.post_id = $1 ORDER BY c.created_at DESC",
    )
    .bind(post_id)
    .fetch_all(&app_state.pool)
    .await
    .map_err(|e| {
        warn!("Error fetching comments of post {post_id} : {e}");
        AppError::internal_server_error()
    })?;

    Ok(Json(comments.into_iter().map(PublicComment::from).collect()))
}

#[derive(sqlx::FromRow)]
struct PostTarget {
    author_id: i64,
    title: String,
}

pub async fn create_comment_route(
    State(app_state): State<Arc<AppState>>,
    AuthUser(auth_user): AuthUser,
    Path(post_id): Path<i64>,
    Json(new_comment): Json<NewComment>,
) -> Result<(StatusCode, Json<PublicComment>), AppError> {
    let Some(auth_user) = auth_user else {
        return Err(AppError::unauthorized());
    };

    let content = new_comment.content.trim();
    if content.is_empty() {
        return Err(AppError::bad_request("A comment cannot be empty."));
    }

    let post = sqlx::query_as::<_, PostTarget>("SELECT author_id, title FROM posts WHERE id = $1")
        .bind(post_id)
        .fetch_optional(&app_state.pool)
        .await
        .map_err(|e| {
            warn!("Error fetching post {post_id} : {e}");
            AppError::internal_server_error()
        })?
        .ok_or_else(|| AppError::not_found("Post not found."))?;

    #[derive(sqlx::FromRow)]
    struct InsertedComment {
        id: i64,
        created_at: OffsetDateTime,
    }

    let inserted = sqlx::query_as::<_, InsertedComment>(
        "INSERT INTO comments (content, author_id, post_id) VALUES ($1, $2, $3) RETURNING id, created_at",
    )
    .bind(content)
    .bind(auth_user.id)
    .bind(post_id)
    .fetch_one(&app_state.pool)
    .await
    .map_err(|e| {
        warn!("Error inserting comment of user {} on post {post_id} : {e}", auth_user.id);
        AppError::internal_server_error()
    })?;

    notify_best_effort(
        &app_state.pool,
        NewNotification::comment(
            post.author_id,
            auth_user.id,
            &auth_user.name,
            post_id,
            &post.title,
            inserted.id,
        ),
    )
    .await;

    let comment = PublicComment {
        id: inserted.id,
        content: content.to_string(),
        post_id,
        created_at: inserted.created_at,
        author: UserSummary {
            id: auth_user.id,
            name: auth_user.name.clone(),
            image: auth_user.image.clone(),
        },
    };

    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn delete_comment_route(
    State(app_state): State<Arc<AppState>>,
    AuthUser(auth_user): AuthUser,
    Path((post_id, comment_id)): Path<(i64, i64)>,
) -> Result<StatusCode, AppError> {
    let Some(auth_user) = auth_user else {
        return Err(AppError::unauthorized());
    };

    let author_id: Option<i64> =
        sqlx::query_scalar("SELECT author_id FROM comments WHERE id = $1 AND post_id = $2")
            .bind(comment_id)
            .bind(post_id)
            .fetch_optional(&app_state.pool)
            .await
            .map_err(|e| {
                warn!("Error fetching comment {comment_id} : {e}");
                AppError::internal_server_error()
            })?;

    let Some(author_id) = author_id else {
        return Err(AppError::not_found("Comment not found."));
    };
    if author_id != auth_user.id {
        return Err(AppError::forbidden("You can only delete your own comments."));
    }

    sqlx::query("DELETE FROM comments WHERE id = $1")
        .bind(comment_id)
        .execute(&app_state.pool)
        .await
        .map_err(|e| {
            warn!("Error deleting comment {comment_id} : {e}");
            AppError::internal_server_error()
        })?;

    Ok(StatusCode::OK)
}
