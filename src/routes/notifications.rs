use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use hyper::StatusCode;
use time::OffsetDateTime;
use tracing::warn;

use crate::extractors::auth_extractor::AuthUser;
use crate::structs::notification::{NotificationKind, PublicNotification};
use crate::structs::user::UserSummary;
use crate::utils::app_error::AppError;
use crate::AppState;

#[derive(sqlx::FromRow)]
struct NotificationRow {
    id: i64,
    kind: NotificationKind,
    title: String,
    message: String,
    post_id: Option<i64>,
    comment_id: Option<i64>,
    read: bool,
    created_at: OffsetDateTime,
    actor_id: Option<i64>,
    actor_name: Option<String>,
    actor_image: Option<String>,
}

pub async fn get_notifications_route(
    State(app_state): State<Arc<AppState>>,
    AuthUser(auth_user): AuthUser,
) -> Result<Json<Vec<PublicNotification>>, AppError> {
    let Some(auth_user) = auth_user else {
        return Err(AppError::unauthorized());
    };

    let rows = sqlx::query_as::<_, NotificationRow>(
        "SELECT n.id, n.kind, n.title, n.message, n.post_id, n.comment_id, n.read, n.created_at, \
         a.id AS actor_id, a.name AS actor_name, a.image AS actor_image \
         FROM notifications n LEFT JOIN users a ON a.id = n.actor_id \
         WHERE n.user_id = $1 ORDER BY n.created_at DESC LIMIT 50",
    )
    .bind(auth_user.id)
    .fetch_all(&app_state.pool)
    .await
    .map_err(|e| {
        warn!("Error fetching notifications of user {} : {e}", auth_user.id);
        AppError::internal_server_error()
    })?;

    let notifications = rows
        .into_iter()
        .map(|row| PublicNotification {
            id: row.id,
            kind: row.kind,
            title: row.title,
            message: row.message,
            post_id: row.post_id,
            comment_id: row.comment_id,
            read: row.read,
            created_at: row.created_at,
            actor: row.actor_id.map(|id| UserSummary {
                id,
                name: row.actor_name.unwrap_or_default(),
                image: row.actor_image,
            }),
        })
        .collect();

    Ok(Json(notifications))
}

/// Idempotent : marking an already-read notification, or an id that does not
/// belong to the caller, matches nothing and still succeeds.
pub async fn mark_read_route(
    State(app_state): State<Arc<AppState>>,
    AuthUser(auth_user): AuthUser,
    Path(notification_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let Some(auth_user) = auth_user else {
        return Err(AppError::unauthorized());
    };

    sqlx::query("UPDATE notifications SET read = TRUE WHERE id = $1 AND user_id = $2")
        .bind(notification_id)
        .bind(auth_user.id)
        .execute(&app_state.pool)
        .await
        .map_err(|e| {
            warn!("Error marking notification {notification_id} as read : {e}");
            AppError::internal_server_error()
        })?;

    Ok(StatusCode::OK)
}

pub async fn mark_all_read_route(
    State(app_state): State<Arc<AppState>>,
    AuthUser(auth_user): AuthUser,
) -> Result<StatusCode, AppError> {
    let Some(auth_user) = auth_user else {
        return Err(AppError::unauthorized());
    };

    sqlx::query("UPDATE notifications SET read = TRUE WHERE user_id = $1 AND read = FALSE")
        .bind(auth_user.id)
        .execute(&app_state.pool)
        .await
        .map_err(|e| {
            warn!("Error marking notifications of user {} as read : {e}", auth_user.id);
            AppError::internal_server_error()
        })?;

    Ok(StatusCode::OK)
}
