use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use hyper::StatusCode;
use serde::{Deserialize, Serialize};
use sqlx::{Postgres, QueryBuilder};
use time::OffsetDateTime;
use tracing::warn;

use crate::extractors::auth_extractor::AdminUser;
use crate::structs::user::Role;
use crate::utils::app_error::AppError;
use crate::AppState;

const USER_LISTING_SELECT: &str = "SELECT u.id, u.email, u.name, u.image, u.role, u.is_banned, u.created_at, \
     (SELECT COUNT(*) FROM posts p WHERE p.author_id = u.id) AS post_count, \
     (SELECT COUNT(*) FROM comments c WHERE c.author_id = u.id) AS comment_count, \
     (SELECT COUNT(*) FROM likes l WHERE l.user_id = u.id) AS like_count \
     FROM users u";

pub fn build_user_listing_query(search: Option<&str>) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new(USER_LISTING_SELECT);
    if let Some(search) = search.filter(|s| !s.trim().is_empty()) {
        let pattern = format!("%{}%", search.trim());
        query
            .push(" WHERE (u.name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR u.email ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    query.push(" ORDER BY u.created_at DESC");
    query
}

#[derive(sqlx::FromRow)]
struct UserListingRow {
    id: i64,
    email: String,
    name: String,
    image: Option<String>,
    role: Role,
    is_banned: bool,
    created_at: OffsetDateTime,
    post_count: i64,
    comment_count: i64,
    like_count: i64,
}

#[derive(Serialize)]
pub struct UserActivityCounts {
    pub posts: i64,
    pub comments: i64,
    pub likes: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModeratedUser {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub image: Option<String>,
    pub role: Role,
    pub is_banned: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub counts: UserActivityCounts,
}

#[derive(Deserialize)]
pub struct UserSearchParams {
    pub search: Option<String>,
}

pub async fn admin_list_users_route(
    State(app_state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    Query(params): Query<UserSearchParams>,
) -> Result<Json<Vec<ModeratedUser>>, AppError> {
    let rows: Vec<UserListingRow> = build_user_listing_query(params.search.as_deref())
        .build_query_as()
        .fetch_all(&app_state.pool)
        .await
        .map_err(|e| {
            warn!("Error listing users : {e}");
            AppError::internal_server_error()
        })?;

    let users = rows
        .into_iter()
        .map(|row| ModeratedUser {
            id: row.id,
            email: row.email,
            name: row.name,
            image: row.image,
            role: row.role,
            is_banned: row.is_banned,
            created_at: row.created_at,
            counts: UserActivityCounts {
                posts: row.post_count,
                comments: row.comment_count,
                likes: row.like_count,
            },
        })
        .collect();

    Ok(Json(users))
}

#[derive(sqlx::FromRow)]
struct TargetUser {
    role: Role,
    is_banned: bool,
}

pub async fn admin_user_action_route(
    State(app_state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Path((user_id, action)): Path<(i64, String)>,
) -> Result<StatusCode, AppError> {
    if !matches!(action.as_str(), "ban" | "unban" | "promote" | "demote" | "delete") {
        return Err(AppError::not_found("Unknown action."));
    }

    if user_id == admin.id {
        return Err(AppError::forbidden(
            "You cannot perform this action on your own account.",
        ));
    }

    let target = sqlx::query_as::<_, TargetUser>("SELECT role, is_banned FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(&app_state.pool)
        .await
        .map_err(|e| {
            warn!("Error fetching user {user_id} : {e}");
            AppError::internal_server_error()
        })?
        .ok_or_else(|| AppError::not_found("User not found."))?;

    let query = match action.as_str() {
        "ban" => {
            if target.is_banned {
                return Err(AppError::conflict("This user is already banned."));
            }
            // Banning also revokes any open session.
            sqlx::query("DELETE FROM sessions WHERE user_id = $1")
                .bind(user_id)
                .execute(&app_state.pool)
                .await
                .map_err(|e| {
                    warn!("Error revoking sessions of user {user_id} : {e}");
                    AppError::internal_server_error()
                })?;
            "UPDATE users SET is_banned = TRUE WHERE id = $1"
        }
        "unban" => {
            if !target.is_banned {
                return Err(AppError::conflict("This user is not banned."));
            }
            "UPDATE users SET is_banned = FALSE WHERE id = $1"
        }
        "promote" => {
            if target.role == Role::Admin {
                return Err(AppError::conflict("This user is already an admin."));
            }
            "UPDATE users SET role = 'ADMIN' WHERE id = $1"
        }
        "demote" => {
            if target.role == Role::User {
                return Err(AppError::conflict("This user is not an admin."));
            }
            "UPDATE users SET role = 'USER' WHERE id = $1"
        }
        // Posts, comments, likes and notifications follow (FK cascade).
        _ => "DELETE FROM users WHERE id = $1",
    };

    sqlx::query(query)
        .bind(user_id)
        .execute(&app_state.pool)
        .await
        .map_err(|e| {
            warn!("Error applying `{action}` to user {user_id} : {e}");
            AppError::internal_server_error()
        })?;

    Ok(StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_filters_name_and_email_case_insensitively() {
        let query = build_user_listing_query(Some("alice"));
        let sql = query.sql();
        assert!(sql.contains("u.name ILIKE"));
        assert!(sql.contains("u.email ILIKE"));
        assert!(sql.ends_with(" ORDER BY u.created_at DESC"));
    }

    #[test]
    fn blank_search_lists_everyone() {
        let query = build_user_listing_query(Some("  "));
        assert!(!query.sql().contains("ILIKE"));
    }
}
