use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use sqlx::PgPool;
use time::OffsetDateTime;
use tracing::warn;

use crate::extractors::auth_extractor::AdminUser;
use crate::utils::analytics::{
    monthly_series, per_user_rate, window_start, MonthCount, MonthlyStat, GROWTH_MONTHS,
};
use crate::utils::app_error::AppError;
use crate::utils::post::TRENDING_WINDOW;
use crate::AppState;

#[derive(Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TopUser {
    pub id: i64,
    pub name: String,
    pub image: Option<String>,
    pub post_count: i64,
    pub comment_count: i64,
    pub like_count: i64,
}

#[derive(Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TopPost {
    pub id: i64,
    pub title: String,
    pub author_name: String,
    pub like_count: i64,
    pub comment_count: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Analytics {
    pub total_users: i64,
    pub total_posts: i64,
    pub total_comments: i64,
    pub total_likes: i64,
    pub banned_users: i64,
    pub published_posts: i64,
    pub draft_posts: i64,
    pub new_users_this_week: i64,
    pub new_posts_this_week: i64,
    pub engagement_rate: f64,
    pub posts_per_user: f64,
    pub top_users: Vec<TopUser>,
    pub top_posts: Vec<TopPost>,
    pub monthly_growth: Vec<MonthlyStat>,
}

async fn count(pool: &PgPool, query: &str) -> Result<i64, AppError> {
    sqlx::query_scalar(query).fetch_one(pool).await.map_err(|e| {
        warn!("Error computing analytics count : {e}");
        AppError::internal_server_error()
    })
}

async fn count_since(pool: &PgPool, query: &str, since: OffsetDateTime) -> Result<i64, AppError> {
    sqlx::query_scalar(query)
        .bind(since)
        .fetch_one(pool)
        .await
        .map_err(|e| {
            warn!("Error computing analytics count : {e}");
            AppError::internal_server_error()
        })
}

async fn month_counts(pool: &PgPool, table: &str, since: OffsetDateTime) -> Result<Vec<MonthCount>, AppError> {
    let query = format!(
        "SELECT EXTRACT(YEAR FROM created_at)::int AS year, \
         EXTRACT(MONTH FROM created_at)::int AS month, COUNT(*) AS count \
         FROM {table} WHERE created_at >= $1 GROUP BY 1, 2"
    );

    sqlx::query_as::<_, MonthCount>(&query)
        .bind(since)
        .fetch_all(pool)
        .await
        .map_err(|e| {
            warn!("Error computing monthly growth for {table} : {e}");
            AppError::internal_server_error()
        })
}

pub async fn analytics_route(
    State(app_state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
) -> Result<Json<Analytics>, AppError> {
    let pool = &app_state.pool;
    let now = OffsetDateTime::now_utc();
    let week_ago = now - TRENDING_WINDOW;

    let total_users = count(pool, "SELECT COUNT(*) FROM users").await?;
    let total_posts = count(pool, "SELECT COUNT(*) FROM posts").await?;
    let total_comments = count(pool, "SELECT COUNT(*) FROM comments").await?;
    let total_likes = count(pool, "SELECT COUNT(*) FROM likes").await?;
    let banned_users = count(pool, "SELECT COUNT(*) FROM users WHERE is_banned = TRUE").await?;
    let published_posts = count(pool, "SELECT COUNT(*) FROM posts WHERE published = TRUE").await?;

    let new_users_this_week =
        count_since(pool, "SELECT COUNT(*) FROM users WHERE created_at > $1", week_ago).await?;
    let new_posts_this_week =
        count_since(pool, "SELECT COUNT(*) FROM posts WHERE created_at > $1", week_ago).await?;

    let top_users = sqlx::query_as::<_, TopUser>(
        "SELECT u.id, u.name, u.image, \
         (SELECT COUNT(*) FROM posts p WHERE p.author_id = u.id) AS post_count, \
         (SELECT COUNT(*) FROM comments c WHERE c.author_id = u.id) AS comment_count, \
         (SELECT COUNT(*) FROM likes l WHERE l.user_id = u.id) AS like_count \
         FROM users u ORDER BY post_count DESC LIMIT 5",
    )
    .fetch_all(pool)
    .await
    .map_err(|e| {
        warn!("Error computing top users : {e}");
        AppError::internal_server_error()
    })?;

    let top_posts = sqlx::query_as::<_, TopPost>(
        "SELECT p.id, p.title, u.name AS author_name, \
         (SELECT COUNT(*) FROM likes l WHERE l.post_id = p.id) AS like_count, \
         (SELECT COUNT(*) FROM comments c WHERE c.post_id = p.id) AS comment_count \
         FROM posts p JOIN users u ON u.id = p.author_id \
         ORDER BY like_count DESC, comment_count DESC LIMIT 5",
    )
    .fetch_all(pool)
    .await
    .map_err(|e| {
        warn!("Error computing top posts : {e}");
        AppError::internal_server_error()
    })?;

    let since = window_start(now, GROWTH_MONTHS);
    let users_by_month = month_counts(pool, "users", since).await?;
    let posts_by_month = month_counts(pool, "posts", since).await?;

    Ok(Json(Analytics {
        total_users,
        total_posts,
        total_comments,
        total_likes,
        banned_users,
        published_posts,
        draft_posts: total_posts - published_posts,
        new_users_this_week,
        new_posts_this_week,
        engagement_rate: per_user_rate(total_likes + total_comments, total_users),
        posts_per_user: per_user_rate(total_posts, total_users),
        top_users,
        top_posts,
        monthly_growth: monthly_series(now, GROWTH_MONTHS, &users_by_month, &posts_by_month),
    }))
}
