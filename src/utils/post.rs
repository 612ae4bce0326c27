use std::collections::HashMap;

use sqlx::{PgPool, Postgres, QueryBuilder};
use time::{Duration, OffsetDateTime};
use tracing::warn;

use crate::structs::post::{EngagementRef, PostCounts, PostSort, PublicPost};
use crate::structs::tag::Tag;
use crate::structs::user::UserSummary;

use super::app_error::AppError;

/// Posts older than this never show up under `sort=trending`.
pub const TRENDING_WINDOW: Duration = Duration::days(7);

/// Shared SELECT for every post listing : the post, its author summary and
/// the like/comment counts the engagement sorts order by.
const LISTING_SELECT: &str = "SELECT p.id, p.title, p.content, p.image_url, p.published, p.created_at, \
     u.id AS author_id, u.name AS author_name, u.image AS author_image, \
     (SELECT COUNT(*) FROM likes l WHERE l.post_id = p.id) AS like_count, \
     (SELECT COUNT(*) FROM comments c WHERE c.post_id = p.id) AS comment_count \
     FROM posts p JOIN users u ON u.id = p.author_id";

#[derive(Debug, Default)]
pub struct PostFilter {
    pub search: Option<String>,
    pub tag: Option<String>,
    pub sort: PostSort,
}

#[derive(Debug, sqlx::FromRow)]
pub struct PostRow {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    pub published: bool,
    pub created_at: OffsetDateTime,
    pub author_id: i64,
    pub author_name: String,
    pub author_image: Option<String>,
    pub like_count: i64,
    pub comment_count: i64,
}

fn push_filters(query: &mut QueryBuilder<'static, Postgres>, filter: &PostFilter, now: OffsetDateTime) {
    if let Some(search) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
        let pattern = format!("%{}%", search.trim());
        query
            .push(" AND (p.title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR p.content ILIKE ")
            .push_bind(pattern)
            .push(")");
    }

    if let Some(tag) = filter.tag.as_deref().filter(|t| !t.trim().is_empty()) {
        query
            .push(" AND EXISTS (SELECT 1 FROM post_tags pt JOIN tags t ON t.id = pt.tag_id \
                 WHERE pt.post_id = p.id AND lower(t.name) = lower(")
            .push_bind(tag.trim().to_string())
            .push("))");
    }

    if filter.sort == PostSort::Trending {
        query
            .push(" AND p.created_at > ")
            .push_bind(now - TRENDING_WINDOW);
    }
}

pub fn order_clause(sort: PostSort) -> &'static str {
    match sort {
        PostSort::Latest => " ORDER BY p.created_at DESC",
        PostSort::Viral | PostSort::Trending => {
            " ORDER BY like_count DESC, comment_count DESC, p.created_at DESC"
        }
        PostSort::Interested => " ORDER BY like_count DESC, p.created_at DESC",
    }
}

pub fn build_listing_query(
    filter: &PostFilter,
    now: OffsetDateTime,
    limit: i64,
    offset: i64,
) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new(LISTING_SELECT);
    query.push(" WHERE p.published = TRUE");
    push_filters(&mut query, filter, now);
    query.push(order_clause(filter.sort));
    query.push(" LIMIT ").push_bind(limit);
    query.push(" OFFSET ").push_bind(offset);
    query
}

pub fn build_count_query(filter: &PostFilter, now: OffsetDateTime) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new("SELECT COUNT(*) FROM posts p");
    query.push(" WHERE p.published = TRUE");
    push_filters(&mut query, filter, now);
    query
}

/// Moderation listing : every post in any publish state, newest first.
pub fn build_admin_listing_query() -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new(LISTING_SELECT);
    query.push(" ORDER BY p.created_at DESC");
    query
}

/// Recent published posts of one author, for the public profile page.
pub fn build_author_listing_query(author_id: i64, limit: i64) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new(LISTING_SELECT);
    query.push(" WHERE p.published = TRUE AND p.author_id = ").push_bind(author_id);
    query.push(" ORDER BY p.created_at DESC LIMIT ").push_bind(limit);
    query
}

/// Fetch a single post row with counts, any publish state.
pub async fn fetch_post_row(pool: &PgPool, post_id: i64) -> Result<Option<PostRow>, AppError> {
    let mut query = QueryBuilder::new(LISTING_SELECT);
    query.push(" WHERE p.id = ").push_bind(post_id);

    query
        .build_query_as::<PostRow>()
        .fetch_optional(pool)
        .await
        .map_err(|e| {
            warn!("Error fetching post {post_id} : {e}");
            AppError::internal_server_error()
        })
}

#[derive(sqlx::FromRow)]
struct TagLink {
    post_id: i64,
    id: i64,
    name: String,
    color: String,
}

#[derive(sqlx::FromRow)]
struct EngagementRow {
    post_id: i64,
    user_id: i64,
}

/// Attach tags, raw like rows and interested rows to a page of post rows,
/// preserving the row order of the listing query.
pub async fn load_public_posts(pool: &PgPool, rows: Vec<PostRow>) -> Result<Vec<PublicPost>, AppError> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<i64> = rows.iter().map(|row| row.id).collect();

    let tag_links = sqlx::query_as::<_, TagLink>(
        "SELECT pt.post_id, t.id, t.name, t.color FROM post_tags pt \
         JOIN tags t ON t.id = pt.tag_id WHERE pt.post_id = ANY($1) ORDER BY t.name",
    )
    .bind(&ids)
    .fetch_all(pool)
    .await
    .map_err(|e| {
        warn!("Error fetching tags for posts : {e}");
        AppError::internal_server_error()
    })?;

    let likes = sqlx::query_as::<_, EngagementRow>(
        "SELECT post_id, user_id FROM likes WHERE post_id = ANY($1)",
    )
    .bind(&ids)
    .fetch_all(pool)
    .await
    .map_err(|e| {
        warn!("Error fetching likes for posts : {e}");
        AppError::internal_server_error()
    })?;

    let interested = sqlx::query_as::<_, EngagementRow>(
        "SELECT post_id, user_id FROM interested_posts WHERE post_id = ANY($1)",
    )
    .bind(&ids)
    .fetch_all(pool)
    .await
    .map_err(|e| {
        warn!("Error fetching interested rows for posts : {e}");
        AppError::internal_server_error()
    })?;

    let mut tags_by_post: HashMap<i64, Vec<Tag>> = HashMap::new();
    for link in tag_links {
        tags_by_post.entry(link.post_id).or_default().push(Tag {
            id: link.id,
            name: link.name,
            color: link.color,
        });
    }

    let mut likes_by_post: HashMap<i64, Vec<EngagementRef>> = HashMap::new();
    for like in likes {
        likes_by_post
            .entry(like.post_id)
            .or_default()
            .push(EngagementRef {
                user_id: like.user_id,
            });
    }

    let mut interested_by_post: HashMap<i64, Vec<EngagementRef>> = HashMap::new();
    for row in interested {
        interested_by_post
            .entry(row.post_id)
            .or_default()
            .push(EngagementRef {
                user_id: row.user_id,
            });
    }

    Ok(rows
        .into_iter()
        .map(|row| PublicPost {
            id: row.id,
            title: row.title,
            content: row.content,
            image_url: row.image_url,
            published: row.published,
            created_at: row.created_at,
            author: UserSummary {
                id: row.author_id,
                name: row.author_name,
                image: row.author_image,
            },
            tags: tags_by_post.remove(&row.id).unwrap_or_default(),
            likes: likes_by_post.remove(&row.id).unwrap_or_default(),
            interested: interested_by_post.remove(&row.id).unwrap_or_default(),
            counts: PostCounts {
                likes: row.like_count,
                comments: row.comment_count,
            },
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> OffsetDateTime {
        OffsetDateTime::UNIX_EPOCH + Duration::days(20_000)
    }

    #[test]
    fn latest_orders_by_recency_only() {
        let filter = PostFilter::default();
        let query = build_listing_query(&filter, now(), 10, 0);
        let sql = query.sql();
        assert!(sql.contains("WHERE p.published = TRUE"));
        assert!(sql.contains("ORDER BY p.created_at DESC"));
        assert!(!sql.contains("like_count DESC"));
    }

    #[test]
    fn viral_orders_by_likes_then_comments_then_recency() {
        let clause = order_clause(PostSort::Viral);
        assert_eq!(
            clause,
            " ORDER BY like_count DESC, comment_count DESC, p.created_at DESC"
        );
    }

    #[test]
    fn trending_adds_the_seven_day_window() {
        let filter = PostFilter {
            sort: PostSort::Trending,
            ..Default::default()
        };
        let query = build_listing_query(&filter, now(), 10, 0);
        let sql = query.sql();
        assert!(sql.contains("p.created_at > "));
        assert!(sql.contains("like_count DESC, comment_count DESC"));
    }

    #[test]
    fn interested_ignores_comment_counts() {
        assert_eq!(
            order_clause(PostSort::Interested),
            " ORDER BY like_count DESC, p.created_at DESC"
        );
    }

    #[test]
    fn search_matches_title_or_content_case_insensitively() {
        let filter = PostFilter {
            search: Some("hello".to_string()),
            ..Default::default()
        };
        let sql_query = build_listing_query(&filter, now(), 10, 0);
        let sql = sql_query.sql();
        assert!(sql.contains("p.title ILIKE"));
        assert!(sql.contains("p.content ILIKE"));
    }

    #[test]
    fn blank_search_and_tag_are_ignored() {
        let filter = PostFilter {
            search: Some("   ".to_string()),
            tag: Some("".to_string()),
            ..Default::default()
        };
        let query = build_count_query(&filter, now());
        assert_eq!(query.sql(), "SELECT COUNT(*) FROM posts p WHERE p.published = TRUE");
    }

    #[test]
    fn tag_filter_compares_lowercased_names() {
        let filter = PostFilter {
            tag: Some("Rust".to_string()),
            ..Default::default()
        };
        let query = build_count_query(&filter, now());
        assert!(query.sql().contains("lower(t.name) = lower("));
    }

    #[test]
    fn count_query_carries_the_same_filters_without_ordering() {
        let filter = PostFilter {
            search: Some("x".to_string()),
            sort: PostSort::Trending,
            ..Default::default()
        };
        let query = build_count_query(&filter, now());
        let sql = query.sql();
        assert!(sql.starts_with("SELECT COUNT(*)"));
        assert!(sql.contains("p.created_at > "));
        assert!(!sql.contains("ORDER BY"));
    }
}
