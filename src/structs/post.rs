use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::tag::Tag;
use super::user::UserSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostSort {
    #[default]
    Latest,
    Viral,
    Trending,
    Interested,
}

#[derive(Deserialize)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    #[serde(rename = "imageUrl")]
    pub image_url: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[derive(Deserialize)]
pub struct UpdatePost {
    pub title: Option<String>,
    pub content: Option<String>,
    #[serde(rename = "imageUrl")]
    pub image_url: Option<String>,
}

/// A like or saved-post row, exposed raw so the client can check whether the
/// current user is in the list.
#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct EngagementRef {
    pub user_id: i64,
}

#[derive(Debug, Serialize)]
pub struct PostCounts {
    pub likes: i64,
    pub comments: i64,
}

/// A post with its relations, as returned by every listing endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicPost {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    pub published: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub author: UserSummary,
    pub tags: Vec<Tag>,
    pub likes: Vec<EngagementRef>,
    pub interested: Vec<EngagementRef>,
    pub counts: PostCounts,
}
