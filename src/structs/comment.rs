use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::user::UserSummary;

#[derive(Deserialize)]
pub struct NewComment {
    pub content: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicComment {
    pub id: i64,
    pub content: String,
    pub post_id: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub author: UserSummary,
}
