use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::warn;

use crate::structs::post::{PostSort, PublicPost};
use crate::utils::app_error::AppError;
use crate::utils::pagination::{offset, Pagination, PaginationParams};
use crate::utils::post::{build_count_query, build_listing_query, load_public_posts, PostFilter, PostRow};
use crate::AppState;

#[derive(Deserialize)]
pub struct PostListingParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    pub tag: Option<String>,
    pub sort: Option<PostSort>,
}

#[derive(Serialize)]
pub struct PostListing {
    pub posts: Vec<PublicPost>,
    pub pagination: Pagination,
}

pub async fn get_posts_route(
    State(app_state): State<Arc<AppState>>,
    Query(params): Query<PostListingParams>,
) -> Result<Json<PostListing>, AppError> {
    let (page, limit) = PaginationParams {
        page: params.page,
        limit: params.limit,
    }
    .normalize();

    let filter = PostFilter {
        search: params.search,
        tag: params.tag,
        sort: params.sort.unwrap_or_default(),
    };
    let now = OffsetDateTime::now_utc();

    let total: i64 = build_count_query(&filter, now)
        .build_query_scalar()
        .fetch_one(&app_state.pool)
        .await
        .map_err(|e| {
            warn!("Error counting posts : {e}");
            AppError::internal_server_error()
        })?;

    let rows: Vec<PostRow> = build_listing_query(&filter, now, limit, offset(page, limit))
        .build_query_as()
        .fetch_all(&app_state.pool)
        .await
        .map_err(|e| {
            warn!("Error listing posts : {e}");
            AppError::internal_server_error()
        })?;

    let posts = load_public_posts(&app_state.pool, rows).await?;

    Ok(Json(PostListing {
        posts,
        pagination: Pagination::new(page, limit, total),
    }))
}
