//! Operational endpoints plus the bot-facing `/me` and `/reviews`.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;

use services::posts::ReviewQuery;

use crate::dto::{MeResponse, Pagination, PostListResponse, ReviewParams};
use crate::error::ApiResult;
use crate::extract::Identity;
use crate::state::AppState;

pub async fn healthz() -> StatusCode {
    StatusCode::OK
}

pub async fn me(
    State(state): State<AppState>,
    Identity(principal): Identity,
) -> ApiResult<Json<MeResponse>> {
    let profile = state.bots.profile(&principal).await?;
    Ok(Json(profile.into()))
}

/// The owner's review queue, reached with a bot credential.
pub async fn reviews(
    State(state): State<AppState>,
    Identity(principal): Identity,
    Query(params): Query<ReviewParams>,
) -> ApiResult<Json<PostListResponse>> {
    let limit = params.limit.unwrap_or(20).clamp(1, 100);
    let offset = params.offset.unwrap_or(0).max(0);
    let (posts, total) = state
        .posts
        .reviews(
            &principal,
            ReviewQuery {
                status: params.status,
                format: params.format,
                limit: Some(limit),
                offset: Some(offset),
            },
        )
        .await?;
    let returned = posts.len() as i64;
    let views = state.posts.view_all(posts).await?;
    Ok(Json(PostListResponse {
        data: views.into_iter().map(Into::into).collect(),
        pagination: Pagination {
            total,
            limit,
            offset,
            has_more: offset + returned < total as i64,
        },
    }))
}
