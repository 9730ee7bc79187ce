//! Reactions and bookmarks.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::json;
use uuid::Uuid;

use domains::{AppError, ReactionType};

use crate::dto::{
    BookmarkedResponse, PageParams, PostSummaryResponse, ReactionParams, ReactionRequest,
    ReactionsResponse,
};
use crate::error::ApiResult;
use crate::extract::Identity;
use crate::state::AppState;

fn parse_kind(raw: Option<&str>) -> Result<ReactionType, AppError> {
    raw.and_then(ReactionType::parse)
        .ok_or_else(|| AppError::Validation("invalid reaction type".into()))
}

pub async fn reactions(
    State(state): State<AppState>,
    Identity(principal): Identity,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ReactionsResponse>> {
    let summary = state.engagement.reactions(&principal, id).await?;
    Ok(Json(ReactionsResponse {
        reactions: summary
            .counts
            .into_iter()
            .map(|(kind, n)| (kind.as_str().to_string(), n))
            .collect(),
        user_reactions: summary.user_reactions,
        total: summary.total,
    }))
}

pub async fn react(
    State(state): State<AppState>,
    Identity(principal): Identity,
    Path(id): Path<Uuid>,
    Json(request): Json<ReactionRequest>,
) -> ApiResult<(StatusCode, Json<serde_json::Value>)> {
    let kind = parse_kind(request.kind.as_deref())?;
    state.engagement.react(&principal, id, kind).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "type": kind.as_str(), "message": "Reaction added" })),
    ))
}

pub async fn unreact(
    State(state): State<AppState>,
    Identity(principal): Identity,
    Path(id): Path<Uuid>,
    Query(params): Query<ReactionParams>,
) -> ApiResult<Json<serde_json::Value>> {
    let kind = parse_kind(params.kind.as_deref())?;
    state.engagement.unreact(&principal, id, kind).await?;
    Ok(Json(json!({ "success": true })))
}

pub async fn is_bookmarked(
    State(state): State<AppState>,
    Identity(principal): Identity,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<BookmarkedResponse>> {
    let bookmarked = state.engagement.is_bookmarked(&principal, id).await?;
    Ok(Json(BookmarkedResponse { bookmarked }))
}

pub async fn bookmark(
    State(state): State<AppState>,
    Identity(principal): Identity,
    Path(id): Path<Uuid>,
) -> ApiResult<(StatusCode, Json<BookmarkedResponse>)> {
    state.engagement.bookmark(&principal, id).await?;
    Ok((
        StatusCode::CREATED,
        Json(BookmarkedResponse { bookmarked: true }),
    ))
}

pub async fn unbookmark(
    State(state): State<AppState>,
    Identity(principal): Identity,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<BookmarkedResponse>> {
    state.engagement.unbookmark(&principal, id).await?;
    Ok(Json(BookmarkedResponse { bookmarked: false }))
}

pub async fn bookmarks(
    State(state): State<AppState>,
    Identity(principal): Identity,
    Query(params): Query<PageParams>,
) -> ApiResult<Json<serde_json::Value>> {
    let posts = state
        .engagement
        .bookmarks(
            &principal,
            params.limit.unwrap_or(20),
            params.offset.unwrap_or(0),
        )
        .await?;
    let count = posts.len();
    let views = state.posts.view_all(posts).await?;
    let data: Vec<PostSummaryResponse> = views.into_iter().map(Into::into).collect();
    Ok(Json(json!({ "bookmarks": data, "count": count })))
}
