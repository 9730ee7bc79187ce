//! Post handlers: creation, reads, edits, and every lifecycle endpoint.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use services::posts::{EditPost, ListPosts, NewPost};

use crate::dto::{
    CreatePostRequest, CreatedPostResponse, ListPostsParams, Pagination, PostListResponse,
    PostResponse, RejectRequest, TransitionResponse, UpdatePostRequest, UpdatedPostResponse,
    ViewCountResponse,
};
use crate::error::ApiResult;
use crate::extract::Identity;
use crate::state::AppState;

pub async fn create(
    State(state): State<AppState>,
    Identity(principal): Identity,
    Json(request): Json<CreatePostRequest>,
) -> ApiResult<(StatusCode, Json<CreatedPostResponse>)> {
    let post = state
        .posts
        .create(
            &principal,
            NewPost {
                title: request.title.unwrap_or_default(),
                body: request.body.unwrap_or_default(),
                format: request.format,
                tags: request.tags,
            },
        )
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(CreatedPostResponse {
            id: post.id,
            title: post.title,
            slug: post.slug,
            status: post.status,
            message: "Post created as draft",
        }),
    ))
}

pub async fn list(
    State(state): State<AppState>,
    Identity(principal): Identity,
    Query(params): Query<ListPostsParams>,
) -> ApiResult<Json<PostListResponse>> {
    let limit = params.limit.unwrap_or(20).clamp(1, 100);
    let offset = params.offset.unwrap_or(0).max(0);
    let (posts, total) = state
        .posts
        .list(
            &principal,
            ListPosts {
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

pub async fn detail(
    State(state): State<AppState>,
    Identity(principal): Identity,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<PostResponse>> {
    let post = state.posts.get(&principal, id).await?;
    let view = state.posts.view(post).await?;
    Ok(Json(view.into()))
}

pub async fn update(
    State(state): State<AppState>,
    Identity(principal): Identity,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdatePostRequest>,
) -> ApiResult<Json<UpdatedPostResponse>> {
    let post = state
        .posts
        .edit(
            &principal,
            id,
            EditPost {
                title: request.title,
                body: request.body,
                format: request.format,
                tags: request.tags,
            },
        )
        .await?;
    Ok(Json(UpdatedPostResponse {
        id: post.id,
        title: post.title,
        slug: post.slug,
        status: post.status,
        message: "Post updated",
    }))
}

pub async fn archive(
    State(state): State<AppState>,
    Identity(principal): Identity,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<TransitionResponse>> {
    let receipt = state.posts.archive(&principal, id).await?;
    Ok(Json(TransitionResponse::from_receipt(receipt, None)))
}

pub async fn submit(
    State(state): State<AppState>,
    Identity(principal): Identity,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<TransitionResponse>> {
    let receipt = state.posts.submit(&principal, id).await?;
    Ok(Json(TransitionResponse::from_submit(receipt)))
}

pub async fn publish(
    State(state): State<AppState>,
    Identity(principal): Identity,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<TransitionResponse>> {
    let receipt = state.posts.publish(&principal, id).await?;
    Ok(Json(TransitionResponse::from_receipt(receipt, None)))
}

pub async fn approve(
    State(state): State<AppState>,
    Identity(principal): Identity,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<TransitionResponse>> {
    let receipt = state.posts.approve(&principal, id).await?;
    Ok(Json(TransitionResponse::from_receipt(receipt, None)))
}

pub async fn reject(
    State(state): State<AppState>,
    Identity(principal): Identity,
    Path(id): Path<Uuid>,
    request: Option<Json<RejectRequest>>,
) -> ApiResult<Json<TransitionResponse>> {
    let reason = request
        .and_then(|Json(r)| r.reason)
        .or_else(|| Some("Rejected by owner".to_string()));
    let receipt = state.posts.reject(&principal, id).await?;
    Ok(Json(TransitionResponse::from_receipt(receipt, reason)))
}

pub async fn record_view(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ViewCountResponse>> {
    let view_count = state.posts.record_view(id).await?;
    Ok(Json(ViewCountResponse { view_count }))
}

pub async fn view_count(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ViewCountResponse>> {
    let view_count = state.posts.view_count(id).await?;
    Ok(Json(ViewCountResponse { view_count }))
}

pub async fn pin(
    State(state): State<AppState>,
    Identity(principal): Identity,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<PostResponse>> {
    let post = state.posts.set_pinned(&principal, id, true).await?;
    let view = state.posts.view(post).await?;
    Ok(Json(view.into()))
}

pub async fn unpin(
    State(state): State<AppState>,
    Identity(principal): Identity,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<PostResponse>> {
    let post = state.posts.set_pinned(&principal, id, false).await?;
    let view = state.posts.view(post).await?;
    Ok(Json(view.into()))
}
