//! Comment handlers. Listing is public for published posts; creation runs
//! through the authorization matrix.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use crate::dto::{CommentResponse, CreateCommentRequest};
use crate::error::ApiResult;
use crate::extract::Identity;
use crate::state::AppState;

pub async fn list(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<CommentResponse>>> {
    let comments = state.comments.list(id).await?;
    Ok(Json(comments.into_iter().map(Into::into).collect()))
}

pub async fn create(
    State(state): State<AppState>,
    Identity(principal): Identity,
    Path(id): Path<Uuid>,
    Json(request): Json<CreateCommentRequest>,
) -> ApiResult<(StatusCode, Json<CommentResponse>)> {
    let comment = state.comments.create(&principal, id, request.body).await?;
    Ok((StatusCode::CREATED, Json(comment.into())))
}
