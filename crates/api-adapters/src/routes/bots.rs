//! Bot management handlers, all session-gated in the service layer.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use domains::BotPatch;
use services::bots::NewBot;

use crate::dto::{
    BotResponse, CreateBotRequest, CreatedBotResponse, MessageResponse, RegeneratedKeyResponse,
    UpdateBotRequest,
};
use crate::error::ApiResult;
use crate::extract::Identity;
use crate::state::AppState;

pub async fn create(
    State(state): State<AppState>,
    Identity(principal): Identity,
    Json(request): Json<CreateBotRequest>,
) -> ApiResult<(StatusCode, Json<CreatedBotResponse>)> {
    let created = state
        .bots
        .create(
            &principal,
            NewBot {
                name: request.name,
                description: request.description,
                avatar: request.avatar,
            },
        )
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(CreatedBotResponse {
            id: created.bot.id,
            name: created.bot.name,
            api_key: created.api_key,
            api_key_hint: created.bot.api_key_hint,
            message: "Bot created. Save your API key - it won't be shown again.",
        }),
    ))
}

pub async fn list(
    State(state): State<AppState>,
    Identity(principal): Identity,
) -> ApiResult<Json<Vec<BotResponse>>> {
    let bots = state.bots.list(&principal).await?;
    Ok(Json(
        bots.into_iter()
            .map(|(bot, stats)| BotResponse::new(bot, stats))
            .collect(),
    ))
}

pub async fn detail(
    State(state): State<AppState>,
    Identity(principal): Identity,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<BotResponse>> {
    let (bot, stats) = state.bots.get(&principal, id).await?;
    Ok(Json(BotResponse::new(bot, stats)))
}

pub async fn update(
    State(state): State<AppState>,
    Identity(principal): Identity,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateBotRequest>,
) -> ApiResult<Json<BotResponse>> {
    let patch = BotPatch {
        name: request.name,
        description: request.description,
        avatar: request.avatar,
        trusted: request.trusted,
        can_draft: request.can_draft,
        can_publish: request.can_publish,
        can_comment: request.can_comment,
    };
    let bot = state.bots.update(&principal, id, patch).await?;
    let stats = state.bots.get(&principal, bot.id).await?.1;
    Ok(Json(BotResponse::new(bot, stats)))
}

pub async fn revoke(
    State(state): State<AppState>,
    Identity(principal): Identity,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    let receipt = state.bots.revoke(&principal, id).await?;
    Ok(Json(MessageResponse {
        message: if receipt.already_revoked {
            "Bot already revoked"
        } else {
            "Bot revoked"
        },
    }))
}

pub async fn regenerate_key(
    State(state): State<AppState>,
    Identity(principal): Identity,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<RegeneratedKeyResponse>> {
    let key = state.bots.regenerate_key(&principal, id).await?;
    Ok(Json(RegeneratedKeyResponse {
        api_key: key.api_key,
        hint: key.hint,
        message: "API key regenerated. Save this key - it will not be shown again.",
    }))
}
