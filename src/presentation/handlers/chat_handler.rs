// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{extract::Path, Extension, Json};
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::application::dto::chat_request::{ChatHistoryDto, ChatRequestDto, ChatResponseDto};
use crate::domain::models::feature_request::DomainError;
use crate::domain::services::chat_agent::ChatAgent;
use crate::infrastructure::cache::session_store::SessionStore;
use crate::presentation::errors::AppError;

/// 与聊天代理对话
pub async fn chat(
    Extension(agent): Extension<Arc<dyn ChatAgent>>,
    Json(payload): Json<ChatRequestDto>,
) -> Result<Json<ChatResponseDto>, AppError> {
    payload.validate()?;
    if payload.message.trim().is_empty() {
        return Err(DomainError::ValidationError("message cannot be empty".to_string()).into());
    }

    let session_id = payload
        .session_id
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    let reply = agent.send_message(&session_id, &payload.message).await?;

    Ok(Json(ChatResponseDto {
        success: true,
        session_id,
        reply: reply.content,
        tool_calls_executed: reply.tool_calls_executed,
        features_tracked: reply.features_tracked,
    }))
}

pub async fn history(
    Extension(sessions): Extension<Arc<SessionStore>>,
    Path(session_id): Path<String>,
) -> Json<ChatHistoryDto> {
    let messages = sessions.history(&session_id);
    Json(ChatHistoryDto {
        session_id,
        messages,
    })
}

pub async fn clear(
    Extension(sessions): Extension<Arc<SessionStore>>,
    Path(session_id): Path<String>,
) -> Json<Value> {
    let cleared = sessions.clear(&session_id);
    Json(json!({ "success": true, "session_id": session_id, "cleared": cleared }))
}
