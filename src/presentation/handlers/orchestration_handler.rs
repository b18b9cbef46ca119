// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    extract::{Path, Query},
    Extension, Json,
};
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::application::dto::orchestration_request::{
    OrchestrationChatDto, OrchestrationConfigDto, TranscriptQueryDto,
};
use crate::domain::models::chat_message::ChatMessage;
use crate::domain::models::feature_request::DomainError;
use crate::domain::models::orchestration_task::OrchestrationTask;
use crate::domain::services::chat_service::{ChatResponse, OrchestrationChatService};
use crate::queue::scheduler::{CycleReport, Orchestrator, OrchestratorStatus, MIN_INTERVAL_SECS};
use crate::presentation::errors::AppError;

const DEFAULT_TRANSCRIPT_LIMIT: u64 = 100;

pub async fn start(Extension(orchestrator): Extension<Arc<Orchestrator>>) -> Json<Value> {
    let started = orchestrator.start();
    Json(json!({ "success": true, "started": started, "status": orchestrator.status() }))
}

pub async fn stop(Extension(orchestrator): Extension<Arc<Orchestrator>>) -> Json<Value> {
    let stopped = orchestrator.stop();
    Json(json!({ "success": true, "stopped": stopped, "status": orchestrator.status() }))
}

pub async fn status(
    Extension(orchestrator): Extension<Arc<Orchestrator>>,
) -> Json<OrchestratorStatus> {
    Json(orchestrator.status())
}

pub async fn tasks(
    Extension(orchestrator): Extension<Arc<Orchestrator>>,
) -> Json<Vec<OrchestrationTask>> {
    Json(orchestrator.tasks())
}

pub async fn get_config(Extension(orchestrator): Extension<Arc<Orchestrator>>) -> Json<Value> {
    Json(json!({
        "interval_secs": orchestrator.interval_secs(),
        "min_interval_secs": MIN_INTERVAL_SECS,
    }))
}

pub async fn update_config(
    Extension(orchestrator): Extension<Arc<Orchestrator>>,
    Json(payload): Json<OrchestrationConfigDto>,
) -> Result<Json<Value>, AppError> {
    payload.validate()?;
    orchestrator.set_interval(payload.interval_secs)?;
    Ok(Json(json!({
        "success": true,
        "interval_secs": orchestrator.interval_secs(),
    })))
}

/// 立即执行一个周期，已有周期执行中时返回 409
pub async fn trigger(
    Extension(orchestrator): Extension<Arc<Orchestrator>>,
) -> Result<Json<CycleReport>, AppError> {
    Ok(Json(orchestrator.run_cycle().await?))
}

pub async fn refresh(
    Extension(orchestrator): Extension<Arc<Orchestrator>>,
) -> Result<Json<Value>, AppError> {
    let queue_length = orchestrator.refresh().await?;
    Ok(Json(json!({ "success": true, "queue_length": queue_length })))
}

pub async fn chat(
    Extension(service): Extension<Arc<OrchestrationChatService>>,
    Json(payload): Json<OrchestrationChatDto>,
) -> Result<Json<ChatResponse>, AppError> {
    payload.validate()?;
    if payload.message.trim().is_empty() {
        return Err(DomainError::ValidationError("message cannot be empty".to_string()).into());
    }
    let session_id = payload
        .session_id
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    Ok(Json(service.process(&session_id, &payload.message).await?))
}

pub async fn transcript(
    Extension(service): Extension<Arc<OrchestrationChatService>>,
    Path(session_id): Path<String>,
    Query(query): Query<TranscriptQueryDto>,
) -> Result<Json<Vec<ChatMessage>>, AppError> {
    query.validate()?;
    let limit = query.limit.unwrap_or(DEFAULT_TRANSCRIPT_LIMIT);
    Ok(Json(service.transcript(&session_id, limit).await?))
}
