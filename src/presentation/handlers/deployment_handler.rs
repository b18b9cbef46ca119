// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{http::StatusCode, Extension, Json};
use serde_json::{json, Value};
use std::sync::Arc;
use validator::Validate;

use crate::application::dto::deployment_request::QuickDeployRequestDto;
use crate::domain::models::deployment::Deployment;
use crate::domain::repositories::deployment_repository::DeploymentRepository;
use crate::domain::services::chat_service::OrchestrationChatService;
use crate::presentation::errors::AppError;

/// 快速部署
///
/// 新建部署返回 201，复用已有部署返回 200
pub async fn quick_deploy(
    Extension(service): Extension<Arc<OrchestrationChatService>>,
    Json(payload): Json<QuickDeployRequestDto>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    payload.validate()?;
    let outcome = service
        .quick_deploy(&payload.github_repo, &payload.url, payload.interval_minutes)
        .await?;

    let status = if outcome.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(json!({ "success": true, "data": outcome }))))
}

pub async fn list_deployments(
    Extension(deployments): Extension<Arc<dyn DeploymentRepository>>,
) -> Result<Json<Vec<Deployment>>, AppError> {
    Ok(Json(deployments.list_all().await?))
}
