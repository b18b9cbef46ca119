// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use axum::{
    body::Bytes,
    extract::{Path, Query},
    http::StatusCode,
    Extension, Json,
};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::application::dto::feature_request_dto::{
    CreateFeatureRequestDto, FeatureListResponseDto, FeatureQueryDto, FeatureStatsDto,
    RejectFeatureDto, UpdateFeatureRequestDto,
};
use crate::domain::models::agent_log::{AgentLog, AgentLogEvent};
use crate::domain::models::feature_request::{
    normalize_account, DomainError, FeatureRequest, FeatureStatus,
};
use crate::domain::repositories::agent_log_repository::AgentLogRepository;
use crate::domain::repositories::feature_request_repository::{
    FeatureQueryParams, FeatureRequestRepository,
};
use crate::presentation::errors::AppError;
use crate::utils::errors::RepositoryError;

const DEFAULT_PAGE_SIZE: u64 = 50;

async fn load(
    features: &Arc<dyn FeatureRequestRepository>,
    id: Uuid,
) -> Result<FeatureRequest, AppError> {
    features
        .find_by_id(id)
        .await?
        .ok_or_else(|| RepositoryError::NotFound.into())
}

/// 记录手动状态转换，审计失败只记警告
async fn audit_transition(
    logs: &Arc<dyn AgentLogRepository>,
    feature: &FeatureRequest,
    from: FeatureStatus,
) {
    metrics::counter!("feature_transitions_total", "to" => feature.status.to_string())
        .increment(1);
    let log = AgentLog::new(
        Some(feature.id),
        AgentLogEvent::Transition,
        format!("{} -> {} (manual)", from, feature.status),
        Some(json!({ "from": from, "to": feature.status })),
    );
    if let Err(e) = logs.append(&log).await {
        warn!(feature_id = %feature.id, "Failed to write transition audit log: {}", e);
    }
}

pub async fn list_features(
    Extension(features): Extension<Arc<dyn FeatureRequestRepository>>,
    Query(query): Query<FeatureQueryDto>,
) -> Result<Json<FeatureListResponseDto>, AppError> {
    query.validate()?;
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE);
    let offset = query.offset.unwrap_or(0);

    let (data, total) = features
        .list(FeatureQueryParams {
            status: query.status,
            target_account: query.target_account.as_deref().map(normalize_account),
            limit,
            offset,
        })
        .await?;

    Ok(Json(FeatureListResponseDto {
        success: true,
        data,
        total,
        limit,
        offset,
    }))
}

/// 创建功能请求
///
/// 同名同账号已存在时返回 409
pub async fn create_feature(
    Extension(features): Extension<Arc<dyn FeatureRequestRepository>>,
    Json(payload): Json<CreateFeatureRequestDto>,
) -> Result<(StatusCode, Json<FeatureRequest>), AppError> {
    payload.validate()?;
    let feature = payload.into_feature();
    if feature.name.is_empty() || feature.target_account.is_empty() {
        return Err(DomainError::ValidationError(
            "name and target_account cannot be empty".to_string(),
        )
        .into());
    }

    let created = features.create(&feature).await?;
    info!(feature_id = %created.id, name = %created.name, "Feature request created");
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn feature_stats(
    Extension(features): Extension<Arc<dyn FeatureRequestRepository>>,
) -> Result<Json<FeatureStatsDto>, AppError> {
    let counts = features.count_by_status().await?;
    let by_status: BTreeMap<String, u64> = FeatureStatus::ALL
        .iter()
        .map(|s| (s.to_string(), counts.get(s).copied().unwrap_or(0)))
        .collect();
    Ok(Json(FeatureStatsDto {
        total: by_status.values().sum(),
        by_status,
    }))
}

pub async fn get_feature(
    Extension(features): Extension<Arc<dyn FeatureRequestRepository>>,
    Path(id): Path<Uuid>,
) -> Result<Json<FeatureRequest>, AppError> {
    Ok(Json(load(&features, id).await?))
}

pub async fn update_feature(
    Extension(features): Extension<Arc<dyn FeatureRequestRepository>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateFeatureRequestDto>,
) -> Result<Json<FeatureRequest>, AppError> {
    payload.validate()?;
    if payload.is_empty() {
        return Err(DomainError::ValidationError("nothing to update".to_string()).into());
    }

    let mut feature = load(&features, id).await?;
    payload.apply(&mut feature);
    Ok(Json(features.update(&feature).await?))
}

pub async fn delete_feature(
    Extension(features): Extension<Arc<dyn FeatureRequestRepository>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    features.delete(id).await?;
    info!(feature_id = %id, "Feature request deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// 拒绝功能请求，请求体可省略
pub async fn reject_feature(
    Extension(features): Extension<Arc<dyn FeatureRequestRepository>>,
    Extension(logs): Extension<Arc<dyn AgentLogRepository>>,
    Path(id): Path<Uuid>,
    body: Bytes,
) -> Result<Json<FeatureRequest>, AppError> {
    let payload: RejectFeatureDto = if body.is_empty() {
        RejectFeatureDto::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| DomainError::ValidationError(format!("invalid body: {}", e)))?
    };
    payload.validate()?;

    let mut feature = load(&features, id).await?;
    let from = feature.status;
    feature.reject(payload.reason.as_deref())?;
    let saved = features.update(&feature).await?;
    audit_transition(&logs, &saved, from).await;
    Ok(Json(saved))
}

/// 重置为 requested，重新进入流水线
pub async fn reset_feature(
    Extension(features): Extension<Arc<dyn FeatureRequestRepository>>,
    Extension(logs): Extension<Arc<dyn AgentLogRepository>>,
    Path(id): Path<Uuid>,
) -> Result<Json<FeatureRequest>, AppError> {
    let mut feature = load(&features, id).await?;
    let from = feature.status;
    feature.reset()?;
    let saved = features.update(&feature).await?;
    audit_transition(&logs, &saved, from).await;
    Ok(Json(saved))
}

pub async fn feature_logs(
    Extension(features): Extension<Arc<dyn FeatureRequestRepository>>,
    Extension(logs): Extension<Arc<dyn AgentLogRepository>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<AgentLog>>, AppError> {
    load(&features, id).await?;
    Ok(Json(logs.list_by_feature(id).await?))
}
