// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::agent_log::{AgentLog, AgentLogEvent};
use crate::domain::repositories::agent_log_repository::AgentLogRepository;
use crate::infrastructure::database::entities::agent_log as log_entity;
use crate::utils::errors::RepositoryError;
use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;
use uuid::Uuid;

/// 开发者代理审计日志仓库
#[derive(Clone)]
pub struct AgentLogRepositoryImpl {
    db: Arc<DatabaseConnection>,
}

impl AgentLogRepositoryImpl {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl From<log_entity::Model> for AgentLog {
    fn from(model: log_entity::Model) -> Self {
        Self {
            id: model.id,
            feature_request_id: model.feature_request_id,
            event_type: model.event_type.parse().unwrap_or(AgentLogEvent::Progress),
            message: model.message,
            payload: model.payload,
            created_at: model.created_at,
        }
    }
}

#[async_trait]
impl AgentLogRepository for AgentLogRepositoryImpl {
    async fn append(&self, log: &AgentLog) -> Result<(), RepositoryError> {
        let model = log_entity::ActiveModel {
            id: Set(log.id),
            feature_request_id: Set(log.feature_request_id),
            event_type: Set(log.event_type.to_string()),
            message: Set(log.message.clone()),
            payload: Set(log.payload.clone()),
            created_at: Set(log.created_at),
        };
        model.insert(self.db.as_ref()).await?;
        Ok(())
    }

    async fn list_by_feature(&self, feature_id: Uuid) -> Result<Vec<AgentLog>, RepositoryError> {
        let models = log_entity::Entity::find()
            .filter(log_entity::Column::FeatureRequestId.eq(feature_id))
            .order_by_asc(log_entity::Column::CreatedAt)
            .all(self.db.as_ref())
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }
}
