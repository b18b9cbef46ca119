// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::agent_log::AgentLog;
use crate::utils::errors::RepositoryError;
use async_trait::async_trait;
use uuid::Uuid;

/// 开发者代理审计日志仓库特质
#[async_trait]
pub trait AgentLogRepository: Send + Sync {
    async fn append(&self, log: &AgentLog) -> Result<(), RepositoryError>;
    async fn list_by_feature(&self, feature_id: Uuid) -> Result<Vec<AgentLog>, RepositoryError>;
}
