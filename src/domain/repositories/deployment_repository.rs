// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::deployment::{Deployment, DeploymentStatus};
use crate::utils::errors::RepositoryError;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use uuid::Uuid;

/// 部署仓库特质
#[async_trait]
pub trait DeploymentRepository: Send + Sync {
    async fn create(&self, deployment: &Deployment) -> Result<Deployment, RepositoryError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Deployment>, RepositoryError>;
    /// 活跃部署，按 created_at、id 排序
    async fn list_active(&self) -> Result<Vec<Deployment>, RepositoryError>;
    async fn list_all(&self) -> Result<Vec<Deployment>, RepositoryError>;
    async fn find_by_monitored_url(
        &self,
        monitored_url_id: Uuid,
    ) -> Result<Vec<Deployment>, RepositoryError>;
    /// 记录一次成功运行：run_count + 1，更新 last_run_at 和 next_run_at
    async fn record_success(
        &self,
        id: Uuid,
        next_run_at: DateTime<FixedOffset>,
    ) -> Result<(), RepositoryError>;
    /// 记录一次失败运行：error_count + 1，保存 last_error
    async fn record_failure(&self, id: Uuid, error: &str) -> Result<(), RepositoryError>;
    async fn update_configuration(
        &self,
        id: Uuid,
        configuration: serde_json::Value,
    ) -> Result<(), RepositoryError>;
    async fn set_status(&self, id: Uuid, status: DeploymentStatus)
        -> Result<(), RepositoryError>;
}
