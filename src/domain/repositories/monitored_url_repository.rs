// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::monitored_url::MonitoredUrl;
use crate::utils::errors::RepositoryError;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use uuid::Uuid;

/// 监控 URL 仓库特质
#[async_trait]
pub trait MonitoredUrlRepository: Send + Sync {
    /// 创建监控 URL，URL 重复时返回 AlreadyExists
    async fn create(&self, url: &MonitoredUrl) -> Result<MonitoredUrl, RepositoryError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<MonitoredUrl>, RepositoryError>;
    async fn find_by_url(&self, url: &str) -> Result<Option<MonitoredUrl>, RepositoryError>;
    /// 所有活跃的监控 URL，按 created_at、id 排序
    async fn list_active(&self) -> Result<Vec<MonitoredUrl>, RepositoryError>;
    /// 标记为已检查
    async fn mark_checked(
        &self,
        id: Uuid,
        at: DateTime<FixedOffset>,
    ) -> Result<(), RepositoryError>;
    /// 更新检查频率（分钟）
    async fn update_frequency(&self, id: Uuid, minutes: i32) -> Result<(), RepositoryError>;
    /// 关联 GitHub 仓库
    async fn link_repo(&self, id: Uuid, repo_id: Uuid) -> Result<(), RepositoryError>;
}
