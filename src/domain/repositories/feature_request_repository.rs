// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::feature_request::{FeatureRequest, FeatureStatus};
use crate::utils::errors::RepositoryError;
use async_trait::async_trait;
use std::collections::HashMap;
use uuid::Uuid;

/// 功能请求查询参数
#[derive(Debug, Default, Clone)]
pub struct FeatureQueryParams {
    pub status: Option<FeatureStatus>,
    pub target_account: Option<String>,
    pub limit: u64,
    pub offset: u64,
}

/// 功能请求仓库特质
///
/// (name, target_account) 唯一
#[async_trait]
pub trait FeatureRequestRepository: Send + Sync {
    /// 创建功能请求
    ///
    /// 同名同账号已存在时返回 `RepositoryError::AlreadyExists`，不会覆盖已有记录
    async fn create(&self, feature: &FeatureRequest) -> Result<FeatureRequest, RepositoryError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<FeatureRequest>, RepositoryError>;
    async fn find_by_name_and_account(
        &self,
        name: &str,
        target_account: &str,
    ) -> Result<Option<FeatureRequest>, RepositoryError>;
    /// 保存整条记录
    async fn update(&self, feature: &FeatureRequest) -> Result<FeatureRequest, RepositoryError>;
    /// 分页查询，返回 (记录, 总数)
    async fn list(
        &self,
        params: FeatureQueryParams,
    ) -> Result<(Vec<FeatureRequest>, u64), RepositoryError>;
    /// 指定状态的记录，按 created_at 升序
    async fn list_by_status(
        &self,
        status: FeatureStatus,
        limit: u64,
    ) -> Result<Vec<FeatureRequest>, RepositoryError>;
    /// 各状态计数
    async fn count_by_status(&self) -> Result<HashMap<FeatureStatus, u64>, RepositoryError>;
    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError>;
}
