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

use crate::domain::models::feature_request::{FeatureRequest, FeatureStatus};
use crate::domain::repositories::feature_request_repository::{
    FeatureQueryParams, FeatureRequestRepository,
};
use crate::infrastructure::database::entities::feature_request as feature_entity;
use crate::utils::errors::RepositoryError;
use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Select, Set,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

/// 功能请求仓库实现
///
/// 基于SeaORM实现的功能请求数据访问层
#[derive(Clone)]
pub struct FeatureRequestRepositoryImpl {
    /// 数据库连接
    db: Arc<DatabaseConnection>,
}

impl FeatureRequestRepositoryImpl {
    /// 创建新的功能请求仓库实例
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    fn filtered(params: &FeatureQueryParams) -> Select<feature_entity::Entity> {
        let mut query = feature_entity::Entity::find();
        if let Some(status) = params.status {
            query = query.filter(feature_entity::Column::Status.eq(status.to_string()));
        }
        if let Some(account) = &params.target_account {
            query = query.filter(feature_entity::Column::TargetAccount.eq(account.as_str()));
        }
        query
    }
}

/// 库中无法识别的状态按 rejected 处理，避免被流水线重新派发
fn status_from_db(id: Uuid, raw: &str) -> FeatureStatus {
    raw.parse().unwrap_or_else(|_| {
        warn!(feature_id = %id, status = %raw, "Unknown feature request status in database, treating as rejected");
        FeatureStatus::Rejected
    })
}

impl From<feature_entity::Model> for FeatureRequest {
    fn from(model: feature_entity::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            category: model.category,
            priority: model.priority.parse().unwrap_or_default(),
            requester: model.requester,
            source_tweet_url: model.source_tweet_url,
            target_account: model.target_account,
            status: status_from_db(model.id, &model.status),
            mention_count: model.mention_count,
            assigned_to: model.assigned_to,
            implementation_started_at: model.implementation_started_at,
            shipped_at: model.shipped_at,
            failed_at: model.failed_at,
            rejected_at: model.rejected_at,
            pr_url: model.pr_url,
            pr_number: model.pr_number,
            error_message: model.error_message,
            implementation_metadata: model.implementation_metadata,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<FeatureRequest> for feature_entity::ActiveModel {
    fn from(feature: FeatureRequest) -> Self {
        Self {
            id: Set(feature.id),
            name: Set(feature.name),
            description: Set(feature.description),
            category: Set(feature.category),
            priority: Set(feature.priority.to_string()),
            requester: Set(feature.requester),
            source_tweet_url: Set(feature.source_tweet_url),
            target_account: Set(feature.target_account),
            status: Set(feature.status.to_string()),
            mention_count: Set(feature.mention_count),
            assigned_to: Set(feature.assigned_to),
            implementation_started_at: Set(feature.implementation_started_at),
            shipped_at: Set(feature.shipped_at),
            failed_at: Set(feature.failed_at),
            rejected_at: Set(feature.rejected_at),
            pr_url: Set(feature.pr_url),
            pr_number: Set(feature.pr_number),
            error_message: Set(feature.error_message),
            implementation_metadata: Set(feature.implementation_metadata),
            created_at: Set(feature.created_at),
            updated_at: Set(feature.updated_at),
        }
    }
}

#[async_trait]
impl FeatureRequestRepository for FeatureRequestRepositoryImpl {
    async fn create(&self, feature: &FeatureRequest) -> Result<FeatureRequest, RepositoryError> {
        if self
            .find_by_name_and_account(&feature.name, &feature.target_account)
            .await?
            .is_some()
        {
            return Err(RepositoryError::AlreadyExists(format!(
                "{} ({})",
                feature.name, feature.target_account
            )));
        }

        let model: feature_entity::ActiveModel = feature.clone().into();
        let inserted = model.insert(self.db.as_ref()).await?;
        Ok(inserted.into())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<FeatureRequest>, RepositoryError> {
        let model = feature_entity::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?;
        Ok(model.map(Into::into))
    }

    async fn find_by_name_and_account(
        &self,
        name: &str,
        target_account: &str,
    ) -> Result<Option<FeatureRequest>, RepositoryError> {
        let model = feature_entity::Entity::find()
            .filter(feature_entity::Column::Name.eq(name))
            .filter(feature_entity::Column::TargetAccount.eq(target_account))
            .one(self.db.as_ref())
            .await?;
        Ok(model.map(Into::into))
    }

    async fn update(&self, feature: &FeatureRequest) -> Result<FeatureRequest, RepositoryError> {
        let model: feature_entity::ActiveModel = feature.clone().into();
        let updated = model.update(self.db.as_ref()).await?;
        Ok(updated.into())
    }

    async fn list(
        &self,
        params: FeatureQueryParams,
    ) -> Result<(Vec<FeatureRequest>, u64), RepositoryError> {
        let total = Self::filtered(&params).count(self.db.as_ref()).await?;

        let mut query = Self::filtered(&params)
            .order_by_desc(feature_entity::Column::CreatedAt)
            .order_by_asc(feature_entity::Column::Id)
            .offset(params.offset);
        if params.limit > 0 {
            query = query.limit(params.limit);
        }

        let models = query.all(self.db.as_ref()).await?;
        Ok((models.into_iter().map(Into::into).collect(), total))
    }

    async fn list_by_status(
        &self,
        status: FeatureStatus,
        limit: u64,
    ) -> Result<Vec<FeatureRequest>, RepositoryError> {
        let models = feature_entity::Entity::find()
            .filter(feature_entity::Column::Status.eq(status.to_string()))
            .order_by_asc(feature_entity::Column::CreatedAt)
            .order_by_asc(feature_entity::Column::Id)
            .limit(limit)
            .all(self.db.as_ref())
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn count_by_status(&self) -> Result<HashMap<FeatureStatus, u64>, RepositoryError> {
        let mut counts = HashMap::with_capacity(FeatureStatus::ALL.len());
        for status in FeatureStatus::ALL {
            let count = feature_entity::Entity::find()
                .filter(feature_entity::Column::Status.eq(status.to_string()))
                .count(self.db.as_ref())
                .await?;
            counts.insert(status, count);
        }
        Ok(counts)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let result = feature_entity::Entity::delete_by_id(id)
            .exec(self.db.as_ref())
            .await?;
        if result.rows_affected == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
