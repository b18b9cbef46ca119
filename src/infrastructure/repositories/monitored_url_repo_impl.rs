// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::monitored_url::MonitoredUrl;
use crate::domain::repositories::monitored_url_repository::MonitoredUrlRepository;
use crate::infrastructure::database::entities::monitored_url as url_entity;
use crate::utils::errors::RepositoryError;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use std::sync::Arc;
use uuid::Uuid;

/// 监控 URL 仓库实现
#[derive(Clone)]
pub struct MonitoredUrlRepositoryImpl {
    db: Arc<DatabaseConnection>,
}

impl MonitoredUrlRepositoryImpl {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    async fn update_columns(
        &self,
        id: Uuid,
        column: url_entity::Column,
        value: sea_orm::Value,
    ) -> Result<(), RepositoryError> {
        let now: DateTime<FixedOffset> = Utc::now().into();
        let result = url_entity::Entity::update_many()
            .col_expr(column, Expr::value(value))
            .col_expr(url_entity::Column::UpdatedAt, Expr::value(now))
            .filter(url_entity::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await?;

        if result.rows_affected == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

impl From<url_entity::Model> for MonitoredUrl {
    fn from(model: url_entity::Model) -> Self {
        Self {
            id: model.id,
            url: model.url,
            url_type: model.url_type.parse().unwrap_or_default(),
            check_frequency_minutes: model.check_frequency_minutes,
            priority: model.priority,
            last_checked_at: model.last_checked_at,
            github_repo_id: model.github_repo_id,
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<MonitoredUrl> for url_entity::ActiveModel {
    fn from(url: MonitoredUrl) -> Self {
        Self {
            id: Set(url.id),
            url: Set(url.url),
            url_type: Set(url.url_type.to_string()),
            check_frequency_minutes: Set(url.check_frequency_minutes),
            priority: Set(url.priority),
            last_checked_at: Set(url.last_checked_at),
            github_repo_id: Set(url.github_repo_id),
            is_active: Set(url.is_active),
            created_at: Set(url.created_at),
            updated_at: Set(url.updated_at),
        }
    }
}

#[async_trait]
impl MonitoredUrlRepository for MonitoredUrlRepositoryImpl {
    async fn create(&self, url: &MonitoredUrl) -> Result<MonitoredUrl, RepositoryError> {
        if self.find_by_url(&url.url).await?.is_some() {
            return Err(RepositoryError::AlreadyExists(url.url.clone()));
        }
        let model: url_entity::ActiveModel = url.clone().into();
        let inserted = model.insert(self.db.as_ref()).await?;
        Ok(inserted.into())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<MonitoredUrl>, RepositoryError> {
        let model = url_entity::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?;
        Ok(model.map(Into::into))
    }

    async fn find_by_url(&self, url: &str) -> Result<Option<MonitoredUrl>, RepositoryError> {
        let model = url_entity::Entity::find()
            .filter(url_entity::Column::Url.eq(url))
            .one(self.db.as_ref())
            .await?;
        Ok(model.map(Into::into))
    }

    async fn list_active(&self) -> Result<Vec<MonitoredUrl>, RepositoryError> {
        let models = url_entity::Entity::find()
            .filter(url_entity::Column::IsActive.eq(true))
            .order_by_asc(url_entity::Column::CreatedAt)
            .order_by_asc(url_entity::Column::Id)
            .all(self.db.as_ref())
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn mark_checked(
        &self,
        id: Uuid,
        at: DateTime<FixedOffset>,
    ) -> Result<(), RepositoryError> {
        self.update_columns(id, url_entity::Column::LastCheckedAt, Some(at).into())
            .await
    }

    async fn update_frequency(&self, id: Uuid, minutes: i32) -> Result<(), RepositoryError> {
        self.update_columns(id, url_entity::Column::CheckFrequencyMinutes, minutes.into())
            .await
    }

    async fn link_repo(&self, id: Uuid, repo_id: Uuid) -> Result<(), RepositoryError> {
        self.update_columns(id, url_entity::Column::GithubRepoId, Some(repo_id).into())
            .await
    }
}
