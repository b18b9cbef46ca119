// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::deployment::{Deployment, DeploymentStatus};
use crate::domain::repositories::deployment_repository::DeploymentRepository;
use crate::infrastructure::database::entities::deployment as deployment_entity;
use crate::utils::errors::RepositoryError;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use std::sync::Arc;
use uuid::Uuid;

/// 部署仓库实现
#[derive(Clone)]
pub struct DeploymentRepositoryImpl {
    db: Arc<DatabaseConnection>,
}

impl DeploymentRepositoryImpl {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl From<deployment_entity::Model> for Deployment {
    fn from(model: deployment_entity::Model) -> Self {
        Self {
            id: model.id,
            github_repo_id: model.github_repo_id,
            monitored_url_id: model.monitored_url_id,
            configuration: model.configuration,
            status: model.status.parse().unwrap_or(DeploymentStatus::Paused),
            run_count: model.run_count,
            error_count: model.error_count,
            last_run_at: model.last_run_at,
            last_error: model.last_error,
            next_run_at: model.next_run_at,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

fn ensure_affected(rows: u64) -> Result<(), RepositoryError> {
    if rows == 0 {
        Err(RepositoryError::NotFound)
    } else {
        Ok(())
    }
}

#[async_trait]
impl DeploymentRepository for DeploymentRepositoryImpl {
    async fn create(&self, deployment: &Deployment) -> Result<Deployment, RepositoryError> {
        let model = deployment_entity::ActiveModel {
            id: Set(deployment.id),
            github_repo_id: Set(deployment.github_repo_id),
            monitored_url_id: Set(deployment.monitored_url_id),
            configuration: Set(deployment.configuration.clone()),
            status: Set(deployment.status.to_string()),
            run_count: Set(deployment.run_count),
            error_count: Set(deployment.error_count),
            last_run_at: Set(deployment.last_run_at),
            last_error: Set(deployment.last_error.clone()),
            next_run_at: Set(deployment.next_run_at),
            created_at: Set(deployment.created_at),
            updated_at: Set(deployment.updated_at),
        };
        let inserted = model.insert(self.db.as_ref()).await?;
        Ok(inserted.into())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Deployment>, RepositoryError> {
        let model = deployment_entity::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?;
        Ok(model.map(Into::into))
    }

    async fn list_active(&self) -> Result<Vec<Deployment>, RepositoryError> {
        let models = deployment_entity::Entity::find()
            .filter(deployment_entity::Column::Status.eq(DeploymentStatus::Active.to_string()))
            .order_by_asc(deployment_entity::Column::CreatedAt)
            .order_by_asc(deployment_entity::Column::Id)
            .all(self.db.as_ref())
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn list_all(&self) -> Result<Vec<Deployment>, RepositoryError> {
        let models = deployment_entity::Entity::find()
            .order_by_desc(deployment_entity::Column::CreatedAt)
            .order_by_asc(deployment_entity::Column::Id)
            .all(self.db.as_ref())
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn find_by_monitored_url(
        &self,
        monitored_url_id: Uuid,
    ) -> Result<Vec<Deployment>, RepositoryError> {
        let models = deployment_entity::Entity::find()
            .filter(deployment_entity::Column::MonitoredUrlId.eq(monitored_url_id))
            .order_by_asc(deployment_entity::Column::CreatedAt)
            .all(self.db.as_ref())
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn record_success(
        &self,
        id: Uuid,
        next_run_at: DateTime<FixedOffset>,
    ) -> Result<(), RepositoryError> {
        let now: DateTime<FixedOffset> = Utc::now().into();
        let result = deployment_entity::Entity::update_many()
            .col_expr(
                deployment_entity::Column::RunCount,
                Expr::col(deployment_entity::Column::RunCount).add(1),
            )
            .col_expr(deployment_entity::Column::LastRunAt, Expr::value(Some(now)))
            .col_expr(
                deployment_entity::Column::NextRunAt,
                Expr::value(Some(next_run_at)),
            )
            .col_expr(deployment_entity::Column::UpdatedAt, Expr::value(now))
            .filter(deployment_entity::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await?;
        ensure_affected(result.rows_affected)
    }

    async fn record_failure(&self, id: Uuid, error: &str) -> Result<(), RepositoryError> {
        let now: DateTime<FixedOffset> = Utc::now().into();
        let result = deployment_entity::Entity::update_many()
            .col_expr(
                deployment_entity::Column::ErrorCount,
                Expr::col(deployment_entity::Column::ErrorCount).add(1),
            )
            .col_expr(deployment_entity::Column::LastRunAt, Expr::value(Some(now)))
            .col_expr(
                deployment_entity::Column::LastError,
                Expr::value(Some(error.to_string())),
            )
            .col_expr(deployment_entity::Column::UpdatedAt, Expr::value(now))
            .filter(deployment_entity::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await?;
        ensure_affected(result.rows_affected)
    }

    async fn update_configuration(
        &self,
        id: Uuid,
        configuration: serde_json::Value,
    ) -> Result<(), RepositoryError> {
        let now: DateTime<FixedOffset> = Utc::now().into();
        let result = deployment_entity::Entity::update_many()
            .col_expr(
                deployment_entity::Column::Configuration,
                Expr::value(configuration),
            )
            .col_expr(deployment_entity::Column::UpdatedAt, Expr::value(now))
            .filter(deployment_entity::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await?;
        ensure_affected(result.rows_affected)
    }

    async fn set_status(
        &self,
        id: Uuid,
        status: DeploymentStatus,
    ) -> Result<(), RepositoryError> {
        let now: DateTime<FixedOffset> = Utc::now().into();
        let result = deployment_entity::Entity::update_many()
            .col_expr(
                deployment_entity::Column::Status,
                Expr::value(status.to_string()),
            )
            .col_expr(deployment_entity::Column::UpdatedAt, Expr::value(now))
            .filter(deployment_entity::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await?;
        ensure_affected(result.rows_affected)
    }
}
