// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::github_repo::GithubRepo;
use crate::domain::repositories::github_repo_repository::GithubRepoRepository;
use crate::infrastructure::database::entities::github_repo as repo_entity;
use crate::utils::errors::RepositoryError;
use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use std::sync::Arc;
use uuid::Uuid;

/// GitHub 仓库仓储实现
#[derive(Clone)]
pub struct GithubRepoRepositoryImpl {
    db: Arc<DatabaseConnection>,
}

impl GithubRepoRepositoryImpl {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl From<repo_entity::Model> for GithubRepo {
    fn from(model: repo_entity::Model) -> Self {
        Self {
            id: model.id,
            owner: model.owner,
            name: model.name,
            url: model.url,
            description: model.description,
            created_at: model.created_at,
        }
    }
}

#[async_trait]
impl GithubRepoRepository for GithubRepoRepositoryImpl {
    async fn create(&self, repo: &GithubRepo) -> Result<GithubRepo, RepositoryError> {
        let model = repo_entity::ActiveModel {
            id: Set(repo.id),
            owner: Set(repo.owner.clone()),
            name: Set(repo.name.clone()),
            url: Set(repo.url.clone()),
            description: Set(repo.description.clone()),
            created_at: Set(repo.created_at),
        };
        let inserted = model.insert(self.db.as_ref()).await?;
        Ok(inserted.into())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<GithubRepo>, RepositoryError> {
        let model = repo_entity::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?;
        Ok(model.map(Into::into))
    }

    async fn find_by_owner_name(
        &self,
        owner: &str,
        name: &str,
    ) -> Result<Option<GithubRepo>, RepositoryError> {
        let model = repo_entity::Entity::find()
            .filter(repo_entity::Column::Owner.eq(owner))
            .filter(repo_entity::Column::Name.eq(name))
            .one(self.db.as_ref())
            .await?;
        Ok(model.map(Into::into))
    }
}
