// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::github_repo::GithubRepo;
use crate::utils::errors::RepositoryError;
use async_trait::async_trait;
use uuid::Uuid;

/// GitHub 仓库仓储特质
#[async_trait]
pub trait GithubRepoRepository: Send + Sync {
    async fn create(&self, repo: &GithubRepo) -> Result<GithubRepo, RepositoryError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<GithubRepo>, RepositoryError>;
    async fn find_by_owner_name(
        &self,
        owner: &str,
        name: &str,
    ) -> Result<Option<GithubRepo>, RepositoryError>;

    /// 按 owner/name 查找，不存在则创建
    async fn find_or_create(&self, owner: &str, name: &str) -> Result<GithubRepo, RepositoryError> {
        if let Some(existing) = self.find_by_owner_name(owner, name).await? {
            return Ok(existing);
        }
        self.create(&GithubRepo::new(owner, name, None)).await
    }
}
