// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::models::monitored_url::MonitoredUrl;
use crate::domain::models::orchestration_task::{OrchestrationTask, TaskKind};
use crate::domain::repositories::deployment_repository::DeploymentRepository;
use crate::domain::repositories::github_repo_repository::GithubRepoRepository;
use crate::domain::repositories::monitored_url_repository::MonitoredUrlRepository;
use crate::domain::services::chat_service::account_for_url;
use crate::utils::errors::RepositoryError;

/// 从数据库构建编排任务
///
/// 先为每个活跃部署生成 deployment 任务，
/// 再为没有被部署覆盖的活跃 URL 生成 monitor 任务，顺序与数据库一致。
pub struct TaskSource {
    urls: Arc<dyn MonitoredUrlRepository>,
    deployments: Arc<dyn DeploymentRepository>,
    repos: Arc<dyn GithubRepoRepository>,
}

impl TaskSource {
    pub fn new(
        urls: Arc<dyn MonitoredUrlRepository>,
        deployments: Arc<dyn DeploymentRepository>,
        repos: Arc<dyn GithubRepoRepository>,
    ) -> Self {
        Self {
            urls,
            deployments,
            repos,
        }
    }

    pub async fn load_tasks(&self) -> Result<Vec<OrchestrationTask>, RepositoryError> {
        let active_urls = self.urls.list_active().await?;
        let by_id: HashMap<Uuid, &MonitoredUrl> = active_urls.iter().map(|u| (u.id, u)).collect();

        let mut tasks = Vec::new();
        let mut covered = HashSet::new();
        let mut repo_names: HashMap<Uuid, Option<String>> = HashMap::new();

        for deployment in self.deployments.list_active().await? {
            let Some(url) = by_id.get(&deployment.monitored_url_id) else {
                debug!(deployment_id = %deployment.id, "Skipping deployment with inactive URL");
                continue;
            };

            let repository = match repo_names.get(&deployment.github_repo_id) {
                Some(name) => name.clone(),
                None => {
                    let name = match self.repos.find_by_id(deployment.github_repo_id).await {
                        Ok(repo) => repo.map(|r| r.full_name()),
                        Err(e) => {
                            warn!(deployment_id = %deployment.id, "Failed to load repository: {}", e);
                            None
                        }
                    };
                    repo_names.insert(deployment.github_repo_id, name.clone());
                    name
                }
            };

            let target_account = deployment
                .configuration
                .get("target_account")
                .and_then(Value::as_str)
                .map(str::to_string)
                .or_else(|| account_for_url(&url.url));

            covered.insert(url.id);
            tasks.push(OrchestrationTask {
                id: deployment.id,
                kind: TaskKind::Deployment,
                url: url.url.clone(),
                url_type: url.url_type,
                target_account,
                repository,
                priority: url.priority,
                deployment_id: Some(deployment.id),
                monitored_url_id: url.id,
                check_frequency_minutes: url.check_frequency_minutes,
                configuration: deployment.configuration.clone(),
            });
        }

        for url in active_urls.iter().filter(|u| !covered.contains(&u.id)) {
            tasks.push(OrchestrationTask {
                id: url.id,
                kind: TaskKind::Monitor,
                url: url.url.clone(),
                url_type: url.url_type,
                target_account: account_for_url(&url.url),
                repository: None,
                priority: url.priority,
                deployment_id: None,
                monitored_url_id: url.id,
                check_frequency_minutes: url.check_frequency_minutes,
                configuration: Value::Object(Default::default()),
            });
        }

        Ok(tasks)
    }
}
