// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use parking_lot::Mutex;
use sea_orm::DatabaseConnection;
use serde_json::json;
use shipwright::config::settings::{DatabaseSettings, SchedulerSettings, Settings};
use shipwright::domain::models::deployment::Deployment;
use shipwright::domain::models::github_repo::GithubRepo;
use shipwright::domain::models::monitored_url::MonitoredUrl;
use shipwright::domain::repositories::agent_log_repository::AgentLogRepository;
use shipwright::domain::repositories::chat_repository::ChatRepository;
use shipwright::domain::repositories::deployment_repository::DeploymentRepository;
use shipwright::domain::repositories::feature_request_repository::FeatureRequestRepository;
use shipwright::domain::repositories::github_repo_repository::GithubRepoRepository;
use shipwright::domain::repositories::monitored_url_repository::MonitoredUrlRepository;
use shipwright::domain::services::chat_agent::{AgentReply, ChatAgent};
use shipwright::infrastructure::clients::developer_agent::{
    AgentResponse, DeveloperAgent, ImplementationRequest,
};
use shipwright::infrastructure::database::connection;
use shipwright::infrastructure::repositories::agent_log_repo_impl::AgentLogRepositoryImpl;
use shipwright::infrastructure::repositories::chat_repo_impl::ChatRepositoryImpl;
use shipwright::infrastructure::repositories::deployment_repo_impl::DeploymentRepositoryImpl;
use shipwright::infrastructure::repositories::feature_request_repo_impl::FeatureRequestRepositoryImpl;
use shipwright::infrastructure::repositories::github_repo_repo_impl::GithubRepoRepositoryImpl;
use shipwright::infrastructure::repositories::monitored_url_repo_impl::MonitoredUrlRepositoryImpl;
use shipwright::utils::errors::ClientError;
use std::collections::VecDeque;
use std::sync::Arc;

/// 内存 SQLite 并执行迁移
pub async fn setup_db() -> Arc<DatabaseConnection> {
    let settings = DatabaseSettings {
        url: "sqlite::memory:".to_string(),
        max_connections: Some(1),
        min_connections: Some(1),
        connect_timeout: Some(5),
        idle_timeout: None,
    };
    Arc::new(connection::connect_and_migrate(&settings).await.unwrap())
}

pub fn scheduler_settings() -> SchedulerSettings {
    let mut settings = Settings::from_defaults().unwrap().scheduler;
    settings.task_timeout_secs = 5;
    settings
}

#[allow(dead_code)]
#[derive(Clone)]
pub struct Repos {
    pub urls: Arc<dyn MonitoredUrlRepository>,
    pub repos: Arc<dyn GithubRepoRepository>,
    pub deployments: Arc<dyn DeploymentRepository>,
    pub chats: Arc<dyn ChatRepository>,
    pub logs: Arc<dyn AgentLogRepository>,
    pub features: Arc<dyn FeatureRequestRepository>,
}

impl Repos {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            urls: Arc::new(MonitoredUrlRepositoryImpl::new(db.clone())),
            repos: Arc::new(GithubRepoRepositoryImpl::new(db.clone())),
            deployments: Arc::new(DeploymentRepositoryImpl::new(db.clone())),
            chats: Arc::new(ChatRepositoryImpl::new(db.clone())),
            logs: Arc::new(AgentLogRepositoryImpl::new(db.clone())),
            features: Arc::new(FeatureRequestRepositoryImpl::new(db)),
        }
    }

    pub async fn setup() -> Self {
        Self::new(setup_db().await)
    }

    /// 仓库 + URL + 活跃部署
    pub async fn seed_deployment(&self, owner: &str, name: &str, url: &str) -> Deployment {
        let repo = self
            .repos
            .create(&GithubRepo::new(owner, name, None))
            .await
            .unwrap();
        let monitored = self
            .urls
            .create(&MonitoredUrl::new(url.to_string(), 30))
            .await
            .unwrap();
        self.urls.link_repo(monitored.id, repo.id).await.unwrap();
        self.deployments
            .create(&Deployment::new(
                repo.id,
                monitored.id,
                json!({ "interval_minutes": 30, "target_account": owner }),
            ))
            .await
            .unwrap()
    }

    pub async fn seed_url(&self, url: &str) -> MonitoredUrl {
        self.urls
            .create(&MonitoredUrl::new(url.to_string(), 60))
            .await
            .unwrap()
    }
}

/// 记录调用并按脚本应答的聊天代理
#[derive(Default)]
pub struct ScriptedChatAgent {
    pub calls: Mutex<Vec<(String, String)>>,
    pub failures: Mutex<VecDeque<String>>,
}

impl ScriptedChatAgent {
    pub fn fail_next(&self, message: &str) {
        self.failures.lock().push_back(message.to_string());
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl ChatAgent for ScriptedChatAgent {
    async fn send_message(
        &self,
        session_id: &str,
        message: &str,
    ) -> Result<AgentReply, ClientError> {
        self.calls
            .lock()
            .push((session_id.to_string(), message.to_string()));
        if let Some(failure) = self.failures.lock().pop_front() {
            return Err(ClientError::Protocol(failure));
        }
        Ok(AgentReply {
            content: format!("handled {}", session_id),
            tool_calls_executed: 1,
            features_tracked: Vec::new(),
        })
    }
}

/// 记录请求并按脚本应答的开发者代理
pub struct ScriptedDeveloperAgent {
    pub enabled: bool,
    pub replies: Mutex<VecDeque<Result<String, ClientError>>>,
    pub requests: Mutex<Vec<ImplementationRequest>>,
    pub notifications: Mutex<Vec<String>>,
}

impl ScriptedDeveloperAgent {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            replies: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            notifications: Mutex::new(Vec::new()),
        }
    }

    pub fn reply_with(&self, reply: Result<String, ClientError>) {
        self.replies.lock().push_back(reply);
    }
}

#[async_trait]
impl DeveloperAgent for ScriptedDeveloperAgent {
    async fn request_implementation(
        &self,
        request: &ImplementationRequest,
    ) -> Result<AgentResponse, ClientError> {
        self.requests.lock().push(request.clone());
        let reply = self
            .replies
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(ClientError::Timeout(1)));
        reply.map(|text| AgentResponse {
            request_id: "req-1".to_string(),
            text,
            raw: json!({}),
        })
    }

    async fn notify(&self, text: &str) -> Result<(), ClientError> {
        self.notifications.lock().push(text.to_string());
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}
