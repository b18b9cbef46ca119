// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::models::chat_message::ChatMessage;
use crate::domain::models::deployment::{Deployment, DeploymentStatus};
use crate::domain::models::feature_request::{normalize_account, FeatureRequest, FeatureStatus};
use crate::domain::models::github_repo::GithubRepo;
use crate::domain::models::monitored_url::{account_hint, MonitoredUrl};
use crate::domain::repositories::chat_repository::ChatRepository;
use crate::domain::repositories::deployment_repository::DeploymentRepository;
use crate::domain::repositories::feature_request_repository::{
    FeatureQueryParams, FeatureRequestRepository,
};
use crate::domain::repositories::github_repo_repository::GithubRepoRepository;
use crate::domain::repositories::monitored_url_repository::MonitoredUrlRepository;
use crate::domain::services::intent_classifier::{
    Classification, Entities, Intent, IntentClassifier, RepoRef,
};
use crate::infrastructure::clients::reply_client::parse_tweet_url;
use crate::utils::errors::RepositoryError;

/// 未指定时的默认检查间隔（分钟）
pub const DEFAULT_INTERVAL_MINUTES: i32 = 60;

/// 检查间隔的允许范围（分钟），与快速部署接口的校验一致
pub const INTERVAL_MINUTES_RANGE: std::ops::RangeInclusive<i32> = 1..=10080;

fn interval_range_prompt(minutes: i32) -> Option<String> {
    (!INTERVAL_MINUTES_RANGE.contains(&minutes)).then(|| {
        format!(
            "{} minutes is not a valid interval. Use between {} and {} minutes.",
            minutes,
            INTERVAL_MINUTES_RANGE.start(),
            INTERVAL_MINUTES_RANGE.end()
        )
    })
}

const HELP_TEXT: &str = "I can help you orchestrate feature delivery. Try:\n\
- \"deploy acme/app for https://x.com/acme/status/123 every 30 minutes\"\n\
- \"status\" for an overview of deployments and feature requests\n\
- feature \"dark mode\" for @acme to track a request, or \"features\" to list them\n\
- \"change interval of https://x.com/acme/status/123 to 2 hours\"";

static QUOTED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""([^"]+)"|“([^”]+)”|'([^']+)'"#).unwrap());

static HANDLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?:^|\s)@([A-Za-z0-9_]+)").unwrap());

/// 编排对话的回复
#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub session_id: String,
    pub intent: Intent,
    pub confidence: f32,
    pub reply: String,
    /// 本次创建或更新的实体
    pub actions: Vec<Value>,
}

/// 一次部署的结果
#[derive(Debug, Clone, Serialize)]
pub struct DeployOutcome {
    pub repository: GithubRepo,
    pub monitored_url: MonitoredUrl,
    pub deployment: Deployment,
    /// 部署是否为新建
    pub created: bool,
}

impl DeployOutcome {
    fn actions(&self) -> Vec<Value> {
        vec![
            json!({ "type": "github_repo", "id": self.repository.id }),
            json!({ "type": "monitored_url", "id": self.monitored_url.id }),
            json!({
                "type": "deployment",
                "id": self.deployment.id,
                "created": self.created,
            }),
        ]
    }
}

/// 读取消息中的目标账号：优先 @handle，其次社交链接中的账号
fn target_account(message: &str, entities: &Entities) -> Option<String> {
    if let Some(caps) = HANDLE.captures(message) {
        return Some(normalize_account(&caps[1]));
    }
    entities.social_url.as_deref().and_then(account_for_url)
}

pub(crate) fn account_for_url(url: &str) -> Option<String> {
    parse_tweet_url(url)
        .map(|(account, _)| normalize_account(&account))
        .or_else(|| account_hint(url))
}

fn quoted_phrase(message: &str) -> Option<String> {
    QUOTED.captures(message).and_then(|caps| {
        (1..=3)
            .find_map(|i| caps.get(i))
            .map(|m| m.as_str().trim().to_string())
            .filter(|s| !s.is_empty())
    })
}

/// 编排对话服务
///
/// 分类用户消息并分发到部署、状态、功能请求和配置四类处理；
/// 所有消息都持久化到 orchestration_chats。
pub struct OrchestrationChatService {
    classifier: Arc<dyn IntentClassifier>,
    chats: Arc<dyn ChatRepository>,
    urls: Arc<dyn MonitoredUrlRepository>,
    repos: Arc<dyn GithubRepoRepository>,
    deployments: Arc<dyn DeploymentRepository>,
    features: Arc<dyn FeatureRequestRepository>,
}

impl OrchestrationChatService {
    pub fn new(
        classifier: Arc<dyn IntentClassifier>,
        chats: Arc<dyn ChatRepository>,
        urls: Arc<dyn MonitoredUrlRepository>,
        repos: Arc<dyn GithubRepoRepository>,
        deployments: Arc<dyn DeploymentRepository>,
        features: Arc<dyn FeatureRequestRepository>,
    ) -> Self {
        Self {
            classifier,
            chats,
            urls,
            repos,
            deployments,
            features,
        }
    }

    /// 处理一条用户消息
    pub async fn process(&self, session_id: &str, message: &str) -> Result<ChatResponse> {
        let classification = self.classifier.classify(message);
        self.chats
            .append(
                &ChatMessage::user(session_id, message)
                    .with_intent(classification.intent.to_string()),
            )
            .await?;

        let (reply, actions) = self.dispatch(message, &classification).await?;

        self.chats
            .append(
                &ChatMessage::assistant(session_id, reply.clone())
                    .with_intent(classification.intent.to_string()),
            )
            .await?;

        info!(
            session_id,
            intent = %classification.intent,
            actions = actions.len(),
            "Processed orchestration chat message"
        );

        Ok(ChatResponse {
            session_id: session_id.to_string(),
            intent: classification.intent,
            confidence: classification.confidence,
            reply,
            actions,
        })
    }

    /// 会话的持久化记录
    pub async fn transcript(&self, session_id: &str, limit: u64) -> Result<Vec<ChatMessage>> {
        Ok(self.chats.list_by_session(session_id, limit).await?)
    }

    async fn dispatch(
        &self,
        message: &str,
        classification: &Classification,
    ) -> Result<(String, Vec<Value>)> {
        let entities = &classification.entities;
        match classification.intent {
            Intent::Deploy => self.handle_deploy(entities).await,
            Intent::Status => Ok((self.status_report().await?, Vec::new())),
            Intent::Feature => self.handle_feature(message, entities).await,
            Intent::Config => self.handle_config(entities).await,
            Intent::General => Ok((HELP_TEXT.to_string(), Vec::new())),
        }
    }

    async fn handle_deploy(&self, entities: &Entities) -> Result<(String, Vec<Value>)> {
        let (repo, url) = match (&entities.repository, &entities.social_url) {
            (Some(repo), Some(url)) => (repo, url),
            (None, Some(_)) => {
                return Ok((
                    "Which GitHub repository should I deploy? Give me owner/name or a github.com URL."
                        .to_string(),
                    Vec::new(),
                ))
            }
            (Some(_), None) => {
                return Ok((
                    "Which post should I monitor? Give me a twitter.com, x.com, instagram.com or tiktok.com URL."
                        .to_string(),
                    Vec::new(),
                ))
            }
            (None, None) => {
                return Ok((
                    "To deploy I need a GitHub repository (owner/name) and a social post URL to monitor."
                        .to_string(),
                    Vec::new(),
                ))
            }
        };

        if let Some(prompt) = entities.interval_minutes.and_then(interval_range_prompt) {
            return Ok((prompt, Vec::new()));
        }

        let outcome = self.deploy(repo, url, entities.interval_minutes).await?;
        let interval = outcome.monitored_url.check_frequency_minutes;
        let reply = format!(
            "{} {} for {} (checking every {} minutes).",
            if outcome.created { "Deployed" } else { "Updated deployment of" },
            outcome.repository.full_name(),
            outcome.monitored_url.url,
            interval
        );
        Ok((reply, outcome.actions()))
    }

    /// 部署：仓库 + 监控 URL + 部署记录
    ///
    /// 多步写入不在事务中，中途失败时已写入的行保留
    pub async fn deploy(
        &self,
        repo: &RepoRef,
        url: &str,
        interval_minutes: Option<i32>,
    ) -> Result<DeployOutcome> {
        if let Some(message) = interval_minutes.and_then(interval_range_prompt) {
            return Err(
                crate::domain::models::feature_request::DomainError::ValidationError(message)
                    .into(),
            );
        }
        let repository = self.repos.find_or_create(&repo.owner, &repo.name).await?;

        let mut monitored_url = match self.urls.find_by_url(url).await? {
            Some(existing) => existing,
            None => {
                let candidate = MonitoredUrl::new(
                    url.to_string(),
                    interval_minutes.unwrap_or(DEFAULT_INTERVAL_MINUTES),
                );
                self.urls.create(&candidate).await?
            }
        };
        if let Some(minutes) = interval_minutes {
            if monitored_url.check_frequency_minutes != minutes {
                self.urls.update_frequency(monitored_url.id, minutes).await?;
                monitored_url.check_frequency_minutes = minutes;
            }
        }
        if monitored_url.github_repo_id != Some(repository.id) {
            self.urls.link_repo(monitored_url.id, repository.id).await?;
            monitored_url.github_repo_id = Some(repository.id);
        }

        let configuration = json!({
            "interval_minutes": monitored_url.check_frequency_minutes,
            "target_account": account_for_url(url),
        });

        let existing = self
            .deployments
            .find_by_monitored_url(monitored_url.id)
            .await?
            .into_iter()
            .find(|d| d.github_repo_id == repository.id);

        let (deployment, created) = match existing {
            Some(mut deployment) => {
                self.deployments
                    .update_configuration(deployment.id, configuration.clone())
                    .await?;
                if deployment.status != DeploymentStatus::Active {
                    self.deployments
                        .set_status(deployment.id, DeploymentStatus::Active)
                        .await?;
                    deployment.status = DeploymentStatus::Active;
                }
                deployment.configuration = configuration;
                (deployment, false)
            }
            None => {
                let deployment = Deployment::new(repository.id, monitored_url.id, configuration);
                (self.deployments.create(&deployment).await?, true)
            }
        };

        info!(
            repository = %repository.full_name(),
            url = %monitored_url.url,
            deployment_id = %deployment.id,
            created,
            "Deployment ready"
        );

        Ok(DeployOutcome {
            repository,
            monitored_url,
            deployment,
            created,
        })
    }

    /// 快速部署入口，`repo` 可以是 owner/name 或 GitHub URL
    pub async fn quick_deploy(
        &self,
        repo: &str,
        url: &str,
        interval_minutes: Option<i32>,
    ) -> Result<DeployOutcome> {
        let repo = RepoRef::parse(repo).ok_or_else(|| {
            crate::domain::models::feature_request::DomainError::ValidationError(format!(
                "invalid repository: {}",
                repo
            ))
        })?;
        self.deploy(&repo, url.trim(), interval_minutes).await
    }

    async fn status_report(&self) -> Result<String> {
        let deployments = self.deployments.list_active().await?;
        let urls = self.urls.list_active().await?;
        let counts = self.features.count_by_status().await?;

        let mut report = format!(
            "Active deployments: {}\nMonitored URLs: {}\nFeature requests:",
            deployments.len(),
            urls.len()
        );
        for status in FeatureStatus::ALL {
            report.push_str(&format!(
                "\n- {}: {}",
                status,
                counts.get(&status).copied().unwrap_or(0)
            ));
        }
        Ok(report)
    }

    async fn handle_feature(
        &self,
        message: &str,
        entities: &Entities,
    ) -> Result<(String, Vec<Value>)> {
        if let (Some(name), Some(account)) =
            (quoted_phrase(message), target_account(message, entities))
        {
            let mut feature = FeatureRequest::new(&name, &account, "");
            feature.source_tweet_url = entities.social_url.clone();
            return match self.features.create(&feature).await {
                Ok(created) => Ok((
                    format!(
                        "Tracking feature request \"{}\" for @{}.",
                        created.name, created.target_account
                    ),
                    vec![json!({ "type": "feature_request", "id": created.id })],
                )),
                Err(RepositoryError::AlreadyExists(_)) => Ok((
                    format!(
                        "A feature request \"{}\" for @{} already exists.",
                        feature.name, feature.target_account
                    ),
                    Vec::new(),
                )),
                Err(e) => Err(e.into()),
            };
        }

        let (features, total) = self
            .features
            .list(FeatureQueryParams {
                limit: 10,
                ..Default::default()
            })
            .await?;
        if features.is_empty() {
            return Ok((
                "No feature requests yet. Quote a feature name and mention an account to add one."
                    .to_string(),
                Vec::new(),
            ));
        }

        let mut reply = format!("Latest feature requests ({} total):", total);
        for feature in features {
            reply.push_str(&format!(
                "\n- \"{}\" for @{}: {} ({} mentions)",
                feature.name, feature.target_account, feature.status, feature.mention_count
            ));
        }
        Ok((reply, Vec::new()))
    }

    async fn handle_config(&self, entities: &Entities) -> Result<(String, Vec<Value>)> {
        let (Some(minutes), Some(url)) = (entities.interval_minutes, &entities.social_url) else {
            return Ok((
                "To change a monitoring interval, give me the monitored URL and the new interval (e.g. 30 minutes)."
                    .to_string(),
                Vec::new(),
            ));
        };

        if let Some(prompt) = interval_range_prompt(minutes) {
            return Ok((prompt, Vec::new()));
        }

        let Some(monitored) = self.urls.find_by_url(url).await? else {
            return Ok((
                format!("{} is not monitored yet. Deploy it first.", url),
                Vec::new(),
            ));
        };

        self.urls.update_frequency(monitored.id, minutes).await?;
        let mut actions = vec![json!({ "type": "monitored_url", "id": monitored.id })];

        for deployment in self.deployments.find_by_monitored_url(monitored.id).await? {
            let mut configuration = deployment.configuration.clone();
            match configuration.as_object_mut() {
                Some(map) => {
                    map.insert("interval_minutes".to_string(), json!(minutes));
                }
                None => configuration = json!({ "interval_minutes": minutes }),
            }
            if let Err(e) = self
                .deployments
                .update_configuration(deployment.id, configuration)
                .await
            {
                warn!(deployment_id = %deployment.id, "Failed to update deployment configuration: {}", e);
                continue;
            }
            actions.push(json!({ "type": "deployment", "id": deployment.id }));
        }

        Ok((
            format!("Now checking {} every {} minutes.", url, minutes),
            actions,
        ))
    }
}
