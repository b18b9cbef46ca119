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

use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::settings::SchedulerSettings;
use crate::domain::models::agent_log::{AgentLog, AgentLogEvent};
use crate::domain::models::feature_request::{FeatureRequest, FeatureStatus};
use crate::domain::repositories::agent_log_repository::AgentLogRepository;
use crate::domain::repositories::deployment_repository::DeploymentRepository;
use crate::domain::repositories::feature_request_repository::FeatureRequestRepository;
use crate::domain::repositories::github_repo_repository::GithubRepoRepository;
use crate::domain::services::response_parser::{
    parse_implementation_response, ImplementationVerdict,
};
use crate::infrastructure::clients::developer_agent::{DeveloperAgent, ImplementationRequest};
use crate::utils::errors::OrchestratorError;
use crate::utils::telemetry::truncate;

/// 开发者代理在功能请求上登记的负责人
pub const DEVELOPER_ASSIGNEE: &str = "developer-agent";

const PENDING_SCAN_LIMIT: u64 = 1000;

/// 单次推进的结果统计
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PipelineReport {
    /// 超时仍处于 pending 的数量
    pub stale_pending: usize,
    pub dispatched: usize,
    pub shipped: usize,
    pub failed: usize,
    pub undecided: usize,
    /// 持久化失败而未能推进的数量
    pub errors: usize,
}

/// 功能请求流水线
///
/// 每个调度周期调用一次 `advance`：
/// 1. 对 pending 过久的请求输出警告
/// 2. 取最多 `max_features_per_cycle` 个 requested 请求派发给开发者代理
/// 3. 按应答推进到 shipped / failed，无法判定的保持 pending
pub struct FeaturePipeline {
    features: Arc<dyn FeatureRequestRepository>,
    logs: Arc<dyn AgentLogRepository>,
    deployments: Arc<dyn DeploymentRepository>,
    repos: Arc<dyn GithubRepoRepository>,
    agent: Arc<dyn DeveloperAgent>,
    max_features_per_cycle: u64,
    pending_warn_minutes: i64,
}

impl FeaturePipeline {
    pub fn new(
        features: Arc<dyn FeatureRequestRepository>,
        logs: Arc<dyn AgentLogRepository>,
        deployments: Arc<dyn DeploymentRepository>,
        repos: Arc<dyn GithubRepoRepository>,
        agent: Arc<dyn DeveloperAgent>,
        settings: &SchedulerSettings,
    ) -> Self {
        Self {
            features,
            logs,
            deployments,
            repos,
            agent,
            max_features_per_cycle: settings.max_features_per_cycle,
            pending_warn_minutes: settings.pending_warn_minutes,
        }
    }

    pub async fn advance(&self) -> Result<PipelineReport, OrchestratorError> {
        let mut report = PipelineReport::default();
        let now = Utc::now();

        let pending = self
            .features
            .list_by_status(FeatureStatus::Pending, PENDING_SCAN_LIMIT)
            .await?;
        for feature in &pending {
            if let Some(minutes) = feature.pending_minutes(now) {
                if minutes >= self.pending_warn_minutes {
                    warn!(
                        feature_id = %feature.id,
                        feature = %feature.name,
                        minutes,
                        "Feature request has been pending for a long time"
                    );
                    report.stale_pending += 1;
                }
            }
        }

        if !self.agent.is_enabled() || self.max_features_per_cycle == 0 {
            return Ok(report);
        }

        let requested = self
            .features
            .list_by_status(FeatureStatus::Requested, self.max_features_per_cycle)
            .await?;

        // 单个请求失败不影响同批次的其它请求
        for feature in requested {
            report.dispatched += 1;
            let (id, name) = (feature.id, feature.name.clone());
            match self.dispatch(feature).await {
                Ok(FeatureStatus::Shipped) => report.shipped += 1,
                Ok(FeatureStatus::Failed) => report.failed += 1,
                Ok(_) => report.undecided += 1,
                Err(e) => {
                    error!(feature_id = %id, feature = %name, "Failed to advance feature request: {}", e);
                    report.errors += 1;
                }
            }
        }

        Ok(report)
    }

    /// 派发一个 requested 请求，返回其最终状态
    async fn dispatch(
        &self,
        mut feature: FeatureRequest,
    ) -> Result<FeatureStatus, OrchestratorError> {
        feature.start_implementation(DEVELOPER_ASSIGNEE)?;
        let mut feature = self.features.update(&feature).await?;
        self.record_transition(&feature, FeatureStatus::Requested).await;

        let request = ImplementationRequest {
            feature_id: feature.id,
            feature_name: feature.name.clone(),
            description: feature.description.clone(),
            target_account: feature.target_account.clone(),
            repository: self.resolve_repository(&feature.target_account).await,
        };
        self.audit(
            Some(feature.id),
            AgentLogEvent::Request,
            format!("Implementation requested for '{}'", feature.name),
            Some(serde_json::to_value(&request).unwrap_or(Value::Null)),
        )
        .await;

        match self.agent.request_implementation(&request).await {
            Ok(response) => {
                self.audit(
                    Some(feature.id),
                    AgentLogEvent::Response,
                    truncate(&response.text, 500),
                    Some(json!({ "request_id": response.request_id, "text": response.text })),
                )
                .await;

                match parse_implementation_response(&response.text) {
                    ImplementationVerdict::Success(outcome) => {
                        feature.ship(outcome)?;
                    }
                    ImplementationVerdict::Failure(reason) => {
                        feature.fail(&reason)?;
                    }
                    ImplementationVerdict::Undecided => {
                        info!(feature = %feature.name, "Developer agent reply undecided, staying pending");
                        return Ok(FeatureStatus::Pending);
                    }
                }
            }
            Err(e) => {
                error!(feature = %feature.name, "Developer agent request failed: {}", e);
                self.audit(
                    Some(feature.id),
                    AgentLogEvent::Error,
                    e.to_string(),
                    None,
                )
                .await;
                feature.fail(&e.to_string())?;
            }
        }

        let verdict = feature.status;
        let feature = match self.features.update(&feature).await {
            Ok(saved) => saved,
            Err(e) => {
                self.audit(
                    Some(feature.id),
                    AgentLogEvent::Error,
                    format!("Failed to persist {} verdict: {}", verdict, e),
                    Some(json!({
                        "verdict": verdict,
                        "pr_url": feature.pr_url,
                        "error": feature.error_message,
                    })),
                )
                .await;
                return Err(e.into());
            }
        };
        self.record_transition(&feature, FeatureStatus::Pending).await;
        Ok(feature.status)
    }

    /// 通过部署配置中的目标账号找到对应仓库
    async fn resolve_repository(&self, target_account: &str) -> Option<String> {
        let deployments = match self.deployments.list_active().await {
            Ok(deployments) => deployments,
            Err(e) => {
                warn!("Failed to list deployments for repository lookup: {}", e);
                return None;
            }
        };

        let deployment = deployments.into_iter().find(|d| {
            d.configuration
                .get("target_account")
                .and_then(Value::as_str)
                .is_some_and(|a| a.eq_ignore_ascii_case(target_account))
        })?;

        match self.repos.find_by_id(deployment.github_repo_id).await {
            Ok(repo) => repo.map(|r| r.full_name()),
            Err(e) => {
                warn!("Failed to load repository {}: {}", deployment.github_repo_id, e);
                None
            }
        }
    }

    async fn record_transition(&self, feature: &FeatureRequest, from: FeatureStatus) {
        let to = feature.status.to_string();
        metrics::counter!("feature_transitions_total", "to" => to.clone()).increment(1);
        info!(feature_id = %feature.id, from = %from, to = %to, "Feature request transition");
        self.audit(
            Some(feature.id),
            AgentLogEvent::Transition,
            format!("{} -> {}", from, to),
            Some(json!({
                "from": from,
                "to": feature.status,
                "pr_url": feature.pr_url,
                "error": feature.error_message,
            })),
        )
        .await;
    }

    /// 写审计日志，失败只记警告
    async fn audit(
        &self,
        feature_id: Option<Uuid>,
        event: AgentLogEvent,
        message: String,
        payload: Option<Value>,
    ) {
        let log = AgentLog::new(feature_id, event, message, payload);
        if let Err(e) = self.logs.append(&log).await {
            warn!(event = %event, "Failed to write developer agent audit log: {}", e);
        }
    }
}
