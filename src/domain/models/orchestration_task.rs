// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::monitored_url::UrlType;

/// 编排任务
///
/// 仅存在于内存中：每个周期由部署和监控 URL 重新生成，轮询消费，不持久化
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestrationTask {
    /// 来源记录 ID（部署 ID 或监控 URL ID）
    pub id: Uuid,
    pub kind: TaskKind,
    pub url: String,
    pub url_type: UrlType,
    pub target_account: Option<String>,
    /// `owner/name`
    pub repository: Option<String>,
    /// 仅作展示，轮询不按优先级加权
    pub priority: i32,
    pub deployment_id: Option<Uuid>,
    pub monitored_url_id: Uuid,
    pub check_frequency_minutes: i32,
    pub configuration: serde_json::Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// 已部署的仓库 + URL
    Deployment,
    /// 仅监控的 URL
    Monitor,
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TaskKind::Deployment => write!(f, "deployment"),
            TaskKind::Monitor => write!(f, "monitor"),
        }
    }
}

impl OrchestrationTask {
    /// 构建发送给聊天代理的提示
    pub fn prompt(&self) -> String {
        let account = self
            .target_account
            .as_deref()
            .map(|a| format!("@{}", a))
            .unwrap_or_else(|| "the account owner".to_string());

        match (self.kind, self.repository.as_deref()) {
            (TaskKind::Deployment, Some(repo)) => format!(
                "Check the replies to {} and track every feature request addressed to {} \
                 for the GitHub repository {}. Use the tools to fetch replies and record each \
                 distinct feature request, then summarize what you found.",
                self.url, account, repo
            ),
            _ => format!(
                "Check the replies to {} and track every feature request addressed to {}. \
                 Use the tools to fetch replies and record each distinct feature request, \
                 then summarize what you found.",
                self.url, account
            ),
        }
    }
}
