// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// 功能请求实体
///
/// 从社交回复中提取的产品建议，经过以下状态流转直至解决：
/// Requested → Pending → Shipped/Failed，另有带外的 Rejected。
/// Failed/Rejected 可以手动重置回 Requested。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRequest {
    pub id: Uuid,
    /// 规范化后的功能名称
    pub name: String,
    pub description: String,
    pub category: Option<String>,
    pub priority: FeaturePriority,
    /// 提出者（社交账号）
    pub requester: Option<String>,
    pub source_tweet_url: Option<String>,
    /// 功能请求针对的目标账号
    pub target_account: String,
    pub status: FeatureStatus,
    /// 同一功能被提及的次数
    pub mention_count: i32,
    pub assigned_to: Option<String>,
    pub implementation_started_at: Option<DateTime<FixedOffset>>,
    pub shipped_at: Option<DateTime<FixedOffset>>,
    pub failed_at: Option<DateTime<FixedOffset>>,
    pub rejected_at: Option<DateTime<FixedOffset>>,
    pub pr_url: Option<String>,
    pub pr_number: Option<i32>,
    pub error_message: Option<String>,
    /// 开发者代理返回的元数据，原样保存
    pub implementation_metadata: Option<serde_json::Value>,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

/// 功能请求状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FeatureStatus {
    /// 已提出，等待调度
    #[default]
    Requested,
    /// 开发中，已派发给开发者代理
    #[serde(alias = "developing")]
    Pending,
    /// 已上线
    Shipped,
    /// 实现失败
    Failed,
    /// 已拒绝
    Rejected,
}

impl FeatureStatus {
    pub const ALL: [FeatureStatus; 5] = [
        FeatureStatus::Requested,
        FeatureStatus::Pending,
        FeatureStatus::Shipped,
        FeatureStatus::Failed,
        FeatureStatus::Rejected,
    ];
}

impl fmt::Display for FeatureStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FeatureStatus::Requested => write!(f, "requested"),
            FeatureStatus::Pending => write!(f, "pending"),
            FeatureStatus::Shipped => write!(f, "shipped"),
            FeatureStatus::Failed => write!(f, "failed"),
            FeatureStatus::Rejected => write!(f, "rejected"),
        }
    }
}

impl FromStr for FeatureStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "requested" => Ok(FeatureStatus::Requested),
            "pending" | "developing" => Ok(FeatureStatus::Pending),
            "shipped" => Ok(FeatureStatus::Shipped),
            "failed" => Ok(FeatureStatus::Failed),
            "rejected" => Ok(FeatureStatus::Rejected),
            _ => Err(()),
        }
    }
}

/// 功能请求优先级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FeaturePriority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl fmt::Display for FeaturePriority {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FeaturePriority::Low => write!(f, "low"),
            FeaturePriority::Medium => write!(f, "medium"),
            FeaturePriority::High => write!(f, "high"),
            FeaturePriority::Critical => write!(f, "critical"),
        }
    }
}

impl FromStr for FeaturePriority {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(FeaturePriority::Low),
            "medium" | "normal" => Ok(FeaturePriority::Medium),
            "high" => Ok(FeaturePriority::High),
            "critical" | "urgent" => Ok(FeaturePriority::Critical),
            _ => Err(()),
        }
    }
}

/// 领域错误类型
#[derive(Error, Debug)]
pub enum DomainError {
    /// 不允许的状态转换
    #[error("Invalid state transition: {from} -> {to}")]
    InvalidStateTransition {
        from: FeatureStatus,
        to: FeatureStatus,
    },

    /// 验证错误
    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// 开发者代理成功实现后的结果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShipOutcome {
    pub pr_url: Option<String>,
    pub pr_number: Option<i32>,
    pub files: Vec<String>,
    /// 原始响应文本
    pub response: String,
}

/// 规范化功能名称：去首尾空白、合并空白、小写
pub fn normalize_feature_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// 规范化账号：去掉 `@` 并小写
pub fn normalize_account(account: &str) -> String {
    account.trim().trim_start_matches('@').to_lowercase()
}

impl FeatureRequest {
    /// 创建新的功能请求，状态为 Requested
    pub fn new(name: &str, target_account: &str, description: impl Into<String>) -> Self {
        let now: DateTime<FixedOffset> = Utc::now().into();
        Self {
            id: Uuid::new_v4(),
            name: normalize_feature_name(name),
            description: description.into(),
            category: None,
            priority: FeaturePriority::Medium,
            requester: None,
            source_tweet_url: None,
            target_account: normalize_account(target_account),
            status: FeatureStatus::Requested,
            mention_count: 1,
            assigned_to: None,
            implementation_started_at: None,
            shipped_at: None,
            failed_at: None,
            rejected_at: None,
            pr_url: None,
            pr_number: None,
            error_message: None,
            implementation_metadata: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn transition_error(&self, to: FeatureStatus) -> DomainError {
        DomainError::InvalidStateTransition {
            from: self.status,
            to,
        }
    }

    /// 开始实现
    ///
    /// Requested → Pending，记录负责人和开始时间
    pub fn start_implementation(&mut self, assignee: &str) -> Result<(), DomainError> {
        match self.status {
            FeatureStatus::Requested => {
                let now: DateTime<FixedOffset> = Utc::now().into();
                self.status = FeatureStatus::Pending;
                self.assigned_to = Some(assignee.to_string());
                self.implementation_started_at = Some(now);
                self.updated_at = now;
                Ok(())
            }
            _ => Err(self.transition_error(FeatureStatus::Pending)),
        }
    }

    /// 标记已上线
    ///
    /// Pending → Shipped，保存 PR 信息和文件列表
    pub fn ship(&mut self, outcome: ShipOutcome) -> Result<(), DomainError> {
        match self.status {
            FeatureStatus::Pending => {
                let now: DateTime<FixedOffset> = Utc::now().into();
                self.status = FeatureStatus::Shipped;
                self.shipped_at = Some(now);
                self.pr_url = outcome.pr_url.clone();
                self.pr_number = outcome.pr_number;
                self.error_message = None;
                self.implementation_metadata = Some(json!({
                    "pr_url": outcome.pr_url,
                    "pr_number": outcome.pr_number,
                    "files": outcome.files,
                    "response": outcome.response,
                }));
                self.updated_at = now;
                Ok(())
            }
            _ => Err(self.transition_error(FeatureStatus::Shipped)),
        }
    }

    /// 标记实现失败
    ///
    /// Pending → Failed，保存错误信息
    pub fn fail(&mut self, error: &str) -> Result<(), DomainError> {
        match self.status {
            FeatureStatus::Pending => {
                let now: DateTime<FixedOffset> = Utc::now().into();
                self.status = FeatureStatus::Failed;
                self.failed_at = Some(now);
                self.error_message = Some(error.to_string());
                self.implementation_metadata = Some(json!({ "error": error }));
                self.updated_at = now;
                Ok(())
            }
            _ => Err(self.transition_error(FeatureStatus::Failed)),
        }
    }

    /// 拒绝功能请求
    pub fn reject(&mut self, reason: Option<&str>) -> Result<(), DomainError> {
        match self.status {
            FeatureStatus::Requested | FeatureStatus::Pending => {
                let now: DateTime<FixedOffset> = Utc::now().into();
                self.status = FeatureStatus::Rejected;
                self.rejected_at = Some(now);
                if let Some(reason) = reason {
                    self.error_message = Some(reason.to_string());
                }
                self.updated_at = now;
                Ok(())
            }
            _ => Err(self.transition_error(FeatureStatus::Rejected)),
        }
    }

    /// 手动重置
    ///
    /// Failed/Rejected → Requested，清除实现相关字段
    pub fn reset(&mut self) -> Result<(), DomainError> {
        match self.status {
            FeatureStatus::Failed | FeatureStatus::Rejected => {
                self.status = FeatureStatus::Requested;
                self.assigned_to = None;
                self.implementation_started_at = None;
                self.shipped_at = None;
                self.failed_at = None;
                self.rejected_at = None;
                self.pr_url = None;
                self.pr_number = None;
                self.error_message = None;
                self.implementation_metadata = None;
                self.updated_at = Utc::now().into();
                Ok(())
            }
            _ => Err(self.transition_error(FeatureStatus::Requested)),
        }
    }

    /// pending 已持续的分钟数
    pub fn pending_minutes(&self, now: DateTime<Utc>) -> Option<i64> {
        match (self.status, self.implementation_started_at) {
            (FeatureStatus::Pending, Some(started)) => {
                Some((now - started.with_timezone(&Utc)).num_minutes())
            }
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "feature_request_test.rs"]
mod tests;
