// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// 部署
///
/// 将一个 GitHub 仓库与一个监控 URL 关联，调度器每次执行后更新运行统计
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deployment {
    pub id: Uuid,
    pub github_repo_id: Uuid,
    pub monitored_url_id: Uuid,
    /// 部署配置（interval_minutes、target_account 等）
    pub configuration: serde_json::Value,
    pub status: DeploymentStatus,
    pub run_count: i32,
    pub error_count: i32,
    pub last_run_at: Option<DateTime<FixedOffset>>,
    pub last_error: Option<String>,
    pub next_run_at: Option<DateTime<FixedOffset>>,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

/// 部署状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentStatus {
    #[default]
    Active,
    Paused,
}

impl fmt::Display for DeploymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DeploymentStatus::Active => write!(f, "active"),
            DeploymentStatus::Paused => write!(f, "paused"),
        }
    }
}

impl FromStr for DeploymentStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(DeploymentStatus::Active),
            "paused" => Ok(DeploymentStatus::Paused),
            _ => Err(()),
        }
    }
}

impl Deployment {
    pub fn new(
        github_repo_id: Uuid,
        monitored_url_id: Uuid,
        configuration: serde_json::Value,
    ) -> Self {
        let now: DateTime<FixedOffset> = Utc::now().into();
        Self {
            id: Uuid::new_v4(),
            github_repo_id,
            monitored_url_id,
            configuration,
            status: DeploymentStatus::Active,
            run_count: 0,
            error_count: 0,
            last_run_at: None,
            last_error: None,
            next_run_at: Some(now),
            created_at: now,
            updated_at: now,
        }
    }
}
