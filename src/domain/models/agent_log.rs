// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// 开发者代理审计日志
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentLog {
    pub id: Uuid,
    pub feature_request_id: Option<Uuid>,
    pub event_type: AgentLogEvent,
    pub message: String,
    pub payload: Option<serde_json::Value>,
    pub created_at: DateTime<FixedOffset>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentLogEvent {
    /// 状态转换
    Transition,
    /// 发往开发者代理的请求
    Request,
    /// 开发者代理的响应
    Response,
    Error,
    /// 调度进度通知
    Progress,
}

impl fmt::Display for AgentLogEvent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AgentLogEvent::Transition => write!(f, "transition"),
            AgentLogEvent::Request => write!(f, "request"),
            AgentLogEvent::Response => write!(f, "response"),
            AgentLogEvent::Error => write!(f, "error"),
            AgentLogEvent::Progress => write!(f, "progress"),
        }
    }
}

impl FromStr for AgentLogEvent {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "transition" => Ok(AgentLogEvent::Transition),
            "request" => Ok(AgentLogEvent::Request),
            "response" => Ok(AgentLogEvent::Response),
            "error" => Ok(AgentLogEvent::Error),
            "progress" => Ok(AgentLogEvent::Progress),
            _ => Err(()),
        }
    }
}

impl AgentLog {
    pub fn new(
        feature_request_id: Option<Uuid>,
        event_type: AgentLogEvent,
        message: impl Into<String>,
        payload: Option<serde_json::Value>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            feature_request_id,
            event_type,
            message: message.into(),
            payload,
            created_at: Utc::now().into(),
        }
    }
}
