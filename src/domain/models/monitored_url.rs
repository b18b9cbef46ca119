// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// 被监控的 URL
///
/// 调度器会周期性地检查该地址下的新回复
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitoredUrl {
    pub id: Uuid,
    pub url: String,
    pub url_type: UrlType,
    /// 检查频率（分钟）
    pub check_frequency_minutes: i32,
    pub priority: i32,
    pub last_checked_at: Option<DateTime<FixedOffset>>,
    pub github_repo_id: Option<Uuid>,
    pub is_active: bool,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

/// URL 类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UrlType {
    Twitter,
    Instagram,
    Tiktok,
    Github,
    #[default]
    Other,
}

impl UrlType {
    /// 根据主机名推断 URL 类型
    pub fn detect(url: &str) -> Self {
        let host = url::Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.trim_start_matches("www.").to_lowercase()));

        match host.as_deref() {
            Some("twitter.com") | Some("x.com") | Some("mobile.twitter.com") => UrlType::Twitter,
            Some("instagram.com") => UrlType::Instagram,
            Some("tiktok.com") => UrlType::Tiktok,
            Some("github.com") => UrlType::Github,
            _ => UrlType::Other,
        }
    }
}

impl fmt::Display for UrlType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            UrlType::Twitter => write!(f, "twitter"),
            UrlType::Instagram => write!(f, "instagram"),
            UrlType::Tiktok => write!(f, "tiktok"),
            UrlType::Github => write!(f, "github"),
            UrlType::Other => write!(f, "other"),
        }
    }
}

impl FromStr for UrlType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "twitter" => Ok(UrlType::Twitter),
            "instagram" => Ok(UrlType::Instagram),
            "tiktok" => Ok(UrlType::Tiktok),
            "github" => Ok(UrlType::Github),
            "other" => Ok(UrlType::Other),
            _ => Err(()),
        }
    }
}

impl MonitoredUrl {
    /// 创建新的监控 URL，类型由地址自动推断
    pub fn new(url: String, check_frequency_minutes: i32) -> Self {
        let now: DateTime<FixedOffset> = Utc::now().into();
        Self {
            id: Uuid::new_v4(),
            url_type: UrlType::detect(&url),
            url,
            check_frequency_minutes,
            priority: 0,
            last_checked_at: None,
            github_repo_id: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

/// 从 URL 路径第一段推断账号
///
/// `https://x.com/acme/status/1` → `acme`；路径为空或首段是通用前缀时返回 None
pub fn account_hint(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url.trim()).ok()?;
    let first = parsed.path_segments()?.find(|s| !s.is_empty())?;
    let first = first.trim_start_matches('@');
    match first {
        "" | "p" | "reel" | "i" | "status" | "video" | "explore" => None,
        account => Some(account.to_lowercase()),
    }
}
