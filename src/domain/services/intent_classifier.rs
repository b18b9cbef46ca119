// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 对话意图
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Deploy,
    Status,
    Feature,
    Config,
    General,
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Intent::Deploy => write!(f, "deploy"),
            Intent::Status => write!(f, "status"),
            Intent::Feature => write!(f, "feature"),
            Intent::Config => write!(f, "config"),
            Intent::General => write!(f, "general"),
        }
    }
}

/// GitHub 仓库引用
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    /// 解析 `owner/name` 或 GitHub URL
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if let Some(caps) = GITHUB_URL.captures(input) {
            return Some(Self::from_parts(&caps[1], &caps[2]));
        }
        BARE_REPO
            .captures(input)
            .filter(|caps| caps.get(0).map(|m| m.as_str().len()) == Some(input.len()))
            .map(|caps| Self::from_parts(&caps[1], &caps[2]))
    }

    fn from_parts(owner: &str, name: &str) -> Self {
        Self {
            owner: owner.to_string(),
            name: name.trim_end_matches(".git").to_string(),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

/// 从消息中抽取的实体
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entities {
    pub repository: Option<RepoRef>,
    pub social_url: Option<String>,
    pub interval_minutes: Option<i32>,
}

/// 分类结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    pub intent: Intent,
    pub confidence: f32,
    pub entities: Entities,
}

/// 意图分类策略
pub trait IntentClassifier: Send + Sync {
    fn classify(&self, message: &str) -> Classification;
}

/// 意图关键词表，按顺序匹配，首个命中即返回
const KEYWORD_TABLE: &[(Intent, &[&str], f32)] = &[
    (
        Intent::Deploy,
        &["deploy", "monitor", "watch", "set up", "setup", "start tracking"],
        0.9,
    ),
    (
        Intent::Status,
        &["status", "progress", "what's running", "report", "overview"],
        0.85,
    ),
    (
        Intent::Feature,
        &["feature", "request", "shipped", "implement"],
        0.8,
    ),
    (
        Intent::Config,
        &["config", "interval", "frequency", "every", "change"],
        0.75,
    ),
];

const GENERAL_CONFIDENCE: f32 = 0.5;

static GITHUB_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:https?://)?(?:www\.)?github\.com/([A-Za-z0-9_.-]+)/([A-Za-z0-9_.-]+)")
        .unwrap()
});

static BARE_REPO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([A-Za-z0-9_-][A-Za-z0-9_.-]*)/([A-Za-z0-9_.-]+)").unwrap());

static ANY_URL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b(?:https?://|www\.)\S+").unwrap());

static SOCIAL_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)https?://(?:www\.|mobile\.)?(?:twitter\.com|x\.com|instagram\.com|tiktok\.com)/\S+",
    )
    .unwrap()
});

static INTERVAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(\d+)\s*(minutes|minute|mins|min|m|hours|hour|hrs|hr|h)\b").unwrap()
});

fn trim_trailing_punctuation(s: &str) -> &str {
    s.trim_end_matches(|c: char| matches!(c, '.' | ',' | ';' | ':' | '!' | '?' | ')' | '"' | '\''))
}

/// 抽取仓库、社交链接和时间间隔
///
/// 三个扫描相互独立，任何一个缺失都不影响其它
pub fn extract_entities(message: &str) -> Entities {
    let repository = GITHUB_URL
        .captures(message)
        .map(|caps| RepoRef::from_parts(&caps[1], trim_trailing_punctuation(&caps[2])))
        .or_else(|| {
            // 去掉 URL 后再找裸 owner/name
            let without_urls = ANY_URL.replace_all(message, " ");
            without_urls
                .split_whitespace()
                .map(trim_trailing_punctuation)
                .find_map(RepoRef::parse)
        });

    let social_url = SOCIAL_URL
        .find(message)
        .map(|m| trim_trailing_punctuation(m.as_str()).to_string());

    let interval_minutes = INTERVAL.captures(message).and_then(|caps| {
        let amount: i32 = caps[1].parse().ok()?;
        let unit = caps[2].to_lowercase();
        if unit.starts_with('h') {
            amount.checked_mul(60)
        } else {
            Some(amount)
        }
    });

    Entities {
        repository,
        social_url,
        interval_minutes,
    }
}

/// 基于关键词的意图分类器
#[derive(Debug, Default, Clone)]
pub struct KeywordIntentClassifier;

impl KeywordIntentClassifier {
    pub fn new() -> Self {
        Self
    }
}

impl IntentClassifier for KeywordIntentClassifier {
    fn classify(&self, message: &str) -> Classification {
        // URL 中的路径（如 /status/）不参与关键词匹配
        let lowered = ANY_URL.replace_all(message, " ").to_lowercase();
        let (intent, confidence) = KEYWORD_TABLE
            .iter()
            .find(|(_, keywords, _)| keywords.iter().any(|k| lowered.contains(k)))
            .map(|(intent, _, confidence)| (*intent, *confidence))
            .unwrap_or((Intent::General, GENERAL_CONFIDENCE));

        Classification {
            intent,
            confidence,
            entities: extract_entities(message),
        }
    }
}

#[cfg(test)]
#[path = "intent_classifier_test.rs"]
mod tests;
