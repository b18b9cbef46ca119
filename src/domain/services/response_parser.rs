// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::models::feature_request::ShipOutcome;

static PR_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"https://github\.com/([A-Za-z0-9_.-]+)/([A-Za-z0-9_.-]+)/pull/(\d+)").unwrap()
});

static BACKTICK: Lazy<Regex> = Lazy::new(|| Regex::new(r"`([^`\s]+)`").unwrap());

/// 成功标记按词边界匹配，避免 "unsuccessfully" 之类的误判
static SUCCESS_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:successfully|pull request created|pr created|implemented)\b|✅").unwrap()
});

const FAILURE_MARKERS: &[&str] = &[
    "failed",
    "error",
    "unable to",
    "could not",
    "not implemented",
    "unsuccessful",
    "❌",
];

/// 开发者代理应答的判定结果
#[derive(Debug, Clone, PartialEq)]
pub enum ImplementationVerdict {
    Success(ShipOutcome),
    Failure(String),
    /// 既没有成功标记也没有失败标记，保持 pending
    Undecided,
}

/// 解析开发者代理的应答文本
///
/// 判定顺序：PR 链接 → 失败标记 → 成功标记
pub fn parse_implementation_response(text: &str) -> ImplementationVerdict {
    if let Some(caps) = PR_URL.captures(text) {
        return ImplementationVerdict::Success(ShipOutcome {
            pr_url: Some(caps[0].to_string()),
            pr_number: caps[3].parse::<i32>().ok(),
            files: extract_files(text),
            response: text.to_string(),
        });
    }

    let lowered = text.to_lowercase();
    if FAILURE_MARKERS.iter().any(|m| lowered.contains(m)) {
        return ImplementationVerdict::Failure(text.trim().to_string());
    }

    if SUCCESS_MARKER.is_match(text) {
        return ImplementationVerdict::Success(ShipOutcome {
            pr_url: None,
            pr_number: None,
            files: extract_files(text),
            response: text.to_string(),
        });
    }

    ImplementationVerdict::Undecided
}

/// 反引号中包含 `/` 或 `.` 的片段视为文件路径
fn extract_files(text: &str) -> Vec<String> {
    let mut files: Vec<String> = Vec::new();
    for caps in BACKTICK.captures_iter(text) {
        let candidate = &caps[1];
        if (candidate.contains('/') || candidate.contains('.'))
            && !candidate.starts_with("http")
            && !files.iter().any(|f| f == candidate)
        {
            files.push(candidate.to_string());
        }
    }
    files
}
