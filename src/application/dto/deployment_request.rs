// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// 快速部署请求DTO
#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct QuickDeployRequestDto {
    /// `owner/name` 或 GitHub 仓库 URL
    #[validate(length(min = 3, max = 200))]
    pub github_repo: String,

    /// 需要监控的社交帖子 URL
    #[validate(url)]
    pub url: String,

    /// 检查间隔（分钟）
    #[validate(range(min = 1, max = 10080))]
    pub interval_minutes: Option<i32>,
}
