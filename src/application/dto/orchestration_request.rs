// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// 编排配置DTO
#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct OrchestrationConfigDto {
    /// 调度间隔（秒）
    #[validate(range(min = 10, max = 86400))]
    pub interval_secs: u64,
}

/// 编排对话请求DTO
#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct OrchestrationChatDto {
    #[validate(length(min = 1, max = 128))]
    pub session_id: Option<String>,

    #[validate(length(min = 1, max = 4000))]
    pub message: String,
}

/// 对话记录查询参数
#[derive(Debug, Deserialize, Serialize, Validate, Default)]
pub struct TranscriptQueryDto {
    #[validate(range(min = 1, max = 500))]
    pub limit: Option<u64>,
}
