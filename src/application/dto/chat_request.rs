// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::infrastructure::cache::session_store::SessionMessage;

/// 聊天请求DTO
///
/// 省略 `session_id` 时由服务端生成新会话
#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct ChatRequestDto {
    #[validate(length(min = 1, max = 128))]
    pub session_id: Option<String>,

    #[validate(length(min = 1, max = 8000))]
    pub message: String,
}

/// 聊天响应DTO
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponseDto {
    pub success: bool,
    pub session_id: String,
    pub reply: String,
    pub tool_calls_executed: usize,
    pub features_tracked: Vec<String>,
}

/// 会话历史响应DTO
#[derive(Debug, Serialize)]
pub struct ChatHistoryDto {
    pub session_id: String,
    pub messages: Vec<SessionMessage>,
}
