// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::chat_message::ChatMessage;
use crate::utils::errors::RepositoryError;
use async_trait::async_trait;

/// 编排聊天记录仓库特质
#[async_trait]
pub trait ChatRepository: Send + Sync {
    async fn append(&self, message: &ChatMessage) -> Result<(), RepositoryError>;
    /// 按时间顺序返回会话最近的 `limit` 条消息
    async fn list_by_session(
        &self,
        session_id: &str,
        limit: u64,
    ) -> Result<Vec<ChatMessage>, RepositoryError>;
}
