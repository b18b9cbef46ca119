// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::chat_message::{ChatMessage, ChatRole};
use crate::domain::repositories::chat_repository::ChatRepository;
use crate::infrastructure::database::entities::chat_message as chat_entity;
use crate::utils::errors::RepositoryError;
use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use std::sync::Arc;

/// 编排对话记录仓库
#[derive(Clone)]
pub struct ChatRepositoryImpl {
    db: Arc<DatabaseConnection>,
}

impl ChatRepositoryImpl {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl From<chat_entity::Model> for ChatMessage {
    fn from(model: chat_entity::Model) -> Self {
        Self {
            id: model.id,
            session_id: model.session_id,
            role: model.role.parse().unwrap_or(ChatRole::User),
            content: model.content,
            intent: model.intent,
            created_at: model.created_at,
        }
    }
}

#[async_trait]
impl ChatRepository for ChatRepositoryImpl {
    async fn append(&self, message: &ChatMessage) -> Result<(), RepositoryError> {
        let model = chat_entity::ActiveModel {
            id: Set(message.id),
            session_id: Set(message.session_id.clone()),
            role: Set(message.role.to_string()),
            content: Set(message.content.clone()),
            intent: Set(message.intent.clone()),
            created_at: Set(message.created_at),
        };
        model.insert(self.db.as_ref()).await?;
        Ok(())
    }

    async fn list_by_session(
        &self,
        session_id: &str,
        limit: u64,
    ) -> Result<Vec<ChatMessage>, RepositoryError> {
        // 取最新的 limit 条，再翻转为时间正序
        let mut models = chat_entity::Entity::find()
            .filter(chat_entity::Column::SessionId.eq(session_id))
            .order_by_desc(chat_entity::Column::CreatedAt)
            .order_by_desc(chat_entity::Column::Id)
            .limit(limit)
            .all(self.db.as_ref())
            .await?;
        models.reverse();
        Ok(models.into_iter().map(Into::into).collect())
    }
}
