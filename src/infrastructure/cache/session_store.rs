// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use lru::LruCache;
use parking_lot::Mutex;
use serde::Serialize;
use std::num::NonZeroUsize;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

use crate::config::settings::SessionSettings;
use crate::domain::models::chat_message::ChatRole;

/// 会话中的单条消息
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionMessage {
    pub role: ChatRole,
    pub content: String,
    pub at: DateTime<Utc>,
}

impl SessionMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            at: Utc::now(),
        }
    }
}

/// 单个聊天会话
#[derive(Debug, Clone)]
pub struct ChatSession {
    pub messages: Vec<SessionMessage>,
    pub last_active: Instant,
}

impl ChatSession {
    fn new() -> Self {
        Self {
            messages: Vec::new(),
            last_active: Instant::now(),
        }
    }
}

/// 内存会话缓存
///
/// 有界 LRU，超出容量时淘汰最久未使用的会话；
/// 空闲超过 TTL 的会话由 `sweep` 清理。
pub struct SessionStore {
    sessions: Mutex<LruCache<String, ChatSession>>,
    ttl: Duration,
    max_history: usize,
}

impl SessionStore {
    pub fn new(capacity: usize, ttl: Duration, max_history: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            sessions: Mutex::new(LruCache::new(capacity)),
            ttl,
            max_history: max_history.max(1),
        }
    }

    pub fn from_settings(settings: &SessionSettings) -> Self {
        Self::new(
            settings.capacity,
            Duration::from_secs(settings.ttl_secs),
            settings.max_history,
        )
    }

    /// 追加消息，只保留最近 `max_history` 条
    pub fn append(&self, session_id: &str, message: SessionMessage) {
        let mut sessions = self.sessions.lock();
        let session = sessions.get_or_insert_mut(session_id.to_string(), ChatSession::new);
        session.messages.push(message);
        if session.messages.len() > self.max_history {
            let overflow = session.messages.len() - self.max_history;
            session.messages.drain(..overflow);
        }
        session.last_active = Instant::now();
    }

    /// 会话历史（按时间顺序）
    pub fn history(&self, session_id: &str) -> Vec<SessionMessage> {
        let mut sessions = self.sessions.lock();
        match sessions.get_mut(session_id) {
            Some(session) => {
                session.last_active = Instant::now();
                session.messages.clone()
            }
            None => Vec::new(),
        }
    }

    /// 删除会话，返回是否存在
    pub fn clear(&self, session_id: &str) -> bool {
        self.sessions.lock().pop(session_id).is_some()
    }

    /// 清理空闲超过 TTL 的会话
    pub fn sweep(&self) -> usize {
        self.sweep_at(Instant::now())
    }

    pub(crate) fn sweep_at(&self, now: Instant) -> usize {
        let mut sessions = self.sessions.lock();
        let expired: Vec<String> = sessions
            .iter()
            .filter(|(_, session)| now.saturating_duration_since(session.last_active) > self.ttl)
            .map(|(id, _)| id.clone())
            .collect();

        for id in &expired {
            sessions.pop(id);
        }

        if !expired.is_empty() {
            debug!(removed = expired.len(), "Swept idle chat sessions");
        }
        expired.len()
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
