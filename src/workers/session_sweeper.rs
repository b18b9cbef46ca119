// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::infrastructure::cache::session_store::SessionStore;
use crate::workers::Worker;

/// 会话清理工作器
///
/// 定期移除空闲超过 TTL 的聊天会话
pub struct SessionSweeper {
    store: Arc<SessionStore>,
    interval: Duration,
}

impl SessionSweeper {
    /// 间隔至少 1 秒
    pub fn new(store: Arc<SessionStore>, interval: Duration) -> Self {
        Self {
            store,
            interval: interval.max(Duration::from_secs(1)),
        }
    }
}

#[async_trait]
impl Worker for SessionSweeper {
    async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!("Session sweeper started");

        let mut interval = tokio::time::interval(self.interval);
        // 第一次 tick 立即返回
        interval.tick().await;

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let removed = self.store.sweep();
                    if removed > 0 {
                        info!("Swept {} idle chat sessions", removed);
                    } else {
                        debug!("No idle chat sessions to sweep");
                    }
                }
                _ = shutdown.changed() => break,
            }
        }

        info!("Session sweeper stopped");
    }

    fn name(&self) -> &str {
        "session-sweeper"
    }
}
