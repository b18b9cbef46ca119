// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::workers::Worker;

/// 工作管理器
///
/// 启动后台工作器并统一下发关闭信号
pub struct WorkerManager {
    shutdown: watch::Sender<bool>,
    handles: Vec<(String, JoinHandle<()>)>,
}

impl Default for WorkerManager {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkerManager {
    pub fn new() -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            shutdown,
            handles: Vec::new(),
        }
    }

    /// 启动工作器
    pub fn spawn(&mut self, worker: Arc<dyn Worker>) {
        let name = worker.name().to_string();
        let shutdown = self.shutdown.subscribe();
        let handle = tokio::spawn(async move {
            worker.run(shutdown).await;
        });
        info!(worker = %name, "Worker started");
        self.handles.push((name, handle));
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// 关闭所有工作器
    ///
    /// 每个工作器最多等待 `grace`，超时后强制中止
    pub async fn shutdown(&mut self, grace: Duration) {
        info!("Shutting down workers...");
        let _ = self.shutdown.send(true);

        for (name, mut handle) in self.handles.drain(..) {
            if tokio::time::timeout(grace, &mut handle).await.is_err() {
                warn!(worker = %name, "Worker did not stop in time, aborting");
                handle.abort();
            }
        }

        info!("Workers shut down successfully");
    }
}
