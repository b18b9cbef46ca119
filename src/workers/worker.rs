// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use tokio::sync::watch;

/// Worker trait定义
///
/// 所有后台工作器都必须实现此trait
#[async_trait]
pub trait Worker: Send + Sync {
    /// 运行工作器，直到关闭信号变为 true
    async fn run(&self, shutdown: watch::Receiver<bool>);

    /// 获取工作器名称
    fn name(&self) -> &str;
}
