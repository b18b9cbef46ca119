// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// 该模块定义了系统的核心业务实体，包括：
/// - 监控 URL（monitored_url）：被周期性检查的社交帖子
/// - GitHub 仓库（github_repo）：功能最终落地的仓库
/// - 部署（deployment）：仓库与监控 URL 的绑定及运行统计
/// - 功能请求（feature_request）：带状态机的功能请求生命周期
/// - 聊天记录（chat_message）与审计日志（agent_log）
/// - 编排任务（orchestration_task）：调度器在内存中消费的工作项
pub mod agent_log;
pub mod chat_message;
pub mod deployment;
pub mod feature_request;
pub mod github_repo;
pub mod monitored_url;
pub mod orchestration_task;
