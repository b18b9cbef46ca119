// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 仓库接口模块
///
/// 该模块定义了领域层的仓库接口，遵循依赖倒置原则。
/// 仓库接口定义了数据持久化的抽象契约，具体实现由基础设施层提供。
///
/// 包含的仓库接口：
/// - 监控 URL 仓库（monitored_url_repository）
/// - GitHub 仓库仓储（github_repo_repository）
/// - 部署仓库（deployment_repository）
/// - 编排聊天仓库（chat_repository）
/// - 功能请求仓库（feature_request_repository）
/// - 开发者代理审计日志仓库（agent_log_repository）
pub mod agent_log_repository;
pub mod chat_repository;
pub mod deployment_repository;
pub mod feature_request_repository;
pub mod github_repo_repository;
pub mod monitored_url_repository;
