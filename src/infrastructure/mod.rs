// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 基础设施层模块
///
/// 包含系统的技术实现细节：
/// - 缓存（cache）：内存会话缓存
/// - 外部客户端（clients）：推文回复 API、开发者代理链路
/// - 数据库（database）：数据库连接和实体映射
/// - 指标（metrics）：Prometheus 指标导出
/// - 仓库实现（repositories）：领域仓库接口的 SeaORM 实现
pub mod cache;
pub mod clients;
pub mod database;
pub mod metrics;
pub mod repositories;
