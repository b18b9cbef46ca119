// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// - 聊天代理（chat_agent）：LLM 驱动的对话与工具调用
/// - 编排对话（chat_service）：意图分发与部署流程
/// - 功能流水线（feature_pipeline）：功能请求派发与状态推进
/// - 功能跟踪（feature_tracker）：功能提及的合并写入
/// - 意图分类（intent_classifier）：关键词分类与实体抽取
/// - 应答解析（response_parser）：开发者代理应答判定
pub mod chat_agent;
pub mod chat_service;
pub mod feature_pipeline;
pub mod feature_tracker;
pub mod intent_classifier;
pub mod response_parser;
