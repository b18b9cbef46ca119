// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 队列模块
///
/// 提供内存轮询任务队列、任务来源以及编排调度器
pub mod scheduler;
pub mod task_queue;
pub mod task_source;
