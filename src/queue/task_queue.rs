// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use parking_lot::Mutex;

use crate::domain::models::orchestration_task::OrchestrationTask;

struct QueueState {
    tasks: Vec<OrchestrationTask>,
    cursor: u64,
}

/// 内存轮询任务队列
///
/// `reload` 整体替换任务列表；游标单调递增，`next` 取 `cursor % len`，
/// 因此重新加载不会让轮询回到开头。
pub struct TaskQueue {
    state: Mutex<QueueState>,
}

impl Default for TaskQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskQueue {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(QueueState {
                tasks: Vec::new(),
                cursor: 0,
            }),
        }
    }

    /// 替换全部任务，返回新长度
    pub fn reload(&self, tasks: Vec<OrchestrationTask>) -> usize {
        let mut state = self.state.lock();
        state.tasks = tasks;
        state.tasks.len()
    }

    /// 取下一个任务，队列为空时返回 None
    pub fn next(&self) -> Option<OrchestrationTask> {
        let mut state = self.state.lock();
        if state.tasks.is_empty() {
            return None;
        }
        let index = (state.cursor % state.tasks.len() as u64) as usize;
        state.cursor = state.cursor.wrapping_add(1);
        Some(state.tasks[index].clone())
    }

    pub fn len(&self) -> usize {
        self.state.lock().tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().tasks.is_empty()
    }

    pub fn cursor(&self) -> u64 {
        self.state.lock().cursor
    }

    pub fn snapshot(&self) -> Vec<OrchestrationTask> {
        self.state.lock().tasks.clone()
    }
}
