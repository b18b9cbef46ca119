// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Duration as ChronoDuration, FixedOffset, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{watch, Mutex as AsyncMutex};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::config::settings::SchedulerSettings;
use crate::domain::models::agent_log::{AgentLog, AgentLogEvent};
use crate::domain::models::orchestration_task::{OrchestrationTask, TaskKind};
use crate::domain::repositories::agent_log_repository::AgentLogRepository;
use crate::domain::repositories::deployment_repository::DeploymentRepository;
use crate::domain::repositories::monitored_url_repository::MonitoredUrlRepository;
use crate::domain::services::chat_agent::{AgentReply, ChatAgent};
use crate::domain::services::feature_pipeline::{FeaturePipeline, PipelineReport};
use crate::infrastructure::clients::developer_agent::DeveloperAgent;
use crate::queue::task_queue::TaskQueue;
use crate::queue::task_source::TaskSource;
use crate::utils::errors::{ClientError, OrchestratorError};
use crate::utils::telemetry::truncate;

/// 调度间隔下限（秒）
pub const MIN_INTERVAL_SECS: u64 = 10;

/// 编排器依赖
pub struct OrchestratorParts {
    pub source: TaskSource,
    pub pipeline: FeaturePipeline,
    pub chat_agent: Arc<dyn ChatAgent>,
    pub developer_agent: Arc<dyn DeveloperAgent>,
    pub urls: Arc<dyn MonitoredUrlRepository>,
    pub deployments: Arc<dyn DeploymentRepository>,
    pub logs: Arc<dyn AgentLogRepository>,
}

/// 一个调度周期的结果
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub queue_length: usize,
    /// 本周期派发的任务，队列为空时为 None
    pub task: Option<OrchestrationTask>,
    pub success: bool,
    pub elapsed_ms: u64,
    pub response: Option<String>,
    pub error: Option<String>,
    pub pipeline: Option<PipelineReport>,
}

/// 编排器状态快照
#[derive(Debug, Clone, Serialize)]
pub struct OrchestratorStatus {
    pub running: bool,
    pub interval_secs: u64,
    pub queue_length: usize,
    pub cursor: u64,
    pub cycles: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub last_cycle_at: Option<DateTime<Utc>>,
    pub last_outcome: Option<String>,
}

#[derive(Default)]
struct CycleStats {
    cycles: u64,
    succeeded: u64,
    failed: u64,
    last_cycle_at: Option<DateTime<Utc>>,
    last_outcome: Option<String>,
}

struct LoopControl {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

struct OrchestratorInner {
    queue: TaskQueue,
    source: TaskSource,
    pipeline: FeaturePipeline,
    chat_agent: Arc<dyn ChatAgent>,
    developer_agent: Arc<dyn DeveloperAgent>,
    urls: Arc<dyn MonitoredUrlRepository>,
    deployments: Arc<dyn DeploymentRepository>,
    logs: Arc<dyn AgentLogRepository>,
    task_timeout: Duration,
    interval_secs: AtomicU64,
    interval_tx: watch::Sender<u64>,
    cycle_lock: AsyncMutex<()>,
    stats: Mutex<CycleStats>,
}

/// 编排器
///
/// 按固定间隔运行调度周期：重新加载任务 → 推进功能流水线 → 派发一个任务。
/// 同一时刻最多只有一个周期在执行。
pub struct Orchestrator {
    inner: Arc<OrchestratorInner>,
    control: Mutex<Option<LoopControl>>,
}

impl Orchestrator {
    pub fn new(parts: OrchestratorParts, settings: &SchedulerSettings) -> Self {
        let interval_secs = settings.interval_secs.max(MIN_INTERVAL_SECS);
        let (interval_tx, _) = watch::channel(interval_secs);
        Self {
            inner: Arc::new(OrchestratorInner {
                queue: TaskQueue::new(),
                source: parts.source,
                pipeline: parts.pipeline,
                chat_agent: parts.chat_agent,
                developer_agent: parts.developer_agent,
                urls: parts.urls,
                deployments: parts.deployments,
                logs: parts.logs,
                task_timeout: Duration::from_secs(settings.task_timeout_secs),
                interval_secs: AtomicU64::new(interval_secs),
                interval_tx,
                cycle_lock: AsyncMutex::new(()),
                stats: Mutex::new(CycleStats::default()),
            }),
            control: Mutex::new(None),
        }
    }

    /// 启动调度循环，已在运行时返回 false
    ///
    /// 首个周期立即执行
    pub fn start(&self) -> bool {
        let mut control = self.control.lock();
        if let Some(existing) = control.as_ref() {
            if !existing.handle.is_finished() {
                return false;
            }
        }

        let (shutdown, shutdown_rx) = watch::channel(false);
        let inner = self.inner.clone();
        let handle = tokio::spawn(run_loop(inner, shutdown_rx));
        *control = Some(LoopControl { shutdown, handle });

        info!(
            interval_secs = self.inner.interval_secs.load(Ordering::SeqCst),
            "Orchestrator started"
        );
        true
    }

    /// 停止调度循环，未运行时返回 false
    ///
    /// 正在执行的周期会执行完毕
    pub fn stop(&self) -> bool {
        let Some(control) = self.control.lock().take() else {
            return false;
        };
        let running = !control.handle.is_finished();
        let _ = control.shutdown.send(true);
        if running {
            info!("Orchestrator stopping");
        }
        running
    }

    pub fn is_running(&self) -> bool {
        self.control
            .lock()
            .as_ref()
            .is_some_and(|c| !c.handle.is_finished())
    }

    pub fn interval_secs(&self) -> u64 {
        self.inner.interval_secs.load(Ordering::SeqCst)
    }

    /// 修改调度间隔，运行中的循环在下一次等待时生效
    pub fn set_interval(&self, secs: u64) -> Result<(), OrchestratorError> {
        if secs < MIN_INTERVAL_SECS {
            return Err(OrchestratorError::InvalidConfig(format!(
                "interval must be at least {} seconds",
                MIN_INTERVAL_SECS
            )));
        }
        self.inner.interval_secs.store(secs, Ordering::SeqCst);
        self.inner.interval_tx.send_replace(secs);
        info!(interval_secs = secs, "Orchestrator interval updated");
        Ok(())
    }

    pub fn status(&self) -> OrchestratorStatus {
        let stats = self.inner.stats.lock();
        OrchestratorStatus {
            running: self.is_running(),
            interval_secs: self.interval_secs(),
            queue_length: self.inner.queue.len(),
            cursor: self.inner.queue.cursor(),
            cycles: stats.cycles,
            succeeded: stats.succeeded,
            failed: stats.failed,
            last_cycle_at: stats.last_cycle_at,
            last_outcome: stats.last_outcome.clone(),
        }
    }

    /// 重新加载任务队列，返回队列长度
    pub async fn refresh(&self) -> Result<usize, OrchestratorError> {
        self.inner.reload().await
    }

    pub fn tasks(&self) -> Vec<OrchestrationTask> {
        self.inner.queue.snapshot()
    }

    /// 立即执行一个周期；已有周期在执行时返回 Busy
    pub async fn run_cycle(&self) -> Result<CycleReport, OrchestratorError> {
        self.inner.run_cycle().await
    }
}

async fn run_loop(inner: Arc<OrchestratorInner>, mut shutdown: watch::Receiver<bool>) {
    let mut interval_rx = inner.interval_tx.subscribe();

    'cycles: loop {
        if *shutdown.borrow() {
            break;
        }

        match inner.run_cycle().await {
            Ok(_) => {}
            Err(OrchestratorError::Busy) => info!("Previous cycle still running, skipping tick"),
            Err(e) => error!("Orchestration cycle failed: {}", e),
        }

        loop {
            let secs = *interval_rx.borrow_and_update();
            tokio::select! {
                _ = tokio::time::sleep(Duration::from_secs(secs)) => continue 'cycles,
                _ = shutdown.changed() => break 'cycles,
                changed = interval_rx.changed() => {
                    if changed.is_err() {
                        break 'cycles;
                    }
                }
            }
        }
    }

    info!("Orchestrator loop stopped");
}

impl OrchestratorInner {
    async fn reload(&self) -> Result<usize, OrchestratorError> {
        let tasks = self.source.load_tasks().await?;
        Ok(self.queue.reload(tasks))
    }

    async fn run_cycle(&self) -> Result<CycleReport, OrchestratorError> {
        let _guard = self
            .cycle_lock
            .try_lock()
            .map_err(|_| OrchestratorError::Busy)?;
        metrics::counter!("orchestration_cycles_total").increment(1);

        let queue_length = self.reload().await?;

        let pipeline = match self.pipeline.advance().await {
            Ok(report) => Some(report),
            Err(e) => {
                error!("Feature pipeline failed: {}", e);
                None
            }
        };

        let Some(task) = self.queue.next() else {
            info!("Task queue is empty, nothing to dispatch");
            self.finish_cycle(None, "idle".to_string());
            return Ok(CycleReport {
                queue_length,
                task: None,
                success: true,
                elapsed_ms: 0,
                response: None,
                error: None,
                pipeline,
            });
        };

        let started = Instant::now();
        let result = self.execute(&task).await;
        let elapsed = started.elapsed();
        let elapsed_ms = elapsed.as_millis() as u64;
        metrics::histogram!("orchestration_task_duration_seconds").record(elapsed.as_secs_f64());

        let (success, response, error) = match &result {
            Ok(reply) => (true, Some(reply.content.clone()), None),
            Err(e) => (false, None, Some(e.to_string())),
        };
        metrics::counter!(
            "orchestration_tasks_total",
            "outcome" => if success { "success" } else { "failure" }
        )
        .increment(1);

        info!(
            task_id = %task.id,
            kind = %task.kind,
            success,
            elapsed_ms,
            response = %truncate(response.as_deref().or(error.as_deref()).unwrap_or_default(), 200),
            "Orchestration task finished"
        );

        self.record_outcome(&task, &result).await;
        self.notify_progress(&task, success).await;

        let outcome = format!(
            "task {} {}",
            task.id,
            if success { "succeeded" } else { "failed" }
        );
        self.finish_cycle(Some(success), outcome);

        Ok(CycleReport {
            queue_length,
            task: Some(task),
            success,
            elapsed_ms,
            response,
            error,
            pipeline,
        })
    }

    async fn execute(&self, task: &OrchestrationTask) -> Result<AgentReply, ClientError> {
        let session_id = format!("orchestrator:{}", task.id);
        match tokio::time::timeout(
            self.task_timeout,
            self.chat_agent.send_message(&session_id, &task.prompt()),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(ClientError::Timeout(self.task_timeout.as_secs())),
        }
    }

    async fn record_outcome(&self, task: &OrchestrationTask, result: &Result<AgentReply, ClientError>) {
        let now: DateTime<FixedOffset> = Utc::now().into();
        match result {
            Ok(_) => {
                if let Err(e) = self.urls.mark_checked(task.monitored_url_id, now).await {
                    warn!(url = %task.url, "Failed to mark URL as checked: {}", e);
                }
                if let (TaskKind::Deployment, Some(id)) = (task.kind, task.deployment_id) {
                    let next_run_at =
                        now + ChronoDuration::minutes(i64::from(task.check_frequency_minutes));
                    if let Err(e) = self.deployments.record_success(id, next_run_at).await {
                        warn!(deployment_id = %id, "Failed to record deployment run: {}", e);
                    }
                }
            }
            Err(err) => {
                if let (TaskKind::Deployment, Some(id)) = (task.kind, task.deployment_id) {
                    if let Err(e) = self.deployments.record_failure(id, &err.to_string()).await {
                        warn!(deployment_id = %id, "Failed to record deployment failure: {}", e);
                    }
                }
            }
        }
    }

    async fn notify_progress(&self, task: &OrchestrationTask, success: bool) {
        if !self.developer_agent.is_enabled() {
            return;
        }
        let text = format!(
            "Orchestration task {} ({} {}) {}",
            task.id,
            task.kind,
            task.url,
            if success { "succeeded" } else { "failed" }
        );
        if let Err(e) = self.developer_agent.notify(&text).await {
            warn!("Failed to relay progress to developer agent: {}", e);
            let log = AgentLog::new(
                None,
                AgentLogEvent::Progress,
                format!("progress relay failed: {}", e),
                Some(serde_json::json!({ "task_id": task.id, "text": text })),
            );
            if let Err(e) = self.logs.append(&log).await {
                warn!("Failed to write progress audit log: {}", e);
            }
        }
    }

    fn finish_cycle(&self, success: Option<bool>, outcome: String) {
        let mut stats = self.stats.lock();
        stats.cycles += 1;
        match success {
            Some(true) => stats.succeeded += 1,
            Some(false) => stats.failed += 1,
            None => {}
        }
        stats.last_cycle_at = Some(Utc::now());
        stats.last_outcome = Some(outcome);
    }
}
