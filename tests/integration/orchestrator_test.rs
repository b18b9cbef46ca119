// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{scheduler_settings, Repos, ScriptedChatAgent, ScriptedDeveloperAgent};
use shipwright::domain::models::agent_log::AgentLogEvent;
use shipwright::domain::models::feature_request::{FeatureRequest, FeatureStatus};
use shipwright::domain::services::feature_pipeline::FeaturePipeline;
use shipwright::queue::scheduler::{Orchestrator, OrchestratorParts};
use shipwright::queue::task_source::TaskSource;
use shipwright::utils::errors::OrchestratorError;
use std::sync::Arc;
use std::time::Duration;

fn orchestrator(
    repos: &Repos,
    chat: Arc<ScriptedChatAgent>,
    developer: Arc<ScriptedDeveloperAgent>,
) -> Orchestrator {
    let settings = scheduler_settings();
    let pipeline = FeaturePipeline::new(
        repos.features.clone(),
        repos.logs.clone(),
        repos.deployments.clone(),
        repos.repos.clone(),
        developer.clone(),
        &settings,
    );
    Orchestrator::new(
        OrchestratorParts {
            source: TaskSource::new(
                repos.urls.clone(),
                repos.deployments.clone(),
                repos.repos.clone(),
            ),
            pipeline,
            chat_agent: chat,
            developer_agent: developer,
            urls: repos.urls.clone(),
            deployments: repos.deployments.clone(),
            logs: repos.logs.clone(),
        },
        &settings,
    )
}

/// 每个周期派发一个任务，按顺序轮询
#[tokio::test]
async fn test_cycles_round_robin_over_tasks() {
    let repos = Repos::setup().await;
    let deployment = repos
        .seed_deployment("acme", "app", "https://x.com/acme/status/1")
        .await;
    let monitor = repos.seed_url("https://x.com/globex/status/2").await;

    let chat = Arc::new(ScriptedChatAgent::default());
    let developer = Arc::new(ScriptedDeveloperAgent::new(false));
    let orchestrator = orchestrator(&repos, chat.clone(), developer);

    let first = orchestrator.run_cycle().await.unwrap();
    let second = orchestrator.run_cycle().await.unwrap();
    let third = orchestrator.run_cycle().await.unwrap();

    assert_eq!(first.task.unwrap().id, deployment.id);
    assert_eq!(second.task.unwrap().id, monitor.id);
    assert_eq!(third.task.unwrap().id, deployment.id);
    assert!(first.success);

    let calls = chat.calls();
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[0].0, format!("orchestrator:{}", deployment.id));
    assert!(calls[0].1.contains("acme/app"));

    let status = orchestrator.status();
    assert_eq!(status.cycles, 3);
    assert_eq!(status.succeeded, 3);
    assert_eq!(status.queue_length, 2);
    assert!(!status.running);
}

#[tokio::test]
async fn test_success_updates_deployment_and_url() {
    let repos = Repos::setup().await;
    let deployment = repos
        .seed_deployment("acme", "app", "https://x.com/acme/status/1")
        .await;
    let orchestrator = orchestrator(
        &repos,
        Arc::new(ScriptedChatAgent::default()),
        Arc::new(ScriptedDeveloperAgent::new(false)),
    );

    orchestrator.run_cycle().await.unwrap();

    let stored = repos
        .deployments
        .find_by_id(deployment.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.run_count, 1);
    assert!(stored.next_run_at.is_some());

    let url = repos
        .urls
        .find_by_id(deployment.monitored_url_id)
        .await
        .unwrap()
        .unwrap();
    assert!(url.last_checked_at.is_some());
}

/// 任务失败记入部署错误计数，周期本身不报错
#[tokio::test]
async fn test_failed_task_records_error() {
    let repos = Repos::setup().await;
    let deployment = repos
        .seed_deployment("acme", "app", "https://x.com/acme/status/1")
        .await;
    let chat = Arc::new(ScriptedChatAgent::default());
    chat.fail_next("model unavailable");
    let orchestrator = orchestrator(&repos, chat, Arc::new(ScriptedDeveloperAgent::new(false)));

    let report = orchestrator.run_cycle().await.unwrap();
    assert!(!report.success);
    assert!(report.error.unwrap().contains("model unavailable"));

    let stored = repos
        .deployments
        .find_by_id(deployment.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.error_count, 1);
    assert_eq!(stored.run_count, 0);
    assert_eq!(orchestrator.status().failed, 1);
}

#[tokio::test]
async fn test_empty_queue_is_a_no_op() {
    let repos = Repos::setup().await;
    let chat = Arc::new(ScriptedChatAgent::default());
    let orchestrator = orchestrator(&repos, chat.clone(), Arc::new(ScriptedDeveloperAgent::new(false)));

    let report = orchestrator.run_cycle().await.unwrap();
    assert!(report.task.is_none());
    assert_eq!(report.queue_length, 0);
    assert!(chat.calls().is_empty());
}

/// 周期中推进功能流水线并把进度转发给开发者代理
#[tokio::test]
async fn test_cycle_advances_pipeline_and_relays_progress() {
    let repos = Repos::setup().await;
    repos
        .seed_deployment("acme", "app", "https://x.com/acme/status/1")
        .await;
    let feature = repos
        .features
        .create(&FeatureRequest::new("dark mode", "acme", "dark theme"))
        .await
        .unwrap();

    let developer = Arc::new(ScriptedDeveloperAgent::new(true));
    developer.reply_with(Ok(
        "Implemented successfully: https://github.com/acme/app/pull/7".to_string(),
    ));
    let orchestrator = orchestrator(&repos, Arc::new(ScriptedChatAgent::default()), developer.clone());

    let report = orchestrator.run_cycle().await.unwrap();
    let pipeline = report.pipeline.unwrap();
    assert_eq!(pipeline.dispatched, 1);
    assert_eq!(pipeline.shipped, 1);

    let stored = repos.features.find_by_id(feature.id).await.unwrap().unwrap();
    assert_eq!(stored.status, FeatureStatus::Shipped);
    assert_eq!(stored.pr_number, Some(7));

    let requests = developer.requests.lock().clone();
    assert_eq!(requests[0].repository.as_deref(), Some("acme/app"));
    assert_eq!(developer.notifications.lock().len(), 1);

    let logs = repos.logs.list_by_feature(feature.id).await.unwrap();
    assert!(logs.iter().any(|l| l.event_type == AgentLogEvent::Request));
    assert!(logs.iter().any(|l| l.event_type == AgentLogEvent::Response));
}

#[tokio::test]
async fn test_interval_below_minimum_is_rejected() {
    let repos = Repos::setup().await;
    let orchestrator = orchestrator(
        &repos,
        Arc::new(ScriptedChatAgent::default()),
        Arc::new(ScriptedDeveloperAgent::new(false)),
    );

    let err = orchestrator.set_interval(5).unwrap_err();
    assert!(matches!(err, OrchestratorError::InvalidConfig(_)));
    orchestrator.set_interval(30).unwrap();
    assert_eq!(orchestrator.interval_secs(), 30);
}

/// 启动后立即执行首个周期，停止后不再运行
#[tokio::test]
async fn test_start_and_stop_loop() {
    let repos = Repos::setup().await;
    repos.seed_url("https://x.com/acme/status/1").await;
    let chat = Arc::new(ScriptedChatAgent::default());
    let orchestrator = orchestrator(&repos, chat.clone(), Arc::new(ScriptedDeveloperAgent::new(false)));

    assert!(orchestrator.start());
    assert!(!orchestrator.start());

    for _ in 0..50 {
        if !chat.calls().is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(chat.calls().len(), 1);
    assert!(orchestrator.status().running);

    assert!(orchestrator.stop());
    assert!(!orchestrator.stop());
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!orchestrator.status().running);
}
