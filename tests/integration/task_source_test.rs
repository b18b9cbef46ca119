// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::Repos;
use shipwright::domain::models::orchestration_task::TaskKind;
use shipwright::queue::task_queue::TaskQueue;
use shipwright::queue::task_source::TaskSource;

fn source(repos: &Repos) -> TaskSource {
    TaskSource::new(
        repos.urls.clone(),
        repos.deployments.clone(),
        repos.repos.clone(),
    )
}

/// 部署任务在前，未被部署覆盖的 URL 生成监控任务
#[tokio::test]
async fn test_deployments_first_then_uncovered_urls() {
    let repos = Repos::setup().await;
    let deployment = repos
        .seed_deployment("acme", "app", "https://x.com/acme/status/1")
        .await;
    let monitor = repos.seed_url("https://x.com/globex/status/2").await;

    let tasks = source(&repos).load_tasks().await.unwrap();
    assert_eq!(tasks.len(), 2);

    assert_eq!(tasks[0].kind, TaskKind::Deployment);
    assert_eq!(tasks[0].id, deployment.id);
    assert_eq!(tasks[0].repository.as_deref(), Some("acme/app"));
    assert_eq!(tasks[0].target_account.as_deref(), Some("acme"));

    assert_eq!(tasks[1].kind, TaskKind::Monitor);
    assert_eq!(tasks[1].id, monitor.id);
    assert_eq!(tasks[1].target_account.as_deref(), Some("globex"));
    assert!(tasks[1].repository.is_none());
}

/// 重复加载不会产生重复任务
#[tokio::test]
async fn test_reload_is_idempotent() {
    let repos = Repos::setup().await;
    repos
        .seed_deployment("acme", "app", "https://x.com/acme/status/1")
        .await;
    repos.seed_url("https://x.com/globex/status/2").await;

    let source = source(&repos);
    let queue = TaskQueue::new();
    let first = queue.reload(source.load_tasks().await.unwrap());
    let second = queue.reload(source.load_tasks().await.unwrap());
    assert_eq!(first, 2);
    assert_eq!(second, 2);

    let ids: Vec<_> = queue.snapshot().into_iter().map(|t| t.id).collect();
    let mut unique = ids.clone();
    unique.dedup();
    assert_eq!(ids, unique);
}

#[tokio::test]
async fn test_empty_database_yields_no_tasks() {
    let repos = Repos::setup().await;
    assert!(source(&repos).load_tasks().await.unwrap().is_empty());
}
