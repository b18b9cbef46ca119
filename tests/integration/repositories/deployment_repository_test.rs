// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::super::helpers::Repos;
use chrono::{Duration, FixedOffset, Utc};
use shipwright::domain::models::deployment::DeploymentStatus;
use shipwright::domain::models::monitored_url::MonitoredUrl;
use shipwright::utils::errors::RepositoryError;

#[tokio::test]
async fn test_record_success_and_failure() {
    let repos = Repos::setup().await;
    let deployment = repos
        .seed_deployment("acme", "app", "https://x.com/acme/status/1")
        .await;

    let next: chrono::DateTime<FixedOffset> = (Utc::now() + Duration::minutes(30)).into();
    repos
        .deployments
        .record_success(deployment.id, next)
        .await
        .unwrap();
    repos
        .deployments
        .record_failure(deployment.id, "timeout")
        .await
        .unwrap();

    let stored = repos
        .deployments
        .find_by_id(deployment.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.run_count, 1);
    assert_eq!(stored.error_count, 1);
    assert_eq!(stored.last_error.as_deref(), Some("timeout"));
    assert!(stored.last_run_at.is_some());
    assert!(stored.next_run_at.is_some());
}

#[tokio::test]
async fn test_list_active_excludes_paused() {
    let repos = Repos::setup().await;
    let first = repos
        .seed_deployment("acme", "app", "https://x.com/acme/status/1")
        .await;
    repos
        .seed_deployment("globex", "site", "https://x.com/globex/status/2")
        .await;

    repos
        .deployments
        .set_status(first.id, DeploymentStatus::Paused)
        .await
        .unwrap();

    let active = repos.deployments.list_active().await.unwrap();
    assert_eq!(active.len(), 1);
    assert_ne!(active[0].id, first.id);
    assert_eq!(repos.deployments.list_all().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_monitored_url_is_unique() {
    let repos = Repos::setup().await;
    repos.seed_url("https://x.com/acme/status/1").await;
    let err = repos
        .urls
        .create(&MonitoredUrl::new("https://x.com/acme/status/1".to_string(), 5))
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::AlreadyExists(_)));
}

#[tokio::test]
async fn test_update_missing_url_is_not_found() {
    let repos = Repos::setup().await;
    let err = repos
        .urls
        .update_frequency(uuid::Uuid::new_v4(), 10)
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound));
}
