// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::Repos;
use shipwright::domain::models::feature_request::FeatureStatus;
use shipwright::domain::services::feature_pipeline::DEVELOPER_ASSIGNEE;
use shipwright::domain::services::feature_tracker::{FeatureMention, FeatureTracker};

fn mention(name: &str, account: &str) -> FeatureMention {
    FeatureMention {
        name: name.to_string(),
        target_account: account.to_string(),
        ..Default::default()
    }
}

/// 重复提及只累加计数并补全缺失字段，不重置状态
#[tokio::test]
async fn test_repeat_mention_keeps_status() {
    let repos = Repos::setup().await;
    let tracker = FeatureTracker::new(repos.features.clone());

    let mut feature = tracker.track(mention("Dark Mode", "@Acme")).await.unwrap();
    assert_eq!(feature.mention_count, 1);
    assert!(feature.requester.is_none());
    feature.start_implementation(DEVELOPER_ASSIGNEE).unwrap();
    repos.features.update(&feature).await.unwrap();

    let tracked = tracker
        .track(FeatureMention {
            description: Some("dark theme for the dashboard".to_string()),
            requester: Some("jane".to_string()),
            category: Some("ui".to_string()),
            ..mention("  dark   mode", "acme")
        })
        .await
        .unwrap();
    assert_eq!(tracked.id, feature.id);

    let stored = repos.features.find_by_id(feature.id).await.unwrap().unwrap();
    assert_eq!(stored.mention_count, 2);
    assert_eq!(stored.status, FeatureStatus::Pending);
    assert_eq!(stored.assigned_to.as_deref(), Some(DEVELOPER_ASSIGNEE));
    assert!(stored.implementation_started_at.is_some());
    assert_eq!(stored.description, "dark theme for the dashboard");
    assert_eq!(stored.requester.as_deref(), Some("jane"));
    assert_eq!(stored.category.as_deref(), Some("ui"));
}

#[tokio::test]
async fn test_existing_fields_are_not_overwritten() {
    let repos = Repos::setup().await;
    let tracker = FeatureTracker::new(repos.features.clone());

    tracker
        .track(FeatureMention {
            requester: Some("first".to_string()),
            description: Some("original".to_string()),
            ..mention("csv export", "acme")
        })
        .await
        .unwrap();
    let tracked = tracker
        .track(FeatureMention {
            requester: Some("second".to_string()),
            description: Some("replacement".to_string()),
            ..mention("CSV Export", "acme")
        })
        .await
        .unwrap();

    assert_eq!(tracked.mention_count, 2);
    assert_eq!(tracked.requester.as_deref(), Some("first"));
    assert_eq!(tracked.description, "original");
}

#[tokio::test]
async fn test_blank_name_is_rejected() {
    let repos = Repos::setup().await;
    let tracker = FeatureTracker::new(repos.features.clone());
    assert!(tracker.track(mention("   ", "acme")).await.is_err());
    assert!(repos.features.list_by_status(FeatureStatus::Requested, 10).await.unwrap().is_empty());
}
