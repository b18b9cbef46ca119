// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::super::helpers::{setup_db, Repos};
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use shipwright::infrastructure::database::entities::feature_request as feature_entity;
use shipwright::domain::models::feature_request::{FeatureRequest, FeatureStatus};
use shipwright::domain::repositories::feature_request_repository::FeatureQueryParams;
use shipwright::utils::errors::RepositoryError;

/// 同名同账号只能存在一条记录，重复创建不会覆盖已有记录
#[tokio::test]
async fn test_duplicate_name_and_account_is_rejected() {
    let repos = Repos::setup().await;

    let first = repos
        .features
        .create(&FeatureRequest::new("Dark Mode", "@acme", "first"))
        .await
        .unwrap();

    let err = repos
        .features
        .create(&FeatureRequest::new("dark  mode", "ACME", "second"))
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::AlreadyExists(_)));

    let stored = repos
        .features
        .find_by_name_and_account("dark mode", "acme")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.id, first.id);
    assert_eq!(stored.description, "first");
}

/// 同名不同账号是不同的请求
#[tokio::test]
async fn test_same_name_for_other_account_is_allowed() {
    let repos = Repos::setup().await;
    repos
        .features
        .create(&FeatureRequest::new("dark mode", "acme", ""))
        .await
        .unwrap();
    repos
        .features
        .create(&FeatureRequest::new("dark mode", "globex", ""))
        .await
        .unwrap();

    let (all, total) = repos
        .features
        .list(FeatureQueryParams {
            limit: 10,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(total, 2);
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn test_update_persists_lifecycle_fields() {
    let repos = Repos::setup().await;
    let mut feature = repos
        .features
        .create(&FeatureRequest::new("export csv", "acme", "export data"))
        .await
        .unwrap();

    feature.start_implementation("developer-agent").unwrap();
    repos.features.update(&feature).await.unwrap();

    let stored = repos.features.find_by_id(feature.id).await.unwrap().unwrap();
    assert_eq!(stored.status, FeatureStatus::Pending);
    assert_eq!(stored.assigned_to.as_deref(), Some("developer-agent"));
    assert!(stored.implementation_started_at.is_some());
}

#[tokio::test]
async fn test_list_filters_and_counts() {
    let repos = Repos::setup().await;
    for name in ["a", "b", "c"] {
        repos
            .features
            .create(&FeatureRequest::new(name, "acme", ""))
            .await
            .unwrap();
    }
    let mut rejected = repos
        .features
        .create(&FeatureRequest::new("d", "globex", ""))
        .await
        .unwrap();
    rejected.reject(None).unwrap();
    repos.features.update(&rejected).await.unwrap();

    let (page, total) = repos
        .features
        .list(FeatureQueryParams {
            target_account: Some("acme".to_string()),
            limit: 2,
            offset: 0,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(total, 3);
    assert_eq!(page.len(), 2);

    let counts = repos.features.count_by_status().await.unwrap();
    assert_eq!(counts.get(&FeatureStatus::Requested), Some(&3));
    assert_eq!(counts.get(&FeatureStatus::Rejected), Some(&1));

    let requested = repos
        .features
        .list_by_status(FeatureStatus::Requested, 10)
        .await
        .unwrap();
    assert_eq!(requested.len(), 3);
}

#[tokio::test]
async fn test_delete_missing_is_not_found() {
    let repos = Repos::setup().await;
    let err = repos.features.delete(uuid::Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound));
}

/// 库中未知状态读出为 rejected，不会再进入 requested 队列
#[tokio::test]
async fn test_unknown_status_reads_as_rejected() {
    let db = setup_db().await;
    let repos = Repos::new(db.clone());
    let feature = repos
        .features
        .create(&FeatureRequest::new("legacy", "acme", ""))
        .await
        .unwrap();

    feature_entity::Entity::update_many()
        .col_expr(feature_entity::Column::Status, Expr::value("archived"))
        .filter(feature_entity::Column::Id.eq(feature.id))
        .exec(db.as_ref())
        .await
        .unwrap();

    let stored = repos.features.find_by_id(feature.id).await.unwrap().unwrap();
    assert_eq!(stored.status, FeatureStatus::Rejected);
    assert!(repos
        .features
        .list_by_status(FeatureStatus::Requested, 10)
        .await
        .unwrap()
        .is_empty());
}
