// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{scheduler_settings, Repos, ScriptedChatAgent, ScriptedDeveloperAgent};
use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};
use shipwright::domain::services::chat_service::OrchestrationChatService;
use shipwright::domain::services::feature_pipeline::FeaturePipeline;
use shipwright::domain::services::intent_classifier::KeywordIntentClassifier;
use shipwright::infrastructure::cache::session_store::SessionStore;
use shipwright::presentation::routes::{build_router, ApiContext};
use shipwright::queue::scheduler::{Orchestrator, OrchestratorParts};
use shipwright::queue::task_source::TaskSource;
use std::sync::Arc;
use std::time::Duration;

struct TestApp {
    server: TestServer,
    repos: Repos,
    chat: Arc<ScriptedChatAgent>,
}

async fn create_test_app() -> TestApp {
    let repos = Repos::setup().await;
    let settings = scheduler_settings();
    let chat = Arc::new(ScriptedChatAgent::default());
    let developer = Arc::new(ScriptedDeveloperAgent::new(false));

    let pipeline = FeaturePipeline::new(
        repos.features.clone(),
        repos.logs.clone(),
        repos.deployments.clone(),
        repos.repos.clone(),
        developer.clone(),
        &settings,
    );
    let orchestrator = Arc::new(Orchestrator::new(
        OrchestratorParts {
            source: TaskSource::new(
                repos.urls.clone(),
                repos.deployments.clone(),
                repos.repos.clone(),
            ),
            pipeline,
            chat_agent: chat.clone(),
            developer_agent: developer,
            urls: repos.urls.clone(),
            deployments: repos.deployments.clone(),
            logs: repos.logs.clone(),
        },
        &settings,
    ));
    let chat_service = Arc::new(OrchestrationChatService::new(
        Arc::new(KeywordIntentClassifier::new()),
        repos.chats.clone(),
        repos.urls.clone(),
        repos.repos.clone(),
        repos.deployments.clone(),
        repos.features.clone(),
    ));

    let app = build_router(ApiContext {
        features: repos.features.clone(),
        logs: repos.logs.clone(),
        deployments: repos.deployments.clone(),
        sessions: Arc::new(SessionStore::new(10, Duration::from_secs(60), 20)),
        chat_agent: chat.clone(),
        chat_service,
        orchestrator,
    });

    TestApp {
        server: TestServer::new(app).unwrap(),
        repos,
        chat,
    }
}

#[tokio::test]
async fn test_health_and_version() {
    let app = create_test_app().await;
    let response = app.server.get("/health").await;
    response.assert_status_ok();
    response.assert_text("OK");

    app.server
        .get("/v1/version")
        .await
        .assert_text(env!("CARGO_PKG_VERSION"));
}

/// 重复创建返回 409，库中只有一条
#[tokio::test]
async fn test_create_feature_and_duplicate_conflict() {
    let app = create_test_app().await;
    let body = json!({ "name": "Dark Mode", "target_account": "@acme", "description": "dark theme" });

    let created = app.server.post("/v1/features").json(&body).await;
    created.assert_status(StatusCode::CREATED);
    let feature: Value = created.json();
    assert_eq!(feature["name"], "dark mode");
    assert_eq!(feature["status"], "requested");

    let duplicate = app.server.post("/v1/features").json(&body).await;
    duplicate.assert_status(StatusCode::CONFLICT);
    let error: Value = duplicate.json();
    assert_eq!(error["success"], false);

    let listing: Value = app.server.get("/v1/features").await.json();
    assert_eq!(listing["total"], 1);
}

#[tokio::test]
async fn test_create_feature_validation_error() {
    let app = create_test_app().await;
    let response = app
        .server
        .post("/v1/features")
        .json(&json!({ "name": "", "target_account": "acme" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert!(body["details"]["name"].is_array());
}

#[tokio::test]
async fn test_reject_reset_and_logs() {
    let app = create_test_app().await;
    let feature: Value = app
        .server
        .post("/v1/features")
        .json(&json!({ "name": "offline mode", "target_account": "acme" }))
        .await
        .json();
    let id = feature["id"].as_str().unwrap().to_string();

    let rejected: Value = app
        .server
        .post(&format!("/v1/features/{}/reject", id))
        .json(&json!({ "reason": "out of scope" }))
        .await
        .json();
    assert_eq!(rejected["status"], "rejected");

    // rejected 不能再次拒绝
    app.server
        .post(&format!("/v1/features/{}/reject", id))
        .await
        .assert_status(StatusCode::CONFLICT);

    let reset: Value = app
        .server
        .post(&format!("/v1/features/{}/reset", id))
        .await
        .json();
    assert_eq!(reset["status"], "requested");

    let logs: Value = app
        .server
        .get(&format!("/v1/features/{}/logs", id))
        .await
        .json();
    assert_eq!(logs.as_array().unwrap().len(), 2);

    let stats: Value = app.server.get("/v1/features/stats").await.json();
    assert_eq!(stats["total"], 1);
    assert_eq!(stats["by_status"]["requested"], 1);
    assert_eq!(stats["by_status"]["shipped"], 0);
}

#[tokio::test]
async fn test_update_and_delete_feature() {
    let app = create_test_app().await;
    let feature: Value = app
        .server
        .post("/v1/features")
        .json(&json!({ "name": "csv export", "target_account": "acme" }))
        .await
        .json();
    let path = format!("/v1/features/{}", feature["id"].as_str().unwrap());

    let updated: Value = app
        .server
        .put(&path)
        .json(&json!({ "priority": "high", "category": "data" }))
        .await
        .json();
    assert_eq!(updated["priority"], "high");
    assert_eq!(updated["category"], "data");

    app.server
        .delete(&path)
        .await
        .assert_status(StatusCode::NO_CONTENT);
    app.server.get(&path).await.assert_status_not_found();
}

#[tokio::test]
async fn test_unknown_feature_is_not_found() {
    let app = create_test_app().await;
    app.server
        .get(&format!("/v1/features/{}", uuid::Uuid::new_v4()))
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_chat_endpoint_assigns_session() {
    let app = create_test_app().await;
    let body: Value = app
        .server
        .post("/v1/chat")
        .json(&json!({ "message": "check the replies" }))
        .await
        .json();
    assert_eq!(body["success"], true);
    let session_id = body["session_id"].as_str().unwrap();
    assert!(!session_id.is_empty());
    assert_eq!(app.chat.calls()[0].0, session_id);

    app.server
        .post("/v1/chat")
        .json(&json!({ "message": "   " }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

/// 快速部署后任务出现在队列中，手动触发执行一个周期
#[tokio::test]
async fn test_quick_deploy_then_trigger_cycle() {
    let app = create_test_app().await;

    let created = app
        .server
        .post("/v1/quick-deploy")
        .json(&json!({
            "github_repo": "https://github.com/acme/app",
            "url": "https://x.com/acme/status/1",
            "interval_minutes": 45
        }))
        .await;
    created.assert_status(StatusCode::CREATED);

    app.server
        .post("/v1/quick-deploy")
        .json(&json!({ "github_repo": "acme/app", "url": "https://x.com/acme/status/1" }))
        .await
        .assert_status_ok();

    let deployments: Value = app.server.get("/v1/deployments").await.json();
    assert_eq!(deployments.as_array().unwrap().len(), 1);

    let refreshed: Value = app.server.post("/v1/orchestration/refresh").await.json();
    assert_eq!(refreshed["queue_length"], 1);

    let tasks: Value = app.server.get("/v1/orchestration/tasks").await.json();
    assert_eq!(tasks[0]["repository"], "acme/app");

    let report: Value = app.server.post("/v1/orchestration/trigger").await.json();
    assert_eq!(report["success"], true);
    assert_eq!(report["task"]["kind"], "deployment");

    let status: Value = app.server.get("/v1/orchestration/status").await.json();
    assert_eq!(status["cycles"], 1);
    assert_eq!(status["running"], false);

    let stored = app.repos.deployments.list_all().await.unwrap();
    assert_eq!(stored[0].run_count, 1);
}

#[tokio::test]
async fn test_quick_deploy_rejects_bad_input() {
    let app = create_test_app().await;
    app.server
        .post("/v1/quick-deploy")
        .json(&json!({ "github_repo": "not a repo", "url": "https://x.com/acme/status/1" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    app.server
        .post("/v1/quick-deploy")
        .json(&json!({ "github_repo": "acme/app", "url": "not-a-url" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_orchestration_config() {
    let app = create_test_app().await;
    let config: Value = app.server.get("/v1/orchestration/config").await.json();
    assert_eq!(config["interval_secs"], 120);

    app.server
        .put("/v1/orchestration/config")
        .json(&json!({ "interval_secs": 5 }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let updated: Value = app
        .server
        .put("/v1/orchestration/config")
        .json(&json!({ "interval_secs": 300 }))
        .await
        .json();
    assert_eq!(updated["interval_secs"], 300);
}

#[tokio::test]
async fn test_start_stop_endpoints() {
    let app = create_test_app().await;
    let started: Value = app.server.post("/v1/orchestration/start").await.json();
    assert_eq!(started["started"], true);
    let again: Value = app.server.post("/v1/orchestration/start").await.json();
    assert_eq!(again["started"], false);

    let stopped: Value = app.server.post("/v1/orchestration/stop").await.json();
    assert_eq!(stopped["stopped"], true);
    assert_eq!(stopped["status"]["running"], false);
}

#[tokio::test]
async fn test_orchestration_chat_and_transcript() {
    let app = create_test_app().await;
    let response: Value = app
        .server
        .post("/v1/orchestration/chat")
        .json(&json!({ "session_id": "ops", "message": "feature \"dark mode\" for @acme" }))
        .await
        .json();
    assert_eq!(response["intent"], "feature");

    let transcript: Value = app.server.get("/v1/orchestration/chat/ops").await.json();
    assert_eq!(transcript.as_array().unwrap().len(), 2);
    assert_eq!(transcript[0]["role"], "user");
}
