// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    routing::{delete, get, post},
    Extension, Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::domain::repositories::agent_log_repository::AgentLogRepository;
use crate::domain::repositories::deployment_repository::DeploymentRepository;
use crate::domain::repositories::feature_request_repository::FeatureRequestRepository;
use crate::domain::services::chat_agent::ChatAgent;
use crate::domain::services::chat_service::OrchestrationChatService;
use crate::infrastructure::cache::session_store::SessionStore;
use crate::presentation::handlers::{
    chat_handler, deployment_handler, feature_handler, orchestration_handler,
};
use crate::queue::scheduler::Orchestrator;

/// 路由依赖
///
/// 每个字段作为一个 `Extension` 层注入
#[derive(Clone)]
pub struct ApiContext {
    pub features: Arc<dyn FeatureRequestRepository>,
    pub logs: Arc<dyn AgentLogRepository>,
    pub deployments: Arc<dyn DeploymentRepository>,
    pub sessions: Arc<SessionStore>,
    pub chat_agent: Arc<dyn ChatAgent>,
    pub chat_service: Arc<OrchestrationChatService>,
    pub orchestrator: Arc<Orchestrator>,
}

/// 创建应用路由
///
/// # 返回值
///
/// 返回配置好的路由
pub fn build_router(ctx: ApiContext) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health_check))
        .route("/v1/version", get(version));

    let chat_routes = Router::new()
        .route("/v1/chat", post(chat_handler::chat))
        .route("/v1/chat/{session_id}/history", get(chat_handler::history))
        .route(
            "/v1/chat/{session_id}",
            delete(chat_handler::clear),
        );

    let feature_routes = Router::new()
        .route(
            "/v1/features",
            get(feature_handler::list_features).post(feature_handler::create_feature),
        )
        .route("/v1/features/stats", get(feature_handler::feature_stats))
        .route(
            "/v1/features/{id}",
            get(feature_handler::get_feature)
                .put(feature_handler::update_feature)
                .delete(feature_handler::delete_feature),
        )
        .route(
            "/v1/features/{id}/reject",
            post(feature_handler::reject_feature),
        )
        .route("/v1/features/{id}/reset", post(feature_handler::reset_feature))
        .route("/v1/features/{id}/logs", get(feature_handler::feature_logs));

    let orchestration_routes = Router::new()
        .route("/v1/orchestration/start", post(orchestration_handler::start))
        .route("/v1/orchestration/stop", post(orchestration_handler::stop))
        .route("/v1/orchestration/status", get(orchestration_handler::status))
        .route("/v1/orchestration/tasks", get(orchestration_handler::tasks))
        .route(
            "/v1/orchestration/config",
            get(orchestration_handler::get_config).put(orchestration_handler::update_config),
        )
        .route(
            "/v1/orchestration/trigger",
            post(orchestration_handler::trigger),
        )
        .route(
            "/v1/orchestration/refresh",
            post(orchestration_handler::refresh),
        )
        .route("/v1/orchestration/chat", post(orchestration_handler::chat))
        .route(
            "/v1/orchestration/chat/{session_id}",
            get(orchestration_handler::transcript),
        );

    let deployment_routes = Router::new()
        .route("/v1/quick-deploy", post(deployment_handler::quick_deploy))
        .route("/v1/deployments", get(deployment_handler::list_deployments));

    Router::new()
        .merge(public_routes)
        .merge(chat_routes)
        .merge(feature_routes)
        .merge(orchestration_routes)
        .merge(deployment_routes)
        .layer(Extension(ctx.features))
        .layer(Extension(ctx.logs))
        .layer(Extension(ctx.deployments))
        .layer(Extension(ctx.sessions))
        .layer(Extension(ctx.chat_agent))
        .layer(Extension(ctx.chat_service))
        .layer(Extension(ctx.orchestrator))
        .layer(TraceLayer::new_for_http())
}

/// 健康检查端点
///
/// # 返回值
///
/// 返回"OK"字符串
pub async fn health_check() -> &'static str {
    "OK"
}

/// 版本信息端点
///
/// # 返回值
///
/// 返回应用版本号
pub async fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
