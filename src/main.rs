// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use shipwright::config::settings::Settings;
use shipwright::domain::repositories::agent_log_repository::AgentLogRepository;
use shipwright::domain::repositories::chat_repository::ChatRepository;
use shipwright::domain::repositories::deployment_repository::DeploymentRepository;
use shipwright::domain::repositories::feature_request_repository::FeatureRequestRepository;
use shipwright::domain::repositories::github_repo_repository::GithubRepoRepository;
use shipwright::domain::repositories::monitored_url_repository::MonitoredUrlRepository;
use shipwright::domain::services::chat_agent::{ChatAgent, LlmChatAgent};
use shipwright::domain::services::chat_service::OrchestrationChatService;
use shipwright::domain::services::feature_pipeline::FeaturePipeline;
use shipwright::domain::services::feature_tracker::FeatureTracker;
use shipwright::domain::services::intent_classifier::KeywordIntentClassifier;
use shipwright::infrastructure::cache::session_store::SessionStore;
use shipwright::infrastructure::clients::developer_agent::{DeveloperAgent, DeveloperAgentLink};
use shipwright::infrastructure::clients::reply_client::ReplyClient;
use shipwright::infrastructure::database::connection;
use shipwright::infrastructure::repositories::agent_log_repo_impl::AgentLogRepositoryImpl;
use shipwright::infrastructure::repositories::chat_repo_impl::ChatRepositoryImpl;
use shipwright::infrastructure::repositories::deployment_repo_impl::DeploymentRepositoryImpl;
use shipwright::infrastructure::repositories::feature_request_repo_impl::FeatureRequestRepositoryImpl;
use shipwright::infrastructure::repositories::github_repo_repo_impl::GithubRepoRepositoryImpl;
use shipwright::infrastructure::repositories::monitored_url_repo_impl::MonitoredUrlRepositoryImpl;
use shipwright::presentation::routes::{self, ApiContext};
use shipwright::queue::scheduler::{Orchestrator, OrchestratorParts};
use shipwright::queue::task_source::TaskSource;
use shipwright::utils::telemetry;
use shipwright::workers::manager::WorkerManager;
use shipwright::workers::session_sweeper::SessionSweeper;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{error, info};

/// 主函数
///
/// 应用程序入口点，负责初始化所有组件并启动服务
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize logging
    telemetry::init_telemetry();
    info!("Starting shipwright...");

    // 2. Load configuration
    let settings = Arc::new(Settings::new()?);
    info!("Configuration loaded");

    if settings.metrics.enabled {
        shipwright::infrastructure::metrics::init_metrics(&settings.metrics.listen);
    }

    // 3. Connect to database and run migrations
    let db = Arc::new(connection::connect_and_migrate(&settings.database).await?);
    info!("Database connection established");

    // 4. Repositories
    let urls: Arc<dyn MonitoredUrlRepository> =
        Arc::new(MonitoredUrlRepositoryImpl::new(db.clone()));
    let repos: Arc<dyn GithubRepoRepository> = Arc::new(GithubRepoRepositoryImpl::new(db.clone()));
    let deployments: Arc<dyn DeploymentRepository> =
        Arc::new(DeploymentRepositoryImpl::new(db.clone()));
    let chats: Arc<dyn ChatRepository> = Arc::new(ChatRepositoryImpl::new(db.clone()));
    let logs: Arc<dyn AgentLogRepository> = Arc::new(AgentLogRepositoryImpl::new(db.clone()));
    let features: Arc<dyn FeatureRequestRepository> =
        Arc::new(FeatureRequestRepositoryImpl::new(db.clone()));

    // 5. Clients and services
    let sessions = Arc::new(SessionStore::from_settings(&settings.session));
    let replies = Arc::new(ReplyClient::new(&settings.twitter)?);
    let tracker = Arc::new(FeatureTracker::new(features.clone()));
    let chat_agent: Arc<dyn ChatAgent> = Arc::new(LlmChatAgent::new(
        settings.llm.clone(),
        sessions.clone(),
        replies,
        tracker,
    )?);
    let developer_agent: Arc<dyn DeveloperAgent> =
        Arc::new(DeveloperAgentLink::new(settings.developer_agent.clone())?);
    if !developer_agent.is_enabled() {
        info!("Developer agent disabled, feature pipeline will not dispatch");
    }

    let chat_service = Arc::new(OrchestrationChatService::new(
        Arc::new(KeywordIntentClassifier::new()),
        chats,
        urls.clone(),
        repos.clone(),
        deployments.clone(),
        features.clone(),
    ));

    let pipeline = FeaturePipeline::new(
        features.clone(),
        logs.clone(),
        deployments.clone(),
        repos.clone(),
        developer_agent.clone(),
        &settings.scheduler,
    );
    let orchestrator = Arc::new(Orchestrator::new(
        OrchestratorParts {
            source: TaskSource::new(urls.clone(), deployments.clone(), repos),
            pipeline,
            chat_agent: chat_agent.clone(),
            developer_agent,
            urls,
            deployments: deployments.clone(),
            logs: logs.clone(),
        },
        &settings.scheduler,
    ));

    // 6. Start Workers
    let mut worker_manager = WorkerManager::new();
    worker_manager.spawn(Arc::new(SessionSweeper::new(
        sessions.clone(),
        Duration::from_secs(settings.session.sweep_interval_secs),
    )));

    // 7. Scheduler
    if settings.scheduler.autostart {
        orchestrator.start();
    }

    // 8. Start HTTP server
    let app = routes::build_router(ApiContext {
        features,
        logs,
        deployments,
        sessions,
        chat_agent,
        chat_service,
        orchestrator: orchestrator.clone(),
    });

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    orchestrator.stop();
    worker_manager.shutdown(Duration::from_secs(5)).await;
    info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(err) => error!("Unable to listen for shutdown signal: {}", err),
    }
}
