// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::Repos;
use async_trait::async_trait;
use serde_json::json;
use shipwright::config::settings::{LlmSettings, Settings};
use shipwright::domain::services::chat_agent::{ChatAgent, LlmChatAgent};
use shipwright::domain::services::feature_tracker::FeatureTracker;
use shipwright::infrastructure::cache::session_store::SessionStore;
use shipwright::infrastructure::clients::reply_client::{ReplyFetcher, TweetReply};
use shipwright::utils::errors::ClientError;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct FixedReplies;

#[async_trait]
impl ReplyFetcher for FixedReplies {
    async fn fetch_replies(&self, _tweet_url: &str) -> Result<Vec<TweetReply>, ClientError> {
        Ok(vec![TweetReply {
            id: "1".to_string(),
            text: "please add dark mode".to_string(),
            author_handle: Some("fan".to_string()),
            author_name: None,
            created_at: None,
            like_count: 0,
        }])
    }
}

fn llm_settings(server: &MockServer) -> LlmSettings {
    let mut settings = Settings::from_defaults().unwrap().llm;
    settings.api_key = Some("sk-test".to_string());
    settings.api_base_url = server.uri();
    settings.max_tool_rounds = 2;
    settings
}

fn tool_call(id: &str, name: &str, arguments: serde_json::Value) -> serde_json::Value {
    json!({
        "choices": [{
            "message": {
                "role": "assistant",
                "content": null,
                "tool_calls": [{
                    "id": id,
                    "type": "function",
                    "function": { "name": name, "arguments": arguments.to_string() }
                }]
            }
        }]
    })
}

fn final_answer(text: &str) -> serde_json::Value {
    json!({ "choices": [{ "message": { "role": "assistant", "content": text } }] })
}

/// 工具调用结果回传给模型，最终回答写入会话
#[tokio::test]
async fn test_tool_calls_track_features_and_store_history() {
    let server = MockServer::start().await;
    let repos = Repos::setup().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("Authorization", "Bearer sk-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tool_call(
            "call-1",
            "get_tweet_replies",
            json!({ "tweet_url": "https://x.com/acme/status/1" }),
        )))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tool_call(
            "call-2",
            "track_feature_request",
            json!({ "name": "Dark Mode", "target_account": "@acme", "requester": "fan" }),
        )))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(final_answer("Tracked 1 request")))
        .mount(&server)
        .await;

    let sessions = Arc::new(SessionStore::new(10, Duration::from_secs(60), 20));
    let agent = LlmChatAgent::new(
        llm_settings(&server),
        sessions.clone(),
        Arc::new(FixedReplies),
        Arc::new(FeatureTracker::new(repos.features.clone())),
    )
    .unwrap();

    let reply = agent.send_message("s1", "check replies").await.unwrap();
    assert_eq!(reply.content, "Tracked 1 request");
    assert_eq!(reply.tool_calls_executed, 2);
    assert_eq!(reply.features_tracked, vec!["dark mode".to_string()]);

    let stored = repos
        .features
        .find_by_name_and_account("dark mode", "acme")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.requester.as_deref(), Some("fan"));
    assert_eq!(sessions.history("s1").len(), 2);
}

/// 失败的调用不写入会话
#[tokio::test]
async fn test_upstream_error_leaves_session_untouched() {
    let server = MockServer::start().await;
    let repos = Repos::setup().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let sessions = Arc::new(SessionStore::new(10, Duration::from_secs(60), 20));
    let agent = LlmChatAgent::new(
        llm_settings(&server),
        sessions.clone(),
        Arc::new(FixedReplies),
        Arc::new(FeatureTracker::new(repos.features.clone())),
    )
    .unwrap();

    let err = agent.send_message("s1", "hello").await.unwrap_err();
    assert!(matches!(err, ClientError::Http { status: 500, .. }));
    assert!(sessions.history("s1").is_empty());
}

#[tokio::test]
async fn test_missing_api_key_is_not_configured() {
    let server = MockServer::start().await;
    let repos = Repos::setup().await;
    let mut settings = llm_settings(&server);
    settings.api_key = None;

    let agent = LlmChatAgent::new(
        settings,
        Arc::new(SessionStore::new(10, Duration::from_secs(60), 20)),
        Arc::new(FixedReplies),
        Arc::new(FeatureTracker::new(repos.features.clone())),
    )
    .unwrap();
    let err = agent.send_message("s1", "hello").await.unwrap_err();
    assert!(matches!(err, ClientError::NotConfigured(_)));
}
