// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use shipwright::config::settings::{DeveloperAgentSettings, Settings};
use shipwright::infrastructure::clients::developer_agent::{
    DeveloperAgent, DeveloperAgentLink, ImplementationRequest, ROOM_JOINING, SEND_MESSAGE,
};
use shipwright::utils::errors::ClientError;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use uuid::Uuid;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Clone, Copy)]
enum Behaviour {
    /// 先回显本端消息，再发送关联应答
    Reply,
    /// 收到请求后关闭连接
    Close,
    /// 从不应答
    Silent,
}

/// 本地 WebSocket 代理，返回 (地址, 收到的帧)
async fn spawn_socket(behaviour: Behaviour) -> (String, JoinHandle<Vec<Value>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        let mut frames = Vec::new();

        while let Some(Ok(message)) = ws.next().await {
            let Message::Text(text) = message else {
                continue;
            };
            let frame: Value = serde_json::from_str(text.as_str()).unwrap();
            let is_request = frame["type"] == json!(SEND_MESSAGE);
            frames.push(frame.clone());
            if !is_request {
                continue;
            }

            match behaviour {
                Behaviour::Reply => {
                    ws.send(Message::Text(frame.to_string().into())).await.unwrap();
                    let reply = json!({
                        "type": SEND_MESSAGE,
                        "payload": {
                            "senderId": "agent-1",
                            "text": "PR created: https://github.com/acme/app/pull/9",
                            "metadata": { "requestId": frame["payload"]["metadata"]["requestId"] }
                        }
                    });
                    ws.send(Message::Text(reply.to_string().into())).await.unwrap();
                    break;
                }
                Behaviour::Close => {
                    let _ = ws.close(None).await;
                    break;
                }
                Behaviour::Silent => {}
            }
        }
        frames
    });

    (format!("ws://{}", addr), handle)
}

async fn mock_rest() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/agents"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "agents": [
                { "id": "agent-0", "name": "reviewer" },
                { "id": "agent-1", "name": "Developer" }
            ]}
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/messaging/central-channels"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "data": { "id": "channel-42" }
        })))
        .expect(1)
        .mount(&server)
        .await;
    server
}

fn settings(rest: &MockServer, ws_url: String, timeout_secs: u64) -> DeveloperAgentSettings {
    let mut settings = Settings::from_defaults().unwrap().developer_agent;
    settings.enabled = true;
    settings.api_base_url = rest.uri();
    settings.ws_url = ws_url;
    settings.timeout_secs = timeout_secs;
    settings
}

fn request() -> ImplementationRequest {
    ImplementationRequest {
        feature_id: Uuid::new_v4(),
        feature_name: "dark mode".to_string(),
        description: "dark theme".to_string(),
        target_account: "acme".to_string(),
        repository: Some("acme/app".to_string()),
    }
}

/// 加入频道后发送请求，本端回显被忽略，按 requestId 收到应答
#[tokio::test]
async fn test_request_implementation_round_trip() {
    let rest = mock_rest().await;
    let (ws_url, server) = spawn_socket(Behaviour::Reply).await;
    let link = DeveloperAgentLink::new(settings(&rest, ws_url, 5)).unwrap();

    let response = link.request_implementation(&request()).await.unwrap();
    assert_eq!(response.text, "PR created: https://github.com/acme/app/pull/9");

    let frames = server.await.unwrap();
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0]["type"], json!(ROOM_JOINING));
    assert_eq!(frames[0]["payload"]["channelId"], "channel-42");
    assert_eq!(frames[0]["payload"]["agentId"], "agent-1");

    let payload = &frames[1]["payload"];
    assert_eq!(payload["channelId"], "channel-42");
    assert_eq!(payload["metadata"]["targetAgentId"], "agent-1");
    assert_eq!(payload["metadata"]["requestId"], json!(response.request_id));
    assert!(payload["message"].as_str().unwrap().contains("acme/app"));
}

/// 连接关闭时等待中的请求立即失败
#[tokio::test]
async fn test_closed_connection_fails_pending_request() {
    let rest = mock_rest().await;
    let (ws_url, _server) = spawn_socket(Behaviour::Close).await;
    let link = DeveloperAgentLink::new(settings(&rest, ws_url, 30)).unwrap();

    let err = link.request_implementation(&request()).await.unwrap_err();
    assert!(matches!(err, ClientError::Socket(_)));
}

#[tokio::test]
async fn test_silent_agent_times_out() {
    let rest = mock_rest().await;
    let (ws_url, _server) = spawn_socket(Behaviour::Silent).await;
    let link = DeveloperAgentLink::new(settings(&rest, ws_url, 1)).unwrap();

    let err = link.request_implementation(&request()).await.unwrap_err();
    assert!(matches!(err, ClientError::Timeout(1)));
}

#[tokio::test]
async fn test_disabled_link_is_not_configured() {
    let rest = MockServer::start().await;
    let mut settings = settings(&rest, "ws://127.0.0.1:9".to_string(), 1);
    settings.enabled = false;
    let link = DeveloperAgentLink::new(settings).unwrap();

    assert!(!link.is_enabled());
    let err = link.notify("hello").await.unwrap_err();
    assert!(matches!(err, ClientError::NotConfigured(_)));
}
