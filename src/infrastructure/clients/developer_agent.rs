// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use dashmap::DashMap;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::settings::DeveloperAgentSettings;
use crate::utils::errors::ClientError;

/// 加入频道的消息类型码
pub const ROOM_JOINING: u8 = 1;
/// 发送消息的消息类型码
pub const SEND_MESSAGE: u8 = 2;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;
type PendingMap = DashMap<String, PendingReply>;

/// 等待中的请求，记录注册时所在的连接代次
struct PendingReply {
    generation: u64,
    tx: oneshot::Sender<AgentResponse>,
}

/// 发给开发者代理的实现请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImplementationRequest {
    pub feature_id: Uuid,
    pub feature_name: String,
    pub description: String,
    pub target_account: String,
    /// owner/name
    pub repository: Option<String>,
}

impl ImplementationRequest {
    /// 渲染为发送给代理的自然语言消息
    pub fn to_message(&self) -> String {
        let mut message = format!(
            "Please implement the feature \"{}\" requested by the @{} community.",
            self.feature_name, self.target_account
        );
        if let Some(repo) = &self.repository {
            message.push_str(&format!(" Target repository: {}.", repo));
        }
        if !self.description.trim().is_empty() {
            message.push_str(&format!(" Details: {}", self.description.trim()));
        }
        message.push_str(" Open a pull request when done and reply with its URL.");
        message
    }
}

/// 开发者代理的应答
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentResponse {
    pub request_id: String,
    pub text: String,
    /// 原始帧
    pub raw: Value,
}

/// 开发者代理接口
#[async_trait]
pub trait DeveloperAgent: Send + Sync {
    /// 发送实现请求并等待关联应答
    async fn request_implementation(
        &self,
        request: &ImplementationRequest,
    ) -> Result<AgentResponse, ClientError>;

    /// 发送单向通知，不等待应答
    async fn notify(&self, text: &str) -> Result<(), ClientError>;

    fn is_enabled(&self) -> bool {
        true
    }
}

struct LinkState {
    channel_id: Option<String>,
    agent_id: Option<String>,
    sink: Option<WsSink>,
    reader: Option<JoinHandle<()>>,
    /// 当前连接代次，每次重连加一
    generation: u64,
}

/// 开发者代理链路
///
/// REST 负责建频道和查找代理，WebSocket 负责收发消息。
/// 每个请求带一个 requestId，后台读取任务按 requestId 把应答路由回等待方。
/// 连接断开后所有等待中的请求立即失败，下一次调用时重新连接。
pub struct DeveloperAgentLink {
    settings: DeveloperAgentSettings,
    http: reqwest::Client,
    state: Mutex<LinkState>,
    pending: Arc<PendingMap>,
    /// 存活连接的代次，0 表示未连接
    live_generation: Arc<AtomicU64>,
}

impl DeveloperAgentLink {
    pub fn new(settings: DeveloperAgentSettings) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            settings,
            http,
            state: Mutex::new(LinkState {
                channel_id: None,
                agent_id: None,
                sink: None,
                reader: None,
                generation: 0,
            }),
            pending: Arc::new(DashMap::new()),
            live_generation: Arc::new(AtomicU64::new(0)),
        })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.settings.api_base_url.trim_end_matches('/'), path)
    }

    async fn read_json(response: reqwest::Response) -> Result<Value, ClientError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Http {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json::<Value>().await?)
    }

    /// 按名称查找代理 ID
    async fn lookup_agent(&self) -> Result<String, ClientError> {
        let response = self.http.get(self.api_url("/api/agents")).send().await?;
        let body = Self::read_json(response).await?;
        find_agent_id(&body, &self.settings.agent_name).ok_or_else(|| {
            ClientError::Protocol(format!("agent '{}' not found", self.settings.agent_name))
        })
    }

    /// 创建通信频道
    async fn create_channel(&self, agent_id: &str) -> Result<String, ClientError> {
        let body = json!({
            "name": self.settings.channel_name,
            "server_id": self.settings.server_id,
            "participants": [self.settings.client_id, agent_id],
        });
        let response = self
            .http
            .post(self.api_url("/api/messaging/central-channels"))
            .json(&body)
            .send()
            .await?;
        let body = Self::read_json(response).await?;
        body.pointer("/data/id")
            .or_else(|| body.get("id"))
            .and_then(value_as_string)
            .ok_or_else(|| ClientError::Protocol("channel id missing from response".to_string()))
    }

    /// 确保链路可用，返回 (频道ID, 代理ID)
    async fn ensure_connected(&self, state: &mut LinkState) -> Result<(String, String), ClientError> {
        let agent_id = match &state.agent_id {
            Some(id) => id.clone(),
            None => {
                let id = self.lookup_agent().await?;
                state.agent_id = Some(id.clone());
                id
            }
        };
        let channel_id = match &state.channel_id {
            Some(id) => id.clone(),
            None => {
                let id = self.create_channel(&agent_id).await?;
                info!(channel_id = %id, "Created developer agent channel");
                state.channel_id = Some(id.clone());
                id
            }
        };

        if state.sink.is_some()
            && self.live_generation.load(Ordering::SeqCst) == state.generation
        {
            return Ok((channel_id, agent_id));
        }

        if let Some(reader) = state.reader.take() {
            reader.abort();
            fail_generation(&self.pending, state.generation);
        }

        let (stream, _) = connect_async(self.settings.ws_url.as_str())
            .await
            .map_err(|e| ClientError::Socket(e.to_string()))?;
        let (mut sink, stream) = stream.split();

        let join = json!({
            "type": ROOM_JOINING,
            "payload": {
                "roomId": channel_id,
                "channelId": channel_id,
                "entityId": self.settings.client_id,
                "agentId": agent_id,
            }
        });
        sink.send(Message::Text(join.to_string().into()))
            .await
            .map_err(|e| ClientError::Socket(e.to_string()))?;

        state.generation += 1;
        self.live_generation.store(state.generation, Ordering::SeqCst);
        state.reader = Some(tokio::spawn(read_loop(
            stream,
            self.pending.clone(),
            self.live_generation.clone(),
            state.generation,
            self.settings.client_id.clone(),
        )));
        state.sink = Some(sink);
        info!(ws_url = %self.settings.ws_url, "Developer agent link connected");

        Ok((channel_id, agent_id))
    }

    /// 发送一条消息；`reply_to` 在连接确定后、发送前登记到当前代次
    async fn send_message(
        &self,
        text: &str,
        request_id: &str,
        extra: Option<Value>,
        reply_to: Option<oneshot::Sender<AgentResponse>>,
    ) -> Result<(), ClientError> {
        if !self.settings.enabled {
            return Err(ClientError::NotConfigured("developer_agent.enabled".to_string()));
        }

        let mut state = self.state.lock().await;
        let (channel_id, agent_id) = self.ensure_connected(&mut state).await?;
        if let Some(tx) = reply_to {
            self.pending.insert(
                request_id.to_string(),
                PendingReply {
                    generation: state.generation,
                    tx,
                },
            );
        }

        let mut metadata = json!({
            "requestId": request_id,
            "targetAgentId": agent_id,
        });
        if let (Some(Value::Object(extra)), Some(map)) = (extra, metadata.as_object_mut()) {
            map.extend(extra);
        }

        let envelope = json!({
            "type": SEND_MESSAGE,
            "payload": {
                "channelId": channel_id,
                "senderId": self.settings.client_id,
                "senderName": self.settings.client_name,
                "message": text,
                "metadata": metadata,
            }
        });

        let sink = state
            .sink
            .as_mut()
            .ok_or_else(|| ClientError::Socket("not connected".to_string()))?;
        if let Err(e) = sink.send(Message::Text(envelope.to_string().into())).await {
            state.sink = None;
            self.live_generation.store(0, Ordering::SeqCst);
            return Err(ClientError::Socket(e.to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl DeveloperAgent for DeveloperAgentLink {
    async fn request_implementation(
        &self,
        request: &ImplementationRequest,
    ) -> Result<AgentResponse, ClientError> {
        let request_id = Uuid::new_v4().to_string();
        let (tx, rx) = oneshot::channel();

        let extra = json!({ "featureId": request.feature_id.to_string() });
        if let Err(e) = self
            .send_message(&request.to_message(), &request_id, Some(extra), Some(tx))
            .await
        {
            self.pending.remove(&request_id);
            metrics::counter!("developer_agent_requests_total", "outcome" => "send_error")
                .increment(1);
            return Err(e);
        }
        debug!(request_id = %request_id, feature = %request.feature_name, "Implementation request sent");

        let timeout_secs = self.settings.timeout_secs;
        match tokio::time::timeout(Duration::from_secs(timeout_secs), rx).await {
            Ok(Ok(response)) => {
                metrics::counter!("developer_agent_requests_total", "outcome" => "replied")
                    .increment(1);
                Ok(response)
            }
            Ok(Err(_)) => {
                metrics::counter!("developer_agent_requests_total", "outcome" => "closed")
                    .increment(1);
                Err(ClientError::Socket("connection closed before reply".to_string()))
            }
            Err(_) => {
                self.pending.remove(&request_id);
                metrics::counter!("developer_agent_requests_total", "outcome" => "timeout")
                    .increment(1);
                Err(ClientError::Timeout(timeout_secs))
            }
        }
    }

    async fn notify(&self, text: &str) -> Result<(), ClientError> {
        let request_id = Uuid::new_v4().to_string();
        self.send_message(text, &request_id, None, None).await
    }

    fn is_enabled(&self) -> bool {
        self.settings.enabled
    }
}

async fn read_loop(
    mut stream: SplitStream<WsStream>,
    pending: Arc<PendingMap>,
    live_generation: Arc<AtomicU64>,
    generation: u64,
    own_id: String,
) {
    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(text)) => {
                let Ok(value) = serde_json::from_str::<Value>(text.as_str()) else {
                    debug!("Ignoring non-JSON frame from developer agent");
                    continue;
                };
                if let Some((request_id, reply)) = extract_correlated_reply(&value, &own_id) {
                    match pending.remove(&request_id) {
                        Some((_, waiting)) => {
                            let _ = waiting.tx.send(AgentResponse {
                                request_id,
                                text: reply,
                                raw: value,
                            });
                        }
                        None => debug!(request_id = %request_id, "Reply for unknown request"),
                    }
                }
            }
            Ok(Message::Close(_)) => {
                warn!("Developer agent closed the connection");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                warn!("Developer agent socket error: {}", e);
                break;
            }
        }
    }

    let _ = live_generation.compare_exchange(generation, 0, Ordering::SeqCst, Ordering::SeqCst);
    fail_generation(&pending, generation);
}

/// 丢弃指定代次的发送端，等待方收到关闭错误；之后的连接上登记的请求不受影响
fn fail_generation(pending: &PendingMap, generation: u64) {
    pending.retain(|_, waiting| waiting.generation != generation);
}

fn value_as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// 在代理列表响应中按名称（忽略大小写）查找代理 ID
///
/// 接受 `{data: {agents: [...]}}`、`{agents: [...]}` 或直接数组
pub fn find_agent_id(body: &Value, name: &str) -> Option<String> {
    let agents = body
        .pointer("/data/agents")
        .or_else(|| body.get("agents"))
        .or_else(|| body.get("data"))
        .unwrap_or(body)
        .as_array()?;

    agents
        .iter()
        .find(|agent| {
            agent
                .get("name")
                .and_then(Value::as_str)
                .is_some_and(|n| n.eq_ignore_ascii_case(name))
        })
        .and_then(|agent| agent.get("id"))
        .and_then(value_as_string)
}

/// 从一帧中提取 (requestId, 文本)
///
/// 自己发出的帧以及缺少 requestId 或文本的帧返回 None
pub fn extract_correlated_reply(frame: &Value, own_id: &str) -> Option<(String, String)> {
    let payload = frame.get("payload").unwrap_or(frame);

    let sender = payload
        .get("senderId")
        .or_else(|| frame.get("senderId"))
        .and_then(Value::as_str);
    if sender == Some(own_id) {
        return None;
    }

    let request_id = payload
        .pointer("/metadata/requestId")
        .or_else(|| frame.pointer("/metadata/requestId"))
        .or_else(|| payload.get("inReplyTo"))
        .and_then(value_as_string)?;

    let text = ["text", "message", "content"]
        .iter()
        .find_map(|key| payload.get(*key).or_else(|| frame.get(*key)))
        .and_then(Value::as_str)?
        .to_string();

    Some((request_id, text))
}
