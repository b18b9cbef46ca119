// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::settings::LlmSettings;
use crate::domain::models::chat_message::ChatRole;
use crate::domain::services::feature_tracker::{FeatureMention, FeatureTracker};
use crate::infrastructure::cache::session_store::{SessionMessage, SessionStore};
use crate::infrastructure::clients::reply_client::ReplyFetcher;
use crate::utils::errors::ClientError;

const SYSTEM_PROMPT: &str = "You are the orchestration assistant for a product team. \
You watch social media posts about the team's products and turn the feature requests \
people make in the replies into tracked work items. Use get_tweet_replies to read the \
replies of a post, then call track_feature_request once for every distinct feature \
request you find. Use short, lowercase feature names such as \"dark mode\". Ignore \
replies that are not feature requests. Finish with a short summary of what you tracked.";

/// 聊天代理的回复
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentReply {
    pub content: String,
    pub tool_calls_executed: usize,
    /// 本轮跟踪的功能名称
    pub features_tracked: Vec<String>,
}

/// 聊天代理接口
#[async_trait]
pub trait ChatAgent: Send + Sync {
    async fn send_message(&self, session_id: &str, message: &str)
        -> Result<AgentReply, ClientError>;
}

#[derive(Debug, Deserialize)]
struct ToolCall {
    id: String,
    function: ToolFunction,
}

#[derive(Debug, Deserialize)]
struct ToolFunction {
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct GetRepliesArgs {
    tweet_url: String,
}

/// 基于 OpenAI 兼容接口的聊天代理
///
/// 支持两个工具：`get_tweet_replies` 和 `track_feature_request`，
/// 每条消息最多执行 `max_tool_rounds` 轮工具调用。
pub struct LlmChatAgent {
    http: reqwest::Client,
    settings: LlmSettings,
    sessions: Arc<SessionStore>,
    replies: Arc<dyn ReplyFetcher>,
    tracker: Arc<FeatureTracker>,
}

impl LlmChatAgent {
    pub fn new(
        settings: LlmSettings,
        sessions: Arc<SessionStore>,
        replies: Arc<dyn ReplyFetcher>,
        tracker: Arc<FeatureTracker>,
    ) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            settings,
            sessions,
            replies,
            tracker,
        })
    }

    fn tool_definitions() -> Value {
        json!([
            {
                "type": "function",
                "function": {
                    "name": "get_tweet_replies",
                    "description": "Fetch the replies to a tweet (twitter.com or x.com status URL).",
                    "parameters": {
                        "type": "object",
                        "properties": {
                            "tweet_url": { "type": "string", "description": "Full status URL" }
                        },
                        "required": ["tweet_url"]
                    }
                }
            },
            {
                "type": "function",
                "function": {
                    "name": "track_feature_request",
                    "description": "Record a feature request addressed to an account. Repeated requests are merged.",
                    "parameters": {
                        "type": "object",
                        "properties": {
                            "name": { "type": "string", "description": "Short feature name" },
                            "target_account": { "type": "string", "description": "Account the request is addressed to" },
                            "description": { "type": "string" },
                            "category": { "type": "string" },
                            "requester": { "type": "string", "description": "Handle of the person asking" },
                            "source_tweet_url": { "type": "string" },
                            "priority": { "type": "string", "enum": ["low", "medium", "high", "critical"] }
                        },
                        "required": ["name", "target_account"]
                    }
                }
            }
        ])
    }

    fn map_request_error(&self, err: reqwest::Error) -> ClientError {
        if err.is_timeout() {
            ClientError::Timeout(self.settings.timeout_secs)
        } else {
            ClientError::Request(err)
        }
    }

    async fn complete(
        &self,
        api_key: &str,
        messages: &[Value],
        allow_tools: bool,
    ) -> Result<Value, ClientError> {
        let mut body = json!({
            "model": self.settings.model,
            "messages": messages,
            "temperature": 0.2,
            "tools": Self::tool_definitions(),
        });
        if !allow_tools {
            body["tool_choice"] = json!("none");
        }

        let url = format!(
            "{}/chat/completions",
            self.settings.api_base_url.trim_end_matches('/')
        );
        let response = self
            .http
            .post(url)
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let body: Value = response.json().await.map_err(|e| self.map_request_error(e))?;
        body.pointer("/choices/0/message")
            .cloned()
            .ok_or_else(|| ClientError::Protocol("missing choices[0].message".to_string()))
    }

    async fn execute_tool(
        &self,
        call: &ToolCall,
        tracked: &mut Vec<String>,
    ) -> Result<Value, ClientError> {
        let arguments = if call.function.arguments.trim().is_empty() {
            "{}"
        } else {
            call.function.arguments.as_str()
        };

        match call.function.name.as_str() {
            "get_tweet_replies" => {
                let args: GetRepliesArgs = serde_json::from_str(arguments)
                    .map_err(|e| ClientError::Tool(format!("invalid arguments: {}", e)))?;
                let replies = self.replies.fetch_replies(&args.tweet_url).await?;
                Ok(json!({ "count": replies.len(), "replies": replies }))
            }
            "track_feature_request" => {
                let mention: FeatureMention = serde_json::from_str(arguments)
                    .map_err(|e| ClientError::Tool(format!("invalid arguments: {}", e)))?;
                let feature = self
                    .tracker
                    .track(mention)
                    .await
                    .map_err(|e| ClientError::Tool(e.to_string()))?;
                tracked.push(feature.name.clone());
                Ok(json!({
                    "id": feature.id,
                    "name": feature.name,
                    "target_account": feature.target_account,
                    "status": feature.status,
                    "mention_count": feature.mention_count,
                }))
            }
            other => Err(ClientError::Tool(format!("unknown tool: {}", other))),
        }
    }
}

fn role_name(role: ChatRole) -> &'static str {
    match role {
        ChatRole::User => "user",
        ChatRole::Assistant => "assistant",
        ChatRole::System => "system",
    }
}

#[async_trait]
impl ChatAgent for LlmChatAgent {
    async fn send_message(
        &self,
        session_id: &str,
        message: &str,
    ) -> Result<AgentReply, ClientError> {
        let api_key = self
            .settings
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| ClientError::NotConfigured("llm.api_key".to_string()))?;

        let mut messages = vec![json!({ "role": "system", "content": SYSTEM_PROMPT })];
        messages.extend(
            self.sessions
                .history(session_id)
                .into_iter()
                .map(|m| json!({ "role": role_name(m.role), "content": m.content })),
        );
        messages.push(json!({ "role": "user", "content": message }));

        let mut reply = AgentReply::default();
        let max_rounds = self.settings.max_tool_rounds;

        for round in 0..=max_rounds {
            let assistant = self.complete(api_key, &messages, round < max_rounds).await?;
            let calls: Vec<ToolCall> = assistant
                .get("tool_calls")
                .filter(|v| !v.is_null())
                .cloned()
                .map(serde_json::from_value)
                .transpose()
                .map_err(|e| ClientError::Protocol(format!("malformed tool_calls: {}", e)))?
                .unwrap_or_default();

            if calls.is_empty() || round == max_rounds {
                reply.content = assistant
                    .get("content")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                break;
            }

            messages.push(assistant.clone());
            for call in &calls {
                debug!(tool = %call.function.name, round, "Executing tool call");
                let result = match self.execute_tool(call, &mut reply.features_tracked).await {
                    Ok(value) => value,
                    Err(e) => {
                        warn!(tool = %call.function.name, "Tool call failed: {}", e);
                        json!({ "error": e.to_string() })
                    }
                };
                reply.tool_calls_executed += 1;
                messages.push(json!({
                    "role": "tool",
                    "tool_call_id": call.id,
                    "content": result.to_string(),
                }));
            }
        }

        self.sessions
            .append(session_id, SessionMessage::new(ChatRole::User, message));
        self.sessions.append(
            session_id,
            SessionMessage::new(ChatRole::Assistant, reply.content.clone()),
        );

        Ok(reply)
    }
}
