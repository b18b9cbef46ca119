// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::config::settings::TwitterSettings;
use crate::utils::errors::ClientError;

/// 推文的一条回复
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TweetReply {
    pub id: String,
    pub text: String,
    pub author_handle: Option<String>,
    pub author_name: Option<String>,
    pub created_at: Option<String>,
    pub like_count: u64,
}

/// 回复抓取接口
#[async_trait]
pub trait ReplyFetcher: Send + Sync {
    async fn fetch_replies(&self, tweet_url: &str) -> Result<Vec<TweetReply>, ClientError>;
}

#[derive(Debug, Deserialize)]
struct RepliesPage {
    #[serde(default, alias = "replies")]
    tweets: Vec<RawTweet>,
    #[serde(default)]
    has_next_page: bool,
    #[serde(default)]
    next_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTweet {
    id: String,
    #[serde(default)]
    text: String,
    #[serde(default)]
    author: Option<RawAuthor>,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    like_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAuthor {
    #[serde(default)]
    user_name: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

impl From<RawTweet> for TweetReply {
    fn from(raw: RawTweet) -> Self {
        let (author_handle, author_name) = match raw.author {
            Some(author) => (author.user_name, author.name),
            None => (None, None),
        };
        Self {
            id: raw.id,
            text: raw.text,
            author_handle,
            author_name,
            created_at: raw.created_at,
            like_count: raw.like_count.unwrap_or(0),
        }
    }
}

/// 从推文链接中解析 (账号, 状态ID)
///
/// 支持 twitter.com、x.com 及其 www/mobile 子域名
pub fn parse_tweet_url(tweet_url: &str) -> Option<(String, String)> {
    let parsed = url::Url::parse(tweet_url.trim()).ok()?;
    let host = parsed.host_str()?.to_ascii_lowercase();
    let host = host
        .trim_start_matches("www.")
        .trim_start_matches("mobile.");
    if host != "twitter.com" && host != "x.com" {
        return None;
    }

    let segments: Vec<&str> = parsed.path_segments()?.filter(|s| !s.is_empty()).collect();
    match segments.as_slice() {
        [account, "status", id, ..] if !id.is_empty() && id.chars().all(|c| c.is_ascii_digit()) => {
            Some((account.to_string(), id.to_string()))
        }
        _ => None,
    }
}

/// 推文回复客户端
///
/// 调用 `GET {base}/twitter/tweet/replies`，按游标翻页
pub struct ReplyClient {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    max_pages: usize,
}

impl ReplyClient {
    pub fn new(settings: &TwitterSettings) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            api_key: settings.api_key.clone().filter(|k| !k.is_empty()),
            base_url: settings.api_base_url.trim_end_matches('/').to_string(),
            max_pages: settings.max_pages.max(1),
        })
    }

    async fn fetch_page(
        &self,
        api_key: &str,
        tweet_id: &str,
        cursor: Option<&str>,
    ) -> Result<RepliesPage, ClientError> {
        let url = format!("{}/twitter/tweet/replies", self.base_url);
        let mut query = vec![("tweetId", tweet_id)];
        if let Some(cursor) = cursor {
            query.push(("cursor", cursor));
        }

        let response = self
            .client
            .get(url)
            .header("X-API-Key", api_key)
            .query(&query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let page = response.json::<RepliesPage>().await?;
        Ok(page)
    }
}

#[async_trait]
impl ReplyFetcher for ReplyClient {
    async fn fetch_replies(&self, tweet_url: &str) -> Result<Vec<TweetReply>, ClientError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ClientError::NotConfigured("twitter.api_key".to_string()))?;
        let (_, tweet_id) = parse_tweet_url(tweet_url)
            .ok_or_else(|| ClientError::InvalidInput(format!("not a tweet url: {}", tweet_url)))?;

        let mut replies = Vec::new();
        let mut cursor: Option<String> = None;

        for page_number in 0..self.max_pages {
            let page = self
                .fetch_page(api_key, &tweet_id, cursor.as_deref())
                .await?;
            debug!(
                tweet_id = %tweet_id,
                page = page_number,
                count = page.tweets.len(),
                "Fetched reply page"
            );
            replies.extend(page.tweets.into_iter().map(TweetReply::from));

            match page.next_cursor {
                Some(next) if page.has_next_page && !next.is_empty() => cursor = Some(next),
                _ => break,
            }
        }

        Ok(replies)
    }
}
