// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde_json::json;
use shipwright::config::settings::TwitterSettings;
use shipwright::infrastructure::clients::reply_client::{ReplyClient, ReplyFetcher};
use shipwright::utils::errors::ClientError;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn settings(server: &MockServer, max_pages: usize) -> TwitterSettings {
    TwitterSettings {
        api_key: Some("test-key".to_string()),
        api_base_url: server.uri(),
        max_pages,
    }
}

fn page(ids: &[&str], next: Option<&str>) -> serde_json::Value {
    let tweets: Vec<_> = ids
        .iter()
        .map(|id| {
            json!({
                "id": id,
                "text": format!("reply {}", id),
                "author": { "userName": "fan", "name": "A Fan" },
                "createdAt": "Tue Oct 14 10:00:00 +0000 2026",
                "likeCount": 3
            })
        })
        .collect();
    json!({
        "tweets": tweets,
        "has_next_page": next.is_some(),
        "next_cursor": next.unwrap_or("")
    })
}

/// 按游标翻页直到没有下一页
#[tokio::test]
async fn test_fetch_replies_follows_cursor() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/twitter/tweet/replies"))
        .and(header("X-API-Key", "test-key"))
        .and(query_param("tweetId", "12345"))
        .and(query_param("cursor", "page-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(&["3"], None)))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/twitter/tweet/replies"))
        .and(query_param("tweetId", "12345"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(&["1", "2"], Some("page-2"))))
        .mount(&server)
        .await;

    let client = ReplyClient::new(&settings(&server, 5)).unwrap();
    let replies = client
        .fetch_replies("https://x.com/acme/status/12345")
        .await
        .unwrap();

    let ids: Vec<_> = replies.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2", "3"]);
    assert_eq!(replies[0].author_handle.as_deref(), Some("fan"));
    assert_eq!(replies[0].like_count, 3);
}

#[tokio::test]
async fn test_fetch_replies_stops_at_max_pages() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/twitter/tweet/replies"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(&["1"], Some("again"))))
        .expect(2)
        .mount(&server)
        .await;

    let client = ReplyClient::new(&settings(&server, 2)).unwrap();
    let replies = client
        .fetch_replies("https://twitter.com/acme/status/1")
        .await
        .unwrap();
    assert_eq!(replies.len(), 2);
}

#[tokio::test]
async fn test_http_error_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/twitter/tweet/replies"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .mount(&server)
        .await;

    let client = ReplyClient::new(&settings(&server, 1)).unwrap();
    let err = client
        .fetch_replies("https://x.com/acme/status/1")
        .await
        .unwrap_err();
    match err {
        ClientError::Http { status, body } => {
            assert_eq!(status, 429);
            assert_eq!(body, "slow down");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_non_tweet_url_is_invalid_input() {
    let server = MockServer::start().await;
    let client = ReplyClient::new(&settings(&server, 1)).unwrap();
    let err = client
        .fetch_replies("https://instagram.com/p/abc")
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::InvalidInput(_)));
}
