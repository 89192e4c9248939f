//! Moltbook HTTP 客户端
//!
//! Bearer 鉴权，每个请求带超时。响应按元素逐条解码：单条格式不对只丢弃该条，不影响整批。
//! 动作状态码：200/201 成功，429 限流，其余视为失败。

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;

use crate::config::MoltbookSection;
use crate::platform::{
    ActionExecutor, ActionOutcome, Comment, CommentSource, FeedItem, FeedSource, Identity,
    PlatformError,
};

/// 作者 / 分区对象只取 name
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Named {
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WirePost {
    id: Value,
    title: Option<String>,
    content: Option<String>,
    author: Option<Named>,
    submolt: Option<Named>,
    upvotes: Option<i64>,
    comment_count: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WireComment {
    id: Value,
    parent_id: Value,
    author: Option<Named>,
    content: Option<String>,
}

/// id 可能是字符串也可能是数字
fn id_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn author_name(author: Option<Named>) -> String {
    author
        .and_then(|a| a.name)
        .unwrap_or_else(|| "Unknown".to_string())
}

impl WirePost {
    fn into_item(self) -> Option<FeedItem> {
        let id = id_string(&self.id)?;
        Some(FeedItem {
            id,
            title: self.title.unwrap_or_default(),
            body: self.content.unwrap_or_default(),
            author: author_name(self.author),
            category: self
                .submolt
                .and_then(|s| s.name)
                .unwrap_or_else(|| "general".to_string()),
            upvotes: self.upvotes.unwrap_or(0),
            comment_count: self.comment_count.unwrap_or(0),
        })
    }
}

impl WireComment {
    fn into_comment(self) -> Option<Comment> {
        let id = id_string(&self.id)?;
        Some(Comment {
            id,
            parent_id: id_string(&self.parent_id),
            author: author_name(self.author),
            text: self.content.unwrap_or_default(),
        })
    }
}

/// 从 `{"posts": [...]}`（或 `data`）中解码动态
pub(crate) fn decode_feed(body: &Value) -> Vec<FeedItem> {
    body.get("posts")
        .or_else(|| body.get("data"))
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(|v| serde_json::from_value::<WirePost>(v.clone()).ok())
                .filter_map(WirePost::into_item)
                .collect()
        })
        .unwrap_or_default()
}

pub(crate) fn decode_comments(body: &Value) -> Vec<Comment> {
    body.get("comments")
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(|v| serde_json::from_value::<WireComment>(v.clone()).ok())
                .filter_map(WireComment::into_comment)
                .collect()
        })
        .unwrap_or_default()
}

/// Moltbook API 客户端
pub struct MoltbookClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl MoltbookClient {
    pub fn new(base_url: &str, api_key: &str, timeout_secs: u64) -> Result<Self, PlatformError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    pub fn from_config(cfg: &MoltbookSection) -> Result<Self, PlatformError> {
        Self::new(
            &cfg.base_url,
            cfg.api_key.as_deref().unwrap_or_default(),
            cfg.timeout_secs,
        )
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json(&self, path: &str) -> Result<Value, PlatformError> {
        let resp = self
            .client
            .get(self.url(path))
            .bearer_auth(&self.api_key)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(PlatformError::Status {
                status: status.as_u16(),
                body: preview(&body, 100),
            });
        }
        Ok(resp.json().await?)
    }

    /// 发送写操作并映射为三态结果
    async fn send_action(&self, path: &str, payload: Option<Value>) -> ActionOutcome {
        let mut req = self.client.post(self.url(path)).bearer_auth(&self.api_key);
        if let Some(body) = payload {
            req = req.json(&body);
        }
        let resp = match req.send().await {
            Ok(r) => r,
            Err(e) => return ActionOutcome::Failed(PlatformError::from(e).to_string()),
        };

        match resp.status() {
            StatusCode::OK | StatusCode::CREATED => {
                let body: Value = resp.json().await.unwrap_or(Value::Null);
                let created_id = body
                    .get("post")
                    .or_else(|| body.get("comment"))
                    .and_then(|o| o.get("id"))
                    .and_then(id_string);
                ActionOutcome::Success { created_id }
            }
            StatusCode::TOO_MANY_REQUESTS => ActionOutcome::RateLimited,
            status => {
                let body = resp.text().await.unwrap_or_default();
                ActionOutcome::Failed(format!("{}: {}", status.as_u16(), preview(&body, 100)))
            }
        }
    }
}

fn preview(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

#[async_trait]
impl FeedSource for MoltbookClient {
    async fn fetch(&self, limit: usize) -> Result<Vec<FeedItem>, PlatformError> {
        let body = self
            .get_json(&format!("/posts?sort=new&limit={}", limit))
            .await?;
        Ok(decode_feed(&body))
    }

    async fn whoami(&self) -> Result<Identity, PlatformError> {
        let body = self.get_json("/agents/me").await?;
        let agent = body
            .get("agent")
            .ok_or_else(|| PlatformError::Malformed("missing `agent` object".to_string()))?;
        let name = agent
            .get("name")
            .and_then(Value::as_str)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| PlatformError::Malformed("missing agent name".to_string()))?;
        Ok(Identity {
            name: name.to_string(),
            id: agent.get("id").and_then(id_string),
        })
    }
}

#[async_trait]
impl CommentSource for MoltbookClient {
    async fn list(&self, item_id: &str) -> Result<Vec<Comment>, PlatformError> {
        let body = self
            .get_json(&format!("/posts/{}/comments?sort=new", item_id))
            .await?;
        Ok(decode_comments(&body))
    }
}

#[async_trait]
impl ActionExecutor for MoltbookClient {
    async fn comment(&self, item_id: &str, text: &str, parent_id: Option<&str>) -> ActionOutcome {
        let mut payload = serde_json::json!({ "content": text });
        if let Some(parent) = parent_id {
            payload["parent_id"] = Value::String(parent.to_string());
        }
        self.send_action(&format!("/posts/{}/comments", item_id), Some(payload))
            .await
    }

    async fn upvote(&self, item_id: &str) -> ActionOutcome {
        self.send_action(&format!("/posts/{}/upvote", item_id), None)
            .await
    }

    async fn post(&self, category: &str, title: &str, body: &str) -> ActionOutcome {
        let payload = serde_json::json!({
            "submolt": category,
            "title": title,
            "content": body,
        });
        self.send_action("/posts", Some(payload)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> MoltbookClient {
        MoltbookClient::new(&server.uri(), "test-key", 5).unwrap()
    }

    #[test]
    fn test_decode_feed_skips_bad_elements() {
        let body = json!({
            "posts": [
                {"id": "a1", "title": "Hello", "content": null, "author": {"name": "alice"},
                 "submolt": {"name": "ai"}, "upvotes": 3, "comment_count": 2},
                {"title": "no id"},
                {"id": 42, "title": "numeric id"},
                "garbage"
            ]
        });
        let items = decode_feed(&body);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].category, "ai");
        assert_eq!(items[0].body, "");
        assert_eq!(items[1].id, "42");
        assert_eq!(items[1].author, "Unknown");
        assert_eq!(items[1].category, "general");
    }

    #[test]
    fn test_decode_feed_accepts_data_key() {
        let body = json!({"data": [{"id": "x"}]});
        assert_eq!(decode_feed(&body).len(), 1);
        assert!(decode_feed(&json!({"unexpected": true})).is_empty());
    }

    #[test]
    fn test_decode_comments_keeps_parent_linkage() {
        let body = json!({"comments": [
            {"id": "c1", "author": {"name": "bob"}, "content": "nice"},
            {"id": "c2", "parent_id": "c1", "author": {"name": "me"}, "content": "thanks"}
        ]});
        let comments = decode_comments(&body);
        assert_eq!(comments[0].parent_id, None);
        assert_eq!(comments[1].parent_id.as_deref(), Some("c1"));
    }

    #[tokio::test]
    async fn test_fetch_feed_sends_auth_and_limit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/posts"))
            .and(query_param("limit", "50"))
            .and(header("authorization", "Bearer test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "posts": [{"id": "p1", "title": "T"}]
            })))
            .mount(&server)
            .await;

        let items = client(&server).fetch(50).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "p1");
    }

    #[tokio::test]
    async fn test_fetch_feed_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/posts"))
            .respond_with(ResponseTemplate::new(503).set_body_string("down"))
            .mount(&server)
            .await;

        let err = client(&server).fetch(10).await.unwrap_err();
        assert!(matches!(err, PlatformError::Status { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_whoami() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/agents/me"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "agent": {"name": "Noobbot09", "id": "ag_1"}
            })))
            .mount(&server)
            .await;

        let me = client(&server).whoami().await.unwrap();
        assert_eq!(me.name, "Noobbot09");
        assert_eq!(me.id.as_deref(), Some("ag_1"));
    }

    #[tokio::test]
    async fn test_comment_with_parent_and_rate_limit() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/posts/p1/comments"))
            .and(body_json(json!({"content": "hello there", "parent_id": "c9"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({})))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/posts/p2/comments"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let c = client(&server);
        assert_eq!(
            c.comment("p1", "hello there", Some("c9")).await,
            ActionOutcome::Success { created_id: None }
        );
        assert_eq!(c.comment("p2", "hello", None).await, ActionOutcome::RateLimited);
    }

    #[tokio::test]
    async fn test_post_returns_created_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/posts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "post": {"id": "new_1"}
            })))
            .mount(&server)
            .await;

        let outcome = client(&server).post("ai", "Title", "Body").await;
        assert_eq!(
            outcome,
            ActionOutcome::Success {
                created_id: Some("new_1".to_string())
            }
        );
    }

    #[tokio::test]
    async fn test_upvote_failure_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/posts/p1/upvote"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let outcome = client(&server).upvote("p1").await;
        assert!(matches!(outcome, ActionOutcome::Failed(_)));
    }
}
