//! HTTP implementation of the chat transport

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::base::{ChatReply, ChatTransport, TransportError, TransportResult};

/// Request body for `POST /api/init`
#[derive(Debug, Serialize)]
struct InitRequest<'a> {
    username: &'a str,
    session_id: &'a str,
}

/// Request body for `POST /api/chat`
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    session_id: &'a str,
    message: &'a str,
}

/// Request body for `POST /api/reset`
#[derive(Debug, Serialize)]
struct ResetRequest<'a> {
    session_id: &'a str,
}

/// Response body shared by all three endpoints
#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    session_id: Option<String>,
    #[serde(default)]
    current_node: Option<String>,
}

/// Reqwest-backed client for the Intervue backend
pub struct HttpChatClient {
    client: Client,
    base_url: String,
}

impl HttpChatClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn post<B: Serialize>(&self, path: &str, body: &B) -> TransportResult<ChatReply> {
        let url = format!("{}{}", self.base_url, path);
        debug!("POST {}", url);

        let response = self.client.post(&url).json(body).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(TransportError::Status { status, body });
        }

        let data: ChatResponse = response
            .json()
            .await
            .map_err(|e| TransportError::InvalidResponse(e.to_string()))?;

        let response_text = data.response.ok_or_else(|| {
            TransportError::InvalidResponse("missing `response` field".to_string())
        })?;

        Ok(ChatReply {
            response: response_text,
            session_id: data.session_id,
            current_node: data.current_node,
        })
    }
}

#[async_trait]
impl ChatTransport for HttpChatClient {
    async fn init(
        &self,
        username: &str,
        candidate_session_id: &str,
    ) -> TransportResult<ChatReply> {
        self.post(
            "/api/init",
            &InitRequest {
                username,
                session_id: candidate_session_id,
            },
        )
        .await
    }

    async fn exchange(&self, session_id: &str, message: &str) -> TransportResult<ChatReply> {
        self.post("/api/chat", &ChatRequest { session_id, message })
            .await
    }

    async fn reset(&self, session_id: &str) -> TransportResult<ChatReply> {
        self.post("/api/reset", &ResetRequest { session_id }).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[tokio::test]
    async fn test_init_sends_candidate_and_parses_reply() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/init")
            .match_body(Matcher::Json(serde_json::json!({
                "username": "Alex",
                "session_id": "cand-1",
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"response":"Hi Alex","session_id":"s1","current_node":"intro"}"#)
            .create_async()
            .await;

        let client = HttpChatClient::new(server.url());
        let reply = client.init("Alex", "cand-1").await.unwrap();

        assert_eq!(reply.response, "Hi Alex");
        assert_eq!(reply.session_id.as_deref(), Some("s1"));
        assert_eq!(reply.current_node.as_deref(), Some("intro"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_exchange_with_omitted_optionals() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/chat")
            .match_body(Matcher::Json(serde_json::json!({
                "session_id": "s1",
                "message": "Hello",
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"response":"Nice to meet you"}"#)
            .create_async()
            .await;

        let client = HttpChatClient::new(server.url());
        let reply = client.exchange("s1", "Hello").await.unwrap();

        assert_eq!(reply.response, "Nice to meet you");
        assert!(reply.session_id.is_none());
        assert!(reply.current_node.is_none());
    }

    #[tokio::test]
    async fn test_reset_round_trip() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/reset")
            .match_body(Matcher::Json(serde_json::json!({"session_id": "s1"})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"response":"Fresh start","session_id":"s2"}"#)
            .create_async()
            .await;

        let client = HttpChatClient::new(server.url());
        let reply = client.reset("s1").await.unwrap();

        assert_eq!(reply.response, "Fresh start");
        assert_eq!(reply.session_id.as_deref(), Some("s2"));
    }

    #[tokio::test]
    async fn test_non_success_status_is_transport_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/chat")
            .with_status(404)
            .with_body(r#"{"detail":"Session not found"}"#)
            .create_async()
            .await;

        let client = HttpChatClient::new(server.url());
        let err = client.exchange("gone", "Hello").await.unwrap_err();

        match err {
            TransportError::Status { status, body } => {
                assert_eq!(status, 404);
                assert!(body.contains("Session not found"));
            }
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_response_field_is_invalid() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/chat")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"session_id":"s1"}"#)
            .create_async()
            .await;

        let client = HttpChatClient::new(server.url());
        let err = client.exchange("s1", "Hello").await.unwrap_err();
        assert!(matches!(err, TransportError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_malformed_body_is_invalid() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/reset")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("not json at all")
            .create_async()
            .await;

        let client = HttpChatClient::new(server.url());
        let err = client.reset("s1").await.unwrap_err();
        assert!(matches!(err, TransportError::InvalidResponse(_)));
    }
}
