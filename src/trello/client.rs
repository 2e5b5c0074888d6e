//! Trello REST client over reqwest.
//!
//! Authenticates with `key`/`token` query parameters. Secrets never
//! appear in errors or logs: endpoints are reported without the query
//! string and reqwest errors are stripped of their URL.

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;

use super::{Attachment, BoardList, Card, Comment, TrelloApi};
use crate::config::SyncConfig;
use crate::error::TrelloError;

/// Trello REST API v1.
pub const DEFAULT_API_BASE_URL: &str = "https://api.trello.com/1";

/// Trello REST client.
pub struct TrelloClient {
    base_url: String,
    api_key: SecretString,
    auth_token: SecretString,
    client: reqwest::Client,
}

impl TrelloClient {
    pub fn new(api_key: SecretString, auth_token: SecretString) -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            api_key,
            auth_token,
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &SyncConfig) -> Self {
        Self::new(config.api_key.clone(), config.auth_token.clone())
    }

    /// Point the client at another server (a proxy, or a mock in tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{path}", self.base_url))
            .query(&[
                ("key", self.api_key.expose_secret()),
                ("token", self.auth_token.expose_secret()),
            ])
    }

    /// Send a request, turning transport failures and non-2xx answers into errors.
    async fn send(
        &self,
        path: &str,
        request: RequestBuilder,
    ) -> Result<reqwest::Response, TrelloError> {
        tracing::debug!(endpoint = %path, "Trello request");

        let resp = request.send().await.map_err(|e| TrelloError::Request {
            endpoint: path.to_string(),
            source: e.without_url(),
        })?;

        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let body = resp.text().await.unwrap_or_default();
        Err(TrelloError::Status {
            status: status.as_u16(),
            endpoint: path.to_string(),
            body,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, TrelloError> {
        let resp = self
            .send(path, self.request(Method::GET, path).query(query))
            .await?;
        let text = resp.text().await.map_err(|e| TrelloError::Decode {
            endpoint: path.to_string(),
            reason: e.without_url().to_string(),
        })?;
        serde_json::from_str(&text).map_err(|e| TrelloError::Decode {
            endpoint: path.to_string(),
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl TrelloApi for TrelloClient {
    async fn find_card(&self, board_id: &str, short_id: &str) -> Result<Option<Card>, TrelloError> {
        let path = format!("/boards/{board_id}/cards/{short_id}");
        match self.get_json::<Card>(&path, &[("fields", "id")]).await {
            Ok(card) => Ok(Some(card)),
            Err(e) if e.status() == Some(StatusCode::NOT_FOUND.as_u16()) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn lists_on_board(&self, board_id: &str) -> Result<Vec<BoardList>, TrelloError> {
        let path = format!("/boards/{board_id}/lists");
        self.get_json(&path, &[("filter", "all"), ("fields", "id,name,closed")])
            .await
    }

    async fn list_attachments(&self, card_id: &str) -> Result<Vec<Attachment>, TrelloError> {
        let path = format!("/cards/{card_id}/attachments");
        self.get_json(&path, &[("fields", "url")]).await
    }

    async fn add_attachment(&self, card_id: &str, url: &str) -> Result<(), TrelloError> {
        let path = format!("/cards/{card_id}/attachments");
        let body = serde_json::json!({ "url": url });
        self.send(&path, self.request(Method::POST, &path).json(&body))
            .await?;
        Ok(())
    }

    async fn list_comments(&self, card_id: &str) -> Result<Vec<Comment>, TrelloError> {
        let path = format!("/cards/{card_id}/actions");
        self.get_json(&path, &[("filter", "commentCard"), ("limit", "1000")])
            .await
    }

    async fn add_comment(&self, card_id: &str, text: &str) -> Result<(), TrelloError> {
        let path = format!("/cards/{card_id}/actions/comments");
        let body = serde_json::json!({ "text": text });
        self.send(&path, self.request(Method::POST, &path).json(&body))
            .await?;
        Ok(())
    }

    async fn move_card(&self, card_id: &str, list_id: &str) -> Result<(), TrelloError> {
        let path = format!("/cards/{card_id}");
        let body = serde_json::json!({ "idList": list_id });
        self.send(&path, self.request(Method::PUT, &path).json(&body))
            .await?;
        Ok(())
    }
}
