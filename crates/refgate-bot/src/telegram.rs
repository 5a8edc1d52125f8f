//! Minimal Telegram Bot API client.
//!
//! Covers the four methods the bot needs: `getMe`, `getUpdates`,
//! `sendMessage` and `getChatMember`.

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{Error, Result};

/// Extra time allowed on top of the long-poll timeout before the HTTP
/// request itself is abandoned.
const POLL_GRACE: Duration = Duration::from_secs(10);

/// Timeout for ordinary (non long-poll) requests.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Envelope of every Bot API response.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
    error_code: Option<i64>,
}

/// A Telegram user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    pub first_name: String,
    pub username: Option<String>,
}

/// A chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: String,
}

/// An incoming message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub from: Option<User>,
    pub chat: Chat,
    pub text: Option<String>,
}

/// An incoming update. Only message updates are requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

/// Membership entry returned by `getChatMember`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMember {
    pub status: String,
}

impl ChatMember {
    /// Whether the status counts as being in the channel.
    pub fn is_member(&self) -> bool {
        matches!(self.status.as_str(), "member" | "administrator" | "creator")
    }
}

/// Bot API client bound to one bot token.
#[derive(Clone)]
pub struct TelegramClient {
    http: Client,
    base: String,
}

impl TelegramClient {
    /// Create a client for `token` against the API at `api_url`.
    pub fn new(api_url: &str, token: &str) -> Result<Self> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            base: format!("{}/bot{}", api_url.trim_end_matches('/'), token),
        })
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        body: serde_json::Value,
        timeout: Option<Duration>,
    ) -> Result<T> {
        let mut request = self
            .http
            .post(format!("{}/{}", self.base, method))
            .json(&body);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        // Error responses carry the same JSON envelope, so the body is
        // decoded regardless of HTTP status.
        let response: ApiResponse<T> = request.send().await?.json().await?;
        match response {
            ApiResponse { ok: true, result: Some(result), .. } => Ok(result),
            ApiResponse { error_code, description, .. } => Err(Error::Telegram {
                code: error_code.unwrap_or_default(),
                description: description.unwrap_or_else(|| "missing result".into()),
            }),
        }
    }

    /// Identity of the bot itself.
    pub async fn get_me(&self) -> Result<User> {
        self.call("getMe", json!({}), None).await
    }

    /// Long-poll for message updates with id >= `offset`.
    pub async fn get_updates(&self, offset: i64, timeout: Duration) -> Result<Vec<Update>> {
        let body = json!({
            "offset": offset,
            "timeout": timeout.as_secs(),
            "allowed_updates": ["message"],
        });
        self.call("getUpdates", body, Some(timeout + POLL_GRACE)).await
    }

    /// Send a plain-text message.
    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<Message> {
        let body = json!({
            "chat_id": chat_id,
            "text": text,
            "disable_web_page_preview": true,
        });
        self.call("sendMessage", body, None).await
    }

    /// Membership of `user_id` in `chat` (`@username` or numeric id).
    pub async fn get_chat_member(&self, chat: &str, user_id: i64) -> Result<ChatMember> {
        let body = json!({
            "chat_id": chat,
            "user_id": user_id,
        });
        self.call("getChatMember", body, None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[tokio::test]
    async fn get_me_returns_bot_user() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/botTOKEN/getMe")
            .with_header("content-type", "application/json")
            .with_body(r#"{"ok":true,"result":{"id":42,"is_bot":true,"first_name":"Ref","username":"ref_bot"}}"#)
            .create_async()
            .await;

        let client = TelegramClient::new(&server.url(), "TOKEN").unwrap();
        let me = client.get_me().await.unwrap();

        assert_eq!(me.id, 42);
        assert_eq!(me.username.as_deref(), Some("ref_bot"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn api_error_is_surfaced() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/botTOKEN/sendMessage")
            .with_status(403)
            .with_header("content-type", "application/json")
            .with_body(r#"{"ok":false,"error_code":403,"description":"Forbidden: bot was blocked by the user"}"#)
            .create_async()
            .await;

        let client = TelegramClient::new(&server.url(), "TOKEN").unwrap();
        let err = client.send_message(7, "hi").await.unwrap_err();

        assert!(matches!(err, Error::Telegram { code: 403, .. }));
    }

    #[tokio::test]
    async fn send_message_posts_chat_and_text() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/botTOKEN/sendMessage")
            .match_body(Matcher::PartialJson(json!({"chat_id": 7, "text": "hello"})))
            .with_header("content-type", "application/json")
            .with_body(r#"{"ok":true,"result":{"message_id":1,"chat":{"id":7,"type":"private"},"text":"hello"}}"#)
            .create_async()
            .await;

        let client = TelegramClient::new(&server.url(), "TOKEN").unwrap();
        let sent = client.send_message(7, "hello").await.unwrap();

        assert_eq!(sent.chat.id, 7);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn get_updates_decodes_messages() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/botTOKEN/getUpdates")
            .match_body(Matcher::PartialJson(json!({"offset": 10})))
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"ok":true,"result":[{"update_id":10,"message":{"message_id":5,
                "from":{"id":3,"is_bot":false,"first_name":"Ann"},
                "chat":{"id":3,"type":"private"},"text":"/start 99"}},
                {"update_id":11}]}"#,
            )
            .create_async()
            .await;

        let client = TelegramClient::new(&server.url(), "TOKEN").unwrap();
        let updates = client.get_updates(10, Duration::ZERO).await.unwrap();

        assert_eq!(updates.len(), 2);
        let message = updates[0].message.as_ref().unwrap();
        assert_eq!(message.text.as_deref(), Some("/start 99"));
        assert_eq!(message.from.as_ref().unwrap().first_name, "Ann");
        assert!(updates[1].message.is_none());
    }

    #[test]
    fn member_statuses() {
        for status in ["member", "administrator", "creator"] {
            assert!(ChatMember { status: status.into() }.is_member());
        }
        for status in ["left", "kicked", "restricted", "something_new"] {
            assert!(!ChatMember { status: status.into() }.is_member());
        }
    }
}
