//! Channel membership lookup.

use std::future::Future;
use std::time::Duration;

use refgate_ledger::UserId;
use tracing::warn;

use crate::telegram::TelegramClient;

/// Answers whether a user currently belongs to the gated channel.
///
/// Implementations fail closed: any error, timeout or unknown status is a
/// `false`. There are no internal retries.
pub trait MembershipOracle: Send + Sync {
    fn is_member(&self, user: UserId) -> impl Future<Output = bool> + Send;
}

/// Oracle backed by the Bot API `getChatMember` call.
pub struct ChannelMembership {
    client: TelegramClient,
    channel: String,
    timeout: Duration,
}

impl ChannelMembership {
    /// Create an oracle for `channel` with a bounded lookup time.
    pub fn new(client: TelegramClient, channel: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            channel: channel.into(),
            timeout,
        }
    }
}

impl MembershipOracle for ChannelMembership {
    async fn is_member(&self, user: UserId) -> bool {
        let lookup = self.client.get_chat_member(&self.channel, user.get());
        match tokio::time::timeout(self.timeout, lookup).await {
            Ok(Ok(member)) => member.is_member(),
            Ok(Err(e)) => {
                warn!("Membership lookup for {} in {} failed: {}", user, self.channel, e);
                false
            }
            Err(_) => {
                warn!(
                    "Membership lookup for {} in {} timed out after {:?}",
                    user, self.channel, self.timeout
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn oracle_with_response(status: usize, body: &str) -> (mockito::ServerGuard, ChannelMembership) {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/botTOKEN/getChatMember")
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await;
        let client = TelegramClient::new(&server.url(), "TOKEN").unwrap();
        let oracle = ChannelMembership::new(client, "@refchan", Duration::from_secs(5));
        (server, oracle)
    }

    #[tokio::test]
    async fn member_status_is_member() {
        let (_server, oracle) =
            oracle_with_response(200, r#"{"ok":true,"result":{"status":"member"}}"#).await;
        assert!(oracle.is_member(UserId::new(1)).await);
    }

    #[tokio::test]
    async fn left_status_is_not_member() {
        let (_server, oracle) =
            oracle_with_response(200, r#"{"ok":true,"result":{"status":"left"}}"#).await;
        assert!(!oracle.is_member(UserId::new(1)).await);
    }

    #[tokio::test]
    async fn api_error_fails_closed() {
        let (_server, oracle) = oracle_with_response(
            400,
            r#"{"ok":false,"error_code":400,"description":"Bad Request: chat not found"}"#,
        )
        .await;
        assert!(!oracle.is_member(UserId::new(1)).await);
    }

    #[tokio::test]
    async fn malformed_response_fails_closed() {
        let (_server, oracle) = oracle_with_response(500, "upstream exploded").await;
        assert!(!oracle.is_member(UserId::new(1)).await);
    }

    #[tokio::test]
    async fn unreachable_api_fails_closed() {
        let client = TelegramClient::new("http://127.0.0.1:1", "TOKEN").unwrap();
        let oracle = ChannelMembership::new(client, "@refchan", Duration::from_millis(500));
        assert!(!oracle.is_member(UserId::new(1)).await);
    }

    #[tokio::test]
    async fn silent_api_times_out_closed() {
        // Accepts connections and never answers.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((stream, _)) = listener.accept().await {
                held.push(stream);
            }
        });

        let client = TelegramClient::new(&format!("http://{}", addr), "TOKEN").unwrap();
        let oracle = ChannelMembership::new(client, "@refchan", Duration::from_millis(300));

        let started = std::time::Instant::now();
        assert!(!oracle.is_member(UserId::new(1)).await);
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
