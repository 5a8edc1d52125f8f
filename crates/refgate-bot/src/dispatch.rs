//! Fire-and-forget notification delivery.

use std::future::Future;
use std::sync::Arc;

use refgate_ledger::UserId;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::Result;
use crate::router::Notification;
use crate::telegram::TelegramClient;

/// One-way text delivery to a user.
pub trait Notifier: Send + Sync + 'static {
    fn notify(&self, user: UserId, text: &str) -> impl Future<Output = Result<()>> + Send;
}

impl Notifier for TelegramClient {
    async fn notify(&self, user: UserId, text: &str) -> Result<()> {
        // Private chats share the user's id.
        self.send_message(user.get(), text).await.map(|_| ())
    }
}

/// Delivers notifications on background tasks.
///
/// Notifications for one recipient are sent in order on a single task, so a
/// progress line always lands before the reward it unlocks. Different
/// recipients get separate tasks. Each notification is sent once; failures
/// are logged and dropped and never hold back the rest.
pub struct Dispatcher<N> {
    notifier: Arc<N>,
}

impl<N> Clone for Dispatcher<N> {
    fn clone(&self) -> Self {
        Self {
            notifier: Arc::clone(&self.notifier),
        }
    }
}

impl<N: Notifier> Dispatcher<N> {
    pub fn new(notifier: Arc<N>) -> Self {
        Self { notifier }
    }

    /// Spawn delivery of every notification, one task per recipient. The
    /// returned handles may be dropped; they exist so callers can wait in
    /// tests or on shutdown.
    pub fn dispatch(&self, notifications: Vec<Notification>) -> Vec<JoinHandle<()>> {
        let mut batches: Vec<(UserId, Vec<Notification>)> = Vec::new();
        for notification in notifications {
            match batches.iter_mut().find(|(recipient, _)| *recipient == notification.recipient) {
                Some((_, batch)) => batch.push(notification),
                None => batches.push((notification.recipient, vec![notification])),
            }
        }

        batches
            .into_iter()
            .map(|(_, batch)| {
                let notifier = Arc::clone(&self.notifier);
                tokio::spawn(async move {
                    for notification in batch {
                        match notifier.notify(notification.recipient, &notification.text).await {
                            Ok(()) => debug!(
                                "Delivered {:?} notification to {}",
                                notification.kind, notification.recipient
                            ),
                            Err(e) => warn!(
                                "Dropped {:?} notification to {}: {}",
                                notification.kind, notification.recipient, e
                            ),
                        }
                    }
                })
            })
            .collect()
    }
}
