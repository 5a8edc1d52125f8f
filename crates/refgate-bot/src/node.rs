//! Bot node - the main application entry point.
//!
//! Architecture:
//! - One long-polling loop pulls updates from the Bot API
//! - Every message is handled on its own task
//! - A single ledger (memory or RocksDB) shared by all handlers
//! - Optional HTTP API for health probes and referral status

use std::sync::Arc;
use std::time::Duration;

use refgate_ledger::{MemoryStore, ReferralLedger, ReferralStore, RocksStore, UserId};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::api;
use crate::command::Command;
use crate::config::BotConfig;
use crate::dispatch::Dispatcher;
use crate::error::{Error, Result};
use crate::membership::ChannelMembership;
use crate::messages::Texts;
use crate::router::{CommandRouter, Invocation};
use crate::telegram::{Message, TelegramClient, Update};

/// Ledger over whichever store the configuration selected.
pub type Ledger = ReferralLedger<Box<dyn ReferralStore>>;

/// Pause after a failed poll before retrying.
const POLL_BACKOFF: Duration = Duration::from_secs(3);

struct NodeInner {
    client: TelegramClient,
    router: CommandRouter<Box<dyn ReferralStore>, ChannelMembership>,
    dispatcher: Dispatcher<TelegramClient>,
}

/// A running bot instance.
pub struct BotNode {
    inner: Arc<NodeInner>,
    ledger: Arc<Ledger>,
    config: BotConfig,
}

impl BotNode {
    /// Create a node: resolve the bot identity and open the store.
    pub async fn new(config: BotConfig) -> Result<Self> {
        let client = TelegramClient::new(&config.api_url, &config.bot_token)?;

        let me = client.get_me().await?;
        let bot_username = me
            .username
            .ok_or_else(|| Error::Config("bot account has no username".into()))?;

        let store: Box<dyn ReferralStore> = match &config.data_dir {
            Some(dir) => {
                std::fs::create_dir_all(dir)?;
                Box::new(RocksStore::open(dir)?)
            }
            None => Box::new(MemoryStore::new()),
        };
        let ledger = Arc::new(ReferralLedger::new(store, config.ref_target));

        let oracle = ChannelMembership::new(
            client.clone(),
            config.channel.clone(),
            config.membership_timeout,
        );
        let texts = Texts::new(
            config.channel.clone(),
            ledger.policy(),
            config.reward_text.clone(),
        );
        let router = CommandRouter::new(Arc::clone(&ledger), oracle, texts, bot_username);
        let dispatcher = Dispatcher::new(Arc::new(client.clone()));

        Ok(Self {
            inner: Arc::new(NodeInner {
                client,
                router,
                dispatcher,
            }),
            ledger,
            config,
        })
    }

    /// Username of the bot, as reported by the Bot API.
    pub fn bot_username(&self) -> &str {
        self.inner.router.bot_username()
    }

    /// Get the shared ledger.
    pub fn ledger(&self) -> Arc<Ledger> {
        Arc::clone(&self.ledger)
    }

    /// Handle one update to completion, except for notification delivery
    /// which runs on the returned background tasks.
    pub async fn process(&self, update: Update) -> Vec<JoinHandle<()>> {
        match update.message {
            Some(message) => self.inner.handle_message(message).await,
            None => Vec::new(),
        }
    }

    /// Run the node (starts the HTTP API and the polling loop) until Ctrl-C.
    pub async fn run(self) -> Result<()> {
        info!("Refgate bot starting");
        info!("  Bot: @{}", self.bot_username());
        info!("  Channel: {}", self.config.channel);
        info!("  Target: {}", self.ledger.target());
        match &self.config.data_dir {
            Some(dir) => info!("  Data: {:?}", dir),
            None => info!("  Data: in memory (lost on restart)"),
        }

        if let Some(addr) = self.config.api_addr {
            let app = api::build_router(self.ledger());
            let listener = tokio::net::TcpListener::bind(addr).await?;
            info!("HTTP server listening on {}", addr);
            tokio::spawn(async move {
                if let Err(e) = axum::serve(listener, app).await {
                    tracing::error!("HTTP server error: {}", e);
                }
            });
        }

        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);

        let mut offset = 0;
        loop {
            let polled = tokio::select! {
                _ = &mut shutdown => break,
                polled = self.inner.client.get_updates(offset, self.config.poll_timeout) => polled,
            };

            let updates = match polled {
                Ok(updates) => updates,
                Err(e) => {
                    warn!("Polling for updates failed: {}", e);
                    tokio::select! {
                        _ = &mut shutdown => break,
                        _ = tokio::time::sleep(POLL_BACKOFF) => continue,
                    }
                }
            };

            debug!("Received {} updates", updates.len());
            for update in updates {
                offset = offset.max(update.update_id + 1);
                if let Some(message) = update.message {
                    let inner = Arc::clone(&self.inner);
                    tokio::spawn(async move {
                        inner.handle_message(message).await;
                    });
                }
            }
        }

        info!("Refgate bot shutting down");
        Ok(())
    }
}

impl NodeInner {
    async fn handle_message(&self, message: Message) -> Vec<JoinHandle<()>> {
        let (Some(from), Some(text)) = (message.from, message.text) else {
            return Vec::new();
        };
        if from.is_bot {
            return Vec::new();
        }
        let Some(command) = Command::parse(&text, self.router.bot_username()) else {
            return Vec::new();
        };

        let invocation = Invocation {
            actor: UserId::new(from.id),
            first_name: from.first_name,
            command,
        };
        let response = self.router.handle(&invocation).await;

        let handles = self.dispatcher.dispatch(response.notifications);
        if let Err(e) = self.client.send_message(message.chat.id, &response.reply).await {
            warn!("Failed to reply to {}: {}", invocation.actor, e);
        }
        handles
    }
}
