//! Command routing.
//!
//! The router turns one inbound command into a reply for the sender plus
//! zero or more notifications for inviters. It never sends anything itself;
//! the node delivers the reply and hands notifications to the
//! [`Dispatcher`](crate::dispatch::Dispatcher).
//!
//! `/start <inviter>` is the only flow that touches referral state:
//!
//! 1. Missing, unparsable or self-referencing argument → plain welcome
//! 2. Actor not in the channel → join prompt, ledger untouched
//! 3. Actor in the channel → credit, notify the inviter on a new credit,
//!    and welcome the actor with its own link

use std::sync::Arc;

use refgate_ledger::{Outcome, ReferralLedger, ReferralStore, UserId};
use tracing::{debug, error, info};

use crate::command::{referral_link, Command};
use crate::membership::MembershipOracle;
use crate::messages::Texts;

/// A command together with who sent it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// User who sent the command.
    pub actor: UserId,
    /// Sender's first name, used in greetings.
    pub first_name: String,
    /// The parsed command.
    pub command: Command,
}

/// Why an inviter is being notified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    /// A new referral was credited ("n/target").
    Progress,
    /// The target was reached; carries the reward text.
    Reward,
}

/// Best-effort message to a user other than the sender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Inviter to deliver to.
    pub recipient: UserId,
    /// What the notification announces.
    pub kind: NotificationKind,
    /// Message body.
    pub text: String,
}

/// Everything produced by handling one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Reply to the sender.
    pub reply: String,
    /// Notifications to deliver fire-and-forget.
    pub notifications: Vec<Notification>,
}

impl Response {
    fn reply(text: String) -> Self {
        Self {
            reply: text,
            notifications: Vec::new(),
        }
    }
}

/// Maps commands onto the membership oracle and the ledger.
pub struct CommandRouter<S, O> {
    ledger: Arc<ReferralLedger<S>>,
    oracle: O,
    texts: Texts,
    bot_username: String,
}

impl<S: ReferralStore, O: MembershipOracle> CommandRouter<S, O> {
    pub fn new(
        ledger: Arc<ReferralLedger<S>>,
        oracle: O,
        texts: Texts,
        bot_username: impl Into<String>,
    ) -> Self {
        Self {
            ledger,
            oracle,
            texts,
            bot_username: bot_username.into(),
        }
    }

    /// Username the router builds links for and accepts mentions of.
    pub fn bot_username(&self) -> &str {
        &self.bot_username
    }

    /// Handle one command.
    pub async fn handle(&self, invocation: &Invocation) -> Response {
        let actor = invocation.actor;
        match &invocation.command {
            Command::Start { arg } => self.start(actor, &invocation.first_name, arg.as_deref()).await,
            Command::Link => Response::reply(self.texts.link(&self.link_for(actor))),
            Command::Check => Response::reply(self.texts.check(self.count(actor))),
            Command::Help => Response::reply(self.texts.help()),
        }
    }

    fn link_for(&self, user: UserId) -> String {
        referral_link(&self.bot_username, user)
    }

    fn count(&self, user: UserId) -> usize {
        self.ledger.count(user).unwrap_or_else(|e| {
            error!("Failed to read referral count of {}: {}", user, e);
            0
        })
    }

    fn welcome(&self, actor: UserId, first_name: &str) -> String {
        self.texts.welcome(first_name, &self.link_for(actor))
    }

    async fn start(&self, actor: UserId, first_name: &str, arg: Option<&str>) -> Response {
        let inviter = match arg.and_then(UserId::parse) {
            Some(inviter) if inviter != actor => inviter,
            Some(_) => {
                debug!("Ignoring self-referral by {}", actor);
                return Response::reply(self.welcome(actor, first_name));
            }
            None => return Response::reply(self.welcome(actor, first_name)),
        };

        if !self.oracle.is_member(actor).await {
            info!("{} started via {} but is not a channel member", actor, inviter);
            return Response::reply(self.texts.join_prompt(first_name));
        }

        let notifications = match self.ledger.record_referral(inviter, actor) {
            Ok(Outcome::Credited(count)) => vec![self.progress(inviter, count)],
            Ok(Outcome::ThresholdReached(count)) => vec![
                self.progress(inviter, count),
                Notification {
                    recipient: inviter,
                    kind: NotificationKind::Reward,
                    text: self.texts.reward(),
                },
            ],
            Ok(Outcome::AlreadyCredited) | Ok(Outcome::ClaimedByOther { .. }) => Vec::new(),
            Err(e) => {
                error!("Failed to record referral {} -> {}: {}", inviter, actor, e);
                Vec::new()
            }
        };

        Response {
            reply: self.welcome(actor, first_name),
            notifications,
        }
    }

    fn progress(&self, inviter: UserId, count: usize) -> Notification {
        Notification {
            recipient: inviter,
            kind: NotificationKind::Progress,
            text: self.texts.progress(count),
        }
    }
}
