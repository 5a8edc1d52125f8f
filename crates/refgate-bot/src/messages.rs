//! User-facing message texts.

use refgate_ledger::RewardPolicy;

/// Renders every text the bot sends.
#[derive(Debug, Clone)]
pub struct Texts {
    channel: String,
    policy: RewardPolicy,
    reward: String,
}

impl Texts {
    pub fn new(channel: impl Into<String>, policy: RewardPolicy, reward: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            policy,
            reward: reward.into(),
        }
    }

    /// Public URL of the channel when it has a username.
    fn channel_url(&self) -> String {
        match self.channel.strip_prefix('@') {
            Some(name) => format!("https://t.me/{}", name),
            None => self.channel.clone(),
        }
    }

    pub fn help(&self) -> String {
        format!(
            "🎯 Invite friends to our channel {} to get rewards!\n\
             1) Share your link\n\
             2) They must join the channel and start the bot\n\
             3) Get {} valid referrals → receive reward\n\n\
             Commands:\n\
             /link – your referral link\n\
             /check – your referral count\n",
            self.channel_url(),
            self.policy.target()
        )
    }

    pub fn welcome(&self, first_name: &str, link: &str) -> String {
        format!("Hey {}!\n{}\nYour link:\n{}", first_name, self.help(), link)
    }

    pub fn join_prompt(&self, first_name: &str) -> String {
        format!(
            "👋 Hi {}! Join {} first, then tap /start again.\n\nChannel: {}",
            first_name, self.channel, self.channel
        )
    }

    pub fn progress(&self, count: usize) -> String {
        format!("✅ New valid referral! Total: {}/{}", count, self.policy.target())
    }

    pub fn reward(&self) -> String {
        self.reward.clone()
    }

    pub fn link(&self, link: &str) -> String {
        format!("🔗 Your referral link:\n{}", link)
    }

    pub fn check(&self, count: usize) -> String {
        let target = self.policy.target();
        match self.policy.remaining(count) {
            0 => format!("📊 You have {}/{} valid referrals. Goal reached!", count, target),
            left => format!(
                "📊 You have {}/{} valid referrals. {} more to go.",
                count, target, left
            ),
        }
    }
}
