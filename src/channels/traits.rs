use async_trait::async_trait;

/// A message received from a chat transport.
///
/// `sender` is the author's nick, `target` the channel (or our own nick for
/// a private message) it was addressed to.
#[derive(Debug, Clone)]
pub struct ChannelMessage {
    pub id: String,
    pub sender: String,
    pub target: String,
    pub content: String,
    pub timestamp: u64,
}

impl ChannelMessage {
    /// Addressed to a channel rather than directly to the bot.
    pub fn is_public(&self) -> bool {
        self.target.starts_with('#') || self.target.starts_with('&')
    }
}

/// Chat connection the bot runs on.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Human-readable transport name
    fn name(&self) -> &str;

    /// Send a message to a channel or user
    async fn send(&self, message: &str, recipient: &str) -> anyhow::Result<()>;

    /// Connect, join, and forward incoming messages until the connection
    /// ends (long-running)
    async fn listen(&self, tx: tokio::sync::mpsc::Sender<ChannelMessage>) -> anyhow::Result<()>;

    /// Drop the current connection so it can be re-established
    async fn disconnect(&self) -> anyhow::Result<()>;

    /// Leave for good
    async fn shutdown(&self) -> anyhow::Result<()> {
        self.disconnect().await
    }
}
