#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc};
use wiremock::MockServer;

use unax::channels::{ChannelMessage, Transport};
use unax::config::Config;
use unax::links::{DomainRegistry, LinkConfig};
use unax::bot::LinkBot;

pub const CHANNEL: &str = "#links";

/// Transport that records what the bot sends and never connects.
#[derive(Default)]
pub struct RecordingTransport {
    pub sent: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl Transport for RecordingTransport {
    fn name(&self) -> &str {
        "recording"
    }

    async fn send(&self, message: &str, recipient: &str) -> anyhow::Result<()> {
        self.sent
            .lock()
            .await
            .push((recipient.to_string(), message.to_string()));
        Ok(())
    }

    async fn listen(&self, _tx: mpsc::Sender<ChannelMessage>) -> anyhow::Result<()> {
        std::future::pending::<()>().await;
        Ok(())
    }

    async fn disconnect(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

impl RecordingTransport {
    pub async fn lines(&self) -> Vec<String> {
        self.sent
            .lock()
            .await
            .iter()
            .map(|(_, line)| line.clone())
            .collect()
    }
}

/// Domain entry matching links served by `server`.
pub fn host(server: &MockServer) -> String {
    server.address().to_string()
}

pub fn channel_message(sender: &str, content: &str) -> ChannelMessage {
    ChannelMessage {
        id: format!("test_{sender}"),
        sender: sender.to_string(),
        target: CHANNEL.to_string(),
        content: content.to_string(),
        timestamp: 0,
    }
}

pub fn link_bot(
    registry: DomainRegistry,
    links: LinkConfig,
) -> (LinkBot, Arc<RecordingTransport>) {
    let transport = Arc::new(RecordingTransport::default());
    let config = Config {
        links,
        ..Config::default()
    };
    let bot = LinkBot::new(
        Arc::clone(&transport) as Arc<dyn Transport>,
        Arc::new(registry),
        CHANNEL.to_string(),
        &config,
    )
    .expect("bot should start with static domain lists");
    (bot, transport)
}
