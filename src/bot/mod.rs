use anyhow::Result;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Duration;

use crate::channels::{ChannelMessage, Transport};
use crate::config::{Config, LifecycleConfig};
use crate::lifecycle::{LifecycleCommand, LifecycleController, LifecycleSignal, LifecycleState};
use crate::links::{DomainRegistry, Enricher, LinkConfig, extract, format_replies};

/// Capacity of the inbound message queue between transport and bot.
const INBOUND_QUEUE: usize = 64;

enum SessionEnd {
    Stop,
    Reconnect,
    Lost(std::result::Result<Result<()>, tokio::task::JoinError>),
}

/// Link-enrichment bot for one channel.
///
/// Owns the registry, the enricher, the lifecycle controller and the
/// transport; messages and lifecycle signals are handled one at a time.
pub struct LinkBot {
    transport: Arc<dyn Transport>,
    registry: Arc<DomainRegistry>,
    enricher: Enricher,
    links: LinkConfig,
    lifecycle: LifecycleConfig,
    controller: LifecycleController,
    channel: String,
}

impl LinkBot {
    /// Build the bot. Loads the domain lists if they were never loaded;
    /// failing that is fatal.
    pub fn new(
        transport: Arc<dyn Transport>,
        registry: Arc<DomainRegistry>,
        channel: String,
        config: &Config,
    ) -> Result<Self> {
        if registry.snapshot().is_none() {
            registry.load()?;
        }

        Ok(Self {
            transport,
            registry,
            enricher: Enricher::new(&config.links)?,
            links: config.links.clone(),
            lifecycle: config.lifecycle.clone(),
            controller: LifecycleController::new(config.lifecycle.hangup),
            channel,
        })
    }

    pub fn state(&self) -> LifecycleState {
        self.controller.state()
    }

    /// Reply lines for one message text, in emission order.
    pub async fn replies_for(&self, text: &str) -> Vec<String> {
        let links = extract(text, &self.registry).await;
        if links.is_empty() {
            return Vec::new();
        }
        tracing::debug!(count = links.len(), "links found");

        let results = self.enricher.enrich_all(&links).await;
        format_replies(&results, &self.links)
    }

    /// Process one inbound message to completion.
    pub async fn handle_message(&mut self, msg: &ChannelMessage) {
        if !msg.is_public() {
            tracing::debug!(
                "Private message from {} to {}: {}",
                msg.sender,
                msg.target,
                msg.content
            );
            return;
        }
        tracing::debug!(
            "Public message from {} to {}: {}",
            msg.sender,
            msg.target,
            msg.content
        );
        if !msg.target.eq_ignore_ascii_case(&self.channel) {
            return;
        }

        for reply in self.replies_for(&msg.content).await {
            if let Err(e) = self.transport.send(&reply, &self.channel).await {
                tracing::warn!("failed to send reply to {}: {e}", self.channel);
            }
        }

        if self.controller.state() == LifecycleState::ReloadPending && !self.registry.needs_reload()
        {
            self.controller.reload_completed();
        }
    }

    /// Apply a lifecycle signal; returns the command left for the caller.
    pub fn apply_signal(&mut self, signal: LifecycleSignal) -> Option<LifecycleCommand> {
        let command = self.controller.handle(signal)?;
        if command == LifecycleCommand::Reload {
            self.registry.request_reload();
        }
        Some(command)
    }

    /// Run until a stop signal arrives.
    ///
    /// Each connection runs as a session; a requested disconnect reconnects
    /// at once, a lost connection reconnects after an exponential backoff.
    pub async fn run(mut self, mut signals: mpsc::Receiver<LifecycleSignal>) -> Result<()> {
        let initial_backoff = self.lifecycle.initial_backoff_secs.max(1);
        let max_backoff = self.lifecycle.max_backoff_secs.max(initial_backoff);
        let mut backoff = initial_backoff;

        loop {
            let (tx, mut rx) = mpsc::channel(INBOUND_QUEUE);
            let mut session = self.spawn_session(tx);
            self.controller.reconnected();

            let end = loop {
                tokio::select! {
                    Some(msg) = rx.recv() => self.handle_message(&msg).await,
                    Some(signal) = signals.recv() => match self.apply_signal(signal) {
                        Some(LifecycleCommand::Stop) => break SessionEnd::Stop,
                        Some(LifecycleCommand::Disconnect) => break SessionEnd::Reconnect,
                        Some(LifecycleCommand::Reload) | None => {}
                    },
                    joined = &mut session => break SessionEnd::Lost(joined),
                }
            };

            match end {
                SessionEnd::Stop => {
                    if let Err(e) = self.transport.shutdown().await {
                        tracing::warn!("{} shutdown failed: {e}", self.transport.name());
                    }
                    session.abort();
                    tracing::info!("Shut down gracefully");
                    return Ok(());
                }
                SessionEnd::Reconnect => {
                    if let Err(e) = self.transport.disconnect().await {
                        tracing::warn!("{} disconnect failed: {e}", self.transport.name());
                    }
                    session.abort();
                    let _ = session.await;
                    backoff = initial_backoff;
                }
                SessionEnd::Lost(joined) => {
                    match joined {
                        Ok(Ok(())) => {
                            tracing::warn!("{} session ended", self.transport.name());
                            backoff = initial_backoff;
                        }
                        Ok(Err(e)) => {
                            tracing::error!("{} session failed: {e}", self.transport.name());
                        }
                        Err(e) => tracing::error!("{} session panicked: {e}", self.transport.name()),
                    }

                    if self.wait_backoff(&mut signals, backoff).await {
                        tracing::info!("Shut down gracefully");
                        return Ok(());
                    }
                    backoff = backoff.saturating_mul(2).min(max_backoff);
                }
            }
        }
    }

    fn spawn_session(&self, tx: mpsc::Sender<ChannelMessage>) -> JoinHandle<Result<()>> {
        let transport = Arc::clone(&self.transport);
        tokio::spawn(async move { transport.listen(tx).await })
    }

    /// Sleep before reconnecting while still honouring signals. Returns
    /// `true` if a stop arrived.
    async fn wait_backoff(
        &mut self,
        signals: &mut mpsc::Receiver<LifecycleSignal>,
        backoff_secs: u64,
    ) -> bool {
        tracing::info!("reconnecting in {backoff_secs}s");
        let sleep = tokio::time::sleep(Duration::from_secs(backoff_secs));
        tokio::pin!(sleep);

        loop {
            tokio::select! {
                () = &mut sleep => return false,
                Some(signal) = signals.recv() => {
                    if self.apply_signal(signal) == Some(LifecycleCommand::Stop) {
                        return true;
                    }
                }
            }
        }
    }
}
