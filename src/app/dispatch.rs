use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;

use crate::Config;
use crate::bot::LinkBot;
use crate::channels::IrcChannel;
use crate::cli::Cli;
use crate::lifecycle::spawn_signal_listener;
use crate::links::DomainRegistry;

/// Start the bot described by `cli` and `config` and run it until stopped.
///
/// 1. Loads the domain lists; the bot never joins without them.
/// 2. Builds the IRC transport from the command line identity.
/// 3. Forwards process signals to the bot and runs it.
pub async fn dispatch(cli: Cli, config: Config) -> Result<()> {
    let registry = Arc::new(DomainRegistry::new(config.domain_sources()));
    registry
        .reload()
        .await
        .context("domain lists are required before joining the channel")?;

    let transport = Arc::new(IrcChannel::new(
        cli.server,
        cli.port,
        cli.nickname,
        cli.realname,
        cli.channel.clone(),
        cli.tls,
    ));
    let bot = LinkBot::new(transport, registry, cli.channel, &config)?;

    let (signal_tx, signal_rx) = mpsc::channel(8);
    let listener = spawn_signal_listener(signal_tx).context("failed to install signal handlers")?;

    info!("Bot running; SIGUSR1 reloads domain lists, SIGUSR2 reconnects");
    let result = bot.run(signal_rx).await;
    listener.abort();
    result
}
