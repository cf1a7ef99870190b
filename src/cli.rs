use clap::Parser;
use std::path::PathBuf;

/// `unax` - IRC bot to process weblinks.
#[derive(Parser, Debug)]
#[command(name = "unax")]
#[command(version = "0.1.0")]
#[command(about = "IRC bot to process weblinks.", long_about = None)]
pub struct Cli {
    /// Enable debug mode
    #[arg(short, long)]
    pub debug: bool,

    /// Config file (default: unax.toml in the working directory, if present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Connect with TLS
    #[arg(long)]
    pub tls: bool,

    /// IRC channel to join
    pub channel: String,

    /// Nickname of the bot
    pub nickname: String,

    /// Real name of the bot
    pub realname: String,

    /// IRC server address
    pub server: String,

    /// IRC server port
    #[arg(default_value_t = 6667)]
    pub port: u16,
}
