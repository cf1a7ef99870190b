use crate::channels::traits::{ChannelMessage, Transport};
use crate::error::TransportError;
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::{Mutex, mpsc};
use tokio_rustls::rustls;

use super::message::{SENDER_PREFIX_RESERVE, is_ctcp, split_message};
use super::parse::IrcMessage;

/// Servers PING every few minutes; silence longer than this means the
/// link is gone.
const READ_TIMEOUT: Duration = Duration::from_secs(300);

/// Hard IRC line limit including the trailing CRLF.
const MAX_LINE_BYTES: usize = 512;

/// Longest inbound line read in one go: tags (8191) plus the message.
const MAX_INBOUND_BYTES: u64 = 8191 + MAX_LINE_BYTES as u64;

/// Nicks whose messages are service notices, not chat.
const SERVICE_NICKS: [&str; 2] = ["NickServ", "ChanServ"];

static MSG_SEQ: AtomicU64 = AtomicU64::new(0);

trait IrcStream: AsyncRead + AsyncWrite + Send + Unpin {}
impl<T: AsyncRead + AsyncWrite + Send + Unpin> IrcStream for T {}

type Writer = tokio::io::WriteHalf<Box<dyn IrcStream>>;

/// What the read loop does after one server line.
enum Flow {
    Continue,
    /// The bot dropped its receiver.
    Closed,
}

/// IRC client for a single channel, over plain TCP or TLS.
///
/// `listen` runs one connection: register, join, then forward every
/// PRIVMSG (channel or private) until the link drops. `send` writes on
/// whichever connection is current.
pub struct IrcChannel {
    pub(super) server: String,
    pub(super) port: u16,
    pub(super) nickname: String,
    pub(super) realname: String,
    pub(super) channel: String,
    pub(super) tls: bool,
    writer: Arc<Mutex<Option<Writer>>>,
}

/// Per-connection registration state.
struct Session {
    nick: String,
    registered: bool,
}

impl IrcChannel {
    pub fn new(
        server: String,
        port: u16,
        nickname: String,
        realname: String,
        channel: String,
        tls: bool,
    ) -> Self {
        Self {
            server,
            port,
            nickname,
            realname,
            channel,
            tls,
            writer: Arc::new(Mutex::new(None)),
        }
    }

    async fn open_stream(&self) -> anyhow::Result<Box<dyn IrcStream>> {
        let tcp = tokio::net::TcpStream::connect((self.server.as_str(), self.port)).await?;
        if !self.tls {
            return Ok(Box::new(tcp));
        }

        let roots: rustls::RootCertStore =
            webpki_roots::TLS_SERVER_ROOTS.iter().cloned().collect();
        let config = rustls::ClientConfig::builder()
            .with_root_certificates(roots)
            .with_no_client_auth();
        let server_name = rustls::pki_types::ServerName::try_from(self.server.clone())?;
        let stream = tokio_rustls::TlsConnector::from(Arc::new(config))
            .connect(server_name, tcp)
            .await?;
        Ok(Box::new(stream))
    }

    async fn write_line(writer: &mut Writer, line: &str) -> anyhow::Result<()> {
        writer.write_all(line.as_bytes()).await?;
        writer.write_all(b"\r\n").await?;
        writer.flush().await?;
        Ok(())
    }

    /// Write on the current connection; a no-op when there is none.
    async fn command(&self, line: &str) -> anyhow::Result<()> {
        match self.writer.lock().await.as_mut() {
            Some(writer) => Self::write_line(writer, line).await,
            None => Ok(()),
        }
    }

    async fn quit(&self, reason: &str) -> anyhow::Result<()> {
        let Some(mut writer) = self.writer.lock().await.take() else {
            return Ok(());
        };
        tracing::info!("IRC quitting: {reason}");
        Self::write_line(&mut writer, &format!("QUIT :{reason}")).await?;
        writer.shutdown().await?;
        Ok(())
    }

    fn connection_failed(&self, e: &anyhow::Error) -> TransportError {
        TransportError::Connection {
            transport: self.name().to_string(),
            message: e.to_string(),
        }
    }

    async fn run_session(&self, tx: &mpsc::Sender<ChannelMessage>) -> anyhow::Result<()> {
        tracing::info!(
            "IRC connecting to {}:{} as {}",
            self.server,
            self.port,
            self.nickname
        );
        let stream = self
            .open_stream()
            .await
            .map_err(|e| self.connection_failed(&e))?;
        let (reader, mut writer) = tokio::io::split(stream);

        Self::write_line(&mut writer, &format!("NICK {}", self.nickname)).await?;
        Self::write_line(
            &mut writer,
            &format!("USER {} 0 * :{}", self.nickname, self.realname),
        )
        .await?;
        *self.writer.lock().await = Some(writer);

        let mut session = Session {
            nick: self.nickname.clone(),
            registered: false,
        };
        let mut lines = BufReader::new(reader);
        let mut raw = Vec::new();

        loop {
            raw.clear();
            let mut limited = (&mut lines).take(MAX_INBOUND_BYTES);
            let read = tokio::time::timeout(READ_TIMEOUT, limited.read_until(b'\n', &mut raw))
                .await
                .map_err(|_| anyhow::anyhow!("IRC read timed out after {READ_TIMEOUT:?}"))??;
            if read == 0 {
                anyhow::bail!("IRC connection closed by server");
            }

            // Clients in the channel may send any encoding.
            let line = String::from_utf8_lossy(&raw);
            if let Some(msg) = IrcMessage::parse(&line) {
                if let Flow::Closed = self.on_message(&msg, &mut session, tx).await? {
                    return Ok(());
                }
            }
        }
    }

    async fn on_message(
        &self,
        msg: &IrcMessage,
        session: &mut Session,
        tx: &mpsc::Sender<ChannelMessage>,
    ) -> anyhow::Result<Flow> {
        match msg.command.as_str() {
            "PING" => self.command(&format!("PONG :{}", msg.param(0))).await?,
            // RPL_WELCOME
            "001" => {
                session.registered = true;
                tracing::info!("IRC registered as {}, joining {}", session.nick, self.channel);
                self.command(&format!("JOIN {}", self.channel)).await?;
            }
            // ERR_NICKNAMEINUSE
            "433" => {
                let fallback = format!("{}_", session.nick);
                tracing::warn!("IRC nickname {} taken, trying {fallback}", session.nick);
                self.command(&format!("NICK {fallback}")).await?;
                session.nick = fallback;
            }
            "PRIVMSG" if session.registered => {
                if let Some(chat) = chat_message(msg) {
                    if tx.send(chat).await.is_err() {
                        return Ok(Flow::Closed);
                    }
                }
            }
            "ERROR" => anyhow::bail!("IRC server closed the link: {}", msg.param(0)),
            _ => {}
        }
        Ok(Flow::Continue)
    }
}

/// Chat message for a PRIVMSG, or `None` for service notices and CTCP.
fn chat_message(msg: &IrcMessage) -> Option<ChannelMessage> {
    let sender = msg.nick().unwrap_or("unknown");
    let text = msg.param(1);
    if is_ctcp(text) || SERVICE_NICKS.iter().any(|s| sender.eq_ignore_ascii_case(s)) {
        return None;
    }

    let now = chrono::Utc::now();
    let seq = MSG_SEQ.fetch_add(1, Ordering::Relaxed);
    Some(ChannelMessage {
        id: format!("irc_{}_{seq}", now.timestamp_millis()),
        sender: sender.to_string(),
        target: msg.param(0).to_string(),
        content: text.to_string(),
        timestamp: u64::try_from(now.timestamp()).unwrap_or_default(),
    })
}

#[async_trait]
impl Transport for IrcChannel {
    fn name(&self) -> &str {
        "irc"
    }

    async fn send(&self, message: &str, recipient: &str) -> anyhow::Result<()> {
        let mut guard = self.writer.lock().await;
        let writer = guard.as_mut().ok_or_else(|| TransportError::NotConnected {
            transport: self.name().to_string(),
        })?;

        // Room left after the relayed prefix, "PRIVMSG <target> :" and CRLF.
        let framing = SENDER_PREFIX_RESERVE + "PRIVMSG  :".len() + recipient.len() + 2;
        let budget = MAX_LINE_BYTES.saturating_sub(framing);

        for part in split_message(message, budget) {
            Self::write_line(writer, &format!("PRIVMSG {recipient} :{part}")).await?;
        }
        Ok(())
    }

    async fn listen(&self, tx: mpsc::Sender<ChannelMessage>) -> anyhow::Result<()> {
        let outcome = self.run_session(&tx).await;
        self.writer.lock().await.take();
        outcome
    }

    async fn disconnect(&self) -> anyhow::Result<()> {
        self.quit("reconnecting").await
    }

    async fn shutdown(&self) -> anyhow::Result<()> {
        self.quit("shutting down").await
    }
}
