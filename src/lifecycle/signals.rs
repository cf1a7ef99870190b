use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::controller::LifecycleSignal;

/// Forward process signals to `tx` until the receiver is dropped.
///
/// Handlers are installed before this returns, so a signal sent right
/// after the call is already delivered. The forwarding task only ever
/// sends; the owning context decides what each signal means.
pub fn spawn_signal_listener(
    tx: mpsc::Sender<LifecycleSignal>,
) -> anyhow::Result<JoinHandle<()>> {
    let mut signals = ProcessSignals::install()?;
    Ok(tokio::spawn(async move {
        while let Some(received) = signals.next().await {
            tracing::debug!(signal = %received, "process signal");
            if tx.send(received).await.is_err() {
                return;
            }
        }
    }))
}

#[cfg(unix)]
struct ProcessSignals {
    terminate: tokio::signal::unix::Signal,
    hangup: tokio::signal::unix::Signal,
    user1: tokio::signal::unix::Signal,
    user2: tokio::signal::unix::Signal,
    interrupt: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl ProcessSignals {
    fn install() -> anyhow::Result<Self> {
        use tokio::signal::unix::{SignalKind, signal};

        Ok(Self {
            terminate: signal(SignalKind::terminate())?,
            hangup: signal(SignalKind::hangup())?,
            user1: signal(SignalKind::user_defined1())?,
            user2: signal(SignalKind::user_defined2())?,
            interrupt: signal(SignalKind::interrupt())?,
        })
    }

    /// Next signal, or `None` once the signal driver is gone.
    async fn next(&mut self) -> Option<LifecycleSignal> {
        tokio::select! {
            r = self.terminate.recv() => r.map(|()| LifecycleSignal::Terminate),
            r = self.hangup.recv() => r.map(|()| LifecycleSignal::HangUp),
            r = self.user1.recv() => r.map(|()| LifecycleSignal::UserDefined1),
            r = self.user2.recv() => r.map(|()| LifecycleSignal::UserDefined2),
            r = self.interrupt.recv() => r.map(|()| LifecycleSignal::Interrupt),
        }
    }
}

#[cfg(windows)]
struct ProcessSignals {
    ctrl_c: tokio::signal::windows::CtrlC,
}

#[cfg(windows)]
impl ProcessSignals {
    fn install() -> anyhow::Result<Self> {
        Ok(Self {
            ctrl_c: tokio::signal::windows::ctrl_c()?,
        })
    }

    async fn next(&mut self) -> Option<LifecycleSignal> {
        self.ctrl_c.recv().await.map(|()| LifecycleSignal::Interrupt)
    }
}
