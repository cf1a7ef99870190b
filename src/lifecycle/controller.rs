use serde::{Deserialize, Serialize};
use strum::Display;

/// Process signals the bot reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum LifecycleSignal {
    Terminate,
    HangUp,
    UserDefined1,
    UserDefined2,
    Interrupt,
}

/// What the owning context must do in response to a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleCommand {
    /// Set the registry's refresh flag; no I/O.
    Reload,
    /// Drop the connection and let the supervisor reconnect.
    Disconnect,
    /// Shut the transport down gracefully and exit.
    Stop,
}

/// Meaning of a hang-up signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HangupAction {
    Stop,
    Reconnect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum LifecycleState {
    Running,
    ReloadPending,
    Disconnecting,
    Stopped,
}

/// Signal-driven lifecycle state machine.
///
/// Owned by the single context that also owns the registry and the
/// transport; signals reach it over a channel and never touch shared state.
#[derive(Debug)]
pub struct LifecycleController {
    state: LifecycleState,
    hangup: HangupAction,
}

impl LifecycleController {
    /// Starts in `Running`; create it after the first successful list load.
    pub fn new(hangup: HangupAction) -> Self {
        Self {
            state: LifecycleState::Running,
            hangup,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn command_for(&self, signal: LifecycleSignal) -> LifecycleCommand {
        match signal {
            LifecycleSignal::Terminate | LifecycleSignal::Interrupt => LifecycleCommand::Stop,
            LifecycleSignal::HangUp => match self.hangup {
                HangupAction::Stop => LifecycleCommand::Stop,
                HangupAction::Reconnect => LifecycleCommand::Disconnect,
            },
            LifecycleSignal::UserDefined1 => LifecycleCommand::Reload,
            LifecycleSignal::UserDefined2 => LifecycleCommand::Disconnect,
        }
    }

    /// Apply a signal. Returns the command to carry out, or `None` once
    /// stopped.
    pub fn handle(&mut self, signal: LifecycleSignal) -> Option<LifecycleCommand> {
        if self.state == LifecycleState::Stopped {
            tracing::debug!(%signal, "ignoring signal after stop");
            return None;
        }

        let command = self.command_for(signal);
        self.state = match command {
            LifecycleCommand::Stop => LifecycleState::Stopped,
            LifecycleCommand::Disconnect => LifecycleState::Disconnecting,
            LifecycleCommand::Reload if self.state == LifecycleState::Disconnecting => {
                LifecycleState::Disconnecting
            }
            LifecycleCommand::Reload => LifecycleState::ReloadPending,
        };
        tracing::info!(%signal, state = %self.state, "lifecycle signal received");
        Some(command)
    }

    /// The registry finished a pending reload.
    pub fn reload_completed(&mut self) {
        if self.state == LifecycleState::ReloadPending {
            self.state = LifecycleState::Running;
        }
    }

    /// The transport is connected again after a disconnect.
    pub fn reconnected(&mut self) {
        if self.state == LifecycleState::Disconnecting {
            self.state = LifecycleState::Running;
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.state == LifecycleState::Stopped
    }
}
