//! Turn state and its publication to display layers

use strum::{AsRefStr, Display};
use tokio::sync::{broadcast, watch};

pub const INITIAL_RESPONSE_TEXT: &str = "Initializing...";

/// Where the assistant is in the turn cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum TurnState {
    Initializing,
    Listening,
    Processing,
    Speaking,
    Error,
}

/// Snapshot read by the display layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnStatus {
    pub state: TurnState,
    /// Most recent user-facing message
    pub last_response_text: String,
}

impl Default for TurnStatus {
    fn default() -> Self {
        Self {
            state: TurnState::Initializing,
            last_response_text: INITIAL_RESPONSE_TEXT.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: TurnState,
    pub to: TurnState,
}

/// Single-writer status publication.
///
/// The controller owns the board and is the only writer. Readers either
/// watch the latest [`TurnStatus`] or subscribe to every [`Transition`].
pub struct StatusBoard {
    status: watch::Sender<TurnStatus>,
    transitions: broadcast::Sender<Transition>,
}

impl Default for StatusBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusBoard {
    pub fn new() -> Self {
        let (status, _) = watch::channel(TurnStatus::default());
        let (transitions, _) = broadcast::channel(64);
        Self {
            status,
            transitions,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<TurnStatus> {
        self.status.subscribe()
    }

    pub fn transitions(&self) -> broadcast::Receiver<Transition> {
        self.transitions.subscribe()
    }

    pub fn current(&self) -> TurnStatus {
        self.status.borrow().clone()
    }

    pub fn state(&self) -> TurnState {
        self.status.borrow().state
    }

    /// Move to a new state. Setting the current state again is a no-op.
    pub fn set_state(&self, to: TurnState) {
        let from = self.state();
        if from == to {
            return;
        }
        self.status.send_modify(|status| status.state = to);
        log::debug!("🔄 Turn state {} -> {}", from, to);
        // no subscribers is fine
        let _ = self.transitions.send(Transition { from, to });
    }

    pub fn set_response_text(&self, text: impl Into<String>) {
        let text = text.into();
        self.status
            .send_modify(|status| status.last_response_text = text);
    }
}
