//! Session types: the data the registry keeps for each connected client.
//!
//! A "session" starts when the lobby accepts a control connection and
//! ends when that connection closes. It tracks:
//! - WHO the client is (`ClientId`, plus a generation in [`ClientKey`])
//! - WHERE its peers can reach it (the display address)
//! - HOW it is doing (score)
//! - WHAT it is doing right now ([`ClientState`])

use std::fmt;

use serde::{Deserialize, Serialize};
use tictac_protocol::ClientId;

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Configuration for the session registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Number of slots in the registry. Connections beyond this are
    /// refused with [`SessionError::CapacityExceeded`](crate::SessionError).
    ///
    /// Default: 64.
    pub capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { capacity: 64 }
    }
}

// ---------------------------------------------------------------------------
// ClientState
// ---------------------------------------------------------------------------

/// What a client is currently doing in the lobby.
///
/// ```text
///            NewGame forwarded            Accept honoured
///   Idle ──────────────────────→ Inviting ───────────────→ Playing
///     ↑   (invitee: Invited)        │                        │
///     └────── Deny / Expired ───────┘                        │
///     └──────────────────────── FinishGame ──────────────────┘
/// ```
///
/// Only `Playing` affects availability. `Inviting` and `Invited` record
/// an in-flight invite but commit nothing: either party can still be
/// invited or matched by someone else until an `Accept` is honoured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClientState {
    /// Browsing the roster.
    Idle,
    /// Holds an invite it has not answered yet.
    Invited,
    /// Sent an invite that has not been answered yet.
    Inviting,
    /// In a match.
    Playing,
}

impl ClientState {
    /// Returns `true` if the client counts as busy for matchmaking.
    pub fn is_playing(self) -> bool {
        matches!(self, Self::Playing)
    }
}

impl fmt::Display for ClientState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Invited => write!(f, "Invited"),
            Self::Inviting => write!(f, "Inviting"),
            Self::Playing => write!(f, "Playing"),
        }
    }
}

// ---------------------------------------------------------------------------
// ClientKey
// ---------------------------------------------------------------------------

/// A generation-checked handle to a registry slot.
///
/// The wire only carries the `ClientId`, which is reused once a slot is
/// freed. The connection that registered a client holds its `ClientKey`
/// instead, so an event arriving late from a previous occupant of the
/// slot (e.g. a disconnect racing a new connect) can be recognised as
/// stale and ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientKey {
    pub id: ClientId,
    pub generation: u32,
}

impl fmt::Display for ClientKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.id, self.generation)
    }
}

// ---------------------------------------------------------------------------
// ClientRecord
// ---------------------------------------------------------------------------

/// The registry's record of one connected client.
///
/// `C` is the control-channel handle the lobby uses to reach the client
/// (an outbound queue sender in the server, `()` in unit tests).
#[derive(Debug, Clone)]
pub struct ClientRecord<C> {
    /// Lobby id: 1-based slot number.
    pub id: ClientId,

    /// Handle used to send frames to this client.
    pub connection: C,

    /// `ip:port` of the client's UDP endpoint, as advertised to peers.
    pub address: String,

    /// Accumulated score.
    pub score: i32,

    /// Current lobby state.
    pub state: ClientState,
}
