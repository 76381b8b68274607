//! Client session registry for the tictac lobby.
//!
//! The [`Registry`] is the single source of truth for who is connected:
//! each live client has one [`ClientRecord`] holding its control-channel
//! handle, its peer-facing address, its score and its [`ClientState`].
//!
//! # How it fits in the stack
//!
//! ```text
//! Lobby (above)     ← matchmaking reads and mutates the registry
//!     ↕
//! Session (this crate)  ← identity, availability, scores
//!     ↕
//! Protocol (below)  ← provides ClientId, Roster
//! ```
//!
//! The registry is not thread-safe by itself. It is owned by the lobby
//! actor and only ever touched from that one task.

mod error;
mod registry;
mod session;

pub use error::SessionError;
pub use registry::Registry;
pub use session::{ClientKey, ClientRecord, ClientState, SessionConfig};
