//! Matchmaking for the tictac lobby.
//!
//! The [`Matchmaker`] is the rules: it reads one control frame, checks
//! and updates the registry, and says which frames go where. The lobby
//! actor ([`spawn_lobby`], [`LobbyHandle`]) is the runtime around it: a
//! single Tokio task that owns the matchmaker and serialises every
//! registry mutation.
//!
//! # Key types
//!
//! - [`Matchmaker`]: pure state machine, unit-testable without sockets
//! - [`LobbyHandle`]: send commands to the running actor
//! - [`LobbyConfig`]: channel size and coin-flip seed

mod actor;
mod config;
mod error;
mod matchmaker;

pub use actor::{ClientSender, LobbyHandle, LobbyInfo, spawn_lobby};
pub use config::LobbyConfig;
pub use error::LobbyError;
pub use matchmaker::{Matchmaker, Outbound};
