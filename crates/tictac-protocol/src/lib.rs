//! Wire protocol for the tictac lobby.
//!
//! This crate defines the "language" clients and the lobby speak on the
//! control channel:
//!
//! - **Types** ([`ClientMessage`], [`ServerMessage`], [`Roster`], ...):
//!   one sum type per direction, so a frame that is legal client → server
//!   can never be mistaken for its server → client namesake.
//! - **Codec** ([`Encode`], [`read_client_message`],
//!   [`read_server_message`], [`write_message`]): the binary framing.
//! - **Errors** ([`ProtocolError`]).
//!
//! # Frame layout
//!
//! Every frame starts with a one-byte [`Tag`]. Integers are big-endian.
//! Variable-length text is a `u32` length followed by that many UTF-8
//! bytes, with no terminator.
//!
//! ```text
//! ┌─────┬──────────────────────────────┐
//! │ tag │ fixed / length-prefixed body │
//! └─────┴──────────────────────────────┘
//! ```

mod codec;
mod error;
mod types;

pub use codec::{
    Encode, MAX_ADDRESS_LEN, MAX_ROSTER_ENTRIES, read_client_message,
    read_server_message, write_message,
};
pub use error::ProtocolError;
pub use types::{
    ClientId, ClientMessage, Roster, RosterEntry, ServerMessage, Tag,
};
