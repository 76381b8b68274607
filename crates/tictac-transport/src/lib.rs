//! Transport primitives for the tictac lobby.
//!
//! Two channels exist between the processes:
//!
//! - the **control channel** ([`ControlListener`], [`ControlConnection`]):
//!   one TCP stream per client, kept open for the whole lobby session;
//! - the **data channel** ([`PeerChannel`]): a UDP socket each client binds
//!   on the same ip:port as its control connection, used to exchange turns
//!   directly with a matched peer.
//!
//! This crate only moves bytes. Framing lives in `tictac-protocol`.

mod error;
mod tcp;
mod udp;

pub use error::TransportError;
pub use tcp::{ControlConnection, ControlListener, ControlReader, ControlWriter};
pub use udp::{MAX_DATAGRAM, PeerChannel};

use std::fmt;

/// Process-unique number of a control connection. Only used to tell
/// connections apart in logs; the lobby identifies clients by slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(pub u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}
