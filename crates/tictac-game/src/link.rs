//! The peer-to-peer data channel carrying turns.

use std::net::SocketAddr;

use tictac_transport::PeerChannel;

use crate::{GameError, Move};

/// UDP endpoint a client advertises to the lobby and plays its matches on.
///
/// The link is bound once, on the same ip:port as the client's control
/// connection, and reused for every match. Delivery is best effort: a
/// lost datagram is never resent.
pub struct PeerLink {
    channel: PeerChannel,
}

impl PeerLink {
    /// Binds the link to `local`.
    pub async fn bind(local: SocketAddr) -> Result<Self, GameError> {
        let channel = PeerChannel::bind(local).await?;
        Ok(Self { channel })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, GameError> {
        Ok(self.channel.local_addr()?)
    }

    /// Sends one move to `peer`.
    pub async fn send_move(&self, mv: Move, peer: SocketAddr) -> Result<(), GameError> {
        self.channel.send_to(&mv.to_wire(), peer).await?;
        tracing::debug!(%peer, %mv, "move sent");
        Ok(())
    }

    /// Waits for the next datagram and decodes it as a move.
    ///
    /// The outer `Result` fails only if the socket does. The inner one
    /// carries a decode error for a datagram that was not a valid move,
    /// so the caller can drop it and keep listening.
    ///
    /// Cancel safe.
    pub async fn recv_move(
        &self,
    ) -> Result<(SocketAddr, Result<Move, GameError>), GameError> {
        let (data, from) = self.channel.recv_from().await?;
        Ok((from, Move::from_wire(&data)))
    }
}
