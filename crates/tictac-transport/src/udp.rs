//! UDP data channel between two matched clients.

use std::net::SocketAddr;

use tokio::net::UdpSocket;

use crate::TransportError;

/// Largest datagram the channel will read. Turn messages are a few bytes.
pub const MAX_DATAGRAM: usize = 512;

/// Connectionless endpoint used for the peer-to-peer game traffic.
///
/// No retries or acknowledgements: a lost datagram stays lost.
pub struct PeerChannel {
    socket: UdpSocket,
}

impl PeerChannel {
    /// Binds the channel to `addr`.
    pub async fn bind(addr: SocketAddr) -> Result<Self, TransportError> {
        let socket = UdpSocket::bind(addr).await.map_err(|source| {
            TransportError::BindFailed {
                addr: addr.to_string(),
                source,
            }
        })?;
        tracing::debug!(%addr, "peer channel bound");
        Ok(Self { socket })
    }

    /// Returns the address the channel is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, TransportError> {
        self.socket
            .local_addr()
            .map_err(TransportError::AddressUnavailable)
    }

    /// Sends one datagram to `peer`.
    pub async fn send_to(
        &self,
        data: &[u8],
        peer: SocketAddr,
    ) -> Result<(), TransportError> {
        self.socket
            .send_to(data, peer)
            .await
            .map_err(TransportError::SendFailed)?;
        Ok(())
    }

    /// Receives the next datagram and its source address.
    ///
    /// Cancel safe: no data is lost if the future is dropped before it
    /// completes, so it can sit in a `tokio::select!` branch.
    pub async fn recv_from(
        &self,
    ) -> Result<(Vec<u8>, SocketAddr), TransportError> {
        let mut buf = [0u8; MAX_DATAGRAM];
        let (n, from) = self
            .socket
            .recv_from(&mut buf)
            .await
            .map_err(TransportError::ReceiveFailed)?;
        Ok((buf[..n].to_vec(), from))
    }
}
