//! TCP control channel: the listener the lobby accepts on and the stream
//! each client keeps open for its whole session.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::io::BufReader;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};

use crate::{ConnectionId, TransportError};

/// Counter for generating unique connection IDs.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Buffered read half of a control connection.
pub type ControlReader = BufReader<OwnedReadHalf>;

/// Write half of a control connection.
pub type ControlWriter = OwnedWriteHalf;

/// Passive TCP socket the lobby server accepts control connections on.
pub struct ControlListener {
    listener: TcpListener,
}

impl ControlListener {
    /// Binds the listener to `addr` (e.g. `"0.0.0.0:9000"`).
    pub async fn bind(addr: &str) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr).await.map_err(|source| {
            TransportError::BindFailed {
                addr: addr.to_string(),
                source,
            }
        })?;
        tracing::info!(addr, "control listener bound");
        Ok(Self { listener })
    }

    /// Returns the address the listener is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, TransportError> {
        self.listener
            .local_addr()
            .map_err(TransportError::AddressUnavailable)
    }

    /// Waits for and accepts the next control connection.
    pub async fn accept(&self) -> Result<ControlConnection, TransportError> {
        let (stream, peer) = self
            .listener
            .accept()
            .await
            .map_err(TransportError::AcceptFailed)?;
        let conn = ControlConnection::from_stream(stream, peer);
        tracing::debug!(conn_id = %conn.id, %peer, "accepted control connection");
        Ok(conn)
    }
}

/// One end of a control channel.
pub struct ControlConnection {
    id: ConnectionId,
    stream: TcpStream,
    peer_addr: SocketAddr,
}

impl ControlConnection {
    /// Opens a control connection to the lobby at `addr`.
    pub async fn connect(addr: &str) -> Result<Self, TransportError> {
        let stream = TcpStream::connect(addr).await.map_err(|source| {
            TransportError::ConnectFailed {
                addr: addr.to_string(),
                source,
            }
        })?;
        let peer = stream
            .peer_addr()
            .map_err(TransportError::AddressUnavailable)?;
        Ok(Self::from_stream(stream, peer))
    }

    fn from_stream(stream: TcpStream, peer_addr: SocketAddr) -> Self {
        // Frames are small and latency matters more than throughput.
        if let Err(e) = stream.set_nodelay(true) {
            tracing::debug!(error = %e, "could not disable Nagle");
        }
        Self {
            id: ConnectionId(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed)),
            stream,
            peer_addr,
        }
    }

    /// Returns the unique identifier for this connection.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Address of the remote end.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    /// Address of the local end. Clients bind their UDP peer channel here.
    pub fn local_addr(&self) -> Result<SocketAddr, TransportError> {
        self.stream
            .local_addr()
            .map_err(TransportError::AddressUnavailable)
    }

    /// Splits the connection into independently owned halves so reading
    /// and writing can live in different tasks.
    pub fn into_split(self) -> (ControlReader, ControlWriter) {
        let (read, write) = self.stream.into_split();
        (BufReader::new(read), write)
    }
}
