//! Per-connection handler: registration, frame routing and cleanup.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Register with the lobby → get a `ClientKey`
//!      (a full lobby answers with a bare `Deny` and closes)
//!   2. Spawn a writer task draining the client's outbound queue
//!   3. Loop: read one complete frame → forward it to the lobby actor
//!   4. On EOF or a protocol error, unregister

use tictac_lobby::{LobbyError, LobbyHandle};
use tictac_protocol::{ServerMessage, read_client_message, write_message};
use tictac_session::{ClientKey, SessionError};
use tictac_transport::ControlConnection;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;

use crate::TictacError;

/// Drop guard that unregisters the client when the handler exits.
///
/// Runs on every exit path, including an early `?`. Since `Drop` is
/// synchronous, the async notification is a fire-and-forget task.
struct DisconnectGuard {
    key: ClientKey,
    lobby: LobbyHandle,
}

impl Drop for DisconnectGuard {
    fn drop(&mut self) {
        let key = self.key;
        let lobby = self.lobby.clone();
        tokio::spawn(async move {
            let _ = lobby.disconnect(key).await;
        });
    }
}

/// Handles a single control connection from accept to close.
pub(crate) async fn handle_connection(
    conn: ControlConnection,
    lobby: LobbyHandle,
) -> Result<(), TictacError> {
    let conn_id = conn.id();
    // The accept-time address doubles as the client's UDP endpoint: the
    // client binds its peer channel to the same ip:port.
    let address = conn.peer_addr().to_string();
    let (mut reader, mut writer) = conn.into_split();

    // --- Step 1: Register ---
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();
    let key = match lobby.connect(tx, address.clone()).await {
        Ok(key) => key,
        Err(LobbyError::Session(e @ SessionError::CapacityExceeded { .. })) => {
            tracing::warn!(%conn_id, %address, error = %e, "refusing connection");
            write_message(&mut writer, &ServerMessage::Deny).await?;
            let _ = writer.shutdown().await;
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    let _guard = DisconnectGuard {
        key,
        lobby: lobby.clone(),
    };
    tracing::info!(%conn_id, client_id = %key.id, %address, "client connected");

    // --- Step 2: Writer ---
    // Ends when the lobby drops the client's sender (on unregister) or
    // when the socket stops accepting writes.
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if let Err(e) = write_message(&mut writer, &msg).await {
                tracing::debug!(%conn_id, error = %e, "write failed");
                break;
            }
        }
        let _ = writer.shutdown().await;
    });

    // --- Step 3: Reader ---
    loop {
        match read_client_message(&mut reader).await {
            Ok(Some(msg)) => lobby.send_message(key, msg).await?,
            Ok(None) => {
                tracing::info!(%conn_id, client_id = %key.id, "connection closed");
                break;
            }
            Err(e) => {
                tracing::warn!(%conn_id, client_id = %key.id, error = %e, "dropping client");
                break;
            }
        }
    }

    // _guard drops here → lobby unregisters the client.
    Ok(())
}
