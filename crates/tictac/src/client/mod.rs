//! Terminal client: connects to the lobby, shows the roster, plays
//! matches peer-to-peer.
//!
//! The reactor multiplexes three sources with `tokio::select!`:
//! lobby frames, keyboard lines and peer datagrams. Every branch is
//! cancel safe: control frames are decoded by a dedicated reader task
//! and arrive through a channel, keyboard lines come from
//! `Lines::next_line`, and datagrams from `PeerLink::recv_move`.

mod session;
mod ui;

pub use session::{Action, ClientSession};

use serde::{Deserialize, Serialize};
use tictac_game::PeerLink;
use tictac_protocol::{ProtocolError, ServerMessage, read_server_message, write_message};
use tictac_transport::{ControlConnection, ControlWriter};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;

use crate::TictacError;

/// Client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// `ip:port` of the lobby server.
    pub server_addr: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_addr: "127.0.0.1:9000".to_string(),
        }
    }
}

/// Runs the client on the process's stdin and stdout.
pub async fn run_client(config: ClientConfig) -> Result<(), TictacError> {
    run_client_with(config, BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await
}

/// Runs the client with the given terminal streams.
///
/// Returns `Ok(())` when the lobby closes the connection or the input
/// ends.
pub async fn run_client_with<I, O>(
    config: ClientConfig,
    input: I,
    mut output: O,
) -> Result<(), TictacError>
where
    I: AsyncBufRead + Unpin,
    O: AsyncWrite + Unpin,
{
    let conn = ControlConnection::connect(&config.server_addr).await?;
    // The peer channel shares the control connection's ip:port, which is
    // the address the lobby advertises to our opponents.
    let local = conn.local_addr()?;
    let link = PeerLink::bind(local).await?;
    tracing::info!(server = %config.server_addr, %local, "connected to lobby");

    let (mut reader, mut writer) = conn.into_split();
    let (frames_tx, mut frames) =
        mpsc::unbounded_channel::<Result<Option<ServerMessage>, ProtocolError>>();
    tokio::spawn(async move {
        loop {
            let frame = read_server_message(&mut reader).await;
            let last = !matches!(frame, Ok(Some(_)));
            if frames_tx.send(frame).is_err() || last {
                break;
            }
        }
    });

    let mut lines = input.lines();
    let mut session = ClientSession::new();
    execute(session.start(), &mut writer, &link, &mut output).await?;

    loop {
        let actions = tokio::select! {
            frame = frames.recv() => match frame {
                Some(Ok(Some(msg))) => session.on_server(msg),
                Some(Ok(None)) | None => {
                    tracing::info!("lobby closed the connection");
                    output.write_all(b"\nThe lobby closed the connection.\n").await?;
                    output.flush().await?;
                    return Ok(());
                }
                Some(Err(e)) => return Err(e.into()),
            },
            line = lines.next_line() => match line? {
                Some(line) => session.on_input(&line),
                None => {
                    tracing::info!("input closed");
                    return Ok(());
                }
            },
            datagram = link.recv_move() => match datagram? {
                (from, Ok(mv)) => session.on_peer_move(from, mv),
                (from, Err(e)) => {
                    tracing::debug!(%from, error = %e, "undecodable datagram dropped");
                    Vec::new()
                }
            },
        };
        execute(actions, &mut writer, &link, &mut output).await?;
    }
}

/// Carries out the session's actions in order.
async fn execute<O>(
    actions: Vec<Action>,
    writer: &mut ControlWriter,
    link: &PeerLink,
    output: &mut O,
) -> Result<(), TictacError>
where
    O: AsyncWrite + Unpin,
{
    for action in actions {
        match action {
            Action::Send(msg) => write_message(writer, &msg).await?,
            Action::SendMove { mv, peer } => link.send_move(mv, peer).await?,
            Action::Print(text) => {
                output.write_all(text.as_bytes()).await?;
                output.flush().await?;
            }
        }
    }
    Ok(())
}

