//! Lobby actor: the one Tokio task that owns the registry.
//!
//! Connection handlers never touch the registry. They send commands
//! through a [`LobbyHandle`]; the actor applies them one at a time, so a
//! check-then-mark sequence inside [`Matchmaker::handle`] can never
//! interleave with another client's frame.

use tictac_protocol::{ClientMessage, ServerMessage};
use tictac_session::{ClientKey, SessionConfig};
use tokio::sync::{mpsc, oneshot};

use crate::{LobbyConfig, LobbyError, Matchmaker, Outbound};

/// Channel sender delivering frames to one client's writer task.
pub type ClientSender = mpsc::UnboundedSender<ServerMessage>;

/// Commands sent to the lobby actor through its channel.
///
/// The `oneshot::Sender` in some variants is a reply channel: the caller
/// sends a command and waits for the response on it.
enum LobbyCommand {
    /// Register a new client.
    Connect {
        sender: ClientSender,
        address: String,
        reply: oneshot::Sender<Result<ClientKey, LobbyError>>,
    },

    /// Deliver a control frame from a client.
    Inbound { key: ClientKey, msg: ClientMessage },

    /// The client's control connection closed.
    Disconnect { key: ClientKey },

    /// Request lobby metadata.
    Info { reply: oneshot::Sender<LobbyInfo> },

    /// Stop the actor.
    Shutdown,
}

/// A snapshot of lobby metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LobbyInfo {
    /// Number of connected clients.
    pub clients: usize,
    /// Number of clients currently in a match.
    pub playing: usize,
    /// Maximum number of clients.
    pub capacity: usize,
}

/// Handle to the running lobby actor.
///
/// Cheap to clone; every connection handler holds one.
#[derive(Clone)]
pub struct LobbyHandle {
    sender: mpsc::Sender<LobbyCommand>,
}

impl LobbyHandle {
    /// Registers a client whose frames are delivered through `sender`.
    ///
    /// # Errors
    /// [`LobbyError::Session`] with `CapacityExceeded` when the lobby is
    /// full, [`LobbyError::Unavailable`] if the actor has stopped.
    pub async fn connect(
        &self,
        sender: ClientSender,
        address: String,
    ) -> Result<ClientKey, LobbyError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(LobbyCommand::Connect {
                sender,
                address,
                reply: reply_tx,
            })
            .await
            .map_err(|_| LobbyError::Unavailable)?;
        reply_rx.await.map_err(|_| LobbyError::Unavailable)?
    }

    /// Forwards a control frame (fire-and-forget).
    pub async fn send_message(
        &self,
        key: ClientKey,
        msg: ClientMessage,
    ) -> Result<(), LobbyError> {
        self.sender
            .send(LobbyCommand::Inbound { key, msg })
            .await
            .map_err(|_| LobbyError::Unavailable)
    }

    /// Reports that the client's connection closed.
    pub async fn disconnect(&self, key: ClientKey) -> Result<(), LobbyError> {
        self.sender
            .send(LobbyCommand::Disconnect { key })
            .await
            .map_err(|_| LobbyError::Unavailable)
    }

    /// Requests the current lobby metadata.
    pub async fn info(&self) -> Result<LobbyInfo, LobbyError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(LobbyCommand::Info { reply: reply_tx })
            .await
            .map_err(|_| LobbyError::Unavailable)?;
        reply_rx.await.map_err(|_| LobbyError::Unavailable)
    }

    /// Tells the actor to stop.
    pub async fn shutdown(&self) -> Result<(), LobbyError> {
        self.sender
            .send(LobbyCommand::Shutdown)
            .await
            .map_err(|_| LobbyError::Unavailable)
    }
}

/// The internal actor state. Runs inside a Tokio task.
struct LobbyActor {
    matchmaker: Matchmaker<ClientSender>,
    receiver: mpsc::Receiver<LobbyCommand>,
}

impl LobbyActor {
    /// Runs the actor loop, processing commands until shutdown or until
    /// every handle is dropped.
    async fn run(mut self) {
        tracing::info!(
            capacity = self.matchmaker.registry().capacity(),
            "lobby actor started"
        );

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                LobbyCommand::Connect {
                    sender,
                    address,
                    reply,
                } => {
                    let result = self
                        .matchmaker
                        .connect(sender, address)
                        .map_err(LobbyError::from);
                    if let Err(e) = &result {
                        tracing::warn!(error = %e, "connection refused");
                    }
                    let _ = reply.send(result);
                }
                LobbyCommand::Inbound { key, msg } => {
                    tracing::debug!(client = %key, tag = %msg.tag(), "frame received");
                    let out = self.matchmaker.handle(key, msg);
                    self.dispatch(out);
                }
                LobbyCommand::Disconnect { key } => {
                    self.matchmaker.disconnect(key);
                }
                LobbyCommand::Info { reply } => {
                    let _ = reply.send(self.info());
                }
                LobbyCommand::Shutdown => {
                    tracing::info!("lobby shutting down");
                    break;
                }
            }
        }

        tracing::info!("lobby actor stopped");
    }

    /// Queues each frame on its recipient's writer. Silently drops frames
    /// for a client whose writer is gone (it is disconnecting).
    fn dispatch(&self, out: Vec<Outbound>) {
        for Outbound { to, msg } in out {
            match self.matchmaker.registry().get(to) {
                Some(record) => {
                    let _ = record.connection.send(msg);
                }
                None => {
                    tracing::debug!(client_id = %to, "recipient gone, frame dropped");
                }
            }
        }
    }

    fn info(&self) -> LobbyInfo {
        let registry = self.matchmaker.registry();
        LobbyInfo {
            clients: registry.len(),
            playing: registry.playing_count(),
            capacity: registry.capacity(),
        }
    }
}

/// Spawns the lobby actor task and returns a handle to it.
///
/// `lobby.channel_size` controls backpressure: if the channel fills up,
/// senders wait (bounded channel).
pub fn spawn_lobby(session: SessionConfig, lobby: LobbyConfig) -> LobbyHandle {
    let (tx, rx) = mpsc::channel(lobby.channel_size);

    let matchmaker = match lobby.seed {
        Some(seed) => Matchmaker::with_seed(session, seed),
        None => Matchmaker::new(session),
    };

    let actor = LobbyActor {
        matchmaker,
        receiver: rx,
    };

    tokio::spawn(actor.run());

    LobbyHandle { sender: tx }
}
