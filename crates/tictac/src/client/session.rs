//! The client's state machine.
//!
//! [`ClientSession`] turns the three input sources (lobby frames,
//! keyboard lines, peer moves) into [`Action`]s for the reactor to carry
//! out. It never performs I/O itself.
//!
//! ```text
//!              NewGame(from)                 'y'
//!  Browsing ─────────────────→ Answering ──────────→ Waiting
//!   │  ↑ ↑                        │ other               │
//!   │  │ └────────────────────────┘ (Deny sent)         │ Accept(addr, first)
//!   │  │                                                ▼
//!   │  └── enter ── Acknowledging ←── result ──────── Playing
//!   │                    ↑
//!   └── id ──→ Waiting ──┘ Deny / Expired
//! ```

use std::net::SocketAddr;

use tictac_game::{GameSession, Move};
use tictac_protocol::{ClientId, ClientMessage, Roster, ServerMessage};

use super::ui;

/// Something the reactor must do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Write a frame on the control channel.
    Send(ClientMessage),
    /// Send a move to the peer over the data channel.
    SendMove { mv: Move, peer: SocketAddr },
    /// Write text to the terminal.
    Print(String),
}

#[derive(Debug)]
enum Phase {
    /// The roster is on screen; a line picks a client.
    Browsing,
    /// An invite to `peer` (or an accept of its invite) is in flight.
    Waiting { peer: ClientId },
    /// The invite prompt from `from` is on screen.
    Answering { from: ClientId },
    /// A notice is on screen; enter returns to the roster.
    Acknowledging,
    /// A match is in progress.
    Playing(GameSession),
}

/// Most moves a match can have; bounds the early-move buffer.
const MAX_EARLY_MOVES: usize = 9;

/// Client-side view of the lobby and the current match.
#[derive(Debug)]
pub struct ClientSession {
    phase: Phase,
    roster: Option<Roster>,
    /// Moves that arrived while our own rendezvous was still in flight.
    /// The peer may get its `Accept` first and open the match before we do.
    early_moves: Vec<(SocketAddr, Move)>,
}

impl Default for ClientSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientSession {
    pub fn new() -> Self {
        Self {
            phase: Phase::Browsing,
            roster: None,
            early_moves: Vec::new(),
        }
    }

    /// Actions to run right after connecting.
    pub fn start(&self) -> Vec<Action> {
        vec![Action::Send(ClientMessage::UpdateList)]
    }

    /// The peer's endpoint while a match is in progress.
    pub fn game_peer(&self) -> Option<SocketAddr> {
        match &self.phase {
            Phase::Playing(game) => Some(game.peer()),
            _ => None,
        }
    }

    /// Our own id, once the lobby has told us.
    pub fn my_id(&self) -> Option<ClientId> {
        self.roster.as_ref().map(|r| r.requester)
    }

    // ---------------------------------------------------------------------
    // Lobby frames
    // ---------------------------------------------------------------------

    /// Reacts to one frame from the lobby.
    pub fn on_server(&mut self, msg: ServerMessage) -> Vec<Action> {
        match msg {
            ServerMessage::UpdateList(roster) => {
                let actions = match self.phase {
                    Phase::Browsing => vec![Action::Print(ui::render_roster(&roster))],
                    _ => Vec::new(),
                };
                self.roster = Some(roster);
                actions
            }
            ServerMessage::NewGame { from } => self.on_invite(from),
            ServerMessage::Accept {
                peer_address,
                first,
            } => self.on_rendezvous(&peer_address, first),
            ServerMessage::Deny => match self.phase {
                Phase::Playing(_) | Phase::Answering { .. } => {
                    tracing::debug!("stale deny ignored");
                    Vec::new()
                }
                // Refused before ever receiving a roster: the lobby is full.
                _ if self.roster.is_none() => vec![Action::Print(ui::render_lobby_full())],
                _ => {
                    if let Phase::Waiting { peer } = self.phase {
                        tracing::info!(%peer, "invite declined");
                    }
                    self.early_moves.clear();
                    self.phase = Phase::Acknowledging;
                    vec![Action::Print(ui::render_denied())]
                }
            },
            ServerMessage::Expired { peer } => match self.phase {
                Phase::Playing(_) | Phase::Answering { .. } => {
                    tracing::debug!(%peer, "stale expiry ignored");
                    Vec::new()
                }
                _ => {
                    self.early_moves.clear();
                    self.phase = Phase::Acknowledging;
                    vec![Action::Print(ui::render_expired(peer))]
                }
            },
        }
    }

    fn on_invite(&mut self, from: ClientId) -> Vec<Action> {
        match self.phase {
            Phase::Playing(_) | Phase::Answering { .. } => {
                tracing::info!(%from, "busy, declining invite");
                vec![Action::Send(ClientMessage::Deny { peer: from })]
            }
            _ => {
                self.phase = Phase::Answering { from };
                vec![Action::Print(ui::render_invite(from))]
            }
        }
    }

    fn on_rendezvous(&mut self, peer_address: &str, first: bool) -> Vec<Action> {
        let mut actions = Vec::new();
        match self.phase {
            Phase::Playing(_) => {
                tracing::warn!(peer_address, "rendezvous while playing ignored");
                return actions;
            }
            // An invite still on screen can no longer be honoured.
            Phase::Answering { from } => {
                actions.push(Action::Send(ClientMessage::Deny { peer: from }));
            }
            _ => {}
        }

        let early_moves = std::mem::take(&mut self.early_moves);
        match GameSession::from_rendezvous(peer_address, first) {
            Ok(game) => {
                tracing::info!(peer = %game.peer(), first, "match starting");
                actions.push(Action::Print(ui::render_board(game.board())));
                actions.push(Action::Print(turn_prompt(&game)));
                self.phase = Phase::Playing(game);
                for (from, mv) in early_moves {
                    actions.extend(self.on_peer_move(from, mv));
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "cannot start match");
                actions.push(Action::Send(ClientMessage::FinishGame { score_delta: 0 }));
                actions.push(Action::Print(ui::render_unreachable(peer_address)));
                self.phase = Phase::Acknowledging;
            }
        }
        actions
    }

    // ---------------------------------------------------------------------
    // Keyboard
    // ---------------------------------------------------------------------

    /// Reacts to one line typed by the user (without the newline).
    pub fn on_input(&mut self, line: &str) -> Vec<Action> {
        let line = line.trim();
        match &mut self.phase {
            Phase::Browsing | Phase::Waiting { .. } => self.pick_client(line),
            Phase::Answering { from } => {
                let from = *from;
                if is_yes(line) {
                    self.phase = Phase::Waiting { peer: from };
                    vec![
                        Action::Send(ClientMessage::Accept { peer: from }),
                        Action::Print(ui::render_accepted(from)),
                    ]
                } else {
                    self.phase = Phase::Browsing;
                    vec![
                        Action::Send(ClientMessage::Deny { peer: from }),
                        Action::Send(ClientMessage::UpdateList),
                    ]
                }
            }
            Phase::Acknowledging => {
                self.phase = Phase::Browsing;
                vec![Action::Send(ClientMessage::UpdateList)]
            }
            Phase::Playing(game) => {
                if !game.is_my_turn() {
                    return vec![Action::Print(ui::prompt_wait())];
                }
                let result = line.parse::<Move>().and_then(|mv| {
                    game.play_local(mv)?;
                    Ok(mv)
                });
                match result {
                    Ok(mv) => {
                        let mut actions = vec![
                            Action::SendMove {
                                mv,
                                peer: game.peer(),
                            },
                            Action::Print(ui::render_board(game.board())),
                        ];
                        actions.extend(self.after_move());
                        actions
                    }
                    Err(e) => vec![
                        Action::Print(format!("[invalid cell] {e}\n")),
                        Action::Print(ui::prompt_move(game.local_mark())),
                    ],
                }
            }
        }
    }

    fn pick_client(&mut self, line: &str) -> Vec<Action> {
        if line.is_empty() || line == "0" {
            self.phase = Phase::Browsing;
            return vec![Action::Send(ClientMessage::UpdateList)];
        }

        let me = self.my_id();
        let known = line.parse::<u32>().ok().map(ClientId).filter(|&id| {
            Some(id) != me
                && self
                    .roster
                    .as_ref()
                    .is_some_and(|r| r.get(id).is_some())
        });

        match known {
            Some(peer) => {
                self.phase = Phase::Waiting { peer };
                vec![
                    Action::Send(ClientMessage::NewGame { peer }),
                    Action::Print(ui::render_waiting(peer)),
                ]
            }
            None => {
                self.phase = Phase::Acknowledging;
                vec![Action::Print(ui::render_invalid_client())]
            }
        }
    }

    // ---------------------------------------------------------------------
    // Peer moves
    // ---------------------------------------------------------------------

    /// Reacts to a move datagram. Datagrams from anyone but the current
    /// peer are ignored.
    ///
    /// While an invite or accept is in flight, moves are kept and replayed
    /// once the rendezvous names the peer.
    pub fn on_peer_move(&mut self, from: SocketAddr, mv: Move) -> Vec<Action> {
        let game = match &mut self.phase {
            Phase::Playing(game) => game,
            Phase::Waiting { .. } | Phase::Answering { .. } => {
                if self.early_moves.len() < MAX_EARLY_MOVES {
                    tracing::debug!(%from, %mv, "move before rendezvous kept");
                    self.early_moves.push((from, mv));
                } else {
                    tracing::debug!(%from, %mv, "early move buffer full, move dropped");
                }
                return Vec::new();
            }
            _ => {
                tracing::debug!(%from, "move outside a match ignored");
                return Vec::new();
            }
        };
        if from != game.peer() {
            tracing::debug!(%from, expected = %game.peer(), "move from stranger ignored");
            return Vec::new();
        }
        if let Err(e) = game.apply_remote(mv) {
            tracing::warn!(%from, %mv, error = %e, "invalid peer move ignored");
            return Vec::new();
        }

        let mut actions = vec![Action::Print(ui::render_board(game.board()))];
        actions.extend(self.after_move());
        actions
    }

    /// Either reports the finished match or prompts for the next turn.
    fn after_move(&mut self) -> Vec<Action> {
        let Phase::Playing(game) = &self.phase else {
            return Vec::new();
        };
        match game.result() {
            Some(result) => {
                tracing::info!(?result, "match over");
                self.phase = Phase::Acknowledging;
                vec![
                    Action::Send(ClientMessage::FinishGame {
                        score_delta: result.score_delta(),
                    }),
                    Action::Print(ui::render_result(result)),
                ]
            }
            None => vec![Action::Print(turn_prompt(game))],
        }
    }
}

fn turn_prompt(game: &GameSession) -> String {
    if game.is_my_turn() {
        ui::prompt_move(game.local_mark())
    } else {
        ui::prompt_wait()
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(
        answer.to_ascii_lowercase().as_str(),
        "s" | "y" | "yes" | "sim"
    )
}
