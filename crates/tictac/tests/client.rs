//! End-to-end test: two terminal clients find each other through a real
//! lobby and play a match over UDP.

use std::net::SocketAddr;
use std::time::Duration;

use tictac::client::run_client_with;
use tictac::prelude::*;
use tictac_protocol::{read_server_message, write_message};
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufReader, DuplexStream};
use tokio::task::JoinHandle;
use tokio::time::timeout;

const WAIT: Duration = Duration::from_secs(5);
const YOUR_TURN: &str = "Your turn";
const THEIR_TURN: &str = "Waiting for your opponent's move";

async fn start_server() -> (SocketAddr, LobbyHandle) {
    let server = TictacServer::builder()
        .bind("127.0.0.1:0")
        .lobby_config(LobbyConfig {
            seed: Some(1),
            ..LobbyConfig::default()
        })
        .build()
        .await
        .expect("server should build");
    let addr = server.local_addr().expect("local addr");
    let lobby = server.lobby();
    tokio::spawn(async move {
        let _ = server.run().await;
    });
    (addr, lobby)
}

/// A client driven through in-memory keyboard and screen pipes.
struct Terminal {
    keys: DuplexStream,
    screen: DuplexStream,
    seen: String,
    task: JoinHandle<Result<(), TictacError>>,
}

impl Terminal {
    fn spawn(server: SocketAddr) -> Self {
        let (keys, input) = tokio::io::duplex(4096);
        let (output, screen) = tokio::io::duplex(1 << 16);
        let config = ClientConfig {
            server_addr: server.to_string(),
        };
        let task = tokio::spawn(run_client_with(config, BufReader::new(input), output));
        Self {
            keys,
            screen,
            seen: String::new(),
            task,
        }
    }

    async fn type_line(&mut self, line: &str) {
        self.keys
            .write_all(format!("{line}\n").as_bytes())
            .await
            .expect("keyboard open");
    }

    /// Reads the screen until one of `needles` shows up; consumes the
    /// text up to and including it and returns its index.
    async fn wait_for_any(&mut self, needles: &[&str]) -> usize {
        let mut buf = [0u8; 4096];
        timeout(WAIT, async {
            loop {
                let hit = needles
                    .iter()
                    .enumerate()
                    .filter_map(|(i, n)| self.seen.find(n).map(|at| (at, i, n.len())))
                    .min();
                if let Some((at, i, len)) = hit {
                    self.seen.drain(..at + len);
                    return i;
                }
                let n = self.screen.read(&mut buf).await.expect("screen open");
                assert!(n > 0, "client exited while waiting for {needles:?}");
                self.seen.push_str(&String::from_utf8_lossy(&buf[..n]));
            }
        })
        .await
        .unwrap_or_else(|_| panic!("timed out waiting for {needles:?}; screen: {}", self.seen))
    }

    async fn wait_for(&mut self, needle: &str) {
        self.wait_for_any(&[needle]).await;
    }

    /// Closes the keyboard and waits for the client to exit.
    async fn quit(self) {
        drop(self.keys);
        let result = timeout(WAIT, self.task)
            .await
            .expect("client exits on closed input")
            .expect("client task not panicked");
        assert!(result.is_ok(), "client failed: {result:?}");
    }
}

/// Reads the lobby's roster through a raw connection.
async fn roster_via(addr: SocketAddr) -> Roster {
    let stream = tokio::net::TcpStream::connect(addr).await.expect("connect");
    let (mut reader, mut writer) = stream.into_split();
    write_message(&mut writer, &ClientMessage::UpdateList)
        .await
        .expect("send");
    match read_server_message(&mut reader).await {
        Ok(Some(ServerMessage::UpdateList(roster))) => roster,
        other => panic!("expected roster, got {other:?}"),
    }
}

#[tokio::test]
async fn test_two_clients_play_match_and_winner_scores() {
    let (addr, lobby) = start_server().await;

    let mut alice = Terminal::spawn(addr);
    alice.wait_for("Choose a client").await;
    let mut bob = Terminal::spawn(addr);
    bob.wait_for("Choose a client").await;

    // Bob (id 2) invites Alice (id 1).
    bob.type_line("1").await;
    bob.wait_for("wait for the other client").await;
    alice.wait_for("Game invitation from client 2").await;
    alice.type_line("y").await;

    let alice_turn = alice.wait_for_any(&[YOUR_TURN, THEIR_TURN]).await;
    let bob_turn = bob.wait_for_any(&[YOUR_TURN, THEIR_TURN]).await;
    assert_ne!(alice_turn, bob_turn, "exactly one side moves first");
    let (mut first, mut second, winner_id) = if alice_turn == 0 {
        (alice, bob, ClientId(1))
    } else {
        (bob, alice, ClientId(2))
    };

    // The first player takes the top row.
    let opening = [("1 1", "2 1"), ("1 2", "2 2")];
    for (mine, theirs) in opening {
        first.type_line(mine).await;
        first.wait_for(THEIR_TURN).await;
        second.wait_for(YOUR_TURN).await;
        second.type_line(theirs).await;
        second.wait_for(THEIR_TURN).await;
        first.wait_for(YOUR_TURN).await;
    }
    first.type_line("1 3").await;

    first.wait_for("You won").await;
    second.wait_for("You lost").await;

    timeout(WAIT, async {
        loop {
            if lobby.info().await.expect("lobby alive").playing == 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("both clients reported the result");
    let roster = roster_via(addr).await;
    assert_eq!(roster.get(winner_id).map(|e| e.score), Some(1));
    assert!(roster.entries.iter().all(|e| e.available));

    first.quit().await;
    second.quit().await;
}

#[tokio::test]
async fn test_client_sees_full_lobby() {
    let server = TictacServer::builder()
        .bind("127.0.0.1:0")
        .session_config(SessionConfig { capacity: 1 })
        .build()
        .await
        .expect("server should build");
    let addr = server.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = server.run().await;
    });

    let mut first = Terminal::spawn(addr);
    first.wait_for("Choose a client").await;
    let mut second = Terminal::spawn(addr);

    second.wait_for("The lobby is full").await;
    // The lobby hangs up after the refusal, so the client exits by itself.
    timeout(WAIT, second.task)
        .await
        .expect("refused client exits")
        .expect("client task not panicked")
        .ok();
    first.quit().await;
}
