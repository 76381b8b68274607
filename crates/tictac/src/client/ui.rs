//! Terminal screens. Every function returns the text to print; nothing
//! here touches stdout.

use std::fmt::Write as _;

use tictac_game::{Board, GameResult, Mark};
use tictac_protocol::{ClientId, Roster, RosterEntry};

const CLEAR: &str = "\x1b[2J\x1b[1;1H";
const RULE: &str = "************************************************************";

fn status(entry: &RosterEntry) -> &'static str {
    if entry.available { "available" } else { "busy" }
}

/// A cleared screen with a boxed message and an optional footer line.
fn banner(lines: &[&str], footer: Option<&str>) -> String {
    let mut out = String::from(CLEAR);
    let _ = writeln!(out, "{RULE}");
    for line in lines {
        let _ = writeln!(out, "* {line:<56} *");
    }
    if let Some(footer) = footer {
        let _ = writeln!(out, "* {footer:<56} *");
    }
    let _ = writeln!(out, "{RULE}\n");
    out
}

const BACK: &str = "Press enter to return to the client list.";

/// The lobby screen: own credentials, then everyone else.
pub fn render_roster(roster: &Roster) -> String {
    let mut out = String::from(CLEAR);

    let _ = writeln!(out, "{RULE}\n* {:<56} *\n{RULE}", "My credentials");
    match roster.me() {
        Some(me) => {
            let _ = writeln!(out, "*   id: {}", me.id.0);
            let _ = writeln!(out, "*   address: {}", me.address);
            let _ = writeln!(out, "*   score: {}", me.score);
            let _ = writeln!(out, "*   status: {}", status(me));
        }
        None => {
            let _ = writeln!(out, "*   id: {}", roster.requester.0);
        }
    }
    let _ = writeln!(out, "{RULE}\n");

    let _ = writeln!(out, "{RULE}\n* {:<56} *\n{RULE}", "Client list");
    let mut any = false;
    for entry in roster.others() {
        any = true;
        let _ = writeln!(out, "* Client {}", entry.id.0);
        let _ = writeln!(out, "*   address: {}", entry.address);
        let _ = writeln!(out, "*   score: {}", entry.score);
        let _ = writeln!(out, "*   status: {}", status(entry));
        let _ = writeln!(out, "{RULE}");
    }
    if !any {
        let _ = writeln!(out, "* {:^56} *\n{RULE}", "Empty");
    }

    out.push_str("\nChoose a client ('enter' to refresh the list): ");
    out
}

pub fn render_invite(from: ClientId) -> String {
    let mut out = banner(&[format!("Game invitation from client {}", from.0).as_str()], None);
    out.push_str("Do you accept? ('y' or 'n'): ");
    out
}

pub fn render_waiting(peer: ClientId) -> String {
    banner(
        &[
            format!("You chose client {}", peer.0).as_str(),
            "Now wait for the other client to answer",
        ],
        None,
    )
}

pub fn render_accepted(peer: ClientId) -> String {
    banner(
        &[format!("You accepted the invitation from client {}", peer.0).as_str()],
        Some("Waiting for the match to start..."),
    )
}

pub fn render_denied() -> String {
    banner(&["The other player declined the invitation."], Some(BACK))
}

pub fn render_expired(peer: ClientId) -> String {
    banner(
        &[format!("The invitation from client {} is no longer valid.", peer.0).as_str()],
        Some(BACK),
    )
}

pub fn render_lobby_full() -> String {
    banner(&["The lobby is full. Try again later."], None)
}

pub fn render_invalid_client() -> String {
    banner(&["You chose an invalid client."], Some(BACK))
}

pub fn render_unreachable(address: &str) -> String {
    banner(
        &[format!("Could not start the match: bad peer address {address:?}").as_str()],
        Some(BACK),
    )
}

pub fn render_result(result: GameResult) -> String {
    let text = match result {
        GameResult::Win => "Congratulations! You won the game!",
        GameResult::Loss => "Sorry! You lost the game!",
        GameResult::Draw => "Meh! The game ended in a draw!",
    };
    banner(&[text], Some(BACK))
}

/// The grid, top row first.
pub fn render_board(board: &Board) -> String {
    let mut out = String::from(CLEAR);
    out.push_str(" --- --- ---\n");
    for row in board.rows() {
        for cell in row {
            let symbol = cell.map_or(' ', Mark::symbol);
            let _ = write!(out, "| {symbol} ");
        }
        out.push_str("|\n --- --- ---\n");
    }
    out
}

pub fn prompt_move(mark: Mark) -> String {
    format!("Your turn (your symbol is '{mark}'). Enter line and column in [1, 3]: ")
}

pub fn prompt_wait() -> String {
    "Waiting for your opponent's move...\n".to_string()
}
