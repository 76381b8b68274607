//! `tictac-server <port>`: runs the lobby on all interfaces.

use std::process::ExitCode;

use clap::Parser;
use tictac::prelude::*;

#[derive(Parser)]
#[command(name = "tictac-server")]
#[command(about = "Tic-tac-toe matchmaking lobby")]
struct Args {
    /// TCP port to accept clients on
    port: u16,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();
    tictac::init_tracing("info");

    match serve(args.port).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("tictac-server: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn serve(port: u16) -> Result<(), TictacError> {
    let server = TictacServer::builder()
        .bind(&format!("0.0.0.0:{port}"))
        .build()
        .await?;
    server.run().await
}
