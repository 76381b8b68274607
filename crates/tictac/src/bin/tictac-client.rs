//! `tictac-client <ip> <port>`: joins the lobby at `ip:port`.

use std::process::ExitCode;

use clap::Parser;
use tictac::prelude::*;

#[derive(Parser)]
#[command(name = "tictac-client")]
#[command(about = "Terminal client for the tic-tac-toe lobby")]
struct Args {
    /// Lobby server IP address
    ip: String,

    /// Lobby server port
    port: u16,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();
    // Quiet by default: the terminal belongs to the game screens.
    tictac::init_tracing("warn");

    let config = ClientConfig {
        server_addr: format!("{}:{}", args.ip, args.port),
    };
    match run_client(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("tictac-client: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_ip_and_port_parsed() {
        let args = Args::try_parse_from(["tictac-client", "10.0.0.2", "9000"]).unwrap();
        assert_eq!(args.ip, "10.0.0.2");
        assert_eq!(args.port, 9000);
    }

    #[test]
    fn test_args_missing_port_rejected() {
        assert!(Args::try_parse_from(["tictac-client", "10.0.0.2"]).is_err());
    }
}
