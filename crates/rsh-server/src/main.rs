//! # rsh-server
//!
//! Waits for a remote shell to connect over TCP, then relays operator command
//! lines from stdin to it and copies its output to stdout.
//!
//! ## Architecture
//!
//! This is Layer 2 - the binary that ties together:
//! - rsh-core: framing, scan state, configuration
//! - rsh-session: response scanner and session loop
//!
//! Logs go to stderr so that stdout only carries relayed remote output.

use std::net::SocketAddr;
use std::path::Path;
use std::process::ExitCode;

use anyhow::Context;
use tokio::io::BufReader;
use tracing::{error, info};

use rsh_core::RelayConfig;
use rsh_server::cli::{self, Invocation};
use rsh_server::{signals, Cli, RelayServer};
use rsh_session::{AbortSignal, SessionOptions};

fn main() -> ExitCode {
    let args = match Cli::invocation(std::env::args_os()) {
        Invocation::Run(args) => args,
        Invocation::Version(version) => {
            print!("{version}");
            return ExitCode::SUCCESS;
        }
        Invocation::Usage(reason) => {
            if let Some(reason) = reason {
                eprintln!("{}", reason.trim_end());
            }
            eprint!("{}", cli::usage());
            return ExitCode::FAILURE;
        }
    };

    let config = match load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    init_tracing(&config.server.log_level);

    // Single-threaded: the relay never does two things at once.
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to start runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let code = match runtime.block_on(run(args.port, config)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    };

    // A stdin read may still be parked on a blocking thread.
    runtime.shutdown_background();

    code
}

async fn run(port: u16, config: RelayConfig) -> anyhow::Result<()> {
    let abort = AbortSignal::new();
    signals::install(&abort).context("Failed to install signal handlers")?;

    let addr = SocketAddr::new(config.server.bind_ip()?, port);
    let server = RelayServer::bind(
        addr,
        config.server.backlog,
        SessionOptions::from(&config.protocol),
        abort,
    )
    .context("Failed to set up the server socket")?;

    info!("Starting server on {}...", server.local_addr()?);

    let mut operator = BufReader::new(tokio::io::stdin());
    let mut terminal = tokio::io::stdout();
    server.serve(&mut operator, &mut terminal).await;

    info!("Exiting...");

    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<RelayConfig> {
    match path {
        Some(path) => RelayConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(RelayConfig::default()),
    }
}

fn init_tracing(default_level: &str) {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();
}
