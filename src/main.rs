//! sshebra binary entry point.

use std::process::ExitCode;

use sshebra::cli::{parse_args, print_help, print_version};
use sshebra::config::Config;
use sshebra::transport::TcpServer;
use sshebra::{logging, ShellServer};
use tokio::net::TcpListener;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> ExitCode {
    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("error: {}", e);
            eprintln!("Try 'sshebra --help' for more information.");
            return ExitCode::from(2);
        }
    };

    if args.help {
        print_help();
        return ExitCode::SUCCESS;
    }
    if args.version {
        print_version();
        return ExitCode::SUCCESS;
    }

    let config = match Config::load(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = logging::init_with_filter(config.log_filter()) {
        eprintln!("warning: logging not initialized: {}", e);
    }
    info!("sshebra v{}", env!("CARGO_PKG_VERSION"));

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = config.bind_address()?;

    let registry = config.build_registry();
    info!(commands = ?registry.names(), "Command registry ready");
    let shell = ShellServer::new(registry.freeze());

    let keys = config.key_store();
    if keys.is_empty() {
        warn!("No access keys configured; every client will be refused");
    }

    let listener = TcpListener::bind(addr).await?;
    TcpServer::new(shell, keys)
        .with_handshake_timeout(config.handshake_timeout())
        .serve_with_shutdown(listener, shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // No signal handler available; run until the process is killed.
        std::future::pending::<()>().await;
    }
}
