use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use echo_proxy::Config;
use log::{error, info, LevelFilter};
use simplelog::{ColorChoice, TermLogger, TerminalMode};
use tokio::net::TcpListener;

/// Local HTTP endpoint that records and echoes every request it receives.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// JSON config file (listen address, block lists, redirects).
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Host name or IP address to listen on. Overrides the config file.
    #[arg(long)]
    host: Option<String>,
    /// Port to listen on. Overrides the config file.
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = TermLogger::init(
        LevelFilter::Info,
        simplelog::Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    );

    let args = Args::parse();
    info!("Loading config");
    let mut config = match &args.config {
        Some(path) => match Config::load(path) {
            Ok(config) => config,
            Err(e) => {
                error!("{e}");
                return ExitCode::FAILURE;
            }
        },
        None => Config::default(),
    };
    if let Some(host) = args.host {
        config.proxy.lhost = host;
    }
    if let Some(port) = args.port {
        config.proxy.lport = port;
    }

    let addr = config.listen_addr();
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Listen on {addr} failed: {e}");
            return ExitCode::FAILURE;
        }
    };
    info!("Server running at: {addr}");
    if let Err(e) = echo_proxy::run(listener, config).await {
        error!("server error: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
