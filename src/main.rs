//! CORS relay.
//!
//! Lets browser code read third-party resources by fetching them on its
//! behalf and adding `Access-Control-Allow-Origin: *` to the reply.
//!
//! ```text
//!   browser ── GET /?u=https://site/feed ──▶ relay ── GET https://site/feed ──▶ upstream
//!   browser ◀── status, headers + CORS, body ── relay ◀── status, headers, body ── upstream
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use cors_relay::config::{load_config, validated, ConfigError, Profile, RelayConfig};
use cors_relay::lifecycle::{signals, Shutdown};
use cors_relay::observability::{logging, metrics};
use cors_relay::HttpServer;

#[derive(Parser)]
#[command(name = "cors-relay")]
#[command(about = "Relay GET requests and add permissive CORS headers", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on (":8080" listens on all interfaces)
    #[arg(long)]
    addr: Option<String>,

    /// Log every requested target URL
    #[arg(short, long)]
    verbose: bool,

    /// Relay profile
    #[arg(long, value_enum)]
    profile: Option<Profile>,

    /// Log level when RUST_LOG is unset
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    /// Command-line values win over the config file.
    fn apply(&self, config: &mut RelayConfig) {
        if let Some(addr) = &self.addr {
            config.listener.bind_address = addr.clone();
        }
        if self.verbose {
            config.observability.verbose = true;
        }
        if let Some(profile) = self.profile {
            config.relay.profile = profile;
        }
        if let Some(level) = &self.log_level {
            config.observability.log_level = level.clone();
        }
    }
}

/// File (or defaults), then command-line overrides, then validation.
fn resolve_config(cli: &Cli) -> Result<RelayConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => RelayConfig::default(),
    };
    cli.apply(&mut config);
    validated(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    logging::init(&config.observability.log_level);

    tracing::info!("cors-relay v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        profile = ?config.relay.profile,
        request_timeout_secs = config.timeouts.request_secs,
        verbose = config.observability.verbose,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(config.listener.socket_address()).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config)?;
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        signals::wait_for_signal().await;
        shutdown.trigger();
    });

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
