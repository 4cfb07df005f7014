//! # certeasy - server entry point
//!
//! Parses flags (each also readable from the environment), installs tracing,
//! opens the issuer registry and serves the REST API.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use certeasy::AppState;
use certeasy_core::{IssuerRegistry, RegistryConfig};

/// CertEasy issuer registry server
#[derive(Parser, Debug)]
#[command(name = "certeasy", version, about, long_about = None)]
struct Cli {
    /// Directory holding one subdirectory per issuer
    #[arg(long, env = "CERTEASY_DATA_DIR", default_value = "data")]
    data_dir: PathBuf,

    /// Address to listen on
    #[arg(long, env = "CERTEASY_BIND", default_value = "127.0.0.1:8080")]
    bind: SocketAddr,

    /// Upper bound on a single certificate generation, in seconds
    #[arg(long, env = "CERTEASY_GENERATION_TIMEOUT_SECS", default_value_t = 30)]
    generation_timeout_secs: u64,

    /// Emit logs as JSON lines
    #[arg(long, env = "CERTEASY_LOG_JSON")]
    log_json: bool,

    /// Create the data directory if it does not exist
    #[arg(long, env = "CERTEASY_CREATE_DATA_DIR")]
    create_data_dir: bool,
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.with_target(false).init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    if cli.create_data_dir {
        std::fs::create_dir_all(&cli.data_dir).map_err(|e| {
            tracing::error!("Cannot create data directory {}: {e}", cli.data_dir.display());
            e
        })?;
    }

    let config = RegistryConfig::new(&cli.data_dir)
        .with_generation_timeout(Duration::from_secs(cli.generation_timeout_secs));
    let registry = IssuerRegistry::new(&config).map_err(|e| {
        tracing::error!("Registry initialization failed: {e}");
        e
    })?;

    let app = certeasy::app(AppState::new(registry));

    tracing::info!("CertEasy listening on {}", cli.bind);
    let listener = tokio::net::TcpListener::bind(cli.bind).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
