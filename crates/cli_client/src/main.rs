//! Kaliterm terminal client
//! Line-editing front end for a Kaliterm backend session

mod keys;
mod raw_mode;
mod render;
mod repl;

use anyhow::{Context, Result};
use clap::Parser;
use kaliterm_core::SessionConfig;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Kaliterm - AI-assisted command terminal
#[derive(Parser, Debug)]
#[command(name = "kaliterm")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Terminal client for a Kaliterm backend", long_about = None)]
struct Args {
    /// Backend URL: an http(s) origin or a full ws(s) endpoint
    #[arg(short, long, env = "KALITERM_BACKEND_URL", default_value = "http://127.0.0.1:8000")]
    backend: String,

    /// Reconnection attempts before giving up
    #[arg(long, env = "KALITERM_MAX_RETRIES", default_value_t = 5)]
    max_retries: u32,

    /// Fixed delay between reconnection attempts (ms)
    #[arg(long, env = "KALITERM_RECONNECT_DELAY_MS", default_value_t = 3000)]
    reconnect_delay_ms: u64,

    /// Connect and handshake timeout per attempt (ms)
    #[arg(long, env = "KALITERM_CONNECT_TIMEOUT_MS", default_value_t = 10_000)]
    connect_timeout_ms: u64,

    /// System stats poll period (ms), 0 disables polling
    #[arg(long, env = "KALITERM_STATS_INTERVAL_MS", default_value_t = 5000)]
    stats_interval_ms: u64,

    /// Working path shown in the prompt and sent with AI queries
    #[arg(long, env = "KALITERM_WORKING_PATH", default_value = "~")]
    path: String,

    /// Disable command suggestions
    #[arg(long, default_value_t = false)]
    no_suggestions: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "KALITERM_LOG_LEVEL", default_value = "warn")]
    log_level: String,

    /// Write logs to this file instead of stderr
    #[arg(long, env = "KALITERM_LOG_FILE")]
    log_file: Option<PathBuf>,

    /// Read whole lines from stdin instead of raw key events
    #[arg(long, default_value_t = false)]
    no_raw: bool,
}

impl Args {
    fn session_config(&self) -> SessionConfig {
        SessionConfig {
            backend_url: self.backend.clone(),
            max_retries: self.max_retries,
            reconnect_delay_ms: self.reconnect_delay_ms,
            connect_timeout_ms: self.connect_timeout_ms,
            stats_interval_ms: self.stats_interval_ms,
            working_path: self.path.clone(),
            suggestions_enabled: !self.no_suggestions,
            ..Default::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize rustls CryptoProvider with ring backend (needed for wss://)
    let _ = rustls::crypto::ring::default_provider().install_default();

    let args = Args::parse();

    setup_logging(&args.log_level, args.log_file.as_deref())?;

    info!("Starting Kaliterm v{}", env!("CARGO_PKG_VERSION"));

    let config = args.session_config();
    let working_path = config.working_path.clone();
    let (handle, events) = kaliterm_core::spawn(config).context("Failed to start session")?;

    let interactive = !args.no_raw && std::io::stdin().is_terminal();
    let guard = if interactive {
        match raw_mode::RawModeGuard::enable() {
            Ok(guard) => Some(guard),
            Err(e) => {
                warn!("Raw mode not available: {}. Falling back to line input.", e);
                None
            }
        }
    } else {
        None
    };

    let outcome = match guard {
        Some(_guard) => repl::run_raw(&handle, events, &working_path).await,
        None => repl::run_lines(&handle, events).await,
    };

    // Already closed when the loop ended on its own
    let _ = handle.close().await;
    handle.closed().await;

    info!("Kaliterm stopped");
    outcome
}

/// Setup tracing subscriber
///
/// `RUST_LOG` wins over `level`. With a log file, nothing is written to
/// stderr so logs never interleave with the prompt.
fn setup_logging(level: &str, log_file: Option<&Path>) -> Result<()> {
    let log_level = level.parse::<Level>().unwrap_or(Level::WARN);

    let filter = EnvFilter::builder()
        .with_default_directive(log_level.into())
        .from_env_lossy();

    let file_layer = match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            Some(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        }
        None => None,
    };
    let stderr_layer = file_layer
        .is_none()
        .then(|| fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .init();

    Ok(())
}
