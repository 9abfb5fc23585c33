//! Logging setup for the client.
//!
//! The terminal UI owns the screen, so in that mode log output goes to a
//! file instead of stderr. Records from the `log` facade used by
//! `dice_duel` are forwarded into `tracing` as well.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::{
    EnvFilter, fmt::writer::BoxMakeWriter, layer::SubscriberExt, util::SubscriberInitExt,
};

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info,tungstenite=warn,reqwest=warn";

/// Where log lines are written.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum LogTarget {
    Stderr,
    File(PathBuf),
}

/// Initialize logging with a `RUST_LOG` controlled filter
///
/// # Errors
///
/// Fails if the log file can't be opened or a global subscriber is
/// already installed.
///
/// # Example
///
/// ```no_run
/// use dd_client::logging::{self, LogTarget};
///
/// logging::init(&LogTarget::Stderr).unwrap();
/// tracing::info!("Client starting");
/// ```
pub fn init(target: &LogTarget) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let (writer, ansi) = match target {
        LogTarget::Stderr => (BoxMakeWriter::new(std::io::stderr), true),
        LogTarget::File(path) => {
            let file = open_log_file(path)?;
            (BoxMakeWriter::new(Mutex::new(file)), false)
        }
    };

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(ansi)
        .with_writer(writer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .context("Failed to install the log subscriber")?;

    tracing::debug!(?target, "Logging initialized");
    Ok(())
}

fn open_log_file(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))
}

/// Log a server message the client could not make sense of
///
/// # Example
///
/// ```
/// use dd_client::logging::log_protocol_anomaly;
///
/// log_protocol_anomaly("194659", "unknown message kind 'hello'", r#"{"message": "hello"}"#);
/// ```
pub fn log_protocol_anomaly(game_id: &str, reason: &str, raw: &str) {
    tracing::warn!(game_id = game_id, raw = raw, "PROTOCOL: {}", reason);
}

/// Log a slow HTTP call
pub fn log_request(operation: &str, duration_ms: u64) {
    if duration_ms > 1000 {
        tracing::warn!(
            operation = operation,
            duration_ms = duration_ms,
            "Slow request"
        );
    } else {
        tracing::debug!(
            operation = operation,
            duration_ms = duration_ms,
            "Request finished"
        );
    }
}
