//! Logging System
//!
//! Structured logging via the `tracing` crate. Level, format, and output
//! come from the `[logging]` config table, each overridable through
//! `STEAMSHELF_LOG`, `STEAMSHELF_LOG_FORMAT`, and `STEAMSHELF_LOG_OUTPUT`.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Whether logging is enabled (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Log level: trace, debug, info, warn, error, off
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format: json, text (default: text)
    #[serde(default = "default_format")]
    pub format: String,

    /// Output destination: stderr, stdout, file
    #[serde(default = "default_output")]
    pub output: String,

    /// Log file path when output is "file"
    #[serde(default)]
    pub file: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_format() -> String {
    "text".to_string()
}

fn default_output() -> String {
    "stderr".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            level: default_log_level(),
            format: default_format(),
            output: default_output(),
            file: None,
        }
    }
}

/// Initialize the global tracing subscriber.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    if !config.enabled {
        Registry::default().with(EnvFilter::new("off")).init();
        return Ok(());
    }

    let filter = EnvFilter::try_from_env("STEAMSHELF_LOG")
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_str()));
    let format = env_or("STEAMSHELF_LOG_FORMAT", &config.format);
    let output = env_or("STEAMSHELF_LOG_OUTPUT", &config.output);

    if format != "json" && format != "text" {
        bail!("invalid log format: {format} (must be 'json' or 'text')");
    }

    let base = Registry::default().with(filter);
    match output.as_str() {
        "stderr" | "stdout" => {
            let to_stderr = output == "stderr";
            let layer = fmt::layer()
                .with_target(true)
                .with_timer(ChronoUtc::rfc_3339());
            if format == "json" {
                let layer = layer.json();
                if to_stderr {
                    base.with(layer.with_writer(std::io::stderr)).init();
                } else {
                    base.with(layer.with_writer(std::io::stdout)).init();
                }
            } else if to_stderr {
                base.with(layer.with_writer(std::io::stderr)).init();
            } else {
                base.with(layer.with_writer(std::io::stdout)).init();
            }
        }
        "file" => {
            let path = config
                .file
                .clone()
                .context("log output is 'file' but no log file path is set")?;
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create log directory {}", parent.display())
                })?;
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            let layer = fmt::layer()
                .with_target(true)
                .with_timer(ChronoUtc::rfc_3339())
                .with_ansi(false);
            if format == "json" {
                base.with(layer.json().with_writer(file)).init();
            } else {
                base.with(layer.with_writer(file)).init();
            }
        }
        other => bail!("invalid log output: {other} (must be 'stderr', 'stdout', or 'file')"),
    }

    Ok(())
}

fn env_or(var: &str, fallback: &str) -> String {
    std::env::var(var)
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}
