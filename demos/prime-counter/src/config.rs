//! Command line and logging setup

use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::lookup::{LookupConfig, DEFAULT_API_URL};

/// Counter with prime favorites and an nth-prime lookup
#[derive(Parser, Debug)]
#[command(name = "prime-counter")]
#[command(about = "A counter TUI built on scope-dispatch")]
pub struct Args {
    /// Initial counter value
    #[arg(long, short, default_value = "0", allow_negative_numbers = true)]
    pub start: i64,

    /// Wolfram|Alpha app id; without one the offline sieve is used
    #[arg(long, env = "WOLFRAM_APP_ID", hide_env_values = true)]
    pub app_id: Option<String>,

    /// Wolfram|Alpha query endpoint
    #[arg(long, default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Never touch the network
    #[arg(long)]
    pub offline: bool,

    /// Lookup timeout in seconds
    #[arg(long, default_value = "10")]
    pub timeout_secs: u64,

    /// Write logs here (filter with RUST_LOG)
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Args {
    pub fn lookup_config(&self) -> LookupConfig {
        LookupConfig {
            api_url: self.api_url.clone(),
            app_id: self.app_id.clone(),
            offline: self.offline,
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

/// Send logs to `path`, if given
///
/// The terminal belongs to the UI, so without a file nothing is logged.
pub fn init_logging(path: Option<&PathBuf>) -> anyhow::Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = File::create(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install logger: {e}"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["prime-counter"]).unwrap();
        assert_eq!(args.start, 0);
        assert!(!args.offline);

        let config = args.lookup_config();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_flags_map_to_lookup_config() {
        let args = Args::try_parse_from([
            "prime-counter",
            "--start",
            "-3",
            "--app-id",
            "KEY",
            "--offline",
            "--timeout-secs",
            "2",
        ])
        .unwrap();
        assert_eq!(args.start, -3);

        let config = args.lookup_config();
        assert_eq!(config.app_id.as_deref(), Some("KEY"));
        assert!(config.offline);
        assert_eq!(config.timeout, Duration::from_secs(2));
    }
}
