//! Runtime settings

use std::path::PathBuf;
use std::time::Duration;

use crate::config::CliArgs;

/// Runtime configuration settings
#[derive(Debug, Clone)]
pub struct Settings {
    /// SSID filter for available networks; never empty
    pub ssid: Option<String>,
    pub retry_delay: Duration,
    pub json: bool,
    pub swift: PathBuf,
    pub helper_dir: PathBuf,
    pub verbose: bool,
}

impl Settings {
    /// Log filter used when `RUST_LOG` is not set
    pub fn default_log_filter(&self) -> &'static str {
        if self.verbose {
            "info,wifi_scanner=debug"
        } else {
            "info"
        }
    }
}

impl From<CliArgs> for Settings {
    fn from(args: CliArgs) -> Self {
        let helper_dir = args
            .helper_dir
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::temp_dir().join("wifi-scanner"));

        Settings {
            ssid: args.ssid.filter(|ssid| !ssid.is_empty()),
            retry_delay: Duration::from_millis(args.retry_delay_ms),
            json: args.json,
            swift: PathBuf::from(args.swift),
            helper_dir,
            verbose: args.verbose,
        }
    }
}
