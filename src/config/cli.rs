//! Command-line argument parsing

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[clap(name = "wifi-scanner", version, author)]
#[clap(about = "Report the current, available and preferred WiFi networks")]
pub struct CliArgs {
    /// Only list available networks with exactly this SSID
    pub ssid: Option<String>,

    /// Delay between scan attempts while the interface is busy (milliseconds)
    #[clap(long, default_value = "1000")]
    pub retry_delay_ms: u64,

    /// Print the report as JSON
    #[clap(long)]
    pub json: bool,

    /// Swift interpreter used to run the CoreWLAN helper
    #[clap(long, default_value = "swift")]
    pub swift: String,

    /// Directory the CoreWLAN helper script is installed into
    #[clap(long)]
    pub helper_dir: Option<String>,

    /// Enable debug logging
    #[clap(short, long)]
    pub verbose: bool,
}
