//! WiFi Scanner - Main Entry Point

use std::sync::Arc;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wifi_scanner::{
    ServiceError,
    backend::CoreWlanBackend,
    config::{CliArgs, Settings},
    core::service::WifiScannerService,
    report,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::from(CliArgs::parse());

    // Logs go to stderr so the report on stdout stays clean
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| settings.default_log_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!(?settings, "Starting WiFi scanner");

    let backend = match CoreWlanBackend::new(settings.swift.clone(), &settings.helper_dir).await {
        Ok(backend) => Arc::new(backend),
        Err(e) => {
            error!("Failed to prepare CoreWLAN helper: {}", e);
            return Err(e.into());
        }
    };

    // Ctrl+C is the only way out of a scan stuck on a busy interface
    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Received SIGINT (Ctrl+C), cancelling");
                cancel.cancel();
            }
        }
    });

    let service = WifiScannerService::new(backend, settings.retry_delay, cancel);

    let report = match service.survey(settings.ssid.as_deref()).await {
        Ok(report) => report,
        Err(ServiceError::AuthorizationDenied) => {
            error!("Location access denied; no networks can be reported");
            error!("Please enable location services for this application in System Settings.");
            return Err(ServiceError::AuthorizationDenied.into());
        }
        Err(e) => {
            error!("Error in WiFi survey: {}", e);
            return Err(e.into());
        }
    };

    if settings.json {
        println!("{}", report::to_json(&report)?);
    } else {
        print!("{}", report::format_report(&report));
    }

    Ok(())
}
