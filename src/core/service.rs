//! Survey facade tying the permission gate and scan retrier together

use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::{
    backend::WifiBackend,
    core::{
        authorization::AuthorizationService,
        error::{ServiceError, ServiceResult},
        scanner::ScanService,
        types::{PreferredNetwork, SurveyReport, WirelessReading},
    },
};

/// Context of one scanner run
///
/// Owns the authorization cache and the retrier; nothing outlives the run.
pub struct WifiScannerService<B: WifiBackend> {
    backend: Arc<B>,
    pub authorization: AuthorizationService<B>,
    pub scanner: ScanService<B>,
}

impl<B: WifiBackend> WifiScannerService<B> {
    /// Create a new scanner service
    pub fn new(backend: Arc<B>, retry_delay: Duration, cancel: CancellationToken) -> Self {
        let authorization = AuthorizationService::new(backend.clone(), cancel.clone());
        let scanner = ScanService::new(backend.clone(), retry_delay, cancel);

        Self {
            backend,
            authorization,
            scanner,
        }
    }

    /// Check or obtain location access
    pub async fn ensure_authorized(&self) -> ServiceResult<bool> {
        self.authorization.ensure_authorized().await
    }

    /// Read the currently associated network
    pub async fn current_network(&self) -> ServiceResult<WirelessReading> {
        Ok(self.backend.current_network().await?)
    }

    /// Scan for networks in range
    ///
    /// A fatal scan error clears the cached authorization so that a stale
    /// grant is probed again on the next call.
    pub async fn available_networks(
        &self,
        filter_ssid: Option<&str>,
    ) -> ServiceResult<Vec<WirelessReading>> {
        if !self.ensure_authorized().await? {
            error!("Location authorization required for network scanning");
            return Err(ServiceError::AuthorizationDenied);
        }

        match self.scanner.scan(filter_ssid).await {
            Err(e @ ServiceError::Scan { .. }) => {
                self.authorization.reset().await;
                Err(e)
            }
            result => result,
        }
    }

    /// List networks saved on this host
    pub async fn preferred_networks(&self) -> ServiceResult<Vec<PreferredNetwork>> {
        Ok(self.backend.preferred_networks().await?)
    }

    /// Collect the full report: current, available and preferred networks
    ///
    /// Denial aborts before anything is read. Failures reading the current
    /// or preferred networks leave those sections empty.
    pub async fn survey(&self, filter_ssid: Option<&str>) -> ServiceResult<SurveyReport> {
        if !self.ensure_authorized().await? {
            return Err(ServiceError::AuthorizationDenied);
        }

        let current = match self.current_network().await {
            Ok(reading) => Some(reading),
            Err(e) => {
                error!("Error getting current network: {}", e);
                None
            }
        };

        let available = self.available_networks(filter_ssid).await?;
        info!("Found {} available networks", available.len());

        let preferred = self.preferred_networks().await.unwrap_or_else(|e| {
            warn!("Error getting preferred networks: {}", e);
            Vec::new()
        });

        Ok(SurveyReport {
            current,
            available,
            preferred,
        })
    }
}
