//! Permission gate for location-derived wireless data
//!
//! macOS only reveals SSIDs and BSSIDs to processes holding location access.
//! The gate probes once per run and caches the outcome.

use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::{
    backend::WifiBackend,
    core::{
        error::{ServiceError, ServiceResult},
        types::{AuthorizationState, LocationAuthorization},
    },
};

/// Authorization gate in front of scanning
///
/// The cached state lives for the run that owns the gate. A denial is terminal
/// for the run; [`AuthorizationService::reset`] forces the next call to
/// probe again.
pub struct AuthorizationService<B: WifiBackend> {
    backend: Arc<B>,
    state: RwLock<AuthorizationState>,
    cancel: CancellationToken,
}

impl<B: WifiBackend> AuthorizationService<B> {
    /// Create a new gate with an unknown authorization state
    pub fn new(backend: Arc<B>, cancel: CancellationToken) -> Self {
        Self {
            backend,
            state: RwLock::new(AuthorizationState::Unknown),
            cancel,
        }
    }

    /// Make sure the process may read wireless data
    ///
    /// Returns `Ok(false)` only when access was denied. A pending platform
    /// request is awaited until the operator answers or the run is cancelled.
    pub async fn ensure_authorized(&self) -> ServiceResult<bool> {
        match *self.state.read().await {
            AuthorizationState::Granted => return Ok(true),
            AuthorizationState::Denied => return Ok(false),
            AuthorizationState::Unknown => {}
        }

        // A trial scan is the cheapest way to find out whether access is held
        match self.backend.scan(None).await {
            Ok(_) => {
                info!("Location services already authorized - WiFi scanning working");
                return Ok(self.settle(true).await);
            }
            Err(e) if !e.is_not_authorized() => {
                debug!("Trial scan failed without an authorization error: {}", e);
                return Ok(self.settle(true).await);
            }
            Err(e) => debug!("Trial scan not authorized: {}", e),
        }

        let status = self.backend.authorization_status().await?;
        let status = if status == LocationAuthorization::NotDetermined {
            info!("Requesting location authorization...");
            self.await_decision().await?
        } else {
            status
        };

        if status.is_authorized() {
            info!("Location services authorized ({})", status);
            Ok(self.settle(true).await)
        } else {
            error!("Location services not authorized ({})", status);
            error!("Please enable location services for this application in System Settings.");
            Ok(self.settle(false).await)
        }
    }

    /// Block on the platform's one-shot authorization callback
    async fn await_decision(&self) -> ServiceResult<LocationAuthorization> {
        let decision = self.backend.request_authorization().await?;

        let status = tokio::select! {
            _ = self.cancel.cancelled() => return Err(ServiceError::Cancelled),
            decided = decision => decided.map_err(|_| ServiceError::AuthorizationAborted)?,
        };

        info!("Location authorization status changed to: {}", status);
        Ok(status)
    }

    async fn settle(&self, granted: bool) -> bool {
        *self.state.write().await = if granted {
            AuthorizationState::Granted
        } else {
            AuthorizationState::Denied
        };
        granted
    }

    /// Forget the cached state so the next call probes again
    pub async fn reset(&self) {
        *self.state.write().await = AuthorizationState::Unknown;
    }

    /// Get current authorization state
    pub async fn state(&self) -> AuthorizationState {
        *self.state.read().await
    }

    #[cfg(test)]
    async fn set_state(&self, state: AuthorizationState) {
        *self.state.write().await = state;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockWifiBackend;
    use crate::core::error::WifiError;
    use std::time::Duration;
    use tokio_test::{assert_err, assert_ok};

    fn gate(backend: &Arc<MockWifiBackend>) -> AuthorizationService<MockWifiBackend> {
        AuthorizationService::new(backend.clone(), CancellationToken::new())
    }

    #[tokio::test]
    async fn test_trial_scan_success_grants() {
        let backend = Arc::new(MockWifiBackend::new());
        let service = gate(&backend);

        assert!(assert_ok!(service.ensure_authorized().await));
        assert_eq!(service.state().await, AuthorizationState::Granted);
        assert_eq!(backend.scan_calls().await, 1);
        assert_eq!(backend.authorization_requests().await, 0);
    }

    #[tokio::test]
    async fn test_already_granted_skips_probe() {
        let backend = Arc::new(MockWifiBackend::new());
        let service = gate(&backend);
        service.set_state(AuthorizationState::Granted).await;

        assert!(service.ensure_authorized().await.unwrap());
        assert_eq!(backend.scan_calls().await, 0);
        assert_eq!(backend.authorization_requests().await, 0);
    }

    #[tokio::test]
    async fn test_second_call_uses_cache() {
        let backend = Arc::new(MockWifiBackend::new());
        let service = gate(&backend);

        assert!(service.ensure_authorized().await.unwrap());
        assert!(service.ensure_authorized().await.unwrap());
        assert_eq!(backend.scan_calls().await, 1);
    }

    #[tokio::test]
    async fn test_other_trial_error_grants() {
        let backend = Arc::new(MockWifiBackend::new());
        backend.push_busy(1).await;
        let service = gate(&backend);

        assert!(service.ensure_authorized().await.unwrap());
        assert_eq!(service.state().await, AuthorizationState::Granted);
    }

    #[tokio::test]
    async fn test_denied_returns_false() {
        let backend = Arc::new(MockWifiBackend::new());
        backend.push_scan_failure(WifiError::NotAuthorized).await;
        backend.set_authorization(LocationAuthorization::Denied).await;
        let service = gate(&backend);

        assert!(!service.ensure_authorized().await.unwrap());
        assert_eq!(service.state().await, AuthorizationState::Denied);

        // Denial is terminal: no further probe or prompt
        assert!(!service.ensure_authorized().await.unwrap());
        assert_eq!(backend.scan_calls().await, 1);
        assert_eq!(backend.authorization_requests().await, 0);
    }

    #[tokio::test]
    async fn test_restricted_returns_false() {
        let backend = Arc::new(MockWifiBackend::new());
        backend.push_scan_failure(WifiError::NotAuthorized).await;
        backend
            .set_authorization(LocationAuthorization::Restricted)
            .await;
        let service = gate(&backend);

        assert!(!service.ensure_authorized().await.unwrap());
    }

    #[tokio::test]
    async fn test_system_settings_authorization_grants() {
        let backend = Arc::new(MockWifiBackend::new());
        backend.push_scan_failure(WifiError::NotAuthorized).await;
        backend
            .set_authorization(LocationAuthorization::AuthorizedAlways)
            .await;
        let service = gate(&backend);

        assert!(service.ensure_authorized().await.unwrap());
        assert_eq!(backend.authorization_requests().await, 0);
    }

    #[tokio::test]
    async fn test_pending_request_granted() {
        let backend = Arc::new(MockWifiBackend::new());
        backend.push_scan_failure(WifiError::NotAuthorized).await;
        backend
            .set_authorization(LocationAuthorization::NotDetermined)
            .await;
        backend
            .set_decision(Some(LocationAuthorization::AuthorizedWhenInUse))
            .await;
        let service = gate(&backend);

        assert!(service.ensure_authorized().await.unwrap());
        assert_eq!(backend.authorization_requests().await, 1);
        assert_eq!(service.state().await, AuthorizationState::Granted);
    }

    #[tokio::test]
    async fn test_pending_request_answered_later() {
        let backend = Arc::new(MockWifiBackend::new());
        backend.push_scan_failure(WifiError::NotAuthorized).await;
        backend
            .set_authorization(LocationAuthorization::NotDetermined)
            .await;
        let service = Arc::new(gate(&backend));

        let waiting = tokio::spawn({
            let service = service.clone();
            async move { service.ensure_authorized().await }
        });

        while backend.authorization_requests().await == 0 {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        backend.decide(LocationAuthorization::Denied).await;

        assert!(!waiting.await.unwrap().unwrap());
        assert_eq!(service.state().await, AuthorizationState::Denied);
    }

    #[tokio::test]
    async fn test_abandoned_request() {
        let backend = Arc::new(MockWifiBackend::new());
        backend.push_scan_failure(WifiError::NotAuthorized).await;
        backend
            .set_authorization(LocationAuthorization::NotDetermined)
            .await;
        let service = Arc::new(gate(&backend));

        let waiting = tokio::spawn({
            let service = service.clone();
            async move { service.ensure_authorized().await }
        });

        while backend.authorization_requests().await == 0 {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        backend.abandon_request().await;

        let result = waiting.await.unwrap();
        assert!(matches!(result, Err(ServiceError::AuthorizationAborted)));
        assert_eq!(service.state().await, AuthorizationState::Unknown);
    }

    #[tokio::test]
    async fn test_cancel_pending_request() {
        let backend = Arc::new(MockWifiBackend::new());
        backend.push_scan_failure(WifiError::NotAuthorized).await;
        backend
            .set_authorization(LocationAuthorization::NotDetermined)
            .await;
        let cancel = CancellationToken::new();
        let service = AuthorizationService::new(backend.clone(), cancel.clone());

        cancel.cancel();
        let result = assert_err!(service.ensure_authorized().await);
        assert!(matches!(result, ServiceError::Cancelled));
    }

    #[tokio::test]
    async fn test_reset_forces_new_probe() {
        let backend = Arc::new(MockWifiBackend::new());
        let service = gate(&backend);

        service.ensure_authorized().await.unwrap();
        service.reset().await;
        assert_eq!(service.state().await, AuthorizationState::Unknown);

        service.ensure_authorized().await.unwrap();
        assert_eq!(backend.scan_calls().await, 2);
    }
}
