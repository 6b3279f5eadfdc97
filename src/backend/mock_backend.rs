//! Mock WiFi backend for testing

use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{Mutex, oneshot};

use crate::backend::WifiBackend;
use crate::core::error::{WifiError, WifiResult};
use crate::core::types::{LocationAuthorization, PreferredNetwork, WirelessReading};

/// Internal state for the mock backend
#[derive(Debug)]
struct MockState {
    scan_results: Vec<WirelessReading>,
    scan_script: VecDeque<WifiError>,
    scan_calls: u32,
    current: Option<WirelessReading>,
    preferred: Vec<PreferredNetwork>,
    authorization: LocationAuthorization,
    decision: Option<LocationAuthorization>,
    pending_decision: Option<oneshot::Sender<LocationAuthorization>>,
    authorization_requests: u32,
}

/// Mock WiFi backend for testing
///
/// Allows configuring behavior for tests without requiring actual hardware.
/// Scripted scan failures are returned in order before the configured
/// results.
#[derive(Debug, Clone)]
pub struct MockWifiBackend {
    inner: Arc<Mutex<MockState>>,
}

impl MockWifiBackend {
    /// Create a new mock backend with default state
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockState {
                scan_results: vec![],
                scan_script: VecDeque::new(),
                scan_calls: 0,
                current: None,
                preferred: vec![],
                authorization: LocationAuthorization::AuthorizedWhenInUse,
                decision: None,
                pending_decision: None,
                authorization_requests: 0,
            })),
        }
    }

    /// Configure mock to return specific networks on scan
    pub async fn set_scan_results(&self, networks: Vec<WirelessReading>) {
        self.inner.lock().await.scan_results = networks;
    }

    /// Queue a failure returned by the next scan call
    pub async fn push_scan_failure(&self, error: WifiError) {
        self.inner.lock().await.scan_script.push_back(error);
    }

    /// Queue `count` transient busy failures
    pub async fn push_busy(&self, count: usize) {
        let mut state = self.inner.lock().await;
        for _ in 0..count {
            state.scan_script.push_back(WifiError::busy());
        }
    }

    /// Number of scan calls received so far
    pub async fn scan_calls(&self) -> u32 {
        self.inner.lock().await.scan_calls
    }

    pub async fn set_current_network(&self, reading: Option<WirelessReading>) {
        self.inner.lock().await.current = reading;
    }

    pub async fn set_preferred_networks(&self, networks: Vec<PreferredNetwork>) {
        self.inner.lock().await.preferred = networks;
    }

    /// Configure the status reported by `authorization_status`
    pub async fn set_authorization(&self, status: LocationAuthorization) {
        self.inner.lock().await.authorization = status;
    }

    /// Configure the answer given immediately to authorization requests
    ///
    /// With no decision configured, requests stay pending until
    /// [`MockWifiBackend::decide`] is called.
    pub async fn set_decision(&self, decision: Option<LocationAuthorization>) {
        self.inner.lock().await.decision = decision;
    }

    /// Simulate the operator answering a pending prompt
    pub async fn decide(&self, decision: LocationAuthorization) {
        let mut state = self.inner.lock().await;
        state.authorization = decision;
        if let Some(sender) = state.pending_decision.take() {
            let _ = sender.send(decision);
        }
    }

    /// Simulate the platform dropping a pending prompt without an answer
    pub async fn abandon_request(&self) {
        self.inner.lock().await.pending_decision = None;
    }

    /// Number of authorization prompts requested so far
    pub async fn authorization_requests(&self) -> u32 {
        self.inner.lock().await.authorization_requests
    }
}

impl Default for MockWifiBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl WifiBackend for MockWifiBackend {
    async fn scan(&self, _ssid: Option<&str>) -> WifiResult<Vec<WirelessReading>> {
        let mut state = self.inner.lock().await;
        state.scan_calls += 1;
        match state.scan_script.pop_front() {
            Some(error) => Err(error),
            None => Ok(state.scan_results.clone()),
        }
    }

    async fn current_network(&self) -> WifiResult<WirelessReading> {
        self.inner
            .lock()
            .await
            .current
            .clone()
            .ok_or(WifiError::NoInterface)
    }

    async fn preferred_networks(&self) -> WifiResult<Vec<PreferredNetwork>> {
        Ok(self.inner.lock().await.preferred.clone())
    }

    async fn authorization_status(&self) -> WifiResult<LocationAuthorization> {
        Ok(self.inner.lock().await.authorization)
    }

    async fn request_authorization(&self) -> WifiResult<oneshot::Receiver<LocationAuthorization>> {
        let mut state = self.inner.lock().await;
        state.authorization_requests += 1;

        let (sender, receiver) = oneshot::channel();
        match state.decision {
            Some(decision) => {
                state.authorization = decision;
                let _ = sender.send(decision);
            }
            None => state.pending_decision = Some(sender),
        }
        Ok(receiver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(ssid: &str) -> WirelessReading {
        WirelessReading {
            interface: None,
            ssid: Some(ssid.into()),
            bssid: Some("aa:bb:cc:dd:ee:ff".into()),
            channel: None,
            rssi: -65,
            noise: -92,
            tx_rate: 0.0,
            security_mode: None,
            country_code: None,
            is_ibss: false,
        }
    }

    #[tokio::test]
    async fn test_mock_backend_scan() {
        let backend = MockWifiBackend::new();

        // Initially empty
        let results = backend.scan(None).await.unwrap();
        assert_eq!(results.len(), 0);

        backend.set_scan_results(vec![reading("TestNetwork")]).await;

        let results = backend.scan(None).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].ssid.as_deref(), Some("TestNetwork"));
        assert_eq!(backend.scan_calls().await, 2);
    }

    #[tokio::test]
    async fn test_mock_backend_scripted_failures() {
        let backend = MockWifiBackend::new();
        backend.set_scan_results(vec![reading("TestNetwork")]).await;
        backend.push_busy(2).await;

        assert!(backend.scan(None).await.unwrap_err().is_transient_busy());
        assert!(backend.scan(None).await.unwrap_err().is_transient_busy());
        assert_eq!(backend.scan(None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_mock_backend_pending_decision() {
        let backend = MockWifiBackend::new();
        backend
            .set_authorization(LocationAuthorization::NotDetermined)
            .await;

        let receiver = backend.request_authorization().await.unwrap();
        backend.decide(LocationAuthorization::Denied).await;

        assert_eq!(receiver.await.unwrap(), LocationAuthorization::Denied);
        assert_eq!(
            backend.authorization_status().await.unwrap(),
            LocationAuthorization::Denied
        );
        assert_eq!(backend.authorization_requests().await, 1);
    }

    #[tokio::test]
    async fn test_mock_backend_current_network_missing() {
        let backend = MockWifiBackend::new();
        assert!(backend.current_network().await.is_err());
    }
}
