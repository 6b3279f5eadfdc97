//! WiFi scan retrier with state machine

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::{
    backend::WifiBackend,
    core::{
        error::{ServiceError, ServiceResult, WifiError},
        types::{ScanState, WirelessReading},
    },
};

/// Delay between attempts while the interface reports busy
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Scan state machine
///
/// Tracks the retry loop of one scan call
#[derive(Debug)]
struct ScanStateMachine {
    state: ScanState,
    attempts: u32,
}

impl ScanStateMachine {
    fn new() -> Self {
        Self {
            state: ScanState::Idle,
            attempts: 0,
        }
    }

    /// Enter `Attempting`, returning the attempt number
    fn begin_attempt(&mut self) -> u32 {
        if matches!(
            self.state,
            ScanState::Idle | ScanState::Succeeded | ScanState::Failed
        ) {
            self.attempts = 0;
        }
        self.state = ScanState::Attempting;
        self.attempts += 1;
        self.attempts
    }

    fn busy(&mut self) {
        self.state = ScanState::BusyWait;
    }

    fn succeed(&mut self) {
        self.state = ScanState::Succeeded;
    }

    fn fail(&mut self) {
        self.state = ScanState::Failed;
    }

    fn state(&self) -> ScanState {
        self.state
    }

    fn attempts(&self) -> u32 {
        self.attempts
    }
}

/// Keep only readings whose SSID equals `ssid`, preserving order
///
/// An absent or empty filter returns the readings unmodified.
pub fn filter_by_ssid(readings: Vec<WirelessReading>, ssid: Option<&str>) -> Vec<WirelessReading> {
    match ssid {
        Some(ssid) if !ssid.is_empty() => readings
            .into_iter()
            .filter(|reading| reading.ssid.as_deref() == Some(ssid))
            .collect(),
        _ => readings,
    }
}

/// WiFi scan retrier
///
/// Retries for as long as the interface reports busy, with a fixed delay and
/// no attempt limit. Any other failure ends the call. The only way out of a
/// busy loop is cancellation.
pub struct ScanService<B: WifiBackend> {
    backend: Arc<B>,
    retry_delay: Duration,
    cancel: CancellationToken,
    state_machine: RwLock<ScanStateMachine>,
}

impl<B: WifiBackend> ScanService<B> {
    /// Create a new scan service with the given backend
    pub fn new(backend: Arc<B>, retry_delay: Duration, cancel: CancellationToken) -> Self {
        Self {
            backend,
            retry_delay,
            cancel,
            state_machine: RwLock::new(ScanStateMachine::new()),
        }
    }

    /// Scan for networks, optionally narrowed to one SSID
    pub async fn scan(&self, filter_ssid: Option<&str>) -> ServiceResult<Vec<WirelessReading>> {
        let filter_ssid = filter_ssid.filter(|ssid| !ssid.is_empty());

        loop {
            if self.cancel.is_cancelled() {
                self.state_machine.write().await.fail();
                return Err(ServiceError::Cancelled);
            }

            let attempt = self.state_machine.write().await.begin_attempt();

            match self.backend.scan(filter_ssid).await {
                Ok(networks) => {
                    self.state_machine.write().await.succeed();
                    debug!(
                        "Scan attempt {} returned {} networks",
                        attempt,
                        networks.len()
                    );
                    return Ok(filter_by_ssid(networks, filter_ssid));
                }
                Err(e) if e.is_transient_busy() => {
                    self.state_machine.write().await.busy();
                    debug!(
                        "Scan attempt {} failed with resource busy, retrying: {}",
                        attempt, e
                    );
                    self.wait_retry().await?;
                }
                Err(e) => return Err(self.fail(attempt, e).await),
            }
        }
    }

    async fn wait_retry(&self) -> ServiceResult<()> {
        tokio::select! {
            _ = self.cancel.cancelled() => {
                self.state_machine.write().await.fail();
                Err(ServiceError::Cancelled)
            }
            _ = tokio::time::sleep(self.retry_delay) => Ok(()),
        }
    }

    async fn fail(&self, attempt: u32, source: WifiError) -> ServiceError {
        self.state_machine.write().await.fail();
        warn!("Scan attempt {} failed: {}", attempt, source);
        ServiceError::Scan { attempt, source }
    }

    /// Get the current scan state
    pub async fn state(&self) -> ScanState {
        self.state_machine.read().await.state()
    }

    /// Number of attempts made by the latest scan call
    pub async fn attempts(&self) -> u32 {
        self.state_machine.read().await.attempts()
    }
}
