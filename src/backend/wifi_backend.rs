//! WiFi backend trait definition

use tokio::sync::oneshot;
use trait_variant::make;

use crate::core::error::WifiResult;
use crate::core::types::{LocationAuthorization, PreferredNetwork, WirelessReading};

/// Abstraction over the host wireless subsystem (CoreWLAN + CoreLocation)
///
/// This trait enables testing by allowing mock implementations
/// while keeping the platform calls behind a single seam.
#[make(Send)]
pub trait WifiBackend: Sync + 'static {
    /// Enumerate networks in range
    ///
    /// `ssid` is passed to the platform as a directed-scan hint; callers
    /// still filter the results themselves. A scan may fail transiently
    /// while the radio is busy.
    async fn scan(&self, ssid: Option<&str>) -> WifiResult<Vec<WirelessReading>>;

    /// Read the network the interface is currently associated with
    async fn current_network(&self) -> WifiResult<WirelessReading>;

    /// List networks saved in the host's WiFi configuration
    async fn preferred_networks(&self) -> WifiResult<Vec<PreferredNetwork>>;

    /// Read the current location authorization status
    async fn authorization_status(&self) -> WifiResult<LocationAuthorization>;

    /// Ask the platform for location access
    ///
    /// The returned receiver resolves once the operator answers the prompt.
    /// It is dropped without a value if the platform never decides.
    async fn request_authorization(&self) -> WifiResult<oneshot::Receiver<LocationAuthorization>>;
}
