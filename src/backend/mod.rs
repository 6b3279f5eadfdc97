//! WiFi backend abstraction layer

pub mod corewlan_backend;
pub mod mock_backend;
pub mod wifi_backend;

pub use corewlan_backend::CoreWlanBackend;
pub use wifi_backend::WifiBackend;

#[cfg(test)]
pub use mock_backend::MockWifiBackend;
