//! Domain types for wireless readings

use std::fmt;

use serde::{Deserialize, Serialize};

/// Frequency band of a channel, decoded from `CWChannelBand`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelBand {
    Unknown,
    #[serde(rename = "2ghz")]
    Band2GHz,
    #[serde(rename = "5ghz")]
    Band5GHz,
    #[serde(rename = "6ghz")]
    Band6GHz,
}

impl From<i64> for ChannelBand {
    fn from(raw: i64) -> Self {
        match raw {
            1 => ChannelBand::Band2GHz,
            2 => ChannelBand::Band5GHz,
            3 => ChannelBand::Band6GHz,
            _ => ChannelBand::Unknown,
        }
    }
}

impl fmt::Display for ChannelBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ChannelBand::Unknown => "Unknown",
            ChannelBand::Band2GHz => "2GHz",
            ChannelBand::Band5GHz => "5GHz",
            ChannelBand::Band6GHz => "6GHz",
        };
        f.write_str(label)
    }
}

/// Channel width, decoded from `CWChannelWidth`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelWidth {
    Unknown,
    #[serde(rename = "20mhz")]
    Width20MHz,
    #[serde(rename = "40mhz")]
    Width40MHz,
    #[serde(rename = "80mhz")]
    Width80MHz,
    #[serde(rename = "160mhz")]
    Width160MHz,
}

impl ChannelWidth {
    /// Width in MHz, if known
    pub fn mhz(&self) -> Option<u16> {
        match self {
            ChannelWidth::Unknown => None,
            ChannelWidth::Width20MHz => Some(20),
            ChannelWidth::Width40MHz => Some(40),
            ChannelWidth::Width80MHz => Some(80),
            ChannelWidth::Width160MHz => Some(160),
        }
    }
}

impl From<i64> for ChannelWidth {
    fn from(raw: i64) -> Self {
        match raw {
            1 => ChannelWidth::Width20MHz,
            2 => ChannelWidth::Width40MHz,
            3 => ChannelWidth::Width80MHz,
            4 => ChannelWidth::Width160MHz,
            _ => ChannelWidth::Unknown,
        }
    }
}

/// Channel descriptor of a reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    /// Channel number
    pub number: u16,
    /// Frequency band
    pub band: ChannelBand,
    /// Channel width
    pub width: ChannelWidth,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "channelNumber={}({}), channelWidth={{", self.number, self.band)?;
        match self.width.mhz() {
            Some(mhz) => write!(f, "{}MHz}}", mhz),
            None => f.write_str("Unknown}"),
        }
    }
}

/// Security mode, decoded from `CWSecurity`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityMode {
    None,
    Wep,
    WpaPersonal,
    WpaPersonalMixed,
    Wpa2Personal,
    Personal,
    DynamicWep,
    WpaEnterprise,
    WpaEnterpriseMixed,
    Wpa2Enterprise,
    Enterprise,
    Wpa3Personal,
    Wpa3Enterprise,
    Wpa3Transition,
    Unknown(i64),
}

impl From<i64> for SecurityMode {
    fn from(raw: i64) -> Self {
        match raw {
            0 => SecurityMode::None,
            1 => SecurityMode::Wep,
            2 => SecurityMode::WpaPersonal,
            3 => SecurityMode::WpaPersonalMixed,
            4 => SecurityMode::Wpa2Personal,
            5 => SecurityMode::Personal,
            6 => SecurityMode::DynamicWep,
            7 => SecurityMode::WpaEnterprise,
            8 => SecurityMode::WpaEnterpriseMixed,
            9 => SecurityMode::Wpa2Enterprise,
            10 => SecurityMode::Enterprise,
            11 => SecurityMode::Wpa3Personal,
            12 => SecurityMode::Wpa3Enterprise,
            13 => SecurityMode::Wpa3Transition,
            other => SecurityMode::Unknown(other),
        }
    }
}

impl fmt::Display for SecurityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SecurityMode::None => "None",
            SecurityMode::Wep => "WEP",
            SecurityMode::WpaPersonal => "WPA Personal",
            SecurityMode::WpaPersonalMixed => "WPA/WPA2 Personal",
            SecurityMode::Wpa2Personal => "WPA2 Personal",
            SecurityMode::Personal => "Personal",
            SecurityMode::DynamicWep => "Dynamic WEP",
            SecurityMode::WpaEnterprise => "WPA Enterprise",
            SecurityMode::WpaEnterpriseMixed => "WPA/WPA2 Enterprise",
            SecurityMode::Wpa2Enterprise => "WPA2 Enterprise",
            SecurityMode::Enterprise => "Enterprise",
            SecurityMode::Wpa3Personal => "WPA3 Personal",
            SecurityMode::Wpa3Enterprise => "WPA3 Enterprise",
            SecurityMode::Wpa3Transition => "WPA3 Transition",
            SecurityMode::Unknown(raw) => return write!(f, "Unknown ({})", raw),
        };
        f.write_str(label)
    }
}

/// Snapshot of one network as reported by a single query
///
/// Attributes withheld by the platform (typically SSID and BSSID without
/// location access) are `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WirelessReading {
    /// Interface the reading was taken on
    pub interface: Option<String>,
    /// Network SSID
    pub ssid: Option<String>,
    /// Access point hardware address
    pub bssid: Option<String>,
    pub channel: Option<Channel>,
    /// Signal strength in dBm
    pub rssi: i32,
    /// Noise floor in dBm
    pub noise: i32,
    /// Transmit rate in Mbps
    pub tx_rate: f64,
    pub security_mode: Option<SecurityMode>,
    /// ISO country code advertised by the access point
    pub country_code: Option<String>,
    pub is_ibss: bool,
}

/// A network saved in the host's WiFi configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferredNetwork {
    pub ssid: Option<String>,
    pub security_mode: SecurityMode,
    /// Not every platform release exposes these two
    pub is_auto_join: Option<bool>,
    pub last_connected: Option<String>,
}

/// Location authorization status as reported by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum LocationAuthorization {
    NotDetermined = 0,
    Restricted = 1,
    Denied = 2,
    AuthorizedAlways = 3,
    AuthorizedWhenInUse = 4,
}

impl LocationAuthorization {
    pub fn is_authorized(&self) -> bool {
        matches!(
            self,
            LocationAuthorization::AuthorizedAlways | LocationAuthorization::AuthorizedWhenInUse
        )
    }
}

impl TryFrom<i64> for LocationAuthorization {
    type Error = ();

    fn try_from(value: i64) -> Result<Self, <Self as TryFrom<i64>>::Error> {
        match value {
            0 => Ok(LocationAuthorization::NotDetermined),
            1 => Ok(LocationAuthorization::Restricted),
            2 => Ok(LocationAuthorization::Denied),
            3 => Ok(LocationAuthorization::AuthorizedAlways),
            4 => Ok(LocationAuthorization::AuthorizedWhenInUse),
            _ => Err(()),
        }
    }
}

impl fmt::Display for LocationAuthorization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LocationAuthorization::NotDetermined => "not determined",
            LocationAuthorization::Restricted => "restricted",
            LocationAuthorization::Denied => "denied",
            LocationAuthorization::AuthorizedAlways => "authorized always",
            LocationAuthorization::AuthorizedWhenInUse => "authorized when in use",
        };
        f.write_str(label)
    }
}

/// Cached permission state of the current run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthorizationState {
    #[default]
    Unknown,
    Granted,
    Denied,
}

/// Scan retrier state machine states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum ScanState {
    Idle = 0,
    Attempting = 1,
    BusyWait = 2,
    Succeeded = 3,
    Failed = 4,
}

/// Output of one survey run
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SurveyReport {
    pub current: Option<WirelessReading>,
    pub available: Vec<WirelessReading>,
    pub preferred: Vec<PreferredNetwork>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_display() {
        let channel = Channel {
            number: 36,
            band: ChannelBand::Band5GHz,
            width: ChannelWidth::Width80MHz,
        };
        assert_eq!(
            channel.to_string(),
            "channelNumber=36(5GHz), channelWidth={80MHz}"
        );

        let channel = Channel {
            number: 6,
            band: ChannelBand::Band2GHz,
            width: ChannelWidth::Unknown,
        };
        assert_eq!(channel.to_string(), "channelNumber=6(2GHz), channelWidth={Unknown}");
    }

    #[test]
    fn test_security_mode_labels() {
        assert_eq!(SecurityMode::from(4).to_string(), "WPA2 Personal");
        assert_eq!(SecurityMode::from(0).to_string(), "None");
        assert_eq!(SecurityMode::from(13).to_string(), "WPA3 Transition");
        assert_eq!(SecurityMode::from(42).to_string(), "Unknown (42)");
    }

    #[test]
    fn test_location_authorization_conversion() {
        assert_eq!(
            LocationAuthorization::try_from(4),
            Ok(LocationAuthorization::AuthorizedWhenInUse)
        );
        assert!(LocationAuthorization::try_from(5).is_err());
        assert!(LocationAuthorization::AuthorizedAlways.is_authorized());
        assert!(!LocationAuthorization::NotDetermined.is_authorized());
    }
}
