//! Plain-text survey report

use std::fmt::{self, Display, Write};

use crate::core::types::{PreferredNetwork, SurveyReport, WirelessReading};

/// Placeholder for attributes the platform did not report
pub const UNAVAILABLE: &str = "(unavailable)";

const SEPARATOR_WIDTH: usize = 50;

/// Renders `None` as [`UNAVAILABLE`]
struct OrUnavailable<'a, T>(&'a Option<T>);

impl<T: Display> Display for OrUnavailable<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(value) => value.fmt(f),
            None => f.write_str(UNAVAILABLE),
        }
    }
}

fn separator(out: &mut String) {
    out.push_str(&"-".repeat(SEPARATOR_WIDTH));
    out.push('\n');
}

/// Render the "Current Network:" section
pub fn format_current(reading: Option<&WirelessReading>) -> String {
    let mut out = String::from("Current Network:\n");
    if let Some(reading) = reading {
        write_current(&mut out, reading).expect("writing to a String cannot fail");
    }
    out
}

fn write_current(out: &mut String, reading: &WirelessReading) -> fmt::Result {
    writeln!(out, "interface: {}", OrUnavailable(&reading.interface))?;
    writeln!(out, "ssid: {}", OrUnavailable(&reading.ssid))?;
    writeln!(out, "bssid: {}", OrUnavailable(&reading.bssid))?;
    writeln!(out, "channel: {}", OrUnavailable(&reading.channel))?;
    writeln!(out, "rssi: {}", reading.rssi)?;
    writeln!(out, "noise: {}", reading.noise)?;
    // Debug keeps the fractional part of whole rates ("1299.0")
    writeln!(out, "tx_rate: {:?}", reading.tx_rate)?;
    writeln!(out, "security_mode: {}", OrUnavailable(&reading.security_mode))
}

/// Render the "Available Networks:" section
pub fn format_available(readings: &[WirelessReading]) -> String {
    let mut out = String::from("Available Networks:\n");
    for reading in readings {
        separator(&mut out);
        write_available(&mut out, reading).expect("writing to a String cannot fail");
    }
    out
}

fn write_available(out: &mut String, reading: &WirelessReading) -> fmt::Result {
    writeln!(out, "ssid: {}", OrUnavailable(&reading.ssid))?;
    writeln!(out, "bssid: {}", OrUnavailable(&reading.bssid))?;
    writeln!(out, "rssi: {}", reading.rssi)?;
    writeln!(out, "channel: {}", OrUnavailable(&reading.channel))?;
    writeln!(out, "is_ibss: {}", reading.is_ibss)?;
    writeln!(out, "noise: {}", reading.noise)?;
    writeln!(out, "country_code: {}", OrUnavailable(&reading.country_code))
}

/// Render the "Preferred Networks:" section
pub fn format_preferred(networks: &[PreferredNetwork]) -> String {
    let mut out = String::from("Preferred Networks:\n");
    for network in networks {
        separator(&mut out);
        write_preferred(&mut out, network).expect("writing to a String cannot fail");
    }
    out
}

fn write_preferred(out: &mut String, network: &PreferredNetwork) -> fmt::Result {
    writeln!(out, "ssid: {}", OrUnavailable(&network.ssid))?;
    writeln!(out, "security_mode: {}", network.security_mode)?;
    writeln!(out, "is_auto_join: {}", OrUnavailable(&network.is_auto_join))?;
    writeln!(out, "last_connected: {}", OrUnavailable(&network.last_connected))
}

/// Render all three sections, separated by blank lines
pub fn format_report(report: &SurveyReport) -> String {
    [
        format_current(report.current.as_ref()),
        format_available(&report.available),
        format_preferred(&report.preferred),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Channel, ChannelBand, ChannelWidth, SecurityMode};
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn my_network() -> WirelessReading {
        WirelessReading {
            interface: Some("en0".into()),
            ssid: Some("MyNetwork".into()),
            bssid: Some("aa:bb:cc:dd:ee:ff".into()),
            channel: Some(Channel {
                number: 36,
                band: ChannelBand::Band5GHz,
                width: ChannelWidth::Width80MHz,
            }),
            rssi: -45,
            noise: -90,
            tx_rate: 1299.0,
            security_mode: Some(SecurityMode::Wpa2Personal),
            country_code: Some("US".into()),
            is_ibss: false,
        }
    }

    /// Parse "key: value" lines of one rendered block
    fn fields(block: &str) -> HashMap<&str, &str> {
        block
            .lines()
            .filter_map(|line| line.split_once(": "))
            .collect()
    }

    fn optional(value: &str) -> Option<String> {
        (value != UNAVAILABLE).then(|| value.to_string())
    }

    fn parse_channel(value: &str) -> Option<Channel> {
        if value == UNAVAILABLE {
            return None;
        }
        let rest = value.strip_prefix("channelNumber=")?;
        let (number, rest) = rest.split_once('(')?;
        let (band, rest) = rest.split_once("), channelWidth={")?;
        let width = rest.strip_suffix('}')?;

        Some(Channel {
            number: number.parse().ok()?,
            band: match band {
                "2GHz" => ChannelBand::Band2GHz,
                "5GHz" => ChannelBand::Band5GHz,
                "6GHz" => ChannelBand::Band6GHz,
                _ => ChannelBand::Unknown,
            },
            width: match width {
                "20MHz" => ChannelWidth::Width20MHz,
                "40MHz" => ChannelWidth::Width40MHz,
                "80MHz" => ChannelWidth::Width80MHz,
                "160MHz" => ChannelWidth::Width160MHz,
                _ => ChannelWidth::Unknown,
            },
        })
    }

    fn parse_security(value: &str) -> Option<SecurityMode> {
        (0..=13)
            .map(SecurityMode::from)
            .find(|mode| mode.to_string() == value)
    }

    fn parse_current(text: &str) -> WirelessReading {
        let fields = fields(text);
        WirelessReading {
            interface: optional(fields["interface"]),
            ssid: optional(fields["ssid"]),
            bssid: optional(fields["bssid"]),
            channel: parse_channel(fields["channel"]),
            rssi: fields["rssi"].parse().unwrap(),
            noise: fields["noise"].parse().unwrap(),
            tx_rate: fields["tx_rate"].parse().unwrap(),
            security_mode: parse_security(fields["security_mode"]),
            country_code: None,
            is_ibss: false,
        }
    }

    #[test]
    fn test_current_network_layout() {
        let expected = "\
Current Network:
interface: en0
ssid: MyNetwork
bssid: aa:bb:cc:dd:ee:ff
channel: channelNumber=36(5GHz), channelWidth={80MHz}
rssi: -45
noise: -90
tx_rate: 1299.0
security_mode: WPA2 Personal
";
        assert_eq!(format_current(Some(&my_network())), expected);
    }

    #[test]
    fn test_current_network_round_trip() {
        let mut reading = my_network();
        // Not part of the current-network block
        reading.country_code = None;

        assert_eq!(parse_current(&format_current(Some(&reading))), reading);

        reading.tx_rate = 144.5;
        reading.rssi = -7;
        reading.noise = 0;
        reading.security_mode = Some(SecurityMode::Wpa3Transition);
        assert_eq!(parse_current(&format_current(Some(&reading))), reading);
    }

    #[test]
    fn test_current_network_redacted_round_trip() {
        let mut reading = my_network();
        reading.ssid = None;
        reading.bssid = None;
        reading.channel = None;
        reading.country_code = None;

        let text = format_current(Some(&reading));
        assert!(text.contains("ssid: (unavailable)\n"));
        assert_eq!(parse_current(&text), reading);
    }

    #[test]
    fn test_available_networks_layout() {
        let mut hidden = my_network();
        hidden.ssid = None;
        hidden.is_ibss = true;
        hidden.country_code = None;
        hidden.channel = Some(Channel {
            number: 6,
            band: ChannelBand::Band2GHz,
            width: ChannelWidth::Width20MHz,
        });

        let expected = "\
Available Networks:
--------------------------------------------------
ssid: MyNetwork
bssid: aa:bb:cc:dd:ee:ff
rssi: -45
channel: channelNumber=36(5GHz), channelWidth={80MHz}
is_ibss: false
noise: -90
country_code: US
--------------------------------------------------
ssid: (unavailable)
bssid: aa:bb:cc:dd:ee:ff
rssi: -45
channel: channelNumber=6(2GHz), channelWidth={20MHz}
is_ibss: true
noise: -90
country_code: (unavailable)
";
        assert_eq!(format_available(&[my_network(), hidden]), expected);
    }

    #[test]
    fn test_full_report() {
        let report = SurveyReport {
            current: None,
            available: vec![],
            preferred: vec![PreferredNetwork {
                ssid: Some("Office".into()),
                security_mode: SecurityMode::Wpa2Enterprise,
                is_auto_join: Some(true),
                last_connected: None,
            }],
        };

        let expected = "\
Current Network:

Available Networks:

Preferred Networks:
--------------------------------------------------
ssid: Office
security_mode: WPA2 Enterprise
is_auto_join: true
last_connected: (unavailable)
";
        assert_eq!(format_report(&report), expected);
    }
}
