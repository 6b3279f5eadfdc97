//! CoreWLAN backend implementation
//!
//! CoreWLAN and CoreLocation have no stable C ABI, so the platform calls live
//! in a small Swift helper that is installed next to the run and executed
//! with `swift`. Every helper invocation prints one JSON line: either the
//! payload or `{"error": {"domain": .., "code": .., "message": ..}}`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, de::DeserializeOwned};
use tokio::process::Command;
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::{
    backend::WifiBackend,
    core::{
        error::{WifiError, WifiResult},
        types::{
            Channel, LocationAuthorization, PreferredNetwork, SecurityMode, WirelessReading,
        },
    },
};

/// File name of the installed helper script
pub const HELPER_SCRIPT_NAME: &str = "wifi-scanner-helper.swift";

/// Error domain used by the helper for its own failures
const HELPER_ERROR_DOMAIN: &str = "wifi-scanner.helper";
const HELPER_NO_INTERFACE: i64 = 1;

const HELPER_SCRIPT: &str = r#"
import CoreLocation
import CoreWLAN
import Foundation

func emit(_ object: Any) {
    if let data = try? JSONSerialization.data(withJSONObject: object, options: []),
       let text = String(data: data, encoding: .utf8) {
        print(text)
    }
}

func fail(_ domain: String, _ code: Int, _ message: String) -> Never {
    emit(["error": ["domain": domain, "code": code, "message": message]])
    exit(0)
}

func orNull(_ value: Any?) -> Any {
    return value ?? NSNull()
}

func channel(_ channel: CWChannel?) -> Any {
    guard let channel = channel else { return NSNull() }
    return [
        "number": channel.channelNumber,
        "band": channel.channelBand.rawValue,
        "width": channel.channelWidth.rawValue,
    ]
}

func wifiInterface() -> CWInterface {
    guard let interface = CWWiFiClient.shared().interface() else {
        fail("wifi-scanner.helper", 1, "No WiFi interface available")
    }
    return interface
}

final class AuthDelegate: NSObject, CLLocationManagerDelegate {
    func locationManager(_ manager: CLLocationManager, didChangeAuthorization status: CLAuthorizationStatus) {
        if status != .notDetermined {
            emit(["status": Int(status.rawValue)])
            exit(0)
        }
    }
}

let arguments = CommandLine.arguments.dropFirst()
switch arguments.first {
case "scan":
    let interface = wifiInterface()
    let ssid = arguments.dropFirst().first.flatMap { $0.data(using: .utf8) }
    do {
        let networks = try interface.scanForNetworks(withSSID: ssid)
        let readings: [Any] = networks
            .sorted { $0.rssiValue > $1.rssiValue }
            .map { network in
                [
                    "ssid": orNull(network.ssid),
                    "bssid": orNull(network.bssid),
                    "channel": channel(network.wlanChannel),
                    "rssi": network.rssiValue,
                    "noise": network.noiseMeasurement,
                    "country_code": orNull(network.countryCode),
                    "ibss": network.ibss,
                ]
            }
        emit(["networks": readings])
    } catch {
        let error = error as NSError
        fail(error.domain, error.code, error.localizedDescription)
    }
case "current":
    let interface = wifiInterface()
    emit([
        "interface": orNull(interface.interfaceName),
        "ssid": orNull(interface.ssid()),
        "bssid": orNull(interface.bssid()),
        "channel": channel(interface.wlanChannel()),
        "rssi": interface.rssiValue(),
        "noise": interface.noiseMeasurement(),
        "tx_rate": interface.transmitRate(),
        "security": interface.security().rawValue,
        "country_code": orNull(interface.countryCode()),
    ])
case "preferred":
    let interface = wifiInterface()
    var profiles: [Any] = []
    for case let profile as CWNetworkProfile in interface.configuration()?.networkProfiles ?? [] {
        profiles.append([
            "ssid": orNull(profile.ssid),
            "security": profile.security.rawValue,
        ])
    }
    emit(["networks": profiles])
case "auth-status":
    emit(["status": Int(CLLocationManager.authorizationStatus().rawValue)])
case "request-auth":
    let manager = CLLocationManager()
    let delegate = AuthDelegate()
    manager.delegate = delegate
    manager.requestWhenInUseAuthorization()
    RunLoop.main.run()
default:
    fail("wifi-scanner.helper", 2, "unknown command")
}
"#;

#[derive(Debug, Deserialize)]
struct HelperError {
    domain: String,
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum HelperReply<T> {
    Failure { error: HelperError },
    Success(T),
}

#[derive(Debug, Deserialize)]
struct RawChannel {
    number: u16,
    band: i64,
    width: i64,
}

#[derive(Debug, Deserialize)]
struct RawReading {
    interface: Option<String>,
    ssid: Option<String>,
    bssid: Option<String>,
    channel: Option<RawChannel>,
    rssi: i32,
    noise: i32,
    #[serde(default)]
    tx_rate: f64,
    security: Option<i64>,
    country_code: Option<String>,
    #[serde(default)]
    ibss: bool,
}

impl From<RawReading> for WirelessReading {
    fn from(raw: RawReading) -> Self {
        WirelessReading {
            interface: raw.interface,
            ssid: raw.ssid,
            bssid: raw.bssid,
            channel: raw.channel.map(|c| Channel {
                number: c.number,
                band: c.band.into(),
                width: c.width.into(),
            }),
            rssi: raw.rssi,
            noise: raw.noise,
            tx_rate: raw.tx_rate,
            security_mode: raw.security.map(SecurityMode::from),
            country_code: raw.country_code,
            is_ibss: raw.ibss,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawPreferred {
    ssid: Option<String>,
    security: i64,
    #[serde(default)]
    auto_join: Option<bool>,
    #[serde(default)]
    last_connected: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NetworkList<T> {
    networks: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct StatusReply {
    status: i64,
}

/// Decode one helper reply line into its payload
fn parse_reply<T: DeserializeOwned>(line: &str) -> WifiResult<T> {
    let reply: HelperReply<T> = serde_json::from_str(line)
        .map_err(|e| WifiError::InvalidResponse(format!("{}: {}", e, line)))?;

    match reply {
        HelperReply::Success(payload) => Ok(payload),
        HelperReply::Failure { error } => {
            if error.domain == HELPER_ERROR_DOMAIN && error.code == HELPER_NO_INTERFACE {
                Err(WifiError::NoInterface)
            } else {
                Err(WifiError::Platform {
                    domain: error.domain,
                    code: error.code,
                    message: error.message,
                })
            }
        }
    }
}

/// Parse the reply of the `scan` command
pub(crate) fn parse_scan_reply(line: &str) -> WifiResult<Vec<WirelessReading>> {
    let list: NetworkList<RawReading> = parse_reply(line)?;
    Ok(list.networks.into_iter().map(WirelessReading::from).collect())
}

/// Parse the reply of the `current` command
pub(crate) fn parse_current_reply(line: &str) -> WifiResult<WirelessReading> {
    parse_reply::<RawReading>(line).map(WirelessReading::from)
}

/// Parse the reply of the `preferred` command
pub(crate) fn parse_preferred_reply(line: &str) -> WifiResult<Vec<PreferredNetwork>> {
    let list: NetworkList<RawPreferred> = parse_reply(line)?;
    Ok(list
        .networks
        .into_iter()
        .map(|raw| PreferredNetwork {
            ssid: raw.ssid,
            security_mode: SecurityMode::from(raw.security),
            is_auto_join: raw.auto_join,
            last_connected: raw.last_connected,
        })
        .collect())
}

/// Parse the reply of the `auth-status` and `request-auth` commands
pub(crate) fn parse_status_reply(line: &str) -> WifiResult<LocationAuthorization> {
    let reply: StatusReply = parse_reply(line)?;
    LocationAuthorization::try_from(reply.status).map_err(|_| {
        WifiError::InvalidResponse(format!("unknown authorization status {}", reply.status))
    })
}

/// Run the helper once and return its reply line
async fn run_helper(swift: &Path, script: &Path, args: &[&str]) -> WifiResult<String> {
    debug!("Running WiFi helper: {:?}", args);

    let output = Command::new(swift)
        .arg(script)
        .args(args)
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| WifiError::Helper(format!("failed to run {}: {}", swift.display(), e)))?;

    // The helper reports platform errors as JSON with a zero exit status;
    // compiler errors and crashes only show up on stderr.
    let stdout = String::from_utf8_lossy(&output.stdout);
    if let Some(line) = stdout
        .lines()
        .map(str::trim)
        .rev()
        .find(|line| line.starts_with('{'))
    {
        return Ok(line.to_string());
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();
    if stderr.is_empty() {
        Err(WifiError::Helper(format!(
            "helper exited with {} and no output",
            output.status
        )))
    } else {
        Err(WifiError::Helper(stderr.to_string()))
    }
}

/// CoreWLAN backend driving the embedded Swift helper
#[derive(Debug, Clone)]
pub struct CoreWlanBackend {
    swift: PathBuf,
    script: PathBuf,
}

impl CoreWlanBackend {
    /// Install the helper script into `work_dir` and create the backend
    ///
    /// `swift` is the interpreter used to run the helper, normally `swift`
    /// from the Xcode command line tools.
    pub async fn new(swift: impl Into<PathBuf>, work_dir: &Path) -> WifiResult<Self> {
        let script = work_dir.join(HELPER_SCRIPT_NAME);

        tokio::fs::create_dir_all(work_dir)
            .await
            .map_err(|e| WifiError::Helper(format!("{}: {}", work_dir.display(), e)))?;
        tokio::fs::write(&script, HELPER_SCRIPT)
            .await
            .map_err(|e| WifiError::Helper(format!("{}: {}", script.display(), e)))?;

        debug!("Installed WiFi helper at {}", script.display());

        Ok(Self {
            swift: swift.into(),
            script,
        })
    }

    /// Path of the installed helper script
    pub fn script_path(&self) -> &Path {
        &self.script
    }

    async fn run(&self, args: &[&str]) -> WifiResult<String> {
        run_helper(&self.swift, &self.script, args).await
    }
}

impl WifiBackend for CoreWlanBackend {
    async fn scan(&self, ssid: Option<&str>) -> WifiResult<Vec<WirelessReading>> {
        let line = match ssid {
            Some(ssid) => self.run(&["scan", ssid]).await?,
            None => self.run(&["scan"]).await?,
        };
        let networks = parse_scan_reply(&line)?;

        debug!("Scan complete, found {} networks", networks.len());
        Ok(networks)
    }

    async fn current_network(&self) -> WifiResult<WirelessReading> {
        let line = self.run(&["current"]).await?;
        parse_current_reply(&line)
    }

    async fn preferred_networks(&self) -> WifiResult<Vec<PreferredNetwork>> {
        let line = self.run(&["preferred"]).await?;
        parse_preferred_reply(&line)
    }

    async fn authorization_status(&self) -> WifiResult<LocationAuthorization> {
        let line = self.run(&["auth-status"]).await?;
        parse_status_reply(&line)
    }

    async fn request_authorization(&self) -> WifiResult<oneshot::Receiver<LocationAuthorization>> {
        let (sender, receiver) = oneshot::channel();
        let swift = self.swift.clone();
        let script = self.script.clone();

        // The helper blocks in its run loop until the operator answers
        tokio::spawn(async move {
            let decision = run_helper(&swift, &script, &["request-auth"])
                .await
                .and_then(|line| parse_status_reply(&line));

            match decision {
                Ok(status) => {
                    let _ = sender.send(status);
                }
                Err(e) => warn!("Authorization request failed: {}", e),
            }
        });

        Ok(receiver)
    }
}
