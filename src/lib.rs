//! WiFi Scanner
//!
//! Diagnostic utility reporting the wireless networks seen by a macOS host:
//! - the currently associated network
//! - networks in range, retried while the interface is busy
//! - networks saved in the host configuration

pub mod backend;
pub mod config;
pub mod core;
pub mod report;

pub use core::{
    error::{FailureKind, ServiceError, WifiError},
    types::{AuthorizationState, SurveyReport, WirelessReading},
};
