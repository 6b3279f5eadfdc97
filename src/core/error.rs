//! Error types for the WiFi scanner

use thiserror::Error;

/// Result type for WiFi backend operations
pub type WifiResult<T> = Result<T, WifiError>;

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

/// `NSPOSIXErrorDomain`, used by CoreWLAN to forward errno values
pub const POSIX_ERROR_DOMAIN: &str = "NSPOSIXErrorDomain";

/// `EBUSY`: the interface is busy with another scan or association
pub const POSIX_EBUSY: i64 = 16;

/// CoreWLAN error code returned when location access is missing
pub const CWLAN_LOCATION_REQUIRED: i64 = -3931;

/// How a backend failure is handled by the scan retrier and permission gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Interface temporarily unavailable, worth retrying
    TransientBusy,
    /// Location access is missing
    NotAuthorized,
    Fatal,
}

/// Errors related to WiFi backend operations
#[derive(Error, Debug, Clone)]
pub enum WifiError {
    #[error("{message} (domain={domain}, code={code})")]
    Platform {
        domain: String,
        code: i64,
        message: String,
    },

    #[error("Location access not authorized")]
    NotAuthorized,

    #[error("No WiFi interface available")]
    NoInterface,

    #[error("WiFi helper failed: {0}")]
    Helper(String),

    #[error("Invalid helper response: {0}")]
    InvalidResponse(String),
}

impl WifiError {
    /// Classify this failure
    ///
    /// Structured domain/code pairs take precedence. Message matching is only
    /// used for errors that carry no code, such as helper stderr output.
    pub fn kind(&self) -> FailureKind {
        match self {
            WifiError::Platform { domain, code, .. } => {
                if domain == POSIX_ERROR_DOMAIN && *code == POSIX_EBUSY {
                    FailureKind::TransientBusy
                } else if *code == CWLAN_LOCATION_REQUIRED {
                    FailureKind::NotAuthorized
                } else {
                    FailureKind::Fatal
                }
            }
            WifiError::NotAuthorized => FailureKind::NotAuthorized,
            WifiError::Helper(message) => {
                let message = message.to_ascii_lowercase();
                if message.contains("resource busy") || message.contains("device busy") {
                    FailureKind::TransientBusy
                } else {
                    FailureKind::Fatal
                }
            }
            WifiError::NoInterface | WifiError::InvalidResponse(_) => FailureKind::Fatal,
        }
    }

    pub fn is_transient_busy(&self) -> bool {
        self.kind() == FailureKind::TransientBusy
    }

    pub fn is_not_authorized(&self) -> bool {
        self.kind() == FailureKind::NotAuthorized
    }

    /// Shorthand for the EBUSY error CoreWLAN reports mid-scan
    pub fn busy() -> Self {
        WifiError::Platform {
            domain: POSIX_ERROR_DOMAIN.to_string(),
            code: POSIX_EBUSY,
            message: "Resource busy".to_string(),
        }
    }
}

/// Errors related to core service operations
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Location access denied; enable it for this application in System Settings")]
    AuthorizationDenied,

    #[error("Authorization request ended without a decision")]
    AuthorizationAborted,

    #[error("Scan attempt {attempt} failed: {source}")]
    Scan {
        attempt: u32,
        #[source]
        source: WifiError,
    },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Backend error: {0}")]
    Backend(#[from] WifiError),
}
