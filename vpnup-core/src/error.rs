//! Error types for the vpnup bring-up supervisor
//!
//! Fatal bring-up conditions live in [`SupervisorError`]; settings problems in
//! [`ConfigError`]. [`VpnupError`] ties them together for the binary.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the vpnup application
#[derive(Error, Debug)]
pub enum VpnupError {
    /// Errors related to settings loading/parsing
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Fatal bring-up errors
    #[error("VPN bring-up failed: {0}")]
    Supervisor(#[from] SupervisorError),

    /// Connectivity probe could not be built from settings
    #[error("Probe error: {0}")]
    Probe(#[from] ProbeError),

    /// Generic I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing errors
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl VpnupError {
    /// Process exit code for this error
    ///
    /// Every bring-up failure exits with 1. Settings problems are
    /// configuration errors and exit with 2.
    pub fn exit_code(&self) -> i32 {
        match self {
            VpnupError::Config(_) | VpnupError::Toml(_) | VpnupError::Probe(_) => 2,
            VpnupError::Supervisor(_) | VpnupError::Io(_) => 1,
        }
    }
}

/// Settings-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load settings file: {path}")]
    LoadFailed { path: String },

    #[error("Settings validation error: {message}")]
    ValidationError { message: String },

    #[error("I/O error: {message}")]
    IoError { message: String },
}

/// Fatal conditions of the bring-up sequence
///
/// None of these are retried. Artifacts already written stay on disk.
#[derive(Error, Debug)]
pub enum SupervisorError {
    #[error("Missing required secret: {field} is empty or unset")]
    MissingSecret { field: &'static str },

    #[error("TUN device {} is not available in this container", .path.display())]
    DeviceUnavailable { path: PathBuf },

    #[error("Interface {interface} did not appear after {attempts} attempts")]
    InterfaceTimeout {
        interface: String,
        attempts: u32,
        /// Contents of the tunnel client log at the time of the timeout
        client_log: String,
    },

    #[error("Failed to write {}: {}", .path.display(), .source)]
    ArtifactWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to launch tunnel client: {reason}")]
    LaunchFailed { reason: String },
}

/// Errors building a connectivity probe
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("Invalid probe endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("HTTP client creation failed: {0}")]
    ClientCreationFailed(#[from] reqwest::Error),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, VpnupError>;
