//! TOML settings file I/O
//!
//! Non-secret knobs of the supervisor. Every field has a default, so an
//! empty file (or no file at all at the default location) yields the stock
//! container layout.

use crate::error::{ConfigError, VpnupError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Default settings file location
pub const DEFAULT_SETTINGS_PATH: &str = "/etc/vpnup/settings.toml";

/// Complete settings file structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupervisorSettings {
    /// Artifact and device locations
    #[serde(default)]
    pub paths: ArtifactPaths,

    /// Tunnel client and interface
    #[serde(default)]
    pub tunnel: TunnelSettings,

    /// Readiness polling budget
    #[serde(default)]
    pub polling: PollingPolicy,

    /// Connectivity smoke test
    #[serde(default)]
    pub probe: ProbeSettings,
}

/// Fixed locations of the files the supervisor writes or checks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactPaths {
    #[serde(default = "default_credentials_path")]
    pub credentials: PathBuf,

    #[serde(default = "default_tunnel_config_path")]
    pub tunnel_config: PathBuf,

    #[serde(default = "default_client_log_path")]
    pub client_log: PathBuf,

    #[serde(default = "default_client_pid_path")]
    pub client_pid: PathBuf,

    /// Device node that must exist before the client is started
    #[serde(default = "default_tun_device_path")]
    pub tun_device: PathBuf,
}

fn default_credentials_path() -> PathBuf {
    PathBuf::from("/etc/openvpn/credentials.txt")
}
fn default_tunnel_config_path() -> PathBuf {
    PathBuf::from("/etc/openvpn/client.conf")
}
fn default_client_log_path() -> PathBuf {
    PathBuf::from("/var/log/openvpn.log")
}
fn default_client_pid_path() -> PathBuf {
    PathBuf::from("/var/run/openvpn.pid")
}
fn default_tun_device_path() -> PathBuf {
    PathBuf::from("/dev/net/tun")
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        Self {
            credentials: default_credentials_path(),
            tunnel_config: default_tunnel_config_path(),
            client_log: default_client_log_path(),
            client_pid: default_client_pid_path(),
            tun_device: default_tun_device_path(),
        }
    }
}

impl ArtifactPaths {
    /// All artifacts and the device under one directory (used by tests and
    /// rootless runs)
    pub fn under(dir: &Path) -> Self {
        Self {
            credentials: dir.join("credentials.txt"),
            tunnel_config: dir.join("client.conf"),
            client_log: dir.join("openvpn.log"),
            client_pid: dir.join("openvpn.pid"),
            tun_device: dir.join("tun"),
        }
    }
}

/// Tunnel client settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TunnelSettings {
    /// Interface whose appearance signals readiness
    #[serde(default = "default_interface")]
    pub interface: String,

    /// Tunnel client executable
    #[serde(default = "default_client_program")]
    pub client_program: String,

    /// Extra arguments appended after `--config` and `--auth-user-pass`
    #[serde(default)]
    pub extra_args: Vec<String>,
}

fn default_interface() -> String {
    "tun0".to_string()
}
fn default_client_program() -> String {
    "openvpn".to_string()
}

impl Default for TunnelSettings {
    fn default() -> Self {
        Self {
            interface: default_interface(),
            client_program: default_client_program(),
            extra_args: Vec::new(),
        }
    }
}

/// Bounded readiness polling
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollingPolicy {
    /// Maximum number of interface checks before giving up
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay between checks in seconds
    #[serde(default = "default_interval")]
    pub interval_secs: u64,

    /// Delay after the interface shows up, before probing
    #[serde(default = "default_stabilization")]
    pub stabilization_secs: u64,
}

fn default_max_attempts() -> u32 {
    60
}
fn default_interval() -> u64 {
    1
}
fn default_stabilization() -> u64 {
    2
}

impl Default for PollingPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            interval_secs: default_interval(),
            stabilization_secs: default_stabilization(),
        }
    }
}

impl PollingPolicy {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn stabilization_delay(&self) -> Duration {
        Duration::from_secs(self.stabilization_secs)
    }

    /// Validate the polling budget
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=600).contains(&self.max_attempts) {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "polling.max_attempts must be between 1 and 600, got {}",
                    self.max_attempts
                ),
            });
        }
        if !(1..=60).contains(&self.interval_secs) {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "polling.interval_secs must be between 1 and 60, got {}",
                    self.interval_secs
                ),
            });
        }
        if self.stabilization_secs > 60 {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "polling.stabilization_secs must be at most 60, got {}",
                    self.stabilization_secs
                ),
            });
        }
        Ok(())
    }
}

/// How the post-readiness smoke test reaches the outside world
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeKind {
    /// One ICMP echo via the system `ping`
    #[default]
    Ping,
    /// One HTTP GET
    Http,
}

/// Connectivity smoke test settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeSettings {
    #[serde(default)]
    pub kind: ProbeKind,

    /// Host pinged by the `ping` probe
    #[serde(default = "default_probe_target")]
    pub target: String,

    /// URL fetched by the `http` probe
    #[serde(default)]
    pub endpoint: Option<String>,

    #[serde(default = "default_probe_timeout")]
    pub timeout_secs: u64,
}

fn default_probe_target() -> String {
    "8.8.8.8".to_string()
}
fn default_probe_timeout() -> u64 {
    5
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            kind: ProbeKind::default(),
            target: default_probe_target(),
            endpoint: None,
            timeout_secs: default_probe_timeout(),
        }
    }
}

impl ProbeSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=60).contains(&self.timeout_secs) {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "probe.timeout_secs must be between 1 and 60, got {}",
                    self.timeout_secs
                ),
            });
        }
        match self.kind {
            ProbeKind::Ping if self.target.trim().is_empty() => Err(ConfigError::ValidationError {
                message: "probe.target cannot be empty".to_string(),
            }),
            ProbeKind::Http if self.endpoint.is_none() => Err(ConfigError::ValidationError {
                message: "probe.endpoint is required when probe.kind = \"http\"".to_string(),
            }),
            _ => Ok(()),
        }
    }
}

impl SupervisorSettings {
    /// Load settings from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, VpnupError> {
        let contents = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => VpnupError::Config(ConfigError::LoadFailed {
                path: path.to_string_lossy().to_string(),
            }),
            _ => VpnupError::Config(ConfigError::IoError {
                message: format!("Failed to read settings file: {}", e),
            }),
        })?;

        let settings: SupervisorSettings = toml::from_str(&contents)?;
        settings.validate()?;

        info!(
            path = %path.display(),
            interface = %settings.tunnel.interface,
            max_attempts = settings.polling.max_attempts,
            "Loaded supervisor settings"
        );
        Ok(settings)
    }

    /// Validate every section
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tunnel.interface.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                message: "tunnel.interface cannot be empty".to_string(),
            });
        }
        if self.tunnel.client_program.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                message: "tunnel.client_program cannot be empty".to_string(),
            });
        }
        self.polling.validate()?;
        self.probe.validate()?;
        Ok(())
    }
}

/// Load settings
///
/// An explicit path must exist. Without one, the default location is read
/// when present and built-in defaults are used otherwise.
pub fn load_settings(explicit: Option<&Path>) -> Result<SupervisorSettings, VpnupError> {
    match explicit {
        Some(path) => SupervisorSettings::from_file(path),
        None => {
            let default_path = Path::new(DEFAULT_SETTINGS_PATH);
            if default_path.exists() {
                SupervisorSettings::from_file(default_path)
            } else {
                debug!("No settings file at {}, using defaults", DEFAULT_SETTINGS_PATH);
                Ok(SupervisorSettings::default())
            }
        }
    }
}
