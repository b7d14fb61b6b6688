//! Unit tests for error types and conversions

use std::path::PathBuf;
use vpnup_core::error::{ConfigError, SupervisorError, VpnupError};

#[test]
fn test_missing_secret_display() {
    let error = SupervisorError::MissingSecret {
        field: "VPN_PASSWORD",
    };
    assert_eq!(
        error.to_string(),
        "Missing required secret: VPN_PASSWORD is empty or unset"
    );
}

#[test]
fn test_device_unavailable_display() {
    let error = SupervisorError::DeviceUnavailable {
        path: PathBuf::from("/dev/net/tun"),
    };
    assert_eq!(
        error.to_string(),
        "TUN device /dev/net/tun is not available in this container"
    );
}

#[test]
fn test_interface_timeout_display_omits_log() {
    let error = SupervisorError::InterfaceTimeout {
        interface: "tun0".to_string(),
        attempts: 60,
        client_log: "secret-ish log line".to_string(),
    };
    let message = error.to_string();
    assert_eq!(message, "Interface tun0 did not appear after 60 attempts");
    assert!(!message.contains("log line"));
}

#[test]
fn test_exit_codes() {
    let fatal: VpnupError = SupervisorError::DeviceUnavailable {
        path: PathBuf::from("/dev/net/tun"),
    }
    .into();
    assert_eq!(fatal.exit_code(), 1);

    let config: VpnupError = ConfigError::ValidationError {
        message: "bad".to_string(),
    }
    .into();
    assert_eq!(config.exit_code(), 2);

    let io: VpnupError = std::io::Error::new(std::io::ErrorKind::NotFound, "exec failed").into();
    assert_eq!(io.exit_code(), 1);
}

#[test]
fn test_vpnup_error_from_toml() {
    let toml_error: toml::de::Error =
        toml::from_str::<serde_json::Value>("invalid toml").unwrap_err();
    let error: VpnupError = toml_error.into();
    assert!(matches!(error, VpnupError::Toml(_)));
    assert_eq!(error.exit_code(), 2);
}
