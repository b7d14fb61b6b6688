//! Configuration module
//!
//! Secrets and the tunnel profile come from the environment as a
//! [`BringUpConfig`]. Everything else (paths, polling budget, probe target)
//! lives in [`toml_config::SupervisorSettings`].

use crate::error::SupervisorError;
use crate::types::{ConnectionSecret, TunnelConfig};

pub mod toml_config;

/// Environment variable holding the VPN username
pub const ENV_USERNAME: &str = "VPN_USERNAME";
/// Environment variable holding the VPN password
pub const ENV_PASSWORD: &str = "VPN_PASSWORD";
/// Environment variable holding the OpenVPN client profile text
pub const ENV_CONFIG: &str = "VPN_CONFIG";

/// Inputs of one bring-up run
#[derive(Debug, Clone)]
pub struct BringUpConfig {
    pub secret: ConnectionSecret,
    pub tunnel_config: TunnelConfig,
}

impl BringUpConfig {
    /// Create a bring-up config from explicit values
    pub fn new(secret: ConnectionSecret, tunnel_config: TunnelConfig) -> Self {
        Self {
            secret,
            tunnel_config,
        }
    }

    /// Build from a key lookup such as `|k| std::env::var(k).ok()`
    ///
    /// Unset keys become empty strings; rejecting them is left to
    /// [`BringUpConfig::validate`] so the supervisor decides when it fails.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).unwrap_or_default();
        Self {
            secret: ConnectionSecret::new(get(ENV_USERNAME), get(ENV_PASSWORD)),
            tunnel_config: TunnelConfig::new(get(ENV_CONFIG)),
        }
    }

    /// Check that every required input is present
    ///
    /// Pure: touches neither the filesystem nor the environment.
    pub fn validate(&self) -> Result<(), SupervisorError> {
        if self.secret.identity().is_empty() {
            return Err(SupervisorError::MissingSecret {
                field: ENV_USERNAME,
            });
        }
        if self.secret.expose_passphrase().is_empty() {
            return Err(SupervisorError::MissingSecret {
                field: ENV_PASSWORD,
            });
        }
        if self.tunnel_config.is_empty() {
            return Err(SupervisorError::MissingSecret { field: ENV_CONFIG });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_from_lookup_reads_all_keys() {
        let config = BringUpConfig::from_lookup(lookup_from(&[
            (ENV_USERNAME, "u"),
            (ENV_PASSWORD, "p"),
            (ENV_CONFIG, "cfg-text"),
        ]));
        assert_eq!(config.secret.identity(), "u");
        assert_eq!(config.secret.expose_passphrase(), "p");
        assert_eq!(config.tunnel_config.expose(), "cfg-text");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unset_username_is_missing_secret() {
        let config = BringUpConfig::from_lookup(lookup_from(&[
            (ENV_PASSWORD, "p"),
            (ENV_CONFIG, "cfg-text"),
        ]));
        match config.validate() {
            Err(SupervisorError::MissingSecret { field }) => assert_eq!(field, ENV_USERNAME),
            other => panic!("expected MissingSecret, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_password_is_missing_secret() {
        let config = BringUpConfig::new(
            ConnectionSecret::new("u", ""),
            TunnelConfig::new("cfg-text"),
        );
        assert!(matches!(
            config.validate(),
            Err(SupervisorError::MissingSecret { field: ENV_PASSWORD })
        ));
    }

    #[test]
    fn test_empty_tunnel_config_is_missing_secret() {
        let config = BringUpConfig::new(ConnectionSecret::new("u", "p"), TunnelConfig::new(""));
        assert!(matches!(
            config.validate(),
            Err(SupervisorError::MissingSecret { field: ENV_CONFIG })
        ));
    }

    #[test]
    fn test_whitespace_values_are_present() {
        let config = BringUpConfig::new(
            ConnectionSecret::new(" ", "p"),
            TunnelConfig::new("cfg-text"),
        );
        assert!(config.validate().is_ok());

        let config = BringUpConfig::new(ConnectionSecret::new("u", "p"), TunnelConfig::new("\n"));
        assert!(config.validate().is_ok());
    }
}
