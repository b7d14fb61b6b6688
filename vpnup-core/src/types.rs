//! Type definitions and wrappers for secure data handling
//!
//! The passphrase and the tunnel configuration are wrapped with the
//! secrecy crate so they never end up in logs or debug output.

use secrecy::{ExposeSecret, Secret};

/// VPN identity and passphrase
#[derive(Clone, Debug)]
pub struct ConnectionSecret {
    identity: String,
    passphrase: Secret<String>,
}

impl ConnectionSecret {
    /// Create a new connection secret
    pub fn new(identity: impl Into<String>, passphrase: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            passphrase: Secret::new(passphrase.into()),
        }
    }

    /// VPN username
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Expose the passphrase (use with caution!)
    ///
    /// Only needed when materializing the credentials file.
    pub fn expose_passphrase(&self) -> &str {
        self.passphrase.expose_secret()
    }

    /// Render the two-line credentials file body expected by
    /// `openvpn --auth-user-pass`
    pub fn credentials_file_contents(&self) -> String {
        format!("{}\n{}\n", self.identity, self.expose_passphrase())
    }
}

/// Opaque OpenVPN client configuration
///
/// Written verbatim; the supervisor never looks inside. It is kept secret
/// because inline `<key>` blocks are common in client profiles.
#[derive(Clone, Debug)]
pub struct TunnelConfig(Secret<String>);

impl TunnelConfig {
    /// Create a new tunnel config from its raw text
    pub fn new(text: impl Into<String>) -> Self {
        Self(Secret::new(text.into()))
    }

    /// Expose the raw configuration text (use with caution!)
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    /// Whether no configuration text was supplied
    pub fn is_empty(&self) -> bool {
        self.expose().is_empty()
    }
}

impl From<String> for TunnelConfig {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}
