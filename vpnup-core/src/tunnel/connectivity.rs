//! Post-readiness connectivity smoke test
//!
//! One probe, short timeout, never fatal. The interface existing is what
//! decides success; this only tells the operator whether traffic flows.

use crate::config::toml_config::{ProbeKind, ProbeSettings};
use crate::error::ProbeError;
use reqwest::Client;
use std::future::Future;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tracing::{debug, warn};
use url::Url;

/// Outcome of a single connectivity probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeResult {
    Reachable { duration: Duration },
    Unreachable { reason: String },
}

impl ProbeResult {
    pub fn is_reachable(&self) -> bool {
        matches!(self, ProbeResult::Reachable { .. })
    }
}

/// Something that can test reachability once
pub trait ConnectivityProbe {
    fn probe(&self) -> impl Future<Output = ProbeResult>;
}

/// Single ICMP echo through the system `ping` binary
#[derive(Debug, Clone)]
pub struct PingProbe {
    target: String,
    timeout: Duration,
}

impl PingProbe {
    pub fn new(target: impl Into<String>, timeout: Duration) -> Self {
        Self {
            target: target.into(),
            timeout,
        }
    }

    fn args(&self) -> Vec<String> {
        vec![
            "-c".to_string(),
            "1".to_string(),
            "-W".to_string(),
            self.timeout.as_secs().max(1).to_string(),
            self.target.clone(),
        ]
    }
}

impl ConnectivityProbe for PingProbe {
    async fn probe(&self) -> ProbeResult {
        let start = Instant::now();
        let status = Command::new("ping")
            .args(self.args())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .status();

        // ping enforces -W itself; the outer timeout covers DNS stalls
        match tokio::time::timeout(self.timeout + Duration::from_secs(1), status).await {
            Ok(Ok(status)) if status.success() => {
                let duration = start.elapsed();
                debug!(duration_ms = duration.as_millis(), "Ping succeeded");
                ProbeResult::Reachable { duration }
            }
            Ok(Ok(status)) => ProbeResult::Unreachable {
                reason: format!("ping {} exited with {}", self.target, status),
            },
            Ok(Err(e)) => ProbeResult::Unreachable {
                reason: format!("Failed to run ping: {}", e),
            },
            Err(_) => ProbeResult::Unreachable {
                reason: format!("ping {} timed out after {:?}", self.target, self.timeout),
            },
        }
    }
}

/// Single HTTP GET; any HTTP response counts as reachable
#[derive(Debug)]
pub struct HttpProbe {
    client: Client,
    endpoint: String,
    timeout: Duration,
}

impl HttpProbe {
    /// Create a new HTTP probe
    ///
    /// The endpoint must be an http:// or https:// URL.
    pub fn new(endpoint: String, timeout: Duration) -> Result<Self, ProbeError> {
        let url = Url::parse(&endpoint)
            .map_err(|e| ProbeError::InvalidEndpoint(format!("Failed to parse URL: {}", e)))?;

        match url.scheme() {
            "http" | "https" => {}
            scheme => {
                return Err(ProbeError::InvalidEndpoint(format!(
                    "Only HTTP/HTTPS schemes are supported, got: {}",
                    scheme
                )));
            }
        }

        let client = Client::builder()
            .timeout(timeout)
            .use_rustls_tls()
            .build()?;

        Ok(Self {
            client,
            endpoint,
            timeout,
        })
    }
}

impl ConnectivityProbe for HttpProbe {
    async fn probe(&self) -> ProbeResult {
        let start = Instant::now();

        match self.client.get(&self.endpoint).send().await {
            Ok(response) => {
                let duration = start.elapsed();
                debug!(
                    status = %response.status(),
                    duration_ms = duration.as_millis(),
                    "HTTP probe got a response"
                );
                ProbeResult::Reachable { duration }
            }
            Err(e) => {
                let reason = if e.is_timeout() {
                    format!("Request timeout after {:?}", self.timeout)
                } else if e.is_connect() {
                    "Connection refused or unreachable".to_string()
                } else {
                    format!("Request failed: {}", e)
                };
                warn!(error = %reason, "HTTP probe failed");
                ProbeResult::Unreachable { reason }
            }
        }
    }
}

/// Probe selected by the settings file
#[derive(Debug)]
pub enum Probe {
    Ping(PingProbe),
    Http(HttpProbe),
}

impl Probe {
    pub fn from_settings(settings: &ProbeSettings) -> Result<Self, ProbeError> {
        match settings.kind {
            ProbeKind::Ping => Ok(Probe::Ping(PingProbe::new(
                settings.target.clone(),
                settings.timeout(),
            ))),
            ProbeKind::Http => {
                let endpoint = settings.endpoint.clone().ok_or_else(|| {
                    ProbeError::InvalidEndpoint("probe.endpoint is not set".to_string())
                })?;
                Ok(Probe::Http(HttpProbe::new(endpoint, settings.timeout())?))
            }
        }
    }
}

impl ConnectivityProbe for Probe {
    async fn probe(&self) -> ProbeResult {
        match self {
            Probe::Ping(ping) => ping.probe().await,
            Probe::Http(http) => http.probe().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ping_args() {
        let probe = PingProbe::new("8.8.8.8", Duration::from_secs(5));
        assert_eq!(probe.args(), vec!["-c", "1", "-W", "5", "8.8.8.8"]);
    }

    #[test]
    fn test_http_probe_invalid_scheme() {
        let result = HttpProbe::new("ftp://example.com".to_string(), Duration::from_secs(5));
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Only HTTP/HTTPS schemes"));
    }

    #[test]
    fn test_http_probe_invalid_url() {
        let result = HttpProbe::new("not a url".to_string(), Duration::from_secs(5));
        assert!(result.unwrap_err().to_string().contains("parse URL"));
    }

    #[test]
    fn test_probe_from_default_settings_is_ping() {
        let probe = Probe::from_settings(&ProbeSettings::default()).unwrap();
        assert!(matches!(probe, Probe::Ping(_)));
    }

    #[test]
    fn test_probe_from_http_settings_without_endpoint() {
        let settings = ProbeSettings {
            kind: ProbeKind::Http,
            ..ProbeSettings::default()
        };
        assert!(Probe::from_settings(&settings).is_err());
    }
}
