//! Preflight check command
//!
//! Runs the same validations as `up` without writing any file or starting
//! any process.

use std::path::Path;

use colored::Colorize;
use vpnup_core::config::toml_config::{load_settings, ProbeKind};
use vpnup_core::config::BringUpConfig;
use vpnup_core::error::{SupervisorError, VpnupError};
use vpnup_core::handoff::SERVER_PROGRAM;
use vpnup_core::tunnel::interface::{device_present, is_char_device};
use vpnup_core::tunnel::Probe;

fn pass(message: &str) {
    println!("{} {}", "✓".green(), message);
}

fn fail(message: &str) {
    println!("{} {}", "✗".red(), message);
}

fn note(message: &str) {
    println!("{} {}", "!".yellow(), message);
}

/// Run the check command
///
/// Reports every problem, then fails with the first fatal one.
pub fn run_check(settings_path: Option<&Path>) -> Result<(), VpnupError> {
    let settings = load_settings(settings_path)?;
    let config = BringUpConfig::from_lookup(|key| std::env::var(key).ok());
    let mut first_error: Option<VpnupError> = None;

    match config.validate() {
        Ok(()) => pass("VPN_USERNAME, VPN_PASSWORD and VPN_CONFIG are set"),
        Err(e) => {
            fail(&e.to_string());
            first_error.get_or_insert(e.into());
        }
    }

    let device = &settings.paths.tun_device;
    if !device_present(device) {
        let e = SupervisorError::DeviceUnavailable {
            path: device.clone(),
        };
        fail(&e.to_string());
        first_error.get_or_insert(e.into());
    } else if is_char_device(device) {
        pass(&format!("TUN device {} present", device.display()));
    } else {
        note(&format!(
            "{} exists but is not a character device",
            device.display()
        ));
    }

    let program = &settings.tunnel.client_program;
    match which::which(program) {
        Ok(path) => pass(&format!("Tunnel client found at {}", path.display())),
        Err(e) => {
            let e = SupervisorError::LaunchFailed {
                reason: format!("{} not found: {}", program, e),
            };
            fail(&e.to_string());
            first_error.get_or_insert(e.into());
        }
    }

    match Probe::from_settings(&settings.probe) {
        Ok(_) => pass(&format!("Connectivity probe: {:?}", settings.probe.kind)),
        Err(e) => {
            fail(&e.to_string());
            first_error.get_or_insert(e.into());
        }
    }
    if settings.probe.kind == ProbeKind::Ping && which::which("ping").is_err() {
        note("ping not found; the connectivity check will report unreachable");
    }

    if which::which(SERVER_PROGRAM).is_err() {
        note(&format!("{} not found on PATH; handoff would fail", SERVER_PROGRAM));
    }

    match first_error {
        Some(e) => Err(e),
        None => {
            println!("All checks passed");
            Ok(())
        }
    }
}
