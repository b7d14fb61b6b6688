//! Tunnel status command

use std::path::Path;

use colored::Colorize;
use serde::Serialize;
use vpnup_core::config::toml_config::load_settings;
use vpnup_core::error::VpnupError;
use vpnup_core::tunnel::{InterfaceProbe, ProcessHandle, SysfsInterfaceProbe, TunnelProcess};

#[derive(Debug, Serialize)]
struct StatusReport {
    pid: Option<u32>,
    client_running: bool,
    interface: String,
    interface_present: bool,
    pid_file: String,
    log_file: String,
}

/// Run the status command
pub fn run_status(settings_path: Option<&Path>, json: bool) -> Result<(), VpnupError> {
    let settings = load_settings(settings_path)?;
    let paths = &settings.paths;
    let mut handle = TunnelProcess::from_pid_file(&paths.client_pid, &paths.client_log);
    let interface = settings.tunnel.interface.clone();

    let report = StatusReport {
        pid: handle.pid(),
        client_running: handle.is_running(),
        interface_present: SysfsInterfaceProbe::default().is_present(&interface),
        interface,
        pid_file: paths.client_pid.display().to_string(),
        log_file: paths.client_log.display().to_string(),
    };

    if json {
        let rendered = serde_json::to_string_pretty(&report).map_err(std::io::Error::from)?;
        println!("{}", rendered);
        return Ok(());
    }

    match (report.pid, report.client_running) {
        (Some(pid), true) => println!("Tunnel client: {} (PID {})", "running".green(), pid),
        (Some(pid), false) => println!("Tunnel client: {} (stale PID {})", "stopped".red(), pid),
        (None, _) => println!("Tunnel client: {} (no {})", "not started".yellow(), report.pid_file),
    }
    if report.interface_present {
        println!("Interface {}: {}", report.interface, "up".green());
    } else {
        println!("Interface {}: {}", report.interface, "down".red());
    }
    println!("Log: {}", report.log_file);

    Ok(())
}
