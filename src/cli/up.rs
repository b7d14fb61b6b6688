//! Bring-up and handoff commands

use std::path::Path;

use tracing::info;
use vpnup_core::clock::TokioSleeper;
use vpnup_core::config::toml_config::load_settings;
use vpnup_core::config::BringUpConfig;
use vpnup_core::error::{SupervisorError, VpnupError};
use vpnup_core::handoff::{exec_server, ServerLaunchSpec};
use vpnup_core::supervisor::{Supervisor, SupervisorOutcome};
use vpnup_core::tunnel::{OpenVpnLauncher, Probe, SysfsInterfaceProbe};

/// Run the full bring-up, then replace this process with the server
pub fn run_up(settings_path: Option<&Path>) -> Result<(), VpnupError> {
    let config = BringUpConfig::from_lookup(|key| std::env::var(key).ok());
    // Missing secrets win over a broken settings file
    config.validate()?;
    let settings = load_settings(settings_path)?;
    let log_path = settings.paths.client_log.clone();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let outcome = runtime.block_on(async {
        let probe = Probe::from_settings(&settings.probe)?;
        let supervisor = Supervisor::new(
            config,
            settings,
            OpenVpnLauncher,
            SysfsInterfaceProbe::default(),
            probe,
            TokioSleeper,
        );
        Ok::<_, VpnupError>(supervisor.run().await)
    })?;

    // Nothing async may outlive the exec
    drop(runtime);

    match outcome {
        SupervisorOutcome::Success(spec) => hand_off(&spec),
        SupervisorOutcome::Fatal(e) => {
            if let SupervisorError::InterfaceTimeout { client_log, .. } = &e {
                dump_client_log(&log_path, client_log);
            }
            Err(e.into())
        }
    }
}

/// Replace this process with the server, no VPN
pub fn run_serve() -> Result<(), VpnupError> {
    info!("Starting without VPN");
    hand_off(&ServerLaunchSpec::default())
}

/// Only returns if exec failed
fn hand_off(spec: &ServerLaunchSpec) -> Result<(), VpnupError> {
    Err(VpnupError::Io(exec_server(spec)))
}

fn dump_client_log(path: &Path, contents: &str) {
    eprintln!("----- {} -----", path.display());
    eprint!("{}", contents);
    if !contents.ends_with('\n') {
        eprintln!();
    }
    eprintln!("----- end of {} -----", path.display());
}
