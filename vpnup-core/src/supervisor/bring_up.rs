//! One-shot VPN bring-up sequence
//!
//! Validates secrets, writes the credentials and config files, checks for
//! the TUN device, starts the client, waits for the interface and smoke
//! tests connectivity. All OS interaction goes through injected
//! capabilities.

use crate::clock::Sleeper;
use crate::config::toml_config::SupervisorSettings;
use crate::config::BringUpConfig;
use crate::error::SupervisorError;
use crate::supervisor::artifacts::write_secret_file;
use crate::supervisor::state::{BringUpPhase, BringUpReport, SupervisorOutcome};
use crate::tunnel::{
    device_present, ConnectivityProbe, InterfaceProbe, LaunchRequest, ProbeResult, ProcessHandle,
    TunnelLauncher,
};
use tracing::{debug, error, info, warn};

/// Drives the bring-up state machine
pub struct Supervisor<L, I, C, S> {
    config: BringUpConfig,
    settings: SupervisorSettings,
    launcher: L,
    interfaces: I,
    connectivity: C,
    sleeper: S,
    history: Vec<BringUpPhase>,
}

impl<L, I, C, S> Supervisor<L, I, C, S>
where
    L: TunnelLauncher,
    I: InterfaceProbe,
    C: ConnectivityProbe,
    S: Sleeper,
{
    pub fn new(
        config: BringUpConfig,
        settings: SupervisorSettings,
        launcher: L,
        interfaces: I,
        connectivity: C,
        sleeper: S,
    ) -> Self {
        Self {
            config,
            settings,
            launcher,
            interfaces,
            connectivity,
            sleeper,
            history: vec![BringUpPhase::Init],
        }
    }

    /// Current phase
    pub fn phase(&self) -> BringUpPhase {
        self.history
            .last()
            .copied()
            .unwrap_or(BringUpPhase::Init)
    }

    /// Every phase entered so far, starting with `Init`
    pub fn history(&self) -> &[BringUpPhase] {
        &self.history
    }

    /// Run the sequence and map it to the outcome the entry point acts on
    pub async fn run(mut self) -> SupervisorOutcome {
        let result = self.bring_up().await;
        if let Ok(report) = &result {
            info!(
                attempts = report.attempts,
                client_pid = ?report.client_pid,
                reachable = report.probe.is_reachable(),
                "VPN bring-up complete"
            );
        }
        result.into()
    }

    /// Run the sequence once
    ///
    /// Never retried as a whole. Files written before a failure stay on disk.
    pub async fn bring_up(&mut self) -> Result<BringUpReport, SupervisorError> {
        let result = self.execute().await;
        match &result {
            Ok(_) => self.enter(BringUpPhase::HandingOff),
            Err(SupervisorError::InterfaceTimeout { .. }) => self.enter(BringUpPhase::TimedOut),
            Err(e) => {
                error!(phase = %self.phase(), "{}", e);
                self.enter(BringUpPhase::Failed);
            }
        }
        result
    }

    async fn execute(&mut self) -> Result<BringUpReport, SupervisorError> {
        self.enter(BringUpPhase::ValidatingSecrets);
        self.config.validate()?;

        self.enter(BringUpPhase::WritingArtifacts);
        let paths = &self.settings.paths;
        write_secret_file(
            &paths.credentials,
            &self.config.secret.credentials_file_contents(),
        )?;
        write_secret_file(&paths.tunnel_config, self.config.tunnel_config.expose())?;
        info!(
            credentials = %paths.credentials.display(),
            config = %paths.tunnel_config.display(),
            "Wrote VPN credentials and config"
        );

        self.enter(BringUpPhase::CheckingDevice);
        if !device_present(&self.settings.paths.tun_device) {
            return Err(SupervisorError::DeviceUnavailable {
                path: self.settings.paths.tun_device.clone(),
            });
        }

        self.enter(BringUpPhase::LaunchingClient);
        let request = LaunchRequest::from_settings(&self.settings);
        let mut handle = self.launcher.launch(&request)?;

        self.enter(BringUpPhase::PollingInterface);
        let attempts = self.wait_for_interface(&mut handle).await?;

        self.enter(BringUpPhase::Ready);
        self.sleeper
            .sleep(self.settings.polling.stabilization_delay())
            .await;

        self.enter(BringUpPhase::ProbingConnectivity);
        let probe = self.connectivity.probe().await;
        match &probe {
            ProbeResult::Reachable { duration } => {
                info!(duration_ms = duration.as_millis(), "Connectivity check passed");
            }
            ProbeResult::Unreachable { reason } => {
                warn!(%reason, "Connectivity check failed, continuing anyway");
            }
        }

        Ok(BringUpReport {
            attempts,
            client_pid: handle.pid(),
            probe,
        })
    }

    /// Poll until the interface exists or the budget runs out
    ///
    /// Returns the 1-based attempt on which the interface was seen.
    async fn wait_for_interface(
        &self,
        handle: &mut L::Handle,
    ) -> Result<u32, SupervisorError> {
        let interface = &self.settings.tunnel.interface;
        let policy = &self.settings.polling;
        let mut reported_exit = false;

        for attempt in 1..=policy.max_attempts {
            if self.interfaces.is_present(interface) {
                info!(%interface, attempt, "Tunnel interface is up");
                return Ok(attempt);
            }

            info!(
                "Waiting for {} ({}/{})",
                interface, attempt, policy.max_attempts
            );

            if !reported_exit && !handle.is_running() {
                warn!(pid = ?handle.pid(), "Tunnel client is no longer running");
                reported_exit = true;
            }

            if attempt < policy.max_attempts {
                self.sleeper.sleep(policy.interval()).await;
            }
        }

        let client_log = handle.read_log().unwrap_or_else(|e| {
            format!(
                "<could not read {}: {}>",
                self.settings.paths.client_log.display(),
                e
            )
        });
        error!(
            %interface,
            attempts = policy.max_attempts,
            "Tunnel interface never appeared"
        );
        Err(SupervisorError::InterfaceTimeout {
            interface: interface.clone(),
            attempts: policy.max_attempts,
            client_log,
        })
    }

    fn enter(&mut self, phase: BringUpPhase) {
        debug!(from = %self.phase(), to = %phase, "Bring-up phase change");
        self.history.push(phase);
    }
}
