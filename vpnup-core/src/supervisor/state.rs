//! Bring-up state machine
//!
//! `Init -> ValidatingSecrets -> WritingArtifacts -> CheckingDevice ->
//! LaunchingClient -> PollingInterface -> Ready -> ProbingConnectivity ->
//! HandingOff`, or `PollingInterface -> TimedOut`. Secret validation and the
//! device check fail straight into `Failed`.

use crate::error::SupervisorError;
use crate::handoff::ServerLaunchSpec;
use crate::tunnel::ProbeResult;

/// Phases of the bring-up sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BringUpPhase {
    Init,
    ValidatingSecrets,
    WritingArtifacts,
    CheckingDevice,
    LaunchingClient,
    PollingInterface,
    Ready,
    ProbingConnectivity,
    HandingOff,
    TimedOut,
    Failed,
}

impl BringUpPhase {
    /// Whether the sequence has stopped in this phase
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BringUpPhase::HandingOff | BringUpPhase::TimedOut | BringUpPhase::Failed
        )
    }
}

impl std::fmt::Display for BringUpPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            BringUpPhase::Init => "init",
            BringUpPhase::ValidatingSecrets => "validating secrets",
            BringUpPhase::WritingArtifacts => "writing artifacts",
            BringUpPhase::CheckingDevice => "checking device",
            BringUpPhase::LaunchingClient => "launching client",
            BringUpPhase::PollingInterface => "polling interface",
            BringUpPhase::Ready => "ready",
            BringUpPhase::ProbingConnectivity => "probing connectivity",
            BringUpPhase::HandingOff => "handing off",
            BringUpPhase::TimedOut => "timed out",
            BringUpPhase::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

/// Facts gathered by a successful bring-up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BringUpReport {
    /// Poll attempt on which the interface was observed (1-based)
    pub attempts: u32,
    /// PID of the tunnel client, if the launcher reported one
    pub client_pid: Option<u32>,
    /// Result of the connectivity smoke test
    pub probe: ProbeResult,
}

/// Terminal result handed to the entry point
#[derive(Debug)]
pub enum SupervisorOutcome {
    /// Exec into this server
    Success(ServerLaunchSpec),
    /// Exit non-zero
    Fatal(SupervisorError),
}

impl SupervisorOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SupervisorOutcome::Success(_))
    }

    /// Exit code to use if the process has to terminate
    ///
    /// `None` on success: control passes to the server and never returns.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            SupervisorOutcome::Success(_) => None,
            SupervisorOutcome::Fatal(_) => Some(1),
        }
    }
}

impl From<Result<BringUpReport, SupervisorError>> for SupervisorOutcome {
    fn from(result: Result<BringUpReport, SupervisorError>) -> Self {
        match result {
            Ok(_) => SupervisorOutcome::Success(ServerLaunchSpec::default()),
            Err(e) => SupervisorOutcome::Fatal(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_terminal_phases() {
        assert!(BringUpPhase::HandingOff.is_terminal());
        assert!(BringUpPhase::TimedOut.is_terminal());
        assert!(BringUpPhase::Failed.is_terminal());
        assert!(!BringUpPhase::PollingInterface.is_terminal());
        assert!(!BringUpPhase::Init.is_terminal());
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(BringUpPhase::PollingInterface.to_string(), "polling interface");
        assert_eq!(BringUpPhase::TimedOut.to_string(), "timed out");
    }

    #[test]
    fn test_outcome_from_result() {
        let ok: SupervisorOutcome = Ok(BringUpReport {
            attempts: 1,
            client_pid: Some(42),
            probe: ProbeResult::Reachable {
                duration: Duration::from_millis(10),
            },
        })
        .into();
        assert!(ok.is_success());
        assert_eq!(ok.exit_code(), None);

        let fatal: SupervisorOutcome =
            Err(SupervisorError::MissingSecret { field: "VPN_USERNAME" }).into();
        assert!(!fatal.is_success());
        assert_eq!(fatal.exit_code(), Some(1));
    }
}
