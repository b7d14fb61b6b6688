//! OpenVPN client process launch and tracking
//!
//! The client is started in its own process group with stdout/stderr
//! appended to the log file, and its PID is written to the pid file. The
//! supervisor never waits on it; it only asks the [`ProcessHandle`] whether
//! it is still alive and what it has logged.

use crate::config::toml_config::SupervisorSettings;
use crate::error::SupervisorError;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::os::unix::process::CommandExt;
use std::process::Stdio;
use tokio::process::{Child, Command};
use tracing::{debug, info};

/// Everything needed to start the tunnel client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchRequest {
    pub program: String,
    pub config_path: PathBuf,
    pub credentials_path: PathBuf,
    pub extra_args: Vec<String>,
    pub log_path: PathBuf,
    pub pid_path: PathBuf,
}

impl LaunchRequest {
    pub fn from_settings(settings: &SupervisorSettings) -> Self {
        Self {
            program: settings.tunnel.client_program.clone(),
            config_path: settings.paths.tunnel_config.clone(),
            credentials_path: settings.paths.credentials.clone(),
            extra_args: settings.tunnel.extra_args.clone(),
            log_path: settings.paths.client_log.clone(),
            pid_path: settings.paths.client_pid.clone(),
        }
    }

    /// Command line arguments passed to the client
    pub fn args(&self) -> Vec<String> {
        let mut args = vec![
            "--config".to_string(),
            self.config_path.to_string_lossy().to_string(),
            "--auth-user-pass".to_string(),
            self.credentials_path.to_string_lossy().to_string(),
        ];
        args.extend(self.extra_args.iter().cloned());
        args
    }
}

/// View of a running (or formerly running) tunnel client
pub trait ProcessHandle {
    /// PID of the client, if known
    fn pid(&self) -> Option<u32>;

    /// Whether the client is still alive
    fn is_running(&mut self) -> bool;

    /// Everything the client has written to its log so far
    fn read_log(&self) -> std::io::Result<String>;
}

/// Starts the tunnel client
pub trait TunnelLauncher {
    type Handle: ProcessHandle;

    fn launch(&self, request: &LaunchRequest) -> Result<Self::Handle, SupervisorError>;
}

/// Handle backed by a spawned child and/or a pid file
#[derive(Debug)]
pub struct TunnelProcess {
    pid: Option<u32>,
    child: Option<Child>,
    log_path: PathBuf,
}

impl TunnelProcess {
    /// Attach to a client started by another process via its pid file
    ///
    /// A missing or unparsable pid file yields a handle without a PID.
    pub fn from_pid_file(pid_path: &Path, log_path: &Path) -> Self {
        let pid = fs::read_to_string(pid_path)
            .ok()
            .and_then(|content| content.trim().parse::<u32>().ok());
        Self {
            pid,
            child: None,
            log_path: log_path.to_path_buf(),
        }
    }
}

impl ProcessHandle for TunnelProcess {
    fn pid(&self) -> Option<u32> {
        self.pid
    }

    fn is_running(&mut self) -> bool {
        if let Some(child) = self.child.as_mut() {
            return matches!(child.try_wait(), Ok(None));
        }
        match self.pid {
            Some(pid) => is_process_alive(pid),
            None => false,
        }
    }

    fn read_log(&self) -> std::io::Result<String> {
        fs::read_to_string(&self.log_path)
    }
}

/// Check whether a PID refers to a live process
pub fn is_process_alive(pid: u32) -> bool {
    use nix::sys::signal::kill;
    use nix::unistd::Pid;

    let Ok(raw) = i32::try_from(pid) else {
        return false;
    };
    match kill(Pid::from_raw(raw), None) {
        Ok(()) => true,
        // The process exists but belongs to someone else
        Err(nix::errno::Errno::EPERM) => true,
        Err(_) => false,
    }
}

/// Launches the real OpenVPN client
#[derive(Debug, Default, Clone, Copy)]
pub struct OpenVpnLauncher;

impl TunnelLauncher for OpenVpnLauncher {
    type Handle = TunnelProcess;

    fn launch(&self, request: &LaunchRequest) -> Result<TunnelProcess, SupervisorError> {
        ensure_parent_dir(&request.log_path)?;
        let log = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&request.log_path)
            .map_err(|source| SupervisorError::ArtifactWrite {
                path: request.log_path.clone(),
                source,
            })?;
        let log_err = log.try_clone().map_err(|source| SupervisorError::ArtifactWrite {
            path: request.log_path.clone(),
            source,
        })?;

        // Own process group so terminal signals aimed at the server do not
        // reach the client
        let mut std_cmd = std::process::Command::new(&request.program);
        std_cmd
            .args(request.args())
            .stdin(Stdio::null())
            .stdout(Stdio::from(log))
            .stderr(Stdio::from(log_err))
            .process_group(0);
        let mut cmd = Command::from(std_cmd);

        let child = cmd.spawn().map_err(|e| SupervisorError::LaunchFailed {
            reason: format!("Failed to spawn {}: {}", request.program, e),
        })?;

        let pid = child.id().ok_or_else(|| SupervisorError::LaunchFailed {
            reason: format!("{} exited before its PID could be read", request.program),
        })?;

        write_pid_file(&request.pid_path, pid)?;
        info!(
            pid,
            program = %request.program,
            log = %request.log_path.display(),
            "Tunnel client started in background"
        );

        Ok(TunnelProcess {
            pid: Some(pid),
            child: Some(child),
            log_path: request.log_path.clone(),
        })
    }
}

/// Record the client PID
pub fn write_pid_file(path: &Path, pid: u32) -> Result<(), SupervisorError> {
    ensure_parent_dir(path)?;
    fs::write(path, format!("{}\n", pid)).map_err(|source| SupervisorError::ArtifactWrite {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(pid, path = %path.display(), "Wrote pid file");
    Ok(())
}

fn ensure_parent_dir(path: &Path) -> Result<(), SupervisorError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| SupervisorError::ArtifactWrite {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}
