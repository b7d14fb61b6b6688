//! Handoff to the web server
//!
//! The server replaces the supervisor's process image; it is never run as a
//! child. Its launch flags are fixed constants.

use std::os::unix::process::CommandExt;
use std::process::Command;
use tracing::info;

/// Server executable
pub const SERVER_PROGRAM: &str = "uvicorn";
/// ASGI application served
pub const SERVER_APP: &str = "app.main:app";
/// Bind address (all interfaces)
pub const BIND_ADDRESS: &str = "0.0.0.0";
/// Listen port
pub const PORT: u16 = 8080;
/// Worker processes
pub const WORKERS: u32 = 1;
/// Maximum simultaneous in-flight requests
pub const CONCURRENCY_LIMIT: u32 = 10;
/// Keep-alive timeout in seconds
pub const KEEP_ALIVE_SECS: u64 = 30;

/// Program and arguments the supervisor execs into
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerLaunchSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl Default for ServerLaunchSpec {
    fn default() -> Self {
        Self {
            program: SERVER_PROGRAM.to_string(),
            args: vec![
                SERVER_APP.to_string(),
                "--host".to_string(),
                BIND_ADDRESS.to_string(),
                "--port".to_string(),
                PORT.to_string(),
                "--workers".to_string(),
                WORKERS.to_string(),
                "--limit-concurrency".to_string(),
                CONCURRENCY_LIMIT.to_string(),
                "--timeout-keep-alive".to_string(),
                KEEP_ALIVE_SECS.to_string(),
            ],
        }
    }
}

impl ServerLaunchSpec {
    /// Human-readable command line for logs
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Replace the current process with the server
///
/// Only returns if the exec itself failed.
pub fn exec_server(spec: &ServerLaunchSpec) -> std::io::Error {
    info!(command = %spec.command_line(), "Handing off to server");
    Command::new(&spec.program).args(&spec.args).exec()
}
