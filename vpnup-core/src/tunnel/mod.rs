//! Tunnel client module
//!
//! OS-facing capabilities used by the supervisor: launching OpenVPN,
//! observing the interface and probing connectivity.

pub mod connectivity;
pub mod interface;
pub mod process;

// Public re-exports
pub use connectivity::{ConnectivityProbe, HttpProbe, PingProbe, Probe, ProbeResult};
pub use interface::{device_present, InterfaceProbe, SysfsInterfaceProbe};
pub use process::{LaunchRequest, OpenVpnLauncher, ProcessHandle, TunnelLauncher, TunnelProcess};
