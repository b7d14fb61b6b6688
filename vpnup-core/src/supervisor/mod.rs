//! VPN bring-up supervisor
//!
//! Runs once per container start and ends either in a handoff to the server
//! or in a fatal exit.

pub mod artifacts;
pub mod bring_up;
pub mod state;

// Public re-exports
pub use bring_up::Supervisor;
pub use state::{BringUpPhase, BringUpReport, SupervisorOutcome};
