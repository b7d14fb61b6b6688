//! CLI command implementations
//!
//! This module contains the implementation of all CLI subcommands.

pub mod check;
pub mod status;
pub mod up;
