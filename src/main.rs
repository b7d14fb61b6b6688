//! vpnup - container entrypoint
//!
//! Brings up an OpenVPN tunnel from environment-supplied secrets, waits for
//! the interface, then replaces itself with the web server.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use vpnup_core::init_logging;

mod cli;

#[derive(Parser)]
#[command(name = "vpnup")]
#[command(about = "Bring up a VPN tunnel, then hand off to the web server")]
struct Cli {
    /// Settings file (defaults to /etc/vpnup/settings.toml when present)
    #[arg(long, global = true, env = "VPNUP_SETTINGS")]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Bring up the VPN, then exec the server
    Up,
    /// Exec the server without a VPN
    Serve,
    /// Validate secrets, device and client binary without side effects
    Check,
    /// Show tunnel client and interface status
    Status {
        /// Print machine-readable JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    // Initialize logging
    if let Err(e) = init_logging() {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(2);
    }

    let cli = Cli::parse();
    let settings = cli.settings.as_deref();

    let result = match cli.command {
        Commands::Up => cli::up::run_up(settings),
        Commands::Serve => cli::up::run_serve(),
        Commands::Check => cli::check::run_check(settings),
        Commands::Status { json } => cli::status::run_status(settings, json),
    };

    match result {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(e.exit_code());
        }
    }
}
