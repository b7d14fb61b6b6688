//! Core library for the vpnup container entrypoint
//!
//! This crate provides the VPN bring-up supervisor, the capabilities it
//! drives (OpenVPN launch, interface observation, connectivity probing) and
//! the handoff to the web server.

pub mod error;
pub mod types;

pub mod clock;
pub mod config;
pub mod handoff;
pub mod supervisor;
pub mod tunnel;

/// Initialize logging infrastructure
///
/// Logs go to the systemd journal when running under systemd and to stderr
/// otherwise. `VPNUP_DEBUG=1` lowers the level to DEBUG.
pub fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    use tracing_subscriber::filter::LevelFilter;
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let level = if std::env::var("VPNUP_DEBUG").is_ok_and(|v| v == "1") {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };

    #[cfg(target_os = "linux")]
    {
        if std::env::var("JOURNAL_STREAM").is_ok() {
            let journal_layer = tracing_journald::layer()?;
            tracing_subscriber::registry()
                .with(journal_layer)
                .with(level)
                .init();
            return Ok(());
        }
    }

    // Container logs: stderr, stdout belongs to command output
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(level)
        .init();

    Ok(())
}
