//! Integration tests for the vpnup binary
//!
//! Only the failure paths are exercised end to end: success ends in an exec
//! of the server, which cannot be observed from here.

use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

const VPNUP_BINARY: &str = env!("CARGO_BIN_EXE_vpnup");

/// Settings file placing every artifact (and the TUN node) in `dir`
fn write_settings(dir: &Path, max_attempts: u32) -> std::path::PathBuf {
    let settings = format!(
        r#"
[paths]
credentials = "{dir}/credentials.txt"
tunnel_config = "{dir}/client.conf"
client_log = "{dir}/openvpn.log"
client_pid = "{dir}/openvpn.pid"
tun_device = "{dir}/tun"

[tunnel]
client_program = "true"

[polling]
max_attempts = {max_attempts}
interval_secs = 1
stabilization_secs = 0
"#,
        dir = dir.display(),
        max_attempts = max_attempts
    );
    let path = dir.join("settings.toml");
    std::fs::write(&path, settings).unwrap();
    path
}

fn vpnup(args: &[&str], env: &[(&str, &str)]) -> Output {
    let mut cmd = Command::new(VPNUP_BINARY);
    cmd.args(args)
        .env_remove("VPN_USERNAME")
        .env_remove("VPN_PASSWORD")
        .env_remove("VPN_CONFIG")
        .env_remove("VPNUP_SETTINGS")
        .env_remove("JOURNAL_STREAM");
    for (key, value) in env {
        cmd.env(key, value);
    }
    cmd.output().expect("Failed to run vpnup")
}

const SECRETS: [(&str, &str); 3] = [
    ("VPN_USERNAME", "u"),
    ("VPN_PASSWORD", "p"),
    ("VPN_CONFIG", "cfg-text"),
];

#[test]
fn test_help_lists_subcommands() {
    let output = vpnup(&["--help"], &[]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for subcommand in ["up", "serve", "check", "status"] {
        assert!(stdout.contains(subcommand), "help should mention {}", subcommand);
    }
}

#[test]
fn test_up_without_secrets_exits_1_and_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let settings = write_settings(temp_dir.path(), 3);
    std::fs::write(temp_dir.path().join("tun"), "").unwrap();

    let output = vpnup(&["--settings", settings.to_str().unwrap(), "up"], &[]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("VPN_USERNAME"));
    assert!(!temp_dir.path().join("credentials.txt").exists());
    assert!(!temp_dir.path().join("client.conf").exists());
    assert!(!temp_dir.path().join("openvpn.pid").exists());
}

#[test]
fn test_up_without_device_never_starts_client() {
    let temp_dir = TempDir::new().unwrap();
    let settings = write_settings(temp_dir.path(), 3);

    let output = vpnup(&["--settings", settings.to_str().unwrap(), "up"], &SECRETS);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("TUN device"));
    assert!(temp_dir.path().join("credentials.txt").exists());
    assert!(!temp_dir.path().join("openvpn.pid").exists());
}

#[test]
fn test_up_interface_timeout_dumps_log() {
    let temp_dir = TempDir::new().unwrap();
    let settings = write_settings(temp_dir.path(), 2);
    std::fs::write(temp_dir.path().join("tun"), "").unwrap();
    std::fs::write(
        temp_dir.path().join("openvpn.log"),
        "TLS Error: TLS handshake failed\n",
    )
    .unwrap();

    // Use an interface name that cannot exist
    let settings_text = std::fs::read_to_string(&settings).unwrap().replace(
        "[tunnel]\n",
        "[tunnel]\ninterface = \"vpnup-test-none\"\n",
    );
    std::fs::write(&settings, settings_text).unwrap();

    let output = vpnup(&["--settings", settings.to_str().unwrap(), "up"], &SECRETS);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Waiting for vpnup-test-none (1/2)"));
    assert!(stderr.contains("Waiting for vpnup-test-none (2/2)"));
    assert!(stderr.contains("did not appear after 2 attempts"));
    assert!(stderr.contains("TLS handshake failed"));
    assert!(temp_dir.path().join("openvpn.pid").exists());
}

#[test]
fn test_check_reports_missing_secret() {
    let temp_dir = TempDir::new().unwrap();
    let settings = write_settings(temp_dir.path(), 3);
    std::fs::write(temp_dir.path().join("tun"), "").unwrap();

    let output = vpnup(&["--settings", settings.to_str().unwrap(), "check"], &[]);

    assert_eq!(output.status.code(), Some(1));
    assert!(!temp_dir.path().join("credentials.txt").exists());
}

#[test]
fn test_missing_secret_reported_before_invalid_settings() {
    let temp_dir = TempDir::new().unwrap();
    let settings = temp_dir.path().join("settings.toml");
    std::fs::write(&settings, "[polling]\nmax_attempts = 0\n").unwrap();

    let output = vpnup(&["--settings", settings.to_str().unwrap(), "up"], &[]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("VPN_USERNAME"));
}

#[test]
fn test_invalid_settings_exit_2() {
    let temp_dir = TempDir::new().unwrap();
    let settings = temp_dir.path().join("settings.toml");
    std::fs::write(&settings, "[polling]\nmax_attempts = 0\n").unwrap();

    let output = vpnup(&["--settings", settings.to_str().unwrap(), "up"], &SECRETS);

    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_status_json_without_client() {
    let temp_dir = TempDir::new().unwrap();
    let settings = write_settings(temp_dir.path(), 3);

    let output = vpnup(
        &["--settings", settings.to_str().unwrap(), "status", "--json"],
        &[],
    );

    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["pid"], serde_json::Value::Null);
    assert_eq!(report["client_running"], false);
    assert_eq!(report["interface"], "tun0");
}
