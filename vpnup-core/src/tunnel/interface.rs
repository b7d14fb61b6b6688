//! Tunnel interface and device node observation

use std::path::{Path, PathBuf};

/// Default sysfs directory listing network interfaces
pub const SYSFS_NET_DIR: &str = "/sys/class/net";

/// Answers whether a network interface currently exists
pub trait InterfaceProbe {
    fn is_present(&self, interface: &str) -> bool;
}

/// Interface probe reading `/sys/class/net/<name>`
#[derive(Debug, Clone)]
pub struct SysfsInterfaceProbe {
    root: PathBuf,
}

impl SysfsInterfaceProbe {
    /// Probe rooted at another directory
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Default for SysfsInterfaceProbe {
    fn default() -> Self {
        Self::with_root(SYSFS_NET_DIR)
    }
}

impl InterfaceProbe for SysfsInterfaceProbe {
    fn is_present(&self, interface: &str) -> bool {
        // Reject names that would escape the sysfs directory
        if interface.is_empty() || interface.contains('/') {
            return false;
        }
        self.root.join(interface).exists()
    }
}

/// Whether the TUN device node exists
///
/// The node is provided by the container runtime (`--device /dev/net/tun`);
/// nothing here attempts to create it.
pub fn device_present(path: &Path) -> bool {
    std::fs::metadata(path).is_ok()
}

/// Whether the path is a character device
pub fn is_char_device(path: &Path) -> bool {
    use std::os::unix::fs::FileTypeExt;

    std::fs::metadata(path)
        .map(|meta| meta.file_type().is_char_device())
        .unwrap_or(false)
}
