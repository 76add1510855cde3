//! Host operating system, target platform family and Linux distribution
//! matching.

use serde::Serialize;

/// Platform family that decides how elevation is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Elevation is reported, never injected as a prefix word.
    Windows,
    /// Elevation is a prefix word (`sudo`).
    Unix,
}

impl Platform {
    /// Platform family of the running host.
    pub fn host() -> Self {
        HostOs::detect().platform()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Windows => "windows",
            Platform::Unix => "unix",
        }
    }
}

/// Operating system of the running host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HostOs {
    Windows,
    Linux,
    Mac,
    Wsl,
    Unsupported,
}

impl HostOs {
    pub fn detect() -> Self {
        match std::env::consts::OS {
            "windows" => HostOs::Windows,
            "macos" => HostOs::Mac,
            "linux" if is_wsl() => HostOs::Wsl,
            "linux" => HostOs::Linux,
            other => {
                log::error!("unsupported operating system: {other}");
                HostOs::Unsupported
            }
        }
    }

    pub fn platform(self) -> Platform {
        match self {
            HostOs::Windows => Platform::Windows,
            HostOs::Linux | HostOs::Mac | HostOs::Wsl | HostOs::Unsupported => Platform::Unix,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HostOs::Windows => "windows",
            HostOs::Linux => "linux",
            HostOs::Mac => "mac",
            HostOs::Wsl => "wsl",
            HostOs::Unsupported => "unsupported",
        }
    }
}

impl std::fmt::Display for HostOs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn is_wsl() -> bool {
    if std::env::var_os("WSL_DISTRO_NAME").is_some() {
        return true;
    }
    std::fs::read_to_string("/proc/sys/kernel/osrelease")
        .map(|r| r.to_ascii_lowercase().contains("microsoft"))
        .unwrap_or(false)
}

/// Linux distribution families whose package tooling is interchangeable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistFamily {
    Debian,
    Fedora,
    Centos,
}

/// Family of a distribution `ID` as found in `/etc/os-release`.
pub fn dist_family(id: &str) -> Option<DistFamily> {
    match id.to_ascii_lowercase().as_str() {
        "ubuntu" | "debian" | "linuxmint" | "pop" => Some(DistFamily::Debian),
        "fedora" | "rocky" | "almalinux" => Some(DistFamily::Fedora),
        "centos" | "rhel" | "oracle" => Some(DistFamily::Centos),
        _ => None,
    }
}

/// True when both distributions belong to the same known family.
pub fn same_dist_family(wanted: &str, host: &str) -> bool {
    match (dist_family(wanted), dist_family(host)) {
        (Some(a), Some(b)) if a == b => true,
        _ => {
            log::warn!("unsupported Linux distribution: config: {wanted} host: {host}");
            false
        }
    }
}

/// `ID` of the running distribution, read from `/etc/os-release`.
pub fn host_dist_id() -> Option<String> {
    let content = std::fs::read_to_string("/etc/os-release").ok()?;
    parse_os_release_id(&content)
}

fn parse_os_release_id(content: &str) -> Option<String> {
    content.lines().find_map(|line| {
        let value = line.trim().strip_prefix("ID=")?;
        let value = value.trim_matches(|c| c == '"' || c == '\'');
        (!value.is_empty()).then(|| value.to_ascii_lowercase())
    })
}
