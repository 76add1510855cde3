//! Shell interpreters a command can be written for.

use serde::{Deserialize, Serialize};

use crate::platform::HostOs;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ShellKind {
    Sh,
    Bash,
    Bat,
    Cmd,
    Powershell,
    Zsh,
    Fish,
}

impl ShellKind {
    /// Prefix that runs a command string (or script path) in this shell.
    pub fn invocation(self) -> &'static str {
        match self {
            ShellKind::Sh => "sh -c",
            ShellKind::Bash => "bash -c",
            ShellKind::Bat | ShellKind::Cmd => "cmd.exe /c",
            ShellKind::Powershell => "powershell.exe -Command",
            ShellKind::Zsh => "zsh -c",
            ShellKind::Fish => "fish -c",
        }
    }

    /// File suffix for a materialized script.
    pub fn script_suffix(self) -> &'static str {
        match self {
            ShellKind::Bat | ShellKind::Cmd => ".bat",
            ShellKind::Powershell => ".ps1",
            ShellKind::Sh | ShellKind::Bash | ShellKind::Zsh | ShellKind::Fish => ".sh",
        }
    }

    /// Shells usable on a host operating system.
    pub fn for_host(host: HostOs) -> &'static [ShellKind] {
        match host {
            HostOs::Windows => &[ShellKind::Cmd, ShellKind::Bat, ShellKind::Powershell],
            HostOs::Linux | HostOs::Wsl => &[ShellKind::Bash, ShellKind::Sh, ShellKind::Zsh],
            HostOs::Mac => &[ShellKind::Bash, ShellKind::Zsh, ShellKind::Fish],
            HostOs::Unsupported => &[],
        }
    }

    pub fn supports(self, host: HostOs) -> bool {
        Self::for_host(host).contains(&self)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ShellKind::Sh => "sh",
            ShellKind::Bash => "bash",
            ShellKind::Bat => "bat",
            ShellKind::Cmd => "cmd",
            ShellKind::Powershell => "powershell",
            ShellKind::Zsh => "zsh",
            ShellKind::Fish => "fish",
        }
    }
}

impl std::fmt::Display for ShellKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
