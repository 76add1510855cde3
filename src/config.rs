use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Embedded default configuration.
const DEFAULT_CONFIG: &str = include_str!("../config.default.toml");

/// Location of the user overlay, relative to `$HOME`.
const USER_CONFIG: &str = "~/.config/wsrun/config.toml";

// ── Final (merged) config types ──

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub elevation: ElevationConfig,
    #[serde(default)]
    pub self_install: SelfInstallConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    /// Terminal log level when `WSRUN_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Append to `~/.local/share/wsrun/run.log`.
    #[serde(default = "default_true")]
    pub log_file: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_file: true,
        }
    }
}

fn default_log_level() -> String {
    "info".into()
}

fn default_true() -> bool {
    true
}

/// Command tables driving the elevation decision.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ElevationConfig {
    /// Prefix word that elevates a command (e.g. `sudo`).
    #[serde(default)]
    pub tool: String,
    /// Package name that provides `tool`.
    #[serde(default)]
    pub package: String,
    #[serde(default)]
    pub unix_privileged: Vec<String>,
    #[serde(default)]
    pub windows_admin: Vec<String>,
    #[serde(default)]
    pub windows_net_admin_verbs: Vec<String>,
    #[serde(default)]
    pub cross_platform_net_verbs: Vec<String>,
}

/// A package manager and the action word that installs packages with it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct InstallVerb {
    pub name: String,
    pub action: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct SelfInstallConfig {
    #[serde(default)]
    pub managers: Vec<InstallVerb>,
}

// ── Overlay types (user config that merges with defaults) ──

#[derive(Debug, Deserialize, Default)]
struct ConfigOverlay {
    #[serde(default)]
    settings: SettingsOverlay,
    #[serde(default)]
    elevation: ElevationOverlay,
    #[serde(default)]
    self_install: SelfInstallOverlay,
}

#[derive(Debug, Deserialize, Default)]
struct SettingsOverlay {
    log_level: Option<String>,
    log_file: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
struct ElevationOverlay {
    #[serde(default)]
    replace: bool,
    tool: Option<String>,
    package: Option<String>,
    #[serde(default)]
    unix_privileged: Vec<String>,
    #[serde(default)]
    windows_admin: Vec<String>,
    #[serde(default)]
    windows_net_admin_verbs: Vec<String>,
    #[serde(default)]
    cross_platform_net_verbs: Vec<String>,
    #[serde(default)]
    remove_unix_privileged: Vec<String>,
    #[serde(default)]
    remove_windows_admin: Vec<String>,
    #[serde(default)]
    remove_windows_net_admin_verbs: Vec<String>,
    #[serde(default)]
    remove_cross_platform_net_verbs: Vec<String>,
}

#[derive(Debug, Deserialize, Default)]
struct SelfInstallOverlay {
    #[serde(default)]
    replace: bool,
    #[serde(default)]
    managers: Vec<InstallVerb>,
    /// Manager names whose entries are dropped.
    #[serde(default)]
    remove_managers: Vec<String>,
}

// ── Merge logic ──

/// Merge a user list into a default list.
/// In replace mode: user list replaces default entirely.
/// In merge mode: remove items first, then extend with additions (deduped).
fn merge_list<T: PartialEq>(base: &mut Vec<T>, add: Vec<T>, remove: &[T], replace: bool) {
    if replace {
        *base = add;
    } else {
        base.retain(|item| !remove.contains(item));
        for item in add {
            if !base.contains(&item) {
                base.push(item);
            }
        }
    }
}

impl Config {
    /// Load the default embedded configuration.
    pub fn default_config() -> Self {
        toml::from_str(DEFAULT_CONFIG).expect("embedded default config must parse")
    }

    /// Load configuration with resolution order:
    /// 1. Start with embedded defaults
    /// 2. Merge user overlay from ~/.config/wsrun/config.toml (if it exists)
    pub fn load() -> Result<Self, ConfigError> {
        let path = PathBuf::from(shellexpand::tilde(USER_CONFIG).into_owned());
        if !path.exists() {
            return Ok(Self::default_config());
        }
        Self::load_with_overlay(&path)
    }

    /// Defaults merged with the overlay file at `path`.
    pub fn load_with_overlay(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let overlay: ConfigOverlay =
            toml::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        let mut config = Self::default_config();
        config.apply_overlay(overlay);
        log::debug!("merged config overlay from {}", path.display());
        Ok(config)
    }

    /// Serialize the merged configuration (for `--dump-config`).
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Apply an overlay on top of this config (merge semantics).
    fn apply_overlay(&mut self, overlay: ConfigOverlay) {
        // Settings: scalar overrides
        if let Some(v) = overlay.settings.log_level {
            self.settings.log_level = v;
        }
        if let Some(v) = overlay.settings.log_file {
            self.settings.log_file = v;
        }

        // Elevation
        let e = overlay.elevation;
        if let Some(v) = e.tool {
            self.elevation.tool = v;
        }
        if let Some(v) = e.package {
            self.elevation.package = v;
        }
        merge_list(
            &mut self.elevation.unix_privileged,
            e.unix_privileged,
            &e.remove_unix_privileged,
            e.replace,
        );
        merge_list(
            &mut self.elevation.windows_admin,
            e.windows_admin,
            &e.remove_windows_admin,
            e.replace,
        );
        merge_list(
            &mut self.elevation.windows_net_admin_verbs,
            e.windows_net_admin_verbs,
            &e.remove_windows_net_admin_verbs,
            e.replace,
        );
        merge_list(
            &mut self.elevation.cross_platform_net_verbs,
            e.cross_platform_net_verbs,
            &e.remove_cross_platform_net_verbs,
            e.replace,
        );

        // Self-install managers: removal is by manager name
        let s = overlay.self_install;
        if s.replace {
            self.self_install.managers = s.managers;
        } else {
            self.self_install
                .managers
                .retain(|m| !s.remove_managers.contains(&m.name));
            merge_list(&mut self.self_install.managers, s.managers, &[], false);
        }
    }

    /// Apply an overlay from a TOML string. Used for testing.
    #[cfg(test)]
    fn apply_overlay_str(&mut self, toml_str: &str) {
        let overlay: ConfigOverlay = toml::from_str(toml_str).unwrap();
        self.apply_overlay(overlay);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_parses() {
        let config = Config::default_config();
        assert_eq!(config.elevation.tool, "sudo");
        assert_eq!(config.elevation.package, "sudo");
        assert!(!config.elevation.unix_privileged.is_empty());
        assert!(!config.elevation.windows_admin.is_empty());
        assert_eq!(config.self_install.managers.len(), 6);
    }

    #[test]
    fn default_config_has_expected_commands() {
        let config = Config::default_config();
        let e = &config.elevation;
        assert!(e.unix_privileged.contains(&"apt-get".to_string()));
        assert!(e.unix_privileged.contains(&"systemctl".to_string()));
        assert!(e.windows_admin.contains(&"diskpart".to_string()));
        assert!(e.windows_net_admin_verbs.contains(&"localgroup".to_string()));
        assert!(config.self_install.managers.contains(&InstallVerb {
            name: "pacman".into(),
            action: "-S".into(),
        }));
    }

    #[test]
    fn default_settings() {
        let config = Config::default_config();
        assert_eq!(config.settings.log_level, "info");
        assert!(config.settings.log_file);
    }

    // ── Merge semantics ──

    #[test]
    fn overlay_extends_privileged_list() {
        let mut config = Config::default_config();
        config.apply_overlay_str(
            r#"
            [elevation]
            unix_privileged = ["snap"]
        "#,
        );
        assert!(config.elevation.unix_privileged.contains(&"apt".to_string()));
        assert!(config.elevation.unix_privileged.contains(&"snap".to_string()));
    }

    #[test]
    fn overlay_removes_from_privileged_list() {
        let mut config = Config::default_config();
        config.apply_overlay_str(
            r#"
            [elevation]
            remove_unix_privileged = ["mount", "umount"]
        "#,
        );
        assert!(!config.elevation.unix_privileged.contains(&"mount".to_string()));
        assert!(!config.elevation.unix_privileged.contains(&"umount".to_string()));
        assert!(config.elevation.unix_privileged.contains(&"apt".to_string()));
    }

    #[test]
    fn overlay_replace_elevation() {
        let mut config = Config::default_config();
        config.apply_overlay_str(
            r#"
            [elevation]
            replace = true
            tool = "doas"
            package = "opendoas"
            unix_privileged = ["apk"]
        "#,
        );
        assert_eq!(config.elevation.tool, "doas");
        assert_eq!(config.elevation.package, "opendoas");
        assert_eq!(config.elevation.unix_privileged, vec!["apk"]);
        assert!(config.elevation.windows_admin.is_empty());
    }

    #[test]
    fn overlay_no_duplicates() {
        let mut config = Config::default_config();
        config.apply_overlay_str(
            r#"
            [elevation]
            unix_privileged = ["apt"]
        "#,
        );
        let count = config
            .elevation
            .unix_privileged
            .iter()
            .filter(|s| *s == "apt")
            .count();
        assert_eq!(count, 1);
    }

    #[test]
    fn overlay_self_install_managers() {
        let mut config = Config::default_config();
        config.apply_overlay_str(
            r#"
            [self_install]
            remove_managers = ["zypper"]

            [[self_install.managers]]
            name = "apk"
            action = "add"
        "#,
        );
        let names: Vec<&str> = config
            .self_install
            .managers
            .iter()
            .map(|m| m.name.as_str())
            .collect();
        assert!(!names.contains(&"zypper"));
        assert!(names.contains(&"apk"));
        assert!(names.contains(&"pacman"));
    }

    #[test]
    fn overlay_settings() {
        let mut config = Config::default_config();
        config.apply_overlay_str(
            r#"
            [settings]
            log_level = "debug"
            log_file = false
        "#,
        );
        assert_eq!(config.settings.log_level, "debug");
        assert!(!config.settings.log_file);
    }

    #[test]
    fn empty_overlay_changes_nothing() {
        let original = Config::default_config();
        let mut config = Config::default_config();
        config.apply_overlay_str("");
        assert_eq!(
            config.elevation.unix_privileged,
            original.elevation.unix_privileged
        );
        assert_eq!(config.elevation.tool, original.elevation.tool);
    }

    #[test]
    fn overlay_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[elevation]\nwindows_admin = [\"wevtutil\"]\n").unwrap();
        let config = Config::load_with_overlay(&path).unwrap();
        assert!(config.elevation.windows_admin.contains(&"wevtutil".to_string()));
    }

    #[test]
    fn overlay_parse_error_names_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[elevation\n").unwrap();
        let err = Config::load_with_overlay(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn dump_round_trips() {
        let config = Config::default_config();
        let text = config.to_toml().unwrap();
        let back: Config = toml::from_str(&text).unwrap();
        assert_eq!(back.elevation.unix_privileged, config.elevation.unix_privileged);
    }
}
