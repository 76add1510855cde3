//! Provisioning plans: named groups of shell commands run in a phase.
//!
//! A plan is a TOML document mapping group names to either a list of
//! command entries or a table with `commands` and `execution_order`:
//!
//! ```toml
//! [[dotfiles]]
//! shell = "bash"
//! execute = "git clone https://example.com/dotfiles ~/.dotfiles"
//!
//! [packages]
//! execution_order = "before"
//! [[packages.commands]]
//! shell = "bash"
//! os_dist = "ubuntu"
//! execute = [
//!     { run = "apt-get update", elevate = true },
//!     { run = "apt-get install -y curl", elevate = true, fail_on_error = true },
//! ]
//! ```

pub mod output_store;
pub mod runner;

pub use output_store::OutputStore;
pub use runner::{RunSummary, Runner};

use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::platform::Platform;
use crate::shell::ShellKind;

/// One command to run, with its failure policy.
///
/// Deserializes from a bare string (`"echo hi"`) or a table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "ExecutionRepr")]
pub struct CommandExecution {
    pub run: String,
    pub args: Option<Vec<String>>,
    /// Abort the whole run when this command fails.
    pub fail_on_error: bool,
    /// Exit codes accepted in addition to `0`.
    pub valid_exit_codes: Option<Vec<i32>>,
    /// Store trimmed stdout under this name for later substitution.
    pub saved_output_name: Option<String>,
    /// Prefix with the elevation tool on Unix.
    pub elevate: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ExecutionRepr {
    Bare(String),
    Full(ExecutionFields),
}

#[derive(Deserialize)]
struct ExecutionFields {
    run: String,
    #[serde(default)]
    args: Option<Vec<String>>,
    #[serde(default)]
    fail_on_error: bool,
    #[serde(default)]
    valid_exit_codes: Option<Vec<i32>>,
    #[serde(default)]
    saved_output_name: Option<String>,
    #[serde(default)]
    elevate: bool,
}

impl From<ExecutionRepr> for CommandExecution {
    fn from(repr: ExecutionRepr) -> Self {
        match repr {
            ExecutionRepr::Bare(run) => CommandExecution::new(run),
            ExecutionRepr::Full(f) => CommandExecution {
                run: f.run,
                args: f.args,
                fail_on_error: f.fail_on_error,
                valid_exit_codes: f.valid_exit_codes,
                saved_output_name: f.saved_output_name,
                elevate: f.elevate,
            },
        }
    }
}

impl CommandExecution {
    pub fn new(run: impl Into<String>) -> Self {
        Self {
            run: run.into(),
            args: None,
            fail_on_error: false,
            valid_exit_codes: None,
            saved_output_name: None,
            elevate: false,
        }
    }

    pub fn is_multiline(&self) -> bool {
        self.run.contains('\n')
    }

    /// `valid_exit_codes` plus `0`.
    pub fn accepted_exit_codes(&self) -> Vec<i32> {
        let mut codes = self.valid_exit_codes.clone().unwrap_or_default();
        if !codes.contains(&0) {
            codes.push(0);
        }
        codes
    }

    /// Text handed to the executor.
    ///
    /// Multi-line `run` text comes back as a script body, each non-blank
    /// line prefixed with `tool` when elevating on Unix. Anything else is
    /// wrapped as `<shell prefix> "<run> <args>"`.
    pub fn create_command(&self, shell: ShellKind, platform: Platform, tool: &str) -> String {
        let elevate = self.elevate && platform == Platform::Unix;
        if self.is_multiline() {
            if !elevate {
                return self.run.clone();
            }
            return self
                .run
                .split('\n')
                .map(|line| {
                    if line.trim().is_empty() {
                        line.to_string()
                    } else {
                        format!("{tool} {line}")
                    }
                })
                .collect::<Vec<_>>()
                .join("\n");
        }

        let mut cmd = if elevate {
            format!("{tool} {}", self.run)
        } else {
            self.run.clone()
        };
        if let Some(args) = &self.args
            && !args.is_empty()
        {
            cmd.push(' ');
            cmd.push_str(&args.join(" "));
        }
        format!("{} \"{}\"", shell.invocation(), escape_double_quoted(&cmd))
    }
}

fn escape_double_quoted(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c == '\\' || c == '"' {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Commands written for one shell, optionally limited to a distribution.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CommandEntry {
    pub shell: ShellKind,
    #[serde(default)]
    pub os_dist: Option<String>,
    #[serde(deserialize_with = "one_or_many")]
    pub execute: Vec<CommandExecution>,
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<CommandExecution>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        Many(Vec<CommandExecution>),
        One(CommandExecution),
    }
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::Many(v) => v,
        OneOrMany::One(e) => vec![e],
    })
}

/// Phase in which a group runs, relative to the rest of provisioning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionOrder {
    Before,
    #[default]
    After,
}

impl ExecutionOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            ExecutionOrder::Before => "before",
            ExecutionOrder::After => "after",
        }
    }
}

impl FromStr for ExecutionOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "before" => Ok(ExecutionOrder::Before),
            "after" => Ok(ExecutionOrder::After),
            other => Err(format!("unknown execution order `{other}`")),
        }
    }
}

impl std::fmt::Display for ExecutionOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "GroupRepr")]
pub struct CommandGroup {
    pub commands: Vec<CommandEntry>,
    pub execution_order: ExecutionOrder,
}

/// A bare list is the older group form and always runs `after`.
#[derive(Deserialize)]
#[serde(untagged)]
enum GroupRepr {
    List(Vec<CommandEntry>),
    Table {
        commands: Vec<CommandEntry>,
        #[serde(default)]
        execution_order: ExecutionOrder,
    },
}

impl From<GroupRepr> for CommandGroup {
    fn from(repr: GroupRepr) -> Self {
        match repr {
            GroupRepr::List(commands) => CommandGroup {
                commands,
                execution_order: ExecutionOrder::After,
            },
            GroupRepr::Table {
                commands,
                execution_order,
            } => CommandGroup {
                commands,
                execution_order,
            },
        }
    }
}

/// Named command groups, iterated in name order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Plan {
    pub groups: BTreeMap<String, CommandGroup>,
}

impl Plan {
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Groups scheduled for `phase`.
    pub fn groups_for(
        &self,
        phase: ExecutionOrder,
    ) -> impl Iterator<Item = (&str, &CommandGroup)> + '_ {
        self.groups
            .iter()
            .filter(move |(_, g)| g.execution_order == phase)
            .map(|(name, g)| (name.as_str(), g))
    }
}
