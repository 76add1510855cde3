pub mod decision;
pub mod guard;
pub mod permissions;
pub mod probe;

pub use decision::{ElevationDecision, Explanation, SegmentReport};
pub use guard::SelfInstallGuard;
pub use probe::{ElevationProbe, PathLocator, ToolLocator};

use crate::config::{Config, ElevationConfig, InstallVerb};
use crate::parse::{self, CommandSegment, InputKind, ParsedCommand};
use crate::platform::Platform;

/// Decides and applies the elevation prefix for tokenized commands.
#[derive(Debug)]
pub struct ElevationEngine {
    tables: ElevationConfig,
    managers: Vec<InstallVerb>,
    probe: ElevationProbe,
}

impl ElevationEngine {
    /// Build the engine from configuration with an explicit probe.
    pub fn new(config: &Config, probe: ElevationProbe) -> Self {
        Self {
            tables: config.elevation.clone(),
            managers: config.self_install.managers.clone(),
            probe,
        }
    }

    /// Build the engine with a probe that searches `PATH`.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config, ElevationProbe::from_path(&config.elevation.tool))
    }

    pub fn probe(&self) -> &ElevationProbe {
        &self.probe
    }

    /// The elevation prefix word.
    pub fn tool(&self) -> &str {
        &self.tables.tool
    }

    fn guard(&self) -> SelfInstallGuard<'_> {
        SelfInstallGuard {
            tool: &self.tables.tool,
            package: &self.tables.package,
            managers: &self.managers,
        }
    }

    /// True when the command installs the elevation tool itself.
    pub fn is_installing_elevation_tool(&self, parsed: &ParsedCommand) -> bool {
        self.guard().is_installing_elevation_tool(parsed)
    }

    /// Whether one segment needs the elevation prefix on `platform`.
    pub fn needs_elevation(&self, segment: &CommandSegment, platform: Platform) -> bool {
        self.decide(segment, platform).elevate
    }

    /// Whole-command form: false as soon as any segment is already
    /// elevated, otherwise true when some segment needs elevation.
    pub fn command_needs_elevation(&self, parsed: &ParsedCommand, platform: Platform) -> bool {
        if parsed
            .segments
            .iter()
            .any(|s| s.starts_with_tool(&self.tables.tool))
        {
            return false;
        }
        parsed
            .segments
            .iter()
            .any(|s| self.needs_elevation(s, platform))
    }

    /// Decide for one segment, with the reason.
    pub fn decide(&self, segment: &CommandSegment, platform: Platform) -> ElevationDecision {
        if !self.probe.is_available() {
            return ElevationDecision::keep(format!("{} not available", self.tables.tool));
        }
        if segment.starts_with_tool(&self.tables.tool) {
            return ElevationDecision::keep("already elevated");
        }
        let Some(first) = segment.first() else {
            return ElevationDecision::keep("empty");
        };
        let base = parse::base_command(first);
        let verb = segment.words.get(1).map(|w| w.to_ascii_lowercase());

        match platform {
            Platform::Windows => {
                if !contains(&self.tables.windows_admin, &base) {
                    return ElevationDecision::keep(format!("not an admin command: {base}"));
                }
                if base != "net" {
                    return ElevationDecision::elevate(format!("admin command: {base}"));
                }
                match verb {
                    Some(v) if contains(&self.tables.windows_net_admin_verbs, &v) => {
                        ElevationDecision::elevate(format!("admin command: net {v}"))
                    }
                    _ => ElevationDecision::keep("net without an admin verb"),
                }
            }
            Platform::Unix => {
                if base == "net"
                    && let Some(v) = verb
                    && contains(&self.tables.cross_platform_net_verbs, &v)
                {
                    return ElevationDecision::elevate(format!("admin command: net {v}"));
                }
                if contains(&self.tables.unix_privileged, &base) {
                    return ElevationDecision::elevate(format!("privileged command: {base}"));
                }
                // Dotted command fallback (e.g. mkfs.ext4 → mkfs)
                if let Some(prefix) = base.split('.').next()
                    && prefix != base
                    && contains(&self.tables.unix_privileged, prefix)
                {
                    return ElevationDecision::elevate(format!("privileged command: {base}"));
                }
                if permissions::lacks_execute_permission(first) {
                    return ElevationDecision::elevate(format!("not executable by user: {first}"));
                }
                ElevationDecision::keep(format!("unprivileged command: {base}"))
            }
        }
    }

    /// Apply elevation decisions to every segment.
    ///
    /// Scripts and self-install commands come back unchanged. On Windows
    /// any elevation prefix is stripped and never added; on Unix the
    /// prefix is prepended to segments that need it.
    pub fn rewrite(&self, parsed: &ParsedCommand, platform: Platform) -> ParsedCommand {
        if parsed.kind == InputKind::Script {
            return parsed.clone();
        }
        if self.is_installing_elevation_tool(parsed) {
            log::debug!("installing {}; leaving prefixes as written", self.tables.package);
            return parsed.clone();
        }
        let tool = &self.tables.tool;
        let segments = match platform {
            Platform::Windows => parsed
                .segments
                .iter()
                .map(|s| CommandSegment::new(s.without_tool(tool).to_vec()))
                .collect(),
            Platform::Unix => parsed
                .segments
                .iter()
                .map(|s| {
                    let decision = self.decide(s, platform);
                    log::debug!("[{}] elevate={}: {}", s.to_text(), decision.elevate, decision.reason);
                    if decision.elevate {
                        let mut words = Vec::with_capacity(s.words.len() + 1);
                        words.push(tool.clone());
                        words.extend(s.words.iter().cloned());
                        CommandSegment::new(words)
                    } else {
                        s.clone()
                    }
                })
                .collect(),
        };
        ParsedCommand {
            kind: parsed.kind,
            segments,
            operators: parsed.operators.clone(),
        }
    }

    /// Remove a leading elevation prefix (and its flags) from every
    /// segment, unless the command installs the elevation tool.
    pub fn strip_elevation(&self, parsed: &ParsedCommand) -> ParsedCommand {
        if parsed.kind == InputKind::Script || self.is_installing_elevation_tool(parsed) {
            return parsed.clone();
        }
        ParsedCommand {
            kind: parsed.kind,
            segments: parsed
                .segments
                .iter()
                .map(|s| CommandSegment::new(s.without_tool(&self.tables.tool).to_vec()))
                .collect(),
            operators: parsed.operators.clone(),
        }
    }

    /// Describe decisions and the rewritten form without executing.
    pub fn explain(&self, parsed: &ParsedCommand, platform: Platform) -> Explanation {
        Explanation {
            platform: platform.as_str(),
            elevation_available: self.probe.is_available(),
            self_install: self.is_installing_elevation_tool(parsed),
            segments: parsed
                .segments
                .iter()
                .map(|s| SegmentReport {
                    command: s.to_text(),
                    decision: self.decide(s, platform),
                })
                .collect(),
            operators: parsed.operators.iter().map(|o| o.as_str()).collect(),
            rewritten: self.rewrite(parsed, platform).reconstruct().to_text(),
        }
    }
}

fn contains(list: &[String], name: &str) -> bool {
    list.iter().any(|s| s.eq_ignore_ascii_case(name))
}
