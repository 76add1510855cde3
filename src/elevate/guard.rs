use crate::config::InstallVerb;
use crate::parse::{self, CommandSegment, ParsedCommand};

/// Detects commands whose purpose is installing the elevation tool itself.
///
/// Such commands keep whatever prefix they were written with.
pub struct SelfInstallGuard<'a> {
    pub tool: &'a str,
    pub package: &'a str,
    pub managers: &'a [InstallVerb],
}

impl SelfInstallGuard<'_> {
    /// True when any segment installs the elevation tool's package.
    pub fn is_installing_elevation_tool(&self, parsed: &ParsedCommand) -> bool {
        parsed.segments.iter().any(|s| self.segment_installs(s))
    }

    fn segment_installs(&self, segment: &CommandSegment) -> bool {
        let words = segment.without_tool(self.tool);
        let [manager, action, rest @ ..] = words else {
            return false;
        };
        if !self.is_install_verb(manager, action) {
            return false;
        }
        rest.iter()
            .filter(|w| !w.starts_with('-'))
            .map(|w| package_name(w))
            .any(|name| name.eq_ignore_ascii_case(self.package))
    }

    fn is_install_verb(&self, manager: &str, action: &str) -> bool {
        let manager = parse::base_command(manager);
        self.managers.iter().any(|m| {
            m.name.eq_ignore_ascii_case(&manager)
                && if m.action.starts_with('-') {
                    m.action == action
                } else {
                    m.action.eq_ignore_ascii_case(action)
                }
        })
    }
}

/// Package name with an `=version` pin removed (`sudo=1.9.5` → `sudo`).
fn package_name(word: &str) -> &str {
    word.split('=').next().unwrap_or(word)
}
