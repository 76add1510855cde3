//! Runs plan groups through the executor.

use crate::config::Config;
use crate::error::PlanError;
use crate::exec::{ExecutionRequest, Executor};
use crate::parse::CommandInput;
use crate::platform::{self, HostOs};

use super::{CommandEntry, CommandExecution, ExecutionOrder, OutputStore, Plan};

/// Counts for one run. `failed` covers executions that were logged and
/// skipped past, never the one that aborted a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub executed: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Entries skipped for an incompatible shell or distribution.
    pub skipped: usize,
}

impl std::ops::AddAssign for RunSummary {
    fn add_assign(&mut self, other: Self) {
        self.executed += other.executed;
        self.succeeded += other.succeeded;
        self.failed += other.failed;
        self.skipped += other.skipped;
    }
}

#[derive(Debug)]
pub struct Runner {
    executor: Executor,
    host: HostOs,
    host_dist: Option<String>,
    store: OutputStore,
}

impl Runner {
    pub fn new(executor: Executor, host: HostOs, host_dist: Option<String>) -> Self {
        Self {
            executor,
            host,
            host_dist,
            store: OutputStore::new(),
        }
    }

    /// Runner for the detected host.
    pub fn from_config(config: &Config) -> Self {
        let host = HostOs::detect();
        let host_dist = match host {
            HostOs::Linux | HostOs::Wsl => platform::host_dist_id(),
            _ => None,
        };
        log::debug!("host: {host}, distribution: {host_dist:?}");
        Self::new(Executor::from_config(config), host, host_dist)
    }

    pub fn store(&self) -> &OutputStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut OutputStore {
        &mut self.store
    }

    /// Run every group scheduled for `phase`, in name order.
    pub fn run_plan(&mut self, plan: &Plan, phase: ExecutionOrder) -> Result<RunSummary, PlanError> {
        let mut summary = RunSummary::default();
        for (name, group) in plan.groups_for(phase) {
            summary += self.run_group(name, &group.commands)?;
        }
        Ok(summary)
    }

    pub fn run_group(
        &mut self,
        name: &str,
        entries: &[CommandEntry],
    ) -> Result<RunSummary, PlanError> {
        log::info!("Running command group: {name}");
        let mut summary = RunSummary::default();

        for entry in entries {
            if !self.entry_applies(entry) {
                summary.skipped += 1;
                continue;
            }
            for execution in &entry.execute {
                summary.executed += 1;
                if self.run_execution(name, entry, execution)? {
                    summary.succeeded += 1;
                } else {
                    summary.failed += 1;
                }
            }
        }
        Ok(summary)
    }

    fn entry_applies(&self, entry: &CommandEntry) -> bool {
        if !entry.shell.supports(self.host) {
            log::warn!(
                "Found incompatible shell type for current OS ({}): {}",
                self.host,
                entry.shell
            );
            return false;
        }
        match (&entry.os_dist, &self.host_dist) {
            (None, _) => true,
            (Some(wanted), Some(host)) => platform::same_dist_family(wanted, host),
            (Some(wanted), None) => {
                log::warn!("Unsupported Linux distribution: config: {wanted} host: unknown");
                false
            }
        }
    }

    /// `Ok(false)` when the command failed and the run should continue.
    fn run_execution(
        &mut self,
        group: &str,
        entry: &CommandEntry,
        execution: &CommandExecution,
    ) -> Result<bool, PlanError> {
        let mut execution = execution.clone();
        execution.run = self.store.substitute(&execution.run);
        if let Some(args) = execution.args.as_mut() {
            for arg in args.iter_mut() {
                *arg = self.store.substitute(arg);
            }
        }

        let text = execution.create_command(
            entry.shell,
            self.executor.platform(),
            self.executor.engine().tool(),
        );
        let mut request = if execution.is_multiline() {
            log::debug!("Is multiline command block");
            ExecutionRequest::new(CommandInput::MultilineScript(text.clone()))
                .script_interpreter(entry.shell)
                .shell(true)
        } else {
            ExecutionRequest::new(CommandInput::Raw(text.clone()))
        };
        request = request
            .fail_on_non_zero(execution.fail_on_error)
            .accepted_exit_codes(execution.accepted_exit_codes());

        let result = match self.executor.execute(request) {
            Ok(result) => result,
            Err(source) if execution.fail_on_error => {
                return Err(PlanError::Exec {
                    group: group.to_string(),
                    command: text,
                    source,
                });
            }
            Err(e) => {
                log::error!("Command failed: {text}: {e}");
                return Ok(false);
            }
        };

        if !execution.accepted_exit_codes().contains(&result.exit_code) {
            log::error!("Command failed: {text}");
            log::error!("{}", result.stderr_str());
            return Ok(false);
        }
        log::debug!("{}", result.stdout_str());
        log::info!("{group} - executed successfully");
        if let Some(name) = &execution.saved_output_name {
            self.store.set_output(name.clone(), result.stdout_str());
        }
        Ok(true)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::elevate::{ElevationEngine, ElevationProbe};
    use crate::platform::Platform;

    fn runner(host_dist: Option<&str>) -> Runner {
        let config = Config::default_config();
        let executor = Executor::new(
            ElevationEngine::new(&config, ElevationProbe::fixed("sudo", false)),
            Platform::Unix,
        );
        Runner::new(executor, HostOs::Linux, host_dist.map(String::from))
    }

    fn plan(text: &str) -> Plan {
        Plan::from_toml_str(text).unwrap()
    }

    #[test]
    fn saves_and_substitutes_output() {
        let plan = plan(
            r#"
[[g]]
shell = "sh"
execute = [
    { run = "echo world", saved_output_name = "who" },
    { run = "echo hello ${who}", saved_output_name = "greeting" },
]
"#,
        );
        let mut runner = runner(None);
        let summary = runner.run_plan(&plan, ExecutionOrder::After).unwrap();
        assert_eq!(summary.executed, 2);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(runner.store().get_output("who"), Some("world"));
        assert_eq!(runner.store().get_output("greeting"), Some("hello world"));
    }

    #[test]
    fn failure_without_flag_continues() {
        let plan = plan(
            r#"
[[g]]
shell = "sh"
execute = ["exit 2", { run = "echo after", saved_output_name = "after" }]
"#,
        );
        let mut runner = runner(None);
        let summary = runner.run_plan(&plan, ExecutionOrder::After).unwrap();
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.succeeded, 1);
        assert_eq!(runner.store().get_output("after"), Some("after"));
    }

    #[test]
    fn failure_with_flag_aborts() {
        let plan = plan(
            r#"
[[g]]
shell = "sh"
execute = [{ run = "exit 2", fail_on_error = true }, "echo never"]
"#,
        );
        let err = runner(None).run_plan(&plan, ExecutionOrder::After).unwrap_err();
        match err {
            PlanError::Exec { group, source, .. } => {
                assert_eq!(group, "g");
                assert!(matches!(
                    source,
                    crate::error::ExecError::NonZeroExit { code: 2, .. }
                ));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn valid_exit_codes_accepted() {
        let plan = plan(
            r#"
[[g]]
shell = "sh"
execute = [{ run = "exit 3", fail_on_error = true, valid_exit_codes = [3] }]
"#,
        );
        let summary = runner(None).run_plan(&plan, ExecutionOrder::After).unwrap();
        assert_eq!(summary.succeeded, 1);
    }

    #[test]
    fn skips_incompatible_shell_and_dist() {
        let plan = plan(
            r#"
[[g]]
shell = "powershell"
execute = "Write-Host hi"

[[g]]
shell = "sh"
os_dist = "fedora"
execute = "echo fedora"

[[g]]
shell = "sh"
os_dist = "debian"
execute = "echo debian"
"#,
        );
        let summary = runner(Some("ubuntu")).run_plan(&plan, ExecutionOrder::After).unwrap();
        assert_eq!(summary.skipped, 2);
        assert_eq!(summary.executed, 1);
        assert_eq!(summary.succeeded, 1);
    }

    #[test]
    fn dist_filter_without_known_host() {
        let plan = plan("[[g]]\nshell = \"sh\"\nos_dist = \"ubuntu\"\nexecute = \"true\"\n");
        let summary = runner(None).run_plan(&plan, ExecutionOrder::After).unwrap();
        assert_eq!(summary.skipped, 1);
    }

    #[test]
    fn multiline_runs_as_script() {
        let plan = plan(
            r#"
[[g]]
shell = "sh"
execute = [{ run = """
echo one
echo two""", saved_output_name = "lines" }]
"#,
        );
        let mut runner = runner(None);
        runner.run_plan(&plan, ExecutionOrder::After).unwrap();
        assert_eq!(runner.store().get_output("lines"), Some("one\ntwo"));
    }

    #[test]
    fn only_requested_phase_runs() {
        let plan = plan(
            r#"
[early]
execution_order = "before"
[[early.commands]]
shell = "sh"
execute = { run = "echo early", saved_output_name = "early" }

[[late]]
shell = "sh"
execute = { run = "echo late", saved_output_name = "late" }
"#,
        );
        let mut runner = runner(None);
        runner.run_plan(&plan, ExecutionOrder::Before).unwrap();
        assert_eq!(runner.store().get_output("early"), Some("early"));
        assert_eq!(runner.store().get_output("late"), None);
    }
}
