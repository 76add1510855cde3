pub mod request;
pub mod script;

pub use request::{ExecutionRequest, ExecutionResult, StdinPayload};
pub use script::ScriptFile;

use std::io::Write;
use std::process::{Command, Stdio};

use crate::config::Config;
use crate::elevate::ElevationEngine;
use crate::error::{ExecError, ParseError};
use crate::parse::{self, CommandInput, FinalCommand, ParsedCommand};
use crate::platform::Platform;
use crate::shell::ShellKind;

/// A command after tokenizing and elevation rewriting.
#[derive(Debug, Clone)]
pub struct Prepared {
    pub parsed: ParsedCommand,
    pub rewritten: ParsedCommand,
    pub command: FinalCommand,
    pub self_install: bool,
}

/// How the child process is launched.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Invocation {
    /// `sh -c <text>` (or `cmd /C <text>` on Windows hosts).
    Shell(String),
    /// Spawn `argv[0]` directly.
    Direct(Vec<String>),
}

/// Runs commands through tokenize → rewrite → spawn.
#[derive(Debug)]
pub struct Executor {
    engine: ElevationEngine,
    platform: Platform,
}

impl Executor {
    pub fn new(engine: ElevationEngine, platform: Platform) -> Self {
        Self { engine, platform }
    }

    /// Executor for the running host, probing `PATH` for the elevation tool.
    pub fn from_config(config: &Config) -> Self {
        Self::new(ElevationEngine::from_config(config), Platform::host())
    }

    pub fn engine(&self) -> &ElevationEngine {
        &self.engine
    }

    /// Platform whose elevation rules are applied.
    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Tokenize and rewrite without running anything.
    pub fn prepare(&self, input: &CommandInput) -> Result<Prepared, ParseError> {
        let parsed = parse::tokenize(input)?;
        if parsed.is_empty() {
            return Err(ParseError::Empty);
        }
        let self_install = self.engine.is_installing_elevation_tool(&parsed);
        let rewritten = self.engine.rewrite(&parsed, self.platform);
        let command = rewritten.reconstruct();
        if command.to_text().trim().is_empty() {
            return Err(ParseError::Empty);
        }
        // A segment that was only an elevation prefix leaves a dangling operator.
        if let Some(position) = rewritten.segments.iter().position(|s| s.is_empty()) {
            return Err(ParseError::EmptySegment { position });
        }
        Ok(Prepared {
            parsed,
            rewritten,
            command,
            self_install,
        })
    }

    /// Run a command and wait for it to finish.
    ///
    /// A spawn failure is always an error. A non-zero exit is returned as
    /// data unless `fail_on_non_zero` is set and the code is not accepted.
    pub fn execute(&self, request: ExecutionRequest) -> Result<ExecutionResult, ExecError> {
        let input = request.command.clone().normalized();
        let prepared = self.prepare(&input)?;

        // Held until the child exits; dropping it removes the file.
        let mut script = None;
        let invocation = match request.script_interpreter {
            Some(shell) => {
                let file = ScriptFile::create(&prepared.command.to_shell_text(), shell.script_suffix())?;
                let text = script_invocation(shell, &file);
                log::info!("Running command: {text}");
                script = Some(file);
                Invocation::Shell(text)
            }
            None => self.invocation(&prepared, request.use_shell)?,
        };
        log::debug!("Running command: {}", prepared.command);

        let result = spawn_and_wait(&invocation, &request);
        drop(script);
        let result = result?;

        if prepared.self_install && result.success() {
            log::info!(
                "{} installed; refreshing elevation availability",
                self.engine.tool()
            );
            self.engine.probe().invalidate();
        }

        if request.fail_on_non_zero && !request.accepts(result.exit_code) {
            log::error!("Command failed with exit code {}", result.exit_code);
            log::error!("stdout: {}", result.stdout_str());
            log::error!("stderr: {}", result.stderr_str());
            return Err(ExecError::NonZeroExit {
                code: result.exit_code,
                stdout: result.stdout,
                stderr: result.stderr,
            });
        }
        Ok(result)
    }

    fn invocation(&self, prepared: &Prepared, use_shell: bool) -> Result<Invocation, ParseError> {
        Ok(match &prepared.command {
            FinalCommand::Script(text) => Invocation::Shell(text.clone()),
            FinalCommand::Argv(_) if use_shell => Invocation::Shell(prepared.command.to_shell_text()),
            FinalCommand::Argv(argv) => Invocation::Direct(argv.clone()),
            FinalCommand::Text(text) if use_shell => Invocation::Shell(text.clone()),
            FinalCommand::Text(text) if !prepared.rewritten.operators.is_empty() => {
                log::debug!("chained command needs a shell: {text}");
                Invocation::Shell(text.clone())
            }
            FinalCommand::Text(text) => Invocation::Direct(parse::split_argv(text)?),
        })
    }
}

/// `<shell prefix> <script path>`, quoting the path for the host shell.
fn script_invocation(shell: ShellKind, file: &ScriptFile) -> String {
    let path = file.path().to_string_lossy();
    let path = if cfg!(windows) {
        if path.contains(' ') {
            format!("\"{path}\"")
        } else {
            path.into_owned()
        }
    } else {
        parse::quote_word(&path)
    };
    format!("{} {path}", shell.invocation())
}

fn host_shell(text: &str) -> Command {
    let mut cmd = if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C");
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c");
        c
    };
    cmd.arg(text);
    cmd
}

fn spawn_and_wait(
    invocation: &Invocation,
    request: &ExecutionRequest,
) -> Result<ExecutionResult, ExecError> {
    let (mut cmd, program) = match invocation {
        Invocation::Shell(text) => (host_shell(text), text.clone()),
        Invocation::Direct(argv) => {
            let (program, args) = argv.split_first().ok_or(ParseError::Empty)?;
            let mut cmd = Command::new(program);
            cmd.args(args);
            (cmd, program.clone())
        }
    };

    if request.interactive {
        cmd.stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .stdin(Stdio::piped());
    } else {
        cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
        cmd.stdin(if request.stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        });
    }

    let mut child = cmd.spawn().map_err(|source| {
        log::error!("Command failed with error: {source}");
        ExecError::Spawn { program, source }
    })?;

    let stdin = child.stdin.take();
    let payload = request.stdin.clone().map(StdinPayload::into_bytes);
    let output = std::thread::scope(|s| {
        // Without a payload the pipe is closed at once so the child sees EOF.
        if let (Some(mut pipe), Some(bytes)) = (stdin, payload) {
            s.spawn(move || {
                if let Err(e) = pipe.write_all(&bytes) {
                    log::debug!("stdin write ended early: {e}");
                }
            });
        }
        child.wait_with_output()
    })?;

    let exit_code = exit_code(&output.status);
    let (stdout, stderr) = if request.interactive {
        (None, None)
    } else {
        (
            Some(String::from_utf8_lossy(&output.stdout).into_owned()),
            Some(String::from_utf8_lossy(&output.stderr).into_owned()),
        )
    };
    Ok(ExecutionResult {
        exit_code,
        stdout,
        stderr,
    })
}

/// Exit code, or `128 + signal` for a child killed by a signal.
fn exit_code(status: &std::process::ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    -1
}
