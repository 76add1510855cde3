use crate::parse::CommandInput;
use crate::shell::ShellKind;

/// Data written to the child's stdin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StdinPayload {
    /// Text gets a trailing newline when it lacks one.
    Text(String),
    Bytes(Vec<u8>),
}

impl StdinPayload {
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            StdinPayload::Text(mut text) => {
                if !text.ends_with('\n') {
                    text.push('\n');
                }
                text.into_bytes()
            }
            StdinPayload::Bytes(bytes) => bytes,
        }
    }
}

impl From<&str> for StdinPayload {
    fn from(text: &str) -> Self {
        StdinPayload::Text(text.into())
    }
}

impl From<String> for StdinPayload {
    fn from(text: String) -> Self {
        StdinPayload::Text(text)
    }
}

impl From<Vec<u8>> for StdinPayload {
    fn from(bytes: Vec<u8>) -> Self {
        StdinPayload::Bytes(bytes)
    }
}

/// One call to [`Executor::execute`](super::Executor::execute).
#[derive(Debug, Clone)]
pub struct ExecutionRequest {
    pub command: CommandInput,
    /// Inherit stdout/stderr and give the child a stdin pipe.
    pub interactive: bool,
    pub stdin: Option<StdinPayload>,
    /// Run the final text through the host shell.
    pub use_shell: bool,
    /// Turn an exit code outside `accepted_exit_codes` into an error.
    pub fail_on_non_zero: bool,
    /// Materialize the command as a script and run it with this shell.
    pub script_interpreter: Option<ShellKind>,
    pub accepted_exit_codes: Vec<i32>,
}

impl ExecutionRequest {
    pub fn new(command: impl Into<CommandInput>) -> Self {
        Self {
            command: command.into(),
            interactive: false,
            stdin: None,
            use_shell: false,
            fail_on_non_zero: false,
            script_interpreter: None,
            accepted_exit_codes: vec![0],
        }
    }

    pub fn interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    pub fn stdin(mut self, payload: impl Into<StdinPayload>) -> Self {
        self.stdin = Some(payload.into());
        self
    }

    pub fn shell(mut self, use_shell: bool) -> Self {
        self.use_shell = use_shell;
        self
    }

    pub fn fail_on_non_zero(mut self, fail: bool) -> Self {
        self.fail_on_non_zero = fail;
        self
    }

    pub fn script_interpreter(mut self, shell: ShellKind) -> Self {
        self.script_interpreter = Some(shell);
        self
    }

    /// Exit codes treated as success; `0` is always included.
    pub fn accepted_exit_codes(mut self, mut codes: Vec<i32>) -> Self {
        if !codes.contains(&0) {
            codes.push(0);
        }
        self.accepted_exit_codes = codes;
        self
    }

    pub fn accepts(&self, code: i32) -> bool {
        self.accepted_exit_codes.contains(&code)
    }
}

/// Exit status and, in captured mode, the child's output.
///
/// Interactive runs leave `stdout` and `stderr` as `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub exit_code: i32,
    pub stdout: Option<String>,
    pub stderr: Option<String>,
}

impl ExecutionResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    pub fn stdout_str(&self) -> &str {
        self.stdout.as_deref().unwrap_or("")
    }

    pub fn stderr_str(&self) -> &str {
        self.stderr.as_deref().unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_payload_gets_newline() {
        assert_eq!(StdinPayload::from("y").into_bytes(), b"y\n");
        assert_eq!(StdinPayload::from("y\n").into_bytes(), b"y\n");
    }

    #[test]
    fn bytes_payload_untouched() {
        assert_eq!(StdinPayload::from(vec![1u8, 2]).into_bytes(), vec![1u8, 2]);
    }

    #[test]
    fn defaults() {
        let req = ExecutionRequest::new("echo hi");
        assert!(!req.interactive);
        assert!(!req.use_shell);
        assert!(req.accepts(0));
        assert!(!req.accepts(1));
    }

    #[test]
    fn zero_always_accepted() {
        let req = ExecutionRequest::new("grep x").accepted_exit_codes(vec![1]);
        assert!(req.accepts(0));
        assert!(req.accepts(1));
        assert!(!req.accepts(2));
    }
}
