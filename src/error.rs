//! Error types for each layer of the engine.

use std::path::PathBuf;
use thiserror::Error;

/// A command could not be tokenized (the "malformed command" condition).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("command begins with a chain operator")]
    LeadingOperator,

    #[error("command ends with a chain operator")]
    TrailingOperator,

    #[error("empty command between chain operators (segment {position})")]
    EmptySegment { position: usize },

    #[error("unterminated {0} quote")]
    UnterminatedQuote(char),

    #[error("command ends with a dangling escape")]
    DanglingEscape,

    #[error("command cannot be split into arguments: {0}")]
    Unsplittable(String),

    #[error("empty command")]
    Empty,
}

/// Failures raised while executing a command.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("malformed command: {0}")]
    Malformed(#[from] ParseError),

    #[error("failed to spawn `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("command exited with code {code}")]
    NonZeroExit {
        code: i32,
        stdout: Option<String>,
        stderr: Option<String>,
    },

    #[error("temporary script file: failed to {action}: {source}")]
    TempFile {
        action: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration files that could not be read or parsed.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// A plan run that was aborted.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("plan: {0}")]
    Load(#[from] ConfigError),

    #[error("{group}: `{command}` failed: {source}")]
    Exec {
        group: String,
        command: String,
        #[source]
        source: ExecError,
    },
}
