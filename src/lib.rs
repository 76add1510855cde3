//! wsrun: command execution and privilege elevation for workstation
//! provisioning.
//!
//! Commands arrive as a single-line string, pre-split argv, or a multi-line
//! script. Each is tokenized into segments joined by `&&`, `||` and `|`,
//! every segment gets the elevation prefix added (Unix, when the tool is
//! installed and the command needs it) or removed (Windows), and the
//! rewritten command is spawned with interactive or captured stdio.
//!
//! # Architecture
//!
//! - **[`parse`]**, the tokenizer: quote-aware chain splitting, shlex argv splitting, type definitions.
//! - **[`elevate`]**, the elevation engine: availability probe, self-install guard, decision, rewrite.
//! - **[`exec`]**, the execution engine: process spawning, stdin payloads, temporary scripts.
//! - **[`plan`]**, provisioning plans: command groups, output store, runner policy.
//! - **[`config`]**, configuration loading: embedded defaults + user overlay merge.
//! - **[`logging`]**, terminal and file logging via `simplelog`.

/// Configuration types, loading, and overlay merge logic.
pub mod config;
/// Elevation decision and rewriting.
pub mod elevate;
/// Error types for parsing, execution, configuration and plans.
pub mod error;
/// Process execution.
pub mod exec;
/// Logger setup.
pub mod logging;
/// Command tokenizing: chain splitting, argv splitting, type definitions.
pub mod parse;
/// Provisioning plans and the runner that executes them.
pub mod plan;
/// Platform and host operating system detection.
pub mod platform;
/// Shell interpreters and their invocation prefixes.
pub mod shell;

use error::ParseError;
use parse::{CommandInput, FinalCommand};
use platform::Platform;

/// Tokenize and rewrite a command with the default config, probing `PATH`
/// for the elevation tool. Nothing is executed.
///
/// This is the main entry point for simple usage. To run commands, build an
/// [`exec::Executor`].
pub fn prepare(command: &str, platform: Platform) -> Result<FinalCommand, ParseError> {
    let config = config::Config::default_config();
    let executor = exec::Executor::new(elevate::ElevationEngine::from_config(&config), platform);
    Ok(executor
        .prepare(&CommandInput::from_text(command))?
        .command)
}
