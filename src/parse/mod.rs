pub mod shell;
pub mod tokenize;
pub mod types;

pub use shell::tokenize;
pub use tokenize::{base_command, quote_word, split_argv};
pub use types::{ChainOperator, CommandInput, CommandSegment, FinalCommand, InputKind, ParsedCommand};
