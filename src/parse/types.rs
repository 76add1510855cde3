//! Types produced by the tokenizer and consumed by the elevation layer.

/// A command as handed to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandInput {
    /// A single-line command string, tokenized with shell quoting rules.
    Raw(String),
    /// Pre-split argv tokens; no quote or operator parsing applies.
    Argv(Vec<String>),
    /// An opaque multi-line block, never split on chain operators.
    MultilineScript(String),
}

impl CommandInput {
    /// Build from text, promoting it to a script when it spans several lines.
    ///
    /// Backslash-newline continuations do not count as line breaks.
    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        if super::shell::has_line_break(&text) {
            CommandInput::MultilineScript(text)
        } else {
            CommandInput::Raw(text)
        }
    }

    /// Re-apply newline promotion to a `Raw` value built directly.
    pub fn normalized(self) -> Self {
        match self {
            CommandInput::Raw(text) => CommandInput::from_text(text),
            other => other,
        }
    }

    /// True for `Raw` and `MultilineScript`.
    pub fn is_textual(&self) -> bool {
        !matches!(self, CommandInput::Argv(_))
    }

    pub fn kind(&self) -> InputKind {
        match self {
            CommandInput::Raw(_) => InputKind::Text,
            CommandInput::Argv(_) => InputKind::Argv,
            CommandInput::MultilineScript(_) => InputKind::Script,
        }
    }
}

impl From<&str> for CommandInput {
    fn from(text: &str) -> Self {
        CommandInput::from_text(text)
    }
}

impl From<String> for CommandInput {
    fn from(text: String) -> Self {
        CommandInput::from_text(text)
    }
}

impl From<Vec<String>> for CommandInput {
    fn from(argv: Vec<String>) -> Self {
        CommandInput::Argv(argv)
    }
}

impl From<&[&str]> for CommandInput {
    fn from(argv: &[&str]) -> Self {
        CommandInput::Argv(argv.iter().map(|s| s.to_string()).collect())
    }
}

/// Which `CommandInput` variant a parsed command came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Text,
    Argv,
    Script,
}

/// Operator joining two consecutive segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainOperator {
    /// `&&`: run next only if previous succeeded
    And,
    /// `||`: run next only if previous failed
    Or,
    /// `|`: pipe stdout
    Pipe,
}

impl ChainOperator {
    /// The operator's shell syntax.
    pub fn as_str(self) -> &'static str {
        match self {
            ChainOperator::And => "&&",
            ChainOperator::Or => "||",
            ChainOperator::Pipe => "|",
        }
    }

    /// Recognize a whole word as an operator.
    pub fn from_word(word: &str) -> Option<Self> {
        match word {
            "&&" => Some(ChainOperator::And),
            "||" => Some(ChainOperator::Or),
            "|" => Some(ChainOperator::Pipe),
            _ => None,
        }
    }
}

/// The words of one command between chain operators.
///
/// Quote and escape characters are kept inside the words so that joining
/// them with spaces yields a shell-parseable string again.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandSegment {
    pub words: Vec<String>,
}

impl CommandSegment {
    pub fn new(words: Vec<String>) -> Self {
        Self { words }
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn first(&self) -> Option<&str> {
        self.words.first().map(String::as_str)
    }

    /// True when the first word is `tool` (case-insensitive).
    pub fn starts_with_tool(&self, tool: &str) -> bool {
        self.first().is_some_and(|w| w.eq_ignore_ascii_case(tool))
    }

    /// Words after a leading `tool` token and its `-flag` arguments.
    ///
    /// Returns every word when the segment does not start with `tool`.
    pub fn without_tool(&self, tool: &str) -> &[String] {
        if !self.starts_with_tool(tool) {
            return &self.words;
        }
        let skip = 1 + self.words[1..]
            .iter()
            .take_while(|w| w.starts_with('-'))
            .count();
        &self.words[skip..]
    }

    pub fn to_text(&self) -> String {
        self.words.join(" ")
    }
}

impl<S: Into<String>> FromIterator<S> for CommandSegment {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Into::into).collect())
    }
}

/// A tokenized command: segments interleaved with operators.
///
/// For `apt update && apt install vim | tee log` there are three segments
/// and two operators. `segments.len() == operators.len() + 1` always holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub kind: InputKind,
    pub segments: Vec<CommandSegment>,
    pub operators: Vec<ChainOperator>,
}

impl ParsedCommand {
    /// True when no segment carries a word.
    pub fn is_empty(&self) -> bool {
        self.segments.iter().all(CommandSegment::is_empty)
    }

    /// Interleave segments with the original operators.
    ///
    /// Segments left empty (e.g. a bare `sudo` after stripping) contribute
    /// no words.
    pub fn reconstruct(&self) -> FinalCommand {
        let mut words: Vec<String> = Vec::new();
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0
                && let Some(op) = self.operators.get(i - 1)
            {
                words.push(op.as_str().to_string());
            }
            words.extend(segment.words.iter().cloned());
        }
        match self.kind {
            InputKind::Argv => FinalCommand::Argv(words),
            InputKind::Text => FinalCommand::Text(words.join(" ")),
            InputKind::Script => FinalCommand::Script(words.concat()),
        }
    }
}

/// The command form handed to the process layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinalCommand {
    Text(String),
    Argv(Vec<String>),
    Script(String),
}

impl FinalCommand {
    /// Render as a single string (argv joined by spaces).
    pub fn to_text(&self) -> String {
        match self {
            FinalCommand::Text(text) | FinalCommand::Script(text) => text.clone(),
            FinalCommand::Argv(argv) => argv.join(" "),
        }
    }

    /// Render for a shell: argv words are quoted so their boundaries
    /// survive word splitting.
    pub fn to_shell_text(&self) -> String {
        match self {
            FinalCommand::Text(text) | FinalCommand::Script(text) => text.clone(),
            FinalCommand::Argv(argv) => argv
                .iter()
                .map(|w| super::tokenize::quote_word(w))
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

impl std::fmt::Display for FinalCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_text())
    }
}
