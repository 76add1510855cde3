use super::types::{ChainOperator, CommandInput, CommandSegment, InputKind, ParsedCommand};
use crate::error::ParseError;

/// Tokenize a command into segments separated by chain operators.
///
/// - `Argv`: the list is the single segment, no operators.
/// - `MultilineScript`, or `Raw` text spanning several lines: the whole
///   text is one token of one segment.
/// - `Raw`: line continuations become spaces, words are split on unquoted
///   whitespace, and words equal to `&&`, `||` or `|` close a segment.
///
/// Empty input yields one segment with no words.
pub fn tokenize(input: &CommandInput) -> Result<ParsedCommand, ParseError> {
    match input {
        CommandInput::Argv(argv) => Ok(ParsedCommand {
            kind: InputKind::Argv,
            segments: vec![CommandSegment::new(argv.clone())],
            operators: vec![],
        }),
        CommandInput::MultilineScript(script) => Ok(script_command(script)),
        CommandInput::Raw(text) if has_line_break(text) => Ok(script_command(text)),
        CommandInput::Raw(text) => {
            let words = split_words(&join_continuations(text))?;
            let (segments, operators) = split_chain(words)?;
            Ok(ParsedCommand {
                kind: InputKind::Text,
                segments,
                operators,
            })
        }
    }
}

/// A script is one opaque token in one segment.
fn script_command(script: &str) -> ParsedCommand {
    ParsedCommand {
        kind: InputKind::Script,
        segments: vec![CommandSegment::new(vec![script.to_string()])],
        operators: vec![],
    }
}

/// True when `text` has a newline that is not a backslash continuation.
pub(crate) fn has_line_break(text: &str) -> bool {
    let stripped = text.replace("\\\r\n", "").replace("\\\n", "");
    stripped.contains('\n')
}

/// Replace backslash-newline continuations with a single space.
fn join_continuations(command: &str) -> String {
    command.replace("\\\r\n", " ").replace("\\\n", " ")
}

/// Split a single-line command into words at unquoted whitespace.
///
/// Quote and escape characters stay in the word. Whitespace runs outside
/// quotes collapse; whitespace inside quotes is literal.
fn split_words(command: &str) -> Result<Vec<String>, ParseError> {
    let mut words = Vec::new();
    let mut buf = String::new();
    let (mut sq, mut dq, mut esc) = (false, false, false);

    for c in command.chars() {
        if esc {
            buf.push(c);
            esc = false;
            continue;
        }
        if c == '\\' && !sq {
            esc = true;
            buf.push(c);
            continue;
        }
        if c == '\'' && !dq {
            sq = !sq;
            buf.push(c);
            continue;
        }
        if c == '"' && !sq {
            dq = !dq;
            buf.push(c);
            continue;
        }
        if c.is_whitespace() && !sq && !dq {
            if !buf.is_empty() {
                words.push(std::mem::take(&mut buf));
            }
            continue;
        }
        buf.push(c);
    }

    if sq {
        return Err(ParseError::UnterminatedQuote('\''));
    }
    if dq {
        return Err(ParseError::UnterminatedQuote('"'));
    }
    if esc {
        return Err(ParseError::DanglingEscape);
    }
    if !buf.is_empty() {
        words.push(buf);
    }
    Ok(words)
}

/// Group words into segments at operator words.
fn split_chain(
    words: Vec<String>,
) -> Result<(Vec<CommandSegment>, Vec<ChainOperator>), ParseError> {
    let mut segments = Vec::new();
    let mut operators = Vec::new();
    let mut current = Vec::new();

    for word in words {
        let Some(op) = ChainOperator::from_word(&word) else {
            current.push(word);
            continue;
        };
        if current.is_empty() {
            return Err(if segments.is_empty() {
                ParseError::LeadingOperator
            } else {
                ParseError::EmptySegment {
                    position: segments.len(),
                }
            });
        }
        segments.push(CommandSegment::new(std::mem::take(&mut current)));
        operators.push(op);
    }

    if current.is_empty() && !operators.is_empty() {
        return Err(ParseError::TrailingOperator);
    }
    segments.push(CommandSegment::new(current));
    Ok((segments, operators))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(cmd: &str) -> ParsedCommand {
        tokenize(&CommandInput::Raw(cmd.into())).unwrap()
    }

    fn words(parsed: &ParsedCommand) -> Vec<Vec<&str>> {
        parsed
            .segments
            .iter()
            .map(|s| s.words.iter().map(String::as_str).collect())
            .collect()
    }

    #[test]
    fn split_simple() {
        let parsed = raw("ls -la");
        assert_eq!(words(&parsed), vec![vec!["ls", "-la"]]);
        assert!(parsed.operators.is_empty());
    }

    #[test]
    fn split_and() {
        let parsed = raw("apt update && apt install vim");
        assert_eq!(
            words(&parsed),
            vec![vec!["apt", "update"], vec!["apt", "install", "vim"]]
        );
        assert_eq!(parsed.operators, vec![ChainOperator::And]);
    }

    #[test]
    fn split_mixed_operators() {
        let parsed = raw("apt update | tee log && apt install sudo || true");
        assert_eq!(parsed.segments.len(), 4);
        assert_eq!(
            parsed.operators,
            vec![ChainOperator::Pipe, ChainOperator::And, ChainOperator::Or]
        );
    }

    #[test]
    fn split_quoted_operator() {
        let parsed = raw("echo 'a && b'");
        assert_eq!(words(&parsed), vec![vec!["echo", "'a && b'"]]);
        assert!(parsed.operators.is_empty());
    }

    #[test]
    fn quotes_are_kept_in_words() {
        let parsed = raw("git commit -m \"first  commit\"");
        assert_eq!(
            words(&parsed),
            vec![vec!["git", "commit", "-m", "\"first  commit\""]]
        );
    }

    #[test]
    fn single_quote_inside_double() {
        let parsed = raw("echo \"it's\" done");
        assert_eq!(words(&parsed), vec![vec!["echo", "\"it's\"", "done"]]);
    }

    #[test]
    fn escaped_space_joins_word() {
        let parsed = raw("ls my\\ dir");
        assert_eq!(words(&parsed), vec![vec!["ls", "my\\ dir"]]);
    }

    #[test]
    fn escaped_quote_does_not_open() {
        let parsed = raw("echo \\\"x");
        assert_eq!(words(&parsed), vec![vec!["echo", "\\\"x"]]);
    }

    #[test]
    fn operator_glued_to_word_is_not_split() {
        let parsed = raw("true&&false");
        assert_eq!(words(&parsed), vec![vec!["true&&false"]]);
    }

    #[test]
    fn whitespace_collapses() {
        let parsed = raw("  sudo   apt\t update ");
        assert_eq!(words(&parsed), vec![vec!["sudo", "apt", "update"]]);
    }

    #[test]
    fn line_continuation() {
        let parsed = raw("apt-get install \\\n  -y curl");
        assert_eq!(words(&parsed), vec![vec!["apt-get", "install", "-y", "curl"]]);
    }

    #[test]
    fn empty_input_is_one_empty_segment() {
        let parsed = raw("");
        assert_eq!(parsed.segments, vec![CommandSegment::default()]);
        assert!(parsed.operators.is_empty());
        let parsed = raw("   ");
        assert_eq!(parsed.segments.len(), 1);
        assert!(parsed.is_empty());
    }

    #[test]
    fn leading_operator_is_malformed() {
        let err = tokenize(&CommandInput::Raw("&& ls".into())).unwrap_err();
        assert_eq!(err, ParseError::LeadingOperator);
    }

    #[test]
    fn trailing_operator_is_malformed() {
        let err = tokenize(&CommandInput::Raw("ls |".into())).unwrap_err();
        assert_eq!(err, ParseError::TrailingOperator);
    }

    #[test]
    fn doubled_operator_is_malformed() {
        let err = tokenize(&CommandInput::Raw("ls && || pwd".into())).unwrap_err();
        assert_eq!(err, ParseError::EmptySegment { position: 1 });
    }

    #[test]
    fn unbalanced_quote_is_malformed() {
        let err = tokenize(&CommandInput::Raw("echo 'oops".into())).unwrap_err();
        assert_eq!(err, ParseError::UnterminatedQuote('\''));
        let err = tokenize(&CommandInput::Raw("echo \"oops".into())).unwrap_err();
        assert_eq!(err, ParseError::UnterminatedQuote('"'));
    }

    #[test]
    fn dangling_escape_is_malformed() {
        let err = tokenize(&CommandInput::Raw("echo \\".into())).unwrap_err();
        assert_eq!(err, ParseError::DanglingEscape);
    }

    #[test]
    fn argv_is_single_segment() {
        let input = CommandInput::Argv(vec!["echo".into(), "&&".into(), "x".into()]);
        let parsed = tokenize(&input).unwrap();
        assert_eq!(parsed.kind, InputKind::Argv);
        assert_eq!(words(&parsed), vec![vec!["echo", "&&", "x"]]);
        assert!(parsed.operators.is_empty());
    }

    #[test]
    fn script_is_never_split() {
        let script = "apt update && \\\napt install vim\necho 'done'";
        let parsed = tokenize(&CommandInput::MultilineScript(script.into())).unwrap();
        assert_eq!(words(&parsed), vec![vec![script]]);
        assert!(parsed.operators.is_empty());
    }

    #[test]
    fn multiline_raw_is_a_script() {
        let text = "apt update\napt install vim";
        let parsed = raw(text);
        assert_eq!(parsed.kind, InputKind::Script);
        assert_eq!(words(&parsed), vec![vec![text]]);
        assert!(parsed.operators.is_empty());
    }

    #[test]
    fn segment_count_invariant() {
        for cmd in [
            "a",
            "a && b",
            "a | b | c",
            "a || b && c | d",
            "echo '|' | cat",
        ] {
            let parsed = raw(cmd);
            assert_eq!(parsed.operators.len() + 1, parsed.segments.len(), "{cmd}");
        }
    }

    #[test]
    fn rejoin_round_trips() {
        for cmd in [
            "ls -la /tmp",
            "echo 'hello   world'",
            "printf \"%s\\n\" x",
            "  spaced    out  ",
        ] {
            let first = raw(cmd);
            let rejoined = first.segments[0].to_text();
            assert_eq!(raw(&rejoined), first, "{cmd}");
        }
    }
}
