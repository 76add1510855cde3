use crate::error::ParseError;

/// Lower-cased command name of a word: basename without directory or `.exe`.
///
/// `/usr/bin/apt-get` → `apt-get`, `C:\Windows\System32\sc.exe` → `sc`.
pub fn base_command(word: &str) -> String {
    let name = word
        .rsplit(['/', '\\'])
        .next()
        .filter(|n| !n.is_empty())
        .unwrap_or(word);
    let lower = name.to_ascii_lowercase();
    match lower.strip_suffix(".exe") {
        Some(stem) if !stem.is_empty() => stem.to_string(),
        _ => lower,
    }
}

/// Split a command string into argv using shlex (POSIX word splitting).
///
/// Unlike the segment scanner, quotes and escapes are consumed here, so the
/// result is what a shell would pass to `execve`.
pub fn split_argv(command: &str) -> Result<Vec<String>, ParseError> {
    let argv = shlex::split(command).ok_or_else(|| ParseError::Unsplittable(command.into()))?;
    if argv.is_empty() {
        return Err(ParseError::Empty);
    }
    Ok(argv)
}

/// Quote a single word for a POSIX shell when it needs quoting.
pub fn quote_word(word: &str) -> String {
    shlex::try_quote(word)
        .map(|q| q.into_owned())
        .unwrap_or_else(|_| word.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_command_simple() {
        assert_eq!(base_command("apt"), "apt");
    }

    #[test]
    fn base_command_absolute_path() {
        assert_eq!(base_command("/usr/bin/apt-get"), "apt-get");
    }

    #[test]
    fn base_command_windows_path() {
        assert_eq!(base_command("C:\\Windows\\System32\\SC.EXE"), "sc");
    }

    #[test]
    fn base_command_uppercase() {
        assert_eq!(base_command("NET"), "net");
    }

    #[test]
    fn base_command_trailing_slash() {
        assert_eq!(base_command("dir/"), "dir/");
    }

    #[test]
    fn base_command_empty() {
        assert_eq!(base_command(""), "");
    }

    #[test]
    fn split_quoted() {
        assert_eq!(
            split_argv("echo 'hello world'").unwrap(),
            vec!["echo", "hello world"]
        );
    }

    #[test]
    fn split_double_quoted() {
        assert_eq!(
            split_argv("bash -c \"echo \\\"hi\\\"\"").unwrap(),
            vec!["bash", "-c", "echo \"hi\""]
        );
    }

    #[test]
    fn split_unbalanced() {
        assert!(matches!(
            split_argv("echo 'oops"),
            Err(ParseError::Unsplittable(_))
        ));
    }

    #[test]
    fn split_empty() {
        assert_eq!(split_argv("  "), Err(ParseError::Empty));
    }

    #[test]
    fn quote_plain_word() {
        assert_eq!(quote_word("plain"), "plain");
    }

    #[test]
    fn quote_round_trips_through_split() {
        let path = "/tmp/dir with space/script.sh";
        let argv = split_argv(&format!("bash -c {}", quote_word(path))).unwrap();
        assert_eq!(argv, vec!["bash", "-c", path]);
    }
}
