use std::collections::HashMap;

/// Named command outputs available to later commands as `$NAME`/`${NAME}`.
#[derive(Debug, Clone, Default)]
pub struct OutputStore {
    outputs: HashMap<String, String>,
}

impl OutputStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` with trailing line endings removed.
    pub fn set_output(&mut self, name: impl Into<String>, value: &str) {
        let value = value.trim_end_matches(['\n', '\r']);
        self.outputs.insert(name.into(), value.to_string());
    }

    pub fn get_output(&self, name: &str) -> Option<&str> {
        self.outputs.get(name).map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.outputs.clear();
    }

    /// Expand `${NAME}` and `$NAME` from stored outputs, then the
    /// environment. Unknown names are left as written. `$$` and `\$`
    /// produce a literal `$`.
    pub fn substitute(&self, text: &str) -> String {
        // shellexpand already treats `$$` as an escaped dollar.
        let text = text.replace("\\$", "$$");
        shellexpand::env_with_context_no_errors(&text, |name| self.lookup(name)).into_owned()
    }

    fn lookup(&self, name: &str) -> Option<String> {
        self.outputs
            .get(name)
            .cloned()
            .or_else(|| std::env::var(name).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> OutputStore {
        let mut store = OutputStore::new();
        store.set_output("my_var", "hello\n");
        store
    }

    #[test]
    fn trims_trailing_newlines() {
        let mut store = OutputStore::new();
        store.set_output("v", "a\r\n\n");
        assert_eq!(store.get_output("v"), Some("a"));
        store.set_output("inner", "a\nb");
        assert_eq!(store.get_output("inner"), Some("a\nb"));
    }

    #[test]
    fn braced_and_bare() {
        let store = store();
        assert_eq!(store.substitute("echo ${my_var}"), "echo hello");
        assert_eq!(store.substitute("echo $my_var!"), "echo hello!");
        assert_eq!(store.substitute("$my_var/$my_var"), "hello/hello");
    }

    #[test]
    fn unknown_left_alone() {
        let store = store();
        assert_eq!(
            store.substitute("echo ${WSRUN_TEST_UNSET_VAR} $WSRUN_TEST_UNSET_VAR"),
            "echo ${WSRUN_TEST_UNSET_VAR} $WSRUN_TEST_UNSET_VAR"
        );
    }

    #[test]
    fn longer_name_not_clobbered() {
        let store = store();
        assert_eq!(store.substitute("$my_var_x"), "$my_var_x");
    }

    #[test]
    fn escapes() {
        let store = store();
        assert_eq!(store.substitute("cost $$5 and \\$my_var"), "cost $5 and $my_var");
        assert_eq!(store.substitute("$$my_var"), "$my_var");
    }

    #[test]
    fn stray_dollars() {
        let store = store();
        assert_eq!(store.substitute("a $ b $"), "a $ b $");
        assert_eq!(store.substitute("${} ${my_var"), "${} ${my_var");
    }

    #[test]
    fn default_for_unset_name() {
        let store = store();
        assert_eq!(store.substitute("${WSRUN_TEST_UNSET_VAR:-none}"), "none");
    }

    #[test]
    fn falls_back_to_environment() {
        let store = store();
        let path = std::env::var("PATH").unwrap();
        assert_eq!(store.substitute("${PATH}"), path);
    }

    #[test]
    fn store_wins_over_environment() {
        let mut store = OutputStore::new();
        store.set_output("PATH", "mine");
        assert_eq!(store.substitute("$PATH"), "mine");
    }

    #[test]
    fn clear_forgets() {
        let mut store = store();
        store.clear();
        assert_eq!(store.get_output("my_var"), None);
    }
}
