//! Permission-based fallback for commands outside the privileged tables.
//!
//! An absolute path to an existing file the current user cannot execute is
//! assumed to need elevation. Relative paths are never flagged, and bare
//! names only resolve to executables on `PATH`.

use std::path::{Path, PathBuf};

/// True when `word` names an existing file that the current user may not
/// execute.
pub fn lacks_execute_permission(word: &str) -> bool {
    match resolve(word) {
        Some(path) => !is_executable(&path),
        None => false,
    }
}

/// Resolve a command word to a file: absolute paths are taken as-is, bare
/// names go through `which`, relative paths resolve to nothing.
fn resolve(word: &str) -> Option<PathBuf> {
    if word.is_empty() {
        return None;
    }
    let path = Path::new(word);
    if path.is_absolute() {
        return path.exists().then(|| path.to_path_buf());
    }
    if word.contains(std::path::MAIN_SEPARATOR) || word.contains('/') {
        return None;
    }
    which::which(word).ok()
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use nix::unistd::{AccessFlags, access};

    access(path, AccessFlags::X_OK).is_ok()
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.exists()
}
