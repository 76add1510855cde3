//! Temporary executable script files.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::TempPath;

use crate::error::ExecError;

/// A script written to a private temporary file.
///
/// The file is removed when the value is dropped, on every exit path;
/// removal failures are logged, not returned.
#[derive(Debug)]
pub struct ScriptFile {
    path: PathBuf,
    temp: Option<TempPath>,
}

impl ScriptFile {
    /// Write `contents` verbatim to a fresh file and mark it executable.
    pub fn create(contents: &str, suffix: &str) -> Result<Self, ExecError> {
        let mut file = tempfile::Builder::new()
            .prefix("wsrun-")
            .suffix(suffix)
            .tempfile()
            .map_err(|source| ExecError::TempFile {
                action: "create",
                source,
            })?;
        file.write_all(contents.as_bytes())
            .and_then(|()| file.flush())
            .map_err(|source| ExecError::TempFile {
                action: "write",
                source,
            })?;
        // Close our handle; executing a file open for writing fails with ETXTBSY.
        let temp = file.into_temp_path();
        make_executable(&temp)?;
        Ok(Self {
            path: temp.to_path_buf(),
            temp: Some(temp),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete now, reporting failure to the caller.
    pub fn remove(mut self) -> std::io::Result<()> {
        match self.temp.take() {
            Some(temp) => temp.close(),
            None => Ok(()),
        }
    }
}

impl Drop for ScriptFile {
    fn drop(&mut self) {
        if let Some(temp) = self.temp.take()
            && let Err(e) = temp.close()
        {
            log::warn!("failed to remove script {}: {e}", self.path.display());
        }
    }
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<(), ExecError> {
    use std::os::unix::fs::PermissionsExt;

    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).map_err(|source| {
        ExecError::TempFile {
            action: "chmod",
            source,
        }
    })
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<(), ExecError> {
    Ok(())
}
