//! Memoized "is the elevation tool installed?" check.
//!
//! The probe is an explicit value owned by the engine rather than
//! process-global state, so tests build fresh instances with a fixed
//! locator.

use std::path::PathBuf;
use std::sync::Mutex;

/// Finds an executable by name.
pub trait ToolLocator: Send + Sync {
    fn locate(&self, name: &str) -> Option<PathBuf>;
}

/// Searches `PATH` with the `which` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct PathLocator;

impl ToolLocator for PathLocator {
    fn locate(&self, name: &str) -> Option<PathBuf> {
        which::which(name).ok()
    }
}

impl<F> ToolLocator for F
where
    F: Fn(&str) -> Option<PathBuf> + Send + Sync,
{
    fn locate(&self, name: &str) -> Option<PathBuf> {
        self(name)
    }
}

pub struct ElevationProbe {
    tool: String,
    locator: Box<dyn ToolLocator>,
    cached: Mutex<Option<bool>>,
}

impl ElevationProbe {
    pub fn new(tool: impl Into<String>, locator: impl ToolLocator + 'static) -> Self {
        Self {
            tool: tool.into(),
            locator: Box::new(locator),
            cached: Mutex::new(None),
        }
    }

    /// Probe that looks `tool` up on `PATH`.
    pub fn from_path(tool: impl Into<String>) -> Self {
        Self::new(tool, PathLocator)
    }

    /// Probe with a predetermined answer.
    pub fn fixed(tool: impl Into<String>, available: bool) -> Self {
        let tool = tool.into();
        let path = PathBuf::from("/usr/bin").join(&tool);
        Self::new(tool, move |_: &str| available.then(|| path.clone()))
    }

    pub fn tool(&self) -> &str {
        &self.tool
    }

    /// Look the tool up on first call; later calls reuse the answer until
    /// [`invalidate`](Self::invalidate).
    pub fn is_available(&self) -> bool {
        let mut cached = self.cached.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(available) = *cached {
            return available;
        }
        let available = self.locator.locate(&self.tool).is_some();
        log::debug!("elevation tool `{}` available: {available}", self.tool);
        *cached = Some(available);
        available
    }

    /// Forget the cached answer (e.g. after installing the tool).
    pub fn invalidate(&self) {
        *self.cached.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }
}

impl std::fmt::Debug for ElevationProbe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElevationProbe")
            .field("tool", &self.tool)
            .field("cached", &self.cached)
            .finish_non_exhaustive()
    }
}
