use serde::Serialize;

/// Outcome of the elevation decision for one segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ElevationDecision {
    pub elevate: bool,
    pub reason: String,
}

impl ElevationDecision {
    pub fn elevate(reason: impl Into<String>) -> Self {
        Self {
            elevate: true,
            reason: reason.into(),
        }
    }

    pub fn keep(reason: impl Into<String>) -> Self {
        Self {
            elevate: false,
            reason: reason.into(),
        }
    }
}

/// Per-segment report produced by `ElevationEngine::explain`.
#[derive(Debug, Clone, Serialize)]
pub struct SegmentReport {
    pub command: String,
    #[serde(flatten)]
    pub decision: ElevationDecision,
}

/// Everything the engine would do with a command, without running it.
#[derive(Debug, Clone, Serialize)]
pub struct Explanation {
    pub platform: &'static str,
    pub elevation_available: bool,
    pub self_install: bool,
    pub segments: Vec<SegmentReport>,
    pub operators: Vec<&'static str>,
    pub rewritten: String,
}
