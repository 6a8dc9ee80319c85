use serde::Serialize;

/// Counters reported by one orchestrator invocation.
///
/// Returned to the scheduler trigger endpoint as the run's JSON body.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    /// Projects for which a scene step was executed this run.
    pub processed: u32,
    /// Projects that reached `completed` this run.
    pub completed: u32,
    /// Projects that reached `failed` this run.
    pub failed: u32,
    /// Projects paused this run (insufficient credits).
    pub paused: u32,
    /// True when the run exited immediately because another invocation
    /// held the lock. Not an error.
    pub lock_contended: bool,
}

impl RunSummary {
    /// Summary for a run that backed off on lock contention.
    pub fn contended() -> Self {
        Self {
            lock_contended: true,
            ..Self::default()
        }
    }
}
