use std::fmt;

/// Points of a branch-and-bound search at which observers are notified
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchCheckpoint {
    /// The root relaxation has been solved
    RootRelaxation,
    /// The engine selected or created a node
    Branch,
    /// A new incumbent was found
    IncumbentFound,
    /// The search is over; no further checkpoint follows in this solve
    Finished,
}

impl fmt::Display for SearchCheckpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchCheckpoint::RootRelaxation => write!(f, "RootRelaxation"),
            SearchCheckpoint::Branch => write!(f, "Branch"),
            SearchCheckpoint::IncumbentFound => write!(f, "IncumbentFound"),
            SearchCheckpoint::Finished => write!(f, "Finished"),
        }
    }
}

/// Immutable view of the search state at a checkpoint
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchSnapshot {
    /// Total nodes explored so far; `None` when the engine does not count them
    pub explored_nodes: Option<u64>,
    /// Best known bound on the optimal objective value
    pub best_bound: f64,
    /// Objective value of the incumbent, if any
    pub incumbent: Option<f64>,
}

/// Receives search checkpoints from the backend while a MIP is being solved
pub trait SearchObserver {
    fn name(&self) -> &str;
    fn on_checkpoint(&mut self, checkpoint: SearchCheckpoint, snapshot: &SearchSnapshot);
}

impl<'a> fmt::Debug for dyn SearchObserver + 'a {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SearchObserver({})", self.name())
    }
}

/// Observer that ignores every checkpoint
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl SearchObserver for NoopObserver {
    fn name(&self) -> &str {
        "noop"
    }

    fn on_checkpoint(&mut self, _checkpoint: SearchCheckpoint, _snapshot: &SearchSnapshot) {}
}

/// Observer that keeps every checkpoint it receives
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    pub events: Vec<(SearchCheckpoint, SearchSnapshot)>,
}

impl SearchObserver for RecordingObserver {
    fn name(&self) -> &str {
        "recording"
    }

    fn on_checkpoint(&mut self, checkpoint: SearchCheckpoint, snapshot: &SearchSnapshot) {
        self.events.push((checkpoint, *snapshot));
    }
}
