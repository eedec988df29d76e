// microlp engine
// Pure Rust simplex and branch-and-bound reached through good_lp; always available

use crate::domain::SearchObserver;

use super::engine::{Engine, EngineCapabilities, EngineRun, EngineSettings};
use super::good_lp_model::{build_model, solve_model};
use super::problem::BackendProblem;

#[derive(Debug, Clone, Copy, Default)]
pub struct MicroLpEngine;

impl MicroLpEngine {
    pub fn new() -> Self {
        Self
    }
}

impl Engine for MicroLpEngine {
    fn name(&self) -> &str {
        "microlp"
    }

    fn version(&self) -> String {
        "microlp (good_lp)".to_string()
    }

    fn capabilities(&self) -> EngineCapabilities {
        EngineCapabilities::minimal()
    }

    fn run(
        &mut self,
        problem: &BackendProblem,
        _settings: &EngineSettings,
        _observer: &mut dyn SearchObserver,
    ) -> EngineRun {
        match build_model(problem, good_lp::microlp) {
            Ok(built) => solve_model(built, self.name()),
            Err(status) => EngineRun::with_status(status),
        }
    }
}
