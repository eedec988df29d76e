// COIN-OR CBC engine
// Reached through good_lp; needs the CBC native library at build time

use std::time::Instant;

use good_lp::solvers::coin_cbc::{coin_cbc, CoinCbcProblem};

use crate::domain::{PresolveMode, SearchObserver};

use super::engine::{Engine, EngineCapabilities, EngineRun, EngineSettings};
use super::good_lp_model::{build_model, settle_time_limit, solve_model};
use super::problem::BackendProblem;

#[derive(Debug, Clone, Copy, Default)]
pub struct CoinCbcEngine;

impl CoinCbcEngine {
    pub fn new() -> Self {
        Self
    }

    fn apply_settings(model: &mut CoinCbcProblem, settings: &EngineSettings) {
        if !settings.verbose {
            model.set_parameter("log", "0");
        }
        if let Some(limit) = settings.time_limit {
            model.set_parameter("seconds", &limit.as_secs_f64().to_string());
        }
        if let Some(gap) = settings.relative_mip_gap {
            model.set_parameter("ratioGap", &gap.to_string());
        }
        if let Some(tolerance) = settings.primal_tolerance {
            model.set_parameter("primalTolerance", &tolerance.to_string());
        }
        if let Some(tolerance) = settings.dual_tolerance {
            model.set_parameter("dualTolerance", &tolerance.to_string());
        }
        if let Some(mode) = settings.presolve {
            let value = match mode {
                PresolveMode::On => "on",
                PresolveMode::Off => "off",
            };
            model.set_parameter("presolve", value);
        }
    }
}

impl Engine for CoinCbcEngine {
    fn name(&self) -> &str {
        "COIN-OR CBC"
    }

    fn version(&self) -> String {
        "COIN-OR CBC (good_lp)".to_string()
    }

    fn capabilities(&self) -> EngineCapabilities {
        EngineCapabilities {
            time_limit: true,
            relative_mip_gap: true,
            tolerances: true,
            presolve: true,
            ..EngineCapabilities::minimal()
        }
    }

    fn run(
        &mut self,
        problem: &BackendProblem,
        settings: &EngineSettings,
        _observer: &mut dyn SearchObserver,
    ) -> EngineRun {
        let mut built = match build_model(problem, coin_cbc) {
            Ok(built) => built,
            Err(status) => return EngineRun::with_status(status),
        };
        Self::apply_settings(&mut built.model, settings);

        let start = Instant::now();
        let run = solve_model(built, self.name());
        settle_time_limit(run, settings.time_limit, start.elapsed())
    }
}
