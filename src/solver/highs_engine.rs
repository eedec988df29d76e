// HiGHS engine
// Builds a RowProblem from the mirror on every run; the native model is dropped before returning

use highs::{Col, HighsModelStatus, LikeModel, RowProblem, Sense, SolvedModel};

use crate::domain::{LpAlgorithm, PresolveMode, ResultStatus, SearchObserver};

use super::engine::{Basis, Engine, EngineCapabilities, EngineRun, EngineSettings};
use super::problem::BackendProblem;
use super::status::{from_highs, from_highs_basis};

/// Feasibility tolerance for accepting the point HiGHS holds after a time-out
const INCUMBENT_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, Copy, Default)]
pub struct HighsEngine;

impl HighsEngine {
    pub fn new() -> Self {
        Self
    }

    fn apply_settings(model: &mut highs::Model, settings: &EngineSettings) {
        if !settings.verbose {
            model.make_quiet();
        }
        if let Some(limit) = settings.time_limit {
            model.set_option("time_limit", limit.as_secs_f64());
        }
        if let Some(gap) = settings.relative_mip_gap {
            model.set_option("mip_rel_gap", gap);
        }
        if let Some(tolerance) = settings.primal_tolerance {
            model.set_option("primal_feasibility_tolerance", tolerance);
        }
        if let Some(tolerance) = settings.dual_tolerance {
            model.set_option("dual_feasibility_tolerance", tolerance);
        }
        if let Some(mode) = settings.presolve {
            let value = match mode {
                PresolveMode::On => "on",
                PresolveMode::Off => "off",
            };
            model.set_option("presolve", value);
        }
        match settings.lp_algorithm {
            Some(LpAlgorithm::PrimalSimplex) => {
                model.set_option("solver", "simplex");
                model.set_option("simplex_strategy", 4);
            }
            Some(LpAlgorithm::DualSimplex) => {
                model.set_option("solver", "simplex");
                model.set_option("simplex_strategy", 1);
            }
            Some(LpAlgorithm::Barrier) => model.set_option("solver", "ipm"),
            None => {}
        }
    }
}

impl Engine for HighsEngine {
    fn name(&self) -> &str {
        "HiGHS"
    }

    fn version(&self) -> String {
        "HiGHS (highs 1.x bindings)".to_string()
    }

    fn capabilities(&self) -> EngineCapabilities {
        EngineCapabilities {
            mip: true,
            time_limit: true,
            relative_mip_gap: true,
            tolerances: true,
            presolve: true,
            lp_algorithms: &[
                LpAlgorithm::PrimalSimplex,
                LpAlgorithm::DualSimplex,
                LpAlgorithm::Barrier,
            ],
        }
    }

    fn run(
        &mut self,
        problem: &BackendProblem,
        settings: &EngineSettings,
        _observer: &mut dyn SearchObserver,
    ) -> EngineRun {
        let mut pb = RowProblem::default();
        let cols: Vec<Col> = problem
            .columns()
            .iter()
            .map(|col| {
                let bounds = col.lower_bound..=col.upper_bound;
                if col.integer {
                    pb.add_integer_column(col.objective, bounds)
                } else {
                    pb.add_column(col.objective, bounds)
                }
            })
            .collect();

        for row in problem.rows() {
            pb.add_row(
                row.lower_bound..=row.upper_bound,
                row.entries.iter().map(|&(col, coef)| (cols[col], coef)),
            );
        }

        let sense = if problem.direction().is_maximize() {
            Sense::Maximise
        } else {
            Sense::Minimise
        };
        let mut model = pb.optimise(sense);
        Self::apply_settings(&mut model, settings);

        let solved = match model.try_solve() {
            Ok(solved) => solved,
            Err(status) => {
                log::debug!("HiGHS failed to solve: {:?}", status);
                return EngineRun::with_status(ResultStatus::Abnormal);
            }
        };

        let status = match solved.status() {
            HighsModelStatus::ReachedTimeLimit => Self::timed_out(problem, &solved, settings),
            other => from_highs(other),
        };
        if !status.has_solution() {
            return EngineRun::with_status(status);
        }

        let solution = solved.get_solution();
        let mut run = EngineRun::with_solution(status, solution.columns().to_vec());
        run.row_activities = Some(solution.rows().to_vec());
        // Duals and basis only mean something for a continuous optimum
        if problem.kind().is_continuous() {
            run.column_duals = Some(solution.dual_columns().to_vec());
            run.row_duals = Some(solution.dual_rows().to_vec());
            if status == ResultStatus::Optimal {
                run.basis = Some(Self::basis(problem, &solved));
            }
        }
        run
    }
}

impl HighsEngine {
    /// Feasible when the point left behind satisfies the model, TimeLimit otherwise
    fn timed_out(
        problem: &BackendProblem,
        solved: &SolvedModel,
        settings: &EngineSettings,
    ) -> ResultStatus {
        let tolerance = settings.primal_tolerance.unwrap_or(INCUMBENT_TOLERANCE);
        let values = solved.get_solution().columns().to_vec();
        if problem.num_columns() > 0 && problem.is_feasible(&values, tolerance) {
            ResultStatus::Feasible
        } else {
            log::debug!("HiGHS reached its time limit without a feasible point");
            ResultStatus::TimeLimit
        }
    }

    fn basis(problem: &BackendProblem, solved: &SolvedModel) -> Basis {
        let (columns, rows) = solved.get_basis_status();
        Basis {
            columns: columns
                .into_iter()
                .zip(problem.columns())
                .map(|(status, col)| from_highs_basis(status, col.lower_bound, col.upper_bound))
                .collect(),
            rows: rows
                .into_iter()
                .zip(problem.rows())
                .map(|(status, row)| from_highs_basis(status, row.lower_bound, row.upper_bound))
                .collect(),
        }
    }
}
