// Backend adapter
// Implements the Backend contract on top of any Engine: the adapter owns the mirror,
// validates parameters against the engine capabilities and translates engine runs

use std::time::Instant;

use crate::domain::{
    Backend, BasisStatus, ColumnSpec, OptimizationType, ProblemKind, Result, ResultStatus,
    RowSpec, SearchCheckpoint, SearchObserver, SearchSnapshot, SolutionValues, SolverError,
    SolverParameters,
};

use super::conditioning::basis_condition_number;
use super::engine::{Basis, Engine, EngineRun, EngineSettings};
use super::problem::BackendProblem;

/// Search progress collected while a MIP is solved
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MipProgress {
    explored_nodes: u64,
    best_bound: f64,
    updated: bool,
}

impl MipProgress {
    pub fn new(direction: OptimizationType) -> Self {
        Self {
            explored_nodes: 0,
            best_bound: direction.worst_bound(),
            updated: false,
        }
    }

    pub fn reset(&mut self, direction: OptimizationType) {
        *self = Self::new(direction);
    }

    pub fn record(&mut self, snapshot: &SearchSnapshot) {
        if let Some(nodes) = snapshot.explored_nodes {
            self.explored_nodes = nodes;
        }
        self.best_bound = snapshot.best_bound;
        self.updated = true;
    }

    pub fn explored_nodes(&self) -> u64 {
        self.explored_nodes
    }

    pub fn best_bound(&self) -> f64 {
        self.best_bound
    }

    /// Whether any checkpoint was recorded since the last reset
    pub fn is_updated(&self) -> bool {
        self.updated
    }
}

/// Records progress before handing each checkpoint to the caller's observer
struct ProgressForwarder<'a> {
    progress: &'a mut MipProgress,
    inner: &'a mut dyn SearchObserver,
}

impl SearchObserver for ProgressForwarder<'_> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn on_checkpoint(&mut self, checkpoint: SearchCheckpoint, snapshot: &SearchSnapshot) {
        self.progress.record(snapshot);
        self.inner.on_checkpoint(checkpoint, snapshot);
    }
}

/// Results of the last solve
#[derive(Debug, Clone, Default)]
struct Outcome {
    solution: Option<SolutionValues>,
    iterations: Option<u64>,
    nodes: Option<u64>,
    best_bound: Option<f64>,
    basis: Option<Basis>,
}

/// [`Backend`] implementation driving an [`Engine`] over a [`BackendProblem`] mirror
#[derive(Debug)]
pub struct ProblemAdapter<E: Engine> {
    engine: E,
    problem: BackendProblem,
    settings: EngineSettings,
    progress: MipProgress,
    outcome: Outcome,
}

impl<E: Engine> ProblemAdapter<E> {
    /// Wrap `engine` for problems of `kind`
    pub fn new(engine: E, kind: ProblemKind) -> Result<Self> {
        if kind.is_mip() && !engine.capabilities().mip {
            return Err(SolverError::BackendFailure(format!(
                "{} cannot solve {} problems",
                engine.name(),
                kind
            )));
        }
        Ok(Self {
            engine,
            problem: BackendProblem::new(kind),
            settings: EngineSettings::default(),
            progress: MipProgress::new(OptimizationType::Minimize),
            outcome: Outcome::default(),
        })
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn problem(&self) -> &BackendProblem {
        &self.problem
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn progress(&self) -> &MipProgress {
        &self.progress
    }

    fn unsupported(&self, parameter: &'static str, value: impl ToString) -> SolverError {
        SolverError::UnsupportedParameter {
            backend: self.engine.name().to_string(),
            parameter,
            value: value.to_string(),
        }
    }

    fn notify(
        &mut self,
        observer: &mut dyn SearchObserver,
        checkpoint: SearchCheckpoint,
        snapshot: SearchSnapshot,
    ) {
        self.progress.record(&snapshot);
        observer.on_checkpoint(checkpoint, &snapshot);
    }

    /// A model without columns is decided without calling the engine
    fn solve_empty(&mut self) -> ResultStatus {
        let status = if self.problem.rows().iter().all(|row| row.accepts_zero()) {
            ResultStatus::Optimal
        } else {
            ResultStatus::Infeasible
        };
        if status.has_solution() {
            self.outcome.solution = Some(SolutionValues {
                objective_value: self.problem.objective_offset(),
                column_values: Vec::new(),
                reduced_costs: None,
                row_activities: vec![0.0; self.problem.num_rows()],
                row_duals: None,
            });
        }
        if self.problem.kind().is_mip() {
            self.outcome.nodes = Some(0);
            self.outcome.best_bound =
                (status == ResultStatus::Optimal).then(|| self.problem.objective_offset());
        } else {
            self.outcome.iterations = Some(0);
        }
        status
    }

    fn read_run(&mut self, mut run: EngineRun) -> ResultStatus {
        if run.status.has_solution() && run.column_values.len() != self.problem.num_columns() {
            log::warn!(
                "{} returned {} values for {} columns, reporting an abnormal status",
                self.engine.name(),
                run.column_values.len(),
                self.problem.num_columns()
            );
            run.status = ResultStatus::Abnormal;
        }

        let continuous = self.problem.kind().is_continuous();
        self.outcome.iterations = run.iterations;

        if run.status.has_solution() {
            let values = run.column_values;
            let activities = run
                .row_activities
                .unwrap_or_else(|| self.problem.row_activities(&values));
            if continuous && run.status == ResultStatus::Optimal {
                self.outcome.basis = Some(
                    run.basis
                        .unwrap_or_else(|| Basis::from_vertex(&self.problem, &values, &activities)),
                );
            }
            self.outcome.solution = Some(SolutionValues {
                objective_value: self.problem.objective_value(&values),
                column_values: values,
                reduced_costs: run.column_duals.filter(|_| continuous),
                row_activities: activities,
                row_duals: run.row_duals.filter(|_| continuous),
            });
        }

        if !continuous {
            let recorded = self.progress.is_updated();
            self.outcome.nodes = run
                .nodes
                .or_else(|| recorded.then(|| self.progress.explored_nodes()));
            let proven = (run.status == ResultStatus::Optimal
                && self.settings.relative_mip_gap.is_none())
            .then(|| self.outcome.solution.as_ref().map(|s| s.objective_value))
            .flatten();
            self.outcome.best_bound = run
                .best_bound
                .or_else(|| recorded.then(|| self.progress.best_bound()))
                .or(proven);
        }
        run.status
    }
}

impl<E: Engine> Backend for ProblemAdapter<E> {
    fn name(&self) -> &str {
        self.engine.name()
    }

    fn version(&self) -> String {
        self.engine.version()
    }

    fn problem_kind(&self) -> ProblemKind {
        self.problem.kind()
    }

    fn reset(&mut self) {
        self.problem.clear();
        self.outcome = Outcome::default();
    }

    fn set_optimization_direction(&mut self, direction: OptimizationType) {
        self.problem.set_direction(direction);
        self.outcome = Outcome::default();
    }

    fn add_columns(&mut self, columns: &[ColumnSpec<'_>]) {
        self.problem.push_columns(columns);
        self.outcome = Outcome::default();
    }

    fn add_rows(&mut self, rows: &[RowSpec<'_>]) {
        self.problem.push_rows(rows);
        self.outcome = Outcome::default();
    }

    fn load_matrix(&mut self, entries: &[(usize, usize, f64)]) {
        self.problem.load_matrix(entries);
        self.outcome = Outcome::default();
    }

    fn set_row(&mut self, row: usize, entries: &[(usize, f64)]) {
        self.problem.set_row(row, entries);
        self.outcome = Outcome::default();
    }

    fn set_column_bounds(&mut self, column: usize, lower_bound: f64, upper_bound: f64) {
        self.problem.set_column_bounds(column, lower_bound, upper_bound);
        self.outcome = Outcome::default();
    }

    fn set_column_integer(&mut self, column: usize, integer: bool) {
        self.problem.set_column_integer(column, integer);
        self.outcome = Outcome::default();
    }

    fn set_row_bounds(&mut self, row: usize, lower_bound: f64, upper_bound: f64) {
        self.problem.set_row_bounds(row, lower_bound, upper_bound);
        self.outcome = Outcome::default();
    }

    fn set_objective_coefficient(&mut self, column: usize, coefficient: f64) {
        self.problem.set_objective_coefficient(column, coefficient);
        self.outcome = Outcome::default();
    }

    fn set_objective_offset(&mut self, offset: f64) {
        self.problem.set_objective_offset(offset);
        self.outcome = Outcome::default();
    }

    fn configure(&mut self, parameters: &SolverParameters) -> Result<()> {
        parameters.validate()?;
        let caps = self.engine.capabilities();

        if let Some(algorithm) = parameters.lp_algorithm {
            if !caps.lp_algorithms.contains(&algorithm) {
                return Err(self.unsupported("lp_algorithm", algorithm));
            }
        }
        if let Some(mode) = parameters.presolve {
            if !caps.presolve {
                return Err(self.unsupported("presolve", mode));
            }
        }
        if !caps.tolerances {
            if let Some(tolerance) = parameters.primal_tolerance {
                return Err(self.unsupported("primal_tolerance", tolerance));
            }
            if let Some(tolerance) = parameters.dual_tolerance {
                return Err(self.unsupported("dual_tolerance", tolerance));
            }
        }

        let mut relative_mip_gap = parameters.relative_mip_gap;
        if let Some(gap) = relative_mip_gap {
            if self.problem.kind().is_continuous() {
                log::warn!("Relative MIP gap {} ignored for a continuous problem", gap);
                relative_mip_gap = None;
            } else if !caps.relative_mip_gap {
                return Err(self.unsupported("relative_mip_gap", gap));
            }
        }

        let mut time_limit = parameters.time_limit;
        if let Some(limit) = time_limit {
            if !caps.time_limit {
                log::warn!(
                    "{} has no time limit, ignoring {:?}",
                    self.engine.name(),
                    limit
                );
                time_limit = None;
            }
        }

        self.settings = EngineSettings {
            time_limit,
            relative_mip_gap,
            primal_tolerance: parameters.primal_tolerance,
            dual_tolerance: parameters.dual_tolerance,
            presolve: parameters.presolve,
            lp_algorithm: parameters.lp_algorithm,
            verbose: parameters.verbose,
        };
        Ok(())
    }

    fn solve(&mut self, observer: &mut dyn SearchObserver) -> ResultStatus {
        self.outcome = Outcome::default();
        self.progress.reset(self.problem.direction());

        let start = Instant::now();
        let status = if self.problem.num_columns() == 0 {
            self.solve_empty()
        } else {
            let run = {
                let mut forwarder = ProgressForwarder {
                    progress: &mut self.progress,
                    inner: &mut *observer,
                };
                self.engine
                    .run(&self.problem, &self.settings, &mut forwarder)
            };
            self.read_run(run)
        };
        log::debug!(
            "{} solved {} columns x {} rows in {:?}: {}",
            self.engine.name(),
            self.problem.num_columns(),
            self.problem.num_rows(),
            start.elapsed(),
            status
        );

        if self.problem.kind().is_mip() {
            let best_bound = self
                .outcome
                .best_bound
                .unwrap_or_else(|| self.problem.direction().worst_bound());
            let snapshot = SearchSnapshot {
                explored_nodes: self.outcome.nodes,
                best_bound,
                incumbent: self.outcome.solution.as_ref().map(|s| s.objective_value),
            };
            if snapshot.incumbent.is_some() {
                self.notify(observer, SearchCheckpoint::IncumbentFound, snapshot);
            }
            self.notify(observer, SearchCheckpoint::Finished, snapshot);
        }
        status
    }

    fn solution(&self) -> Option<&SolutionValues> {
        self.outcome.solution.as_ref()
    }

    fn iterations(&self) -> Option<u64> {
        self.outcome.iterations
    }

    fn nodes(&self) -> Option<u64> {
        self.outcome.nodes
    }

    fn best_objective_bound(&self) -> Option<f64> {
        self.outcome.best_bound
    }

    fn column_status(&self, column: usize) -> Option<BasisStatus> {
        self.outcome
            .basis
            .as_ref()
            .and_then(|basis| basis.columns.get(column).copied())
    }

    fn row_status(&self, row: usize) -> Option<BasisStatus> {
        self.outcome
            .basis
            .as_ref()
            .and_then(|basis| basis.rows.get(row).copied())
    }

    fn compute_exact_condition_number(&self) -> Result<f64> {
        let basis = self
            .outcome
            .basis
            .as_ref()
            .ok_or_else(|| SolverError::NotReported {
                what: "an optimal basis",
                backend: self.engine.name().to_string(),
            })?;
        basis_condition_number(&self.problem, basis)
    }
}
