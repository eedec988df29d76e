// Solver facade
// Owns the registry and the sync tracker, decides for every mutation whether it is applied
// in place or deferred, and runs the extraction pass before each solve

use std::ops::Range;
use std::path::Path;
use std::time::Instant;

use crate::domain::{
    Backend, BasisStatus, ColumnSpec, ConstraintId, EntityRegistry, Incrementality,
    IncrementalChange, NoopObserver, Objective, OptimizationType, ProblemKind, Result,
    ResultStatus, RowSpec, SearchObserver, SolverBackend, SolverError, SolverParameters,
    SolverStatistics, SyncStatus, SyncTracker, VariableId,
};
use crate::infrastructure::write_model;
use crate::solver::BackendFactory;

/// A model bound to one backend
///
/// # Example
///
/// ```
/// use lpsync::{OptimizationType, ProblemKind, ResultStatus, Solver, SolverBackend};
///
/// let mut solver = Solver::new("demo", SolverBackend::MicroLp, ProblemKind::Continuous)?;
/// let x = solver.add_variable(0.0, 10.0, false, "x");
/// let c = solver.add_constraint(f64::NEG_INFINITY, 5.0, "c");
/// solver.set_coefficient(c, x, 1.0)?;
/// solver.set_objective_coefficient(x, 1.0)?;
/// solver.set_optimization_direction(OptimizationType::Maximize);
///
/// assert_eq!(solver.solve()?, ResultStatus::Optimal);
/// assert!((solver.variable_value(x)? - 5.0).abs() < 1e-9);
/// # Ok::<(), lpsync::SolverError>(())
/// ```
#[derive(Debug)]
pub struct Solver {
    name: String,
    registry: EntityRegistry,
    tracker: SyncTracker,
    backend: Box<dyn Backend>,
    parameters: SolverParameters,
    result_status: ResultStatus,
    objective_value: Option<f64>,
    statistics: SolverStatistics,
}

impl Solver {
    /// Create a solver on one of the built-in backends
    pub fn new(name: impl Into<String>, backend: SolverBackend, kind: ProblemKind) -> Result<Self> {
        Ok(Self::with_backend(name, BackendFactory::create(backend, kind)?))
    }

    /// Create a solver on a caller-provided backend
    pub fn with_backend(name: impl Into<String>, backend: Box<dyn Backend>) -> Self {
        Self {
            name: name.into(),
            registry: EntityRegistry::new(),
            tracker: SyncTracker::new(),
            backend,
            parameters: SolverParameters::default(),
            result_status: ResultStatus::NotSolved,
            objective_value: None,
            statistics: SolverStatistics::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    pub fn backend_version(&self) -> String {
        self.backend.version()
    }

    pub fn problem_kind(&self) -> ProblemKind {
        self.backend.problem_kind()
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    pub fn objective(&self) -> &Objective {
        self.registry.objective()
    }

    pub fn sync_status(&self) -> SyncStatus {
        self.tracker.status()
    }

    pub fn result_status(&self) -> ResultStatus {
        self.result_status
    }

    pub fn statistics(&self) -> &SolverStatistics {
        &self.statistics
    }

    pub fn parameters(&self) -> &SolverParameters {
        &self.parameters
    }

    pub fn set_parameters(&mut self, parameters: SolverParameters) {
        self.parameters = parameters;
    }

    // Model building

    pub fn add_variable(
        &mut self,
        lower_bound: f64,
        upper_bound: f64,
        integer: bool,
        name: impl Into<String>,
    ) -> VariableId {
        self.tracker.mark_pending();
        self.registry
            .add_variable(lower_bound, upper_bound, integer, name)
    }

    pub fn add_constraint(
        &mut self,
        lower_bound: f64,
        upper_bound: f64,
        name: impl Into<String>,
    ) -> ConstraintId {
        self.tracker.mark_pending();
        self.registry.add_constraint(lower_bound, upper_bound, name)
    }

    pub fn set_variable_bounds(
        &mut self,
        variable: VariableId,
        lower_bound: f64,
        upper_bound: f64,
    ) -> Result<()> {
        let var = self.registry.variable_mut(variable)?;
        var.lower_bound = lower_bound;
        var.upper_bound = upper_bound;
        let index = var.index;

        match index {
            Some(col) if self.backend.supports_incremental(IncrementalChange::ColumnBounds) => {
                self.backend.set_column_bounds(col, lower_bound, upper_bound);
                self.tracker.invalidate_solution();
            }
            Some(col) => self.tracker.mark_column_dirty(col),
            None => self.tracker.mark_pending(),
        }
        Ok(())
    }

    pub fn set_variable_integer(&mut self, variable: VariableId, integer: bool) -> Result<()> {
        let var = self.registry.variable_mut(variable)?;
        if var.integer == integer {
            return Ok(());
        }
        var.integer = integer;
        let index = var.index;

        // Continuous backends never see integrality
        if self.problem_kind().is_continuous() {
            return Ok(());
        }
        match index {
            Some(col) if self.backend.supports_incremental(IncrementalChange::ColumnKind) => {
                self.backend.set_column_integer(col, integer);
                self.tracker.invalidate_solution();
            }
            Some(col) => self.tracker.mark_column_dirty(col),
            None => self.tracker.mark_pending(),
        }
        Ok(())
    }

    pub fn set_constraint_bounds(
        &mut self,
        constraint: ConstraintId,
        lower_bound: f64,
        upper_bound: f64,
    ) -> Result<()> {
        let ct = self.registry.constraint_mut(constraint)?;
        ct.lower_bound = lower_bound;
        ct.upper_bound = upper_bound;
        let index = ct.index;

        match index {
            Some(row) if self.backend.supports_incremental(IncrementalChange::RowBounds) => {
                self.backend.set_row_bounds(row, lower_bound, upper_bound);
                self.tracker.invalidate_solution();
            }
            Some(row) => self.tracker.mark_row_dirty(row),
            None => self.tracker.mark_pending(),
        }
        Ok(())
    }

    /// Set the coefficient of `variable` in `constraint`
    ///
    /// Backends take whole rows: an extracted row is re-pushed entirely, or
    /// marked for reload when it now references a variable not yet extracted.
    pub fn set_coefficient(
        &mut self,
        constraint: ConstraintId,
        variable: VariableId,
        value: f64,
    ) -> Result<()> {
        let previous = self.registry.set_coefficient(constraint, variable, value)?;
        if previous == value {
            return Ok(());
        }
        self.sync_row(constraint)
    }

    /// Remove every coefficient of `constraint`, keeping its bounds
    pub fn clear_constraint(&mut self, constraint: ConstraintId) -> Result<()> {
        self.registry.constraint_mut(constraint)?.coefficients.clear();
        self.sync_row(constraint)
    }

    fn sync_row(&mut self, constraint: ConstraintId) -> Result<()> {
        let ct = self.registry.constraint(constraint)?;
        match ct.index {
            Some(row)
                if !self.registry.contains_new_variables(ct)
                    && self
                        .backend
                        .supports_incremental(IncrementalChange::RowCoefficients) =>
            {
                let entries = self.registry.row_entries(constraint.slot());
                self.backend.set_row(row, &entries);
                self.tracker.invalidate_solution();
            }
            Some(row) => self.tracker.mark_row_dirty(row),
            None => self.tracker.mark_pending(),
        }
        Ok(())
    }

    /// Cached until the next solve, which pushes the objective as a whole
    pub fn set_objective_coefficient(&mut self, variable: VariableId, value: f64) -> Result<()> {
        self.registry.set_objective_coefficient(variable, value)?;
        self.tracker.mark_objective_dirty();
        Ok(())
    }

    pub fn set_objective_offset(&mut self, offset: f64) {
        self.registry.objective_mut().offset = offset;
        self.tracker.mark_objective_dirty();
    }

    /// Drop every objective coefficient; the offset is kept
    pub fn clear_objective(&mut self) {
        let coefficients = std::mem::take(&mut self.registry.objective_mut().coefficients);
        if !self
            .backend
            .supports_incremental(IncrementalChange::ObjectiveCoefficient)
        {
            self.tracker.mark_objective_dirty();
            return;
        }
        for var in coefficients.keys() {
            if let Ok(Some(col)) = self.registry.variable(*var).map(|v| v.index) {
                self.backend.set_objective_coefficient(col, 0.0);
            }
        }
        self.tracker.invalidate_solution();
    }

    pub fn set_optimization_direction(&mut self, direction: OptimizationType) {
        self.registry.objective_mut().optimization_type = direction;
        if self.backend.supports_incremental(IncrementalChange::Direction) {
            self.backend.set_optimization_direction(direction);
            self.tracker.invalidate_solution();
        } else {
            self.tracker.mark_objective_dirty();
        }
    }

    // Lifecycle

    /// Drop the backend copy of the model; entities and their ids survive
    pub fn reset_extraction(&mut self) {
        self.backend.reset();
        self.registry.clear_indices();
        self.registry.clear_solution();
        self.tracker.reset();
        self.result_status = ResultStatus::NotSolved;
        self.objective_value = None;
    }

    /// Drop every entity and the objective; ids issued before become invalid
    pub fn clear(&mut self) {
        self.registry.clear();
        self.reset_extraction();
    }

    // Solving

    pub fn solve(&mut self) -> Result<ResultStatus> {
        self.solve_with_observer(&mut NoopObserver)
    }

    /// Solve, reporting MIP search checkpoints to `observer`
    pub fn solve_with_observer(
        &mut self,
        observer: &mut dyn SearchObserver,
    ) -> Result<ResultStatus> {
        if self.parameters.incrementality == Incrementality::Off {
            self.reset_extraction();
        }

        self.registry.clear_solution();
        self.result_status = ResultStatus::NotSolved;
        self.objective_value = None;

        // Extraction never ends in MustReload
        self.extract_model()?;

        if let Some(path) = &self.parameters.write_model {
            write_model(path, &self.name, &self.registry, self.problem_kind())?;
        }
        self.backend.configure(&self.parameters)?;

        let start = Instant::now();
        self.result_status = self.backend.solve(observer);
        self.statistics.solve_time = start.elapsed();
        log::debug!(
            "{}: {} in {:.3}s",
            self.name,
            self.result_status,
            self.statistics.solve_time.as_secs_f64()
        );

        self.read_solution();
        self.tracker.solution_synchronized();
        Ok(self.result_status)
    }

    /// Push everything the backend has not seen yet
    fn extract_model(&mut self) -> Result<()> {
        if !self
            .tracker
            .needs_extraction(self.registry.num_variables(), self.registry.num_constraints())
        {
            return Ok(());
        }
        let start = Instant::now();

        if !self.can_patch_dirty_entities() {
            log::debug!("{}: backend cannot patch changed entities, reloading", self.name);
            self.reset_extraction();
        }

        let new_columns = self.extract_new_variables();
        self.extract_dirty_entities();
        let new_rows = self.extract_new_constraints();
        self.extract_objective(new_columns.clone());

        self.tracker
            .model_extracted(self.registry.num_variables(), self.registry.num_constraints());

        self.statistics.build_time = start.elapsed();
        self.statistics.num_variables = self.registry.num_variables();
        self.statistics.num_constraints = self.registry.num_constraints();
        self.statistics.num_integer_vars = self.registry.num_integer_variables();
        log::debug!(
            "{}: extracted {} new columns and {} new rows in {:.3}s",
            self.name,
            new_columns.len(),
            new_rows.len(),
            self.statistics.build_time.as_secs_f64()
        );
        Ok(())
    }

    /// Whether the dirty rows and columns can be re-pushed without a full reload
    fn can_patch_dirty_entities(&self) -> bool {
        let backend = &self.backend;
        let columns = !self.tracker.has_dirty_columns()
            || backend.supports_incremental(IncrementalChange::ColumnBounds)
                && (self.problem_kind().is_continuous()
                    || backend.supports_incremental(IncrementalChange::ColumnKind));
        let rows = !self.tracker.has_dirty_rows()
            || backend.supports_incremental(IncrementalChange::RowBounds)
                && backend.supports_incremental(IncrementalChange::RowCoefficients);
        columns && rows
    }

    fn extract_new_variables(&mut self) -> Range<usize> {
        let columns = self
            .registry
            .assign_variable_indices(self.tracker.last_variable_index());
        if columns.is_empty() {
            return columns;
        }
        let specs: Vec<ColumnSpec<'_>> = self.registry.variables()[columns.clone()]
            .iter()
            .map(|var| ColumnSpec {
                name: &var.name,
                lower_bound: var.lower_bound,
                upper_bound: var.upper_bound,
                integer: var.integer,
            })
            .collect();
        self.backend.add_columns(&specs);
        columns
    }

    fn extract_dirty_entities(&mut self) {
        let mip = self.problem_kind().is_mip();
        for col in self.tracker.take_dirty_columns() {
            let var = &self.registry.variables()[col];
            self.backend
                .set_column_bounds(col, var.lower_bound, var.upper_bound);
            if mip {
                self.backend.set_column_integer(col, var.integer);
            }
        }
        for row in self.tracker.take_dirty_rows() {
            let ct = &self.registry.constraints()[row];
            self.backend.set_row_bounds(row, ct.lower_bound, ct.upper_bound);
            let entries = self.registry.row_entries(row);
            self.backend.set_row(row, &entries);
        }
    }

    fn extract_new_constraints(&mut self) -> Range<usize> {
        let from = self.tracker.last_constraint_index();
        let rows = self.registry.assign_constraint_indices(from);
        if rows.is_empty() {
            return rows;
        }
        let specs: Vec<RowSpec<'_>> = self.registry.constraints()[rows.clone()]
            .iter()
            .map(|ct| RowSpec {
                name: &ct.name,
                lower_bound: ct.lower_bound,
                upper_bound: ct.upper_bound,
            })
            .collect();
        self.backend.add_rows(&specs);

        if from == 0 {
            // Nothing was loaded before, the whole matrix goes in one call
            let triplets: Vec<(usize, usize, f64)> = rows
                .clone()
                .flat_map(|row| {
                    self.registry
                        .row_entries(row)
                        .into_iter()
                        .map(move |(col, coef)| (row, col, coef))
                })
                .collect();
            self.backend.load_matrix(&triplets);
        } else {
            for row in rows.clone() {
                let entries = self.registry.row_entries(row);
                if !entries.is_empty() {
                    self.backend.set_row(row, &entries);
                }
            }
        }
        rows
    }

    fn extract_objective(&mut self, new_columns: Range<usize>) {
        let dirty = self.tracker.take_objective_dirty();
        if !dirty && new_columns.is_empty() {
            return;
        }
        let objective = self.registry.objective();
        let columns = if dirty {
            0..self.registry.num_variables()
        } else {
            new_columns
        };
        for (id, var) in self
            .registry
            .variable_ids()
            .zip(self.registry.variables())
            .skip(columns.start)
            .take(columns.len())
        {
            if let Some(col) = var.index {
                self.backend
                    .set_objective_coefficient(col, objective.coefficient(id));
            }
        }
        if dirty {
            self.backend
                .set_optimization_direction(objective.optimization_type());
            self.backend.set_objective_offset(objective.offset());
        }
    }

    fn read_solution(&mut self) {
        let Some(values) = self.backend.solution().filter(|_| self.result_status.has_solution())
        else {
            return;
        };
        self.objective_value = Some(values.objective_value);
        log::debug!("{}: objective value {}", self.name, values.objective_value);

        for var in self.registry.variables_mut() {
            if let Some(col) = var.index {
                var.solution_value = values.column_values.get(col).copied();
                var.reduced_cost = values
                    .reduced_costs
                    .as_ref()
                    .and_then(|costs| costs.get(col).copied());
                log::trace!("{} = {:?}", var.name, var.solution_value);
            }
        }
        for ct in self.registry.constraints_mut() {
            if let Some(row) = ct.index {
                ct.activity = values.row_activities.get(row).copied();
                ct.dual_value = values
                    .row_duals
                    .as_ref()
                    .and_then(|duals| duals.get(row).copied());
                log::trace!("{} activity = {:?}", ct.name, ct.activity);
            }
        }
    }

    // Queries

    /// Fails unless the last solve is current and produced values
    fn check_solution(&self) -> Result<()> {
        self.tracker.check_solution_synchronized()?;
        if !self.result_status.has_solution() {
            if self.result_status == ResultStatus::Abnormal {
                log::warn!("{}: the last solve was abnormal, no values are available", self.name);
            }
            return Err(SolverError::NoSolution(self.result_status));
        }
        Ok(())
    }

    fn check_kind(&self, what: &'static str, expected: ProblemKind) -> Result<()> {
        let kind = self.problem_kind();
        if kind != expected {
            return Err(SolverError::ExactInfoUnavailable {
                what,
                expected,
                kind,
            });
        }
        Ok(())
    }

    fn not_reported(&self, what: &'static str) -> SolverError {
        SolverError::NotReported {
            what,
            backend: self.backend.name().to_string(),
        }
    }

    pub fn objective_value(&self) -> Result<f64> {
        self.check_solution()?;
        self.objective_value
            .ok_or(SolverError::NoSolution(self.result_status))
    }

    pub fn variable_value(&self, variable: VariableId) -> Result<f64> {
        let var = self.registry.variable(variable)?;
        self.check_solution()?;
        var.solution_value
            .ok_or(SolverError::NoSolution(self.result_status))
    }

    pub fn constraint_activity(&self, constraint: ConstraintId) -> Result<f64> {
        let ct = self.registry.constraint(constraint)?;
        self.check_solution()?;
        ct.activity.ok_or(SolverError::NoSolution(self.result_status))
    }

    pub fn reduced_cost(&self, variable: VariableId) -> Result<f64> {
        let var = self.registry.variable(variable)?;
        self.check_kind("reduced cost", ProblemKind::Continuous)?;
        self.check_solution()?;
        var.reduced_cost.ok_or_else(|| self.not_reported("reduced costs"))
    }

    pub fn dual_value(&self, constraint: ConstraintId) -> Result<f64> {
        let ct = self.registry.constraint(constraint)?;
        self.check_kind("dual value", ProblemKind::Continuous)?;
        self.check_solution()?;
        ct.dual_value.ok_or_else(|| self.not_reported("dual values"))
    }

    /// Simplex iterations of the last solve, continuous problems only
    pub fn iterations(&self) -> Result<u64> {
        self.check_kind("iteration count", ProblemKind::Continuous)?;
        self.tracker.check_solution_synchronized()?;
        self.backend
            .iterations()
            .ok_or_else(|| self.not_reported("iteration count"))
    }

    /// Branch-and-bound nodes explored by the last solve, integer problems only
    pub fn nodes(&self) -> Result<u64> {
        self.check_kind("node count", ProblemKind::MixedInteger)?;
        self.tracker.check_solution_synchronized()?;
        self.backend
            .nodes()
            .ok_or_else(|| self.not_reported("node count"))
    }

    /// Best bound proven by the last solve, integer problems only
    pub fn best_objective_bound(&self) -> Result<f64> {
        self.check_kind("best objective bound", ProblemKind::MixedInteger)?;
        self.tracker.check_solution_synchronized()?;
        if self.result_status == ResultStatus::Abnormal {
            log::warn!("{}: best bound read after an abnormal solve", self.name);
        }
        self.backend
            .best_objective_bound()
            .ok_or_else(|| self.not_reported("best objective bound"))
    }

    pub fn variable_basis_status(&self, variable: VariableId) -> Result<BasisStatus> {
        let var = self.registry.variable(variable)?;
        self.check_kind("basis status", ProblemKind::Continuous)?;
        self.check_solution()?;
        var.index
            .and_then(|col| self.backend.column_status(col))
            .ok_or_else(|| self.not_reported("basis status"))
    }

    pub fn constraint_basis_status(&self, constraint: ConstraintId) -> Result<BasisStatus> {
        let ct = self.registry.constraint(constraint)?;
        self.check_kind("basis status", ProblemKind::Continuous)?;
        self.check_solution()?;
        ct.index
            .and_then(|row| self.backend.row_status(row))
            .ok_or_else(|| self.not_reported("basis status"))
    }

    /// 1-norm condition number of the optimal basis; infinite for a singular one
    pub fn compute_exact_condition_number(&self) -> Result<f64> {
        self.check_kind("condition number", ProblemKind::Continuous)?;
        self.check_solution()?;
        self.backend.compute_exact_condition_number()
    }

    /// Export the model; `.lp` files get the LP format, anything else fixed MPS
    pub fn write_model(&self, path: impl AsRef<Path>) -> Result<()> {
        write_model(path.as_ref(), &self.name, &self.registry, self.problem_kind())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::domain::SolutionValues;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Reset,
        Direction(OptimizationType),
        AddColumns(usize),
        AddRows(usize),
        LoadMatrix(Vec<(usize, usize, f64)>),
        SetRow(usize, Vec<(usize, f64)>),
        ColumnBounds(usize, f64, f64),
        ColumnInteger(usize, bool),
        RowBounds(usize, f64, f64),
        ObjectiveCoefficient(usize, f64),
        ObjectiveOffset(f64),
        Solve,
    }

    /// Backend that records every call and answers with a fixed status
    struct RecordingBackend {
        kind: ProblemKind,
        incremental: bool,
        status: ResultStatus,
        calls: Rc<RefCell<Vec<Call>>>,
        columns: usize,
        rows: usize,
        solution: Option<SolutionValues>,
    }

    impl RecordingBackend {
        fn boxed(kind: ProblemKind, incremental: bool) -> (Box<dyn Backend>, Rc<RefCell<Vec<Call>>>) {
            Self::boxed_with_status(kind, incremental, ResultStatus::Optimal)
        }

        fn boxed_with_status(
            kind: ProblemKind,
            incremental: bool,
            status: ResultStatus,
        ) -> (Box<dyn Backend>, Rc<RefCell<Vec<Call>>>) {
            let calls = Rc::new(RefCell::new(Vec::new()));
            let backend = RecordingBackend {
                kind,
                incremental,
                status,
                calls: Rc::clone(&calls),
                columns: 0,
                rows: 0,
                solution: None,
            };
            (Box::new(backend), calls)
        }

        fn record(&self, call: Call) {
            self.calls.borrow_mut().push(call);
        }
    }

    impl Backend for RecordingBackend {
        fn name(&self) -> &str {
            "recording"
        }

        fn version(&self) -> String {
            "0".to_string()
        }

        fn problem_kind(&self) -> ProblemKind {
            self.kind
        }

        fn supports_incremental(&self, _change: IncrementalChange) -> bool {
            self.incremental
        }

        fn reset(&mut self) {
            self.columns = 0;
            self.rows = 0;
            self.record(Call::Reset);
        }

        fn set_optimization_direction(&mut self, direction: OptimizationType) {
            self.record(Call::Direction(direction));
        }

        fn add_columns(&mut self, columns: &[ColumnSpec<'_>]) {
            self.columns += columns.len();
            self.record(Call::AddColumns(columns.len()));
        }

        fn add_rows(&mut self, rows: &[RowSpec<'_>]) {
            self.rows += rows.len();
            self.record(Call::AddRows(rows.len()));
        }

        fn load_matrix(&mut self, entries: &[(usize, usize, f64)]) {
            self.record(Call::LoadMatrix(entries.to_vec()));
        }

        fn set_row(&mut self, row: usize, entries: &[(usize, f64)]) {
            self.record(Call::SetRow(row, entries.to_vec()));
        }

        fn set_column_bounds(&mut self, column: usize, lower_bound: f64, upper_bound: f64) {
            self.record(Call::ColumnBounds(column, lower_bound, upper_bound));
        }

        fn set_column_integer(&mut self, column: usize, integer: bool) {
            self.record(Call::ColumnInteger(column, integer));
        }

        fn set_row_bounds(&mut self, row: usize, lower_bound: f64, upper_bound: f64) {
            self.record(Call::RowBounds(row, lower_bound, upper_bound));
        }

        fn set_objective_coefficient(&mut self, column: usize, coefficient: f64) {
            self.record(Call::ObjectiveCoefficient(column, coefficient));
        }

        fn set_objective_offset(&mut self, offset: f64) {
            self.record(Call::ObjectiveOffset(offset));
        }

        fn configure(&mut self, _parameters: &SolverParameters) -> Result<()> {
            Ok(())
        }

        fn solve(&mut self, _observer: &mut dyn SearchObserver) -> ResultStatus {
            self.record(Call::Solve);
            self.solution = self.status.has_solution().then(|| SolutionValues {
                objective_value: 1.0,
                column_values: vec![1.0; self.columns],
                reduced_costs: None,
                row_activities: vec![0.0; self.rows],
                row_duals: None,
            });
            self.status
        }

        fn solution(&self) -> Option<&SolutionValues> {
            self.solution.as_ref()
        }

        fn iterations(&self) -> Option<u64> {
            Some(3)
        }

        fn nodes(&self) -> Option<u64> {
            None
        }

        fn best_objective_bound(&self) -> Option<f64> {
            None
        }

        fn column_status(&self, _column: usize) -> Option<BasisStatus> {
            None
        }

        fn row_status(&self, _row: usize) -> Option<BasisStatus> {
            None
        }

        fn compute_exact_condition_number(&self) -> Result<f64> {
            Ok(1.0)
        }
    }

    fn take(calls: &Rc<RefCell<Vec<Call>>>) -> Vec<Call> {
        std::mem::take(&mut *calls.borrow_mut())
    }

    /// x, y in [0, 10]; c: x + y <= 4; min x
    fn small_model(incremental: bool) -> (Solver, Rc<RefCell<Vec<Call>>>, VariableId, VariableId, ConstraintId) {
        let (backend, calls) = RecordingBackend::boxed(ProblemKind::Continuous, incremental);
        let mut solver = Solver::with_backend("small", backend);
        let x = solver.add_variable(0.0, 10.0, false, "x");
        let y = solver.add_variable(0.0, 10.0, false, "y");
        let c = solver.add_constraint(f64::NEG_INFINITY, 4.0, "c");
        solver.set_coefficient(c, x, 1.0).unwrap();
        solver.set_coefficient(c, y, 1.0).unwrap();
        solver.set_objective_coefficient(x, 1.0).unwrap();
        (solver, calls, x, y, c)
    }

    #[test]
    fn first_extraction_loads_the_whole_matrix() {
        let (mut solver, calls, _, _, _) = small_model(true);
        assert_eq!(solver.sync_status(), SyncStatus::ModelModifiedNotExtracted);
        assert_eq!(solver.solve().unwrap(), ResultStatus::Optimal);

        assert_eq!(
            take(&calls),
            vec![
                Call::AddColumns(2),
                Call::AddRows(1),
                Call::LoadMatrix(vec![(0, 0, 1.0), (0, 1, 1.0)]),
                Call::ObjectiveCoefficient(0, 1.0),
                Call::ObjectiveCoefficient(1, 0.0),
                Call::Direction(OptimizationType::Minimize),
                Call::ObjectiveOffset(0.0),
                Call::Solve,
            ]
        );
        assert_eq!(solver.sync_status(), SyncStatus::SolutionSynchronized);
        assert_eq!(solver.statistics().num_variables, 2);
    }

    #[test]
    fn later_constraints_are_pushed_row_by_row() {
        let (mut solver, calls, x, _, _) = small_model(true);
        solver.solve().unwrap();
        take(&calls);

        let d = solver.add_constraint(1.0, f64::INFINITY, "d");
        solver.set_coefficient(d, x, 2.0).unwrap();
        solver.solve().unwrap();
        assert_eq!(
            take(&calls),
            vec![
                Call::AddRows(1),
                Call::SetRow(1, vec![(0, 2.0)]),
                Call::Solve,
            ]
        );
    }

    #[test]
    fn bound_change_is_applied_in_place() {
        let (mut solver, calls, x, _, c) = small_model(true);
        solver.solve().unwrap();
        take(&calls);

        solver.set_variable_bounds(x, 1.0, 2.0).unwrap();
        solver.set_constraint_bounds(c, f64::NEG_INFINITY, 3.0).unwrap();
        assert_eq!(
            take(&calls),
            vec![
                Call::ColumnBounds(0, 1.0, 2.0),
                Call::RowBounds(0, f64::NEG_INFINITY, 3.0),
            ]
        );
        assert_eq!(solver.sync_status(), SyncStatus::ModelSynchronized);
        assert!(matches!(
            solver.variable_value(x),
            Err(SolverError::StaleSolution)
        ));

        // Clean entities are not pushed again
        solver.solve().unwrap();
        assert_eq!(take(&calls), vec![Call::Solve]);
        assert_eq!(solver.variable_value(x).unwrap(), 1.0);
    }

    #[test]
    fn non_incremental_backend_reloads() {
        let (mut solver, calls, x, _, _) = small_model(false);
        solver.solve().unwrap();
        take(&calls);

        solver.set_variable_bounds(x, 1.0, 2.0).unwrap();
        assert!(take(&calls).is_empty());
        assert_eq!(solver.sync_status(), SyncStatus::MustReload);

        solver.solve().unwrap();
        let replay = take(&calls);
        assert_eq!(replay[0], Call::Reset);
        assert_eq!(replay[1], Call::AddColumns(2));
        assert_eq!(solver.sync_status(), SyncStatus::SolutionSynchronized);
    }

    #[test]
    fn coefficient_for_new_variable_marks_row_dirty() {
        let (mut solver, calls, _, _, c) = small_model(true);
        solver.solve().unwrap();
        take(&calls);

        let z = solver.add_variable(0.0, 1.0, false, "z");
        solver.set_coefficient(c, z, 3.0).unwrap();
        assert_eq!(solver.sync_status(), SyncStatus::MustReload);
        assert!(take(&calls).is_empty());

        solver.solve().unwrap();
        assert_eq!(
            take(&calls),
            vec![
                Call::AddColumns(1),
                Call::RowBounds(0, f64::NEG_INFINITY, 4.0),
                Call::SetRow(0, vec![(0, 1.0), (1, 1.0), (2, 3.0)]),
                Call::ObjectiveCoefficient(2, 0.0),
                Call::Solve,
            ]
        );
    }

    #[test]
    fn coefficient_on_extracted_row_replaces_the_row() {
        let (mut solver, calls, x, _, c) = small_model(true);
        solver.solve().unwrap();
        take(&calls);

        solver.set_coefficient(c, x, 5.0).unwrap();
        assert_eq!(take(&calls), vec![Call::SetRow(0, vec![(0, 5.0), (1, 1.0)])]);

        solver.clear_constraint(c).unwrap();
        assert_eq!(take(&calls), vec![Call::SetRow(0, vec![])]);
    }

    #[test]
    fn objective_edits_wait_for_the_next_solve() {
        let (mut solver, calls, x, y, _) = small_model(true);
        solver.solve().unwrap();
        take(&calls);

        solver.set_objective_coefficient(y, 2.0).unwrap();
        solver.set_objective_offset(1.5);
        assert!(take(&calls).is_empty());
        assert_eq!(solver.sync_status(), SyncStatus::ModelModifiedNotExtracted);

        solver.solve().unwrap();
        assert_eq!(
            take(&calls),
            vec![
                Call::ObjectiveCoefficient(0, 1.0),
                Call::ObjectiveCoefficient(1, 2.0),
                Call::Direction(OptimizationType::Minimize),
                Call::ObjectiveOffset(1.5),
                Call::Solve,
            ]
        );

        solver.clear_objective();
        let cleared = take(&calls);
        assert!(cleared.contains(&Call::ObjectiveCoefficient(0, 0.0)));
        assert!(cleared.contains(&Call::ObjectiveCoefficient(1, 0.0)));
        assert_eq!(solver.objective().offset(), 1.5);
        assert_eq!(solver.objective().coefficient(x), 0.0);
    }

    #[test]
    fn incrementality_off_rebuilds_every_solve() {
        let (mut solver, calls, _, _, _) = small_model(true);
        solver.set_parameters(SolverParameters::new().with_incrementality(Incrementality::Off));
        solver.solve().unwrap();
        solver.solve().unwrap();
        let resets = take(&calls).iter().filter(|c| **c == Call::Reset).count();
        assert_eq!(resets, 2);
    }

    #[test]
    fn statistics_are_checked_against_problem_kind_first() {
        let (solver, _, _, _, _) = small_model(true);
        // Not solved yet, the kind check still wins
        assert!(matches!(
            solver.nodes(),
            Err(SolverError::ExactInfoUnavailable { .. })
        ));
        assert!(matches!(
            solver.best_objective_bound(),
            Err(SolverError::ExactInfoUnavailable { .. })
        ));
        assert!(matches!(solver.iterations(), Err(SolverError::StaleSolution)));
    }

    #[test]
    fn integer_flag_is_not_pushed_to_continuous_backends() {
        let (mut solver, calls, x, _, _) = small_model(true);
        solver.solve().unwrap();
        take(&calls);
        solver.set_variable_integer(x, true).unwrap();
        assert!(take(&calls).is_empty());
        assert_eq!(solver.sync_status(), SyncStatus::SolutionSynchronized);
        assert!(solver.registry().variable(x).unwrap().is_integer());
    }

    #[test]
    fn integer_flag_is_pushed_to_mip_backends() {
        let (backend, calls) = RecordingBackend::boxed(ProblemKind::MixedInteger, true);
        let mut solver = Solver::with_backend("mip", backend);
        let x = solver.add_variable(0.0, 3.0, false, "x");
        solver.solve().unwrap();
        take(&calls);

        solver.set_variable_integer(x, true).unwrap();
        assert_eq!(take(&calls), vec![Call::ColumnInteger(0, true)]);
        assert!(matches!(solver.iterations(), Err(SolverError::ExactInfoUnavailable { .. })));
        solver.solve().unwrap();
        assert!(matches!(solver.nodes(), Err(SolverError::NotReported { .. })));
    }

    #[test]
    fn clear_invalidates_handles() {
        let (mut solver, calls, x, _, c) = small_model(true);
        solver.solve().unwrap();
        solver.clear();
        assert_eq!(take(&calls).last(), Some(&Call::Reset));

        assert!(matches!(
            solver.set_variable_bounds(x, 0.0, 1.0),
            Err(SolverError::InvalidEntity(_))
        ));
        assert!(matches!(
            solver.constraint_activity(c),
            Err(SolverError::InvalidEntity(_))
        ));
        assert_eq!(solver.result_status(), ResultStatus::NotSolved);
    }

    #[test]
    fn reset_extraction_keeps_entities() {
        let (mut solver, calls, x, _, _) = small_model(true);
        solver.solve().unwrap();
        solver.reset_extraction();
        take(&calls);
        assert_eq!(solver.sync_status(), SyncStatus::MustReload);

        solver.solve().unwrap();
        let replay = take(&calls);
        assert_eq!(replay[0], Call::AddColumns(2));
        assert_eq!(replay.last(), Some(&Call::Solve));
        assert_eq!(solver.sync_status(), SyncStatus::SolutionSynchronized);
        assert_eq!(solver.variable_value(x).unwrap(), 1.0);
    }

    #[test]
    fn values_require_a_solution() {
        let (backend, _) = RecordingBackend::boxed_with_status(
            ProblemKind::Continuous,
            true,
            ResultStatus::Abnormal,
        );
        let mut solver = Solver::with_backend("abnormal", backend);
        let x = solver.add_variable(0.0, 1.0, false, "x");
        assert_eq!(solver.solve().unwrap(), ResultStatus::Abnormal);
        assert!(matches!(
            solver.variable_value(x),
            Err(SolverError::NoSolution(ResultStatus::Abnormal))
        ));
        assert!(matches!(
            solver.objective_value(),
            Err(SolverError::NoSolution(ResultStatus::Abnormal))
        ));
    }
}
