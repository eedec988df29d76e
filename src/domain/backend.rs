// Domain service interface for solver backends
// Defines the contract every backend adapter follows; the Solver facade only talks to this trait

use super::observer::SearchObserver;
use super::parameters::SolverParameters;
use super::value_objects::{BasisStatus, OptimizationType, ProblemKind, ResultStatus};

/// Error types for the modelling layer
#[derive(Debug, thiserror::Error)]
pub enum SolverError {
    /// A handle from before a model reset, or one issued by another model
    #[error("Invalid entity: {0}")]
    InvalidEntity(String),

    #[error("{backend} does not support {parameter} = {value}")]
    UnsupportedParameter {
        backend: String,
        parameter: &'static str,
        value: String,
    },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The model changed since the last solve, so solution values are out of date
    #[error("The solution is stale: the model changed since the last solve")]
    StaleSolution,

    #[error("No solution available (last status: {0})")]
    NoSolution(ResultStatus),

    #[error("Backend failure: {0}")]
    BackendFailure(String),

    /// Queried a statistic the current problem kind does not track
    #[error("{what} is only available for {expected} problems, this one is {kind}")]
    ExactInfoUnavailable {
        what: &'static str,
        expected: ProblemKind,
        kind: ProblemKind,
    },

    #[error("{backend} does not report {what}")]
    NotReported { what: &'static str, backend: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SolverError>;

/// Column data pushed when a variable is extracted
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnSpec<'a> {
    pub name: &'a str,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub integer: bool,
}

/// Row data pushed when a constraint is extracted; coefficients follow separately
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowSpec<'a> {
    pub name: &'a str,
    pub lower_bound: f64,
    pub upper_bound: f64,
}

/// Mutations a backend may be able to apply to an already extracted entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IncrementalChange {
    ColumnBounds,
    ColumnKind,
    RowBounds,
    /// Replacing the whole coefficient list of a row
    RowCoefficients,
    ObjectiveCoefficient,
    Direction,
}

/// Values read back from the backend after a solve with a usable solution
///
/// Vectors are indexed by backend column/row. Duals and reduced costs are
/// only produced for continuous problems, and only by engines that expose them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SolutionValues {
    pub objective_value: f64,
    pub column_values: Vec<f64>,
    pub reduced_costs: Option<Vec<f64>>,
    pub row_activities: Vec<f64>,
    pub row_duals: Option<Vec<f64>>,
}

/// Backend adapter interface
///
/// Indices are 0-based and dense: columns and rows are appended in extraction
/// order and never removed short of [`Backend::reset`].
pub trait Backend {
    /// Get the name of this backend
    fn name(&self) -> &str;

    fn version(&self) -> String;

    fn problem_kind(&self) -> ProblemKind;

    /// Whether `change` can be applied to an extracted entity without re-extraction
    fn supports_incremental(&self, _change: IncrementalChange) -> bool {
        true
    }

    /// Drop the backend copy of the model and any solution attached to it
    fn reset(&mut self);

    fn set_optimization_direction(&mut self, direction: OptimizationType);

    fn add_columns(&mut self, columns: &[ColumnSpec<'_>]);

    fn add_rows(&mut self, rows: &[RowSpec<'_>]);

    /// Bulk load `(row, column, coefficient)` triplets into freshly added rows
    fn load_matrix(&mut self, entries: &[(usize, usize, f64)]);

    /// Replace every coefficient of `row`
    fn set_row(&mut self, row: usize, entries: &[(usize, f64)]);

    fn set_column_bounds(&mut self, column: usize, lower_bound: f64, upper_bound: f64);

    fn set_column_integer(&mut self, column: usize, integer: bool);

    fn set_row_bounds(&mut self, row: usize, lower_bound: f64, upper_bound: f64);

    fn set_objective_coefficient(&mut self, column: usize, coefficient: f64);

    fn set_objective_offset(&mut self, offset: f64);

    /// Validate and store parameters for the next solve
    fn configure(&mut self, parameters: &SolverParameters) -> Result<()>;

    /// Run the external engine; never panics on engine failure, reports [`ResultStatus::Abnormal`]
    fn solve(&mut self, observer: &mut dyn SearchObserver) -> ResultStatus;

    /// Values of the last solve, present only when its status has a solution
    fn solution(&self) -> Option<&SolutionValues>;

    fn iterations(&self) -> Option<u64>;

    fn nodes(&self) -> Option<u64>;

    fn best_objective_bound(&self) -> Option<f64>;

    fn column_status(&self, column: usize) -> Option<BasisStatus>;

    fn row_status(&self, row: usize) -> Option<BasisStatus>;

    /// Condition number of the last optimal basis; infinite when it cannot be factorized
    fn compute_exact_condition_number(&self) -> Result<f64>;
}

impl std::fmt::Debug for dyn Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Backend({})", self.name())
    }
}
