// Engine interface
// An engine is the external numerical code behind a backend adapter: it reads the
// mirror, runs once, and hands back raw results for the adapter to translate

use std::time::Duration;

use crate::domain::{BasisStatus, LpAlgorithm, PresolveMode, ResultStatus, SearchObserver};

use super::problem::BackendProblem;

/// What an engine accepts and what it reports back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineCapabilities {
    pub mip: bool,
    pub time_limit: bool,
    pub relative_mip_gap: bool,
    pub tolerances: bool,
    pub presolve: bool,
    pub lp_algorithms: &'static [LpAlgorithm],
}

impl EngineCapabilities {
    /// An engine with no tunable setting
    pub const fn minimal() -> Self {
        Self {
            mip: true,
            time_limit: false,
            relative_mip_gap: false,
            tolerances: false,
            presolve: false,
            lp_algorithms: &[],
        }
    }
}

/// Settings already validated against [`EngineCapabilities`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineSettings {
    pub time_limit: Option<Duration>,
    pub relative_mip_gap: Option<f64>,
    pub primal_tolerance: Option<f64>,
    pub dual_tolerance: Option<f64>,
    pub presolve: Option<PresolveMode>,
    pub lp_algorithm: Option<LpAlgorithm>,
    pub verbose: bool,
}

/// Basis of an optimal continuous solve, indexed like the mirror
#[derive(Debug, Clone, PartialEq)]
pub struct Basis {
    pub columns: Vec<BasisStatus>,
    pub rows: Vec<BasisStatus>,
}

/// Values closer than this (relative to the bound) sit on the bound
const BOUND_TOLERANCE: f64 = 1e-9;

/// Reduced vectors below this fraction of their original size are dependent
const INDEPENDENCE_TOLERANCE: f64 = 1e-9;

impl Basis {
    /// Classify every column and row of a vertex solution against its bounds
    ///
    /// Engines that do not report a basis get this reconstruction instead. At a
    /// degenerate vertex fewer than one entry per row lies strictly between its
    /// bounds; the basis is then completed with entries sitting on a bound.
    pub fn from_vertex(problem: &BackendProblem, values: &[f64], activities: &[f64]) -> Self {
        let mut basis = Self::classify_vertex(problem, values, activities);
        basis.complete(problem);
        basis
    }

    fn classify_vertex(problem: &BackendProblem, values: &[f64], activities: &[f64]) -> Self {
        let columns = problem
            .columns()
            .iter()
            .zip(values)
            .map(|(col, &x)| classify(x, col.lower_bound, col.upper_bound))
            .collect();
        let rows = problem
            .rows()
            .iter()
            .zip(activities)
            .map(|(row, &r)| classify(r, row.lower_bound, row.upper_bound))
            .collect();
        Self { columns, rows }
    }

    /// Promote nonbasic entries until there is one basic entry per row
    ///
    /// Slacks of tight rows are tried first, then structural columns on a
    /// bound. A candidate enters only when its column in B is independent of
    /// the entries already basic.
    fn complete(&mut self, problem: &BackendProblem) {
        let m = problem.num_rows();
        let mut basic = self
            .columns
            .iter()
            .chain(&self.rows)
            .filter(|s| **s == BasisStatus::Basic)
            .count();
        if basic >= m {
            return;
        }

        let mut structural = vec![vec![0.0; m]; problem.num_columns()];
        for (i, row) in problem.rows().iter().enumerate() {
            for &(col, coef) in &row.entries {
                structural[col][i] += coef;
            }
        }
        let slack = |i: usize| {
            let mut unit = vec![0.0; m];
            unit[i] = 1.0;
            unit
        };

        let mut span = Echelon::default();
        for (j, status) in self.columns.iter().enumerate() {
            if *status == BasisStatus::Basic {
                span.insert(structural[j].clone());
            }
        }
        for (i, status) in self.rows.iter().enumerate() {
            if *status == BasisStatus::Basic {
                span.insert(slack(i));
            }
        }

        for i in 0..m {
            if basic == m {
                return;
            }
            if self.rows[i] != BasisStatus::Basic && span.insert(slack(i)) {
                self.rows[i] = BasisStatus::Basic;
                basic += 1;
            }
        }
        for j in 0..self.columns.len() {
            if basic == m {
                return;
            }
            if self.columns[j] != BasisStatus::Basic && span.insert(structural[j].clone()) {
                self.columns[j] = BasisStatus::Basic;
                basic += 1;
            }
        }
    }
}

/// Row echelon form of the vectors accepted so far
#[derive(Default)]
struct Echelon {
    /// Pivot position and reduced vector
    rows: Vec<(usize, Vec<f64>)>,
}

impl Echelon {
    /// Add `v` when it is independent of the accepted vectors
    fn insert(&mut self, mut v: Vec<f64>) -> bool {
        let scale = v.iter().fold(0.0_f64, |acc, x| acc.max(x.abs()));
        if scale == 0.0 {
            return false;
        }
        for (pivot, w) in &self.rows {
            let factor = v[*pivot] / w[*pivot];
            if factor != 0.0 {
                for (x, y) in v.iter_mut().zip(w) {
                    *x -= factor * y;
                }
            }
        }
        let mut pivot = 0;
        for (i, x) in v.iter().enumerate() {
            if x.abs() > v[pivot].abs() {
                pivot = i;
            }
        }
        if v[pivot].abs() <= INDEPENDENCE_TOLERANCE * scale {
            return false;
        }
        self.rows.push((pivot, v));
        true
    }
}

fn classify(value: f64, lower_bound: f64, upper_bound: f64) -> BasisStatus {
    let on = |bound: f64| (value - bound).abs() <= BOUND_TOLERANCE * bound.abs().max(1.0);

    if lower_bound == upper_bound {
        BasisStatus::FixedValue
    } else if lower_bound.is_finite() && on(lower_bound) {
        BasisStatus::AtLowerBound
    } else if upper_bound.is_finite() && on(upper_bound) {
        BasisStatus::AtUpperBound
    } else if lower_bound.is_infinite() && upper_bound.is_infinite() && on(0.0) {
        BasisStatus::Free
    } else {
        BasisStatus::Basic
    }
}

/// Raw outcome of one engine run
#[derive(Debug, Clone, PartialEq)]
pub struct EngineRun {
    pub status: ResultStatus,
    /// Empty unless `status` carries a solution
    pub column_values: Vec<f64>,
    pub column_duals: Option<Vec<f64>>,
    pub row_activities: Option<Vec<f64>>,
    pub row_duals: Option<Vec<f64>>,
    /// Simplex or barrier iterations; `None` when the engine does not count them
    pub iterations: Option<u64>,
    pub nodes: Option<u64>,
    pub best_bound: Option<f64>,
    pub basis: Option<Basis>,
}

impl EngineRun {
    pub fn with_status(status: ResultStatus) -> Self {
        Self {
            status,
            column_values: Vec::new(),
            column_duals: None,
            row_activities: None,
            row_duals: None,
            iterations: None,
            nodes: None,
            best_bound: None,
            basis: None,
        }
    }

    pub fn with_solution(status: ResultStatus, column_values: Vec<f64>) -> Self {
        Self {
            column_values,
            ..Self::with_status(status)
        }
    }
}

/// A solver run behind [`ProblemAdapter`](super::ProblemAdapter)
///
/// What each bundled engine fills in beyond the status and column values:
///
/// | Engine | Iterations | Nodes | Duals and activities | Basis |
/// |--------|------------|-------|----------------------|-------|
/// | microlp | no | no | no | rebuilt from the vertex |
/// | CBC | no | no | no | rebuilt from the vertex |
/// | HiGHS | no | no | yes | reported |
///
/// None of them exposes an iteration count through its Rust bindings, so
/// `iterations()` is `NotReported` for every non-empty model. Only a model
/// without columns, decided by the adapter itself, reports 0.
pub trait Engine {
    /// Get the name of this engine
    fn name(&self) -> &str;

    fn version(&self) -> String;

    fn capabilities(&self) -> EngineCapabilities;

    /// Solve `problem` once; engine failures are reported as [`ResultStatus::Abnormal`]
    fn run(
        &mut self,
        problem: &BackendProblem,
        settings: &EngineSettings,
        observer: &mut dyn SearchObserver,
    ) -> EngineRun;
}
