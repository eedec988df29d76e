use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use super::value_objects::OptimizationType;

/// Handle to a variable owned by an [`EntityRegistry`](super::EntityRegistry)
///
/// Handles carry the registry generation they were issued in, so a handle
/// kept across [`EntityRegistry::clear`](super::EntityRegistry::clear) is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VariableId {
    pub(crate) slot: usize,
    pub(crate) generation: u32,
}

impl VariableId {
    /// Position of the variable in creation order
    pub fn slot(self) -> usize {
        self.slot
    }
}

impl fmt::Display for VariableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "variable #{}", self.slot)
    }
}

/// Handle to a constraint owned by an [`EntityRegistry`](super::EntityRegistry)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConstraintId {
    pub(crate) slot: usize,
    pub(crate) generation: u32,
}

impl ConstraintId {
    /// Position of the constraint in creation order
    pub fn slot(self) -> usize {
        self.slot
    }
}

impl fmt::Display for ConstraintId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "constraint #{}", self.slot)
    }
}

/// Decision variable in an optimization problem
#[derive(Debug, Clone)]
pub struct Variable {
    pub(crate) name: String,
    pub(crate) lower_bound: f64,
    pub(crate) upper_bound: f64,
    pub(crate) integer: bool,
    /// Backend column, assigned by the extraction pass
    pub(crate) index: Option<usize>,
    pub(crate) solution_value: Option<f64>,
    pub(crate) reduced_cost: Option<f64>,
}

impl Variable {
    pub(crate) fn new(name: String, lower_bound: f64, upper_bound: f64, integer: bool) -> Self {
        Self {
            name,
            lower_bound,
            upper_bound,
            integer,
            index: None,
            solution_value: None,
            reduced_cost: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn lower_bound(&self) -> f64 {
        self.lower_bound
    }

    pub fn upper_bound(&self) -> f64 {
        self.upper_bound
    }

    pub fn is_integer(&self) -> bool {
        self.integer
    }

    /// Backend column index, `None` until the variable has been extracted
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub(crate) fn clear_solution(&mut self) {
        self.solution_value = None;
        self.reduced_cost = None;
    }
}

/// Linear constraint `lower_bound <= sum(coef * var) <= upper_bound`
#[derive(Debug, Clone)]
pub struct Constraint {
    pub(crate) name: String,
    pub(crate) lower_bound: f64,
    pub(crate) upper_bound: f64,
    pub(crate) coefficients: BTreeMap<VariableId, f64>,
    /// Backend row, assigned by the extraction pass
    pub(crate) index: Option<usize>,
    pub(crate) activity: Option<f64>,
    pub(crate) dual_value: Option<f64>,
}

impl Constraint {
    pub(crate) fn new(name: String, lower_bound: f64, upper_bound: f64) -> Self {
        Self {
            name,
            lower_bound,
            upper_bound,
            coefficients: BTreeMap::new(),
            index: None,
            activity: None,
            dual_value: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn lower_bound(&self) -> f64 {
        self.lower_bound
    }

    pub fn upper_bound(&self) -> f64 {
        self.upper_bound
    }

    /// Coefficient of `variable`, 0 when the variable does not appear
    pub fn coefficient(&self, variable: VariableId) -> f64 {
        self.coefficients.get(&variable).copied().unwrap_or(0.0)
    }

    pub fn coefficients(&self) -> impl Iterator<Item = (VariableId, f64)> + '_ {
        self.coefficients.iter().map(|(&var, &coef)| (var, coef))
    }

    pub fn num_terms(&self) -> usize {
        self.coefficients.len()
    }

    /// Backend row index, `None` until the constraint has been extracted
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub(crate) fn clear_solution(&mut self) {
        self.activity = None;
        self.dual_value = None;
    }
}

/// Linear objective with a constant offset
#[derive(Debug, Clone, Default)]
pub struct Objective {
    pub(crate) coefficients: BTreeMap<VariableId, f64>,
    pub(crate) offset: f64,
    pub(crate) optimization_type: OptimizationType,
}

impl Objective {
    pub fn coefficient(&self, variable: VariableId) -> f64 {
        self.coefficients.get(&variable).copied().unwrap_or(0.0)
    }

    pub fn coefficients(&self) -> impl Iterator<Item = (VariableId, f64)> + '_ {
        self.coefficients.iter().map(|(&var, &coef)| (var, coef))
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn optimization_type(&self) -> OptimizationType {
        self.optimization_type
    }

    pub fn is_maximize(&self) -> bool {
        self.optimization_type.is_maximize()
    }
}

/// Statistics about the last solve
#[derive(Debug, Clone, Default)]
pub struct SolverStatistics {
    pub build_time: Duration,
    pub solve_time: Duration,
    pub num_variables: usize,
    pub num_constraints: usize,
    pub num_integer_vars: usize,
}

impl fmt::Display for SolverStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Solver Statistics:")?;
        writeln!(f, "  Variables: {}", self.num_variables)?;
        writeln!(f, "  Integer Variables: {}", self.num_integer_vars)?;
        writeln!(f, "  Constraints: {}", self.num_constraints)?;
        writeln!(f, "  Build Time (secs): {:.3}", self.build_time.as_secs_f64())?;
        writeln!(f, "  Solve Time (secs): {:.3}", self.solve_time.as_secs_f64())
    }
}
