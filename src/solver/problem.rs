// Backend-resident copy of the model
// Engines read this mirror at solve time; the adapter edits it in place between solves

use crate::domain::{ColumnSpec, OptimizationType, ProblemKind, RowSpec};

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnData {
    pub name: String,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub integer: bool,
    pub objective: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowData {
    pub name: String,
    pub lower_bound: f64,
    pub upper_bound: f64,
    /// `(column, coefficient)` pairs, one per column at most
    pub entries: Vec<(usize, f64)>,
}

impl RowData {
    /// Whether a row without any entry accepts an activity of 0
    pub fn accepts_zero(&self) -> bool {
        self.lower_bound <= 0.0 && 0.0 <= self.upper_bound
    }
}

#[derive(Debug, Clone)]
pub struct BackendProblem {
    kind: ProblemKind,
    direction: OptimizationType,
    objective_offset: f64,
    columns: Vec<ColumnData>,
    rows: Vec<RowData>,
}

impl BackendProblem {
    pub fn new(kind: ProblemKind) -> Self {
        Self {
            kind,
            direction: OptimizationType::Minimize,
            objective_offset: 0.0,
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    pub fn kind(&self) -> ProblemKind {
        self.kind
    }

    pub fn direction(&self) -> OptimizationType {
        self.direction
    }

    pub fn objective_offset(&self) -> f64 {
        self.objective_offset
    }

    pub fn columns(&self) -> &[ColumnData] {
        &self.columns
    }

    pub fn rows(&self) -> &[RowData] {
        &self.rows
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Drop every column and row; direction and offset go back to their defaults
    pub fn clear(&mut self) {
        self.columns.clear();
        self.rows.clear();
        self.direction = OptimizationType::Minimize;
        self.objective_offset = 0.0;
    }

    pub fn set_direction(&mut self, direction: OptimizationType) {
        self.direction = direction;
    }

    pub fn set_objective_offset(&mut self, offset: f64) {
        self.objective_offset = offset;
    }

    pub fn push_columns(&mut self, columns: &[ColumnSpec<'_>]) {
        // Integrality only reaches mixed-integer problems
        let keep_integer = self.kind.is_mip();
        self.columns.extend(columns.iter().map(|c| ColumnData {
            name: c.name.to_string(),
            lower_bound: c.lower_bound,
            upper_bound: c.upper_bound,
            integer: keep_integer && c.integer,
            objective: 0.0,
        }));
    }

    pub fn push_rows(&mut self, rows: &[RowSpec<'_>]) {
        self.rows.extend(rows.iter().map(|r| RowData {
            name: r.name.to_string(),
            lower_bound: r.lower_bound,
            upper_bound: r.upper_bound,
            entries: Vec::new(),
        }));
    }

    /// Add `(row, column, coefficient)` triplets; a repeated pair overwrites the earlier one
    pub fn load_matrix(&mut self, entries: &[(usize, usize, f64)]) {
        for &(row, column, coefficient) in entries {
            let row = &mut self.rows[row];
            match row.entries.iter_mut().find(|(c, _)| *c == column) {
                Some(entry) => entry.1 = coefficient,
                None => row.entries.push((column, coefficient)),
            }
        }
    }

    pub fn set_row(&mut self, row: usize, entries: &[(usize, f64)]) {
        self.rows[row].entries = entries.to_vec();
    }

    pub fn set_column_bounds(&mut self, column: usize, lower_bound: f64, upper_bound: f64) {
        let col = &mut self.columns[column];
        col.lower_bound = lower_bound;
        col.upper_bound = upper_bound;
    }

    pub fn set_column_integer(&mut self, column: usize, integer: bool) {
        if self.kind.is_mip() {
            self.columns[column].integer = integer;
        }
    }

    pub fn set_row_bounds(&mut self, row: usize, lower_bound: f64, upper_bound: f64) {
        let r = &mut self.rows[row];
        r.lower_bound = lower_bound;
        r.upper_bound = upper_bound;
    }

    pub fn set_objective_coefficient(&mut self, column: usize, coefficient: f64) {
        self.columns[column].objective = coefficient;
    }

    /// Objective offset plus the sum of `c_j * x_j`
    pub fn objective_value(&self, values: &[f64]) -> f64 {
        self.columns
            .iter()
            .zip(values)
            .fold(self.objective_offset, |acc, (col, &x)| acc + col.objective * x)
    }

    /// Activity `sum(a_ij * x_j)` of every row
    pub fn row_activities(&self, values: &[f64]) -> Vec<f64> {
        self.rows
            .iter()
            .map(|row| {
                row.entries
                    .iter()
                    .map(|&(col, coef)| coef * values.get(col).copied().unwrap_or(0.0))
                    .sum()
            })
            .collect()
    }

    pub fn num_integer_columns(&self) -> usize {
        self.columns.iter().filter(|c| c.integer).count()
    }

    /// Whether `values` satisfy every bound, row and integrality requirement
    ///
    /// Bounds are widened by `tolerance` scaled by `max(1, |bound|)`.
    pub fn is_feasible(&self, values: &[f64], tolerance: f64) -> bool {
        let within = |x: f64, lb: f64, ub: f64| {
            x >= lb - tolerance * lb.abs().max(1.0) && x <= ub + tolerance * ub.abs().max(1.0)
        };
        if values.len() != self.columns.len() || values.iter().any(|x| !x.is_finite()) {
            return false;
        }
        let columns_ok = self.columns.iter().zip(values).all(|(col, &x)| {
            within(x, col.lower_bound, col.upper_bound)
                && (!col.integer || (x - x.round()).abs() <= tolerance)
        });
        columns_ok
            && self
                .rows
                .iter()
                .zip(self.row_activities(values))
                .all(|(row, activity)| within(activity, row.lower_bound, row.upper_bound))
    }
}
