use std::collections::BTreeSet;
use std::fmt;

use super::backend::{Result, SolverError};

/// How far the backend copy of the model lags behind the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    /// Model and solution both reflect the registry
    SolutionSynchronized,
    /// The backend model is current, its solution is not
    ModelSynchronized,
    /// New entities or pending edits wait for the next extraction
    ModelModifiedNotExtracted,
    /// Extracted entities changed in ways the backend could not apply in place
    MustReload,
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncStatus::SolutionSynchronized => write!(f, "SolutionSynchronized"),
            SyncStatus::ModelSynchronized => write!(f, "ModelSynchronized"),
            SyncStatus::ModelModifiedNotExtracted => write!(f, "ModelModifiedNotExtracted"),
            SyncStatus::MustReload => write!(f, "MustReload"),
        }
    }
}

/// Bookkeeping for incremental extraction
///
/// Tracks where new entities start and the minimal set of extracted rows and
/// columns to re-push before the next solve.
#[derive(Debug, Clone)]
pub struct SyncTracker {
    status: SyncStatus,
    last_variable_index: usize,
    last_constraint_index: usize,
    dirty_rows: BTreeSet<usize>,
    dirty_columns: BTreeSet<usize>,
    objective_dirty: bool,
}

impl Default for SyncTracker {
    fn default() -> Self {
        Self {
            status: SyncStatus::ModelSynchronized,
            last_variable_index: 0,
            last_constraint_index: 0,
            dirty_rows: BTreeSet::new(),
            dirty_columns: BTreeSet::new(),
            objective_dirty: false,
        }
    }
}

impl SyncTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> SyncStatus {
        self.status
    }

    /// First variable slot not yet pushed to the backend
    pub fn last_variable_index(&self) -> usize {
        self.last_variable_index
    }

    /// First constraint slot not yet pushed to the backend
    pub fn last_constraint_index(&self) -> usize {
        self.last_constraint_index
    }

    pub fn is_objective_dirty(&self) -> bool {
        self.objective_dirty
    }

    /// The backend model is still current but its solution is not
    pub fn invalidate_solution(&mut self) {
        if self.status == SyncStatus::SolutionSynchronized {
            self.status = SyncStatus::ModelSynchronized;
        }
    }

    /// Record an edit that waits for the next extraction
    pub fn mark_pending(&mut self) {
        if self.status != SyncStatus::MustReload {
            self.status = SyncStatus::ModelModifiedNotExtracted;
        }
    }

    pub fn mark_row_dirty(&mut self, row: usize) {
        self.dirty_rows.insert(row);
        self.status = SyncStatus::MustReload;
    }

    pub fn mark_column_dirty(&mut self, column: usize) {
        self.dirty_columns.insert(column);
        self.status = SyncStatus::MustReload;
    }

    pub fn mark_objective_dirty(&mut self) {
        self.objective_dirty = true;
        self.mark_pending();
    }

    /// Whether the next solve has to run an extraction pass first
    pub fn needs_extraction(&self, num_variables: usize, num_constraints: usize) -> bool {
        matches!(
            self.status,
            SyncStatus::ModelModifiedNotExtracted | SyncStatus::MustReload
        ) || self.objective_dirty
            || num_variables > self.last_variable_index
            || num_constraints > self.last_constraint_index
    }

    pub fn has_dirty_rows(&self) -> bool {
        !self.dirty_rows.is_empty()
    }

    pub fn has_dirty_columns(&self) -> bool {
        !self.dirty_columns.is_empty()
    }

    pub fn take_dirty_rows(&mut self) -> BTreeSet<usize> {
        std::mem::take(&mut self.dirty_rows)
    }

    pub fn take_dirty_columns(&mut self) -> BTreeSet<usize> {
        std::mem::take(&mut self.dirty_columns)
    }

    /// Returns whether the objective was dirty, clearing the flag
    pub fn take_objective_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.objective_dirty, false)
    }

    /// Everything up to the given counts now lives in the backend
    pub fn model_extracted(&mut self, num_variables: usize, num_constraints: usize) {
        self.last_variable_index = num_variables;
        self.last_constraint_index = num_constraints;
        if self.dirty_rows.is_empty() && self.dirty_columns.is_empty() {
            self.status = SyncStatus::ModelSynchronized;
        }
    }

    pub fn solution_synchronized(&mut self) {
        self.status = SyncStatus::SolutionSynchronized;
    }

    pub fn check_solution_synchronized(&self) -> Result<()> {
        if self.status == SyncStatus::SolutionSynchronized {
            Ok(())
        } else {
            Err(SolverError::StaleSolution)
        }
    }

    /// Forget everything that was extracted; the next solve reloads the whole model
    pub fn reset(&mut self) {
        self.status = SyncStatus::MustReload;
        self.last_variable_index = 0;
        self.last_constraint_index = 0;
        self.dirty_rows.clear();
        self.dirty_columns.clear();
        self.objective_dirty = true;
    }
}
