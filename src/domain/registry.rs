use std::ops::Range;

use super::backend::{Result, SolverError};
use super::models::{Constraint, ConstraintId, Objective, Variable, VariableId};

/// Owner of every variable and constraint of a model, and of its objective
///
/// Backend indices are not handed out on creation: the extraction pass calls
/// [`assign_variable_indices`](Self::assign_variable_indices) and
/// [`assign_constraint_indices`](Self::assign_constraint_indices) so that a
/// batch of new entities can be pushed to the backend at once.
#[derive(Debug, Clone, Default)]
pub struct EntityRegistry {
    generation: u32,
    variables: Vec<Variable>,
    constraints: Vec<Constraint>,
    objective: Objective,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_variable(
        &mut self,
        lower_bound: f64,
        upper_bound: f64,
        integer: bool,
        name: impl Into<String>,
    ) -> VariableId {
        let id = VariableId {
            slot: self.variables.len(),
            generation: self.generation,
        };
        self.variables
            .push(Variable::new(name.into(), lower_bound, upper_bound, integer));
        id
    }

    pub fn add_constraint(
        &mut self,
        lower_bound: f64,
        upper_bound: f64,
        name: impl Into<String>,
    ) -> ConstraintId {
        let id = ConstraintId {
            slot: self.constraints.len(),
            generation: self.generation,
        };
        self.constraints
            .push(Constraint::new(name.into(), lower_bound, upper_bound));
        id
    }

    pub fn variable(&self, id: VariableId) -> Result<&Variable> {
        self.check_variable(id)?;
        Ok(&self.variables[id.slot])
    }

    pub fn variable_mut(&mut self, id: VariableId) -> Result<&mut Variable> {
        self.check_variable(id)?;
        Ok(&mut self.variables[id.slot])
    }

    pub fn constraint(&self, id: ConstraintId) -> Result<&Constraint> {
        self.check_constraint(id)?;
        Ok(&self.constraints[id.slot])
    }

    pub fn constraint_mut(&mut self, id: ConstraintId) -> Result<&mut Constraint> {
        self.check_constraint(id)?;
        Ok(&mut self.constraints[id.slot])
    }

    /// Set the coefficient of `variable` in `constraint`, returning the previous one
    pub fn set_coefficient(
        &mut self,
        constraint: ConstraintId,
        variable: VariableId,
        value: f64,
    ) -> Result<f64> {
        self.check_variable(variable)?;
        let ct = self.constraint_mut(constraint)?;
        Ok(ct.coefficients.insert(variable, value).unwrap_or(0.0))
    }

    pub fn set_objective_coefficient(&mut self, variable: VariableId, value: f64) -> Result<()> {
        self.check_variable(variable)?;
        self.objective.coefficients.insert(variable, value);
        Ok(())
    }

    pub fn objective(&self) -> &Objective {
        &self.objective
    }

    pub fn objective_mut(&mut self) -> &mut Objective {
        &mut self.objective
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub(crate) fn variables_mut(&mut self) -> &mut [Variable] {
        &mut self.variables
    }

    pub(crate) fn constraints_mut(&mut self) -> &mut [Constraint] {
        &mut self.constraints
    }

    pub fn variable_ids(&self) -> impl Iterator<Item = VariableId> + '_ {
        (0..self.variables.len()).map(move |slot| VariableId {
            slot,
            generation: self.generation,
        })
    }

    pub fn constraint_ids(&self) -> impl Iterator<Item = ConstraintId> + '_ {
        (0..self.constraints.len()).map(move |slot| ConstraintId {
            slot,
            generation: self.generation,
        })
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    pub fn num_integer_variables(&self) -> usize {
        self.variables.iter().filter(|v| v.integer).count()
    }

    /// Whether `constraint` references a variable that has not been extracted yet
    pub fn contains_new_variables(&self, constraint: &Constraint) -> bool {
        constraint
            .coefficients
            .keys()
            .any(|var| self.variables[var.slot].index.is_none())
    }

    /// Backend `(column, coefficient)` pairs of a constraint, in variable order
    ///
    /// Variables that have not been extracted yet are skipped; callers extract
    /// new variables before rows that reference them.
    pub fn row_entries(&self, slot: usize) -> Vec<(usize, f64)> {
        self.constraints[slot]
            .coefficients
            .iter()
            .filter_map(|(var, &coef)| self.variables[var.slot].index.map(|col| (col, coef)))
            .collect()
    }

    /// Give backend indices to every variable from `from` onwards
    pub fn assign_variable_indices(&mut self, from: usize) -> Range<usize> {
        let range = from.min(self.variables.len())..self.variables.len();
        for slot in range.clone() {
            self.variables[slot].index = Some(slot);
        }
        range
    }

    /// Give backend indices to every constraint from `from` onwards
    pub fn assign_constraint_indices(&mut self, from: usize) -> Range<usize> {
        let range = from.min(self.constraints.len())..self.constraints.len();
        for slot in range.clone() {
            self.constraints[slot].index = Some(slot);
        }
        range
    }

    /// Forget every backend index, keeping the entities
    pub fn clear_indices(&mut self) {
        for var in &mut self.variables {
            var.index = None;
        }
        for ct in &mut self.constraints {
            ct.index = None;
        }
    }

    pub(crate) fn clear_solution(&mut self) {
        for var in &mut self.variables {
            var.clear_solution();
        }
        for ct in &mut self.constraints {
            ct.clear_solution();
        }
    }

    /// Drop every entity and the objective; handles issued before become invalid
    pub fn clear(&mut self) {
        self.variables.clear();
        self.constraints.clear();
        self.objective = Objective::default();
        self.generation = self.generation.wrapping_add(1);
    }

    fn check_variable(&self, id: VariableId) -> Result<()> {
        if id.generation != self.generation || id.slot >= self.variables.len() {
            return Err(SolverError::InvalidEntity(format!(
                "{} was issued before the last model reset",
                id
            )));
        }
        Ok(())
    }

    fn check_constraint(&self, id: ConstraintId) -> Result<()> {
        if id.generation != self.generation || id.slot >= self.constraints.len() {
            return Err(SolverError::InvalidEntity(format!(
                "{} was issued before the last model reset",
                id
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_are_assigned_lazily() {
        let mut registry = EntityRegistry::new();
        let x = registry.add_variable(0.0, 10.0, false, "x");
        let c = registry.add_constraint(f64::NEG_INFINITY, 5.0, "c");
        assert_eq!(registry.variable(x).unwrap().index(), None);
        assert_eq!(registry.constraint(c).unwrap().index(), None);

        assert_eq!(registry.assign_variable_indices(0), 0..1);
        assert_eq!(registry.assign_constraint_indices(0), 0..1);
        assert_eq!(registry.variable(x).unwrap().index(), Some(0));
        assert_eq!(registry.constraint(c).unwrap().index(), Some(0));

        let y = registry.add_variable(0.0, 1.0, true, "y");
        assert_eq!(registry.assign_variable_indices(1), 1..2);
        assert_eq!(registry.variable(y).unwrap().index(), Some(1));
        assert!(registry.assign_variable_indices(2).is_empty());
    }

    #[test]
    fn set_coefficient_overwrites_and_returns_previous() {
        let mut registry = EntityRegistry::new();
        let x = registry.add_variable(0.0, 1.0, false, "x");
        let c = registry.add_constraint(0.0, 1.0, "c");
        assert_eq!(registry.set_coefficient(c, x, 2.0).unwrap(), 0.0);
        assert_eq!(registry.set_coefficient(c, x, 3.0).unwrap(), 2.0);
        assert_eq!(registry.constraint(c).unwrap().num_terms(), 1);
        assert_eq!(registry.constraint(c).unwrap().coefficient(x), 3.0);
    }

    #[test]
    fn contains_new_variables_tracks_extraction() {
        let mut registry = EntityRegistry::new();
        let x = registry.add_variable(0.0, 1.0, false, "x");
        let c = registry.add_constraint(0.0, 1.0, "c");
        registry.set_coefficient(c, x, 1.0).unwrap();
        assert!(registry.contains_new_variables(registry.constraint(c).unwrap()));
        registry.assign_variable_indices(0);
        assert!(!registry.contains_new_variables(registry.constraint(c).unwrap()));
        assert_eq!(registry.row_entries(0), vec![(0, 1.0)]);
    }

    #[test]
    fn handles_are_rejected_after_clear() {
        let mut registry = EntityRegistry::new();
        let x = registry.add_variable(0.0, 1.0, false, "x");
        let c = registry.add_constraint(0.0, 1.0, "c");
        registry.clear();
        let y = registry.add_variable(0.0, 1.0, false, "y");

        assert!(matches!(
            registry.variable(x),
            Err(SolverError::InvalidEntity(_))
        ));
        assert!(matches!(
            registry.constraint(c),
            Err(SolverError::InvalidEntity(_))
        ));
        // Same slot as `x`, new generation
        assert_eq!(y.slot(), x.slot());
        assert!(registry.variable(y).is_ok());
    }

    #[test]
    fn clear_indices_keeps_entities() {
        let mut registry = EntityRegistry::new();
        let x = registry.add_variable(0.0, 1.0, false, "x");
        registry.assign_variable_indices(0);
        registry.clear_indices();
        assert_eq!(registry.variable(x).unwrap().index(), None);
        assert_eq!(registry.num_variables(), 1);
    }
}
