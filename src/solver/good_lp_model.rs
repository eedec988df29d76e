// Shared good_lp translation
// Both good_lp engines build the same model from the mirror and read values back the same way

use std::time::Duration;

use good_lp::{
    variable, Expression, ProblemVariables, ResolutionError, Solution, Solver, SolverModel,
    Variable,
};

use crate::domain::ResultStatus;

use super::engine::EngineRun;
use super::problem::BackendProblem;
use super::status::from_resolution_error;

/// A good_lp model ready to be solved, with one variable per mirror column
pub(crate) struct GoodLpModel<M> {
    pub model: M,
    pub variables: Vec<Variable>,
}

/// Build the good_lp model for `problem`
///
/// Rows without any entry are not passed to good_lp. When one of them rejects
/// an activity of 0 the problem is infeasible and `Err(Infeasible)` is returned.
pub(crate) fn build_model<S: Solver>(
    problem: &BackendProblem,
    solver: S,
) -> Result<GoodLpModel<S::Model>, ResultStatus> {
    if let Some(i) = problem
        .rows()
        .iter()
        .position(|row| row.entries.is_empty() && !row.accepts_zero())
    {
        log::debug!("Row {} has no entry and excludes 0", problem.rows()[i].name);
        return Err(ResultStatus::Infeasible);
    }

    let mut vars = ProblemVariables::new();
    let variables: Vec<Variable> = problem
        .columns()
        .iter()
        .map(|col| {
            let definition = variable().min(col.lower_bound).max(col.upper_bound);
            if col.integer {
                vars.add(definition.integer())
            } else {
                vars.add(definition)
            }
        })
        .collect();

    let mut objective: Expression = 0.into();
    for (col, &var) in problem.columns().iter().zip(&variables) {
        if col.objective != 0.0 {
            objective += col.objective * var;
        }
    }

    let unsolved = if problem.direction().is_maximize() {
        vars.maximise(objective)
    } else {
        vars.minimise(objective)
    };
    let mut model = unsolved.using(solver);

    for row in problem.rows().iter().filter(|row| !row.entries.is_empty()) {
        let mut lhs: Expression = 0.into();
        for &(col, coef) in &row.entries {
            lhs += coef * variables[col];
        }

        if row.lower_bound == row.upper_bound {
            model.add_constraint(lhs.eq(row.upper_bound));
            continue;
        }
        if row.lower_bound.is_finite() {
            model.add_constraint(lhs.clone().geq(row.lower_bound));
        }
        if row.upper_bound.is_finite() {
            model.add_constraint(lhs.leq(row.upper_bound));
        }
    }

    Ok(GoodLpModel { model, variables })
}

/// Solve a built model and read the column values back
pub(crate) fn solve_model<M>(built: GoodLpModel<M>, engine: &str) -> EngineRun
where
    M: SolverModel<Error = ResolutionError>,
{
    let GoodLpModel { model, variables } = built;
    match model.solve() {
        Ok(solution) => {
            let values = variables.iter().map(|&var| solution.value(var)).collect();
            EngineRun::with_solution(ResultStatus::Optimal, values)
        }
        Err(error) => {
            log::debug!("{} stopped: {}", engine, error);
            EngineRun::with_status(from_resolution_error(&error))
        }
    }
}

/// Reinterpret a run once the time limit has been used up
///
/// good_lp reports the incumbent of a timed-out search as optimal and a search
/// stopped without one as an error. Either way optimality is not proven.
pub(crate) fn settle_time_limit(
    mut run: EngineRun,
    limit: Option<Duration>,
    elapsed: Duration,
) -> EngineRun {
    match limit {
        Some(limit) if elapsed >= limit => {
            run.status = match run.status {
                ResultStatus::Optimal => ResultStatus::Feasible,
                ResultStatus::Abnormal => ResultStatus::TimeLimit,
                status => status,
            };
            run
        }
        _ => run,
    }
}
