use std::path::PathBuf;
use std::time::Duration;

use super::backend::{Result, SolverError};
use super::value_objects::{Incrementality, LpAlgorithm, PresolveMode};

/// Parameters applied to the backend before every solve
///
/// `None` leaves the engine default in place. Engines that do not offer a
/// requested setting refuse it with [`SolverError::UnsupportedParameter`],
/// except for the time limit, which is honored on a best-effort basis.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SolverParameters {
    /// Relative optimality gap, integer problems only
    pub relative_mip_gap: Option<f64>,
    /// Primal feasibility tolerance
    pub primal_tolerance: Option<f64>,
    /// Dual feasibility tolerance
    pub dual_tolerance: Option<f64>,
    pub presolve: Option<PresolveMode>,
    pub lp_algorithm: Option<LpAlgorithm>,
    pub incrementality: Incrementality,
    pub time_limit: Option<Duration>,
    /// Let the engine write its own log to the terminal
    pub verbose: bool,
    /// Export the extracted model to this file before every solve
    pub write_model: Option<PathBuf>,
}

impl SolverParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_relative_mip_gap(mut self, gap: f64) -> Self {
        self.relative_mip_gap = Some(gap);
        self
    }

    pub fn with_primal_tolerance(mut self, tolerance: f64) -> Self {
        self.primal_tolerance = Some(tolerance);
        self
    }

    pub fn with_dual_tolerance(mut self, tolerance: f64) -> Self {
        self.dual_tolerance = Some(tolerance);
        self
    }

    pub fn with_presolve(mut self, mode: PresolveMode) -> Self {
        self.presolve = Some(mode);
        self
    }

    pub fn with_lp_algorithm(mut self, algorithm: LpAlgorithm) -> Self {
        self.lp_algorithm = Some(algorithm);
        self
    }

    pub fn with_incrementality(mut self, incrementality: Incrementality) -> Self {
        self.incrementality = incrementality;
        self
    }

    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_write_model(mut self, path: impl Into<PathBuf>) -> Self {
        self.write_model = Some(path.into());
        self
    }

    /// Check values that no engine could accept
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        if let Some(gap) = self.relative_mip_gap {
            if !(gap >= 0.0) {
                errors.push(format!("relative MIP gap must be >= 0, got {}", gap));
            }
        }

        for (name, tolerance) in [
            ("primal tolerance", self.primal_tolerance),
            ("dual tolerance", self.dual_tolerance),
        ] {
            if let Some(value) = tolerance {
                if !(value > 0.0 && value.is_finite()) {
                    errors.push(format!("{} must be positive and finite, got {}", name, value));
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(SolverError::InvalidParameter(errors.join("; ")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_parameters_are_valid() {
        assert!(SolverParameters::default().validate().is_ok());
    }

    #[test]
    fn rejects_negative_gap_and_zero_tolerance() {
        let params = SolverParameters::new()
            .with_relative_mip_gap(-0.1)
            .with_dual_tolerance(0.0);
        match params.validate() {
            Err(SolverError::InvalidParameter(msg)) => {
                assert!(msg.contains("relative MIP gap"));
                assert!(msg.contains("dual tolerance"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn rejects_nan_gap() {
        let params = SolverParameters::new().with_relative_mip_gap(f64::NAN);
        assert!(params.validate().is_err());
    }
}
