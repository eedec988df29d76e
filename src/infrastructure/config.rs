// Environment-driven configuration
// LPSYNC_TIME_LIMIT (seconds) and LPSYNC_WRITE_MODEL (path) seed the solver parameters

use std::path::PathBuf;
use std::time::Duration;

use crate::domain::{Result, SolverError, SolverParameters};

pub const TIME_LIMIT_VAR: &str = "LPSYNC_TIME_LIMIT";
pub const WRITE_MODEL_VAR: &str = "LPSYNC_WRITE_MODEL";

impl SolverParameters {
    /// Parameters seeded from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Parameters seeded from `lookup`, which maps a variable name to its value
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut parameters = SolverParameters::default();

        if let Some(raw) = lookup(TIME_LIMIT_VAR) {
            let seconds: f64 = raw.trim().parse().map_err(|_| {
                SolverError::InvalidParameter(format!(
                    "{} must be a number of seconds, got {:?}",
                    TIME_LIMIT_VAR, raw
                ))
            })?;
            let limit = Duration::try_from_secs_f64(seconds).map_err(|_| {
                SolverError::InvalidParameter(format!(
                    "{} must be a non-negative finite number, got {}",
                    TIME_LIMIT_VAR, seconds
                ))
            })?;
            parameters.time_limit = Some(limit);
        }

        if let Some(path) = lookup(WRITE_MODEL_VAR).filter(|p| !p.trim().is_empty()) {
            parameters.write_model = Some(PathBuf::from(path));
        }

        log::debug!("Parameters from environment: {:?}", parameters);
        Ok(parameters)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn reads_time_limit_and_dump_path() {
        let params = SolverParameters::from_lookup(lookup(&[
            (TIME_LIMIT_VAR, "2.5"),
            (WRITE_MODEL_VAR, "/tmp/model.lp"),
        ]))
        .unwrap();
        assert_eq!(params.time_limit, Some(Duration::from_millis(2500)));
        assert_eq!(params.write_model, Some(PathBuf::from("/tmp/model.lp")));
    }

    #[test]
    fn unset_variables_keep_defaults() {
        let params = SolverParameters::from_lookup(lookup(&[])).unwrap();
        assert_eq!(params, SolverParameters::default());
    }

    #[test]
    fn malformed_or_negative_time_limit_is_rejected() {
        for raw in ["soon", "-1", "inf"] {
            let result = SolverParameters::from_lookup(lookup(&[(TIME_LIMIT_VAR, raw)]));
            assert!(
                matches!(result, Err(SolverError::InvalidParameter(_))),
                "{raw} should be rejected"
            );
        }
    }
}
