use crate::domain::{Backend, ProblemKind, Result, SolverBackend};
#[cfg(any(not(feature = "coin_cbc"), not(feature = "highs")))]
use crate::domain::SolverError;
use crate::solver::{MicroLpEngine, ProblemAdapter};

#[cfg(feature = "coin_cbc")]
use crate::solver::CoinCbcEngine;
#[cfg(feature = "highs")]
use crate::solver::HighsEngine;

/// Factory for creating backends based on configuration
pub struct BackendFactory;

impl BackendFactory {
    /// Create a backend for problems of `kind`
    ///
    /// Fails with [`BackendFailure`](crate::SolverError::BackendFailure) when the requested engine was
    /// not compiled in.
    pub fn create(backend: SolverBackend, kind: ProblemKind) -> Result<Box<dyn Backend>> {
        match backend {
            SolverBackend::Auto => Self::default_backend(kind),
            SolverBackend::MicroLp => Ok(Box::new(ProblemAdapter::new(MicroLpEngine::new(), kind)?)),
            SolverBackend::CoinCbc => Self::coin_cbc(kind),
            SolverBackend::Highs => Self::highs(kind),
        }
    }

    /// Get the default backend: HiGHS when available, microlp otherwise
    pub fn default_backend(kind: ProblemKind) -> Result<Box<dyn Backend>> {
        if cfg!(feature = "highs") {
            Self::highs(kind)
        } else {
            Self::create(SolverBackend::MicroLp, kind)
        }
    }

    #[cfg(feature = "coin_cbc")]
    fn coin_cbc(kind: ProblemKind) -> Result<Box<dyn Backend>> {
        Ok(Box::new(ProblemAdapter::new(CoinCbcEngine::new(), kind)?))
    }

    #[cfg(not(feature = "coin_cbc"))]
    fn coin_cbc(_kind: ProblemKind) -> Result<Box<dyn Backend>> {
        Err(not_compiled(SolverBackend::CoinCbc, "coin_cbc"))
    }

    #[cfg(feature = "highs")]
    fn highs(kind: ProblemKind) -> Result<Box<dyn Backend>> {
        Ok(Box::new(ProblemAdapter::new(HighsEngine::new(), kind)?))
    }

    #[cfg(not(feature = "highs"))]
    fn highs(_kind: ProblemKind) -> Result<Box<dyn Backend>> {
        Err(not_compiled(SolverBackend::Highs, "highs"))
    }
}

#[cfg(any(not(feature = "coin_cbc"), not(feature = "highs")))]
fn not_compiled(backend: SolverBackend, feature: &str) -> SolverError {
    SolverError::BackendFailure(format!(
        "{} is not available, build with the `{}` feature",
        backend, feature
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn microlp_is_always_available() {
        let backend = BackendFactory::create(SolverBackend::MicroLp, ProblemKind::MixedInteger)
            .unwrap();
        assert_eq!(backend.name(), "microlp");
        assert_eq!(backend.problem_kind(), ProblemKind::MixedInteger);
    }

    #[test]
    fn auto_picks_a_compiled_engine() {
        let backend = BackendFactory::create(SolverBackend::Auto, ProblemKind::Continuous).unwrap();
        let expected = if cfg!(feature = "highs") { "HiGHS" } else { "microlp" };
        assert_eq!(backend.name(), expected);
    }

    #[cfg(not(feature = "highs"))]
    #[test]
    fn missing_feature_is_a_backend_failure() {
        assert!(matches!(
            BackendFactory::create(SolverBackend::Highs, ProblemKind::Continuous),
            Err(SolverError::BackendFailure(_))
        ));
    }
}
