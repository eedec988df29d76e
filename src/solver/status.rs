// Result/status translation
// Every engine code ends up as a ResultStatus; anything that does not map
// unambiguously becomes Abnormal

use good_lp::ResolutionError;

#[cfg(feature = "highs")]
use crate::domain::BasisStatus;
use crate::domain::ResultStatus;

/// Translate a `good_lp` resolution error
pub fn from_resolution_error(error: &ResolutionError) -> ResultStatus {
    match error {
        ResolutionError::Infeasible => ResultStatus::Infeasible,
        ResolutionError::Unbounded => ResultStatus::Unbounded,
        _ => ResultStatus::Abnormal,
    }
}

/// Translate a HiGHS model status
///
/// `UnboundedOrInfeasible` stays [`ResultStatus::Abnormal`]: HiGHS has not
/// decided between the two and neither is reported on its behalf.
#[cfg(feature = "highs")]
pub fn from_highs(status: highs::HighsModelStatus) -> ResultStatus {
    use highs::HighsModelStatus;

    match status {
        HighsModelStatus::Optimal | HighsModelStatus::ModelEmpty => ResultStatus::Optimal,
        HighsModelStatus::Infeasible => ResultStatus::Infeasible,
        HighsModelStatus::Unbounded => ResultStatus::Unbounded,
        HighsModelStatus::UnboundedOrInfeasible => ResultStatus::Abnormal,
        HighsModelStatus::ReachedTimeLimit => ResultStatus::TimeLimit,
        HighsModelStatus::ObjectiveBound | HighsModelStatus::ObjectiveTarget => {
            ResultStatus::Feasible
        }
        _ => ResultStatus::Abnormal,
    }
}

/// Translate a HiGHS basis status for an entity with bounds `[lower, upper]`
///
/// HiGHS has no fixed class; a nonbasic entity with equal bounds is reported
/// as [`BasisStatus::FixedValue`]. `Zero` marks a nonbasic free entity.
#[cfg(feature = "highs")]
pub fn from_highs_basis(status: highs::BasisStatus, lower: f64, upper: f64) -> BasisStatus {
    match status {
        highs::BasisStatus::Basic => BasisStatus::Basic,
        highs::BasisStatus::Zero => BasisStatus::Free,
        _ if lower == upper => BasisStatus::FixedValue,
        highs::BasisStatus::Lower => BasisStatus::AtLowerBound,
        highs::BasisStatus::Upper => BasisStatus::AtUpperBound,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolution_errors() {
        assert_eq!(
            from_resolution_error(&ResolutionError::Infeasible),
            ResultStatus::Infeasible
        );
        assert_eq!(
            from_resolution_error(&ResolutionError::Unbounded),
            ResultStatus::Unbounded
        );
        assert_eq!(
            from_resolution_error(&ResolutionError::Other("Numerical error")),
            ResultStatus::Abnormal
        );
    }

    #[cfg(feature = "highs")]
    #[test]
    fn highs_ambiguity_is_preserved() {
        use highs::HighsModelStatus;

        assert_eq!(
            from_highs(HighsModelStatus::UnboundedOrInfeasible),
            ResultStatus::Abnormal
        );
        assert_eq!(from_highs(HighsModelStatus::ReachedTimeLimit), ResultStatus::TimeLimit);
        assert_eq!(from_highs(HighsModelStatus::ModelEmpty), ResultStatus::Optimal);
        assert_eq!(from_highs(HighsModelStatus::SolveError), ResultStatus::Abnormal);
    }

    #[cfg(feature = "highs")]
    #[test]
    fn highs_basis_classes() {
        use highs::BasisStatus as Highs;

        assert_eq!(from_highs_basis(Highs::Basic, 0.0, 1.0), BasisStatus::Basic);
        assert_eq!(from_highs_basis(Highs::Lower, 0.0, 1.0), BasisStatus::AtLowerBound);
        assert_eq!(from_highs_basis(Highs::Upper, 0.0, 1.0), BasisStatus::AtUpperBound);
        assert_eq!(from_highs_basis(Highs::Lower, 2.0, 2.0), BasisStatus::FixedValue);
        assert_eq!(from_highs_basis(Highs::Upper, 2.0, 2.0), BasisStatus::FixedValue);
        assert_eq!(
            from_highs_basis(Highs::Zero, f64::NEG_INFINITY, f64::INFINITY),
            BasisStatus::Free
        );
    }
}
