// Domain value objects shared by the registry, the adapters and the facade

use std::fmt;

/// Kind of problem a backend was built for
///
/// Fixed at construction time: integrality flags are only pushed to
/// mixed-integer backends, and several statistics are only defined for one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProblemKind {
    /// Linear program, all variables continuous
    Continuous,
    /// Mixed-integer program
    MixedInteger,
}

impl ProblemKind {
    pub fn is_mip(self) -> bool {
        self == ProblemKind::MixedInteger
    }

    pub fn is_continuous(self) -> bool {
        self == ProblemKind::Continuous
    }
}

impl fmt::Display for ProblemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProblemKind::Continuous => write!(f, "continuous"),
            ProblemKind::MixedInteger => write!(f, "mixed-integer"),
        }
    }
}

/// Direction of optimization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OptimizationType {
    /// Minimize the objective function
    #[default]
    Minimize,
    /// Maximize the objective function
    Maximize,
}

impl OptimizationType {
    pub fn is_maximize(self) -> bool {
        self == OptimizationType::Maximize
    }

    /// The bound a branch-and-bound search starts from before exploring any node
    pub fn worst_bound(self) -> f64 {
        match self {
            OptimizationType::Minimize => f64::NEG_INFINITY,
            OptimizationType::Maximize => f64::INFINITY,
        }
    }
}

/// Uniform result of a solve, independent of the engine that produced it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResultStatus {
    /// Found optimal solution
    Optimal,
    /// Found feasible solution (may not be optimal)
    Feasible,
    /// Problem has no feasible solution
    Infeasible,
    /// Objective can be improved infinitely
    Unbounded,
    /// The engine stopped abnormally, or its answer did not map to any other status
    Abnormal,
    /// Time limit reached before proving anything
    TimeLimit,
    /// No solve has been attempted since the last reset
    #[default]
    NotSolved,
}

impl ResultStatus {
    /// Whether primal values were read back for this status
    pub fn has_solution(self) -> bool {
        matches!(self, ResultStatus::Optimal | ResultStatus::Feasible)
    }
}

impl fmt::Display for ResultStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultStatus::Optimal => write!(f, "Optimal"),
            ResultStatus::Feasible => write!(f, "Feasible"),
            ResultStatus::Infeasible => write!(f, "Infeasible"),
            ResultStatus::Unbounded => write!(f, "Unbounded"),
            ResultStatus::Abnormal => write!(f, "Abnormal"),
            ResultStatus::TimeLimit => write!(f, "Time Limit Reached"),
            ResultStatus::NotSolved => write!(f, "Not Solved"),
        }
    }
}

/// Position of a column or row with respect to the simplex basis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BasisStatus {
    Basic,
    AtLowerBound,
    AtUpperBound,
    /// Nonbasic free variable
    Free,
    /// Nonbasic fixed variable
    FixedValue,
}

impl fmt::Display for BasisStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BasisStatus::Basic => write!(f, "Basic"),
            BasisStatus::AtLowerBound => write!(f, "At Lower Bound"),
            BasisStatus::AtUpperBound => write!(f, "At Upper Bound"),
            BasisStatus::Free => write!(f, "Free"),
            BasisStatus::FixedValue => write!(f, "Fixed"),
        }
    }
}

/// Algorithm used for continuous problems and MIP relaxations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LpAlgorithm {
    PrimalSimplex,
    DualSimplex,
    Barrier,
}

impl fmt::Display for LpAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LpAlgorithm::PrimalSimplex => write!(f, "primal simplex"),
            LpAlgorithm::DualSimplex => write!(f, "dual simplex"),
            LpAlgorithm::Barrier => write!(f, "barrier"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PresolveMode {
    Off,
    On,
}

impl fmt::Display for PresolveMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PresolveMode::Off => write!(f, "off"),
            PresolveMode::On => write!(f, "on"),
        }
    }
}

/// Whether the backend copy of the model survives between solves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Incrementality {
    /// Only push what changed since the last extraction
    #[default]
    On,
    /// Rebuild the backend copy from scratch before every solve
    Off,
}

/// Solver backend to use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverBackend {
    /// Automatically select best available solver
    Auto,
    /// microlp, pure Rust, always available
    MicroLp,
    /// COIN-OR CBC solver
    CoinCbc,
    /// HiGHS solver
    Highs,
}

impl fmt::Display for SolverBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverBackend::Auto => write!(f, "Auto"),
            SolverBackend::MicroLp => write!(f, "microlp"),
            SolverBackend::CoinCbc => write!(f, "COIN-OR CBC"),
            SolverBackend::Highs => write!(f, "HiGHS"),
        }
    }
}
