// Domain layer: Entities, synchronization rules and the backend contract
pub mod domain;

// Application layer: The solver facade orchestrating mutations, extraction and solves
pub mod application;

// Infrastructure layer: External concerns (model files, environment)
pub mod infrastructure;

// Solver adapters: Backend mirror, engines and status translation
pub mod solver;

// Re-export commonly used types
pub use domain::{
    Backend, BasisStatus, ColumnSpec, Constraint, ConstraintId, EntityRegistry,
    IncrementalChange, Incrementality, LpAlgorithm, NoopObserver, Objective, OptimizationType,
    PresolveMode, ProblemKind, RecordingObserver, Result, ResultStatus, RowSpec,
    SearchCheckpoint, SearchObserver, SearchSnapshot, SolutionValues, SolverBackend,
    SolverError, SolverParameters, SolverStatistics, SyncStatus, SyncTracker, Variable,
    VariableId,
};

pub use application::Solver;

pub use infrastructure::{write_lp, write_model, write_mps, ModelFormat};

pub use solver::{
    BackendFactory, BackendProblem, Engine, EngineCapabilities, EngineRun, EngineSettings,
    MicroLpEngine, MipProgress, ProblemAdapter,
};

#[cfg(feature = "coin_cbc")]
pub use solver::CoinCbcEngine;

#[cfg(feature = "highs")]
pub use solver::HighsEngine;
