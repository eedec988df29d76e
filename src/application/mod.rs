// Application layer: the solver facade

pub mod solver;

pub use solver::Solver;
