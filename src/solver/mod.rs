// Solver adapters module

pub mod adapter;
pub mod conditioning;
pub mod engine;
pub mod factory;
mod good_lp_model;
pub mod microlp_engine;
pub mod problem;
pub mod status;

#[cfg(feature = "coin_cbc")]
pub mod coin_cbc_engine;
#[cfg(feature = "highs")]
pub mod highs_engine;

pub use adapter::{MipProgress, ProblemAdapter};
pub use engine::{Basis, Engine, EngineCapabilities, EngineRun, EngineSettings};
pub use factory::BackendFactory;
pub use microlp_engine::MicroLpEngine;
pub use problem::{BackendProblem, ColumnData, RowData};

#[cfg(feature = "coin_cbc")]
pub use coin_cbc_engine::CoinCbcEngine;
#[cfg(feature = "highs")]
pub use highs_engine::HighsEngine;
