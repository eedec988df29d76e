// Infrastructure layer: model files and environment configuration

pub mod config;
pub mod export;

pub use export::{write_lp, write_model, write_mps, ModelFormat};
