// Model export
// Serializes the registry to CPLEX LP or fixed MPS; the file suffix picks the format

mod lp;
mod mps;

use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::domain::{EntityRegistry, ProblemKind, Result};

pub use lp::write_lp;
pub use mps::write_mps;

/// Text formats a model can be written in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFormat {
    /// CPLEX LP
    Lp,
    /// Fixed-column MPS
    Mps,
}

impl ModelFormat {
    /// `.lp` selects LP, any other suffix MPS
    pub fn from_path(path: &Path) -> Self {
        match path.extension() {
            Some(ext) if ext.eq_ignore_ascii_case("lp") => ModelFormat::Lp,
            _ => ModelFormat::Mps,
        }
    }
}

impl fmt::Display for ModelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelFormat::Lp => write!(f, "LP"),
            ModelFormat::Mps => write!(f, "MPS"),
        }
    }
}

/// Write the model held by `registry` to `path`
pub fn write_model(
    path: &Path,
    name: &str,
    registry: &EntityRegistry,
    kind: ProblemKind,
) -> Result<()> {
    let format = ModelFormat::from_path(path);
    let mut out = BufWriter::new(File::create(path)?);
    match format {
        ModelFormat::Lp => write_lp(&mut out, name, registry, kind)?,
        ModelFormat::Mps => write_mps(&mut out, name, registry, kind)?,
    }
    out.flush()?;
    log::debug!("Wrote {} model to {}", format, path.display());
    Ok(())
}

/// Name of the variable in `slot`, `x_{slot + 1}` when it has none
pub(crate) fn variable_name(registry: &EntityRegistry, slot: usize) -> String {
    match registry.variables()[slot].name() {
        "" => format!("x_{}", slot + 1),
        name => name.replace(char::is_whitespace, "_"),
    }
}

/// Name of the constraint in `slot`, `ct_{slot}` when it has none
pub(crate) fn constraint_name(registry: &EntityRegistry, slot: usize) -> String {
    match registry.constraints()[slot].name() {
        "" => format!("ct_{}", slot),
        name => name.replace(char::is_whitespace, "_"),
    }
}

/// MPS field rendering: shortest plain text, switching to exponent notation past 12 characters
pub(crate) fn format_number(value: f64) -> String {
    let plain = format!("{}", value);
    if plain.len() <= 12 {
        return plain;
    }
    let shortest = format!("{:e}", value);
    if shortest.len() <= 12 {
        return shortest;
    }
    for precision in (0..=11).rev() {
        let exp = format!("{:.*e}", precision, value);
        if exp.len() <= 12 {
            return exp;
        }
    }
    shortest
}

/// Objective coefficients indexed by variable slot
pub(crate) fn objective_by_slot(registry: &EntityRegistry) -> Vec<f64> {
    let mut costs = vec![0.0; registry.num_variables()];
    for (var, coef) in registry.objective().coefficients() {
        costs[var.slot()] = coef;
    }
    costs
}
