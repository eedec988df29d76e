use std::io::{self, Write};

use crate::domain::{EntityRegistry, ProblemKind};

use super::{constraint_name, objective_by_slot, variable_name};

/// Write `registry` in CPLEX LP format
pub fn write_lp<W: Write>(
    out: &mut W,
    name: &str,
    registry: &EntityRegistry,
    kind: ProblemKind,
) -> io::Result<()> {
    let names: Vec<String> = (0..registry.num_variables())
        .map(|slot| variable_name(registry, slot))
        .collect();
    let objective = registry.objective();

    writeln!(out, "\\ Model {}", name)?;
    if objective.is_maximize() {
        writeln!(out, "Maximize")?;
    } else {
        writeln!(out, "Minimize")?;
    }
    let terms: Vec<(usize, f64)> = objective_by_slot(registry)
        .into_iter()
        .enumerate()
        .filter(|(_, coef)| *coef != 0.0)
        .collect();
    write!(out, " obj:")?;
    if terms.is_empty() {
        writeln!(out, " {}", number(objective.offset()))?;
    } else {
        write_terms(out, &terms, &names)?;
        if objective.offset() != 0.0 {
            write!(out, " {}", signed(objective.offset()))?;
        }
        writeln!(out)?;
    }

    writeln!(out, "Subject To")?;
    for (slot, ct) in registry.constraints().iter().enumerate() {
        let terms: Vec<(usize, f64)> = ct.coefficients().map(|(v, c)| (v.slot(), c)).collect();
        let (lb, ub) = (ct.lower_bound(), ct.upper_bound());
        write!(out, " {}:", constraint_name(registry, slot))?;

        if lb == ub {
            write_terms(out, &terms, &names)?;
            writeln!(out, " = {}", number(ub))?;
        } else if lb.is_finite() && ub.is_finite() {
            write!(out, " {} <=", number(lb))?;
            write_terms(out, &terms, &names)?;
            writeln!(out, " <= {}", number(ub))?;
        } else if lb.is_finite() {
            write_terms(out, &terms, &names)?;
            writeln!(out, " >= {}", number(lb))?;
        } else if ub.is_finite() {
            write_terms(out, &terms, &names)?;
            writeln!(out, " <= {}", number(ub))?;
        } else {
            write_terms(out, &terms, &names)?;
            writeln!(out, " >= -inf")?;
        }
    }

    writeln!(out, "Bounds")?;
    for (slot, var) in registry.variables().iter().enumerate() {
        let (lb, ub) = (var.lower_bound(), var.upper_bound());
        let name = &names[slot];
        if lb == ub {
            writeln!(out, " {} = {}", name, number(lb))?;
        } else if lb == f64::NEG_INFINITY && ub == f64::INFINITY {
            writeln!(out, " {} free", name)?;
        } else if lb == 0.0 && ub == f64::INFINITY {
            // LP default bounds
            continue;
        } else {
            let lower = if lb == f64::NEG_INFINITY {
                "-inf".to_string()
            } else {
                number(lb)
            };
            let upper = if ub == f64::INFINITY {
                "+inf".to_string()
            } else {
                number(ub)
            };
            writeln!(out, " {} <= {} <= {}", lower, name, upper)?;
        }
    }

    if kind.is_mip() && registry.num_integer_variables() > 0 {
        writeln!(out, "Generals")?;
        for (slot, var) in registry.variables().iter().enumerate() {
            if var.is_integer() {
                writeln!(out, " {}", names[slot])?;
            }
        }
    }
    writeln!(out, "End")
}

/// Round-trip rendering; LP lines have no column limit, so nothing is cut
fn number(value: f64) -> String {
    format!("{}", value)
}

fn signed(value: f64) -> String {
    if value < 0.0 {
        format!("- {}", number(-value))
    } else {
        format!("+ {}", number(value))
    }
}

/// ` + 3 x - 2 y`; an empty expression is written as `0 <first variable>` or `0`
fn write_terms<W: Write>(out: &mut W, terms: &[(usize, f64)], names: &[String]) -> io::Result<()> {
    if terms.is_empty() {
        return match names.first() {
            Some(first) => write!(out, " 0 {}", first),
            None => write!(out, " 0"),
        };
    }
    for (i, &(slot, coef)) in terms.iter().enumerate() {
        if i == 0 {
            if coef < 0.0 {
                write!(out, " -{} {}", number(-coef), names[slot])?;
            } else {
                write!(out, " {} {}", number(coef), names[slot])?;
            }
        } else {
            write!(out, " {} {}", signed(coef), names[slot])?;
        }
    }
    Ok(())
}
