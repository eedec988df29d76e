use std::collections::HashSet;
use std::io::{self, Write};

use crate::domain::{EntityRegistry, ProblemKind};

use super::{constraint_name, format_number, objective_by_slot, variable_name};

const OBJECTIVE_ROW: &str = "obj";

/// Write `registry` in fixed-column MPS format
///
/// Names that do not fit the fixed layout (longer than 8 characters,
/// containing a space, duplicated, or clashing with the objective row) make
/// the whole row or column set fall back to `R0000001`/`C0000001` style names.
pub fn write_mps<W: Write>(
    out: &mut W,
    name: &str,
    registry: &EntityRegistry,
    kind: ProblemKind,
) -> io::Result<()> {
    let rows = fixed_names(
        (0..registry.num_constraints()).map(|slot| constraint_name(registry, slot)),
        'R',
    );
    let cols = fixed_names(
        (0..registry.num_variables()).map(|slot| variable_name(registry, slot)),
        'C',
    );
    let objective = registry.objective();
    let costs = objective_by_slot(registry);

    writeln!(out, "NAME          {}", name.replace(char::is_whitespace, "_"))?;
    if objective.is_maximize() {
        writeln!(out, "OBJSENSE")?;
        writeln!(out, "    MAX")?;
    }

    writeln!(out, "ROWS")?;
    line(out, "N", OBJECTIVE_ROW, "", "")?;
    for (slot, ct) in registry.constraints().iter().enumerate() {
        let (lb, ub) = (ct.lower_bound(), ct.upper_bound());
        let row_type = if lb == ub {
            "E"
        } else if lb.is_finite() {
            "G"
        } else if ub.is_finite() {
            "L"
        } else {
            "N"
        };
        line(out, row_type, &rows[slot], "", "")?;
    }

    // Column-wise view of the matrix
    let mut entries: Vec<Vec<(usize, f64)>> = vec![Vec::new(); registry.num_variables()];
    for (row, ct) in registry.constraints().iter().enumerate() {
        for (var, coef) in ct.coefficients() {
            entries[var.slot()].push((row, coef));
        }
    }

    writeln!(out, "COLUMNS")?;
    let integer = |slot: usize| kind.is_mip() && registry.variables()[slot].is_integer();
    let mut in_marker = false;
    for slot in 0..registry.num_variables() {
        if integer(slot) != in_marker {
            in_marker = !in_marker;
            let marker = if in_marker { "'INTORG'" } else { "'INTEND'" };
            writeln!(
                out,
                "    MARKER                 'MARKER'                 {}",
                marker
            )?;
        }
        let col = &cols[slot];
        let mut written = false;
        if costs[slot] != 0.0 {
            line(out, "", col, OBJECTIVE_ROW, &format_number(costs[slot]))?;
            written = true;
        }
        for &(row, coef) in &entries[slot] {
            line(out, "", col, &rows[row], &format_number(coef))?;
            written = true;
        }
        if !written {
            // Columns must be declared before BOUNDS can refer to them
            line(out, "", col, OBJECTIVE_ROW, "0")?;
        }
    }
    if in_marker {
        writeln!(
            out,
            "    MARKER                 'MARKER'                 'INTEND'"
        )?;
    }

    writeln!(out, "RHS")?;
    if objective.offset() != 0.0 {
        line(out, "", "RHS", OBJECTIVE_ROW, &format_number(-objective.offset()))?;
    }
    for (slot, ct) in registry.constraints().iter().enumerate() {
        let (lb, ub) = (ct.lower_bound(), ct.upper_bound());
        let rhs = if lb.is_finite() {
            lb
        } else if ub.is_finite() {
            ub
        } else {
            continue;
        };
        if rhs != 0.0 {
            line(out, "", "RHS", &rows[slot], &format_number(rhs))?;
        }
    }

    let ranged: Vec<usize> = registry
        .constraints()
        .iter()
        .enumerate()
        .filter(|(_, ct)| {
            ct.lower_bound().is_finite()
                && ct.upper_bound().is_finite()
                && ct.lower_bound() != ct.upper_bound()
        })
        .map(|(slot, _)| slot)
        .collect();
    if !ranged.is_empty() {
        writeln!(out, "RANGES")?;
        for slot in ranged {
            let ct = &registry.constraints()[slot];
            let range = ct.upper_bound() - ct.lower_bound();
            line(out, "", "RNG", &rows[slot], &format_number(range))?;
        }
    }

    let mut bounds = Vec::new();
    for (slot, var) in registry.variables().iter().enumerate() {
        let (lb, ub) = (var.lower_bound(), var.upper_bound());
        let col = cols[slot].as_str();
        if lb == ub {
            bounds.push(("FX", col, format_number(lb)));
        } else if lb == f64::NEG_INFINITY && ub == f64::INFINITY {
            bounds.push(("FR", col, String::new()));
        } else {
            if lb == f64::NEG_INFINITY {
                bounds.push(("MI", col, String::new()));
            } else if lb != 0.0 || ub < 0.0 {
                bounds.push(("LO", col, format_number(lb)));
            }
            if ub != f64::INFINITY {
                bounds.push(("UP", col, format_number(ub)));
            }
        }
    }
    if !bounds.is_empty() {
        writeln!(out, "BOUNDS")?;
        for (bound_type, col, value) in bounds {
            line(out, bound_type, "BND", col, &value)?;
        }
    }
    writeln!(out, "ENDATA")
}

/// One fixed-column record: fields start at columns 2, 5, 15 and 25
fn line<W: Write>(out: &mut W, field1: &str, field2: &str, field3: &str, field4: &str) -> io::Result<()> {
    let text = format!(" {:<2} {:<8}  {:<8}  {:<12}", field1, field2, field3, field4);
    writeln!(out, "{}", text.trim_end())
}

fn fixed_names(names: impl Iterator<Item = String>, prefix: char) -> Vec<String> {
    let names: Vec<String> = names.collect();
    let mut seen = HashSet::new();
    let fits = names.iter().all(|name| {
        name.len() <= 8
            && !name.contains(' ')
            && name != OBJECTIVE_ROW
            && seen.insert(name.as_str())
    });
    if fits {
        names
    } else {
        (1..=names.len())
            .map(|i| format!("{}{:07}", prefix, i))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::OptimizationType;

    fn render(registry: &EntityRegistry, kind: ProblemKind) -> String {
        let mut out = Vec::new();
        write_mps(&mut out, "test", registry, kind).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn fixed_layout() {
        let mut registry = EntityRegistry::new();
        let x = registry.add_variable(0.0, 10.0, false, "x");
        let y = registry.add_variable(-1.0, f64::INFINITY, true, "y");
        let c = registry.add_constraint(1.0, 4.0, "c");
        let d = registry.add_constraint(2.0, 2.0, "d");
        registry.set_coefficient(c, x, 1.0).unwrap();
        registry.set_coefficient(c, y, 2.0).unwrap();
        registry.set_coefficient(d, y, 1.0).unwrap();
        registry.set_objective_coefficient(x, 3.0).unwrap();
        registry.objective_mut().optimization_type = OptimizationType::Maximize;
        registry.objective_mut().offset = 5.0;

        let text = render(&registry, ProblemKind::MixedInteger);
        let expected = [
            "NAME          test",
            "OBJSENSE",
            "    MAX",
            "ROWS",
            " N  obj",
            " G  c",
            " E  d",
            "COLUMNS",
            "    x         obj       3",
            "    x         c         1",
            "    MARKER                 'MARKER'                 'INTORG'",
            "    y         c         2",
            "    y         d         1",
            "    MARKER                 'MARKER'                 'INTEND'",
            "RHS",
            "    RHS       obj       -5",
            "    RHS       c         1",
            "    RHS       d         2",
            "RANGES",
            "    RNG       c         3",
            "BOUNDS",
            " UP BND       x         10",
            " LO BND       y         -1",
            "ENDATA",
        ]
        .join("\n")
            + "\n";
        assert_eq!(text, expected);
    }

    #[test]
    fn long_names_fall_back_to_generic_ones() {
        let mut registry = EntityRegistry::new();
        let x = registry.add_variable(0.0, 1.0, false, "a_very_long_name");
        let c = registry.add_constraint(f64::NEG_INFINITY, 1.0, "obj");
        registry.set_coefficient(c, x, 1.0).unwrap();

        let text = render(&registry, ProblemKind::Continuous);
        assert!(text.contains(" L  R0000001\n"));
        assert!(text.contains("    C0000001  R0000001  1\n"));
        assert!(!text.contains("a_very_long_name"));
    }

    #[test]
    fn isolated_columns_are_declared() {
        let mut registry = EntityRegistry::new();
        registry.add_variable(f64::NEG_INFINITY, f64::INFINITY, false, "free");
        let text = render(&registry, ProblemKind::Continuous);
        assert!(text.contains("    free      obj       0\n"));
        assert!(text.contains(" FR BND       free\n"));
    }
}
