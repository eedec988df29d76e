// Basis condition number
// kappa(B) = ||B||_1 * ||B^-1||_1, with B^-1 obtained from a dense LU factorization

use crate::domain::{BasisStatus, Result, SolverError};

use super::engine::Basis;
use super::problem::BackendProblem;

/// Pivots below this magnitude make the basis singular
const SINGULAR_PIVOT: f64 = 1e-12;

/// Compute the 1-norm condition number of the basis matrix
///
/// Columns of B are the basic structural columns of A and a unit column for
/// every basic row. A singular basis yields `f64::INFINITY` and a warning.
pub fn basis_condition_number(problem: &BackendProblem, basis: &Basis) -> Result<f64> {
    let m = problem.num_rows();
    let basic_columns: Vec<usize> = basis
        .columns
        .iter()
        .enumerate()
        .filter(|(_, s)| **s == BasisStatus::Basic)
        .map(|(j, _)| j)
        .collect();
    let basic_rows: Vec<usize> = basis
        .rows
        .iter()
        .enumerate()
        .filter(|(_, s)| **s == BasisStatus::Basic)
        .map(|(i, _)| i)
        .collect();

    if basic_columns.len() + basic_rows.len() != m {
        return Err(SolverError::BackendFailure(format!(
            "basis has {} basic entries, expected {}",
            basic_columns.len() + basic_rows.len(),
            m
        )));
    }
    if m == 0 {
        return Ok(1.0);
    }

    // Dense B, row-major
    let mut b = vec![0.0; m * m];
    for (i, row) in problem.rows().iter().enumerate() {
        for &(col, coef) in &row.entries {
            if let Some(k) = basic_columns.iter().position(|&j| j == col) {
                b[i * m + k] = coef;
            }
        }
    }
    for (k, &i) in basic_rows.iter().enumerate() {
        b[i * m + basic_columns.len() + k] = 1.0;
    }

    let norm = one_norm(&b, m);
    match inverse(b, m) {
        Some(inv) => Ok(norm * one_norm(&inv, m)),
        None => {
            log::warn!("Basis matrix is singular or ill-conditioned, condition number is infinite");
            Ok(f64::INFINITY)
        }
    }
}

/// Maximum absolute column sum
fn one_norm(a: &[f64], n: usize) -> f64 {
    (0..n)
        .map(|j| (0..n).map(|i| a[i * n + j].abs()).sum::<f64>())
        .fold(0.0, f64::max)
}

/// Invert `a` through LU with partial pivoting; `None` when a pivot vanishes
fn inverse(mut a: Vec<f64>, n: usize) -> Option<Vec<f64>> {
    let scale = a.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
    if scale == 0.0 {
        return None;
    }
    let mut perm: Vec<usize> = (0..n).collect();

    for k in 0..n {
        let pivot_row = (k..n).max_by(|&r, &s| {
            a[r * n + k]
                .abs()
                .partial_cmp(&a[s * n + k].abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        })?;
        if a[pivot_row * n + k].abs() <= SINGULAR_PIVOT * scale {
            return None;
        }
        if pivot_row != k {
            for j in 0..n {
                a.swap(k * n + j, pivot_row * n + j);
            }
            perm.swap(k, pivot_row);
        }
        let pivot = a[k * n + k];
        for i in k + 1..n {
            let factor = a[i * n + k] / pivot;
            a[i * n + k] = factor;
            for j in k + 1..n {
                a[i * n + j] -= factor * a[k * n + j];
            }
        }
    }

    // Solve L U x = P e_j for every unit vector
    let mut inv = vec![0.0; n * n];
    let mut x = vec![0.0; n];
    for j in 0..n {
        for i in 0..n {
            x[i] = if perm[i] == j { 1.0 } else { 0.0 };
        }
        for i in 0..n {
            for k in 0..i {
                x[i] -= a[i * n + k] * x[k];
            }
        }
        for i in (0..n).rev() {
            for k in i + 1..n {
                x[i] -= a[i * n + k] * x[k];
            }
            x[i] /= a[i * n + i];
        }
        for i in 0..n {
            inv[i * n + j] = x[i];
        }
    }
    Some(inv)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ColumnSpec, ProblemKind, RowSpec};

    fn problem(matrix: &[(usize, usize, f64)], columns: usize, rows: usize) -> BackendProblem {
        let mut problem = BackendProblem::new(ProblemKind::Continuous);
        let names: Vec<String> = (0..columns.max(rows)).map(|i| format!("e{}", i)).collect();
        let cols: Vec<ColumnSpec<'_>> = (0..columns)
            .map(|j| ColumnSpec {
                name: &names[j],
                lower_bound: 0.0,
                upper_bound: f64::INFINITY,
                integer: false,
            })
            .collect();
        let rs: Vec<RowSpec<'_>> = (0..rows)
            .map(|i| RowSpec {
                name: &names[i],
                lower_bound: f64::NEG_INFINITY,
                upper_bound: 1.0,
            })
            .collect();
        problem.push_columns(&cols);
        problem.push_rows(&rs);
        problem.load_matrix(matrix);
        problem
    }

    #[test]
    fn diagonal_basis() {
        let p = problem(&[(0, 0, 2.0), (1, 1, 4.0)], 2, 2);
        let basis = Basis {
            columns: vec![BasisStatus::Basic, BasisStatus::Basic],
            rows: vec![BasisStatus::AtUpperBound, BasisStatus::AtUpperBound],
        };
        let kappa = basis_condition_number(&p, &basis).unwrap();
        assert!((kappa - 2.0).abs() < 1e-12);
    }

    #[test]
    fn slack_columns_enter_the_basis() {
        // B = [[1, 1], [1, 0]]: x basic and the slack of row 0 basic
        let p = problem(&[(0, 0, 1.0), (1, 0, 1.0)], 1, 2);
        let basis = Basis {
            columns: vec![BasisStatus::Basic],
            rows: vec![BasisStatus::Basic, BasisStatus::AtUpperBound],
        };
        // ||B||_1 = 2, B^-1 = [[0, 1], [1, -1]], ||B^-1||_1 = 2
        let kappa = basis_condition_number(&p, &basis).unwrap();
        assert!((kappa - 4.0).abs() < 1e-12);
    }

    #[test]
    fn singular_basis_is_infinite() {
        let p = problem(&[(0, 0, 1.0), (0, 1, 1.0), (1, 0, 2.0), (1, 1, 2.0)], 2, 2);
        let basis = Basis {
            columns: vec![BasisStatus::Basic, BasisStatus::Basic],
            rows: vec![BasisStatus::AtUpperBound, BasisStatus::AtUpperBound],
        };
        assert_eq!(basis_condition_number(&p, &basis).unwrap(), f64::INFINITY);
    }

    #[test]
    fn wrong_basic_count_fails() {
        let p = problem(&[(0, 0, 1.0)], 1, 1);
        let basis = Basis {
            columns: vec![BasisStatus::Basic],
            rows: vec![BasisStatus::Basic],
        };
        assert!(matches!(
            basis_condition_number(&p, &basis),
            Err(SolverError::BackendFailure(_))
        ));
    }
}
