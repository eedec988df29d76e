use std::fs;

use lpsync::{OptimizationType, ProblemKind, Solver, SolverBackend, SolverParameters};

fn small_model() -> Solver {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut solver = Solver::new("export", SolverBackend::MicroLp, ProblemKind::MixedInteger)
        .unwrap();
    let x = solver.add_variable(0.0, 10.0, false, "x");
    let n = solver.add_variable(0.0, 3.0, true, "n");
    let c = solver.add_constraint(f64::NEG_INFINITY, 7.0, "cap");
    solver.set_coefficient(c, x, 1.0).unwrap();
    solver.set_coefficient(c, n, 2.0).unwrap();
    solver.set_objective_coefficient(x, 1.0).unwrap();
    solver.set_objective_coefficient(n, 4.0).unwrap();
    solver.set_optimization_direction(OptimizationType::Maximize);
    solver
}

#[test]
fn lp_suffix_writes_lp_format() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.lp");
    small_model().write_model(&path).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("\\ Model export\nMaximize\n"));
    assert!(text.contains(" obj: 1 x + 4 n\n"));
    assert!(text.contains(" cap: 1 x + 2 n <= 7\n"));
    assert!(text.contains("Generals\n n\n"));
    assert!(text.ends_with("End\n"));
}

#[test]
fn other_suffixes_write_mps() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.mps");
    small_model().write_model(&path).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("NAME          export\n"));
    assert!(text.contains("'INTORG'"));
    assert!(text.ends_with("ENDATA\n"));
}

#[test]
fn solve_dumps_the_model_when_asked() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dump.lp");
    let mut solver = small_model();
    solver.set_parameters(SolverParameters::new().with_write_model(&path));

    solver.solve().unwrap();
    assert!((solver.objective_value().unwrap() - 13.0).abs() < 1e-6);
    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("Subject To\n"));
}

#[test]
fn unwritable_path_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("model.lp");
    assert!(matches!(
        small_model().write_model(&path),
        Err(lpsync::SolverError::Io(_))
    ));
}
