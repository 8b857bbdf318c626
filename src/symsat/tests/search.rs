//! End-to-end search scenarios through the public API.

use symsat::{lbool, BasicSolver, Lit, SolverInterface, SymGenerator};

fn lit(s: &mut BasicSolver, l: i32) -> Lit {
    let v = s.var_of_int((l.abs() - 1) as u32);
    Lit::new(v, l > 0)
}

fn add_clause(s: &mut BasicSolver, c: &[i32]) -> bool {
    let mut lits: Vec<Lit> = c.iter().map(|&l| lit(s, l)).collect();
    s.add_clause_reuse(&mut lits)
}

fn cycle(s: &mut BasicSolver, c: &[i32]) -> Vec<Lit> {
    c.iter().map(|&l| lit(s, l)).collect()
}

/// Every original clause must contain a literal true in the model.
fn check_model(s: &mut BasicSolver, clauses: &[Vec<i32>]) {
    for c in clauses {
        let sat = c.iter().any(|&l| {
            let p = lit(s, l);
            s.value_lit(p) == lbool::TRUE
        });
        assert!(sat, "clause {:?} not satisfied by model", c);
    }
}

#[test]
fn test_trivial_unsat() {
    let mut s = BasicSolver::default();
    add_clause(&mut s, &[1]);
    let ok = add_clause(&mut s, &[-1]);
    assert!(!ok);
    assert!(!s.is_ok());
    assert_eq!(s.solve_limited(&[]), lbool::FALSE);
}

#[test]
fn test_simple_sat() {
    let clauses = vec![vec![1, 2]];
    let mut s = BasicSolver::default();
    for c in &clauses {
        add_clause(&mut s, c);
    }
    assert_eq!(s.solve_limited(&[]), lbool::TRUE);
    check_model(&mut s, &clauses);
}

#[test]
fn test_two_var_unsat() {
    // (a ∨ b) ∧ (¬a ∨ b) ∧ (a ∨ ¬b) ∧ (¬a ∨ ¬b)
    let mut s = BasicSolver::default();
    add_clause(&mut s, &[1, 2]);
    add_clause(&mut s, &[-1, 2]);
    add_clause(&mut s, &[1, -2]);
    add_clause(&mut s, &[-1, -2]);
    assert_eq!(s.solve_limited(&[]), lbool::FALSE);
    assert!(!s.is_ok());
}

/// Pigeonhole clauses over variables `x[p][h] = p*holes + h + 1`.
fn pigeonhole(pigeons: i32, holes: i32) -> Vec<Vec<i32>> {
    let var = |p: i32, h: i32| p * holes + h + 1;
    let mut clauses = vec![];
    for p in 0..pigeons {
        clauses.push((0..holes).map(|h| var(p, h)).collect());
    }
    for h in 0..holes {
        for p1 in 0..pigeons {
            for p2 in (p1 + 1)..pigeons {
                clauses.push(vec![-var(p1, h), -var(p2, h)]);
            }
        }
    }
    clauses
}

#[test]
fn test_pigeonhole_3_2() {
    let mut s = BasicSolver::default();
    for c in pigeonhole(3, 2) {
        add_clause(&mut s, &c);
    }
    assert_eq!(s.solve_limited(&[]), lbool::FALSE);
}

#[test]
fn test_pigeonhole_5_4_with_generators() {
    let pigeons = 5;
    let holes = 4;
    let var = |p: i32, h: i32| p * holes + h + 1;

    let mut s = BasicSolver::default();
    for c in pigeonhole(pigeons, holes) {
        add_clause(&mut s, &c);
    }

    // hole interchanges: swap columns h and h+1 for every pigeon
    for h in 0..holes - 1 {
        let mut cycles = vec![];
        for p in 0..pigeons {
            cycles.push(cycle(&mut s, &[var(p, h), var(p, h + 1)]));
            cycles.push(cycle(&mut s, &[-var(p, h), -var(p, h + 1)]));
        }
        let g = SymGenerator::from_cycles(s.num_vars(), &cycles);
        s.add_generator(g);
    }
    // pigeon interchanges: swap rows p and p+1 for every hole
    for p in 0..pigeons - 1 {
        let mut cycles = vec![];
        for h in 0..holes {
            cycles.push(cycle(&mut s, &[var(p, h), var(p + 1, h)]));
            cycles.push(cycle(&mut s, &[-var(p, h), -var(p + 1, h)]));
        }
        let g = SymGenerator::from_cycles(s.num_vars(), &cycles);
        s.add_generator(g);
    }
    assert_eq!(s.num_generators(), (holes - 1 + pigeons - 1) as usize);

    assert_eq!(s.solve_limited(&[]), lbool::FALSE);
}

#[test]
fn test_graph_coloring_triangle_with_rotation() {
    // 3-coloring of a triangle; x[v][c] = v*3 + c + 1
    let var = |v: i32, c: i32| v * 3 + c + 1;
    let edges = [(0, 1), (1, 2), (0, 2)];

    let mut clauses: Vec<Vec<i32>> = vec![];
    for v in 0..3 {
        clauses.push((0..3).map(|c| var(v, c)).collect());
    }
    for &(u, v) in edges.iter() {
        for c in 0..3 {
            clauses.push(vec![-var(u, c), -var(v, c)]);
        }
    }

    let mut s = BasicSolver::default();
    for c in &clauses {
        add_clause(&mut s, c);
    }

    // color rotation c -> c+1 (mod 3) on every vertex
    let mut cycles = vec![];
    for v in 0..3 {
        cycles.push(cycle(&mut s, &[var(v, 0), var(v, 1), var(v, 2)]));
        cycles.push(cycle(&mut s, &[-var(v, 0), -var(v, 1), -var(v, 2)]));
    }
    let g = SymGenerator::from_cycles(s.num_vars(), &cycles);
    s.add_generator(g);

    assert_eq!(s.solve_limited(&[]), lbool::TRUE);
    check_model(&mut s, &clauses);
}

/// Formula closed under `g = (1 3)(2 4)`, with variables 5 and 6 fixed:
/// `(¬1∨2∨5) (¬3∨4∨5) (¬1∨2∨6) (¬1∨2∨¬6) (¬3∨4∨6) (¬3∨4∨¬6)`.
///
/// Solving under the assumptions `[1, ¬2]` learns the binary clause
/// `(2 ∨ ¬1)`, whose image `(4 ∨ ¬3)` is nowhere in the formula; the
/// symmetry engine has to derive it.
fn symmetric_six_var_solver() -> BasicSolver {
    let mut s = BasicSolver::default();
    add_clause(&mut s, &[-1, 2, 5]);
    add_clause(&mut s, &[-3, 4, 5]);
    add_clause(&mut s, &[-1, 2, 6]);
    add_clause(&mut s, &[-1, 2, -6]);
    add_clause(&mut s, &[-3, 4, 6]);
    add_clause(&mut s, &[-3, 4, -6]);
    let cycles = vec![
        cycle(&mut s, &[1, 3]),
        cycle(&mut s, &[-1, -3]),
        cycle(&mut s, &[2, 4]),
        cycle(&mut s, &[-2, -4]),
    ];
    let g = SymGenerator::from_cycles(s.num_vars(), &cycles);
    s.add_generator(g);
    s
}

#[test]
fn test_selector_clause_fires() {
    let mut s = symmetric_six_var_solver();

    // learn (2 ∨ ¬1)
    let a1 = lit(&mut s, 1);
    let not2 = lit(&mut s, -2);
    assert_eq!(s.solve_limited(&[a1, not2]), lbool::FALSE);

    // assuming 1 makes the learnt clause the reason of 2; the generator
    // watch caches its image {4, ¬3} as a selector clause, and assuming
    // ¬4 fires it, propagating ¬3 through the materialized (¬3 ∨ 4)
    let not4 = lit(&mut s, -4);
    let l3 = lit(&mut s, 3);
    assert_eq!(s.solve_limited(&[a1, not4]), lbool::TRUE);
    assert!(s.stats().sym_sel_props >= 1);
    assert_eq!(s.value_lit(l3), lbool::FALSE);
}

#[test]
fn test_generator_watch_fires() {
    let mut s = symmetric_six_var_solver();

    // learn (2 ∨ ¬1)
    let a1 = lit(&mut s, 1);
    let not2 = lit(&mut s, -2);
    assert_eq!(s.solve_limited(&[a1, not2]), lbool::FALSE);

    // with ¬4 assumed first, the image of the learnt reason is already
    // unit when the generator watch examines it
    let not4 = lit(&mut s, -4);
    let l3 = lit(&mut s, 3);
    assert_eq!(s.solve_limited(&[not4, a1]), lbool::TRUE);
    assert!(s.stats().sym_gen_props >= 1);
    assert_eq!(s.value_lit(l3), lbool::FALSE);
}

#[test]
fn test_unit_images_propagated() {
    // (¬1 ∨ 2) ∧ (¬1 ∨ ¬2) and the symmetric copy on variables 3, 4.
    // Solving under the assumption 1 learns the unit ¬1; the registered
    // generator then asserts its image ¬3 at the top level too.
    let mut s = BasicSolver::default();
    add_clause(&mut s, &[-1, 2]);
    add_clause(&mut s, &[-1, -2]);
    add_clause(&mut s, &[-3, 4]);
    add_clause(&mut s, &[-3, -4]);
    let cycles = vec![
        cycle(&mut s, &[1, 3]),
        cycle(&mut s, &[-1, -3]),
        cycle(&mut s, &[2, 4]),
        cycle(&mut s, &[-2, -4]),
    ];
    let g = SymGenerator::from_cycles(s.num_vars(), &cycles);
    s.add_generator(g);

    let a = lit(&mut s, 1);
    assert_eq!(s.solve_limited(&[a]), lbool::FALSE);
    assert!(!s.unsat_core().is_empty());

    let not_3 = lit(&mut s, -3);
    assert!(
        s.proved_at_lvl_0().contains(&not_3),
        "image of the learnt unit should be asserted at level 0"
    );

    // without the failing assumption the formula is satisfiable
    let l1 = lit(&mut s, 1);
    assert_eq!(s.solve_limited(&[]), lbool::TRUE);
    assert_eq!(s.value_lit(l1), lbool::FALSE);
    assert_eq!(s.value_lit(not_3), lbool::FALSE);
}

#[test]
fn test_assumption_core() {
    let mut s = BasicSolver::default();
    add_clause(&mut s, &[1, 2]);
    let a1 = lit(&mut s, -1);
    let a2 = lit(&mut s, -2);
    assert_eq!(s.solve_limited(&[a1, a2]), lbool::FALSE);
    assert!(!s.unsat_core().is_empty());
    assert!(s.is_ok(), "assumption failure must not poison the solver");
    assert_eq!(s.solve_limited(&[]), lbool::TRUE);
}

#[test]
fn test_conflict_budget_undef() {
    let mut s = BasicSolver::default();
    for c in pigeonhole(4, 3) {
        add_clause(&mut s, &c);
    }
    s.set_conflict_budget(0);
    assert_eq!(s.solve_limited(&[]), lbool::UNDEF);
    // the solver is reusable after a budget interruption
    s.set_conflict_budget(-1);
    assert_eq!(s.solve_limited(&[]), lbool::FALSE);
}

#[test]
fn test_callback_stop_undef() {
    let mut s = BasicSolver::default();
    for c in pigeonhole(4, 3) {
        add_clause(&mut s, &c);
    }
    s.cb_mut().set_stop(|| true);
    assert_eq!(s.solve_limited(&[]), lbool::UNDEF);
}

#[test]
fn test_model_output_dimacs() {
    let mut s = BasicSolver::default();
    add_clause(&mut s, &[1, 2]);
    add_clause(&mut s, &[-1]);
    assert_eq!(s.solve_limited(&[]), lbool::TRUE);
    let line = format!("{}", s.dimacs_model());
    assert!(line.starts_with("v "));
    assert!(line.trim_end().ends_with(" 0"));
    assert!(line.contains(" 2 "));
    assert!(line.contains("-1 "));
}
