/* Main interface */

use crate::clause::{lbool, Lit, Var};
use crate::core::SolverStats;
use crate::symmetry::{SymGenerator, SymmetryOracle};

/// Main interface of the solver: variable and clause creation, symmetry
/// generator registration, satisfiability checking, model and core queries.
pub trait SolverInterface {
    fn num_vars(&self) -> u32;
    fn num_clauses(&self) -> u64;
    fn num_conflicts(&self) -> u64;
    fn num_propagations(&self) -> u64;
    fn num_decisions(&self) -> u64;
    fn num_restarts(&self) -> u64;

    /// `false` iff the formula was proved unsatisfiable at level 0; sticky.
    fn is_ok(&self) -> bool;

    /// Print statistics to standard output.
    fn print_stats(&self);

    /// Statistics of the last/current search, including symmetry counters.
    fn stats(&self) -> SolverStats;

    /// Creates a new SAT variable. If `dvar` is cleared, the variable will
    /// not be used as a decision variable (this has effects on the meaning
    /// of a SATISFIABLE result).
    fn new_var(&mut self, upol: lbool, dvar: bool) -> Var;

    /// Create a new variable with the default polarity.
    fn new_var_default(&mut self) -> Var;

    /// Variable for the given 0-based index, creating it (and every index
    /// below it) if needed.
    fn var_of_int(&mut self, v_idx: u32) -> Var;

    /// Add a clause to the solver; the vector is consumed destructively.
    /// Returns `false` iff the formula is now trivially unsatisfiable.
    fn add_clause_reuse(&mut self, clause: &mut Vec<Lit>) -> bool;

    /// Register a symmetry generator. Generators must permute the clause
    /// set onto itself; this is the caller's obligation.
    fn add_generator(&mut self, g: SymGenerator);

    /// Assert `l` and mark its variable for recycling at the next
    /// top-level simplification.
    fn release_var(&mut self, l: Lit);

    /// Simplify the clause database according to the current top-level
    /// assignment. Returns `false` iff the formula is unsatisfiable.
    fn simplify(&mut self) -> bool;

    /// Search for a model under the given assumptions, within the
    /// configured budgets.
    fn solve_limited(&mut self, assumps: &[Lit]) -> lbool;

    /// Like [`solve_limited`], with a symmetry oracle driving ESBP
    /// injection during propagation.
    fn solve_limited_sym<O: SymmetryOracle>(&mut self, oracle: &mut O, assumps: &[Lit]) -> lbool;

    /// Ask the solver to stop as soon as convenient. Safe to call from
    /// another thread; the search rolls back to level 0 and returns UNDEF.
    fn interrupt(&self);

    /// Limit the number of conflicts (negative: no limit).
    fn set_conflict_budget(&mut self, n: i64);

    /// Limit the number of propagations (negative: no limit).
    fn set_propagation_budget(&mut self, n: i64);

    /// Literals proved at level 0; they keep this value from now on.
    fn proved_at_lvl_0(&self) -> &[Lit];

    /// Query the whole model.
    ///
    /// Precondition: last result was SAT (ie `lbool::TRUE`).
    fn get_model(&self) -> &[lbool];

    /// Query the model for a variable.
    fn value_var(&self, v: Var) -> lbool;

    /// Query the model for a literal.
    fn value_lit(&self, l: Lit) -> lbool;

    /// Value of this literal if it is assigned at level 0, UNDEF otherwise.
    fn value_lvl_0(&self, l: Lit) -> lbool;

    /// Unsat core (as a subset of the assumptions).
    ///
    /// Precondition: last result was UNSAT.
    fn unsat_core(&self) -> &[Lit];

    /// Does this literal occur in the unsat core?
    fn unsat_core_contains_lit(&self, lit: Lit) -> bool;

    /// Does this variable occur in the unsat core?
    fn unsat_core_contains_var(&self, v: Var) -> bool;
}
