/*****************************************************************************************[core.rs]
Copyright (c) 2003-2006, Niklas Een, Niklas Sorensson (MiniSat)
Copyright (c) 2007-2010, Niklas Sorensson (MiniSat)

Permission is hereby granted, free of charge, to any person obtaining a copy of this software and
associated documentation files (the "Software"), to deal in the Software without restriction,
including without limitation the rights to use, copy, modify, merge, publish, distribute,
sublicense, and/or sell copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all copies or
substantial portions of the Software.

THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING BUT
NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM,
DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT
OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.
**************************************************************************************************/

use {
    crate::callbacks::{Callbacks, ProgressStatus},
    crate::clause::{
        self, lbool, CRef, ClauseAllocator, ClauseRef, DeletePred, LMap, LSet, Lit, OccLists,
        OccListsData, VMap, Var,
    },
    crate::heap::{Comparator, Heap, HeapData},
    crate::interface::SolverInterface,
    crate::symmetry::{GenIdx, GenSet, NoSymmetry, SymGenerator, SymmetryOracle},
    smallvec::SmallVec,
    std::{
        cmp, collections::HashSet, f64, fmt, mem,
        sync::atomic::{AtomicBool, Ordering},
    },
};

/// The main solver structure.
///
/// A `Solver` owns the whole state: clause arena, trail, watch lists, the
/// symmetry subsystem (generators, generator watches, selector clauses,
/// forbid units) and statistics. It is parametrized by [`Callbacks`].
pub struct Solver<Cb: Callbacks> {
    /// If the problem is satisfiable, this vector contains the model.
    model: Vec<lbool>,
    /// If the problem is unsatisfiable under assumptions, this set is the
    /// final conflict expressed in the assumptions.
    conflict: LSet,

    cb: Cb,
    asynch_interrupt: AtomicBool,

    v: SolverV,
}

/// The current assignments.
struct VarState {
    /// A heuristic measurement of the activity of a variable.
    activity: VMap<f64>,
    /// Current assignment for each variable.
    ass: VMap<lbool>,
    /// Reason and level for each variable.
    vardata: VMap<VarData>,
    /// Amount to bump next variable with.
    var_inc: f64,
    var_decay: f64,

    /// Assignment stack; stores all assignments in the order they were made.
    trail: Vec<Lit>,
    /// Separator indices for different decision levels in `trail`.
    trail_lim: Vec<i32>,
}

/// Pending symmetric clauses, lazily materialized from reason clauses.
///
/// Selector clause `k` occupies `lits[idx[k] .. idx[k+1]]`; its first two
/// literals are watched, registered in `watches` under the complement of
/// the watched literal. `gen[k]` is the generator that produced it and
/// `prop[k]` the variable whose reason clause was permuted.
struct SelStore {
    lits: Vec<Lit>,
    idx: Vec<u32>,
    gen: Vec<GenIdx>,
    prop: Vec<Var>,
    watches: LMap<SmallVec<[u32; 4]>>,
}

impl SelStore {
    fn new() -> Self {
        SelStore {
            lits: vec![],
            idx: vec![0],
            gen: vec![],
            prop: vec![],
            watches: LMap::new(),
        }
    }

    fn len(&self) -> usize {
        self.prop.len()
    }

    fn clear_all(&mut self) {
        for (_, w) in self.watches.iter_mut() {
            w.clear();
        }
        self.lits.clear();
        self.idx.clear();
        self.idx.push(0);
        self.gen.clear();
        self.prop.clear();
    }
}

struct SolverV {
    vars: VarState,

    /// List of problem clauses.
    clauses: Vec<CRef>,
    /// List of learnt clauses.
    learnts: Vec<CRef>,

    ca: ClauseAllocator,

    /// `watches[lit]` is a list of clauses watching 'lit' (will go there if
    /// the literal becomes true).
    watches_data: OccListsData<Lit, Watcher>,
    /// A priority queue of variables ordered with respect to activity.
    order_heap_data: HeapData<Var>,

    /// The preferred polarity of each variable (phase saving).
    polarity: VMap<bool>,
    /// The user's preferred polarity of each variable.
    user_pol: VMap<lbool>,
    /// Declares if a variable is eligible for selection in the decision
    /// heuristic.
    decision: VMap<bool>,

    /// If `false`, the constraints are already unsatisfiable. Sticky.
    ok: bool,
    /// Amount to bump next clause with.
    cla_inc: f64,
    /// Head of the propagation queue (index into the trail).
    qhead: i32,
    /// Queue head of the selector-clause engine.
    qhead_sel: i32,
    /// Queue head of the generator-watch engine.
    qhead_gen: i32,
    /// Position within the generator range of `trail[qhead_gen]`, so a
    /// suspended literal resumes where it left off.
    watchidx: u32,

    /// Number of top-level assignments since last execution of `simplify`.
    simp_db_assigns: i32,
    /// Remaining number of propagations before next `simplify`.
    simp_db_props: i64,
    progress_estimate: f64,
    remove_satisfied: bool,

    /// Next variable to be created.
    next_var: Var,
    free_vars: Vec<Var>,
    released_vars: Vec<Var>,

    /// Current set of assumptions provided by the user.
    assumptions: Vec<Lit>,

    // Symmetry subsystem.
    generators: Vec<SymGenerator>,
    /// Flat array of generators that permute a variable; the range of
    /// variable `v` is `gen_watches[gen_watch_idx[v] .. gen_watch_idx[v+1]]`.
    gen_watches: Vec<GenIdx>,
    gen_watch_idx: Vec<u32>,
    sel: SelStore,
    /// Top-level literals whose derivation depended on symmetry.
    forbid_units: LSet,

    // Temporaries (to reduce allocation overhead).
    seen: VMap<Seen>,
    analyze_stack: Vec<(u32, Lit)>,
    analyze_toclear: Vec<Lit>,
    tmp_sym: Vec<Lit>,
    tmp_inject: Vec<Lit>,

    // Resource constraints.
    conflict_budget: i64,
    propagation_budget: i64,

    // Mode of operation.
    clause_decay: f64,
    random_var_freq: f64,
    random_seed: f64,
    luby_restart: bool,
    /// Controls conflict clause minimization (0=none, 1=basic, 2=deep).
    ccmin_mode: i32,
    /// Controls the level of phase saving (0=none, 1=limited, 2=full).
    phase_saving: i32,
    rnd_pol: bool,
    rnd_init_act: bool,
    /// Fraction of wasted memory allowed before garbage collection.
    garbage_frac: f64,
    min_learnts_lim: i32,
    restart_first: i32,
    restart_inc: f64,
    learntsize_factor: f64,
    learntsize_inc: f64,
    learntsize_adjust_start_confl: i32,
    learntsize_adjust_inc: f64,
    max_learnts: f64,
    learntsize_adjust_confl: f64,
    learntsize_adjust_cnt: i32,
    /// Return a falsified injected ESBP as the conflict.
    stop_prop: bool,
    /// Cull the learnt database when it grows past `max_learnts`.
    reduce_db_on: bool,
    /// Self-subsumption minimization of materialized symmetric clauses.
    sym_minimize: bool,

    // Statistics.
    solves: u64,
    starts: u64,
    decisions: u64,
    rnd_decisions: u64,
    propagations: u64,
    conflicts: u64,
    dec_vars: u64,
    max_literals: u64,
    tot_literals: u64,
    num_clauses: u64,
    num_learnts: u64,
    clauses_literals: u64,
    learnts_literals: u64,
    sym_gen_props: u64,
    sym_gen_confls: u64,
    sym_sel_props: u64,
    sym_sel_confls: u64,
    sym_injected: u64,
}

/// Statistics of a solver, including the symmetry counters.
#[derive(Debug, Clone, Copy, Default)]
pub struct SolverStats {
    pub solves: u64,
    pub restarts: u64,
    pub decisions: u64,
    pub rnd_decisions: u64,
    pub conflicts: u64,
    pub propagations: u64,
    pub num_clauses: u64,
    pub num_learnts: u64,
    /// Propagations from materialized symmetric clauses found via the
    /// generator watches.
    pub sym_gen_props: u64,
    /// Conflicts from materialized symmetric clauses found via the
    /// generator watches.
    pub sym_gen_confls: u64,
    /// Propagations from selector clauses.
    pub sym_sel_props: u64,
    /// Conflicts from selector clauses.
    pub sym_sel_confls: u64,
    /// Clauses injected by the symmetry oracle.
    pub sym_injected: u64,
    pub forbid_units: u64,
}

/// Outcome of conflict analysis; the clause itself is produced in the
/// caller-provided buffer.
struct AnalyzeOut {
    backtrack_lvl: i32,
    /// The conflict involved a symmetric reason or a forbid unit.
    sym: bool,
    /// Compatible generator set of the learnt clause (meaningful iff `sym`).
    compat: GenSet,
}

/// Outcome of a selector/generator scan step.
enum SymWave {
    /// Nothing derived; queue heads fully advanced.
    Quiet,
    /// A symmetric derivation enqueued a literal after backtracking; the
    /// propagation wave must restart from `qhead`.
    Restart,
    /// A symmetric derivation is conflicting.
    Conflict(CRef),
}

/// Outcome of forming a candidate selector clause (§ generator watches).
enum SelAdd {
    /// Some image literal is already true; nothing to remember.
    Satisfied,
    /// Stored with two watched image literals.
    Stored,
    /// Fewer than two undefined images: the symmetric clause is unit or
    /// conflicting right now.
    Short,
}

/// Print the model as DIMACS (`v` line).
pub struct SolverPrintDimacs<'a, Cb: Callbacks + 'a> {
    s: &'a Solver<Cb>,
}

impl<'a, Cb: Callbacks> fmt::Display for SolverPrintDimacs<'a, Cb> {
    fn fmt(&self, out: &mut fmt::Formatter) -> fmt::Result {
        write!(out, "v ")?;
        for (i, &val) in self.s.model.iter().enumerate() {
            if val == lbool::TRUE {
                write!(out, "{} ", i + 1)?
            } else if val == lbool::FALSE {
                write!(out, "-{} ", i + 1)?
            }
        }
        writeln!(out, "0")
    }
}

// public API
impl<Cb: Callbacks> SolverInterface for Solver<Cb> {
    fn new_var(&mut self, upol: lbool, dvar: bool) -> Var {
        self.v.new_var(upol, dvar)
    }

    fn new_var_default(&mut self) -> Var {
        self.new_var(lbool::UNDEF, true)
    }

    fn var_of_int(&mut self, v_idx: u32) -> Var {
        while v_idx >= self.num_vars() {
            self.new_var_default();
        }
        Var::from_idx(v_idx)
    }

    // in the API, we can only add clauses at level 0
    fn add_clause_reuse(&mut self, clause: &mut Vec<Lit>) -> bool {
        debug!("add toplevel clause {:?}", clause);
        debug_assert_eq!(
            self.v.decision_level(),
            0,
            "add clause at non-zero decision level"
        );
        clause.sort_unstable();
        self.add_clause_(clause)
    }

    fn add_generator(&mut self, g: SymGenerator) {
        self.v.generators.push(g);
    }

    fn release_var(&mut self, l: Lit) {
        // only unassigned variables are released, to avoid double releases
        if self.v.value_lit(l) == lbool::UNDEF {
            let mut c = vec![l];
            self.add_clause_(&mut c);
            self.v.released_vars.push(l.var());
        }
    }

    fn simplify(&mut self) -> bool {
        self.simplify_internal(&mut NoSymmetry)
    }

    fn solve_limited(&mut self, assumps: &[Lit]) -> lbool {
        self.solve_limited_sym(&mut NoSymmetry, assumps)
    }

    fn solve_limited_sym<O: SymmetryOracle>(&mut self, oracle: &mut O, assumps: &[Lit]) -> lbool {
        self.asynch_interrupt.store(false, Ordering::SeqCst);
        self.v.assumptions.clear();
        self.v.assumptions.extend_from_slice(assumps);
        self.solve_internal(oracle)
    }

    fn interrupt(&self) {
        self.asynch_interrupt.store(true, Ordering::Relaxed);
    }

    fn set_conflict_budget(&mut self, n: i64) {
        self.v.conflict_budget = n;
    }

    fn set_propagation_budget(&mut self, n: i64) {
        self.v.propagation_budget = n;
    }

    fn value_var(&self, v: Var) -> lbool {
        self.model
            .get(v.idx() as usize)
            .map_or(lbool::UNDEF, |&v| v)
    }
    fn value_lit(&self, v: Lit) -> lbool {
        self.value_var(v.var()) ^ !v.sign()
    }
    fn get_model(&self) -> &[lbool] {
        &self.model
    }
    fn is_ok(&self) -> bool {
        self.v.ok
    }

    fn num_vars(&self) -> u32 {
        self.v.num_vars()
    }
    fn num_clauses(&self) -> u64 {
        self.v.num_clauses
    }
    fn num_conflicts(&self) -> u64 {
        self.v.conflicts
    }
    fn num_propagations(&self) -> u64 {
        self.v.propagations
    }
    fn num_decisions(&self) -> u64 {
        self.v.decisions
    }
    fn num_restarts(&self) -> u64 {
        self.v.starts
    }

    fn value_lvl_0(&self, lit: Lit) -> lbool {
        let mut res = self.v.value_lit(lit);
        if self.v.level(lit.var()) != 0 {
            res = lbool::UNDEF;
        }
        res
    }

    fn stats(&self) -> SolverStats {
        let v = &self.v;
        SolverStats {
            solves: v.solves,
            restarts: v.starts,
            decisions: v.decisions,
            rnd_decisions: v.rnd_decisions,
            conflicts: v.conflicts,
            propagations: v.propagations,
            num_clauses: v.num_clauses,
            num_learnts: v.num_learnts,
            sym_gen_props: v.sym_gen_props,
            sym_gen_confls: v.sym_gen_confls,
            sym_sel_props: v.sym_sel_props,
            sym_sel_confls: v.sym_sel_confls,
            sym_injected: v.sym_injected,
            forbid_units: v.forbid_units.len() as u64,
        }
    }

    fn print_stats(&self) {
        println!("c restarts              : {}", self.v.starts);
        println!("c conflicts             : {:<12}", self.v.conflicts);
        println!("c symgenconfls          : {:<12}", self.v.sym_gen_confls);
        println!("c symselconfls          : {:<12}", self.v.sym_sel_confls);
        println!(
            "c decisions             : {:<12}   ({:4.2} % random)",
            self.v.decisions,
            self.v.rnd_decisions as f32 * 100.0 / self.v.decisions as f32
        );
        println!("c propagations          : {:<12}", self.v.propagations);
        println!("c symgenprops           : {:<12}", self.v.sym_gen_props);
        println!("c symselprops           : {:<12}", self.v.sym_sel_props);
        println!(
            "c conflict literals     : {:<12}   ({:4.2} % deleted)",
            self.v.tot_literals,
            (self.v.max_literals - self.v.tot_literals) as f64 * 100.0 / self.v.max_literals as f64
        );
    }

    fn unsat_core(&self) -> &[Lit] {
        self.conflict.as_slice()
    }

    fn unsat_core_contains_lit(&self, lit: Lit) -> bool {
        self.conflict.has(lit)
    }

    fn unsat_core_contains_var(&self, v: Var) -> bool {
        let lit = Lit::new(v, true);
        self.unsat_core_contains_lit(lit) || self.unsat_core_contains_lit(!lit)
    }

    fn proved_at_lvl_0(&self) -> &[Lit] {
        self.v.vars.proved_at_lvl_0()
    }
}

impl<Cb: Callbacks + Default> Default for Solver<Cb> {
    fn default() -> Self {
        Solver::new(SolverOpts::default(), Default::default())
    }
}

impl<Cb: Callbacks> Solver<Cb> {
    /// Create a new solver with the given options and callbacks.
    pub fn new(opts: SolverOpts, cb: Cb) -> Self {
        assert!(opts.check());
        Self {
            model: vec![],
            conflict: LSet::new(),
            cb,
            asynch_interrupt: AtomicBool::new(false),
            v: SolverV::new(&opts),
        }
    }

    /// Number of registered symmetry generators.
    pub fn num_generators(&self) -> usize {
        self.v.generators.len()
    }

    /// The `i`th registered generator.
    pub fn generator(&self, i: usize) -> Option<&SymGenerator> {
        self.v.generators.get(i)
    }

    /// Temporary access to the callbacks.
    pub fn cb_mut(&mut self) -> &mut Cb {
        &mut self.cb
    }

    /// Temporary access to the callbacks.
    pub fn cb(&self) -> &Cb {
        &self.cb
    }

    pub fn dimacs_model(&self) -> SolverPrintDimacs<Cb> {
        SolverPrintDimacs { s: self }
    }

    fn has_been_interrupted(&self) -> bool {
        self.asynch_interrupt.load(Ordering::Relaxed)
    }

    fn within_budget(&self) -> bool {
        !self.has_been_interrupted()
            && (self.v.conflict_budget < 0 || self.v.conflicts < self.v.conflict_budget as u64)
            && (self.v.propagation_budget < 0
                || self.v.propagations < self.v.propagation_budget as u64)
            && !self.cb.stop()
    }

    /// Add clause at level 0.
    ///
    /// Precondition: `clause` is sorted.
    fn add_clause_(&mut self, clause: &mut Vec<Lit>) -> bool {
        if !self.v.ok {
            return false;
        }

        // remove duplicates, satisfied/false literals, detect tautologies
        let mut last_lit = Lit::UNDEF;
        let mut j = 0;
        for i in 0..clause.len() {
            let lit_i = clause[i];
            let value = self.v.value_lit(lit_i);
            let lvl = self.v.level_lit(lit_i);
            if (value == lbool::TRUE && lvl == 0) || lit_i == !last_lit {
                return true; // tautology, or already satisfied at level 0
            } else if !(value == lbool::FALSE && lvl == 0) && lit_i != last_lit {
                last_lit = lit_i;
                clause[j] = lit_i;
                j += 1;
            }
        }

        clause.truncate(j);
        if clause.len() == 0 {
            self.v.ok = false;
            return false;
        } else if clause.len() == 1 {
            self.v.enqueue(clause[0], CRef::UNDEF);
            self.v.ok = self.v.propagate(&mut NoSymmetry).is_none();
            return self.v.ok;
        } else {
            let cr = self.v.ca.alloc(&clause, false, None);
            self.v.clauses.push(cr);
            self.v.attach_clause(cr);
        }

        true
    }

    fn simplify_internal<O: SymmetryOracle>(&mut self, oracle: &mut O) -> bool {
        debug_assert_eq!(self.v.decision_level(), 0);

        if !self.v.ok || self.v.propagate(oracle).is_some() {
            self.v.ok = false;
            return false;
        }

        if self.v.num_assigns() as i32 == self.v.simp_db_assigns || self.v.simp_db_props > 0 {
            return true;
        }

        self.v.remove_satisfied_from(ClauseSetSelect::Learnt);
        if self.v.remove_satisfied {
            self.v.remove_satisfied_from(ClauseSetSelect::Original);
            self.v.recycle_released_vars();
        }
        self.check_garbage();
        self.v.rebuild_order_heap();

        self.v.simp_db_assigns = self.v.num_assigns() as i32;
        // (shouldn't depend on stats really, but it will do for now)
        self.v.simp_db_props = (self.v.clauses_literals + self.v.learnts_literals) as i64;

        true
    }

    /// Search for a model for the specified number of conflicts.
    ///
    /// Use a negative value for `nof_conflicts` to indicate infinity.
    ///
    /// # Output
    ///
    /// - `lbool::TRUE` if a total assignment consistent with the clause set
    ///   was found,
    /// - `lbool::FALSE` if the clause set is unsatisfiable,
    /// - `lbool::UNDEF` if the bound on conflicts was reached.
    fn search<O: SymmetryOracle>(
        &mut self,
        oracle: &mut O,
        nof_conflicts: i32,
        tmp_learnt: &mut Vec<Lit>,
    ) -> lbool {
        debug_assert!(self.v.ok);
        let mut conflict_c = 0;
        self.v.starts += 1;

        loop {
            let confl = self.v.propagate(oracle);

            if let Some(confl) = confl {
                // CONFLICT
                self.v.conflicts += 1;
                conflict_c += 1;
                if self.v.decision_level() == 0 {
                    return lbool::FALSE;
                }
                debug_assert_ne!(confl, CRef::UNSAT);

                let info = self.v.analyze(confl, tmp_learnt);
                if !self.add_learnt_and_backtrack(oracle, tmp_learnt, info) {
                    // a symmetric image of the asserting unit is false at
                    // the top level
                    return lbool::FALSE;
                }

                self.v.vars.var_decay_activity();
                self.v.cla_decay_activity();

                self.v.learntsize_adjust_cnt -= 1;
                if self.v.learntsize_adjust_cnt == 0 {
                    self.v.learntsize_adjust_confl *= self.v.learntsize_adjust_inc;
                    self.v.learntsize_adjust_cnt = self.v.learntsize_adjust_confl as i32;
                    self.v.max_learnts *= self.v.learntsize_inc;

                    let trail_lim_head = self
                        .v
                        .vars
                        .trail_lim
                        .first()
                        .cloned()
                        .unwrap_or(self.v.vars.trail.len() as i32);
                    let v = &self.v;
                    self.cb.on_progress(|| ProgressStatus {
                        conflicts: v.conflicts as i32,
                        dec_vars: v.dec_vars as i32 - trail_lim_head,
                        n_clauses: v.num_clauses,
                        n_clause_lits: v.clauses_literals as i32,
                        max_learnt: v.max_learnts as i32,
                        n_learnt: v.num_learnts,
                        n_learnt_lits: v.learnts_literals as f64 / v.num_learnts as f64,
                        progress_estimate: v.progress_estimate() * 100.0,
                    });
                }
            } else {
                // NO CONFLICT
                if (nof_conflicts >= 0 && conflict_c >= nof_conflicts) || !self.within_budget() {
                    // Reached bound on number of conflicts:
                    self.v.progress_estimate = self.v.progress_estimate();
                    self.v.cancel_until(oracle, 0);
                    return lbool::UNDEF;
                }

                // Simplify the set of problem clauses:
                if self.v.decision_level() == 0 && !self.simplify_internal(oracle) {
                    return lbool::FALSE;
                }

                if self.v.reduce_db_on
                    && self.v.learnts.len() as f64 - self.v.num_assigns() as f64
                        >= self.v.max_learnts
                {
                    // Reduce the set of learnt clauses:
                    self.reduce_db();
                }

                // select the next decision (assumption, or variable heap)
                let mut next = Lit::UNDEF;
                while (self.v.decision_level() as usize) < self.v.assumptions.len() {
                    // Perform user provided assumption:
                    let p = self.v.assumptions[self.v.decision_level() as usize];
                    if self.v.value_lit(p) == lbool::TRUE {
                        // Dummy decision level, since `p` is true already:
                        self.v.vars.new_decision_level();
                    } else if self.v.value_lit(p) == lbool::FALSE {
                        let mut conflict = mem::replace(&mut self.conflict, LSet::new());
                        self.v.analyze_final(!p, &mut conflict);
                        self.conflict = conflict;
                        return lbool::FALSE;
                    } else {
                        next = p;
                        break;
                    }
                }

                if next == Lit::UNDEF {
                    // New variable decision:
                    next = self.v.pick_branch_lit();

                    if next == Lit::UNDEF {
                        // Model found:
                        return lbool::TRUE;
                    }
                    self.v.decisions += 1;
                }

                // Increase decision level and enqueue `next` with no
                // justification, since it's a decision
                debug!("pick-next {:?}", next);
                self.v.vars.new_decision_level();
                self.v.enqueue(next, CRef::UNDEF);
            }
        }
    }

    /// Add a learnt clause and backtrack/propagate as necessary.
    ///
    /// Returns `false` if a symmetric image of an asserting unit turned out
    /// to be false at the top level (the formula is unsatisfiable).
    fn add_learnt_and_backtrack<O: SymmetryOracle>(
        &mut self,
        oracle: &mut O,
        learnt: &Vec<Lit>,
        info: AnalyzeOut,
    ) -> bool {
        let kind = if info.sym {
            clause::Kind::Symmetry
        } else {
            clause::Kind::Learnt
        };
        self.cb.on_new_clause(learnt, kind);
        self.v.cancel_until(oracle, info.backtrack_lvl as u32);

        debug_assert!(learnt.len() >= 1);
        if learnt.len() == 1 {
            // assert the unit at level 0, then propagate its images
            let l = learnt[0];
            self.v.enqueue(l, CRef::UNDEF);
            if info.sym {
                self.v.forbid_units.insert(l);
                self.v.propagate_unit_images(l, Some(&info.compat))
            } else {
                self.v.propagate_unit_images(l, None)
            }
        } else {
            let compat = if info.sym { Some(info.compat) } else { None };
            let cr = self.v.ca.alloc(learnt, true, compat);
            self.v.learnts.push(cr);
            self.v.attach_clause(cr);
            self.v.cla_bump_activity(cr);
            self.v.enqueue(learnt[0], cr);
            true
        }
    }

    /// Main solve method (assumptions given in `self.v.assumptions`).
    fn solve_internal<O: SymmetryOracle>(&mut self, oracle: &mut O) -> lbool {
        assert_eq!(self.v.decision_level(), 0);
        self.model.clear();
        self.conflict.clear();
        if !self.v.ok {
            return lbool::FALSE;
        }

        if self.v.solves == 0 {
            self.v.seed_from_occurrences();
        }
        self.v.solves += 1;

        self.v.init_generator_watches();

        // mirror the level-0 trail to the oracle, then take its symmetric
        // unit facts; they become forbid units
        for &p in &self.v.vars.trail {
            oracle.update_notify(p);
        }
        let mut units = vec![];
        oracle.initial_units(&mut units);
        for l in units {
            self.v.forbid_units.insert(l);
            if self.v.value_lit(l) == lbool::UNDEF {
                self.v.enqueue(l, CRef::UNDEF);
            }
        }

        let mut tmp_learnt: Vec<Lit> = vec![];

        self.v.max_learnts = self.v.num_clauses as f64 * self.v.learntsize_factor;
        if self.v.max_learnts < self.v.min_learnts_lim as f64 {
            self.v.max_learnts = self.v.min_learnts_lim as f64;
        }

        self.v.learntsize_adjust_confl = self.v.learntsize_adjust_start_confl as f64;
        self.v.learntsize_adjust_cnt = self.v.learntsize_adjust_confl as i32;
        let mut status;

        info!("search.start");
        self.cb.on_start();

        // Search:
        let mut curr_restarts: i32 = 0;
        loop {
            let rest_base = if self.v.luby_restart {
                utils::luby(self.v.restart_inc, curr_restarts)
            } else {
                f64::powi(self.v.restart_inc, curr_restarts)
            };
            let nof_conflicts = (rest_base * self.v.restart_first as f64) as i32;
            status = self.search(oracle, nof_conflicts, &mut tmp_learnt);
            if !self.within_budget() {
                break;
            }

            if status != lbool::UNDEF {
                break;
            } else {
                info!("search.restart({})", curr_restarts);
                curr_restarts += 1;
                self.cb.on_restart();
            }
        }

        self.cb.on_result(status);

        if status == lbool::TRUE {
            // Extend & copy model:
            let num_vars = self.num_vars();
            self.model.resize(num_vars as usize, lbool::UNDEF);
            for i in 0..num_vars {
                self.model[i as usize] = self.v.value(Var::from_idx(i));
            }
        } else if status == lbool::FALSE && self.conflict.len() == 0 {
            // NOTE: we may return FALSE with a non-empty conflict when
            // there were assumptions; in that case `self.conflict` is the
            // unsat core and the formula itself may still be satisfiable.
            self.v.ok = false;
        }

        self.v.cancel_until(oracle, 0);
        debug!("res: {:?}", status);
        status
    }

    /// Remove half of the learnt clauses, minus the clauses locked by the
    /// current assignment. A symmetry-tainted clause is only deleted when
    /// no trail literal references it as its reason.
    fn reduce_db(&mut self) {
        let extra_lim = self.v.cla_inc / self.v.learnts.len() as f64;

        debug!("reduce_db.start");

        {
            let SolverV { ca, learnts, .. } = &mut self.v;
            learnts.sort_unstable_by(|&x, &y| {
                let x = ca.get_ref(x);
                let y = ca.get_ref(y);
                debug_assert!(x.learnt());
                debug_assert!(y.learnt());
                Ord::cmp(&(x.size() <= 2), &(y.size() <= 2)).then(
                    PartialOrd::partial_cmp(&x.activity(), &y.activity()).expect("NaN activity"),
                )
            });
        }

        // clauses referenced as a reason anywhere on the trail
        let trail_reasons: HashSet<CRef> = self
            .v
            .vars
            .trail
            .iter()
            .map(|l| self.v.vars.reason(l.var()))
            .filter(|&r| r != CRef::UNDEF)
            .collect();

        // Don't delete binary or locked clauses. From the rest, delete
        // clauses from the first half and clauses with activity below
        // `extra_lim`:
        let len = self.v.learnts.len();
        let mut j = 0;
        for i in 0..len {
            let cr = self.v.learnts[i];
            let cond = {
                let c = self.v.ca.get_ref(cr);
                c.size() > 2
                    && !self.v.locked(c)
                    && !(c.symmetry() && trail_reasons.contains(&cr))
                    && (i < len / 2 || (c.activity() as f64) < extra_lim)
            };
            if cond {
                self.v.remove_clause(cr);
                self.cb.on_delete_clause(self.v.ca.get_ref(cr).lits());
            } else {
                self.v.learnts[j] = cr;
                j += 1;
            }
        }

        let _deleted = len - j;
        self.v.learnts.truncate(j);

        debug!("reduce_db.done (deleted {})", _deleted);

        self.check_garbage();
    }

    /// Garbage collect the clause arena by moving live clauses into a fresh
    /// arena and rewriting every handle.
    fn garbage_collect(&mut self) {
        // Size the next region after the estimated utilization to avoid
        // unnecessary reallocations:
        let mut to = ClauseAllocator::with_start_cap(self.v.ca.len() - self.v.ca.wasted());

        self.v.reloc_all(&mut to);

        self.cb.on_gc(
            self.v.ca.len() * ClauseAllocator::UNIT_SIZE as usize,
            to.len() * ClauseAllocator::UNIT_SIZE as usize,
        );
        self.v.ca = to;
    }

    /// Trigger garbage collection when the wasted fraction exceeds the
    /// threshold.
    fn check_garbage(&mut self) {
        if self.v.ca.wasted() as f64 > self.v.ca.len() as f64 * self.v.garbage_frac {
            self.garbage_collect();
        }
    }
}

impl SolverV {
    #[inline(always)]
    fn num_assigns(&self) -> u32 {
        self.vars.num_assigns()
    }

    #[inline(always)]
    fn num_vars(&self) -> u32 {
        self.next_var.idx()
    }

    #[inline(always)]
    fn level(&self, x: Var) -> i32 {
        self.vars.level(x)
    }

    #[inline(always)]
    fn level_lit(&self, x: Lit) -> i32 {
        self.level(x.var())
    }

    #[inline(always)]
    fn value(&self, x: Var) -> lbool {
        self.vars.value(x)
    }

    #[inline(always)]
    fn value_lit(&self, x: Lit) -> lbool {
        self.vars.value_lit(x)
    }

    #[inline(always)]
    fn decision_level(&self) -> u32 {
        self.vars.decision_level()
    }

    #[inline(always)]
    fn reason(&self, x: Var) -> CRef {
        self.vars.reason(x)
    }

    fn order_heap(&mut self) -> Heap<Var, VarOrder> {
        self.order_heap_data.promote(VarOrder {
            activity: &self.vars.activity,
        })
    }

    fn watches(&mut self) -> OccLists<Lit, Watcher, WatcherDeleted> {
        self.watches_data.promote(WatcherDeleted { ca: &self.ca })
    }

    fn set_decision_var(&mut self, v: Var, b: bool) {
        if b && !self.decision[v] {
            self.dec_vars += 1;
        } else if !b && self.decision[v] {
            self.dec_vars -= 1;
        }
        self.decision[v] = b;
        self.insert_var_order(v);
    }

    fn insert_var_order(&mut self, x: Var) {
        if !self.order_heap().in_heap(x) && self.decision[x] {
            self.order_heap().insert(x);
        }
    }

    fn new_var(&mut self, upol: lbool, dvar: bool) -> Var {
        let v = self.free_vars.pop().unwrap_or_else(|| {
            let v = self.next_var;
            self.next_var = Var::from_idx(self.next_var.idx() + 1);
            v
        });
        self.watches().init(Lit::new(v, false));
        self.watches().init(Lit::new(v, true));
        self.sel.watches.reserve_default(Lit::new(v, false));
        self.sel.watches.reserve_default(Lit::new(v, true));
        self.vars.ass.insert_default(v, lbool::UNDEF);
        self.vars
            .vardata
            .insert_default(v, VarData::new(CRef::UNDEF, 0));
        if self.rnd_init_act {
            self.vars
                .activity
                .insert_default(v, utils::drand(&mut self.random_seed) * 0.00001);
        } else {
            self.vars.activity.insert_default(v, 0.0);
        }
        self.seen.insert_default(v, Seen::UNDEF);
        self.polarity.insert_default(v, false);
        self.user_pol.insert_default(v, upol);
        self.decision.reserve_default(v);
        self.set_decision_var(v, dvar);
        v
    }

    /// Push `p` on the trail with the given reason. At the top level, a
    /// reason that is symmetric (or that contains the complement of a
    /// forbid unit) makes `p` a forbid unit itself.
    #[inline]
    fn enqueue(&mut self, p: Lit, from: CRef) {
        enqueue_fields(&mut self.vars, &self.ca, &mut self.forbid_units, p, from);
    }

    /// Rebuild the flat generator-watch table: for every variable, the
    /// generators that permute it.
    fn init_generator_watches(&mut self) {
        self.gen_watches.clear();
        self.gen_watch_idx.clear();
        self.gen_watch_idx.push(0);
        for v in (0..self.num_vars()).map(Var::from_idx) {
            let p = Lit::new(v, true);
            for (i, g) in self.generators.iter().enumerate() {
                if g.permutes(p) {
                    self.gen_watches.push(GenIdx::new(i));
                }
            }
            self.gen_watch_idx.push(self.gen_watches.len() as u32);
        }
    }

    /// Seed polarity and activity from literal occurrence counts weighted
    /// by `1/|C|²`, then rebuild the order heap. Run once, on first solve.
    fn seed_from_occurrences(&mut self) {
        let nv = self.num_vars() as usize;
        let mut occs = vec![0.0f64; 2 * nv];
        for &cr in &self.clauses {
            let c = self.ca.get_ref(cr);
            let increment = 1.0 / ((c.size() * c.size()) as f64);
            for &l in c.lits() {
                occs[l.idx() as usize] += increment;
            }
        }
        for vi in 0..nv {
            let v = Var::from_idx(vi as u32);
            let pos = occs[Lit::new(v, true).idx() as usize];
            let neg = occs[Lit::new(v, false).idx() as usize];
            // branch on the polarity that occurs more often
            self.polarity[v] = pos > neg;
            self.vars.activity[v] = pos * neg;
        }
        self.rebuild_order_heap();
    }

    /// Propagate the images of the freshly asserted top-level unit `l`
    /// under the compatible generators (or all generators when the unit
    /// does not depend on symmetry). Returns `false` if some image is
    /// already false at the top level.
    fn propagate_unit_images(&mut self, l: Lit, comp: Option<&GenSet>) -> bool {
        let mut images: Vec<Lit> = vec![];
        match comp {
            Some(set) => {
                for g in set.iter() {
                    let gen = &self.generators[g.idx()];
                    if gen.permutes(l) {
                        images.push(gen.image(l));
                    }
                }
            }
            None => {
                for gen in &self.generators {
                    if gen.permutes(l) {
                        images.push(gen.image(l));
                    }
                }
            }
        }
        for im in images {
            let v = self.value_lit(im);
            if v == lbool::UNDEF {
                self.enqueue(im, CRef::UNDEF);
            } else if v == lbool::FALSE {
                return false;
            }
        }
        true
    }

    /// Propagates all enqueued facts: boolean constraint propagation, the
    /// selector-clause engine and the generator-watch engine, restarting
    /// the wave whenever a symmetric derivation shortens the trail.
    ///
    /// If a conflict arises, the conflicting clause is returned (possibly
    /// the `CRef::UNSAT` sentinel for a top-level symmetric conflict).
    ///
    /// # Post-conditions
    ///
    /// - the propagation queue is empty, even if there was a conflict.
    fn propagate<O: SymmetryOracle>(&mut self, oracle: &mut O) -> Option<CRef> {
        let mut confl = None;
        let mut num_props: u32 = 0;

        'wave: loop {
            while (self.qhead as usize) < self.vars.trail.len() {
                // `p` is the next enqueued fact to propagate.
                let p = self.vars.trail[self.qhead as usize];
                self.qhead += 1;
                num_props += 1;

                // consult the symmetry oracle before scanning watches, so
                // an injected clause lands in the watch list we are about
                // to scan
                oracle.update_notify(p);
                if let Some(cr) = self.inject_esbp(oracle, p) {
                    if self.stop_prop && self.clause_falsified(cr) {
                        self.qhead = self.vars.trail.len() as i32;
                        confl = Some(cr);
                        break;
                    }
                }

                let watches_data_ptr: *mut OccListsData<_, _> = &mut self.watches_data;
                let ws = self
                    .watches_data
                    .lookup_mut_pred(p, &WatcherDeleted { ca: &self.ca });
                let mut i: usize = 0;
                let mut j: usize = 0;
                let end: usize = ws.len();
                'clauses: while i < end {
                    // Try to avoid inspecting the clause:
                    let blocker = ws[i].blocker;
                    if self.vars.value_lit(blocker) == lbool::TRUE {
                        ws[j] = ws[i];
                        j += 1;
                        i += 1;
                        continue;
                    }

                    // Make sure the false literal is data[1]:
                    let cr = ws[i].cref;
                    let mut c = self.ca.get_mut(cr);
                    let false_lit = !p;
                    if c[0] == false_lit {
                        let tmp = c[1];
                        c[0] = tmp;
                        c[1] = false_lit;
                    }
                    debug_assert_eq!(c[1], false_lit);
                    i += 1;

                    // If 0th watch is true, the clause is already satisfied.
                    let first = c[0];
                    let w = Watcher::new(cr, first);
                    if first != blocker && self.vars.value_lit(first) == lbool::TRUE {
                        ws[j] = w;
                        j += 1;
                        continue;
                    }

                    // Look for new watch:
                    for k in 2..c.size() {
                        if self.vars.value_lit(c[k]) != lbool::FALSE {
                            let tmp = c[k];
                            c[1] = tmp;
                            c[k] = false_lit;

                            // safe because `!c[1] != p`, so the lists are
                            // not aliased
                            debug_assert_ne!(!tmp, p);
                            unsafe { (&mut (*watches_data_ptr))[!tmp].push(w) };
                            continue 'clauses;
                        }
                    }

                    // Did not find watch -- clause is unit under assignment:
                    ws[j] = w;
                    j += 1;
                    if self.vars.value_lit(first) == lbool::FALSE {
                        confl = Some(cr);
                        self.qhead = self.vars.trail.len() as i32;
                        // Copy the remaining watches:
                        while i < end {
                            ws[j] = ws[i];
                            j += 1;
                            i += 1;
                        }
                    } else {
                        enqueue_fields(&mut self.vars, &self.ca, &mut self.forbid_units, first, cr);
                    }
                }
                ws.truncate(j);
            }

            if confl.is_some() {
                break 'wave;
            }

            // cached symmetric clauses first, then fresh ones
            match self.propagate_selectors(oracle) {
                SymWave::Restart => continue 'wave,
                SymWave::Conflict(cr) => {
                    confl = Some(cr);
                    break 'wave;
                }
                SymWave::Quiet => {}
            }
            match self.propagate_gen_watches(oracle) {
                SymWave::Restart => continue 'wave,
                SymWave::Conflict(cr) => {
                    confl = Some(cr);
                    break 'wave;
                }
                SymWave::Quiet => break 'wave,
            }
        }

        self.propagations += num_props as u64;
        self.simp_db_props -= num_props as i64;

        confl
    }

    /// Ask the oracle for an ESBP triggered by the assignment of `p`; if
    /// there is one, allocate it as a symmetric learnt clause whose
    /// compatible set is the generators stabilizing it, and attach it.
    fn inject_esbp<O: SymmetryOracle>(&mut self, oracle: &mut O, p: Lit) -> Option<CRef> {
        let mut lits = mem::take(&mut self.tmp_inject);
        lits.clear();
        let res = if oracle.clause_to_inject(p, &mut lits) {
            debug_assert!(
                lits.len() >= 2,
                "injected clause must have at least 2 literals"
            );
            if lits.len() < 2 {
                None
            } else {
                self.prepare_watches(&mut lits);
                let mut comp = GenSet::new();
                for (i, g) in self.generators.iter().enumerate() {
                    if g.stabilizes(&lits) {
                        comp.insert(GenIdx::new(i));
                    }
                }
                let cr = self.ca.alloc(&lits, true, Some(comp));
                self.learnts.push(cr);
                self.attach_clause(cr);
                self.sym_injected += 1;
                Some(cr)
            }
        } else {
            None
        };
        self.tmp_inject = lits;
        res
    }

    fn clause_falsified(&self, cr: CRef) -> bool {
        let c = self.ca.get_ref(cr);
        c.lits()
            .iter()
            .all(|&l| self.vars.value_lit(l) == lbool::FALSE)
    }

    /// Scan the selector clauses watched on newly assigned literals
    /// (queue head `qhead_sel`).
    fn propagate_selectors<O: SymmetryOracle>(&mut self, oracle: &mut O) -> SymWave {
        if self.generators.is_empty() {
            self.qhead_sel = self.vars.trail.len() as i32;
            return SymWave::Quiet;
        }
        while (self.qhead_sel as usize) < self.vars.trail.len() {
            let p = self.vars.trail[self.qhead_sel as usize];
            let mut wi = 0;
            loop {
                let k = match self.sel.watches[p].get(wi) {
                    Some(&k) => k as usize,
                    None => break,
                };
                if k >= self.sel.len() {
                    // the clause was discarded on backtrack; stale watch
                    self.sel.watches[p].swap_remove(wi);
                    continue;
                }
                let c_start = self.sel.idx[k] as usize;
                let c_end = self.sel.idx[k + 1] as usize;
                let w0 = self.sel.lits[c_start];
                let w1 = self.sel.lits[c_start + 1];
                if self.vars.value_lit(w0) == lbool::TRUE
                    || self.vars.value_lit(w1) == lbool::TRUE
                {
                    // satisfied; leave dormant (watches are cleaned lazily)
                    wi += 1;
                    continue;
                }

                // every remaining case erases this watch
                self.sel.watches[p].swap_remove(wi);

                let not_p = !p;
                let watch = if w0 == not_p {
                    c_start
                } else if w1 == not_p {
                    c_start + 1
                } else {
                    // watched literal became invalid (e.g. clause replaced)
                    continue;
                };
                debug_assert_eq!(self.vars.value_lit(self.sel.lits[watch]), lbool::FALSE);

                // look for a replacement watch
                for i in (c_start + 2)..c_end {
                    if self.vars.value_lit(self.sel.lits[i]) != lbool::FALSE {
                        self.sel.lits.swap(i, watch);
                        break;
                    }
                }
                if self.vars.value_lit(self.sel.lits[watch]) != lbool::FALSE {
                    let key = !self.sel.lits[watch];
                    self.sel.watches[key].push(k as u32);
                    continue;
                }

                // unit or conflicting selector clause
                let pv = self.sel.prop[k];
                let g = self.sel.gen[k];
                let original = self.vars.reason(pv);
                if original == CRef::UNDEF {
                    // the propagated variable lost its reason on replay
                    continue;
                }
                let compat_ok = {
                    let c = self.ca.get_ref(original);
                    !c.symmetry() || c.compat().map_or(false, |s| s.contains(g))
                };
                if !compat_ok {
                    continue;
                }
                match self.materialize_symmetric(oracle, original, g, true) {
                    SymWave::Quiet => continue,
                    wave => return wave,
                }
            }
            self.qhead_sel += 1;
        }
        SymWave::Quiet
    }

    /// For each newly assigned literal with a reason clause, consult every
    /// generator permuting its variable and form the candidate selector
    /// clause of the permuted reason (queue heads `qhead_gen`/`watchidx`).
    fn propagate_gen_watches<O: SymmetryOracle>(&mut self, oracle: &mut O) -> SymWave {
        if self.generators.is_empty() || self.gen_watch_idx.len() <= self.num_vars() as usize {
            self.qhead_gen = self.vars.trail.len() as i32;
            return SymWave::Quiet;
        }
        while (self.qhead_gen as usize) < self.vars.trail.len() {
            let p = self.vars.trail[self.qhead_gen as usize];
            let v = p.var();
            let reason = self.vars.reason(v);
            // level-0 propagations may lack a usable reason clause, and
            // decisions have none
            if self.vars.level(v) != 0 && reason != CRef::UNDEF {
                let ws = self.gen_watch_idx[v.idx() as usize];
                let we = self.gen_watch_idx[v.idx() as usize + 1];
                while ws + self.watchidx < we {
                    let g = self.gen_watches[(ws + self.watchidx) as usize];
                    debug_assert!(self.generators[g.idx()].permutes(p));
                    let compat_ok = {
                        let c = self.ca.get_ref(reason);
                        !c.symmetry() || c.compat().map_or(false, |s| s.contains(g))
                    };
                    if compat_ok {
                        if let SelAdd::Short = self.add_sel_clause(g, p) {
                            // resuming retries the same generator; by then
                            // the derived clause is satisfied or stored
                            match self.materialize_symmetric(oracle, reason, g, false) {
                                SymWave::Quiet => {}
                                wave => return wave,
                            }
                        }
                    }
                    self.watchidx += 1;
                }
            }
            self.qhead_gen += 1;
            self.watchidx = 0;
        }
        SymWave::Quiet
    }

    /// Form the candidate selector clause for generator `g` applied to the
    /// reason clause of `l`: the image literals that are currently
    /// undefined, watched on the first two.
    fn add_sel_clause(&mut self, g: GenIdx, l: Lit) -> SelAdd {
        let reason = self.vars.reason(l.var());
        debug_assert_ne!(reason, CRef::UNDEF);
        {
            let c = self.ca.get_ref(reason);
            let gen = &self.generators[g.idx()];
            let vars = &self.vars;
            if c.lits()
                .iter()
                .any(|&x| vars.value_lit(gen.image(x)) == lbool::TRUE)
            {
                // the symmetric clause is satisfied; nothing to remember
                return SelAdd::Satisfied;
            }
        }

        let start = *self.sel.idx.last().unwrap() as usize;
        {
            let c = self.ca.get_ref(reason);
            let gen = &self.generators[g.idx()];
            for &x in c.lits() {
                let im = gen.image(x);
                if self.vars.value_lit(im) == lbool::UNDEF {
                    // false images can never change back; drop them
                    self.sel.lits.push(im);
                }
            }
        }
        let n_added = self.sel.lits.len() - start;
        if n_added < 2 {
            self.sel.lits.truncate(start);
            return SelAdd::Short;
        }

        debug_assert!(self.decision_level() > 0);
        let id = self.sel.len() as u32;
        let w0 = !self.sel.lits[start];
        let w1 = !self.sel.lits[start + 1];
        self.sel.watches[w0].push(id);
        self.sel.watches[w1].push(id);
        self.sel.idx.push(self.sel.lits.len() as u32);
        self.sel.gen.push(g);
        self.sel.prop.push(l.var());
        SelAdd::Stored
    }

    /// A selector clause fired: build the real symmetric clause from the
    /// current reason of its propagated variable, minimize it, and either
    /// enqueue its asserting literal (restarting the wave) or report the
    /// conflict.
    fn materialize_symmetric<O: SymmetryOracle>(
        &mut self,
        oracle: &mut O,
        original: CRef,
        g: GenIdx,
        from_selector: bool,
    ) -> SymWave {
        let mut symmetrical = mem::take(&mut self.tmp_sym);
        {
            let c = self.ca.get_ref(original);
            self.generators[g.idx()].symmetric_clause(c.lits(), &mut symmetrical);
        }
        trace!("materialize symmetric clause {:?}", symmetrical);
        self.minimize_sym_clause(&mut symmetrical);

        let wave = if symmetrical.len() < 2 {
            debug_assert_eq!(symmetrical.len(), 1);
            self.cancel_until(oracle, 0);
            let l = symmetrical[0];
            let v = self.value_lit(l);
            if v == lbool::UNDEF {
                self.bump_sym_prop(from_selector);
                self.enqueue(l, CRef::UNDEF);
                SymWave::Restart
            } else if v == lbool::FALSE {
                self.bump_sym_confl(from_selector);
                SymWave::Conflict(CRef::UNSAT)
            } else {
                // already true at level 0; the backtrack alone requires a
                // fresh wave
                SymWave::Restart
            }
        } else {
            self.prepare_watches(&mut symmetrical);
            debug_assert_eq!(self.value_lit(symmetrical[1]), lbool::FALSE);
            match self.add_clause_from_symmetry(oracle, original, &symmetrical) {
                None => {
                    self.bump_sym_prop(from_selector);
                    SymWave::Restart
                }
                Some(cr) => {
                    self.bump_sym_confl(from_selector);
                    SymWave::Conflict(cr)
                }
            }
        };
        symmetrical.clear();
        self.tmp_sym = symmetrical;
        wave
    }

    fn bump_sym_prop(&mut self, from_selector: bool) {
        if from_selector {
            self.sym_sel_props += 1;
        } else {
            self.sym_gen_props += 1;
        }
    }

    fn bump_sym_confl(&mut self, from_selector: bool) {
        if from_selector {
            self.sym_sel_confls += 1;
        } else {
            self.sym_gen_confls += 1;
        }
    }

    /// Register the materialized symmetric clause as a learnt clause,
    /// backtrack to the level of its second watch and enqueue the first
    /// watch if it is the asserting literal. Returns the clause as a
    /// conflict when it is falsified.
    ///
    /// The clause inherits the symmetry flag and (a clone of) the
    /// compatible set of the original: the image of an untainted clause is
    /// itself a plain consequence of the formula.
    fn add_clause_from_symmetry<O: SymmetryOracle>(
        &mut self,
        oracle: &mut O,
        original: CRef,
        symmetrical: &[Lit],
    ) -> Option<CRef> {
        debug_assert!(symmetrical.len() >= 2);
        let compat = {
            let c = self.ca.get_ref(original);
            if c.symmetry() {
                Some(c.compat().expect("symmetry clause without compat").clone())
            } else {
                None
            }
        };
        let cr = self.ca.alloc(symmetrical, true, compat);
        self.learnts.push(cr);
        self.attach_clause(cr);
        self.cla_bump_activity(cr);

        let assert_lit = symmetrical[0];
        let second_lvl = self.level_lit(symmetrical[1]);
        self.cancel_until(oracle, second_lvl as u32);

        if self.value_lit(assert_lit) == lbool::UNDEF {
            self.enqueue(assert_lit, cr);
            None // unit clause, added to the clause store
        } else {
            debug_assert_eq!(self.value_lit(assert_lit), lbool::FALSE);
            Some(cr) // conflict clause
        }
    }

    /// Order `c` for watching: a true literal in front if there is one,
    /// else two unknowns, else one unknown and the highest false, else the
    /// two highest-level false literals.
    fn prepare_watches(&self, c: &mut [Lit]) {
        debug_assert!(!c.is_empty());
        if self.value_lit(c[0]) == lbool::TRUE {
            return;
        }
        for i in 1..c.len() {
            let vi = self.value_lit(c[i]);
            if vi == lbool::TRUE {
                return; // one true lit
            } else if vi == lbool::UNDEF {
                if self.value_lit(c[0]) == lbool::UNDEF {
                    c.swap(1, i);
                    return; // two unknown lits
                } else {
                    let tmp = c[0];
                    c[0] = c[i];
                    c[i] = c[1];
                    c[1] = tmp;
                }
            } else {
                // false literal
                if self.value_lit(c[0]) == lbool::FALSE
                    && self.level_lit(c[0]) < self.level_lit(c[i])
                {
                    let tmp = c[0];
                    c[0] = c[i];
                    c[i] = c[1];
                    c[1] = tmp;
                } else if self.level_lit(c[1]) < self.level_lit(c[i]) {
                    c.swap(1, i);
                }
            }
        }
        // either one unknown lit, or all false
    }

    /// Self-subsumption minimization of a materialized symmetric clause.
    /// Restores the original clause whenever removal would depend on a
    /// symmetric reason or a forbid unit.
    fn minimize_sym_clause(&mut self, cl: &mut Vec<Lit>) {
        if !self.sym_minimize {
            return;
        }
        let copy = cl.clone();
        for &l in cl.iter() {
            debug_assert_eq!(self.seen[l.var()], Seen::UNDEF);
            self.seen[l.var()] = Seen::SOURCE;
        }

        let mut is_sym = false;
        let mut i = 0;
        while i < cl.len() && cl.len() > 1 {
            let l = cl[i];
            if self.value_lit(l) != lbool::FALSE {
                i += 1;
                continue;
            }
            if self.level_lit(l) == 0 {
                if self.forbid_units.has(!l) {
                    is_sym = true;
                    break;
                }
                cl.swap_remove(i);
            } else if self.reason(l.var()) != CRef::UNDEF {
                let mut all_seen = true;
                let mut remove_is_sym = false;
                {
                    let c = self.ca.get_ref(self.reason(l.var()));
                    for &x in c.lits() {
                        if self.forbid_units.has(!x) {
                            is_sym = true;
                            break;
                        }
                        if self.level_lit(x) != 0 && self.seen[x.var()] == Seen::UNDEF {
                            all_seen = false;
                            break;
                        }
                    }
                    if !is_sym && all_seen && c.symmetry() {
                        remove_is_sym = true;
                    }
                }
                if is_sym || remove_is_sym {
                    is_sym = true;
                    break;
                }
                if all_seen {
                    cl.swap_remove(i);
                } else {
                    i += 1;
                }
            } else {
                i += 1;
            }
        }

        for &l in copy.iter() {
            self.seen[l.var()] = Seen::UNDEF;
        }
        if is_sym {
            cl.clear();
            cl.extend_from_slice(&copy);
        }
    }

    /// Analyze a conflict and produce a reason clause in `out_learnt`.
    ///
    /// # Pre-conditions
    ///
    /// - current decision level is greater than the root level.
    ///
    /// # Post-conditions
    ///
    /// - `out_learnt[0]` is the asserting literal at the returned
    ///   backtrack level;
    /// - if `out_learnt.len() > 1` then `out_learnt[1]` has the greatest
    ///   decision level of the remaining literals;
    /// - when the conflict involved symmetry, the returned compatible set
    ///   is the intersection of the compatible sets of the symmetric
    ///   reasons, filtered by the forbid units met during resolution and
    ///   augmented with the stabilizer of the learnt clause.
    fn analyze(&mut self, orig: CRef, out_learnt: &mut Vec<Lit>) -> AnalyzeOut {
        out_learnt.clear();
        debug!("analyze.start {:?}", orig);

        let mut path_c: i32 = 0;
        let mut p = Lit::UNDEF;
        let mut confl = orig;

        let mut out_sym = false;
        let mut compat_acc: Option<GenSet> = None;
        let mut units: Vec<Lit> = vec![];

        out_learnt.push(Lit::UNDEF); // leave room for the asserting literal
        let mut index = self.vars.trail.len();
        let conflict_level = self.decision_level() as i32;

        loop {
            debug_assert_ne!(confl, CRef::UNDEF); // (otherwise should be UIP)

            if self.ca.get_ref(confl).learnt() {
                self.cla_bump_activity(confl);
            }

            {
                let c = self.ca.get_ref(confl);
                if c.symmetry() {
                    out_sym = true;
                    let set = c.compat().expect("symmetry clause without compat");
                    match &mut compat_acc {
                        None => compat_acc = Some(set.clone()),
                        Some(acc) => acc.intersect_with(set),
                    }
                }
            }

            let start = if p == Lit::UNDEF { 0 } else { 1 };
            {
                let lits = self.ca.get_ref(confl).lits();
                for j in start..lits.len() {
                    let q = lits[j];

                    if self.vars.level(q.var()) == 0 && self.forbid_units.has(!q) {
                        if !units.contains(&q) {
                            units.push(q);
                        }
                        out_sym = true;
                    }

                    if self.seen[q.var()] == Seen::UNDEF && self.vars.level(q.var()) > 0 {
                        self.vars
                            .var_bump_activity(&mut self.order_heap_data, q.var());
                        self.seen[q.var()] = Seen::SOURCE;
                        if self.vars.level(q.var()) >= conflict_level {
                            path_c += 1;
                        } else {
                            out_learnt.push(q);
                        }
                    }
                }
            }

            // Select next clause to look at:
            while self.seen[self.vars.trail[index - 1].var()] == Seen::UNDEF {
                index -= 1;
            }
            p = self.vars.trail[index - 1];
            index -= 1;
            confl = self.vars.reason(p.var());
            self.seen[p.var()] = Seen::UNDEF;
            path_c -= 1;

            if path_c <= 0 {
                break;
            }
        }
        out_learnt[0] = !p;

        // Simplify conflict clause:
        self.analyze_toclear.clear();
        self.analyze_toclear.extend_from_slice(&out_learnt);
        self.max_literals += out_learnt.len() as u64;
        self.minimize_conflict(out_learnt);
        self.tot_literals += out_learnt.len() as u64;

        // Find correct backtrack level:
        let btlevel = if out_learnt.len() == 1 {
            0
        } else {
            let mut max_i = 1;
            // Find the first literal assigned at the next-highest level:
            for i in 2..out_learnt.len() {
                if self.level_lit(out_learnt[i]) > self.level_lit(out_learnt[max_i]) {
                    max_i = i;
                }
            }
            // Swap-in this literal at index 1:
            out_learnt.swap(max_i, 1);
            self.level_lit(out_learnt[1])
        };

        for idx in 0..self.analyze_toclear.len() {
            let l = self.analyze_toclear[idx];
            self.seen[l.var()] = Seen::UNDEF; // (`seen[]` is now cleared)
        }

        let compat = if out_sym {
            let mut comp = compat_acc.unwrap_or_default();
            // drop every generator whose image of a met forbid unit is not
            // the same top-level fact
            if !units.is_empty() {
                let generators = &self.generators;
                let vars = &self.vars;
                comp.retain(|g| {
                    units.iter().all(|&u| {
                        let im = generators[g.idx()].image(u);
                        vars.value_lit(im) == vars.value_lit(u) && vars.level(im.var()) == 0
                    })
                });
            }
            // augment with the stabilizer of the learnt clause
            for i in 0..self.generators.len() {
                let gi = GenIdx::new(i);
                if !comp.contains(gi) && self.generators[i].stabilizes(out_learnt) {
                    comp.insert(gi);
                }
            }
            comp
        } else {
            GenSet::new()
        };

        AnalyzeOut {
            backtrack_lvl: btlevel,
            sym: out_sym,
            compat,
        }
    }

    fn minimize_conflict(&mut self, out_learnt: &mut Vec<Lit>) {
        let new_size = if self.ccmin_mode == 2 {
            let mut j = 1;
            for i in 1..out_learnt.len() {
                let lit = out_learnt[i];
                if self.reason(lit.var()) == CRef::UNDEF || !self.lit_redundant(lit) {
                    out_learnt[j] = lit;
                    j += 1;
                }
            }
            j
        } else if self.ccmin_mode == 1 {
            let mut j = 1;
            for i in 1..out_learnt.len() {
                let lit = out_learnt[i];
                let x = lit.var();
                let reason = self.reason(x);

                let retain = if reason == CRef::UNDEF {
                    true
                } else {
                    let c = self.ca.get_ref(reason);
                    let mut retain = false;
                    for k in 1..c.size() {
                        let v = c[k].var();
                        if self.seen[v] == Seen::UNDEF && self.vars.level(v) > 0 {
                            retain = true;
                            break;
                        }
                    }
                    retain
                };
                if retain {
                    out_learnt[j] = lit;
                    j += 1;
                }
            }
            j
        } else {
            out_learnt.len()
        };

        debug_assert!(new_size <= out_learnt.len());
        out_learnt.truncate(new_size);
    }

    /// Check if `p` can be removed from the conflict clause: every
    /// non-level-0 parent in its reason chain is seen or itself removable,
    /// and no step of the chain depends on symmetry (a symmetric reason or
    /// the complement of a forbid unit taints the removal).
    fn lit_redundant(&mut self, mut p: Lit) -> bool {
        debug_assert!(
            self.seen[p.var()] == Seen::UNDEF || self.seen[p.var()] == Seen::SOURCE
        );
        debug_assert_ne!(self.reason(p.var()), CRef::UNDEF);

        self.analyze_stack.clear();
        let mut cr = self.reason(p.var());
        let mut is_sym = self.ca.get_ref(cr).symmetry();
        let mut i: u32 = 1;

        loop {
            if i < self.ca.get_ref(cr).size() {
                // checking `p`-parent `l`
                let l = self.ca.get_ref(cr).lits()[i as usize];

                if self.forbid_units.has(!l) {
                    is_sym = true;
                }

                // variable at level 0 or previously removable: skip
                if self.level(l.var()) == 0
                    || self.seen[l.var()] == Seen::SOURCE
                    || self.seen[l.var()] == Seen::REMOVABLE
                {
                    i += 1;
                    continue;
                }

                // the variable can not be removed for some local reason
                if self.reason(l.var()) == CRef::UNDEF || self.seen[l.var()] == Seen::FAILED {
                    self.analyze_stack.push((0, p));
                    for k in 0..self.analyze_stack.len() {
                        let q = self.analyze_stack[k].1;
                        if self.seen[q.var()] == Seen::UNDEF {
                            self.seen[q.var()] = Seen::FAILED;
                            self.analyze_toclear.push(q);
                        }
                    }
                    return false;
                }

                // recursively check `l`
                self.analyze_stack.push((i, p));
                i = 1;
                p = l;
                cr = self.reason(p.var());
                if self.ca.get_ref(cr).symmetry() {
                    is_sym = true;
                }
            } else {
                // finished with current element `p` and reason `cr`
                if self.seen[p.var()] == Seen::UNDEF {
                    self.seen[p.var()] = Seen::REMOVABLE;
                    self.analyze_toclear.push(p);
                }

                match self.analyze_stack.pop() {
                    None => break,
                    Some((ni, np)) => {
                        // continue with top element on stack
                        i = ni + 1;
                        p = np;
                        cr = self.reason(p.var());
                        if self.ca.get_ref(cr).symmetry() {
                            is_sym = true;
                        }
                    }
                }
            }
        }

        !is_sym
    }

    /// Specialized analysis to express the final conflict in terms of the
    /// assumptions that led to the assignment of `p`.
    fn analyze_final(&mut self, p: Lit, out_conflict: &mut LSet) {
        out_conflict.clear();
        out_conflict.insert(p);
        debug!("analyze_final lit={:?}", p);

        if self.decision_level() == 0 {
            return; // no assumptions
        }

        self.seen[p.var()] = Seen::SOURCE;

        let start = self.vars.trail_lim[0] as usize;
        for i in (start..self.vars.trail.len()).rev() {
            let lit = self.vars.trail[i];
            let x = lit.var();
            if self.seen[x] != Seen::UNDEF {
                let reason = self.reason(x);
                if reason == CRef::UNDEF {
                    debug_assert!(self.level(x) > 0);
                    out_conflict.insert(!lit);
                } else {
                    let c = self.ca.get_ref(reason);
                    for j in 1..c.size() as usize {
                        let v = c.lits()[j].var();
                        if self.vars.level(v) > 0 {
                            self.seen[v] = Seen::SOURCE;
                        }
                    }
                }
                self.seen[x] = Seen::UNDEF;
            }
        }

        self.seen[p.var()] = Seen::UNDEF;
    }

    fn rebuild_order_heap(&mut self) {
        let mut vs = vec![];
        for v in (0..self.num_vars()).map(Var::from_idx) {
            if self.decision[v] && self.value(v) == lbool::UNDEF {
                vs.push(v);
            }
        }
        self.order_heap().build(&vs);
    }

    /// Pick a literal to make a decision with, using activity and the
    /// saved (or user-forced, or random) polarity.
    fn pick_branch_lit(&mut self) -> Lit {
        let mut next = Var::UNDEF;

        // Random decision:
        if utils::drand(&mut self.random_seed) < self.random_var_freq
            && !self.order_heap_data.is_empty()
        {
            let idx_tmp =
                utils::irand(&mut self.random_seed, self.order_heap_data.len() as i32) as usize;
            next = self.order_heap_data[idx_tmp];
            if self.value(next) == lbool::UNDEF && self.decision[next] {
                self.rnd_decisions += 1;
            }
        }

        // Activity based decision:
        while next == Var::UNDEF || self.value(next) != lbool::UNDEF || !self.decision[next] {
            let mut order_heap = self.order_heap();
            if order_heap.is_empty() {
                next = Var::UNDEF;
                break;
            } else {
                next = order_heap.remove_min();
            }
        }

        if next == Var::UNDEF {
            Lit::UNDEF
        } else if self.user_pol[next] != lbool::UNDEF {
            Lit::new(next, self.user_pol[next] == lbool::TRUE)
        } else if self.rnd_pol {
            Lit::new(next, utils::drand(&mut self.random_seed) < 0.5)
        } else {
            Lit::new(next, self.polarity[next])
        }
    }

    /// Revert to the state at the given level (keeping all assignments at
    /// `level` but not beyond). All queue heads are cut back to the level
    /// boundary; at level 0 the selector store is discarded entirely.
    fn cancel_until<O: SymmetryOracle>(&mut self, oracle: &mut O, level: u32) {
        if self.decision_level() <= level {
            return;
        }
        trace!("cancel-until {}", level);
        let trail_lim_last = *self.vars.trail_lim.last().expect("trail_lim is empty") as usize;
        let trail_lim_level = self.vars.trail_lim[level as usize] as usize;
        for c in (trail_lim_level..self.vars.trail.len()).rev() {
            let p = self.vars.trail[c];
            let x = p.var();
            self.vars.ass[x] = lbool::UNDEF;
            oracle.update_cancel(p);
            if self.phase_saving > 1 || (self.phase_saving == 1 && c > trail_lim_last) {
                self.polarity[x] = p.sign();
            }
            self.insert_var_order(x);
        }
        self.qhead = trail_lim_level as i32;
        self.qhead_sel = trail_lim_level as i32;
        self.qhead_gen = trail_lim_level as i32;
        self.watchidx = 0;
        self.vars.trail.truncate(trail_lim_level);
        self.vars.trail_lim.truncate(level as usize);

        if level == 0 {
            // selector clauses are cheap to regenerate and reference
            // assignments that are gone
            self.sel.clear_all();
        } else {
            while self
                .sel
                .prop
                .last()
                .map_or(false, |&v| self.vars.level(v) > level as i32)
            {
                self.sel.prop.pop();
            }
            self.sel.gen.truncate(self.sel.prop.len());
            self.sel.idx.truncate(self.sel.prop.len() + 1);
            debug_assert!(!self.sel.idx.is_empty());
            let last = *self.sel.idx.last().unwrap() as usize;
            self.sel.lits.truncate(last);
        }
    }

    /// Attach a clause to the watcher lists.
    fn attach_clause(&mut self, cr: CRef) {
        let (c0, c1, learnt, size) = {
            let c = self.ca.get_ref(cr);
            debug_assert!(c.size() > 1);
            (c[0], c[1], c.learnt(), c.size())
        };
        self.watches()[!c0].push(Watcher::new(cr, c1));
        self.watches()[!c1].push(Watcher::new(cr, c0));
        if learnt {
            self.num_learnts += 1;
            self.learnts_literals += size as u64;
        } else {
            self.num_clauses += 1;
            self.clauses_literals += size as u64;
        }
    }

    /// Detach a clause from the watcher lists; `strict` removes eagerly
    /// instead of marking the lists dirty.
    fn detach_clause(&mut self, cr: CRef, strict: bool) {
        let (c0, c1, csize, clearnt) = {
            let c = self.ca.get_ref(cr);
            (c[0], c[1], c.size(), c.learnt())
        };
        debug_assert!(csize > 1);

        let mut watches = self.watches_data.promote(WatcherDeleted { ca: &self.ca });

        if strict {
            let pos = watches[!c0]
                .iter()
                .position(|x| x == &Watcher::new(cr, c1))
                .expect("watcher not found");
            watches[!c0].remove(pos);
            let pos = watches[!c1]
                .iter()
                .position(|x| x == &Watcher::new(cr, c0))
                .expect("watcher not found");
            watches[!c1].remove(pos);
        } else {
            watches.smudge(!c0);
            watches.smudge(!c1);
        }

        if clearnt {
            self.num_learnts -= 1;
            self.learnts_literals -= csize as u64;
        } else {
            self.num_clauses -= 1;
            self.clauses_literals -= csize as u64;
        }
    }

    /// Detach and free a clause.
    fn remove_clause(&mut self, cr: CRef) {
        self.detach_clause(cr, false);
        {
            let c = self.ca.get_ref(cr);
            // Don't leave pointers to free'd memory!
            if self.locked(c) {
                self.vars.vardata[c[0].var()].reason = CRef::UNDEF;
            }
        }
        self.ca.get_mut(cr).set_mark(1); // used in reloc
        self.ca.free(cr);
    }

    fn satisfied(&self, c: ClauseRef) -> bool {
        c.iter().any(|&lit| self.value_lit(lit) == lbool::TRUE)
    }

    /// Is the clause a reason for some implication in the current state?
    fn locked(&self, c: ClauseRef) -> bool {
        let reason = self.reason(c[0].var());
        self.value_lit(c[0]) == lbool::TRUE
            && reason != CRef::UNDEF
            && self.ca.get_ref(reason) == c
    }

    /// Shrink the given set to contain only non-satisfied clauses, and trim
    /// false level-0 literals from the survivors.
    fn remove_satisfied_from(&mut self, which: ClauseSetSelect) {
        debug_assert_eq!(self.decision_level(), 0);
        let mut cs = mem::take(match which {
            ClauseSetSelect::Learnt => &mut self.learnts,
            ClauseSetSelect::Original => &mut self.clauses,
        });
        cs.retain(|&cr| {
            let satisfied = self.satisfied(self.ca.get_ref(cr));
            if satisfied {
                self.remove_clause(cr);
            } else {
                let amount_shaved = {
                    let mut c = self.ca.get_mut(cr);
                    // Trim clause (the 2 first lits stay: they are watched):
                    debug_assert_eq!(self.vars.value_lit(c[0]), lbool::UNDEF);
                    debug_assert_eq!(self.vars.value_lit(c[1]), lbool::UNDEF);
                    let mut k = 2;
                    let orig_size = c.size();
                    let mut end = c.size();
                    while k < end {
                        if self.vars.value_lit(c[k]) == lbool::FALSE {
                            debug_assert_eq!(self.vars.level(c[k].var()), 0);
                            end -= 1;
                            let tmp = c[end];
                            c[k] = tmp;
                        } else {
                            k += 1;
                        }
                    }
                    c.shrink(end);
                    orig_size - end
                };
                self.ca.free_amount(amount_shaved as usize);
            }
            !satisfied
        });
        match which {
            ClauseSetSelect::Learnt => self.learnts = cs,
            ClauseSetSelect::Original => self.clauses = cs,
        }
    }

    /// Compact released variables out of the level-0 trail and hand them to
    /// the free list for reuse.
    fn recycle_released_vars(&mut self) {
        if self.released_vars.is_empty() {
            return;
        }
        for idx in 0..self.released_vars.len() {
            let v = self.released_vars[idx];
            debug_assert_eq!(self.seen[v], Seen::UNDEF);
            self.seen[v] = Seen::SOURCE;
        }

        let mut j = 0;
        for i in 0..self.vars.trail.len() {
            let l = self.vars.trail[i];
            if self.seen[l.var()] == Seen::UNDEF {
                self.vars.trail[j] = l;
                j += 1;
            }
        }
        self.vars.trail.truncate(j);
        self.qhead = j as i32;
        self.qhead_sel = j as i32;
        self.qhead_gen = j as i32;

        for idx in 0..self.released_vars.len() {
            let v = self.released_vars[idx];
            self.seen[v] = Seen::UNDEF;
        }

        let mut released = mem::take(&mut self.released_vars);
        self.free_vars.append(&mut released);
    }

    fn cla_decay_activity(&mut self) {
        self.cla_inc *= 1.0 / self.clause_decay;
    }

    fn cla_bump_activity(&mut self, cr: CRef) {
        let new_activity = {
            let mut c = self.ca.get_mut(cr);
            let r = c.activity() + self.cla_inc as f32;
            c.set_activity(r);
            r
        };
        if new_activity > 1e20 {
            // Rescale:
            for i in 0..self.learnts.len() {
                let learnt = self.learnts[i];
                let mut c = self.ca.get_mut(learnt);
                let r = c.activity() * 1e-20;
                c.set_activity(r);
            }
            self.cla_inc *= 1e-20;
        }
    }

    fn progress_estimate(&self) -> f64 {
        let mut progress = 0.0;
        let f = 1.0 / self.num_vars() as f64;

        for i in 0..self.decision_level() + 1 {
            let beg: i32 = if i == 0 {
                0
            } else {
                self.vars.trail_lim[i as usize - 1]
            };
            let end: i32 = if i == self.decision_level() {
                self.vars.trail.len() as i32
            } else {
                self.vars.trail_lim[i as usize]
            };
            progress += f64::powi(f, i as i32) * (end - beg) as f64;
        }

        progress / self.num_vars() as f64
    }

    /// Move all live clauses to the given arena, rewriting every handle
    /// stored in watchers, reasons and the clause vectors.
    fn reloc_all(&mut self, to: &mut ClauseAllocator) {
        macro_rules! is_removed {
            ($ca:expr, $cr:expr) => {
                $ca.get_ref($cr).mark() == 1
            };
        }
        // All watchers:
        self.watches().clean_all();
        for v in (0..self.num_vars()).map(Var::from_idx) {
            for s in 0..2 {
                let p = Lit::new(v, s != 0);
                for watch in &mut self.watches_data[p] {
                    self.ca.reloc(&mut watch.cref, to);
                }
            }
        }

        // All reasons:
        for i in 0..self.vars.trail.len() {
            let v = self.vars.trail[i].var();

            // Note: it is not safe to call `locked()` on a relocated
            // clause, so we keep dangling reasons. They are never looked
            // at again.
            let reason = self.vars.reason(v);
            if reason != CRef::UNDEF {
                let keep = {
                    let c = self.ca.get_ref(reason);
                    c.reloced() || self.locked(c)
                };
                if keep {
                    debug_assert!(!is_removed!(self.ca, reason));
                    self.ca.reloc(&mut self.vars.vardata[v].reason, to);
                }
            }
        }

        // All learnt:
        {
            let mut j = 0;
            for i in 0..self.learnts.len() {
                let mut cr = self.learnts[i];
                if !is_removed!(self.ca, cr) {
                    self.ca.reloc(&mut cr, to);
                    self.learnts[j] = cr;
                    j += 1;
                }
            }
            self.learnts.truncate(j);
        }

        // All original:
        {
            let mut j = 0;
            for i in 0..self.clauses.len() {
                let mut cr = self.clauses[i];
                if !is_removed!(self.ca, cr) {
                    self.ca.reloc(&mut cr, to);
                    self.clauses[j] = cr;
                    j += 1;
                }
            }
            self.clauses.truncate(j);
        }
    }

    fn new(opts: &SolverOpts) -> Self {
        Self {
            vars: VarState::new(opts),
            clauses: vec![],
            learnts: vec![],
            ca: ClauseAllocator::new(),
            watches_data: OccListsData::new(),
            order_heap_data: HeapData::new(),
            polarity: VMap::new(),
            user_pol: VMap::new(),
            decision: VMap::new(),
            ok: true,
            cla_inc: 1.0,
            qhead: 0,
            qhead_sel: 0,
            qhead_gen: 0,
            watchidx: 0,
            simp_db_assigns: -1,
            simp_db_props: 0,
            progress_estimate: 0.0,
            remove_satisfied: true,
            next_var: Var::from_idx(0),
            free_vars: vec![],
            released_vars: vec![],
            assumptions: vec![],

            generators: vec![],
            gen_watches: vec![],
            gen_watch_idx: vec![],
            sel: SelStore::new(),
            forbid_units: LSet::new(),

            seen: VMap::new(),
            analyze_stack: vec![],
            analyze_toclear: vec![],
            tmp_sym: vec![],
            tmp_inject: vec![],

            conflict_budget: -1,
            propagation_budget: -1,

            clause_decay: opts.clause_decay,
            random_var_freq: opts.random_var_freq,
            random_seed: opts.random_seed,
            luby_restart: opts.luby_restart,
            ccmin_mode: opts.ccmin_mode,
            phase_saving: opts.phase_saving,
            rnd_pol: false,
            rnd_init_act: opts.rnd_init_act,
            garbage_frac: opts.garbage_frac,
            min_learnts_lim: opts.min_learnts_lim,
            restart_first: opts.restart_first,
            restart_inc: opts.restart_inc,
            learntsize_factor: 1.0 / 3.0,
            learntsize_inc: 1.1,
            learntsize_adjust_start_confl: 100,
            learntsize_adjust_inc: 1.5,
            max_learnts: 0.0,
            learntsize_adjust_confl: 0.0,
            learntsize_adjust_cnt: 0,
            stop_prop: opts.stop_prop,
            reduce_db_on: opts.reduce_db,
            sym_minimize: opts.sym_clause_minimize,

            solves: 0,
            starts: 0,
            decisions: 0,
            rnd_decisions: 0,
            propagations: 0,
            conflicts: 0,
            dec_vars: 0,
            max_literals: 0,
            tot_literals: 0,
            num_clauses: 0,
            num_learnts: 0,
            clauses_literals: 0,
            learnts_literals: 0,
            sym_gen_props: 0,
            sym_gen_confls: 0,
            sym_sel_props: 0,
            sym_sel_confls: 0,
            sym_injected: 0,
        }
    }
}

impl VarState {
    fn new(opts: &SolverOpts) -> Self {
        Self {
            ass: VMap::new(),
            vardata: VMap::new(),
            activity: VMap::new(),
            var_inc: 1.0,
            var_decay: opts.var_decay,
            trail: vec![],
            trail_lim: vec![],
        }
    }

    #[inline(always)]
    fn num_assigns(&self) -> u32 {
        self.trail.len() as u32
    }

    fn new_decision_level(&mut self) {
        let lvl = self.trail.len() as i32;
        self.trail_lim.push(lvl);
    }

    fn proved_at_lvl_0(&self) -> &[Lit] {
        // find the end of the level-0 part of the trail
        let end = self
            .trail_lim
            .get(0)
            .map_or(self.trail.len(), |&x| x as usize);
        &self.trail[..end]
    }

    #[inline(always)]
    fn value(&self, x: Var) -> lbool {
        self.ass[x]
    }

    #[inline(always)]
    fn value_lit(&self, x: Lit) -> lbool {
        self.ass[x.var()] ^ !x.sign()
    }

    #[inline(always)]
    fn level(&self, x: Var) -> i32 {
        self.vardata[x].level
    }

    #[inline(always)]
    fn reason(&self, x: Var) -> CRef {
        self.vardata[x].reason
    }

    fn var_decay_activity(&mut self) {
        self.var_inc *= 1.0 / self.var_decay;
    }

    #[inline(always)]
    fn decision_level(&self) -> u32 {
        self.trail_lim.len() as u32
    }

    fn unchecked_enqueue(&mut self, p: Lit, from: CRef) {
        debug_assert_eq!(
            self.value_lit(p),
            lbool::UNDEF,
            "lit {:?} should be undef",
            p
        );
        self.ass[p.var()] = lbool::new(p.sign());
        self.vardata[p.var()] = VarData::new(from, self.decision_level() as i32);
        self.trail.push(p);
    }

    /// Increase a variable with the current 'bump' value.
    fn var_bump_activity(&mut self, order_heap_data: &mut HeapData<Var>, v: Var) {
        self.activity[v] += self.var_inc;
        if self.activity[v] > 1e100 {
            // Rescale:
            for (_, x) in self.activity.iter_mut() {
                *x *= 1e-100;
            }
            self.var_inc *= 1e-100;
        }

        // Update order_heap with respect to new activity:
        let mut order_heap = order_heap_data.promote(VarOrder {
            activity: &self.activity,
        });
        if order_heap.in_heap(v) {
            order_heap.decrease(v);
        }
    }
}

#[derive(Debug)]
enum ClauseSetSelect {
    Original,
    Learnt,
}

#[derive(Debug, Clone, Copy)]
struct VarData {
    reason: CRef,
    level: i32,
}

impl Default for VarData {
    fn default() -> Self {
        Self {
            reason: CRef::UNDEF,
            level: 0,
        }
    }
}

impl VarData {
    #[inline(always)]
    fn new(reason: CRef, level: i32) -> Self {
        Self { reason, level }
    }
}

#[derive(Debug, Clone, Copy)]
struct Watcher {
    cref: CRef,
    blocker: Lit,
}

impl PartialEq for Watcher {
    #[inline(always)]
    fn eq(&self, rhs: &Self) -> bool {
        self.cref == rhs.cref
    }
}
impl Eq for Watcher {}

impl Watcher {
    fn new(cref: CRef, blocker: Lit) -> Self {
        Self { cref, blocker }
    }
}

/// Trail push shared by `SolverV::enqueue` and the propagation loop (which
/// cannot take `&mut self` while a watch list is borrowed). At the top
/// level, a symmetric reason, or a reason containing the complement of a
/// forbid unit, makes the enqueued literal a forbid unit itself.
fn enqueue_fields(
    vars: &mut VarState,
    ca: &ClauseAllocator,
    forbid_units: &mut LSet,
    p: Lit,
    from: CRef,
) {
    vars.unchecked_enqueue(p, from);
    if vars.decision_level() == 0 && from != CRef::UNDEF {
        let tainted = {
            let c = ca.get_ref(from);
            c.symmetry() || c.lits().iter().any(|&l| forbid_units.has(!l))
        };
        if tainted {
            forbid_units.insert(p);
        }
    }
}

struct VarOrder<'a> {
    activity: &'a VMap<f64>,
}

impl<'a> Comparator<Var> for VarOrder<'a> {
    fn cmp(&self, lhs: &Var, rhs: &Var) -> cmp::Ordering {
        PartialOrd::partial_cmp(&self.activity[*rhs], &self.activity[*lhs]).expect("NaN activity")
    }
}

/// Predicate to test whether a clause has been removed from some watchlist.
struct WatcherDeleted<'a> {
    ca: &'a ClauseAllocator,
}

impl<'a> DeletePred<Watcher> for WatcherDeleted<'a> {
    #[inline]
    fn deleted(&self, w: &Watcher) -> bool {
        self.ca.get_ref(w.cref).mark() == 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
enum Seen {
    UNDEF,
    SOURCE,
    REMOVABLE,
    FAILED,
}

impl Default for Seen {
    #[inline]
    fn default() -> Self {
        Seen::UNDEF
    }
}

mod utils {
    /// Finite subsequences of the Luby-sequence:
    ///
    /// > 0: 1
    /// > 1: 1 1 2
    /// > 2: 1 1 2 1 1 2 4
    /// > 3: 1 1 2 1 1 2 4 1 1 2 1 1 2 4 8
    /// ...
    pub(super) fn luby(y: f64, mut x: i32) -> f64 {
        // Find the finite subsequence that contains index 'x', and the
        // size of that subsequence:
        let mut size = 1;
        let mut seq = 0;
        while size < x + 1 {
            seq += 1;
            size = 2 * size + 1;
        }

        while size - 1 != x {
            size = (size - 1) >> 1;
            seq -= 1;
            x = x % size;
        }

        f64::powi(y, seq)
    }

    /// Generate a random double:
    pub(super) fn drand(seed: &mut f64) -> f64 {
        *seed *= 1389796.0;
        let q = (*seed / 2147483647.0) as i32;
        *seed -= q as f64 * 2147483647.0;
        *seed / 2147483647.0
    }

    /// Generate a random integer:
    pub(super) fn irand(seed: &mut f64, size: i32) -> i32 {
        (drand(seed) * size as f64) as i32
    }
}

pub struct SolverOpts {
    pub var_decay: f64,
    pub clause_decay: f64,
    pub random_var_freq: f64,
    pub random_seed: f64,
    pub ccmin_mode: i32,
    pub phase_saving: i32,
    pub rnd_init_act: bool,
    pub luby_restart: bool,
    pub restart_first: i32,
    pub restart_inc: f64,
    pub garbage_frac: f64,
    pub min_learnts_lim: i32,
    /// Return a falsified injected ESBP as the conflict immediately.
    pub stop_prop: bool,
    /// Cull the learnt database; off preserves every learnt clause.
    pub reduce_db: bool,
    /// Self-subsumption minimization of materialized symmetric clauses.
    pub sym_clause_minimize: bool,
}

impl Default for SolverOpts {
    fn default() -> SolverOpts {
        Self {
            var_decay: 0.95,
            clause_decay: 0.999,
            random_var_freq: 0.0,
            random_seed: 91648253.0,
            ccmin_mode: 2,
            phase_saving: 2,
            rnd_init_act: false,
            luby_restart: true,
            restart_first: 100,
            restart_inc: 2.0,
            garbage_frac: 0.20,
            min_learnts_lim: 0,
            stop_prop: false,
            reduce_db: false,
            sym_clause_minimize: false,
        }
    }
}

impl SolverOpts {
    /// Check that options are valid.
    pub fn check(&self) -> bool {
        (0.0 < self.var_decay && self.var_decay < 1.0)
            && (0.0 < self.clause_decay && self.clause_decay < 1.0)
            && (0.0 <= self.random_var_freq && self.random_var_freq <= 1.0)
            && (0.0 < self.random_seed && self.random_seed < f64::INFINITY)
            && (0 <= self.ccmin_mode && self.ccmin_mode <= 2)
            && (0 <= self.phase_saving && self.phase_saving <= 2)
            && 1 <= self.restart_first
            && (1.0 < self.restart_inc && self.restart_inc < f64::INFINITY)
            && (0.0 < self.garbage_frac && self.garbage_frac < f64::INFINITY)
            && 0 <= self.min_learnts_lim
    }
}
