//! Symmetry generators and the oracle interface of the symmetry engine.
//!
//! A generator is a permutation of literals that maps the clause set to
//! itself and respects complement: `image(¬l) = ¬image(l)`. Generators are
//! owned by the solver and referenced by stable index (`GenIdx`); clauses
//! derived through symmetry own a `GenSet` of the generators that may still
//! be composed with them.

use crate::clause::{Lit, Var};
use crate::intmap::AsIndex;
use std::fmt;

/// Index of a generator in the solver's generator table.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GenIdx(u32);

impl GenIdx {
    pub fn new(idx: usize) -> Self {
        GenIdx(idx as u32)
    }
    #[inline(always)]
    pub fn idx(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for GenIdx {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "g{}", self.0)
    }
}

impl AsIndex for GenIdx {
    fn as_index(self) -> usize {
        self.0 as usize
    }
    fn from_index(index: usize) -> Self {
        GenIdx(index as u32)
    }
}

/// Sorted set of generator indices. Small and short-lived; compatible sets
/// are intersected during conflict analysis and cloned onto learnt clauses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenSet {
    xs: Vec<GenIdx>,
}

impl GenSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.xs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    pub fn contains(&self, g: GenIdx) -> bool {
        self.xs.binary_search(&g).is_ok()
    }

    pub fn insert(&mut self, g: GenIdx) {
        if let Err(pos) = self.xs.binary_search(&g) {
            self.xs.insert(pos, g);
        }
    }

    /// Keep only the elements also present in `other`.
    pub fn intersect_with(&mut self, other: &GenSet) {
        self.xs.retain(|&g| other.contains(g));
    }

    pub fn retain<F: FnMut(GenIdx) -> bool>(&mut self, mut f: F) {
        self.xs.retain(|&g| f(g));
    }

    pub fn iter(&self) -> impl Iterator<Item = GenIdx> + '_ {
        self.xs.iter().copied()
    }
}

/// A permutation of literals, stored as a dense image table over both
/// polarities. Construction enforces complement closure.
#[derive(Debug, Clone)]
pub struct SymGenerator {
    image: Vec<Lit>,
    support: Vec<Var>,
}

impl SymGenerator {
    /// Identity permutation over `num_vars` variables.
    fn identity(num_vars: u32) -> Self {
        let image = (0..2 * num_vars).map(Lit::from_idx).collect();
        SymGenerator {
            image,
            support: vec![],
        }
    }

    /// Build a generator from disjoint cycles of literals.
    ///
    /// Every cycle `(l0 l1 … lk)` maps `l0 → l1`, …, `lk → l0`; the
    /// complementary cycle is applied implicitly so the permutation
    /// respects complement.
    pub fn from_cycles(num_vars: u32, cycles: &[Vec<Lit>]) -> Self {
        let mut g = Self::identity(num_vars);
        for cycle in cycles {
            for i in 0..cycle.len() {
                let from = cycle[i];
                let to = cycle[(i + 1) % cycle.len()];
                debug_assert!(from.var().idx() < num_vars && to.var().idx() < num_vars);
                g.image[from.idx() as usize] = to;
                g.image[(!from).idx() as usize] = !to;
            }
        }
        g.rebuild_support();
        g
    }

    /// Build a generator from the images of the positive literal of every
    /// variable (Bliss/Saucy mapping form).
    pub fn from_images(num_vars: u32, images: &[Lit]) -> Self {
        debug_assert_eq!(images.len(), num_vars as usize);
        let mut g = Self::identity(num_vars);
        for (v, &to) in images.iter().enumerate() {
            let from = Lit::new(Var::from_idx(v as u32), true);
            g.image[from.idx() as usize] = to;
            g.image[(!from).idx() as usize] = !to;
        }
        g.rebuild_support();
        g
    }

    fn rebuild_support(&mut self) {
        self.support.clear();
        for v in 0..(self.image.len() / 2) as u32 {
            let p = Lit::new(Var::from_idx(v), true);
            if self.image[p.idx() as usize] != p {
                self.support.push(Var::from_idx(v));
            }
        }
    }

    /// Is `l` moved by this generator?
    #[inline]
    pub fn permutes(&self, l: Lit) -> bool {
        self.image(l) != l
    }

    /// Image of `l`. Variables created after the generator was built are
    /// fixpoints.
    #[inline]
    pub fn image(&self, l: Lit) -> Lit {
        self.image.get(l.idx() as usize).copied().unwrap_or(l)
    }

    /// Variables moved by this generator (either polarity).
    pub fn support(&self) -> &[Var] {
        &self.support
    }

    /// Apply the permutation to every literal of `c`, into `out`.
    pub fn symmetric_clause(&self, c: &[Lit], out: &mut Vec<Lit>) {
        out.clear();
        out.extend(c.iter().map(|&l| self.image(l)));
    }

    /// Is `c` fixed setwise by this generator?
    pub fn stabilizes(&self, c: &[Lit]) -> bool {
        self.image_is_permutation_of(c)
    }

    fn image_is_permutation_of(&self, c: &[Lit]) -> bool {
        let mut orig: Vec<Lit> = c.to_vec();
        let mut img: Vec<Lit> = c.iter().map(|&l| self.image(l)).collect();
        orig.sort_unstable();
        img.sort_unstable();
        orig == img
    }
}

/// ESBP injector consulted by the propagator on every dequeued literal.
///
/// The oracle mirrors the trail through `update_notify`/`update_cancel` and
/// may answer `clause_to_inject` with an effective symmetric Boolean
/// propagator: a clause that is a symmetric consequence of the formula,
/// falsified or propagating under the current assignment, with at least two
/// literals. Unit symmetric facts are delivered up front via
/// `initial_units` instead.
pub trait SymmetryOracle {
    /// `p` was pushed on the trail.
    fn update_notify(&mut self, p: Lit);

    /// `p` was removed from the trail on backtrack.
    fn update_cancel(&mut self, p: Lit);

    /// Candidate symmetric clause triggered by the assignment of `p`.
    /// Returns `true` and fills `out` when there is one.
    fn clause_to_inject(&mut self, p: Lit, out: &mut Vec<Lit>) -> bool;

    /// Unit literals (symmetric consequences) to assert at the start of the
    /// search. They become forbid units.
    fn initial_units(&mut self, out: &mut Vec<Lit>) {
        let _ = out;
    }
}

/// Oracle that never injects anything.
pub struct NoSymmetry;

impl SymmetryOracle for NoSymmetry {
    fn update_notify(&mut self, _p: Lit) {}
    fn update_cancel(&mut self, _p: Lit) {}
    fn clause_to_inject(&mut self, _p: Lit, _out: &mut Vec<Lit>) -> bool {
        false
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn lit(l: i32) -> Lit {
        Lit::new(Var::from_idx((l.abs() - 1) as u32), l > 0)
    }

    #[test]
    fn test_cycle_image() {
        // (x1 x2)(x3 x4 x5)
        let g = SymGenerator::from_cycles(5, &[vec![lit(1), lit(2)], vec![lit(3), lit(4), lit(5)]]);
        assert_eq!(g.image(lit(1)), lit(2));
        assert_eq!(g.image(lit(2)), lit(1));
        assert_eq!(g.image(lit(3)), lit(4));
        assert_eq!(g.image(lit(4)), lit(5));
        assert_eq!(g.image(lit(5)), lit(3));
        // complement closure
        assert_eq!(g.image(lit(-1)), lit(-2));
        assert_eq!(g.image(lit(-4)), lit(-5));
        assert!(g.permutes(lit(1)));
        assert!(g.permutes(lit(-1)));
        assert_eq!(
            g.support(),
            (0..5).map(Var::from_idx).collect::<Vec<_>>().as_slice()
        );
    }

    #[test]
    fn test_phase_shifting_cycle() {
        // (x1 -x1): maps the variable to its own complement
        let g = SymGenerator::from_cycles(2, &[vec![lit(1), lit(-1)]]);
        assert_eq!(g.image(lit(1)), lit(-1));
        assert_eq!(g.image(lit(-1)), lit(1));
        assert!(!g.permutes(lit(2)));
    }

    #[test]
    fn test_symmetric_clause() {
        let g = SymGenerator::from_cycles(3, &[vec![lit(1), lit(2)]]);
        let c = vec![lit(1), lit(-2), lit(3)];
        let mut out = vec![];
        g.symmetric_clause(&c, &mut out);
        assert_eq!(out, vec![lit(2), lit(-1), lit(3)]);
    }

    #[test]
    fn test_stabilizes() {
        let g = SymGenerator::from_cycles(3, &[vec![lit(1), lit(2)]]);
        assert!(g.stabilizes(&[lit(1), lit(2)]));
        assert!(g.stabilizes(&[lit(1), lit(2), lit(3)]));
        assert!(!g.stabilizes(&[lit(1), lit(3)]));
        assert!(!g.stabilizes(&[lit(1), lit(-2)]));
    }

    #[test]
    fn test_from_images() {
        // swap x1 and x2 with a polarity flip on x3
        let g = SymGenerator::from_images(3, &[lit(2), lit(1), lit(-3)]);
        assert_eq!(g.image(lit(1)), lit(2));
        assert_eq!(g.image(lit(-1)), lit(-2));
        assert_eq!(g.image(lit(3)), lit(-3));
        assert_eq!(g.image(lit(-3)), lit(3));
    }

    #[test]
    fn test_genset_ops() {
        let g = |i| GenIdx::new(i);
        let mut a = GenSet::new();
        a.insert(g(3));
        a.insert(g(1));
        a.insert(g(2));
        a.insert(g(1));
        assert_eq!(a.len(), 3);
        assert!(a.contains(g(2)));

        let mut b = GenSet::new();
        b.insert(g(2));
        b.insert(g(3));
        b.insert(g(5));
        a.intersect_with(&b);
        assert_eq!(a.iter().collect::<Vec<_>>(), vec![g(2), g(3)]);

        a.retain(|x| x != g(3));
        assert!(a.contains(g(2)));
        assert!(!a.contains(g(3)));

        let empty = GenSet::new();
        a.intersect_with(&empty);
        assert!(a.is_empty());
    }
}
