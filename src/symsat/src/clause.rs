/*****************************************************************************************[clause.rs]
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

use crate::intmap::{AsIndex, IntMap, IntMapBool, IntSet};
use crate::symmetry::GenSet;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt;
use std::iter::DoubleEndedIterator;
use std::ops;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Var(u32);

impl fmt::Debug for Var {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.0 == !0 {
            write!(f, "UNDEF")
        } else {
            write!(f, "{}", self.0 + 1)
        }
    }
}

impl Var {
    pub const UNDEF: Var = Var(!0);
    #[inline(always)]
    pub(crate) fn from_idx(idx: u32) -> Self {
        debug_assert!(idx < u32::MAX / 2, "Var::from_idx: index too large");
        Var(idx)
    }
    #[inline(always)]
    pub fn idx(&self) -> u32 {
        self.0
    }
}

impl AsIndex for Var {
    fn as_index(self) -> usize {
        self.0 as usize
    }
    fn from_index(index: usize) -> Self {
        Var(index as u32)
    }
}

pub type VMap<V> = IntMap<Var, V>;

/// A literal packs a variable and a polarity; complement is a bit flip.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Lit(u32);

impl Lit {
    pub const UNDEF: Lit = Lit(!1);
    pub const ERROR: Lit = Lit(!0);

    #[inline(always)]
    pub fn new(var: Var, sign: bool) -> Self {
        Lit(var.0 * 2 + (!sign) as u32)
    }
    #[inline(always)]
    pub(crate) fn from_idx(idx: u32) -> Self {
        Lit(idx)
    }
    #[inline(always)]
    pub fn idx(&self) -> u32 {
        self.0
    }
    /// `true` for the positive literal of the variable.
    #[inline(always)]
    pub fn sign(&self) -> bool {
        (self.0 & 1) == 0
    }
    #[inline(always)]
    pub fn var(&self) -> Var {
        Var(self.0 >> 1)
    }
}

impl fmt::Debug for Lit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.0 == !0 {
            write!(f, "ERROR")
        } else if self.0 == !1 {
            write!(f, "UNDEF")
        } else {
            write!(f, "{}{}", if self.sign() { "" } else { "-" }, self.0 / 2 + 1)
        }
    }
}

impl ops::Not for Lit {
    type Output = Self;
    #[inline(always)]
    fn not(self) -> Self {
        Lit(self.0 ^ 1)
    }
}

impl AsIndex for Lit {
    #[inline(always)]
    fn as_index(self) -> usize {
        self.0 as usize
    }
    #[inline(always)]
    fn from_index(index: usize) -> Self {
        Lit(index as u32)
    }
}

pub type LMap<V> = IntMap<Lit, V>;
pub type LSet = IntSet<Lit>;

#[allow(non_camel_case_types)]
#[derive(Clone, Copy)]
/// A ternary boolean (true, false, undefined) used for partial assignments.
pub struct lbool(u8);

impl fmt::Debug for lbool {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.0 == 0 {
            write!(f, "TRUE")
        } else if self.0 == 1 {
            write!(f, "FALSE")
        } else {
            write!(f, "UNDEF")
        }
    }
}

impl Default for lbool {
    fn default() -> Self {
        lbool(0)
    }
}

impl lbool {
    pub const TRUE: lbool = lbool(0);
    pub const FALSE: lbool = lbool(1);
    pub const UNDEF: lbool = lbool(2);
    pub fn from_u8(v: u8) -> Self {
        debug_assert!(v == (v & 3), "lbool::from_u8: invalid value");
        lbool(v)
    }
    #[inline(always)]
    pub fn new(v: bool) -> Self {
        lbool((!v) as u8)
    }
    #[inline(always)]
    pub fn to_u8(&self) -> u8 {
        self.0
    }
}

impl PartialEq for lbool {
    #[inline(always)]
    fn eq(&self, rhs: &Self) -> bool {
        self.0 == rhs.0 || (self.0 & rhs.0 & 2) != 0
    }
}

impl Eq for lbool {}

impl ops::Neg for lbool {
    type Output = lbool;
    fn neg(self) -> Self {
        lbool(self.0 ^ 1)
    }
}

impl ops::BitXor<bool> for lbool {
    type Output = lbool;
    fn bitxor(self, rhs: bool) -> Self {
        lbool(self.0 ^ rhs as u8)
    }
}
impl ops::BitXorAssign<bool> for lbool {
    fn bitxor_assign(&mut self, rhs: bool) {
        *self = *self ^ rhs;
    }
}

/// Where a clause came from; given to callbacks on each new clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// Original problem clause.
    Axiom,
    /// Clause learnt by conflict analysis.
    Learnt,
    /// Clause derived by the symmetry subsystem.
    Symmetry,
}

/// Handle of a clause in the arena. Stable across everything but garbage
/// collection, which rewrites every stored handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CRef(u32);

impl CRef {
    pub const UNDEF: Self = CRef(!0);
    /// Sentinel conflict: a symmetric derivation closed the instance at
    /// level 0 and there is no materialized conflict clause to point at.
    pub const UNSAT: Self = CRef(!1);
}

impl AsIndex for CRef {
    #[inline(always)]
    fn as_index(self) -> usize {
        self.0 as usize
    }
    fn from_index(i: usize) -> Self {
        CRef(i as u32)
    }
}

/// Metadata of a clause.
///
/// Layout:
/// unsigned mark     : 2;
/// unsigned learnt   : 1;
/// unsigned symmetry : 1;
/// unsigned reloced  : 1;
/// unsigned size     : 27;
#[derive(Clone, Copy)]
pub struct ClauseHeader(u32);

impl fmt::Debug for ClauseHeader {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ClauseHeader")
            .field("mark", &self.mark())
            .field("learnt", &self.learnt())
            .field("symmetry", &self.symmetry())
            .field("reloced", &self.reloced())
            .field("size", &self.size())
            .finish()
    }
}

impl ClauseHeader {
    pub fn new(mark: u32, learnt: bool, symmetry: bool, reloced: bool, size: u32) -> Self {
        debug_assert!(mark < 4);
        debug_assert!(size < (1 << 27));
        ClauseHeader(
            (mark << 30)
                | ((learnt as u32) << 29)
                | ((symmetry as u32) << 28)
                | ((reloced as u32) << 27)
                | size,
        )
    }
    #[inline(always)]
    pub fn mark(&self) -> u32 {
        self.0 >> 30
    }
    #[inline(always)]
    pub fn learnt(&self) -> bool {
        (self.0 & (1 << 29)) != 0
    }
    /// True iff the clause was derived through a symmetry argument, or from
    /// a reason that was. Such clauses carry a compatible generator set.
    #[inline(always)]
    pub fn symmetry(&self) -> bool {
        (self.0 & (1 << 28)) != 0
    }
    #[inline(always)]
    pub fn reloced(&self) -> bool {
        (self.0 & (1 << 27)) != 0
    }
    #[inline(always)]
    pub fn size(&self) -> u32 {
        self.0 & ((1 << 27) - 1)
    }
    pub fn set_mark(&mut self, mark: u32) {
        debug_assert!(mark < 4);
        self.0 = (self.0 & !(3 << 30)) | (mark << 30);
    }
    pub fn set_reloced(&mut self, reloced: bool) {
        self.0 = (self.0 & !(1 << 27)) | ((reloced as u32) << 27);
    }
    pub fn set_size(&mut self, size: u32) {
        debug_assert!(size < (1 << 27));
        self.0 = (self.0 & !((1 << 27) - 1)) | size;
    }
}

#[derive(Debug, Clone, Copy)]
/// A read-only view of a clause in the arena.
pub(crate) struct ClauseRef<'a> {
    cref: CRef,
    header: ClauseHeader, // fast access
    alloc: &'a ClauseAllocator,
}

#[derive(Debug)]
/// A mutable view of a clause in the arena.
pub(crate) struct ClauseMut<'a> {
    cref: CRef,
    header: ClauseHeader,
    alloc: &'a mut ClauseAllocator,
}

impl<'a, 'b> PartialEq<ClauseRef<'b>> for ClauseRef<'a> {
    fn eq(&self, rhs: &ClauseRef<'b>) -> bool {
        self.cref == rhs.cref
    }
}
impl<'a> Eq for ClauseRef<'a> {}

impl<'a> ClauseRef<'a> {
    #[inline(always)]
    pub fn mark(&self) -> u32 {
        self.header.mark()
    }
    #[inline(always)]
    pub fn learnt(&self) -> bool {
        self.header.learnt()
    }
    #[inline(always)]
    pub fn symmetry(&self) -> bool {
        self.header.symmetry()
    }
    #[inline(always)]
    pub fn reloced(&self) -> bool {
        self.header.reloced()
    }
    #[inline(always)]
    pub fn size(&self) -> u32 {
        self.header.size()
    }
    #[inline(always)]
    pub fn activity(&self) -> f32 {
        self.alloc.activity[self.cref.0 as usize]
    }
    #[inline(always)]
    pub fn lits(&self) -> &'a [Lit] {
        let len = self.size() as usize;
        let offset = unsafe { self.alloc.offsets[self.cref.0 as usize].lit_idx } as usize;
        &self.alloc.lits[offset..offset + len]
    }
    #[inline(always)]
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &'a Lit> {
        self.lits().iter()
    }
    /// Compatible generator set. Present iff `symmetry()`.
    pub fn compat(&self) -> Option<&'a GenSet> {
        self.alloc.compat.get(&self.cref)
    }
}

impl<'a> ClauseMut<'a> {
    #[inline(always)]
    pub fn reloced(&self) -> bool {
        self.header.reloced()
    }
    #[inline(always)]
    pub fn size(&self) -> u32 {
        self.header.size()
    }
    #[inline(always)]
    pub fn set_mark(&mut self, mark: u32) {
        debug_assert!(mark < 4);
        self.header.set_mark(mark);
        self.alloc.headers[self.cref.0 as usize] = self.header;
    }
    #[inline(always)]
    pub fn activity(&self) -> f32 {
        self.alloc.activity[self.cref.0 as usize]
    }
    #[inline(always)]
    pub fn set_activity(&mut self, activity: f32) {
        self.alloc.activity[self.cref.0 as usize] = activity;
    }
    pub fn relocation(&self) -> CRef {
        debug_assert!(self.reloced());
        unsafe { self.alloc.offsets[self.cref.0 as usize].reloced }
    }
    pub fn relocate(mut self, c: CRef) {
        debug_assert!(!self.reloced());
        self.header.set_reloced(true);
        self.alloc.headers[self.cref.0 as usize] = self.header;
        self.alloc.offsets[self.cref.0 as usize].reloced = c;
    }
    #[inline(always)]
    pub fn lits(&self) -> &[Lit] {
        let len = self.size() as usize;
        let offset = unsafe { self.alloc.offsets[self.cref.0 as usize].lit_idx as usize };
        &self.alloc.lits[offset..offset + len]
    }
    pub fn lits_mut(&mut self) -> &mut [Lit] {
        let len = self.size() as usize;
        let offset = unsafe { self.alloc.offsets[self.cref.0 as usize].lit_idx as usize };
        &mut self.alloc.lits[offset..offset + len]
    }
    pub fn shrink(&mut self, new_size: u32) {
        debug_assert!(2 <= new_size);
        debug_assert!(new_size <= self.size());
        if new_size < self.size() {
            self.header.set_size(new_size);
            self.alloc.headers[self.cref.0 as usize] = self.header;
        }
    }
    pub fn as_clause_ref(&mut self) -> ClauseRef {
        ClauseRef {
            cref: self.cref,
            header: self.header,
            alloc: self.alloc,
        }
    }
}

impl<'a> ops::Index<u32> for ClauseRef<'a> {
    type Output = Lit;
    fn index(&self, index: u32) -> &Self::Output {
        &self.lits()[index as usize]
    }
}
impl<'a> ops::Index<u32> for ClauseMut<'a> {
    type Output = Lit;
    fn index(&self, index: u32) -> &Self::Output {
        &self.lits()[index as usize]
    }
}
impl<'a> ops::IndexMut<u32> for ClauseMut<'a> {
    #[inline(always)]
    fn index_mut(&mut self, index: u32) -> &mut Self::Output {
        &mut self.lits_mut()[index as usize]
    }
}

union OffsetData {
    lit_idx: u32,
    reloced: CRef,
}

impl fmt::Debug for OffsetData {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "offset_data")
    }
}

/// Bump-allocated clause arena. Clause handles are indices, not addresses,
/// so garbage collection can relocate clauses and rewrite the handles.
#[derive(Debug)]
pub struct ClauseAllocator {
    headers: Vec<ClauseHeader>,
    offsets: Vec<OffsetData>, // offset in lits, or relocation target
    lits: Vec<Lit>,
    activity: Vec<f32>,
    /// Compatible generator sets, owned by the clauses flagged `symmetry`.
    compat: HashMap<CRef, GenSet>,
    wasted: usize,
}

impl ClauseAllocator {
    pub const UNIT_SIZE: u32 = 32;

    pub fn with_start_cap(n: usize) -> Self {
        Self {
            headers: Vec::with_capacity(n),
            offsets: Vec::with_capacity(n),
            lits: Vec::with_capacity(n),
            activity: Vec::with_capacity(n),
            compat: HashMap::new(),
            wasted: 0,
        }
    }

    fn invariants(&self) -> bool {
        let len = self.headers.len();
        len == self.offsets.len() && len == self.activity.len() && self.lits.len() >= self.wasted
    }

    pub fn new() -> Self {
        Self::with_start_cap(1024 * 1024)
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.lits.len()
    }
    pub fn wasted(&self) -> usize {
        self.wasted
    }

    fn alloc_internal(&mut self, clause: &[Lit], h: ClauseHeader) -> CRef {
        debug_assert!(self.invariants());
        let cid = self.headers.len();
        let offset = self.lits.len();

        self.headers.push(h);
        self.offsets.push(OffsetData {
            lit_idx: offset as u32,
        });
        self.activity.push(0.);
        self.lits.extend_from_slice(clause);

        CRef(cid as u32)
    }

    /// Allocate a clause. A `Some` compatible set flags the clause as
    /// symmetry-derived; the set is owned by the clause from here on.
    pub(crate) fn alloc(&mut self, clause: &[Lit], learnt: bool, compat: Option<GenSet>) -> CRef {
        let h = ClauseHeader::new(0, learnt, compat.is_some(), false, clause.len() as u32);
        let cref = self.alloc_internal(clause, h);
        if let Some(set) = compat {
            self.compat.insert(cref, set);
        }
        cref
    }

    pub(crate) fn alloc_copy(&mut self, from: ClauseRef) -> CRef {
        let act = from.activity();
        let compat = from.compat().cloned();
        let c = self.alloc_internal(from.lits(), from.header);
        self.activity[c.0 as usize] = act;
        if let Some(set) = compat {
            debug_assert!(from.symmetry());
            self.compat.insert(c, set);
        }
        c
    }

    pub(crate) fn free(&mut self, cr: CRef) {
        let size = self.get_ref(cr).size() as usize;
        self.wasted += size;
    }

    pub(crate) fn free_amount(&mut self, size: usize) {
        self.wasted += size;
    }

    /// Relocate clause `cr` into allocator `to`.
    ///
    /// Post-condition: `*cr` contains the handle of the copy in `to`.
    pub(crate) fn reloc(&mut self, cr: &mut CRef, to: &mut ClauseAllocator) {
        let mut c = self.get_mut(*cr);

        if c.reloced() {
            *cr = c.relocation();
            return;
        }

        *cr = to.alloc_copy(c.as_clause_ref());
        c.relocate(*cr);
    }

    #[inline]
    pub(crate) fn get_ref<'a>(&'a self, cref: CRef) -> ClauseRef<'a> {
        let header = self.headers[cref.0 as usize];
        ClauseRef {
            alloc: self,
            cref,
            header,
        }
    }

    pub(crate) fn get_mut(&mut self, cref: CRef) -> ClauseMut {
        let header = self.headers[cref.0 as usize];
        ClauseMut {
            alloc: self,
            cref,
            header,
        }
    }
}

/// Predicate that decides whether a value `V` is deleted or not.
pub trait DeletePred<V> {
    fn deleted(&self, v: &V) -> bool;
}

pub type OccVec<V> = SmallVec<[V; 4]>;

#[derive(Debug, Clone)]
/// Per-key occurrence lists (e.g. watchers per literal) with lazy removal:
/// a key can be smudged and its list cleaned on next access.
pub struct OccListsData<K: AsIndex, V> {
    occs: IntMap<K, OccVec<V>>,
    dirty: IntMapBool<K>,
    dirties: Vec<K>, // keys to examine in `clean_all_pred`
}

impl<K: AsIndex, V> OccListsData<K, V> {
    pub fn new() -> Self {
        Self {
            occs: IntMap::new(),
            dirty: IntMapBool::new(),
            dirties: Vec::new(),
        }
    }

    /// Initialize the occurrence list for the given `idx`.
    pub fn init(&mut self, idx: K) {
        self.occs.reserve_default(idx);
        self.occs[idx].clear();
        self.dirty.reserve(idx);
    }

    /// Pair the data with a deletion predicate.
    pub fn promote<P: DeletePred<V>>(&mut self, pred: P) -> OccLists<K, V, P> {
        OccLists { data: self, pred }
    }

    /// Up-to-date list of occurrences for `idx`, cleaned with `pred` first
    /// if it was smudged.
    pub fn lookup_mut_pred<P: DeletePred<V>>(&mut self, idx: K, pred: &P) -> &mut OccVec<V> {
        if self.dirty[idx] {
            self.clean_pred(idx, pred);
        }
        &mut self.occs[idx]
    }

    pub fn clean_all_pred<P: DeletePred<V>>(&mut self, pred: &P) {
        for &x in &self.dirties {
            // dirties may contain duplicates
            if self.dirty[x] {
                self.occs[x].retain(|x| !pred.deleted(x));
                self.dirty.set(x, false);
            }
        }
        self.dirties.clear();
    }

    pub fn clean_pred<P: DeletePred<V>>(&mut self, idx: K, pred: &P) {
        self.occs[idx].retain(|x| !pred.deleted(x));
        self.dirty.set(idx, false);
    }

    /// Mark index `idx` as dirty, so it can be cleaned up later.
    pub fn smudge(&mut self, idx: K) {
        if !self.dirty[idx] {
            self.dirty.insert(idx);
            self.dirties.push(idx);
        }
    }
}

impl<K: AsIndex, V> ops::Index<K> for OccListsData<K, V> {
    type Output = OccVec<V>;
    fn index(&self, index: K) -> &Self::Output {
        &self.occs[index]
    }
}
impl<K: AsIndex, V> ops::IndexMut<K> for OccListsData<K, V> {
    fn index_mut(&mut self, index: K) -> &mut Self::Output {
        &mut self.occs[index]
    }
}

/// Packs together an occurrence list and the filtering predicate.
pub struct OccLists<'a, K: AsIndex + 'a, V: 'a, P: DeletePred<V>> {
    data: &'a mut OccListsData<K, V>,
    pred: P,
}

impl<'a, K: AsIndex + 'a, V: 'a, P: DeletePred<V>> OccLists<'a, K, V, P> {
    pub fn lookup_mut(&mut self, idx: K) -> &mut OccVec<V> {
        self.data.lookup_mut_pred(idx, &self.pred)
    }

    pub fn clean_all(&mut self) {
        self.data.clean_all_pred(&self.pred)
    }
}

impl<'a, K: AsIndex + 'a, V: 'a, P: DeletePred<V>> ops::Deref for OccLists<'a, K, V, P> {
    type Target = OccListsData<K, V>;
    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

impl<'a, K: AsIndex + 'a, V: 'a, P: DeletePred<V>> ops::DerefMut for OccLists<'a, K, V, P> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.data
    }
}

/// Anything that can be considered as a list of literals.
pub trait ClauseIterable: fmt::Debug {
    type Item: Copy + Into<Lit>;
    fn items(&self) -> &[Self::Item];
}

impl<'a> ClauseIterable for ClauseRef<'a> {
    type Item = Lit;
    fn items(&self) -> &[Self::Item] {
        self.lits()
    }
}

impl<'a> ClauseIterable for &'a [Lit] {
    type Item = Lit;
    fn items(&self) -> &[Self::Item] {
        self
    }
}

impl ClauseIterable for Vec<Lit> {
    type Item = Lit;
    fn items(&self) -> &[Self::Item] {
        &self
    }
}

impl ClauseIterable for IntSet<Lit> {
    type Item = Lit;
    fn items(&self) -> &[Self::Item] {
        self.as_slice()
    }
}

/// Any iterable clause can be printed in DIMACS.
impl<T: ClauseIterable> display::Print for T {
    fn fmt_dimacs(&self, out: &mut fmt::Formatter) -> fmt::Result {
        for &x in self.items().iter() {
            let lit: Lit = x.into();
            write!(
                out,
                "{}{} ",
                (if lit.sign() { "" } else { "-" }),
                lit.var().idx() + 1
            )?;
        }
        write!(out, "0")?;
        Ok(())
    }
}

/// Generic interface for objects printable in DIMACS.
pub mod display {
    use std::fmt;

    /// Objects that can be printed in DIMACS syntax.
    pub trait Print: Sized {
        fn fmt_dimacs(&self, out: &mut fmt::Formatter) -> fmt::Result;

        /// Wrap so the object can be used directly in a format string.
        fn pp_dimacs(&self) -> PrintWrapper<Self> {
            PrintWrapper(&self)
        }
    }

    pub struct PrintWrapper<'a, T: 'a + Print>(&'a T);

    impl<'a, T: Print> fmt::Display for PrintWrapper<'a, T> {
        fn fmt(&self, out: &mut fmt::Formatter) -> fmt::Result {
            self.0.fmt_dimacs(out)
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_offset_data_size() {
        use std::mem;
        assert_eq!(mem::size_of::<OffsetData>(), 4);
    }

    #[test]
    fn test_lbool_eq() {
        for i in 0..4 {
            let a = lbool::from_u8(i);
            for j in 0..4 {
                let b = lbool::from_u8(j);
                let are_eq = (i == 0 && j == 0) || (i == 1 && j == 1) || (i >= 2 && j >= 2);
                assert_eq!(are_eq, a == b);
            }
        }
    }

    #[test]
    fn test_lbool_neg() {
        assert_eq!(-lbool::TRUE, lbool::FALSE);
        assert_eq!(-lbool::FALSE, lbool::TRUE);
        assert_eq!(-lbool::UNDEF, lbool::UNDEF);
    }

    #[test]
    fn test_lit_complement() {
        let v = Var::from_idx(4);
        let p = Lit::new(v, true);
        assert_eq!((!p).var(), v);
        assert_ne!(!p, p);
        assert_eq!(!!p, p);
        assert!(p.sign());
        assert!(!(!p).sign());
    }

    #[test]
    fn test_header_bits() {
        let h = ClauseHeader::new(0, true, true, false, 5);
        assert_eq!(h.mark(), 0);
        assert!(h.learnt());
        assert!(h.symmetry());
        assert!(!h.reloced());
        assert_eq!(h.size(), 5);

        let mut h = ClauseHeader::new(0, false, false, false, (1 << 27) - 1);
        assert_eq!(h.size(), (1 << 27) - 1);
        assert!(!h.symmetry());
        h.set_mark(1);
        assert_eq!(h.mark(), 1);
        assert_eq!(h.size(), (1 << 27) - 1);
    }

    #[test]
    fn test_alloc_compat_ownership() {
        use crate::symmetry::{GenIdx, GenSet};
        let mut ca = ClauseAllocator::new();
        let v = |i| Var::from_idx(i);
        let lits = [Lit::new(v(0), true), Lit::new(v(1), false)];

        let plain = ca.alloc(&lits, true, None);
        assert!(!ca.get_ref(plain).symmetry());
        assert!(ca.get_ref(plain).compat().is_none());

        let mut set = GenSet::new();
        set.insert(GenIdx::new(2));
        let sym = ca.alloc(&lits, true, Some(set));
        assert!(ca.get_ref(sym).symmetry());
        assert!(ca.get_ref(sym).compat().unwrap().contains(GenIdx::new(2)));

        // relocation carries the set along
        let mut to = ClauseAllocator::new();
        let mut cr = sym;
        ca.reloc(&mut cr, &mut to);
        assert!(to.get_ref(cr).symmetry());
        assert!(to.get_ref(cr).compat().unwrap().contains(GenIdx::new(2)));
    }
}
