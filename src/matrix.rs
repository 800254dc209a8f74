//! Labeled sparse boolean matrix store.
//!
//! A single square boolean matrix stores only true cells, one adjacency
//! set per row, so that point lookups (`get`) are cheap alongside
//! iteration over the whole matrix.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::rc::Rc;

/// An opaque edge/transition label. Cheap to clone; never interpreted as
/// terminal or nonterminal except during CNF conversion and RFA edge
/// classification.
pub type Label = Rc<str>;

pub fn label(s: impl AsRef<str>) -> Label {
    Rc::from(s.as_ref())
}

/// A single square boolean matrix over the (OR, AND) semiring.
#[derive(Clone, Default)]
pub struct BoolMatrix {
    size: usize,
    rows: Vec<HashSet<usize>>,
    nvals: usize,
}

impl fmt::Debug for BoolMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoolMatrix")
            .field("size", &self.size)
            .field("nvals", &self.nvals)
            .finish()
    }
}

impl BoolMatrix {
    /// A `n`x`n` all-zero matrix.
    pub fn zeros(n: usize) -> Self {
        BoolMatrix {
            size: n,
            rows: vec![HashSet::new(); n],
            nvals: 0,
        }
    }

    /// The `n`x`n` identity matrix.
    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n);
        for i in 0..n {
            m.set(i, i, true);
        }
        m
    }

    /// Build from parallel row/col index lists (duplicates collapse).
    pub fn from_lists(n: usize, rows_idx: &[usize], cols_idx: &[usize]) -> Self {
        let mut m = Self::zeros(n);
        for (&i, &j) in rows_idx.iter().zip(cols_idx.iter()) {
            m.set(i, j, true);
        }
        m
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn nvals(&self) -> usize {
        self.nvals
    }

    pub fn get(&self, i: usize, j: usize) -> bool {
        i < self.size && j < self.size && self.rows[i].contains(&j)
    }

    /// Set or clear a single cell. Absence of a cell means false.
    pub fn set(&mut self, i: usize, j: usize, value: bool) {
        assert!(i < self.size && j < self.size, "cell out of bounds for a {}x{} matrix", self.size, self.size);
        let was_present = self.rows[i].contains(&j);
        if value {
            if self.rows[i].insert(j) {
                self.nvals += 1;
            }
        } else if was_present {
            self.rows[i].remove(&j);
            self.nvals -= 1;
        }
    }

    /// Grow to an `n`x`n` shape. Never shrinks.
    pub fn resize(&mut self, n: usize) {
        if n <= self.size {
            return;
        }
        self.rows.resize(n, HashSet::new());
        self.size = n;
    }

    /// Elementwise OR, accumulating into `self`. Supports `other` aliasing `self`.
    pub fn union_inplace(&mut self, other: &BoolMatrix) {
        assert_eq!(self.size, other.size, "union of differently sized matrices");
        for (i, row) in other.rows.iter().enumerate() {
            for &j in row {
                self.set(i, j, true);
            }
        }
    }

    /// Boolean (OR, AND) semiring product `self @ rhs`.
    pub fn matmul(&self, rhs: &BoolMatrix) -> BoolMatrix {
        assert_eq!(self.size, rhs.size, "product of differently sized matrices");
        let n = self.size;
        let mut out = BoolMatrix::zeros(n);
        for i in 0..n {
            for &k in &self.rows[i] {
                for &j in &rhs.rows[k] {
                    out.set(i, j, true);
                }
            }
        }
        out
    }

    /// Standard Kronecker product: out[(i*n2+k), (j*n2+l)] = self[i,j] && other[k,l].
    pub fn kronecker(&self, other: &BoolMatrix) -> BoolMatrix {
        let n2 = other.size;
        let mut out = BoolMatrix::zeros(self.size * n2);
        for i in 0..self.size {
            for &j in &self.rows[i] {
                for k in 0..n2 {
                    for &l in &other.rows[k] {
                        out.set(i * n2 + k, j * n2 + l, true);
                    }
                }
            }
        }
        out
    }

    /// Iterate stored (row, col) entries in deterministic order.
    pub fn iter_entries(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.rows.iter().enumerate().flat_map(|(i, row)| {
            let mut cols: Vec<usize> = row.iter().copied().collect();
            cols.sort_unstable();
            cols.into_iter().map(move |j| (i, j))
        })
    }
}

/// A mapping from label to a square boolean matrix of shared dimension.
///
/// All matrices in a store share a dimension equal to the store's vertex
/// count; on structural changes every matrix resizes consistently.
#[derive(Clone, Default, Debug)]
pub struct MatrixStore {
    size: usize,
    by_label: HashMap<Label, BoolMatrix>,
}

impl MatrixStore {
    pub fn new(size: usize) -> Self {
        MatrixStore {
            size,
            by_label: HashMap::new(),
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn labels(&self) -> impl Iterator<Item = &Label> {
        self.by_label.keys()
    }

    pub fn get(&self, label: &Label) -> Option<&BoolMatrix> {
        self.by_label.get(label)
    }

    pub fn get_mut_or_zero(&mut self, label: &Label) -> &mut BoolMatrix {
        let size = self.size;
        self.by_label
            .entry(label.clone())
            .or_insert_with(|| BoolMatrix::zeros(size))
    }

    pub fn insert(&mut self, label: Label, matrix: BoolMatrix) {
        debug_assert_eq!(matrix.size(), self.size, "matrix inserted with wrong dimension");
        self.by_label.insert(label, matrix);
    }

    pub fn entries(&self) -> impl Iterator<Item = (&Label, &BoolMatrix)> {
        self.by_label.iter()
    }

    /// Grow every matrix to share dimension `n`.
    pub fn resize(&mut self, n: usize) {
        if n <= self.size {
            return;
        }
        self.size = n;
        for matrix in self.by_label.values_mut() {
            matrix.resize(n);
        }
    }

    /// The union over every label's matrix (unlabeled reachability base).
    pub fn union_all(&self) -> BoolMatrix {
        let mut out = BoolMatrix::zeros(self.size);
        for matrix in self.by_label.values() {
            out.union_inplace(matrix);
        }
        out
    }

    pub fn edges_counter(&self) -> HashMap<Label, usize> {
        self.by_label
            .iter()
            .map(|(label, matrix)| (label.clone(), matrix.nvals()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_roundtrip() {
        let mut m = BoolMatrix::zeros(3);
        assert!(!m.get(0, 1));
        m.set(0, 1, true);
        assert!(m.get(0, 1));
        assert_eq!(m.nvals(), 1);
        m.set(0, 1, false);
        assert!(!m.get(0, 1));
        assert_eq!(m.nvals(), 0);
    }

    #[test]
    fn matmul_over_boolean_semiring() {
        let mut a = BoolMatrix::zeros(2);
        a.set(0, 1, true);
        let mut b = BoolMatrix::zeros(2);
        b.set(1, 0, true);
        let c = a.matmul(&b);
        assert!(c.get(0, 0));
        assert!(!c.get(0, 1));
        assert!(!c.get(1, 0));
        assert!(!c.get(1, 1));
    }

    #[test]
    fn kronecker_reconstruction() {
        // Every nonzero product cell decomposes to two nonzero input
        // cells, and conversely.
        let mut a = BoolMatrix::zeros(2);
        a.set(0, 1, true);
        let mut b = BoolMatrix::zeros(3);
        b.set(2, 0, true);
        let prod = a.kronecker(&b);
        assert_eq!(prod.size(), 6);
        for i in 0..2 {
            for j in 0..2 {
                for k in 0..3 {
                    for l in 0..3 {
                        let expected = a.get(i, j) && b.get(k, l);
                        assert_eq!(prod.get(i * 3 + k, j * 3 + l), expected);
                    }
                }
            }
        }
    }

    #[test]
    fn resize_never_shrinks_and_preserves_cells() {
        let mut m = BoolMatrix::zeros(2);
        m.set(0, 1, true);
        m.resize(5);
        assert_eq!(m.size(), 5);
        assert!(m.get(0, 1));
        m.resize(1);
        assert_eq!(m.size(), 5);
    }

    #[test]
    fn union_inplace_aliased() {
        let mut a = BoolMatrix::zeros(2);
        a.set(0, 0, true);
        let b = a.clone();
        a.union_inplace(&b);
        assert_eq!(a.nvals(), 1);
    }
}
