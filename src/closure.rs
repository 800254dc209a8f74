//! Transitive closure engine over the union of per-label matrices.
//!
//! Both algorithms converge to the same (non-reflexive) transitive
//! closure; change detection compares `nvals` before/after each round
//! rather than structural equality, since a structural comparison would
//! have to walk every row anyway.

use crate::matrix::{BoolMatrix, MatrixStore};

/// `C <- A`, then repeat `C <- C | C@C` until `nvals(C)` stabilizes.
/// O(log N) rounds, quadratic-cost multiplications.
pub fn by_squaring(store: &MatrixStore) -> BoolMatrix {
    let mut closure = store.union_all();
    loop {
        let before = closure.nvals();
        log::trace!("closure::by_squaring round start, nvals={before}");
        let squared = closure.matmul(&closure);
        closure.union_inplace(&squared);
        if closure.nvals() == before {
            break;
        }
    }
    closure
}

/// `C <- A`, then repeat `C <- C | A@C` until `nvals(C)` stabilizes.
/// O(N) rounds, cheaper per round.
pub fn by_incremental_multiplication(store: &MatrixStore) -> BoolMatrix {
    let adjacency = store.union_all();
    let mut closure = adjacency.clone();
    loop {
        let before = closure.nvals();
        log::trace!("closure::by_incremental_multiplication round start, nvals={before}");
        let next = adjacency.matmul(&closure);
        closure.union_inplace(&next);
        if closure.nvals() == before {
            break;
        }
    }
    closure
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::label;

    fn chain_store() -> MatrixStore {
        let mut store = MatrixStore::new(4);
        let mut m = BoolMatrix::zeros(4);
        m.set(0, 1, true);
        m.set(1, 2, true);
        m.set(2, 3, true);
        store.insert(label("a"), m);
        store
    }

    #[test]
    fn both_algorithms_agree() {
        let store = chain_store();
        let squared = by_squaring(&store);
        let incremental = by_incremental_multiplication(&store);
        assert_eq!(squared.nvals(), incremental.nvals());
        for i in 0..4 {
            for j in 0..4 {
                assert_eq!(squared.get(i, j), incremental.get(i, j));
            }
        }
        // transitive, not reflexive: 0 reaches 1,2,3 but not itself.
        assert!(squared.get(0, 1));
        assert!(squared.get(0, 3));
        assert!(!squared.get(0, 0));
    }

    #[test]
    fn closure_is_idempotent() {
        let store = chain_store();
        let closure = by_squaring(&store);
        let mut wrapped = MatrixStore::new(closure.size());
        wrapped.insert(label("x"), closure.clone());
        let closure_again = by_squaring(&wrapped);
        assert_eq!(closure.nvals(), closure_again.nvals());
        for i in 0..4 {
            for j in 0..4 {
                assert_eq!(closure.get(i, j), closure_again.get(i, j));
            }
        }
    }
}
