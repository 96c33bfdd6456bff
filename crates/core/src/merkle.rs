//! Merkle tree committing an ordered record list to a single root.
//!
//! Odd-count rule, pinned: a level's odd tail node is hashed with a copy
//! of itself (duplicate-last). Leaves are never removed; the tree only
//! grows through [`MerkleTree::extend`].

use crate::hash::{hash_concat, Hash};

/// Compute the merkle root of a list of leaf hashes.
///
/// Returns the zero hash for an empty list and the leaf itself for a
/// single-leaf list.
pub fn merkle_root(leaves: &[Hash]) -> Hash {
    MerkleTree::build(leaves).root()
}

/// A binary merkle tree over cached leaf digests.
#[derive(Debug, Clone)]
pub struct MerkleTree {
    /// All nodes, level by level, leaves first. Never empty.
    levels: Vec<Vec<Hash>>,
}

impl MerkleTree {
    /// Build a tree from an ordered list of leaf hashes.
    pub fn build(leaves: &[Hash]) -> Self {
        let mut tree = Self {
            levels: vec![leaves.to_vec()],
        };
        tree.rebuild_interior();
        tree
    }

    /// Append leaves and recompute the interior. Cached leaf digests are
    /// kept as-is; only interior nodes are rehashed.
    pub fn extend(&mut self, new_leaves: &[Hash]) {
        self.levels[0].extend_from_slice(new_leaves);
        self.rebuild_interior();
    }

    /// The root commitment. Changes iff the ordered leaf sequence changes.
    pub fn root(&self) -> Hash {
        self.levels
            .last()
            .and_then(|level| level.first())
            .copied()
            .unwrap_or(Hash::ZERO)
    }

    /// Number of leaves committed.
    pub fn leaf_count(&self) -> usize {
        self.levels.first().map(|level| level.len()).unwrap_or(0)
    }

    fn rebuild_interior(&mut self) {
        self.levels.truncate(1);

        while self.levels.last().expect("leaf level always present").len() > 1 {
            let current = self.levels.last().expect("leaf level always present");
            let mut next = Vec::with_capacity(current.len().div_ceil(2));

            for chunk in current.chunks(2) {
                let combined = if chunk.len() == 2 {
                    hash_concat(&[chunk[0].as_ref(), chunk[1].as_ref()])
                } else {
                    // Duplicate-last: odd tail pairs with itself.
                    hash_concat(&[chunk[0].as_ref(), chunk[0].as_ref()])
                };
                next.push(combined);
            }

            self.levels.push(next);
        }
    }
}
