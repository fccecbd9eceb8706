/*
 * Created on Fri Jan 17 2025
 *
 * This file is a part of bhashset
 * bhashset is a free and open-source, reentrant in-memory set container
 * library written by the bhashset authors ("the Author") with the vision
 * to provide fast, Bloom-pruned set algebra over arbitrary user-defined
 * elements without compromising on reentrancy or predictable performance.
 *
 * Copyright (c) 2025, The bhashset authors
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License
 * along with this program. If not, see <https://www.gnu.org/licenses/>.
 *
*/

//! The per-bucket, weight-balanced binary search tree keyed by element hash.
//!
//! Every node owns exactly one [`CollisionList`] plus a `subtree_bloom` that
//! is the OR of the Bloom masks of every hash reachable from it. Lookups use
//! that summary to bail out of a descent as soon as the sought hash cannot
//! possibly be present below the current node — mirroring `find_node` in the
//! origin's `avl/common.c`, which checks the *current* node's own filter
//! before stepping to a child rather than the child's filter before
//! stepping into it; both prune the same descents, and checking at the
//! current node means the root's own filter rules out the whole tree in one
//! comparison.
//!
//! Balance is maintained by weight, not height, despite the "avl" naming
//! kept alive by the origin codebase's own history: a subtree is rebalanced
//! whenever one child's node count exceeds twice its sibling's plus one.

use crate::bloom::{bloom_from_hash, bloom_may_contain};
use crate::collision::CollisionList;
use crate::config::SetConfig;
use crate::error::SetError;

struct Node<T> {
    hash: u64,
    list: CollisionList<T>,
    height: u32,
    /// Number of *nodes* (hash groups), not elements, in this subtree. This
    /// is the quantity the weight-balance invariant is defined over.
    count: usize,
    subtree_bloom: u64,
    left: Option<Box<Node<T>>>,
    right: Option<Box<Node<T>>>,
}

impl<T> Node<T> {
    fn leaf(hash: u64) -> Self {
        Self {
            hash,
            list: CollisionList::new(),
            height: 1,
            count: 1,
            subtree_bloom: bloom_from_hash(hash),
            left: None,
            right: None,
        }
    }
}

fn height<T>(node: &Option<Box<Node<T>>>) -> u32 {
    node.as_ref().map_or(0, |n| n.height)
}

fn weight<T>(node: &Option<Box<Node<T>>>) -> usize {
    node.as_ref().map_or(0, |n| n.count)
}

fn subtree_bloom<T>(node: &Option<Box<Node<T>>>) -> u64 {
    node.as_ref().map_or(0, |n| n.subtree_bloom)
}

fn regen_metadata<T>(node: &mut Node<T>) {
    node.height = 1 + height(&node.left).max(height(&node.right));
    node.count = 1 + weight(&node.left) + weight(&node.right);
    node.subtree_bloom =
        bloom_from_hash(node.hash) | subtree_bloom(&node.left) | subtree_bloom(&node.right);
}

fn rotate_left<T>(mut node: Box<Node<T>>) -> Box<Node<T>> {
    let mut new_root = match node.right.take() {
        Some(r) => r,
        None => return node,
    };
    node.right = new_root.left.take();
    regen_metadata(&mut node);
    new_root.left = Some(node);
    regen_metadata(&mut new_root);
    new_root
}

fn rotate_right<T>(mut node: Box<Node<T>>) -> Box<Node<T>> {
    let mut new_root = match node.left.take() {
        Some(l) => l,
        None => return node,
    };
    node.left = new_root.right.take();
    regen_metadata(&mut node);
    new_root.right = Some(node);
    regen_metadata(&mut new_root);
    new_root
}

/// Restores the weight-balance invariant for `root` and, if rotations were
/// needed at this level, recurses into both children (a rotation can only
/// have disturbed the weight of the subtrees it touched).
fn rebalance_subtree<T>(root: Option<Box<Node<T>>>) -> Option<Box<Node<T>>> {
    let mut root = root?;

    let limit = (1u64 << root.height.saturating_sub(1)).saturating_sub(1);
    if root.count as u64 > limit {
        return Some(root);
    }

    while weight(&root.right) > 2 * weight(&root.left) + 1 {
        if let Some(mut right) = root.right.take() {
            if weight(&right.right) <= weight(&root.left) {
                right = rotate_right(right);
            }
            root.right = Some(right);
        }
        root = rotate_left(root);
    }

    while weight(&root.left) > 2 * weight(&root.right) + 1 {
        if let Some(mut left) = root.left.take() {
            if weight(&left.left) <= weight(&root.right) {
                left = rotate_left(left);
            }
            root.left = Some(left);
        }
        root = rotate_right(root);
    }

    root.left = rebalance_subtree(root.left.take());
    root.right = rebalance_subtree(root.right.take());
    Some(root)
}

/// Finds the leftmost node of `root`, detaching it from the tree and
/// returning both the detached node and whatever remains of `root`.
fn isolate_leftmost<T>(
    root: Option<Box<Node<T>>>,
) -> (Option<Box<Node<T>>>, Option<Box<Node<T>>>) {
    match root {
        None => (None, None),
        Some(mut node) => {
            if node.left.is_none() {
                (node.right.take(), Some(node))
            } else {
                let (new_left, extracted) = isolate_leftmost(node.left.take());
                node.left = new_left;
                regen_metadata(&mut node);
                (Some(node), extracted)
            }
        }
    }
}

/// Removes `node` from the tree, splicing its children back together.
fn isolate_root_node<T>(mut node: Box<Node<T>>) -> Option<Box<Node<T>>> {
    if node.left.is_none() {
        return node.right.take();
    }
    let right = node.right.take();
    let (remaining_right, extracted) = isolate_leftmost(right);
    match extracted {
        None => node.left.take(),
        Some(mut new_root) => {
            new_root.left = node.left.take();
            new_root.right = remaining_right;
            regen_metadata(&mut new_root);
            Some(new_root)
        }
    }
}

/// Locates the node for `hash`, creating an empty one if absent, and passes
/// its collision list to `f`. Used by both `insert` (new element) and
/// `union_into` (merge an incoming collision list).
fn with_list_at<T, F>(
    node: Option<Box<Node<T>>>,
    hash: u64,
    f: F,
) -> (Option<Box<Node<T>>>, Result<(), SetError>)
where
    F: FnOnce(&mut CollisionList<T>) -> Result<(), SetError>,
{
    match node {
        None => {
            let mut n = Box::new(Node::leaf(hash));
            let r = f(&mut n.list);
            regen_metadata(&mut n);
            (Some(n), r)
        }
        Some(mut n) => {
            let r = if hash < n.hash {
                let (new_left, r) = with_list_at(n.left.take(), hash, f);
                n.left = new_left;
                r
            } else if hash > n.hash {
                let (new_right, r) = with_list_at(n.right.take(), hash, f);
                n.right = new_right;
                r
            } else {
                f(&mut n.list)
            };
            regen_metadata(&mut n);
            (Some(n), r)
        }
    }
}

fn find<T>(root: &Option<Box<Node<T>>>, hash: u64) -> Option<&Node<T>> {
    let query = bloom_from_hash(hash);
    let mut cur = root.as_deref();
    while let Some(node) = cur {
        if node.hash == hash {
            return Some(node);
        }
        if !bloom_may_contain(query, node.subtree_bloom) {
            return None;
        }
        cur = if hash < node.hash {
            node.left.as_deref()
        } else {
            node.right.as_deref()
        };
    }
    None
}

fn delete_one_rec<T, C: SetConfig<T> + ?Sized>(
    root: Option<Box<Node<T>>>,
    hash: u64,
    q: &T,
    cfg: &C,
) -> (Option<Box<Node<T>>>, Option<T>) {
    match root {
        None => (None, None),
        Some(mut n) => {
            if hash < n.hash {
                let (new_left, removed) = delete_one_rec(n.left.take(), hash, q, cfg);
                n.left = new_left;
                regen_metadata(&mut n);
                (Some(n), removed)
            } else if hash > n.hash {
                let (new_right, removed) = delete_one_rec(n.right.take(), hash, q, cfg);
                n.right = new_right;
                regen_metadata(&mut n);
                (Some(n), removed)
            } else {
                let removed = n.list.delete_one(q, cfg);
                if n.list.is_empty() {
                    (isolate_root_node(*n), removed)
                } else {
                    regen_metadata(&mut n);
                    (Some(n), removed)
                }
            }
        }
    }
}

fn delete_by_predicate_rec<T>(
    root: Option<Box<Node<T>>>,
    pred: &mut dyn FnMut(&T) -> bool,
) -> (Option<Box<Node<T>>>, usize) {
    match root {
        None => (None, 0),
        Some(mut n) => {
            let (new_left, c1) = delete_by_predicate_rec(n.left.take(), pred);
            n.left = new_left;
            let (new_right, c2) = delete_by_predicate_rec(n.right.take(), pred);
            n.right = new_right;
            let c3 = n.list.delete_by_predicate(pred);
            let removed = c1 + c2 + c3;
            if n.list.is_empty() {
                (isolate_root_node(*n), removed)
            } else {
                regen_metadata(&mut n);
                (Some(n), removed)
            }
        }
    }
}

fn union_into_rec<T: Clone, C: SetConfig<T> + ?Sized>(
    dest: Option<Box<Node<T>>>,
    src: &Option<Box<Node<T>>>,
    cfg: &C,
) -> (Option<Box<Node<T>>>, Result<(), SetError>) {
    match src {
        None => (dest, Ok(())),
        Some(n) => {
            let (dest, r) = union_into_rec(dest, &n.left, cfg);
            if r.is_err() {
                return (dest, r);
            }
            let (dest, r) = union_into_rec(dest, &n.right, cfg);
            if r.is_err() {
                return (dest, r);
            }
            let src_list = &n.list;
            with_list_at(dest, n.hash, |list| list.union_into(src_list, cfg))
        }
    }
}

fn cardinality<T>(root: &Option<Box<Node<T>>>) -> usize {
    match root {
        None => 0,
        Some(n) => n.list.len() + cardinality(&n.left) + cardinality(&n.right),
    }
}

fn is_subset_rec<T, C: SetConfig<T> + ?Sized>(
    a: &Option<Box<Node<T>>>,
    b: &Option<Box<Node<T>>>,
    cfg: &C,
) -> bool {
    match a {
        None => true,
        Some(n) => {
            let list_ok = match find(b, n.hash) {
                Some(bn) => n.list.is_subset(&bn.list, cfg),
                None => false,
            };
            list_ok && is_subset_rec(&n.left, b, cfg) && is_subset_rec(&n.right, b, cfg)
        }
    }
}

fn select_rec<T>(
    root: &Option<Box<Node<T>>>,
    pred: Option<&dyn Fn(&T) -> bool>,
    proc: &mut dyn FnMut(&T) -> i32,
) -> i32 {
    match root {
        None => 0,
        Some(n) => {
            let rc = select_rec(&n.left, pred, proc);
            if rc < 0 {
                return rc;
            }
            let rc = n.list.select(pred, proc);
            if rc < 0 {
                return rc;
            }
            select_rec(&n.right, pred, proc)
        }
    }
}

fn empty_slice_iter<'a, T>() -> std::slice::Iter<'a, T> {
    [].iter()
}

/// An in-order walk over every element stored under a tree, yielded in
/// hash order then, within a hash, insertion order. Order is an
/// implementation artifact, not a contract: nothing in this crate's public
/// API promises ordered iteration.
pub struct TreeIter<'a, T> {
    stack: Vec<&'a Node<T>>,
    current: std::slice::Iter<'a, T>,
}

impl<'a, T> TreeIter<'a, T> {
    fn new(root: &'a Option<Box<Node<T>>>) -> Self {
        let mut stack = Vec::new();
        push_left_spine(root.as_deref(), &mut stack);
        let current = stack
            .last()
            .map(|n| n.list.as_slice().iter())
            .unwrap_or_else(empty_slice_iter);
        Self { stack, current }
    }
}

fn push_left_spine<'a, T>(mut cur: Option<&'a Node<T>>, stack: &mut Vec<&'a Node<T>>) {
    while let Some(n) = cur {
        stack.push(n);
        cur = n.left.as_deref();
    }
}

impl<'a, T> Iterator for TreeIter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.current.next() {
                return Some(item);
            }
            let node = self.stack.pop()?;
            push_left_spine(node.right.as_deref(), &mut self.stack);
            self.current = self
                .stack
                .last()
                .map(|n| n.list.as_slice().iter())
                .unwrap_or_else(empty_slice_iter);
        }
    }
}

/// The per-bucket hash tree. Owns at most one root node; empty when no
/// element has ever routed into its bucket.
pub struct Tree<T> {
    root: Option<Box<Node<T>>>,
}

impl<T> Tree<T> {
    pub fn new() -> Self {
        Self { root: None }
    }

    pub fn cardinality(&self) -> usize {
        cardinality(&self.root)
    }

    pub fn find<C: SetConfig<T> + ?Sized>(&self, q: &T, cfg: &C) -> Option<&T> {
        let hash = cfg.hash(q);
        find(&self.root, hash).and_then(|n| n.list.find(q, cfg))
    }

    pub fn insert<C: SetConfig<T> + ?Sized>(
        &mut self,
        hash: u64,
        v: T,
        cfg: &C,
    ) -> Result<(), SetError> {
        let (new_root, r) = with_list_at(self.root.take(), hash, |list| list.insert(v, cfg));
        self.root = rebalance_subtree(new_root);
        r
    }

    pub fn delete_one<C: SetConfig<T> + ?Sized>(
        &mut self,
        hash: u64,
        q: &T,
        cfg: &C,
    ) -> Option<T> {
        let (new_root, removed) = delete_one_rec(self.root.take(), hash, q, cfg);
        self.root = rebalance_subtree(new_root);
        removed
    }

    pub fn delete_by_predicate(&mut self, pred: &mut dyn FnMut(&T) -> bool) -> usize {
        let (new_root, removed) = delete_by_predicate_rec(self.root.take(), pred);
        self.root = rebalance_subtree(new_root);
        removed
    }

    pub fn is_subset<C: SetConfig<T> + ?Sized>(&self, other: &Self, cfg: &C) -> bool {
        is_subset_rec(&self.root, &other.root, cfg)
    }

    pub fn union_into<C: SetConfig<T> + ?Sized>(
        &mut self,
        src: &Self,
        cfg: &C,
    ) -> Result<(), SetError>
    where
        T: Clone,
    {
        let (new_root, r) = union_into_rec(self.root.take(), &src.root, cfg);
        self.root = rebalance_subtree(new_root);
        r
    }

    pub fn select(&self, pred: Option<&dyn Fn(&T) -> bool>, proc: &mut dyn FnMut(&T) -> i32) -> i32 {
        select_rec(&self.root, pred, proc)
    }

    pub fn iter(&self) -> TreeIter<'_, T> {
        TreeIter::new(&self.root)
    }

    #[cfg(test)]
    fn check_weight_balance(&self) -> bool {
        fn walk<T>(node: &Option<Box<Node<T>>>) -> bool {
            match node {
                None => true,
                Some(n) => {
                    let lw = weight(&n.left) as i64;
                    let rw = weight(&n.right) as i64;
                    let balanced = lw.max(rw) <= 2 * lw.min(rw) + 1;
                    balanced && walk(&n.left) && walk(&n.right)
                }
            }
        }
        walk(&self.root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct IdentityCfg;
    impl SetConfig<i32> for IdentityCfg {
        fn hash(&self, v: &i32) -> u64 {
            *v as u64
        }
        fn eq(&self, a: &i32, b: &i32) -> bool {
            a == b
        }
    }

    struct ConstantHashCfg;
    impl SetConfig<i32> for ConstantHashCfg {
        fn hash(&self, _v: &i32) -> u64 {
            42
        }
        fn eq(&self, a: &i32, b: &i32) -> bool {
            a == b
        }
    }

    fn insert_range(tree: &mut Tree<i32>, cfg: &impl SetConfig<i32>, range: std::ops::Range<i32>) {
        for v in range {
            tree.insert(cfg.hash(&v), v, cfg).unwrap();
        }
    }

    #[test]
    fn insert_find_delete_roundtrip() {
        let cfg = IdentityCfg;
        let mut tree = Tree::new();
        insert_range(&mut tree, &cfg, 0..10);
        assert_eq!(tree.cardinality(), 10);
        assert_eq!(tree.find(&5, &cfg), Some(&5));
        assert_eq!(tree.delete_one(cfg.hash(&5), &5, &cfg), Some(5));
        assert_eq!(tree.find(&5, &cfg), None);
        assert_eq!(tree.cardinality(), 9);
    }

    #[test]
    fn stays_weight_balanced_under_many_inserts() {
        let cfg = IdentityCfg;
        let mut tree = Tree::new();
        for v in 0..2000 {
            tree.insert(cfg.hash(&v), v, &cfg).unwrap();
            assert!(tree.check_weight_balance());
        }
        for v in 0..1000 {
            tree.delete_one(cfg.hash(&v), &v, &cfg);
            assert!(tree.check_weight_balance());
        }
    }

    #[test]
    fn forced_collisions_share_one_node() {
        let cfg = ConstantHashCfg;
        let mut tree = Tree::new();
        for v in 0..100 {
            tree.insert(cfg.hash(&v), v, &cfg).unwrap();
        }
        assert_eq!(tree.cardinality(), 100);
        for v in 0..100 {
            assert_eq!(tree.find(&v, &cfg), Some(&v));
        }
        assert_eq!(tree.root.as_ref().unwrap().count, 1);
        assert_eq!(tree.root.as_ref().unwrap().list.len(), 100);
    }

    #[test]
    fn delete_by_predicate_removes_matching_and_leaves_rest() {
        let cfg = IdentityCfg;
        let mut tree = Tree::new();
        insert_range(&mut tree, &cfg, 0..10);
        let removed = tree.delete_by_predicate(&mut |v| *v < 5);
        assert_eq!(removed, 5);
        assert_eq!(tree.cardinality(), 5);
        for v in 5..10 {
            assert_eq!(tree.find(&v, &cfg), Some(&v));
        }
    }

    #[test]
    fn union_merges_distinct_and_shared_hashes() {
        let cfg = IdentityCfg;
        let mut a = Tree::new();
        let mut b = Tree::new();
        insert_range(&mut a, &cfg, 0..10);
        insert_range(&mut b, &cfg, 5..15);
        a.union_into(&b, &cfg).unwrap();
        assert_eq!(a.cardinality(), 15);
    }

    #[test]
    fn is_subset_respects_direction() {
        let cfg = IdentityCfg;
        let mut a = Tree::new();
        let mut b = Tree::new();
        insert_range(&mut a, &cfg, 0..1000);
        insert_range(&mut b, &cfg, 0..100);
        assert!(b.is_subset(&a, &cfg));
        assert!(!a.is_subset(&b, &cfg));
    }

    #[test]
    fn subtree_bloom_is_superset_of_every_descendant_mask() {
        let cfg = IdentityCfg;
        let mut tree = Tree::new();
        insert_range(&mut tree, &cfg, 0..500);

        fn check<T>(node: &Option<Box<Node<T>>>) -> bool {
            match node {
                None => true,
                Some(n) => {
                    let own = bloom_from_hash(n.hash);
                    bloom_may_contain(own, n.subtree_bloom)
                        && bloom_may_contain(subtree_bloom(&n.left), n.subtree_bloom)
                        && bloom_may_contain(subtree_bloom(&n.right), n.subtree_bloom)
                        && check(&n.left)
                        && check(&n.right)
                }
            }
        }
        assert!(check(&tree.root));
    }

    #[test]
    fn find_returns_none_for_hash_never_inserted() {
        let cfg = IdentityCfg;
        let mut tree = Tree::new();
        insert_range(&mut tree, &cfg, 0..500);
        assert_eq!(tree.find(&12_345, &cfg), None);
    }

    #[test]
    fn select_stops_on_negative_and_respects_predicate() {
        let cfg = IdentityCfg;
        let mut tree = Tree::new();
        insert_range(&mut tree, &cfg, 0..20);
        let pred: &dyn Fn(&i32) -> bool = &|v| v % 2 == 0;
        let mut seen = Vec::new();
        tree.select(Some(pred), &mut |v| {
            seen.push(*v);
            0
        });
        assert!(seen.iter().all(|v| v % 2 == 0));
    }
}
