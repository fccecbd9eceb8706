/*
 * Created on Thu Jan 16 2025
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

//! The chain of elements that share a single hash value.
//!
//! A tree node never stores more than one collision list, and the list never
//! contains two entries the config considers equal. Kept as a plain `Vec`
//! rather than a linked list: collisions are expected to be rare (a handful
//! of entries at worst, barring a pathological config), so the allocator
//! traffic of a linked list buys nothing over a flat, cache-friendly vector.

use crate::config::SetConfig;
use crate::error::SetError;

#[derive(Debug, Clone, Default)]
pub struct CollisionList<T> {
    entries: Vec<T>,
}

impl<T> CollisionList<T> {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    pub fn singleton(v: T) -> Self {
        Self { entries: vec![v] }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }

    /// Borrows the chain as a plain slice, in insertion order. Used by
    /// [`crate::tree::TreeIter`], which needs a concrete `slice::Iter` to
    /// hold across node boundaries rather than an opaque `impl Iterator`.
    pub fn as_slice(&self) -> &[T] {
        &self.entries
    }

    /// Inserts `v`, reporting [`SetError::AlreadyPresent`] if an entry
    /// compares equal under `cfg.eq`.
    pub fn insert<C: SetConfig<T> + ?Sized>(&mut self, v: T, cfg: &C) -> Result<(), SetError> {
        if self.entries.iter().any(|e| cfg.eq(e, &v)) {
            return Err(SetError::AlreadyPresent);
        }
        self.entries.push(v);
        Ok(())
    }

    pub fn find<'a, C: SetConfig<T> + ?Sized>(&'a self, q: &T, cfg: &C) -> Option<&'a T> {
        self.entries.iter().find(|e| cfg.eq(e, q))
    }

    /// Removes and returns the first entry equal to `q`.
    pub fn delete_one<C: SetConfig<T> + ?Sized>(&mut self, q: &T, cfg: &C) -> Option<T> {
        let pos = self.entries.iter().position(|e| cfg.eq(e, q))?;
        Some(self.entries.remove(pos))
    }

    /// Removes every entry for which `pred` holds; returns the removed count.
    pub fn delete_by_predicate(&mut self, pred: &mut dyn FnMut(&T) -> bool) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| !pred(e));
        before - self.entries.len()
    }

    /// True iff every entry of `self` is found (by `cfg.eq`) in `other`.
    pub fn is_subset<C: SetConfig<T> + ?Sized>(&self, other: &Self, cfg: &C) -> bool {
        self.entries.iter().all(|e| other.find(e, cfg).is_some())
    }

    /// Inserts a clone of each entry of `src` not already present.
    pub fn union_into<C: SetConfig<T> + ?Sized>(
        &mut self,
        src: &Self,
        cfg: &C,
    ) -> Result<(), SetError>
    where
        T: Clone,
    {
        for e in &src.entries {
            if self.find(e, cfg).is_none() {
                self.entries.push(cfg.copy(e)?);
            }
        }
        Ok(())
    }

    /// Calls `proc` for every entry accepted by `pred` (or every entry, when
    /// `pred` is `None`). Stops and returns the first negative result;
    /// returns zero if every call returned non-negative.
    pub fn select(
        &self,
        pred: Option<&dyn Fn(&T) -> bool>,
        proc: &mut dyn FnMut(&T) -> i32,
    ) -> i32 {
        for e in &self.entries {
            if pred.map_or(true, |p| p(e)) {
                let rc = proc(e);
                if rc < 0 {
                    return rc;
                }
            }
        }
        0
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

    #[test]
    fn insert_rejects_duplicates() {
        let cfg = IdentityCfg;
        let mut l = CollisionList::new();
        l.insert(1, &cfg).unwrap();
        assert_eq!(l.insert(1, &cfg), Err(SetError::AlreadyPresent));
        assert_eq!(l.len(), 1);
    }

    #[test]
    fn delete_one_removes_match() {
        let cfg = IdentityCfg;
        let mut l = CollisionList::new();
        l.insert(1, &cfg).unwrap();
        l.insert(2, &cfg).unwrap();
        assert_eq!(l.delete_one(&1, &cfg), Some(1));
        assert!(l.find(&1, &cfg).is_none());
        assert_eq!(l.len(), 1);
    }

    #[test]
    fn delete_by_predicate_counts_removed() {
        let cfg = IdentityCfg;
        let mut l = CollisionList::new();
        for v in 0..10 {
            l.insert(v, &cfg).unwrap();
        }
        let removed = l.delete_by_predicate(&mut |v| *v < 5);
        assert_eq!(removed, 5);
        assert_eq!(l.len(), 5);
    }

    #[test]
    fn subset_and_union() {
        let cfg = IdentityCfg;
        let mut a = CollisionList::new();
        let mut b = CollisionList::new();
        for v in 0..3 {
            a.insert(v, &cfg).unwrap();
        }
        for v in 0..5 {
            b.insert(v, &cfg).unwrap();
        }
        assert!(a.is_subset(&b, &cfg));
        assert!(!b.is_subset(&a, &cfg));

        let mut dest = CollisionList::new();
        dest.union_into(&a, &cfg).unwrap();
        dest.union_into(&b, &cfg).unwrap();
        assert_eq!(dest.len(), 5);
    }

    #[test]
    fn select_short_circuits_on_negative() {
        let cfg = IdentityCfg;
        let mut l = CollisionList::new();
        for v in 0..5 {
            l.insert(v, &cfg).unwrap();
        }
        let mut seen = Vec::new();
        let rc = l.select(None, &mut |v| {
            seen.push(*v);
            if *v == 2 {
                -1
            } else {
                0
            }
        });
        assert_eq!(rc, -1);
        assert_eq!(seen, vec![0, 1, 2]);
    }
}
