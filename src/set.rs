/*
 * Created on Tue Jan 21 2025
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

//! The public set facade: carries the user [`SetConfig`] and fronts a
//! [`BucketTable`] with the set-algebra operations a caller actually reaches
//! for.

use crate::bucket::BucketTable;
use crate::config::SetConfig;
use crate::error::SetError;

/// Default bucket fan-out exponent used by [`Set::new`]. Eight buckets is a
/// small enough table to keep single-bucket trees shallow for a few thousand
/// elements without over-allocating for the common case of a modestly sized
/// set.
const DEFAULT_BUCKET_EXP: u32 = 3;

/// A reentrant, in-memory set over elements of type `T`, keyed by the hash
/// and equality the bound [`SetConfig`] `C` supplies.
///
/// `Set` owns every element it holds; there is no borrowed/loaned storage
/// mode. Dropping a `Set` drops every stored element through `T`'s own
/// `Drop`, recursively, with no opt-in step required.
pub struct Set<T, C> {
    table: BucketTable<T>,
    config: C,
}

impl<T, C: SetConfig<T>> Set<T, C> {
    /// Creates an empty set bound to `cfg`, with the default bucket fan-out.
    pub fn new(cfg: C) -> Self {
        Self::with_bucket_exp(cfg, DEFAULT_BUCKET_EXP)
    }

    /// Creates an empty set with `2^size_exp` top-level buckets.
    pub fn with_bucket_exp(cfg: C, size_exp: u32) -> Self {
        Self {
            table: BucketTable::new(size_exp),
            config: cfg,
        }
    }

    pub fn cardinality(&self) -> usize {
        self.table.cardinality()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn contains(&self, v: &T) -> Option<&T> {
        self.table.find(v, &self.config)
    }

    pub fn insert(&mut self, v: T) -> Result<(), SetError> {
        let r = self.table.insert(v, &self.config);
        if let Err(e) = r {
            log::debug!("insert rejected: {e}");
        }
        r
    }

    pub fn remove(&mut self, v: &T) -> Option<T> {
        let removed = self.table.delete(v, &self.config);
        if removed.is_none() {
            log::trace!("remove: no matching element");
        }
        removed
    }

    /// Removes every element for which `pred` holds; returns the removed
    /// count.
    pub fn delete_by_predicate(&mut self, pred: &mut dyn FnMut(&T) -> bool) -> usize {
        self.table.delete_by_predicate(pred)
    }

    /// Iterates over every stored element, in an unspecified order, calling
    /// `proc` for each one accepted by `pred` (or every element, if `pred`
    /// is `None`). Stops early and returns the first negative `proc` result;
    /// returns zero if every call returned non-negative.
    pub fn select(&self, pred: Option<&dyn Fn(&T) -> bool>, proc: &mut dyn FnMut(&T) -> i32) -> i32 {
        self.table.select(pred, proc)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.table.iter()
    }

    fn clear(&mut self) {
        self.table = BucketTable::new(self.table.size_exp());
    }
}

impl<T: Clone, C: SetConfig<T>> Set<T, C> {
    /// Like [`select`](Self::select), but every element accepted by `pred`
    /// is also duplicated (via `cfg.copy`) into `dest` before `proc` runs.
    /// A duplicate already present in `dest` is silently skipped rather than
    /// reported, matching `union`'s treatment of overlap.
    pub fn select_into(
        &self,
        pred: Option<&dyn Fn(&T) -> bool>,
        proc: &mut dyn FnMut(&T) -> i32,
        dest: &mut Self,
    ) -> Result<i32, SetError> {
        for v in self.iter() {
            if pred.map_or(true, |p| p(v)) {
                let copied = self.config.copy(v)?;
                match dest.table.insert(copied, &dest.config) {
                    Ok(()) | Err(SetError::AlreadyPresent) => {}
                    Err(e) => return Err(e),
                }
                let rc = proc(v);
                if rc < 0 {
                    return Ok(rc);
                }
            }
        }
        Ok(0)
    }
}

impl<T, C: SetConfig<T> + PartialEq> Set<T, C> {
    /// True iff `self` and `other` share a config and contain exactly the
    /// same elements.
    pub fn equal(&self, other: &Self) -> bool {
        self.config == other.config && self.table.equal(&other.table, &self.config)
    }

    /// True iff every element of `self` is also present in `other`, under a
    /// shared config.
    pub fn is_subset(&self, other: &Self) -> bool {
        self.config == other.config && self.table.is_subset(&other.table, &self.config)
    }
}

impl<T: Clone, C: SetConfig<T> + PartialEq> Set<T, C> {
    fn require_matching_configs(dest: &Self, a: &Self, b: &Self) -> Result<(), SetError> {
        if dest.config == a.config && dest.config == b.config {
            Ok(())
        } else {
            Err(SetError::InvalidConfig)
        }
    }

    fn copy_all_into(dest: &mut Self, src: &Self) -> Result<(), SetError> {
        for v in src.iter() {
            let copied = dest.config.copy(v)?;
            match dest.table.insert(copied, &dest.config) {
                Ok(()) | Err(SetError::AlreadyPresent) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    /// `dest` becomes the union of `a` and `b`. All three must share a
    /// config.
    pub fn union(dest: &mut Self, a: &Self, b: &Self) -> Result<(), SetError> {
        Self::require_matching_configs(dest, a, b)?;
        dest.clear();
        Self::copy_all_into(dest, a)?;
        Self::copy_all_into(dest, b)
    }

    /// `dest` becomes the intersection of `a` and `b`.
    pub fn intersection(dest: &mut Self, a: &Self, b: &Self) -> Result<(), SetError> {
        Self::require_matching_configs(dest, a, b)?;
        dest.clear();
        let (smaller, larger) = if a.cardinality() <= b.cardinality() {
            (a, b)
        } else {
            (b, a)
        };
        for v in smaller.iter() {
            if larger.contains(v).is_some() {
                let copied = dest.config.copy(v)?;
                match dest.table.insert(copied, &dest.config) {
                    Ok(()) | Err(SetError::AlreadyPresent) => {}
                    Err(e) => return Err(e),
                }
            }
        }
        Ok(())
    }

    /// `dest` becomes the symmetric difference of `a` and `b`.
    pub fn xor(dest: &mut Self, a: &Self, b: &Self) -> Result<(), SetError> {
        Self::require_matching_configs(dest, a, b)?;
        dest.clear();
        for v in a.iter() {
            if b.contains(v).is_none() {
                let copied = dest.config.copy(v)?;
                dest.table.insert(copied, &dest.config).ok();
            }
        }
        for v in b.iter() {
            if a.contains(v).is_none() {
                let copied = dest.config.copy(v)?;
                dest.table.insert(copied, &dest.config).ok();
            }
        }
        Ok(())
    }

    /// `dest` becomes the elements of `a` that are not present in `b`.
    pub fn exclude(dest: &mut Self, a: &Self, b: &Self) -> Result<(), SetError> {
        Self::require_matching_configs(dest, a, b)?;
        dest.clear();
        for v in a.iter() {
            if b.contains(v).is_none() {
                let copied = dest.config.copy(v)?;
                dest.table.insert(copied, &dest.config).ok();
            }
        }
        Ok(())
    }
}

impl<T, C> Drop for Set<T, C> {
    fn drop(&mut self) {
        log::trace!("dropping Set");
    }
}
