/*
 * Created on Wed Jan 15 2025
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

//! The element descriptor bound to every [`crate::set::Set`].
//!
//! The origin library passes this around as `struct r_set_cfg`, a record of four
//! nullable function pointers (`hashf`, `cmpf`, `copyf`, `freef`). A parametric
//! trait captures the same opt-in shape without the null-pointer-as-absence
//! encoding: `hash`/`eq` are required, `copy` has a default, and `free` has no
//! member at all because `Drop` already covers it.

use crate::error::SetError;

/// Binds a hash function and an equality predicate to an element type `T`,
/// with an optional duplication hook.
///
/// # Contract
///
/// - `hash` must be deterministic and pure for the lifetime of every value
///   currently stored in a [`crate::set::Set`] bound to this config.
/// - `eq` must be reflexive, symmetric and transitive, and consistent with
///   `hash`: `eq(a, b) == true` implies `hash(a) == hash(b)`.
/// - `copy`, when overridden, and the set's reliance on `Drop` for release,
///   must agree: if `copy` allocates a resource, `T::drop` must release it.
pub trait SetConfig<T> {
    /// Computes the hash of `value`. Collisions are expected and handled by
    /// the collision list at each tree node; this need not be cryptographic.
    fn hash(&self, value: &T) -> u64;

    /// Tests two elements for the equality the set will use to detect
    /// duplicates and resolve lookups.
    fn eq(&self, a: &T, b: &T) -> bool;

    /// Produces an independently owned duplicate of `value`.
    ///
    /// The default forwards to [`Clone`]; configs over types that are cheap
    /// or impossible to clone may override this to fail with
    /// [`SetError::OutOfMemory`] or to implement a custom duplication scheme
    /// (e.g. reference counting via `Rc::clone`, which never fails).
    fn copy(&self, value: &T) -> Result<T, SetError>
    where
        T: Clone,
    {
        Ok(value.clone())
    }
}
