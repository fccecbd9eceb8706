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

//! # bhashset
//!
//! A reentrant, in-memory set container over user-defined elements.
//!
//! The index backing a [`Set`] is a fixed-fanout array of buckets, each
//! holding a weight-balanced binary search tree keyed by element hash; each
//! tree node holds the (usually singleton) list of elements sharing that
//! hash, plus a Bloom filter summarising every hash reachable beneath it so
//! lookups can prune whole subtrees without visiting them.
//!
//! ```
//! use bhashset::{Set, SetConfig};
//!
//! struct U32Cfg;
//! impl SetConfig<u32> for U32Cfg {
//!     fn hash(&self, v: &u32) -> u64 {
//!         *v as u64
//!     }
//!     fn eq(&self, a: &u32, b: &u32) -> bool {
//!         a == b
//!     }
//! }
//!
//! let mut s = Set::new(U32Cfg);
//! s.insert(1).unwrap();
//! s.insert(2).unwrap();
//! assert_eq!(s.cardinality(), 2);
//! assert_eq!(s.contains(&1), Some(&1));
//! ```
//!
//! What this crate deliberately does not provide: persistence to disk,
//! ordered iteration by a user-meaningful key, or any internal
//! synchronisation for sharing one `Set` across threads. A `Set` is `Send`
//! whenever `T` and `C` are, and is left for the caller to wrap (e.g. in a
//! `Mutex`) for cross-thread use.

mod bloom;
mod bucket;
mod collision;
mod config;
mod error;
mod set;
mod tree;

pub use config::SetConfig;
pub use error::{SetError, SetResult};
pub use set::Set;
