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

use std::fmt;

/// The result type used throughout this crate's fallible set operations.
pub type SetResult<T> = Result<T, SetError>;

/// Everything that can go wrong while operating on a [`crate::set::Set`].
///
/// This mirrors the three-way split the origin library signals through a single
/// status integer (`0`, `-EEXIST`, `-ENOMEM`, `-EINVAL`): logical errors, resource
/// errors and contract violations each get their own variant here instead of a
/// shared negative-errno convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetError {
    /// `insert` found an element that already compares equal under the set's
    /// configured `eq`.
    AlreadyPresent,
    /// `remove` (or an internal lookup expecting a match) found nothing.
    NotFound,
    /// A user-supplied `copy` hook reported it could not produce a duplicate.
    OutOfMemory,
    /// A binary operation (`union`, `intersection`, `xor`, `exclude`,
    /// `is_subset`, `equal`) was asked to combine sets with disagreeing
    /// configs, or a bucket-table union was asked to fan out from a finer
    /// table into a coarser one (the unsupported direction; see DESIGN.md).
    InvalidConfig,
}

impl fmt::Display for SetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyPresent => write!(f, "element already present in set"),
            Self::NotFound => write!(f, "element not found in set"),
            Self::OutOfMemory => write!(f, "allocation failed while duplicating element"),
            Self::InvalidConfig => write!(f, "sets do not share a compatible configuration"),
        }
    }
}

impl std::error::Error for SetError {}
