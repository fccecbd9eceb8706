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

//! Bloom summaries used to prune tree descents.
//!
//! Each tree node carries a `u64` mask that is the bitwise OR of the Bloom
//! masks of every hash in its subtree. Before following a child link the
//! walk checks whether the sought hash's own mask could possibly be a subset
//! of that child's summary; a clean "no" lets the walk bail out before
//! touching the child at all.

/// Number of bits set per generated mask. Three variants of the same hash
/// are folded in, so any single shared element flips at least three bits in
/// both operands' summaries.
const HASH_VARIANTS: u32 = 3;

/// Bit width of the mask type.
const BLOOM_BITS: u32 = u64::BITS;

/// Derives a Bloom mask from a hash by repeatedly taking `hash % BLOOM_BITS`
/// as a bit position and dividing `hash` by `BLOOM_BITS` between draws.
///
/// Two equal hashes always produce equal masks.
#[inline]
pub fn bloom_from_hash(mut hash: u64) -> u64 {
    let mut mask = 0u64;
    for _ in 0..HASH_VARIANTS {
        mask |= 1u64 << (hash % u64::from(BLOOM_BITS));
        hash /= u64::from(BLOOM_BITS);
    }
    mask
}

/// Tests whether `query`'s bits are all present in `set`, i.e. whether the
/// element `query` was derived from *may* be part of whatever `set`
/// summarises. A `false` result is conclusive: the element cannot be
/// present.
#[inline]
pub fn bloom_may_contain(query: u64, set: u64) -> bool {
    query & !set == 0
}

/// Approximates whether two Bloom-summarised collections could share any
/// element. `false` is conclusive (disjoint); `true` may be a false
/// positive.
#[inline]
pub fn bloom_may_intersect(a: u64, b: u64) -> bool {
    (a & b).count_ones() >= HASH_VARIANTS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_hashes_produce_equal_masks() {
        assert_eq!(bloom_from_hash(42), bloom_from_hash(42));
        assert_eq!(bloom_from_hash(0), bloom_from_hash(0));
    }

    #[test]
    fn mask_has_at_most_three_bits() {
        for h in [0u64, 1, 42, u64::MAX, 123_456_789] {
            assert!(bloom_from_hash(h).count_ones() <= HASH_VARIANTS);
        }
    }

    #[test]
    fn self_mask_contains_itself() {
        let m = bloom_from_hash(777);
        assert!(bloom_may_contain(m, m));
    }

    #[test]
    fn empty_set_contains_nothing_but_zero() {
        assert!(bloom_may_contain(0, 0));
        assert!(!bloom_may_contain(bloom_from_hash(5), 0));
    }

    #[test]
    fn disjoint_masks_never_claim_intersection() {
        // a set summary of exactly zero bits in common with the query cannot
        // reach HASH_VARIANTS shared bits.
        assert!(!bloom_may_intersect(0, bloom_from_hash(9)));
    }

    #[test]
    fn identical_masks_claim_intersection() {
        let m = bloom_from_hash(13);
        assert!(bloom_may_intersect(m, m));
    }
}
