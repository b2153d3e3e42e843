//! Tranche decomposition

use crate::instance::{Element, Side, Tranche};

/// Split `sequence` into two contiguous halves.
///
/// The left tranche takes the first `n / 2` elements and the right tranche
/// the rest, so for odd `n` the right side is one longer. The left side is
/// the one enumerated into the vault; the right side is probed in parallel,
/// which is where the extra element is cheapest to absorb.
pub fn split_tranches(sequence: &[Element]) -> (Tranche, Tranche) {
    let mid = sequence.len() / 2;
    let (left, right) = sequence.split_at(mid);
    (
        Tranche::new(Side::Left, 0, left.to_vec()),
        Tranche::new(Side::Right, mid, right.to_vec()),
    )
}
