//! Core types for subset-sum instances

use std::fmt;

/// A signed integer member of the input sequence.
pub type Element = i64;

/// A subset of a tranche, one bit per tranche position (bit 0 = first element).
pub type SubsetMask = u64;

/// Largest tranche a [`SubsetMask`] can address.
pub const MAX_TRANCHE_BITS: usize = 63;

/// Which half of the split input a tranche came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => write!(f, "left"),
            Side::Right => write!(f, "right"),
        }
    }
}

/// An ordered, immutable slice of the input sequence.
///
/// The tranche keeps its offset into the original sequence so witness masks
/// can be translated back to original indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tranche {
    side: Side,
    offset: usize,
    elements: Vec<Element>,
}

impl Tranche {
    pub fn new(side: Side, offset: usize, elements: Vec<Element>) -> Self {
        Self {
            side,
            offset,
            elements,
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    /// Index of the first element in the original sequence
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Sum of the elements selected by `mask`.
    ///
    /// Callers validate the input range up front, so the sum of any subset
    /// fits in an `i64`.
    pub fn mask_sum(&self, mask: SubsetMask) -> Element {
        MaskBits(mask).map(|pos| self.elements[pos]).sum()
    }

    /// Elements selected by `mask`, in tranche order
    pub fn mask_elements(&self, mask: SubsetMask) -> Vec<Element> {
        MaskBits(mask).map(|pos| self.elements[pos]).collect()
    }

    /// Original-sequence indices selected by `mask`, in tranche order
    pub fn mask_indices(&self, mask: SubsetMask) -> Vec<usize> {
        MaskBits(mask).map(|pos| self.offset + pos).collect()
    }
}

/// Iterator over the set bit positions of a mask, lowest first.
#[derive(Debug, Clone, Copy)]
pub struct MaskBits(pub SubsetMask);

impl Iterator for MaskBits {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.0 == 0 {
            return None;
        }
        let pos = self.0.trailing_zeros() as usize;
        self.0 &= self.0 - 1;
        Some(pos)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.0.count_ones() as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for MaskBits {}

/// Reachable sum range of a whole sequence: (sum of negatives, sum of positives).
///
/// Computed in `i128`; returns `None` when the absolute total does not fit in
/// an `i64`, which would make subset sums overflow.
pub fn reachable_range(sequence: &[Element]) -> Option<(Element, Element)> {
    let mut negative: i128 = 0;
    let mut positive: i128 = 0;
    for &x in sequence {
        if x < 0 {
            negative += x as i128;
        } else {
            positive += x as i128;
        }
    }
    if positive - negative > i64::MAX as i128 {
        return None;
    }
    Some((negative as Element, positive as Element))
}
