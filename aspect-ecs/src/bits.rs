// Copyright 2025 John Brosnihan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Growable bitsets
//!
//! Component types and systems are each identified by a single bit. The
//! number of distinct kinds is not known up front, so [`Bits`] grows one
//! 64-bit word at a time and has no fixed maximum. The first two words live
//! inline, which covers up to 128 kinds without a heap allocation.

use smallvec::SmallVec;
use std::fmt;

const WORD_BITS: usize = 64;

/// A dynamically sized set of bit positions
///
/// Trailing zero words are always trimmed, so two sets holding the same
/// bits compare equal regardless of how they were built.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Bits {
    words: SmallVec<[u64; 2]>,
}

impl Bits {
    /// Create an empty set
    pub fn new() -> Self {
        Bits {
            words: SmallVec::new(),
        }
    }

    /// Create a set holding exactly one bit
    pub fn with_bit(bit: usize) -> Self {
        let mut bits = Bits::new();
        bits.set(bit);
        bits
    }

    /// Set the bit at `bit`, growing the set if needed
    pub fn set(&mut self, bit: usize) {
        let word = bit / WORD_BITS;
        if word >= self.words.len() {
            self.words.resize(word + 1, 0);
        }
        self.words[word] |= 1u64 << (bit % WORD_BITS);
    }

    /// Clear the bit at `bit`
    pub fn clear(&mut self, bit: usize) {
        let word = bit / WORD_BITS;
        if let Some(w) = self.words.get_mut(word) {
            *w &= !(1u64 << (bit % WORD_BITS));
            self.trim();
        }
    }

    /// Check whether the bit at `bit` is set
    pub fn contains(&self, bit: usize) -> bool {
        self.words
            .get(bit / WORD_BITS)
            .map_or(false, |w| w & (1u64 << (bit % WORD_BITS)) != 0)
    }

    /// True when no bit is set
    pub fn is_zero(&self) -> bool {
        self.words.is_empty()
    }

    /// True when every bit of `other` is also set in `self`
    pub fn contains_all(&self, other: &Bits) -> bool {
        other.words.iter().enumerate().all(|(i, &w)| {
            let mine = self.words.get(i).copied().unwrap_or(0);
            mine & w == w
        })
    }

    /// True when `self` and `other` share at least one bit
    pub fn intersects(&self, other: &Bits) -> bool {
        self.words
            .iter()
            .zip(other.words.iter())
            .any(|(a, b)| a & b != 0)
    }

    /// Set every bit that is set in `other`
    pub fn union_with(&mut self, other: &Bits) {
        if other.words.len() > self.words.len() {
            self.words.resize(other.words.len(), 0);
        }
        for (mine, theirs) in self.words.iter_mut().zip(other.words.iter()) {
            *mine |= theirs;
        }
    }

    /// Clear every bit that is set in `other`
    pub fn difference_with(&mut self, other: &Bits) {
        for (mine, theirs) in self.words.iter_mut().zip(other.words.iter()) {
            *mine &= !theirs;
        }
        self.trim();
    }

    /// Clear all bits
    pub fn reset(&mut self) {
        self.words.clear();
    }

    /// Number of bits set
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Iterate over the positions of set bits in ascending order
    pub fn iter_ones(&self) -> impl Iterator<Item = usize> + '_ {
        self.words.iter().enumerate().flat_map(|(i, &word)| {
            let mut remaining = word;
            std::iter::from_fn(move || {
                if remaining == 0 {
                    return None;
                }
                let offset = remaining.trailing_zeros() as usize;
                remaining &= remaining - 1;
                Some(i * WORD_BITS + offset)
            })
        })
    }

    fn trim(&mut self) {
        while self.words.last() == Some(&0) {
            self.words.pop();
        }
    }
}

impl FromIterator<usize> for Bits {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        let mut bits = Bits::new();
        for bit in iter {
            bits.set(bit);
        }
        bits
    }
}

impl fmt::Debug for Bits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter_ones()).finish()
    }
}
