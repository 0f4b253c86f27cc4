//! Placement arena and pairwise compatibility index.
//!
//! Placements are stored once per recompute in an arena and referred to by
//! integer handles. They are grouped into one bucket per distinct remaining
//! length; sets of placements are bitsets over bucket-local positions.

use alloc::vec;
use alloc::vec::Vec;
use core::ops::Range;

use crate::bitboard::CellMask;
use crate::common::{EngineError, Inconsistency};
use crate::grid::Grid;
use crate::placement::{generate_placements, Placement};

/// Arena handle of a placement.
pub type PlacementId = usize;

/// Bitset over the placements of one bucket.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PlacementSet {
    words: Vec<u64>,
    len: usize,
}

impl PlacementSet {
    /// Empty set able to hold `len` positions.
    pub fn empty(len: usize) -> Self {
        Self {
            words: vec![0; len.div_ceil(64)],
            len,
        }
    }

    #[inline]
    pub fn insert(&mut self, pos: usize) {
        if pos < self.len {
            self.words[pos / 64] |= 1 << (pos % 64);
        }
    }

    #[inline]
    pub fn contains(&self, pos: usize) -> bool {
        pos < self.len && self.words[pos / 64] & (1 << (pos % 64)) != 0
    }

    /// Number of positions in the set.
    #[inline]
    pub fn count(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Keep only positions also in `other`.
    #[inline]
    pub fn intersect_with(&mut self, other: &PlacementSet) {
        for (a, b) in self.words.iter_mut().zip(&other.words) {
            *a &= *b;
        }
    }

    /// Drop positions present in `other`.
    #[inline]
    pub fn difference_with(&mut self, other: &PlacementSet) {
        for (a, b) in self.words.iter_mut().zip(&other.words) {
            *a &= !*b;
        }
    }

    /// Size of `self ∩ other` without allocating.
    #[inline]
    pub fn intersection_count(&self, other: &PlacementSet) -> usize {
        self.words
            .iter()
            .zip(&other.words)
            .map(|(a, b)| (a & b).count_ones() as usize)
            .sum()
    }

    /// Positions in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.words.iter().enumerate().flat_map(|(i, &w)| {
            let mut bits = w;
            core::iter::from_fn(move || {
                if bits == 0 {
                    return None;
                }
                let tz = bits.trailing_zeros() as usize;
                bits &= bits - 1;
                Some(i * 64 + tz)
            })
        })
    }
}

impl core::fmt::Debug for PlacementSet {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// All placements of one distinct remaining length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LengthBucket {
    pub length: usize,
    /// How many remaining ships have this length.
    pub multiplicity: usize,
    /// Arena handles of the bucket's placements.
    pub range: Range<PlacementId>,
}

impl LengthBucket {
    pub fn len(&self) -> usize {
        self.range.len()
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }
}

/// Placements of every remaining length, generated once per recompute.
#[derive(Debug, Clone)]
pub struct PlacementArena {
    placements: Vec<Placement>,
    buckets: Vec<LengthBucket>,
    bucket_of: Vec<usize>,
}

impl PlacementArena {
    /// Generate placements for every distinct remaining length, longest
    /// first. Fails if a remaining length cannot be placed anywhere.
    pub fn build(grid: &Grid) -> Result<Self, EngineError> {
        let mut placements = Vec::new();
        let mut buckets: Vec<LengthBucket> = Vec::new();
        let mut bucket_of = Vec::new();
        // remaining lengths are sorted descending, so equal lengths are adjacent
        for &length in grid.remaining_ship_lengths() {
            if let Some(last) = buckets.last_mut() {
                if last.length == length {
                    last.multiplicity += 1;
                    continue;
                }
            }
            let generated = generate_placements(grid, length);
            if generated.is_empty() {
                return Err(EngineError::InconsistentState(Inconsistency::Unplaceable(length)));
            }
            let start = placements.len();
            bucket_of.extend(core::iter::repeat(buckets.len()).take(generated.len()));
            placements.extend(generated);
            buckets.push(LengthBucket {
                length,
                multiplicity: 1,
                range: start..placements.len(),
            });
        }
        log::debug!(
            "generated {} placements over {} lengths",
            placements.len(),
            buckets.len()
        );
        Ok(Self {
            placements,
            buckets,
            bucket_of,
        })
    }

    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    pub fn placement(&self, id: PlacementId) -> &Placement {
        &self.placements[id]
    }

    pub fn buckets(&self) -> &[LengthBucket] {
        &self.buckets
    }

    /// Bucket holding `id`.
    pub fn bucket_of(&self, id: PlacementId) -> usize {
        self.bucket_of[id]
    }

    /// Position of `id` inside its bucket.
    pub fn local(&self, id: PlacementId) -> usize {
        id - self.buckets[self.bucket_of[id]].range.start
    }

    /// Placements of `bucket` that avoid every cell of `forbidden`.
    pub fn avoiding(&self, bucket: usize, forbidden: CellMask) -> PlacementSet {
        let range = self.buckets[bucket].range.clone();
        let mut set = PlacementSet::empty(range.len());
        for (pos, id) in range.enumerate() {
            if !self.placements[id].cells().intersects(&forbidden) {
                set.insert(pos);
            }
        }
        set
    }

    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }
}

/// For every placement and every bucket, the placements of that bucket it
/// cannot coexist with. A placement is always in its own conflict set.
#[derive(Debug, Clone)]
pub struct CompatibilityIndex {
    conflicts: Vec<Vec<PlacementSet>>,
}

impl CompatibilityIndex {
    pub fn build(arena: &PlacementArena) -> Self {
        let mut conflicts: Vec<Vec<PlacementSet>> = arena
            .placements()
            .iter()
            .map(|_| {
                arena
                    .buckets()
                    .iter()
                    .map(|b| PlacementSet::empty(b.len()))
                    .collect()
            })
            .collect();

        let placements = arena.placements();
        for a in 0..placements.len() {
            let (bucket_a, local_a) = (arena.bucket_of(a), arena.local(a));
            for b in a..placements.len() {
                if placements[a].is_compatible_with(&placements[b]) {
                    continue;
                }
                let (bucket_b, local_b) = (arena.bucket_of(b), arena.local(b));
                conflicts[a][bucket_b].insert(local_b);
                conflicts[b][bucket_a].insert(local_a);
            }
        }
        Self { conflicts }
    }

    /// Placements of `bucket` incompatible with `id`.
    #[inline]
    pub fn conflicts(&self, id: PlacementId, bucket: usize) -> &PlacementSet {
        &self.conflicts[id][bucket]
    }

    /// Whether two placements can share a board.
    pub fn are_compatible(&self, arena: &PlacementArena, a: PlacementId, b: PlacementId) -> bool {
        !self.conflicts[a][arena.bucket_of(b)].contains(arena.local(b))
    }
}
