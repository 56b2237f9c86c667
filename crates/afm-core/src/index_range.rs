//! Closed integer index intervals

use std::fmt;

/// Closed interval `[min, max]` of array indices.
///
/// Bounds are signed so that the `-1` / `item_count` sentinels produced by the
/// channel searches can be carried without conversion. A range with
/// `max < min` is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IndexRange {
    pub min: isize,
    pub max: isize,
}

impl IndexRange {
    pub fn new(min: isize, max: isize) -> Self {
        Self { min, max }
    }

    /// Range from two ends given in any order.
    pub fn spanning(a: isize, b: isize) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// All indices of an array with `count` items.
    pub fn of_count(count: usize) -> Self {
        Self::new(0, count as isize - 1)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.max < self.min
    }

    /// Number of indices covered
    #[inline]
    pub fn len(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            (self.max - self.min + 1) as usize
        }
    }

    #[inline]
    pub fn contains(&self, index: isize) -> bool {
        self.min <= index && index <= self.max
    }

    pub fn contains_range(&self, other: &IndexRange) -> bool {
        other.is_empty() || (self.min <= other.min && other.max <= self.max)
    }

    pub fn intersection(&self, other: &IndexRange) -> Option<IndexRange> {
        let r = IndexRange::new(self.min.max(other.min), self.max.min(other.max));
        if r.is_empty() {
            None
        } else {
            Some(r)
        }
    }

    pub fn intersects(&self, other: &IndexRange) -> bool {
        self.intersection(other).is_some()
    }

    /// True when the union of both ranges is one contiguous run of indices.
    pub fn is_connected_to(&self, other: &IndexRange) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        self.min <= other.max.saturating_add(1) && other.min <= self.max.saturating_add(1)
    }

    /// Smallest range containing both.
    pub fn span(&self, other: &IndexRange) -> IndexRange {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        IndexRange::new(self.min.min(other.min), self.max.max(other.max))
    }

    /// Shift both ends by `offset`, e.g. to express a sub-range in the
    /// indices of an enclosing array.
    pub fn shifted(&self, offset: isize) -> IndexRange {
        IndexRange::new(self.min + offset, self.max + offset)
    }

    /// Clip to `[0, count - 1]`.
    pub fn clamped(&self, count: usize) -> IndexRange {
        IndexRange::new(self.min.max(0), self.max.min(count as isize - 1))
    }

    /// Merge ranges into connected components.
    ///
    /// Ranges that overlap or touch end to end are grouped transitively and
    /// every group is replaced by its span; empty ranges are dropped. The
    /// result is sorted by `min` and independent of the input order.
    pub fn simplify(ranges: &[IndexRange]) -> Vec<IndexRange> {
        let ranges: Vec<IndexRange> = ranges.iter().copied().filter(|r| !r.is_empty()).collect();
        let n = ranges.len();

        // union-find over pairwise connections
        let mut parent: Vec<usize> = (0..n).collect();
        fn find(parent: &mut [usize], mut i: usize) -> usize {
            while parent[i] != i {
                parent[i] = parent[parent[i]];
                i = parent[i];
            }
            i
        }

        for i in 0..n {
            for j in (i + 1)..n {
                if ranges[i].is_connected_to(&ranges[j]) {
                    let a = find(&mut parent, i);
                    let b = find(&mut parent, j);
                    if a != b {
                        parent[b] = a;
                    }
                }
            }
        }

        let mut merged: Vec<Option<IndexRange>> = vec![None; n];
        for (i, range) in ranges.iter().enumerate() {
            let root = find(&mut parent, i);
            merged[root] = Some(match merged[root] {
                Some(existing) => existing.span(range),
                None => *range,
            });
        }

        let mut result: Vec<IndexRange> = merged.into_iter().flatten().collect();
        result.sort_by_key(|r| (r.min, r.max));
        result
    }
}

impl fmt::Display for IndexRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}
