//! One-dimensional axes mapping physical coordinates to node indices
//!
//! A [`Grid1D`] is regular (origin plus constant increment) and may run in
//! either direction; an [`IncreasingDataAxis1D`] holds explicit non-decreasing
//! nodes. Both answer the same queries through [`DataAxis1D`], and [`Axis1D`]
//! is the closed sum of the two used by semi-regular 2D supports.
//!
//! Index queries come in two families. The unqualified `floor_index` and
//! `ceiling_index` may return `-1` or `count` to say that a coordinate lies
//! outside the nodes; the `*_within_bounds` variants clamp to `[0, count - 1]`.

use crate::error::{AfmError, Result};
use crate::types::{Quantity, Range, SortedArrayOrder};

/// Fractional indices closer than this to an integer are snapped to it
const INDEX_SNAP: f64 = 1e-9;

#[inline]
fn snap(f: f64) -> f64 {
    let r = f.round();
    if (f - r).abs() < INDEX_SNAP {
        r
    } else {
        f
    }
}

#[inline]
fn clamp_sentinel(i: f64, count: usize) -> isize {
    if i.is_nan() {
        return -1;
    }
    i.max(-1.0).min(count as f64) as isize
}

// ============================================================================
// Shared capability
// ============================================================================

/// Mapping between coordinates and node indices of a 1D axis
pub trait DataAxis1D {
    fn quantity(&self) -> &Quantity;

    /// Number of nodes
    fn count(&self) -> usize;

    /// Coordinate of node `index`
    fn value(&self, index: usize) -> f64;

    /// Position of `x` in index space, linear between nodes and extrapolated
    /// beyond them
    fn fractional_index(&self, x: f64) -> f64;

    /// Coordinate at a fractional index
    fn value_at(&self, fractional_index: f64) -> f64;

    /// Direction in which coordinates change with the index
    fn order(&self) -> SortedArrayOrder;

    /// Distance from node `index` to the following node; the last node
    /// reports the distance to its predecessor.
    fn increment_to_next(&self, index: usize) -> f64;

    /// Distance from node `index` to the preceding node; the first node
    /// reports the distance to its successor.
    fn increment_to_previous(&self, index: usize) -> f64;

    fn minimum(&self) -> f64 {
        match self.count() {
            0 => f64::NAN,
            n => self.value(0).min(self.value(n - 1)),
        }
    }

    fn maximum(&self) -> f64 {
        match self.count() {
            0 => f64::NAN,
            n => self.value(0).max(self.value(n - 1)),
        }
    }

    fn range(&self) -> Range {
        Range::new(self.minimum(), self.maximum())
    }

    fn length(&self) -> f64 {
        self.maximum() - self.minimum()
    }

    fn nodes(&self) -> Vec<f64> {
        (0..self.count()).map(|i| self.value(i)).collect()
    }

    fn is_within_domain(&self, x: f64) -> bool {
        self.minimum() <= x && x <= self.maximum()
    }

    /// Nearest node index.
    ///
    /// A regular grid extrapolates, so the result may be negative or at least
    /// `count` outside the domain. An irregular axis has no spacing beyond its
    /// end nodes and returns the nearest end node instead. Use
    /// [`index_within_bounds`](Self::index_within_bounds) for a result that
    /// is clamped on every axis.
    fn index(&self, x: f64) -> isize {
        let f = self.fractional_index(x);
        if f.is_nan() {
            return -1;
        }
        f.round() as isize
    }

    fn index_within_bounds(&self, x: f64) -> usize {
        let n = self.count();
        if n == 0 {
            return 0;
        }
        self.index(x).clamp(0, n as isize - 1) as usize
    }

    /// `floor` of the fractional index, `-1` below and `count` far above the nodes
    fn floor_index(&self, x: f64) -> isize {
        clamp_sentinel(snap(self.fractional_index(x)).floor(), self.count())
    }

    /// `ceil` of the fractional index, `-1` far below and `count` above the nodes
    fn ceiling_index(&self, x: f64) -> isize {
        clamp_sentinel(snap(self.fractional_index(x)).ceil(), self.count())
    }

    fn floor_index_within_bounds(&self, x: f64) -> usize {
        let n = self.count();
        if n == 0 {
            return 0;
        }
        self.floor_index(x).clamp(0, n as isize - 1) as usize
    }

    fn ceiling_index_within_bounds(&self, x: f64) -> usize {
        let n = self.count();
        if n == 0 {
            return 0;
        }
        self.ceiling_index(x).clamp(0, n as isize - 1) as usize
    }

    /// Average node spacing
    fn mean_increment(&self) -> f64 {
        match self.count() {
            0 | 1 => 0.0,
            n => self.length() / (n - 1) as f64,
        }
    }
}

// ============================================================================
// Regular grid
// ============================================================================

/// Regular axis: `value(i) = origin + i * signed_increment()`.
///
/// The increment is stored unsigned; the direction is kept separately in
/// `order`, derived from the sign passed at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid1D {
    origin: f64,
    increment: f64,
    count: usize,
    order: SortedArrayOrder,
    quantity: Quantity,
}

impl Grid1D {
    /// Build a grid from a signed increment.
    ///
    /// A negative increment yields a descending grid. A zero increment is only
    /// meaningful, and only accepted, for grids with at most one node.
    pub fn new(origin: f64, increment: f64, count: usize, quantity: Quantity) -> Result<Self> {
        if !origin.is_finite() || !increment.is_finite() {
            return Err(AfmError::InvalidArgument(format!(
                "grid origin {origin} and increment {increment} must be finite"
            )));
        }
        if increment == 0.0 && count > 1 {
            return Err(AfmError::InvalidArgument(
                "zero increment for a grid with several nodes".into(),
            ));
        }
        let order = if increment < 0.0 {
            SortedArrayOrder::Descending
        } else {
            SortedArrayOrder::Ascending
        };
        Ok(Self {
            origin,
            increment: increment.abs(),
            count,
            order,
            quantity,
        })
    }

    /// Ascending grid with `count` nodes spanning `[min, max]`.
    pub fn spanning(min: f64, max: f64, count: usize, quantity: Quantity) -> Result<Self> {
        let (lo, hi) = (min.min(max), min.max(max));
        let increment = if count > 1 {
            (hi - lo) / (count - 1) as f64
        } else {
            0.0
        };
        Self::new(lo, increment, count, quantity)
    }

    pub fn origin(&self) -> f64 {
        self.origin
    }

    /// Node spacing, never negative
    pub fn increment(&self) -> f64 {
        self.increment
    }

    pub fn signed_increment(&self) -> f64 {
        match self.order {
            SortedArrayOrder::Ascending => self.increment,
            SortedArrayOrder::Descending => -self.increment,
        }
    }

    /// Same nodes with a different quantity.
    pub fn with_quantity(&self, quantity: Quantity) -> Grid1D {
        Grid1D {
            quantity,
            ..self.clone()
        }
    }

    /// Same origin and spacing traversed in direction `order`.
    pub fn with_order(&self, order: SortedArrayOrder) -> Grid1D {
        Grid1D {
            order,
            ..self.clone()
        }
    }

    /// Same domain sampled with `count` nodes.
    pub fn resized(&self, count: usize) -> Result<Grid1D> {
        let span = self.length();
        let increment = if count > 1 {
            span / (count - 1) as f64
        } else {
            0.0
        };
        let signed = match self.order {
            SortedArrayOrder::Ascending => increment,
            SortedArrayOrder::Descending => -increment,
        };
        Grid1D::new(self.origin, signed, count, self.quantity.clone())
    }

    /// Same nodes traversed in the opposite direction.
    pub fn reversed(&self) -> Grid1D {
        let last = match self.count {
            0 => self.origin,
            n => self.value(n - 1),
        };
        Grid1D {
            origin: last,
            order: self.order.reversed(),
            ..self.clone()
        }
    }

    /// Equality after converting `other` into this grid's unit prefix.
    pub fn equal_up_to_prefix(&self, other: &Grid1D) -> bool {
        let Some(factor) = other.quantity.conversion_factor(&self.quantity) else {
            return false;
        };
        if !self.quantity.is_compatible(&other.quantity)
            || self.count != other.count
            || (self.count > 1 && self.order != other.order)
        {
            return false;
        }
        let close = |a: f64, b: f64| {
            let scale = a.abs().max(b.abs()).max(self.increment).max(f64::MIN_POSITIVE);
            (a - b).abs() <= 1e-9 * scale
        };
        close(self.origin, other.origin * factor) && close(self.increment, other.increment * factor)
    }

    /// Infer a regular grid from sampled coordinates.
    ///
    /// Succeeds only if, after sorting, every value sits within
    /// `tolerance * increment` of its own node and every node is hit exactly
    /// once. Absence is not an error: the caller falls back to an irregular
    /// axis. Ascending input gives an ascending grid, descending input a
    /// descending one, anything else an ascending grid.
    pub fn try_build_regular_grid(
        values: &[f64],
        quantity: Quantity,
        tolerance: f64,
    ) -> Option<Grid1D> {
        if values.is_empty() || values.iter().any(|v| !v.is_finite()) {
            return None;
        }
        if values.len() == 1 {
            return Grid1D::new(values[0], 0.0, 1, quantity).ok();
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        let min = sorted[0];
        let max = sorted[sorted.len() - 1];
        let span = max - min;
        if span <= 0.0 {
            return None;
        }

        let smallest_gap = sorted
            .windows(2)
            .map(|w| w[1] - w[0])
            .filter(|&g| g > tolerance * span)
            .fold(f64::INFINITY, f64::min);
        if !smallest_gap.is_finite() {
            return None;
        }

        let count = (span / smallest_gap).round() as usize + 1;
        if count != sorted.len() {
            return None;
        }
        let increment = span / (count - 1) as f64;

        let mut filled = vec![false; count];
        for &v in &sorted {
            let slot = ((v - min) / increment).round();
            if slot < 0.0 || slot >= count as f64 {
                return None;
            }
            let slot_index = slot as usize;
            if (v - (min + slot * increment)).abs() > tolerance * increment || filled[slot_index] {
                return None;
            }
            filled[slot_index] = true;
        }

        match SortedArrayOrder::of(values) {
            Some(SortedArrayOrder::Descending) => {
                Grid1D::new(max, -increment, count, quantity).ok()
            }
            _ => Grid1D::new(min, increment, count, quantity).ok(),
        }
    }
}

impl DataAxis1D for Grid1D {
    fn quantity(&self) -> &Quantity {
        &self.quantity
    }

    fn count(&self) -> usize {
        self.count
    }

    #[inline]
    fn value(&self, index: usize) -> f64 {
        self.origin + index as f64 * self.signed_increment()
    }

    fn fractional_index(&self, x: f64) -> f64 {
        if self.increment == 0.0 {
            return if x < self.origin {
                -1.0
            } else if x > self.origin {
                1.0
            } else {
                0.0
            };
        }
        (x - self.origin) / self.signed_increment()
    }

    fn value_at(&self, fractional_index: f64) -> f64 {
        self.origin + fractional_index * self.signed_increment()
    }

    fn order(&self) -> SortedArrayOrder {
        self.order
    }

    fn increment_to_next(&self, _index: usize) -> f64 {
        self.increment
    }

    fn increment_to_previous(&self, _index: usize) -> f64 {
        self.increment
    }

    fn mean_increment(&self) -> f64 {
        self.increment
    }
}

// ============================================================================
// Irregular axis
// ============================================================================

/// Axis with explicit, non-decreasing node coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct IncreasingDataAxis1D {
    nodes: Vec<f64>,
    quantity: Quantity,
}

impl IncreasingDataAxis1D {
    pub fn new(nodes: Vec<f64>, quantity: Quantity) -> Result<Self> {
        if nodes.is_empty() {
            return Err(AfmError::InvalidArgument("axis without nodes".into()));
        }
        if nodes.iter().any(|v| v.is_nan()) || nodes.windows(2).any(|w| w[1] < w[0]) {
            return Err(AfmError::NotMonotonic);
        }
        Ok(Self { nodes, quantity })
    }

    pub fn node_slice(&self) -> &[f64] {
        &self.nodes
    }

    /// Index of the last node `<= x`, if any.
    fn segment_start(&self, x: f64) -> Option<usize> {
        let p = self.nodes.partition_point(|&v| v <= x);
        p.checked_sub(1)
    }
}

impl DataAxis1D for IncreasingDataAxis1D {
    fn quantity(&self) -> &Quantity {
        &self.quantity
    }

    fn count(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    fn value(&self, index: usize) -> f64 {
        self.nodes[index]
    }

    fn fractional_index(&self, x: f64) -> f64 {
        let n = self.nodes.len();
        if x.is_nan() {
            return f64::NAN;
        }
        if n == 1 {
            return if x < self.nodes[0] {
                -1.0
            } else if x > self.nodes[0] {
                1.0
            } else {
                0.0
            };
        }
        let first = self.nodes[0];
        let last = self.nodes[n - 1];
        if x < first {
            let step = self.nodes[1] - first;
            return if step > 0.0 { (x - first) / step } else { -1.0 };
        }
        if x > last {
            let step = last - self.nodes[n - 2];
            let beyond = if step > 0.0 { (x - last) / step } else { 1.0 };
            return (n - 1) as f64 + beyond;
        }
        // x within [first, last]
        let i = self.segment_start(x).unwrap_or(0);
        if i >= n - 1 {
            return (n - 1) as f64;
        }
        let step = self.nodes[i + 1] - self.nodes[i];
        if step > 0.0 {
            i as f64 + (x - self.nodes[i]) / step
        } else {
            i as f64
        }
    }

    /// Linear between nodes, clamped to the end nodes.
    fn value_at(&self, fractional_index: f64) -> f64 {
        let n = self.nodes.len();
        let f = fractional_index.clamp(0.0, (n - 1) as f64);
        let i = f.floor() as usize;
        if i >= n - 1 {
            return self.nodes[n - 1];
        }
        let t = f - i as f64;
        self.nodes[i] + t * (self.nodes[i + 1] - self.nodes[i])
    }

    fn order(&self) -> SortedArrayOrder {
        SortedArrayOrder::Ascending
    }

    fn increment_to_next(&self, index: usize) -> f64 {
        let n = self.nodes.len();
        if n < 2 {
            return 0.0;
        }
        if index + 1 < n {
            self.nodes[index + 1] - self.nodes[index]
        } else {
            self.nodes[n - 1] - self.nodes[n - 2]
        }
    }

    fn increment_to_previous(&self, index: usize) -> f64 {
        let n = self.nodes.len();
        if n < 2 {
            return 0.0;
        }
        if index > 0 && index < n {
            self.nodes[index] - self.nodes[index - 1]
        } else if index == 0 {
            self.nodes[1] - self.nodes[0]
        } else {
            self.nodes[n - 1] - self.nodes[n - 2]
        }
    }

    /// Closest node; ties go to the lower index. Clamped to the end nodes.
    fn index(&self, x: f64) -> isize {
        let n = self.nodes.len();
        let p = self.nodes.partition_point(|&v| v < x);
        if p == 0 {
            return 0;
        }
        if p >= n {
            return n as isize - 1;
        }
        let below = x - self.nodes[p - 1];
        let above = self.nodes[p] - x;
        if below <= above {
            p as isize - 1
        } else {
            p as isize
        }
    }

    fn minimum(&self) -> f64 {
        self.nodes[0]
    }

    fn maximum(&self) -> f64 {
        self.nodes[self.nodes.len() - 1]
    }

    fn nodes(&self) -> Vec<f64> {
        self.nodes.clone()
    }
}

// ============================================================================
// Closed sum of both axes
// ============================================================================

/// Either a regular or an irregular axis
#[derive(Debug, Clone, PartialEq)]
pub enum Axis1D {
    Regular(Grid1D),
    Irregular(IncreasingDataAxis1D),
}

impl Axis1D {
    /// Regular grid when the nodes allow it, in either direction, irregular
    /// axis otherwise.
    ///
    /// Only an irregular node list that is not ascending is an error.
    pub fn from_nodes(nodes: Vec<f64>, quantity: Quantity, tolerance: f64) -> Result<Axis1D> {
        match Grid1D::try_build_regular_grid(&nodes, quantity.clone(), tolerance) {
            Some(grid) => Ok(Axis1D::Regular(grid)),
            None => IncreasingDataAxis1D::new(nodes, quantity).map(Axis1D::Irregular),
        }
    }

    pub fn as_regular(&self) -> Option<&Grid1D> {
        match self {
            Axis1D::Regular(g) => Some(g),
            Axis1D::Irregular(_) => None,
        }
    }

    pub fn is_regular(&self) -> bool {
        matches!(self, Axis1D::Regular(_))
    }
}

impl From<Grid1D> for Axis1D {
    fn from(grid: Grid1D) -> Self {
        Axis1D::Regular(grid)
    }
}

impl From<IncreasingDataAxis1D> for Axis1D {
    fn from(axis: IncreasingDataAxis1D) -> Self {
        Axis1D::Irregular(axis)
    }
}

macro_rules! delegate_axis {
    ($self:ident, $a:ident => $e:expr) => {
        match $self {
            Axis1D::Regular($a) => $e,
            Axis1D::Irregular($a) => $e,
        }
    };
}

impl DataAxis1D for Axis1D {
    fn quantity(&self) -> &Quantity {
        delegate_axis!(self, a => a.quantity())
    }

    fn count(&self) -> usize {
        delegate_axis!(self, a => a.count())
    }

    fn value(&self, index: usize) -> f64 {
        delegate_axis!(self, a => a.value(index))
    }

    fn fractional_index(&self, x: f64) -> f64 {
        delegate_axis!(self, a => a.fractional_index(x))
    }

    fn value_at(&self, fractional_index: f64) -> f64 {
        delegate_axis!(self, a => a.value_at(fractional_index))
    }

    fn order(&self) -> SortedArrayOrder {
        delegate_axis!(self, a => a.order())
    }

    fn increment_to_next(&self, index: usize) -> f64 {
        delegate_axis!(self, a => a.increment_to_next(index))
    }

    fn increment_to_previous(&self, index: usize) -> f64 {
        delegate_axis!(self, a => a.increment_to_previous(index))
    }

    fn index(&self, x: f64) -> isize {
        delegate_axis!(self, a => a.index(x))
    }

    fn minimum(&self) -> f64 {
        delegate_axis!(self, a => a.minimum())
    }

    fn maximum(&self) -> f64 {
        delegate_axis!(self, a => a.maximum())
    }

    fn mean_increment(&self) -> f64 {
        delegate_axis!(self, a => a.mean_increment())
    }
}

// ============================================================================
// Tests
// ============================================================================
