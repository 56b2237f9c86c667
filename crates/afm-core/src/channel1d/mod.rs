//! One-dimensional channel data: curves `y(x)`
//!
//! Every representation implements [`Channel1DData`]. Implementors supply the
//! element accessors and the declared x order; searches, ranges and ROI
//! sampling are provided on top of those and therefore behave identically for
//! every representation.
//!
//! # Search sentinels
//!
//! | order      | greatest x <= bound, none | smallest x >= bound, none |
//! |------------|---------------------------|---------------------------|
//! | ascending  | `-1`                      | `item_count`              |
//! | descending | `item_count`              | `-1`                      |
//! | unordered  | `-1`                      | `item_count`              |

mod flexible;
mod function;
mod grid;
mod point;
mod sinusoidal;

pub use flexible::FlexibleChannel1DData;
pub use function::FunctionChannel1DData;
pub use grid::GridChannel1DData;
pub use point::PointChannel1DData;
pub use sinusoidal::SinusoidalChannel1DData;

use crate::axis::Grid1D;
use crate::error::{check_index_range, Result};
use crate::geometry::{Point, RoiPosition, RoiShape};
use crate::index_range::IndexRange;
use crate::types::{Quantity, Range, SortedArrayOrder, DEFAULT_GRID_TOLERANCE};
use std::fmt;

/// First index in `0..n` for which `pred` is false, `pred` being true on a
/// prefix.
fn partition_point(n: usize, mut pred: impl FnMut(usize) -> bool) -> usize {
    let (mut lo, mut hi) = (0usize, n);
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if pred(mid) {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    lo
}

/// Ordered sequence of `(x, y)` samples.
pub trait Channel1DData: fmt::Debug + Send + Sync {
    fn x_quantity(&self) -> &Quantity;

    fn y_quantity(&self) -> &Quantity;

    fn item_count(&self) -> usize;

    /// x of sample `index`; `index < item_count()`
    fn x(&self, index: usize) -> f64;

    /// y of sample `index`; `index < item_count()`
    fn y(&self, index: usize) -> f64;

    /// Declared order of the x values; `None` for unsorted or unknown data,
    /// which turns every search into a linear scan.
    fn x_order(&self) -> Option<SortedArrayOrder>;

    /// Copy with every y multiplied by `factor`, optionally relabelled with
    /// a new y quantity.
    fn scaled_copy(&self, factor: f64, y_quantity: Option<Quantity>) -> Box<dyn Channel1DData>;

    fn is_empty(&self) -> bool {
        self.item_count() == 0
    }

    fn point(&self, index: usize) -> Point {
        Point::new(self.x(index), self.y(index))
    }

    /// Index of the greatest x not exceeding `upper_bound`.
    fn index_of_greatest_x_smaller_or_equal_to(&self, upper_bound: f64) -> isize {
        let n = self.item_count();
        match self.x_order() {
            Some(SortedArrayOrder::Ascending) => {
                partition_point(n, |i| self.x(i) <= upper_bound) as isize - 1
            }
            // qualifying values form a suffix; its first element is the greatest
            Some(SortedArrayOrder::Descending) => {
                partition_point(n, |i| self.x(i) > upper_bound) as isize
            }
            None => {
                let mut best = -1isize;
                let mut best_x = f64::NEG_INFINITY;
                for i in 0..n {
                    let x = self.x(i);
                    if x <= upper_bound && (best < 0 || x > best_x) {
                        best = i as isize;
                        best_x = x;
                    }
                }
                best
            }
        }
    }

    /// Index of the smallest x not below `lower_bound`.
    fn index_of_smallest_x_greater_or_equal_to(&self, lower_bound: f64) -> isize {
        let n = self.item_count();
        match self.x_order() {
            Some(SortedArrayOrder::Ascending) => {
                partition_point(n, |i| self.x(i) < lower_bound) as isize
            }
            // qualifying values form a prefix; its last element is the smallest
            Some(SortedArrayOrder::Descending) => {
                partition_point(n, |i| self.x(i) >= lower_bound) as isize - 1
            }
            None => {
                let mut best = n as isize;
                let mut best_x = f64::INFINITY;
                for i in 0..n {
                    let x = self.x(i);
                    if x >= lower_bound && (best == n as isize || x < best_x) {
                        best = i as isize;
                        best_x = x;
                    }
                }
                best
            }
        }
    }

    /// Indices of samples with `lower <= x <= upper`, in ascending index
    /// order whatever the data order.
    ///
    /// For ordered data the ends are the raw search results, so they may be
    /// sentinels and the range may be empty. Unordered data yields the span
    /// between the first and last qualifying index.
    fn index_range_bounded_by(&self, lower: f64, upper: f64) -> IndexRange {
        match self.x_order() {
            Some(SortedArrayOrder::Ascending) => IndexRange::new(
                self.index_of_smallest_x_greater_or_equal_to(lower),
                self.index_of_greatest_x_smaller_or_equal_to(upper),
            ),
            Some(SortedArrayOrder::Descending) => IndexRange::new(
                self.index_of_greatest_x_smaller_or_equal_to(upper),
                self.index_of_smallest_x_greater_or_equal_to(lower),
            ),
            None => {
                let mut found = IndexRange::new(0, -1);
                for i in 0..self.item_count() {
                    let x = self.x(i);
                    if lower <= x && x <= upper {
                        let i = i as isize;
                        found = found.span(&IndexRange::new(i, i));
                    }
                }
                found
            }
        }
    }

    fn x_range(&self) -> Range {
        let n = self.item_count();
        match (self.x_order(), n) {
            (_, 0) => Range::empty(),
            (Some(_), n) => Range::new(self.x(0), self.x(n - 1)),
            (None, n) => Range::of((0..n).map(|i| self.x(i))),
        }
    }

    fn y_range(&self) -> Range {
        Range::of((0..self.item_count()).map(|i| self.y(i)))
    }

    /// Extent of y over the samples whose x lies in `x_range`.
    fn y_range_in(&self, x_range: &Range) -> Range {
        let n = self.item_count();
        if x_range.is_empty() || n == 0 {
            return Range::empty();
        }
        match self.x_order() {
            Some(_) => {
                let window = self.index_range_bounded_by(x_range.min, x_range.max).clamped(n);
                if window.is_empty() {
                    return Range::empty();
                }
                Range::of((window.min..=window.max).map(|i| self.y(i as usize)))
            }
            None => Range::of(
                (0..n)
                    .filter(|&i| x_range.contains(self.x(i)))
                    .map(|i| self.y(i)),
            ),
        }
    }

    /// Extent of y over samples `from..to`.
    fn y_range_between(&self, from: usize, to: usize) -> Result<Range> {
        check_index_range(from, to, self.item_count())?;
        Ok(Range::of((from..to).map(|i| self.y(i))))
    }

    /// Samples `from..to` as points.
    fn points_between(&self, from: usize, to: usize) -> Result<Vec<Point>> {
        check_index_range(from, to, self.item_count())?;
        Ok((from..to).map(|i| self.point(i)).collect())
    }

    fn points(&self) -> Vec<Point> {
        (0..self.item_count()).map(|i| self.point(i)).collect()
    }

    fn x_values(&self) -> Vec<f64> {
        (0..self.item_count()).map(|i| self.x(i)).collect()
    }

    fn y_values(&self) -> Vec<f64> {
        (0..self.item_count()).map(|i| self.y(i)).collect()
    }

    /// y values of the samples `position` selects relative to `roi`.
    fn roi_y_values(&self, roi: &dyn RoiShape, position: RoiPosition) -> Vec<f64> {
        let n = self.item_count();
        let candidates = match (position, self.x_order()) {
            (RoiPosition::Inside, Some(_)) => {
                let bounds = roi.bounds();
                self.index_range_bounded_by(bounds.min_x, bounds.max_x).clamped(n)
            }
            _ => IndexRange::of_count(n),
        };
        if candidates.is_empty() {
            return Vec::new();
        }

        let mut values = Vec::with_capacity(candidates.len());
        for i in candidates.min..=candidates.max {
            let p = self.point(i as usize);
            if position.accepts(roi.contains(p.x, p.y)) {
                values.push(p.y);
            }
        }
        values.shrink_to_fit();
        values
    }
}

/// Build the most compact representation of sampled `(x, y)` data.
///
/// Monotonic x values lying on a regular grid give a
/// [`GridChannel1DData`]; everything else is kept as points.
pub fn channel_from_samples(
    xs: &[f64],
    ys: &[f64],
    x_quantity: Quantity,
    y_quantity: Quantity,
) -> Result<Box<dyn Channel1DData>> {
    let order = SortedArrayOrder::of(xs);
    if order.is_some() && xs.len() > 1 {
        if let Some(grid) =
            Grid1D::try_build_regular_grid(xs, x_quantity.clone(), DEFAULT_GRID_TOLERANCE)
        {
            return Ok(Box::new(GridChannel1DData::new(grid, ys.to_vec(), y_quantity)?));
        }
    }
    Ok(Box::new(FlexibleChannel1DData::from_xy(
        xs, ys, x_quantity, y_quantity, order,
    )?))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AfmError;
    use crate::geometry::Rect;

    fn q(name: &str) -> Quantity {
        Quantity::dimensionless(name)
    }

    fn ascending() -> FlexibleChannel1DData {
        FlexibleChannel1DData::from_xy(
            &[1.0, 3.0, 5.0, 7.0],
            &[10.0, 30.0, 50.0, 70.0],
            q("x"),
            q("y"),
            Some(SortedArrayOrder::Ascending),
        )
        .unwrap()
    }

    fn descending() -> FlexibleChannel1DData {
        FlexibleChannel1DData::from_xy(
            &[7.0, 5.0, 3.0, 1.0],
            &[70.0, 50.0, 30.0, 10.0],
            q("x"),
            q("y"),
            Some(SortedArrayOrder::Descending),
        )
        .unwrap()
    }

    #[test]
    fn test_partition_point() {
        let v = [1, 2, 2, 5];
        assert_eq!(partition_point(4, |i| v[i] <= 2), 3);
        assert_eq!(partition_point(4, |i| v[i] < 0), 0);
        assert_eq!(partition_point(0, |_| true), 0);
    }

    #[test]
    fn test_ascending_search_contract() {
        let c = ascending();
        assert_eq!(c.index_of_greatest_x_smaller_or_equal_to(4.0), 1);
        assert_eq!(c.index_of_greatest_x_smaller_or_equal_to(0.0), -1);
        assert_eq!(c.index_of_greatest_x_smaller_or_equal_to(7.0), 3);
        assert_eq!(c.index_of_smallest_x_greater_or_equal_to(4.0), 2);
        assert_eq!(c.index_of_smallest_x_greater_or_equal_to(8.0), 4);
        assert_eq!(c.index_of_smallest_x_greater_or_equal_to(1.0), 0);
    }

    #[test]
    fn test_descending_search_mirrors_ascending() {
        let a = ascending();
        let d = descending();
        for bound in [-1.0, 0.0, 1.0, 2.0, 3.0, 4.0, 6.5, 7.0, 8.0] {
            assert_eq!(
                d.index_of_greatest_x_smaller_or_equal_to(bound),
                3 - a.index_of_greatest_x_smaller_or_equal_to(bound),
                "greatest <= {bound}"
            );
            assert_eq!(
                d.index_of_smallest_x_greater_or_equal_to(bound),
                3 - a.index_of_smallest_x_greater_or_equal_to(bound),
                "smallest >= {bound}"
            );
        }
    }

    #[test]
    fn test_unordered_scan() {
        let c = FlexibleChannel1DData::from_xy(
            &[5.0, 1.0, 7.0, 3.0],
            &[0.0; 4],
            q("x"),
            q("y"),
            None,
        )
        .unwrap();
        assert_eq!(c.index_of_greatest_x_smaller_or_equal_to(4.0), 3);
        assert_eq!(c.index_of_greatest_x_smaller_or_equal_to(0.5), -1);
        assert_eq!(c.index_of_smallest_x_greater_or_equal_to(4.0), 0);
        assert_eq!(c.index_of_smallest_x_greater_or_equal_to(9.0), 4);
        assert_eq!(c.index_range_bounded_by(2.0, 6.0), IndexRange::new(0, 3));
        assert_eq!(c.x_range(), Range::new(1.0, 7.0));
    }

    #[test]
    fn test_index_range_is_ascending_for_both_orders() {
        assert_eq!(ascending().index_range_bounded_by(2.0, 6.0), IndexRange::new(1, 2));
        assert_eq!(descending().index_range_bounded_by(2.0, 6.0), IndexRange::new(1, 2));
        assert!(ascending().index_range_bounded_by(7.5, 9.0).is_empty());
    }

    #[test]
    fn test_y_ranges() {
        let c = ascending();
        assert_eq!(c.y_range(), Range::new(10.0, 70.0));
        assert_eq!(c.y_range_in(&Range::new(2.0, 6.0)), Range::new(30.0, 50.0));
        assert!(c.y_range_in(&Range::new(8.0, 9.0)).is_empty());
        assert_eq!(descending().y_range_in(&Range::new(2.0, 6.0)), Range::new(30.0, 50.0));
        assert_eq!(c.y_range_between(1, 3).unwrap(), Range::new(30.0, 50.0));
    }

    #[test]
    fn test_invalid_index_arguments_are_rejected() {
        let c = ascending();
        assert!(matches!(
            c.y_range_between(3, 2),
            Err(AfmError::InvalidIndexRange { from: 3, to: 2, count: 4 })
        ));
        assert!(c.points_between(0, 5).is_err());
        assert_eq!(c.points_between(4, 4).unwrap(), vec![]);
    }

    #[test]
    fn test_roi_y_values_partition() {
        let c = ascending();
        let roi = Rect::new(2.0, 0.0, 7.0, 60.0);
        let inside = c.roi_y_values(&roi, RoiPosition::Inside);
        let outside = c.roi_y_values(&roi, RoiPosition::Outside);
        assert_eq!(inside, vec![30.0, 50.0]);
        assert_eq!(outside, vec![10.0, 70.0]);
        assert_eq!(c.roi_y_values(&roi, RoiPosition::Everything).len(), 4);
    }

    #[test]
    fn test_channel_from_samples_picks_representation() {
        let ys = [1.0, 2.0, 3.0];
        let regular = channel_from_samples(&[0.0, 0.5, 1.0], &ys, q("x"), q("y")).unwrap();
        let irregular = channel_from_samples(&[0.0, 0.5, 2.0], &ys, q("x"), q("y")).unwrap();
        assert!(format!("{regular:?}").starts_with("GridChannel1DData"));
        assert!(format!("{irregular:?}").starts_with("FlexibleChannel1DData"));
        assert_eq!(regular.x_values(), vec![0.0, 0.5, 1.0]);
        assert_eq!(irregular.x_order(), Some(SortedArrayOrder::Ascending));
    }
}
