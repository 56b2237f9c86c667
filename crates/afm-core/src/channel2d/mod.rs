//! Two-dimensional channel data: surfaces `z(x, y)`
//!
//! Samples are addressed by a flat index. Dense representations order it row
//! by row (`index = row * column_count + column`); scattered data keeps the
//! order it was given in.

mod flexible;
mod grid;
mod semigrid;

pub use flexible::FlexibleChannel2DData;
pub use grid::GridChannel2DData;
pub use semigrid::SemiGridChannel2DData;

use crate::axis::Grid1D;
use crate::error::{AfmError, Result};
use crate::geometry::{Point, Rect, RoiPosition, RoiShape};
use crate::grid2d::Grid2D;
use crate::types::{Quantity, Range, MAD_TO_SIGMA, ROBUST_RANGE_MAD_FACTOR};
use std::borrow::Cow;
use std::fmt;

/// Surface sampled at possibly irregular `(x, y)` locations.
pub trait Channel2DData: fmt::Debug + Send + Sync {
    fn x_quantity(&self) -> &Quantity;

    fn y_quantity(&self) -> &Quantity;

    fn z_quantity(&self) -> &Quantity;

    fn item_count(&self) -> usize;

    fn x(&self, index: usize) -> f64;

    fn y(&self, index: usize) -> f64;

    fn z(&self, index: usize) -> f64;

    /// Data resampled onto a grid chosen to keep the nominal point density.
    fn default_gridding(&self) -> Result<Cow<'_, GridChannel2DData>>;

    /// Data resampled onto `grid`.
    ///
    /// Grid-backed data whose grid equals `grid` up to unit prefix is
    /// returned as is.
    fn gridding(&self, grid: &Grid2D) -> Result<Cow<'_, GridChannel2DData>>;

    /// Interpolated value at `(x, y)`; NaN outside the domain or when the
    /// interpolation cannot be built.
    fn interpolated_z(&self, x: f64, y: f64) -> f64;

    /// Copy with every z multiplied by `factor`, optionally relabelled.
    fn scaled_copy(&self, factor: f64, z_quantity: Option<Quantity>) -> Box<dyn Channel2DData>;

    fn is_empty(&self) -> bool {
        self.item_count() == 0
    }

    fn point(&self, index: usize) -> Point {
        Point::new(self.x(index), self.y(index))
    }

    fn x_range(&self) -> Range {
        Range::of((0..self.item_count()).map(|i| self.x(i)))
    }

    fn y_range(&self) -> Range {
        Range::of((0..self.item_count()).map(|i| self.y(i)))
    }

    fn z_range(&self) -> Range {
        Range::of((0..self.item_count()).map(|i| self.z(i)))
    }

    /// Rectangle spanned by the sample locations
    fn domain(&self) -> Rect {
        let x = self.x_range();
        let y = self.y_range();
        Rect::new(x.min, y.min, x.max, y.max)
    }

    /// z range with outliers trimmed; see [`robust_range`].
    fn robust_z_range(&self) -> Range {
        robust_range(&self.z_values())
    }

    fn z_values(&self) -> Vec<f64> {
        (0..self.item_count()).map(|i| self.z(i)).collect()
    }

    /// z values of the samples `position` selects relative to `roi`.
    fn roi_data(&self, roi: &dyn RoiShape, position: RoiPosition) -> Vec<f64> {
        let mut values = Vec::with_capacity(self.item_count());
        for i in 0..self.item_count() {
            if position.accepts(roi.contains(self.x(i), self.y(i))) {
                values.push(self.z(i));
            }
        }
        values.shrink_to_fit();
        values
    }

    fn roi_item_count(&self, roi: &dyn RoiShape, position: RoiPosition) -> usize {
        (0..self.item_count())
            .filter(|&i| position.accepts(roi.contains(self.x(i), self.y(i))))
            .count()
    }
}

fn median_of_sorted(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        0.5 * (sorted[n / 2 - 1] + sorted[n / 2])
    }
}

/// Range of the values within `ROBUST_RANGE_MAD_FACTOR` scaled median
/// absolute deviations of the median.
///
/// Non-finite values are ignored. With a zero MAD the exact range of the
/// finite values is returned.
pub fn robust_range(values: &[f64]) -> Range {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return Range::empty();
    }
    sorted.sort_by(f64::total_cmp);
    let median = median_of_sorted(&sorted);

    let mut deviations: Vec<f64> = sorted.iter().map(|v| (v - median).abs()).collect();
    deviations.sort_by(f64::total_cmp);
    let sigma = MAD_TO_SIGMA * median_of_sorted(&deviations);
    if sigma == 0.0 {
        return Range::new(sorted[0], sorted[sorted.len() - 1]);
    }

    let limit = ROBUST_RANGE_MAD_FACTOR * sigma;
    Range::of(sorted.into_iter().filter(|v| (v - median).abs() <= limit))
}

/// Near-square grid over `area` with about `point_count` nodes.
///
/// `columns = round(sqrt(n * width / height))` and `rows = round(n / columns)`,
/// each at least 2, so node spacing comes out similar along x and y.
pub fn near_square_grid(
    point_count: usize,
    area: &Rect,
    x_quantity: Quantity,
    y_quantity: Quantity,
) -> Result<Grid2D> {
    if !(area.width() > 0.0 && area.height() > 0.0) {
        return Err(AfmError::InvalidArgument(format!(
            "cannot lay a grid over a degenerate area {}x{}",
            area.width(),
            area.height()
        )));
    }
    let n = point_count.max(4) as f64;
    let columns = ((n * area.width() / area.height()).sqrt().round() as usize).max(2);
    let rows = ((n / columns as f64).round() as usize).max(2);
    Ok(Grid2D::new(
        Grid1D::spanning(area.min_x, area.max_x, columns, x_quantity)?,
        Grid1D::spanning(area.min_y, area.max_y, rows, y_quantity)?,
    ))
}

// ============================================================================
// Tests
// ============================================================================
