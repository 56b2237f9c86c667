use super::Channel2DData;
use crate::axis::DataAxis1D;
use crate::error::{AfmError, Result};
use crate::geometry::{RoiPosition, RoiShape};
use crate::grid2d::{ArraySupport2D, Grid2D};
use crate::interpolation::bilinear::resample;
use crate::interpolation::{BicubicSpline, LazyInterpolation, SurfaceInterpolation};
use crate::types::{Quantity, Range, SortedArrayOrder};
use ndarray::{s, Array2, ArrayView1};
use std::borrow::Cow;
use tracing::{debug, instrument};

/// Dense map on a regular grid; `values` has shape `(rows, columns)`.
#[derive(Debug, Clone)]
pub struct GridChannel2DData {
    grid: Grid2D,
    values: Array2<f64>,
    z_quantity: Quantity,
    spline: LazyInterpolation<BicubicSpline>,
}

impl GridChannel2DData {
    pub fn new(grid: Grid2D, values: Array2<f64>, z_quantity: Quantity) -> Result<Self> {
        let expected = (grid.row_count(), grid.column_count());
        if values.dim() != expected {
            return Err(AfmError::InvalidArgument(format!(
                "value array {:?} does not match grid {:?}",
                values.dim(),
                expected
            )));
        }
        Ok(Self {
            grid,
            values,
            z_quantity,
            spline: LazyInterpolation::new(),
        })
    }

    pub fn grid(&self) -> &Grid2D {
        &self.grid
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn row(&self, row: usize) -> ArrayView1<'_, f64> {
        self.values.row(row)
    }

    pub fn column(&self, column: usize) -> ArrayView1<'_, f64> {
        self.values.column(column)
    }

    pub fn z_at(&self, row: usize, column: usize) -> f64 {
        self.values[[row, column]]
    }

    /// Bilinear resampling onto `target`; nodes outside this grid become NaN.
    #[instrument(
        level = "debug",
        skip_all,
        fields(rows = target.row_count(), columns = target.column_count())
    )]
    pub fn resampled_bilinear(&self, target: &Grid2D) -> GridChannel2DData {
        let values = resample(&self.values, &self.grid, target);
        GridChannel2DData {
            grid: target.clone(),
            values,
            z_quantity: self.z_quantity.clone(),
            spline: LazyInterpolation::new(),
        }
    }

    /// Spline nodes must increase, so descending axes are flipped first.
    fn build_spline(&self) -> Result<BicubicSpline> {
        let mut xs = self.grid.x_grid().nodes();
        let mut ys = self.grid.y_grid().nodes();
        let mut z = self.values.clone();
        if self.grid.x_grid().order() == SortedArrayOrder::Descending {
            xs.reverse();
            z = z.slice(s![.., ..;-1]).to_owned();
        }
        if self.grid.y_grid().order() == SortedArrayOrder::Descending {
            ys.reverse();
            z = z.slice(s![..;-1, ..]).to_owned();
        }
        debug!(rows = ys.len(), columns = xs.len(), "building bicubic spline");
        BicubicSpline::new(xs, ys, z)
    }
}

impl Channel2DData for GridChannel2DData {
    fn x_quantity(&self) -> &Quantity {
        self.grid.x_grid().quantity()
    }

    fn y_quantity(&self) -> &Quantity {
        self.grid.y_grid().quantity()
    }

    fn z_quantity(&self) -> &Quantity {
        &self.z_quantity
    }

    fn item_count(&self) -> usize {
        self.values.len()
    }

    fn x(&self, index: usize) -> f64 {
        self.grid.x_at_column(index % self.grid.column_count())
    }

    fn y(&self, index: usize) -> f64 {
        self.grid.y_at_row(index / self.grid.column_count())
    }

    fn z(&self, index: usize) -> f64 {
        let columns = self.grid.column_count();
        self.values[[index / columns, index % columns]]
    }

    fn default_gridding(&self) -> Result<Cow<'_, GridChannel2DData>> {
        Ok(Cow::Borrowed(self))
    }

    fn gridding(&self, grid: &Grid2D) -> Result<Cow<'_, GridChannel2DData>> {
        if self.grid.equal_up_to_prefix(grid) {
            return Ok(Cow::Borrowed(self));
        }
        Ok(Cow::Owned(self.resampled_bilinear(grid)))
    }

    fn interpolated_z(&self, x: f64, y: f64) -> f64 {
        match self.spline.get_or_build(|| self.build_spline()) {
            Ok(spline) => spline.value(x, y),
            Err(_) => f64::NAN,
        }
    }

    fn scaled_copy(&self, factor: f64, z_quantity: Option<Quantity>) -> Box<dyn Channel2DData> {
        Box::new(GridChannel2DData {
            grid: self.grid.clone(),
            values: self.values.mapv(|v| factor * v),
            z_quantity: z_quantity.unwrap_or_else(|| self.z_quantity.clone()),
            spline: LazyInterpolation::new(),
        })
    }

    fn x_range(&self) -> Range {
        self.grid.x_range()
    }

    fn y_range(&self) -> Range {
        self.grid.y_range()
    }

    fn z_values(&self) -> Vec<f64> {
        self.values.iter().copied().collect()
    }

    /// Only the inscribed block can hold selected nodes, so the scan and the
    /// allocation are limited to it.
    fn roi_data(&self, roi: &dyn RoiShape, position: RoiPosition) -> Vec<f64> {
        let Some(block) = self.grid.inscribed_block(roi, position) else {
            return Vec::new();
        };
        let mut values = Vec::with_capacity(block.item_count());
        for (r, c) in block.cells() {
            let p = self.grid.point(r, c);
            if position.accepts(roi.contains(p.x, p.y)) {
                values.push(self.values[[r, c]]);
            }
        }
        values.shrink_to_fit();
        values
    }

    fn roi_item_count(&self, roi: &dyn RoiShape, position: RoiPosition) -> usize {
        let Some(block) = self.grid.inscribed_block(roi, position) else {
            return 0;
        };
        block
            .cells()
            .filter(|&(r, c)| {
                let p = self.grid.point(r, c);
                position.accepts(roi.contains(p.x, p.y))
            })
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::Grid1D;
    use crate::geometry::Rect;
    use crate::interpolation::CacheStatus;
    use crate::types::Unit;

    fn q(name: &str, exp: i32) -> Quantity {
        Quantity::new(name, Unit::new("m", exp))
    }

    fn channel() -> GridChannel2DData {
        let grid = Grid2D::new(
            Grid1D::new(0.0, 1.0, 6, q("x", -6)).unwrap(),
            Grid1D::new(0.0, 1.0, 5, q("y", -6)).unwrap(),
        );
        let values = Array2::from_shape_fn((5, 6), |(r, c)| (10 * r + c) as f64);
        GridChannel2DData::new(grid, values, q("z", -9)).unwrap()
    }

    #[test]
    fn test_flat_indexing_is_row_by_row() {
        let c = channel();
        assert_eq!(c.item_count(), 30);
        assert_eq!((c.x(8), c.y(8), c.z(8)), (2.0, 1.0, 12.0));
        assert_eq!(c.z_at(4, 5), 45.0);
        assert_eq!(c.row(1).to_vec(), vec![10.0, 11.0, 12.0, 13.0, 14.0, 15.0]);
        assert_eq!(c.column(2).len(), 5);
        assert_eq!(c.z_range(), Range::new(0.0, 45.0));
    }

    #[test]
    fn test_roi_inside_and_outside_partition() {
        let c = channel();
        let roi = Rect::new(0.5, 1.5, 3.5, 4.5);
        let inside = c.roi_data(&roi, RoiPosition::Inside);
        assert_eq!(inside, vec![21.0, 22.0, 23.0, 31.0, 32.0, 33.0, 41.0, 42.0, 43.0]);
        let outside = c.roi_data(&roi, RoiPosition::Outside);
        assert_eq!(outside.len(), 21);
        assert!(outside.iter().all(|v| !inside.contains(v)));
        assert_eq!(c.roi_item_count(&roi, RoiPosition::Inside), 9);
        assert_eq!(c.roi_item_count(&roi, RoiPosition::Everything), 30);
    }

    #[test]
    fn test_gridding_same_grid_is_borrowed() {
        let c = channel();
        let nm_grid = Grid2D::new(
            Grid1D::new(0.0, 1000.0, 6, q("x", -9)).unwrap(),
            Grid1D::new(0.0, 1000.0, 5, q("y", -9)).unwrap(),
        );
        assert!(matches!(c.gridding(&nm_grid).unwrap(), Cow::Borrowed(_)));
        assert!(matches!(c.default_gridding().unwrap(), Cow::Borrowed(_)));

        let coarse = c.grid().resized(3, 3).unwrap();
        let resampled = c.gridding(&coarse).unwrap();
        assert!(matches!(resampled, Cow::Owned(_)));
        // x = 2.5, y = 2 lies between 22 and 23
        assert!((resampled.z_at(1, 1) - 22.5).abs() < 1e-12);
    }

    #[test]
    fn test_spline_built_lazily_once() {
        let c = channel();
        assert_eq!(c.spline.status(), CacheStatus::Unbuilt);
        assert!((c.interpolated_z(2.0, 3.0) - 32.0).abs() < 1e-9);
        assert!((c.interpolated_z(2.5, 3.5) - 37.5).abs() < 1e-9);
        assert_eq!(c.spline.status(), CacheStatus::Ready);
        assert!(c.interpolated_z(-1.0, 0.0).is_nan());
    }

    #[test]
    fn test_spline_failure_yields_nan() {
        let grid = Grid2D::new(
            Grid1D::new(0.0, 1.0, 2, q("x", 0)).unwrap(),
            Grid1D::new(0.0, 1.0, 2, q("y", 0)).unwrap(),
        );
        let c = GridChannel2DData::new(grid, Array2::zeros((2, 2)), q("z", 0)).unwrap();
        assert!(c.interpolated_z(0.5, 0.5).is_nan());
        assert_eq!(c.spline.status(), CacheStatus::Unbuilt);
    }

    #[test]
    fn test_descending_axis_spline() {
        let grid = Grid2D::new(
            Grid1D::new(4.0, -1.0, 5, q("x", 0)).unwrap(),
            Grid1D::new(0.0, 1.0, 4, q("y", 0)).unwrap(),
        );
        let values = Array2::from_shape_fn((4, 5), |(r, c)| (4 - c) as f64 + 2.0 * r as f64);
        let c = GridChannel2DData::new(grid, values, q("z", 0)).unwrap();
        assert!((c.interpolated_z(1.5, 2.0) - 5.5).abs() < 1e-9);
    }

    #[test]
    fn test_scaled_copy_keeps_original() {
        let c = channel();
        let scaled = c.scaled_copy(2.0, None);
        assert_eq!(scaled.z(8), 24.0);
        assert_eq!(scaled.z_quantity(), c.z_quantity());
        assert_eq!(c.z(8), 12.0);
    }
}
