use super::{Channel2DData, GridChannel2DData};
use crate::axis::{DataAxis1D, Grid1D};
use crate::error::{AfmError, Result};
use crate::grid2d::{ArraySupport2D, Grid2D, SemiGrid2D};
use crate::interpolation::bilinear::{bilinear_at, resample};
use crate::types::{Quantity, Range};
use ndarray::Array2;
use std::borrow::Cow;
use tracing::instrument;

/// Dense map over axes that may be irregular
#[derive(Debug, Clone, PartialEq)]
pub struct SemiGridChannel2DData {
    support: SemiGrid2D,
    values: Array2<f64>,
    z_quantity: Quantity,
}

impl SemiGridChannel2DData {
    pub fn new(support: SemiGrid2D, values: Array2<f64>, z_quantity: Quantity) -> Result<Self> {
        let expected = (support.row_count(), support.column_count());
        if values.dim() != expected {
            return Err(AfmError::InvalidArgument(format!(
                "value array {:?} does not match support {:?}",
                values.dim(),
                expected
            )));
        }
        Ok(Self {
            support,
            values,
            z_quantity,
        })
    }

    pub fn support(&self) -> &SemiGrid2D {
        &self.support
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Regular grid with the same node counts over the same area.
    fn regular_counterpart(&self) -> Result<Grid2D> {
        if let Some(grid) = self.support.as_grid() {
            return Ok(grid);
        }
        let x = self.support.x();
        let y = self.support.y();
        Ok(Grid2D::new(
            Grid1D::spanning(x.minimum(), x.maximum(), x.count(), x.quantity().clone())?,
            Grid1D::spanning(y.minimum(), y.maximum(), y.count(), y.quantity().clone())?,
        ))
    }
}

impl Channel2DData for SemiGridChannel2DData {
    fn x_quantity(&self) -> &Quantity {
        self.support.x().quantity()
    }

    fn y_quantity(&self) -> &Quantity {
        self.support.y().quantity()
    }

    fn z_quantity(&self) -> &Quantity {
        &self.z_quantity
    }

    fn item_count(&self) -> usize {
        self.values.len()
    }

    fn x(&self, index: usize) -> f64 {
        self.support.x_at_column(index % self.support.column_count())
    }

    fn y(&self, index: usize) -> f64 {
        self.support.y_at_row(index / self.support.column_count())
    }

    fn z(&self, index: usize) -> f64 {
        let columns = self.support.column_count();
        self.values[[index / columns, index % columns]]
    }

    fn default_gridding(&self) -> Result<Cow<'_, GridChannel2DData>> {
        let grid = self.regular_counterpart()?;
        self.gridding(&grid)
    }

    #[instrument(
        level = "debug",
        skip_all,
        fields(rows = grid.row_count(), columns = grid.column_count())
    )]
    fn gridding(&self, grid: &Grid2D) -> Result<Cow<'_, GridChannel2DData>> {
        let values = match self.support.as_grid() {
            Some(own) if own.equal_up_to_prefix(grid) => self.values.clone(),
            _ => resample(&self.values, &self.support, grid),
        };
        Ok(Cow::Owned(GridChannel2DData::new(
            grid.clone(),
            values,
            self.z_quantity.clone(),
        )?))
    }

    fn interpolated_z(&self, x: f64, y: f64) -> f64 {
        bilinear_at(&self.values, &self.support, x, y)
    }

    fn scaled_copy(&self, factor: f64, z_quantity: Option<Quantity>) -> Box<dyn Channel2DData> {
        Box::new(SemiGridChannel2DData {
            support: self.support.clone(),
            values: self.values.mapv(|v| factor * v),
            z_quantity: z_quantity.unwrap_or_else(|| self.z_quantity.clone()),
        })
    }

    fn x_range(&self) -> Range {
        self.support.x_range()
    }

    fn y_range(&self) -> Range {
        self.support.y_range()
    }
}
