use super::{near_square_grid, Channel2DData, GridChannel2DData};
use crate::error::{AfmError, Result};
use crate::grid2d::Grid2D;
use crate::interpolation::{
    LazyInterpolation, NaturalNeighborInterpolator, ScatteredSurface, SurfaceInterpolation,
};
use crate::types::Quantity;
use std::borrow::Cow;
use std::sync::Arc;
use tracing::instrument;

/// Scattered `(x, y, z)` samples
#[derive(Debug, Clone)]
pub struct FlexibleChannel2DData {
    xs: Vec<f64>,
    ys: Vec<f64>,
    zs: Vec<f64>,
    x_quantity: Quantity,
    y_quantity: Quantity,
    z_quantity: Quantity,
    interpolator: LazyInterpolation<NaturalNeighborInterpolator>,
    surface: LazyInterpolation<ScatteredSurface>,
}

impl FlexibleChannel2DData {
    pub fn new(
        xs: Vec<f64>,
        ys: Vec<f64>,
        zs: Vec<f64>,
        x_quantity: Quantity,
        y_quantity: Quantity,
        z_quantity: Quantity,
    ) -> Result<Self> {
        if xs.len() != ys.len() || xs.len() != zs.len() {
            return Err(AfmError::InvalidArgument(format!(
                "coordinate and value arrays differ in length ({}, {}, {})",
                xs.len(),
                ys.len(),
                zs.len()
            )));
        }
        Ok(Self {
            xs,
            ys,
            zs,
            x_quantity,
            y_quantity,
            z_quantity,
            interpolator: LazyInterpolation::new(),
            surface: LazyInterpolation::new(),
        })
    }

    fn interpolator(&self) -> Result<Arc<NaturalNeighborInterpolator>> {
        self.interpolator
            .get_or_build(|| NaturalNeighborInterpolator::new(&self.xs, &self.ys, &self.zs))
    }

    fn default_grid(&self) -> Result<Grid2D> {
        near_square_grid(
            self.item_count(),
            &self.domain(),
            self.x_quantity.clone(),
            self.y_quantity.clone(),
        )
    }
}

impl Channel2DData for FlexibleChannel2DData {
    fn x_quantity(&self) -> &Quantity {
        &self.x_quantity
    }

    fn y_quantity(&self) -> &Quantity {
        &self.y_quantity
    }

    fn z_quantity(&self) -> &Quantity {
        &self.z_quantity
    }

    fn item_count(&self) -> usize {
        self.xs.len()
    }

    fn x(&self, index: usize) -> f64 {
        self.xs[index]
    }

    fn y(&self, index: usize) -> f64 {
        self.ys[index]
    }

    fn z(&self, index: usize) -> f64 {
        self.zs[index]
    }

    fn default_gridding(&self) -> Result<Cow<'_, GridChannel2DData>> {
        let grid = self.default_grid()?;
        self.gridding(&grid)
    }

    #[instrument(level = "debug", skip_all, fields(samples = self.xs.len()))]
    fn gridding(&self, grid: &Grid2D) -> Result<Cow<'_, GridChannel2DData>> {
        let values = self.interpolator()?.grid(grid);
        Ok(Cow::Owned(GridChannel2DData::new(
            grid.clone(),
            values,
            self.z_quantity.clone(),
        )?))
    }

    fn interpolated_z(&self, x: f64, y: f64) -> f64 {
        let surface = self.surface.get_or_build(|| {
            let grid = self.default_grid()?;
            Ok(self.interpolator()?.surface(grid))
        });
        match surface {
            Ok(surface) => surface.value(x, y),
            Err(_) => f64::NAN,
        }
    }

    fn scaled_copy(&self, factor: f64, z_quantity: Option<Quantity>) -> Box<dyn Channel2DData> {
        Box::new(FlexibleChannel2DData {
            zs: self.zs.iter().map(|v| factor * v).collect(),
            z_quantity: z_quantity.unwrap_or_else(|| self.z_quantity.clone()),
            ..self.clone()
        })
    }

    fn z_values(&self) -> Vec<f64> {
        self.zs.clone()
    }
}
