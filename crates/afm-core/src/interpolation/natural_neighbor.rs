//! Natural-neighbour (Sibson) gridding of scattered samples
//!
//! Uses the discrete formulation: every target node `q` looks up its nearest
//! sample `s` at distance `ρ` and scatters `z(s)` to all target nodes within
//! `ρ` of `q`. Each node then averages what it received. The result
//! converges to Sibson's interpolant as the target grid is refined and needs
//! no explicit Voronoi construction.

use super::bilinear::bilinear_at;
use super::SurfaceInterpolation;
use crate::error::{AfmError, Result};
use crate::geometry::{Point, Rect};
use crate::grid2d::{ArraySupport2D, Grid2D};
use ndarray::Array2;
use tracing::{debug, instrument};

/// Fewest distinct samples accepted for gridding
pub const MIN_SCATTERED_POINTS: usize = 3;

/// Uniform bucket grid over the sample bounding box for nearest-site queries
#[derive(Debug, Clone)]
struct SiteIndex {
    bounds: Rect,
    cell: f64,
    columns: usize,
    rows: usize,
    buckets: Vec<Vec<usize>>,
}

impl SiteIndex {
    fn build(points: &[Point], bounds: Rect) -> Self {
        let n = points.len().max(1) as f64;
        let cell = (bounds.area() / n).sqrt().max(f64::MIN_POSITIVE);
        let columns = ((bounds.width() / cell).floor() as usize + 1).max(1);
        let rows = ((bounds.height() / cell).floor() as usize + 1).max(1);
        let mut index = Self {
            bounds,
            cell,
            columns,
            rows,
            buckets: vec![Vec::new(); columns * rows],
        };
        for (i, p) in points.iter().enumerate() {
            let (c, r) = index.bucket_of(p.x, p.y);
            index.buckets[r * columns + c].push(i);
        }
        index
    }

    fn bucket_of(&self, x: f64, y: f64) -> (usize, usize) {
        let c = ((x - self.bounds.min_x) / self.cell).floor();
        let r = ((y - self.bounds.min_y) / self.cell).floor();
        let clamp = |v: f64, n: usize| (v.max(0.0) as usize).min(n - 1);
        (clamp(c, self.columns), clamp(r, self.rows))
    }

    /// Nearest point to `(x, y)` and its squared distance.
    fn nearest(&self, points: &[Point], x: f64, y: f64) -> Option<(usize, f64)> {
        let target = Point::new(x, y);
        let (c0, r0) = self.bucket_of(x, y);
        let mut best: Option<(usize, f64)> = None;
        let max_ring = self.columns.max(self.rows);

        for ring in 0..=max_ring {
            // buckets in this ring are at least (ring - 1) cells away
            if let Some((_, d)) = best {
                let reach = (ring as f64 - 1.0).max(0.0) * self.cell;
                if reach * reach > d {
                    break;
                }
            }
            let r_lo = r0.saturating_sub(ring);
            let r_hi = (r0 + ring).min(self.rows - 1);
            let c_lo = c0.saturating_sub(ring);
            let c_hi = (c0 + ring).min(self.columns - 1);
            for r in r_lo..=r_hi {
                for c in c_lo..=c_hi {
                    let on_ring = r.abs_diff(r0) == ring || c.abs_diff(c0) == ring;
                    if !on_ring {
                        continue;
                    }
                    for &i in &self.buckets[r * self.columns + c] {
                        let d = points[i].distance_sq(&target);
                        if best.map_or(true, |(_, bd)| d < bd) {
                            best = Some((i, d));
                        }
                    }
                }
            }
        }
        best
    }
}

/// Scattered `(x, y, z)` samples prepared for natural-neighbour gridding
#[derive(Debug, Clone)]
pub struct NaturalNeighborInterpolator {
    points: Vec<Point>,
    values: Vec<f64>,
    bounds: Rect,
    index: SiteIndex,
}

impl NaturalNeighborInterpolator {
    /// Samples with a non-finite coordinate or value are ignored.
    pub fn new(xs: &[f64], ys: &[f64], zs: &[f64]) -> Result<Self> {
        if xs.len() != ys.len() || xs.len() != zs.len() {
            return Err(AfmError::InvalidArgument(format!(
                "coordinate and value arrays differ in length ({}, {}, {})",
                xs.len(),
                ys.len(),
                zs.len()
            )));
        }
        let mut points = Vec::with_capacity(xs.len());
        let mut values = Vec::with_capacity(xs.len());
        for ((&x, &y), &z) in xs.iter().zip(ys).zip(zs) {
            if x.is_finite() && y.is_finite() && z.is_finite() {
                points.push(Point::new(x, y));
                values.push(z);
            }
        }
        if points.len() < MIN_SCATTERED_POINTS {
            return Err(AfmError::Interpolation(format!(
                "natural neighbour gridding needs {MIN_SCATTERED_POINTS} finite samples, got {}",
                points.len()
            )));
        }

        let bounds = points[1..].iter().fold(
            Rect::new(points[0].x, points[0].y, points[0].x, points[0].y),
            |acc, p| acc.union(&Rect::new(p.x, p.y, p.x, p.y)),
        );
        if bounds.width() <= 0.0 || bounds.height() <= 0.0 {
            return Err(AfmError::Interpolation(
                "scattered samples do not span a two-dimensional area".into(),
            ));
        }

        let index = SiteIndex::build(&points, bounds);
        Ok(Self {
            points,
            values,
            bounds,
            index,
        })
    }

    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// Bounding box of the samples
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Value of the sample nearest to `(x, y)`.
    pub fn nearest_value(&self, x: f64, y: f64) -> f64 {
        self.index
            .nearest(&self.points, x, y)
            .map_or(f64::NAN, |(i, _)| self.values[i])
    }

    /// Natural-neighbour values at every node of `target`.
    #[instrument(
        level = "debug",
        skip_all,
        fields(
            rows = target.row_count(),
            columns = target.column_count(),
            samples = self.points.len()
        )
    )]
    pub fn grid(&self, target: &Grid2D) -> Array2<f64> {
        let shape = (target.row_count(), target.column_count());
        let mut sum = Array2::<f64>::zeros(shape);
        let mut hits = Array2::<u32>::zeros(shape);

        for r in 0..shape.0 {
            let y = target.y_at_row(r);
            for c in 0..shape.1 {
                let x = target.x_at_column(c);
                let Some((site, d2)) = self.index.nearest(&self.points, x, y) else {
                    continue;
                };
                let z = self.values[site];
                let rho = d2.sqrt();
                let reach = Rect::new(x - rho, y - rho, x + rho, y + rho);
                let Some(block) = target.inscribed_block_in_rect(&reach) else {
                    // rounding can push q itself out of its own disc
                    sum[[r, c]] += z;
                    hits[[r, c]] += 1;
                    continue;
                };
                let q = Point::new(x, y);
                for (pr, pc) in block.cells() {
                    let p = target.point(pr, pc);
                    if p.distance_sq(&q) <= d2 || (pr, pc) == (r, c) {
                        sum[[pr, pc]] += z;
                        hits[[pr, pc]] += 1;
                    }
                }
            }
        }

        let values = Array2::from_shape_fn(shape, |(r, c)| match hits[[r, c]] {
            0 => f64::NAN,
            n => sum[[r, c]] / f64::from(n),
        });
        debug!("natural neighbour gridding done");
        values
    }

    /// Grid onto `target` and wrap the result as an evaluable surface.
    pub fn surface(&self, target: Grid2D) -> ScatteredSurface {
        let values = self.grid(&target);
        ScatteredSurface {
            grid: target,
            values,
        }
    }
}

/// Natural-neighbour gridded surface, evaluated bilinearly between nodes
#[derive(Debug, Clone)]
pub struct ScatteredSurface {
    grid: Grid2D,
    values: Array2<f64>,
}

impl ScatteredSurface {
    pub fn grid(&self) -> &Grid2D {
        &self.grid
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }
}

impl SurfaceInterpolation for ScatteredSurface {
    fn value(&self, x: f64, y: f64) -> f64 {
        bilinear_at(&self.values, &self.grid, x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::Grid1D;
    use crate::types::Quantity;

    fn target(n: usize) -> Grid2D {
        Grid2D::new(
            Grid1D::spanning(0.0, 1.0, n, Quantity::dimensionless("x")).unwrap(),
            Grid1D::spanning(0.0, 1.0, n, Quantity::dimensionless("y")).unwrap(),
        )
    }

    #[test]
    fn test_constant_field_is_reproduced() {
        let xs = [0.0, 1.0, 0.0, 1.0, 0.4];
        let ys = [0.0, 0.0, 1.0, 1.0, 0.6];
        let zs = [2.5; 5];
        let nn = NaturalNeighborInterpolator::new(&xs, &ys, &zs).unwrap();
        let values = nn.grid(&target(9));
        assert!(values.iter().all(|v| (v - 2.5).abs() < 1e-12));
    }

    #[test]
    fn test_values_stay_within_sample_range_and_hit_samples() {
        let xs = [0.0, 1.0, 0.0, 1.0, 0.5];
        let ys = [0.0, 0.0, 1.0, 1.0, 0.5];
        let zs = [0.0, 1.0, 1.0, 2.0, 1.0];
        let nn = NaturalNeighborInterpolator::new(&xs, &ys, &zs).unwrap();
        let values = nn.grid(&target(11));
        assert!(values.iter().all(|&v| (0.0..=2.0).contains(&v)));
        // nodes on top of a sample lean towards its value
        assert!(values[[0, 0]] < 0.5);
        assert!(values[[10, 10]] > 1.5);
    }

    #[test]
    fn test_nearest_lookup() {
        let xs: Vec<f64> = (0..50).map(|i| (i % 10) as f64).collect();
        let ys: Vec<f64> = (0..50).map(|i| (i / 10) as f64).collect();
        let zs: Vec<f64> = (0..50).map(|i| i as f64).collect();
        let nn = NaturalNeighborInterpolator::new(&xs, &ys, &zs).unwrap();
        assert_eq!(nn.nearest_value(3.1, 2.2), 23.0);
        assert_eq!(nn.nearest_value(-5.0, 100.0), 40.0);
    }

    #[test]
    fn test_rejects_degenerate_input() {
        assert!(NaturalNeighborInterpolator::new(&[0.0, 1.0], &[0.0, 1.0], &[1.0, 2.0]).is_err());
        // collinear along x
        assert!(matches!(
            NaturalNeighborInterpolator::new(&[0.0, 1.0, 2.0], &[0.0; 3], &[1.0; 3]),
            Err(AfmError::Interpolation(_))
        ));
        // non-finite samples are dropped before counting
        assert!(NaturalNeighborInterpolator::new(
            &[0.0, 1.0, f64::NAN, 0.0],
            &[0.0, 0.0, 1.0, 1.0],
            &[1.0, 1.0, 1.0, f64::INFINITY]
        )
        .is_err());
    }

    #[test]
    fn test_surface_evaluation() {
        let xs = [0.0, 1.0, 0.0, 1.0];
        let ys = [0.0, 0.0, 1.0, 1.0];
        let zs = [4.0; 4];
        let nn = NaturalNeighborInterpolator::new(&xs, &ys, &zs).unwrap();
        let surface = nn.surface(target(5));
        assert!((surface.value(0.33, 0.71) - 4.0).abs() < 1e-12);
        assert!(surface.value(1.5, 0.5).is_nan());
    }
}
