//! Bicubic spline surface over a rectilinear grid
//!
//! Partial derivatives at the nodes come from natural cubic splines along rows
//! and columns; each cell is then a bicubic Hermite patch, so the surface is
//! C1 across cell boundaries and exact at the nodes.

use super::SurfaceInterpolation;
use crate::error::{AfmError, Result};
use ndarray::Array2;

/// Fewest nodes per axis for which a spline is built
pub const MIN_SPLINE_NODES: usize = 3;

/// First derivatives of the natural cubic spline through `(x, y)`.
///
/// `x` must be strictly increasing with at least two entries.
fn natural_spline_slopes(x: &[f64], y: &[f64]) -> Vec<f64> {
    let n = x.len();
    let h: Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();

    // second derivatives, natural ends (m[0] = m[n-1] = 0), Thomas algorithm
    let mut m = vec![0.0; n];
    if n > 2 {
        let inner = n - 2;
        let mut diag = vec![0.0; inner];
        let mut rhs = vec![0.0; inner];
        for k in 0..inner {
            let i = k + 1;
            diag[k] = 2.0 * (h[i - 1] + h[i]);
            rhs[k] = 6.0 * ((y[i + 1] - y[i]) / h[i] - (y[i] - y[i - 1]) / h[i - 1]);
        }
        for k in 1..inner {
            let w = h[k] / diag[k - 1];
            diag[k] -= w * h[k];
            rhs[k] -= w * rhs[k - 1];
        }
        m[inner] = rhs[inner - 1] / diag[inner - 1];
        for k in (0..inner - 1).rev() {
            m[k + 1] = (rhs[k] - h[k + 1] * m[k + 2]) / diag[k];
        }
    }

    let mut slopes = Vec::with_capacity(n);
    for i in 0..n - 1 {
        slopes.push((y[i + 1] - y[i]) / h[i] - h[i] * (2.0 * m[i] + m[i + 1]) / 6.0);
    }
    let last = n - 2;
    slopes.push((y[n - 1] - y[n - 2]) / h[last] + h[last] * (m[n - 2] + 2.0 * m[n - 1]) / 6.0);
    slopes
}

#[inline]
fn hermite(t: f64) -> [f64; 4] {
    let t2 = t * t;
    let t3 = t2 * t;
    [
        2.0 * t3 - 3.0 * t2 + 1.0, // value at 0
        -2.0 * t3 + 3.0 * t2,      // value at 1
        t3 - 2.0 * t2 + t,         // slope at 0
        t3 - t2,                   // slope at 1
    ]
}

/// Interval `i` with `nodes[i] <= v <= nodes[i + 1]`, `None` outside.
fn locate(nodes: &[f64], v: f64) -> Option<usize> {
    let n = nodes.len();
    if !(v >= nodes[0] && v <= nodes[n - 1]) {
        return None;
    }
    let p = nodes.partition_point(|&node| node <= v);
    Some(p.saturating_sub(1).min(n - 2))
}

/// Smooth surface through every node of a rectilinear grid
#[derive(Debug, Clone)]
pub struct BicubicSpline {
    xs: Vec<f64>,
    ys: Vec<f64>,
    z: Array2<f64>,
    dzdx: Array2<f64>,
    dzdy: Array2<f64>,
    d2zdxdy: Array2<f64>,
}

impl BicubicSpline {
    /// `z` has shape `(ys.len(), xs.len())`; both coordinate arrays must be
    /// strictly increasing.
    pub fn new(xs: Vec<f64>, ys: Vec<f64>, z: Array2<f64>) -> Result<Self> {
        if xs.len() < MIN_SPLINE_NODES || ys.len() < MIN_SPLINE_NODES {
            return Err(AfmError::Interpolation(format!(
                "bicubic spline needs at least {MIN_SPLINE_NODES} nodes per axis, got {}x{}",
                xs.len(),
                ys.len()
            )));
        }
        if z.dim() != (ys.len(), xs.len()) {
            return Err(AfmError::Interpolation(format!(
                "value array {:?} does not match {} rows x {} columns",
                z.dim(),
                ys.len(),
                xs.len()
            )));
        }
        let strictly_increasing = |v: &[f64]| v.windows(2).all(|w| w[1] > w[0]);
        if !strictly_increasing(&xs) || !strictly_increasing(&ys) {
            return Err(AfmError::Interpolation(
                "spline nodes must be strictly increasing".into(),
            ));
        }
        if z.iter().any(|v| !v.is_finite()) {
            return Err(AfmError::Interpolation(
                "non-finite values in spline data".into(),
            ));
        }

        let (rows, columns) = z.dim();
        let mut dzdx = Array2::zeros((rows, columns));
        for r in 0..rows {
            let row: Vec<f64> = z.row(r).to_vec();
            for (c, s) in natural_spline_slopes(&xs, &row).into_iter().enumerate() {
                dzdx[[r, c]] = s;
            }
        }

        let mut dzdy = Array2::zeros((rows, columns));
        let mut d2zdxdy = Array2::zeros((rows, columns));
        for c in 0..columns {
            let column: Vec<f64> = z.column(c).to_vec();
            for (r, s) in natural_spline_slopes(&ys, &column).into_iter().enumerate() {
                dzdy[[r, c]] = s;
            }
            let slope_column: Vec<f64> = dzdx.column(c).to_vec();
            for (r, s) in natural_spline_slopes(&ys, &slope_column).into_iter().enumerate() {
                d2zdxdy[[r, c]] = s;
            }
        }

        Ok(Self {
            xs,
            ys,
            z,
            dzdx,
            dzdy,
            d2zdxdy,
        })
    }

    pub fn x_nodes(&self) -> &[f64] {
        &self.xs
    }

    pub fn y_nodes(&self) -> &[f64] {
        &self.ys
    }
}

impl SurfaceInterpolation for BicubicSpline {
    fn value(&self, x: f64, y: f64) -> f64 {
        let (Some(c), Some(r)) = (locate(&self.xs, x), locate(&self.ys, y)) else {
            return f64::NAN;
        };
        let hx = self.xs[c + 1] - self.xs[c];
        let hy = self.ys[r + 1] - self.ys[r];
        let bx = hermite((x - self.xs[c]) / hx);
        let by = hermite((y - self.ys[r]) / hy);

        let mut sum = 0.0;
        for (j, &ry) in [r, r + 1].iter().enumerate() {
            for (i, &cx) in [c, c + 1].iter().enumerate() {
                let (vx, sx) = (bx[i], bx[2 + i]);
                let (vy, sy) = (by[j], by[2 + j]);
                sum += self.z[[ry, cx]] * vx * vy
                    + hx * self.dzdx[[ry, cx]] * sx * vy
                    + hy * self.dzdy[[ry, cx]] * vx * sy
                    + hx * hy * self.d2zdxdy[[ry, cx]] * sx * sy;
            }
        }
        sum
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn axis(n: usize, step: f64) -> Vec<f64> {
        (0..n).map(|i| i as f64 * step).collect()
    }

    #[test]
    fn test_spline_slopes_of_line() {
        let x = [0.0, 1.0, 3.0, 4.0];
        let y: Vec<f64> = x.iter().map(|v| 2.0 * v + 1.0).collect();
        for s in natural_spline_slopes(&x, &y) {
            assert!((s - 2.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_reproduces_nodes_and_planes() {
        let xs = axis(5, 1.0);
        let ys = axis(4, 0.5);
        let z = Array2::from_shape_fn((4, 5), |(r, c)| 3.0 * xs[c] - 2.0 * ys[r] + 1.0);
        let spline = BicubicSpline::new(xs.clone(), ys.clone(), z.clone()).unwrap();

        for r in 0..4 {
            for c in 0..5 {
                assert!((spline.value(xs[c], ys[r]) - z[[r, c]]).abs() < 1e-10);
            }
        }
        let v = spline.value(2.3, 0.7);
        assert!((v - (3.0 * 2.3 - 2.0 * 0.7 + 1.0)).abs() < 1e-10);
        assert!(spline.value(4.5, 0.7).is_nan());
    }

    #[test]
    fn test_rejects_small_or_bad_input() {
        let z = Array2::zeros((2, 5));
        assert!(BicubicSpline::new(axis(5, 1.0), axis(2, 1.0), z).is_err());

        let mut z = Array2::zeros((3, 3));
        z[[1, 1]] = f64::NAN;
        assert!(matches!(
            BicubicSpline::new(axis(3, 1.0), axis(3, 1.0), z),
            Err(AfmError::Interpolation(_))
        ));
    }
}
