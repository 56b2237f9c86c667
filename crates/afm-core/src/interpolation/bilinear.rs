//! Bilinear evaluation on (semi-)regular supports

use crate::axis::DataAxis1D;
use crate::grid2d::{ArraySupport2D, Grid2D};
use ndarray::Array2;

/// Slack allowed when a fractional index lands just outside the nodes
const EDGE_TOLERANCE: f64 = 1e-9;

/// Lower node and weight of the upper node along one axis, `None` outside.
fn bracket(axis: &dyn DataAxis1D, coordinate: f64) -> Option<(usize, f64)> {
    let n = axis.count();
    if n == 0 {
        return None;
    }
    let f = axis.fractional_index(coordinate);
    if !(f >= -EDGE_TOLERANCE && f <= (n - 1) as f64 + EDGE_TOLERANCE) {
        return None;
    }
    if n == 1 {
        return Some((0, 0.0));
    }
    let f = f.clamp(0.0, (n - 1) as f64);
    let i = (f.floor() as usize).min(n - 2);
    Some((i, f - i as f64))
}

/// Value of `values` (shape `rows x columns` of `support`) at `(x, y)`.
///
/// NaN outside the support.
pub fn bilinear_at(values: &Array2<f64>, support: &dyn ArraySupport2D, x: f64, y: f64) -> f64 {
    let Some((c, tx)) = bracket(support.x_axis(), x) else {
        return f64::NAN;
    };
    let Some((r, ty)) = bracket(support.y_axis(), y) else {
        return f64::NAN;
    };
    let c1 = (c + 1).min(values.ncols() - 1);
    let r1 = (r + 1).min(values.nrows() - 1);

    let z00 = values[[r, c]];
    let z01 = values[[r, c1]];
    let z10 = values[[r1, c]];
    let z11 = values[[r1, c1]];

    // skip zero-weight corners so a NaN neighbour does not leak into exact nodes
    let lerp = |a: f64, b: f64, t: f64| {
        if t == 0.0 {
            a
        } else if t == 1.0 {
            b
        } else {
            a + t * (b - a)
        }
    };
    lerp(lerp(z00, z01, tx), lerp(z10, z11, tx), ty)
}

/// Resample `values` from `source` onto every node of `target`.
pub fn resample(values: &Array2<f64>, source: &dyn ArraySupport2D, target: &Grid2D) -> Array2<f64> {
    Array2::from_shape_fn((target.row_count(), target.column_count()), |(r, c)| {
        bilinear_at(values, source, target.x_at_column(c), target.y_at_row(r))
    })
}
