use super::Channel1DData;
use crate::axis::{DataAxis1D, Grid1D};
use crate::error::{AfmError, Result};
use crate::types::{Quantity, SortedArrayOrder};

/// y values sampled on a regular grid
#[derive(Debug, Clone, PartialEq)]
pub struct GridChannel1DData {
    grid: Grid1D,
    y: Vec<f64>,
    y_quantity: Quantity,
}

impl GridChannel1DData {
    pub fn new(grid: Grid1D, y: Vec<f64>, y_quantity: Quantity) -> Result<Self> {
        if grid.count() != y.len() {
            return Err(AfmError::InvalidArgument(format!(
                "grid has {} nodes but {} y values were given",
                grid.count(),
                y.len()
            )));
        }
        Ok(Self { grid, y, y_quantity })
    }

    pub fn grid(&self) -> &Grid1D {
        &self.grid
    }

    pub fn y_slice(&self) -> &[f64] {
        &self.y
    }
}

impl Channel1DData for GridChannel1DData {
    fn x_quantity(&self) -> &Quantity {
        self.grid.quantity()
    }

    fn y_quantity(&self) -> &Quantity {
        &self.y_quantity
    }

    fn item_count(&self) -> usize {
        self.y.len()
    }

    fn x(&self, index: usize) -> f64 {
        self.grid.value(index)
    }

    fn y(&self, index: usize) -> f64 {
        self.y[index]
    }

    fn x_order(&self) -> Option<SortedArrayOrder> {
        Some(self.grid.order())
    }

    fn scaled_copy(&self, factor: f64, y_quantity: Option<Quantity>) -> Box<dyn Channel1DData> {
        Box::new(Self {
            grid: self.grid.clone(),
            y: self.y.iter().map(|v| factor * v).collect(),
            y_quantity: y_quantity.unwrap_or_else(|| self.y_quantity.clone()),
        })
    }

    fn y_values(&self) -> Vec<f64> {
        self.y.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel1d::FlexibleChannel1DData;

    #[test]
    fn test_matches_point_list_semantics() {
        let q = Quantity::dimensionless("x");
        let grid = Grid1D::new(7.0, -2.0, 4, q.clone()).unwrap();
        let g = GridChannel1DData::new(grid, vec![70.0, 50.0, 30.0, 10.0], q.clone()).unwrap();
        let f = FlexibleChannel1DData::from_xy(
            &g.x_values(),
            &g.y_values(),
            q.clone(),
            q,
            g.x_order(),
        )
        .unwrap();

        for bound in [0.0, 2.0, 4.0, 7.0, 9.0] {
            assert_eq!(
                g.index_of_greatest_x_smaller_or_equal_to(bound),
                f.index_of_greatest_x_smaller_or_equal_to(bound)
            );
            assert_eq!(
                g.index_of_smallest_x_greater_or_equal_to(bound),
                f.index_of_smallest_x_greater_or_equal_to(bound)
            );
        }
        assert_eq!(g.x_range(), f.x_range());
        assert_eq!(g.index_range_bounded_by(2.0, 6.0), f.index_range_bounded_by(2.0, 6.0));
    }

    #[test]
    fn test_rejects_length_mismatch() {
        let q = Quantity::dimensionless("x");
        let grid = Grid1D::new(0.0, 1.0, 3, q.clone()).unwrap();
        assert!(GridChannel1DData::new(grid, vec![1.0], q).is_err());
    }
}
