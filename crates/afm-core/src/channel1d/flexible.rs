use super::Channel1DData;
use crate::error::{AfmError, Result};
use crate::geometry::Point;
use crate::types::{Quantity, SortedArrayOrder};

/// Arbitrary list of points with a declared x order
#[derive(Debug, Clone, PartialEq)]
pub struct FlexibleChannel1DData {
    points: Vec<Point>,
    x_quantity: Quantity,
    y_quantity: Quantity,
    order: Option<SortedArrayOrder>,
}

impl FlexibleChannel1DData {
    /// `order` is trusted: a wrong declaration makes the searches return
    /// meaningless indices.
    pub fn new(
        points: Vec<Point>,
        x_quantity: Quantity,
        y_quantity: Quantity,
        order: Option<SortedArrayOrder>,
    ) -> Self {
        Self {
            points,
            x_quantity,
            y_quantity,
            order,
        }
    }

    /// Points with the x order detected from the data.
    pub fn with_detected_order(
        points: Vec<Point>,
        x_quantity: Quantity,
        y_quantity: Quantity,
    ) -> Self {
        let xs: Vec<f64> = points.iter().map(|p| p.x).collect();
        let order = SortedArrayOrder::of(&xs);
        Self::new(points, x_quantity, y_quantity, order)
    }

    pub fn from_xy(
        xs: &[f64],
        ys: &[f64],
        x_quantity: Quantity,
        y_quantity: Quantity,
        order: Option<SortedArrayOrder>,
    ) -> Result<Self> {
        if xs.len() != ys.len() {
            return Err(AfmError::InvalidArgument(format!(
                "{} x values but {} y values",
                xs.len(),
                ys.len()
            )));
        }
        let points = xs.iter().zip(ys).map(|(&x, &y)| Point::new(x, y)).collect();
        Ok(Self::new(points, x_quantity, y_quantity, order))
    }

    pub fn point_slice(&self) -> &[Point] {
        &self.points
    }
}

impl Channel1DData for FlexibleChannel1DData {
    fn x_quantity(&self) -> &Quantity {
        &self.x_quantity
    }

    fn y_quantity(&self) -> &Quantity {
        &self.y_quantity
    }

    fn item_count(&self) -> usize {
        self.points.len()
    }

    fn x(&self, index: usize) -> f64 {
        self.points[index].x
    }

    fn y(&self, index: usize) -> f64 {
        self.points[index].y
    }

    fn x_order(&self) -> Option<SortedArrayOrder> {
        self.order
    }

    fn scaled_copy(&self, factor: f64, y_quantity: Option<Quantity>) -> Box<dyn Channel1DData> {
        let points = self
            .points
            .iter()
            .map(|p| Point::new(p.x, factor * p.y))
            .collect();
        Box::new(Self::new(
            points,
            self.x_quantity.clone(),
            y_quantity.unwrap_or_else(|| self.y_quantity.clone()),
            self.order,
        ))
    }

    fn points(&self) -> Vec<Point> {
        self.points.clone()
    }
}
