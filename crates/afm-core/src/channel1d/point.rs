use super::Channel1DData;
use crate::geometry::Point;
use crate::types::{Quantity, SortedArrayOrder};

/// A channel holding exactly one sample
#[derive(Debug, Clone, PartialEq)]
pub struct PointChannel1DData {
    point: Point,
    x_quantity: Quantity,
    y_quantity: Quantity,
}

impl PointChannel1DData {
    pub fn new(point: Point, x_quantity: Quantity, y_quantity: Quantity) -> Self {
        Self {
            point,
            x_quantity,
            y_quantity,
        }
    }
}

impl Channel1DData for PointChannel1DData {
    fn x_quantity(&self) -> &Quantity {
        &self.x_quantity
    }

    fn y_quantity(&self) -> &Quantity {
        &self.y_quantity
    }

    fn item_count(&self) -> usize {
        1
    }

    fn x(&self, _index: usize) -> f64 {
        self.point.x
    }

    fn y(&self, _index: usize) -> f64 {
        self.point.y
    }

    fn x_order(&self) -> Option<SortedArrayOrder> {
        Some(SortedArrayOrder::Ascending)
    }

    fn scaled_copy(&self, factor: f64, y_quantity: Option<Quantity>) -> Box<dyn Channel1DData> {
        Box::new(Self::new(
            Point::new(self.point.x, factor * self.point.y),
            self.x_quantity.clone(),
            y_quantity.unwrap_or_else(|| self.y_quantity.clone()),
        ))
    }
}
