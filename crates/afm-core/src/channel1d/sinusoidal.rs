use super::Channel1DData;
use crate::axis::{DataAxis1D, Grid1D};
use crate::types::{Quantity, SortedArrayOrder};

/// `amplitude * sin(angular_frequency * x + phase) + offset` sampled on a grid
#[derive(Debug, Clone, PartialEq)]
pub struct SinusoidalChannel1DData {
    grid: Grid1D,
    amplitude: f64,
    angular_frequency: f64,
    phase: f64,
    offset: f64,
    y_quantity: Quantity,
}

impl SinusoidalChannel1DData {
    pub fn new(
        grid: Grid1D,
        amplitude: f64,
        angular_frequency: f64,
        phase: f64,
        offset: f64,
        y_quantity: Quantity,
    ) -> Self {
        Self {
            grid,
            amplitude,
            angular_frequency,
            phase,
            offset,
            y_quantity,
        }
    }

    pub fn grid(&self) -> &Grid1D {
        &self.grid
    }

    pub fn amplitude(&self) -> f64 {
        self.amplitude
    }

    pub fn angular_frequency(&self) -> f64 {
        self.angular_frequency
    }

    pub fn phase(&self) -> f64 {
        self.phase
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn evaluate(&self, x: f64) -> f64 {
        self.amplitude * (self.angular_frequency * x + self.phase).sin() + self.offset
    }
}

impl Channel1DData for SinusoidalChannel1DData {
    fn x_quantity(&self) -> &Quantity {
        self.grid.quantity()
    }

    fn y_quantity(&self) -> &Quantity {
        &self.y_quantity
    }

    fn item_count(&self) -> usize {
        self.grid.count()
    }

    fn x(&self, index: usize) -> f64 {
        self.grid.value(index)
    }

    fn y(&self, index: usize) -> f64 {
        self.evaluate(self.grid.value(index))
    }

    fn x_order(&self) -> Option<SortedArrayOrder> {
        Some(self.grid.order())
    }

    fn scaled_copy(&self, factor: f64, y_quantity: Option<Quantity>) -> Box<dyn Channel1DData> {
        Box::new(Self {
            amplitude: factor * self.amplitude,
            offset: factor * self.offset,
            y_quantity: y_quantity.unwrap_or_else(|| self.y_quantity.clone()),
            ..self.clone()
        })
    }
}
