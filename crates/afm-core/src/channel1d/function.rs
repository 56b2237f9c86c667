use super::Channel1DData;
use crate::axis::{DataAxis1D, Grid1D};
use crate::types::{Quantity, SortedArrayOrder};
use std::fmt;
use std::sync::Arc;

type CurveFn = Arc<dyn Fn(f64) -> f64 + Send + Sync>;

/// Closed-form curve evaluated at the nodes of a grid
#[derive(Clone)]
pub struct FunctionChannel1DData {
    grid: Grid1D,
    function: CurveFn,
    y_quantity: Quantity,
}

impl FunctionChannel1DData {
    pub fn new<F>(grid: Grid1D, function: F, y_quantity: Quantity) -> Self
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        Self {
            grid,
            function: Arc::new(function),
            y_quantity,
        }
    }

    pub fn grid(&self) -> &Grid1D {
        &self.grid
    }

    /// Value of the curve at any `x`, on or off the grid
    pub fn evaluate(&self, x: f64) -> f64 {
        (self.function)(x)
    }
}

impl fmt::Debug for FunctionChannel1DData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionChannel1DData")
            .field("grid", &self.grid)
            .field("y_quantity", &self.y_quantity)
            .finish_non_exhaustive()
    }
}

impl Channel1DData for FunctionChannel1DData {
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
        let inner = Arc::clone(&self.function);
        Box::new(Self {
            grid: self.grid.clone(),
            function: Arc::new(move |x| factor * inner(x)),
            y_quantity: y_quantity.unwrap_or_else(|| self.y_quantity.clone()),
        })
    }
}
