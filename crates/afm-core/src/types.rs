//! Common types and constants shared by axes, grids and channel data

use std::fmt;

// ============================================================================
// Constants
// ============================================================================

/// Relative tolerance used when inferring a regular grid from sampled nodes
pub const DEFAULT_GRID_TOLERANCE: f64 = 1e-6;

/// Number of scaled MADs a value may deviate from the median and still count
/// towards the robust z-range
pub const ROBUST_RANGE_MAD_FACTOR: f64 = 3.5;

/// Consistency constant turning a MAD into a standard deviation estimate
pub const MAD_TO_SIGMA: f64 = 1.4826;

// ============================================================================
// Enums
// ============================================================================

/// Byte order of a binary source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endian {
    #[default]
    Little,
    Big,
}

/// Sort order of a coordinate array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortedArrayOrder {
    Ascending,
    Descending,
}

impl SortedArrayOrder {
    /// Detect the order of `values`; `None` if the values are not monotonic.
    ///
    /// Constant runs are accepted in either direction. A sequence with fewer
    /// than two distinct values is reported as ascending.
    pub fn of(values: &[f64]) -> Option<SortedArrayOrder> {
        let mut ascending = true;
        let mut descending = true;
        for w in values.windows(2) {
            if w[1] < w[0] {
                ascending = false;
            }
            if w[1] > w[0] {
                descending = false;
            }
            if !ascending && !descending {
                return None;
            }
        }
        if ascending {
            Some(SortedArrayOrder::Ascending)
        } else {
            Some(SortedArrayOrder::Descending)
        }
    }

    pub fn reversed(self) -> SortedArrayOrder {
        match self {
            SortedArrayOrder::Ascending => SortedArrayOrder::Descending,
            SortedArrayOrder::Descending => SortedArrayOrder::Ascending,
        }
    }
}

// ============================================================================
// Numeric range
// ============================================================================

/// Closed numeric interval `[min, max]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    /// Build a range from two ends in any order.
    pub fn new(a: f64, b: f64) -> Self {
        if a <= b {
            Self { min: a, max: b }
        } else {
            Self { min: b, max: a }
        }
    }

    /// The "nothing seen yet" range used as the seed of extremum scans.
    pub fn empty() -> Self {
        Self {
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        !(self.min <= self.max)
    }

    #[inline]
    pub fn length(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.max - self.min
        }
    }

    #[inline]
    pub fn contains(&self, v: f64) -> bool {
        self.min <= v && v <= self.max
    }

    /// Widen the range to include `v`; NaN is ignored.
    #[inline]
    pub fn include(&mut self, v: f64) {
        if v < self.min {
            self.min = v;
        }
        if v > self.max {
            self.max = v;
        }
    }

    pub fn union(&self, other: &Range) -> Range {
        Range {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn intersection(&self, other: &Range) -> Option<Range> {
        let r = Range {
            min: self.min.max(other.min),
            max: self.max.min(other.max),
        };
        if r.is_empty() {
            None
        } else {
            Some(r)
        }
    }

    /// Range spanning every non-NaN value of `values`.
    pub fn of<I: IntoIterator<Item = f64>>(values: I) -> Range {
        let mut r = Range::empty();
        for v in values {
            r.include(v);
        }
        r
    }
}

// ============================================================================
// Units and quantities
// ============================================================================

/// A base unit symbol with a decimal SI prefix, e.g. `nm` is `("m", -9)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Unit {
    pub symbol: String,
    pub prefix_exponent: i32,
}

impl Unit {
    pub fn new(symbol: impl Into<String>, prefix_exponent: i32) -> Self {
        Self {
            symbol: symbol.into(),
            prefix_exponent,
        }
    }

    /// Unit without a prefix
    pub fn base(symbol: impl Into<String>) -> Self {
        Self::new(symbol, 0)
    }

    pub fn dimensionless() -> Self {
        Self::new("", 0)
    }

    fn prefix(&self) -> &'static str {
        match self.prefix_exponent {
            -15 => "f",
            -12 => "p",
            -9 => "n",
            -6 => "\u{b5}",
            -3 => "m",
            3 => "k",
            6 => "M",
            9 => "G",
            _ => "",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = self.prefix();
        if prefix.is_empty() && self.prefix_exponent != 0 {
            write!(f, "1e{} {}", self.prefix_exponent, self.symbol)
        } else {
            write!(f, "{}{}", prefix, self.symbol)
        }
    }
}

/// A named physical quantity attached to an axis or a value array
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Quantity {
    pub name: String,
    pub unit: Unit,
}

impl Quantity {
    pub fn new(name: impl Into<String>, unit: Unit) -> Self {
        Self {
            name: name.into(),
            unit,
        }
    }

    pub fn dimensionless(name: impl Into<String>) -> Self {
        Self::new(name, Unit::dimensionless())
    }

    /// Same name and base unit, possibly different prefix.
    pub fn is_compatible(&self, other: &Quantity) -> bool {
        self.name == other.name && self.unit.symbol == other.unit.symbol
    }

    /// Factor converting values expressed in `self` into `other`.
    pub fn conversion_factor(&self, other: &Quantity) -> Option<f64> {
        if self.unit.symbol != other.unit.symbol {
            return None;
        }
        Some(10f64.powi(self.unit.prefix_exponent - other.unit.prefix_exponent))
    }

    pub fn with_prefix_exponent(&self, prefix_exponent: i32) -> Quantity {
        Quantity::new(
            self.name.clone(),
            Unit::new(self.unit.symbol.clone(), prefix_exponent),
        )
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.unit.symbol.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{} ({})", self.name, self.unit)
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_detection() {
        assert_eq!(
            SortedArrayOrder::of(&[1.0, 2.0, 2.0, 5.0]),
            Some(SortedArrayOrder::Ascending)
        );
        assert_eq!(
            SortedArrayOrder::of(&[5.0, 3.0, 1.0]),
            Some(SortedArrayOrder::Descending)
        );
        assert_eq!(SortedArrayOrder::of(&[1.0, 3.0, 2.0]), None);
        assert_eq!(SortedArrayOrder::of(&[]), Some(SortedArrayOrder::Ascending));
    }

    #[test]
    fn test_range_include_ignores_nan() {
        let r = Range::of([3.0, f64::NAN, -1.0, 2.0]);
        assert_eq!(r, Range::new(-1.0, 3.0));
        assert!(Range::empty().is_empty());
    }

    #[test]
    fn test_quantity_conversion() {
        let nm = Quantity::new("Height", Unit::new("m", -9));
        let um = Quantity::new("Height", Unit::new("m", -6));
        let factor = nm.conversion_factor(&um).unwrap();
        assert!((factor - 1e-3).abs() < 1e-15);
        assert!(nm.is_compatible(&um));
        assert_eq!(nm.to_string(), "Height (nm)");

        let force = Quantity::new("Force", Unit::new("N", -9));
        assert!(nm.conversion_factor(&force).is_none());
    }
}
