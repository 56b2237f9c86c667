//! Rectangular index spaces built from two 1D axes
//!
//! Columns follow the x axis and rows follow the y axis, so a value array of a
//! support has shape `(row_count, column_count)`.

use crate::axis::{Axis1D, DataAxis1D, Grid1D};
use crate::error::Result;
use crate::geometry::{Point, Rect, RoiPosition, RoiShape};
use crate::types::{Range, SortedArrayOrder};

/// Corner of a grid cell, numbered counter-clockwise from the lower left
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellCorner {
    SouthWest = 0,
    NorthWest = 1,
    NorthEast = 2,
    SouthEast = 3,
}

impl CellCorner {
    pub const ALL: [CellCorner; 4] = [
        CellCorner::SouthWest,
        CellCorner::NorthWest,
        CellCorner::NorthEast,
        CellCorner::SouthEast,
    ];

    pub fn from_index(index: usize) -> Option<CellCorner> {
        Self::ALL.get(index).copied()
    }

    fn is_west(self) -> bool {
        matches!(self, CellCorner::SouthWest | CellCorner::NorthWest)
    }

    fn is_south(self) -> bool {
        matches!(self, CellCorner::SouthWest | CellCorner::SouthEast)
    }
}

/// Inclusive block of rows and columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IndexBlock {
    pub min_row: usize,
    pub max_row: usize,
    pub min_column: usize,
    pub max_column: usize,
}

impl IndexBlock {
    pub fn new(min_row: usize, max_row: usize, min_column: usize, max_column: usize) -> Self {
        Self {
            min_row,
            max_row,
            min_column,
            max_column,
        }
    }

    #[inline]
    pub fn row_count(&self) -> usize {
        self.max_row - self.min_row + 1
    }

    #[inline]
    pub fn column_count(&self) -> usize {
        self.max_column - self.min_column + 1
    }

    #[inline]
    pub fn item_count(&self) -> usize {
        self.row_count() * self.column_count()
    }

    #[inline]
    pub fn contains(&self, row: usize, column: usize) -> bool {
        self.min_row <= row
            && row <= self.max_row
            && self.min_column <= column
            && column <= self.max_column
    }

    /// Every `(row, column)` of the block, row by row.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (self.min_row..=self.max_row)
            .flat_map(move |r| (self.min_column..=self.max_column).map(move |c| (r, c)))
    }
}

/// Node indices of `axis` whose coordinates lie in `[lo, hi]`.
fn inscribed_span(axis: &dyn DataAxis1D, lo: f64, hi: f64) -> Option<(usize, usize)> {
    let n = axis.count();
    if n == 0 || hi < lo {
        return None;
    }
    let (first, last) = match axis.order() {
        SortedArrayOrder::Ascending => (axis.ceiling_index(lo), axis.floor_index(hi)),
        SortedArrayOrder::Descending => (axis.ceiling_index(hi), axis.floor_index(lo)),
    };
    let first = first.max(0);
    let last = last.min(n as isize - 1);
    if first > last {
        None
    } else {
        Some((first as usize, last as usize))
    }
}

/// Offset from node `index` to the cell edge towards smaller (`downwards`)
/// or larger coordinates.
fn half_step(axis: &dyn DataAxis1D, index: usize, downwards: bool) -> f64 {
    let towards_previous = match axis.order() {
        SortedArrayOrder::Ascending => downwards,
        SortedArrayOrder::Descending => !downwards,
    };
    let step = if towards_previous {
        axis.increment_to_previous(index)
    } else {
        axis.increment_to_next(index)
    };
    0.5 * step
}

/// Row/column index space over two axes
pub trait ArraySupport2D {
    fn x_axis(&self) -> &dyn DataAxis1D;

    fn y_axis(&self) -> &dyn DataAxis1D;

    fn row_count(&self) -> usize {
        self.y_axis().count()
    }

    fn column_count(&self) -> usize {
        self.x_axis().count()
    }

    fn item_count(&self) -> usize {
        self.row_count() * self.column_count()
    }

    fn x_at_column(&self, column: usize) -> f64 {
        self.x_axis().value(column)
    }

    fn y_at_row(&self, row: usize) -> f64 {
        self.y_axis().value(row)
    }

    fn point(&self, row: usize, column: usize) -> Point {
        Point::new(self.x_at_column(column), self.y_at_row(row))
    }

    /// Nearest column, with the axis' [`DataAxis1D::index`] semantics
    fn column_of(&self, x: f64) -> isize {
        self.x_axis().index(x)
    }

    /// Nearest row, with the axis' [`DataAxis1D::index`] semantics
    fn row_of(&self, y: f64) -> isize {
        self.y_axis().index(y)
    }

    fn column_within_bounds(&self, x: f64) -> usize {
        self.x_axis().index_within_bounds(x)
    }

    fn row_within_bounds(&self, y: f64) -> usize {
        self.y_axis().index_within_bounds(y)
    }

    fn x_range(&self) -> Range {
        self.x_axis().range()
    }

    fn y_range(&self) -> Range {
        self.y_axis().range()
    }

    fn data_area(&self) -> Rect {
        let x = self.x_range();
        let y = self.y_range();
        Rect::new(x.min, y.min, x.max, y.max)
    }

    fn is_within_domain(&self, x: f64, y: f64) -> bool {
        self.x_axis().is_within_domain(x) && self.y_axis().is_within_domain(y)
    }

    /// Mean node spacing along x and y
    fn density(&self) -> (f64, f64) {
        (self.x_axis().mean_increment(), self.y_axis().mean_increment())
    }

    /// Corner of the cell around node `(row, column)`.
    ///
    /// Each edge sits half way to the neighbouring node on that side, so cells
    /// on an irregular axis may be asymmetric.
    fn corner_point(&self, row: usize, column: usize, corner: CellCorner) -> Point {
        let x = self.x_at_column(column);
        let y = self.y_at_row(row);
        let dx = half_step(self.x_axis(), column, corner.is_west());
        let dy = half_step(self.y_axis(), row, corner.is_south());
        Point::new(
            if corner.is_west() { x - dx } else { x + dx },
            if corner.is_south() { y - dy } else { y + dy },
        )
    }

    fn full_block(&self) -> Option<IndexBlock> {
        if self.row_count() == 0 || self.column_count() == 0 {
            return None;
        }
        Some(IndexBlock::new(0, self.row_count() - 1, 0, self.column_count() - 1))
    }

    /// Largest block of nodes lying inside `rect`.
    fn inscribed_block_in_rect(&self, rect: &Rect) -> Option<IndexBlock> {
        let (min_column, max_column) = inscribed_span(self.x_axis(), rect.min_x, rect.max_x)?;
        let (min_row, max_row) = inscribed_span(self.y_axis(), rect.min_y, rect.max_y)?;
        Some(IndexBlock::new(min_row, max_row, min_column, max_column))
    }

    /// Block of nodes that can hold the points selected by `position`.
    ///
    /// For `Outside` the ROI is first subtracted from the data area; a
    /// non-rectangular ROI cannot shrink the bounding box and leaves the whole
    /// area.
    fn inscribed_block(&self, roi: &dyn RoiShape, position: RoiPosition) -> Option<IndexBlock> {
        match position {
            RoiPosition::Inside => self.inscribed_block_in_rect(&roi.bounds()),
            RoiPosition::Outside => {
                let area = self.data_area();
                let remaining = match roi.as_rectangle() {
                    Some(rect) => area.difference_bounds(&rect)?,
                    None => area,
                };
                self.inscribed_block_in_rect(&remaining)
            }
            RoiPosition::Everything => self.full_block(),
        }
    }
}

// ============================================================================
// Regular x regular
// ============================================================================

/// Support made of two regular grids
#[derive(Debug, Clone, PartialEq)]
pub struct Grid2D {
    x: Grid1D,
    y: Grid1D,
}

impl Grid2D {
    pub fn new(x: Grid1D, y: Grid1D) -> Self {
        Self { x, y }
    }

    pub fn x_grid(&self) -> &Grid1D {
        &self.x
    }

    pub fn y_grid(&self) -> &Grid1D {
        &self.y
    }

    /// Same area sampled with a different number of rows and columns.
    pub fn resized(&self, rows: usize, columns: usize) -> Result<Grid2D> {
        Ok(Grid2D::new(self.x.resized(columns)?, self.y.resized(rows)?))
    }

    pub fn equal_up_to_prefix(&self, other: &Grid2D) -> bool {
        self.x.equal_up_to_prefix(&other.x) && self.y.equal_up_to_prefix(&other.y)
    }
}

impl ArraySupport2D for Grid2D {
    fn x_axis(&self) -> &dyn DataAxis1D {
        &self.x
    }

    fn y_axis(&self) -> &dyn DataAxis1D {
        &self.y
    }
}

// ============================================================================
// Mixed axes
// ============================================================================

/// Support whose axes may each be regular or irregular
#[derive(Debug, Clone, PartialEq)]
pub struct SemiGrid2D {
    x: Axis1D,
    y: Axis1D,
}

impl SemiGrid2D {
    pub fn new(x: impl Into<Axis1D>, y: impl Into<Axis1D>) -> Self {
        Self {
            x: x.into(),
            y: y.into(),
        }
    }

    pub fn x(&self) -> &Axis1D {
        &self.x
    }

    pub fn y(&self) -> &Axis1D {
        &self.y
    }

    /// The equivalent regular grid when both axes are regular.
    pub fn as_grid(&self) -> Option<Grid2D> {
        match (&self.x, &self.y) {
            (Axis1D::Regular(x), Axis1D::Regular(y)) => Some(Grid2D::new(x.clone(), y.clone())),
            _ => None,
        }
    }
}

impl From<Grid2D> for SemiGrid2D {
    fn from(grid: Grid2D) -> Self {
        SemiGrid2D::new(grid.x, grid.y)
    }
}

impl ArraySupport2D for SemiGrid2D {
    fn x_axis(&self) -> &dyn DataAxis1D {
        &self.x
    }

    fn y_axis(&self) -> &dyn DataAxis1D {
        &self.y
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::IncreasingDataAxis1D;
    use crate::geometry::Ellipse;
    use crate::types::{Quantity, Unit};

    fn q(name: &str) -> Quantity {
        Quantity::new(name, Unit::new("m", -6))
    }

    fn grid() -> Grid2D {
        // columns x = 0..=5, rows y = 0..=4
        Grid2D::new(
            Grid1D::new(0.0, 1.0, 6, q("x")).unwrap(),
            Grid1D::new(0.0, 1.0, 5, q("y")).unwrap(),
        )
    }

    #[test]
    fn test_counts_and_mapping() {
        let g = grid();
        assert_eq!(g.row_count(), 5);
        assert_eq!(g.column_count(), 6);
        assert_eq!(g.item_count(), 30);
        assert_eq!(g.point(2, 3), Point::new(3.0, 2.0));
        assert_eq!(g.column_of(2.6), 3);
        assert_eq!(g.row_within_bounds(-3.0), 0);
        assert_eq!(g.data_area(), Rect::new(0.0, 0.0, 5.0, 4.0));
    }

    #[test]
    fn test_corner_points() {
        let g = grid();
        assert_eq!(g.corner_point(1, 1, CellCorner::SouthWest), Point::new(0.5, 0.5));
        assert_eq!(g.corner_point(1, 1, CellCorner::NorthEast), Point::new(1.5, 1.5));
        assert_eq!(CellCorner::from_index(3), Some(CellCorner::SouthEast));
        assert_eq!(CellCorner::from_index(4), None);
    }

    #[test]
    fn test_out_of_domain_lookup_per_axis_kind() {
        let x = IncreasingDataAxis1D::new(vec![0.0, 1.0, 4.0], q("x")).unwrap();
        let y = Grid1D::new(0.0, 2.0, 3, q("y")).unwrap();
        let s = SemiGrid2D::new(x, y);
        // regular rows extrapolate, irregular columns stop at the end node
        assert_eq!(s.row_of(10.0), 5);
        assert_eq!(s.row_of(-2.0), -1);
        assert_eq!(s.column_of(10.0), 2);
        assert_eq!(s.column_of(-2.0), 0);
        assert_eq!(s.row_within_bounds(10.0), 2);
    }

    #[test]
    fn test_corner_points_irregular_asymmetric() {
        let x = IncreasingDataAxis1D::new(vec![0.0, 1.0, 4.0], q("x")).unwrap();
        let y = Grid1D::new(0.0, 2.0, 3, q("y")).unwrap();
        let s = SemiGrid2D::new(x, y);
        assert_eq!(s.corner_point(0, 1, CellCorner::SouthWest), Point::new(0.5, -1.0));
        assert_eq!(s.corner_point(0, 1, CellCorner::SouthEast), Point::new(2.5, -1.0));
        assert!(s.as_grid().is_none());
    }

    #[test]
    fn test_corner_points_descending_axis() {
        let g = Grid2D::new(
            Grid1D::new(5.0, -1.0, 6, q("x")).unwrap(),
            Grid1D::new(0.0, 1.0, 5, q("y")).unwrap(),
        );
        // column 0 sits at x = 5; its west edge is at 4.5
        assert_eq!(g.corner_point(0, 0, CellCorner::NorthWest), Point::new(4.5, 0.5));
    }

    #[test]
    fn test_inscribed_blocks() {
        let g = grid();
        let roi = Rect::new(0.5, 1.5, 3.5, 4.5);
        let inside = g.inscribed_block(&roi, RoiPosition::Inside).unwrap();
        assert_eq!(inside, IndexBlock::new(2, 4, 1, 3));
        assert_eq!(inside.item_count(), 9);

        // a strip covering the left of the grid leaves columns 4 and 5
        let strip = Rect::new(-1.0, -1.0, 3.5, 10.0);
        let outside = g.inscribed_block(&strip, RoiPosition::Outside).unwrap();
        assert_eq!(outside, IndexBlock::new(0, 4, 4, 5));

        let everything = g.inscribed_block(&roi, RoiPosition::Everything).unwrap();
        assert_eq!(everything.item_count(), 30);

        let far = Rect::new(10.0, 10.0, 11.0, 11.0);
        assert!(g.inscribed_block(&far, RoiPosition::Inside).is_none());

        let ellipse = Ellipse::new(Point::new(2.0, 2.0), 0.5, 0.5);
        assert_eq!(
            g.inscribed_block(&ellipse, RoiPosition::Outside),
            g.full_block()
        );
    }

    #[test]
    fn test_inscribed_block_descending() {
        let g = Grid2D::new(
            Grid1D::new(5.0, -1.0, 6, q("x")).unwrap(),
            Grid1D::new(0.0, 1.0, 5, q("y")).unwrap(),
        );
        let block = g.inscribed_block_in_rect(&Rect::new(0.5, 0.0, 2.5, 0.0)).unwrap();
        // x = 2 and x = 1 are columns 3 and 4
        assert_eq!(block, IndexBlock::new(0, 0, 3, 4));
    }
}
