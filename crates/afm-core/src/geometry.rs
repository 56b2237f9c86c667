//! Planar points, rectangles and region-of-interest shapes

/// Point in the physical xy plane
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn distance_sq(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

/// Axis-aligned rectangle with closed edges
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Rect {
    /// Rectangle from two opposite corners in any order.
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            min_x: x0.min(x1),
            min_y: y0.min(y1),
            max_x: x0.max(x1),
            max_y: y0.max(y1),
        }
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    #[inline]
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    #[inline]
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        self.min_x <= x && x <= self.max_x && self.min_y <= y && y <= self.max_y
    }

    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let r = Rect {
            min_x: self.min_x.max(other.min_x),
            min_y: self.min_y.max(other.min_y),
            max_x: self.max_x.min(other.max_x),
            max_y: self.max_y.min(other.max_y),
        };
        if r.min_x <= r.max_x && r.min_y <= r.max_y {
            Some(r)
        } else {
            None
        }
    }

    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Bounding box of `self` with `cut` removed; `None` if nothing is left.
    ///
    /// Only a cut spanning a full side shrinks the box, any other cut leaves
    /// a ring whose bounds are the box itself.
    pub fn difference_bounds(&self, cut: &Rect) -> Option<Rect> {
        let Some(overlap) = self.intersection(cut) else {
            return Some(*self);
        };
        let full_height = overlap.min_y <= self.min_y && overlap.max_y >= self.max_y;
        let full_width = overlap.min_x <= self.min_x && overlap.max_x >= self.max_x;

        match (full_width, full_height) {
            (true, true) => None,
            (false, true) => {
                let left = overlap.min_x > self.min_x;
                let right = overlap.max_x < self.max_x;
                let min_x = if left { self.min_x } else { overlap.max_x };
                let max_x = if right { self.max_x } else { overlap.min_x };
                Some(Rect { min_x, max_x, ..*self })
            }
            (true, false) => {
                let below = overlap.min_y > self.min_y;
                let above = overlap.max_y < self.max_y;
                let min_y = if below { self.min_y } else { overlap.max_y };
                let max_y = if above { self.max_y } else { overlap.min_y };
                Some(Rect { min_y, max_y, ..*self })
            }
            (false, false) => Some(*self),
        }
    }
}

/// Which part of the data relative to an ROI an operation selects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoiPosition {
    Inside,
    Outside,
    Everything,
}

impl RoiPosition {
    /// Whether a point with the given containment is selected.
    #[inline]
    pub fn accepts(self, contained: bool) -> bool {
        match self {
            RoiPosition::Inside => contained,
            RoiPosition::Outside => !contained,
            RoiPosition::Everything => true,
        }
    }
}

/// A region of interest in the xy plane, consumed read-only
pub trait RoiShape {
    fn contains(&self, x: f64, y: f64) -> bool;

    fn bounds(&self) -> Rect;

    /// The shape itself when it is an axis-aligned rectangle.
    fn as_rectangle(&self) -> Option<Rect> {
        None
    }
}

impl RoiShape for Rect {
    fn contains(&self, x: f64, y: f64) -> bool {
        self.contains_point(x, y)
    }

    fn bounds(&self) -> Rect {
        *self
    }

    fn as_rectangle(&self) -> Option<Rect> {
        Some(*self)
    }
}

/// Simple polygon, tested with the even-odd rule
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    vertices: Vec<Point>,
    bounds: Rect,
}

impl Polygon {
    /// `None` for fewer than three vertices.
    pub fn new(vertices: Vec<Point>) -> Option<Self> {
        if vertices.len() < 3 {
            return None;
        }
        let mut bounds = Rect::new(vertices[0].x, vertices[0].y, vertices[0].x, vertices[0].y);
        for v in &vertices[1..] {
            bounds = bounds.union(&Rect::new(v.x, v.y, v.x, v.y));
        }
        Some(Self { vertices, bounds })
    }

    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }
}

impl RoiShape for Polygon {
    fn contains(&self, x: f64, y: f64) -> bool {
        if !self.bounds.contains_point(x, y) {
            return false;
        }
        let mut inside = false;
        let n = self.vertices.len();
        let mut j = n - 1;
        for i in 0..n {
            let (a, b) = (self.vertices[i], self.vertices[j]);
            if (a.y > y) != (b.y > y) && x < (b.x - a.x) * (y - a.y) / (b.y - a.y) + a.x {
                inside = !inside;
            }
            j = i;
        }
        inside
    }

    fn bounds(&self) -> Rect {
        self.bounds
    }
}

/// Axis-aligned ellipse
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipse {
    pub center: Point,
    pub semi_axis_x: f64,
    pub semi_axis_y: f64,
}

impl Ellipse {
    pub fn new(center: Point, semi_axis_x: f64, semi_axis_y: f64) -> Self {
        Self {
            center,
            semi_axis_x: semi_axis_x.abs(),
            semi_axis_y: semi_axis_y.abs(),
        }
    }
}

impl RoiShape for Ellipse {
    fn contains(&self, x: f64, y: f64) -> bool {
        if self.semi_axis_x == 0.0 || self.semi_axis_y == 0.0 {
            return false;
        }
        let u = (x - self.center.x) / self.semi_axis_x;
        let v = (y - self.center.y) / self.semi_axis_y;
        u * u + v * v <= 1.0
    }

    fn bounds(&self) -> Rect {
        Rect::new(
            self.center.x - self.semi_axis_x,
            self.center.y - self.semi_axis_y,
            self.center.x + self.semi_axis_x,
            self.center.y + self.semi_axis_y,
        )
    }
}
