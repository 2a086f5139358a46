//! Integer image coordinates.

/// A pixel position in image coordinates.
///
/// Raw pointer positions may lie outside the image, so the components are
/// signed; anything that indexes the cost field checks bounds first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance in pixels.
    pub fn distance(&self, other: Point) -> f64 {
        let dx = (self.x - other.x) as f64;
        let dy = (self.y - other.y) as f64;
        (dx * dx + dy * dy).sqrt()
    }

    /// True when the two points differ in both x and y.
    #[inline]
    pub fn is_diagonal_to(&self, other: Point) -> bool {
        self.x != other.x && self.y != other.y
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

impl From<Point> for (i32, i32) {
    fn from(p: Point) -> Self {
        (p.x, p.y)
    }
}
