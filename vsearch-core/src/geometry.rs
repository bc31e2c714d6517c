use serde::{Deserialize, Serialize};

/// A location in degrees of visual angle, relative to fixation at the origin.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance from fixation
    pub fn norm(&self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn distance(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn quadrant(&self) -> Quadrant {
        Quadrant::of(self)
    }
}

impl From<[f64; 2]> for Point {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Point> for [f64; 2] {
    fn from(p: Point) -> Self {
        [p.x, p.y]
    }
}

/// Sign-defined quadrant around fixation. Points on an axis belong to the
/// non-negative side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quadrant {
    LowerLeft,
    LowerRight,
    UpperLeft,
    UpperRight,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [
        Quadrant::LowerLeft,
        Quadrant::LowerRight,
        Quadrant::UpperLeft,
        Quadrant::UpperRight,
    ];

    pub fn of(p: &Point) -> Self {
        match (p.x < 0.0, p.y < 0.0) {
            (true, true) => Quadrant::LowerLeft,
            (false, true) => Quadrant::LowerRight,
            (true, false) => Quadrant::UpperLeft,
            (false, false) => Quadrant::UpperRight,
        }
    }

    /// Stable index in `0..4`, usable for per-quadrant counters.
    pub fn index(&self) -> usize {
        match self {
            Quadrant::LowerLeft => 0,
            Quadrant::LowerRight => 1,
            Quadrant::UpperLeft => 2,
            Quadrant::UpperRight => 3,
        }
    }
}
