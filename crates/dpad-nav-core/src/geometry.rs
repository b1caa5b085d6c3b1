use serde::Deserialize;
use serde::Serialize;

use crate::error::ConfigError;

/// On-screen box of an element, in CSS pixels with y growing downward.
///
/// Always built from edges so the derived fields stay consistent:
/// `width = right - left`, `height = bottom - top`, both clamped to zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rect {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
    pub center_x: f64,
    pub center_y: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::from_edges(x, y, x + width.max(0.0), y + height.max(0.0))
    }

    pub fn from_edges(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        let right = right.max(left);
        let bottom = bottom.max(top);
        let width = right - left;
        let height = bottom - top;
        Self {
            top,
            right,
            bottom,
            left,
            width,
            height,
            center_x: left + width / 2.0,
            center_y: top + height / 2.0,
        }
    }

    /// A rect with no extent at all, as reported for detached or `display:none` nodes.
    pub fn is_degenerate(&self) -> bool {
        self.width == 0.0 && self.height == 0.0
    }

    pub fn is_finite(&self) -> bool {
        [self.top, self.right, self.bottom, self.left]
            .iter()
            .all(|v| v.is_finite())
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.left && x < self.right && y >= self.top && y < self.bottom
    }

    /// Center coordinate along `axis`.
    pub fn center_on(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Horizontal => self.center_x,
            Axis::Vertical => self.center_y,
        }
    }

    /// Extent (width or height) along `axis`.
    pub fn extent_on(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Horizontal => self.width,
            Axis::Vertical => self.height,
        }
    }

    /// Start and end edges along `axis`.
    pub fn span_on(&self, axis: Axis) -> (f64, f64) {
        match axis {
            Axis::Horizontal => (self.left, self.right),
            Axis::Vertical => (self.top, self.bottom),
        }
    }

    /// Whether the projections of both rects on `axis` share a positive length.
    pub fn overlaps_on(&self, other: &Rect, axis: Axis) -> bool {
        let (a0, a1) = self.span_on(axis);
        let (b0, b1) = other.span_on(axis);
        a0.max(b0) < a1.min(b1)
    }

    pub fn center_distance(&self, other: &Rect) -> f64 {
        let dx = other.center_x - self.center_x;
        let dy = other.center_y - self.center_y;
        (dx * dx + dy * dy).sqrt()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    pub fn perpendicular(self) -> Axis {
        match self {
            Axis::Horizontal => Axis::Vertical,
            Axis::Vertical => Axis::Horizontal,
        }
    }
}

/// A directional-pad move. Closed set; diagonals are never produced upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Left,
    Up,
    Right,
    Down,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Up,
        Direction::Right,
        Direction::Down,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Left => "left",
            Direction::Up => "up",
            Direction::Right => "right",
            Direction::Down => "down",
        }
    }

    /// Axis the move travels along.
    pub fn axis(self) -> Axis {
        match self {
            Direction::Left | Direction::Right => Axis::Horizontal,
            Direction::Up | Direction::Down => Axis::Vertical,
        }
    }

    /// +1 when the move increases the coordinate on its axis, -1 otherwise.
    pub fn sign(self) -> f64 {
        match self {
            Direction::Right | Direction::Down => 1.0,
            Direction::Left | Direction::Up => -1.0,
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Left => Direction::Right,
            Direction::Up => Direction::Down,
            Direction::Right => Direction::Left,
            Direction::Down => Direction::Up,
        }
    }

    pub fn is_horizontal(self) -> bool {
        self.axis() == Axis::Horizontal
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Direction {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left" => Ok(Direction::Left),
            "up" => Ok(Direction::Up),
            "right" => Ok(Direction::Right),
            "down" => Ok(Direction::Down),
            other => Err(ConfigError::InvalidValue {
                field: "direction".to_string(),
                value: other.to_string(),
                allowed: "left, up, right, down".to_string(),
            }),
        }
    }
}
