//! Screen management module
//!
//! Handles:
//! - The monitor topology (rebuilt on every geometry change)
//! - Edge-crossing resolution for pointer motion samples

mod resolver;
mod topology;

pub use resolver::Resolver;
pub use topology::{Monitor, Topology};

/// A rectangular screen region in shared pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Length of the overlap between the horizontal span `[x, x+w)` and this
    /// rectangle's horizontal span, clamped to zero.
    pub fn intersect_x(&self, x: i32, w: i32) -> i32 {
        0.max((x + w).min(self.x + self.w) - x.max(self.x))
    }

    /// Length of the overlap between the vertical span `[y, y+h)` and this
    /// rectangle's vertical span, clamped to zero.
    pub fn intersect_y(&self, y: i32, h: i32) -> i32 {
        0.max((y + h).min(self.y + self.h) - y.max(self.y))
    }

    /// Overlap area between this rectangle and the query rectangle.
    pub fn intersect_area(&self, x: i32, y: i32, w: i32, h: i32) -> i32 {
        self.intersect_x(x, w) * self.intersect_y(y, h)
    }

    /// First pixel column past the right edge.
    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    /// First pixel row past the bottom edge.
    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }
}

/// Direction of an edge crossing, named from the origin monitor's viewpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Above,
    Below,
    LeftOf,
    RightOf,
}

impl Direction {
    /// The axis the pointer crosses when leaving in this direction.
    pub fn is_vertical(self) -> bool {
        matches!(self, Direction::Above | Direction::Below)
    }
}
