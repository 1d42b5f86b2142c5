//! Core types shared by the dotpick crates.
//!
//! Points, drawable areas, colors and the [`Surface`] trait that every
//! renderer implements.

mod color;
mod surface;

pub use color::{DotTheme, Rgba};
pub use surface::{DrawCall, RecordingSurface, Surface};

/// Size of the drawable area in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Area {
    pub width: f64,
    pub height: f64,
}

impl Area {
    /// Create a new area.
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Centre of the area.
    pub fn center(&self) -> (f64, f64) {
        (self.width / 2.0, self.height / 2.0)
    }
}

/// A position with depth, alpha and a hold counter.
///
/// `z` doubles as the drawn radius. `h` is the number of update ticks to wait
/// before easing toward this point; `-1` snaps immediately.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub a: f64,
    pub h: i32,
}

impl Point {
    /// Hold value that makes a particle jump straight to its target.
    pub const SNAP: i32 = -1;

    /// A point at `(x, y)` with zero depth, full alpha and no hold.
    pub const fn at(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            z: 0.0,
            a: 1.0,
            h: 0,
        }
    }

    /// Euclidean distance between the positions of two points.
    pub fn distance(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_defaults() {
        let p = Point::at(3.0, 4.0);
        assert_eq!(p.z, 0.0);
        assert_eq!(p.a, 1.0);
        assert_eq!(p.h, 0);
        assert_eq!(p.distance(&Point::at(0.0, 0.0)), 5.0);
    }

    #[test]
    fn test_area_center() {
        assert_eq!(Area::new(100.0, 40.0).center(), (50.0, 20.0));
    }
}
