//! Drawing surface abstraction.

use crate::{Area, Point, Rgba};

/// An immediate-mode 2D surface the engine draws onto.
///
/// Implementations must not carry alpha from one call into the next: each
/// `draw_circle` is composited with the alpha of its own color only.
pub trait Surface {
    /// Current drawable area in pixels.
    fn area(&self) -> Area;

    /// Erase everything drawn so far this frame.
    fn clear(&mut self);

    /// Fill a circle of radius `point.z` centred on `(point.x, point.y)`.
    fn draw_circle(&mut self, point: &Point, color: Rgba);
}

/// One recorded `draw_circle` call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCall {
    pub point: Point,
    pub color: Rgba,
}

/// A surface that keeps every draw call in memory.
///
/// Useful for headless rendering and for inspecting what a frame drew.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    area: Area,
    calls: Vec<DrawCall>,
}

impl RecordingSurface {
    /// Create an empty surface of the given size.
    pub fn new(area: Area) -> Self {
        Self {
            area,
            calls: Vec::new(),
        }
    }

    /// Change the reported area, as a window resize would.
    pub fn resize(&mut self, area: Area) {
        self.area = area;
    }

    /// Draw calls since the last clear.
    pub fn calls(&self) -> &[DrawCall] {
        &self.calls
    }
}

impl Surface for RecordingSurface {
    fn area(&self) -> Area {
        self.area
    }

    fn clear(&mut self) {
        self.calls.clear();
    }

    fn draw_circle(&mut self, point: &Point, color: Rgba) {
        self.calls.push(DrawCall {
            point: *point,
            color,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_surface() {
        let mut surface = RecordingSurface::new(Area::new(10.0, 10.0));
        surface.draw_circle(&Point::at(1.0, 2.0), Rgba::WHITE);
        assert_eq!(surface.calls().len(), 1);
        surface.clear();
        assert!(surface.calls().is_empty());
        assert_eq!(surface.area(), Area::new(10.0, 10.0));
    }
}
