//! Offscreen alpha surface that shapes are drawn onto before sampling.

use dotpick_core::Point;

use crate::Shape;
use crate::glyphs::{self, GLYPH_ADVANCE, GLYPH_ROWS};
use crate::image::DecodedImage;

/// An alpha-only raster, one byte per pixel.
#[derive(Debug, Clone)]
pub struct RasterSurface {
    width: usize,
    height: usize,
    alpha: Vec<u8>,
}

impl RasterSurface {
    /// Create a cleared surface.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            alpha: vec![0; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Reset every pixel to transparent.
    pub fn clear(&mut self) {
        self.alpha.fill(0);
    }

    /// Alpha at a pixel, zero outside the surface.
    pub fn alpha_at(&self, x: usize, y: usize) -> u8 {
        if x < self.width && y < self.height {
            self.alpha[y * self.width + x]
        } else {
            0
        }
    }

    /// Fill every pixel the rectangle touches, clipped to the surface.
    pub fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        if w <= 0.0 || h <= 0.0 {
            return;
        }
        let x0 = x.floor().max(0.0) as usize;
        let y0 = y.floor().max(0.0) as usize;
        let x1 = ((x + w).ceil().max(0.0) as usize).min(self.width);
        let y1 = ((y + h).ceil().max(0.0) as usize).min(self.height);

        for row in y0..y1 {
            let start = row * self.width;
            for px in &mut self.alpha[start + x0.min(x1)..start + x1] {
                *px = u8::MAX;
            }
        }
    }

    /// Width of `text` in pixels when drawn `size` pixels tall.
    pub fn measure_text(text: &str, size: f64) -> f64 {
        glyphs::text_cells(text) as f64 * size / GLYPH_ROWS as f64
    }

    /// Draw `text` centred on `(cx, cy)` with glyphs `size` pixels tall.
    pub fn fill_text(&mut self, text: &str, cx: f64, cy: f64, size: f64) {
        let cell = size / GLYPH_ROWS as f64;
        let left = cx - Self::measure_text(text, size) / 2.0;
        let top = cy - size / 2.0;

        for (i, ch) in text.chars().enumerate() {
            let Some(glyph) = glyphs::glyph(ch) else {
                continue;
            };
            let origin = left + (i * GLYPH_ADVANCE) as f64 * cell;
            for (col, row) in glyphs::filled_cells(glyph) {
                self.fill_rect(
                    origin + col as f64 * cell,
                    top + row as f64 * cell,
                    cell,
                    cell,
                );
            }
        }
    }

    /// Draw an image scaled to `size` x `size` at the origin.
    ///
    /// Nearest-neighbour sampling of the image's alpha channel.
    pub fn draw_image(&mut self, image: &DecodedImage, size: usize) {
        if image.width == 0 || image.height == 0 || size == 0 {
            return;
        }
        let w = size.min(self.width);
        let h = size.min(self.height);
        for y in 0..h {
            let sy = y * image.height / size;
            for x in 0..w {
                let sx = x * image.width / size;
                let a = image.alpha_at(sx, sy);
                if a > 0 {
                    self.alpha[y * self.width + x] = a;
                }
            }
        }
    }

    /// Sample the surface every `gap` pixels and collect covered points.
    pub fn scan(&self, gap: usize) -> Shape {
        let gap = gap.max(1);
        let mut collector = ShapeCollector::new(self.width, self.height);
        for y in (0..self.height).step_by(gap) {
            for x in (0..self.width).step_by(gap) {
                if self.alpha_at(x, y) > 0 {
                    collector.push(x, y);
                }
            }
        }
        collector.finish()
    }
}

/// Accumulates sample points and their bounds.
///
/// The minimums start at the surface size and the maximums at zero. The
/// reported size is `max + min`, which pads the shape by its offset from the
/// origin; centering relies on that.
#[derive(Debug)]
pub(crate) struct ShapeCollector {
    points: Vec<Point>,
    min_x: usize,
    min_y: usize,
    max_x: usize,
    max_y: usize,
}

impl ShapeCollector {
    pub(crate) fn new(width: usize, height: usize) -> Self {
        Self {
            points: Vec::new(),
            min_x: width,
            min_y: height,
            max_x: 0,
            max_y: 0,
        }
    }

    pub(crate) fn push(&mut self, x: usize, y: usize) {
        self.points.push(Point::at(x as f64, y as f64));
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
    }

    pub(crate) fn finish(self) -> Shape {
        Shape {
            points: self.points,
            width: (self.max_x + self.min_x) as f64,
            height: (self.max_y + self.min_y) as f64,
        }
    }
}
