//! Shape rasterization for the dotpick particle field.
//!
//! A [`ShapeBuilder`] turns text, circles, rectangles and images into a
//! [`Shape`]: a sparse grid of target points the particles converge on.

mod glyphs;
mod image;
mod raster;

use dotpick_core::{Area, Point};
use thiserror::Error;
use tracing::{debug, warn};

pub use image::{DecodedImage, ImageLoader, ImageTicket, decode_png};
pub use raster::RasterSurface;

use raster::ShapeCollector;

/// Default spacing between sample points, in pixels.
pub const DEFAULT_GAP: u32 = 13;

/// Largest font size tried when fitting text.
const MAX_FONT_SIZE: f64 = 500.0;

/// Share of the surface width text may occupy.
const TEXT_WIDTH_FRACTION: f64 = 0.8;

/// Share of the surface height general text may occupy.
const TEXT_HEIGHT_FRACTION: f64 = 0.45;

/// Share of the surface height numeric text may occupy.
const NUMBER_HEIGHT_FRACTION: f64 = 1.0;

/// Share of the drawable height an image is scaled to.
const IMAGE_HEIGHT_FRACTION: f64 = 0.6;

/// Text shown when an image cannot be loaded.
pub const IMAGE_FALLBACK_TEXT: &str = "What?";

/// Errors raised while loading image shapes.
#[derive(Debug, Error)]
pub enum ShapeError {
    #[error("failed to read image {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to fetch image {url}: {source}")]
    Fetch {
        url: String,
        source: Box<ureq::Error>,
    },
    #[error("failed to decode image: {0}")]
    Decode(String),
}

/// The result of rasterizing something: target points and their extent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Shape {
    pub points: Vec<Point>,
    pub width: f64,
    pub height: f64,
}

impl Shape {
    /// Number of target points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Rasterizes shapes onto a grid sized to the viewport.
#[derive(Debug)]
pub struct ShapeBuilder {
    gap: usize,
    area: Area,
    raster: RasterSurface,
    loader: ImageLoader,
}

impl ShapeBuilder {
    /// Create a builder for the given viewport.
    pub fn new(gap: u32, area: Area) -> Self {
        let gap = gap.max(1) as usize;
        let (width, height) = quantize(area, gap);
        Self {
            gap,
            area,
            raster: RasterSurface::new(width, height),
            loader: ImageLoader::new(),
        }
    }

    /// Grid pitch in pixels.
    pub fn gap(&self) -> u32 {
        self.gap as u32
    }

    /// Size of the offscreen raster.
    pub fn raster_size(&self) -> (usize, usize) {
        (self.raster.width(), self.raster.height())
    }

    /// Resize the offscreen raster after the viewport changed.
    pub fn fit(&mut self, area: Area) {
        let (width, height) = quantize(area, self.gap);
        self.area = area;
        if (width, height) != self.raster_size() {
            debug!(width, height, "refitting shape raster");
            self.raster = RasterSurface::new(width, height);
        }
    }

    /// Rasterize `text`, scaled to fit the viewport.
    pub fn letter(&mut self, text: &str) -> Shape {
        let width = self.raster.width() as f64;
        let height = self.raster.height() as f64;

        let measured = RasterSurface::measure_text(text, MAX_FONT_SIZE).max(1.0);
        let height_fraction = if is_number(text) {
            NUMBER_HEIGHT_FRACTION
        } else {
            TEXT_HEIGHT_FRACTION
        };
        let size = MAX_FONT_SIZE
            .min(width / measured * TEXT_WIDTH_FRACTION * MAX_FONT_SIZE)
            .min(height * height_fraction);

        self.raster.clear();
        self.raster.fill_text(text, width / 2.0, height / 2.0, size);
        let shape = self.raster.scan(self.gap);
        debug!(text, size, points = shape.len(), "rasterized text");
        shape
    }

    /// Points covered by a disc `diameter` grid cells across.
    ///
    /// Enumerated analytically; the disc sits against the top-left corner.
    pub fn circle(&self, diameter: f64) -> Shape {
        let radius = diameter.max(0.0) / 2.0 * self.gap as f64;
        let (width, height) = self.raster_size();
        let mut collector = ShapeCollector::new(width, height);

        for y in (0..height).step_by(self.gap) {
            for x in (0..width).step_by(self.gap) {
                // Nearest point of the pixel square to the centre.
                let nx = radius.clamp(x as f64, x as f64 + 1.0);
                let ny = radius.clamp(y as f64, y as f64 + 1.0);
                let (dx, dy) = (nx - radius, ny - radius);
                if dx * dx + dy * dy < radius * radius {
                    collector.push(x, y);
                }
            }
        }

        collector.finish()
    }

    /// A `width` x `height` block of grid points.
    pub fn rectangle(&self, width: u32, height: u32) -> Shape {
        let gap = self.gap as u32;
        let scaled_width = gap * width;
        let scaled_height = gap * height;

        let points = (0..height)
            .flat_map(|row| {
                (0..width).map(move |col| Point::at((col * gap) as f64, (row * gap) as f64))
            })
            .collect();

        Shape {
            points,
            width: scaled_width as f64,
            height: scaled_height as f64,
        }
    }

    /// Start loading an image shape from a path or URL.
    ///
    /// The shape arrives later through [`ShapeBuilder::poll_images`].
    pub fn image(&mut self, source: &str) -> ImageTicket {
        self.loader.request(source)
    }

    /// Whether any image request is still pending.
    pub fn images_pending(&self) -> bool {
        self.loader.in_flight() > 0
    }

    /// Rasterize every image that finished loading since the last poll.
    ///
    /// Failed loads yield the fallback text shape instead.
    pub fn poll_images(&mut self) -> Vec<(ImageTicket, Shape)> {
        self.loader
            .drain()
            .into_iter()
            .map(|(ticket, result)| {
                let shape = match result {
                    Ok(image) => self.rasterize_image(&image),
                    Err(e) => {
                        warn!(ticket = ticket.0, error = %e, "falling back to text shape");
                        self.letter(IMAGE_FALLBACK_TEXT)
                    }
                };
                (ticket, shape)
            })
            .collect()
    }

    /// Rasterize an already decoded image.
    pub fn rasterize_image(&mut self, image: &DecodedImage) -> Shape {
        let size = (self.area.height * IMAGE_HEIGHT_FRACTION).max(0.0) as usize;
        self.raster.clear();
        self.raster.draw_image(image, size);
        self.raster.scan(self.gap)
    }
}

/// Viewport size rounded down to a multiple of `gap`.
fn quantize(area: Area, gap: usize) -> (usize, usize) {
    let width = (area.width.max(0.0) as usize / gap) * gap;
    let height = (area.height.max(0.0) as usize / gap) * gap;
    (width, height)
}

/// Whether text reads as a single finite number.
fn is_number(text: &str) -> bool {
    text.trim().parse::<f64>().is_ok_and(f64::is_finite)
}
