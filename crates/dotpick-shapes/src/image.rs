//! Background image loading for image shapes.
//!
//! Images are fetched and decoded on a worker thread so the frame loop never
//! waits on disk or network. Finished loads are collected with
//! [`ImageLoader::drain`].

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;
use std::time::Duration;

use tracing::{debug, warn};
use zune_core::options::DecoderOptions;
use zune_png::PngDecoder;

use crate::ShapeError;

/// Timeout for HTTP requests.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Handle identifying one image request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageTicket(pub u64);

/// The alpha channel of a decoded image.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub width: usize,
    pub height: usize,
    pub alpha: Vec<u8>,
}

impl DecodedImage {
    /// Alpha at a pixel, zero outside the image.
    pub fn alpha_at(&self, x: usize, y: usize) -> u8 {
        if x < self.width && y < self.height {
            self.alpha[y * self.width + x]
        } else {
            0
        }
    }
}

type LoadResult = (ImageTicket, Result<DecodedImage, ShapeError>);

/// Spawns image loads and hands back their results.
#[derive(Debug)]
pub struct ImageLoader {
    sender: Sender<LoadResult>,
    receiver: Receiver<LoadResult>,
    next_ticket: u64,
    in_flight: usize,
}

impl Default for ImageLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageLoader {
    /// Create a loader with no requests in flight.
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            sender,
            receiver,
            next_ticket: 0,
            in_flight: 0,
        }
    }

    /// Start loading `source`, a local path or an `http(s)` URL.
    pub fn request(&mut self, source: &str) -> ImageTicket {
        let ticket = ImageTicket(self.next_ticket);
        self.next_ticket += 1;
        self.in_flight += 1;

        let sender = self.sender.clone();
        let source = source.to_string();
        debug!(ticket = ticket.0, %source, "loading image");

        thread::spawn(move || {
            let result = fetch_bytes(&source).and_then(|bytes| decode_png(&bytes));
            // The receiver only goes away with the loader itself.
            let _ = sender.send((ticket, result));
        });

        ticket
    }

    /// Number of requests that have not been drained yet.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Collect every load that has finished, without blocking.
    pub fn drain(&mut self) -> Vec<LoadResult> {
        let mut done = Vec::new();
        loop {
            match self.receiver.try_recv() {
                Ok(result) => {
                    self.in_flight = self.in_flight.saturating_sub(1);
                    if let Err(e) = &result.1 {
                        warn!(ticket = result.0.0, error = %e, "image load failed");
                    }
                    done.push(result);
                }
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
        done
    }
}

/// Read raw bytes from a file path or URL.
fn fetch_bytes(source: &str) -> Result<Vec<u8>, ShapeError> {
    if source.starts_with("http://") || source.starts_with("https://") {
        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(REQUEST_TIMEOUT))
            .build()
            .new_agent();

        agent
            .get(source)
            .call()
            .and_then(|mut response| response.body_mut().read_to_vec())
            .map_err(|e| ShapeError::Fetch {
                url: source.to_string(),
                source: Box::new(e),
            })
    } else {
        std::fs::read(source).map_err(|e| ShapeError::Read {
            path: source.to_string(),
            source: e,
        })
    }
}

/// Decode PNG bytes and keep only the alpha channel.
///
/// Images without alpha are fully opaque.
pub fn decode_png(bytes: &[u8]) -> Result<DecodedImage, ShapeError> {
    let options = DecoderOptions::default().png_set_strip_to_8bit(true);
    let mut decoder = PngDecoder::new_with_options(bytes, options);
    let pixels = decoder
        .decode_raw()
        .map_err(|e| ShapeError::Decode(format!("{e:?}")))?;

    let (width, height) = decoder
        .get_dimensions()
        .ok_or_else(|| ShapeError::Decode("missing dimensions".to_string()))?;
    let colorspace = decoder
        .get_colorspace()
        .ok_or_else(|| ShapeError::Decode("missing colorspace".to_string()))?;

    let components = colorspace.num_components().max(1);
    if pixels.len() < width * height * components {
        return Err(ShapeError::Decode("truncated pixel data".to_string()));
    }

    let alpha = if colorspace.has_alpha() {
        pixels
            .chunks_exact(components)
            .map(|px| px[components - 1])
            .collect()
    } else {
        vec![u8::MAX; width * height]
    };

    Ok(DecodedImage {
        width,
        height,
        alpha,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            decode_png(b"definitely not a png"),
            Err(ShapeError::Decode(_))
        ));
    }

    #[test]
    fn test_missing_file_reports_read_error() {
        let mut loader = ImageLoader::new();
        let ticket = loader.request("/nonexistent/dotpick/missing.png");
        assert_eq!(loader.in_flight(), 1);

        let mut results = Vec::new();
        for _ in 0..200 {
            results.extend(loader.drain());
            if !results.is_empty() {
                break;
            }
            thread::sleep(Duration::from_millis(10));
        }

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].0, ticket);
        assert!(matches!(results[0].1, Err(ShapeError::Read { .. })));
        assert_eq!(loader.in_flight(), 0);
    }

    #[test]
    fn test_alpha_at_outside_is_transparent() {
        let image = DecodedImage {
            width: 1,
            height: 1,
            alpha: vec![7],
        };
        assert_eq!(image.alpha_at(0, 0), 7);
        assert_eq!(image.alpha_at(1, 0), 0);
    }
}
