//! Celebration bursts drawn on top of the field.

use dotpick_core::{Area, Point, Rgba, Surface};
use rand::Rng;
use tracing::debug;

use crate::color::Palette;
use crate::tween::{Easing, Tween};

/// Discs per burst.
pub const DISCS_PER_BURST: usize = 32;

const MIN_RADIUS: f64 = 24.0;
const MAX_RADIUS: f64 = 48.0;
const MAX_RIPPLE: f64 = 200.0;
const RIPPLE_WIDTH_FRACTION: f64 = 0.4;
const VERTICAL_STRETCH: f64 = 1.15;
const MIN_DURATION_MS: u64 = 800;
const MAX_DURATION_MS: u64 = 1_100;

/// One disc of a burst: position and radius tweens plus a color.
#[derive(Debug, Clone)]
struct Disc {
    x: Tween,
    y: Tween,
    radius: Tween,
    color: Rgba,
}

impl Disc {
    fn point_at(&self, now_ms: u64) -> Point {
        Point {
            z: self.radius.value_at(now_ms).max(0.0),
            ..Point::at(self.x.value_at(now_ms), self.y.value_at(now_ms))
        }
    }
}

/// A group of discs sharing one start time and duration.
#[derive(Debug, Clone)]
struct Burst {
    discs: Vec<Disc>,
    end_ms: u64,
}

/// Owns and schedules every live burst.
#[derive(Debug, Default)]
pub struct Fireworks {
    bursts: Vec<Burst>,
    palette: Palette,
}

impl Fireworks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of bursts still animating.
    pub fn active(&self) -> usize {
        self.bursts.len()
    }

    /// Start a burst at `now_ms` scattered over `area`.
    pub fn launch<R: Rng + ?Sized>(&mut self, area: Area, now_ms: u64, rng: &mut R) {
        let ripple = MAX_RIPPLE.min(area.width * RIPPLE_WIDTH_FRACTION).max(0.0);
        let vertical = ripple * VERTICAL_STRETCH;
        let duration = rng.gen_range(MIN_DURATION_MS..=MAX_DURATION_MS);

        let discs = (0..DISCS_PER_BURST)
            .map(|_| {
                let x = rng.gen_range(0.0..1.0) * area.width;
                let y = rng.gen_range(0.0..1.0) * area.height;
                let dx = rng.gen_range(-1.0..=1.0) * ripple;
                let dy = rng.gen_range(-1.0..=1.0) * vertical;
                let radius = rng.gen_range(MIN_RADIUS..=MAX_RADIUS);
                Disc {
                    x: Tween::new(x, x + dx, now_ms, duration, Easing::OutExpo),
                    y: Tween::new(y, y + dy, now_ms, duration, Easing::OutExpo),
                    radius: Tween::new(radius, 0.0, now_ms, duration, Easing::OutExpo),
                    color: self.palette.next_color(),
                }
            })
            .collect();

        debug!(now_ms, duration, "launching firework burst");
        self.bursts.push(Burst {
            discs,
            end_ms: now_ms + duration,
        });
    }

    /// Drop bursts that have finished by `now_ms`.
    pub fn update(&mut self, now_ms: u64) {
        self.bursts.retain(|burst| now_ms < burst.end_ms);
    }

    /// Draw every live burst as it looks at `now_ms`.
    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S, now_ms: u64) {
        for burst in &self.bursts {
            for disc in &burst.discs {
                let point = disc.point_at(now_ms);
                if point.z > 0.0 {
                    surface.draw_circle(&point, disc.color);
                }
            }
        }
    }

    /// Remove every burst.
    pub fn clear(&mut self) {
        self.bursts.clear();
    }
}

#[cfg(test)]
mod tests {
    use dotpick_core::RecordingSurface;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::color::FIREWORK_COLORS;

    const AREA: Area = Area::new(1000.0, 600.0);

    #[test]
    fn test_burst_lifecycle() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut fireworks = Fireworks::new();
        let mut surface = RecordingSurface::new(AREA);

        fireworks.launch(AREA, 100, &mut rng);
        assert_eq!(fireworks.active(), 1);

        fireworks.draw(&mut surface, 100);
        assert_eq!(surface.calls().len(), DISCS_PER_BURST);
        for call in surface.calls() {
            assert!((MIN_RADIUS..=MAX_RADIUS).contains(&call.point.z));
            assert!(FIREWORK_COLORS.contains(&call.color));
        }

        fireworks.update(100 + MIN_DURATION_MS - 1);
        assert_eq!(fireworks.active(), 1);
        fireworks.update(100 + MAX_DURATION_MS);
        assert_eq!(fireworks.active(), 0);
    }

    #[test]
    fn test_discs_shrink_and_stay_near_origin() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut fireworks = Fireworks::new();
        fireworks.launch(AREA, 0, &mut rng);

        let burst = &fireworks.bursts[0];
        for disc in &burst.discs {
            let start = disc.point_at(0);
            let later = disc.point_at(400);
            assert!(later.z < start.z);
            assert!((later.x - start.x).abs() <= MAX_RIPPLE);
            assert!((later.y - start.y).abs() <= MAX_RIPPLE * VERTICAL_STRETCH);
            assert_eq!(disc.point_at(burst.end_ms).z, 0.0);
        }
    }

    #[test]
    fn test_colors_cycle_across_discs() {
        let mut rng = StdRng::seed_from_u64(8);
        let mut fireworks = Fireworks::new();
        fireworks.launch(AREA, 0, &mut rng);
        let colors: Vec<Rgba> = fireworks.bursts[0].discs.iter().map(|d| d.color).collect();
        assert_eq!(&colors[..4], &[
            FIREWORK_COLORS[1],
            FIREWORK_COLORS[2],
            FIREWORK_COLORS[3],
            FIREWORK_COLORS[0],
        ]);
    }
}
