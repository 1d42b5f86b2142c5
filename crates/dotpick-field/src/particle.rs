//! A single animated dot.

use std::collections::VecDeque;
use std::f64::consts::PI;

use dotpick_core::{Point, Rgba, Surface};
use rand::Rng;

use crate::ParticleError;

/// Distance under which a particle counts as settled, by default.
pub const DEFAULT_SETTLE_THRESHOLD: f64 = 1.2;

/// Depth (radius) of a freshly spawned particle.
pub const SPAWN_DEPTH: f64 = 5.0;

/// Easing rate of a freshly spawned particle.
pub const SPAWN_EASE: f64 = 0.07;

/// Fraction of the remaining alpha/depth difference closed per tick.
const FADE_RATE: f64 = 0.05;

const MIN_ALPHA: f64 = 0.1;
const MIN_DEPTH: f64 = 1.0;

/// Side of the square an ambient particle picks its next stop from.
const WANDER_RANGE: f64 = 50.0;

/// Distance at which a particle has reached its target.
const ARRIVAL_DISTANCE: f64 = 1.0;

/// A queued motion request.
///
/// Unset fields fall back to the particle's current value when the waypoint
/// is adopted. A field set to exactly zero is treated as unset as well, so a
/// target coordinate of 0 keeps the current coordinate instead.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Waypoint {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
    pub a: Option<f64>,
    pub h: Option<i32>,
}

impl Waypoint {
    /// Move to `(x, y)`, keeping depth and alpha.
    pub fn to(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    /// Stay in place.
    pub fn here() -> Self {
        Self::default()
    }

    pub fn depth(self, z: f64) -> Self {
        Self { z: Some(z), ..self }
    }

    pub fn alpha(self, a: f64) -> Self {
        Self { a: Some(a), ..self }
    }

    pub fn hold(self, h: i32) -> Self {
        Self { h: Some(h), ..self }
    }
}

/// Value of an optional waypoint field, or `current` when unset or zero.
fn or_current(value: Option<f64>, current: f64) -> f64 {
    match value {
        Some(v) if v != 0.0 => v,
        _ => current,
    }
}

/// An animated dot with a target and a queue of further targets.
#[derive(Debug, Clone)]
pub struct Particle {
    position: Point,
    target: Point,
    ease: f64,
    shape_member: bool,
    color: Rgba,
    queue: VecDeque<Waypoint>,
}

impl Particle {
    /// Spawn a particle at `(x, y)`.
    ///
    /// It starts as a shape member at rest on its own position.
    pub fn new(x: f64, y: f64) -> Result<Self, ParticleError> {
        if !x.is_finite() || !y.is_finite() {
            return Err(ParticleError::NonFinitePosition { x, y });
        }
        Ok(Self::spawn(x, y))
    }

    /// Spawn without validation; callers guarantee finite coordinates.
    pub(crate) fn spawn(x: f64, y: f64) -> Self {
        let position = Point {
            x,
            y,
            z: SPAWN_DEPTH,
            a: 1.0,
            h: 0,
        };
        Self {
            position,
            target: position,
            ease: SPAWN_EASE,
            shape_member: true,
            color: Rgba::WHITE,
            queue: VecDeque::new(),
        }
    }

    /// Set the fraction of remaining distance closed per tick.
    pub fn set_ease(&mut self, ease: f64) -> Result<(), ParticleError> {
        if !(ease > 0.0 && ease <= 1.0) {
            return Err(ParticleError::InvalidEase(ease));
        }
        self.ease = ease;
        Ok(())
    }

    pub(crate) fn retune(&mut self, ease: f64) {
        debug_assert!(ease > 0.0 && ease <= 1.0);
        self.ease = ease;
    }

    pub fn position(&self) -> &Point {
        &self.position
    }

    pub fn target(&self) -> &Point {
        &self.target
    }

    pub fn ease(&self) -> f64 {
        self.ease
    }

    pub fn is_shape_member(&self) -> bool {
        self.shape_member
    }

    pub(crate) fn set_shape_member(&mut self, member: bool) {
        self.shape_member = member;
    }

    pub fn color(&self) -> Rgba {
        self.color
    }

    pub fn set_color(&mut self, color: Rgba) {
        self.color = color;
    }

    /// Number of waypoints waiting behind the current target.
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Queue a waypoint.
    ///
    /// With `avoid_static`, a waypoint whose position is within one pixel of
    /// where the particle already is gets dropped.
    pub fn move_to(&mut self, waypoint: Waypoint, avoid_static: bool) {
        if avoid_static {
            let x = or_current(waypoint.x, self.position.x);
            let y = or_current(waypoint.y, self.position.y);
            if self.position.distance(&Point::at(x, y)) <= ARRIVAL_DISTANCE {
                return;
            }
        }
        self.queue.push_back(waypoint);
    }

    /// Advance one tick.
    pub fn update<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if self.step_toward_target() {
            if let Some(next) = self.queue.pop_front() {
                self.adopt(next);
            } else if self.shape_member {
                self.position.x -= (rng.gen_range(0.0..1.0) * PI).sin();
                self.position.y -= (rng.gen_range(0.0..1.0) * PI).sin();
            } else {
                let half = WANDER_RANGE / 2.0;
                let wander = Waypoint::to(
                    self.position.x + rng.gen_range(0.0..1.0) * WANDER_RANGE - half,
                    self.position.y + rng.gen_range(0.0..1.0) * WANDER_RANGE - half,
                );
                self.move_to(wander, true);
            }
        }

        let alpha_delta = self.position.a - self.target.a;
        self.position.a = (self.position.a - alpha_delta * FADE_RATE).max(MIN_ALPHA);

        let depth_delta = self.position.z - self.target.z;
        self.position.z = (self.position.z - depth_delta * FADE_RATE).max(MIN_DEPTH);
    }

    /// Move toward the target; true once it has been reached.
    fn step_toward_target(&mut self) -> bool {
        if self.position.h == Point::SNAP {
            self.position.x = self.target.x;
            self.position.y = self.target.y;
            return true;
        }

        if self.position.h > 0 {
            self.position.h -= 1;
            return false;
        }

        let dx = self.position.x - self.target.x;
        let dy = self.position.y - self.target.y;
        let distance = (dx * dx + dy * dy).sqrt();

        if distance > ARRIVAL_DISTANCE {
            let step = self.ease * distance;
            self.position.x -= dx / distance * step;
            self.position.y -= dy / distance * step;
            false
        } else {
            true
        }
    }

    /// Make a waypoint the active target.
    fn adopt(&mut self, waypoint: Waypoint) {
        self.target.x = or_current(waypoint.x, self.position.x);
        self.target.y = or_current(waypoint.y, self.position.y);
        self.target.z = or_current(waypoint.z, self.position.z);
        self.target.a = or_current(waypoint.a, self.position.a).clamp(0.0, 1.0);
        self.position.h = waypoint.h.unwrap_or(0).max(Point::SNAP);
    }

    /// Fill a circle at the current position.
    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S) {
        surface.draw_circle(&self.position, self.color.with_alpha(self.position.a));
    }

    /// Advance one tick, then draw.
    pub fn render<S: Surface + ?Sized, R: Rng + ?Sized>(&mut self, surface: &mut S, rng: &mut R) {
        self.update(rng);
        self.draw(surface);
    }

    /// Whether the particle has visually come to rest on its final target.
    pub fn is_settled(&self, threshold: f64) -> bool {
        let position_settled = self.position.distance(&self.target) <= threshold;
        let alpha_settled = (self.position.a - self.target.a).abs() <= 0.05;
        let depth_settled = (self.position.z - self.target.z).abs() <= 0.5;
        position_settled
            && alpha_settled
            && depth_settled
            && self.queue.is_empty()
            && self.position.h == 0
    }
}

#[cfg(test)]
mod tests {
    use dotpick_core::{Area, RecordingSurface};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn test_new_rejects_non_finite() {
        assert!(Particle::new(f64::NAN, 0.0).is_err());
        assert!(Particle::new(0.0, f64::INFINITY).is_err());
        let p = Particle::new(10.0, 20.0).unwrap();
        assert_eq!(p.position().z, SPAWN_DEPTH);
        assert_eq!(p.ease(), SPAWN_EASE);
        assert!(p.is_shape_member());
        assert!(p.is_settled(DEFAULT_SETTLE_THRESHOLD));
    }

    #[test]
    fn test_set_ease_validates() {
        let mut p = Particle::new(0.0, 0.0).unwrap();
        assert!(p.set_ease(0.0).is_err());
        assert!(p.set_ease(1.5).is_err());
        assert!(p.set_ease(f64::NAN).is_err());
        assert!(p.set_ease(1.0).is_ok());
    }

    #[test]
    fn test_eases_toward_queued_target() {
        let mut rng = rng();
        let mut p = Particle::new(0.0, 0.0).unwrap();
        p.move_to(Waypoint::to(100.0, 0.0), false);

        // First tick adopts the waypoint, second starts moving.
        p.update(&mut rng);
        assert_eq!(p.target().x, 100.0);
        p.update(&mut rng);
        assert!((p.position().x - 100.0 * SPAWN_EASE).abs() < 1e-9);

        for _ in 0..500 {
            p.update(&mut rng);
        }
        assert!(p.position().distance(&Point::at(100.0, 0.0)) < 3.0);
    }

    #[test]
    fn test_hold_delays_motion() {
        let mut rng = rng();
        let mut p = Particle::new(50.0, 50.0).unwrap();
        p.move_to(Waypoint::here().depth(20.0).hold(3), false);
        p.move_to(Waypoint::to(200.0, 50.0), false);

        p.update(&mut rng);
        assert_eq!(p.position().h, 3);
        for _ in 0..3 {
            p.update(&mut rng);
            assert_eq!(p.position().x, 50.0);
        }
        assert_eq!(p.position().h, 0);
        assert!(p.position().z > SPAWN_DEPTH);

        // Hold spent: the next waypoint is adopted and motion starts.
        p.update(&mut rng);
        assert_eq!(p.target().x, 200.0);
        p.update(&mut rng);
        assert!(p.position().x > 50.0);
    }

    #[test]
    fn test_snap_jumps_to_target() {
        let mut rng = rng();
        let mut p = Particle::new(0.0, 0.0).unwrap();
        p.set_shape_member(false);
        p.move_to(Waypoint::to(300.0, 40.0).hold(Point::SNAP), false);
        p.update(&mut rng);
        p.update(&mut rng);
        assert_eq!((p.position().x, p.position().y), (300.0, 40.0));
    }

    #[test]
    fn test_zero_counts_as_unset() {
        let mut rng = rng();
        let mut p = Particle::new(40.0, 30.0).unwrap();
        p.move_to(Waypoint::to(0.0, 10.0), false);
        p.update(&mut rng);
        assert_eq!(p.target().x, 40.0);
        assert_eq!(p.target().y, 10.0);
    }

    #[test]
    fn test_avoid_static_drops_tiny_moves() {
        let mut p = Particle::new(10.0, 10.0).unwrap();
        p.move_to(Waypoint::to(10.5, 10.5), true);
        assert_eq!(p.queued(), 0);
        p.move_to(Waypoint::to(10.5, 10.5), false);
        assert_eq!(p.queued(), 1);
    }

    #[test]
    fn test_floors_hold_over_many_ticks() {
        let mut rng = rng();
        let mut member = Particle::new(100.0, 100.0).unwrap();
        let mut ambient = Particle::new(100.0, 100.0).unwrap();
        ambient.set_shape_member(false);
        ambient.move_to(Waypoint::here().alpha(0.3).depth(0.2), false);
        member.move_to(Waypoint::here().alpha(0.05).depth(0.5), false);

        for _ in 0..5_000 {
            for p in [&mut member, &mut ambient] {
                p.update(&mut rng);
                let pos = p.position();
                assert!((0.1..=1.0).contains(&pos.a), "alpha {}", pos.a);
                assert!(pos.z >= 1.0, "depth {}", pos.z);
            }
        }
    }

    #[test]
    fn test_ambient_particles_wander() {
        let mut rng = rng();
        let mut p = Particle::new(500.0, 500.0).unwrap();
        p.set_shape_member(false);
        let start = *p.position();
        for _ in 0..200 {
            p.update(&mut rng);
        }
        assert!(p.position().distance(&start) > 0.0);
    }

    #[test]
    fn test_settled_requires_empty_queue() {
        let mut p = Particle::new(0.0, 0.0).unwrap();
        assert!(p.is_settled(DEFAULT_SETTLE_THRESHOLD));
        p.move_to(Waypoint::here(), false);
        assert!(!p.is_settled(DEFAULT_SETTLE_THRESHOLD));
    }

    #[test]
    fn test_draw_uses_particle_alpha() {
        let mut rng = rng();
        let mut surface = RecordingSurface::new(Area::new(100.0, 100.0));
        let mut p = Particle::new(5.0, 5.0).unwrap();
        p.move_to(Waypoint::here().alpha(0.2), false);
        for _ in 0..3 {
            p.update(&mut rng);
        }
        p.draw(&mut surface);
        let call = surface.calls()[0];
        assert_eq!(call.color.a, p.position().a);
        assert_eq!(call.point.z, p.position().z);
    }
}
