//! The particle pool and shape switching.

use dotpick_core::{Area, Point, Rgba, Surface};
use dotpick_shapes::Shape;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::particle::{Particle, Waypoint};

/// Easing rate for every recruited particle of a fast switch.
const FAST_EASE: f64 = 0.25;
/// Easing rate for a shape member moving to a new spot.
const MEMBER_EASE: f64 = 0.14;
/// Easing rate for an ambient particle joining a shape.
const RECRUIT_EASE: f64 = 0.11;
/// Easing rate for particles released into the background.
const AMBIENT_EASE: f64 = 0.04;

/// Depth and alpha of a particle sitting in a shape.
const SHAPE_DEPTH: f64 = 5.0;
/// Target alpha of a released particle.
const AMBIENT_ALPHA: f64 = 0.3;

/// Hold ticks before a shape member leaves for its new spot.
const MEMBER_HOLD: i32 = 18;
/// Hold ticks before an ambient particle joins a shape.
const RECRUIT_HOLD: i32 = 30;
/// Hold ticks before a released particle drifts off.
const RELEASE_HOLD: i32 = 20;

/// The live collection of particles.
///
/// The pool only ever grows: particles that a smaller shape does not need
/// are released into the background instead of being dropped.
#[derive(Debug)]
pub struct Field {
    particles: Vec<Particle>,
    area: Area,
    shape_width: f64,
    shape_height: f64,
    offset: (f64, f64),
    color: Rgba,
    rng: StdRng,
}

impl Field {
    /// Create an empty field for the given drawable area.
    pub fn new(area: Area) -> Self {
        Self::with_rng(area, StdRng::from_entropy())
    }

    /// Create an empty field with a specific random source.
    pub fn with_rng(area: Area, rng: StdRng) -> Self {
        Self {
            particles: Vec::new(),
            area: sanitize(area),
            shape_width: 0.0,
            shape_height: 0.0,
            offset: (0.0, 0.0),
            color: Rgba::WHITE,
            rng,
        }
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn area(&self) -> Area {
        self.area
    }

    /// Track a new drawable area. Takes effect at the next switch.
    pub fn set_area(&mut self, area: Area) {
        self.area = sanitize(area);
    }

    /// Offset added to shape points so the shape sits centred.
    pub fn offset(&self) -> (f64, f64) {
        self.offset
    }

    /// Fill color for every particle, current and future.
    pub fn set_color(&mut self, color: Rgba) {
        self.color = color;
        for particle in &mut self.particles {
            particle.set_color(color);
        }
    }

    /// Re-centre the current shape in the drawable area.
    fn compensate(&mut self) {
        self.offset = (
            self.area.width / 2.0 - self.shape_width / 2.0,
            self.area.height / 2.0 - self.shape_height / 2.0,
        );
    }

    /// Send the particles toward a new shape.
    ///
    /// Each particle gets a liftoff waypoint and then its new spot. Particles
    /// the shape does not need are released into the background.
    pub fn switch_shape(&mut self, shape: &Shape, fast: bool) {
        self.shape_width = shape.width;
        self.shape_height = shape.height;
        self.compensate();

        let (center_x, center_y) = self.area.center();
        if shape.len() > self.particles.len() {
            let grow = shape.len() - self.particles.len();
            debug!(grow, total = shape.len(), "growing particle pool");
            for _ in 0..grow {
                let mut particle = Particle::spawn(center_x, center_y);
                particle.set_color(self.color);
                self.particles.push(particle);
            }
        }

        let targets = assign_targets(&shape.points, self.particles.len(), &mut self.rng);
        let assigned = targets.len();
        let (cx, cy) = self.offset;

        for (particle, target) in self.particles.iter_mut().zip(targets) {
            let was_member = particle.is_shape_member();
            particle.retune(if fast {
                FAST_EASE
            } else if was_member {
                MEMBER_EASE
            } else {
                RECRUIT_EASE
            });

            let liftoff = if was_member {
                Waypoint::here()
                    .depth(self.rng.gen_range(0.0..1.0) * 20.0 + 10.0)
                    .alpha(self.rng.gen_range(0.0..1.0))
                    .hold(MEMBER_HOLD)
            } else {
                Waypoint::here()
                    .depth(self.rng.gen_range(0.0..1.0) * 5.0 + 5.0)
                    .hold(if fast { MEMBER_HOLD } else { RECRUIT_HOLD })
            };
            particle.move_to(liftoff, false);

            particle.set_shape_member(true);
            particle.move_to(
                Waypoint::to(target.x + cx, target.y + cy)
                    .alpha(1.0)
                    .depth(SHAPE_DEPTH)
                    .hold(0),
                false,
            );
        }

        let area = self.area;
        let mut released = 0;
        for particle in self.particles.iter_mut().skip(assigned) {
            if !particle.is_shape_member() {
                continue;
            }
            particle.move_to(
                Waypoint::here()
                    .depth(self.rng.gen_range(0.0..1.0) * 20.0 + 10.0)
                    .alpha(self.rng.gen_range(0.0..1.0))
                    .hold(RELEASE_HOLD),
                false,
            );

            particle.set_shape_member(false);
            particle.retune(AMBIENT_EASE);
            particle.move_to(
                Waypoint::to(
                    self.rng.gen_range(0.0..1.0) * area.width,
                    self.rng.gen_range(0.0..1.0) * area.height,
                )
                .alpha(AMBIENT_ALPHA)
                .depth(self.rng.gen_range(0.0..1.0) * 4.0)
                .hold(0),
                false,
            );
            released += 1;
        }

        debug!(
            points = shape.len(),
            assigned,
            released,
            fast,
            "switched shape"
        );
    }

    /// Send every background particle to a fresh random spot.
    pub fn shuffle_idle(&mut self) {
        let area = self.area;
        for particle in self.particles.iter_mut().filter(|p| !p.is_shape_member()) {
            particle.move_to(
                Waypoint::to(
                    self.rng.gen_range(0.0..1.0) * area.width,
                    self.rng.gen_range(0.0..1.0) * area.height,
                ),
                false,
            );
        }
    }

    /// Advance every particle one tick without drawing.
    pub fn update(&mut self) {
        for particle in &mut self.particles {
            particle.update(&mut self.rng);
        }
    }

    /// Advance every particle one tick and draw it.
    pub fn render_frame<S: Surface + ?Sized>(&mut self, surface: &mut S) {
        self.set_area(surface.area());
        for particle in &mut self.particles {
            particle.render(surface, &mut self.rng);
        }
    }

    /// Whether every particle has come to rest. An empty field is settled.
    pub fn is_settled(&self, threshold: f64) -> bool {
        self.particles.iter().all(|p| p.is_settled(threshold))
    }
}

/// Pick targets for the first `min(slots, points.len())` particles.
///
/// Each pick is uniform over the points not taken yet, so the mapping from
/// particle to point changes on every switch.
pub fn assign_targets<R: Rng + ?Sized>(points: &[Point], slots: usize, rng: &mut R) -> Vec<Point> {
    let mut available = points.to_vec();
    let mut picked = Vec::with_capacity(slots.min(points.len()));
    while !available.is_empty() && picked.len() < slots {
        let index = rng.gen_range(0..available.len());
        picked.push(available.swap_remove(index));
    }
    picked
}

/// Replace non-finite or negative dimensions with zero.
fn sanitize(area: Area) -> Area {
    let clean = |v: f64| if v.is_finite() && v > 0.0 { v } else { 0.0 };
    Area::new(clean(area.width), clean(area.height))
}
