//! Mobility models for the scenario's mobile nodes.
//!
//! The probe samples a node's position through the [`Mobility`] trait; the
//! models here are deliberately simple stand-ins for a real mobility
//! provider: a constant position, and a bounded random walk.

use covsim_core::{Position, Timestamp};
use rand_chacha::ChaChaRng;
use rand_core::Rng;
use std::time::Duration;

/// How often a random walker picks a new heading and speed.
const TURN_INTERVAL: Duration = Duration::from_secs(1);

/// A position provider for one mobile node, sampled once per probe tick.
pub trait Mobility {
    fn sample(&mut self, now: Timestamp) -> Position;
}

/// A node that never moves.
#[derive(Debug, Clone, Copy)]
pub struct Fixed(Position);

impl Fixed {
    pub const fn new(position: Position) -> Self {
        Self(position)
    }
}

impl Mobility for Fixed {
    fn sample(&mut self, _now: Timestamp) -> Position {
        self.0
    }
}

/// The rectangle a random walker is confined to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Bounds {
    pub const fn new(min_x: f64, max_x: f64, min_y: f64, max_y: f64) -> Self {
        Self {
            min_x,
            max_x,
            min_y,
            max_y,
        }
    }

    pub fn contains(&self, position: &Position) -> bool {
        (self.min_x..=self.max_x).contains(&position.x)
            && (self.min_y..=self.max_y).contains(&position.y)
    }

    fn clamp(&self, position: &mut Position) {
        position.x = position.x.clamp(self.min_x, self.max_x);
        position.y = position.y.clamp(self.min_y, self.max_y);
    }
}

/// A 2D random walk: straight segments at a uniform random speed, with a
/// new heading drawn every [`TURN_INTERVAL`] or when the walker hits the
/// bounding rectangle.
///
/// Each walker carries its own RNG, seeded deterministically from the
/// scenario seed, so a run replays identically for a given seed.
pub struct RandomWalk {
    position: Position,
    bounds: Bounds,
    speed_range_mps: (f64, f64),
    speed_mps: f64,
    heading_rad: f64,
    last_sample: Timestamp,
    next_turn: Timestamp,
    rng: ChaChaRng,
}

impl RandomWalk {
    pub fn new(bounds: Bounds, speed_range_mps: (f64, f64), mut rng: ChaChaRng) -> Self {
        let position = Position::new(
            uniform(&mut rng, bounds.min_x, bounds.max_x),
            uniform(&mut rng, bounds.min_y, bounds.max_y),
            0.0,
        );
        let speed_mps = uniform(&mut rng, speed_range_mps.0, speed_range_mps.1);
        let heading_rad = uniform(&mut rng, 0.0, std::f64::consts::TAU);
        Self {
            position,
            bounds,
            speed_range_mps,
            speed_mps,
            heading_rad,
            last_sample: Timestamp::ZERO,
            next_turn: Timestamp::ZERO + TURN_INTERVAL,
            rng,
        }
    }

    fn turn(&mut self) {
        self.speed_mps = uniform(&mut self.rng, self.speed_range_mps.0, self.speed_range_mps.1);
        self.heading_rad = uniform(&mut self.rng, 0.0, std::f64::consts::TAU);
    }
}

impl Mobility for RandomWalk {
    fn sample(&mut self, now: Timestamp) -> Position {
        let dt = now
            .since_start()
            .saturating_sub(self.last_sample.since_start());
        self.last_sample = now;

        let travelled = self.speed_mps * dt.as_secs_f64();
        self.position.x += travelled * self.heading_rad.cos();
        self.position.y += travelled * self.heading_rad.sin();

        if !self.bounds.contains(&self.position) {
            self.bounds.clamp(&mut self.position);
            self.turn();
        }
        if now >= self.next_turn {
            self.turn();
            self.next_turn = now + TURN_INTERVAL;
        }

        self.position
    }
}

/// Uniform sample in `[lo, hi)` from the raw 64 random bits.
pub(crate) fn uniform<R: Rng>(rng: &mut R, lo: f64, hi: f64) -> f64 {
    let bits = rng.next_u64();
    let sample = (bits as f64) * (1.0 / (u64::MAX as f64 + 1.0));
    lo + sample * (hi - lo)
}
