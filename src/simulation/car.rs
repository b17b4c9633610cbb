//! Car agents: pose, fitness, and the per-tick update.
//!
//! A car couples a pose, a controller brain, a sensor array reading and the
//! fitness bookkeeping of one agent. Alive is the only active state; death
//! (collision, stuck timeout, track completion, numeric failure or forced
//! termination) is absorbing: a dead car neither senses, decides, moves nor
//! accumulates fitness.

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use super::brain::Brain;
use super::params::Params;
use super::sensor::SensorArray;
use super::track::Track;

/// Position, heading and scalar speed of one car; owned exclusively by it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pose {
    /// Position in track units.
    pub pos: Array1<f32>,
    /// Heading angle in radians.
    pub heading: f32,
    /// Scalar forward speed in track units per second.
    pub speed: f32,
}

impl Pose {
    /// Creates a standing-still pose.
    pub fn new(x: f32, y: f32, heading: f32) -> Self {
        Self {
            pos: Array1::from_vec(vec![x, y]),
            heading,
            speed: 0.0,
        }
    }
}

/// One agent of the population.
#[derive(Debug, Clone)]
pub struct Car {
    /// Current pose, mutated every tick while alive.
    pub pose: Pose,
    /// Controller network, also the genome collected at generation end.
    pub brain: Brain,
    alive: bool,
    fitness: f32,
    distance: f32,
    time_alive: f32,
    last_readings: Array1<f32>,
    stuck_anchor: Array1<f32>,
    stuck_clock: f32,
}

impl Car {
    /// Creates a fresh alive car at the given start pose.
    pub fn new(brain: Brain, start: Pose, ray_count: usize) -> Self {
        let stuck_anchor = start.pos.clone();
        Self {
            pose: start,
            brain,
            alive: true,
            fitness: 0.0,
            distance: 0.0,
            time_alive: 0.0,
            last_readings: Array1::ones(ray_count),
            stuck_anchor,
            stuck_clock: 0.0,
        }
    }

    /// Whether the car is still driving.
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Accumulated fitness; monotonically non-decreasing while alive and
    /// frozen once dead.
    pub fn fitness(&self) -> f32 {
        self.fitness
    }

    /// Total distance traveled in track units.
    pub fn distance(&self) -> f32 {
        self.distance
    }

    /// Survival time in simulation seconds.
    pub fn time_alive(&self) -> f32 {
        self.time_alive
    }

    /// Sensor readings from the most recent tick, for rendering.
    pub fn last_readings(&self) -> &Array1<f32> {
        &self.last_readings
    }

    /// Forces the car dead without any fitness adjustment.
    pub fn kill(&mut self) {
        self.alive = false;
    }

    /// Advances the car one tick: sense, decide, move, collide, score.
    ///
    /// Collision is checked before fitness accumulation, so a tick that ends
    /// in a crash contributes nothing. Any non-finite pose component kills
    /// this car only and never aborts the generation.
    pub fn step(&mut self, track: &Track, sensors: &SensorArray, params: &Params, dt: f32) {
        if !self.alive {
            return;
        }

        let readings = sensors.read(&self.pose, track);
        let (steer, throttle) = self.brain.decide(&readings);
        self.last_readings = readings;

        self.pose.heading += steer * params.turn_rate * dt;
        self.pose.speed = (self.pose.speed + throttle * params.throttle_accel * dt)
            .clamp(params.min_speed, params.max_speed);
        let step_len = self.pose.speed * dt;
        self.pose.pos[0] += self.pose.heading.cos() * step_len;
        self.pose.pos[1] += self.pose.heading.sin() * step_len;

        if !self.pose.heading.is_finite() || self.pose.pos.iter().any(|v| !v.is_finite()) {
            self.alive = false;
            return;
        }
        if !track.contains(self.pose.pos[0], self.pose.pos[1]) {
            self.alive = false;
            return;
        }

        self.distance += step_len;
        self.time_alive += dt;
        self.fitness += step_len * params.distance_weight + dt * params.time_weight;

        if let Some(goal) = params.completion_distance
            && self.distance >= goal
        {
            self.fitness += params.survival_bonus;
            self.alive = false;
            return;
        }

        // Stuck detection over a rolling window: idling or spinning in place
        // must not keep inflating fitness.
        self.stuck_clock += dt;
        if self.stuck_clock >= params.stuck_window {
            let displacement = (&self.pose.pos - &self.stuck_anchor)
                .mapv(|v| v * v)
                .sum()
                .sqrt();
            if displacement < params.stuck_threshold {
                self.alive = false;
                return;
            }
            self.stuck_anchor = self.pose.pos.clone();
            self.stuck_clock = 0.0;
        }
    }

    /// Retires a car that survived to the end of the generation, crediting
    /// the survival bonus exactly once.
    pub fn finalize_survivor(&mut self, params: &Params) {
        if self.alive {
            self.fitness += params.survival_bonus;
            self.alive = false;
        }
    }
}
