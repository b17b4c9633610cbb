use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Simulation parameters supplied by the embedding application at startup.
///
/// The bundle is immutable for the lifetime of a run: the sensor layout and
/// network topology together fix the genome shape, and changing either would
/// invalidate every existing genome's input layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Params {
    /// Sensor ray angle offsets relative to the car heading, in radians.
    /// Order is fixed and matches the network's input order.
    pub sensor_angles: Vec<f32>,
    /// Maximum sensor ray range; misses read as this distance.
    pub sensor_range: f32,
    /// Neural network layer dimensions. The first entry must equal the sensor
    /// ray count and the last must be 2 (steer, throttle).
    pub layer_sizes: Vec<usize>,
    /// Scale of the uniform distribution used for initial random weights.
    pub weight_scale: f32,
    /// Number of cars per generation; constant across generations.
    pub population_size: usize,
    /// Probability that a single network parameter mutates.
    pub mutation_rate: f32,
    /// Standard deviation of the Gaussian mutation noise.
    pub mutation_strength: f32,
    /// Number of top genomes copied unmodified into the next generation.
    pub elitism: usize,
    /// Per-generation time budget in simulation seconds.
    pub generation_time_budget: f32,
    /// Turn rate in radians per second at full steering output.
    pub turn_rate: f32,
    /// Acceleration at full throttle output, units per second squared.
    pub throttle_accel: f32,
    /// Lower speed bound; cars never drop below this while alive.
    pub min_speed: f32,
    /// Upper speed bound.
    pub max_speed: f32,
    /// Length of the rolling window used for stuck detection, in seconds.
    pub stuck_window: f32,
    /// Minimum displacement over one stuck window; cars below it are killed.
    pub stuck_threshold: f32,
    /// Fitness credited per unit of distance traveled.
    pub distance_weight: f32,
    /// Fitness credited per second survived.
    pub time_weight: f32,
    /// One-time bonus for surviving the whole time budget (or completing the
    /// track when [`Params::completion_distance`] is set).
    pub survival_bonus: f32,
    /// Distance at which a car counts as having completed the track and is
    /// retired. `None` disables completion detection.
    pub completion_distance: Option<f32>,
    /// Starting position shared by every car at generation start.
    pub start_position: [f32; 2],
    /// Starting heading in radians.
    pub start_heading: f32,
}

impl Default for Params {
    /// Defaults mirror the classic five-ray oval setup: sensors at -90, -45,
    /// 0, 45 and 90 degrees with a 180-unit range, a 5-6-2 network and a
    /// population of 25.
    fn default() -> Self {
        use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};
        Self {
            sensor_angles: vec![-FRAC_PI_2, -FRAC_PI_4, 0.0, FRAC_PI_4, FRAC_PI_2],
            sensor_range: 180.0,
            layer_sizes: vec![5, 6, 2],
            weight_scale: 1.0,
            population_size: 25,
            mutation_rate: 0.2,
            mutation_strength: 0.5,
            elitism: 2,
            generation_time_budget: 20.0,
            turn_rate: 5.0,
            throttle_accel: 400.0,
            min_speed: 60.0,
            max_speed: 360.0,
            stuck_window: 1.5,
            stuck_threshold: 20.0,
            distance_weight: 0.01,
            time_weight: 6.0,
            survival_bonus: 50.0,
            completion_distance: None,
            start_position: [165.0, 375.0],
            start_heading: FRAC_PI_2,
        }
    }
}

/// Rejected configuration bundles.
#[derive(Debug, Error, PartialEq)]
pub enum ParamsError {
    /// No sensor rays were configured.
    #[error("at least one sensor ray is required")]
    NoSensors,
    /// Fewer than two network layers (input and output) were configured.
    #[error("network topology needs at least an input and an output layer")]
    TooFewLayers,
    /// The input layer does not match the sensor ray count.
    #[error("network input layer expects {expected} inputs but {found} sensor rays are configured")]
    InputShape {
        /// Input layer size from `layer_sizes`.
        expected: usize,
        /// Configured sensor ray count.
        found: usize,
    },
    /// The output layer is not the (steer, throttle) pair.
    #[error("network output layer must have 2 outputs (steer, throttle), found {0}")]
    OutputShape(usize),
    /// A layer of size zero was configured.
    #[error("network layers must be non-empty")]
    EmptyLayer,
    /// The population size is zero.
    #[error("population size must be positive")]
    EmptyPopulation,
    /// More elites than population slots.
    #[error("elitism count {elitism} exceeds population size {population}")]
    ElitismTooLarge {
        /// Configured elitism count.
        elitism: usize,
        /// Configured population size.
        population: usize,
    },
    /// The mutation rate is not a probability.
    #[error("mutation rate must lie in [0, 1], got {0}")]
    MutationRate(f32),
    /// A scalar that must be positive and finite is not.
    #[error("{name} must be positive and finite, got {value}")]
    NonPositive {
        /// Name of the offending field.
        name: &'static str,
        /// The rejected value.
        value: f32,
    },
}

impl Params {
    /// Validates the bundle once at startup.
    ///
    /// The topology checks fix the genome shape for the whole run: a valid
    /// bundle guarantees every genome created from it is crossover-compatible
    /// with every other.
    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.sensor_angles.is_empty() {
            return Err(ParamsError::NoSensors);
        }
        if self.layer_sizes.len() < 2 {
            return Err(ParamsError::TooFewLayers);
        }
        if self.layer_sizes.contains(&0) {
            return Err(ParamsError::EmptyLayer);
        }
        if self.layer_sizes[0] != self.sensor_angles.len() {
            return Err(ParamsError::InputShape {
                expected: self.layer_sizes[0],
                found: self.sensor_angles.len(),
            });
        }
        let outputs = self.layer_sizes[self.layer_sizes.len() - 1];
        if outputs != 2 {
            return Err(ParamsError::OutputShape(outputs));
        }
        if self.population_size == 0 {
            return Err(ParamsError::EmptyPopulation);
        }
        if self.elitism > self.population_size {
            return Err(ParamsError::ElitismTooLarge {
                elitism: self.elitism,
                population: self.population_size,
            });
        }
        if !self.mutation_rate.is_finite() || !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(ParamsError::MutationRate(self.mutation_rate));
        }
        if !self.mutation_strength.is_finite() || self.mutation_strength < 0.0 {
            return Err(ParamsError::NonPositive {
                name: "mutation_strength",
                value: self.mutation_strength,
            });
        }
        for (name, value) in [
            ("sensor_range", self.sensor_range),
            ("weight_scale", self.weight_scale),
            ("generation_time_budget", self.generation_time_budget),
            ("turn_rate", self.turn_rate),
            ("throttle_accel", self.throttle_accel),
            ("max_speed", self.max_speed),
            ("stuck_window", self.stuck_window),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ParamsError::NonPositive { name, value });
            }
        }
        if !self.min_speed.is_finite() || self.min_speed < 0.0 || self.min_speed > self.max_speed {
            return Err(ParamsError::NonPositive {
                name: "min_speed",
                value: self.min_speed,
            });
        }
        Ok(())
    }
}
