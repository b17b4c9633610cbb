//! Generation lifecycle: lockstep ticking, termination, ranking, evolution.
//!
//! The manager owns the population, the single shared tick clock, the
//! process-wide generation record and the run's RNG handle. Per-tick car
//! updates run in parallel over strictly per-car state; the tick boundary is
//! the only synchronization point, and ranking/evolution happen only after
//! every car has reached a terminal state.

use std::cmp::Ordering;

use log::{debug, info};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;
use serde::Serialize;

use super::brain::Brain;
use super::car::{Car, Pose};
use super::control::Command;
use super::evolution::{EvolveError, GeneticAlgorithm};
use super::params::{Params, ParamsError};
use super::sensor::SensorArray;
use super::track::Track;

/// Best result seen across all generations of a run.
#[derive(Debug, Clone, Default)]
pub struct GenerationRecord {
    /// Generation in which the best fitness was achieved.
    pub generation: u32,
    /// Best fitness ever seen.
    pub best_fitness: f32,
    /// The genome that achieved it.
    pub best_brain: Option<Brain>,
}

/// Read-only per-car view handed to the renderer each tick.
#[derive(Debug, Clone, Serialize)]
pub struct CarSnapshot {
    /// Current pose.
    pub pose: Pose,
    /// Whether the car is still driving.
    pub alive: bool,
    /// Normalized sensor readings from the most recent tick.
    pub sensor_readings: Vec<f32>,
    /// Accumulated fitness so far.
    pub fitness: f32,
}

/// Owns the population lifecycle of a run.
pub struct GenerationManager {
    track: Track,
    params: Params,
    sensors: SensorArray,
    algorithm: GeneticAlgorithm,
    cars: Vec<Car>,
    tick: u64,
    elapsed: f32,
    generation: u32,
    record: GenerationRecord,
    rng: StdRng,
    paused: bool,
    skip_requested: bool,
    quit_requested: bool,
}

impl GenerationManager {
    /// Creates a manager over a validated configuration and seeds the first
    /// random population.
    ///
    /// All randomness of the run (initial genomes, selection, crossover,
    /// mutation) flows from this one seed, so runs are reproducible.
    pub fn new(track: Track, params: Params, seed: u64) -> Result<Self, ParamsError> {
        params.validate()?;
        let algorithm = GeneticAlgorithm::from_params(&params)?;
        let sensors = SensorArray::from_params(&params);
        let mut rng = StdRng::seed_from_u64(seed);
        let brains = random_population(&params, &mut rng);

        let mut manager = Self {
            track,
            params,
            sensors,
            algorithm,
            cars: Vec::new(),
            tick: 0,
            elapsed: 0.0,
            generation: 0,
            record: GenerationRecord::default(),
            rng,
            paused: false,
            skip_requested: false,
            quit_requested: false,
        };
        manager.start_generation(brains);
        Ok(manager)
    }

    /// Instantiates a fresh population at the configured start pose.
    pub fn start_generation(&mut self, brains: Vec<Brain>) {
        let ray_count = self.sensors.ray_count();
        let [x, y] = self.params.start_position;
        self.cars = brains
            .into_iter()
            .map(|brain| Car::new(brain, Pose::new(x, y, self.params.start_heading), ray_count))
            .collect();
        self.tick = 0;
        self.elapsed = 0.0;
        self.skip_requested = false;
        self.generation += 1;
        debug!(
            "generation {} started with {} cars",
            self.generation,
            self.cars.len()
        );
    }

    /// Advances one lockstep tick unless paused or quit.
    ///
    /// Alive cars update in parallel; each only mutates its own state, and
    /// the shared tick counter advances once at the barrier.
    pub fn step(&mut self, dt: f32) {
        if self.paused || self.quit_requested {
            return;
        }
        self.tick_once(dt);
    }

    fn tick_once(&mut self, dt: f32) {
        let track = &self.track;
        let sensors = &self.sensors;
        let params = &self.params;
        self.cars
            .par_iter_mut()
            .for_each(|car| car.step(track, sensors, params, dt));
        self.tick += 1;
        self.elapsed += dt;
    }

    /// Whether the current generation has reached a terminal state: every
    /// car dead, the time budget spent, or a skip requested.
    pub fn is_terminated(&self) -> bool {
        self.skip_requested
            || self.elapsed >= self.params.generation_time_budget
            || self.cars.iter().all(|car| !car.is_alive())
    }

    /// Ticks until the generation terminates or quit is requested.
    pub fn run_until_termination(&mut self, dt: f32) {
        while !self.is_terminated() && !self.quit_requested {
            self.tick_once(dt);
        }
    }

    /// Finalizes the generation and returns `(genome, fitness)` pairs sorted
    /// by descending fitness, updating the generation record.
    ///
    /// Cars still alive are retired with the survival bonus; a skip or an
    /// exhausted time budget therefore never corrupts in-progress fitness.
    pub fn collect_results(&mut self) -> Vec<(Brain, f32)> {
        for car in &mut self.cars {
            car.finalize_survivor(&self.params);
        }
        let mut ranked: Vec<(Brain, f32)> = self
            .cars
            .iter()
            .map(|car| (car.brain.clone(), car.fitness()))
            .collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

        if let Some((brain, fitness)) = ranked.first()
            && (*fitness > self.record.best_fitness || self.record.best_brain.is_none())
        {
            self.record = GenerationRecord {
                generation: self.generation,
                best_fitness: *fitness,
                best_brain: Some(brain.clone()),
            };
        }
        ranked
    }

    /// Runs one whole generation: tick to termination, rank, evolve and
    /// start the next population. Returns the ranking of the generation
    /// that just finished.
    pub fn advance_generation(&mut self, dt: f32) -> Result<Vec<(Brain, f32)>, EvolveError> {
        self.run_until_termination(dt);
        let ranked = self.collect_results();
        let best = ranked.first().map_or(0.0, |(_, fitness)| *fitness);
        info!(
            "generation {} finished after {} ticks: best {:.2}, record {:.2}",
            self.generation, self.tick, best, self.record.best_fitness
        );
        let next = self
            .algorithm
            .evolve(&ranked, self.params.population_size, &mut self.rng)?;
        self.start_generation(next);
        Ok(ranked)
    }

    /// Applies a discrete control command.
    pub fn handle_command(&mut self, command: Command) {
        match command {
            Command::Pause => self.paused = true,
            Command::Resume => self.paused = false,
            Command::RestartGeneration => self.restart(),
            Command::SkipGeneration => self.skip_requested = true,
            Command::Quit => self.quit_requested = true,
        }
    }

    /// Discards the population and record and reseeds from fresh random
    /// genomes.
    fn restart(&mut self) {
        info!("restart requested, reseeding population");
        let brains = random_population(&self.params, &mut self.rng);
        self.generation = 0;
        self.record = GenerationRecord::default();
        self.start_generation(brains);
    }

    /// Read-only per-car views for rendering.
    pub fn snapshot(&self) -> Vec<CarSnapshot> {
        self.cars
            .iter()
            .map(|car| CarSnapshot {
                pose: car.pose.clone(),
                alive: car.is_alive(),
                sensor_readings: car.last_readings().to_vec(),
                fitness: car.fitness(),
            })
            .collect()
    }

    /// The static track geometry, for rendering.
    pub fn track(&self) -> &Track {
        &self.track
    }

    /// Current population, in creation order.
    pub fn cars(&self) -> &[Car] {
        &self.cars
    }

    /// Number of cars still driving.
    pub fn alive_count(&self) -> usize {
        self.cars.iter().filter(|car| car.is_alive()).count()
    }

    /// One-based index of the current generation.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Ticks elapsed in the current generation.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Simulation seconds elapsed in the current generation.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Best result seen so far across the whole run.
    pub fn record(&self) -> &GenerationRecord {
        &self.record
    }

    /// Whether stepping is currently paused.
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Whether the host asked the simulation to stop.
    pub fn is_quit_requested(&self) -> bool {
        self.quit_requested
    }
}

fn random_population(params: &Params, rng: &mut StdRng) -> Vec<Brain> {
    (0..params.population_size)
        .map(|_| Brain::new(&params.layer_sizes, params.weight_scale, rng))
        .collect()
}
