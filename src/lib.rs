//! # Neuroracer - Neuroevolution Track Racing
//!
//! A simulation of car agents that learn to drive a closed track. Each car
//! carries a small feed-forward neural network, senses the track walls with
//! distance rays, and is scored by how far and how long it drives. After every
//! generation a genetic algorithm (elitism, fitness-proportionate selection,
//! crossover, mutation) breeds the next population of controllers.
//!
//! The crate is the simulation core only. Rendering, input devices, track
//! asset authoring and windowing live in the embedding application; the core
//! exposes read-only per-tick snapshots and accepts discrete control commands
//! instead.
//!
//! ## Core Modules
//!
//! - [`simulation::track`] - Track geometry, ray casting and collision queries
//! - [`simulation::sensor`] - Per-car distance sensor rays
//! - [`simulation::brain`] - Feed-forward controller networks (genomes)
//! - [`simulation::car`] - Car agents and the per-tick update
//! - [`simulation::generation`] - Generation lifecycle and lockstep ticking
//! - [`simulation::evolution`] - Genetic algorithm producing new populations

/// Core simulation logic and data structures.
pub mod simulation {
    /// Feed-forward controller networks and genome operations.
    pub mod brain;
    /// Car agents: pose, fitness, and the per-tick update.
    pub mod car;
    /// Discrete control commands from the embedding application.
    pub mod control;
    /// Genetic algorithm: elitism, selection, crossover, mutation.
    pub mod evolution;
    /// Generation lifecycle: lockstep ticking, ranking, evolution.
    pub mod generation;
    /// Simulation parameters.
    pub mod params;
    /// Distance sensor rays cast against the track walls.
    pub mod sensor;
    /// Track geometry: wall segments and corridor containment.
    pub mod track;
}
