//! Genetic algorithm: elitism, selection, crossover, mutation.
//!
//! Operates purely on `(genome, fitness)` rankings; it never touches cars or
//! track state. All randomness flows through the caller's RNG handle, so a
//! fixed seed reproduces selection draws, crossover masks and mutation noise
//! end-to-end.

use log::debug;
use ndarray_rand::rand_distr::Normal;
use rand::Rng;
use thiserror::Error;

use super::brain::{Brain, ShapeError};
use super::params::{Params, ParamsError};

/// Non-positive fitness values clamp to this selection weight so that the
/// roulette wheel never divides by zero.
const MIN_SELECTION_WEIGHT: f32 = 1e-6;

/// Failures while breeding the next generation.
#[derive(Debug, Error)]
pub enum EvolveError {
    /// The ranking was empty; there is nothing to select from.
    #[error("cannot evolve from an empty ranking")]
    EmptyRanking,
    /// Two ranked genomes had different topology.
    #[error(transparent)]
    Shape(#[from] ShapeError),
}

/// Produces the next generation of genomes from a fitness ranking.
#[derive(Debug, Clone)]
pub struct GeneticAlgorithm {
    elitism: usize,
    mutation_rate: f32,
    noise: Normal<f32>,
}

impl GeneticAlgorithm {
    /// Creates an algorithm from the configuration bundle.
    ///
    /// Rejects a mutation rate outside `[0, 1]` even when the bundle was
    /// never validated as a whole; the rate is used as a probability on
    /// every parameter draw.
    pub fn from_params(params: &Params) -> Result<Self, ParamsError> {
        if !params.mutation_rate.is_finite() || !(0.0..=1.0).contains(&params.mutation_rate) {
            return Err(ParamsError::MutationRate(params.mutation_rate));
        }
        let noise =
            Normal::new(0.0, params.mutation_strength).map_err(|_| ParamsError::NonPositive {
                name: "mutation_strength",
                value: params.mutation_strength,
            })?;
        Ok(Self {
            elitism: params.elitism,
            mutation_rate: params.mutation_rate,
            noise,
        })
    }

    /// Breeds the next generation from a descending fitness ranking.
    ///
    /// The top `elitism` genomes are cloned unmodified; the remaining slots
    /// are filled by fitness-proportionate selection, uniform per-parameter
    /// crossover and Gaussian mutation. The output always has exactly
    /// `population_size` genomes.
    pub fn evolve<R: Rng>(
        &self,
        ranked: &[(Brain, f32)],
        population_size: usize,
        rng: &mut R,
    ) -> Result<Vec<Brain>, EvolveError> {
        if ranked.is_empty() {
            return Err(EvolveError::EmptyRanking);
        }
        let shape = ranked[0].0.shape();
        for (brain, _) in ranked {
            if brain.shape() != shape {
                return Err(ShapeError {
                    left: shape,
                    right: brain.shape(),
                }
                .into());
            }
        }

        let mut next = Vec::with_capacity(population_size);
        for (brain, _) in ranked.iter().take(self.elitism.min(population_size)) {
            next.push(brain.clone());
        }

        let weights = selection_weights(ranked);
        while next.len() < population_size {
            let parent1 = &ranked[sample_index(&weights, rng)].0;
            let parent2 = &ranked[sample_index(&weights, rng)].0;
            let mut child = Brain::crossover(parent1, parent2, rng)?;
            child.mutate(rng, self.mutation_rate, self.noise);
            next.push(child);
        }

        debug!(
            "evolved {} genomes ({} elites) from a ranking of {}",
            next.len(),
            self.elitism.min(population_size),
            ranked.len()
        );
        Ok(next)
    }
}

/// Fitness-proportionate selection weights.
///
/// Zero, negative and non-finite fitness clamp to a minimum positive weight;
/// an all-zero population therefore degrades to uniform selection instead of
/// a division error.
fn selection_weights(ranked: &[(Brain, f32)]) -> Vec<f32> {
    ranked
        .iter()
        .map(|(_, fitness)| {
            if fitness.is_finite() && *fitness > MIN_SELECTION_WEIGHT {
                *fitness
            } else {
                MIN_SELECTION_WEIGHT
            }
        })
        .collect()
}

/// Roulette-wheel draw over positive weights.
fn sample_index<R: Rng>(weights: &[f32], rng: &mut R) -> usize {
    let total: f32 = weights.iter().sum();
    let mut target = rng.gen_range(0.0..total);
    for (index, weight) in weights.iter().enumerate() {
        if target < *weight {
            return index;
        }
        target -= weight;
    }
    weights.len() - 1
}
