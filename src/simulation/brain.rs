//! Feed-forward controller networks and genome operations.
//!
//! A [`Brain`] is both the controller (a stateless forward pass from sensor
//! readings to steering outputs) and the genome (the full set of weights and
//! biases the genetic algorithm selects, crosses and mutates). Topology is
//! fixed at construction; every genome in a population shares the same shape
//! so crossover is always well-defined.

use ndarray::{Array1, Array2};
use ndarray_rand::RandomExt;
use ndarray_rand::rand_distr::{Normal, Uniform};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Two genomes of different topology met in crossover.
///
/// Unreachable under a validated configuration; raised instead of silently
/// truncating or padding parameters.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("genome shape mismatch: {left:?} vs {right:?}")]
pub struct ShapeError {
    /// Layer shapes of the left genome as `(outputs, inputs)` pairs.
    pub left: Vec<(usize, usize)>,
    /// Layer shapes of the right genome.
    pub right: Vec<(usize, usize)>,
}

/// A single fully-connected layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mlp {
    /// Weight matrix (`output_size` × `input_size`).
    pub weights: Array2<f32>,
    /// Bias vector (`output_size`).
    pub biases: Array1<f32>,
}

impl Mlp {
    /// Creates a new layer with uniform random weights and biases in
    /// `[-scale, scale]`.
    pub fn new_random<R: Rng>(
        input_size: usize,
        output_size: usize,
        scale: f32,
        rng: &mut R,
    ) -> Self {
        Self {
            weights: Array2::random_using(
                (output_size, input_size),
                Uniform::new(-scale, scale),
                rng,
            ),
            biases: Array1::random_using(output_size, Uniform::new(-scale, scale), rng),
        }
    }

    /// Performs forward pass with tanh activation.
    #[inline]
    pub fn forward(&self, inputs: &Array1<f32>) -> Array1<f32> {
        let mut output = self.weights.dot(inputs);
        output += &self.biases;
        output.mapv_inplace(f32::tanh);
        output
    }

    /// Mutates each parameter independently with probability `rate`, adding
    /// a sample of `noise` when it fires.
    pub fn mutate<R: Rng>(&mut self, rng: &mut R, rate: f32, noise: Normal<f32>) {
        for weight in &mut self.weights {
            if rng.gen_bool(f64::from(rate)) {
                *weight += rng.sample(noise);
            }
        }
        for bias in &mut self.biases {
            if rng.gen_bool(f64::from(rate)) {
                *bias += rng.sample(noise);
            }
        }
    }

    /// Creates a child layer drawing every weight and bias independently
    /// from one parent or the other with equal probability.
    pub fn crossover_uniform<R: Rng>(parent1: &Mlp, parent2: &Mlp, rng: &mut R) -> Self {
        let mut weights = parent1.weights.clone();
        weights.zip_mut_with(&parent2.weights, |child, other| {
            if rng.gen_bool(0.5) {
                *child = *other;
            }
        });
        let mut biases = parent1.biases.clone();
        biases.zip_mut_with(&parent2.biases, |child, other| {
            if rng.gen_bool(0.5) {
                *child = *other;
            }
        });
        Self { weights, biases }
    }

    /// Layer shape as `(outputs, inputs)`.
    pub fn shape(&self) -> (usize, usize) {
        self.weights.dim()
    }
}

/// A fixed-topology feed-forward controller network.
///
/// Strictly stateless between calls: the same readings and the same genome
/// always yield the same outputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Brain {
    /// Ordered layers from input to output.
    layers: Vec<Mlp>,
}

impl Brain {
    /// Creates a new brain with random weights for the given layer sizes.
    pub fn new<R: Rng>(layer_sizes: &[usize], scale: f32, rng: &mut R) -> Self {
        let layers = (0..layer_sizes.len() - 1)
            .map(|i| Mlp::new_random(layer_sizes[i], layer_sizes[i + 1], scale, rng))
            .collect();
        Self { layers }
    }

    /// Assembles a brain from explicit layers.
    ///
    /// The caller is responsible for chaining layer sizes consistently; this
    /// exists so hosts and tests can install hand-built controllers.
    pub fn from_layers(layers: Vec<Mlp>) -> Self {
        Self { layers }
    }

    /// Maps sensor readings to a `(steer, throttle)` pair.
    ///
    /// Tanh after every layer keeps both outputs in `[-1, 1]`.
    #[inline]
    pub fn decide(&self, readings: &Array1<f32>) -> (f32, f32) {
        let mut output = readings.clone();
        for layer in &self.layers {
            output = layer.forward(&output);
        }
        (output[0], output[1])
    }

    /// Layer shapes from input to output, the genome's topology fingerprint.
    pub fn shape(&self) -> Vec<(usize, usize)> {
        self.layers.iter().map(Mlp::shape).collect()
    }

    /// Total number of weights and biases.
    pub fn parameter_count(&self) -> usize {
        self.layers
            .iter()
            .map(|layer| layer.weights.len() + layer.biases.len())
            .sum()
    }

    /// Creates a child genome by uniform per-parameter crossover.
    ///
    /// Parents of different topology are a shape error, never a truncation.
    pub fn crossover<R: Rng>(
        parent1: &Brain,
        parent2: &Brain,
        rng: &mut R,
    ) -> Result<Brain, ShapeError> {
        if parent1.shape() != parent2.shape() {
            return Err(ShapeError {
                left: parent1.shape(),
                right: parent2.shape(),
            });
        }
        let layers = parent1
            .layers
            .iter()
            .zip(&parent2.layers)
            .map(|(layer1, layer2)| Mlp::crossover_uniform(layer1, layer2, rng))
            .collect();
        Ok(Brain { layers })
    }

    /// Mutates every layer's parameters independently.
    pub fn mutate<R: Rng>(&mut self, rng: &mut R, rate: f32, noise: Normal<f32>) {
        for layer in &mut self.layers {
            layer.mutate(rng, rate, noise);
        }
    }

    /// Flattens all weights and biases into a single vector.
    pub fn flatten(&self) -> Vec<f32> {
        let mut flat = Vec::with_capacity(self.parameter_count());
        for layer in &self.layers {
            flat.extend(layer.weights.iter().copied());
            flat.extend(layer.biases.iter().copied());
        }
        flat
    }
}
