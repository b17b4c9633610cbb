#![allow(missing_docs)]

use neuroracer::simulation::brain::Brain;
use neuroracer::simulation::evolution::{EvolveError, GeneticAlgorithm};
use neuroracer::simulation::params::Params;
use rand::SeedableRng;
use rand::rngs::StdRng;

fn create_test_params() -> Params {
    Params {
        elitism: 2,
        mutation_rate: 0.2,
        mutation_strength: 0.3,
        ..Params::default()
    }
}

fn ranked_population(count: usize, seed: u64) -> Vec<(Brain, f32)> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|i| {
            let brain = Brain::new(&[5, 6, 2], 1.0, &mut rng);
            (brain, (count - i) as f32)
        })
        .collect()
}

#[test]
fn test_out_of_range_mutation_rate_is_rejected_at_construction() {
    use neuroracer::simulation::params::ParamsError;

    // The rate is a per-parameter probability; a bundle that skipped
    // validation must still be rejected here instead of panicking later.
    let params = Params {
        mutation_rate: 1.5,
        ..create_test_params()
    };
    let err = GeneticAlgorithm::from_params(&params).unwrap_err();
    assert_eq!(err, ParamsError::MutationRate(1.5));
}

#[test]
fn test_evolution_is_deterministic_under_a_fixed_seed() {
    let algorithm = GeneticAlgorithm::from_params(&create_test_params()).unwrap();
    let ranked = ranked_population(6, 11);

    let mut rng1 = StdRng::seed_from_u64(99);
    let mut rng2 = StdRng::seed_from_u64(99);
    let next1 = algorithm.evolve(&ranked, 6, &mut rng1).unwrap();
    let next2 = algorithm.evolve(&ranked, 6, &mut rng2).unwrap();

    assert_eq!(next1.len(), next2.len());
    for (a, b) in next1.iter().zip(&next2) {
        assert_eq!(a.flatten(), b.flatten());
    }
}

#[test]
fn test_elites_survive_unmodified() {
    let algorithm = GeneticAlgorithm::from_params(&create_test_params()).unwrap();
    let ranked = ranked_population(5, 12);
    let mut rng = StdRng::seed_from_u64(0);

    let next = algorithm.evolve(&ranked, 5, &mut rng).unwrap();

    assert_eq!(next[0].flatten(), ranked[0].0.flatten());
    assert_eq!(next[1].flatten(), ranked[1].0.flatten());
}

#[test]
fn test_population_size_is_restored() {
    let algorithm = GeneticAlgorithm::from_params(&create_test_params()).unwrap();
    let mut rng = StdRng::seed_from_u64(0);

    // Ranking size and requested size are independent.
    for (ranked_len, population_size) in [(1, 10), (3, 5), (10, 2)] {
        let ranked = ranked_population(ranked_len, 13);
        let next = algorithm.evolve(&ranked, population_size, &mut rng).unwrap();
        assert_eq!(next.len(), population_size);
    }
}

#[test]
fn test_children_share_the_population_topology() {
    let algorithm = GeneticAlgorithm::from_params(&create_test_params()).unwrap();
    let ranked = ranked_population(4, 14);
    let mut rng = StdRng::seed_from_u64(0);

    let next = algorithm.evolve(&ranked, 8, &mut rng).unwrap();
    for child in &next {
        assert_eq!(child.shape(), ranked[0].0.shape());
    }
}

#[test]
fn test_all_zero_fitness_still_breeds() {
    let algorithm = GeneticAlgorithm::from_params(&create_test_params()).unwrap();
    let ranked: Vec<(Brain, f32)> = ranked_population(4, 15)
        .into_iter()
        .map(|(brain, _)| (brain, 0.0))
        .collect();
    let mut rng = StdRng::seed_from_u64(0);

    // Selection degrades to uniform instead of dividing by zero.
    let next = algorithm.evolve(&ranked, 4, &mut rng).unwrap();
    assert_eq!(next.len(), 4);
}

#[test]
fn test_empty_ranking_is_an_error() {
    let algorithm = GeneticAlgorithm::from_params(&create_test_params()).unwrap();
    let mut rng = StdRng::seed_from_u64(0);

    let err = algorithm.evolve(&[], 4, &mut rng).unwrap_err();
    assert!(matches!(err, EvolveError::EmptyRanking));
}

#[test]
fn test_mixed_topologies_are_an_error() {
    let algorithm = GeneticAlgorithm::from_params(&create_test_params()).unwrap();
    let mut rng = StdRng::seed_from_u64(16);
    let ranked = vec![
        (Brain::new(&[5, 6, 2], 1.0, &mut rng), 2.0),
        (Brain::new(&[5, 4, 2], 1.0, &mut rng), 1.0),
    ];

    let err = algorithm.evolve(&ranked, 4, &mut rng).unwrap_err();
    assert!(matches!(err, EvolveError::Shape(_)));
}
