#![allow(missing_docs)]

use ndarray::{Array2, array};
use neuroracer::simulation::brain::{Brain, Mlp};
use neuroracer::simulation::car::{Car, Pose};
use neuroracer::simulation::params::Params;
use neuroracer::simulation::sensor::SensorArray;
use neuroracer::simulation::track::Track;

fn create_test_params() -> Params {
    Params {
        sensor_angles: vec![
            -std::f32::consts::FRAC_PI_2,
            -std::f32::consts::FRAC_PI_4,
            0.0,
            std::f32::consts::FRAC_PI_4,
            std::f32::consts::FRAC_PI_2,
        ],
        sensor_range: 50.0,
        layer_sizes: vec![5, 2],
        weight_scale: 1.0,
        population_size: 1,
        mutation_rate: 0.1,
        mutation_strength: 0.3,
        elitism: 1,
        generation_time_budget: 30.0,
        turn_rate: 3.0,
        throttle_accel: 60.0,
        min_speed: 5.0,
        max_speed: 30.0,
        stuck_window: 1.0,
        stuck_threshold: 0.5,
        distance_weight: 0.01,
        time_weight: 6.0,
        survival_bonus: 50.0,
        completion_distance: None,
        start_position: [5.0, 5.0],
        start_heading: 0.0,
    }
}

/// Constant controller: zero steering, biases set the throttle.
fn constant_brain(throttle_bias: f32) -> Brain {
    Brain::from_layers(vec![Mlp {
        weights: Array2::zeros((2, 5)),
        biases: array![0.0, throttle_bias],
    }])
}

#[test]
fn test_straight_driver_crosses_corridor() {
    let params = create_test_params();
    let track = Track::straight(120.0, 10.0).unwrap();
    let sensors = SensorArray::from_params(&params);
    let mut car = Car::new(constant_brain(3.0), Pose::new(5.0, 5.0, 0.0), 5);

    for _ in 0..400 {
        car.step(&track, &sensors, &params, 0.05);
    }

    // The car drives straight into the far wall and dies there.
    assert!(!car.is_alive());
    assert!(car.distance() >= 100.0);
    assert!(car.time_alive() > 0.0);
    assert!(car.fitness() > 0.0);
}

#[test]
fn test_crash_tick_scores_nothing() {
    let params = create_test_params();
    let track = Track::straight(120.0, 10.0).unwrap();
    let sensors = SensorArray::from_params(&params);
    // Starting outside the corridor, the first move already counts as a crash.
    let mut car = Car::new(constant_brain(3.0), Pose::new(-5.0, 5.0, 0.0), 5);

    car.step(&track, &sensors, &params, 0.05);

    assert!(!car.is_alive());
    assert_eq!(car.fitness(), 0.0);
    assert_eq!(car.distance(), 0.0);
    assert_eq!(car.time_alive(), 0.0);
}

#[test]
fn test_fitness_is_monotone_and_freezes_on_death() {
    let params = create_test_params();
    let track = Track::straight(120.0, 10.0).unwrap();
    let sensors = SensorArray::from_params(&params);
    let mut car = Car::new(constant_brain(3.0), Pose::new(5.0, 5.0, 0.0), 5);

    let mut previous = car.fitness();
    for _ in 0..400 {
        car.step(&track, &sensors, &params, 0.05);
        assert!(car.fitness() >= previous);
        previous = car.fitness();
    }
    assert!(!car.is_alive());

    let frozen = car.fitness();
    car.step(&track, &sensors, &params, 0.05);
    assert_eq!(car.fitness(), frozen);
}

#[test]
fn test_stuck_car_is_killed() {
    let params = Params {
        min_speed: 0.0,
        ..create_test_params()
    };
    let track = Track::straight(120.0, 10.0).unwrap();
    let sensors = SensorArray::from_params(&params);
    // Full brake keeps the speed clamped at zero.
    let mut car = Car::new(constant_brain(-3.0), Pose::new(5.0, 5.0, 0.0), 5);

    for _ in 0..40 {
        car.step(&track, &sensors, &params, 0.05);
    }

    // Killed by the stuck window, well clear of the walls.
    assert!(!car.is_alive());
    assert_eq!(car.distance(), 0.0);
    assert!(car.time_alive() < 2.0 * params.stuck_window);
}

#[test]
fn test_completion_retires_with_bonus() {
    let params = Params {
        completion_distance: Some(50.0),
        ..create_test_params()
    };
    let track = Track::straight(120.0, 10.0).unwrap();
    let sensors = SensorArray::from_params(&params);
    let mut car = Car::new(constant_brain(3.0), Pose::new(5.0, 5.0, 0.0), 5);

    for _ in 0..400 {
        car.step(&track, &sensors, &params, 0.05);
    }

    assert!(!car.is_alive());
    assert!(car.distance() >= 50.0);
    assert!(car.distance() < 60.0);
    assert!(car.fitness() > params.survival_bonus);
}

#[test]
fn test_non_finite_controller_kills_only_that_car() {
    let params = create_test_params();
    let track = Track::straight(120.0, 10.0).unwrap();
    let sensors = SensorArray::from_params(&params);

    // A NaN steering bias poisons the pose on the very first move.
    let broken = Brain::from_layers(vec![Mlp {
        weights: Array2::zeros((2, 5)),
        biases: array![f32::NAN, 3.0],
    }]);
    let mut poisoned = Car::new(broken, Pose::new(5.0, 5.0, 0.0), 5);
    let mut healthy = Car::new(constant_brain(3.0), Pose::new(5.0, 5.0, 0.0), 5);

    poisoned.step(&track, &sensors, &params, 0.05);
    healthy.step(&track, &sensors, &params, 0.05);

    assert!(!poisoned.is_alive());
    assert_eq!(poisoned.fitness(), 0.0);
    assert_eq!(poisoned.distance(), 0.0);

    assert!(healthy.is_alive());
    assert!(healthy.fitness() > 0.0);
}

#[test]
fn test_survivor_bonus_is_credited_once() {
    let params = create_test_params();
    let mut car = Car::new(constant_brain(0.0), Pose::new(5.0, 5.0, 0.0), 5);

    assert!(car.is_alive());
    car.finalize_survivor(&params);
    assert!(!car.is_alive());
    assert_eq!(car.fitness(), params.survival_bonus);

    car.finalize_survivor(&params);
    assert_eq!(car.fitness(), params.survival_bonus);
}

#[test]
fn test_killed_car_keeps_fitness_unchanged() {
    let params = create_test_params();
    let mut car = Car::new(constant_brain(0.0), Pose::new(5.0, 5.0, 0.0), 5);

    car.kill();
    assert!(!car.is_alive());
    assert_eq!(car.fitness(), 0.0);

    // A forced kill also blocks the survival bonus.
    car.finalize_survivor(&params);
    assert_eq!(car.fitness(), 0.0);
}
