#![allow(missing_docs)]

use std::f32::consts::{FRAC_PI_2, PI};

use neuroracer::simulation::car::Pose;
use neuroracer::simulation::params::Params;
use neuroracer::simulation::sensor::SensorArray;
use neuroracer::simulation::track::Track;

#[test]
fn test_readings_follow_offset_order() {
    let track = Track::straight(100.0, 100.0).unwrap();
    let sensors = SensorArray::new(vec![0.0, PI], 200.0);
    let pose = Pose::new(10.0, 50.0, 0.0);

    let readings = sensors.read(&pose, &track);
    assert_eq!(readings.len(), 2);
    // Forward ray travels 90 units to the far wall, backward ray 10.
    assert!((readings[0] - 0.45).abs() < 1e-4);
    assert!((readings[1] - 0.05).abs() < 1e-4);
}

#[test]
fn test_offsets_are_relative_to_heading() {
    let track = Track::straight(100.0, 100.0).unwrap();
    let sensors = SensorArray::new(vec![-FRAC_PI_2, 0.0, FRAC_PI_2], 200.0);
    // Facing the top wall from the center.
    let pose = Pose::new(50.0, 50.0, FRAC_PI_2);

    let readings = sensors.read(&pose, &track);
    // Left offset points at the right wall, right offset at the left wall,
    // all 50 units away from the center.
    for reading in &readings {
        assert!((reading - 0.25).abs() < 1e-4);
    }
}

#[test]
fn test_miss_reads_exactly_one() {
    let track = Track::straight(1000.0, 1000.0).unwrap();
    let sensors = SensorArray::new(vec![0.0], 50.0);
    let pose = Pose::new(500.0, 500.0, 0.0);

    let readings = sensors.read(&pose, &track);
    assert_eq!(readings[0], 1.0);
}

#[test]
fn test_readings_stay_normalized() {
    let params = Params::default();
    let sensors = SensorArray::from_params(&params);
    let track = Track::oval([600.0, 375.0], 480.0, 300.0, 90.0, 36).unwrap();
    let pose = Pose::new(165.0, 375.0, FRAC_PI_2);

    let readings = sensors.read(&pose, &track);
    assert_eq!(readings.len(), sensors.ray_count());
    for reading in &readings {
        assert!((0.0..=1.0).contains(reading));
    }
}
