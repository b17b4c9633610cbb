//! Distance sensor rays cast against the track walls.
//!
//! The sensor array is the only bridge between continuous track geometry and
//! the controller network's discrete inputs: one ray per configured angle
//! offset, each normalized by the maximum range. The offset order is fixed
//! per run and matches the network's declared input order.

use ndarray::Array1;

use super::car::Pose;
use super::params::Params;
use super::track::Track;

/// Fixed set of ray angle offsets shared by every car in a run.
#[derive(Debug, Clone)]
pub struct SensorArray {
    angle_offsets: Vec<f32>,
    max_range: f32,
}

impl SensorArray {
    /// Creates a sensor array from explicit angle offsets (radians, relative
    /// to the car heading) and a maximum ray range.
    pub fn new(angle_offsets: Vec<f32>, max_range: f32) -> Self {
        Self {
            angle_offsets,
            max_range,
        }
    }

    /// Creates the sensor array described by the configuration bundle.
    pub fn from_params(params: &Params) -> Self {
        Self::new(params.sensor_angles.clone(), params.sensor_range)
    }

    /// Number of rays, which is also the network input size.
    pub fn ray_count(&self) -> usize {
        self.angle_offsets.len()
    }

    /// Maximum ray range in track units.
    pub fn max_range(&self) -> f32 {
        self.max_range
    }

    /// Casts every ray from the pose and returns normalized distances.
    ///
    /// A ray that hits no wall within range reads exactly `1.0`; all
    /// readings lie in `[0, 1]` in the same order as the angle offsets.
    pub fn read(&self, pose: &Pose, track: &Track) -> Array1<f32> {
        let x = pose.pos[0];
        let y = pose.pos[1];
        Array1::from_iter(self.angle_offsets.iter().map(|offset| {
            match track.nearest_intersection(x, y, pose.heading + offset, self.max_range) {
                Some(distance) => (distance / self.max_range).clamp(0.0, 1.0),
                None => 1.0,
            }
        }))
    }
}
