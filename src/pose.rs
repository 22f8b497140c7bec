// src/pose.rs

//! World-frame pose for the free-flyer: a position in meters plus a unit
//! quaternion orientation. Waypoints, telemetry comparisons and move requests
//! all speak in terms of this type.

use nalgebra::{Point3, Quaternion, UnitQuaternion};

/// Position and orientation in the fixed world frame.
///
/// Immutable value type; navigation only ever reads it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    /// Position in meters.
    pub position: Point3<f64>,
    /// Orientation as a unit quaternion.
    pub orientation: UnitQuaternion<f64>,
}

impl Pose {
    /// Builds a pose from a position and an already-normalized orientation.
    pub fn new(position: Point3<f64>, orientation: UnitQuaternion<f64>) -> Self {
        Pose {
            position,
            orientation,
        }
    }

    /// Builds a pose from raw coordinates and quaternion components (x, y, z, w),
    /// normalizing the quaternion. Returns `None` for a degenerate (near-zero)
    /// quaternion or non-finite coordinates.
    pub fn from_parts(position: [f64; 3], orientation: [f64; 4]) -> Option<Self> {
        if position.iter().any(|c| !c.is_finite()) || orientation.iter().any(|c| !c.is_finite()) {
            return None;
        }
        let [x, y, z, w] = orientation;
        let quat = UnitQuaternion::try_new(Quaternion::new(w, x, y, z), 1e-9)?;
        Some(Pose {
            position: Point3::new(position[0], position[1], position[2]),
            orientation: quat,
        })
    }

    /// Euclidean distance in meters from this pose's position to `point`.
    pub fn distance_to(&self, point: &Point3<f64>) -> f64 {
        (self.position - point).norm()
    }

    /// True when every coordinate is finite.
    pub fn is_finite(&self) -> bool {
        self.position.iter().all(|c| c.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_euclidean() {
        let pose = Pose::from_parts([1.0, 2.0, 2.0], [0.0, 0.0, 0.0, 1.0]).unwrap();
        let d = pose.distance_to(&Point3::new(1.0, 2.0, 5.0));
        assert!((d - 3.0).abs() < 1e-12);
    }

    #[test]
    fn from_parts_normalizes_orientation() {
        let pose = Pose::from_parts([0.0, 0.0, 0.0], [0.0, 0.0, 2.0, 0.0]).unwrap();
        assert!((pose.orientation.norm() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn from_parts_rejects_degenerate_quaternion() {
        assert!(Pose::from_parts([0.0, 0.0, 0.0], [0.0, 0.0, 0.0, 0.0]).is_none());
    }

    #[test]
    fn from_parts_rejects_non_finite_position() {
        assert!(Pose::from_parts([f64::NAN, 0.0, 0.0], [0.0, 0.0, 0.0, 1.0]).is_none());
    }
}
