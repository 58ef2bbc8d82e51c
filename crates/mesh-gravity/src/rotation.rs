//! Rigid spin of a body about a fixed axis.

use nalgebra::{Point3, Rotation3, Unit, Vector3};

use crate::error::{GravityError, GravityResult};

/// Normalize a spin axis, rejecting zero or non-finite vectors.
pub fn spin_axis(axis: Vector3<f64>) -> GravityResult<Unit<Vector3<f64>>> {
    if !axis.iter().all(|c| c.is_finite()) {
        return Err(GravityError::InvalidParameter {
            details: format!("spin axis {:?} is not finite", axis.as_slice()),
        });
    }
    Unit::try_new(axis, f64::EPSILON).ok_or_else(|| GravityError::InvalidParameter {
        details: "spin axis has zero length".to_string(),
    })
}

/// Body-to-inertial rotation after spinning at `spin_rate` (rad/s) for `time` seconds.
#[inline]
pub fn spin_rotation(time: f64, spin_rate: f64, axis: &Unit<Vector3<f64>>) -> Rotation3<f64> {
    Rotation3::from_axis_angle(axis, spin_rate * time)
}

/// Rotate a vertex array about `axis` by `spin_rate * time`.
///
/// Pure function: the input is left untouched.
pub fn rotate_vertices(
    vertices: &[Point3<f64>],
    time: f64,
    spin_rate: f64,
    axis: &Unit<Vector3<f64>>,
) -> Vec<Point3<f64>> {
    let rotation = spin_rotation(time, spin_rate, axis);
    vertices.iter().map(|v| rotation * v).collect()
}
