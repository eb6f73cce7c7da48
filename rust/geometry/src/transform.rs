// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shared world-transform utilities
//!
//! Object transforms are affine 4x4 matrices composed as
//! `translation * rotation * scale`. The helpers here decompose and rebuild
//! them without ever touching mesh data.

use crate::error::{Error, Result};
use nalgebra::{Matrix4, Point3, Rotation3, Vector3};

/// Compose `translation * Rz(angle) * scale`
pub fn compose(translation: &Vector3<f64>, rotation_z: f64, scale: &Vector3<f64>) -> Matrix4<f64> {
    Matrix4::new_translation(translation)
        * Rotation3::from_axis_angle(&Vector3::z_axis(), rotation_z).to_homogeneous()
        * Matrix4::new_nonuniform_scaling(scale)
}

/// Translation part of an affine transform
#[inline]
pub fn translation_of(transform: &Matrix4<f64>) -> Vector3<f64> {
    Vector3::new(transform[(0, 3)], transform[(1, 3)], transform[(2, 3)])
}

/// World position of the local origin
#[inline]
pub fn origin_of(transform: &Matrix4<f64>) -> Point3<f64> {
    Point3::from(translation_of(transform))
}

/// Per-axis scale, taken as the lengths of the basis columns
pub fn scale_of(transform: &Matrix4<f64>) -> Vector3<f64> {
    Vector3::new(
        transform.fixed_view::<3, 1>(0, 0).norm(),
        transform.fixed_view::<3, 1>(0, 1).norm(),
        transform.fixed_view::<3, 1>(0, 2).norm(),
    )
}

/// Inverse of an affine transform
pub fn inverse(transform: &Matrix4<f64>) -> Result<Matrix4<f64>> {
    transform.try_inverse().ok_or(Error::SingularTransform)
}

/// Express a world-space direction in the local frame of `transform`
pub fn world_direction_to_local(
    transform: &Matrix4<f64>,
    direction: &Vector3<f64>,
) -> Result<Vector3<f64>> {
    Ok(inverse(transform)?.transform_vector(direction))
}

/// Replace the rotation with a pure Z rotation, keeping translation and scale
pub fn with_rotation_z(transform: &Matrix4<f64>, angle: f64) -> Matrix4<f64> {
    compose(&translation_of(transform), angle, &scale_of(transform))
}

/// Re-express a transform so that its origin sits at `world_point`
///
/// Returns the new transform and the local-space offset that must be
/// subtracted from every vertex for the world geometry to stay in place.
pub fn relocate_origin(
    transform: &Matrix4<f64>,
    world_point: &Point3<f64>,
) -> Result<(Matrix4<f64>, Vector3<f64>)> {
    let local = inverse(transform)?.transform_point(world_point).coords;
    Ok((transform * Matrix4::new_translation(&local), local))
}
