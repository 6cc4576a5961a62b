use nalgebra::{Point3, Vector3};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeometryError {
    #[error("Zero-length vector while computing an angle at {vertex:?}")]
    ZeroLengthVector { vertex: [f64; 3] },
}

/// Cosine of the angle at `v` between the vectors `u - v` and `w - v`.
///
/// # Errors
///
/// Returns [`GeometryError::ZeroLengthVector`] if `u` or `w` coincides with `v`;
/// the angle is undefined and no default is substituted.
pub fn cos_vec(
    u: &Point3<f64>,
    v: &Point3<f64>,
    w: &Point3<f64>,
) -> Result<f64, GeometryError> {
    let a: Vector3<f64> = u - v;
    let b: Vector3<f64> = w - v;
    let denom = a.norm() * b.norm();
    if denom == 0.0 {
        return Err(GeometryError::ZeroLengthVector {
            vertex: [v.x, v.y, v.z],
        });
    }
    Ok((a.dot(&b) / denom).clamp(-1.0, 1.0))
}
