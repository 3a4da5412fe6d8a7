//! Quaternion helpers for orientation arithmetic.
//!
//! Rotations are carried as [`nalgebra::Quaternion<f64>`]. Tables throughout the
//! crate are written in the scalar-last `[x, y, z, w]` notation common in the
//! texture-analysis literature, so this module converts between the two and
//! provides the handful of element-wise operations that the symmetry algorithms
//! need but nalgebra does not offer directly.

use nalgebra::{Quaternion, Vector3};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_table_is_scalar_last() {
        let q = from_xyzw(&[0.1, 0.2, 0.3, 0.9]);
        assert_eq!(q.i, 0.1);
        assert_eq!(q.j, 0.2);
        assert_eq!(q.k, 0.3);
        assert_eq!(q.w, 0.9);
        assert_eq!(to_xyzw(&q), [0.1, 0.2, 0.3, 0.9]);
    }

    #[test]
    fn sorted_abs_is_ascending() {
        let q = from_xyzw(&[-0.7, 0.1, -0.3, 0.2]);
        let s = sorted_abs(&q);
        assert_eq!(s, [0.1, 0.2, 0.3, 0.7]);
    }

    #[test]
    fn positive_scalar_flips_whole_quaternion() {
        let q = from_xyzw(&[0.5, -0.5, 0.5, -0.5]);
        let p = with_positive_scalar(q);
        assert_eq!(to_xyzw(&p), [-0.5, 0.5, -0.5, 0.5]);
    }

    #[test]
    fn hamilton_product_of_z_rotations_adds_angles() {
        let half = std::f64::consts::FRAC_PI_8;
        let q = from_xyzw(&[0.0, 0.0, half.sin(), half.cos()]);
        let qq = q * q;
        let quarter = std::f64::consts::FRAC_PI_4;
        assert!((qq.k - quarter.sin()).abs() < 1e-12);
        assert!((qq.w - quarter.cos()).abs() < 1e-12);
    }
}

/// The identity rotation `(0, 0, 0, 1)`.
pub fn identity() -> Quaternion<f64> {
    Quaternion::new(1.0, 0.0, 0.0, 0.0)
}

/// Builds a quaternion from a scalar-last `[x, y, z, w]` table entry.
pub fn from_xyzw(q: &[f64; 4]) -> Quaternion<f64> {
    Quaternion::new(q[3], q[0], q[1], q[2])
}

/// Returns the scalar-last `[x, y, z, w]` components.
pub fn to_xyzw(q: &Quaternion<f64>) -> [f64; 4] {
    [q.i, q.j, q.k, q.w]
}

/// Vector part of the quaternion.
pub fn vector_part(q: &Quaternion<f64>) -> Vector3<f64> {
    Vector3::new(q.i, q.j, q.k)
}

/// Absolute values of all four components, sorted ascending.
pub fn sorted_abs(q: &Quaternion<f64>) -> [f64; 4] {
    let mut c = to_xyzw(q).map(f64::abs);
    c.sort_by(|a, b| a.total_cmp(b));
    c
}

/// Negates the quaternion if its scalar part is negative. Both describe the same rotation.
pub fn with_positive_scalar(q: Quaternion<f64>) -> Quaternion<f64> {
    if q.w < 0.0 {
        -q
    } else {
        q
    }
}

/// Four-dimensional dot product.
pub fn dot(a: &Quaternion<f64>, b: &Quaternion<f64>) -> f64 {
    a.i * b.i + a.j * b.j + a.k * b.k + a.w * b.w
}
