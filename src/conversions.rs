//! Conversions between orientation representations.
//!
//! All rotations here are *passive* (sample frame to crystal frame) and follow the
//! Bunge `(phi1, Phi, phi2)` Euler convention. The representations covered are:
//! - Euler angles ([`Euler`])
//! - unit quaternions (`nalgebra::Quaternion<f64>`, scalar part `w`)
//! - orientation matrices (`Matrix3<f64>`)
//! - axis-angle pairs ([`AxisAngle`])
//! - Rodrigues vectors `tan(w/2) * n`
//! - homochoric vectors `(3/4 (w - sin w))^(1/3) * n`
//!
//! Every function is pure and guards its own numeric degeneracies: `acos`
//! arguments are clamped, and zero-length axes fall back to `(0, 0, 1)`.

use std::f64::consts::{PI, TAU};

use nalgebra::{Matrix3, Quaternion, Vector3};

use crate::orientation::Euler;
use crate::quaternion;


/// A rotation angle (radians) about a unit axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisAngle {
    pub axis: Vector3<f64>,
    pub angle: f64,
}

impl AxisAngle {
    /// Creates an axis-angle pair, normalising the axis. A zero axis becomes `(0, 0, 1)`.
    pub fn new(axis: Vector3<f64>, angle: f64) -> Self {
        Self {
            axis: unit_or_z(axis),
            angle,
        }
    }
}

/// Normalises `v`, substituting `(0, 0, 1)` when it has no length.
pub fn unit_or_z(v: Vector3<f64>) -> Vector3<f64> {
    let norm = v.norm();
    if norm == 0.0 || !norm.is_finite() {
        Vector3::z()
    } else {
        v / norm
    }
}

/// Clamps a cosine into the domain of `acos`.
pub fn clamp_unit(x: f64) -> f64 {
    x.clamp(-1.0, 1.0)
}

pub fn euler_to_quat(e: &Euler) -> Quaternion<f64> {
    let (s, c) = (e.phi * 0.5).sin_cos();
    let (s1, c1) = ((e.phi1 - e.phi2) * 0.5).sin_cos();
    let (s2, c2) = ((e.phi1 + e.phi2) * 0.5).sin_cos();
    quaternion::from_xyzw(&[s * c1, s * s1, c * s2, c * c2])
}

/// Recovers Bunge angles from a quaternion. Angles are returned in `[0, 2pi)`.
pub fn quat_to_euler(q: &Quaternion<f64>) -> Euler {
    let diff = (-q.j).atan2(-q.i);
    let sum = (-q.k).atan2(-q.w);
    let phi1 = (diff + sum + TAU).rem_euclid(TAU);
    let phi = 2.0 * (q.k * q.k + q.w * q.w).sqrt().min(1.0).acos();
    let phi2 = (sum - diff + TAU).rem_euclid(TAU);
    Euler::new(phi1, phi, phi2)
}

/// Passive orientation matrix of a unit quaternion.
pub fn quat_to_mat(q: &Quaternion<f64>) -> Matrix3<f64> {
    let (x, y, z, w) = (q.i, q.j, q.k, q.w);
    Matrix3::new(
        1.0 - 2.0 * y * y - 2.0 * z * z,
        2.0 * x * y + 2.0 * z * w,
        2.0 * x * z - 2.0 * y * w,
        2.0 * x * y - 2.0 * z * w,
        1.0 - 2.0 * x * x - 2.0 * z * z,
        2.0 * y * z + 2.0 * x * w,
        2.0 * x * z + 2.0 * y * w,
        2.0 * y * z - 2.0 * x * w,
        1.0 - 2.0 * x * x - 2.0 * y * y,
    )
}

/// Bunge orientation matrix `g`, mapping sample directions into the crystal frame.
pub fn euler_to_mat(e: &Euler) -> Matrix3<f64> {
    let (s1, c1) = e.phi1.sin_cos();
    let (s, c) = e.phi.sin_cos();
    let (s2, c2) = e.phi2.sin_cos();
    Matrix3::new(
        c1 * c2 - s1 * s2 * c,
        s1 * c2 + c1 * s2 * c,
        s2 * s,
        -c1 * s2 - s1 * c2 * c,
        -s1 * s2 + c1 * c2 * c,
        c2 * s,
        s1 * s,
        -c1 * s,
        c,
    )
}

/// Recovers Bunge angles from an orientation matrix. When `Phi` is 0 or pi the
/// split between `phi1` and `phi2` is arbitrary and all of it is put in `phi1`.
pub fn mat_to_euler(g: &Matrix3<f64>) -> Euler {
    let phi = clamp_unit(g[(2, 2)]).acos();
    if phi.sin().abs() < 1e-12 {
        let phi1 = g[(0, 1)].atan2(g[(0, 0)]).rem_euclid(TAU);
        return Euler::new(phi1, phi, 0.0);
    }
    let phi1 = g[(2, 0)].atan2(-g[(2, 1)]).rem_euclid(TAU);
    let phi2 = g[(0, 2)].atan2(g[(1, 2)]).rem_euclid(TAU);
    Euler::new(phi1, phi, phi2)
}

/// Converts a quaternion to its shortest-rotation axis-angle pair (`angle <= pi`).
pub fn quat_to_axis_angle(q: &Quaternion<f64>) -> AxisAngle {
    let qw = clamp_unit(q.w);
    let mut angle = 2.0 * qw.acos();
    let s = (1.0 - qw * qw).sqrt();
    let mut axis = if s == 0.0 {
        Vector3::z()
    } else {
        unit_or_z(quaternion::vector_part(q))
    };
    if angle > PI {
        angle = TAU - angle;
        axis = -axis;
    }
    AxisAngle { axis, angle }
}

pub fn axis_angle_to_quat(ax: &AxisAngle) -> Quaternion<f64> {
    let n = unit_or_z(ax.axis);
    let (s, c) = (ax.angle * 0.5).sin_cos();
    Quaternion::new(c, n.x * s, n.y * s, n.z * s)
}

pub fn axis_angle_to_rod(ax: &AxisAngle) -> Vector3<f64> {
    unit_or_z(ax.axis) * (ax.angle * 0.5).tan()
}

/// Active rotation matrix about `ax.axis` by `ax.angle`.
pub fn axis_angle_to_mat(ax: &AxisAngle) -> Matrix3<f64> {
    let n = unit_or_z(ax.axis);
    let (s, c) = ax.angle.sin_cos();
    let t = 1.0 - c;
    Matrix3::new(
        t * n.x * n.x + c,
        t * n.x * n.y - n.z * s,
        t * n.x * n.z + n.y * s,
        t * n.x * n.y + n.z * s,
        t * n.y * n.y + c,
        t * n.y * n.z - n.x * s,
        t * n.x * n.z - n.y * s,
        t * n.y * n.z + n.x * s,
        t * n.z * n.z + c,
    )
}

pub fn axis_angle_to_homochoric(ax: &AxisAngle) -> Vector3<f64> {
    let magnitude = (0.75 * (ax.angle - ax.angle.sin())).cbrt();
    unit_or_z(ax.axis) * magnitude
}

pub fn rod_to_axis_angle(r: &Vector3<f64>) -> AxisAngle {
    let rmag = r.norm();
    if rmag == 0.0 {
        return AxisAngle {
            axis: Vector3::z(),
            angle: 0.0,
        };
    }
    AxisAngle {
        axis: r / rmag,
        angle: 2.0 * rmag.atan(),
    }
}

pub fn rod_to_quat(r: &Vector3<f64>) -> Quaternion<f64> {
    axis_angle_to_quat(&rod_to_axis_angle(r))
}

pub fn quat_to_rod(q: &Quaternion<f64>) -> Vector3<f64> {
    axis_angle_to_rod(&quat_to_axis_angle(q))
}

pub fn rod_to_euler(r: &Vector3<f64>) -> Euler {
    quat_to_euler(&rod_to_quat(r))
}

pub fn euler_to_rod(e: &Euler) -> Vector3<f64> {
    quat_to_rod(&euler_to_quat(e))
}

pub fn rod_to_homochoric(r: &Vector3<f64>) -> Vector3<f64> {
    let ax = rod_to_axis_angle(r);
    if ax.angle == 0.0 {
        return Vector3::zeros();
    }
    axis_angle_to_homochoric(&ax)
}

/// Inverts the homochoric map by Newton iteration on `w - sin w = 4/3 |h|^3`.
pub fn homochoric_to_rod(h: &Vector3<f64>) -> Vector3<f64> {
    let hmag = h.norm();
    if hmag == 0.0 {
        return Vector3::zeros();
    }
    let x = (4.0 / 3.0) * hmag.powi(3);
    let mut w = 2.0 * hmag;
    for _ in 0..20 {
        let slope = -1.0 + w.cos();
        if slope == 0.0 {
            break;
        }
        let delta = (x - w + w.sin()) / slope;
        w -= delta;
        if delta.abs() < 1e-14 {
            break;
        }
    }
    let w = w.clamp(0.0, PI);
    (h / hmag) * (w * 0.5).tan()
}

/// Angle between two orientation matrices, ignoring crystal symmetry.
pub fn matrix_misorientation(g1: &Matrix3<f64>, g2: &Matrix3<f64>) -> f64 {
    let trace = g1.component_mul(g2).sum();
    clamp_unit((trace - 1.0) / 2.0).acos()
}

/// Expresses direction `n` in the frame rotated by `q`, returning a unit vector.
pub fn change_axis_reference_frame(q: &Quaternion<f64>, n: &Vector3<f64>) -> Vector3<f64> {
    unit_or_z(quat_to_mat(q) * n)
}
