//! Trigonal high symmetry, Laue class -3m.
//!
//! A 3-fold axis along `z` with three 2-fold axes in the basal plane at 0, 120
//! and 240 degrees from `x`.

use nalgebra::Vector3;

use crate::laue::{
    fold_about_c_axis, in_polar_triangle, polar_ipf_rgb, unit_to_byte, HomochoricGrid, LaueOps,
    Rgb, SymmetryClass, ROD_INFINITY as B,
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversions::{self, AxisAngle};
    use crate::laue::homochoric_extent;
    use crate::orientation::Euler;
    use crate::quaternion;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_3, PI};

    #[test]
    fn matrix_table_matches_quaternions() {
        for (i, q) in QUAT_SYM.iter().enumerate() {
            let expected = conversions::quat_to_mat(&quaternion::from_xyzw(q));
            assert!((expected - TrigonalOps.mat_sym_op(i)).abs().max() < 1e-12, "op {}", i);
        }
    }

    #[test]
    fn grid_matches_homochoric_extent() {
        assert!((GRID.init[0] - homochoric_extent(FRAC_PI_2)).abs() < 1e-12);
        assert!((GRID.init[2] - homochoric_extent(FRAC_PI_3)).abs() < 1e-12);
        assert!((GRID.step[2] * GRID.bins[2] as f64 - 2.0 * GRID.init[2]).abs() < 1e-12);
    }

    #[test]
    fn diad_at_120_degrees_is_symmetric() {
        let q1 = conversions::euler_to_quat(&Euler::new(1.0, 0.5, 0.25));
        let axis = Vector3::new((2.0 * FRAC_PI_3).cos(), (2.0 * FRAC_PI_3).sin(), 0.0);
        let diad = conversions::axis_angle_to_quat(&AxisAngle::new(axis, PI));
        assert!(TrigonalOps.miso_quat(&q1, &(q1 * diad)).angle < 1e-6);
        let sixth = conversions::axis_angle_to_quat(&AxisAngle::new(Vector3::z(), FRAC_PI_3));
        assert!(TrigonalOps.miso_quat(&q1, &(q1 * sixth)).angle > 0.5);
    }

    #[test]
    fn mdf_fold_lands_in_first_sector() {
        let fz = TrigonalOps.mdf_fz_rod(&Vector3::new(-0.3, -0.1, -0.2));
        let azimuth = fz.y.atan2(fz.x).to_degrees();
        assert!(fz.z >= 0.0, "{:?}", fz);
        assert!((-1e-9..=60.0 + 1e-9).contains(&azimuth), "azimuth {}", azimuth);
    }

    #[test]
    fn rodrigues_colour_scales_each_axis_by_its_own_extent() {
        assert_eq!(TrigonalOps.generate_rodrigues_color(&Vector3::zeros()), [127, 127, 127]);
        let corner = Vector3::from(GRID.init);
        assert_eq!(TrigonalOps.generate_rodrigues_color(&corner), [255, 255, 255]);
    }

    #[test]
    fn ipf_finds_a_match_for_any_direction() {
        let e = Euler::new(0.3, 1.2, 2.0);
        for dir in [Vector3::x(), Vector3::y(), Vector3::z(), Vector3::new(-1.0, 2.0, -0.5)] {
            assert!(TrigonalOps.generate_ipf_color(&e, &dir, false).rgb().is_some());
        }
    }
}

const SQRT3_2: f64 = 0.8660254037844386;

const QUAT_SYM: [[f64; 4]; 6] = [
    [0.0, 0.0, 0.0, 1.0],
    [0.0, 0.0, SQRT3_2, 0.5],
    [0.0, 0.0, SQRT3_2, -0.5],
    [1.0, 0.0, 0.0, 0.0],
    [-0.5, SQRT3_2, 0.0, 0.0],
    [-0.5, -SQRT3_2, 0.0, 0.0],
];

const ROD_SYM: [[f64; 3]; 6] = [
    [0.0, 0.0, 0.0],
    [0.0, 0.0, 1.7320508075688772],
    [0.0, 0.0, -1.7320508075688772],
    [B, 0.0, 0.0],
    [-0.5 * B, SQRT3_2 * B, 0.0],
    [-0.5 * B, -SQRT3_2 * B, 0.0],
];

const MAT_SYM: [[[f64; 3]; 3]; 6] = [
    [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
    [[-0.5, SQRT3_2, 0.0], [-SQRT3_2, -0.5, 0.0], [0.0, 0.0, 1.0]],
    [[-0.5, -SQRT3_2, 0.0], [SQRT3_2, -0.5, 0.0], [0.0, 0.0, 1.0]],
    [[1.0, 0.0, 0.0], [0.0, -1.0, 0.0], [0.0, 0.0, -1.0]],
    [[-0.5, -SQRT3_2, 0.0], [-SQRT3_2, 0.5, 0.0], [0.0, 0.0, -1.0]],
    [[-0.5, SQRT3_2, 0.0], [SQRT3_2, 0.5, 0.0], [0.0, 0.0, -1.0]],
];

static GRID: HomochoricGrid = HomochoricGrid {
    init: [0.7536692756333673, 0.7536692756333673, 0.5141039000234375],
    step: [0.041870515312964846, 0.041870515312964846, 0.042841991668619794],
    bins: [36, 36, 24],
};

const POLES_0001: [[f64; 3]; 1] = [[0.0, 0.0, 1.0]];
const POLES_0M110: [[f64; 3]; 1] = [[0.0, -1.0, 0.0]];
const POLES_1M100: [[f64; 3]; 1] = [[SQRT3_2, -0.5, 0.0]];

#[derive(Debug, Clone, Copy, Default)]
pub struct TrigonalOps;

impl LaueOps for TrigonalOps {
    fn symmetry_class(&self) -> SymmetryClass {
        SymmetryClass::Trigonal
    }

    fn name(&self) -> &'static str {
        "Trigonal -3m"
    }

    fn quat_sym(&self) -> &'static [[f64; 4]] {
        &QUAT_SYM
    }

    fn rod_sym(&self) -> &'static [[f64; 3]] {
        &ROD_SYM
    }

    fn mat_sym(&self) -> &'static [[[f64; 3]; 3]] {
        &MAT_SYM
    }

    fn homochoric_grid(&self) -> &'static HomochoricGrid {
        &GRID
    }

    fn pole_directions(&self) -> [&'static [[f64; 3]]; 3] {
        [&POLES_0001, &POLES_0M110, &POLES_1M100]
    }

    fn default_pole_figure_names(&self) -> [&'static str; 3] {
        ["<0001>", "<0-110>", "<1-100>"]
    }

    fn mdf_fz_rod(&self, r: &Vector3<f64>) -> Vector3<f64> {
        fold_about_c_axis(&ROD_SYM, r, 60.0)
    }

    fn in_unit_triangle(&self, eta: f64, chi: f64) -> bool {
        in_polar_triangle(eta, chi, -90.0, -30.0)
    }

    fn unit_triangle_color(&self, eta: f64, chi: f64) -> Rgb {
        polar_ipf_rgb(eta, chi, -90.0, -30.0)
    }

    /// Each Rodrigues component is scaled by the grid extent along its own axis.
    fn generate_rodrigues_color(&self, r: &Vector3<f64>) -> Rgb {
        let max = GRID.init;
        std::array::from_fn(|i| unit_to_byte((r[i] + max[i]) / (2.0 * max[i])))
    }
}
