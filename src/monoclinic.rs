//! Monoclinic symmetry, Laue class 2/m, with the 2-fold axis along `y`.

use nalgebra::Vector3;

use crate::conversions::{self, AxisAngle};
use crate::laue::{
    calc_rod_nearest_origin, in_polar_triangle, polar_ipf_rgb, HomochoricGrid, LaueOps, Rgb,
    SymmetryClass, ROD_INFINITY as B,
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::laue::homochoric_extent;
    use crate::orientation::Euler;
    use crate::quaternion;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn matrix_table_matches_quaternions() {
        for (i, q) in QUAT_SYM.iter().enumerate() {
            let expected = conversions::quat_to_mat(&quaternion::from_xyzw(q));
            assert!((expected - MonoclinicOps.mat_sym_op(i)).abs().max() < 1e-12, "op {}", i);
        }
    }

    #[test]
    fn grid_matches_homochoric_extent() {
        assert!((GRID.init[0] - homochoric_extent(PI)).abs() < 1e-12);
        assert!((GRID.init[1] - homochoric_extent(FRAC_PI_2)).abs() < 1e-12);
    }

    #[test]
    fn half_turn_about_y_is_symmetric() {
        let q1 = conversions::euler_to_quat(&Euler::new(0.7, 0.1, 2.5));
        let q2 = q1 * quaternion::from_xyzw(&[0.0, 1.0, 0.0, 0.0]);
        assert!(MonoclinicOps.miso_quat(&q1, &q2).angle < 1e-6);
    }

    #[test]
    fn mdf_fold_points_axis_along_positive_y() {
        let r = Vector3::<f64>::new(0.2, -0.3, 0.1);
        let fz = MonoclinicOps.mdf_fz_rod(&r);
        assert!(fz.y >= 0.0, "{:?}", fz);
        assert!((fz.norm() - r.norm()).abs() < 1e-12);
    }

    #[test]
    fn ipf_z_is_red() {
        let rgb = MonoclinicOps.generate_ipf_color(&Euler::new(0.0, 0.0, 0.0), &Vector3::z(), false);
        assert_eq!(rgb.rgb(), Some([255, 0, 0]));
    }
}

const QUAT_SYM: [[f64; 4]; 2] = [[0.0, 0.0, 0.0, 1.0], [0.0, 1.0, 0.0, 0.0]];

const ROD_SYM: [[f64; 3]; 2] = [[0.0, 0.0, 0.0], [0.0, B, 0.0]];

const MAT_SYM: [[[f64; 3]; 3]; 2] = [
    [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
    [[-1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, -1.0]],
];

static GRID: HomochoricGrid = HomochoricGrid {
    init: [1.3306700394914688, 0.7536692756333673, 1.3306700394914688],
    step: [0.0369630566525408, 0.041870515312964846, 0.0369630566525408],
    bins: [72, 36, 72],
};

const POLES_001: [[f64; 3]; 1] = [[0.0, 0.0, 1.0]];
const POLES_100: [[f64; 3]; 1] = [[1.0, 0.0, 0.0]];
const POLES_010: [[f64; 3]; 1] = [[0.0, 1.0, 0.0]];

#[derive(Debug, Clone, Copy, Default)]
pub struct MonoclinicOps;

impl LaueOps for MonoclinicOps {
    fn symmetry_class(&self) -> SymmetryClass {
        SymmetryClass::Monoclinic
    }

    fn name(&self) -> &'static str {
        "Monoclinic 2/m"
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
        [&POLES_001, &POLES_100, &POLES_010]
    }

    fn default_pole_figure_names(&self) -> [&'static str; 3] {
        ["<001>", "<100>", "<010>"]
    }

    fn mdf_fz_rod(&self, r: &Vector3<f64>) -> Vector3<f64> {
        let r = calc_rod_nearest_origin(&ROD_SYM, r);
        let ax = conversions::rod_to_axis_angle(&r);
        let axis = if ax.axis.y < 0.0 { -ax.axis } else { ax.axis };
        conversions::axis_angle_to_rod(&AxisAngle {
            axis,
            angle: ax.angle,
        })
    }

    fn in_unit_triangle(&self, eta: f64, chi: f64) -> bool {
        in_polar_triangle(eta, chi, 0.0, 180.0)
    }

    fn unit_triangle_color(&self, eta: f64, chi: f64) -> Rgb {
        polar_ipf_rgb(eta, chi, 0.0, 180.0)
    }
}
