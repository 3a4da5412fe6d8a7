//! Hexagonal high symmetry, Laue class 6/mmm.
//!
//! A 6-fold axis along `z` with six 2-fold axes in the basal plane, every 30
//! degrees from `x`. The slip table holds the basal and prismatic `<a>` systems
//! and is shared with the 6/m class.

use image::{Rgba, RgbaImage};
use nalgebra::{Quaternion, Vector3};

use crate::color::WHITE;
use crate::laue::{
    fold_about_c_axis, in_polar_triangle, polar_ipf_rgb, HomochoricGrid, LaueOps, Rgb,
    SchmidFactor, SymmetryClass, ROD_INFINITY as B,
};
use crate::orientation::Euler;
use crate::slip::SlipSystems;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversions::{self, AxisAngle};
    use crate::laue::{calc_rod_nearest_origin, homochoric_extent};
    use crate::quaternion;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_3, FRAC_PI_6, PI};

    #[test]
    fn matrix_table_matches_quaternions() {
        for (i, q) in QUAT_SYM.iter().enumerate() {
            let expected = conversions::quat_to_mat(&quaternion::from_xyzw(q));
            assert!((expected - HexagonalOps.mat_sym_op(i)).abs().max() < 1e-12, "op {}", i);
        }
    }

    #[test]
    fn rodrigues_table_matches_quaternions() {
        for (q, r) in QUAT_SYM.iter().zip(ROD_SYM.iter()) {
            if q[3].abs() > 1e-9 {
                for i in 0..3 {
                    assert!((q[i] / q[3] - r[i]).abs() < 1e-12, "{:?} {:?}", q, r);
                }
            }
        }
    }

    #[test]
    fn grid_matches_homochoric_extent() {
        assert!((GRID.init[0] - homochoric_extent(FRAC_PI_2)).abs() < 1e-12);
        assert!((GRID.init[2] - homochoric_extent(FRAC_PI_6)).abs() < 1e-12);
        for i in 0..3 {
            assert!((GRID.step[i] * GRID.bins[i] as f64 - 2.0 * GRID.init[i]).abs() < 1e-12);
        }
    }

    #[test]
    fn sixth_turn_and_basal_diad_are_symmetric() {
        let q1 = conversions::euler_to_quat(&Euler::new(0.3, 0.9, 1.7));
        let sixth = conversions::axis_angle_to_quat(&AxisAngle::new(Vector3::z(), FRAC_PI_3));
        let diad = conversions::axis_angle_to_quat(&AxisAngle::new(
            Vector3::new(FRAC_PI_6.cos(), FRAC_PI_6.sin(), 0.0),
            PI,
        ));
        assert!(HexagonalOps.miso_quat(&q1, &(q1 * sixth)).angle < 1e-6);
        assert!(HexagonalOps.miso_quat(&q1, &(q1 * diad)).angle < 1e-6);
    }

    #[test]
    fn mdf_fold_lands_in_first_sector() {
        let r = Vector3::<f64>::new(-0.2, 0.35, -0.1);
        let fz = HexagonalOps.mdf_fz_rod(&r);
        let azimuth = fz.y.atan2(fz.x).to_degrees();
        assert!(fz.z >= 0.0, "{:?}", fz);
        assert!((-1e-9..=30.0 + 1e-9).contains(&azimuth), "azimuth {}", azimuth);
        assert!((fz.norm() - calc_rod_nearest_origin(&ROD_SYM, &r).norm()).abs() < 1e-9);
    }

    #[test]
    fn ipf_z_is_red_and_every_direction_matches() {
        let identity = Euler::new(0.0, 0.0, 0.0);
        assert_eq!(
            HexagonalOps.generate_ipf_color(&identity, &Vector3::z(), false).rgb(),
            Some([255, 0, 0])
        );
        let e = Euler::new(0.3, 1.2, 2.0);
        for dir in [Vector3::x(), Vector3::y(), Vector3::new(-1.0, 2.0, -0.5)] {
            assert!(HexagonalOps.generate_ipf_color(&e, &dir, false).rgb().is_some());
        }
    }

    #[test]
    fn load_along_c_resolves_no_shear() {
        let sf = HexagonalOps.schmid_factor_and_ss(&Vector3::z());
        assert_eq!(sf.factor, 0.0);
        let sf = HexagonalOps.schmid_factor_and_ss(&Vector3::new(0.0, 1.0, 1.0));
        assert!((sf.factor - 0.5).abs() < 1e-12, "{}", sf.factor);
        assert_eq!(sf.slip_system, 1);
    }

    #[test]
    fn legend_whites_out_beyond_the_sector() {
        let legend = HexagonalOps.generate_ipf_triangle_legend(40).unwrap();
        assert_eq!(legend.dimensions(), (40, 40));
        assert_eq!(*legend.get_pixel(39, 0), WHITE);
        assert_ne!(*legend.get_pixel(1, 39), WHITE);
    }
}

pub(crate) const SQRT3_2: f64 = 0.8660254037844386;
const TAN_30: f64 = 0.5773502691896258;
const SQRT3: f64 = 1.7320508075688772;

pub(crate) static QUAT_SYM: [[f64; 4]; 12] = [
    [0.0, 0.0, 0.0, 1.0],
    [0.0, 0.0, 0.5, SQRT3_2],
    [0.0, 0.0, SQRT3_2, 0.5],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, SQRT3_2, -0.5],
    [0.0, 0.0, 0.5, -SQRT3_2],
    [1.0, 0.0, 0.0, 0.0],
    [SQRT3_2, 0.5, 0.0, 0.0],
    [0.5, SQRT3_2, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [-0.5, SQRT3_2, 0.0, 0.0],
    [-SQRT3_2, 0.5, 0.0, 0.0],
];

const ROD_SYM: [[f64; 3]; 12] = [
    [0.0, 0.0, 0.0],
    [0.0, 0.0, TAN_30],
    [0.0, 0.0, SQRT3],
    [0.0, 0.0, B],
    [0.0, 0.0, -SQRT3],
    [0.0, 0.0, -TAN_30],
    [B, 0.0, 0.0],
    [SQRT3_2 * B, 0.5 * B, 0.0],
    [0.5 * B, SQRT3_2 * B, 0.0],
    [0.0, B, 0.0],
    [-0.5 * B, SQRT3_2 * B, 0.0],
    [-SQRT3_2 * B, 0.5 * B, 0.0],
];

pub(crate) static MAT_SYM: [[[f64; 3]; 3]; 12] = [
    [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
    [[0.5, SQRT3_2, 0.0], [-SQRT3_2, 0.5, 0.0], [0.0, 0.0, 1.0]],
    [[-0.5, SQRT3_2, 0.0], [-SQRT3_2, -0.5, 0.0], [0.0, 0.0, 1.0]],
    [[-1.0, 0.0, 0.0], [0.0, -1.0, 0.0], [0.0, 0.0, 1.0]],
    [[-0.5, -SQRT3_2, 0.0], [SQRT3_2, -0.5, 0.0], [0.0, 0.0, 1.0]],
    [[0.5, -SQRT3_2, 0.0], [SQRT3_2, 0.5, 0.0], [0.0, 0.0, 1.0]],
    [[1.0, 0.0, 0.0], [0.0, -1.0, 0.0], [0.0, 0.0, -1.0]],
    [[0.5, SQRT3_2, 0.0], [SQRT3_2, -0.5, 0.0], [0.0, 0.0, -1.0]],
    [[-0.5, SQRT3_2, 0.0], [SQRT3_2, 0.5, 0.0], [0.0, 0.0, -1.0]],
    [[-1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, -1.0]],
    [[-0.5, -SQRT3_2, 0.0], [-SQRT3_2, 0.5, 0.0], [0.0, 0.0, -1.0]],
    [[0.5, -SQRT3_2, 0.0], [-SQRT3_2, -0.5, 0.0], [0.0, 0.0, -1.0]],
];

static GRID: HomochoricGrid = HomochoricGrid {
    init: [0.7536692756333673, 0.7536692756333673, 0.26060550051600867],
    step: [0.041870515312964846, 0.041870515312964846, 0.04343425008600144],
    bins: [36, 36, 12],
};

const POLES_0001: [[f64; 3]; 1] = [[0.0, 0.0, 1.0]];
const POLES_1010: [[f64; 3]; 3] = [[SQRT3_2, 0.5, 0.0], [0.0, 1.0, 0.0], [-SQRT3_2, 0.5, 0.0]];
const POLES_1120: [[f64; 3]; 3] = [[1.0, 0.0, 0.0], [0.5, SQRT3_2, 0.0], [-0.5, SQRT3_2, 0.0]];

/// Basal and prismatic `<a>` slip, in orthonormal hexagonal axes.
pub(crate) static SLIP: SlipSystems = SlipSystems {
    directions: &[
        [SQRT3_2, -0.5, 0.0],
        [0.0, 1.0, 0.0],
        [-SQRT3_2, -0.5, 0.0],
        [SQRT3_2, -0.5, 0.0],
        [0.0, 1.0, 0.0],
        [-SQRT3_2, -0.5, 0.0],
    ],
    planes: &[
        [0.0, 0.0, 1.0],
        [0.0, 0.0, 1.0],
        [0.0, 0.0, 1.0],
        [0.5, SQRT3_2, 0.0],
        [1.0, 0.0, 0.0],
        [-0.5, SQRT3_2, 0.0],
    ],
};

#[derive(Debug, Clone, Copy, Default)]
pub struct HexagonalOps;

impl LaueOps for HexagonalOps {
    fn symmetry_class(&self) -> SymmetryClass {
        SymmetryClass::Hexagonal
    }

    fn name(&self) -> &'static str {
        "Hexagonal 6/mmm"
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
        [&POLES_0001, &POLES_1010, &POLES_1120]
    }

    fn default_pole_figure_names(&self) -> [&'static str; 3] {
        ["Hex <0001>", "Hex <1010>", "Hex <1120>"]
    }

    fn mdf_fz_rod(&self, r: &Vector3<f64>) -> Vector3<f64> {
        fold_about_c_axis(&ROD_SYM, r, 30.0)
    }

    fn in_unit_triangle(&self, eta: f64, chi: f64) -> bool {
        in_polar_triangle(eta, chi, 0.0, 30.0)
    }

    fn unit_triangle_color(&self, eta: f64, chi: f64) -> Rgb {
        polar_ipf_rgb(eta, chi, 0.0, 30.0)
    }

    fn schmid_factor_and_ss(&self, load: &Vector3<f64>) -> SchmidFactor {
        SLIP.schmid_factor(load)
    }

    fn m_prime(&self, q1: &Quaternion<f64>, q2: &Quaternion<f64>, ld: &Vector3<f64>) -> f64 {
        SLIP.m_prime(q1, q2, ld)
    }

    fn f1(&self, q1: &Quaternion<f64>, q2: &Quaternion<f64>, ld: &Vector3<f64>, max_sf: bool) -> f64 {
        SLIP.f1(q1, q2, ld, max_sf)
    }

    fn f1spt(&self, q1: &Quaternion<f64>, q2: &Quaternion<f64>, ld: &Vector3<f64>, max_sf: bool) -> f64 {
        SLIP.f1spt(q1, q2, ld, max_sf)
    }

    fn f7(&self, q1: &Quaternion<f64>, q2: &Quaternion<f64>, ld: &Vector3<f64>, max_sf: bool) -> f64 {
        SLIP.f7(q1, q2, ld, max_sf)
    }

    /// Renders the 30 degree sector between `<0001>`, `<10-10>` and `<2-1-10>`
    /// in stereographic projection. Pixels outside it are white.
    fn generate_ipf_triangle_legend(&self, image_dim: usize) -> Option<RgbaImage> {
        let mut image = RgbaImage::new(image_dim as u32, image_dim as u32);
        let step = 1.0 / image_dim as f64;
        let identity = Euler::new(0.0, 0.0, 0.0);

        for y_index in 0..image_dim {
            let y_scan_line = image_dim - 1 - y_index;
            for x_index in 0..image_dim {
                let x = (x_index as f64 + 0.5) * step;
                let y = (y_index as f64 + 0.5) * step;
                let rr = x * x + y * y;
                let pixel = if rr > 1.0 || y > x * TAN_30 {
                    WHITE
                } else {
                    let p = Vector3::new(2.0 * x, 2.0 * y, 1.0 - rr) / (1.0 + rr);
                    let [r, g, b] = self
                        .generate_ipf_color(&identity, &p, false)
                        .rgb_or([255, 255, 255]);
                    Rgba([r, g, b, 255])
                };
                image.put_pixel(x_index as u32, y_scan_line as u32, pixel);
            }
        }
        Some(image)
    }
}
