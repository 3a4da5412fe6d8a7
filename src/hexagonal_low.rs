//! Hexagonal low symmetry, Laue class 6/m. A single 6-fold axis along `z`.

use nalgebra::{Quaternion, Vector3};

use crate::hexagonal::{self, SQRT3_2};
use crate::laue::{
    fold_about_c_axis, in_polar_triangle, polar_ipf_rgb, HomochoricGrid, LaueOps, Rgb,
    SchmidFactor, SymmetryClass, ROD_INFINITY as B,
};


const ROD_SYM: [[f64; 3]; 6] = [
    [0.0, 0.0, 0.0],
    [0.0, 0.0, 0.5773502691896258],
    [0.0, 0.0, 1.7320508075688772],
    [0.0, 0.0, B],
    [0.0, 0.0, -1.7320508075688772],
    [0.0, 0.0, -0.5773502691896258],
];

static GRID: HomochoricGrid = HomochoricGrid {
    init: [1.3306700394914688, 1.3306700394914688, 0.26060550051600867],
    step: [0.0369630566525408, 0.0369630566525408, 0.04343425008600144],
    bins: [72, 72, 12],
};

const POLES_0001: [[f64; 3]; 1] = [[0.0, 0.0, 1.0]];
const POLES_11M20: [[f64; 3]; 1] = [[-0.5, SQRT3_2, 0.0]];
const POLES_2M1M10: [[f64; 3]; 1] = [[1.0, 0.0, 0.0]];

#[derive(Debug, Clone, Copy, Default)]
pub struct HexagonalLowOps;

impl LaueOps for HexagonalLowOps {
    fn symmetry_class(&self) -> SymmetryClass {
        SymmetryClass::HexagonalLow
    }

    fn name(&self) -> &'static str {
        "Hexagonal 6/m"
    }

    /// The rotations about `c`, which lead the 6/mmm table.
    fn quat_sym(&self) -> &'static [[f64; 4]] {
        &hexagonal::QUAT_SYM[..6]
    }

    fn rod_sym(&self) -> &'static [[f64; 3]] {
        &ROD_SYM
    }

    fn mat_sym(&self) -> &'static [[[f64; 3]; 3]] {
        &hexagonal::MAT_SYM[..6]
    }

    fn homochoric_grid(&self) -> &'static HomochoricGrid {
        &GRID
    }

    fn pole_directions(&self) -> [&'static [[f64; 3]]; 3] {
        [&POLES_0001, &POLES_11M20, &POLES_2M1M10]
    }

    fn default_pole_figure_names(&self) -> [&'static str; 3] {
        ["<0001>", "<11-20>", "<2-1-10>"]
    }

    fn mdf_fz_rod(&self, r: &Vector3<f64>) -> Vector3<f64> {
        fold_about_c_axis(&ROD_SYM, r, 30.0)
    }

    fn in_unit_triangle(&self, eta: f64, chi: f64) -> bool {
        in_polar_triangle(eta, chi, 0.0, 60.0)
    }

    fn unit_triangle_color(&self, eta: f64, chi: f64) -> Rgb {
        polar_ipf_rgb(eta, chi, 0.0, 60.0)
    }

    fn schmid_factor_and_ss(&self, load: &Vector3<f64>) -> SchmidFactor {
        hexagonal::SLIP.schmid_factor(load)
    }

    fn m_prime(&self, q1: &Quaternion<f64>, q2: &Quaternion<f64>, ld: &Vector3<f64>) -> f64 {
        hexagonal::SLIP.m_prime(q1, q2, ld)
    }

    fn f1(&self, q1: &Quaternion<f64>, q2: &Quaternion<f64>, ld: &Vector3<f64>, max_sf: bool) -> f64 {
        hexagonal::SLIP.f1(q1, q2, ld, max_sf)
    }

    fn f1spt(&self, q1: &Quaternion<f64>, q2: &Quaternion<f64>, ld: &Vector3<f64>, max_sf: bool) -> f64 {
        hexagonal::SLIP.f1spt(q1, q2, ld, max_sf)
    }

    fn f7(&self, q1: &Quaternion<f64>, q2: &Quaternion<f64>, ld: &Vector3<f64>, max_sf: bool) -> f64 {
        hexagonal::SLIP.f7(q1, q2, ld, max_sf)
    }
}
