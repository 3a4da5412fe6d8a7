//! Tetragonal low symmetry, Laue class 4/m. A single 4-fold axis along `z`.

use std::f64::consts::FRAC_1_SQRT_2 as R;

use nalgebra::Vector3;

use crate::conversions::{self, AxisAngle};
use crate::laue::{
    calc_rod_nearest_origin, in_polar_triangle, polar_ipf_rgb, HomochoricGrid, LaueOps, Rgb,
    SymmetryClass, ROD_INFINITY as B,
};


const QUAT_SYM: [[f64; 4]; 4] = [
    [0.0, 0.0, 0.0, 1.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, R, -R],
    [0.0, 0.0, R, R],
];

const ROD_SYM: [[f64; 3]; 4] = [
    [0.0, 0.0, 0.0],
    [0.0, 0.0, B],
    [0.0, 0.0, -1.0],
    [0.0, 0.0, 1.0],
];

const MAT_SYM: [[[f64; 3]; 3]; 4] = [
    [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
    [[-1.0, 0.0, 0.0], [0.0, -1.0, 0.0], [0.0, 0.0, 1.0]],
    [[0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]],
    [[0.0, 1.0, 0.0], [-1.0, 0.0, 0.0], [0.0, 0.0, 1.0]],
];

static GRID: HomochoricGrid = HomochoricGrid {
    init: [1.3306700394914688, 1.3306700394914688, 0.38867959478510306],
    step: [0.0369630566525408, 0.0369630566525408, 0.043186621642789226],
    bins: [72, 72, 18],
};

const POLES_001: [[f64; 3]; 1] = [[0.0, 0.0, 1.0]];
const POLES_100: [[f64; 3]; 1] = [[1.0, 0.0, 0.0]];
const POLES_010: [[f64; 3]; 1] = [[0.0, 1.0, 0.0]];

#[derive(Debug, Clone, Copy, Default)]
pub struct TetragonalLowOps;

impl LaueOps for TetragonalLowOps {
    fn symmetry_class(&self) -> SymmetryClass {
        SymmetryClass::TetragonalLow
    }

    fn name(&self) -> &'static str {
        "Tetragonal 4/m"
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
        ["Tetragonal Low <001>", "Tetragonal Low <100>", "Tetragonal Low <010>"]
    }

    fn mdf_fz_rod(&self, r: &Vector3<f64>) -> Vector3<f64> {
        let r = calc_rod_nearest_origin(&ROD_SYM, r);
        let ax = conversions::rod_to_axis_angle(&r);
        conversions::axis_angle_to_rod(&AxisAngle {
            axis: ax.axis.map(f64::abs),
            angle: ax.angle,
        })
    }

    fn in_unit_triangle(&self, eta: f64, chi: f64) -> bool {
        in_polar_triangle(eta, chi, 0.0, 90.0)
    }

    fn unit_triangle_color(&self, eta: f64, chi: f64) -> Rgb {
        polar_ipf_rgb(eta, chi, 0.0, 90.0)
    }
}
