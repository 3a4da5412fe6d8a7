//! Trigonal low symmetry, Laue class -3. A single 3-fold axis along `z`.

use nalgebra::Vector3;

use crate::laue::{
    fold_about_c_axis, in_polar_triangle, polar_ipf_rgb, HomochoricGrid, LaueOps, Rgb,
    SymmetryClass,
};


const SQRT3_2: f64 = 0.8660254037844386;

const QUAT_SYM: [[f64; 4]; 3] = [
    [0.0, 0.0, 0.0, 1.0],
    [0.0, 0.0, SQRT3_2, 0.5],
    [0.0, 0.0, SQRT3_2, -0.5],
];

const ROD_SYM: [[f64; 3]; 3] = [
    [0.0, 0.0, 0.0],
    [0.0, 0.0, 1.7320508075688772],
    [0.0, 0.0, -1.7320508075688772],
];

const MAT_SYM: [[[f64; 3]; 3]; 3] = [
    [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
    [[-0.5, SQRT3_2, 0.0], [-SQRT3_2, -0.5, 0.0], [0.0, 0.0, 1.0]],
    [[-0.5, -SQRT3_2, 0.0], [SQRT3_2, -0.5, 0.0], [0.0, 0.0, 1.0]],
];

static GRID: HomochoricGrid = HomochoricGrid {
    init: [1.3306700394914688, 1.3306700394914688, 0.5141039000234375],
    step: [0.0369630566525408, 0.0369630566525408, 0.042841991668619794],
    bins: [72, 72, 24],
};

const POLES_0001: [[f64; 3]; 1] = [[0.0, 0.0, 1.0]];
const POLES_M1M120: [[f64; 3]; 1] = [[-0.5, SQRT3_2, 0.0]];
const POLES_2M1M10: [[f64; 3]; 1] = [[1.0, 0.0, 0.0]];

#[derive(Debug, Clone, Copy, Default)]
pub struct TrigonalLowOps;

impl LaueOps for TrigonalLowOps {
    fn symmetry_class(&self) -> SymmetryClass {
        SymmetryClass::TrigonalLow
    }

    fn name(&self) -> &'static str {
        "Trigonal -3"
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
        [&POLES_0001, &POLES_M1M120, &POLES_2M1M10]
    }

    fn default_pole_figure_names(&self) -> [&'static str; 3] {
        ["<0001>", "<-1-120>", "<2-1-10>"]
    }

    fn mdf_fz_rod(&self, r: &Vector3<f64>) -> Vector3<f64> {
        fold_about_c_axis(&ROD_SYM, r, 60.0)
    }

    fn in_unit_triangle(&self, eta: f64, chi: f64) -> bool {
        in_polar_triangle(eta, chi, -120.0, 0.0)
    }

    fn unit_triangle_color(&self, eta: f64, chi: f64) -> Rgb {
        polar_ipf_rgb(eta, chi, -120.0, 0.0)
    }
}
