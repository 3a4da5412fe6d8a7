//! Triclinic symmetry, Laue class -1. Only the identity rotation; inversion is
//! still applied when searching the IPF hemisphere.

use nalgebra::Vector3;

use crate::laue::{in_polar_triangle, polar_ipf_rgb, HomochoricGrid, LaueOps, Rgb, SymmetryClass};


const QUAT_SYM: [[f64; 4]; 1] = [[0.0, 0.0, 0.0, 1.0]];

const ROD_SYM: [[f64; 3]; 1] = [[0.0, 0.0, 0.0]];

const MAT_SYM: [[[f64; 3]; 3]; 1] = [[[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]];

static GRID: HomochoricGrid = HomochoricGrid {
    init: [1.3306700394914688; 3],
    step: [0.0369630566525408; 3],
    bins: [72; 3],
};

const POLES_001: [[f64; 3]; 1] = [[0.0, 0.0, 1.0]];
const POLES_100: [[f64; 3]; 1] = [[1.0, 0.0, 0.0]];
const POLES_010: [[f64; 3]; 1] = [[0.0, 1.0, 0.0]];

#[derive(Debug, Clone, Copy, Default)]
pub struct TriclinicOps;

impl LaueOps for TriclinicOps {
    fn symmetry_class(&self) -> SymmetryClass {
        SymmetryClass::Triclinic
    }

    fn name(&self) -> &'static str {
        "Triclinic -1"
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
        ["Triclinic <001>", "Triclinic <100>", "Triclinic <010>"]
    }

    fn mdf_fz_rod(&self, r: &Vector3<f64>) -> Vector3<f64> {
        *r
    }

    fn in_unit_triangle(&self, eta: f64, chi: f64) -> bool {
        in_polar_triangle(eta, chi, -180.0, 180.0)
    }

    fn unit_triangle_color(&self, eta: f64, chi: f64) -> Rgb {
        polar_ipf_rgb(eta, chi, -180.0, 180.0)
    }
}
