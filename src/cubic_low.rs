//! Cubic low symmetry, Laue class m-3. The twelve proper rotations of the
//! tetrahedral group: identity, the three 2-fold axes and the eight 3-fold rotations.

use std::f64::consts::{FRAC_PI_2, PI};

use nalgebra::Vector3;

use crate::conversions::{self, clamp_unit, AxisAngle};
use crate::cubic;
use crate::laue::{
    calc_rod_nearest_origin, unit_to_byte, HomochoricGrid, LaueOps, Rgb, SymmetryClass,
    ROD_INFINITY as B,
};


pub(crate) const QUAT_SYM: [[f64; 4]; 12] = [
    cubic::QUAT_SYM[0],
    cubic::QUAT_SYM[1],
    cubic::QUAT_SYM[2],
    cubic::QUAT_SYM[3],
    cubic::QUAT_SYM[16],
    cubic::QUAT_SYM[17],
    cubic::QUAT_SYM[18],
    cubic::QUAT_SYM[19],
    cubic::QUAT_SYM[20],
    cubic::QUAT_SYM[21],
    cubic::QUAT_SYM[22],
    cubic::QUAT_SYM[23],
];

const ROD_SYM: [[f64; 3]; 12] = [
    [0.0, 0.0, 0.0],
    [B, 0.0, 0.0],
    [0.0, B, 0.0],
    [0.0, 0.0, B],
    [1.0, 1.0, 1.0],
    [-1.0, -1.0, -1.0],
    [1.0, -1.0, 1.0],
    [-1.0, 1.0, -1.0],
    [-1.0, 1.0, 1.0],
    [1.0, -1.0, -1.0],
    [-1.0, -1.0, 1.0],
    [1.0, 1.0, -1.0],
];

const MAT_SYM: [[[f64; 3]; 3]; 12] = [
    cubic::MAT_SYM[0],
    cubic::MAT_SYM[1],
    cubic::MAT_SYM[2],
    cubic::MAT_SYM[3],
    cubic::MAT_SYM[16],
    cubic::MAT_SYM[17],
    cubic::MAT_SYM[18],
    cubic::MAT_SYM[19],
    cubic::MAT_SYM[20],
    cubic::MAT_SYM[21],
    cubic::MAT_SYM[22],
    cubic::MAT_SYM[23],
];

static GRID: HomochoricGrid = HomochoricGrid {
    init: [0.7536692756333673; 3],
    step: [0.041870515312964846; 3],
    bins: [36; 3],
};

#[derive(Debug, Clone, Copy, Default)]
pub struct CubicLowOps;

impl LaueOps for CubicLowOps {
    fn symmetry_class(&self) -> SymmetryClass {
        SymmetryClass::CubicLow
    }

    fn name(&self) -> &'static str {
        "Cubic m-3"
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
        [&cubic::POLES_001, &cubic::POLES_011, &cubic::POLES_111]
    }

    fn default_pole_figure_names(&self) -> [&'static str; 3] {
        ["Cubic Low <001>", "Cubic Low <011>", "Cubic Low <111>"]
    }

    fn mdf_fz_rod(&self, r: &Vector3<f64>) -> Vector3<f64> {
        let r = calc_rod_nearest_origin(&ROD_SYM, r);
        let ax = conversions::rod_to_axis_angle(&r);
        let mut n = ax.axis.map(f64::abs);
        n.as_mut_slice().sort_by(|a, b| b.total_cmp(a));
        conversions::axis_angle_to_rod(&AxisAngle {
            axis: n,
            angle: ax.angle,
        })
    }

    fn in_unit_triangle(&self, eta: f64, chi: f64) -> bool {
        (0.0..=FRAC_PI_2).contains(&eta) && chi >= 0.0 && chi <= chi_max(eta)
    }

    fn unit_triangle_color(&self, eta: f64, chi: f64) -> Rgb {
        let chi_frac = chi / chi_max(eta);
        let red = 1.0 - chi_frac;
        let mut blue = eta.to_degrees().abs() / 90.0;
        let green = (1.0 - blue) * chi_frac;
        blue *= chi_frac;
        [red, green, blue].map(|c| unit_to_byte(c.max(0.0).sqrt()))
    }
}

/// Upper bound on `chi` of the unit triangle, mirrored about `eta = 45` degrees.
fn chi_max(eta: f64) -> f64 {
    let eta = if eta.to_degrees() > 45.0 { PI / 2.0 - eta } else { eta };
    let t = eta.tan();
    clamp_unit((1.0 / (2.0 + t * t)).sqrt()).acos()
}
