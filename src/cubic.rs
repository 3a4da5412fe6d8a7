//! Cubic high symmetry, Laue class m-3m.
//!
//! Besides the tables this class carries the extra operations that only exist
//! for cubic materials:
//! - closed-form disorientation
//! - {111}<110> slip-system analysis (Schmid factor, m', F1, F1spt, F7)
//! - the 001-011-111 IPF legend
//! - disorientation colouring in HSV space

use std::f64::consts::{FRAC_1_SQRT_2, FRAC_PI_2, FRAC_PI_4, FRAC_PI_8, PI, SQRT_2, TAU};

use image::{Rgba, RgbaImage};
use nalgebra::{Quaternion, Vector3};

use crate::color::{hsv_to_rgb, WHITE};
use crate::conversions::{self, clamp_unit, unit_or_z, AxisAngle};
use crate::laue::{
    calc_rod_nearest_origin, normalized_rgb, unit_to_byte, HomochoricGrid, LaueOps, Rgb,
    SchmidFactor, SymmetryClass, DEGENERATE_ANGLE, ROD_INFINITY as B,
};
use crate::orientation::Euler;
use crate::quaternion;
use crate::slip::SlipSystems;


const R: f64 = FRAC_1_SQRT_2;
const H: f64 = 0.5;
const S3: f64 = 0.5773502691896258;

pub(crate) const QUAT_SYM: [[f64; 4]; 24] = [
    [0.0, 0.0, 0.0, 1.0],
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [R, 0.0, 0.0, R],
    [0.0, R, 0.0, R],
    [0.0, 0.0, R, R],
    [-R, 0.0, 0.0, R],
    [0.0, -R, 0.0, R],
    [0.0, 0.0, -R, R],
    [R, R, 0.0, 0.0],
    [-R, R, 0.0, 0.0],
    [0.0, R, R, 0.0],
    [0.0, -R, R, 0.0],
    [R, 0.0, R, 0.0],
    [-R, 0.0, R, 0.0],
    [H, H, H, H],
    [-H, -H, -H, H],
    [H, -H, H, H],
    [-H, H, -H, H],
    [-H, H, H, H],
    [H, -H, -H, H],
    [-H, -H, H, H],
    [H, H, -H, H],
];

pub(crate) const ROD_SYM: [[f64; 3]; 24] = [
    [0.0, 0.0, 0.0],
    [B, 0.0, 0.0],
    [0.0, B, 0.0],
    [0.0, 0.0, B],
    [1.0, 0.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, 0.0, 1.0],
    [-1.0, 0.0, 0.0],
    [0.0, -1.0, 0.0],
    [0.0, 0.0, -1.0],
    [B, B, 0.0],
    [-B, B, 0.0],
    [0.0, B, B],
    [0.0, -B, B],
    [B, 0.0, B],
    [-B, 0.0, B],
    [1.0, 1.0, 1.0],
    [-1.0, -1.0, -1.0],
    [1.0, -1.0, 1.0],
    [-1.0, 1.0, -1.0],
    [-1.0, 1.0, 1.0],
    [1.0, -1.0, -1.0],
    [-1.0, -1.0, 1.0],
    [1.0, 1.0, -1.0],
];

pub(crate) const MAT_SYM: [[[f64; 3]; 3]; 24] = [
    [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
    [[1.0, 0.0, 0.0], [0.0, -1.0, 0.0], [0.0, 0.0, -1.0]],
    [[-1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, -1.0]],
    [[-1.0, 0.0, 0.0], [0.0, -1.0, 0.0], [0.0, 0.0, 1.0]],
    [[1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, -1.0, 0.0]],
    [[0.0, 0.0, -1.0], [0.0, 1.0, 0.0], [1.0, 0.0, 0.0]],
    [[0.0, 1.0, 0.0], [-1.0, 0.0, 0.0], [0.0, 0.0, 1.0]],
    [[1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]],
    [[0.0, 0.0, 1.0], [0.0, 1.0, 0.0], [-1.0, 0.0, 0.0]],
    [[0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]],
    [[0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]],
    [[0.0, -1.0, 0.0], [-1.0, 0.0, 0.0], [0.0, 0.0, -1.0]],
    [[-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]],
    [[-1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, -1.0, 0.0]],
    [[0.0, 0.0, 1.0], [0.0, -1.0, 0.0], [1.0, 0.0, 0.0]],
    [[0.0, 0.0, -1.0], [0.0, -1.0, 0.0], [-1.0, 0.0, 0.0]],
    [[0.0, 1.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0, 0.0]],
    [[0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
    [[0.0, 0.0, 1.0], [-1.0, 0.0, 0.0], [0.0, -1.0, 0.0]],
    [[0.0, -1.0, 0.0], [0.0, 0.0, -1.0], [1.0, 0.0, 0.0]],
    [[0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
    [[0.0, -1.0, 0.0], [0.0, 0.0, 1.0], [-1.0, 0.0, 0.0]],
    [[0.0, 1.0, 0.0], [0.0, 0.0, -1.0], [-1.0, 0.0, 0.0]],
    [[0.0, 0.0, -1.0], [1.0, 0.0, 0.0], [0.0, -1.0, 0.0]],
];

/// Half-widths are the homochoric extent of a `pi/4` rotation.
pub(crate) static GRID: HomochoricGrid = HomochoricGrid {
    init: [0.38867959478510306; 3],
    step: [0.043186621642789226; 3],
    bins: [18; 3],
};

pub(crate) const POLES_001: [[f64; 3]; 3] = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

pub(crate) const POLES_011: [[f64; 3]; 6] = [
    [R, R, 0.0],
    [R, 0.0, R],
    [0.0, R, R],
    [-R, -R, 0.0],
    [-R, 0.0, R],
    [0.0, -R, R],
];

pub(crate) const POLES_111: [[f64; 3]; 4] = [
    [S3, S3, S3],
    [-S3, S3, S3],
    [S3, -S3, S3],
    [S3, S3, -S3],
];

/// {111}<110> slip systems.
static SLIP: SlipSystems = SlipSystems {
    directions: &SLIP_DIRECTIONS,
    planes: &SLIP_PLANES,
};

const SLIP_DIRECTIONS: [[f64; 3]; 12] = [
    [0.0, 1.0, -1.0],
    [1.0, 0.0, -1.0],
    [1.0, -1.0, 0.0],
    [1.0, -1.0, 0.0],
    [1.0, 0.0, 1.0],
    [0.0, 1.0, 1.0],
    [1.0, 1.0, 0.0],
    [0.0, 1.0, 1.0],
    [1.0, 0.0, -1.0],
    [1.0, 1.0, 0.0],
    [1.0, 0.0, 1.0],
    [0.0, 1.0, -1.0],
];

const SLIP_PLANES: [[f64; 3]; 12] = [
    [1.0, 1.0, 1.0],
    [1.0, 1.0, 1.0],
    [1.0, 1.0, 1.0],
    [1.0, 1.0, -1.0],
    [1.0, 1.0, -1.0],
    [1.0, 1.0, -1.0],
    [1.0, -1.0, 1.0],
    [1.0, -1.0, 1.0],
    [1.0, -1.0, 1.0],
    [-1.0, 1.0, 1.0],
    [-1.0, 1.0, 1.0],
    [-1.0, 1.0, 1.0],
];

/// Cubic m-3m operations.
#[derive(Debug, Clone, Copy, Default)]
pub struct CubicOps;

impl LaueOps for CubicOps {
    fn symmetry_class(&self) -> SymmetryClass {
        SymmetryClass::Cubic
    }

    fn name(&self) -> &'static str {
        "Cubic m-3m"
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
        [&POLES_001, &POLES_011, &POLES_111]
    }

    fn default_pole_figure_names(&self) -> [&'static str; 3] {
        ["<001>", "<011>", "<111>"]
    }

    /// Closed-form disorientation.
    ///
    /// **Context**: The largest scalar part over all 24 symmetry equivalents of
    /// `conj(q2) * q1` is always one of three candidates built from the sorted
    /// absolute components, so the full search is unnecessary.
    ///
    /// **How it Works**: Sorts `|x|, |y|, |z|, |w|` ascending, takes the largest of
    /// `w`, `(z + w)/sqrt(2)` and `(x + y + z + w)/2`, and builds the matching
    /// rotation axis from the same sorted components.
    fn miso_quat(&self, q1: &Quaternion<f64>, q2: &Quaternion<f64>) -> AxisAngle {
        let qr = q2.conjugate() * q1;
        let [x, y, z, w] = quaternion::sorted_abs(&qr);

        let mut wmin = w;
        let mut kind = 1;
        let candidate = (z + w) / SQRT_2;
        if candidate > wmin {
            wmin = candidate;
            kind = 2;
        }
        let candidate = (x + y + z + w) * 0.5;
        if candidate > wmin {
            wmin = candidate;
            kind = 3;
        }

        let half = clamp_unit(wmin).acos();
        let angle = 2.0 * half;
        let s = half.sin();
        if s == 0.0 || angle < DEGENERATE_ANGLE {
            return AxisAngle {
                axis: Vector3::z(),
                angle,
            };
        }
        let axis = match kind {
            1 => Vector3::new(x, y, z),
            2 => Vector3::new((x - y) / SQRT_2, (x + y) / SQRT_2, (z - w) / SQRT_2),
            _ => Vector3::new(
                (x - y + z - w) * 0.5,
                (x + y - z - w) * 0.5,
                (-x + y + z - w) * 0.5,
            ),
        };
        AxisAngle {
            axis: unit_or_z(axis / s),
            angle,
        }
    }

    fn mdf_fz_rod(&self, r: &Vector3<f64>) -> Vector3<f64> {
        let r = calc_rod_nearest_origin(&ROD_SYM[..12], r);
        let ax = conversions::rod_to_axis_angle(&r);
        let mut n = ax.axis.map(f64::abs);
        n.as_mut_slice().sort_by(|a, b| b.total_cmp(a));
        conversions::axis_angle_to_rod(&AxisAngle {
            axis: n,
            angle: ax.angle,
        })
    }

    fn in_unit_triangle(&self, eta: f64, chi: f64) -> bool {
        (0.0..=FRAC_PI_4).contains(&eta) && chi >= 0.0 && chi <= chi_max(eta)
    }

    fn unit_triangle_color(&self, eta: f64, chi: f64) -> Rgb {
        let chi_frac = chi / chi_max(eta);
        let red = 1.0 - chi_frac;
        let mut blue = eta.to_degrees().abs() / 45.0;
        let green = (1.0 - blue) * chi_frac;
        blue *= chi_frac;
        normalized_rgb([red, green, blue])
    }

    fn generate_rodrigues_color(&self, r: &Vector3<f64>) -> Rgb {
        let max = GRID.init;
        std::array::from_fn(|i| unit_to_byte((r[i] + max[i]) / (2.0 * max[i])))
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

    /// Renders the 001-011-111 standard triangle. Pixels outside it are white.
    fn generate_ipf_triangle_legend(&self, image_dim: usize) -> Option<RgbaImage> {
        let mut image = RgbaImage::new(image_dim as u32, image_dim as u32);
        let dim = image_dim as f64;
        let (index_step, index_offset) = (0.414 / dim, 0.207 / dim);
        let root_half = 0.5_f64.sqrt();
        let euler = Euler::new(0.0, 0.0, 0.0);

        for y_index in 0..image_dim {
            let y_scan_line = image_dim - 1 - y_index;
            for x_index in 0..image_dim {
                let x = x_index as f64 * index_step + index_offset;
                let y = y_index as f64 * index_step + index_offset;
                let a = x * x + y * y + 1.0;
                let b = 2.0 * x * x + 2.0 * y * y;
                let c = x * x + y * y - 1.0;
                let val = (-b + (b * b - 4.0 * a * c).sqrt()) / (2.0 * a);
                let p = Vector3::new((1.0 + val) * x, (1.0 + val) * y, val).normalize();

                let phi = clamp_unit(-p.x * root_half + p.z * root_half).acos();
                let x_alt = p.x / root_half;
                let x_alt = x_alt / (x_alt * x_alt + p.y * p.y).sqrt();
                let theta = clamp_unit(x_alt).acos();

                let outside = phi < FRAC_PI_4
                    || phi > FRAC_PI_2
                    || theta > 35.26_f64.to_radians();
                let pixel = if outside {
                    WHITE
                } else {
                    let mut cd = [p.x.abs(), p.y.abs(), p.z.abs()];
                    cd.sort_by(|a, b| a.total_cmp(b));
                    let [r, g, b] = self
                        .generate_ipf_color(&euler, &Vector3::from(cd), false)
                        .rgb_or([255, 255, 255]);
                    Rgba([r, g, b, 255])
                };
                image.put_pixel(x_index as u32, y_scan_line as u32, pixel);
            }
        }
        Some(image)
    }

    /// Colours the disorientation between `q` and `reference` (Patala and Schuh,
    /// equations c9.1 to c9.8).
    ///
    /// **How it Works**: The disorientation axis is folded into the standard
    /// zone, scaled to a Rodrigues vector and mapped through a sequence of
    /// warps onto an HSV cone, which is converted to RGB and rotated.
    fn generate_misorientation_color(&self, q: &Quaternion<f64>, reference: &Quaternion<f64>) -> Rgb {
        let tan_eighth = FRAC_PI_8.tan();
        let cos_eighth = FRAC_PI_8.cos();
        let (sin_3eighth, cos_3eighth) = (3.0 * FRAC_PI_8).sin_cos();

        let ax = self.miso_quat(q, reference);
        let mut n = ax.axis.map(f64::abs);
        n.as_mut_slice().sort_by(|a, b| b.total_cmp(a));

        // c9.1
        let k = (ax.angle / 2.0).tan();
        let (x, y, z) = (n.x * k, n.y * k, n.z * k);

        // c9.2
        let (x1, mut y1, mut z1) = (x, y, z);
        if x >= 1.0 / 3.0 && y != 0.0 && z.atan2(y) >= (1.0 - 2.0 * x) / x {
            y1 = (x * (y + z)) / (1.0 - x);
            z1 = (x * z * (y + z)) / (y * (1.0 - x));
        }

        // c9.3
        let x2 = x1 - tan_eighth;
        let y2 = y1 * cos_3eighth - z1 * sin_3eighth;
        let z2 = y1 * sin_3eighth + z1 * cos_3eighth;

        // c9.4
        let x3 = x2;
        let y3 = if z2 == 0.0 {
            y2
        } else {
            y2 * (1.0 + (y2 / z2) * tan_eighth)
        };
        let z3 = z2 + y2 * tan_eighth;

        // c9.5
        let x4 = x3;
        let y4 = (y3 * cos_eighth) / tan_eighth;
        let z4 = z3 - x3 / cos_eighth;

        // c9.6
        let k = (-x4).atan2(y4);
        let scale = k.sin() + k.cos().abs();
        let (x5, y5, z5) = (x4 * scale, y4 * scale, z4);

        // c9.7
        let k = (-x5).atan2(y5);
        let rho = (x5 * x5 + y5 * y5).sqrt();
        let (x6, y6, z6) = (-rho * (2.0 * k).sin(), rho * (2.0 * k).cos(), z5);

        // c9.8
        let sqrt3 = 3.0_f64.sqrt();
        let x7 = (x6 * sqrt3 - y6) / (2.0 * tan_eighth);
        let y7 = (x6 + y6 * sqrt3) / (2.0 * tan_eighth);
        let z7 = z6 * (cos_eighth / tan_eighth);

        let h = (y7.atan2(x7) + TAU) % TAU / TAU;
        let mut s = (x7 * x7 + y7 * y7).sqrt();
        let v = z7;
        if v > 0.0 {
            s /= v;
        }
        let [red, green, blue] = hsv_to_rgb(h, s, v);
        [255 - green, blue, red]
    }
}

/// Upper bound on `chi` of the standard triangle at azimuth `eta`.
fn chi_max(eta: f64) -> f64 {
    let eta = if eta.to_degrees() > 45.0 { PI / 2.0 - eta } else { eta };
    let t = eta.tan();
    clamp_unit((1.0 / (2.0 + t * t)).sqrt()).acos()
}
