//! Crystal symmetry operations shared by every Laue class.
//!
//! A Laue class is described by the [`LaueOps`] trait. Each supported class is a
//! zero-sized struct in its own module holding immutable operator tables, while
//! [`SymmetryClass`] is the closed set of classes used for configuration and
//! dispatch.
//!
//! The trait's default methods hold the algorithms that only differ between
//! classes through their tables:
//! - exhaustive misorientation search over the symmetry operators
//! - nearest-origin fundamental zone reduction in Rodrigues space
//! - nearest-quaternion and fundamental-zone quaternion selection
//! - homochoric ODF/MDF binning and its inverse
//! - unit-triangle search for IPF colouring
//! - pole direction generation for pole figures
//!
//! Classes override what is genuinely class specific: the secondary MDF fold,
//! the unit triangle and its colouring, and (for cubic and hexagonal) slip-system
//! analysis.

use std::f64::consts::FRAC_PI_2;
use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Result};
use image::RgbaImage;
use nalgebra::{Matrix3, Quaternion, Vector3};
use rand::{Rng, RngCore};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::conversions::{self, clamp_unit, unit_or_z, AxisAngle};
use crate::cubic::CubicOps;
use crate::cubic_low::CubicLowOps;
use crate::hexagonal::HexagonalOps;
use crate::hexagonal_low::HexagonalLowOps;
use crate::monoclinic::MonoclinicOps;
use crate::orientation::Euler;
use crate::orthorhombic::OrthoRhombicOps;
use crate::pole_figure::{self, PoleFigure, PoleFigureConfig};
use crate::quaternion;
use crate::tetragonal_low::TetragonalLowOps;
use crate::triclinic::TriclinicOps;
use crate::trigonal::TrigonalOps;
use crate::trigonal_low::TrigonalLowOps;

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use std::f64::consts::PI;
    use rand::SeedableRng;

    #[test]
    fn homochoric_bin_is_clamped() {
        let grid = TriclinicOps.homochoric_grid();
        assert_eq!(grid.bin(&Vector3::new(-10.0, -10.0, -10.0)), 0);
        assert_eq!(grid.bin(&Vector3::new(10.0, 10.0, 10.0)), grid.num_bins() - 1);
    }

    #[test]
    fn decode_inverts_flat_index() {
        let grid = CubicOps.homochoric_grid();
        let choose = 3 + 18 * 5 + 18 * 18 * 7;
        assert_eq!(grid.decode(choose), [3, 5, 7]);
    }

    #[test]
    fn sampled_cell_bins_back_to_itself() {
        let mut rng = StdRng::seed_from_u64(3);
        for class in SymmetryClass::ALL {
            let grid = class.ops().homochoric_grid();
            for choose in [0, 17, grid.num_bins() / 2, grid.num_bins() - 1] {
                let h = grid.sample_cell(choose, &mut rng);
                assert_eq!(grid.bin(&h), choose, "{} cell {}", class, choose);
            }
        }
    }

    #[test]
    fn parse_class_names() {
        assert_eq!("cubic".parse::<SymmetryClass>().unwrap(), SymmetryClass::Cubic);
        assert_eq!(
            "Trigonal_Low".parse::<SymmetryClass>().unwrap(),
            SymmetryClass::TrigonalLow
        );
        assert_eq!("6/mmm".parse::<SymmetryClass>().unwrap(), SymmetryClass::Hexagonal);
        assert_eq!("Hexagonal-Low".parse::<SymmetryClass>().unwrap(), SymmetryClass::HexagonalLow);
        assert_eq!("-3m".parse::<SymmetryClass>().unwrap(), SymmetryClass::Trigonal);
        assert_eq!("mmm".parse::<SymmetryClass>().unwrap(), SymmetryClass::OrthoRhombic);
        assert!("tetragonal".parse::<SymmetryClass>().is_err());
    }

    #[test]
    fn display_names_parse_back() {
        for class in SymmetryClass::ALL {
            let short = class.to_string().split_whitespace().last().unwrap_or_default().to_string();
            assert_eq!(short.parse::<SymmetryClass>().unwrap(), class, "{}", class);
        }
    }

    #[test]
    fn crystal_structure_ids() {
        assert_eq!(SymmetryClass::from_crystal_structure(1).unwrap(), SymmetryClass::Cubic);
        assert_eq!(
            SymmetryClass::from_crystal_structure(9).unwrap(),
            SymmetryClass::TrigonalLow
        );
        assert_eq!(
            SymmetryClass::from_crystal_structure(0).unwrap(),
            SymmetryClass::Hexagonal
        );
        assert_eq!(
            SymmetryClass::from_crystal_structure(10).unwrap(),
            SymmetryClass::Trigonal
        );
        assert!(SymmetryClass::from_crystal_structure(8).is_err());
        assert!(SymmetryClass::from_crystal_structure(999).is_err());
        for class in SymmetryClass::ALL {
            let id = class.crystal_structure();
            assert_eq!(SymmetryClass::from_crystal_structure(id).unwrap(), class);
        }
    }

    #[test]
    fn sphere_coords_modes_agree() {
        let eulers: Vec<Euler> = (0..2500)
            .map(|i| Euler::new(0.01 * i as f64, 0.02 * i as f64, 0.03 * i as f64))
            .collect();
        for class in SymmetryClass::ALL {
            let ops = class.ops();
            let seq = ops.generate_sphere_coords_from_eulers(&eulers, ExecutionMode::Sequential);
            let par = ops.generate_sphere_coords_from_eulers(&eulers, ExecutionMode::Parallel);
            assert_eq!(seq, par, "{}", class);
            for (family, dirs) in seq.families.iter().zip(ops.pole_directions()) {
                assert_eq!(family.len(), eulers.len() * dirs.len() * 2);
            }
        }
    }

    #[test]
    fn schmid_overload_finds_aligned_system() {
        // load at 45 degrees to both plane normal and direction
        let load = Vector3::<f64>::new(1.0, 0.0, 1.0);
        let plane = Vector3::<f64>::new(0.0, 0.0, 1.0);
        let direction = Vector3::<f64>::new(1.0, 0.0, 0.0);
        for class in SymmetryClass::ALL {
            let sf = class.ops().schmid_factor_for_system(&load, &plane, &direction);
            assert!((sf.factor - 0.5).abs() < 1e-12, "{}: {}", class, sf.factor);
            assert!((sf.angle_comps[0] - PI / 4.0).abs() < 1e-9);
        }
    }

    #[test]
    fn randomized_euler_angles_are_equivalent() {
        let mut rng = StdRng::seed_from_u64(5);
        let euler = Euler::new(0.4, 1.1, 2.3);
        let q = conversions::euler_to_quat(&euler);
        for class in SymmetryClass::ALL {
            let ops = class.ops();
            let mut moved = false;
            for _ in 0..20 {
                let other = ops.randomize_euler_angles(&mut rng, &euler);
                let angle = ops.miso_quat(&q, &conversions::euler_to_quat(&other)).angle;
                assert!(angle < 1e-6, "{}: misorientation {}", class, angle);
                moved |= (other.phi1 - euler.phi1).abs() > 1e-6
                    || (other.phi - euler.phi).abs() > 1e-6
                    || (other.phi2 - euler.phi2).abs() > 1e-6;
            }
            if ops.num_sym_ops() > 1 {
                assert!(moved, "{} never left the identity", class);
            }
        }
    }

    #[test]
    fn polar_colour_corners() {
        assert_eq!(polar_ipf_rgb(0.0, 0.0, 0.0, 90.0), [255, 0, 0]);
        let [r, g, b] = polar_ipf_rgb(0.0, PI / 2.0, 0.0, 90.0);
        assert_eq!((r, g, b), (0, 255, 0));
        let [r, g, b] = polar_ipf_rgb(PI / 2.0, PI / 2.0, 0.0, 90.0);
        assert_eq!((r, g, b), (0, 0, 255));
    }

    #[test]
    fn azimuth_fold_reflects_odd_sectors() {
        assert!((fold_azimuth(30.0, 60.0) - 30.0).abs() < 1e-12);
        assert!((fold_azimuth(70.0, 60.0) - 50.0).abs() < 1e-12);
        assert!((fold_azimuth(130.0, 60.0) - 10.0).abs() < 1e-12);
        assert!((fold_azimuth(-10.0, 60.0) - 10.0).abs() < 1e-12);
    }
}

/// Misorientations below this angle (radians) report the default axis `(0, 0, 1)`.
pub const DEGENERATE_ANGLE: f64 = 1e-6;

/// Rodrigues magnitude standing in for infinity in operator tables (180 degree rotations).
pub const ROD_INFINITY: f64 = 1e10;

/// An 8-bit RGB triple.
pub type Rgb = [u8; 3];

/// Selects between sequential and rayon-partitioned execution of the bulk kernels.
/// Both modes run the same per-partition code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    Sequential,
    #[default]
    Parallel,
}

impl From<bool> for ExecutionMode {
    fn from(parallel: bool) -> Self {
        if parallel {
            ExecutionMode::Parallel
        } else {
            ExecutionMode::Sequential
        }
    }
}

/// Number of orientations handled by one parallel partition.
pub const PARTITION_SIZE: usize = 1024;

/// Equal-volume binning of homochoric space for ODF/MDF histograms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HomochoricGrid {
    /// Half-width of the binned cube along each axis.
    pub init: [f64; 3],
    /// Bin width along each axis.
    pub step: [f64; 3],
    pub bins: [usize; 3],
}

impl HomochoricGrid {
    pub fn num_bins(&self) -> usize {
        self.bins.iter().product()
    }

    /// Flat bin index of a homochoric vector. Out-of-range coordinates clamp to the edge bins.
    pub fn bin(&self, h: &Vector3<f64>) -> usize {
        let b: [usize; 3] = std::array::from_fn(|i| {
            let raw = ((h[i] + self.init[i]) / self.step[i]) as isize;
            raw.clamp(0, self.bins[i] as isize - 1) as usize
        });
        self.bins[0] * self.bins[1] * b[2] + self.bins[0] * b[1] + b[0]
    }

    /// Splits a flat bin index into per-axis indices.
    pub fn decode(&self, choose: usize) -> [usize; 3] {
        [
            choose % self.bins[0],
            (choose / self.bins[0]) % self.bins[1],
            choose / (self.bins[0] * self.bins[1]),
        ]
    }

    /// Draws a homochoric vector uniformly from inside bin `choose`.
    pub fn sample_cell(&self, choose: usize, rng: &mut dyn RngCore) -> Vector3<f64> {
        let phi = self.decode(choose);
        Vector3::from_fn(|i, _| {
            let u: f64 = rng.random();
            self.step[i] * phi[i] as f64 + self.step[i] * u - self.init[i]
        })
    }
}

/// Homochoric half-width for a rotation angle `a`: `(3/4 (a - sin a))^(1/3)`.
pub fn homochoric_extent(a: f64) -> f64 {
    (0.75 * (a - a.sin())).cbrt()
}

/// Best Schmid factor found and the slip system that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SchmidFactor {
    pub factor: f64,
    /// Angles (radians) between the load and the plane normal, and the load and the slip direction.
    pub angle_comps: [f64; 2],
    pub slip_system: usize,
}

/// Outcome of the unit-triangle search for an IPF colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpfColor {
    InTriangle(Rgb),
    /// No symmetry-equivalent direction fell inside the unit triangle.
    NoMatch,
}

impl IpfColor {
    pub fn rgb(self) -> Option<Rgb> {
        match self {
            IpfColor::InTriangle(rgb) => Some(rgb),
            IpfColor::NoMatch => None,
        }
    }

    pub fn rgb_or(self, fallback: Rgb) -> Rgb {
        self.rgb().unwrap_or(fallback)
    }
}

/// Symmetry-equivalent pole directions on the unit sphere, one vector list per family.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SphereCoords {
    pub families: [Vec<Vector3<f64>>; 3],
}

/// The operations of one Laue class.
pub trait LaueOps: Send + Sync {
    fn symmetry_class(&self) -> SymmetryClass;

    fn name(&self) -> &'static str;

    fn has_inversion(&self) -> bool {
        true
    }

    /// Operator table as scalar-last quaternions. Entry 0 is the identity.
    fn quat_sym(&self) -> &'static [[f64; 4]];

    /// The same operators as Rodrigues vectors, index-aligned with [`LaueOps::quat_sym`].
    fn rod_sym(&self) -> &'static [[f64; 3]];

    /// The same operators as passive rotation matrices, index-aligned with [`LaueOps::quat_sym`].
    fn mat_sym(&self) -> &'static [[[f64; 3]; 3]];

    fn homochoric_grid(&self) -> &'static HomochoricGrid;

    /// Crystal directions whose symmetry equivalents make up each pole figure.
    fn pole_directions(&self) -> [&'static [[f64; 3]]; 3];

    fn default_pole_figure_names(&self) -> [&'static str; 3];

    fn num_sym_ops(&self) -> usize {
        self.quat_sym().len()
    }

    fn quat_sym_op(&self, i: usize) -> Quaternion<f64> {
        quaternion::from_xyzw(&self.quat_sym()[i])
    }

    fn rod_sym_op(&self, i: usize) -> Vector3<f64> {
        Vector3::from(self.rod_sym()[i])
    }

    fn mat_sym_op(&self, i: usize) -> Matrix3<f64> {
        mat_from_rows(&self.mat_sym()[i])
    }

    /// Minimum-angle misorientation between two orientations.
    fn miso_quat(&self, q1: &Quaternion<f64>, q2: &Quaternion<f64>) -> AxisAngle {
        self.miso_quat_exhaustive(q1, q2)
    }

    /// Misorientation by trying every symmetry operator in turn.
    fn miso_quat_exhaustive(&self, q1: &Quaternion<f64>, q2: &Quaternion<f64>) -> AxisAngle {
        calc_miso_quat(self.quat_sym(), q1, q2)
    }

    /// Reduces a Rodrigues vector into the orientation fundamental zone.
    fn odf_fz_rod(&self, r: &Vector3<f64>) -> Vector3<f64> {
        calc_rod_nearest_origin(self.rod_sym(), r)
    }

    /// Reduces a misorientation Rodrigues vector into the misorientation fundamental zone.
    fn mdf_fz_rod(&self, r: &Vector3<f64>) -> Vector3<f64>;

    /// The symmetry equivalent of `q2` closest to `q1`, with non-negative scalar part.
    fn nearest_quat(&self, q1: &Quaternion<f64>, q2: &Quaternion<f64>) -> Quaternion<f64> {
        calc_nearest_quat(self.quat_sym(), q1, q2)
    }

    /// The symmetry equivalent of `q` with the smallest rotation angle.
    fn fz_quat(&self, q: &Quaternion<f64>) -> Quaternion<f64> {
        calc_quat_nearest_origin(self.quat_sym(), q)
    }

    fn miso_bin(&self, r: &Vector3<f64>) -> usize {
        self.homochoric_grid().bin(&conversions::rod_to_homochoric(r))
    }

    fn odf_bin(&self, r: &Vector3<f64>) -> usize {
        self.homochoric_grid().bin(&conversions::rod_to_homochoric(r))
    }

    /// A random orientation from ODF bin `choose`, reduced to the fundamental zone.
    fn determine_euler_angles(&self, rng: &mut dyn RngCore, choose: usize) -> Euler {
        let h = self.homochoric_grid().sample_cell(choose, rng);
        let r = self.odf_fz_rod(&conversions::homochoric_to_rod(&h));
        conversions::rod_to_euler(&r)
    }

    /// A random misorientation from MDF bin `choose`, reduced to the misorientation fundamental zone.
    fn determine_rodrigues_vector(&self, rng: &mut dyn RngCore, choose: usize) -> Vector3<f64> {
        let h = self.homochoric_grid().sample_cell(choose, rng);
        self.mdf_fz_rod(&conversions::homochoric_to_rod(&h))
    }

    /// Replaces an orientation by a randomly chosen symmetry equivalent.
    fn randomize_euler_angles(&self, rng: &mut dyn RngCore, euler: &Euler) -> Euler {
        let op = rng.random_range(0..self.num_sym_ops());
        let q = conversions::euler_to_quat(euler) * self.quat_sym_op(op);
        conversions::quat_to_euler(&q)
    }

    /// Whether the direction `(eta, chi)` lies in this class's standard stereographic triangle.
    fn in_unit_triangle(&self, eta: f64, chi: f64) -> bool;

    /// Colour of a direction already inside the unit triangle.
    fn unit_triangle_color(&self, eta: f64, chi: f64) -> Rgb;

    /// IPF colour of the crystal direction parallel to the sample direction `ref_dir`.
    fn generate_ipf_color(&self, euler: &Euler, ref_dir: &Vector3<f64>, degrees: bool) -> IpfColor {
        if ref_dir.norm() == 0.0 {
            return IpfColor::NoMatch;
        }
        let q = conversions::euler_to_quat(&euler.to_radians(degrees));
        for i in 0..self.num_sym_ops() {
            let g = conversions::quat_to_mat(&(q * self.quat_sym_op(i)));
            let mut p = (g * ref_dir).normalize();
            if p.z < 0.0 {
                if !self.has_inversion() {
                    continue;
                }
                p = -p;
            }
            let chi = clamp_unit(p.z).acos();
            let eta = p.y.atan2(p.x);
            if self.in_unit_triangle(eta, chi) {
                return IpfColor::InTriangle(self.unit_triangle_color(eta, chi));
            }
        }
        IpfColor::NoMatch
    }

    /// Linear colour ramp over the Rodrigues components, scaled by the homochoric grid extent.
    fn generate_rodrigues_color(&self, r: &Vector3<f64>) -> Rgb {
        let max = self.homochoric_grid().init;
        let scaled: [f64; 3] = std::array::from_fn(|i| (r[i] + max[i]) / (2.0 * max[i]));
        [
            unit_to_byte(scaled[0] / max[0]),
            unit_to_byte(scaled[1] / max[0]),
            unit_to_byte(scaled[2] / max[1]),
        ]
    }

    /// Schmid factor for the class's own slip systems. Classes without slip systems report zero.
    fn schmid_factor_and_ss(&self, _load: &Vector3<f64>) -> SchmidFactor {
        SchmidFactor::default()
    }

    /// Schmid factor for a user supplied slip system, maximised over the symmetry operators.
    fn schmid_factor_for_system(
        &self,
        load: &Vector3<f64>,
        plane: &Vector3<f64>,
        direction: &Vector3<f64>,
    ) -> SchmidFactor {
        let load_norm = load.norm();
        let mut best = SchmidFactor::default();
        for i in 0..self.num_sym_ops() {
            let g = self.mat_sym_op(i);
            let p = g * plane;
            if p.z < 0.0 {
                continue;
            }
            let d = g * direction;
            let cos_phi = (load.dot(&p) / (p.norm() * load_norm)).abs();
            let cos_lambda = (load.dot(&d) / (d.norm() * load_norm)).abs();
            let factor = cos_phi * cos_lambda;
            if factor > best.factor {
                best = SchmidFactor {
                    factor,
                    angle_comps: [clamp_unit(cos_phi).acos(), clamp_unit(cos_lambda).acos()],
                    slip_system: i,
                };
            }
        }
        best
    }

    fn m_prime(&self, _q1: &Quaternion<f64>, _q2: &Quaternion<f64>, _ld: &Vector3<f64>) -> f64 {
        0.0
    }

    fn f1(&self, _q1: &Quaternion<f64>, _q2: &Quaternion<f64>, _ld: &Vector3<f64>, _max_sf: bool) -> f64 {
        0.0
    }

    fn f1spt(&self, _q1: &Quaternion<f64>, _q2: &Quaternion<f64>, _ld: &Vector3<f64>, _max_sf: bool) -> f64 {
        0.0
    }

    fn f7(&self, _q1: &Quaternion<f64>, _q2: &Quaternion<f64>, _ld: &Vector3<f64>, _max_sf: bool) -> f64 {
        0.0
    }

    /// Rotates every pole direction into the sample frame, writing `+v` and `-v` for each.
    fn generate_sphere_coords_from_eulers(&self, eulers: &[Euler], mode: ExecutionMode) -> SphereCoords {
        let families = self.pole_directions();
        let stride = families.map(|f| f.len() * 2);
        let mut coords = SphereCoords {
            families: stride.map(|s| vec![Vector3::zeros(); s * eulers.len()]),
        };
        let [a, b, c] = &mut coords.families;
        match mode {
            ExecutionMode::Sequential => fill_sphere_coords(&families, eulers, [a, b, c]),
            ExecutionMode::Parallel => eulers
                .par_chunks(PARTITION_SIZE)
                .zip(a.par_chunks_mut(PARTITION_SIZE * stride[0]))
                .zip(b.par_chunks_mut(PARTITION_SIZE * stride[1]))
                .zip(c.par_chunks_mut(PARTITION_SIZE * stride[2]))
                .for_each(|(((e, a), b), c)| fill_sphere_coords(&families, e, [a, b, c])),
        }
        tracing::debug!(
            "{}: generated sphere coordinates for {} orientations ({:?})",
            self.name(),
            eulers.len(),
            mode
        );
        coords
    }

    /// Colour legend of the unit triangle, for classes that provide one.
    fn generate_ipf_triangle_legend(&self, _image_dim: usize) -> Option<RgbaImage> {
        None
    }

    /// Colour for a misorientation relative to a reference orientation. Black when unsupported.
    fn generate_misorientation_color(&self, _q: &Quaternion<f64>, _reference: &Quaternion<f64>) -> Rgb {
        [0, 0, 0]
    }
}

/// The Laue classes with an implementation in this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SymmetryClass {
    Hexagonal,
    Cubic,
    HexagonalLow,
    CubicLow,
    Triclinic,
    Monoclinic,
    #[serde(rename = "orthorhombic")]
    #[value(name = "orthorhombic")]
    OrthoRhombic,
    TetragonalLow,
    TrigonalLow,
    Trigonal,
}

impl SymmetryClass {
    /// Every class, in crystal structure id order.
    pub const ALL: [SymmetryClass; 10] = [
        SymmetryClass::Hexagonal,
        SymmetryClass::Cubic,
        SymmetryClass::HexagonalLow,
        SymmetryClass::CubicLow,
        SymmetryClass::Triclinic,
        SymmetryClass::Monoclinic,
        SymmetryClass::OrthoRhombic,
        SymmetryClass::TetragonalLow,
        SymmetryClass::TrigonalLow,
        SymmetryClass::Trigonal,
    ];

    pub fn ops(self) -> &'static dyn LaueOps {
        match self {
            SymmetryClass::Hexagonal => &HexagonalOps,
            SymmetryClass::Cubic => &CubicOps,
            SymmetryClass::HexagonalLow => &HexagonalLowOps,
            SymmetryClass::CubicLow => &CubicLowOps,
            SymmetryClass::Triclinic => &TriclinicOps,
            SymmetryClass::Monoclinic => &MonoclinicOps,
            SymmetryClass::OrthoRhombic => &OrthoRhombicOps,
            SymmetryClass::TetragonalLow => &TetragonalLowOps,
            SymmetryClass::TrigonalLow => &TrigonalLowOps,
            SymmetryClass::Trigonal => &TrigonalOps,
        }
    }

    /// Maps the EBSD crystal structure enumeration used by DREAM3D phase data.
    /// Id 8 (tetragonal high) has no implementation.
    pub fn from_crystal_structure(id: u32) -> Result<Self> {
        match id {
            0 => Ok(SymmetryClass::Hexagonal),
            1 => Ok(SymmetryClass::Cubic),
            2 => Ok(SymmetryClass::HexagonalLow),
            3 => Ok(SymmetryClass::CubicLow),
            4 => Ok(SymmetryClass::Triclinic),
            5 => Ok(SymmetryClass::Monoclinic),
            6 => Ok(SymmetryClass::OrthoRhombic),
            7 => Ok(SymmetryClass::TetragonalLow),
            9 => Ok(SymmetryClass::TrigonalLow),
            10 => Ok(SymmetryClass::Trigonal),
            _ => Err(anyhow!("Unsupported crystal structure id: {}", id)),
        }
    }

    pub fn crystal_structure(self) -> u32 {
        match self {
            SymmetryClass::Hexagonal => 0,
            SymmetryClass::Cubic => 1,
            SymmetryClass::HexagonalLow => 2,
            SymmetryClass::CubicLow => 3,
            SymmetryClass::Triclinic => 4,
            SymmetryClass::Monoclinic => 5,
            SymmetryClass::OrthoRhombic => 6,
            SymmetryClass::TetragonalLow => 7,
            SymmetryClass::TrigonalLow => 9,
            SymmetryClass::Trigonal => 10,
        }
    }

    pub fn generate_pole_figure(self, config: &PoleFigureConfig) -> Vec<PoleFigure> {
        pole_figure::generate(self.ops(), config)
    }
}

impl fmt::Display for SymmetryClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.ops().name())
    }
}

impl FromStr for SymmetryClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match key.as_str() {
            "hexagonal" | "hexagonalhigh" | "6mmm" => Ok(SymmetryClass::Hexagonal),
            "hexagonallow" | "6m" => Ok(SymmetryClass::HexagonalLow),
            "cubic" | "cubichigh" | "m3m" => Ok(SymmetryClass::Cubic),
            "cubiclow" | "m3" => Ok(SymmetryClass::CubicLow),
            "orthorhombic" | "mmm" => Ok(SymmetryClass::OrthoRhombic),
            "tetragonallow" | "4m" => Ok(SymmetryClass::TetragonalLow),
            "trigonal" | "trigonalhigh" | "3m" => Ok(SymmetryClass::Trigonal),
            "trigonallow" | "3" => Ok(SymmetryClass::TrigonalLow),
            "monoclinic" | "2m" => Ok(SymmetryClass::Monoclinic),
            "triclinic" | "1" => Ok(SymmetryClass::Triclinic),
            _ => Err(format!("Unknown symmetry class: '{}'", s)),
        }
    }
}

pub(crate) fn mat_from_rows(rows: &[[f64; 3]; 3]) -> Matrix3<f64> {
    Matrix3::from_fn(|i, j| rows[i][j])
}

pub(crate) fn unit_to_byte(x: f64) -> u8 {
    (x * 255.0).clamp(0.0, 255.0) as u8
}

/// Per-partition kernel behind [`LaueOps::generate_sphere_coords_from_eulers`].
fn fill_sphere_coords(
    families: &[&'static [[f64; 3]]; 3],
    eulers: &[Euler],
    mut out: [&mut [Vector3<f64>]; 3],
) {
    for (i, euler) in eulers.iter().enumerate() {
        let gt = conversions::euler_to_mat(euler).transpose();
        for (family, dest) in families.iter().zip(out.iter_mut()) {
            let base = i * family.len() * 2;
            for (k, d) in family.iter().enumerate() {
                let v = gt * Vector3::from(*d);
                dest[base + 2 * k] = v;
                dest[base + 2 * k + 1] = -v;
            }
        }
    }
}

/// Exhaustive misorientation search.
///
/// **Context**: Two crystals related by a rotation are indistinguishable from
/// the same pair related by that rotation composed with any crystal symmetry
/// operator. The physically meaningful misorientation is the smallest of these.
///
/// **How it Works**: Forms `conj(q2) * q1`, composes it with every operator on
/// the crystal side, folds each angle into `[0, pi]` and keeps the minimum.
pub(crate) fn calc_miso_quat(
    quat_sym: &[[f64; 4]],
    q1: &Quaternion<f64>,
    q2: &Quaternion<f64>,
) -> AxisAngle {
    let qr = q2.conjugate() * q1;
    let mut best = AxisAngle {
        axis: Vector3::z(),
        angle: f64::INFINITY,
    };
    for sym in quat_sym {
        let ax = conversions::quat_to_axis_angle(&(qr * quaternion::from_xyzw(sym)));
        if ax.angle < best.angle {
            best = ax;
        }
    }
    if best.angle < DEGENERATE_ANGLE {
        best.axis = Vector3::z();
    } else {
        best.axis = unit_or_z(best.axis);
    }
    best
}

/// Symmetry equivalent of `r` with the smallest Rodrigues magnitude.
///
/// The composition of `r` with an operator `s` is `(r + s + r x s) / (1 - r.s)`,
/// which stays finite for the large stand-in magnitudes used for 180 degree operators.
pub(crate) fn calc_rod_nearest_origin(rod_sym: &[[f64; 3]], r: &Vector3<f64>) -> Vector3<f64> {
    let mut best = *r;
    let mut smallest = f64::INFINITY;
    for sym in rod_sym {
        let s = Vector3::from(*sym);
        let denom = 1.0 - r.dot(&s);
        let rc = (r + s + r.cross(&s)) / denom;
        let dist = rc.norm_squared();
        if dist < smallest {
            smallest = dist;
            best = rc;
        }
    }
    best
}

pub(crate) fn calc_nearest_quat(
    quat_sym: &[[f64; 4]],
    q1: &Quaternion<f64>,
    q2: &Quaternion<f64>,
) -> Quaternion<f64> {
    let mut best = quaternion::with_positive_scalar(*q2);
    let mut smallest = f64::INFINITY;
    for sym in quat_sym {
        let qc = quaternion::with_positive_scalar(q2 * quaternion::from_xyzw(sym));
        let dist = 1.0 - quaternion::dot(&qc, q1);
        if dist < smallest {
            smallest = dist;
            best = qc;
        }
    }
    best
}

pub(crate) fn calc_quat_nearest_origin(quat_sym: &[[f64; 4]], q: &Quaternion<f64>) -> Quaternion<f64> {
    let mut best = *q;
    let mut smallest = f64::INFINITY;
    for sym in quat_sym {
        let qc = q * quaternion::from_xyzw(sym);
        let dist = 1.0 - qc.w * qc.w;
        if dist < smallest {
            smallest = dist;
            best = qc;
        }
    }
    quaternion::with_positive_scalar(best)
}

/// Polar IPF colouring used by the low-symmetry classes: red at the pole, blending
/// from green (`eta_min`) to blue (`eta_max`) toward the equator.
pub(crate) fn polar_ipf_rgb(eta: f64, chi: f64, eta_min: f64, eta_max: f64) -> Rgb {
    let eta_deg = eta.to_degrees();
    let chi_frac = chi.to_degrees() / 90.0;
    let red = 1.0 - chi_frac;
    let mut blue = (eta_deg - eta_min).abs() / (eta_max - eta_min);
    let green = (1.0 - blue) * chi_frac;
    blue *= chi_frac;
    normalized_rgb([red, green, blue])
}

/// Whether `(eta, chi)` lies in the sector `eta_min..=eta_max` (degrees) of the upper hemisphere.
pub(crate) fn in_polar_triangle(eta: f64, chi: f64, eta_min: f64, eta_max: f64) -> bool {
    let eta_deg = eta.to_degrees();
    (eta_min..=eta_max).contains(&eta_deg) && (0.0..=FRAC_PI_2).contains(&chi)
}

/// Square-roots each channel and scales so the brightest channel is 255.
pub(crate) fn normalized_rgb(rgb: [f64; 3]) -> Rgb {
    let rgb = rgb.map(|c| c.max(0.0).sqrt());
    let max = rgb.iter().cloned().fold(0.0, f64::max);
    if max == 0.0 {
        return [0, 0, 0];
    }
    rgb.map(|c| unit_to_byte(c / max))
}

/// Folds a direction's azimuth into the sector `[0, period]` by alternating reflection.
pub(crate) fn fold_azimuth(angle_deg: f64, period: f64) -> f64 {
    let angle = angle_deg.rem_euclid(360.0);
    if angle <= period {
        return angle;
    }
    let sector = (angle / period).floor();
    let offset = angle - period * sector;
    if sector as i64 % 2 == 0 {
        offset
    } else {
        period - offset
    }
}

/// Brings the axis into the upper hemisphere and folds its azimuth into
/// `[0, period]` degrees, keeping the in-plane length and the rotation angle.
pub(crate) fn fold_about_c_axis(rod_sym: &[[f64; 3]], r: &Vector3<f64>, period: f64) -> Vector3<f64> {
    let r = calc_rod_nearest_origin(rod_sym, r);
    let ax = conversions::rod_to_axis_angle(&r);
    let n = if ax.axis.z < 0.0 { -ax.axis } else { ax.axis };
    let azimuth = fold_azimuth(n.y.atan2(n.x).to_degrees(), period).to_radians();
    let in_plane = n.x.hypot(n.y);
    let (s, c) = azimuth.sin_cos();
    conversions::axis_angle_to_rod(&AxisAngle {
        axis: Vector3::new(in_plane * c, in_plane * s, n.z),
        angle: ax.angle,
    })
}
