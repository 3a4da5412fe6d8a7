use std::f64::consts::PI;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use nalgebra::Quaternion;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

use crate::conversions::{self, AxisAngle};
use crate::laue::{LaueOps, SymmetryClass};
use crate::texture::{Odf, TextureComponent};

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn degrees_are_converted() {
        let e = Euler::from_degrees(180.0, 90.0, 45.0);
        assert!((e.phi1 - PI).abs() < 1e-12);
        assert!((e.phi - PI / 2.0).abs() < 1e-12);
        assert!((e.phi2 - PI / 4.0).abs() < 1e-12);
    }

    #[test]
    fn parse_euler_from_str() {
        let e: Euler = "0.1, 0.2,0.3".parse().unwrap();
        assert_eq!(e, Euler::new(0.1, 0.2, 0.3));
        assert!("0.1,0.2".parse::<Euler>().is_err());
    }

    #[test]
    fn discrete_requires_equal_lengths() {
        assert!(Orientations::new_discrete(vec![0.0], vec![0.0, 1.0], vec![0.0]).is_err());
        assert!(Orientations::new_discrete(vec![], vec![], vec![]).is_err());
        let o = Orientations::new_discrete(vec![0.0, 1.0], vec![0.5, 0.5], vec![0.2, 0.3]).unwrap();
        assert_eq!(o.num_orientations, 2);
        assert_eq!(o.eulers[1], Euler::new(1.0, 0.5, 0.3));
    }

    #[test]
    fn seeded_uniform_is_reproducible() {
        let a = Orientations::random_uniform(16, Some(7));
        let b = Orientations::random_uniform(16, Some(7));
        assert_eq!(a, b);
        for e in &a.eulers {
            assert!(e.phi >= 0.0 && e.phi <= PI, "phi out of range: {}", e.phi);
        }
    }

    #[test]
    fn flat_buffer_in_degrees() {
        let o = Orientations::from_flat(&[90.0, 0.0, 0.0, 0.0, 45.0, 0.0], true).unwrap();
        assert_eq!(o.num_orientations, 2);
        assert!((o.eulers[0].phi1 - PI / 2.0).abs() < 1e-12);
        assert!((o.eulers[1].phi - PI / 4.0).abs() < 1e-12);
        assert!(Orientations::from_flat(&[0.0, 1.0], false).is_err());
    }

    #[test]
    fn misorientations_against_a_reference() {
        let ops = SymmetryClass::Cubic.ops();
        let o = Orientations::from_eulers(vec![
            Euler::new(0.0, 0.0, 0.0),
            Euler::new(PI / 2.0, 0.0, 0.0),
            Euler::new(PI / 6.0, 0.0, 0.0),
        ])
        .unwrap();
        let identity = Quaternion::identity();
        let angles: Vec<f64> = o.misorientations_to(ops, &identity).iter().map(|ax| ax.angle).collect();
        assert!(angles[0] < 1e-6);
        assert!(angles[1] < 1e-6, "quarter turn about z is a cubic symmetry");
        assert!((angles[2] - PI / 6.0).abs() < 1e-6, "{}", angles[2]);
    }

    #[test]
    fn odf_scheme_samples_the_requested_count() {
        let scheme = Scheme::Odf {
            num_orients: 25,
            components: vec![TextureComponent::new(Euler::new(0.3, 0.2, 0.1), 500.0, 1)],
        };
        let a = Orientations::generate(&scheme, SymmetryClass::CubicLow, Some(9)).unwrap();
        let b = Orientations::generate(&scheme, SymmetryClass::CubicLow, Some(9)).unwrap();
        assert_eq!(a.num_orientations, 25);
        assert_eq!(a, b);
    }

    #[test]
    fn load_from_text_file() {
        let dir = std::env::temp_dir().join("crystalops_orientation_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("eulers.txt");
        let mut f = File::create(&path).unwrap();
        writeln!(f, "# phi1 Phi phi2").unwrap();
        writeln!(f, "0 90 0").unwrap();
        writeln!(f).unwrap();
        writeln!(f, "45,0,45").unwrap();
        drop(f);

        let o = Orientations::from_file(&path, true).unwrap();
        assert_eq!(o.num_orientations, 2);
        assert!((o.eulers[0].phi - PI / 2.0).abs() < 1e-12);
        assert!((o.eulers[1].phi1 - PI / 4.0).abs() < 1e-12);
    }

    #[test]
    fn bad_line_reports_position() {
        let dir = std::env::temp_dir().join("crystalops_orientation_test_bad");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("eulers.txt");
        std::fs::write(&path, "0 0 0\n1 two 3\n").unwrap();
        let err = Orientations::from_file(&path, false).unwrap_err();
        assert!(format!("{:#}", err).contains("line 2"), "{:#}", err);
    }
}

/// Bunge Euler angles `(phi1, Phi, phi2)` in radians.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Euler {
    pub phi1: f64,
    pub phi: f64,
    pub phi2: f64,
}

impl Euler {
    pub fn new(phi1: f64, phi: f64, phi2: f64) -> Self {
        Self { phi1, phi, phi2 }
    }

    pub fn from_degrees(phi1: f64, phi: f64, phi2: f64) -> Self {
        Self::new(phi1.to_radians(), phi.to_radians(), phi2.to_radians())
    }

    /// Returns the angles in radians, converting from degrees when `degrees` is set.
    pub fn to_radians(self, degrees: bool) -> Self {
        if degrees {
            Self::from_degrees(self.phi1, self.phi, self.phi2)
        } else {
            self
        }
    }

    pub fn to_quaternion(&self) -> Quaternion<f64> {
        conversions::euler_to_quat(self)
    }

    pub fn as_array(&self) -> [f64; 3] {
        [self.phi1, self.phi, self.phi2]
    }
}

impl fmt::Display for Euler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6}, {:.6})", self.phi1, self.phi, self.phi2)
    }
}

impl FromStr for Euler {
    type Err = String;

    /// Parses `"phi1,Phi,phi2"`. Whitespace around the values is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let angles: Vec<&str> = s.split(',').map(str::trim).collect();
        if angles.len() != 3 {
            return Err(format!(
                "Invalid Euler angle format: '{}'. Expected 'phi1,Phi,phi2'",
                s
            ));
        }
        let mut values = [0.0; 3];
        for (value, text) in values.iter_mut().zip(&angles) {
            *value = text
                .parse::<f64>()
                .map_err(|_| format!("Failed to parse angle: {}", text))?;
        }
        Ok(Euler::new(values[0], values[1], values[2]))
    }
}

/// How the set of orientations is obtained.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    /// Random orientations, uniformly distributed over SO(3).
    Uniform { num_orients: usize },
    /// Whitespace or comma separated `phi1 Phi phi2` rows read from a text file.
    File { path: String, degrees: bool },
    /// An explicit list of Euler angles in radians.
    Discrete { eulers: Vec<Euler> },
    /// Orientations sampled from an ODF built from texture components.
    Odf {
        num_orients: usize,
        components: Vec<TextureComponent>,
    },
}

/// A set of crystal orientations, one Euler triple per grain or voxel.
#[derive(Debug, Clone, PartialEq)]
pub struct Orientations {
    pub num_orientations: usize,
    pub eulers: Vec<Euler>,
}

impl Orientations {
    /// Builds the orientation set for `scheme`. The symmetry class only matters
    /// for ODF sampling, whose bins live in that class's fundamental zone.
    pub fn generate(scheme: &Scheme, symmetry: SymmetryClass, seed: Option<u64>) -> Result<Orientations> {
        match scheme {
            Scheme::Uniform { num_orients } => Ok(Orientations::random_uniform(*num_orients, seed)),
            Scheme::File { path, degrees } => Orientations::from_file(path, *degrees),
            Scheme::Discrete { eulers } => Orientations::from_eulers(eulers.clone()),
            Scheme::Odf {
                num_orients,
                components,
            } => Orientations::from_texture(symmetry.ops(), components, *num_orients, seed),
        }
    }

    /// Orientations drawn from the ODF of `components` in the class `ops`.
    pub fn from_texture(
        ops: &dyn LaueOps,
        components: &[TextureComponent],
        num_orient: usize,
        seed: Option<u64>,
    ) -> Result<Orientations> {
        let mut rng = seeded_rng(seed);
        let odf = Odf::from_components(ops, components, &mut rng);
        Self::from_eulers(odf.sample(ops, num_orient, &mut rng)?)
    }

    /// Creates a new orientation set from separate angle lists.
    pub fn new_discrete(phi1s: Vec<f64>, phis: Vec<f64>, phi2s: Vec<f64>) -> Result<Self> {
        if phi1s.is_empty() || phis.is_empty() || phi2s.is_empty() {
            return Err(anyhow!("Empty angle list"));
        }
        if phi1s.len() != phis.len() || phi1s.len() != phi2s.len() {
            return Err(anyhow!("Angle lists have different lengths"));
        }
        Self::from_eulers(
            phi1s
                .into_iter()
                .zip(phis)
                .zip(phi2s)
                .map(|((phi1, phi), phi2)| Euler::new(phi1, phi, phi2))
                .collect(),
        )
    }

    pub fn from_eulers(eulers: Vec<Euler>) -> Result<Self> {
        if eulers.is_empty() {
            return Err(anyhow!("Empty angle list"));
        }
        Ok(Self {
            num_orientations: eulers.len(),
            eulers,
        })
    }

    /// Interprets a flat `[phi1, Phi, phi2, phi1, ...]` buffer.
    pub fn from_flat(values: &[f64], degrees: bool) -> Result<Self> {
        if values.len() % 3 != 0 {
            return Err(anyhow!(
                "Euler buffer length {} is not a multiple of 3",
                values.len()
            ));
        }
        Self::from_eulers(
            values
                .chunks_exact(3)
                .map(|c| Euler::new(c[0], c[1], c[2]).to_radians(degrees))
                .collect(),
        )
    }

    /// Uniformly random orientations. Quaternions drawn from a 4D normal
    /// distribution and normalised are uniform over SO(3).
    pub fn random_uniform(num_orient: usize, seed: Option<u64>) -> Orientations {
        let mut rng = seeded_rng(seed);
        let eulers = (0..num_orient)
            .map(|_| conversions::quat_to_euler(&random_quaternion(&mut rng)))
            .collect::<Vec<_>>();
        Orientations {
            num_orientations: eulers.len(),
            eulers,
        }
    }

    pub fn from_file(path: impl AsRef<Path>, degrees: bool) -> Result<Orientations> {
        let path = path.as_ref();
        let file =
            File::open(path).with_context(|| format!("Failed to open orientation file {:?}", path))?;
        let mut eulers = Vec::new();
        for (i, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let values = trimmed
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|s| !s.is_empty())
                .map(str::parse::<f64>)
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| anyhow!("{:?} line {}: {}", path, i + 1, e))?;
            if values.len() < 3 {
                return Err(anyhow!(
                    "{:?} line {}: expected 3 angles, found {}",
                    path,
                    i + 1,
                    values.len()
                ));
            }
            eulers.push(Euler::new(values[0], values[1], values[2]).to_radians(degrees));
        }
        Self::from_eulers(eulers)
    }

    pub fn quaternions(&self) -> Vec<Quaternion<f64>> {
        self.eulers.iter().map(Euler::to_quaternion).collect()
    }

    /// Misorientation of every orientation against `reference` under the class `ops`.
    pub fn misorientations_to(&self, ops: &dyn LaueOps, reference: &Quaternion<f64>) -> Vec<AxisAngle> {
        self.quaternions()
            .iter()
            .map(|q| ops.miso_quat(q, reference))
            .collect()
    }
}

fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

/// Draws a uniformly distributed unit quaternion with non-negative scalar part.
pub fn random_quaternion<R: Rng + ?Sized>(rng: &mut R) -> Quaternion<f64> {
    loop {
        let c: [f64; 4] = std::array::from_fn(|_| rng.sample(StandardNormal));
        let q = Quaternion::new(c[3], c[0], c[1], c[2]);
        let norm = q.norm();
        if norm > 1e-12 {
            return crate::quaternion::with_positive_scalar(q / norm);
        }
    }
}
