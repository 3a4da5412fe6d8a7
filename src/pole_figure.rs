//! Pole figure generation for any Laue class.
//!
//! Each of a class's three pole families goes through the same pipeline:
//! sphere coordinates, Lambert accumulation, MRD normalisation, stereographic
//! resampling. The families run as independent tasks and are joined before a
//! shared intensity scale is chosen and the figures are coloured.

use image::RgbaImage;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::color;
use crate::lambert::ModifiedLambertProjection;
use crate::laue::{ExecutionMode, LaueOps};
use crate::orientation::Euler;
use nalgebra::Vector3;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::laue::SymmetryClass;

    fn config(eulers: Vec<Euler>) -> PoleFigureConfig {
        PoleFigureConfig {
            eulers,
            image_dim: 32,
            lambert_dim: 16,
            num_colors: 16,
            ..Default::default()
        }
    }

    #[test]
    fn three_figures_with_default_labels() {
        let figures = generate(SymmetryClass::Cubic.ops(), &config(vec![Euler::new(0.1, 0.2, 0.3)]));
        let labels: Vec<_> = figures.iter().map(|f| f.label.as_str()).collect();
        assert_eq!(labels, vec!["<001>", "<011>", "<111>"]);
        for f in &figures {
            assert_eq!(f.image.dimensions(), (32, 32));
            assert_eq!(f.intensity.dim(), (32, 32));
        }
    }

    #[test]
    fn order_and_labels_are_respected() {
        let mut cfg = config(vec![Euler::new(0.0, 0.0, 0.0)]);
        cfg.order = [2, 0, 1];
        cfg.labels = vec!["a".into(), "b".into(), "c".into()];
        let figures = generate(SymmetryClass::Monoclinic.ops(), &cfg);
        let labels: Vec<_> = figures.iter().map(|f| f.label.as_str()).collect();
        assert_eq!(labels, vec!["c", "a", "b"]);
    }

    #[test]
    fn shared_scale_spans_all_families() {
        let figures = generate(SymmetryClass::Cubic.ops(), &config(vec![Euler::new(0.0, 0.0, 0.0)]));
        for f in &figures {
            let local_max = f.intensity.iter().cloned().fold(f64::MIN, f64::max);
            assert!(local_max <= f.max + 1e-12);
            assert_eq!(f.max, figures[0].max);
        }
    }

    #[test]
    fn sequential_and_parallel_figures_agree() {
        let eulers: Vec<Euler> = (0..300)
            .map(|i| Euler::new(i as f64 * 0.021, i as f64 * 0.007, i as f64 * 0.013))
            .collect();
        let mut cfg = config(eulers);
        cfg.mode = ExecutionMode::Sequential;
        let seq = generate(SymmetryClass::TetragonalLow.ops(), &cfg);
        cfg.mode = ExecutionMode::Parallel;
        let par = generate(SymmetryClass::TetragonalLow.ops(), &cfg);
        for (a, b) in seq.iter().zip(&par) {
            let diff = (&a.intensity - &b.intensity).mapv(f64::abs).sum();
            assert!(diff < 1e-9, "{} differs by {}", a.label, diff);
        }
    }
}

/// Inputs of a pole figure run.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PoleFigureConfig {
    pub eulers: Vec<Euler>,
    /// Edge length of the square output images, in pixels.
    pub image_dim: usize,
    /// Edge length of each Lambert square.
    pub lambert_dim: usize,
    pub num_colors: usize,
    /// Figure titles. Empty entries fall back to the class's family names.
    pub labels: Vec<String>,
    /// Family index shown in each output position.
    pub order: [usize; 3],
    pub mode: ExecutionMode,
}

impl Default for PoleFigureConfig {
    fn default() -> Self {
        Self {
            eulers: Vec::new(),
            image_dim: 512,
            lambert_dim: 64,
            num_colors: 32,
            labels: Vec::new(),
            order: [0, 1, 2],
            mode: ExecutionMode::default(),
        }
    }
}

/// One coloured pole figure with the intensity it was drawn from.
#[derive(Debug, Clone, PartialEq)]
pub struct PoleFigure {
    pub label: String,
    pub image: RgbaImage,
    /// Stereographic intensity in MRD, indexed `[y, x]`.
    pub intensity: Array2<f64>,
    /// Colour scale shared by every figure of the run.
    pub min: f64,
    pub max: f64,
}

/// Projects a set of directions into an MRD-normalised stereographic intensity map.
pub fn intensity_map(
    coords: &[Vector3<f64>],
    lambert_dim: usize,
    image_dim: usize,
    mode: ExecutionMode,
) -> Array2<f64> {
    let mut lambert = ModifiedLambertProjection::from_xyz_coords(coords, lambert_dim, 1.0, mode);
    lambert.normalize_squares_to_mrd();
    lambert.create_stereographic_projection(image_dim)
}

/// Generates the three pole figures of a Laue class.
///
/// **Context**: Figures of one run are compared side by side, so they must
/// share a colour scale rather than each stretching over its own range.
///
/// **How it Works**: Sphere coordinates are generated once for all families.
/// In parallel mode the three intensity maps are computed as fan-out tasks
/// with `rayon::join`; the global min and max are taken only after all three
/// finish, then every map is coloured against that range.
pub fn generate(ops: &dyn LaueOps, config: &PoleFigureConfig) -> Vec<PoleFigure> {
    if config.eulers.is_empty() {
        tracing::warn!("{}: generating pole figures with no orientations", ops.name());
    }
    let coords = ops.generate_sphere_coords_from_eulers(&config.eulers, config.mode);
    let [a, b, c] = &coords.families;
    let map = |family: &Vec<Vector3<f64>>| {
        intensity_map(family, config.lambert_dim, config.image_dim, config.mode)
    };

    let intensities = match config.mode {
        ExecutionMode::Sequential => [map(a), map(b), map(c)],
        ExecutionMode::Parallel => {
            let (ia, (ib, ic)) = rayon::join(|| map(a), || rayon::join(|| map(b), || map(c)));
            [ia, ib, ic]
        }
    };

    let (min, max) = intensities
        .iter()
        .flat_map(|i| i.iter())
        .fold((f64::MAX, f64::MIN), |(lo, hi), v| (lo.min(*v), hi.max(*v)));
    let (min, max) = if min > max { (0.0, 0.0) } else { (min, max) };
    tracing::info!(
        "{}: pole figure intensity range {:.4} to {:.4} MRD over {} orientations",
        ops.name(),
        min,
        max,
        config.eulers.len()
    );

    let defaults = ops.default_pole_figure_names();
    config
        .order
        .iter()
        .filter(|&&family| family < intensities.len())
        .map(|&family| {
            let label = config
                .labels
                .get(family)
                .filter(|l| !l.is_empty())
                .cloned()
                .unwrap_or_else(|| defaults[family].to_string());
            let intensity = intensities[family].clone();
            let image = color::create_color_image(
                &intensity,
                config.image_dim,
                config.image_dim,
                config.num_colors,
                min,
                max,
            );
            PoleFigure {
                label,
                image,
                intensity,
                min,
                max,
            }
        })
        .collect()
}
