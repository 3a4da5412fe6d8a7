use crystalops::{
    color::{self, WHITE},
    compositing::{self, CompositeOptions, Layout},
    laue::{ExecutionMode, SymmetryClass},
    orientation::{Euler, Orientations},
    pole_figure::{self, PoleFigureConfig},
    settings,
};
use nalgebra::Vector3;
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

fn random_directions(n: usize, seed: u64) -> Vec<Vector3<f64>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            let v = Vector3::new(
                rng.sample::<f64, _>(StandardNormal),
                rng.sample::<f64, _>(StandardNormal),
                rng.sample::<f64, _>(StandardNormal),
            );
            v.normalize()
        })
        .collect()
}

#[test]
fn identity_orientation_gives_cube_axes() {
    let ops = SymmetryClass::Cubic.ops();
    let coords = ops.generate_sphere_coords_from_eulers(&[Euler::new(0.0, 0.0, 0.0)], ExecutionMode::Sequential);
    let family = &coords.families[0];
    assert_eq!(family.len(), 6);
    let expected = [
        Vector3::x(),
        -Vector3::x(),
        Vector3::y(),
        -Vector3::y(),
        Vector3::z(),
        -Vector3::z(),
    ];
    for e in &expected {
        assert!(
            family.iter().any(|v| (v - e).norm() < 1e-12),
            "missing {:?} in {:?}",
            e,
            family
        );
    }
    assert_eq!(coords.families[1].len(), 12);
    assert_eq!(coords.families[2].len(), 8);
}

#[test]
fn uniform_directions_give_flat_intensity() {
    let dirs = random_directions(100_000, 21);
    let intensity = pole_figure::intensity_map(&dirs, 16, 32, ExecutionMode::Parallel);
    let inside: Vec<f64> = intensity.iter().cloned().filter(|v| *v > 0.0).collect();
    assert!(inside.len() > 700, "only {} pixels inside", inside.len());
    let mean = inside.iter().sum::<f64>() / inside.len() as f64;
    assert!((mean - 1.0).abs() < 0.05, "mean {}", mean);
    for v in &inside {
        assert!((v - 1.0).abs() < 0.25, "pixel {} far from uniform", v);
    }
}

#[test]
fn colour_image_masks_outside_circle() {
    let (w, h) = (40, 40);
    let mut rng = StdRng::seed_from_u64(22);
    let intensity = Array2::from_shape_fn((h, w), |_| rng.random::<f64>() * 4.0);
    let num_colors = 12;
    let image = color::create_color_image(&intensity, w, h, num_colors, 0.0, 4.0);
    let table: Vec<_> = color::color_table(num_colors).iter().map(color::to_pixel).collect();

    let (cx, cy, r) = (w as f64 / 2.0, h as f64 / 2.0, w as f64 / 2.0);
    for y in 0..h {
        for x in 0..w {
            let dx = x as f64 + 0.5 - cx;
            let dy = y as f64 + 0.5 - cy;
            let pixel = *image.get_pixel(x as u32, y as u32);
            if dx * dx + dy * dy > r * r {
                assert_eq!(pixel, WHITE, "({}, {}) should be masked", x, y);
            } else {
                assert!(table.contains(&pixel), "({}, {}) has {:?}", x, y, pixel);
            }
        }
    }
}

#[test]
fn composite_dimensions_follow_layout() {
    let orientations = Orientations::random_uniform(200, Some(23));
    let config = PoleFigureConfig {
        eulers: orientations.eulers,
        image_dim: 48,
        lambert_dim: 16,
        num_colors: 16,
        ..Default::default()
    };
    let figures = SymmetryClass::CubicLow.generate_pole_figure(&config);
    assert_eq!(figures.len(), 3);
    let options = CompositeOptions {
        num_colors: 16,
        sample_count: 200,
        symmetry_name: SymmetryClass::CubicLow.to_string(),
    };
    let horizontal = compositing::compose(&figures, Layout::Horizontal, &options).unwrap();
    assert_eq!(horizontal.width(), 4 * horizontal.height());
    let square = compositing::compose(&figures, Layout::Square, &options).unwrap();
    assert_eq!(square.width(), square.height());
    assert_eq!(square.width(), horizontal.width() / 2);
    let vertical = compositing::compose(&figures[..1], Layout::Vertical, &options).unwrap();
    assert_eq!(vertical.width(), vertical.height());
}

#[test]
fn every_class_produces_pole_figures() {
    let orientations = Orientations::random_uniform(100, Some(24));
    for class in SymmetryClass::ALL {
        let config = PoleFigureConfig {
            eulers: orientations.eulers.clone(),
            image_dim: 24,
            lambert_dim: 12,
            num_colors: 8,
            ..Default::default()
        };
        let figures = class.generate_pole_figure(&config);
        assert_eq!(figures.len(), 3, "{}", class);
        for f in &figures {
            assert!(f.max >= f.min, "{}: {} > {}", class, f.min, f.max);
            assert_eq!(f.image.dimensions(), (24, 24));
        }
    }
}

#[test]
fn default_configuration_loads() {
    let settings = settings::load_default_config().unwrap();
    assert_eq!(settings.symmetry, SymmetryClass::Cubic);
    assert_eq!(settings.layout, Layout::Horizontal);
    assert!(settings.parallel);
    let config = settings.pole_figure_config(Vec::new());
    assert_eq!(config.image_dim, settings.image_dim);
    assert_eq!(config.order, [0, 1, 2]);
}
