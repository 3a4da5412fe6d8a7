//! Modified Lambert equal-area projection of the unit sphere onto two squares.
//!
//! Each hemisphere maps onto its own `dimension x dimension` grid:
//! - directions are scattered into the grids with bilinear weights
//! - interpolated reads gather the same four cells
//! - neighbours that fall off one edge of a square wrap onto the mirrored
//!   row or column, since the square's border is the equator
//!
//! The filled squares are resampled onto a stereographic image to draw pole figures.

use std::f64::consts::{FRAC_2_SQRT_PI, PI};

use nalgebra::Vector3;
use ndarray::Array2;
use rayon::prelude::*;

use crate::laue::{ExecutionMode, PARTITION_SIZE};


const HALF_SQRT_PI: f64 = 0.886226925452758;

/// Which square a direction projects into. North holds `z >= 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hemisphere {
    North,
    South,
}

/// The four grid cells touched by a bilinear scatter or gather, with their weights.
struct Stencil {
    cells: [(usize, usize); 4],
    weights: [f64; 4],
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModifiedLambertProjection {
    dimension: usize,
    sphere_radius: f64,
    step_size: f64,
    max_coord: f64,
    north: Array2<f64>,
    south: Array2<f64>,
}

impl ModifiedLambertProjection {
    /// Creates zeroed squares. Each square has half the sphere's area.
    pub fn new(dimension: usize, sphere_radius: f64) -> Self {
        let edge = (2.0 * PI * sphere_radius * sphere_radius).sqrt();
        Self {
            dimension,
            sphere_radius,
            step_size: edge / dimension as f64,
            max_coord: edge / 2.0,
            north: Array2::zeros((dimension, dimension)),
            south: Array2::zeros((dimension, dimension)),
        }
    }

    /// Projects and accumulates every direction with unit weight.
    ///
    /// **How it Works**: In parallel mode every rayon partition fills a private
    /// projection, and the partial squares are summed once all partitions finish.
    pub fn from_xyz_coords(
        coords: &[Vector3<f64>],
        dimension: usize,
        sphere_radius: f64,
        mode: ExecutionMode,
    ) -> Self {
        let projection = match mode {
            ExecutionMode::Sequential => {
                let mut p = Self::new(dimension, sphere_radius);
                p.accumulate_coords(coords);
                p
            }
            ExecutionMode::Parallel => coords
                .par_chunks(PARTITION_SIZE)
                .fold(
                    || Self::new(dimension, sphere_radius),
                    |mut p, chunk| {
                        p.accumulate_coords(chunk);
                        p
                    },
                )
                .reduce(
                    || Self::new(dimension, sphere_radius),
                    |mut a, b| {
                        a.north += &b.north;
                        a.south += &b.south;
                        a
                    },
                ),
        };
        tracing::debug!(
            "Projected {} directions onto {}x{} Lambert squares",
            coords.len(),
            dimension,
            dimension
        );
        projection
    }

    fn accumulate_coords(&mut self, coords: &[Vector3<f64>]) {
        for xyz in coords {
            let (hemisphere, coord) = self.square_coord(xyz);
            self.add_interpolated_values(hemisphere, &coord, 1.0);
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn step_size(&self) -> f64 {
        self.step_size
    }

    pub fn max_coord(&self) -> f64 {
        self.max_coord
    }

    pub fn square(&self, hemisphere: Hemisphere) -> &Array2<f64> {
        match hemisphere {
            Hemisphere::North => &self.north,
            Hemisphere::South => &self.south,
        }
    }

    pub fn square_mut(&mut self, hemisphere: Hemisphere) -> &mut Array2<f64> {
        match hemisphere {
            Hemisphere::North => &mut self.north,
            Hemisphere::South => &mut self.south,
        }
    }

    /// Equal-area coordinates of a direction in its hemisphere's square. The
    /// upper edge is pulled just inside the square so it lands in the last cell.
    pub fn square_coord(&self, xyz: &Vector3<f64>) -> (Hemisphere, [f64; 2]) {
        let (hemisphere, adjust) = if xyz.z >= 0.0 {
            (Hemisphere::North, -1.0)
        } else {
            (Hemisphere::South, 1.0)
        };
        if xyz.x == 0.0 && xyz.y == 0.0 {
            return (hemisphere, [0.0, 0.0]);
        }
        let r = self.sphere_radius;
        let radial = (2.0 * r * (r + xyz.z * adjust)).max(0.0).sqrt();
        let mut coord = if xyz.x.abs() >= xyz.y.abs() {
            let sign = xyz.x.signum();
            [
                sign * radial * HALF_SQRT_PI,
                sign * radial * FRAC_2_SQRT_PI * (xyz.y / xyz.x).atan(),
            ]
        } else {
            let sign = xyz.y.signum();
            [
                sign * radial * FRAC_2_SQRT_PI * (xyz.x / xyz.y).atan(),
                sign * radial * HALF_SQRT_PI,
            ]
        };
        for c in coord.iter_mut() {
            if *c >= self.max_coord {
                *c = self.max_coord - 0.0001;
            }
        }
        (hemisphere, coord)
    }

    /// Resolves the bilinear neighbourhood of a square coordinate.
    fn stencil(&self, coord: &[f64; 2]) -> Stencil {
        let dim = self.dimension as isize;
        let in_range = |b: isize| (0..dim).contains(&b);

        let mod_x = (coord[0] + self.max_coord) / self.step_size;
        let mod_y = (coord[1] + self.max_coord) / self.step_size;
        let abin = (mod_x as isize).clamp(0, dim - 1);
        let bbin = (mod_y as isize).clamp(0, dim - 1);
        let frac_x = mod_x - abin as f64 - 0.5;
        let frac_y = mod_y - bbin as f64 - 0.5;
        let a_sign: isize = if frac_x < 0.0 { -1 } else { 1 };
        let b_sign: isize = if frac_y < 0.0 { -1 } else { 1 };

        let (mut a2, mut b2) = (abin + a_sign, bbin);
        if !in_range(a2) {
            a2 -= a_sign * dim;
            b2 = dim - b2 - 1;
        }
        let (mut a3, mut b3) = (abin, bbin + b_sign);
        if !in_range(b3) {
            a3 = dim - a3 - 1;
            b3 -= b_sign * dim;
        }
        let (mut a4, mut b4) = (abin + a_sign, bbin + b_sign);
        match (in_range(a4), in_range(b4)) {
            (false, true) => {
                a4 -= a_sign * dim;
                b4 = dim - b4 - 1;
            }
            (true, false) => {
                a4 = dim - a4 - 1;
                b4 -= b_sign * dim;
            }
            (false, false) => {
                a4 -= a_sign * dim;
                b4 -= b_sign * dim;
            }
            (true, true) => {}
        }

        let (mx, my) = (frac_x.abs(), frac_y.abs());
        let cell = |a: isize, b: isize| (b.clamp(0, dim - 1) as usize, a.clamp(0, dim - 1) as usize);
        Stencil {
            cells: [cell(abin, bbin), cell(a2, b2), cell(a3, b3), cell(a4, b4)],
            weights: [
                (1.0 - mx) * (1.0 - my),
                mx * (1.0 - my),
                (1.0 - mx) * my,
                mx * my,
            ],
        }
    }

    /// Scatters `value` over the four cells nearest `coord`.
    pub fn add_interpolated_values(&mut self, hemisphere: Hemisphere, coord: &[f64; 2], value: f64) {
        let stencil = self.stencil(coord);
        let square = self.square_mut(hemisphere);
        for (cell, weight) in stencil.cells.iter().zip(stencil.weights) {
            square[*cell] += value * weight;
        }
    }

    /// Bilinear read of the four cells nearest `coord`.
    pub fn interpolated_value(&self, hemisphere: Hemisphere, coord: &[f64; 2]) -> f64 {
        let stencil = self.stencil(coord);
        let square = self.square(hemisphere);
        stencil
            .cells
            .iter()
            .zip(stencil.weights)
            .map(|(cell, weight)| square[*cell] * weight)
            .sum()
    }

    /// Scales each square to sum to one. A square with no weight is left as is.
    pub fn normalize_squares(&mut self) {
        for square in [&mut self.north, &mut self.south] {
            let total = square.sum();
            if total > 0.0 {
                square.mapv_inplace(|v| v / total);
            }
        }
    }

    /// Normalises to multiples of a random distribution, so a uniform square reads 1 everywhere.
    pub fn normalize_squares_to_mrd(&mut self) {
        self.normalize_squares();
        let cells = (self.dimension * self.dimension) as f64;
        self.north.mapv_inplace(|v| v * cells);
        self.south.mapv_inplace(|v| v * cells);
    }

    /// Resamples both squares onto a `dim x dim` stereographic image indexed `[y, x]`.
    ///
    /// **How it Works**: Each pixel centre inside the unit circle is lifted back to
    /// the sphere. The pixel takes the mean of the interpolated values at that
    /// direction and its antipode, which makes every pole figure centrosymmetric.
    pub fn create_stereographic_projection(&self, dim: usize) -> Array2<f64> {
        let mut intensity = Array2::zeros((dim, dim));
        let res = 2.0 / dim as f64;
        let half = (dim / 2) as f64;
        for ((y, x), pixel) in intensity.indexed_iter_mut() {
            let xtmp = (x as f64 - half) * res + res * 0.5;
            let ytmp = (y as f64 - half) * res + res * 0.5;
            let r2 = xtmp * xtmp + ytmp * ytmp;
            if r2 > 1.0 {
                continue;
            }
            let z = -(r2 - 1.0) / (r2 + 1.0);
            let xyz = Vector3::new(xtmp * (1.0 + z), ytmp * (1.0 + z), z);
            let sum: f64 = [xyz, -xyz]
                .iter()
                .map(|v| {
                    let (hemisphere, coord) = self.square_coord(v);
                    self.interpolated_value(hemisphere, &coord)
                })
                .sum();
            *pixel = sum * 0.5;
        }
        intensity
    }
}
