//! Textured orientation sets.
//!
//! An orientation distribution function (ODF) is held as a normalised
//! histogram over a Laue class's homochoric grid. It is built from a random
//! background plus weighted texture components, then sampled bin by bin with
//! [`LaueOps::determine_euler_angles`].

use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Result};
use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::conversions;
use crate::laue::{HomochoricGrid, LaueOps};
use crate::orientation::{random_quaternion, Euler};


/// A preferred orientation and how strongly it is represented in an ODF.
///
/// `weight` is in units of multiples of random: the ODF holds three times its
/// bin count in total weight, so a weight of several thousand is a sharp texture
/// for the cubic grid. `sigma` is the spread radius in grid cells.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TextureComponent {
    pub euler: Euler,
    pub weight: f64,
    #[serde(default)]
    pub sigma: u32,
}

impl TextureComponent {
    pub fn new(euler: Euler, weight: f64, sigma: u32) -> Self {
        Self {
            euler,
            weight,
            sigma,
        }
    }
}

impl fmt::Display for TextureComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} x{} (sigma {})", self.euler, self.weight, self.sigma)
    }
}

impl FromStr for TextureComponent {
    type Err = String;

    /// Parses `"phi1,Phi,phi2,weight,sigma"` with the angles in degrees.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 5 {
            return Err(format!(
                "Invalid texture component '{}'. Expected 'phi1,Phi,phi2,weight,sigma'",
                s
            ));
        }
        let euler: Euler = parts[..3].join(",").parse()?;
        let weight = parts[3]
            .parse::<f64>()
            .map_err(|_| format!("Failed to parse weight: {}", parts[3]))?;
        if weight.is_nan() || weight < 0.0 {
            return Err(format!("Texture weight must be non-negative, got {}", weight));
        }
        let sigma = parts[4]
            .parse::<u32>()
            .map_err(|_| format!("Failed to parse sigma: {}", parts[4]))?;
        Ok(Self::new(euler.to_radians(true), weight, sigma))
    }
}

/// Normalised ODF histogram over a class's homochoric grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Odf {
    pub weights: Vec<f64>,
}

impl Odf {
    /// Builds the ODF for `components` in the class `ops`.
    ///
    /// **How it Works**: Each component deposits its weight on its own bin and,
    /// for `sigma > 0`, on every bin within `sigma` cells with a quadratic
    /// fall-off. The grid holds `3 * num_bins` in total. Component weight beyond
    /// that is scaled down to fit; any weight left over is filled with uniformly
    /// random orientations, one unit each. The result is normalised to sum to one.
    pub fn from_components(ops: &dyn LaueOps, components: &[TextureComponent], rng: &mut dyn RngCore) -> Odf {
        let grid = ops.homochoric_grid();
        let total_weight = 3.0 * grid.num_bins() as f64;
        let mut weights = vec![0.0; grid.num_bins()];

        for c in components {
            let bin = ops.odf_bin(&ops.odf_fz_rod(&conversions::euler_to_rod(&c.euler)));
            spread_component(grid, &mut weights, bin, c.weight, c.sigma);
        }

        let added: f64 = weights.iter().sum();
        if added > total_weight {
            let scale = total_weight / added;
            weights.iter_mut().for_each(|w| *w *= scale);
        }
        let remaining = (total_weight - added).max(0.0).round() as usize;
        tracing::debug!(
            "{}: ODF from {} components, {} random fill",
            ops.name(),
            components.len(),
            remaining
        );
        for _ in 0..remaining {
            let r = conversions::quat_to_rod(&random_quaternion(&mut *rng));
            weights[ops.odf_bin(&ops.odf_fz_rod(&r))] += 1.0;
        }

        let sum: f64 = weights.iter().sum();
        if sum > 0.0 {
            weights.iter_mut().for_each(|w| *w /= sum);
        }
        Odf { weights }
    }

    /// Draws `n` orientations, choosing bins in proportion to their weight.
    pub fn sample(&self, ops: &dyn LaueOps, n: usize, rng: &mut dyn RngCore) -> Result<Vec<Euler>> {
        let dist: WeightedIndex<f64> = WeightedIndex::new(self.weights.iter().copied())
            .map_err(|e| anyhow!("Invalid ODF: {}", e))?;
        Ok((0..n)
            .map(|_| {
                let choose = dist.sample(&mut *rng);
                ops.determine_euler_angles(&mut *rng, choose)
            })
            .collect())
    }
}

/// Adds `weight` to `bin` and, for `sigma > 0`, to its neighbours within `sigma`
/// cells, scaled by `1 - (d / sigma)^2`. Neighbour indices wrap around each axis.
fn spread_component(
    grid: &HomochoricGrid,
    weights: &mut [f64],
    bin: usize,
    weight: f64,
    sigma: u32,
) {
    if sigma == 0 {
        weights[bin] += weight;
        return;
    }
    let centre = grid.decode(bin);
    let s = sigma as i64;
    let sigma = sigma as f64;
    for l in -s..=s {
        for k in -s..=s {
            for j in -s..=s {
                let dist = ((j * j + k * k + l * l) as f64).sqrt();
                if dist > sigma {
                    continue;
                }
                let idx: [usize; 3] = std::array::from_fn(|i| {
                    let offset = [j, k, l][i];
                    (centre[i] as i64 + offset).rem_euclid(grid.bins[i] as i64) as usize
                });
                let flat = grid.bins[0] * grid.bins[1] * idx[2] + grid.bins[0] * idx[1] + idx[0];
                weights[flat] += weight * (1.0 - (dist / sigma).powi(2));
            }
        }
    }
}
