//! Slip-system analysis shared by the classes that define slip systems.
//!
//! A [`SlipSystems`] table pairs slip directions with slip plane normals in the
//! crystal frame. From it come the Schmid factor for a load axis and the
//! neighbour-grain transmission metrics (m', F1, F1spt, F7).

use nalgebra::{Quaternion, Vector3};

use crate::conversions::{self, clamp_unit, unit_or_z};
use crate::laue::SchmidFactor;


/// Slip directions paired by index with their plane normals, in the crystal frame.
#[derive(Debug)]
pub struct SlipSystems {
    pub directions: &'static [[f64; 3]],
    pub planes: &'static [[f64; 3]],
}

/// One slip system expressed in the sample frame, with its response to a load axis.
struct SampleSlipSystem {
    normal: Vector3<f64>,
    slip: Vector3<f64>,
    schmid: f64,
    /// `|cos|` between the load axis and the plane normal.
    load_component: f64,
}

/// Summed `|cos|` alignment of one slip system against all systems of the neighbour.
struct Alignment {
    normal: f64,
    slip: f64,
}

impl SlipSystems {
    fn pairs(&self) -> impl Iterator<Item = (Vector3<f64>, Vector3<f64>)> + '_ {
        self.directions
            .iter()
            .zip(self.planes)
            .map(|(d, n)| (Vector3::from(*d).normalize(), Vector3::from(*n).normalize()))
    }

    /// Highest Schmid factor over the systems for a load axis in the crystal frame.
    pub fn schmid_factor(&self, load: &Vector3<f64>) -> SchmidFactor {
        let load = unit_or_z(*load);
        let mut best = SchmidFactor {
            factor: -1.0,
            ..Default::default()
        };
        for (i, (d, n)) in self.pairs().enumerate() {
            let cos_phi = load.dot(&n).abs();
            let cos_lambda = load.dot(&d).abs();
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

    fn in_sample_frame(&self, q: &Quaternion<f64>, ld: &Vector3<f64>) -> Vec<SampleSlipSystem> {
        let gt = conversions::quat_to_mat(q).transpose();
        self.pairs()
            .map(|(d, n)| {
                let slip = (gt * d).normalize();
                let normal = (gt * n).normalize();
                let load_component = ld.dot(&normal).abs();
                SampleSlipSystem {
                    normal,
                    slip,
                    schmid: load_component * ld.dot(&slip).abs(),
                    load_component,
                }
            })
            .collect()
    }

    /// Luster-Morris slip transmission parameter between the most highly stressed
    /// systems of two neighbouring grains.
    pub fn m_prime(&self, q1: &Quaternion<f64>, q2: &Quaternion<f64>, ld: &Vector3<f64>) -> f64 {
        let ld = unit_or_z(*ld);
        let s1 = self.in_sample_frame(q1, &ld);
        let s2 = self.in_sample_frame(q2, &ld);
        let a = &s1[most_stressed(&s1)];
        let b = &s2[most_stressed(&s2)];
        a.slip.dot(&b.slip).abs() * a.normal.dot(&b.normal).abs()
    }

    pub fn f1(&self, q1: &Quaternion<f64>, q2: &Quaternion<f64>, ld: &Vector3<f64>, max_sf: bool) -> f64 {
        self.transfer_metric(q1, q2, ld, max_sf, |a, totals| {
            a.schmid * a.load_component * totals.normal
        })
    }

    pub fn f1spt(&self, q1: &Quaternion<f64>, q2: &Quaternion<f64>, ld: &Vector3<f64>, max_sf: bool) -> f64 {
        self.transfer_metric(q1, q2, ld, max_sf, |a, totals| {
            a.schmid * a.load_component * totals.normal * totals.slip
        })
    }

    pub fn f7(&self, q1: &Quaternion<f64>, q2: &Quaternion<f64>, ld: &Vector3<f64>, max_sf: bool) -> f64 {
        self.transfer_metric(q1, q2, ld, max_sf, |a, totals| {
            a.load_component * a.load_component * totals.normal
        })
    }

    /// Shared driver for the F1 family. With `max_sf` only the most highly stressed
    /// system of the first grain is scored, otherwise the best score over all systems.
    fn transfer_metric(
        &self,
        q1: &Quaternion<f64>,
        q2: &Quaternion<f64>,
        ld: &Vector3<f64>,
        max_sf: bool,
        score: impl Fn(&SampleSlipSystem, &Alignment) -> f64,
    ) -> f64 {
        let ld = unit_or_z(*ld);
        let s1 = self.in_sample_frame(q1, &ld);
        let s2 = self.in_sample_frame(q2, &ld);
        let evaluate = |a: &SampleSlipSystem| {
            let totals = s2.iter().fold(Alignment { normal: 0.0, slip: 0.0 }, |acc, b| Alignment {
                normal: acc.normal + a.normal.dot(&b.normal).abs(),
                slip: acc.slip + a.slip.dot(&b.slip).abs(),
            });
            score(a, &totals)
        };
        if max_sf {
            evaluate(&s1[most_stressed(&s1)])
        } else {
            s1.iter().map(evaluate).fold(0.0, f64::max)
        }
    }
}

fn most_stressed(systems: &[SampleSlipSystem]) -> usize {
    let mut best = 0;
    let mut max = 0.0;
    for (i, s) in systems.iter().enumerate() {
        if s.schmid > max {
            max = s.schmid;
            best = i;
        }
    }
    best
}
