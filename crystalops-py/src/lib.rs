use crystalops::{
    analysis::Analysis,
    laue::{ExecutionMode, SymmetryClass},
    orientation::{Euler, Orientations},
    pole_figure, quaternion,
    settings::Settings,
};
use nalgebra::Vector3;
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

fn parse_symmetry(symmetry: &str) -> PyResult<SymmetryClass> {
    symmetry.parse().map_err(PyValueError::new_err)
}

/// Minimum misorientation between two orientations given as `[x, y, z, w]` quaternions.
/// Returns the angle in radians and the unit rotation axis.
#[pyfunction]
fn misorientation(symmetry: &str, q1: [f64; 4], q2: [f64; 4]) -> PyResult<(f64, [f64; 3])> {
    let ops = parse_symmetry(symmetry)?.ops();
    let ax = ops.miso_quat(&quaternion::from_xyzw(&q1), &quaternion::from_xyzw(&q2));
    Ok((ax.angle, ax.axis.into()))
}

/// Misorientation angles (radians) of a flat `[phi1, Phi, phi2, ...]` Euler buffer
/// against a single reference orientation.
#[pyfunction]
#[pyo3(signature = (symmetry, eulers, reference, degrees = false))]
fn misorientations(symmetry: &str, eulers: Vec<f64>, reference: [f64; 3], degrees: bool) -> PyResult<Vec<f64>> {
    let ops = parse_symmetry(symmetry)?.ops();
    let orientations =
        Orientations::from_flat(&eulers, degrees).map_err(|e| PyValueError::new_err(format!("{:#}", e)))?;
    let reference = Euler::new(reference[0], reference[1], reference[2]).to_radians(degrees);
    Ok(orientations
        .misorientations_to(ops, &reference.to_quaternion())
        .into_iter()
        .map(|ax| ax.angle)
        .collect())
}

/// IPF colour of a Bunge Euler triple for a sample reference direction.
/// Returns `None` when no symmetry-equivalent direction falls in the unit triangle.
#[pyfunction]
#[pyo3(signature = (symmetry, euler, ref_dir, degrees = false))]
fn ipf_color(symmetry: &str, euler: [f64; 3], ref_dir: [f64; 3], degrees: bool) -> PyResult<Option<[u8; 3]>> {
    let ops = parse_symmetry(symmetry)?.ops();
    let euler = Euler::new(euler[0], euler[1], euler[2]);
    Ok(ops.generate_ipf_color(&euler, &Vector3::from(ref_dir), degrees).rgb())
}

/// MRD stereographic intensities of the three pole families, as nested `[y][x]` lists.
#[pyfunction]
#[pyo3(signature = (symmetry, eulers, image_dim = 128, lambert_dim = 64, parallel = true))]
fn pole_figure_intensities(
    symmetry: &str,
    eulers: Vec<[f64; 3]>,
    image_dim: usize,
    lambert_dim: usize,
    parallel: bool,
) -> PyResult<Vec<(String, Vec<Vec<f64>>)>> {
    if image_dim == 0 || lambert_dim == 0 {
        return Err(PyValueError::new_err("Dimensions must be greater than 0"));
    }
    let ops = parse_symmetry(symmetry)?.ops();
    let config = pole_figure::PoleFigureConfig {
        eulers: eulers.iter().map(|e| Euler::new(e[0], e[1], e[2])).collect(),
        image_dim,
        lambert_dim,
        mode: ExecutionMode::from(parallel),
        ..Default::default()
    };
    Ok(pole_figure::generate(ops, &config)
        .into_iter()
        .map(|figure| {
            let rows = figure.intensity.outer_iter().map(|row| row.to_vec()).collect();
            (figure.label, rows)
        })
        .collect())
}

/// Runs a full analysis and writes its outputs to `settings.output_dir`.
#[pyfunction]
fn analyse(settings: Settings) -> PyResult<()> {
    let run = || -> anyhow::Result<()> {
        let mut analysis = Analysis::new(settings)?;
        analysis.solve()?;
        analysis.writeup()
    };
    run().map_err(|e| PyRuntimeError::new_err(format!("{:#}", e)))
}

/// A Python module implemented in Rust.
#[pymodule]
fn _crystalops_py(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(misorientation, m)?)?;
    m.add_function(wrap_pyfunction!(misorientations, m)?)?;
    m.add_function(wrap_pyfunction!(ipf_color, m)?)?;
    m.add_function(wrap_pyfunction!(pole_figure_intensities, m)?)?;
    m.add_function(wrap_pyfunction!(analyse, m)?)?;
    m.add_class::<Settings>()?;
    Ok(())
}
