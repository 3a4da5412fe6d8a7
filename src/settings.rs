use anyhow::{anyhow, ensure, Context, Result};
use clap::Parser;
use config::{Config, Environment, File};
use nalgebra::Vector3;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::PathBuf;

use crate::compositing::Layout;
use crate::laue::{ExecutionMode, SymmetryClass};
use crate::orientation::{Euler, Scheme};
use crate::pole_figure::PoleFigureConfig;
use crate::texture::TextureComponent;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_loads() {
        let settings = load_default_config().unwrap();
        assert_eq!(settings.symmetry, SymmetryClass::Cubic);
        assert!(settings.image_dim > 0);
        assert_eq!(settings.reference_direction, [0.0, 0.0, 1.0]);
    }

    #[test]
    fn cli_overrides_file_values() {
        let mut settings = load_default_config().unwrap();
        let args = CliArgs::parse_from([
            "crystalops",
            "--symmetry",
            "trigonal-low",
            "--image-dim",
            "64",
            "--sequential",
            "--ref-dir",
            "1,0,0",
            "--uniform",
            "12",
        ]);
        apply_cli_args(&mut settings, args);
        assert_eq!(settings.symmetry, SymmetryClass::TrigonalLow);
        assert_eq!(settings.image_dim, 64);
        assert!(!settings.parallel);
        assert_eq!(settings.reference_direction, [1.0, 0.0, 0.0]);
        assert_eq!(settings.orientation, Scheme::Uniform { num_orients: 12 });
    }

    #[test]
    fn discrete_eulers_from_cli_are_degrees() {
        let mut settings = load_default_config().unwrap();
        let args = CliArgs::parse_from(["crystalops", "--discrete", "90,0,0", "0,45,0"]);
        apply_cli_args(&mut settings, args);
        match settings.orientation {
            Scheme::Discrete { eulers } => {
                assert_eq!(eulers.len(), 2);
                assert!((eulers[0].phi1 - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
            }
            other => panic!("unexpected scheme {:?}", other),
        }
    }

    #[test]
    fn odf_scheme_from_cli() {
        let mut settings = load_default_config().unwrap();
        let args = CliArgs::parse_from([
            "crystalops",
            "--odf",
            "40",
            "--texture",
            "0,45,0,5000,1",
            "30,0,0,100,0",
        ]);
        apply_cli_args(&mut settings, args);
        match &settings.orientation {
            Scheme::Odf {
                num_orients,
                components,
            } => {
                assert_eq!(*num_orients, 40);
                assert_eq!(components.len(), 2);
                assert!((components[0].euler.phi - std::f64::consts::FRAC_PI_4).abs() < 1e-12);
                assert_eq!(components[1].sigma, 0);
            }
            other => panic!("unexpected scheme {:?}", other),
        }
        assert!(validate_config(&settings).is_ok());
        assert!(CliArgs::try_parse_from(["crystalops", "--odf", "40"]).is_err());
    }

    #[test]
    fn odf_scheme_needs_components() {
        let mut settings = load_default_config().unwrap();
        settings.orientation = Scheme::Odf {
            num_orients: 10,
            components: vec![],
        };
        assert!(validate_config(&settings).is_err());
    }

    #[test]
    fn validation_rejects_zero_dimensions() {
        let mut settings = load_default_config().unwrap();
        settings.lambert_dim = 0;
        assert!(validate_config(&settings).is_err());
        let mut settings = load_default_config().unwrap();
        settings.reference_direction = [0.0; 3];
        assert!(validate_config(&settings).is_err());
    }

    #[test]
    fn parse_direction_rejects_garbage() {
        assert_eq!(parse_direction("0, 1 ,0").unwrap(), [0.0, 1.0, 0.0]);
        assert!(parse_direction("0,1").is_err());
        assert!(parse_direction("a,b,c").is_err());
    }
}

/// Runtime configuration for the application.
#[pyclass]
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Settings {
    pub symmetry: SymmetryClass,
    pub image_dim: usize,
    pub lambert_dim: usize,
    pub num_colors: usize,
    #[serde(default)]
    pub layout: Layout,
    /// Sample direction coloured by the inverse pole figure.
    #[serde(default = "default_reference_direction")]
    pub reference_direction: [f64; 3],
    #[serde(default = "default_parallel")]
    pub parallel: bool,
    pub orientation: Scheme,
    #[serde(default)]
    pub seed: Option<u64>,
    /// Titles for the three pole figures. Missing entries use the class defaults.
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

fn default_reference_direction() -> [f64; 3] {
    [0.0, 0.0, 1.0]
}

fn default_parallel() -> bool {
    true
}

fn default_output_dir() -> String {
    "output".to_string()
}

#[pymethods]
impl Settings {
    #[new]
    #[pyo3(signature = (symmetry, num_orients, image_dim = 256, lambert_dim = 64, num_colors = 32, seed = None))]
    fn py_new(
        symmetry: &str,
        num_orients: usize,
        image_dim: usize,
        lambert_dim: usize,
        num_colors: usize,
        seed: Option<u64>,
    ) -> PyResult<Self> {
        let symmetry: SymmetryClass = symmetry.parse().map_err(PyValueError::new_err)?;
        let settings = Settings {
            symmetry,
            image_dim,
            lambert_dim,
            num_colors,
            layout: Layout::default(),
            reference_direction: default_reference_direction(),
            parallel: default_parallel(),
            orientation: Scheme::Uniform { num_orients },
            seed,
            labels: Vec::new(),
            output_dir: default_output_dir(),
        };
        validate_config(&settings).map_err(|e| PyValueError::new_err(e.to_string()))?;
        Ok(settings)
    }

    /// Set explicit Euler angles in radians, replacing the orientation scheme
    #[setter]
    fn set_eulers(&mut self, eulers: Vec<[f64; 3]>) {
        self.orientation = Scheme::Discrete {
            eulers: eulers.iter().map(|e| Euler::new(e[0], e[1], e[2])).collect(),
        };
    }

    /// Get the Euler angles, assuming the orientation scheme is discrete
    #[getter]
    fn get_eulers(&self) -> Vec<[f64; 3]> {
        match &self.orientation {
            Scheme::Discrete { eulers } => eulers.iter().map(Euler::as_array).collect(),
            _ => Vec::new(),
        }
    }

    #[getter]
    fn get_symmetry(&self) -> String {
        self.symmetry.to_string()
    }

    #[setter]
    fn set_reference_direction(&mut self, direction: [f64; 3]) {
        self.reference_direction = direction;
    }

    fn __repr__(&self) -> String {
        self.to_string()
    }
}

impl Settings {
    pub fn execution_mode(&self) -> ExecutionMode {
        ExecutionMode::from(self.parallel)
    }

    pub fn reference_direction(&self) -> Vector3<f64> {
        Vector3::from(self.reference_direction)
    }

    pub fn output_directory(&self) -> PathBuf {
        PathBuf::from(&self.output_dir)
    }

    /// Pole figure inputs for the given orientations.
    pub fn pole_figure_config(&self, eulers: Vec<Euler>) -> PoleFigureConfig {
        PoleFigureConfig {
            eulers,
            image_dim: self.image_dim,
            lambert_dim: self.lambert_dim,
            num_colors: self.num_colors,
            labels: self.labels.clone(),
            order: [0, 1, 2],
            mode: self.execution_mode(),
        }
    }
}

pub fn load_default_config() -> Result<Settings> {
    let root = retrieve_project_root()?;
    let default_config_file = root.join("config/default.toml");

    let settings = Config::builder()
        .add_source(File::from(default_config_file).required(true))
        .build()
        .context("Error loading configuration")?;

    let config: Settings = settings
        .try_deserialize()
        .context("Error deserializing configuration")?;

    validate_config(&config)?;

    Ok(config)
}

/// Loads `config/default.toml`, or `config/local.toml` when present, then
/// environment variables prefixed `CRYSTALOPS_`, then command line flags.
pub fn load_config() -> Result<Settings> {
    let root = retrieve_project_root()?;

    let default_config_file = root.join("config/default.toml");
    let local_config = root.join("config/local.toml");

    let config_file = if local_config.exists() {
        println!("Using local configuration: {:?}", local_config);
        local_config
    } else {
        println!("Using default configuration: {:?}", default_config_file);
        default_config_file
    };

    let settings = Config::builder()
        .add_source(File::from(config_file).required(true))
        .add_source(Environment::with_prefix("crystalops"))
        .build()
        .context("Error loading configuration")?;

    let mut config: Settings = settings
        .try_deserialize()
        .context("Error deserializing configuration")?;

    apply_cli_args(&mut config, CliArgs::parse());

    validate_config(&config)?;

    tracing::debug!("{:#?}", config);

    Ok(config)
}

/// Overrides configuration values with whatever was given on the command line.
pub fn apply_cli_args(config: &mut Settings, args: CliArgs) {
    if let Some(symmetry) = args.symmetry {
        config.symmetry = symmetry;
    }
    if let Some(dim) = args.image_dim {
        config.image_dim = dim;
    }
    if let Some(dim) = args.lambert_dim {
        config.lambert_dim = dim;
    }
    if let Some(n) = args.num_colors {
        config.num_colors = n;
    }
    if let Some(layout) = args.layout {
        config.layout = layout;
    }
    if let Some(dir) = args.ref_dir {
        config.reference_direction = dir;
    }
    if args.sequential {
        config.parallel = false;
    }
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    if let Some(dir) = args.output_dir {
        config.output_dir = dir;
    }
    if let Some(labels) = args.labels {
        config.labels = labels;
    }

    // Handle orientation schemes
    if let Some(num_orients) = args.uniform {
        config.orientation = Scheme::Uniform { num_orients };
    } else if let Some(path) = args.file {
        config.orientation = Scheme::File {
            path,
            degrees: args.degrees,
        };
    } else if let Some(eulers) = args.discrete {
        config.orientation = Scheme::Discrete { eulers };
    } else if let Some(num_orients) = args.odf {
        config.orientation = Scheme::Odf {
            num_orients,
            components: args.texture.unwrap_or_default(),
        };
    }
}

/// Retrieve the project root directory.
/// This function tries to find the project root directory in different ways:
/// 1. If the CARGO_MANIFEST_DIR environment variable is set, use it.
/// 2. If the CRYSTALOPS_ROOT_DIR environment variable is set, use it.
/// 3. If the "config" subdirectory is found in the executable directory or any of its parents, use it.
pub fn retrieve_project_root() -> Result<PathBuf> {
    if let Ok(manifest_dir) = env::var("CARGO_MANIFEST_DIR") {
        return Ok(PathBuf::from(manifest_dir));
    }
    if let Ok(path) = env::var("CRYSTALOPS_ROOT_DIR") {
        return Ok(PathBuf::from(path));
    }
    let exe_path = env::current_exe().context("Failed to get current executable path")?;
    exe_path
        .ancestors()
        .skip(1)
        .find(|dir| dir.join("config").is_dir())
        .map(PathBuf::from)
        .ok_or_else(|| anyhow!("Could not find project root directory"))
}

pub fn validate_config(config: &Settings) -> Result<()> {
    ensure!(config.image_dim > 0, "Image dimension must be greater than 0");
    ensure!(config.lambert_dim > 0, "Lambert dimension must be greater than 0");
    ensure!(config.num_colors > 0, "Number of colours must be greater than 0");
    ensure!(
        Vector3::from(config.reference_direction).norm() > 0.0,
        "Reference direction must be non-zero"
    );
    match &config.orientation {
        Scheme::Uniform { num_orients } => {
            ensure!(*num_orients > 0, "Uniform scheme needs at least one orientation");
        }
        Scheme::Odf {
            num_orients,
            components,
        } => {
            ensure!(*num_orients > 0, "ODF scheme needs at least one orientation");
            ensure!(!components.is_empty(), "ODF scheme needs at least one texture component");
            ensure!(
                components.iter().all(|c| c.weight >= 0.0),
                "Texture component weights must be non-negative"
            );
        }
        _ => {}
    }
    Ok(())
}

#[derive(Parser, Debug)]
#[command(version, about = "crystalops - crystal symmetry, pole figures and IPF colouring")]
pub struct CliArgs {
    /// Laue class of the crystal.
    #[arg(short, long, value_enum)]
    symmetry: Option<SymmetryClass>,

    /// Edge length of each pole figure image in pixels.
    #[arg(long)]
    image_dim: Option<usize>,

    /// Edge length of the Lambert squares used to accumulate directions.
    #[arg(long)]
    lambert_dim: Option<usize>,

    /// Number of colours in the intensity ramp.
    #[arg(long)]
    num_colors: Option<usize>,

    /// Arrangement of the composite pole figure image.
    #[arg(long, value_enum)]
    layout: Option<Layout>,

    /// Sample reference direction for IPF colouring.
    /// Format: x,y,z
    #[arg(long, value_parser = parse_direction)]
    ref_dir: Option<[f64; 3]>,

    /// Run every stage on a single thread.
    #[arg(long)]
    sequential: bool,

    /// Random seed for generated orientations.
    #[arg(long)]
    seed: Option<u64>,

    /// Directory that receives all output files.
    #[arg(short, long)]
    output_dir: Option<String>,

    /// Titles for the three pole figures, separated by spaces.
    #[arg(long, num_args = 1..=3, value_delimiter = ' ')]
    labels: Option<Vec<String>>,

    /// Use uniformly random orientations, with the given count.
    #[arg(long, group = "orientation")]
    uniform: Option<usize>,

    /// Read orientations from a text file of `phi1 Phi phi2` rows.
    #[arg(short, long, group = "orientation")]
    file: Option<String>,

    /// Angles in the orientation file are in degrees.
    #[arg(long, requires = "file")]
    degrees: bool,

    /// Use explicit Euler angles (in degrees).
    /// Format: phi1,Phi,phi2 phi1,Phi,phi2 ...
    #[arg(long, value_parser = parse_euler_degrees, num_args = 1.., value_delimiter = ' ', group = "orientation")]
    discrete: Option<Vec<Euler>>,

    /// Sample orientations from a textured ODF, with the given count.
    #[arg(long, group = "orientation", requires = "texture")]
    odf: Option<usize>,

    /// Texture components for the ODF (angles in degrees).
    /// Format: phi1,Phi,phi2,weight,sigma ...
    #[arg(long, num_args = 1.., value_delimiter = ' ', requires = "odf")]
    texture: Option<Vec<TextureComponent>>,
}

/// Parse a string of Euler angles in degrees in the format "phi1,Phi,phi2"
fn parse_euler_degrees(s: &str) -> Result<Euler, String> {
    let euler: Euler = s.parse()?;
    Ok(euler.to_radians(true))
}

/// Parse a direction in the format "x,y,z"
fn parse_direction(s: &str) -> Result<[f64; 3], String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    if parts.len() != 3 {
        return Err(format!("Invalid direction '{}'. Expected 'x,y,z'", s));
    }
    let mut out = [0.0; 3];
    for (value, text) in out.iter_mut().zip(&parts) {
        *value = text
            .parse::<f64>()
            .map_err(|_| format!("Failed to parse direction component: {}", text))?;
    }
    Ok(out)
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Settings:
  - Symmetry: {}
  - Image Dimension: {}
  - Lambert Dimension: {}
  - Colours: {}
  - Layout: {:?}
  - Reference Direction: {:?}
  - Parallel: {}
  - Orientation: {:?}
  - Output Directory: {}
  ",
            self.symmetry,
            self.image_dim,
            self.lambert_dim,
            self.num_colors,
            self.layout,
            self.reference_direction,
            self.parallel,
            self.orientation,
            self.output_dir,
        )
    }
}
