use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use image::{ImageFormat, RgbaImage};
use itertools::Itertools;
use ndarray::Array2;
use serde::Serialize;

use crate::laue::IpfColor;
use crate::orientation::Euler;

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("crystalops_output_{}", name));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn png_reloads_with_alpha() {
        let dir = scratch_dir("png");
        let mut img = RgbaImage::from_pixel(3, 2, image::Rgba([10, 20, 30, 255]));
        img.put_pixel(2, 1, image::Rgba([1, 2, 3, 0]));
        let path = write_png(&dir, "img.png", &img).unwrap();
        let reloaded = image::open(&path).unwrap().to_rgba8();
        assert_eq!(reloaded, img);
        assert_eq!(image::ImageFormat::from_path(&path).unwrap(), ImageFormat::Png);
    }

    #[test]
    fn intensity_rows_are_written() {
        let dir = scratch_dir("intensity");
        let grid = Array2::from_shape_vec((2, 3), vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.5]).unwrap();
        let path = write_intensity(&dir, "grid.dat", &grid).unwrap();
        let text = fs::read_to_string(path).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "3 4 5.5");
    }

    #[test]
    fn ipf_rows_mark_missing_matches() {
        let dir = scratch_dir("ipf");
        let eulers = vec![Euler::new(0.0, 0.5, 1.0), Euler::new(0.1, 0.2, 0.3)];
        let colors = vec![IpfColor::InTriangle([255, 0, 12]), IpfColor::NoMatch];
        let path = write_ipf_colors(&dir, &eulers, &colors).unwrap();
        let text = fs::read_to_string(path).unwrap();
        let lines: Vec<_> = text.lines().filter(|l| !l.starts_with('#')).collect();
        assert_eq!(lines[0], "0 0.5 1 255 0 12");
        assert!(lines[1].ends_with("-1 -1 -1"), "{}", lines[1]);
    }

    #[test]
    fn summary_is_json() {
        let dir = scratch_dir("summary");
        let summary = Summary::new("Cubic m-3m".into(), 5);
        let path = write_summary(&dir, &summary).unwrap();
        let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(value["num_orientations"], 5);
        assert_eq!(value["symmetry"], "Cubic m-3m");
    }
}

/// Creates the output directory if needed and returns the path of `file_name` in it.
fn output_path(directory: &Path, file_name: &str) -> Result<PathBuf> {
    fs::create_dir_all(directory)
        .with_context(|| format!("Failed to create output directory {:?}", directory))?;
    Ok(directory.join(file_name))
}

fn create(path: &Path) -> Result<BufWriter<File>> {
    let file = File::create(path).with_context(|| format!("Failed to create {:?}", path))?;
    Ok(BufWriter::new(file))
}

/// Writes an RGBA image as PNG.
pub fn write_png(directory: &Path, file_name: &str, image: &RgbaImage) -> Result<PathBuf> {
    let path = output_path(directory, file_name)?;
    image
        .save_with_format(&path, ImageFormat::Png)
        .with_context(|| format!("Failed to write image {:?}", path))?;
    Ok(path)
}

/// Writes a `[y, x]` grid as whitespace separated text, one image row per line.
pub fn write_intensity(directory: &Path, file_name: &str, grid: &Array2<f64>) -> Result<PathBuf> {
    let path = output_path(directory, file_name)?;
    let mut writer = create(&path)?;
    for row in grid.outer_iter() {
        writeln!(writer, "{}", row.iter().join(" "))?;
    }
    writer.flush()?;
    Ok(path)
}

/// Writes one `phi1 Phi phi2 r g b` row per orientation. Orientations with no
/// unit-triangle match get `-1 -1 -1` as their colour.
pub fn write_ipf_colors(directory: &Path, eulers: &[Euler], colors: &[IpfColor]) -> Result<PathBuf> {
    let path = output_path(directory, "ipf_colors.dat")?;
    let mut writer = create(&path)?;
    writeln!(writer, "# phi1 Phi phi2 (radians) r g b")?;
    for (euler, color) in eulers.iter().zip(colors) {
        let rgb = match color.rgb() {
            Some(rgb) => rgb.iter().join(" "),
            None => "-1 -1 -1".to_string(),
        };
        writeln!(writer, "{} {}", euler.as_array().iter().join(" "), rgb)?;
    }
    writer.flush()?;
    Ok(path)
}

/// Per-figure entry of the run summary.
#[derive(Debug, Clone, Serialize)]
pub struct FigureSummary {
    pub label: String,
    pub file: String,
    pub min: f64,
    pub max: f64,
}

/// Counts from the IPF colouring stage.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IpfSummary {
    pub reference_direction: [f64; 3],
    pub matched: usize,
    pub no_match: usize,
}

/// Machine-readable record of a run.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub timestamp: String,
    pub symmetry: String,
    pub num_orientations: usize,
    pub pole_figures: Vec<FigureSummary>,
    pub ipf: Option<IpfSummary>,
    pub elapsed_seconds: f64,
}

impl Summary {
    pub fn new(symmetry: String, num_orientations: usize) -> Self {
        Self {
            timestamp: chrono::Local::now().to_rfc3339(),
            symmetry,
            num_orientations,
            pole_figures: Vec::new(),
            ipf: None,
            elapsed_seconds: 0.0,
        }
    }
}

pub fn write_summary(directory: &Path, summary: &Summary) -> Result<PathBuf> {
    let path = output_path(directory, "summary.json")?;
    let mut writer = create(&path)?;
    serde_json::to_writer_pretty(&mut writer, summary)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(path)
}

/// Writes any serialisable settings value as TOML, so a run can be repeated.
pub fn write_toml<T: Serialize>(directory: &Path, file_name: &str, value: &T) -> Result<PathBuf> {
    let path = output_path(directory, file_name)?;
    let text = toml::to_string_pretty(value).context("Failed to serialise settings")?;
    fs::write(&path, text).with_context(|| format!("Failed to write {:?}", path))?;
    Ok(path)
}
