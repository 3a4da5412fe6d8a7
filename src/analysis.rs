//! End-to-end texture analysis of one orientation set.
//!
//! An [`Analysis`] ties the library stages together for the command line tool:
//! - orientations are generated or loaded from the configured scheme
//! - pole figures are computed and composited
//! - every orientation gets an IPF colour for the reference direction
//! - results are written to the output directory with a JSON summary

use std::time::Instant;

use anyhow::Result;
use image::RgbaImage;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

use crate::compositing::{self, CompositeOptions};
use crate::laue::{ExecutionMode, IpfColor};
use crate::orientation::{Euler, Orientations};
use crate::output::{self, FigureSummary, IpfSummary, Summary};
use crate::pole_figure::PoleFigure;
use crate::settings::Settings;


/// A configured analysis and the results of its stages.
#[derive(Debug)]
pub struct Analysis {
    pub settings: Settings,
    pub orientations: Orientations,
    pub figures: Vec<PoleFigure>,
    pub composite: Option<RgbaImage>,
    pub ipf_colors: Vec<IpfColor>,
    elapsed_seconds: f64,
}

impl Analysis {
    /// Creates an analysis from settings, generating or loading its orientations.
    pub fn new(settings: Settings) -> Result<Self> {
        let orientations = Orientations::generate(&settings.orientation, settings.symmetry, settings.seed)?;
        Ok(Self {
            settings,
            orientations,
            figures: Vec::new(),
            composite: None,
            ipf_colors: Vec::new(),
            elapsed_seconds: 0.0,
        })
    }

    /// Runs the pole figure and IPF stages.
    ///
    /// **How it Works**: Pole figures run through the shared pipeline and are
    /// composited. IPF colours are computed per orientation, in parallel with a
    /// progress bar unless the settings ask for sequential execution.
    pub fn solve(&mut self) -> Result<()> {
        let start = Instant::now();
        let ops = self.settings.symmetry.ops();
        println!(
            "Analysing {} orientations with {} symmetry...",
            self.orientations.num_orientations,
            ops.name()
        );

        let config = self.settings.pole_figure_config(self.orientations.eulers.clone());
        self.figures = self.settings.symmetry.generate_pole_figure(&config);
        let options = CompositeOptions {
            num_colors: self.settings.num_colors,
            sample_count: self.orientations.num_orientations,
            symmetry_name: ops.name().to_string(),
        };
        self.composite = Some(compositing::compose(&self.figures, self.settings.layout, &options)?);

        let reference = self.settings.reference_direction();
        let n = self.orientations.num_orientations;
        let pb = ProgressBar::new(n as u64);
        pb.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] {bar:40.green/blue} {pos:>7}/{len:7} {msg} ETA: {eta_precise}",
            )?
            .progress_chars("█▇▆▅▄▃▂▁"),
        );
        pb.set_message("orientation".to_string());

        let colour = |euler: &Euler| {
            let color = ops.generate_ipf_color(euler, &reference, false);
            pb.inc(1);
            color
        };
        self.ipf_colors = match self.settings.execution_mode() {
            ExecutionMode::Parallel => self.orientations.eulers.par_iter().map(colour).collect(),
            ExecutionMode::Sequential => self.orientations.eulers.iter().map(colour).collect(),
        };
        pb.finish_and_clear();

        let unmatched = self.ipf_colors.iter().filter(|c| c.rgb().is_none()).count();
        if unmatched > 0 {
            tracing::warn!("{} orientations had no unit triangle match", unmatched);
        }

        let duration = start.elapsed();
        self.elapsed_seconds = duration.as_secs_f64();
        println!(
            "Time taken: {:.2?}, Time per orientation: {:.2?}",
            duration,
            duration.div_f64(n.max(1) as f64)
        );
        Ok(())
    }

    /// Writes every result to the output directory.
    pub fn writeup(&self) -> Result<()> {
        let directory = self.settings.output_directory();
        let ops = self.settings.symmetry.ops();
        let mut summary = Summary::new(ops.name().to_string(), self.orientations.num_orientations);

        for (i, figure) in self.figures.iter().enumerate() {
            let file = format!("pole_figure_{}.png", i);
            output::write_png(&directory, &file, &figure.image)?;
            output::write_intensity(&directory, &format!("pole_figure_{}.dat", i), &figure.intensity)?;
            summary.pole_figures.push(FigureSummary {
                label: figure.label.clone(),
                file,
                min: figure.min,
                max: figure.max,
            });
        }
        if let Some(composite) = &self.composite {
            output::write_png(&directory, "composite.png", composite)?;
        }
        if let Some(legend) = ops.generate_ipf_triangle_legend(self.settings.image_dim) {
            output::write_png(&directory, "ipf_legend.png", &legend)?;
        }

        output::write_ipf_colors(&directory, &self.orientations.eulers, &self.ipf_colors)?;
        let matched = self.ipf_colors.iter().filter(|c| c.rgb().is_some()).count();
        summary.ipf = Some(IpfSummary {
            reference_direction: self.settings.reference_direction,
            matched,
            no_match: self.ipf_colors.len() - matched,
        });
        summary.elapsed_seconds = self.elapsed_seconds;

        output::write_summary(&directory, &summary)?;
        output::write_toml(&directory, "settings.toml", &self.settings)?;
        tracing::info!("Results written to {:?}", directory);
        Ok(())
    }
}
