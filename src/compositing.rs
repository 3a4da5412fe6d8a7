//! Lays out pole figures on one annotated canvas.
//!
//! The canvas is built from equal square cells, one per figure plus one for the
//! colour scale when more than one figure is shown. Figure pixels are copied as
//! they are; only the margins around them are drawn on:
//! - a title above each figure
//! - a black circle bounding the projection
//! - `X` and `Y` labels for the sample axes
//! - a scale bar with the intensity range, sample count and Laue class name
//!
//! Shapes are drawn with `imageproc`; text uses the 8x8 bitmap glyphs of `font8x8`.

use anyhow::{anyhow, Result};
use font8x8::{UnicodeFonts, BASIC_FONTS};
use image::{imageops, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_circle_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;
use serde::{Deserialize, Serialize};

use crate::color::{self, BLACK, WHITE};
use crate::pole_figure::PoleFigure;

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn figure(label: &str, dim: u32, fill: Rgba<u8>) -> PoleFigure {
        PoleFigure {
            label: label.to_string(),
            image: RgbaImage::from_pixel(dim, dim, fill),
            intensity: Array2::zeros((dim as usize, dim as usize)),
            min: 0.0,
            max: 2.5,
        }
    }

    fn options() -> CompositeOptions {
        CompositeOptions {
            num_colors: 16,
            sample_count: 1000,
            symmetry_name: "Cubic m-3m".to_string(),
        }
    }

    #[test]
    fn horizontal_layout_dimensions() {
        let figs = vec![figure("a", 64, BLACK), figure("b", 64, BLACK), figure("c", 64, BLACK)];
        let image = compose(&figs, Layout::Horizontal, &options()).unwrap();
        let cell = cell_size(64);
        assert_eq!(image.dimensions(), (4 * cell, cell));
    }

    #[test]
    fn square_and_vertical_layouts() {
        let figs = vec![figure("a", 64, BLACK), figure("b", 64, BLACK), figure("c", 64, BLACK)];
        let cell = cell_size(64);
        let square = compose(&figs, Layout::Square, &options()).unwrap();
        assert_eq!(square.dimensions(), (2 * cell, 2 * cell));
        let vertical = compose(&figs[..2], Layout::Vertical, &options()).unwrap();
        assert_eq!(vertical.dimensions(), (cell, 3 * cell));
    }

    #[test]
    fn single_figure_has_no_scale_cell() {
        let image = compose(&[figure("a", 64, BLACK)], Layout::Horizontal, &options()).unwrap();
        assert_eq!(image.width(), cell_size(64));
    }

    #[test]
    fn rejects_bad_figure_counts() {
        let figs: Vec<_> = (0..4).map(|_| figure("x", 32, BLACK)).collect();
        assert!(compose(&figs, Layout::Square, &options()).is_err());
        assert!(compose(&[], Layout::Square, &options()).is_err());
    }

    #[test]
    fn figure_pixels_are_copied_unchanged() {
        let fill = Rgba([12, 34, 56, 255]);
        let image = compose(&[figure("a", 64, fill)], Layout::Square, &options()).unwrap();
        let m = margin(64);
        assert_eq!(*image.get_pixel(m + 32, m + 32), fill);
        assert_eq!(*image.get_pixel(m + 5, m + 10), fill);
    }

    #[test]
    fn border_circle_is_drawn() {
        let image = compose(&[figure("a", 64, WHITE)], Layout::Square, &options()).unwrap();
        let m = margin(64);
        // leftmost point of the circle at mid height
        assert_eq!(*image.get_pixel(m, m + 32), BLACK);
    }

    #[test]
    fn text_width_counts_advance() {
        assert_eq!(text_width("", 1), 0);
        assert_eq!(text_width("ab", 1), 16);
        assert_eq!(text_width("ab", 2), 32);
    }

    #[test]
    fn font_covers_labels() {
        for c in "<-1-120> Cubic m-3m MRD: 0.25".chars() {
            assert!(BASIC_FONTS.get(c).is_some(), "missing glyph for {:?}", c);
        }
    }

    #[test]
    fn text_is_drawn_in_black() {
        let mut canvas = RgbaImage::from_pixel(40, 12, WHITE);
        draw_text(&mut canvas, "X", 2, 2, 1, BLACK);
        assert!(canvas.pixels().any(|p| *p == BLACK));
        draw_text(&mut canvas, "\u{1F600}", 20, 2, 1, BLACK);
        assert!((20..40).all(|x| *canvas.get_pixel(x, 5) == WHITE));
    }

    #[test]
    fn scale_cell_has_a_framed_bar() {
        let figs = vec![figure("a", 64, WHITE), figure("b", 64, WHITE)];
        let image = compose(&figs, Layout::Horizontal, &options()).unwrap();
        let cell = cell_size(64);
        let m = margin(64);
        let bar_width = 64 * 3 / 4;
        // the scale cell follows the two figures
        let (bx, by) = (2 * cell + m + (64 - bar_width) / 2, m + 64 / 4);
        assert_eq!(*image.get_pixel(bx, by), BLACK);
        assert_eq!(*image.get_pixel(bx + 1, by + 2), color::to_pixel(&color::color_table(16)[0]));
    }
}

/// Edge length of a `font8x8` glyph cell, spacing included.
const GLYPH_SIZE: u32 = 8;

/// Arrangement of the cells on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    #[default]
    Horizontal,
    Vertical,
    Square,
}

/// Annotation content for the scale cell.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeOptions {
    pub num_colors: usize,
    pub sample_count: usize,
    pub symmetry_name: String,
}

fn text_scale(dim: u32) -> u32 {
    (dim / 128).max(1)
}

fn margin(dim: u32) -> u32 {
    2 * GLYPH_SIZE * text_scale(dim) + 12
}

fn cell_size(dim: u32) -> u32 {
    dim + 2 * margin(dim)
}

/// Composites one to three pole figures of equal size into a single image.
///
/// **How it Works**: Cells are assigned row by row. `Horizontal` puts every
/// cell in one row, `Vertical` in one column, and `Square` uses the smallest
/// square grid that holds them. The scale cell always comes last.
pub fn compose(figures: &[PoleFigure], layout: Layout, options: &CompositeOptions) -> Result<RgbaImage> {
    if figures.is_empty() || figures.len() > 3 {
        return Err(anyhow!(
            "Can only composite 1 to 3 pole figures, got {}",
            figures.len()
        ));
    }
    let dim = figures[0].image.width();
    if let Some(f) = figures.iter().find(|f| f.image.dimensions() != (dim, dim)) {
        return Err(anyhow!(
            "Pole figure '{}' is {}x{}, expected {}x{}",
            f.label,
            f.image.width(),
            f.image.height(),
            dim,
            dim
        ));
    }

    let cells = (figures.len() + usize::from(figures.len() > 1)) as u32;
    let cols = match layout {
        Layout::Horizontal => cells,
        Layout::Vertical => 1,
        Layout::Square => (1..=cells).find(|c| c * c >= cells).unwrap_or(cells),
    };
    let rows = cells.div_ceil(cols);
    let cell = cell_size(dim);
    let mut canvas = RgbaImage::from_pixel(cols * cell, rows * cell, WHITE);

    let origin = |i: u32| ((i % cols) * cell, (i / cols) * cell);
    for (i, figure) in figures.iter().enumerate() {
        let (x0, y0) = origin(i as u32);
        draw_figure_cell(&mut canvas, figure, x0, y0);
    }
    if cells as usize > figures.len() {
        let (x0, y0) = origin(figures.len() as u32);
        draw_scale_cell(&mut canvas, &figures[0], options, dim, x0, y0);
    }

    tracing::debug!(
        "Composited {} pole figures into a {}x{} {:?} canvas",
        figures.len(),
        canvas.width(),
        canvas.height(),
        layout
    );
    Ok(canvas)
}

fn draw_figure_cell(canvas: &mut RgbaImage, figure: &PoleFigure, x0: u32, y0: u32) {
    let dim = figure.image.width();
    let scale = text_scale(dim);
    let m = margin(dim);
    let (fx, fy) = (x0 + m, y0 + m);
    imageops::replace(canvas, &figure.image, fx as i64, fy as i64);

    let title_x = fx + (dim.saturating_sub(text_width(&figure.label, scale))) / 2;
    draw_text(canvas, &figure.label, title_x, y0 + 2, scale, BLACK);

    let radius = dim / 2;
    let center = ((fx + radius) as i32, (fy + radius) as i32);
    draw_hollow_circle_mut(canvas, center, radius as i32, BLACK);

    let glyph = GLYPH_SIZE * scale;
    draw_text(canvas, "X", fx + dim + 4, fy + dim / 2 - glyph / 2, scale, BLACK);
    draw_text(canvas, "Y", fx + dim / 2 - glyph / 2, fy - glyph - 3, scale, BLACK);
}

fn draw_scale_cell(
    canvas: &mut RgbaImage,
    figure: &PoleFigure,
    options: &CompositeOptions,
    dim: u32,
    x0: u32,
    y0: u32,
) {
    let scale = text_scale(dim);
    let m = margin(dim);
    let line = (GLYPH_SIZE + 3) * scale;
    let bar_width = (dim * 3 / 4).max(1);
    let bar_height = (dim / 12).max(8);
    let (bx, by) = (x0 + m + (dim - bar_width) / 2, y0 + m + dim / 4);

    let table = color::color_table(options.num_colors.max(1));
    for x in 0..bar_width {
        let bucket = (x as usize * table.len() / bar_width as usize).min(table.len() - 1);
        let column = Rect::at((bx + x) as i32, by as i32).of_size(1, bar_height);
        draw_filled_rect_mut(canvas, column, color::to_pixel(&table[bucket]));
    }
    let frame = Rect::at(bx as i32, by as i32).of_size(bar_width, bar_height);
    draw_hollow_rect_mut(canvas, frame, BLACK);

    draw_text(canvas, "MRD", bx, by - line, scale, BLACK);
    let min_label = format!("{:.2}", figure.min);
    let max_label = format!("{:.2}", figure.max);
    let label_y = by + bar_height + 3;
    draw_text(canvas, &min_label, bx, label_y, scale, BLACK);
    let max_x = (bx + bar_width).saturating_sub(text_width(&max_label, scale));
    draw_text(canvas, &max_label, max_x, label_y, scale, BLACK);

    let samples = format!("Samples: {}", options.sample_count);
    draw_text(canvas, &samples, bx, label_y + 2 * line, scale, BLACK);
    draw_text(canvas, &options.symmetry_name, bx, label_y + 3 * line, scale, BLACK);
}

fn text_width(text: &str, scale: u32) -> u32 {
    text.chars().count() as u32 * GLYPH_SIZE * scale
}

/// Draws `text` with its top-left corner at `(x, y)`, each font pixel a `scale x scale` block.
/// Characters missing from the font are skipped.
fn draw_text(canvas: &mut RgbaImage, text: &str, x: u32, y: u32, scale: u32, pixel: Rgba<u8>) {
    for (i, c) in text.chars().enumerate() {
        let Some(rows) = BASIC_FONTS.get(c) else {
            continue;
        };
        let gx = x + i as u32 * GLYPH_SIZE * scale;
        for (row, bits) in rows.iter().enumerate() {
            for col in 0..GLYPH_SIZE {
                if bits & (1 << col) == 0 {
                    continue;
                }
                let rect = Rect::at((gx + col * scale) as i32, (y + row as u32 * scale) as i32)
                    .of_size(scale, scale);
                draw_filled_rect_mut(canvas, rect, pixel);
            }
        }
    }
}
