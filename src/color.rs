//! Colour mapping of scalar pole-figure intensities.
//!
//! - [`color_table`] samples the blue-to-red ramp used by every pole figure
//! - [`create_color_image`] buckets an intensity grid into that ramp and masks
//!   everything outside the projection circle to white
//!
//! Images are `image::RgbaImage` buffers throughout the crate.

use image::{Rgba, RgbaImage};
use ndarray::Array2;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_endpoints_follow_ramp() {
        let table = color_table(8);
        assert_eq!(table.len(), 8);
        for (c, node) in table[0].iter().zip(RAMP[0]) {
            assert!((*c - node / 255.0).abs() < 1e-6);
        }
        for (c, node) in table[7].iter().zip(RAMP[7]) {
            assert!((*c - node / 255.0).abs() < 1e-6);
        }
    }

    #[test]
    fn table_interpolates_between_nodes() {
        let table = color_table(15);
        // entry 1 sits halfway between the first two nodes
        let expected = (RAMP[0][1] + RAMP[1][1]) / 2.0 / 255.0;
        assert!((table[1][1] - expected).abs() < 1e-5, "{:?}", table[1]);
    }

    #[test]
    fn single_colour_table_is_blue() {
        let table = color_table(1);
        assert_eq!(table.len(), 1);
        assert!(table[0][2] > 0.99);
    }

    #[test]
    fn corners_are_masked_white() {
        let intensity = Array2::from_elem((16, 16), 3.0);
        let image = create_color_image(&intensity, 16, 16, 32, 0.0, 10.0);
        assert_eq!(*image.get_pixel(0, 0), WHITE);
        assert_eq!(*image.get_pixel(15, 15), WHITE);
        assert_ne!(*image.get_pixel(8, 8), WHITE);
    }

    #[test]
    fn extremes_use_ends_of_ramp() {
        let mut intensity = Array2::zeros((8, 8));
        intensity[[4, 4]] = 5.0;
        let image = create_color_image(&intensity, 8, 8, 16, 0.0, 5.0);
        let table = color_table(16);
        let top = to_pixel(&table[15]);
        let bottom = to_pixel(&table[0]);
        // writes are transposed, so [y, x] lands at column y, row x
        assert_eq!(*image.get_pixel(4, 4), top);
        assert_eq!(*image.get_pixel(3, 4), bottom);
    }

    #[test]
    fn flat_range_uses_first_colour() {
        let intensity = Array2::from_elem((8, 8), 1.0);
        let image = create_color_image(&intensity, 8, 8, 16, 1.0, 1.0);
        assert_eq!(*image.get_pixel(4, 4), to_pixel(&color_table(16)[0]));
    }

    #[test]
    fn pixel_conversion_truncates() {
        assert_eq!(to_pixel(&[0.999, 0.5, 0.0]), Rgba([254, 127, 0, 255]));
        assert_eq!(to_pixel(&[1.0, 0.0039, 2.0]), Rgba([255, 0, 255, 255]));
    }

    #[test]
    fn non_square_images_stay_in_bounds() {
        let intensity = Array2::from_elem((6, 10), 1.0);
        let image = create_color_image(&intensity, 10, 6, 4, 0.0, 2.0);
        assert_eq!(image.dimensions(), (10, 6));
    }

    #[test]
    fn hsv_primaries() {
        assert_eq!(hsv_to_rgb(0.0, 1.0, 1.0), [255, 0, 0]);
        assert_eq!(hsv_to_rgb(1.0 / 3.0, 1.0, 1.0), [0, 255, 0]);
        assert_eq!(hsv_to_rgb(2.0 / 3.0, 1.0, 1.0), [0, 0, 255]);
        assert_eq!(hsv_to_rgb(0.4, 0.0, 1.0), [255, 255, 255]);
        assert_eq!(hsv_to_rgb(0.4, 2.0, -1.0), [0, 0, 0]);
    }
}

/// Fully opaque white, used for masked pixels and blank canvas.
pub const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
pub const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Control points of the intensity ramp, blue through green and yellow to red.
const RAMP: [[f32; 3]; 8] = [
    [0.0, 1.0, 253.0],
    [105.0, 145.0, 2.0],
    [1.0, 255.0, 29.0],
    [180.0, 255.0, 0.0],
    [255.0, 215.0, 6.0],
    [255.0, 143.0, 1.0],
    [255.0, 69.0, 0.0],
    [253.0, 1.0, 0.0],
];

/// Samples `num_colors` evenly spaced colours along the ramp, as RGB fractions in `[0, 1]`.
pub fn color_table(num_colors: usize) -> Vec<[f32; 3]> {
    let segments = (RAMP.len() - 1) as f32;
    (0..num_colors)
        .map(|i| {
            let val = if num_colors > 1 {
                i as f32 / (num_colors - 1) as f32
            } else {
                0.0
            };
            let position = val * segments;
            let node = (position.floor() as usize).min(RAMP.len() - 2);
            let t = position - node as f32;
            let (lo, hi) = (RAMP[node], RAMP[node + 1]);
            [0, 1, 2].map(|c| (lo[c] + t * (hi[c] - lo[c])) / 255.0)
        })
        .collect()
}

/// Scales a table entry to bytes. Channels are truncated, not rounded.
pub fn to_pixel(rgb: &[f32; 3]) -> Rgba<u8> {
    let [r, g, b] = rgb.map(|c| (c * 255.0) as u8);
    Rgba([r, g, b, 255])
}

/// Colours a `[y, x]` intensity grid into a `width x height` RGBA image.
///
/// **How it Works**: Intensities are bucketed linearly between `min` and `max`
/// into `num_colors` ramp entries. Pixels whose centre lies outside the unit
/// circle take an extra white entry appended to the table. The output is
/// written transposed, so intensity `[y, x]` lands at column `y` and row `x`.
pub fn create_color_image(
    intensity: &Array2<f64>,
    width: usize,
    height: usize,
    num_colors: usize,
    min: f64,
    max: f64,
) -> RgbaImage {
    let mut table: Vec<Rgba<u8>> = color_table(num_colors).iter().map(to_pixel).collect();
    table.push(WHITE);
    let masked = num_colors;

    let mut image = RgbaImage::new(width as u32, height as u32);
    let (xres, yres) = (2.0 / width as f64, 2.0 / height as f64);
    let (xhalf, yhalf) = ((width / 2) as f64, (height / 2) as f64);
    let range = max - min;

    for y in 0..height {
        for x in 0..width {
            let xtmp = (x as f64 - xhalf) * xres + xres * 0.5;
            let ytmp = (y as f64 - yhalf) * yres + yres * 0.5;
            let index = if xtmp * xtmp + ytmp * ytmp > 1.0 {
                masked
            } else if range == 0.0 || num_colors == 0 {
                0
            } else {
                let value = intensity.get([y, x]).copied().unwrap_or(min);
                let bucket = ((value - min) / range * num_colors as f64).floor();
                bucket.clamp(0.0, (num_colors - 1) as f64) as usize
            };
            if let Some(pixel) = image.get_pixel_mut_checked(y as u32, x as u32) {
                *pixel = table[index];
            }
        }
    }
    image
}

/// HSV to RGB bytes. `h` wraps into `[0, 1)`. `s` and `v` are clamped to `[0, 1]`.
pub fn hsv_to_rgb(h: f64, s: f64, v: f64) -> [u8; 3] {
    let s = s.clamp(0.0, 1.0);
    let v = v.clamp(0.0, 1.0);
    let h6 = h.rem_euclid(1.0) * 6.0;
    let sector = h6.floor();
    let f = h6 - sector;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));
    let (r, g, b) = match sector as u8 {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };
    [r, g, b].map(|c| (c * 255.0).round() as u8)
}
