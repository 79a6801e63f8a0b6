//! Box resampling - reduces an image to one RGB sample per character cell.

use crate::grid::Rgb;
use crate::{Result, VsciiError};
use image::RgbaImage;

/// Area-weighted downsampler. Each output cell covers a
/// `(src_w / cols) × (src_h / rows)` block of the source image.
pub struct Resampler<'a> {
    image: &'a RgbaImage,
    cell_w: f64,
    cell_h: f64,
}

impl<'a> Resampler<'a> {
    pub fn new(image: &'a RgbaImage, cols: u32, rows: u32) -> Result<Self> {
        if image.width() == 0 || image.height() == 0 {
            return Err(VsciiError::InvalidInput("image has zero size".into()));
        }
        if cols == 0 || rows == 0 {
            return Err(VsciiError::InvalidSettings(format!(
                "output grid must be at least 1x1, got {cols}x{rows}"
            )));
        }
        let cell_w = image.width() as f64 / cols as f64;
        let cell_h = image.height() as f64 / rows as f64;
        Ok(Self { image, cell_w, cell_h })
    }

    /// Average color of the block at (col, row), weighted by pixel coverage
    /// and alpha. A fully transparent block samples as black.
    pub fn sample(&self, col: u32, row: u32) -> Rgb {
        let (x0, x1) = (col as f64 * self.cell_w, (col + 1) as f64 * self.cell_w);
        let (y0, y1) = (row as f64 * self.cell_h, (row + 1) as f64 * self.cell_h);

        let px_end = (x1.ceil() as u32).min(self.image.width());
        let py_end = (y1.ceil() as u32).min(self.image.height());

        let mut sum = [0.0f64; 3];
        let mut total = 0.0;
        for py in (y0.floor() as u32)..py_end {
            let wy = overlap(py, y0, y1);
            if wy <= 0.0 {
                continue;
            }
            for px in (x0.floor() as u32)..px_end {
                let p = self.image.get_pixel(px, py).0;
                // Coverage times opacity; transparent pixels add nothing.
                let w = wy * overlap(px, x0, x1) * p[3] as f64 / 255.0;
                if w <= 0.0 {
                    continue;
                }
                for (acc, &v) in sum.iter_mut().zip(&p[..3]) {
                    *acc += w * v as f64;
                }
                total += w;
            }
        }

        if total <= 0.0 {
            return Rgb([0, 0, 0]);
        }
        Rgb(sum.map(|s| (s / total).round().clamp(0.0, 255.0) as u8))
    }
}

/// Length of the overlap between pixel `[p, p+1)` and `[lo, hi)`.
fn overlap(p: u32, lo: f64, hi: f64) -> f64 {
    let p = p as f64;
    (hi.min(p + 1.0) - lo.max(p)).max(0.0)
}

/// Downsample `image` to exactly `cols × rows` RGB samples, row-major.
pub fn resample(image: &RgbaImage, cols: u32, rows: u32) -> Result<Vec<Vec<Rgb>>> {
    let resampler = Resampler::new(image, cols, rows)?;
    Ok((0..rows)
        .map(|y| (0..cols).map(|x| resampler.sample(x, y)).collect())
        .collect())
}
