//! Rasterized export - draws a character grid into an RGBA image.

use crate::grid::{CharacterGrid, Rgb};
use crate::{Result, VsciiError};
use fontdue::{Font, FontSettings};
use image::{Rgba, RgbaImage};
use std::path::Path;

const PADDING: f32 = 20.0;
// Monospace advance relative to font size.
const ADVANCE: f32 = 0.6;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn background(self) -> Rgb {
        match self {
            Theme::Light => Rgb([0xFF, 0xFF, 0xFF]),
            Theme::Dark => Rgb([0x1E, 0x29, 0x3B]),
        }
    }

    pub fn foreground(self) -> Rgb {
        match self {
            Theme::Light => Rgb([0x11, 0x18, 0x27]),
            Theme::Dark => Rgb([0xE5, 0xE7, 0xEB]),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct RasterOptions {
    pub font_size: f32,
    pub line_height: f32,
    pub theme: Theme,
    /// Color each glyph (cell RGB, or a hue derived from the glyph).
    pub color: bool,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self { font_size: 14.0, line_height: 1.2, theme: Theme::Light, color: false }
    }
}

impl RasterOptions {
    pub fn cell_pitch(&self) -> (f32, f32) {
        (self.font_size * ADVANCE, self.font_size * self.line_height)
    }

    /// Canvas size for a `cols × rows` grid including padding.
    pub fn canvas_size(&self, cols: usize, rows: usize) -> (u32, u32) {
        let (cw, ch) = self.cell_pitch();
        let w = cols as f32 * cw + 2.0 * PADDING;
        let h = rows as f32 * ch + 2.0 * PADDING;
        (w.round() as u32, h.round() as u32)
    }
}

/// Fallback color for a glyph without RGB: `hsl((code * 10) % 360, 70%, 50%)`.
pub fn glyph_hue_color(glyph: char) -> Rgb {
    let hue = (glyph as u32 as u64 * 10 % 360) as f32;
    hsl_to_rgb(hue, 0.7, 0.5)
}

fn hsl_to_rgb(h: f32, s: f32, l: f32) -> Rgb {
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let hp = h / 60.0;
    let x = c * (1.0 - (hp % 2.0 - 1.0).abs());
    let (r, g, b) = match hp as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = l - c / 2.0;
    Rgb([r, g, b].map(|v| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8))
}

pub fn load_font(path: impl AsRef<Path>) -> Result<Font> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|e| {
        VsciiError::ResourceUnavailable(format!("cannot read font {}: {e}", path.display()))
    })?;
    Font::from_bytes(data, FontSettings::default())
        .map_err(|e| VsciiError::ResourceUnavailable(format!("cannot load font: {e}")))
}

/// Draw `grid` with `font`, one glyph per cell at a fixed pitch.
pub fn rasterize(grid: &CharacterGrid, font: &Font, opts: &RasterOptions) -> Result<RgbaImage> {
    if !(opts.font_size > 0.0 && opts.line_height > 0.0) {
        return Err(VsciiError::InvalidSettings(format!(
            "font size and line height must be positive, got {} / {}",
            opts.font_size, opts.line_height
        )));
    }
    let (w, h) = opts.canvas_size(grid.width(), grid.height());
    let Rgb(bg) = opts.theme.background();
    let mut img = RgbaImage::from_pixel(w, h, Rgba([bg[0], bg[1], bg[2], 255]));

    let (cw, ch) = opts.cell_pitch();
    // Text is laid out from the top of each line.
    let ascent = font
        .horizontal_line_metrics(opts.font_size)
        .map_or(opts.font_size * 0.8, |m| m.ascent);

    for (row, cells) in grid.rows().enumerate() {
        for (col, cell) in cells.iter().enumerate() {
            if cell.glyph.is_whitespace() {
                continue;
            }
            let color = if opts.color {
                cell.color.unwrap_or_else(|| glyph_hue_color(cell.glyph))
            } else {
                opts.theme.foreground()
            };
            let (metrics, bitmap) = font.rasterize(cell.glyph, opts.font_size);
            let x0 = (PADDING + col as f32 * cw) as i32 + metrics.xmin;
            let y0 = (PADDING + row as f32 * ch + ascent) as i32
                - metrics.height as i32
                - metrics.ymin;
            blit(&mut img, &bitmap, metrics.width, metrics.height, x0, y0, color);
        }
    }
    Ok(img)
}

fn blit(img: &mut RgbaImage, coverage: &[u8], w: usize, h: usize, x0: i32, y0: i32, color: Rgb) {
    for sy in 0..h {
        for sx in 0..w {
            let (tx, ty) = (x0 + sx as i32, y0 + sy as i32);
            if tx < 0 || ty < 0 || tx >= img.width() as i32 || ty >= img.height() as i32 {
                continue;
            }
            let a = coverage[sy * w + sx] as f32 / 255.0;
            if a == 0.0 {
                continue;
            }
            let px = img.get_pixel_mut(tx as u32, ty as u32);
            for i in 0..3 {
                px.0[i] = (color.0[i] as f32 * a + px.0[i] as f32 * (1.0 - a)).round() as u8;
            }
        }
    }
}
