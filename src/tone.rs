//! Tone mapping - per-channel contrast and brightness, luminance, glyph lookup.

use crate::grid::{Cell, CharacterGrid, Rgb};
use crate::settings::ConversionSettings;
use crate::{Result, VsciiError};

/// Contrast factor for an effective contrast `c` (the classic 259/255 formula).
pub fn contrast_factor(c: f64) -> f64 {
    (259.0 * (c + 255.0)) / (255.0 * (259.0 - c))
}

pub fn apply_contrast(value: u8, factor: f64) -> u8 {
    (factor * (value as f64 - 128.0) + 128.0).round().clamp(0.0, 255.0) as u8
}

pub fn apply_brightness(value: u8, offset: i32) -> u8 {
    (value as i32).saturating_add(offset).clamp(0, 255) as u8
}

/// Perceptual luminance, rounded to the nearest integer.
pub fn luminance(Rgb([r, g, b]): Rgb) -> u8 {
    (0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64)
        .round()
        .clamp(0.0, 255.0) as u8
}

/// Gradient index for a luminance. Index 0 is the darkest glyph.
pub fn glyph_index(lum: u8, len: usize, invert: bool) -> usize {
    if len <= 1 {
        return 0;
    }
    let last = len - 1;
    let idx = ((lum as f64 / 255.0 * last as f64).floor() as usize).min(last);
    if invert { last - idx } else { idx }
}

/// Maps RGB samples to glyphs for one set of settings.
pub struct ToneMapper {
    gradient: Vec<char>,
    contrast: Option<f64>,
    brightness: i32,
    invert: bool,
    color: bool,
    grayscale: bool,
}

impl ToneMapper {
    pub fn new(settings: &ConversionSettings) -> Result<Self> {
        let gradient = settings.gradient_chars();
        if gradient.is_empty() {
            return Err(VsciiError::InvalidSettings("gradient is empty".into()));
        }
        settings.validate_tone()?;
        // Contrast is a 0.5..2.0 style multiplier; the formula takes it scaled by 50.
        let contrast = (settings.contrast != 1.0).then(|| contrast_factor(settings.contrast * 50.0));
        Ok(Self {
            gradient,
            contrast,
            brightness: settings.brightness,
            invert: settings.invert,
            color: settings.color,
            grayscale: settings.grayscale,
        })
    }

    /// Contrast then brightness, per channel.
    pub fn adjust(&self, rgb: Rgb) -> Rgb {
        let mut px = rgb.0;
        if let Some(factor) = self.contrast {
            px = px.map(|v| apply_contrast(v, factor));
        }
        if self.brightness != 0 {
            px = px.map(|v| apply_brightness(v, self.brightness));
        }
        Rgb(px)
    }

    pub fn map_cell(&self, rgb: Rgb) -> Cell {
        let adjusted = self.adjust(rgb);
        let lum = luminance(adjusted);
        let glyph = self.gradient[glyph_index(lum, self.gradient.len(), self.invert)];
        let color = self.color.then(|| if self.grayscale { Rgb::gray(lum) } else { adjusted });
        Cell { glyph, color }
    }
}

/// Turn a rectangular grid of samples into a character grid of the same shape.
pub fn map_tone_to_glyphs(
    samples: &[Vec<Rgb>],
    settings: &ConversionSettings,
) -> Result<CharacterGrid> {
    let height = samples.len();
    let width = samples.first().map_or(0, Vec::len);
    if width == 0 || height == 0 || samples.iter().any(|r| r.len() != width) {
        return Err(VsciiError::InvalidDimensions { width, height });
    }

    let mapper = ToneMapper::new(settings)?;
    let rows = samples
        .iter()
        .map(|row| row.iter().map(|&rgb| mapper.map_cell(rgb)).collect())
        .collect();
    CharacterGrid::from_rows(rows).ok_or(VsciiError::InvalidDimensions { width, height })
}
