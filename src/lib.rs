//! Image to VSCII character art converter.
//!
//! An image is box-resampled to one RGB sample per character cell, each
//! sample is tone adjusted and mapped to a glyph from a gradient by its
//! luminance, and the resulting grid can be animated at render time.

pub mod animate;
pub mod grid;
#[cfg(not(target_arch = "wasm32"))]
pub mod raster;
pub mod resample;
pub mod settings;
pub mod tone;

#[cfg(target_arch = "wasm32")]
mod wasm;

pub use animate::{render_frame, AnimationState, AnimationStyle};
pub use grid::{Cell, CharacterGrid, Rgb};
pub use resample::resample;
pub use settings::{CharacterSet, ConversionSettings, FilterPreset, SizeMode};
pub use tone::map_tone_to_glyphs;

use image::{DynamicImage, RgbaImage};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VsciiError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),
    #[error("Invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    #[error("Resource unavailable: {0}")]
    ResourceUnavailable(String),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, VsciiError>;

/// Main converter: settings plus an optional sizing policy.
#[derive(Clone, Debug, Default)]
pub struct Converter {
    settings: ConversionSettings,
    size_mode: Option<SizeMode>,
}

impl Converter {
    pub fn new(settings: ConversionSettings) -> Self {
        Self { settings, size_mode: None }
    }

    /// Derive the output size from each image instead of the fixed
    /// `output_width`/`output_height` in the settings.
    pub fn with_size_mode(mut self, mode: SizeMode) -> Self {
        self.size_mode = Some(mode);
        self
    }

    pub fn with_preset(mut self, preset: FilterPreset) -> Self {
        self.settings = self.settings.with_preset(preset);
        self
    }

    pub fn with_gradient(mut self, gradient: impl Into<String>) -> Self {
        self.settings = self.settings.with_gradient(gradient);
        self
    }

    pub fn settings(&self) -> &ConversionSettings {
        &self.settings
    }

    /// Settings with the output size resolved for an image of this size.
    pub fn settings_for(&self, image_w: u32, image_h: u32) -> ConversionSettings {
        match self.size_mode {
            Some(mode) => {
                let (w, h) = mode.resolve(image_w, image_h);
                self.settings.clone().with_size(w, h)
            }
            None => self.settings.clone(),
        }
    }

    pub fn convert(&self, image: &DynamicImage) -> Result<CharacterGrid> {
        self.convert_rgba(&image.to_rgba8())
    }

    pub fn convert_rgba(&self, image: &RgbaImage) -> Result<CharacterGrid> {
        let settings = self.settings_for(image.width(), image.height());
        convert_image(image, &settings)
    }
}

/// Run the whole pipeline: validate, resample, tone map.
pub fn convert_image(image: &RgbaImage, settings: &ConversionSettings) -> Result<CharacterGrid> {
    settings.validate()?;
    if image.width() == 0 || image.height() == 0 {
        return Err(VsciiError::InvalidInput("image has zero size".into()));
    }
    tracing::debug!(
        src_w = image.width(),
        src_h = image.height(),
        cols = settings.output_width,
        rows = settings.output_height,
        "converting image"
    );
    let samples = resample(image, settings.output_width, settings.output_height)?;
    map_tone_to_glyphs(&samples, settings)
}

/// Convert a raw RGBA buffer of `width × height` pixels.
pub fn convert_rgba(
    width: u32,
    height: u32,
    rgba: &[u8],
    settings: &ConversionSettings,
) -> Result<CharacterGrid> {
    let expected = width as usize * height as usize * 4;
    if rgba.len() != expected {
        return Err(VsciiError::InvalidInput(format!(
            "RGBA buffer has {} bytes, expected {expected} for {width}x{height}",
            rgba.len()
        )));
    }
    let image = RgbaImage::from_raw(width, height, rgba.to_vec())
        .ok_or_else(|| VsciiError::InvalidInput("invalid image dimensions".into()))?;
    convert_image(&image, settings)
}

/// Decode an encoded image (PNG, JPEG, ...) from memory.
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage> {
    image::load_from_memory(bytes)
        .map_err(|e| VsciiError::InvalidInput(format!("could not decode image: {e}")))
}
