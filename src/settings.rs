//! Conversion settings, character-set and filter presets, and output sizing.

use crate::{Result, VsciiError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

pub const DEFAULT_GRADIENT: &str = "@%#*+=-:. ";

/// Largest contrast that keeps the contrast factor finite (`contrast * 50 < 259`).
pub const MAX_CONTRAST: f64 = 5.0;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionSettings {
    pub output_width: u32,
    pub output_height: u32,
    /// Glyphs ordered darkest to lightest.
    pub gradient: String,
    pub grayscale: bool,
    pub invert: bool,
    pub contrast: f64,
    pub brightness: i32,
    /// Attach per-cell RGB to the output grid.
    pub color: bool,
    pub annotation: Option<String>,
}

impl Default for ConversionSettings {
    fn default() -> Self {
        Self {
            output_width: 80,
            output_height: 30,
            gradient: DEFAULT_GRADIENT.to_string(),
            grayscale: true,
            invert: false,
            contrast: 1.0,
            brightness: 0,
            color: false,
            annotation: None,
        }
    }
}

impl ConversionSettings {
    /// Load settings from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let settings: Self = serde_json::from_str(&text)?;
        Ok(settings)
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.output_width = width;
        self.output_height = height;
        self
    }

    pub fn with_gradient(mut self, gradient: impl Into<String>) -> Self {
        self.gradient = gradient.into();
        self
    }

    /// Overwrite contrast, invert and brightness with the preset's values.
    pub fn with_preset(mut self, preset: FilterPreset) -> Self {
        let p = preset.params();
        self.contrast = p.contrast;
        self.invert = p.invert;
        self.brightness = p.brightness;
        self
    }

    pub fn gradient_chars(&self) -> Vec<char> {
        self.gradient.chars().collect()
    }

    pub fn validate(&self) -> Result<()> {
        if self.output_width == 0 || self.output_height == 0 {
            return Err(VsciiError::InvalidSettings(format!(
                "output size must be positive, got {}x{}",
                self.output_width, self.output_height
            )));
        }
        if self.gradient.is_empty() {
            return Err(VsciiError::InvalidSettings("gradient is empty".into()));
        }
        self.validate_tone()
    }

    /// Contrast and brightness range checks.
    pub fn validate_tone(&self) -> Result<()> {
        if !self.contrast.is_finite() || self.contrast <= 0.0 || self.contrast > MAX_CONTRAST {
            return Err(VsciiError::InvalidSettings(format!(
                "contrast must be in (0, {MAX_CONTRAST}], got {}",
                self.contrast
            )));
        }
        if !(-255..=255).contains(&self.brightness) {
            return Err(VsciiError::InvalidSettings(format!(
                "brightness must be in -255..=255, got {}",
                self.brightness
            )));
        }
        Ok(())
    }
}

/// Built-in gradients.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CharacterSet {
    Standard,
    Detailed,
    Simple,
    Binary,
    Blocks,
}

impl CharacterSet {
    pub const ALL: [CharacterSet; 5] = [
        CharacterSet::Standard,
        CharacterSet::Detailed,
        CharacterSet::Simple,
        CharacterSet::Binary,
        CharacterSet::Blocks,
    ];

    pub fn gradient(self) -> &'static str {
        match self {
            CharacterSet::Standard => DEFAULT_GRADIENT,
            CharacterSet::Detailed => {
                "$@B%8&WM#*oahkbdpqwmZO0QLCJUYXzcvunxrjft/\\|()1{}[]?-_+~<>i!lI;:,\"^`'. "
            }
            CharacterSet::Simple => "@#+-. ",
            CharacterSet::Binary => "10 ",
            CharacterSet::Blocks => "█▓▒░ ",
        }
    }
}

impl FromStr for CharacterSet {
    type Err = VsciiError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "standard" => Ok(CharacterSet::Standard),
            "detailed" => Ok(CharacterSet::Detailed),
            "simple" => Ok(CharacterSet::Simple),
            "binary" => Ok(CharacterSet::Binary),
            "blocks" => Ok(CharacterSet::Blocks),
            other => Err(VsciiError::InvalidSettings(format!("unknown character set '{other}'"))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FilterParams {
    pub contrast: f64,
    pub invert: bool,
    pub brightness: i32,
}

/// Named contrast/invert/brightness combinations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilterPreset {
    #[default]
    None,
    HighContrast,
    Vintage,
    Neon,
    Sketch,
    Noir,
}

impl FilterPreset {
    pub fn params(self) -> FilterParams {
        let (contrast, invert, brightness) = match self {
            FilterPreset::None => (1.0, false, 0),
            FilterPreset::HighContrast => (2.0, false, 0),
            FilterPreset::Vintage => (0.8, false, -20),
            FilterPreset::Neon => (1.5, true, 20),
            FilterPreset::Sketch => (1.2, false, 10),
            FilterPreset::Noir => (1.8, true, -10),
        };
        FilterParams { contrast, invert, brightness }
    }

    pub fn name(self) -> &'static str {
        match self {
            FilterPreset::None => "None",
            FilterPreset::HighContrast => "High Contrast",
            FilterPreset::Vintage => "Vintage",
            FilterPreset::Neon => "Neon",
            FilterPreset::Sketch => "Sketch",
            FilterPreset::Noir => "Film Noir",
        }
    }
}

impl FromStr for FilterPreset {
    type Err = VsciiError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "none" => Ok(FilterPreset::None),
            "high-contrast" | "highcontrast" => Ok(FilterPreset::HighContrast),
            "vintage" => Ok(FilterPreset::Vintage),
            "neon" => Ok(FilterPreset::Neon),
            "sketch" => Ok(FilterPreset::Sketch),
            "noir" => Ok(FilterPreset::Noir),
            other => Err(VsciiError::InvalidSettings(format!("unknown filter preset '{other}'"))),
        }
    }
}

pub const MANUAL_WIDTH: (u32, u32) = (10, 200);
pub const MANUAL_HEIGHT: (u32, u32) = (10, 100);
const AUTO_MAX_WIDTH: f64 = 120.0;
const AUTO_MAX_HEIGHT: f64 = 60.0;

/// How the output grid size is chosen.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "mode")]
pub enum SizeMode {
    /// Derived from image aspect ratio; complexity 1..=10.
    Auto { complexity: u32 },
    Manual { width: u32, height: u32 },
}

impl Default for SizeMode {
    fn default() -> Self {
        SizeMode::Auto { complexity: 5 }
    }
}

impl SizeMode {
    /// Grid size (columns, rows) for an image of the given pixel size.
    pub fn resolve(self, image_w: u32, image_h: u32) -> (u32, u32) {
        match self {
            SizeMode::Manual { width, height } => {
                let w = width.clamp(MANUAL_WIDTH.0, MANUAL_WIDTH.1);
                let h = height.clamp(MANUAL_HEIGHT.0, MANUAL_HEIGHT.1);
                if (w, h) != (width, height) {
                    tracing::warn!(width, height, w, h, "manual size clamped");
                }
                (w, h)
            }
            SizeMode::Auto { complexity } => {
                let complexity = complexity.clamp(1, 10) as f64;
                let aspect = image_w.max(1) as f64 / image_h.max(1) as f64;
                // Glyphs are about twice as tall as wide.
                let mut w = (80.0 * complexity / 5.0).round().min(AUTO_MAX_WIDTH);
                let mut h = (w / aspect / 2.0).round();
                if h > AUTO_MAX_HEIGHT {
                    h = AUTO_MAX_HEIGHT;
                    w = (h * aspect * 2.0).round();
                }
                (w.max(1.0) as u32, h.max(1.0) as u32)
            }
        }
    }
}
