//! vscii CLI - Convert images to VSCII character art

use clap::Parser;
use rayon::prelude::*;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use vscii::animate::Player;
use vscii::raster::{self, RasterOptions, Theme};
use vscii::{
    render_frame, AnimationStyle, CharacterGrid, CharacterSet, ConversionSettings, Converter,
    FilterPreset, SizeMode, VsciiError,
};

#[derive(Parser)]
#[command(name = "vscii", about = "Convert images to VSCII character art")]
struct Args {
    /// Input image files
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
    /// JSON settings file; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,
    /// Output width in characters (manual sizing, 10-200)
    #[arg(short, long)]
    width: Option<u32>,
    /// Output height in lines (manual sizing, 10-100)
    #[arg(short = 'H', long)]
    height: Option<u32>,
    /// Detail level for automatic sizing (1-10, default 5). Without size
    /// flags, a --config file's output size is used instead.
    #[arg(short, long)]
    complexity: Option<u32>,
    /// Character set preset: standard, detailed, simple, binary, blocks
    #[arg(long, conflicts_with = "gradient")]
    charset: Option<CharacterSet>,
    /// Custom gradient, darkest glyph first
    #[arg(short, long)]
    gradient: Option<String>,
    /// Filter preset: none, high-contrast, vintage, neon, sketch, noir
    #[arg(short, long)]
    preset: Option<FilterPreset>,
    /// Contrast multiplier (0.5-2.0 typical)
    #[arg(long)]
    contrast: Option<f64>,
    /// Brightness offset (-255..255)
    #[arg(long, allow_hyphen_values = true)]
    brightness: Option<i32>,
    /// Invert the glyph mapping
    #[arg(short, long)]
    invert: bool,
    /// Colored output (ANSI on terminal, RGB in PNG export)
    #[arg(long)]
    color: bool,
    /// Comment prepended to the output
    #[arg(short, long)]
    annotate: Option<String>,
    /// Write a rasterized PNG next to each input (requires --font)
    #[arg(long, requires = "font")]
    png: bool,
    /// Monospace TTF/OTF font for PNG export
    #[arg(long)]
    font: Option<PathBuf>,
    #[arg(long, default_value = "14")]
    font_size: f32,
    #[arg(long, default_value = "1.2")]
    line_height: f32,
    /// Dark theme for PNG export
    #[arg(long)]
    dark: bool,
    /// Animate the first input on the terminal: simple, pulse, wave, random
    #[arg(long)]
    animate: Option<AnimationStyle>,
    /// Animation time drawn into the PNG export when --animate is set
    #[arg(long, default_value = "0")]
    png_frame_ms: f64,
    /// Stop the animation after this many milliseconds (default: until Ctrl+C)
    #[arg(long)]
    duration_ms: Option<u64>,
    /// More logging (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn settings(&self) -> Result<ConversionSettings, VsciiError> {
        let mut s = match &self.config {
            Some(path) => ConversionSettings::from_json_file(path)?,
            None => ConversionSettings::default(),
        };
        if let Some(preset) = self.preset {
            s = s.with_preset(preset);
        }
        if let Some(set) = self.charset {
            s.gradient = set.gradient().to_string();
        }
        if let Some(g) = &self.gradient {
            s.gradient = g.clone();
        }
        if let Some(c) = self.contrast {
            s.contrast = c;
        }
        if let Some(b) = self.brightness {
            s.brightness = b;
        }
        s.invert |= self.invert;
        s.color |= self.color;
        if self.color {
            s.grayscale = false;
        }
        if self.annotate.is_some() {
            s.annotation = self.annotate.clone();
        }
        s.validate()?;
        Ok(s)
    }

    /// `None` keeps the output size from the config file.
    fn size_mode(&self) -> Option<SizeMode> {
        match (self.width, self.height, self.complexity) {
            (None, None, None) if self.config.is_some() => None,
            (None, None, complexity) => {
                Some(SizeMode::Auto { complexity: complexity.unwrap_or(5) })
            }
            (w, h, _) => {
                Some(SizeMode::Manual { width: w.unwrap_or(80), height: h.unwrap_or(30) })
            }
        }
    }

    fn converter(&self, settings: ConversionSettings) -> Converter {
        let converter = Converter::new(settings);
        match self.size_mode() {
            Some(mode) => converter.with_size_mode(mode),
            None => converter,
        }
    }

    fn raster_options(&self, settings: &ConversionSettings) -> RasterOptions {
        RasterOptions {
            font_size: self.font_size,
            line_height: self.line_height,
            theme: if self.dark { Theme::Dark } else { Theme::Light },
            color: settings.color,
        }
    }

    /// Grid drawn into the PNG: the animated frame when animating.
    fn png_grid(&self, grid: &CharacterGrid) -> CharacterGrid {
        match self.animate {
            Some(style) => render_frame(grid, style, self.png_frame_ms),
            None => grid.clone(),
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        _ => tracing::Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn convert_file(converter: &Converter, path: &Path) -> Result<CharacterGrid, VsciiError> {
    let bytes = std::fs::read(path)?;
    let image = vscii::decode_image(&bytes)?;
    let grid = converter.convert(&image)?;
    tracing::info!(path = %path.display(), cols = grid.width(), rows = grid.height(), "converted");
    Ok(grid)
}

fn render_text(grid: &CharacterGrid, settings: &ConversionSettings) -> String {
    if settings.color {
        let body = grid.to_ansi();
        match settings.annotation.as_deref().map(str::trim).filter(|a| !a.is_empty()) {
            Some(note) => format!("/* {note} */\n\n{body}"),
            None => body,
        }
    } else {
        grid.to_text_with_annotation(settings.annotation.as_deref())
    }
}

fn write_png(
    args: &Args,
    settings: &ConversionSettings,
    grid: &CharacterGrid,
    input: &Path,
) -> Result<PathBuf, VsciiError> {
    let font_path = args
        .font
        .as_ref()
        .ok_or_else(|| VsciiError::ResourceUnavailable("no font given for PNG export".into()))?;
    let font = raster::load_font(font_path)?;
    let img = raster::rasterize(&args.png_grid(grid), &font, &args.raster_options(settings))?;
    let out = input.with_extension("vscii.png");
    img.save(&out)?;
    Ok(out)
}

static CTRLC_RECEIVED: AtomicBool = AtomicBool::new(false);

fn play(grid: CharacterGrid, style: AnimationStyle, duration: Option<Duration>) {
    if let Err(e) = ctrlc::set_handler(|| CTRLC_RECEIVED.store(true, Ordering::SeqCst)) {
        tracing::warn!("could not install Ctrl+C handler: {e}");
    }
    let failed = Arc::new(AtomicBool::new(false));
    let sink_failed = Arc::clone(&failed);
    let player = Player::spawn(grid, style, 30, move |frame, _| {
        let mut out = std::io::stdout().lock();
        // Clear screen and home the cursor before each frame.
        if write!(out, "\x1b[2J\x1b[H{frame}").and_then(|_| out.flush()).is_err() {
            sink_failed.store(true, Ordering::SeqCst);
        }
    });

    let start = Instant::now();
    while !CTRLC_RECEIVED.load(Ordering::SeqCst)
        && !failed.load(Ordering::SeqCst)
        && duration.map_or(true, |d| start.elapsed() < d)
    {
        std::thread::sleep(Duration::from_millis(10));
    }
    let frames = player.stop();
    println!();
    tracing::info!(frames, "animation finished");
}

fn main() -> Result<(), VsciiError> {
    let args = Args::parse();
    init_logging(args.verbose);

    let settings = args.settings()?;
    let converter = args.converter(settings.clone());

    let results: Vec<_> = args
        .inputs
        .par_iter()
        .map(|path| (path, convert_file(&converter, path)))
        .collect();

    let mut first_grid = None;
    let mut failures = 0;
    for (path, result) in results {
        match result {
            Ok(grid) => {
                if args.inputs.len() > 1 {
                    println!("==> {} <==", path.display());
                }
                println!("{}", render_text(&grid, &settings));
                if args.png {
                    let out = write_png(&args, &settings, &grid, path)?;
                    tracing::info!(path = %out.display(), "wrote PNG");
                }
                first_grid.get_or_insert(grid);
            }
            Err(e) => {
                failures += 1;
                tracing::error!(path = %path.display(), "{e}");
            }
        }
    }

    if let (Some(style), Some(grid)) = (args.animate, first_grid) {
        play(grid, style, args.duration_ms.map(Duration::from_millis));
    }

    if failures > 0 {
        return Err(VsciiError::InvalidInput(format!("{failures} input(s) failed to convert")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("vscii").chain(args.iter().copied())).unwrap()
    }

    fn sized_config(dir: &tempfile::TempDir) -> String {
        let path = dir.path().join("s.json");
        std::fs::write(&path, r#"{"output_width": 40, "output_height": 12, "color": true}"#)
            .unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn config_size_survives_without_size_flags() {
        let dir = tempfile::tempdir().unwrap();
        let config = sized_config(&dir);
        let args = parse(&["in.png", "--config", &config]);
        assert_eq!(args.size_mode(), None);

        let settings = args.settings().unwrap();
        let grid = args
            .converter(settings)
            .convert_rgba(&RgbaImage::from_pixel(400, 200, Rgba([9, 9, 9, 255])))
            .unwrap();
        assert_eq!((grid.width(), grid.height()), (40, 12));
    }

    #[test]
    fn size_flags_override_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = sized_config(&dir);
        let args = parse(&["in.png", "--config", &config, "--complexity", "10"]);
        assert_eq!(args.size_mode(), Some(SizeMode::Auto { complexity: 10 }));
        let args = parse(&["in.png", "--config", &config, "-w", "64"]);
        assert_eq!(args.size_mode(), Some(SizeMode::Manual { width: 64, height: 30 }));
        assert_eq!(parse(&["in.png"]).size_mode(), Some(SizeMode::Auto { complexity: 5 }));
    }

    #[test]
    fn png_color_follows_resolved_settings() {
        let dir = tempfile::tempdir().unwrap();
        let config = sized_config(&dir);
        let args = parse(&["in.png", "--config", &config]);
        let settings = args.settings().unwrap();
        assert!(args.raster_options(&settings).color);
        let plain = parse(&["in.png"]);
        assert!(!plain.raster_options(&plain.settings().unwrap()).color);
    }

    #[test]
    fn png_draws_the_animated_frame() {
        let grid = CharacterGrid::from_rows(vec![vec![vscii::Cell::new(' '); 12]; 2]).unwrap();
        let still = parse(&["in.png"]);
        assert_eq!(still.png_grid(&grid), grid);

        let animated = parse(&["in.png", "--animate", "simple", "--png-frame-ms", "150"]);
        let frame = animated.png_grid(&grid);
        assert_eq!(frame, render_frame(&grid, AnimationStyle::Simple, 150.0));
        assert_eq!(frame.get(10, 1).map(|c| c.glyph), Some('/'));
    }
}
