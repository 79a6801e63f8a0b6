use std::io::Cursor;

use image::{DynamicImage, Rgba, RgbaImage};
use vscii::{
    convert_image, convert_rgba, render_frame, AnimationStyle, CharacterSet, ConversionSettings,
    Converter, FilterPreset, SizeMode, VsciiError,
};

fn solid(w: u32, h: u32, v: u8) -> RgbaImage {
    RgbaImage::from_pixel(w, h, Rgba([v, v, v, 255]))
}

fn two_by_two(gradient: &str) -> ConversionSettings {
    ConversionSettings::default().with_size(2, 2).with_gradient(gradient)
}

#[test]
fn black_image_maps_to_darkest_glyph() {
    let grid = convert_image(&solid(2, 2, 0), &two_by_two("@ ")).unwrap();
    assert_eq!(grid.to_text(), "@@\n@@");
}

#[test]
fn white_image_maps_to_lightest_glyph() {
    let grid = convert_image(&solid(2, 2, 255), &two_by_two("@ ")).unwrap();
    assert_eq!(grid.to_text(), "  \n  ");
}

#[test]
fn transparent_image_maps_to_darkest_glyph() {
    let img = RgbaImage::from_pixel(2, 2, Rgba([255, 255, 255, 0]));
    let grid = convert_image(&img, &two_by_two("@ ")).unwrap();
    assert_eq!(grid.to_text(), "@@\n@@");
}

#[test]
fn invert_flips_mid_gray_selection() {
    let img = solid(2, 2, 128);
    let plain = convert_image(&img, &two_by_two("AB")).unwrap();
    let inverted =
        convert_image(&img, &ConversionSettings { invert: true, ..two_by_two("AB") }).unwrap();
    assert_eq!(plain.to_text(), "AA\nAA");
    assert_eq!(inverted.to_text(), "BB\nBB");
}

#[test]
fn invalid_settings_produce_no_grid() {
    let img = solid(2, 2, 0);
    for settings in [
        two_by_two("@ ").with_size(0, 2),
        two_by_two("@ ").with_size(2, 0),
        two_by_two(""),
    ] {
        assert!(matches!(convert_image(&img, &settings), Err(VsciiError::InvalidSettings(_))));
    }
}

#[test]
fn grid_is_rectangular_for_any_size() {
    // Horizontal gradient image, odd sizes to exercise fractional blocks.
    let img = RgbaImage::from_fn(37, 23, |x, y| Rgba([(x * 7) as u8, (y * 11) as u8, 90, 255]));
    for (w, h) in [(1, 1), (5, 3), (37, 23), (80, 40), (120, 60)] {
        let settings = ConversionSettings::default().with_size(w, h);
        let grid = convert_image(&img, &settings).unwrap();
        assert_eq!(grid.width(), w as usize);
        assert_eq!(grid.height(), h as usize);
        let text = grid.to_text();
        assert_eq!(text.lines().count(), h as usize);
        assert!(text.lines().all(|l| l.chars().count() == w as usize));
    }
}

#[test]
fn brighter_regions_never_get_darker_glyphs() {
    let img = RgbaImage::from_fn(256, 4, |x, _| Rgba([x as u8, x as u8, x as u8, 255]));
    let settings = ConversionSettings::default().with_size(64, 1);
    let gradient = settings.gradient_chars();
    let grid = convert_image(&img, &settings).unwrap();
    let indices: Vec<usize> = grid
        .rows()
        .next()
        .unwrap()
        .iter()
        .map(|c| gradient.iter().position(|&g| g == c.glyph).unwrap())
        .collect();
    assert!(indices.windows(2).all(|w| w[0] <= w[1]), "{indices:?}");
    assert_eq!(indices[0], 0);
    assert!(*indices.last().unwrap() >= gradient.len() - 2);
}

#[test]
fn neutral_tone_equals_unadjusted_mapping() {
    let img = RgbaImage::from_fn(16, 16, |x, y| Rgba([(x * 16) as u8, (y * 16) as u8, 128, 255]));
    let base = ConversionSettings::default().with_size(16, 16);
    let neutral = base.clone().with_preset(FilterPreset::None);
    assert_eq!(convert_image(&img, &base).unwrap(), convert_image(&img, &neutral).unwrap());
}

#[test]
fn presets_change_output() {
    let img = RgbaImage::from_fn(32, 32, |x, y| Rgba([(x * 8) as u8, (y * 8) as u8, 64, 255]));
    let base = ConversionSettings::default().with_size(16, 8);
    let plain = convert_image(&img, &base).unwrap();
    let neon = convert_image(&img, &base.clone().with_preset(FilterPreset::Neon)).unwrap();
    assert_ne!(plain, neon);
}

#[test]
fn raw_rgba_buffer_must_match_dimensions() {
    let settings = two_by_two("@ ");
    let ok = convert_rgba(1, 1, &[0, 0, 0, 255], &settings).unwrap();
    assert_eq!(ok.to_text(), "@@\n@@");
    assert!(matches!(
        convert_rgba(2, 2, &[0, 0, 0, 255], &settings),
        Err(VsciiError::InvalidInput(_))
    ));
    assert!(matches!(
        convert_rgba(0, 0, &[], &settings),
        Err(VsciiError::InvalidInput(_))
    ));
}

#[test]
fn undecodable_bytes_are_invalid_input() {
    assert!(matches!(vscii::decode_image(b"not an image"), Err(VsciiError::InvalidInput(_))));
}

#[test]
fn decoded_png_converts() {
    let mut buf = Vec::new();
    DynamicImage::ImageRgba8(solid(4, 4, 255))
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    let image = vscii::decode_image(&buf).unwrap();
    let grid = Converter::new(two_by_two("@ ")).convert(&image).unwrap();
    assert_eq!(grid.to_text(), "  \n  ");
}

#[test]
fn converter_auto_sizing_uses_aspect_ratio() {
    let converter = Converter::new(ConversionSettings::default())
        .with_size_mode(SizeMode::Auto { complexity: 5 });
    let grid = converter.convert_rgba(&solid(400, 200, 40)).unwrap();
    assert_eq!((grid.width(), grid.height()), (80, 20));

    let converter = converter.with_size_mode(SizeMode::Manual { width: 12, height: 10 });
    let grid = converter.convert_rgba(&solid(400, 200, 40)).unwrap();
    assert_eq!((grid.width(), grid.height()), (12, 10));
}

#[test]
fn repeated_conversions_are_identical() {
    let img = RgbaImage::from_fn(50, 30, |x, y| Rgba([(x * 5) as u8, (y * 8) as u8, 200, 255]));
    let converter = Converter::new(ConversionSettings::default())
        .with_gradient(CharacterSet::Detailed.gradient())
        .with_size_mode(SizeMode::Auto { complexity: 3 });
    let a = converter.convert_rgba(&img).unwrap();
    let b = converter.convert_rgba(&img).unwrap();
    assert_eq!(a, b);
}

#[test]
fn annotation_goes_on_top() {
    let settings = ConversionSettings { annotation: Some("sunset".into()), ..two_by_two("@ ") };
    let grid = convert_image(&solid(2, 2, 0), &settings).unwrap();
    assert_eq!(
        grid.to_text_with_annotation(settings.annotation.as_deref()),
        "/* sunset */\n\n@@\n@@"
    );
}

#[test]
fn animation_leaves_converted_grid_alone() {
    let img = RgbaImage::from_fn(40, 20, |x, _| Rgba([(x * 6) as u8, 0, 0, 255]));
    let grid = convert_image(&img, &ConversionSettings::default().with_size(40, 20)).unwrap();
    let before = grid.to_text();
    for style in [AnimationStyle::Simple, AnimationStyle::Wave, AnimationStyle::Random] {
        let frame = render_frame(&grid, style, 1_234.0);
        assert_eq!((frame.width(), frame.height()), (40, 20));
        assert_eq!(frame, render_frame(&grid, style, 1_234.0));
    }
    assert_eq!(grid.to_text(), before);
}
