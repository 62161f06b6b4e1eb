use std::io::Cursor;

use af_app::pipeline::{RenderInput, render};
use af_core::config::{ColorMode, DitherMode, OutputMode, ProceduralStyle, RenderConfig, SampleMethod};
use af_core::error::{CoreError, ErrorResponse};
use af_core::frame::RenderOutput;

fn png_bytes(w: u32, h: u32) -> Vec<u8> {
    let img = image::RgbImage::from_fn(w, h, |x, y| {
        image::Rgb([((x * 255) / w.max(1)) as u8, ((y * 255) / h.max(1)) as u8, 90])
    });
    let mut out = Vec::new();
    img.write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png).unwrap();
    out
}

fn text(output: RenderOutput) -> String {
    match output {
        RenderOutput::Text(t) => t,
        RenderOutput::Image { .. } => panic!("expected text"),
    }
}

fn text_config() -> RenderConfig {
    RenderConfig {
        output_mode: OutputMode::Text,
        ..RenderConfig::default()
    }
}

#[test]
fn image_text_output_follows_aspect_correction() {
    let config = RenderConfig {
        scale: 0.08,
        ..text_config()
    };
    let out = text(render(RenderInput::ImageBytes(png_bytes(1000, 1000)), &config).unwrap());
    let lines: Vec<&str> = out.split('\n').collect();
    assert_eq!(lines.len(), 144);
    assert!(lines.iter().all(|l| l.chars().count() == 80));
}

#[test]
fn same_seed_gives_identical_bytes() {
    let config = RenderConfig {
        diversity: 0.3,
        dither: DitherMode::Ordered,
        dither_strength: 0.8,
        sample_method: SampleMethod::Random,
        seed: Some(1234),
        scale: 0.25,
        ..RenderConfig::default()
    };
    let bytes = png_bytes(120, 80);
    let a = render(RenderInput::ImageBytes(bytes.clone()), &config).unwrap();
    let b = render(RenderInput::ImageBytes(bytes), &config).unwrap();
    assert_eq!(a.as_bytes(), b.as_bytes());
}

#[test]
fn deterministic_without_stochastic_stages_even_unseeded() {
    let config = RenderConfig {
        scale: 0.2,
        ..text_config()
    };
    let bytes = png_bytes(100, 60);
    let a = render(RenderInput::ImageBytes(bytes.clone()), &config).unwrap();
    let b = render(RenderInput::ImageBytes(bytes), &config).unwrap();
    assert_eq!(a, b);
}

#[test]
fn invalid_bytes_are_a_400() {
    let err = render(RenderInput::ImageBytes(b"GIF89a?garbage".to_vec()), &RenderConfig::default())
        .unwrap_err();
    assert!(matches!(err, CoreError::InvalidImage(_)));
    assert_eq!(ErrorResponse::from(&err).status(), 400);
}

#[test]
fn empty_charset_is_rejected() {
    let config = RenderConfig {
        charset: Some(String::new()),
        ..text_config()
    };
    let err = render(RenderInput::Procedural, &config).unwrap_err();
    assert!(matches!(err, CoreError::EmptyCharset));
}

#[test]
fn procedural_text_has_target_shape_for_every_style() {
    for style in [
        ProceduralStyle::Waves,
        ProceduralStyle::Radial,
        ProceduralStyle::Noise,
        ProceduralStyle::Terrain,
        ProceduralStyle::Mandelbrot,
    ] {
        let config = RenderConfig {
            style,
            target_width: 40,
            target_height: 12,
            ..text_config()
        };
        let out = text(render(RenderInput::Procedural, &config).unwrap());
        assert_eq!(out.matches('\n').count(), 11, "{style:?}");
        assert!(out.split('\n').all(|l| l.chars().count() == 40), "{style:?}");
    }
}

#[test]
fn seeded_procedural_is_reproducible_and_seed_sensitive() {
    let config = |seed| RenderConfig {
        style: ProceduralStyle::Noise,
        seed: Some(seed),
        target_width: 30,
        target_height: 10,
        diversity: 0.2,
        ..text_config()
    };
    let a = text(render(RenderInput::Procedural, &config(5)).unwrap());
    let b = text(render(RenderInput::Procedural, &config(5)).unwrap());
    let c = text(render(RenderInput::Procedural, &config(6)).unwrap());
    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn png_output_has_cell_multiple_dimensions() {
    let config = RenderConfig {
        style: ProceduralStyle::Radial,
        target_width: 24,
        target_height: 7,
        char_width: 9,
        char_height: 15,
        font_size: 12.0,
        color_mode: ColorMode::Mono,
        seed: Some(2),
        ..RenderConfig::default()
    };
    let RenderOutput::Image { png, width, height } = render(RenderInput::Procedural, &config).unwrap()
    else {
        panic!("expected an image");
    };
    assert_eq!((width, height), (216, 105));
    let decoded = image::load_from_memory(&png).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (216, 105));
}

#[test]
fn error_diffusion_text_uses_only_ramp_ends() {
    let config = RenderConfig {
        charset: Some(" .o@".into()),
        dither: DitherMode::ErrorDiffusion,
        scale: 0.25,
        ..text_config()
    };
    let out = text(render(RenderInput::ImageBytes(png_bytes(80, 80)), &config).unwrap());
    assert!(out.chars().all(|c| c == ' ' || c == '@' || c == '\n'));
}
