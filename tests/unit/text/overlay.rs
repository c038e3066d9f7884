use std::collections::BTreeMap;

use rand::SeedableRng;
use rand::rngs::StdRng;

use super::*;
use crate::scenario::model::Emotion;

const SYSTEM_FONT: &str = "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf";

const COLOR_EMOJI_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/noto/NotoColorEmoji.ttf",
    "/usr/share/fonts/noto/NotoColorEmoji.ttf",
    "/usr/share/fonts/google-noto-emoji/NotoColorEmoji.ttf",
    "/usr/share/fonts/noto-emoji/NotoColorEmoji.ttf",
];

fn system_font() -> Option<PathBuf> {
    let p = PathBuf::from(SYSTEM_FONT);
    p.is_file().then_some(p)
}

fn color_emoji_font() -> Option<PathBuf> {
    COLOR_EMOJI_FONTS
        .iter()
        .map(PathBuf::from)
        .find(|p| p.is_file())
}

/// Opaque pixels whose channels spread far apart; white text, black outline and their
/// antialiasing never qualify.
fn saturated_pixels(overlay: &Overlay) -> usize {
    overlay
        .rgba8_premul
        .chunks_exact(4)
        .filter(|p| {
            let hi = p[0].max(p[1]).max(p[2]);
            let lo = p[0].min(p[1]).min(p[2]);
            p[3] == 255 && hi - lo > 100
        })
        .count()
}

fn slide(text: &str) -> Slide {
    Slide {
        text: text.to_string(),
        duration_seconds: 2.0,
        emotion: Emotion::Calm,
        background_image: None,
        extra: BTreeMap::new(),
    }
}

fn small_config() -> RenderConfig {
    RenderConfig {
        quality: 0.25,
        ..RenderConfig::default()
    }
}

#[test]
fn crop_copies_the_requested_rows() {
    let canvas = Canvas {
        width: 4,
        height: 3,
    };
    let frame: Vec<u8> = (0..canvas.rgba_len()).map(|i| (i / 4) as u8).collect();
    let o = crop_region(&frame, canvas, Rect::new(1.0, 1.0, 3.0, 3.0));
    assert_eq!((o.x, o.y, o.width, o.height), (1, 1, 2, 2));
    let px: Vec<u8> = o.rgba8_premul.chunks_exact(4).map(|p| p[0]).collect();
    assert_eq!(px, vec![5, 6, 9, 10]);
}

#[test]
fn text_overlay_draws_plate_and_glyphs() {
    let Some(font) = system_font() else {
        return;
    };
    let cfg = small_config();
    let canvas = cfg.canvas().unwrap();
    let mut builder = OverlayBuilder::new(&cfg, canvas, None);
    let mut rng = StdRng::seed_from_u64(5);

    let overlay = builder
        .build_slide(1, &slide("Hello world"), &font, &mut rng)
        .unwrap()
        .expect("non-empty text yields an overlay");
    assert!(overlay.x + overlay.width <= canvas.width);
    assert!(overlay.y + overlay.height <= canvas.height);
    assert_eq!(
        overlay.rgba8_premul.len(),
        (overlay.width * overlay.height * 4) as usize
    );

    // the padding band is translucent plate, somewhere inside it the glyphs are opaque
    let row = overlay.width as usize * 4;
    let plate_alpha = overlay.rgba8_premul[row + (overlay.width as usize / 2) * 4 + 3];
    assert!(plate_alpha > 0 && plate_alpha < 255, "{plate_alpha}");
    assert!(overlay.rgba8_premul.chunks_exact(4).any(|p| p[3] == 255));
}

#[test]
fn empty_text_yields_no_overlay() {
    let Some(font) = system_font() else {
        return;
    };
    let cfg = small_config();
    let mut builder = OverlayBuilder::new(&cfg, cfg.canvas().unwrap(), None);
    let mut rng = StdRng::seed_from_u64(0);
    assert!(
        builder
            .build_slide(1, &slide("  "), &font, &mut rng)
            .unwrap()
            .is_none()
    );
}

#[test]
fn emoji_without_emoji_font_leave_plain_text() {
    let Some(font) = system_font() else {
        return;
    };
    let cfg = small_config();
    let mut builder = OverlayBuilder::new(&cfg, cfg.canvas().unwrap(), None);
    let mut rng = StdRng::seed_from_u64(0);
    let with_emoji = builder
        .build_slide(1, &slide("Go 🚀"), &font, &mut rng)
        .unwrap()
        .unwrap();
    let without = builder
        .build_slide(2, &slide("Go"), &font, &mut rng)
        .unwrap()
        .unwrap();
    assert_eq!(with_emoji, without);
}

#[test]
fn missing_slide_font_is_fatal() {
    let cfg = small_config();
    let mut builder = OverlayBuilder::new(&cfg, cfg.canvas().unwrap(), None);
    let mut rng = StdRng::seed_from_u64(0);
    let err = builder
        .build_slide(1, &slide("Hi"), Path::new("/no/such/font.ttf"), &mut rng)
        .unwrap_err();
    assert!(matches!(err, SlidecastError::Font(_)));
}

#[test]
fn color_emoji_are_drawn_and_rotated() {
    let (Some(font), Some(emoji_font)) = (system_font(), color_emoji_font()) else {
        return;
    };
    let mut upright_cfg = small_config();
    upright_cfg.emoji.rotation_enabled = false;
    let mut tilted_cfg = small_config();
    tilted_cfg.emoji.min_angle = 30.0;
    tilted_cfg.emoji.max_angle = 30.0;
    let canvas = upright_cfg.canvas().unwrap();

    let build = |cfg: &RenderConfig, text: &str| {
        let mut builder = OverlayBuilder::new(cfg, canvas, Some(emoji_font.as_path()));
        let mut rng = StdRng::seed_from_u64(3);
        builder
            .build_slide(1, &slide(text), &font, &mut rng)
            .unwrap()
            .unwrap()
    };

    let plain = build(&upright_cfg, "Go");
    let upright = build(&upright_cfg, "Go 🚀");
    let tilted = build(&tilted_cfg, "Go 🚀");

    assert!(upright.width > plain.width);
    assert_eq!(saturated_pixels(&plain), 0);
    assert!(saturated_pixels(&upright) > 0);
    assert!(saturated_pixels(&tilted) > 0);
    assert_ne!(upright, tilted);
}
