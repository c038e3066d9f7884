use rand::SeedableRng;
use rand::rngs::StdRng;

use super::*;

/// Monospace stand-in: every char is half an em wide, emoji are one em square.
struct FakeMeasure {
    emoji_ok: bool,
}

impl GlyphMeasure for FakeMeasure {
    fn measure_plain(&mut self, text: &str, size_px: f32) -> RunMetrics {
        RunMetrics {
            advance: text.chars().count() as f32 * size_px * 0.5,
            ascent: size_px * 0.8,
            descent: size_px * 0.2,
        }
    }

    fn measure_emoji(&mut self, _cluster: &str, size_px: f32) -> Option<RunMetrics> {
        self.emoji_ok.then_some(RunMetrics {
            advance: size_px,
            ascent: size_px * 0.8,
            descent: size_px * 0.2,
        })
    }
}

fn style(rotation: Option<(f32, f32)>) -> LayoutStyle {
    LayoutStyle {
        font_size: 20.0,
        emoji_scale: 1.0,
        emoji_enabled: true,
        emoji_rotation: rotation,
        max_width: 400.0,
        line_gap: 0.0,
    }
}

const CANVAS: Canvas = Canvas {
    width: 1000,
    height: 1000,
};

#[test]
fn plain_runs_share_the_baseline_around_an_emoji() {
    let mut rng = StdRng::seed_from_u64(1);
    let mut m = FakeMeasure { emoji_ok: true };
    let out = layout_overlay("Great job 🎉 today", CANVAS, &style(None), &mut m, &mut rng);

    assert_eq!(out.lines.len(), 1);
    let line = &out.lines[0];
    assert_eq!(line.items.len(), 3);
    let PlacedItem::Plain { text, x, width } = &line.items[0] else {
        panic!("expected plain run first");
    };
    assert_eq!(text, "Great job ");
    assert_eq!(*width, 100.0);
    // 10 chars + one 20px emoji + 6 chars => 180px, centered in 1000
    assert_eq!(line.width, 180.0);
    assert_eq!(*x, 410.0);
    let PlacedItem::Emoji { origin_x, angle_deg, .. } = &line.items[1] else {
        panic!("expected emoji second");
    };
    assert_eq!(*origin_x, 510.0);
    assert_eq!(*angle_deg, 0.0);
    let PlacedItem::Plain { text, x, .. } = &line.items[2] else {
        panic!("expected plain run last");
    };
    assert_eq!(text, " today");
    assert_eq!(*x, 530.0);
    // one line of 20px is vertically centered
    assert!((line.baseline - (490.0 + 16.0)).abs() < 1e-4);
}

#[test]
fn rotation_draws_per_occurrence_within_range_and_is_seeded() {
    let st = style(Some((-20.0, 20.0)));
    let angles = |seed: u64| -> Vec<f32> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut m = FakeMeasure { emoji_ok: true };
        layout_overlay("🔥 hot 🔥 hot 🔥", CANVAS, &st, &mut m, &mut rng).lines[0]
            .items
            .iter()
            .filter_map(|i| match i {
                PlacedItem::Emoji { angle_deg, .. } => Some(*angle_deg),
                PlacedItem::Plain { .. } => None,
            })
            .collect()
    };
    let a = angles(42);
    assert_eq!(a.len(), 3);
    assert!(a.iter().all(|v| (-20.0..=20.0).contains(v)));
    assert_eq!(a, angles(42));
    assert!(a[0] != a[1] || a[1] != a[2]);
}

#[test]
fn rotated_emoji_take_their_bounding_box_width() {
    let m = RunMetrics {
        advance: 20.0,
        ascent: 16.0,
        descent: 4.0,
    };
    let (w0, top0, bottom0) = rotated_emoji_extent(m, 0.0);
    assert!((w0 - 20.0).abs() < 1e-4);
    assert!((top0 + 16.0).abs() < 1e-4 && (bottom0 - 4.0).abs() < 1e-4);

    let (w45, _, _) = rotated_emoji_extent(m, 45.0);
    assert!((w45 - 20.0 * std::f32::consts::SQRT_2).abs() < 1e-3);
}

#[test]
fn long_text_wraps_greedily_within_max_width() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut m = FakeMeasure { emoji_ok: true };
    let st = LayoutStyle {
        max_width: 120.0,
        ..style(None)
    };
    let out = layout_overlay("aaaa bbbb cccc dddd", CANVAS, &st, &mut m, &mut rng);
    let texts: Vec<String> = out
        .lines
        .iter()
        .map(|l| match &l.items[0] {
            PlacedItem::Plain { text, .. } => text.clone(),
            PlacedItem::Emoji { cluster, .. } => cluster.clone(),
        })
        .collect();
    assert_eq!(texts, vec!["aaaa bbbb", "cccc dddd"]);
    assert!(out.lines.iter().all(|l| l.width <= 120.0));
    assert!(out.lines[0].baseline < out.lines[1].baseline);
}

#[test]
fn disabled_or_missing_emoji_are_skipped() {
    let mut rng = StdRng::seed_from_u64(0);
    let mut m = FakeMeasure { emoji_ok: false };
    let out = layout_overlay("Go 🚀", CANVAS, &style(None), &mut m, &mut rng);
    assert_eq!(out.skipped_emoji, 1);
    assert_eq!(out.lines[0].items.len(), 1);

    let mut m = FakeMeasure { emoji_ok: true };
    let st = LayoutStyle {
        emoji_enabled: false,
        ..style(None)
    };
    let out = layout_overlay("🚀🚀 Go", CANVAS, &st, &mut m, &mut rng);
    assert_eq!(out.skipped_emoji, 2);
    assert!(out.lines[0].items.iter().all(|i| matches!(i, PlacedItem::Plain { .. })));
}

#[test]
fn empty_text_has_no_bounds() {
    let mut rng = StdRng::seed_from_u64(0);
    let mut m = FakeMeasure { emoji_ok: true };
    let out = layout_overlay("   ", CANVAS, &style(None), &mut m, &mut rng);
    assert!(out.lines.is_empty());
    assert!(out.bounds().is_none());
}
