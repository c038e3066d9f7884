//! Line layout for mixed plain/emoji overlays.
//!
//! Layout only needs advances and vertical metrics, so it runs against a [`GlyphMeasure`]
//! implementation and stays independent of the font stack. Output coordinates are absolute frame
//! pixels with the text block centered in the frame.

use rand::Rng;

use crate::foundation::core::{Affine, Canvas, Point, Rect};
use crate::text::segment::{TextRun, emoji_clusters, segment_runs};
use crate::text::wrap::format_text_for_display;

/// Horizontal advance and vertical extent of a measured run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RunMetrics {
    /// Advance width in pixels.
    pub advance: f32,
    /// Distance from baseline to the top of the line box.
    pub ascent: f32,
    /// Distance from baseline to the bottom of the line box.
    pub descent: f32,
}

/// Measurement backend for [`layout_overlay`].
pub trait GlyphMeasure {
    /// Metrics of `text` in the slide font at `size_px`.
    fn measure_plain(&mut self, text: &str, size_px: f32) -> RunMetrics;
    /// Metrics of one emoji cluster in the emoji font, or `None` when it cannot be drawn.
    fn measure_emoji(&mut self, cluster: &str, size_px: f32) -> Option<RunMetrics>;
}

/// Styling inputs for layout, already scaled to the output canvas.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutStyle {
    /// Plain-text size in pixels.
    pub font_size: f32,
    /// Emoji size relative to `font_size`.
    pub emoji_scale: f32,
    /// Draw emoji at all.
    pub emoji_enabled: bool,
    /// Inclusive rotation range in degrees; `None` disables rotation.
    pub emoji_rotation: Option<(f32, f32)>,
    /// Maximum line width in pixels.
    pub max_width: f32,
    /// Extra space between lines as a fraction of `font_size`.
    pub line_gap: f32,
}

/// A positioned piece of a line.
#[derive(Clone, Debug, PartialEq)]
pub enum PlacedItem {
    /// Plain text whose origin sits on the line baseline.
    Plain {
        /// Text to draw.
        text: String,
        /// Left edge of the run.
        x: f32,
        /// Advance width.
        width: f32,
    },
    /// One emoji cluster, rotated about the center of its glyph box.
    Emoji {
        /// Cluster to draw.
        cluster: String,
        /// Glyph origin (pen position before rotation).
        origin_x: f32,
        /// Unrotated glyph advance.
        advance: f32,
        /// Glyph box height above the baseline.
        ascent: f32,
        /// Glyph box depth below the baseline.
        descent: f32,
        /// Font size used for the glyph.
        size_px: f32,
        /// Rotation in degrees, positive clockwise in frame space.
        angle_deg: f32,
    },
}

impl PlacedItem {
    /// Rotation center of an emoji glyph box on a line with the given baseline.
    pub fn emoji_center(&self, baseline: f32) -> Option<Point> {
        match self {
            PlacedItem::Emoji {
                origin_x,
                advance,
                ascent,
                descent,
                ..
            } => Some(Point::new(
                f64::from(origin_x + advance / 2.0),
                f64::from(baseline + (descent - ascent) / 2.0),
            )),
            PlacedItem::Plain { .. } => None,
        }
    }
}

/// One laid out line.
#[derive(Clone, Debug, PartialEq)]
pub struct LaidLine {
    /// Items in visual order.
    pub items: Vec<PlacedItem>,
    /// Baseline y shared by every item.
    pub baseline: f32,
    /// Left edge of the line box.
    pub x: f32,
    /// Line width.
    pub width: f32,
    /// Height above the baseline.
    pub ascent: f32,
    /// Depth below the baseline.
    pub descent: f32,
}

impl LaidLine {
    /// Line box in frame coordinates.
    pub fn bounds(&self) -> Rect {
        Rect::new(
            f64::from(self.x),
            f64::from(self.baseline - self.ascent),
            f64::from(self.x + self.width),
            f64::from(self.baseline + self.descent),
        )
    }
}

/// Result of laying out one slide's text.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OverlayLayout {
    /// Lines top to bottom.
    pub lines: Vec<LaidLine>,
    /// Emoji clusters dropped because emoji are disabled or undrawable.
    pub skipped_emoji: usize,
    /// Plain-text size the layout was measured with.
    pub font_size: f32,
}

impl OverlayLayout {
    /// Union of all line boxes, `None` for an empty overlay.
    pub fn bounds(&self) -> Option<Rect> {
        self.lines
            .iter()
            .map(LaidLine::bounds)
            .reduce(|a, b| a.union(b))
    }
}

/// Rotated bounding box of an emoji glyph box whose origin is `(0, 0)` on the baseline.
///
/// Returns `(width, top, bottom)` relative to the baseline, rotation about the box center.
pub fn rotated_emoji_extent(m: RunMetrics, angle_deg: f32) -> (f32, f32, f32) {
    let glyph_box = Rect::new(0.0, -f64::from(m.ascent), f64::from(m.advance), f64::from(m.descent));
    let c = glyph_box.center();
    let rot = rotation_about(c, angle_deg);
    let bb = rot.transform_rect_bbox(glyph_box);
    (bb.width() as f32, bb.y0 as f32, bb.y1 as f32)
}

/// Affine rotating by `angle_deg` about `center`.
pub fn rotation_about(center: Point, angle_deg: f32) -> Affine {
    Affine::translate(center.to_vec2())
        * Affine::rotate(f64::from(angle_deg).to_radians())
        * Affine::translate(-center.to_vec2())
}

#[derive(Clone, Debug)]
enum Atom {
    Word(String),
    Space(String),
    Emoji {
        cluster: String,
        metrics: RunMetrics,
        size_px: f32,
        angle_deg: f32,
        width: f32,
        top: f32,
        bottom: f32,
    },
}

struct Measured {
    atom: Atom,
    width: f32,
    ascent: f32,
    descent: f32,
}

/// Lay out `text` for a `canvas`-sized overlay.
///
/// Text is first broken at natural points, then each display line is greedily filled up to
/// `style.max_width`; a single atom wider than the limit gets a line of its own. Emoji angles are
/// drawn from `rng` once per occurrence, in reading order.
pub fn layout_overlay<M: GlyphMeasure, R: Rng + ?Sized>(
    text: &str,
    canvas: Canvas,
    style: &LayoutStyle,
    measure: &mut M,
    rng: &mut R,
) -> OverlayLayout {
    let mut out = OverlayLayout {
        font_size: style.font_size,
        ..OverlayLayout::default()
    };
    let display = format_text_for_display(text.trim());
    let emoji_size = style.font_size * style.emoji_scale;

    let mut rows: Vec<Vec<Measured>> = Vec::new();
    for display_line in display.lines() {
        let mut atoms = Vec::new();
        for run in segment_runs(display_line) {
            match run {
                TextRun::Plain(s) => push_plain_atoms(&s, &mut atoms),
                TextRun::Emoji(s) => {
                    for cluster in emoji_clusters(&s) {
                        if !style.emoji_enabled {
                            out.skipped_emoji += 1;
                            continue;
                        }
                        let Some(metrics) = measure.measure_emoji(cluster, emoji_size) else {
                            out.skipped_emoji += 1;
                            continue;
                        };
                        let angle_deg = match style.emoji_rotation {
                            Some((lo, hi)) => rng.gen_range(lo..=hi),
                            None => 0.0,
                        };
                        let (width, top, bottom) = rotated_emoji_extent(metrics, angle_deg);
                        atoms.push(Atom::Emoji {
                            cluster: cluster.to_string(),
                            metrics,
                            size_px: emoji_size,
                            angle_deg,
                            width,
                            top,
                            bottom,
                        });
                    }
                }
            }
        }

        let measured: Vec<Measured> = atoms
            .into_iter()
            .map(|atom| measure_atom(atom, style.font_size, measure))
            .collect();
        fill_rows(measured, style.max_width, &mut rows);
    }

    let gap = style.line_gap * style.font_size;
    let mut lines: Vec<LaidLine> = rows
        .into_iter()
        .filter(|row| !row.is_empty())
        .map(|row| place_row(row, style.font_size, measure))
        .collect();

    let block_h: f32 = lines.iter().map(|l| l.ascent + l.descent).sum::<f32>()
        + gap * lines.len().saturating_sub(1) as f32;
    let mut y = (canvas.height as f32 - block_h) / 2.0;
    for line in &mut lines {
        let dx = (canvas.width as f32 - line.width) / 2.0;
        line.x = dx;
        for item in &mut line.items {
            match item {
                PlacedItem::Plain { x, .. } => *x += dx,
                PlacedItem::Emoji { origin_x, .. } => *origin_x += dx,
            }
        }
        line.baseline = y + line.ascent;
        y += line.ascent + line.descent + gap;
    }

    out.lines = lines;
    out
}

fn push_plain_atoms(s: &str, atoms: &mut Vec<Atom>) {
    let mut cur = String::new();
    let mut cur_is_space = false;
    for c in s.chars() {
        let is_space = c.is_whitespace();
        if !cur.is_empty() && is_space != cur_is_space {
            atoms.push(if cur_is_space {
                Atom::Space(std::mem::take(&mut cur))
            } else {
                Atom::Word(std::mem::take(&mut cur))
            });
        }
        cur_is_space = is_space;
        cur.push(c);
    }
    if !cur.is_empty() {
        atoms.push(if cur_is_space {
            Atom::Space(cur)
        } else {
            Atom::Word(cur)
        });
    }
}

fn measure_atom<M: GlyphMeasure>(atom: Atom, font_size: f32, measure: &mut M) -> Measured {
    match &atom {
        Atom::Word(s) | Atom::Space(s) => {
            let m = measure.measure_plain(s, font_size);
            Measured {
                width: m.advance,
                ascent: m.ascent,
                descent: m.descent,
                atom,
            }
        }
        Atom::Emoji {
            width, top, bottom, ..
        } => Measured {
            width: *width,
            ascent: -*top,
            descent: *bottom,
            atom,
        },
    }
}

fn fill_rows(measured: Vec<Measured>, max_width: f32, rows: &mut Vec<Vec<Measured>>) {
    let mut row: Vec<Measured> = Vec::new();
    let mut row_w = 0.0f32;
    let mut pending_space: Option<Measured> = None;

    for m in measured {
        if matches!(m.atom, Atom::Space(_)) {
            if !row.is_empty() {
                pending_space = Some(m);
            }
            continue;
        }
        let space_w = pending_space.as_ref().map_or(0.0, |s| s.width);
        if !row.is_empty() && row_w + space_w + m.width > max_width {
            rows.push(std::mem::take(&mut row));
            row_w = 0.0;
            pending_space = None;
        }
        if let Some(space) = pending_space.take() {
            row_w += space.width;
            row.push(space);
        }
        row_w += m.width;
        row.push(m);
    }
    if !row.is_empty() {
        rows.push(row);
    }
}

fn place_row<M: GlyphMeasure>(row: Vec<Measured>, font_size: f32, measure: &mut M) -> LaidLine {
    let mut items: Vec<PlacedItem> = Vec::new();
    let mut x = 0.0f32;
    let mut ascent = 0.0f32;
    let mut descent = 0.0f32;
    let mut plain_buf = String::new();
    let mut plain_x = 0.0f32;

    let flush_plain = |buf: &mut String, start: f32, items: &mut Vec<PlacedItem>, measure: &mut M| {
        if buf.is_empty() {
            return;
        }
        let text = std::mem::take(buf);
        let width = measure.measure_plain(&text, font_size).advance;
        items.push(PlacedItem::Plain {
            text,
            x: start,
            width,
        });
    };

    for m in row {
        ascent = ascent.max(m.ascent);
        descent = descent.max(m.descent);
        match m.atom {
            Atom::Word(s) | Atom::Space(s) => {
                if plain_buf.is_empty() {
                    plain_x = x;
                }
                plain_buf.push_str(&s);
            }
            Atom::Emoji {
                cluster,
                metrics,
                size_px,
                angle_deg,
                width,
                ..
            } => {
                flush_plain(&mut plain_buf, plain_x, &mut items, measure);
                items.push(PlacedItem::Emoji {
                    cluster,
                    origin_x: x + (width - metrics.advance) / 2.0,
                    advance: metrics.advance,
                    ascent: metrics.ascent,
                    descent: metrics.descent,
                    size_px,
                    angle_deg,
                });
            }
        }
        x += m.width;
    }
    flush_plain(&mut plain_buf, plain_x, &mut items, measure);

    LaidLine {
        items,
        baseline: 0.0,
        x: 0.0,
        width: x,
        ascent,
        descent,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/layout.rs"]
mod tests;
