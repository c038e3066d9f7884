//! Slide overlay rasterization with Parley shaping and the `vello_cpu` renderer.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use rand::Rng;

use crate::config::model::RenderConfig;
use crate::foundation::core::{Affine, Canvas, Rect};
use crate::foundation::error::{SlidecastError, SlidecastResult};
use crate::scenario::model::Slide;
use crate::text::fonts::LoadedFont;
use crate::text::layout::{
    GlyphMeasure, LayoutStyle, OverlayLayout, PlacedItem, RunMetrics, layout_overlay,
    rotation_about,
};

/// Brush carried through Parley layouts: straight RGBA8 fill color.
pub type TextBrush = [u8; 4];

/// Stateful helper for building Parley layouts from registered font bytes.
pub struct TextShaper {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrush>,
}

impl Default for TextShaper {
    fn default() -> Self {
        Self::new()
    }
}

impl TextShaper {
    /// Fresh Parley contexts with no fonts registered.
    pub fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
        }
    }

    /// Register `font` and return its family name.
    pub fn register(&mut self, font: &LoadedFont) -> SlidecastResult<String> {
        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font.bytes.as_ref().clone()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            SlidecastError::font(format!(
                "no font families registered from '{}'",
                font.path.display()
            ))
        })?;
        let name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| {
                SlidecastError::font(format!(
                    "registered font '{}' has no family name",
                    font.path.display()
                ))
            })?
            .to_string();
        Ok(name)
    }

    /// Shape `text` on a single unbroken line.
    pub fn layout(
        &mut self,
        text: &str,
        family: &str,
        size_px: f32,
        brush: TextBrush,
    ) -> parley::Layout<TextBrush> {
        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family.to_string())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));
        let mut layout: parley::Layout<TextBrush> = builder.build(text);
        layout.break_all_lines(None);
        layout
    }
}

/// A registered font ready for both shaping and drawing.
#[derive(Clone)]
pub struct ShapedFont {
    /// Family name inside the shaper's collection.
    pub family: String,
    /// Glyph source for the renderer.
    pub data: vello_cpu::peniko::FontData,
}

impl std::fmt::Debug for ShapedFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShapedFont")
            .field("family", &self.family)
            .finish()
    }
}

impl ShapedFont {
    fn register(shaper: &mut TextShaper, font: &LoadedFont) -> SlidecastResult<Self> {
        let family = shaper.register(font)?;
        let data = vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from(font.bytes.as_ref().clone()),
            0,
        );
        Ok(Self { family, data })
    }
}

struct ShapedMeasure<'a> {
    shaper: &'a mut TextShaper,
    text_family: &'a str,
    emoji_family: Option<&'a str>,
}

impl GlyphMeasure for ShapedMeasure<'_> {
    fn measure_plain(&mut self, text: &str, size_px: f32) -> RunMetrics {
        let layout = self.shaper.layout(text, self.text_family, size_px, [0; 4]);
        metrics_of(&layout, size_px)
    }

    fn measure_emoji(&mut self, cluster: &str, size_px: f32) -> Option<RunMetrics> {
        let family = self.emoji_family?;
        let layout = self.shaper.layout(cluster, family, size_px, [0; 4]);
        let mut any = false;
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                for g in run.glyphs() {
                    if g.id == 0 {
                        return None;
                    }
                    any = true;
                }
            }
        }
        any.then(|| metrics_of(&layout, size_px))
    }
}

fn metrics_of(layout: &parley::Layout<TextBrush>, size_px: f32) -> RunMetrics {
    match layout.lines().next() {
        Some(line) => {
            let m = line.metrics();
            RunMetrics {
                advance: layout.width(),
                ascent: m.ascent,
                descent: m.descent,
            }
        }
        None => RunMetrics {
            advance: 0.0,
            ascent: size_px * 0.8,
            descent: size_px * 0.2,
        },
    }
}

/// Paint settings for one overlay, already scaled to the output canvas.
#[derive(Clone, Debug, PartialEq)]
pub struct OverlayPaint {
    /// Text fill (straight RGBA).
    pub fill: [u8; 4],
    /// Text outline (straight RGBA).
    pub stroke: [u8; 4],
    /// Outline width in pixels; zero disables it.
    pub stroke_width: f32,
    /// Backing plate color (straight RGB) and opacity.
    pub plate_rgb: [u8; 3],
    /// Plate opacity in `[0, 1]`.
    pub plate_opacity: f32,
    /// Plate padding in pixels.
    pub plate_padding: f32,
}

/// A rasterized overlay: the premultiplied pixels of a sub-rectangle of the frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Overlay {
    /// Left edge in frame pixels.
    pub x: u32,
    /// Top edge in frame pixels.
    pub y: u32,
    /// Region width.
    pub width: u32,
    /// Region height.
    pub height: u32,
    /// Premultiplied RGBA8, row-major.
    pub rgba8_premul: Vec<u8>,
}

/// Render `layout` into an [`Overlay`]. Returns `None` when there is nothing to draw.
pub fn rasterize_overlay(
    layout: &OverlayLayout,
    canvas: Canvas,
    shaper: &mut TextShaper,
    text_font: &ShapedFont,
    emoji_font: Option<&ShapedFont>,
    paint: &OverlayPaint,
) -> SlidecastResult<Option<Overlay>> {
    let Some(bounds) = layout.bounds() else {
        return Ok(None);
    };
    let frame = Rect::new(0.0, 0.0, f64::from(canvas.width), f64::from(canvas.height));
    let plate = bounds.inflate(f64::from(paint.plate_padding), f64::from(paint.plate_padding));
    let region = plate.intersect(frame).expand();
    if region.width() <= 0.0 || region.height() <= 0.0 {
        return Ok(None);
    }

    let w: u16 = canvas
        .width
        .try_into()
        .map_err(|_| SlidecastError::evaluation("overlay width exceeds u16"))?;
    let h: u16 = canvas
        .height
        .try_into()
        .map_err(|_| SlidecastError::evaluation("overlay height exceeds u16"))?;
    let mut ctx = vello_cpu::RenderContext::new(w, h);

    if paint.plate_opacity > 0.0 {
        let [r, g, b] = paint.plate_rgb;
        let a = (paint.plate_opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            plate.x0, plate.y0, plate.x1, plate.y1,
        ));
    }

    for line in &layout.lines {
        for item in &line.items {
            match item {
                PlacedItem::Plain { text, x, .. } => {
                    let shaped =
                        shaper.layout(text, &text_font.family, layout.font_size, paint.fill);
                    let Some(first) = shaped.lines().next() else {
                        continue;
                    };
                    let dy = line.baseline - first.metrics().baseline;
                    let tr = Affine::translate((f64::from(*x), f64::from(dy)));
                    draw_layout(&mut ctx, &shaped, &text_font.data, tr, paint, true);
                }
                PlacedItem::Emoji {
                    cluster,
                    origin_x,
                    size_px,
                    angle_deg,
                    ..
                } => {
                    let Some(font) = emoji_font else {
                        continue;
                    };
                    let shaped = shaper.layout(cluster, &font.family, *size_px, paint.fill);
                    let Some(first) = shaped.lines().next() else {
                        continue;
                    };
                    let Some(center) = item.emoji_center(line.baseline) else {
                        continue;
                    };
                    let dy = line.baseline - first.metrics().baseline;
                    let tr = rotation_about(center, *angle_deg)
                        * Affine::translate((f64::from(*origin_x), f64::from(dy)));
                    draw_layout(&mut ctx, &shaped, &font.data, tr, paint, false);
                }
            }
        }
    }

    ctx.flush();
    let mut pixmap = vello_cpu::Pixmap::new(w, h);
    ctx.render_to_pixmap(&mut pixmap);

    Ok(Some(crop_region(
        pixmap.data_as_u8_slice(),
        canvas,
        region,
    )))
}

fn draw_layout(
    ctx: &mut vello_cpu::RenderContext,
    shaped: &parley::Layout<TextBrush>,
    font: &vello_cpu::peniko::FontData,
    tr: Affine,
    paint: &OverlayPaint,
    outline: bool,
) {
    ctx.set_transform(affine_to_cpu(tr));
    for line in shaped.lines() {
        for item in line.items() {
            let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                continue;
            };
            let size = run.run().font_size();
            let glyphs = || {
                run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                })
            };
            if outline && paint.stroke_width > 0.0 {
                let [r, g, b, a] = paint.stroke;
                ctx.set_stroke(vello_cpu::kurbo::Stroke::new(f64::from(paint.stroke_width)));
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
                ctx.glyph_run(font).font_size(size).stroke_glyphs(glyphs());
            }
            let [r, g, b, a] = run.style().brush;
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
            ctx.glyph_run(font).font_size(size).fill_glyphs(glyphs());
        }
    }
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn crop_region(frame: &[u8], canvas: Canvas, region: Rect) -> Overlay {
    let x0 = region.x0.max(0.0) as u32;
    let y0 = region.y0.max(0.0) as u32;
    let x1 = (region.x1 as u32).min(canvas.width);
    let y1 = (region.y1 as u32).min(canvas.height);
    let width = x1.saturating_sub(x0);
    let height = y1.saturating_sub(y0);

    let stride = canvas.width as usize * 4;
    let mut out = Vec::with_capacity(width as usize * height as usize * 4);
    for row in y0..y1 {
        let start = row as usize * stride + x0 as usize * 4;
        out.extend_from_slice(&frame[start..start + width as usize * 4]);
    }
    Overlay {
        x: x0,
        y: y0,
        width,
        height,
        rgba8_premul: out,
    }
}

/// Builds one overlay per slide for a scenario, caching registered fonts.
pub struct OverlayBuilder {
    shaper: TextShaper,
    text_fonts: HashMap<PathBuf, ShapedFont>,
    emoji: Option<ShapedFont>,
    canvas: Canvas,
    style: LayoutStyle,
    fill: [u8; 4],
    stroke: [u8; 4],
    stroke_width: f32,
    plate_opacity: f32,
    plate_padding: f32,
}

impl OverlayBuilder {
    /// Prepare a builder for `canvas`. An unreadable emoji font only disables emoji.
    pub fn new(cfg: &RenderConfig, canvas: Canvas, emoji_font: Option<&Path>) -> Self {
        let mut shaper = TextShaper::new();
        let emoji = if cfg.emoji.enabled {
            match emoji_font {
                Some(path) => match LoadedFont::load(path)
                    .and_then(|f| ShapedFont::register(&mut shaper, &f))
                {
                    Ok(font) => Some(font),
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "emoji font unusable, emoji will be skipped");
                        None
                    }
                },
                None => {
                    tracing::warn!("no emoji font available, emoji will be skipped");
                    None
                }
            }
        } else {
            None
        };

        let font_size = cfg.scaled_font_size();
        Self {
            shaper,
            text_fonts: HashMap::new(),
            emoji,
            canvas,
            style: LayoutStyle {
                font_size,
                emoji_scale: cfg.emoji.scale,
                emoji_enabled: cfg.emoji.enabled,
                emoji_rotation: cfg
                    .emoji
                    .rotation_enabled
                    .then_some((cfg.emoji.min_angle, cfg.emoji.max_angle)),
                max_width: cfg.text.max_width_ratio * canvas.width as f32,
                line_gap: 0.15,
            },
            fill: cfg.text.color,
            stroke: cfg.text.stroke_color,
            stroke_width: cfg.scaled_stroke_width(),
            plate_opacity: cfg.text.plate_opacity,
            plate_padding: cfg.scaled_plate_padding(),
        }
    }

    /// Lay out and rasterize one slide.
    ///
    /// `font` must load and register; failure is fatal for the scenario. Emoji that cannot be
    /// drawn are dropped with a warning naming the slide.
    pub fn build_slide<R: Rng + ?Sized>(
        &mut self,
        slide_number: usize,
        slide: &Slide,
        font: &Path,
        rng: &mut R,
    ) -> SlidecastResult<Option<Overlay>> {
        if !self.text_fonts.contains_key(font) {
            let loaded = LoadedFont::load(font)?;
            let shaped = ShapedFont::register(&mut self.shaper, &loaded)?;
            self.text_fonts.insert(font.to_path_buf(), shaped);
        }
        let text_font = self.text_fonts.get(font).ok_or_else(|| {
            SlidecastError::font(format!("font '{}' was not registered", font.display()))
        })?;

        let mut measure = ShapedMeasure {
            shaper: &mut self.shaper,
            text_family: &text_font.family,
            emoji_family: self.emoji.as_ref().map(|f| f.family.as_str()),
        };
        let layout = layout_overlay(&slide.text, self.canvas, &self.style, &mut measure, rng);
        if layout.skipped_emoji > 0 && self.style.emoji_enabled {
            tracing::warn!(
                slide = slide_number,
                skipped = layout.skipped_emoji,
                "unsupported emoji skipped"
            );
        }

        let paint = OverlayPaint {
            fill: self.fill,
            stroke: self.stroke,
            stroke_width: self.stroke_width,
            plate_rgb: slide.emotion.plate_tint(),
            plate_opacity: self.plate_opacity,
            plate_padding: self.plate_padding,
        };
        rasterize_overlay(
            &layout,
            self.canvas,
            &mut self.shaper,
            text_font,
            self.emoji.as_ref(),
            &paint,
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/overlay.rs"]
mod tests;
