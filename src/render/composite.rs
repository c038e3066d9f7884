use crate::foundation::error::{SlidecastError, SlidecastResult};
use crate::foundation::math::mul_div255_u8;
use crate::render::frame::FrameRGBA;
use crate::text::overlay::Overlay;

pub type PremulRgba8 = [u8; 4];

/// Source-over for premultiplied pixels.
pub fn over(dst: PremulRgba8, src: PremulRgba8) -> PremulRgba8 {
    match src[3] {
        0 => return dst,
        255 => return src,
        _ => {}
    }
    let inv = 255u16 - u16::from(src[3]);
    let mut out = [0u8; 4];
    for i in 0..4 {
        out[i] = src[i].saturating_add(mul_div255_u8(u16::from(dst[i]), inv));
    }
    out
}

/// Composite `overlay` onto `frame` at the overlay's own offset.
pub fn blit_overlay(frame: &mut FrameRGBA, overlay: &Overlay) -> SlidecastResult<()> {
    if overlay.rgba8_premul.len() != (overlay.width as usize) * (overlay.height as usize) * 4 {
        return Err(SlidecastError::evaluation(
            "overlay buffer does not match its dimensions",
        ));
    }
    if overlay.x.saturating_add(overlay.width) > frame.width
        || overlay.y.saturating_add(overlay.height) > frame.height
    {
        return Err(SlidecastError::evaluation(format!(
            "overlay {}x{}+{}+{} exceeds the {}x{} frame",
            overlay.width, overlay.height, overlay.x, overlay.y, frame.width, frame.height
        )));
    }

    let frame_stride = frame.width as usize * 4;
    let row_len = overlay.width as usize * 4;
    for (row, src_row) in overlay.rgba8_premul.chunks_exact(row_len.max(1)).enumerate() {
        let start = (overlay.y as usize + row) * frame_stride + overlay.x as usize * 4;
        let dst_row = &mut frame.data[start..start + row_len];
        for (d, s) in dst_row.chunks_exact_mut(4).zip(src_row.chunks_exact(4)) {
            let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]]);
            d.copy_from_slice(&out);
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
