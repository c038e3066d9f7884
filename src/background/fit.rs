use crate::assets::decode::PreparedImage;
use crate::foundation::core::Canvas;
use crate::foundation::error::{SlidecastError, SlidecastResult};

/// Scale-then-center-crop parameters that cover a target canvas with no empty area.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CoverFit {
    /// Source width after scaling.
    pub scaled_width: u32,
    /// Source height after scaling.
    pub scaled_height: u32,
    /// Left edge of the crop window inside the scaled source.
    pub crop_x: u32,
    /// Top edge of the crop window inside the scaled source.
    pub crop_y: u32,
}

impl CoverFit {
    /// Fit a `src_w x src_h` source to `dst`.
    ///
    /// A source wider than the target (by aspect) is scaled to the target height and cropped
    /// horizontally; otherwise it is scaled to the target width and cropped vertically.
    pub fn compute(src_w: u32, src_h: u32, dst: Canvas) -> SlidecastResult<Self> {
        if src_w == 0 || src_h == 0 {
            return Err(SlidecastError::media(format!(
                "cannot fit a {src_w}x{src_h} source"
            )));
        }
        let (sw, sh) = (u64::from(src_w), u64::from(src_h));
        let (dw, dh) = (u64::from(dst.width), u64::from(dst.height));

        let (scaled_w, scaled_h) = if sw * dh > dw * sh {
            (((sw * dh + sh / 2) / sh).max(dw), dh)
        } else {
            (dw, ((sh * dw + sw / 2) / sw).max(dh))
        };
        Ok(Self {
            scaled_width: scaled_w as u32,
            scaled_height: scaled_h as u32,
            crop_x: ((scaled_w - dw) / 2) as u32,
            crop_y: ((scaled_h - dh) / 2) as u32,
        })
    }

    /// Whether the crop window lies inside the scaled source and spans the whole target.
    pub fn covers(&self, dst: Canvas) -> bool {
        self.crop_x + dst.width <= self.scaled_width
            && self.crop_y + dst.height <= self.scaled_height
    }
}

/// Cover-fit a decoded still to `dst`, returning a full-frame premultiplied RGBA8 buffer.
pub fn fit_still(img: &PreparedImage, dst: Canvas) -> SlidecastResult<Vec<u8>> {
    let fit = CoverFit::compute(img.width, img.height, dst)?;
    let src = image::RgbaImage::from_raw(img.width, img.height, img.rgba8_premul.as_ref().clone())
        .ok_or_else(|| SlidecastError::media("image buffer does not match its dimensions"))?;
    let scaled = if fit.scaled_width == img.width && fit.scaled_height == img.height {
        src
    } else {
        image::imageops::resize(
            &src,
            fit.scaled_width,
            fit.scaled_height,
            image::imageops::FilterType::Triangle,
        )
    };

    let stride = fit.scaled_width as usize * 4;
    let row_len = dst.width as usize * 4;
    let raw = scaled.as_raw();
    let mut out = Vec::with_capacity(dst.rgba_len());
    for y in 0..dst.height as usize {
        let start = (y + fit.crop_y as usize) * stride + fit.crop_x as usize * 4;
        out.extend_from_slice(&raw[start..start + row_len]);
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/background/fit.rs"]
mod tests;
