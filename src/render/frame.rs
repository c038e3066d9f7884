use crate::foundation::core::{Canvas, Rgba8Premul};

/// One composited output frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Premultiplied RGBA8, tightly packed, row-major.
    pub data: Vec<u8>,
}

impl FrameRGBA {
    /// Frame filled with `color`.
    pub fn filled(canvas: Canvas, color: Rgba8Premul) -> Self {
        Self {
            width: canvas.width,
            height: canvas.height,
            data: color.to_array().repeat(canvas.width as usize * canvas.height as usize),
        }
    }

    /// Premultiplied pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        Some([self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]])
    }
}
