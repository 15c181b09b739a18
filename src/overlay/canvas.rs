//! Persistent BGRA canvas that frames are alpha-composited onto.

use crate::frame::{FrameBuffer, FrameView, TargetRect, CHANNELS};

/// Pixel value the overlay window treats as fully transparent.
pub const COLOR_KEY: [u8; 4] = [0, 0, 0, 0];

pub struct Canvas {
    buffer: FrameBuffer,
}

impl Canvas {
    /// Creates a canvas filled with the color key.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            buffer: FrameBuffer::new(width, height),
        }
    }

    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    pub fn buffer(&self) -> &FrameBuffer {
        &self.buffer
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.buffer.as_bytes()
    }

    /// Resets every pixel to the color key.
    pub fn clear(&mut self) {
        self.buffer.fill(COLOR_KEY);
    }

    /// Reallocates to a new size, keeping whatever overlaps the old top-left.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.buffer = self.buffer.resized(width, height);
    }

    /// Blends `frame` onto the canvas with its top-left corner at `(x, y)`.
    ///
    /// Only the part overlapping the canvas is touched; a frame placed
    /// entirely outside is ignored. Per color channel:
    /// `canvas = frame * a + canvas * (1 - a)` with `a = frame.alpha / 255`,
    /// truncated. The canvas alpha channel is left as it was.
    pub fn append(&mut self, frame: &FrameView, x: i32, y: i32) {
        let bounds = TargetRect::new(0, 0, self.width() as i32, self.height() as i32);
        let placed = TargetRect::new(x, y, frame.width() as i32, frame.height() as i32);
        let Some(overlap) = bounds.intersection(&placed) else {
            return;
        };

        let src_x0 = (overlap.x - x) as usize;
        let src_y0 = (overlap.y - y) as u32;
        let span = overlap.width as usize * CHANNELS;
        let dst_x0 = overlap.x as usize * CHANNELS;

        for row in 0..overlap.height as u32 {
            let src = &frame.row(src_y0 + row)[src_x0 * CHANNELS..src_x0 * CHANNELS + span];
            let dst = &mut self.buffer.row_mut(overlap.y as u32 + row)[dst_x0..dst_x0 + span];

            for (s, d) in src.chunks_exact(CHANNELS).zip(dst.chunks_exact_mut(CHANNELS)) {
                let alpha = s[3] as f32 / 255.0;
                for c in 0..3 {
                    d[c] = blend(s[c], d[c], alpha);
                }
            }
        }
    }
}

#[inline]
fn blend(src: u8, dst: u8, alpha: f32) -> u8 {
    // `as` saturates, so the result is always within 0..=255.
    (src as f32 * alpha + dst as f32 * (1.0 - alpha)) as u8
}
