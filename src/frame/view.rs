use std::sync::Arc;

use super::{FrameBuffer, TargetRect, CHANNELS};

/// Read-only window onto a [`FrameBuffer`].
///
/// A view shares the owner's storage instead of copying it. It has no way to
/// write pixels; the owner mutates its storage through `Arc::make_mut`, which
/// copies first if any view is still alive, so a view never changes under its
/// holder.
#[derive(Clone, Debug)]
pub struct FrameView {
    buffer: Arc<FrameBuffer>,
    // Always non-empty or zero-sized and inside `buffer`.
    region: TargetRect,
}

impl FrameView {
    /// View over the whole buffer.
    pub fn new(buffer: Arc<FrameBuffer>) -> Self {
        let region = TargetRect::new(0, 0, buffer.width() as i32, buffer.height() as i32);
        Self { buffer, region }
    }

    pub fn width(&self) -> u32 {
        self.region.width as u32
    }

    pub fn height(&self) -> u32 {
        self.region.height as u32
    }

    pub fn channels(&self) -> usize {
        CHANNELS
    }

    /// Top-left corner of this view inside the underlying storage.
    pub fn origin(&self) -> (i32, i32) {
        (self.region.x, self.region.y)
    }

    /// Area of the underlying storage covered by this view.
    pub fn region(&self) -> TargetRect {
        self.region
    }

    /// BGRA bytes of one row, `width * 4` long.
    pub fn row(&self, y: u32) -> &[u8] {
        let row = self.buffer.row(self.region.y as u32 + y);
        let start = self.region.x as usize * CHANNELS;
        &row[start..start + self.width() as usize * CHANNELS]
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        self.buffer
            .pixel(self.region.x as u32 + x, self.region.y as u32 + y)
    }

    /// Narrows the view to `rect` (view-local coordinates), clipped to the
    /// view. Returns `None` when nothing is left.
    pub fn crop(&self, rect: TargetRect) -> Option<FrameView> {
        let clipped = self.clip(rect);
        (clipped.width() > 0 && clipped.height() > 0).then_some(clipped)
    }

    /// Like `crop`, but an empty overlap gives a zero-sized view instead of
    /// `None`. Its origin is `rect`'s corner clamped into the view.
    pub fn clip(&self, rect: TargetRect) -> FrameView {
        let bounds = TargetRect::new(0, 0, self.region.width, self.region.height);
        let local = bounds.intersection(&rect).unwrap_or_else(|| {
            TargetRect::new(
                rect.x.clamp(0, bounds.width),
                rect.y.clamp(0, bounds.height),
                0,
                0,
            )
        });
        FrameView {
            buffer: Arc::clone(&self.buffer),
            region: local.offset(self.region.x, self.region.y),
        }
    }

    /// Copies the visible pixels into a new owning buffer.
    pub fn to_buffer(&self) -> FrameBuffer {
        let mut data = Vec::with_capacity(self.width() as usize * self.height() as usize * CHANNELS);
        for y in 0..self.height() {
            data.extend_from_slice(self.row(y));
        }
        FrameBuffer::from_raw(self.width(), self.height(), data)
            .unwrap_or_else(|| FrameBuffer::new(self.width(), self.height()))
    }

    /// True if both views read from the same storage.
    pub fn shares_storage(&self, other: &FrameView) -> bool {
        Arc::ptr_eq(&self.buffer, &other.buffer)
    }
}

impl From<FrameBuffer> for FrameView {
    fn from(buffer: FrameBuffer) -> Self {
        FrameView::new(Arc::new(buffer))
    }
}
