//! Capture session: owns a capture backend and the buffer it writes into.

use anyhow::{bail, Context, Result};
use std::sync::Arc;

use crate::error::BackendError;
use crate::frame::{FrameBuffer, FrameView};
use crate::handle::NativeHandle;

/// Operation contract of a native screen-capture resource.
///
/// Construction acquires the resource and `Drop` releases it.
pub trait CaptureBackend {
    /// Height of the captured region. Fixed for the resource's lifetime.
    fn height(&self) -> u32;

    /// Width of the captured region. Fixed for the resource's lifetime.
    fn width(&self) -> u32;

    /// Writes the latest frame into `dest` as tightly packed BGRA.
    ///
    /// On error `dest` must be left untouched. A backend that has no new image
    /// yet may return `Ok(())` without writing.
    fn get_frame(&mut self, dest: &mut [u8]) -> Result<(), BackendError>;
}

/// A running capture against a fixed-size source region.
pub struct CaptureSession<B: CaptureBackend> {
    handle: NativeHandle<B>,
    height: u32,
    width: u32,
    buffer: Arc<FrameBuffer>,
}

impl<B: CaptureBackend> CaptureSession<B> {
    /// Takes ownership of `backend`, allocates the frame buffer, and performs
    /// a priming read.
    ///
    /// Any failure here is fatal; the backend is released before returning.
    pub fn create(backend: B) -> Result<Self> {
        let (height, width) = (backend.height(), backend.width());
        if height == 0 || width == 0 {
            bail!("Capture backend reported an empty source region ({}x{})", width, height);
        }

        let mut session = Self {
            handle: NativeHandle::new(backend),
            height,
            width,
            buffer: Arc::new(FrameBuffer::new(width, height)),
        };
        session
            .refresh()
            .context("Priming frame read failed; capture session not created")?;

        crate::log(&format!("Capture session created: {}x{}", width, height));
        Ok(session)
    }

    /// Returns `(height, width)`.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.height, self.width)
    }

    /// Captures the latest frame and returns a read-only view of it.
    ///
    /// On failure the previous frame is kept and the error is returned as-is;
    /// the caller decides whether to try again next cycle.
    pub fn get_frame(&mut self) -> Result<FrameView, BackendError> {
        self.refresh()?;
        Ok(self.latest_frame())
    }

    /// View of the last successfully captured frame, without capturing.
    pub fn latest_frame(&self) -> FrameView {
        FrameView::new(Arc::clone(&self.buffer))
    }

    pub fn is_active(&self) -> bool {
        self.handle.is_active()
    }

    /// Releases the native capture resource. Safe to call more than once.
    pub fn destroy(&mut self) {
        if self.handle.close() {
            crate::log("Capture session destroyed");
        }
    }

    fn refresh(&mut self) -> Result<(), BackendError> {
        let backend = self.handle.get_mut("capture_get_frame")?;
        // Copies only if a caller still holds a view of the previous frame.
        let buffer = Arc::make_mut(&mut self.buffer);
        backend.get_frame(buffer.as_bytes_mut())
    }
}
