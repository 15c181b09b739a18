//! BGRA frame storage shared between capture, detection, and the overlay.
//!
//! This module provides:
//! - The owning pixel grid (`FrameBuffer`)
//! - A read-only, bounds-checked window onto one (`FrameView`)
//! - Pixel rectangles (`TargetRect`)

pub mod buffer;
pub mod rect;
pub mod view;

pub use buffer::FrameBuffer;
pub use rect::TargetRect;
pub use view::FrameView;

/// Bytes per pixel. Channel order is always B, G, R, A.
pub const CHANNELS: usize = 4;
