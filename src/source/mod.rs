//! Frame sources that also propose targets.
//!
//! This module provides:
//! - The `VisualSource` contract
//! - Red-dominance masking and contour reduction (`detection`)
//! - Top-level window enumeration (`WindowEnumerator`, `Win32WindowEnumerator`)
//! - The game-window scanner (`GameWindowScanner`)

pub mod detection;
pub mod game_window;
pub mod window;

pub use game_window::{GameWindowScanner, TrackingState};
#[cfg(windows)]
pub use window::Win32WindowEnumerator;
pub use window::{WindowEnumerator, WindowInfo};

use crate::frame::{FrameView, TargetRect};

/// Something that yields frames and finds candidate targets in them.
pub trait VisualSource {
    /// Next frame to analyze, or `None` when nothing is available right now.
    fn get_frame(&mut self) -> Option<FrameView>;

    /// Candidate target rectangles in `frame`'s own coordinates. An empty
    /// result means the frame can be discarded.
    fn scan_initial_targets(&mut self, frame: &FrameView) -> Vec<TargetRect>;
}
