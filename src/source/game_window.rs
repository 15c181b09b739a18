//! Scanner that follows one application window and looks for red targets
//! inside it.

use super::detection::detect_targets;
use super::window::{find_first_match, WindowEnumerator};
use super::VisualSource;
use crate::capture::{CaptureBackend, CaptureSession};
use crate::config::ScannerConfig;
use crate::frame::{FrameView, TargetRect};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrackingState {
    /// No matching window seen on the last scan.
    Untracked,
    /// Screen rectangle of the window found on the last scan.
    Located(TargetRect),
}

pub struct GameWindowScanner<C: CaptureBackend, E: WindowEnumerator> {
    session: CaptureSession<C>,
    windows: E,
    config: ScannerConfig,
    state: TrackingState,
}

impl<C: CaptureBackend, E: WindowEnumerator> GameWindowScanner<C, E> {
    pub fn new(session: CaptureSession<C>, windows: E, config: ScannerConfig) -> Self {
        Self {
            session,
            windows,
            config,
            state: TrackingState::Untracked,
        }
    }

    pub fn state(&self) -> TrackingState {
        self.state
    }

    pub fn game_window(&self) -> Option<TargetRect> {
        match self.state {
            TrackingState::Located(rect) => Some(rect),
            TrackingState::Untracked => None,
        }
    }

    /// Part of the window below the title bar, in screen coordinates.
    fn content_area(&self, window: TargetRect) -> TargetRect {
        let bar = self.config.title_bar_height;
        TargetRect::new(
            window.x,
            window.y.saturating_add(bar),
            window.width,
            window.height.saturating_sub(bar),
        )
    }

    fn set_state(&mut self, state: TrackingState) {
        if state == self.state {
            return;
        }
        match state {
            TrackingState::Located(rect) => crate::log(&format!(
                "Game window \"{}\" located: {}",
                self.config.window_title, rect
            )),
            TrackingState::Untracked => crate::log(&format!(
                "Game window \"{}\" lost",
                self.config.window_title
            )),
        }
        self.state = state;
    }
}

impl<C: CaptureBackend, E: WindowEnumerator> VisualSource for GameWindowScanner<C, E> {
    /// Captures a frame, cropped to the game window's content area once the
    /// window has been located.
    ///
    /// A window that is off-screen or minimized crops to a zero-sized frame
    /// rather than `None`, so the caller keeps scanning and notices when the
    /// window comes back.
    fn get_frame(&mut self) -> Option<FrameView> {
        let frame = match self.session.get_frame() {
            Ok(frame) => frame,
            Err(e) => {
                crate::log(&format!("Frame capture failed: {}", e));
                return None;
            }
        };

        match self.state {
            TrackingState::Untracked => Some(frame),
            TrackingState::Located(window) => Some(frame.clip(self.content_area(window))),
        }
    }

    fn scan_initial_targets(&mut self, frame: &FrameView) -> Vec<TargetRect> {
        let windows = self.windows.top_level_windows();
        let Some(found) = find_first_match(&windows, &self.config.window_title) else {
            self.set_state(TrackingState::Untracked);
            return Vec::new();
        };
        self.set_state(TrackingState::Located(found.rect));

        detect_targets(
            frame,
            self.config.red_threshold,
            self.config.min_target_area,
            self.config.merge_overlapping,
        )
    }
}
