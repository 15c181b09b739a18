//! Target Overlay
//!
//! Captures the primary display, finds the game window, detects red targets
//! inside it, and outlines them on a click-through overlay drawn on top of
//! everything else.

// The native backends only exist on Windows; elsewhere only the core is built.
#![cfg_attr(not(windows), allow(dead_code))]

mod capture;
mod config;
mod error;
mod frame;
mod handle;
mod overlay;
mod paths;
mod source;
#[cfg(test)]
mod testing;

use anyhow::Result;
use chrono::Local;
use std::fs::OpenOptions;
use std::io::Write;

use frame::TargetRect;

/// Logs a message to both console and log file with timestamp.
pub fn log(msg: &str) {
    let timestamp = Local::now().format("%H:%M:%S%.3f");
    let line = format!("[{}] {}\n", timestamp, msg);
    print!("{}", line);
    let log_path = paths::get_logs_dir().join("target_overlay.log");
    if let Ok(mut file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        let _ = file.write_all(line.as_bytes());
    }
}

fn install_panic_hook() {
    std::panic::set_hook(Box::new(|panic_info| {
        let msg = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };
        let location = if let Some(loc) = panic_info.location() {
            format!(" at {}:{}:{}", loc.file(), loc.line(), loc.column())
        } else {
            String::new()
        };
        log(&format!("[PANIC]{} {}", location, msg));
    }));
}

/// Where a frame-local target lands on an overlay placed at `overlay_origin`.
///
/// Frame origins are screen coordinates because the capture covers the
/// primary display starting at (0, 0).
fn overlay_offset(
    frame_origin: (i32, i32),
    target: &TargetRect,
    overlay_origin: (i32, i32),
) -> (i32, i32) {
    (
        frame_origin.0 + target.x - overlay_origin.0,
        frame_origin.1 + target.y - overlay_origin.1,
    )
}

#[cfg(windows)]
fn main() -> Result<()> {
    install_panic_hook();
    paths::ensure_directories()?;

    match driver::run() {
        Ok(()) => {
            log("Driver exited normally");
            Ok(())
        }
        Err(e) => {
            log(&format!("Fatal: {:#}", e));
            Err(e)
        }
    }
}

#[cfg(not(windows))]
fn main() -> Result<()> {
    install_panic_hook();
    anyhow::bail!("target-overlay needs Windows: desktop duplication and layered windows are Win32-only")
}

#[cfg(windows)]
mod driver {
    use anyhow::{Context, Result};
    use std::time::Duration;

    use crate::capture::{save_snapshot, CaptureSession, DxgiCapture};
    use crate::config;
    use crate::log;
    use crate::overlay::{outline, OverlayRegistry, OverlayWindow, Win32Windowing};
    use crate::paths;
    use crate::source::{GameWindowScanner, VisualSource, Win32WindowEnumerator};

    /// Capture, scan, and draw until `max_frames` is reached (or forever).
    pub fn run() -> Result<()> {
        let config = config::load_config();

        let capture = DxgiCapture::create().context("Failed to open desktop duplication")?;
        let session = CaptureSession::create(capture)?;
        let (display_h, display_w) = session.dimensions();

        let windowing = Win32Windowing::new().context("Failed to set up overlay windowing")?;
        let registry = OverlayRegistry::new(windowing);
        let ov = &config.overlay;
        let mut overlay = OverlayWindow::create(
            &registry,
            ov.x.unwrap_or(0),
            ov.y.unwrap_or(0),
            ov.width.unwrap_or(display_w as i32),
            ov.height.unwrap_or(display_h as i32),
        )?;
        let overlay_origin = overlay.position()?;

        let mut scanner =
            GameWindowScanner::new(session, Win32WindowEnumerator, config.scanner.clone());
        let interval = Duration::from_millis(config.driver.frame_interval_ms);
        let snapshots_dir = paths::get_snapshots_dir();

        log(&format!(
            "Scanning for \"{}\" every {} ms",
            config.scanner.window_title, config.driver.frame_interval_ms
        ));

        let mut frames: u64 = 0;
        let mut last_count = 0;
        while config.driver.max_frames.is_none_or(|max| frames < max) {
            frames += 1;
            overlay.clear();

            if let Some(frame) = scanner.get_frame() {
                let targets = scanner.scan_initial_targets(&frame);
                if targets.len() != last_count {
                    if let Some(window) = scanner.game_window() {
                        log(&format!("{} target(s) in game window {}", targets.len(), window));
                    }
                    last_count = targets.len();
                }

                for target in &targets {
                    let marker = outline(
                        target.width as u32,
                        target.height as u32,
                        ov.outline_color,
                        ov.outline_thickness,
                    );
                    let (x, y) = super::overlay_offset(frame.origin(), target, overlay_origin);
                    overlay.append(&marker, x, y);
                }

                if config.driver.save_snapshots && !targets.is_empty() {
                    if let Err(e) = save_snapshot(&frame, &snapshots_dir) {
                        log(&format!("Failed to save snapshot: {:#}", e));
                    }
                }
            }

            if let Err(e) = overlay.update() {
                log(&format!("Overlay update failed: {}", e));
            }
            std::thread::sleep(interval);
        }

        overlay.destroy();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlay_offset_maps_through_screen() {
        // Target 5,6 inside a frame cropped at screen (100, 78), overlay at (10, 20).
        let target = TargetRect::new(5, 6, 30, 30);
        assert_eq!(overlay_offset((100, 78), &target, (10, 20)), (95, 64));
        assert_eq!(overlay_offset((0, 0), &target, (0, 0)), (5, 6));
    }
}
