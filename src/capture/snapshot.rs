//! PNG snapshots of captured frames, for checking what the scanner saw.

use anyhow::{Context, Result};
use chrono::Local;
use image::{ImageBuffer, Rgba, RgbaImage};
use std::path::{Path, PathBuf};

use crate::frame::FrameView;

/// Converts a BGRA view into an RGBA image.
pub fn to_rgba_image(frame: &FrameView) -> RgbaImage {
    let mut img: RgbaImage = ImageBuffer::new(frame.width(), frame.height());
    for y in 0..frame.height() {
        for (x, px) in frame.row(y).chunks_exact(4).enumerate() {
            // BGRA -> RGBA
            img.put_pixel(x as u32, y, Rgba([px[2], px[1], px[0], px[3]]));
        }
    }
    img
}

/// Writes `frame` to `dir` as `snapshot_<timestamp>.png` and returns the path.
pub fn save_snapshot(frame: &FrameView, dir: &Path) -> Result<PathBuf> {
    let timestamp = Local::now().format("%Y%m%d_%H%M%S_%3f");
    let path = dir.join(format!("snapshot_{}.png", timestamp));

    to_rgba_image(frame)
        .save(&path)
        .with_context(|| format!("Failed to save snapshot to {}", path.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{FrameBuffer, TargetRect};
    use tempfile::tempdir;

    #[test]
    fn test_to_rgba_swaps_channels() {
        let mut buffer = FrameBuffer::new(2, 1);
        buffer.put_pixel(1, 0, [10, 20, 30, 40]);

        let img = to_rgba_image(&FrameView::from(buffer));
        assert_eq!(*img.get_pixel(1, 0), Rgba([30, 20, 10, 40]));
    }

    #[test]
    fn test_save_snapshot_of_cropped_view() {
        let dir = tempdir().unwrap();
        let view = FrameView::from(FrameBuffer::filled(10, 10, [0, 0, 255, 255]));
        let cropped = view.crop(TargetRect::new(2, 2, 4, 3)).unwrap();

        let path = save_snapshot(&cropped, dir.path()).unwrap();
        assert!(path.exists());

        let loaded = image::open(&path).unwrap().to_rgba8();
        assert_eq!(loaded.dimensions(), (4, 3));
        assert_eq!(*loaded.get_pixel(0, 0), Rgba([255, 0, 0, 255]));
    }
}
