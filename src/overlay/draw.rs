//! Marker drawing for the overlay.
//!
//! Markers are built as small frames with a transparent interior so they can
//! be composited with `append` like any other frame.

use crate::frame::{FrameBuffer, FrameView, TargetRect};

/// Draws a rectangle border on a buffer. Pixels outside the buffer are skipped.
pub fn draw_rect(buffer: &mut FrameBuffer, rect: TargetRect, bgra: [u8; 4], thickness: u32) {
    if rect.is_empty() {
        return;
    }
    let t = (thickness as i32).min(rect.width).min(rect.height).max(1);

    for y in rect.y..rect.bottom() {
        for x in rect.x..rect.right() {
            let on_edge = x < rect.x + t
                || x >= rect.right() - t
                || y < rect.y + t
                || y >= rect.bottom() - t;
            if on_edge && x >= 0 && y >= 0 {
                buffer.put_pixel(x as u32, y as u32, bgra);
            }
        }
    }
}

/// Builds an opaque outline of the given size with a fully transparent
/// interior.
pub fn outline(width: u32, height: u32, bgr: [u8; 3], thickness: u32) -> FrameView {
    let mut buffer = FrameBuffer::new(width, height);
    draw_rect(
        &mut buffer,
        TargetRect::new(0, 0, width as i32, height as i32),
        [bgr[0], bgr[1], bgr[2], 255],
        thickness,
    );
    FrameView::from(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    const GREEN: [u8; 4] = [0, 255, 0, 255];

    #[test]
    fn test_draw_rect() {
        let mut buffer = FrameBuffer::new(100, 100);
        draw_rect(&mut buffer, TargetRect::new(10, 10, 50, 30), GREEN, 2);

        // Corner and edges are drawn
        assert_eq!(buffer.pixel(10, 10), Some(GREEN));
        assert_eq!(buffer.pixel(59, 39), Some(GREEN));
        assert_eq!(buffer.pixel(11, 25), Some(GREEN));
        // Interior is untouched
        assert_eq!(buffer.pixel(35, 25), Some([0, 0, 0, 0]));
        assert_eq!(buffer.pixel(60, 25), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_draw_rect_clips() {
        let mut buffer = FrameBuffer::new(10, 10);
        draw_rect(&mut buffer, TargetRect::new(-5, -5, 30, 30), GREEN, 1);
        assert_eq!(buffer.pixel(0, 0), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_outline_interior_is_transparent() {
        let marker = outline(20, 10, [0, 255, 0], 1);
        assert_eq!(marker.pixel(0, 0), Some(GREEN));
        assert_eq!(marker.pixel(19, 9), Some(GREEN));
        assert_eq!(marker.pixel(10, 5).map(|px| px[3]), Some(0));
    }
}
