//! Red-target detection: mask, outer contours, and box reduction.

use image::{GrayImage, Luma};
use imageproc::contours::{find_contours, BorderType};
use imageproc::point::Point;

use crate::frame::{FrameView, TargetRect};

/// Marks pixels whose red channel beats both others by more than `threshold`.
///
/// The difference saturates at zero, so a pixel that is not red at all never
/// passes. Output is 255 for a hit and 0 otherwise.
pub fn red_dominance_mask(frame: &FrameView, threshold: u8) -> GrayImage {
    let mut mask = GrayImage::new(frame.width(), frame.height());
    for y in 0..frame.height() {
        for (x, px) in frame.row(y).chunks_exact(4).enumerate() {
            let (b, g, r) = (px[0], px[1], px[2]);
            if r.saturating_sub(g.max(b)) > threshold {
                mask.put_pixel(x as u32, y, Luma([255]));
            }
        }
    }
    mask
}

/// Outer borders of the foreground blobs in `mask`, ignoring anything nested
/// inside another blob.
///
/// The tracer needs background all around the image, otherwise a blob that
/// touches the left edge is taken for a hole and hides the blobs beside it.
/// The mask is traced with a one-pixel empty border and points are shifted
/// back into mask coordinates.
pub fn external_contours(mask: &GrayImage) -> Vec<Vec<Point<i32>>> {
    let mut padded = GrayImage::new(mask.width() + 2, mask.height() + 2);
    image::imageops::replace(&mut padded, mask, 1, 1);

    find_contours::<i32>(&padded)
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .map(|c| {
            c.points
                .into_iter()
                .map(|p| Point::new(p.x - 1, p.y - 1))
                .collect()
        })
        .collect()
}

/// Smallest axis-aligned rectangle containing every point, in pixels.
pub fn bounding_rect(points: &[Point<i32>]) -> Option<TargetRect> {
    let first = points.first()?;
    let (mut left, mut top, mut right, mut bottom) = (first.x, first.y, first.x, first.y);
    for p in &points[1..] {
        left = left.min(p.x);
        top = top.min(p.y);
        right = right.max(p.x);
        bottom = bottom.max(p.y);
    }
    Some(TargetRect::from_edges(left, top, right + 1, bottom + 1))
}

/// Turns raw boxes into the final target list.
///
/// Boxes under `min_area` are dropped, then (if `merge`) any boxes that
/// overlap or touch are merged until none do. The result is sorted top to
/// bottom, then left to right.
pub fn reduce_targets(rects: Vec<TargetRect>, min_area: i64, merge: bool) -> Vec<TargetRect> {
    let mut targets: Vec<TargetRect> = rects
        .into_iter()
        .filter(|r| !r.is_empty() && r.area() >= min_area)
        .collect();

    if merge {
        // A merged box can reach boxes its parts did not, so repeat until
        // a pass changes nothing.
        loop {
            let before = targets.len();
            targets = merge_pass(targets);
            if targets.len() == before {
                break;
            }
        }
    }

    targets.sort_by_key(|r| (r.y, r.x));
    targets
}

/// One sweep over boxes sorted by left edge, joining every touching pair and
/// replacing each joined group with its union.
fn merge_pass(mut rects: Vec<TargetRect>) -> Vec<TargetRect> {
    rects.sort_by_key(|r| r.x);
    let mut groups = DisjointSet::new(rects.len());
    // Boxes whose right edge can still reach the sweep line.
    let mut active: Vec<usize> = Vec::new();

    for (i, rect) in rects.iter().enumerate() {
        active.retain(|&j| rects[j].right() >= rect.x);
        for &j in &active {
            if rects[j].touches(rect) {
                groups.union(i, j);
            }
        }
        active.push(i);
    }

    let mut merged: Vec<Option<TargetRect>> = vec![None; rects.len()];
    for (i, rect) in rects.iter().enumerate() {
        let root = groups.find(i);
        merged[root] = Some(match merged[root] {
            Some(acc) => acc.union(rect),
            None => *rect,
        });
    }
    merged.into_iter().flatten().collect()
}

struct DisjointSet {
    parent: Vec<usize>,
}

impl DisjointSet {
    fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
        }
    }

    fn find(&mut self, mut i: usize) -> usize {
        while self.parent[i] != i {
            self.parent[i] = self.parent[self.parent[i]];
            i = self.parent[i];
        }
        i
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            self.parent[rb] = ra;
        }
    }
}

/// Full pipeline: mask, contours, boxes, reduction.
pub fn detect_targets(
    frame: &FrameView,
    threshold: u8,
    min_area: i64,
    merge: bool,
) -> Vec<TargetRect> {
    let mask = red_dominance_mask(frame, threshold);
    let boxes = external_contours(&mask)
        .iter()
        .filter_map(|contour| bounding_rect(contour))
        .collect();
    reduce_targets(boxes, min_area, merge)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::FrameBuffer;

    const RED: [u8; 4] = [0, 0, 255, 255];

    fn scene(width: u32, height: u32, blobs: &[TargetRect]) -> FrameView {
        let mut buffer = FrameBuffer::filled(width, height, [40, 40, 40, 255]);
        for blob in blobs {
            for y in blob.y..blob.bottom() {
                for x in blob.x..blob.right() {
                    buffer.put_pixel(x as u32, y as u32, RED);
                }
            }
        }
        FrameView::from(buffer)
    }

    #[test]
    fn test_mask_threshold_is_strict() {
        let mut buffer = FrameBuffer::new(3, 1);
        buffer.put_pixel(0, 0, [10, 10, 95, 255]); // margin 85: not above
        buffer.put_pixel(1, 0, [10, 10, 96, 255]); // margin 86
        buffer.put_pixel(2, 0, [200, 10, 255, 255]); // blue too strong
        let mask = red_dominance_mask(&FrameView::from(buffer), 85);

        assert_eq!(mask.get_pixel(0, 0).0, [0]);
        assert_eq!(mask.get_pixel(1, 0).0, [255]);
        assert_eq!(mask.get_pixel(2, 0).0, [0]);
    }

    #[test]
    fn test_mask_saturates_instead_of_wrapping() {
        // 10 - 250 would wrap to a large value without saturation.
        let frame = FrameView::from(FrameBuffer::filled(2, 2, [250, 250, 10, 255]));
        let mask = red_dominance_mask(&frame, 85);
        assert!(mask.pixels().all(|p| p.0 == [0]));
    }

    #[test]
    fn test_contour_points_stay_in_mask_coordinates() {
        let mut mask = GrayImage::new(5, 4);
        for y in 0..2 {
            for x in 0..3 {
                mask.put_pixel(x, y, Luma([255]));
            }
        }

        let contours = external_contours(&mask);
        assert_eq!(contours.len(), 1);
        assert!(contours[0].iter().all(|p| p.x >= 0 && p.y >= 0 && p.x < 5 && p.y < 4));
        assert_eq!(bounding_rect(&contours[0]), Some(TargetRect::new(0, 0, 3, 2)));
    }

    #[test]
    fn test_bounding_rect() {
        let points = [Point::new(3, 4), Point::new(7, 2), Point::new(5, 9)];
        assert_eq!(bounding_rect(&points), Some(TargetRect::new(3, 2, 5, 8)));
        assert_eq!(bounding_rect(&[]), None);
    }

    #[test]
    fn test_detects_separate_blobs_in_order() {
        let frame = scene(
            100,
            60,
            &[TargetRect::new(60, 30, 10, 8), TargetRect::new(5, 5, 12, 6)],
        );
        let targets = detect_targets(&frame, 85, 16, true);
        assert_eq!(
            targets,
            vec![TargetRect::new(5, 5, 12, 6), TargetRect::new(60, 30, 10, 8)]
        );
    }

    #[test]
    fn test_hole_does_not_add_target() {
        let mut buffer = FrameBuffer::filled(40, 40, [40, 40, 40, 255]);
        for y in 5..25 {
            for x in 5..25 {
                let border = x < 8 || x >= 22 || y < 8 || y >= 22;
                if border {
                    buffer.put_pixel(x, y, RED);
                }
            }
        }
        // Red dot inside the ring's hole.
        for y in 14..17 {
            for x in 14..17 {
                buffer.put_pixel(x, y, RED);
            }
        }

        let targets = detect_targets(&FrameView::from(buffer), 85, 4, false);
        assert_eq!(targets, vec![TargetRect::new(5, 5, 20, 20)]);
    }

    #[test]
    fn test_small_blobs_are_dropped() {
        let frame = scene(50, 50, &[TargetRect::new(1, 1, 3, 3), TargetRect::new(20, 20, 5, 5)]);
        let targets = detect_targets(&frame, 85, 16, true);
        assert_eq!(targets, vec![TargetRect::new(20, 20, 5, 5)]);
    }

    #[test]
    fn test_reduce_merges_touching_boxes() {
        let rects = vec![
            TargetRect::new(0, 0, 10, 10),
            TargetRect::new(30, 30, 5, 5),
            TargetRect::new(10, 5, 10, 10),
        ];

        let merged = reduce_targets(rects.clone(), 0, true);
        assert_eq!(
            merged,
            vec![TargetRect::new(0, 0, 20, 15), TargetRect::new(30, 30, 5, 5)]
        );

        let unmerged = reduce_targets(rects, 0, false);
        assert_eq!(unmerged.len(), 3);
        assert_eq!(unmerged[0], TargetRect::new(0, 0, 10, 10));
    }

    #[test]
    fn test_left_edge_blob_does_not_hide_its_row() {
        let frame = scene(
            60,
            40,
            &[
                TargetRect::new(0, 10, 6, 6),
                TargetRect::new(30, 10, 6, 6),
                TargetRect::new(30, 20, 6, 6),
            ],
        );
        let targets = detect_targets(&frame, 85, 16, false);
        assert_eq!(
            targets,
            vec![
                TargetRect::new(0, 10, 6, 6),
                TargetRect::new(30, 10, 6, 6),
                TargetRect::new(30, 20, 6, 6),
            ]
        );
    }

    #[test]
    fn test_blobs_on_every_edge() {
        let frame = scene(
            40,
            30,
            &[
                TargetRect::new(0, 0, 6, 6),
                TargetRect::new(34, 12, 6, 6),
                TargetRect::new(15, 24, 6, 6),
                TargetRect::new(34, 24, 6, 6),
            ],
        );
        let targets = detect_targets(&frame, 85, 16, false);
        assert_eq!(
            targets,
            vec![
                TargetRect::new(0, 0, 6, 6),
                TargetRect::new(34, 12, 6, 6),
                TargetRect::new(15, 24, 6, 6),
                TargetRect::new(34, 24, 6, 6),
            ]
        );
    }

    #[test]
    fn test_frame_filled_with_red_is_one_target() {
        let frame = scene(20, 10, &[TargetRect::new(0, 0, 20, 10)]);
        assert_eq!(
            detect_targets(&frame, 85, 16, true),
            vec![TargetRect::new(0, 0, 20, 10)]
        );
    }

    #[test]
    fn test_dot_grid_keeps_every_dot() {
        let mut blobs = Vec::new();
        for y in (0..100).step_by(6) {
            for x in (0..196).step_by(6) {
                blobs.push(TargetRect::new(x, y, 4, 4));
            }
        }
        let frame = scene(200, 100, &blobs);
        let targets = detect_targets(&frame, 85, 16, true);
        assert_eq!(targets.len(), blobs.len());
        assert_eq!(targets[0], TargetRect::new(0, 0, 4, 4));
    }

    #[test]
    fn test_merge_repeats_until_stable() {
        // Only the union of the first two reaches the third.
        let rects = vec![
            TargetRect::new(0, 0, 5, 5),
            TargetRect::new(5, 5, 5, 5),
            TargetRect::new(8, 0, 2, 2),
        ];
        assert_eq!(reduce_targets(rects, 0, true), vec![TargetRect::new(0, 0, 10, 10)]);
    }

    #[test]
    fn test_merge_many_separate_boxes() {
        let rects: Vec<TargetRect> = (0..240)
            .flat_map(|row| (0..240).map(move |col| TargetRect::new(col * 8, row * 5, 4, 4)))
            .collect();
        let reduced = reduce_targets(rects.clone(), 16, true);
        assert_eq!(reduced.len(), rects.len());
    }

    #[test]
    fn test_blank_frame_has_no_targets() {
        let frame = scene(30, 30, &[]);
        assert!(detect_targets(&frame, 85, 16, true).is_empty());

        let empty = FrameView::from(FrameBuffer::new(0, 0));
        assert!(detect_targets(&empty, 85, 16, true).is_empty());
    }
}
