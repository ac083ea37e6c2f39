//! Geometry reconciliation between region polygons and OCR input rectangles.
//!
//! Three operations decide how a layout region is presented to the OCR
//! engine:
//! - [`polygon_to_ocr_box`] pads a region's bounds so the engine sees some
//!   context around tight text boundaries, then clips to the image.
//! - [`is_axis_aligned_rect`] decides whether a plain rectangular crop is
//!   enough or the region has to be masked.
//! - [`merge_overlapping`] collapses intersecting candidate boxes so no area
//!   is recognized twice.

use super::{Point, Polygon, Rect, Size};

/// Margin added on every side of a region's bounds before recognition.
pub const OCR_BOX_PADDING: f32 = 10.0;

/// Tolerance for treating an edge as horizontal or vertical.
const AXIS_EPSILON: f32 = 1e-3;

/// Compute the rectangle handed to the OCR engine for a region polygon.
///
/// The tight bounds of the polygon are grown by [`OCR_BOX_PADDING`] on all
/// sides and clipped to `[0,0]-[image_size]`. An empty polygon (or one lying
/// entirely outside the image) yields the null rectangle.
///
/// # Examples
///
/// ```
/// use region_ocr::geometry::{polygon_to_ocr_box, Polygon, Rect, Size};
///
/// let poly = Polygon::from_rect(&Rect::from_points(100.0, 100.0, 200.0, 150.0));
/// let ocr_box = polygon_to_ocr_box(Size::new(1000, 800), &poly);
/// assert_eq!(ocr_box, Rect::from_points(90.0, 90.0, 210.0, 160.0));
/// ```
pub fn polygon_to_ocr_box(image_size: Size, polygon: &Polygon) -> Rect {
    if polygon.is_empty() {
        return Rect::null();
    }

    polygon
        .bounding_rect()
        .expanded(OCR_BOX_PADDING)
        .clipped(image_size)
}

/// Whether a polygon is an axis-aligned rectangle.
///
/// True only for exactly four vertices whose edges alternate between
/// horizontal and vertical with non-zero length. Such a polygon always has
/// diagonals of equal length; the converse does not hold, so isosceles
/// trapezoids and rotated rectangles are reported as `false` and take the
/// masked path.
pub fn is_axis_aligned_rect(polygon: &Polygon) -> bool {
    let pts = polygon.points();
    if pts.len() != 4 {
        return false;
    }

    let mut first_horizontal = None;
    for i in 0..4 {
        let Some(horizontal) = edge_orientation(&pts[i], &pts[(i + 1) % 4]) else {
            return false;
        };
        match first_horizontal {
            None => first_horizontal = Some(horizontal),
            Some(first) => {
                // even edges share the first edge's orientation, odd edges flip it
                if (i % 2 == 0) != (horizontal == first) {
                    return false;
                }
            },
        }
    }

    true
}

/// `Some(true)` for a horizontal edge, `Some(false)` for a vertical one.
fn edge_orientation(a: &Point, b: &Point) -> Option<bool> {
    let dx = (b.x - a.x).abs();
    let dy = (b.y - a.y).abs();
    match (dx <= AXIS_EPSILON, dy <= AXIS_EPSILON) {
        (false, true) => Some(true),
        (true, false) => Some(false),
        _ => None,
    }
}

/// Merge intersecting rectangles until the set is pairwise disjoint.
///
/// Repeatedly takes the first intersecting pair in iteration order, replaces
/// it with its union and rescans from the start. Null rectangles are dropped.
/// Every input rectangle ends up contained in exactly one output rectangle;
/// which output index it lands in depends on input order.
///
/// # Examples
///
/// ```
/// use region_ocr::geometry::{merge_overlapping, Rect};
///
/// let merged = merge_overlapping(&[
///     Rect::from_points(0.0, 0.0, 100.0, 50.0),
///     Rect::from_points(90.0, 40.0, 200.0, 90.0),
/// ]);
/// assert_eq!(merged, vec![Rect::from_points(0.0, 0.0, 200.0, 90.0)]);
/// ```
pub fn merge_overlapping(boxes: &[Rect]) -> Vec<Rect> {
    let mut boxes: Vec<Rect> = boxes.iter().copied().filter(|b| !b.is_null()).collect();

    'restart: loop {
        for i in 0..boxes.len() {
            for j in 0..boxes.len() {
                if i == j {
                    continue;
                }
                if boxes[i].intersects(&boxes[j]) {
                    log::trace!("Merging OCR boxes {:?} and {:?}", boxes[i], boxes[j]);
                    boxes[i] = boxes[i].union(&boxes[j]);
                    boxes.remove(j);
                    continue 'restart;
                }
            }
        }
        return boxes;
    }
}
