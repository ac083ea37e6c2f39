//! Geometric primitives for region OCR.
//!
//! This module provides the point, rectangle and polygon types that regions
//! carry, plus the containment / intersection / union operations the
//! reconciliation engine relies on. All coordinates are in image pixel space
//! with the origin at the top-left corner.

mod reconciler;

pub use reconciler::{is_axis_aligned_rect, merge_overlapping, polygon_to_ocr_box, OCR_BOX_PADDING};

use serde::{Deserialize, Serialize};

/// A 2D point in image space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate
    pub x: f32,
    /// Y coordinate
    pub y: f32,
}

impl Point {
    /// Create a new point.
    ///
    /// # Examples
    ///
    /// ```
    /// use region_ocr::geometry::Point;
    ///
    /// let point = Point::new(10.0, 20.0);
    /// assert_eq!(point.x, 10.0);
    /// assert_eq!(point.y, 20.0);
    /// ```
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Pixel dimensions of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Size {
    /// Create a new size.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// The rectangle `[0,0]-[width,height]` covering the whole image.
    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width as f32, self.height as f32)
    }
}

/// An axis-aligned rectangle in image space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// X coordinate of top-left corner
    pub x: f32,
    /// Y coordinate of top-left corner
    pub y: f32,
    /// Width of rectangle
    pub width: f32,
    /// Height of rectangle
    pub height: f32,
}

impl Rect {
    /// Create a new rectangle from position and dimensions.
    ///
    /// # Examples
    ///
    /// ```
    /// use region_ocr::geometry::Rect;
    ///
    /// let rect = Rect::new(0.0, 0.0, 100.0, 50.0);
    /// assert_eq!(rect.width, 100.0);
    /// assert_eq!(rect.height, 50.0);
    /// ```
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle from two corner points.
    ///
    /// # Examples
    ///
    /// ```
    /// use region_ocr::geometry::Rect;
    ///
    /// let rect = Rect::from_points(10.0, 20.0, 110.0, 70.0);
    /// assert_eq!(rect.x, 10.0);
    /// assert_eq!(rect.y, 20.0);
    /// assert_eq!(rect.width, 100.0);
    /// assert_eq!(rect.height, 50.0);
    /// ```
    pub fn from_points(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        }
    }

    /// The null rectangle: zero position and zero size.
    pub fn null() -> Self {
        Self::default()
    }

    /// A rectangle with no area (zero or negative width or height).
    pub fn is_null(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Get the left edge x-coordinate.
    pub fn left(&self) -> f32 {
        self.x
    }

    /// Get the right edge x-coordinate.
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Get the top edge y-coordinate.
    pub fn top(&self) -> f32 {
        self.y
    }

    /// Get the bottom edge y-coordinate.
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Get the center point of the rectangle.
    pub fn center(&self) -> Point {
        Point {
            x: self.x + self.width / 2.0,
            y: self.y + self.height / 2.0,
        }
    }

    /// Check if this rectangle intersects with another.
    ///
    /// Rectangles that only share an edge do not intersect.
    ///
    /// # Examples
    ///
    /// ```
    /// use region_ocr::geometry::Rect;
    ///
    /// let r1 = Rect::new(0.0, 0.0, 100.0, 100.0);
    /// let r2 = Rect::new(50.0, 50.0, 100.0, 100.0);
    /// let r3 = Rect::new(200.0, 200.0, 100.0, 100.0);
    ///
    /// assert!(r1.intersects(&r2));
    /// assert!(!r1.intersects(&r3));
    /// ```
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

    /// Check if this rectangle contains a point (edges inclusive).
    pub fn contains_point(&self, p: &Point) -> bool {
        p.x >= self.left() && p.x <= self.right() && p.y >= self.top() && p.y <= self.bottom()
    }

    /// Check if this rectangle fully contains another (edges inclusive).
    ///
    /// # Examples
    ///
    /// ```
    /// use region_ocr::geometry::Rect;
    ///
    /// let outer = Rect::new(0.0, 0.0, 100.0, 100.0);
    /// assert!(outer.contains(&Rect::new(10.0, 10.0, 20.0, 20.0)));
    /// assert!(outer.contains(&outer));
    /// assert!(!outer.contains(&Rect::new(90.0, 90.0, 20.0, 20.0)));
    /// ```
    pub fn contains(&self, other: &Rect) -> bool {
        other.left() >= self.left()
            && other.right() <= self.right()
            && other.top() >= self.top()
            && other.bottom() <= self.bottom()
    }

    /// Compute the union of this rectangle with another.
    ///
    /// Returns the smallest rectangle that contains both rectangles.
    ///
    /// # Examples
    ///
    /// ```
    /// use region_ocr::geometry::Rect;
    ///
    /// let r1 = Rect::new(0.0, 0.0, 50.0, 50.0);
    /// let r2 = Rect::new(25.0, 25.0, 50.0, 50.0);
    /// let union = r1.union(&r2);
    ///
    /// assert_eq!(union.x, 0.0);
    /// assert_eq!(union.y, 0.0);
    /// assert_eq!(union.right(), 75.0);
    /// assert_eq!(union.bottom(), 75.0);
    /// ```
    pub fn union(&self, other: &Rect) -> Rect {
        let x0 = self.left().min(other.left());
        let y0 = self.top().min(other.top());
        let x1 = self.right().max(other.right());
        let y1 = self.bottom().max(other.bottom());
        Rect::from_points(x0, y0, x1, y1)
    }

    /// Compute the overlapping part of two rectangles.
    ///
    /// Returns the null rectangle when they do not overlap.
    pub fn intersection(&self, other: &Rect) -> Rect {
        let x0 = self.left().max(other.left());
        let y0 = self.top().max(other.top());
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());
        if x1 <= x0 || y1 <= y0 {
            return Rect::null();
        }
        Rect::from_points(x0, y0, x1, y1)
    }

    /// Grow the rectangle by `margin` on every side.
    pub fn expanded(&self, margin: f32) -> Rect {
        Rect::from_points(
            self.left() - margin,
            self.top() - margin,
            self.right() + margin,
            self.bottom() + margin,
        )
    }

    /// Clip the rectangle to `[0,0]-[size.width,size.height]`.
    ///
    /// Returns the null rectangle when nothing of it lies inside the image.
    pub fn clipped(&self, size: Size) -> Rect {
        self.intersection(&size.bounds())
    }

    /// Compute the area of the rectangle.
    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    /// The four corners in clockwise order starting at the top-left.
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.left(), self.top()),
            Point::new(self.right(), self.top()),
            Point::new(self.right(), self.bottom()),
            Point::new(self.left(), self.bottom()),
        ]
    }

    /// Integer pixel bounds `(x, y, width, height)`, snapped outwards.
    ///
    /// Negative coordinates are clamped to zero.
    pub fn to_pixel_bounds(&self) -> (u32, u32, u32, u32) {
        let x0 = self.left().floor().max(0.0) as u32;
        let y0 = self.top().floor().max(0.0) as u32;
        let x1 = self.right().ceil().max(0.0) as u32;
        let y1 = self.bottom().ceil().max(0.0) as u32;
        (x0, y0, x1.saturating_sub(x0), y1.saturating_sub(y0))
    }
}

/// An ordered sequence of vertices describing a simple polygon.
///
/// A polygon may be a plain rectangle (four axis-aligned corners) or any
/// simple polygon produced by a layout tool.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Polygon {
    points: Vec<Point>,
}

impl Polygon {
    /// Create a polygon from its vertices.
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// Create a four-vertex polygon tracing a rectangle.
    pub fn from_rect(rect: &Rect) -> Self {
        Self {
            points: rect.corners().to_vec(),
        }
    }

    /// The vertices.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Number of vertices.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the polygon has no vertices.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Tight bounding rectangle of all vertices.
    ///
    /// A vertex at the image origin counts like any other vertex.
    /// Returns the null rectangle for an empty polygon.
    ///
    /// # Examples
    ///
    /// ```
    /// use region_ocr::geometry::{Point, Polygon};
    ///
    /// let poly = Polygon::new(vec![
    ///     Point::new(0.0, 0.0),
    ///     Point::new(40.0, 10.0),
    ///     Point::new(20.0, 30.0),
    /// ]);
    /// let bounds = poly.bounding_rect();
    /// assert_eq!((bounds.x, bounds.y, bounds.right(), bounds.bottom()), (0.0, 0.0, 40.0, 30.0));
    /// ```
    pub fn bounding_rect(&self) -> Rect {
        let Some(first) = self.points.first() else {
            return Rect::null();
        };

        let (mut x0, mut y0, mut x1, mut y1) = (first.x, first.y, first.x, first.y);
        for p in &self.points[1..] {
            x0 = x0.min(p.x);
            y0 = y0.min(p.y);
            x1 = x1.max(p.x);
            y1 = y1.max(p.y);
        }
        Rect::from_points(x0, y0, x1, y1)
    }
}

impl From<Rect> for Polygon {
    fn from(rect: Rect) -> Self {
        Polygon::from_rect(&rect)
    }
}
