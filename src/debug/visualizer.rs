//! Debug visualizer for region trees and OCR boxes.

use std::path::Path;

use image::{ImageFormat, Rgba, RgbaImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect as PixelRect;

use crate::error::{Error, Result};
use crate::geometry::{Rect, Size};
use crate::region::{Region, RegionHandle, RegionKind, RegionTree};

/// Colors for different region kinds.
#[derive(Debug, Clone)]
pub struct RegionColors {
    /// Color for text blocks (RGBA)
    pub block: [f32; 4],
    /// Color for paragraphs (RGBA)
    pub paragraph: [f32; 4],
    /// Color for text lines (RGBA)
    pub line: [f32; 4],
    /// Color for words (RGBA)
    pub word: [f32; 4],
    /// Color for non-text regions (RGBA)
    pub other: [f32; 4],
    /// Color for OCR input boxes (RGBA)
    pub ocr_box: [f32; 4],
}

impl Default for RegionColors {
    fn default() -> Self {
        Self {
            block: [1.0, 0.0, 0.0, 1.0],     // Red
            paragraph: [1.0, 0.5, 0.0, 1.0], // Orange
            line: [0.0, 0.75, 0.0, 1.0],     // Green
            word: [1.0, 0.0, 1.0, 1.0],      // Magenta
            other: [0.5, 0.5, 0.5, 1.0],     // Grey
            ocr_box: [0.0, 0.0, 1.0, 1.0],   // Blue
        }
    }
}

impl RegionColors {
    /// Color for a region kind; `None` for the root.
    pub fn for_kind(&self, kind: RegionKind) -> Option<[f32; 4]> {
        match kind {
            RegionKind::Root => None,
            RegionKind::TextBlock => Some(self.block),
            RegionKind::Paragraph => Some(self.paragraph),
            RegionKind::TextLine => Some(self.line),
            RegionKind::Word => Some(self.word),
            RegionKind::Other => Some(self.other),
        }
    }
}

/// Options for debug visualization.
#[derive(Debug, Clone)]
pub struct DebugOptions {
    /// Whether to draw text blocks
    pub show_blocks: bool,
    /// Whether to draw paragraphs
    pub show_paragraphs: bool,
    /// Whether to draw text lines
    pub show_lines: bool,
    /// Whether to draw words
    pub show_words: bool,
    /// Whether to draw non-text regions
    pub show_other: bool,
    /// Whether to draw OCR input boxes
    pub show_ocr_boxes: bool,
    /// Whether to attach recognized text to exported SVG shapes
    pub label_regions: bool,
    /// Outline width for regions, in pixels
    pub line_width: u32,
    /// Outline width for OCR boxes, in pixels
    pub ocr_box_width: u32,
    /// Colors for different region kinds
    pub colors: RegionColors,
}

impl Default for DebugOptions {
    fn default() -> Self {
        Self {
            show_blocks: true,
            show_paragraphs: true,
            show_lines: true,
            show_words: true,
            show_other: false,
            show_ocr_boxes: true,
            label_regions: false,
            line_width: 1,
            ocr_box_width: 3,
            colors: RegionColors::default(),
        }
    }
}

impl DebugOptions {
    /// Show only text lines.
    pub fn lines_only() -> Self {
        Self {
            show_blocks: false,
            show_paragraphs: false,
            show_lines: true,
            show_words: false,
            show_other: false,
            ..Default::default()
        }
    }

    /// Show every region kind.
    pub fn all() -> Self {
        Self {
            show_other: true,
            label_regions: true,
            ..Default::default()
        }
    }

    fn shows(&self, kind: RegionKind) -> bool {
        match kind {
            RegionKind::Root => false,
            RegionKind::TextBlock => self.show_blocks,
            RegionKind::Paragraph => self.show_paragraphs,
            RegionKind::TextLine => self.show_lines,
            RegionKind::Word => self.show_words,
            RegionKind::Other => self.show_other,
        }
    }
}

/// Debug visualizer for region trees.
pub struct DebugVisualizer {
    options: DebugOptions,
}

impl DebugVisualizer {
    /// Create a new debug visualizer with the given options.
    pub fn new(options: DebugOptions) -> Self {
        Self { options }
    }

    /// Options in use.
    pub fn options(&self) -> &DebugOptions {
        &self.options
    }

    /// Copy of `image` with the bounds of every shown region outlined.
    pub fn render(&self, image: &RgbaImage, tree: &RegionTree) -> RgbaImage {
        let mut canvas = image.clone();
        for handle in tree.descendants(tree.root()) {
            let region = &tree[handle];
            if !self.options.shows(region.kind()) || region.polygon().is_empty() {
                continue;
            }
            if let Some(color) = self.options.colors.for_kind(region.kind()) {
                draw_outline(&mut canvas, &region.bounds(), to_rgba(&color), self.options.line_width);
            }
        }
        canvas
    }

    /// Copy of `image` with the OCR input boxes outlined.
    pub fn render_boxes(&self, image: &RgbaImage, boxes: &[Rect]) -> RgbaImage {
        let mut canvas = image.clone();
        self.draw_boxes(&mut canvas, boxes);
        canvas
    }

    /// Outline OCR input boxes in place.
    pub fn draw_boxes(&self, canvas: &mut RgbaImage, boxes: &[Rect]) {
        if !self.options.show_ocr_boxes {
            return;
        }
        let color = to_rgba(&self.options.colors.ocr_box);
        for b in boxes {
            draw_outline(canvas, b, color, self.options.ocr_box_width);
        }
    }

    /// Write a rendered image as PNG.
    pub fn save_png(&self, image: &RgbaImage, path: impl AsRef<Path>) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        image
            .save_with_format(path.as_ref(), ImageFormat::Png)
            .map_err(|e| Error::Image(format!("failed to save {:?}: {}", path.as_ref(), e)))
    }

    /// Export the tree, with page metadata, to JSON.
    pub fn export_tree_json(&self, tree: &RegionTree) -> Result<String> {
        let value = serde_json::json!({
            "metadata": tree.metadata(),
            "root": self.region_to_json(tree, tree.root()),
        });
        Ok(serde_json::to_string_pretty(&value)?)
    }

    fn region_to_json(&self, tree: &RegionTree, handle: RegionHandle) -> serde_json::Value {
        let region = &tree[handle];
        let children: Vec<serde_json::Value> = tree
            .children(handle)
            .iter()
            .map(|c| self.region_to_json(tree, *c))
            .collect();
        serde_json::json!({
            "id": region.id(),
            "kind": region.kind(),
            "text": region.text(),
            "bbox": self.rect_to_json(&region.bounds()),
            "polygon": region.polygon().points().iter().map(|p| [p.x, p.y]).collect::<Vec<_>>(),
            "children": children,
        })
    }

    /// Convert a Rect to JSON format.
    fn rect_to_json(&self, rect: &Rect) -> serde_json::Value {
        serde_json::json!({
            "x": rect.x,
            "y": rect.y,
            "width": rect.width,
            "height": rect.height,
        })
    }

    /// Export the tree's shown regions as SVG polygons over an image of `size`.
    pub fn export_tree_svg(&self, tree: &RegionTree, size: Size) -> Result<String> {
        let mut svg = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">"#,
            size.width, size.height, size.width, size.height
        );

        for handle in tree.descendants(tree.root()) {
            self.region_to_svg(&mut svg, &tree[handle]);
        }

        svg.push_str("</svg>");
        Ok(svg)
    }

    fn region_to_svg(&self, svg: &mut String, region: &Region) {
        if !self.options.shows(region.kind()) || region.polygon().is_empty() {
            return;
        }
        let Some(color) = self.options.colors.for_kind(region.kind()) else {
            return;
        };

        let points = region
            .polygon()
            .points()
            .iter()
            .map(|p| format!("{},{}", p.x, p.y))
            .collect::<Vec<_>>()
            .join(" ");

        svg.push_str(&format!(
            r#"<polygon class="{}" id="{}" points="{}" fill="none" stroke="{}" stroke-width="{}">"#,
            region.kind(),
            region.id(),
            points,
            self.color_to_svg(&color),
            self.options.line_width
        ));
        if self.options.label_regions && region.has_text() {
            svg.push_str(&format!("<title>{}</title>", escape_xml(region.text())));
        }
        svg.push_str("</polygon>");
    }

    /// Convert RGBA color to SVG rgba() format.
    fn color_to_svg(&self, color: &[f32; 4]) -> String {
        format!(
            "rgba({},{},{},{})",
            (color[0] * 255.0) as u8,
            (color[1] * 255.0) as u8,
            (color[2] * 255.0) as u8,
            color[3]
        )
    }
}

impl Default for DebugVisualizer {
    fn default() -> Self {
        Self::new(DebugOptions::default())
    }
}

fn to_rgba(color: &[f32; 4]) -> Rgba<u8> {
    Rgba(color.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8))
}

/// Draw `rect` with a `width`-pixel outline growing outward.
fn draw_outline(canvas: &mut RgbaImage, rect: &Rect, color: Rgba<u8>, width: u32) {
    let (x, y, w, h) = rect.to_pixel_bounds();
    if w == 0 || h == 0 {
        return;
    }
    for t in 0..width.max(1) {
        let r = PixelRect::at(x as i32 - t as i32, y as i32 - t as i32).of_size(w + 2 * t, h + 2 * t);
        draw_hollow_rect_mut(canvas, r, color);
    }
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
