//! Reconciliation of an existing region layout with fresh OCR results.
//!
//! Regions whose text is still empty are recognized and filled in; regions
//! that already carry text are never touched. Two modes are available:
//!
//! - [`ReconcileMode::PerRegion`] recognizes every candidate on its own,
//!   either as a rectangle of the page or as a polygon-masked crop.
//! - [`ReconcileMode::Redistribute`] merges overlapping candidate boxes,
//!   recognizes each merged area once and hands every recognized line to
//!   the smallest candidate containing it.

pub mod imaging;

use std::collections::BTreeSet;
use std::time::Instant;

use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::config::OcrConfig;
use crate::error::Result;
use crate::geometry::{is_axis_aligned_rect, merge_overlapping, polygon_to_ocr_box, Rect, Size};
use crate::ocr::{ImageView, OcrBackend, OcrEngine, PageLevel, PageSegMode, RecognitionRequest, ResultCursor};
use crate::region::{RegionHandle, RegionKind, RegionTree};

/// How recognized text is written back into an existing layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconcileMode {
    /// One recognition pass per candidate region
    #[default]
    PerRegion,
    /// One pass per merged area, lines assigned by best-fit containment
    Redistribute,
}

/// What a reconciliation run did.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReconcileReport {
    /// Regions selected for recognition
    pub candidates: usize,
    /// Regions that received text
    pub recognized: usize,
    /// Candidates skipped for lack of usable geometry
    pub skipped_empty: usize,
    /// Recognition passes that failed
    pub failed: usize,
    /// Recognized lines no candidate could take
    pub unresolved_lines: usize,
    /// OCR rectangles of the processed candidates
    pub ocr_boxes: Vec<Rect>,
}

/// Regions that need recognition: text blocks, then text lines, with a
/// polygon and no text yet.
pub fn select_candidates(tree: &RegionTree) -> Vec<RegionHandle> {
    [RegionKind::TextBlock, RegionKind::TextLine]
        .into_iter()
        .flat_map(|kind| tree.filter(kind))
        .filter(|h| !tree[*h].polygon().is_empty() && !tree[*h].has_text())
        .collect()
}

/// Fills empty regions of a layout with recognized text.
#[derive(Debug, Clone)]
pub struct RegionReconciler {
    mode: ReconcileMode,
    page_seg_mode: PageSegMode,
    mask_fill: Rgba<u8>,
}

impl Default for RegionReconciler {
    fn default() -> Self {
        Self::new(ReconcileMode::default())
    }
}

impl RegionReconciler {
    /// Reconciler in the given mode, with automatic segmentation and a
    /// white mask.
    pub fn new(mode: ReconcileMode) -> Self {
        Self {
            mode,
            page_seg_mode: PageSegMode::Auto,
            mask_fill: Rgba([255, 255, 255, 255]),
        }
    }

    /// Reconciler configured from an [`OcrConfig`].
    pub fn from_config(config: &OcrConfig) -> Self {
        Self::new(config.reconcile_mode)
            .with_page_seg_mode(config.page_seg_mode)
            .with_mask_fill(config.mask_fill)
    }

    /// Segmentation mode for every pass.
    pub fn with_page_seg_mode(mut self, mode: PageSegMode) -> Self {
        self.page_seg_mode = mode;
        self
    }

    /// Colour painted outside masked polygons.
    pub fn with_mask_fill(mut self, rgba: [u8; 4]) -> Self {
        self.mask_fill = Rgba(rgba);
        self
    }

    /// Active mode.
    pub fn mode(&self) -> ReconcileMode {
        self.mode
    }

    /// Recognize every candidate of `tree` and write the text back.
    ///
    /// Per-region failures are logged and counted; only session-level
    /// errors abort the run.
    pub fn reconcile<B: OcrBackend>(
        &self,
        engine: &mut OcrEngine<B>,
        image: &RgbaImage,
        tree: &mut RegionTree,
    ) -> Result<ReconcileReport> {
        let start = Instant::now();
        let candidates = select_candidates(tree);
        let mut report = ReconcileReport {
            candidates: candidates.len(),
            ..ReconcileReport::default()
        };

        match self.mode {
            ReconcileMode::PerRegion => self.per_region(engine, image, tree, &candidates, &mut report)?,
            ReconcileMode::Redistribute => {
                self.redistribute(engine, image, tree, &candidates, &mut report)?
            },
        }

        log::info!(
            "Reconciled {} of {} regions in {:?}",
            report.recognized,
            report.candidates,
            start.elapsed()
        );
        Ok(report)
    }

    fn per_region<B: OcrBackend>(
        &self,
        engine: &mut OcrEngine<B>,
        image: &RgbaImage,
        tree: &mut RegionTree,
        candidates: &[RegionHandle],
        report: &mut ReconcileReport,
    ) -> Result<()> {
        let size = Size::new(image.width(), image.height());

        for &handle in candidates {
            let polygon = tree[handle].polygon().clone();
            let ocr_box = polygon_to_ocr_box(size, &polygon);
            if ocr_box.is_null() {
                log::debug!("Skipping region {} without usable geometry", tree[handle].id());
                report.skipped_empty += 1;
                continue;
            }

            let result = if is_axis_aligned_rect(&polygon) {
                let request = RecognitionRequest::full(ImageView::from_rgba(image))
                    .with_rectangle(ocr_box)
                    .with_page_seg_mode(self.page_seg_mode);
                recognize_text(engine, &request)
            } else {
                let Some(masked) = imaging::masked_crop(image, &polygon, self.mask_fill) else {
                    log::debug!("Skipping region {}: polygon cannot be masked", tree[handle].id());
                    report.skipped_empty += 1;
                    continue;
                };
                let request = RecognitionRequest::full(ImageView::from_rgba(&masked))
                    .with_page_seg_mode(self.page_seg_mode);
                recognize_text(engine, &request)
            };
            report.ocr_boxes.push(ocr_box);

            match result {
                Ok(text) if text.is_empty() => {
                    log::debug!("No text found in region {}", tree[handle].id());
                },
                Ok(text) => {
                    log::debug!("Recognized {} bytes for region {}", text.len(), tree[handle].id());
                    tree[handle].set_text(text);
                    report.recognized += 1;
                },
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    log::warn!("Recognition failed for region {}: {}", tree[handle].id(), e);
                    report.failed += 1;
                },
            }
        }
        Ok(())
    }

    fn redistribute<B: OcrBackend>(
        &self,
        engine: &mut OcrEngine<B>,
        image: &RgbaImage,
        tree: &mut RegionTree,
        candidates: &[RegionHandle],
        report: &mut ReconcileReport,
    ) -> Result<()> {
        let size = Size::new(image.width(), image.height());

        let mut boxes: Vec<(RegionHandle, Rect)> = Vec::with_capacity(candidates.len());
        for &handle in candidates {
            let ocr_box = polygon_to_ocr_box(size, tree[handle].polygon());
            if ocr_box.is_null() {
                log::debug!("Skipping region {} without usable geometry", tree[handle].id());
                report.skipped_empty += 1;
            } else {
                boxes.push((handle, ocr_box));
            }
        }
        report.ocr_boxes = boxes.iter().map(|(_, b)| *b).collect();

        let areas = merge_overlapping(&report.ocr_boxes);
        let mut touched = BTreeSet::new();

        for area in areas {
            let request = RecognitionRequest::full(ImageView::from_rgba(image))
                .with_rectangle(area)
                .with_page_seg_mode(self.page_seg_mode);

            let lines = match recognize_lines(engine, &request) {
                Ok(lines) => lines,
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    log::warn!("Recognition failed for area {:?}: {}", area, e);
                    report.failed += 1;
                    continue;
                },
            };

            for (line_box, text) in lines {
                if text.is_empty() {
                    continue;
                }
                match locate_line(&boxes, &area, &line_box) {
                    Some(handle) => {
                        tree[handle].append_text(&text);
                        touched.insert(handle);
                    },
                    None => {
                        log::warn!("Could not find text region for OCR results: {:?}", text);
                        report.unresolved_lines += 1;
                    },
                }
            }
        }

        report.recognized = touched.len();
        Ok(())
    }
}

/// The smallest candidate box containing `line_box`; the first one wins on
/// equal areas.
pub fn best_fit(boxes: &[(RegionHandle, Rect)], line_box: &Rect) -> Option<RegionHandle> {
    boxes
        .iter()
        .filter(|(_, b)| b.contains(line_box))
        .min_by(|(_, a), (_, b)| a.area().total_cmp(&b.area()))
        .map(|(h, _)| *h)
}

/// The candidate a line recognized inside `area` belongs to.
///
/// Lines reaching past the area are clipped to it first; a line with
/// nothing left after clipping belongs to no candidate.
fn locate_line(boxes: &[(RegionHandle, Rect)], area: &Rect, line_box: &Rect) -> Option<RegionHandle> {
    let line_box = if area.contains(line_box) {
        *line_box
    } else {
        line_box.intersection(area)
    };
    if line_box.is_null() {
        return None;
    }
    best_fit(boxes, &line_box)
}

fn recognize_text<B: OcrBackend>(engine: &mut OcrEngine<B>, request: &RecognitionRequest<'_>) -> Result<String> {
    engine.recognize_request(request)?.text()
}

fn recognize_lines<B: OcrBackend>(
    engine: &mut OcrEngine<B>,
    request: &RecognitionRequest<'_>,
) -> Result<Vec<(Rect, String)>> {
    let mut recognition = engine.recognize_request(request)?;
    let lines = collect_lines(&mut *recognition.cursor()?);
    Ok(lines)
}

/// Walk the cursor line by line, collecting the box and text of each line
/// inside a text block.
fn collect_lines<C: ResultCursor + ?Sized>(cursor: &mut C) -> Vec<(Rect, String)> {
    let mut lines = Vec::new();
    while !cursor.is_empty(PageLevel::Block) {
        if cursor.block_kind().is_text() && !cursor.is_empty(PageLevel::Line) {
            if let (Some(bbox), Some(text)) = (cursor.bounding_box(PageLevel::Line), cursor.text(PageLevel::Line)) {
                lines.push((bbox, text));
            }
        }
        if !cursor.advance(PageLevel::Line) {
            break;
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Point, Polygon};
    use crate::ocr::{MemoryBackend, MemoryBlock, MemoryLine, MemoryPage, MemoryParagraph, MemoryWord};
    use crate::region::Region;

    fn handles(n: usize) -> Vec<RegionHandle> {
        let mut tree = RegionTree::new();
        let root = tree.root();
        (0..n).map(|_| tree.add_child(root, Region::new(RegionKind::TextLine))).collect()
    }

    #[test]
    fn test_best_fit_prefers_smallest_container() {
        let h = handles(2);
        let boxes = [
            (h[0], Rect::new(0.0, 0.0, 10.0, 10.0)),
            (h[1], Rect::new(0.0, 0.0, 10.0, 5.0)),
        ];
        assert_eq!(best_fit(&boxes, &Rect::new(1.0, 1.0, 2.0, 2.0)), Some(h[1]));
        // Only the larger box contains this one
        assert_eq!(best_fit(&boxes, &Rect::new(1.0, 6.0, 2.0, 2.0)), Some(h[0]));
        assert_eq!(best_fit(&boxes, &Rect::new(20.0, 20.0, 2.0, 2.0)), None);
    }

    #[test]
    fn test_best_fit_tie_goes_to_first() {
        let h = handles(2);
        let boxes = [
            (h[0], Rect::new(0.0, 0.0, 10.0, 10.0)),
            (h[1], Rect::new(0.0, 0.0, 10.0, 10.0)),
        ];
        assert_eq!(best_fit(&boxes, &Rect::new(1.0, 1.0, 2.0, 2.0)), Some(h[0]));
    }

    #[test]
    fn test_select_candidates_blocks_then_lines() {
        let mut tree = RegionTree::new();
        let root = tree.root();
        let shape = Rect::new(0.0, 0.0, 10.0, 10.0);
        let line = tree.add_child(root, Region::new(RegionKind::TextLine).with_polygon(shape));
        let block = tree.add_child(root, Region::new(RegionKind::TextBlock).with_polygon(shape));
        tree.add_child(root, Region::new(RegionKind::TextBlock).with_polygon(shape).with_text("done"));
        tree.add_child(root, Region::new(RegionKind::TextLine));
        tree.add_child(root, Region::new(RegionKind::Word).with_polygon(shape));

        assert_eq!(select_candidates(&tree), vec![block, line]);
    }

    #[test]
    fn test_collect_lines_skips_non_text_blocks() {
        let page = MemoryPage::new()
            .with_block(MemoryBlock::text(vec![MemoryParagraph::new(vec![
                MemoryLine::from_text("first", Rect::new(0.0, 0.0, 50.0, 10.0)),
                MemoryLine::from_text("second", Rect::new(0.0, 20.0, 50.0, 10.0)),
            ])]))
            .with_block(MemoryBlock::non_text(Rect::new(0.0, 40.0, 50.0, 50.0)))
            .with_block(MemoryBlock::text(vec![MemoryParagraph::new(vec![
                MemoryLine::from_text("third", Rect::new(0.0, 100.0, 50.0, 10.0)),
            ])]));

        let lines = collect_lines(&mut page.cursor());
        let texts: Vec<&str> = lines.iter().map(|(_, t)| t.as_str()).collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
        assert_eq!(lines[1].0, Rect::new(0.0, 20.0, 50.0, 10.0));
    }

    #[test]
    fn test_collect_lines_ignores_lines_in_non_text_blocks() {
        let page = MemoryPage::new()
            .with_block(MemoryBlock::non_text(Rect::new(0.0, 0.0, 80.0, 30.0)).with_paragraphs(vec![
                MemoryParagraph::new(vec![MemoryLine::from_text("caption", Rect::new(10.0, 10.0, 50.0, 10.0))]),
            ]))
            .with_block(MemoryBlock::text(vec![MemoryParagraph::new(vec![MemoryLine::from_text(
                "body",
                Rect::new(10.0, 50.0, 50.0, 10.0),
            )])]));

        let lines = collect_lines(&mut page.cursor());
        let texts: Vec<&str> = lines.iter().map(|(_, t)| t.as_str()).collect();
        assert_eq!(texts, vec!["body"]);
    }

    #[test]
    fn test_locate_line_rejects_lines_outside_area() {
        let h = handles(2);
        let boxes = [
            (h[0], Rect::new(0.0, 0.0, 50.0, 50.0)),
            (h[1], Rect::new(100.0, 100.0, 50.0, 50.0)),
        ];
        let area = Rect::new(100.0, 100.0, 50.0, 50.0);

        // Nothing left after clipping, even though the origin box would contain an empty rect
        assert_eq!(locate_line(&boxes, &area, &Rect::new(300.0, 300.0, 10.0, 10.0)), None);
        // Overhanging lines are clipped to the area first
        assert_eq!(locate_line(&boxes, &area, &Rect::new(90.0, 110.0, 20.0, 10.0)), Some(h[1]));
    }

    fn redistribute_single_block(page: MemoryPage) -> (RegionTree, RegionHandle, ReconcileReport) {
        let dir = tempfile::tempdir().unwrap();
        let mut tree = RegionTree::new();
        let root = tree.root();
        let region = tree.add_child(
            root,
            Region::new(RegionKind::TextBlock).with_polygon(Rect::new(0.0, 0.0, 100.0, 100.0)),
        );
        let image = RgbaImage::new(200, 200);

        let mut engine = OcrEngine::start(MemoryBackend::new(page), dir.path(), "eng").unwrap();
        let report = RegionReconciler::new(ReconcileMode::Redistribute)
            .reconcile(&mut engine, &image, &mut tree)
            .unwrap();
        (tree, region, report)
    }

    #[test]
    fn test_redistribute_skips_lines_of_non_text_blocks() {
        let page = MemoryPage::new()
            .with_block(MemoryBlock::text(vec![MemoryParagraph::new(vec![MemoryLine::from_text(
                "body",
                Rect::new(20.0, 60.0, 50.0, 10.0),
            )])]))
            .with_block(MemoryBlock::non_text(Rect::new(10.0, 10.0, 80.0, 30.0)).with_paragraphs(vec![
                MemoryParagraph::new(vec![MemoryLine::from_text("caption", Rect::new(20.0, 20.0, 50.0, 10.0))]),
            ]));

        let (tree, region, report) = redistribute_single_block(page);

        assert_eq!(tree[region].text(), "body");
        assert_eq!(report.recognized, 1);
        assert_eq!(report.unresolved_lines, 0);
    }

    #[test]
    fn test_redistribute_ignores_empty_lines() {
        let page = MemoryPage::new().with_block(MemoryBlock::text(vec![MemoryParagraph::new(vec![
            MemoryLine::new(vec![MemoryWord::new("", Rect::new(20.0, 20.0, 30.0, 10.0))]),
        ])]));

        let (tree, region, report) = redistribute_single_block(page);

        assert!(!tree[region].has_text());
        assert_eq!(report.recognized, 0);
        assert_eq!(report.unresolved_lines, 0);
    }

    #[test]
    fn test_masked_region_is_recognized_from_crop() {
        let dir = tempfile::tempdir().unwrap();
        let triangle = Polygon::new(vec![
            Point::new(10.0, 10.0),
            Point::new(60.0, 10.0),
            Point::new(10.0, 60.0),
        ]);
        // The masked crop spans the polygon's bounds: 50x50 at the origin
        let mut backend =
            MemoryBackend::new(MemoryPage::new()).with_text_for(Rect::new(0.0, 0.0, 50.0, 50.0), "masked");

        let mut tree = RegionTree::new();
        let root = tree.root();
        let region = tree.add_child(root, Region::new(RegionKind::TextBlock).with_polygon(triangle));
        let image = RgbaImage::new(100, 100);

        let report = {
            let mut engine = OcrEngine::start(&mut backend, dir.path(), "eng").unwrap();
            RegionReconciler::default().reconcile(&mut engine, &image, &mut tree).unwrap()
        };

        assert_eq!(tree[region].text(), "masked");
        assert_eq!(report.recognized, 1);
        assert_eq!(report.ocr_boxes, vec![Rect::from_points(0.0, 0.0, 70.0, 70.0)]);
        assert!(!backend
            .calls()
            .iter()
            .any(|c| matches!(c, crate::ocr::memory::BackendCall::SetRectangle(_))));
    }
}
