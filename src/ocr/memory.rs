//! In-memory OCR engine.
//!
//! [`MemoryPage`] describes the result of a recognition pass as plain data,
//! and [`MemoryCursor`] walks it with the same iterator semantics as
//! Tesseract's result iterator. [`MemoryBackend`] plugs a page into
//! [`OcrEngine`](super::OcrEngine) so the tree builder and the reconciler can
//! run without a native engine, and records every call it receives.

use std::collections::HashMap;
use std::path::Path;

use super::cursor::{BlockKind, PageLevel, ResultCursor};
use super::engine::{ImageView, OcrBackend, PageSegMode};
use crate::error::{Error, Result};
use crate::geometry::Rect;

/// A recognized word.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryWord {
    /// Word text
    pub text: String,
    /// Word bounds in image coordinates
    pub bbox: Rect,
}

impl MemoryWord {
    /// Create a word.
    pub fn new(text: impl Into<String>, bbox: Rect) -> Self {
        Self {
            text: text.into(),
            bbox,
        }
    }
}

/// A recognized text line.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MemoryLine {
    /// Words in reading order
    pub words: Vec<MemoryWord>,
}

impl MemoryLine {
    /// Create a line from explicit words.
    pub fn new(words: Vec<MemoryWord>) -> Self {
        Self { words }
    }

    /// Split `text` on whitespace and spread the words evenly across `bbox`.
    pub fn from_text(text: &str, bbox: Rect) -> Self {
        let parts: Vec<&str> = text.split_whitespace().collect();
        if parts.is_empty() {
            return Self::default();
        }

        let step = bbox.width / parts.len() as f32;
        let words = parts
            .iter()
            .enumerate()
            .map(|(i, part)| {
                MemoryWord::new(*part, Rect::new(bbox.x + step * i as f32, bbox.y, step, bbox.height))
            })
            .collect();
        Self { words }
    }

    fn text(&self) -> String {
        self.words
            .iter()
            .map(|w| w.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn bbox(&self) -> Rect {
        union_all(self.words.iter().map(|w| w.bbox))
    }
}

/// A recognized paragraph.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MemoryParagraph {
    /// Lines in reading order
    pub lines: Vec<MemoryLine>,
}

impl MemoryParagraph {
    /// Create a paragraph.
    pub fn new(lines: Vec<MemoryLine>) -> Self {
        Self { lines }
    }

    fn text(&self) -> String {
        self.lines
            .iter()
            .map(MemoryLine::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn bbox(&self) -> Rect {
        union_all(self.lines.iter().map(MemoryLine::bbox))
    }
}

/// A recognized block: text with paragraphs, or a non-text area.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryBlock {
    /// Block classification
    pub kind: BlockKind,
    /// Paragraphs of the block; engines occasionally report lines inside
    /// non-text blocks too
    pub paragraphs: Vec<MemoryParagraph>,
    /// Explicit bounds, required for non-text blocks
    pub bbox: Option<Rect>,
}

impl MemoryBlock {
    /// A text block.
    pub fn text(paragraphs: Vec<MemoryParagraph>) -> Self {
        Self {
            kind: BlockKind::Text,
            paragraphs,
            bbox: None,
        }
    }

    /// A non-text block (image, rule, noise) covering `bbox`.
    pub fn non_text(bbox: Rect) -> Self {
        Self {
            kind: BlockKind::NonText,
            paragraphs: Vec::new(),
            bbox: Some(bbox),
        }
    }

    /// Attach paragraphs to the block, whatever its kind.
    pub fn with_paragraphs(mut self, paragraphs: Vec<MemoryParagraph>) -> Self {
        self.paragraphs = paragraphs;
        self
    }

    fn content_text(&self) -> String {
        self.paragraphs
            .iter()
            .map(MemoryParagraph::text)
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    fn bounds(&self) -> Rect {
        match self.bbox {
            Some(b) => b,
            None => union_all(self.paragraphs.iter().map(MemoryParagraph::bbox)),
        }
    }
}

/// Complete result of one recognition pass.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MemoryPage {
    /// Blocks in reading order
    pub blocks: Vec<MemoryBlock>,
}

impl MemoryPage {
    /// An empty page.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a block.
    pub fn with_block(mut self, block: MemoryBlock) -> Self {
        self.blocks.push(block);
        self
    }

    /// Cursor positioned on the first element of the page.
    pub fn cursor(&self) -> MemoryCursor<'_> {
        MemoryCursor::new(self)
    }

    /// Flat text of the page: blocks separated by blank lines.
    pub fn text(&self) -> String {
        self.blocks
            .iter()
            .filter(|b| b.kind.is_text())
            .map(MemoryBlock::content_text)
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// The part of the page an engine would see inside `rect`.
    ///
    /// Words are kept when their centre lies inside `rect`; empty lines,
    /// paragraphs and blocks are dropped. Non-text blocks are kept when they
    /// intersect `rect`.
    pub fn restricted_to(&self, rect: &Rect) -> MemoryPage {
        let mut blocks = Vec::new();
        for block in &self.blocks {
            if !block.kind.is_text() {
                if block.bounds().intersects(rect) {
                    blocks.push(block.clone());
                }
                continue;
            }

            let paragraphs: Vec<MemoryParagraph> = block
                .paragraphs
                .iter()
                .map(|p| MemoryParagraph {
                    lines: p
                        .lines
                        .iter()
                        .map(|l| MemoryLine {
                            words: l
                                .words
                                .iter()
                                .filter(|w| rect.contains_point(&w.bbox.center()))
                                .cloned()
                                .collect(),
                        })
                        .filter(|l| !l.words.is_empty())
                        .collect(),
                })
                .filter(|p| !p.lines.is_empty())
                .collect();

            if !paragraphs.is_empty() {
                blocks.push(MemoryBlock::text(paragraphs));
            }
        }
        MemoryPage { blocks }
    }
}

fn union_all(rects: impl Iterator<Item = Rect>) -> Rect {
    rects
        .filter(|r| !r.is_null())
        .reduce(|a, b| a.union(&b))
        .unwrap_or_else(Rect::null)
}

/// Flattened cursor position. Blocks without content occupy a single slot
/// with no paragraph index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Slot {
    block: usize,
    paragraph: Option<usize>,
    line: usize,
    word: usize,
}

impl Slot {
    fn key(&self, level: PageLevel) -> (usize, Option<usize>, usize, usize) {
        match level {
            PageLevel::Block => (self.block, None, 0, 0),
            PageLevel::Paragraph => (self.block, self.paragraph, 0, 0),
            PageLevel::Line => (self.block, self.paragraph, self.line, 0),
            PageLevel::Word | PageLevel::Symbol => (self.block, self.paragraph, self.line, self.word),
        }
    }
}

/// [`ResultCursor`] over a [`MemoryPage`].
///
/// Symbol-level queries resolve at word granularity.
#[derive(Debug, Clone)]
pub struct MemoryCursor<'a> {
    page: &'a MemoryPage,
    slots: Vec<Slot>,
    pos: usize,
}

impl<'a> MemoryCursor<'a> {
    /// Cursor on the first element of `page`.
    pub fn new(page: &'a MemoryPage) -> Self {
        let mut slots = Vec::new();
        for (b, block) in page.blocks.iter().enumerate() {
            let before = slots.len();
            for (p, para) in block.paragraphs.iter().enumerate() {
                for (l, line) in para.lines.iter().enumerate() {
                    for w in 0..line.words.len() {
                        slots.push(Slot {
                            block: b,
                            paragraph: Some(p),
                            line: l,
                            word: w,
                        });
                    }
                }
            }
            if slots.len() == before {
                slots.push(Slot {
                    block: b,
                    paragraph: None,
                    line: 0,
                    word: 0,
                });
            }
        }
        Self { page, slots, pos: 0 }
    }

    fn empty_at(&self, pos: usize, level: PageLevel) -> bool {
        match self.slots.get(pos) {
            None => true,
            Some(slot) => level != PageLevel::Block && slot.paragraph.is_none(),
        }
    }

    fn beginning_at(&self, pos: usize, level: PageLevel) -> bool {
        if self.empty_at(pos, level) {
            return false;
        }
        pos == 0 || self.slots[pos - 1].key(level) != self.slots[pos].key(level)
    }

    fn next_pos(&self, pos: usize, level: PageLevel) -> usize {
        let Some(current) = self.slots.get(pos) else {
            return pos;
        };
        let key = current.key(level);
        let mut next = pos + 1;
        while next < self.slots.len() && self.slots[next].key(level) == key {
            next += 1;
        }
        next
    }

    fn current(&self) -> Option<&Slot> {
        self.slots.get(self.pos)
    }
}

impl ResultCursor for MemoryCursor<'_> {
    fn is_empty(&self, level: PageLevel) -> bool {
        self.empty_at(self.pos, level)
    }

    fn is_at_beginning_of(&self, level: PageLevel) -> bool {
        self.beginning_at(self.pos, level)
    }

    fn is_at_final_element(&self, level: PageLevel, element: PageLevel) -> bool {
        if self.is_empty(element) {
            return true;
        }
        let next = self.next_pos(self.pos, element);
        if self.empty_at(next, element) {
            return true;
        }
        // The next element starts a new span at `level` or any level between
        PageLevel::ALL
            .iter()
            .filter(|l| **l >= level && **l < element)
            .all(|l| self.beginning_at(next, *l))
    }

    fn advance(&mut self, level: PageLevel) -> bool {
        self.pos = self.next_pos(self.pos, level);
        self.pos < self.slots.len()
    }

    fn bounding_box(&self, level: PageLevel) -> Option<Rect> {
        if self.is_empty(level) {
            return None;
        }
        let slot = self.current()?;
        let block = &self.page.blocks[slot.block];
        if level == PageLevel::Block {
            return Some(block.bounds());
        }
        let para = &block.paragraphs[slot.paragraph?];
        let line = &para.lines[slot.line];
        Some(match level {
            PageLevel::Block => block.bounds(),
            PageLevel::Paragraph => para.bbox(),
            PageLevel::Line => line.bbox(),
            PageLevel::Word | PageLevel::Symbol => line.words[slot.word].bbox,
        })
    }

    fn text(&self, level: PageLevel) -> Option<String> {
        if self.is_empty(level) {
            return None;
        }
        let slot = self.current()?;
        let block = &self.page.blocks[slot.block];
        if slot.paragraph.is_none() && !block.kind.is_text() {
            return None;
        }
        if level == PageLevel::Block {
            return Some(block.content_text());
        }
        let para = &block.paragraphs[slot.paragraph?];
        let line = &para.lines[slot.line];
        Some(match level {
            PageLevel::Block => block.content_text(),
            PageLevel::Paragraph => para.text(),
            PageLevel::Line => line.text(),
            PageLevel::Word | PageLevel::Symbol => line.words[slot.word].text.clone(),
        })
    }

    fn block_kind(&self) -> BlockKind {
        match self.current() {
            Some(slot) => self.page.blocks[slot.block].kind,
            None => BlockKind::NonText,
        }
    }
}

/// A call received by [`MemoryBackend`].
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    /// `init(model_dir, language)`
    Init {
        /// Requested language
        language: String,
    },
    /// `set_image`
    SetImage {
        /// Image width
        width: u32,
        /// Image height
        height: u32,
    },
    /// `set_rectangle`
    SetRectangle(Rect),
    /// `set_page_seg_mode`
    SetPageSegMode(PageSegMode),
    /// `set_variable`
    SetVariable(String, String),
    /// `recognize`
    Recognize,
    /// `end`
    End,
}

#[derive(Debug)]
struct MemoryResult {
    page: MemoryPage,
    text: String,
}

/// [`OcrBackend`] that answers from a [`MemoryPage`].
///
/// Recognition restricts the page to the bound rectangle (or the whole
/// bound image) and reports the words found there. Flat text can be
/// scripted per recognition area with [`with_text_for`](Self::with_text_for).
#[derive(Debug)]
pub struct MemoryBackend {
    page: MemoryPage,
    scripted: Vec<(Rect, String)>,
    init_failure: Option<String>,
    variable_failures: Vec<String>,
    failing_passes: Vec<usize>,
    image: Option<(u32, u32)>,
    rectangle: Option<Rect>,
    variables: HashMap<String, String>,
    calls: Vec<BackendCall>,
    passes: usize,
    result: Option<MemoryResult>,
}

impl MemoryBackend {
    /// Backend whose recognition passes report `page`.
    pub fn new(page: MemoryPage) -> Self {
        Self {
            page,
            scripted: Vec::new(),
            init_failure: None,
            variable_failures: Vec::new(),
            failing_passes: Vec::new(),
            image: None,
            rectangle: None,
            variables: HashMap::new(),
            calls: Vec::new(),
            passes: 0,
            result: None,
        }
    }

    /// Report `text` as the flat text of any pass over exactly `area`.
    ///
    /// `area` is the bound rectangle, or `(0, 0, width, height)` of the bound
    /// image when no rectangle is set.
    pub fn with_text_for(mut self, area: Rect, text: impl Into<String>) -> Self {
        self.scripted.push((area, text.into()));
        self
    }

    /// Make `init` fail with `reason`.
    pub fn with_init_failure(mut self, reason: impl Into<String>) -> Self {
        self.init_failure = Some(reason.into());
        self
    }

    /// Make `set_variable` fail for `name`.
    pub fn with_variable_failure(mut self, name: impl Into<String>) -> Self {
        self.variable_failures.push(name.into());
        self
    }

    /// Make the recognition pass with the given zero-based index fail.
    pub fn with_failing_pass(mut self, index: usize) -> Self {
        self.failing_passes.push(index);
        self
    }

    /// Every call received so far, in order.
    pub fn calls(&self) -> &[BackendCall] {
        &self.calls
    }

    /// Value of a variable set through `set_variable`.
    pub fn variable(&self, name: &str) -> Option<&str> {
        self.variables.get(name).map(String::as_str)
    }

    /// Number of recognition passes attempted.
    pub fn passes(&self) -> usize {
        self.passes
    }

    /// Number of times the session was released.
    pub fn end_count(&self) -> usize {
        self.calls.iter().filter(|c| **c == BackendCall::End).count()
    }

    fn area(&self) -> Option<Rect> {
        let (width, height) = self.image?;
        Some(
            self.rectangle
                .unwrap_or_else(|| Rect::new(0.0, 0.0, width as f32, height as f32)),
        )
    }

    fn result(&self) -> Result<&MemoryResult> {
        self.result
            .as_ref()
            .ok_or_else(|| Error::Backend("no recognition results".to_string()))
    }
}

impl OcrBackend for MemoryBackend {
    fn name(&self) -> &str {
        "memory"
    }

    fn version(&self) -> String {
        env!("CARGO_PKG_VERSION").to_string()
    }

    fn init(&mut self, _model_dir: &Path, language: &str) -> Result<()> {
        self.calls.push(BackendCall::Init {
            language: language.to_string(),
        });
        match &self.init_failure {
            Some(reason) => Err(Error::Backend(reason.clone())),
            None => Ok(()),
        }
    }

    fn set_image(&mut self, image: &ImageView<'_>) -> Result<()> {
        self.calls.push(BackendCall::SetImage {
            width: image.width,
            height: image.height,
        });
        self.image = Some((image.width, image.height));
        self.rectangle = None;
        self.result = None;
        Ok(())
    }

    fn set_rectangle(&mut self, rect: &Rect) -> Result<()> {
        self.calls.push(BackendCall::SetRectangle(*rect));
        self.rectangle = Some(*rect);
        Ok(())
    }

    fn set_page_seg_mode(&mut self, mode: PageSegMode) -> Result<()> {
        self.calls.push(BackendCall::SetPageSegMode(mode));
        Ok(())
    }

    fn set_variable(&mut self, name: &str, value: &str) -> Result<()> {
        self.calls
            .push(BackendCall::SetVariable(name.to_string(), value.to_string()));
        if self.variable_failures.iter().any(|v| v == name) {
            return Err(Error::Backend(format!("unknown variable {}", name)));
        }
        self.variables.insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn recognize(&mut self) -> Result<()> {
        self.calls.push(BackendCall::Recognize);
        let pass = self.passes;
        self.passes += 1;

        if self.failing_passes.contains(&pass) {
            return Err(Error::Recognition(format!("pass {} failed", pass)));
        }
        let area = self
            .area()
            .ok_or_else(|| Error::Recognition("no image bound".to_string()))?;

        let page = self.page.restricted_to(&area);
        let text = self
            .scripted
            .iter()
            .find(|(r, _)| *r == area)
            .map(|(_, t)| t.clone())
            .unwrap_or_else(|| page.text());
        self.result = Some(MemoryResult { page, text });
        Ok(())
    }

    fn iterator(&mut self) -> Result<Box<dyn ResultCursor + '_>> {
        let result = self.result()?;
        Ok(Box::new(MemoryCursor::new(&result.page)))
    }

    fn text(&mut self) -> Result<String> {
        Ok(self.result()?.text.clone())
    }

    fn end(&mut self) {
        self.calls.push(BackendCall::End);
        self.result = None;
        self.image = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(text: &str, y: f32) -> MemoryLine {
        MemoryLine::from_text(text, Rect::new(10.0, y, 100.0, 10.0))
    }

    /// Block 0: two paragraphs ("a b" / "c") and ("d"); block 1: picture;
    /// block 2: one paragraph ("e").
    fn sample() -> MemoryPage {
        MemoryPage::new()
            .with_block(MemoryBlock::text(vec![
                MemoryParagraph::new(vec![line("a b", 0.0), line("c", 20.0)]),
                MemoryParagraph::new(vec![line("d", 40.0)]),
            ]))
            .with_block(MemoryBlock::non_text(Rect::new(0.0, 100.0, 50.0, 50.0)))
            .with_block(MemoryBlock::text(vec![MemoryParagraph::new(vec![line("e", 200.0)])]))
    }

    #[test]
    fn test_from_text_spreads_words() {
        let l = MemoryLine::from_text("one two", Rect::new(0.0, 0.0, 100.0, 10.0));
        assert_eq!(l.words.len(), 2);
        assert_eq!(l.words[1].bbox, Rect::new(50.0, 0.0, 50.0, 10.0));
        assert_eq!(l.text(), "one two");
        assert!(MemoryLine::from_text("   ", Rect::new(0.0, 0.0, 1.0, 1.0)).words.is_empty());
    }

    #[test]
    fn test_cursor_texts_at_each_level() {
        let page = sample();
        let cursor = page.cursor();
        assert_eq!(cursor.text(PageLevel::Block).as_deref(), Some("a b\nc\n\nd"));
        assert_eq!(cursor.text(PageLevel::Paragraph).as_deref(), Some("a b\nc"));
        assert_eq!(cursor.text(PageLevel::Line).as_deref(), Some("a b"));
        assert_eq!(cursor.text(PageLevel::Word).as_deref(), Some("a"));
        assert_eq!(cursor.text(PageLevel::Symbol).as_deref(), Some("a"));
    }

    #[test]
    fn test_cursor_advance_and_beginnings() {
        let page = sample();
        let mut cursor = page.cursor();
        assert!(cursor.is_at_beginning_of(PageLevel::Block));

        assert!(cursor.advance(PageLevel::Word));
        assert_eq!(cursor.text(PageLevel::Word).as_deref(), Some("b"));
        assert!(!cursor.is_at_beginning_of(PageLevel::Line));
        assert!(cursor.is_at_beginning_of(PageLevel::Word));

        assert!(cursor.advance(PageLevel::Paragraph));
        assert_eq!(cursor.text(PageLevel::Paragraph).as_deref(), Some("d"));
        assert!(cursor.is_at_beginning_of(PageLevel::Paragraph));
        assert!(!cursor.is_at_beginning_of(PageLevel::Block));

        assert!(cursor.advance(PageLevel::Line));
        assert_eq!(cursor.block_kind(), BlockKind::NonText);
        assert!(!cursor.is_empty(PageLevel::Block));
        assert!(cursor.is_empty(PageLevel::Paragraph));
        assert_eq!(cursor.bounding_box(PageLevel::Block), Some(Rect::new(0.0, 100.0, 50.0, 50.0)));
        assert_eq!(cursor.text(PageLevel::Block), None);

        assert!(cursor.advance(PageLevel::Block));
        assert_eq!(cursor.text(PageLevel::Line).as_deref(), Some("e"));
        assert!(!cursor.advance(PageLevel::Block));
        assert!(cursor.is_empty(PageLevel::Block));
    }

    #[test]
    fn test_cursor_final_elements() {
        let page = sample();
        let mut cursor = page.cursor();

        // On "a": more words follow in the line
        assert!(!cursor.is_at_final_element(PageLevel::Line, PageLevel::Word));
        assert!(!cursor.is_at_final_element(PageLevel::Paragraph, PageLevel::Line));

        cursor.advance(PageLevel::Word);
        // On "b": last word of its line, but not of its paragraph
        assert!(cursor.is_at_final_element(PageLevel::Line, PageLevel::Word));
        assert!(!cursor.is_at_final_element(PageLevel::Paragraph, PageLevel::Word));

        cursor.advance(PageLevel::Line);
        // On "c": last line of the first paragraph, not of the block
        assert!(cursor.is_at_final_element(PageLevel::Paragraph, PageLevel::Line));
        assert!(!cursor.is_at_final_element(PageLevel::Block, PageLevel::Line));

        cursor.advance(PageLevel::Line);
        // On "d": last paragraph of the block
        assert!(cursor.is_at_final_element(PageLevel::Block, PageLevel::Paragraph));
    }

    #[test]
    fn test_cursor_bounding_boxes_nest() {
        let page = sample();
        let cursor = page.cursor();
        let block = cursor.bounding_box(PageLevel::Block).unwrap();
        let para = cursor.bounding_box(PageLevel::Paragraph).unwrap();
        let line = cursor.bounding_box(PageLevel::Line).unwrap();
        let word = cursor.bounding_box(PageLevel::Word).unwrap();
        assert!(block.contains(&para));
        assert!(para.contains(&line));
        assert!(line.contains(&word));
    }

    #[test]
    fn test_empty_page_cursor() {
        let page = MemoryPage::new();
        let mut cursor = page.cursor();
        assert!(cursor.is_empty(PageLevel::Block));
        assert!(!cursor.advance(PageLevel::Block));
        assert_eq!(cursor.bounding_box(PageLevel::Block), None);
        assert_eq!(cursor.block_kind(), BlockKind::NonText);
    }

    #[test]
    fn test_restricted_to_rectangle() {
        let page = sample();
        let restricted = page.restricted_to(&Rect::new(0.0, 15.0, 200.0, 40.0));
        assert_eq!(restricted.text(), "c\n\nd");
        assert_eq!(restricted.blocks.len(), 1);
    }

    #[test]
    fn test_backend_scripted_text_by_area() {
        let area = Rect::new(0.0, 0.0, 40.0, 20.0);
        let mut backend = MemoryBackend::new(sample()).with_text_for(area, "scripted");
        let img = image::RgbaImage::new(40, 20);
        backend.set_image(&ImageView::from_rgba(&img)).unwrap();
        backend.recognize().unwrap();
        assert_eq!(backend.text().unwrap(), "scripted");

        let big = image::RgbaImage::new(300, 300);
        backend.set_image(&ImageView::from_rgba(&big)).unwrap();
        backend.recognize().unwrap();
        assert_eq!(backend.text().unwrap(), "a b\nc\n\nd\n\ne");
    }

    #[test]
    fn test_backend_failing_pass() {
        let mut backend = MemoryBackend::new(sample()).with_failing_pass(0);
        let img = image::RgbaImage::new(10, 10);
        backend.set_image(&ImageView::from_rgba(&img)).unwrap();
        assert!(matches!(backend.recognize(), Err(Error::Recognition(_))));
        assert!(backend.text().is_err());

        backend.set_image(&ImageView::from_rgba(&img)).unwrap();
        assert!(backend.recognize().is_ok());
        assert_eq!(backend.passes(), 2);
    }

    #[test]
    fn test_set_image_clears_rectangle() {
        let mut backend = MemoryBackend::new(sample());
        let img = image::RgbaImage::new(300, 300);
        backend.set_image(&ImageView::from_rgba(&img)).unwrap();
        backend.set_rectangle(&Rect::new(0.0, 195.0, 300.0, 20.0)).unwrap();
        backend.recognize().unwrap();
        assert_eq!(backend.text().unwrap(), "e");

        backend.set_image(&ImageView::from_rgba(&img)).unwrap();
        backend.recognize().unwrap();
        assert_eq!(backend.text().unwrap(), "a b\nc\n\nd\n\ne");
    }
}
