//! Region node types.

use serde::{Deserialize, Serialize};

use crate::geometry::{Polygon, Rect};
use crate::ocr::PageLevel;

/// Kind tag of a layout region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionKind {
    /// Page root
    Root,
    /// Text block
    TextBlock,
    /// Paragraph
    Paragraph,
    /// Text line
    TextLine,
    /// Word
    Word,
    /// Anything else (images, separators, tables)
    Other,
}

impl RegionKind {
    /// Region kind produced for a cursor level.
    ///
    /// Symbols have no region kind of their own and map to words.
    pub fn from_level(level: PageLevel) -> Self {
        match level {
            PageLevel::Block => RegionKind::TextBlock,
            PageLevel::Paragraph => RegionKind::Paragraph,
            PageLevel::Line => RegionKind::TextLine,
            PageLevel::Word | PageLevel::Symbol => RegionKind::Word,
        }
    }

    /// Whether regions of this kind can carry recognized text.
    pub fn carries_text(self) -> bool {
        matches!(
            self,
            RegionKind::TextBlock | RegionKind::Paragraph | RegionKind::TextLine | RegionKind::Word
        )
    }

    /// Lowercase name used in exports.
    pub fn name(self) -> &'static str {
        match self {
            RegionKind::Root => "root",
            RegionKind::TextBlock => "text_block",
            RegionKind::Paragraph => "paragraph",
            RegionKind::TextLine => "text_line",
            RegionKind::Word => "word",
            RegionKind::Other => "other",
        }
    }
}

impl std::fmt::Display for RegionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Stable address of a region inside a [`RegionTree`](super::RegionTree).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RegionHandle(pub(crate) usize);

impl RegionHandle {
    /// Arena index of the region.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Generate a fresh region identifier.
///
/// UUID v4 in hyphenated form; never contains braces.
pub fn new_region_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn sanitize_id(id: &str) -> String {
    id.chars().filter(|c| *c != '{' && *c != '}').collect()
}

/// A node of the layout tree: identifier, kind, polygon and text.
///
/// An empty text means "not yet recognized".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    id: String,
    kind: RegionKind,
    polygon: Polygon,
    text: String,
}

impl Region {
    /// Create a region with a generated identifier.
    pub fn new(kind: RegionKind) -> Self {
        Self {
            id: new_region_id(),
            kind,
            polygon: Polygon::default(),
            text: String::new(),
        }
    }

    /// Create a region with an explicit identifier. Braces are stripped.
    pub fn with_id(id: &str, kind: RegionKind) -> Self {
        Self {
            id: sanitize_id(id),
            ..Self::new(kind)
        }
    }

    /// Set the polygon.
    pub fn with_polygon(mut self, polygon: impl Into<Polygon>) -> Self {
        self.polygon = polygon.into();
        self
    }

    /// Set the text.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Kind tag.
    pub fn kind(&self) -> RegionKind {
        self.kind
    }

    /// Bounding polygon.
    pub fn polygon(&self) -> &Polygon {
        &self.polygon
    }

    /// Replace the bounding polygon.
    pub fn set_polygon(&mut self, polygon: impl Into<Polygon>) {
        self.polygon = polygon.into();
    }

    /// Tight bounds of the polygon.
    pub fn bounds(&self) -> Rect {
        self.polygon.bounding_rect()
    }

    /// Recognized text (empty if not recognized yet).
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether text has been recognized for this region.
    pub fn has_text(&self) -> bool {
        !self.text.is_empty()
    }

    /// Replace the text.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Append text verbatim.
    pub fn append_text(&mut self, text: &str) {
        self.text.push_str(text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_unique_and_braceless() {
        let a = Region::new(RegionKind::TextLine);
        let b = Region::new(RegionKind::TextLine);
        assert_ne!(a.id(), b.id());
        assert!(!a.id().contains('{') && !a.id().contains('}'));
    }

    #[test]
    fn test_explicit_id_is_sanitized() {
        let r = Region::with_id("{r-12}", RegionKind::TextBlock);
        assert_eq!(r.id(), "r-12");
        assert_eq!(r.kind(), RegionKind::TextBlock);
    }

    #[test]
    fn test_text_accessors() {
        let mut r = Region::new(RegionKind::TextBlock);
        assert!(!r.has_text());
        r.append_text("Hello");
        r.append_text(" World");
        assert_eq!(r.text(), "Hello World");
        r.set_text("");
        assert!(!r.has_text());
    }

    #[test]
    fn test_kind_from_level() {
        assert_eq!(RegionKind::from_level(PageLevel::Block), RegionKind::TextBlock);
        assert_eq!(RegionKind::from_level(PageLevel::Line), RegionKind::TextLine);
        assert_eq!(RegionKind::from_level(PageLevel::Symbol), RegionKind::Word);
        assert!(!RegionKind::Root.carries_text());
        assert!(!RegionKind::Other.carries_text());
        assert!(RegionKind::Word.carries_text());
    }
}
