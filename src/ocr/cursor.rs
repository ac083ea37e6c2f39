//! Hierarchical result cursor produced by an OCR pass.
//!
//! An OCR engine reports its results as a single forward-only scan over
//! strictly nested levels: block ⊇ paragraph ⊇ line ⊇ word ⊇ symbol. The
//! cursor is stateful; every query answers for the element the cursor
//! currently sits on, and advancing at a level moves to the first element of
//! the next span at that level.

use crate::geometry::Rect;
use serde::{Deserialize, Serialize};

/// Granularity level of the result hierarchy, coarsest first.
///
/// Ordering follows nesting: `Block < Paragraph < Line < Word < Symbol`, so
/// `a <= b` reads "a is coarser than or equal to b".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageLevel {
    /// Text block
    Block,
    /// Paragraph
    Paragraph,
    /// Text line
    Line,
    /// Word
    Word,
    /// Single symbol
    Symbol,
}

impl PageLevel {
    /// All levels, coarsest first.
    pub const ALL: [PageLevel; 5] = [
        PageLevel::Block,
        PageLevel::Paragraph,
        PageLevel::Line,
        PageLevel::Word,
        PageLevel::Symbol,
    ];

    /// Level used when a requested granularity is out of range.
    pub const DEFAULT_OUTPUT: PageLevel = PageLevel::Paragraph;

    /// Map an output granularity index to a level.
    ///
    /// Only `0..=3` (block, paragraph, line, word) are valid output
    /// granularities; anything else yields `None`.
    pub fn from_output_index(index: i32) -> Option<PageLevel> {
        match index {
            0 => Some(PageLevel::Block),
            1 => Some(PageLevel::Paragraph),
            2 => Some(PageLevel::Line),
            3 => Some(PageLevel::Word),
            _ => None,
        }
    }

    /// Depth of this level below the page (block is 0).
    pub fn index(self) -> usize {
        self as usize
    }

    /// The next finer level, if any.
    pub fn finer(self) -> Option<PageLevel> {
        PageLevel::ALL.get(self.index() + 1).copied()
    }

    /// The enclosing coarser level, if any.
    pub fn coarser(self) -> Option<PageLevel> {
        self.index().checked_sub(1).map(|i| PageLevel::ALL[i])
    }

    /// Whether this is the outermost level.
    pub fn is_coarsest(self) -> bool {
        self == PageLevel::Block
    }
}

impl std::fmt::Display for PageLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PageLevel::Block => "block",
            PageLevel::Paragraph => "paragraph",
            PageLevel::Line => "line",
            PageLevel::Word => "word",
            PageLevel::Symbol => "symbol",
        };
        f.write_str(name)
    }
}

/// Classification of the block the cursor currently sits in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    /// Flowing text, headings, captions, tables and other text content
    Text,
    /// Images, rules, noise and anything else without text
    NonText,
}

impl BlockKind {
    /// Whether the block carries recognizable text.
    pub fn is_text(self) -> bool {
        self == BlockKind::Text
    }
}

/// Forward-only, multi-level iterator over OCR results.
///
/// Implementations wrap an engine's native iterator. Levels are strictly
/// nested, and advancing at a coarse level skips all remaining finer
/// elements of the current span.
pub trait ResultCursor {
    /// Whether there is no element at `level` under the cursor.
    ///
    /// True at the end of the page, and at every level finer than block
    /// while the cursor sits in a non-text block.
    fn is_empty(&self, level: PageLevel) -> bool;

    /// Whether the cursor is on the first element of a span at `level`.
    fn is_at_beginning_of(&self, level: PageLevel) -> bool;

    /// Whether the current `element` is the last one inside the enclosing
    /// span at `level`.
    fn is_at_final_element(&self, level: PageLevel, element: PageLevel) -> bool;

    /// Move to the start of the next span at `level`.
    ///
    /// Returns `false` once the end of the page is reached.
    fn advance(&mut self, level: PageLevel) -> bool;

    /// Bounding box of the current element at `level`.
    fn bounding_box(&self, level: PageLevel) -> Option<Rect>;

    /// Recognized text of the current element at `level`.
    fn text(&self, level: PageLevel) -> Option<String>;

    /// Classification of the current block.
    fn block_kind(&self) -> BlockKind;
}

impl<C: ResultCursor + ?Sized> ResultCursor for &mut C {
    fn is_empty(&self, level: PageLevel) -> bool {
        (**self).is_empty(level)
    }

    fn is_at_beginning_of(&self, level: PageLevel) -> bool {
        (**self).is_at_beginning_of(level)
    }

    fn is_at_final_element(&self, level: PageLevel, element: PageLevel) -> bool {
        (**self).is_at_final_element(level, element)
    }

    fn advance(&mut self, level: PageLevel) -> bool {
        (**self).advance(level)
    }

    fn bounding_box(&self, level: PageLevel) -> Option<Rect> {
        (**self).bounding_box(level)
    }

    fn text(&self, level: PageLevel) -> Option<String> {
        (**self).text(level)
    }

    fn block_kind(&self) -> BlockKind {
        (**self).block_kind()
    }
}

impl<C: ResultCursor + ?Sized> ResultCursor for Box<C> {
    fn is_empty(&self, level: PageLevel) -> bool {
        (**self).is_empty(level)
    }

    fn is_at_beginning_of(&self, level: PageLevel) -> bool {
        (**self).is_at_beginning_of(level)
    }

    fn is_at_final_element(&self, level: PageLevel, element: PageLevel) -> bool {
        (**self).is_at_final_element(level, element)
    }

    fn advance(&mut self, level: PageLevel) -> bool {
        (**self).advance(level)
    }

    fn bounding_box(&self, level: PageLevel) -> Option<Rect> {
        (**self).bounding_box(level)
    }

    fn text(&self, level: PageLevel) -> Option<String> {
        (**self).text(level)
    }

    fn block_kind(&self) -> BlockKind {
        (**self).block_kind()
    }
}
