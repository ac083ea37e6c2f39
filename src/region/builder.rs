//! Region tree construction from an OCR result cursor.
//!
//! The builder walks the cursor level by level in lock-step with its
//! nesting. Each level either opens a new region at the start of a span and
//! descends one level, or stops once the enclosing span is exhausted so the
//! caller can advance at its own level.

use super::tree::RegionTree;
use super::types::{Region, RegionHandle, RegionKind};
use crate::config::OcrConfig;
use crate::ocr::{PageLevel, ResultCursor};

/// Builds region trees from result cursors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeBuilder {
    output_level: PageLevel,
    text_at_all_levels: bool,
    single_level_output: bool,
}

impl TreeBuilder {
    /// Builder emitting regions down to `output_level`, with text only there.
    pub fn new(output_level: PageLevel) -> Self {
        Self {
            output_level,
            text_at_all_levels: false,
            single_level_output: false,
        }
    }

    /// Builder configured from an [`OcrConfig`].
    pub fn from_config(config: &OcrConfig) -> Self {
        Self::new(config.output_level())
            .with_text_at_all_levels(config.text_at_all_levels)
            .with_single_level_output(config.single_level_output)
    }

    /// Attach text to every emitted region, not only at the output level.
    pub fn with_text_at_all_levels(mut self, enable: bool) -> Self {
        self.text_at_all_levels = enable;
        self
    }

    /// Keep only output-level regions, directly under the root.
    pub fn with_single_level_output(mut self, enable: bool) -> Self {
        self.single_level_output = enable;
        self
    }

    /// Granularity at which text is attached.
    pub fn output_level(&self) -> PageLevel {
        self.output_level
    }

    /// Build a fresh tree from the cursor's current position to the end.
    pub fn build<C: ResultCursor + ?Sized>(&self, cursor: &mut C) -> RegionTree {
        let mut tree = RegionTree::new();
        let root = tree.root();
        self.build_into(cursor, &mut tree, root);
        tree
    }

    /// Append the cursor's regions under `parent` of an existing tree.
    pub fn build_into<C: ResultCursor + ?Sized>(
        &self,
        cursor: &mut C,
        tree: &mut RegionTree,
        parent: RegionHandle,
    ) {
        self.build_level(cursor, PageLevel::Block, tree, parent);
        if self.single_level_output {
            flatten(tree, parent, RegionKind::from_level(self.output_level));
        }
    }

    fn build_level<C: ResultCursor + ?Sized>(
        &self,
        cursor: &mut C,
        level: PageLevel,
        tree: &mut RegionTree,
        parent: RegionHandle,
    ) {
        loop {
            if cursor.is_empty(level) {
                return;
            }

            if !cursor.block_kind().is_text() {
                if !cursor.advance(PageLevel::Block) {
                    return;
                }
                continue;
            }

            if level > self.output_level {
                return;
            }

            if cursor.is_at_beginning_of(level) {
                let node = tree.insert(self.region_at(cursor, level));
                if let Some(finer) = level.finer() {
                    self.build_level(cursor, finer, tree, node);
                }
                tree.add_unique_child(parent, node);
            }

            // Stop at the end of the enclosing span; the caller advances past it
            if let Some(coarser) = level.coarser() {
                if cursor.is_at_final_element(coarser, level) {
                    return;
                }
            }

            if !cursor.advance(level) {
                return;
            }
        }
    }

    fn region_at<C: ResultCursor + ?Sized>(&self, cursor: &C, level: PageLevel) -> Region {
        let mut region = Region::new(RegionKind::from_level(level));
        if let Some(bbox) = cursor.bounding_box(level).filter(|b| !b.is_null()) {
            region.set_polygon(bbox);
        }
        if level == self.output_level || self.text_at_all_levels {
            if let Some(text) = cursor.text(level) {
                region.set_text(text);
            }
        }
        region
    }
}

/// Replace the children of `parent` with all its descendants of `kind`.
///
/// Intermediate regions are detached; the kept regions stay in pre-order.
pub fn flatten(tree: &mut RegionTree, parent: RegionHandle, kind: RegionKind) {
    let keep: Vec<RegionHandle> = tree
        .descendants(parent)
        .into_iter()
        .filter(|h| tree[*h].kind() == kind)
        .collect();

    tree.remove_children(parent);
    for handle in keep {
        tree.add_unique_child(parent, handle);
    }
}
