//! Layout region model.
//!
//! A page layout is a rooted tree of [`Region`]s (root, text blocks,
//! paragraphs, text lines, words) stored in a [`RegionTree`] arena. The
//! [`builder`] module rebuilds such a tree from an OCR result cursor.

pub mod builder;
mod tree;
mod types;

pub use builder::{flatten, TreeBuilder};
pub use tree::{PageMetadata, RegionTree};
pub use types::{new_region_id, Region, RegionHandle, RegionKind};
