// Allow some clippy lints that are too pedantic for this project
#![allow(clippy::needless_range_loop)]
#![allow(clippy::new_without_default)]
// Allow unused for tests
#![cfg_attr(test, allow(dead_code))]

//! # Region OCR
//!
//! Turns a page image into a tree of text regions by driving an external OCR
//! engine, and fills the empty text regions of an existing page layout.
//!
//! ## Core Features
//!
//! - **Tree reconstruction**: walks the engine's hierarchical result cursor
//!   (block, paragraph, line, word) and rebuilds it as a region tree at a
//!   configurable granularity, optionally flattened to a single level
//! - **Layout reconciliation**: recognizes only the regions of an existing
//!   layout that still lack text, as rectangles of the page or as
//!   polygon-masked crops
//! - **Redistribution**: recognizes merged candidate areas once and assigns
//!   every recognized line to the smallest region containing it
//! - **Engine session safety**: an explicit session state machine with
//!   per-call recognition requests and guaranteed release
//! - **Debug output**: colour-coded region rasters, JSON and SVG export
//!
//! ## Architecture
//!
//! - [`ocr`]: engine boundary (`OcrBackend` trait, `OcrEngine` session,
//!   result cursor, in-memory and Tesseract backends)
//! - [`region`]: arena-backed region tree and the tree builder
//! - [`geometry`]: rectangles, polygons and OCR box reconciliation
//! - [`reconcile`]: candidate selection, imaging and text write-back
//! - [`pipeline`]: per-page orchestration
//!
//! ## Quick Start
//!
//! ```
//! use region_ocr::geometry::Rect;
//! use region_ocr::ocr::{MemoryBackend, MemoryBlock, MemoryLine, MemoryPage, MemoryParagraph};
//! use region_ocr::region::RegionKind;
//! use region_ocr::{OcrConfig, OcrPipeline};
//!
//! # fn main() -> region_ocr::Result<()> {
//! let page = MemoryPage::new().with_block(MemoryBlock::text(vec![MemoryParagraph::new(vec![
//!     MemoryLine::from_text("Hello", Rect::new(10.0, 10.0, 60.0, 14.0)),
//! ])]));
//!
//! let config = OcrConfig::new()
//!     .with_model_dir(std::env::temp_dir())
//!     .with_text_level(2);
//! let image = image::RgbaImage::new(200, 100);
//! let result = OcrPipeline::new(config).recognize_page(MemoryBackend::new(page), &image)?;
//!
//! let lines = result.tree.filter(RegionKind::TextLine);
//! assert_eq!(result.tree[lines[0]].text(), "Hello");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// Error handling
pub mod error;

// Configuration
pub mod config;

// Geometry and OCR box reconciliation
pub mod geometry;

// OCR engine boundary
pub mod ocr;

// Region model and tree construction
pub mod region;

// Layout reconciliation
pub mod reconcile;

// Per-page orchestration
pub mod pipeline;

// Debug visualization
pub mod debug;

// Re-exports
pub use config::OcrConfig;
pub use error::{Error, Result};
pub use ocr::{OcrBackend, OcrEngine, PageLevel, ResultCursor};
pub use pipeline::{OcrPipeline, PageResult};
pub use reconcile::{ReconcileMode, ReconcileReport, RegionReconciler};
pub use region::{Region, RegionHandle, RegionKind, RegionTree, TreeBuilder};

// Version info
/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
