//! Debug visualization for region OCR.
//!
//! Tools for checking OCR results visually:
//!
//! - Outline regions on a copy of the page image, colour-coded by kind
//! - Outline the rectangles handed to the OCR engine
//! - Export the region tree to JSON/SVG
//!
//! ## Example
//!
//! ```ignore
//! use region_ocr::debug::{DebugOptions, DebugVisualizer};
//!
//! let visualizer = DebugVisualizer::new(DebugOptions::default());
//! let raster = visualizer.render(&image, &tree);
//! visualizer.save_png(&raster, "debug_page1.png")?;
//! ```

mod visualizer;

pub use visualizer::{DebugOptions, DebugVisualizer, RegionColors};
