//! Configuration for region OCR.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::ocr::{PageLevel, PageSegMode};
use crate::reconcile::ReconcileMode;

/// Language loaded when none is configured.
pub const DEFAULT_LANGUAGE: &str = "eng";

/// Region OCR configuration.
///
/// Hosts persist it however they like; every field falls back to its
/// default when missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Directory containing the trained model files.
    pub model_dir: PathBuf,

    /// Language code of the trained model.
    pub language: String,

    /// Output granularity: 0 block, 1 paragraph, 2 line, 3 word.
    pub text_level: i32,

    /// Produce a debug raster with the recognized regions drawn in.
    pub draw_results: bool,

    /// Keep only the regions at the output granularity, directly under the root.
    pub single_level_output: bool,

    /// Attach text to every level above the output granularity as well.
    pub text_at_all_levels: bool,

    /// How existing layouts are reconciled with fresh OCR results.
    pub reconcile_mode: ReconcileMode,

    /// Page segmentation mode used for every recognition pass.
    pub page_seg_mode: PageSegMode,

    /// RGBA colour painted outside a region's polygon when it is masked.
    pub mask_fill: [u8; 4],
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl OcrConfig {
    /// Create new configuration with defaults.
    pub fn new() -> Self {
        Self {
            model_dir: PathBuf::new(),
            language: DEFAULT_LANGUAGE.to_string(),
            text_level: PageLevel::DEFAULT_OUTPUT.index() as i32,
            draw_results: false,
            single_level_output: false,
            text_at_all_levels: false,
            reconcile_mode: ReconcileMode::default(),
            page_seg_mode: PageSegMode::default(),
            mask_fill: [255, 255, 255, 255],
        }
    }

    /// Set the trained model directory.
    pub fn with_model_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.model_dir = dir.into();
        self
    }

    /// Set the model language.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Set the output granularity index.
    pub fn with_text_level(mut self, level: i32) -> Self {
        self.text_level = level;
        self
    }

    /// Enable the debug raster.
    pub fn with_draw_results(mut self, enable: bool) -> Self {
        self.draw_results = enable;
        self
    }

    /// Enable single-level output.
    pub fn with_single_level_output(mut self, enable: bool) -> Self {
        self.single_level_output = enable;
        self
    }

    /// Attach text at every level.
    pub fn with_text_at_all_levels(mut self, enable: bool) -> Self {
        self.text_at_all_levels = enable;
        self
    }

    /// Set the reconciliation mode.
    pub fn with_reconcile_mode(mut self, mode: ReconcileMode) -> Self {
        self.reconcile_mode = mode;
        self
    }

    /// Set the page segmentation mode.
    pub fn with_page_seg_mode(mut self, mode: PageSegMode) -> Self {
        self.page_seg_mode = mode;
        self
    }

    /// Set the mask fill colour.
    pub fn with_mask_fill(mut self, rgba: [u8; 4]) -> Self {
        self.mask_fill = rgba;
        self
    }

    /// The output granularity as a level.
    ///
    /// Indices outside `0..=3` fall back to paragraphs with a warning.
    pub fn output_level(&self) -> PageLevel {
        PageLevel::from_output_index(self.text_level).unwrap_or_else(|| {
            log::warn!(
                "Text level {} is out of range (0-3), using {} level instead",
                self.text_level,
                PageLevel::DEFAULT_OUTPUT
            );
            PageLevel::DEFAULT_OUTPUT
        })
    }
}
