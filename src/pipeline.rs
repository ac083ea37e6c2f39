//! OCR orchestration for one page image.
//!
//! Either recognizes a page from scratch and builds a fresh region tree, or
//! fills the empty regions of an existing layout. Each call owns one engine
//! session for its whole duration and releases it on every exit path.

use std::time::Instant;

use image::RgbaImage;

use crate::config::OcrConfig;
use crate::debug::DebugVisualizer;
use crate::error::Result;
use crate::geometry::Size;
use crate::ocr::{ImageView, OcrBackend, OcrEngine, RecognitionRequest};
use crate::reconcile::{ReconcileReport, RegionReconciler};
use crate::region::{RegionTree, TreeBuilder};

/// Result of recognizing a page from scratch.
#[derive(Debug)]
pub struct PageResult {
    /// Region tree rebuilt from the OCR results
    pub tree: RegionTree,
    /// Page image with the recognized regions outlined, if requested
    pub debug_image: Option<RgbaImage>,
}

/// Result of reconciling an existing layout.
#[derive(Debug)]
pub struct LayoutResult {
    /// What the reconciler did
    pub report: ReconcileReport,
    /// Page image with regions and OCR boxes outlined, if requested
    pub debug_image: Option<RgbaImage>,
}

/// Result of [`OcrPipeline::process`].
#[derive(Debug)]
pub enum ProcessOutcome {
    /// A new tree was built
    Page(PageResult),
    /// An existing tree was filled in
    Layout(LayoutResult),
}

/// Drives OCR for page images according to an [`OcrConfig`].
pub struct OcrPipeline {
    config: OcrConfig,
    visualizer: DebugVisualizer,
    image_file_name: Option<String>,
}

impl OcrPipeline {
    /// Pipeline with the default debug visualizer.
    pub fn new(config: OcrConfig) -> Self {
        Self {
            config,
            visualizer: DebugVisualizer::default(),
            image_file_name: None,
        }
    }

    /// Use a custom debug visualizer.
    pub fn with_visualizer(mut self, visualizer: DebugVisualizer) -> Self {
        self.visualizer = visualizer;
        self
    }

    /// Record the source image's file name in the page metadata.
    pub fn with_image_file_name(mut self, name: impl Into<String>) -> Self {
        self.image_file_name = Some(name.into());
        self
    }

    /// Configuration in use.
    pub fn config(&self) -> &OcrConfig {
        &self.config
    }

    fn start_engine<B: OcrBackend>(&self, backend: B) -> Result<OcrEngine<B>> {
        OcrEngine::start(backend, &self.config.model_dir, &self.config.language)
    }

    fn fill_metadata(&self, tree: &mut RegionTree, image: &RgbaImage) {
        let metadata = tree.metadata_mut();
        metadata.image_size = Some(Size::new(image.width(), image.height()));
        if self.image_file_name.is_some() {
            metadata.image_file_name = self.image_file_name.clone();
        }
    }

    /// Recognize the whole page and rebuild its layout as a region tree.
    pub fn recognize_page<B: OcrBackend>(&self, backend: B, image: &RgbaImage) -> Result<PageResult> {
        let start = Instant::now();
        log::info!("Computing OCR for a {}x{} page", image.width(), image.height());

        let builder = TreeBuilder::from_config(&self.config);
        let mut engine = self.start_engine(backend)?;

        let request = RecognitionRequest::full(ImageView::from_rgba(image))
            .with_page_seg_mode(self.config.page_seg_mode);
        let mut recognition = engine.recognize_request(&request)?;
        let mut tree = builder.build(&mut *recognition.cursor()?);
        engine.end()?;

        self.fill_metadata(&mut tree, image);
        let debug_image = self
            .config
            .draw_results
            .then(|| self.visualizer.render(image, &tree));

        log::info!(
            "OCR results computed in {:?}: {} regions at {} level",
            start.elapsed(),
            tree.len() - 1,
            builder.output_level()
        );
        Ok(PageResult { tree, debug_image })
    }

    /// Fill the empty text regions of an existing layout.
    ///
    /// When the engine cannot be initialized the layout is left untouched
    /// and the error is returned.
    pub fn annotate_layout<B: OcrBackend>(
        &self,
        backend: B,
        image: &RgbaImage,
        tree: &mut RegionTree,
    ) -> Result<LayoutResult> {
        let start = Instant::now();
        log::info!("Reconciling layout with OCR for a {}x{} page", image.width(), image.height());

        let mut engine = self.start_engine(backend)?;
        let report = RegionReconciler::from_config(&self.config).reconcile(&mut engine, image, tree)?;
        engine.end()?;

        self.fill_metadata(tree, image);
        let debug_image = self.config.draw_results.then(|| {
            let mut canvas = self.visualizer.render(image, tree);
            self.visualizer.draw_boxes(&mut canvas, &report.ocr_boxes);
            canvas
        });

        log::info!("OCR results computed in {:?}", start.elapsed());
        Ok(LayoutResult { report, debug_image })
    }

    /// Reconcile `layout` when given, otherwise recognize the page from scratch.
    pub fn process<B: OcrBackend>(
        &self,
        backend: B,
        image: &RgbaImage,
        layout: Option<&mut RegionTree>,
    ) -> Result<ProcessOutcome> {
        match layout {
            Some(tree) => self.annotate_layout(backend, image, tree).map(ProcessOutcome::Layout),
            None => self.recognize_page(backend, image).map(ProcessOutcome::Page),
        }
    }
}
