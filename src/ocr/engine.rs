//! OCR engine session adapter.
//!
//! [`OcrEngine`] owns one external engine session from `init` to `end` and
//! enforces the session state machine:
//!
//! ```text
//! Uninitialized -> Initialized -> (ImageSet -> Recognized)* -> Ended
//! ```
//!
//! The raw engine sits behind the [`OcrBackend`] trait. Engine failures are
//! translated into [`Error`] values at this boundary, and the session is
//! always released: explicitly through [`OcrEngine::end`] or by `Drop` on any
//! other exit path.

use std::path::{Path, PathBuf};
use std::time::Instant;

use image::RgbaImage;
use serde::{Deserialize, Serialize};

use super::cursor::ResultCursor;
use crate::error::{Error, Result};
use crate::geometry::{Rect, Size};

/// Variable enabled on every session so best-choice lists are kept.
pub const SAVE_BEST_CHOICES: &str = "save_best_choices";

/// Borrowed raster buffer handed to the engine.
#[derive(Debug, Clone, Copy)]
pub struct ImageView<'a> {
    /// Pixel data, row-major
    pub pixels: &'a [u8],
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Bytes per pixel (1 = grey, 3 = RGB, 4 = RGBA)
    pub bytes_per_pixel: u32,
    /// Bytes per row
    pub stride: u32,
}

impl<'a> ImageView<'a> {
    /// View an RGBA image.
    pub fn from_rgba(image: &'a RgbaImage) -> Self {
        Self {
            pixels: image.as_raw(),
            width: image.width(),
            height: image.height(),
            bytes_per_pixel: 4,
            stride: image.width() * 4,
        }
    }

    /// Image dimensions.
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Check that the buffer matches its declared geometry.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::Image(format!(
                "empty image ({}x{})",
                self.width, self.height
            )));
        }
        if !matches!(self.bytes_per_pixel, 1 | 3 | 4) {
            return Err(Error::Image(format!(
                "unsupported bytes per pixel: {}",
                self.bytes_per_pixel
            )));
        }
        let row_bytes = self.width as usize * self.bytes_per_pixel as usize;
        if (self.stride as usize) < row_bytes {
            return Err(Error::Image(format!(
                "stride {} shorter than a row of {} bytes",
                self.stride, row_bytes
            )));
        }
        let needed = self.stride as usize * (self.height as usize - 1) + row_bytes;
        if self.pixels.len() < needed {
            return Err(Error::Image(format!(
                "buffer holds {} bytes, {} needed",
                self.pixels.len(),
                needed
            )));
        }
        Ok(())
    }
}

/// Page segmentation mode requested from the engine.
///
/// Values match Tesseract's `PageSegMode` numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageSegMode {
    /// Orientation and script detection only
    OsdOnly,
    /// Automatic page segmentation with orientation and script detection
    AutoOsd,
    /// Automatic page segmentation without OSD or recognition
    AutoOnly,
    /// Fully automatic page segmentation without OSD
    #[default]
    Auto,
    /// A single column of text of variable sizes
    SingleColumn,
    /// A single uniform block of vertically aligned text
    SingleBlockVertText,
    /// A single uniform block of text
    SingleBlock,
    /// A single text line
    SingleLine,
    /// A single word
    SingleWord,
    /// A single word in a circle
    CircleWord,
    /// A single character
    SingleChar,
    /// As much text as possible in no particular order
    SparseText,
    /// Sparse text with orientation and script detection
    SparseTextOsd,
    /// A single text line, bypassing engine-specific hacks
    RawLine,
}

impl PageSegMode {
    /// Numeric mode as understood by Tesseract.
    pub fn code(self) -> i32 {
        self as i32
    }
}

/// Everything one recognition pass needs, bound explicitly per call.
#[derive(Debug, Clone, Copy)]
pub struct RecognitionRequest<'a> {
    /// Image to recognize
    pub image: ImageView<'a>,
    /// Optional sub-rectangle of `image` to restrict recognition to
    pub rectangle: Option<Rect>,
    /// Segmentation mode for this pass
    pub page_seg_mode: PageSegMode,
}

impl<'a> RecognitionRequest<'a> {
    /// Recognize the whole image with automatic segmentation.
    pub fn full(image: ImageView<'a>) -> Self {
        Self {
            image,
            rectangle: None,
            page_seg_mode: PageSegMode::Auto,
        }
    }

    /// Restrict recognition to `rect`.
    pub fn with_rectangle(mut self, rect: Rect) -> Self {
        self.rectangle = Some(rect);
        self
    }

    /// Use a different segmentation mode.
    pub fn with_page_seg_mode(mut self, mode: PageSegMode) -> Self {
        self.page_seg_mode = mode;
        self
    }
}

/// Raw OCR engine driven by [`OcrEngine`].
///
/// Implementations translate native failure signals into [`Error`] values;
/// nothing may unwind across this trait.
pub trait OcrBackend {
    /// Short engine name for logs.
    fn name(&self) -> &str;

    /// Engine version string.
    fn version(&self) -> String;

    /// Load the trained model for `language` from `model_dir`.
    fn init(&mut self, model_dir: &Path, language: &str) -> Result<()>;

    /// Bind a raster buffer. Clears any rectangle constraint.
    fn set_image(&mut self, image: &ImageView<'_>) -> Result<()>;

    /// Restrict the next recognition to a sub-rectangle of the bound image.
    fn set_rectangle(&mut self, rect: &Rect) -> Result<()>;

    /// Select the page segmentation mode.
    fn set_page_seg_mode(&mut self, mode: PageSegMode) -> Result<()>;

    /// Set a named engine variable.
    fn set_variable(&mut self, name: &str, value: &str) -> Result<()>;

    /// Run recognition on the bound image. Blocks until done.
    fn recognize(&mut self) -> Result<()>;

    /// Cursor over the results of the last recognition.
    fn iterator(&mut self) -> Result<Box<dyn ResultCursor + '_>>;

    /// Flat text of the last recognition.
    fn text(&mut self) -> Result<String>;

    /// Release engine resources.
    fn end(&mut self);
}

impl<B: OcrBackend + ?Sized> OcrBackend for &mut B {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn version(&self) -> String {
        (**self).version()
    }

    fn init(&mut self, model_dir: &Path, language: &str) -> Result<()> {
        (**self).init(model_dir, language)
    }

    fn set_image(&mut self, image: &ImageView<'_>) -> Result<()> {
        (**self).set_image(image)
    }

    fn set_rectangle(&mut self, rect: &Rect) -> Result<()> {
        (**self).set_rectangle(rect)
    }

    fn set_page_seg_mode(&mut self, mode: PageSegMode) -> Result<()> {
        (**self).set_page_seg_mode(mode)
    }

    fn set_variable(&mut self, name: &str, value: &str) -> Result<()> {
        (**self).set_variable(name, value)
    }

    fn recognize(&mut self) -> Result<()> {
        (**self).recognize()
    }

    fn iterator(&mut self) -> Result<Box<dyn ResultCursor + '_>> {
        (**self).iterator()
    }

    fn text(&mut self) -> Result<String> {
        (**self).text()
    }

    fn end(&mut self) {
        (**self).end()
    }
}

/// Lifecycle state of an engine session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Created, model not loaded yet
    Uninitialized,
    /// Model loaded, no image bound
    Initialized,
    /// Image bound, waiting for recognition
    ImageSet,
    /// Recognition done, results available
    Recognized,
    /// Session released
    Ended,
}

impl SessionState {
    fn describe(self) -> &'static str {
        match self {
            SessionState::Uninitialized => "uninitialized",
            SessionState::Initialized => "initialized",
            SessionState::ImageSet => "waiting for recognition",
            SessionState::Recognized => "recognized",
            SessionState::Ended => "ended",
        }
    }
}

/// One engine session with an enforced lifecycle.
///
/// Not safe to share between threads; use one engine per page per thread.
pub struct OcrEngine<B: OcrBackend> {
    backend: B,
    state: SessionState,
    model_dir: PathBuf,
    language: String,
}

impl<B: OcrBackend> OcrEngine<B> {
    /// Wrap a backend without loading anything.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            state: SessionState::Uninitialized,
            model_dir: PathBuf::new(),
            language: String::new(),
        }
    }

    /// Wrap a backend and initialize it in one step.
    pub fn start(backend: B, model_dir: &Path, language: &str) -> Result<Self> {
        let mut engine = Self::new(backend);
        engine.init(model_dir, language)?;
        Ok(engine)
    }

    /// Current session state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Language the session was initialized with.
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Directory the model was loaded from.
    pub fn model_dir(&self) -> &Path {
        &self.model_dir
    }

    /// The wrapped backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Load the trained model.
    ///
    /// Fails with [`Error::Initialization`] when `model_dir` is not a
    /// readable directory or the backend cannot load the model. The caller
    /// must not continue with recognition after a failure.
    pub fn init(&mut self, model_dir: &Path, language: &str) -> Result<()> {
        self.require("initialize", &[SessionState::Uninitialized])?;

        if !model_dir.is_dir() {
            let reason = "model directory does not exist".to_string();
            return Err(self.init_failure(model_dir, language, reason));
        }

        if let Err(e) = self.backend.init(model_dir, language) {
            return Err(self.init_failure(model_dir, language, failure_reason(e)));
        }
        if let Err(e) = self.backend.set_variable(SAVE_BEST_CHOICES, "T") {
            self.backend.end();
            return Err(self.init_failure(model_dir, language, failure_reason(e)));
        }

        self.model_dir = model_dir.to_path_buf();
        self.language = language.to_string();
        self.state = SessionState::Initialized;

        log::info!(
            "Initialized {} OCR engine (version {}) for '{}'",
            self.backend.name(),
            self.backend.version(),
            language
        );
        Ok(())
    }

    fn init_failure(&self, model_dir: &Path, language: &str, reason: String) -> Error {
        log::warn!("Could not initialize {} OCR engine: {}", self.backend.name(), reason);
        log::warn!(
            "Model directory {:?} must contain the trained data for '{}' (e.g. {}.traineddata)",
            model_dir,
            language,
            language
        );
        Error::Initialization {
            model_dir: model_dir.to_path_buf(),
            language: language.to_string(),
            reason,
        }
    }

    /// Bind a raster buffer. Required before every [`recognize`](Self::recognize).
    pub fn set_image(&mut self, image: &ImageView<'_>) -> Result<()> {
        self.require(
            "set an image",
            &[SessionState::Initialized, SessionState::ImageSet, SessionState::Recognized],
        )?;
        image.validate()?;
        self.backend.set_image(image)?;
        self.state = SessionState::ImageSet;
        Ok(())
    }

    /// Restrict the next recognition to `rect`.
    pub fn set_rectangle(&mut self, rect: &Rect) -> Result<()> {
        self.require("set a rectangle", &[SessionState::ImageSet])?;
        self.backend.set_rectangle(rect)
    }

    /// Select the page segmentation mode.
    pub fn set_segmentation_mode(&mut self, mode: PageSegMode) -> Result<()> {
        self.require_live("set the segmentation mode")?;
        self.backend.set_page_seg_mode(mode)
    }

    /// Set a named engine variable.
    pub fn set_variable(&mut self, name: &str, value: &str) -> Result<()> {
        self.require_live("set a variable")?;
        self.backend.set_variable(name, value)
    }

    /// Run recognition on the bound image.
    pub fn recognize(&mut self) -> Result<()> {
        self.require("recognize", &[SessionState::ImageSet])?;
        let start = Instant::now();
        self.backend.recognize()?;
        self.state = SessionState::Recognized;
        log::debug!("Recognition pass finished in {:?}", start.elapsed());
        Ok(())
    }

    /// Cursor over the results of the last recognition.
    ///
    /// The cursor borrows the engine, so it cannot outlive the next
    /// `set_image` or `recognize`.
    pub fn iterator(&mut self) -> Result<Box<dyn ResultCursor + '_>> {
        self.require("read results", &[SessionState::Recognized])?;
        self.backend.iterator()
    }

    /// Flat text of the last recognition.
    pub fn text(&mut self) -> Result<String> {
        self.require("read text", &[SessionState::Recognized])?;
        self.backend.text()
    }

    /// Run one recognition pass with every per-call setting bound explicitly.
    ///
    /// Image, rectangle and segmentation mode are set anew on each call, so
    /// nothing carries over from a previous pass.
    pub fn recognize_request(&mut self, request: &RecognitionRequest<'_>) -> Result<Recognition<'_, B>> {
        self.set_image(&request.image)?;
        self.set_segmentation_mode(request.page_seg_mode)?;
        if let Some(rect) = &request.rectangle {
            self.set_rectangle(rect)?;
        }
        self.recognize()?;
        Ok(Recognition { engine: self })
    }

    /// Release the engine session.
    ///
    /// Must be called at most once; later calls, like any other operation
    /// after ending, fail with [`Error::InvalidState`].
    pub fn end(&mut self) -> Result<()> {
        self.require_live("end the session")?;
        self.backend.end();
        self.state = SessionState::Ended;
        log::debug!("Released {} OCR engine", self.backend.name());
        Ok(())
    }

    fn require(&self, operation: &'static str, allowed: &[SessionState]) -> Result<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(Error::InvalidState {
                operation,
                state: self.state.describe(),
            })
        }
    }

    fn require_live(&self, operation: &'static str) -> Result<()> {
        self.require(
            operation,
            &[SessionState::Initialized, SessionState::ImageSet, SessionState::Recognized],
        )
    }
}

fn failure_reason(error: Error) -> String {
    match error {
        Error::Initialization { reason, .. } | Error::Backend(reason) => reason,
        other => other.to_string(),
    }
}

impl<B: OcrBackend> Drop for OcrEngine<B> {
    fn drop(&mut self) {
        if !matches!(self.state, SessionState::Uninitialized | SessionState::Ended) {
            self.backend.end();
            self.state = SessionState::Ended;
        }
    }
}

/// Results of one recognition pass.
pub struct Recognition<'e, B: OcrBackend> {
    engine: &'e mut OcrEngine<B>,
}

impl<B: OcrBackend> Recognition<'_, B> {
    /// Flat recognized text.
    pub fn text(&mut self) -> Result<String> {
        self.engine.text()
    }

    /// Hierarchical cursor over the results.
    pub fn cursor(&mut self) -> Result<Box<dyn ResultCursor + '_>> {
        self.engine.iterator()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::memory::{BackendCall, MemoryBackend, MemoryBlock, MemoryLine, MemoryPage, MemoryParagraph};
    use crate::ocr::cursor::PageLevel;

    fn page() -> MemoryPage {
        MemoryPage::new().with_block(MemoryBlock::text(vec![MemoryParagraph::new(vec![
            MemoryLine::from_text("Hello", Rect::from_points(10.0, 10.0, 60.0, 30.0)),
            MemoryLine::from_text("World", Rect::from_points(10.0, 40.0, 60.0, 60.0)),
        ])]))
    }

    fn image() -> RgbaImage {
        RgbaImage::new(100, 100)
    }

    #[test]
    fn test_init_rejects_missing_model_dir() {
        let mut engine = OcrEngine::new(MemoryBackend::new(page()));
        let err = engine
            .init(Path::new("/definitely/not/a/model/dir"), "eng")
            .unwrap_err();
        assert!(matches!(err, Error::Initialization { .. }));
        assert_eq!(engine.state(), SessionState::Uninitialized);

        // Nothing else is allowed after a failed init
        let img = image();
        assert!(matches!(
            engine.set_image(&ImageView::from_rgba(&img)),
            Err(Error::InvalidState { .. })
        ));
    }

    #[test]
    fn test_init_translates_backend_failure() {
        let dir = tempfile::tempdir().unwrap();
        let backend = MemoryBackend::new(page()).with_init_failure("eng.traineddata not found");
        let err = OcrEngine::start(backend, dir.path(), "eng").err().unwrap();
        match err {
            Error::Initialization { reason, language, .. } => {
                assert_eq!(reason, "eng.traineddata not found");
                assert_eq!(language, "eng");
            },
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_init_fails_when_best_choices_cannot_be_enabled() {
        let dir = tempfile::tempdir().unwrap();
        let mut backend = MemoryBackend::new(page()).with_variable_failure(SAVE_BEST_CHOICES);
        {
            let mut engine = OcrEngine::new(&mut backend);
            let err = engine.init(dir.path(), "eng").unwrap_err();
            assert!(matches!(err, Error::Initialization { .. }));
            assert!(err.is_fatal());
            assert_eq!(engine.state(), SessionState::Uninitialized);
        }
        // Released right away, not again on drop
        assert_eq!(backend.end_count(), 1);
    }

    #[test]
    fn test_init_enables_best_choices() {
        let dir = tempfile::tempdir().unwrap();
        let mut backend = MemoryBackend::new(page());
        {
            let engine = OcrEngine::start(&mut backend, dir.path(), "eng").unwrap();
            assert_eq!(engine.state(), SessionState::Initialized);
            assert_eq!(engine.language(), "eng");
        }
        assert_eq!(backend.variable(SAVE_BEST_CHOICES), Some("T"));
    }

    #[test]
    fn test_recognize_requires_image_each_time() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = OcrEngine::start(MemoryBackend::new(page()), dir.path(), "eng").unwrap();
        let img = image();

        assert!(matches!(engine.recognize(), Err(Error::InvalidState { .. })));

        engine.set_image(&ImageView::from_rgba(&img)).unwrap();
        engine.recognize().unwrap();
        assert_eq!(engine.state(), SessionState::Recognized);

        // A second pass needs the image bound again
        assert!(matches!(engine.recognize(), Err(Error::InvalidState { .. })));
    }

    #[test]
    fn test_results_only_after_recognition() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = OcrEngine::start(MemoryBackend::new(page()), dir.path(), "eng").unwrap();
        let img = image();
        engine.set_image(&ImageView::from_rgba(&img)).unwrap();

        assert!(engine.text().is_err());
        assert!(engine.iterator().is_err());

        engine.recognize().unwrap();
        assert_eq!(engine.text().unwrap(), "Hello\nWorld");
        let cursor = engine.iterator().unwrap();
        assert_eq!(cursor.text(PageLevel::Line).as_deref(), Some("Hello"));
    }

    #[test]
    fn test_rectangle_requires_bound_image() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = OcrEngine::start(MemoryBackend::new(page()), dir.path(), "eng").unwrap();
        let err = engine.set_rectangle(&Rect::new(0.0, 0.0, 10.0, 10.0)).unwrap_err();
        assert!(matches!(err, Error::InvalidState { .. }));
    }

    #[test]
    fn test_recognize_request_binds_everything() {
        let dir = tempfile::tempdir().unwrap();
        let mut backend = MemoryBackend::new(page());
        let img = image();
        {
            let mut engine = OcrEngine::start(&mut backend, dir.path(), "eng").unwrap();
            let request = RecognitionRequest::full(ImageView::from_rgba(&img))
                .with_rectangle(Rect::from_points(0.0, 35.0, 100.0, 65.0))
                .with_page_seg_mode(PageSegMode::SingleBlock);
            let mut recognition = engine.recognize_request(&request).unwrap();
            assert_eq!(recognition.text().unwrap(), "World");
        }

        let calls = backend.calls();
        assert!(calls.contains(&BackendCall::SetImage { width: 100, height: 100 }));
        assert!(calls.contains(&BackendCall::SetPageSegMode(PageSegMode::SingleBlock)));
        assert!(calls.contains(&BackendCall::SetRectangle(Rect::from_points(0.0, 35.0, 100.0, 65.0))));
        assert!(calls.contains(&BackendCall::Recognize));
    }

    #[test]
    fn test_end_twice_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = OcrEngine::start(MemoryBackend::new(page()), dir.path(), "eng").unwrap();
        engine.end().unwrap();
        assert_eq!(engine.state(), SessionState::Ended);

        assert!(matches!(engine.end(), Err(Error::InvalidState { .. })));
        let img = image();
        assert!(matches!(
            engine.set_image(&ImageView::from_rgba(&img)),
            Err(Error::InvalidState { .. })
        ));
    }

    #[test]
    fn test_drop_releases_session_once() {
        let dir = tempfile::tempdir().unwrap();
        let mut backend = MemoryBackend::new(page());
        {
            let _engine = OcrEngine::start(&mut backend, dir.path(), "eng").unwrap();
        }
        assert_eq!(backend.end_count(), 1);

        {
            let mut engine = OcrEngine::start(&mut backend, dir.path(), "eng").unwrap();
            engine.end().unwrap();
        }
        assert_eq!(backend.end_count(), 2);
    }

    #[test]
    fn test_image_view_validation() {
        let img = RgbaImage::new(4, 2);
        assert!(ImageView::from_rgba(&img).validate().is_ok());

        let short = ImageView {
            pixels: &[0u8; 10],
            width: 4,
            height: 2,
            bytes_per_pixel: 4,
            stride: 16,
        };
        assert!(matches!(short.validate(), Err(Error::Image(_))));

        let odd_depth = ImageView {
            bytes_per_pixel: 2,
            ..ImageView::from_rgba(&img)
        };
        assert!(odd_depth.validate().is_err());
    }

    #[test]
    fn test_page_seg_mode_codes() {
        assert_eq!(PageSegMode::OsdOnly.code(), 0);
        assert_eq!(PageSegMode::Auto.code(), 3);
        assert_eq!(PageSegMode::SingleBlock.code(), 6);
        assert_eq!(PageSegMode::RawLine.code(), 13);
    }
}
