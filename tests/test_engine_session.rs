//! Integration tests for the OCR engine session lifecycle.

use std::path::Path;

use image::RgbaImage;
use region_ocr::geometry::Rect;
use region_ocr::ocr::memory::BackendCall;
use region_ocr::ocr::{
    ImageView, MemoryBackend, MemoryBlock, MemoryLine, MemoryPage, MemoryParagraph, OcrEngine, PageLevel,
    PageSegMode, RecognitionRequest, ResultCursor, SessionState,
};
use region_ocr::region::RegionTree;
use region_ocr::{Error, OcrConfig, OcrPipeline};

fn hello_page() -> MemoryPage {
    MemoryPage::new().with_block(MemoryBlock::text(vec![MemoryParagraph::new(vec![
        MemoryLine::from_text("Hello World", Rect::new(10.0, 10.0, 100.0, 12.0)),
    ])]))
}

#[test]
fn test_missing_model_dir_is_fatal_and_named() {
    let err = OcrEngine::start(MemoryBackend::new(hello_page()), Path::new("/no/such/tessdata"), "deu")
        .err()
        .unwrap();

    assert!(err.is_fatal());
    let message = err.to_string();
    assert!(message.contains("deu"));
    assert!(message.contains("/no/such/tessdata"));
}

#[test]
fn test_failed_init_never_releases() {
    let dir = tempfile::tempdir().unwrap();
    let mut backend = MemoryBackend::new(hello_page()).with_init_failure("deu.traineddata not found");

    match OcrEngine::start(&mut backend, dir.path(), "deu") {
        Err(Error::Initialization { reason, language, .. }) => {
            assert_eq!(reason, "deu.traineddata not found");
            assert_eq!(language, "deu");
        },
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("init should fail"),
    }
    assert_eq!(backend.end_count(), 0);
}

#[test]
fn test_full_session_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let mut backend = MemoryBackend::new(hello_page());
    let image = RgbaImage::new(200, 50);

    {
        let mut engine = OcrEngine::start(&mut backend, dir.path(), "eng").unwrap();
        assert_eq!(engine.state(), SessionState::Initialized);

        let request = RecognitionRequest::full(ImageView::from_rgba(&image))
            .with_page_seg_mode(PageSegMode::SingleBlock);
        let mut recognition = engine.recognize_request(&request).unwrap();
        assert_eq!(recognition.text().unwrap(), "Hello World");

        let mut cursor = recognition.cursor().unwrap();
        assert_eq!(cursor.text(PageLevel::Word).as_deref(), Some("Hello"));
        assert!(cursor.advance(PageLevel::Word));
        assert_eq!(cursor.text(PageLevel::Word).as_deref(), Some("World"));
        assert!(!cursor.advance(PageLevel::Word));
        drop(cursor);

        assert_eq!(engine.state(), SessionState::Recognized);
        engine.end().unwrap();
        assert_eq!(engine.state(), SessionState::Ended);
    }

    assert_eq!(
        backend.calls(),
        &[
            BackendCall::Init {
                language: "eng".to_string()
            },
            BackendCall::SetVariable("save_best_choices".to_string(), "T".to_string()),
            BackendCall::SetImage { width: 200, height: 50 },
            BackendCall::SetPageSegMode(PageSegMode::SingleBlock),
            BackendCall::Recognize,
            BackendCall::End,
        ]
    );
}

#[test]
fn test_operations_after_end_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let image = RgbaImage::new(20, 20);
    let mut engine = OcrEngine::start(MemoryBackend::new(hello_page()), dir.path(), "eng").unwrap();
    engine.end().unwrap();

    let err = engine.set_image(&ImageView::from_rgba(&image)).unwrap_err();
    assert!(matches!(err, Error::InvalidState { .. }));
    assert!(matches!(engine.end(), Err(Error::InvalidState { .. })));
}

#[test]
fn test_cursor_requires_recognition() {
    let dir = tempfile::tempdir().unwrap();
    let image = RgbaImage::new(20, 20);
    let mut engine = OcrEngine::start(MemoryBackend::new(hello_page()), dir.path(), "eng").unwrap();

    assert!(engine.iterator().is_err());
    engine.set_image(&ImageView::from_rgba(&image)).unwrap();
    assert!(engine.text().is_err());
}

#[test]
fn test_pipeline_releases_engine_once() {
    let dir = tempfile::tempdir().unwrap();
    let mut backend = MemoryBackend::new(hello_page());
    let pipeline = OcrPipeline::new(OcrConfig::new().with_model_dir(dir.path()));

    pipeline
        .recognize_page(&mut backend, &RgbaImage::new(200, 50))
        .unwrap();
    assert_eq!(backend.end_count(), 1);

    let mut tree = RegionTree::new();
    let result = pipeline
        .annotate_layout(&mut backend, &RgbaImage::new(200, 50), &mut tree)
        .unwrap();
    assert_eq!(result.report.candidates, 0);
    assert_eq!(backend.end_count(), 2);
}
