//! OCR engine boundary.
//!
//! - [`cursor`]: the hierarchical result cursor and its level state machine
//! - [`engine`]: the session adapter enforcing the engine lifecycle
//! - [`memory`]: an in-memory engine for tests and offline use
//! - `tesseract`: the Tesseract backend (feature `tesseract`)

pub mod cursor;
pub mod engine;
pub mod memory;
#[cfg(feature = "tesseract")]
#[cfg_attr(docsrs, doc(cfg(feature = "tesseract")))]
pub mod tesseract;

pub use cursor::{BlockKind, PageLevel, ResultCursor};
pub use engine::{
    ImageView, OcrBackend, OcrEngine, PageSegMode, Recognition, RecognitionRequest, SessionState,
    SAVE_BEST_CHOICES,
};
pub use memory::{MemoryBackend, MemoryBlock, MemoryLine, MemoryPage, MemoryParagraph, MemoryWord};
#[cfg(feature = "tesseract")]
pub use tesseract::TesseractBackend;
