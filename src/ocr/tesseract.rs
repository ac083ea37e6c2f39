//! Tesseract backend over the raw C API exposed by `leptess`.
//!
//! Every native call is wrapped here; status codes and null pointers are
//! turned into [`Error`] values before they leave this module.

use std::ffi::{CStr, CString};
use std::marker::PhantomData;
use std::os::raw::{c_char, c_int};
use std::path::Path;

use leptess::capi;

use super::cursor::{BlockKind, PageLevel, ResultCursor};
use super::engine::{ImageView, OcrBackend, PageSegMode};
use crate::error::{Error, Result};
use crate::geometry::Rect;

/// Tesseract engine session.
pub struct TesseractBackend {
    api: *mut capi::TessBaseAPI,
    ended: bool,
}

impl TesseractBackend {
    /// Allocate a fresh, uninitialized engine handle.
    pub fn new() -> Result<Self> {
        // SAFETY: plain constructor, returns null on allocation failure.
        let api = unsafe { capi::TessBaseAPICreate() };
        if api.is_null() {
            return Err(Error::Backend("TessBaseAPICreate returned null".to_string()));
        }
        Ok(Self { api, ended: false })
    }

    fn live(&self) -> Result<*mut capi::TessBaseAPI> {
        if self.ended {
            Err(Error::Backend("Tesseract session already ended".to_string()))
        } else {
            Ok(self.api)
        }
    }
}

fn c_string(value: &str) -> Result<CString> {
    CString::new(value).map_err(|_| Error::Backend(format!("interior NUL in {:?}", value)))
}

/// Take ownership of a string allocated by Tesseract.
///
/// # Safety
///
/// `ptr` must be null or a string returned by a Tesseract text getter.
unsafe fn take_text(ptr: *mut c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    let text = CStr::from_ptr(ptr).to_string_lossy().into_owned();
    capi::TessDeleteText(ptr);
    Some(text)
}

fn native_level(level: PageLevel) -> capi::TessPageIteratorLevel {
    match level {
        PageLevel::Block => capi::TessPageIteratorLevel_RIL_BLOCK,
        PageLevel::Paragraph => capi::TessPageIteratorLevel_RIL_PARA,
        PageLevel::Line => capi::TessPageIteratorLevel_RIL_TEXTLINE,
        PageLevel::Word => capi::TessPageIteratorLevel_RIL_WORD,
        PageLevel::Symbol => capi::TessPageIteratorLevel_RIL_SYMBOL,
    }
}

fn pixel_rect(rect: &Rect) -> (c_int, c_int, c_int, c_int) {
    let (x, y, width, height) = rect.to_pixel_bounds();
    (x as c_int, y as c_int, width as c_int, height as c_int)
}

impl OcrBackend for TesseractBackend {
    fn name(&self) -> &str {
        "tesseract"
    }

    fn version(&self) -> String {
        // SAFETY: returns a static string owned by the library.
        unsafe {
            let ptr = capi::TessVersion();
            if ptr.is_null() {
                "unknown".to_string()
            } else {
                CStr::from_ptr(ptr).to_string_lossy().into_owned()
            }
        }
    }

    fn init(&mut self, model_dir: &Path, language: &str) -> Result<()> {
        let api = self.live()?;
        let dir = c_string(&model_dir.to_string_lossy())?;
        let lang = c_string(language)?;
        // SAFETY: api is live, both strings outlive the call.
        let status = unsafe { capi::TessBaseAPIInit3(api, dir.as_ptr(), lang.as_ptr()) };
        if status != 0 {
            return Err(Error::Initialization {
                model_dir: model_dir.to_path_buf(),
                language: language.to_string(),
                reason: format!("TessBaseAPIInit3 returned {}", status),
            });
        }
        Ok(())
    }

    fn set_image(&mut self, image: &ImageView<'_>) -> Result<()> {
        let api = self.live()?;
        image.validate()?;
        // SAFETY: buffer geometry was validated; Tesseract copies the pixels.
        unsafe {
            capi::TessBaseAPISetImage(
                api,
                image.pixels.as_ptr(),
                image.width as c_int,
                image.height as c_int,
                image.bytes_per_pixel as c_int,
                image.stride as c_int,
            );
        }
        Ok(())
    }

    fn set_rectangle(&mut self, rect: &Rect) -> Result<()> {
        let api = self.live()?;
        let (left, top, width, height) = pixel_rect(rect);
        // SAFETY: api is live.
        unsafe { capi::TessBaseAPISetRectangle(api, left, top, width, height) };
        Ok(())
    }

    fn set_page_seg_mode(&mut self, mode: PageSegMode) -> Result<()> {
        let api = self.live()?;
        // SAFETY: api is live; mode codes match TessPageSegMode.
        unsafe { capi::TessBaseAPISetPageSegMode(api, mode.code() as capi::TessPageSegMode) };
        Ok(())
    }

    fn set_variable(&mut self, name: &str, value: &str) -> Result<()> {
        let api = self.live()?;
        let n = c_string(name)?;
        let v = c_string(value)?;
        // SAFETY: api is live, both strings outlive the call.
        let ok = unsafe { capi::TessBaseAPISetVariable(api, n.as_ptr(), v.as_ptr()) };
        if ok == 0 {
            return Err(Error::Backend(format!("unknown Tesseract variable {}", name)));
        }
        Ok(())
    }

    fn recognize(&mut self) -> Result<()> {
        let api = self.live()?;
        // SAFETY: api is live; no progress monitor.
        let status = unsafe { capi::TessBaseAPIRecognize(api, std::ptr::null_mut()) };
        if status != 0 {
            return Err(Error::Recognition(format!("TessBaseAPIRecognize returned {}", status)));
        }
        Ok(())
    }

    fn iterator(&mut self) -> Result<Box<dyn ResultCursor + '_>> {
        let api = self.live()?;
        // SAFETY: api is live; the iterator is freed by TesseractCursor.
        let results = unsafe { capi::TessBaseAPIGetIterator(api) };
        if results.is_null() {
            return Err(Error::Backend("no result iterator available".to_string()));
        }
        // SAFETY: results is non-null.
        let page = unsafe { capi::TessResultIteratorGetPageIterator(results) };
        Ok(Box::new(TesseractCursor {
            results,
            page,
            _session: PhantomData,
        }))
    }

    fn text(&mut self) -> Result<String> {
        let api = self.live()?;
        // SAFETY: api is live; ownership of the string passes to take_text.
        unsafe { take_text(capi::TessBaseAPIGetUTF8Text(api)) }
            .ok_or_else(|| Error::Recognition("TessBaseAPIGetUTF8Text returned null".to_string()))
    }

    fn end(&mut self) {
        if !self.ended {
            // SAFETY: api is live; End keeps the handle valid for Delete.
            unsafe { capi::TessBaseAPIEnd(self.api) };
            self.ended = true;
        }
    }
}

impl Drop for TesseractBackend {
    fn drop(&mut self) {
        self.end();
        // SAFETY: handle came from TessBaseAPICreate and is deleted once.
        unsafe { capi::TessBaseAPIDelete(self.api) };
    }
}

/// Cursor over a `TessResultIterator`, borrowing the session that made it.
struct TesseractCursor<'a> {
    results: *mut capi::TessResultIterator,
    page: *mut capi::TessPageIterator,
    _session: PhantomData<&'a mut TesseractBackend>,
}

impl TesseractCursor<'_> {
    fn bbox(&self, level: PageLevel) -> Option<(c_int, c_int, c_int, c_int)> {
        let (mut left, mut top, mut right, mut bottom) = (0, 0, 0, 0);
        // SAFETY: page iterator lives as long as self.
        let found = unsafe {
            capi::TessPageIteratorBoundingBox(
                self.page,
                native_level(level),
                &mut left,
                &mut top,
                &mut right,
                &mut bottom,
            )
        };
        (found != 0).then_some((left, top, right, bottom))
    }
}

impl ResultCursor for TesseractCursor<'_> {
    fn is_empty(&self, level: PageLevel) -> bool {
        self.bbox(level).is_none()
    }

    fn is_at_beginning_of(&self, level: PageLevel) -> bool {
        // SAFETY: page iterator lives as long as self.
        unsafe { capi::TessPageIteratorIsAtBeginningOf(self.page, native_level(level)) != 0 }
    }

    fn is_at_final_element(&self, level: PageLevel, element: PageLevel) -> bool {
        // SAFETY: page iterator lives as long as self.
        unsafe {
            capi::TessPageIteratorIsAtFinalElement(self.page, native_level(level), native_level(element)) != 0
        }
    }

    fn advance(&mut self, level: PageLevel) -> bool {
        // SAFETY: page iterator lives as long as self.
        unsafe { capi::TessPageIteratorNext(self.page, native_level(level)) != 0 }
    }

    fn bounding_box(&self, level: PageLevel) -> Option<Rect> {
        self.bbox(level).map(|(left, top, right, bottom)| {
            Rect::from_points(left as f32, top as f32, right as f32, bottom as f32)
        })
    }

    fn text(&self, level: PageLevel) -> Option<String> {
        // SAFETY: result iterator lives as long as self.
        unsafe { take_text(capi::TessResultIteratorGetUTF8Text(self.results, native_level(level))) }
    }

    fn block_kind(&self) -> BlockKind {
        // SAFETY: page iterator lives as long as self.
        let kind = unsafe { capi::TessPageIteratorBlockType(self.page) };
        // Flowing, heading, pull-out, inline equation, table, vertical and caption text
        if matches!(kind as u32, 1 | 2 | 3 | 5 | 6 | 7 | 8) {
            BlockKind::Text
        } else {
            BlockKind::NonText
        }
    }
}

impl Drop for TesseractCursor<'_> {
    fn drop(&mut self) {
        // SAFETY: the page iterator is owned by the result iterator.
        unsafe { capi::TessResultIteratorDelete(self.results) };
    }
}
