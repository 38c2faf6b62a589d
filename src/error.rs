//! Error types for the pdf-pic-select library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`PicSelectError`] — **Fatal**: the classification cannot produce a
//!   result at all (missing input, bad thresholds, file not found, document
//!   cannot be opened). Returned as `Err(PicSelectError)` from the top-level
//!   `classify*` functions and from [`crate::tool::PicSelectTool::invoke`].
//!
//! * [`PageFault`] — **Non-fatal**: one page's images could not be
//!   enumerated. The page is classified as having no qualifying image and the
//!   scan moves on; the fault is only reported through logs and the
//!   progress callback.
//!
//! Every fatal error falls into one of the [`ErrorKind`] buckets so hosts can
//! map failures without matching on individual variants.

use std::path::PathBuf;
use thiserror::Error;

/// Coarse classification of a [`PicSelectError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Parameters were missing or malformed; no document was opened.
    Validation,
    /// A path input does not reference an existing file.
    NotFound,
    /// The document could not be obtained, opened or parsed.
    Open,
    /// Unexpected failure inside the library itself.
    Internal,
}

/// All fatal errors returned by the pdf-pic-select library.
///
/// Per-page failures use [`PageFault`] and never surface here.
#[derive(Debug, Error)]
pub enum PicSelectError {
    // ── Validation errors ─────────────────────────────────────────────────
    /// Neither an upload nor a non-empty path/URL was supplied.
    #[error("Parameter `pdf_file` is required and must be a PDF upload.")]
    MissingInput,

    /// A threshold could not be coerced to an integer.
    #[error("`min_width` and `min_height` must be integers. Got {name} = {value}")]
    InvalidThreshold { name: &'static str, value: String },

    /// A threshold parsed but was zero or negative.
    #[error("`min_width` and `min_height` must be positive. Got {name} = {value}")]
    NonPositiveThreshold { name: &'static str, value: i64 },

    /// The raw parameter bag could not be parsed.
    #[error("Invalid tool parameters: {0}")]
    InvalidParameters(String),

    // ── Not-found errors ──────────────────────────────────────────────────
    /// Path input does not reference an existing regular file.
    #[error("PDF file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    // ── Open / parse errors ───────────────────────────────────────────────
    /// The bytes were read, but they are not a PDF.
    #[error("Failed to open PDF: '{source_name}' is not a PDF document (first bytes: {magic:?})")]
    NotAPdf { source_name: String, magic: Vec<u8> },

    /// pdfium refused to open or parse the document.
    #[error("Failed to open PDF '{source_name}': {detail}")]
    OpenFailed { source_name: String, detail: String },

    /// The document is encrypted and no password was configured.
    #[error("Failed to open PDF '{source_name}': document is encrypted and requires a password")]
    PasswordRequired { source_name: String },

    /// A password was configured but pdfium rejected it.
    #[error("Failed to open PDF '{source_name}': wrong password")]
    WrongPassword { source_name: String },

    /// Remote input could not be fetched.
    #[error("Failed to download '{url}': {reason}")]
    DownloadFailed { url: String, reason: String },

    /// Remote input fetch exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'")]
    DownloadTimeout { url: String, secs: u64 },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
PDFium is normally downloaded automatically on first run.\n\
If the auto-download failed, you can:\n\
  • Check your internet connection and try again.\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium to use an existing copy.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PicSelectError {
    /// Which failure bucket this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PicSelectError::MissingInput
            | PicSelectError::InvalidThreshold { .. }
            | PicSelectError::NonPositiveThreshold { .. }
            | PicSelectError::InvalidParameters(_)
            | PicSelectError::InvalidConfig(_) => ErrorKind::Validation,
            PicSelectError::FileNotFound { .. } => ErrorKind::NotFound,
            PicSelectError::NotAPdf { .. }
            | PicSelectError::OpenFailed { .. }
            | PicSelectError::PasswordRequired { .. }
            | PicSelectError::WrongPassword { .. }
            | PicSelectError::DownloadFailed { .. }
            | PicSelectError::DownloadTimeout { .. }
            | PicSelectError::PdfiumBindingFailed(_) => ErrorKind::Open,
            PicSelectError::Internal(_) => ErrorKind::Internal,
        }
    }
}

/// A non-fatal error for a single page.
///
/// The page is flagged as having no qualifying image; the scan continues.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum PageFault {
    /// The page itself could not be loaded.
    #[error("Page {page}: failed to load: {detail}")]
    LoadFailed { page: usize, detail: String },

    /// The page loaded but its embedded images could not be enumerated.
    #[error("Page {page}: image enumeration failed: {detail}")]
    EnumerationFailed { page: usize, detail: String },
}

impl PageFault {
    /// 1-indexed page number this fault refers to.
    pub fn page(&self) -> usize {
        match self {
            PageFault::LoadFailed { page, .. } | PageFault::EnumerationFailed { page, .. } => *page,
        }
    }
}
