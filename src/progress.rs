//! Progress-callback trait for per-page scan events.
//!
//! Inject an [`Arc<dyn ScanProgressCallback>`] via
//! [`crate::config::ClassifierConfigBuilder::progress_callback`] to receive
//! events as the scanner walks the document.
//!
//! # Example
//!
//! ```rust
//! use pdf_pic_select::{ClassifierConfig, PageVerdict, ScanProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct MatchCounter {
//!     matched: AtomicUsize,
//! }
//!
//! impl ScanProgressCallback for MatchCounter {
//!     fn on_page_scanned(&self, _page_num: usize, _total_pages: usize, verdict: &PageVerdict) {
//!         if verdict.has_image {
//!             self.matched.fetch_add(1, Ordering::SeqCst);
//!         }
//!     }
//! }
//!
//! let counter = Arc::new(MatchCounter { matched: AtomicUsize::new(0) });
//!
//! let config = ClassifierConfig::builder()
//!     .progress_callback(counter as Arc<dyn ScanProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::pipeline::scan::PageVerdict;
use std::sync::Arc;

/// Called by the scanner as it classifies each page.
///
/// The scan runs on a blocking thread, hence `Send + Sync`. All methods
/// default to no-ops so callers only override what they care about.
pub trait ScanProgressCallback: Send + Sync {
    /// Called once after the document is opened, before the first page.
    fn on_scan_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called after each page has been classified (including faulted pages).
    ///
    /// # Arguments
    /// * `page_num`    — 1-indexed page number
    /// * `total_pages` — total pages in the document
    /// * `verdict`     — the page's classification
    fn on_page_scanned(&self, page_num: usize, total_pages: usize, verdict: &PageVerdict) {
        let _ = (page_num, total_pages, verdict);
    }

    /// Called when a page's images could not be enumerated.
    ///
    /// Fired before `on_page_scanned` for the same page.
    fn on_page_error(&self, page_num: usize, total_pages: usize, error: &str) {
        let _ = (page_num, total_pages, error);
    }

    /// Called once after every page has been visited.
    fn on_scan_complete(&self, total_pages: usize, matched_pages: usize) {
        let _ = (total_pages, matched_pages);
    }
}

/// A no-op implementation; the default when no callback is configured.
pub struct NoopProgressCallback;

impl ScanProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ClassifierConfig`].
pub type ProgressCallback = Arc<dyn ScanProgressCallback>;
