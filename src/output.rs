//! Output types produced by a classification run.

use serde::{Deserialize, Serialize};

/// The single record a classification produces.
///
/// Field names are part of the host contract; the record is emitted as-is
/// as the tool's JSON message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationOutput {
    /// 1-indexed pages holding at least one qualifying image, ascending.
    pub pages_with_images: Vec<usize>,
    /// 1-indexed pages without one; the complement of `pages_with_images`.
    pub pages_with_no_images: Vec<usize>,
    /// `pages_with_images.len()`.
    pub matched_pages_count: usize,
    /// Pages in the document.
    pub total_pages: usize,
    /// Effective minimum width.
    pub min_width: u32,
    /// Effective minimum height.
    pub min_height: u32,
    /// One `0`/`1` flag per page, page order.
    pub page_image_flags: Vec<u8>,
    /// Filename, URL or path of the input; `null` when unknown.
    pub source: Option<String>,
}

impl ClassificationOutput {
    /// Whether any page qualified.
    pub fn any_matched(&self) -> bool {
        self.matched_pages_count > 0
    }
}
