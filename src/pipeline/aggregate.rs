//! Result aggregation: fold per-page verdicts into the output record.

use crate::config::Thresholds;
use crate::output::ClassificationOutput;
use crate::pipeline::scan::ScanOutcome;
use std::collections::BTreeSet;

/// Assemble the classification record for a finished scan.
///
/// `pages_with_no_images` is derived as the complement of the qualifying
/// pages over `1..=total_pages`, so the two lists always partition the
/// document.
pub fn aggregate(
    outcome: &ScanOutcome,
    thresholds: Thresholds,
    source: Option<String>,
) -> ClassificationOutput {
    let total_pages = outcome.total_pages();
    let pages_with_images = outcome.pages_with_images();

    let matched: BTreeSet<usize> = pages_with_images.iter().copied().collect();
    let pages_with_no_images: Vec<usize> = (1..=total_pages)
        .filter(|p| !matched.contains(p))
        .collect();

    ClassificationOutput {
        matched_pages_count: pages_with_images.len(),
        pages_with_images,
        pages_with_no_images,
        total_pages,
        min_width: thresholds.min_width,
        min_height: thresholds.min_height,
        page_image_flags: outcome.page_image_flags(),
        source,
    }
}
