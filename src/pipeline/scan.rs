//! Page image scanning: classify every page by its largest-enough image.
//!
//! The scanner only knows the [`PageImageSource`] contract — page count plus
//! a per-page walk over embedded images with their intrinsic pixel metadata.
//! The pdfium backend lives in [`crate::pipeline::open`]; tests drive the
//! scanner with in-memory sources.
//!
//! ## Failure policy
//!
//! Nothing below the document level aborts the scan:
//!
//! * a page whose images cannot be enumerated is flagged `0`;
//! * an image whose metadata cannot be extracted is skipped;
//! * an image without a width or height is skipped.
//!
//! A page is flagged `1` as soon as one image reaches the threshold area, and
//! the source is told to stop extracting the rest of that page.

use crate::config::Thresholds;
use crate::error::PageFault;
use crate::progress::ScanProgressCallback;
use serde::{Deserialize, Serialize};
use std::ops::ControlFlow;
use tracing::{debug, info, warn};

/// Document-scoped reference to one embedded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageRef {
    /// 0-indexed page the image was found on.
    pub page_index: usize,
    /// Position of the image object within that page.
    pub object_index: usize,
}

/// Intrinsic pixel metadata as stored in the document.
///
/// Independent of how the image is scaled or cropped on the page. Either
/// dimension may be unknown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageMetadata {
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl ImageMetadata {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
        }
    }
}

/// One embedded image together with the result of extracting its metadata.
#[derive(Debug, Clone)]
pub struct ImageProbe {
    pub reference: ImageRef,
    pub metadata: Result<ImageMetadata, String>,
}

/// The PDF collaborator contract the scanner depends on.
pub trait PageImageSource {
    /// Number of pages in the open document.
    fn page_count(&self) -> usize;

    /// Walk the embedded images of page `page_index` (0-indexed).
    ///
    /// Each image is handed to `visitor` in document order. When the visitor
    /// returns [`ControlFlow::Break`], the source must stop and not extract
    /// any further images on that page.
    ///
    /// # Errors
    /// A [`PageFault`] when the page's images cannot be enumerated.
    fn visit_page_images(
        &self,
        page_index: usize,
        visitor: &mut dyn FnMut(ImageProbe) -> ControlFlow<()>,
    ) -> Result<(), PageFault>;
}

/// Classification of a single page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageVerdict {
    /// 1-indexed page number.
    pub page_num: usize,
    /// Whether a qualifying image was found.
    pub has_image: bool,
    /// Images examined before the verdict was reached.
    pub images_seen: usize,
    /// Images skipped because extraction failed or metadata was incomplete.
    pub images_skipped: usize,
    /// Set when enumeration failed; the page is then flagged 0.
    pub fault: Option<String>,
}

/// Per-page verdicts for a whole document, in page order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanOutcome {
    pub verdicts: Vec<PageVerdict>,
}

impl ScanOutcome {
    /// Number of pages scanned.
    pub fn total_pages(&self) -> usize {
        self.verdicts.len()
    }

    /// 1-indexed page numbers with a qualifying image, ascending.
    pub fn pages_with_images(&self) -> Vec<usize> {
        self.verdicts
            .iter()
            .filter(|v| v.has_image)
            .map(|v| v.page_num)
            .collect()
    }

    /// One `0`/`1` flag per page, page order.
    pub fn page_image_flags(&self) -> Vec<u8> {
        self.verdicts.iter().map(|v| u8::from(v.has_image)).collect()
    }

    /// Pages whose enumeration failed.
    pub fn faulted_pages(&self) -> usize {
        self.verdicts.iter().filter(|v| v.fault.is_some()).count()
    }
}

/// Classify every page of `source` against `thresholds`.
pub fn scan_document(
    source: &dyn PageImageSource,
    thresholds: Thresholds,
    progress: Option<&dyn ScanProgressCallback>,
) -> ScanOutcome {
    let total_pages = source.page_count();
    info!(
        "Scanning {} pages for images of at least {} ({} px²)",
        total_pages,
        thresholds,
        thresholds.min_area()
    );

    if let Some(cb) = progress {
        cb.on_scan_start(total_pages);
    }

    let mut verdicts = Vec::with_capacity(total_pages);

    for page_index in 0..total_pages {
        let verdict = scan_page(source, page_index, thresholds);

        if let Some(cb) = progress {
            if let Some(ref fault) = verdict.fault {
                cb.on_page_error(verdict.page_num, total_pages, fault);
            }
            cb.on_page_scanned(verdict.page_num, total_pages, &verdict);
        }

        verdicts.push(verdict);
    }

    let outcome = ScanOutcome { verdicts };
    let matched = outcome.verdicts.iter().filter(|v| v.has_image).count();

    info!(
        "Scan complete: {}/{} pages with qualifying images ({} faulted)",
        matched,
        total_pages,
        outcome.faulted_pages()
    );

    if let Some(cb) = progress {
        cb.on_scan_complete(total_pages, matched);
    }

    outcome
}

/// Classify a single page.
fn scan_page(source: &dyn PageImageSource, page_index: usize, thresholds: Thresholds) -> PageVerdict {
    let page_num = page_index + 1;
    let mut verdict = PageVerdict {
        page_num,
        ..Default::default()
    };

    let walked = source.visit_page_images(page_index, &mut |probe: ImageProbe| {
        verdict.images_seen += 1;

        let metadata = match probe.metadata {
            Ok(m) => m,
            Err(detail) => {
                debug!(
                    "Page {}: skipping image {:?}: extraction failed: {}",
                    page_num, probe.reference, detail
                );
                verdict.images_skipped += 1;
                return ControlFlow::Continue(());
            }
        };

        let (Some(width), Some(height)) = (metadata.width, metadata.height) else {
            debug!(
                "Page {}: skipping image {:?}: missing dimensions",
                page_num, probe.reference
            );
            verdict.images_skipped += 1;
            return ControlFlow::Continue(());
        };

        if thresholds.admits(width, height) {
            debug!(
                "Page {}: image {:?} qualifies at {}x{}",
                page_num, probe.reference, width, height
            );
            verdict.has_image = true;
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    });

    if let Err(fault) = walked {
        warn!("{}; treating page as having no qualifying image", fault);
        verdict.has_image = false;
        verdict.fault = Some(fault.to_string());
    }

    verdict
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// What a fake page holds.
    #[derive(Debug, Clone)]
    pub(crate) enum FakePage {
        Images(Vec<Result<ImageMetadata, String>>),
        Broken(String),
    }

    /// In-memory [`PageImageSource`] that records how many images were
    /// actually extracted.
    pub(crate) struct FakeDocument {
        pub(crate) pages: Vec<FakePage>,
        pub(crate) extracted: AtomicUsize,
    }

    impl FakeDocument {
        pub(crate) fn new(pages: Vec<FakePage>) -> Self {
            Self {
                pages,
                extracted: AtomicUsize::new(0),
            }
        }

        /// Pages each holding a single image of the given size (or none).
        pub(crate) fn single_images(sizes: &[Option<(u32, u32)>]) -> Self {
            Self::new(
                sizes
                    .iter()
                    .map(|s| match s {
                        Some((w, h)) => FakePage::Images(vec![Ok(ImageMetadata::new(*w, *h))]),
                        None => FakePage::Images(vec![]),
                    })
                    .collect(),
            )
        }
    }

    impl PageImageSource for FakeDocument {
        fn page_count(&self) -> usize {
            self.pages.len()
        }

        fn visit_page_images(
            &self,
            page_index: usize,
            visitor: &mut dyn FnMut(ImageProbe) -> ControlFlow<()>,
        ) -> Result<(), PageFault> {
            match &self.pages[page_index] {
                FakePage::Broken(detail) => Err(PageFault::EnumerationFailed {
                    page: page_index + 1,
                    detail: detail.clone(),
                }),
                FakePage::Images(images) => {
                    for (object_index, metadata) in images.iter().enumerate() {
                        self.extracted.fetch_add(1, Ordering::SeqCst);
                        let probe = ImageProbe {
                            reference: ImageRef {
                                page_index,
                                object_index,
                            },
                            metadata: metadata.clone(),
                        };
                        if visitor(probe).is_break() {
                            break;
                        }
                    }
                    Ok(())
                }
            }
        }
    }

    fn flags(doc: &FakeDocument, t: Thresholds) -> Vec<u8> {
        scan_document(doc, t, None).page_image_flags()
    }

    #[test]
    fn three_page_scenario() {
        let doc = FakeDocument::single_images(&[Some((300, 100)), None, Some((100, 50))]);
        let outcome = scan_document(&doc, Thresholds::default(), None);

        assert_eq!(outcome.total_pages(), 3);
        assert_eq!(outcome.pages_with_images(), vec![1]);
        assert_eq!(outcome.page_image_flags(), vec![1, 0, 0]);
    }

    #[test]
    fn page_without_images_is_flagged_zero() {
        let doc = FakeDocument::single_images(&[None, None]);
        assert_eq!(flags(&doc, Thresholds::new(1, 1).unwrap()), vec![0, 0]);
    }

    #[test]
    fn area_rule_admits_wide_short_images() {
        // 1000x20 = 20000 >= 16800 although 20 < 70.
        let doc = FakeDocument::single_images(&[Some((1000, 20)), Some((239, 70))]);
        assert_eq!(flags(&doc, Thresholds::default()), vec![1, 0]);
    }

    #[test]
    fn exact_area_qualifies() {
        let doc = FakeDocument::single_images(&[Some((240, 70)), Some((70, 240))]);
        assert_eq!(flags(&doc, Thresholds::default()), vec![1, 1]);
    }

    #[test]
    fn enumeration_failure_flags_zero_and_continues() {
        let doc = FakeDocument::new(vec![
            FakePage::Broken("xref damaged".into()),
            FakePage::Images(vec![Ok(ImageMetadata::new(500, 500))]),
        ]);
        let outcome = scan_document(&doc, Thresholds::default(), None);

        assert_eq!(outcome.page_image_flags(), vec![0, 1]);
        assert_eq!(outcome.faulted_pages(), 1);
        assert!(outcome.verdicts[0]
            .fault
            .as_deref()
            .unwrap()
            .contains("xref damaged"));
    }

    #[test]
    fn extraction_failure_skips_only_that_image() {
        let doc = FakeDocument::new(vec![FakePage::Images(vec![
            Err("bad stream".into()),
            Ok(ImageMetadata::new(400, 100)),
        ])]);
        let outcome = scan_document(&doc, Thresholds::default(), None);

        assert_eq!(outcome.page_image_flags(), vec![1]);
        assert_eq!(outcome.verdicts[0].images_skipped, 1);
        assert_eq!(outcome.verdicts[0].images_seen, 2);
    }

    #[test]
    fn missing_dimensions_are_skipped() {
        let doc = FakeDocument::new(vec![FakePage::Images(vec![
            Ok(ImageMetadata {
                width: Some(10_000),
                height: None,
            }),
            Ok(ImageMetadata {
                width: None,
                height: Some(10_000),
            }),
        ])]);
        let outcome = scan_document(&doc, Thresholds::default(), None);

        assert_eq!(outcome.page_image_flags(), vec![0]);
        assert_eq!(outcome.verdicts[0].images_skipped, 2);
    }

    #[test]
    fn short_circuits_after_first_qualifying_image() {
        let doc = FakeDocument::new(vec![FakePage::Images(vec![
            Ok(ImageMetadata::new(10, 10)),
            Ok(ImageMetadata::new(600, 600)),
            Ok(ImageMetadata::new(700, 700)),
            Err("never reached".into()),
        ])]);
        let outcome = scan_document(&doc, Thresholds::default(), None);

        assert_eq!(outcome.page_image_flags(), vec![1]);
        assert_eq!(doc.extracted.load(Ordering::SeqCst), 2);
        assert_eq!(outcome.verdicts[0].images_seen, 2);
    }

    #[test]
    fn raising_thresholds_only_unflags_pages() {
        let doc = FakeDocument::single_images(&[
            Some((300, 100)),
            Some((240, 70)),
            Some((1000, 20)),
            Some((50, 50)),
            None,
        ]);
        let ladder = [(1, 1), (100, 50), (240, 70), (241, 70), (300, 100), (1000, 1000)];

        let mut previous: Option<Vec<u8>> = None;
        for (w, h) in ladder {
            let current = flags(&doc, Thresholds::new(w, h).unwrap());
            if let Some(prev) = previous {
                for (p, c) in prev.iter().zip(&current) {
                    assert!(c <= p, "page went 0 → 1 when raising to {w}x{h}");
                }
            }
            previous = Some(current);
        }
    }

    #[test]
    fn flags_and_pages_agree() {
        let doc = FakeDocument::new(vec![
            FakePage::Images(vec![Ok(ImageMetadata::new(900, 900))]),
            FakePage::Broken("boom".into()),
            FakePage::Images(vec![]),
            FakePage::Images(vec![Err("x".into()), Ok(ImageMetadata::new(300, 300))]),
        ]);
        let outcome = scan_document(&doc, Thresholds::default(), None);
        let flags = outcome.page_image_flags();
        let pages = outcome.pages_with_images();

        assert_eq!(flags.len(), doc.page_count());
        assert_eq!(
            pages.len(),
            flags.iter().map(|&f| usize::from(f)).sum::<usize>()
        );
        assert_eq!(pages, vec![1, 4]);
    }

    #[test]
    fn empty_document_yields_empty_outcome() {
        let doc = FakeDocument::new(vec![]);
        let outcome = scan_document(&doc, Thresholds::default(), None);
        assert_eq!(outcome.total_pages(), 0);
        assert!(outcome.page_image_flags().is_empty());
    }

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
    }

    impl ScanProgressCallback for Recorder {
        fn on_scan_start(&self, total_pages: usize) {
            self.events.lock().unwrap().push(format!("start {total_pages}"));
        }

        fn on_page_scanned(&self, page_num: usize, _total: usize, verdict: &PageVerdict) {
            self.events
                .lock()
                .unwrap()
                .push(format!("page {page_num} {}", u8::from(verdict.has_image)));
        }

        fn on_page_error(&self, page_num: usize, _total: usize, _error: &str) {
            self.events.lock().unwrap().push(format!("error {page_num}"));
        }

        fn on_scan_complete(&self, total_pages: usize, matched_pages: usize) {
            self.events
                .lock()
                .unwrap()
                .push(format!("done {matched_pages}/{total_pages}"));
        }
    }

    #[test]
    fn progress_events_follow_page_order() {
        let doc = FakeDocument::new(vec![
            FakePage::Images(vec![Ok(ImageMetadata::new(300, 100))]),
            FakePage::Broken("boom".into()),
        ]);
        let recorder = Recorder::default();
        scan_document(&doc, Thresholds::default(), Some(&recorder));

        let events = recorder.events.lock().unwrap().clone();
        assert_eq!(
            events,
            vec!["start 2", "page 1 1", "error 2", "page 2 0", "done 1/2"]
        );
    }
}
