//! Classification entry points.
//!
//! [`classify`] runs the whole pipeline for one invocation: validate the
//! parameters, obtain the document, scan it on a blocking thread, aggregate.
//! Validation always completes before any document is read, fetched or
//! opened, so a bad threshold never costs a download or a pdfium bind.

use crate::config::{ClassifierConfig, Thresholds};
use crate::error::PicSelectError;
use crate::output::ClassificationOutput;
use crate::pipeline::input::{self, ResolvedInput};
use crate::pipeline::open::{self, DocumentSource};
use crate::pipeline::scan::{self, PageImageSource, ScanOutcome};
use crate::pipeline::{aggregate, fetch};
use crate::progress::ProgressCallback;
use crate::tool::ToolParameters;
use std::time::Instant;
use tracing::{debug, info};

/// A validated request: where the document is and what to look for.
#[derive(Debug, Clone)]
pub struct ClassifyRequest {
    pub input: ResolvedInput,
    pub thresholds: Thresholds,
}

impl ClassifyRequest {
    /// Validate a parameter bag.
    ///
    /// Input resolution runs first, then threshold coercion; either failing
    /// is a validation error.
    pub fn from_params(params: &ToolParameters) -> Result<Self, PicSelectError> {
        let pdf_input = params.pdf_input().ok_or(PicSelectError::MissingInput)?;
        let input = input::resolve(&pdf_input)?;
        let thresholds =
            Thresholds::from_params(params.min_width.as_ref(), params.min_height.as_ref())?;
        Ok(Self { input, thresholds })
    }
}

/// Classify the pages of the PDF described by `params`.
///
/// # Errors
/// Validation, not-found and open errors (see [`crate::error::ErrorKind`]).
/// Per-page problems never surface here; they classify the page as having
/// no qualifying image.
pub async fn classify(
    params: &ToolParameters,
    config: &ClassifierConfig,
) -> Result<ClassificationOutput, PicSelectError> {
    let request = ClassifyRequest::from_params(params)?;
    classify_request(request, config).await
}

/// Synchronous wrapper around [`classify`].
///
/// Creates a temporary tokio runtime internally.
pub fn classify_sync(
    params: &ToolParameters,
    config: &ClassifierConfig,
) -> Result<ClassificationOutput, PicSelectError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| PicSelectError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(classify(params, config))
}

/// Classify an already-validated request.
pub async fn classify_request(
    request: ClassifyRequest,
    config: &ClassifierConfig,
) -> Result<ClassificationOutput, PicSelectError> {
    let start = Instant::now();
    let ClassifyRequest { input, thresholds } = request;
    let source_id = input.source();
    info!(
        "Classifying {} (min {})",
        source_id.as_deref().unwrap_or("<upload>"),
        thresholds
    );

    // ── Obtain the document ──────────────────────────────────────────────
    let document = match input {
        ResolvedInput::Bytes { data, display } => DocumentSource::Bytes {
            data,
            name: display.unwrap_or_else(|| "<upload>".to_string()),
        },
        ResolvedInput::Path(path) if input::is_url(&path) => DocumentSource::Bytes {
            data: fetch::fetch_pdf(&path, config.download_timeout_secs).await?,
            name: path,
        },
        ResolvedInput::Path(path) => DocumentSource::File(open::locate(&path)?),
        ResolvedInput::Remote { url, display } => DocumentSource::Bytes {
            data: fetch::fetch_pdf(&url, config.download_timeout_secs).await?,
            name: display,
        },
    };

    // ── Open + scan (pdfium is blocking and not async-safe) ──────────────
    let password = config.password.clone();
    let progress = config.progress_callback.clone();

    let outcome = tokio::task::spawn_blocking(move || {
        open_and_scan(document, thresholds, password.as_deref(), progress)
    })
    .await
    .map_err(|e| PicSelectError::Internal(format!("Scan task panicked: {}", e)))??;

    // ── Aggregate ────────────────────────────────────────────────────────
    let output = aggregate::aggregate(&outcome, thresholds, source_id);
    info!(
        "Classification complete: {}/{} pages matched in {}ms",
        output.matched_pages_count,
        output.total_pages,
        start.elapsed().as_millis()
    );
    Ok(output)
}

/// Scan and aggregate an already-open document.
///
/// Backend-agnostic: works with any [`PageImageSource`].
pub fn classify_document(
    document: &dyn PageImageSource,
    thresholds: Thresholds,
    source: Option<String>,
) -> ClassificationOutput {
    let outcome = scan::scan_document(document, thresholds, None);
    aggregate::aggregate(&outcome, thresholds, source)
}

/// Blocking half of a classification: header check, open, scan.
///
/// The pdfium document is dropped (and closed) before this returns, on
/// every path.
fn open_and_scan(
    source: DocumentSource,
    thresholds: Thresholds,
    password: Option<&str>,
    progress: Option<ProgressCallback>,
) -> Result<ScanOutcome, PicSelectError> {
    open::check_header(&source)?;

    let pdfium = open::bind_pdfium()?;
    let document = open::open_document(&pdfium, source, password)?;
    debug!("Scanning {} with {}", document.name(), thresholds);
    let outcome = scan::scan_document(&document, thresholds, progress.as_deref());
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::pipeline::scan::tests::FakeDocument;
    use serde_json::json;
    use std::io::Write;

    fn params(v: serde_json::Value) -> ToolParameters {
        serde_json::from_value(v).expect("valid parameter bag")
    }

    #[test]
    fn classify_document_three_page_scenario() {
        let doc = FakeDocument::single_images(&[Some((300, 100)), None, Some((100, 50))]);
        let out = classify_document(&doc, Thresholds::default(), Some("three.pdf".into()));

        assert_eq!(out.pages_with_images, vec![1]);
        assert_eq!(out.pages_with_no_images, vec![2, 3]);
        assert_eq!(out.matched_pages_count, 1);
        assert_eq!(out.total_pages, 3);
        assert_eq!(out.page_image_flags, vec![1, 0, 0]);
        assert_eq!((out.min_width, out.min_height), (240, 70));
    }

    #[test]
    fn request_validates_input_before_thresholds() {
        let err = ClassifyRequest::from_params(&params(json!({ "min_width": "abc" }))).unwrap_err();
        assert!(matches!(err, PicSelectError::MissingInput));
    }

    #[test]
    fn request_rejects_bad_threshold() {
        let err = ClassifyRequest::from_params(&params(json!({
            "pdf_path": "/definitely/not/here.pdf",
            "min_width": "abc"
        })))
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn request_defaults_thresholds() {
        let req = ClassifyRequest::from_params(&params(json!({ "pdf_path": "a.pdf" }))).unwrap();
        assert_eq!(req.thresholds, Thresholds::default());
        assert_eq!(req.input.source().as_deref(), Some("a.pdf"));
    }

    #[tokio::test]
    async fn bad_threshold_fails_before_touching_the_file() {
        // The path does not exist; the validation error must win.
        let err = classify(
            &params(json!({ "pdf_path": "/definitely/not/here.pdf", "min_height": -4 })),
            &ClassifierConfig::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, PicSelectError::NonPositiveThreshold { .. }));
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let err = classify(
            &params(json!({ "pdf_path": "/definitely/not/here.pdf" })),
            &ClassifierConfig::default(),
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn non_pdf_file_is_open_error() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"name,score\nalice,3\n").unwrap();

        let err = classify(
            &params(json!({ "pdf_path": { "path": tmp.path().to_str().unwrap() } })),
            &ClassifierConfig::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, PicSelectError::NotAPdf { .. }), "got: {err:?}");
        assert_eq!(err.kind(), ErrorKind::Open);
    }

    #[test]
    fn request_runs_on_any_runtime() {
        let req = ClassifyRequest {
            input: ResolvedInput::Bytes {
                data: b"GIF89a".to_vec(),
                display: Some("cat.gif".into()),
            },
            thresholds: Thresholds::default(),
        };
        let err = tokio_test::block_on(classify_request(req, &ClassifierConfig::default()))
            .unwrap_err();
        assert!(matches!(err, PicSelectError::NotAPdf { .. }), "got: {err:?}");
        assert!(err.to_string().contains("cat.gif"));
    }

    #[test]
    fn sync_wrapper_propagates_errors() {
        let err = classify_sync(&params(json!({})), &ClassifierConfig::default()).unwrap_err();
        assert!(matches!(err, PicSelectError::MissingInput));
    }
}
