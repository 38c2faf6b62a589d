//! # pdf-pic-select
//!
//! Classify the pages of a PDF by whether they embed an image of at least a
//! minimum pixel area.
//!
//! A page "has an image" when one of its embedded images satisfies
//! `width * height >= min_width * min_height`, measured on the image's
//! intrinsic pixel size (not its on-page scale). Defaults are 240 × 70.
//!
//! ## Pipeline Overview
//!
//! ```text
//! ToolParameters
//!  │
//!  ├─ 1. Input      upload / {path,url} mapping / host file / string
//!  ├─ 2. Validate   thresholds coerced to positive integers
//!  ├─ 3. Open       header check, then pdfium (spawn_blocking)
//!  ├─ 4. Scan       per page, per image, area test; bad pages → 0
//!  └─ 5. Aggregate  pages_with_images / pages_with_no_images / flags
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf_pic_select::{classify, ClassifierConfig, ToolParameters};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let params = ToolParameters::from_path("brochure.pdf").with_thresholds(300, 100);
//!     let output = classify(&params, &ClassifierConfig::default()).await?;
//!     println!("pages with images: {:?}", output.pages_with_images);
//!     println!("flags: {:?}", output.page_image_flags);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf-pic-select` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod classify;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod tool;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use classify::{classify, classify_document, classify_request, classify_sync, ClassifyRequest};
pub use config::{ClassifierConfig, ClassifierConfigBuilder, Thresholds};
pub use error::{ErrorKind, PageFault, PicSelectError};
pub use output::ClassificationOutput;
pub use pipeline::input::{PdfInput, ResolvedInput, UploadedFile};
pub use pipeline::scan::{ImageMetadata, ImageProbe, ImageRef, PageImageSource, PageVerdict};
pub use progress::{NoopProgressCallback, ProgressCallback, ScanProgressCallback};
pub use tool::{PicSelectTool, ToolMessage, ToolParameters};
