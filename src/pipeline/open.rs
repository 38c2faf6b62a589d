//! Document opening: turn resolved bytes or a path into an open pdfium
//! document that the scanner can walk.
//!
//! ## Lifecycle
//!
//! [`PdfiumDocument`] owns the pdfium `PdfDocument`, whose destructor closes
//! the underlying `FPDF_DOCUMENT`. Holding it by value in the blocking scan
//! function means the handle is released exactly once, whether the scan
//! finishes, returns early or unwinds.
//!
//! ## Cheap checks first
//!
//! Path existence and the `%PDF` header are checked before pdfium is even
//! bound, so the common user mistakes (typo in a path, uploading a `.docx`)
//! fail fast with a precise error and without touching the native library.

use crate::error::{PageFault, PicSelectError};
use crate::pipeline::scan::{ImageMetadata, ImageProbe, ImageRef, PageImageSource};
use pdfium_render::prelude::*;
use std::io::Read;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// How far into the data the `%PDF` marker may appear.
const HEADER_WINDOW: usize = 1024;

/// A document ready to be handed to pdfium.
pub enum DocumentSource {
    /// In-memory bytes (uploads and downloads).
    Bytes { data: Vec<u8>, name: String },
    /// A local regular file.
    File(PathBuf),
}

impl DocumentSource {
    /// Human-readable identifier used in error messages.
    pub fn name(&self) -> String {
        match self {
            DocumentSource::Bytes { name, .. } => name.clone(),
            DocumentSource::File(path) => path.display().to_string(),
        }
    }
}

/// Validate that `path` names an existing regular file.
pub fn locate(path: &str) -> Result<PathBuf, PicSelectError> {
    let path = PathBuf::from(path);
    match std::fs::metadata(&path) {
        Ok(meta) if meta.is_file() => {
            debug!("Resolved local PDF: {}", path.display());
            Ok(path)
        }
        _ => Err(PicSelectError::FileNotFound { path }),
    }
}

/// Reject data that does not carry a `%PDF` header.
pub fn check_header(source: &DocumentSource) -> Result<(), PicSelectError> {
    let head = match source {
        DocumentSource::Bytes { data, .. } => data[..data.len().min(HEADER_WINDOW)].to_vec(),
        DocumentSource::File(path) => read_head(path)?,
    };

    if has_pdf_header(&head) {
        Ok(())
    } else {
        Err(PicSelectError::NotAPdf {
            source_name: source.name(),
            magic: head.iter().take(4).copied().collect(),
        })
    }
}

fn read_head(path: &Path) -> Result<Vec<u8>, PicSelectError> {
    let open_failed = |e: std::io::Error| PicSelectError::OpenFailed {
        source_name: path.display().to_string(),
        detail: e.to_string(),
    };

    let file = std::fs::File::open(path).map_err(open_failed)?;
    let mut head = Vec::with_capacity(HEADER_WINDOW);
    file.take(HEADER_WINDOW as u64)
        .read_to_end(&mut head)
        .map_err(open_failed)?;
    Ok(head)
}

/// Whether `head` contains the `%PDF` marker.
pub fn has_pdf_header(head: &[u8]) -> bool {
    head.windows(4).any(|w| w == b"%PDF")
}

/// Bind to the pdfium shared library, downloading it on first use.
pub fn bind_pdfium() -> Result<Pdfium, PicSelectError> {
    pdfium_auto::bind_pdfium_silent().map_err(|e| PicSelectError::PdfiumBindingFailed(e.to_string()))
}

/// An open pdfium document; closed when dropped.
pub struct PdfiumDocument<'a> {
    document: PdfDocument<'a>,
    name: String,
}

impl<'a> PdfiumDocument<'a> {
    /// Identifier of the opened document.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for PdfiumDocument<'_> {
    fn drop(&mut self) {
        debug!("Closing PDF: {}", self.name);
    }
}

/// Open `source` with pdfium.
///
/// # Errors
/// Any pdfium failure becomes a single open error carrying the cause;
/// password problems are reported as such.
pub fn open_document<'a>(
    pdfium: &'a Pdfium,
    source: DocumentSource,
    password: Option<&'a str>,
) -> Result<PdfiumDocument<'a>, PicSelectError> {
    let name = source.name();

    let loaded = match source {
        DocumentSource::Bytes { data, .. } => pdfium.load_pdf_from_byte_vec(data, password),
        DocumentSource::File(path) => pdfium.load_pdf_from_file(&path, password),
    };

    let document = loaded.map_err(|e| map_open_error(&name, password, e))?;
    info!("PDF opened: {} ({} pages)", name, document.pages().len());

    Ok(PdfiumDocument { document, name })
}

fn map_open_error(name: &str, password: Option<&str>, e: PdfiumError) -> PicSelectError {
    let err_str = format!("{:?}", e);
    if err_str.contains("Password") || err_str.contains("password") {
        if password.is_some() {
            PicSelectError::WrongPassword {
                source_name: name.to_string(),
            }
        } else {
            PicSelectError::PasswordRequired {
                source_name: name.to_string(),
            }
        }
    } else {
        PicSelectError::OpenFailed {
            source_name: name.to_string(),
            detail: err_str,
        }
    }
}

impl PageImageSource for PdfiumDocument<'_> {
    fn page_count(&self) -> usize {
        self.document.pages().len() as usize
    }

    fn visit_page_images(
        &self,
        page_index: usize,
        visitor: &mut dyn FnMut(ImageProbe) -> ControlFlow<()>,
    ) -> Result<(), PageFault> {
        let page = self
            .document
            .pages()
            .get(page_index as PdfPageIndex)
            .map_err(|e| PageFault::LoadFailed {
                page: page_index + 1,
                detail: format!("{:?}", e),
            })?;

        let objects = page.objects();
        let mut ordinal = 0;

        walk_objects(
            page_index,
            objects.len(),
            &|i| objects.get(i),
            &mut ordinal,
            visitor,
        )?;

        Ok(())
    }
}

/// Depth-first walk over a list of page objects, descending into Form
/// XObjects. Returns `Break` once the visitor asks to stop, at any depth.
///
/// `ordinal` numbers every object visited on the page, nested ones included.
fn walk_objects<'a>(
    page_index: usize,
    len: usize,
    get: &dyn Fn(usize) -> Result<PdfPageObject<'a>, PdfiumError>,
    ordinal: &mut usize,
    visitor: &mut dyn FnMut(ImageProbe) -> ControlFlow<()>,
) -> Result<ControlFlow<()>, PageFault> {
    for index in 0..len {
        let object_index = *ordinal;
        *ordinal += 1;

        let object = get(index).map_err(|e| PageFault::EnumerationFailed {
            page: page_index + 1,
            detail: format!("object {}: {:?}", object_index, e),
        })?;

        if let Some(image) = object.as_image_object() {
            let probe = ImageProbe {
                reference: ImageRef {
                    page_index,
                    object_index,
                },
                metadata: intrinsic_metadata(image),
            };
            if visitor(probe).is_break() {
                return Ok(ControlFlow::Break(()));
            }
        } else if let Some(form) = object.as_x_object_form_object() {
            let nested = walk_objects(page_index, form.len(), &|i| form.get(i), ordinal, visitor)?;
            if nested.is_break() {
                return Ok(ControlFlow::Break(()));
            }
        }
    }

    Ok(ControlFlow::Continue(()))
}

/// Native pixel size of an image object, from the image stream's metadata
/// rather than its on-page bounds. Non-positive dimensions count as missing.
fn intrinsic_metadata(image: &PdfPageImageObject) -> Result<ImageMetadata, String> {
    let width = image.width().map_err(|e| format!("{:?}", e))?;
    let height = image.height().map_err(|e| format!("{:?}", e))?;

    Ok(ImageMetadata {
        width: u32::try_from(width).ok().filter(|w| *w > 0),
        height: u32::try_from(height).ok().filter(|h| *h > 0),
    })
}
