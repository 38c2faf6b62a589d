//! Input resolution: normalise whatever the host handed us into PDF bytes or
//! a location.
//!
//! Hosts are inconsistent about how an uploaded document arrives: a typed
//! file object with its bytes attached, a JSON mapping that follows the
//! host's file schema, a mapping with a bare `path` / `url`, or a plain
//! string. [`PdfInput`] makes those shapes explicit and [`resolve`] collapses
//! them, in that priority order, into a [`ResolvedInput`]. Resolution is pure:
//! nothing is read from disk or fetched here.

use crate::error::PicSelectError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

/// Identity marker the host stamps on serialised file objects.
pub const HOST_FILE_IDENTITY: &str = "__dify__file__";

/// An uploaded file whose bytes are already in memory.
#[derive(Clone, Default)]
pub struct UploadedFile {
    pub blob: Vec<u8>,
    pub filename: Option<String>,
    pub url: Option<String>,
}

impl std::fmt::Debug for UploadedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadedFile")
            .field("blob", &format_args!("<{} bytes>", self.blob.len()))
            .field("filename", &self.filename)
            .field("url", &self.url)
            .finish()
    }
}

/// The host's serialised file schema.
///
/// Its bytes are not inline; they are served from `url`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostFile {
    #[serde(default)]
    pub dify_model_identity: Option<String>,
    pub url: String,
    #[serde(rename = "type")]
    pub file_type: String,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub extension: Option<String>,
    #[serde(default)]
    pub size: Option<i64>,
}

impl HostFile {
    /// Parse a mapping as a host file, if it matches the schema.
    pub fn from_mapping(map: &Map<String, Value>) -> Option<Self> {
        let file: HostFile = serde_json::from_value(Value::Object(map.clone())).ok()?;
        match file.dify_model_identity.as_deref() {
            Some(identity) if identity != HOST_FILE_IDENTITY => None,
            _ if file.url.trim().is_empty() => None,
            _ => Some(file),
        }
    }

    /// Filename when present, else the URL.
    pub fn display_name(&self) -> String {
        non_empty(self.filename.as_deref())
            .unwrap_or(&self.url)
            .to_string()
    }
}

/// One of the accepted input shapes.
#[derive(Debug, Clone)]
pub enum PdfInput {
    /// Typed file object carrying raw bytes.
    Upload(UploadedFile),
    /// JSON mapping: host file schema, or `path` / `url` keys.
    Mapping(Map<String, Value>),
    /// Bare path (or URL) string.
    Path(String),
}

impl PdfInput {
    /// Classify a raw JSON parameter value.
    ///
    /// Returns `None` for values that cannot describe a document at all
    /// (`null`, numbers, booleans, arrays).
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(PdfInput::Mapping(map.clone())),
            Value::String(s) => Some(PdfInput::Path(s.clone())),
            _ => None,
        }
    }
}

/// The outcome of input resolution.
#[derive(Clone)]
pub enum ResolvedInput {
    /// Document bytes already in memory.
    Bytes {
        data: Vec<u8>,
        display: Option<String>,
    },
    /// A local path, or an HTTP(S) URL supplied where a path was expected.
    Path(String),
    /// A host file whose bytes must be fetched from `url`.
    Remote { url: String, display: String },
}

impl ResolvedInput {
    /// The identifier reported as `source` in the classification output.
    pub fn source(&self) -> Option<String> {
        match self {
            ResolvedInput::Bytes { display, .. } => display.clone(),
            ResolvedInput::Path(p) => Some(p.clone()),
            ResolvedInput::Remote { display, .. } => Some(display.clone()),
        }
    }
}

impl std::fmt::Debug for ResolvedInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolvedInput::Bytes { data, display } => f
                .debug_struct("Bytes")
                .field("data", &format_args!("<{} bytes>", data.len()))
                .field("display", display)
                .finish(),
            ResolvedInput::Path(p) => f.debug_tuple("Path").field(p).finish(),
            ResolvedInput::Remote { url, display } => f
                .debug_struct("Remote")
                .field("url", url)
                .field("display", display)
                .finish(),
        }
    }
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Resolve an input descriptor to bytes, a path, or a remote file.
///
/// # Errors
/// [`PicSelectError::MissingInput`] when the descriptor yields neither bytes
/// nor a non-empty path.
pub fn resolve(input: &PdfInput) -> Result<ResolvedInput, PicSelectError> {
    let resolved = match input {
        PdfInput::Upload(file) => ResolvedInput::Bytes {
            data: file.blob.clone(),
            display: non_empty(file.filename.as_deref())
                .or(non_empty(file.url.as_deref()))
                .map(str::to_string),
        },
        PdfInput::Mapping(map) => match HostFile::from_mapping(map) {
            Some(file) => ResolvedInput::Remote {
                display: file.display_name(),
                url: file.url,
            },
            None => ResolvedInput::Path(mapping_path(map)),
        },
        PdfInput::Path(s) => ResolvedInput::Path(s.trim().to_string()),
    };

    if let ResolvedInput::Path(ref p) = resolved {
        if p.is_empty() {
            return Err(PicSelectError::MissingInput);
        }
    }

    debug!("Resolved input: {:?}", resolved);
    Ok(resolved)
}

/// `path` if set, else `url`, else empty; trimmed.
fn mapping_path(map: &Map<String, Value>) -> String {
    ["path", "url"]
        .iter()
        .filter_map(|key| map.get(*key))
        .find_map(|v| match v {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .unwrap_or_default()
        .trim()
        .to_string()
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.is_empty())
}
