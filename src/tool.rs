//! Plugin-host surface: the parameter bag the host sends and the message the
//! tool sends back.
//!
//! The host invokes the tool with a loosely typed JSON object and expects a
//! single JSON message in return. [`PicSelectTool`] is that adapter; all the
//! actual work is in [`crate::classify`].

use crate::classify::classify_sync;
use crate::config::ClassifierConfig;
use crate::error::PicSelectError;
use crate::pipeline::input::{PdfInput, UploadedFile};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Raw invocation parameters.
///
/// Values are kept as JSON so coercion (and its error reporting) stays in
/// one place: [`crate::pipeline::input`] and [`crate::config::Thresholds`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolParameters {
    /// Uploaded file object, mapping with `path` / `url`, or string.
    #[serde(default)]
    pub pdf_file: Option<Value>,
    /// Alternative to `pdf_file`; used when `pdf_file` is absent or empty.
    #[serde(default)]
    pub pdf_path: Option<Value>,
    #[serde(default)]
    pub min_width: Option<Value>,
    #[serde(default)]
    pub min_height: Option<Value>,
    /// A file object whose bytes the host already holds. Takes precedence
    /// over `pdf_file` / `pdf_path`; never (de)serialised.
    #[serde(skip)]
    pub upload: Option<UploadedFile>,
}

impl ToolParameters {
    /// Parameters for a local path or URL.
    pub fn from_path(path: impl Into<String>) -> Self {
        Self {
            pdf_path: Some(Value::String(path.into())),
            ..Default::default()
        }
    }

    /// Parameters for an in-memory upload.
    pub fn from_upload(upload: UploadedFile) -> Self {
        Self {
            upload: Some(upload),
            ..Default::default()
        }
    }

    /// Set the thresholds from typed values.
    pub fn with_thresholds(mut self, min_width: u32, min_height: u32) -> Self {
        self.min_width = Some(Value::from(min_width));
        self.min_height = Some(Value::from(min_height));
        self
    }

    /// Pick the input descriptor: the typed upload, else `pdf_file`, else
    /// `pdf_path`. Empty values (`""`, `{}`, `null`) fall through.
    pub fn pdf_input(&self) -> Option<PdfInput> {
        if let Some(ref upload) = self.upload {
            return Some(PdfInput::Upload(upload.clone()));
        }

        [self.pdf_file.as_ref(), self.pdf_path.as_ref()]
            .into_iter()
            .flatten()
            .find(|v| is_truthy(v))
            .and_then(PdfInput::from_value)
    }
}

fn is_truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Object(m) => !m.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Number(n) => n.as_f64() != Some(0.0),
    }
}

/// A message returned to the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message", rename_all = "snake_case")]
pub enum ToolMessage {
    Json(Value),
}

impl ToolMessage {
    /// The JSON payload.
    pub fn as_json(&self) -> &Value {
        match self {
            ToolMessage::Json(v) => v,
        }
    }
}

/// The page-image selection tool.
#[derive(Debug, Clone, Default)]
pub struct PicSelectTool {
    config: ClassifierConfig,
}

impl PicSelectTool {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    /// Run one classification and wrap the record as a JSON message.
    ///
    /// Blocks the calling thread; do not call from inside an async runtime
    /// (use [`crate::classify::classify`] there).
    pub fn invoke(&self, params: ToolParameters) -> Result<ToolMessage, PicSelectError> {
        let output = classify_sync(&params, &self.config)?;
        let value = serde_json::to_value(&output)
            .map_err(|e| PicSelectError::Internal(format!("Failed to serialise output: {}", e)))?;
        Ok(ToolMessage::Json(value))
    }

    /// Parse a raw JSON parameter bag, then [`invoke`](Self::invoke).
    pub fn invoke_json(&self, raw: &str) -> Result<ToolMessage, PicSelectError> {
        let params = parse_parameters(raw)?;
        debug!("Tool invoked with {:?}", params);
        self.invoke(params)
    }
}

/// Parse a JSON parameter bag.
pub fn parse_parameters(raw: &str) -> Result<ToolParameters, PicSelectError> {
    serde_json::from_str(raw).map_err(|e| PicSelectError::InvalidParameters(e.to_string()))
}
