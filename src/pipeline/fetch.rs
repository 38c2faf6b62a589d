//! Remote inputs: fetch a PDF served over HTTP(S) into memory.
//!
//! pdfium can open a document straight from a byte buffer, so nothing is
//! written to disk. The `%PDF` header check happens later, in
//! [`crate::pipeline::open`], for fetched and uploaded bytes alike.

use crate::error::PicSelectError;
use std::time::Duration;
use tracing::{debug, info};

/// Download `url` and return the response body.
pub async fn fetch_pdf(url: &str, timeout_secs: u64) -> Result<Vec<u8>, PicSelectError> {
    info!("Downloading PDF from: {}", url);

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| PicSelectError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| map_request_error(url, timeout_secs, e))?;

    if !response.status().is_success() {
        return Err(PicSelectError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| map_request_error(url, timeout_secs, e))?;

    debug!("Downloaded {} bytes from {}", bytes.len(), url);
    Ok(bytes.to_vec())
}

fn map_request_error(url: &str, timeout_secs: u64, e: reqwest::Error) -> PicSelectError {
    if e.is_timeout() {
        PicSelectError::DownloadTimeout {
            url: url.to_string(),
            secs: timeout_secs,
        }
    } else {
        PicSelectError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        }
    }
}
