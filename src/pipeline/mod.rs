//! Pipeline stages for page classification.
//!
//! Each submodule implements exactly one step, so each can be tested on its
//! own and the PDF backend can change without touching the others.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ (fetch) ──▶ open ──▶ scan ──▶ aggregate
//! (shape)   (HTTP)     (pdfium)  (images)  (record)
//! ```
//!
//! 1. [`input`]     — collapse upload / mapping / string into bytes, a path
//!    or a remote file; pure
//! 2. [`fetch`]     — download remote inputs into memory
//! 3. [`open`]      — existence and header checks, then open via pdfium;
//!    runs on a blocking thread because pdfium is not async-safe
//! 4. [`scan`]      — per-page, per-image area test against the thresholds
//! 5. [`aggregate`] — complement, counts and the final record

pub mod aggregate;
pub mod fetch;
pub mod input;
pub mod open;
pub mod scan;
