//! Error types for the pdf2form library.
//!
//! A single [`FormAgentError`] enum covers every failure mode, but the
//! variants fall into two propagation classes:
//!
//! * **Fatal at the CLI boundary** — [`FormAgentError::Extraction`] and
//!   [`FormAgentError::MissingInputFile`]: the operation cannot proceed,
//!   the binary prints one human-readable line and exits.
//!
//! * **Recoverable by the caller** — [`FormAgentError::Transport`] during a
//!   chat exchange is converted into a printed error line so the interactive
//!   loop continues, and [`FormAgentError::MalformedModelOutput`] during
//!   extraction is embedded into the result as an explicit `{"error": …}`
//!   value instead of discarding the model's text.
//!
//! [`FormAgentError::MalformedModelOutput`] keeps the full raw completion so
//! callers can log or inspect exactly what the model said.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the pdf2form library.
#[derive(Debug, Error)]
pub enum FormAgentError {
    // ── Transport errors ──────────────────────────────────────────────────
    /// The model invocation failed — network, auth, throttling, or a
    /// response body that does not match the invocation contract.
    #[error("Model invocation failed: {detail}\nCheck AWS credentials and that the model is enabled in this region.")]
    Transport { detail: String },

    // ── Extraction errors ─────────────────────────────────────────────────
    /// The PDF could not be read or its text could not be extracted.
    #[error("Failed to extract text from '{path}': {detail}")]
    Extraction { path: PathBuf, detail: String },

    // ── Normalization errors ──────────────────────────────────────────────
    /// The model's completion could not be parsed as JSON even after
    /// stripping code fences. Carries the original raw text for diagnostics.
    #[error("Model output is not valid JSON: {raw:.120}")]
    MalformedModelOutput { raw: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// The persisted form-output file does not exist. The chat entry point
    /// requires it to be produced by `pdf2form extract` first.
    #[error("Form data file not found: '{path}'\nRun `pdf2form extract` first to produce it.")]
    MissingInputFile { path: PathBuf },

    /// Could not create or write the output JSON file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl FormAgentError {
    /// True for errors the interactive chat loop absorbs rather than exits on.
    pub fn is_transport(&self) -> bool {
        matches!(self, FormAgentError::Transport { .. })
    }
}
