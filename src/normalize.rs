//! Response normalization: turn a raw model completion into structured JSON.
//!
//! ## Why is normalization necessary?
//!
//! Even when the prompt says "output valid JSON without any additional text
//! or markdown formatting", models occasionally wrap the payload in a
//! ` ```json … ``` ` fence. Rather than teaching the prompt every formatting
//! edge-case, this module applies a small deterministic cleanup before
//! parsing, and classifies a parse failure as
//! [`FormAgentError::MalformedModelOutput`] carrying the original text —
//! callers never see a raw parser fault.
//!
//! The stripping is intentionally dumb: exactly one leading and one trailing
//! fence marker, matched positionally. This is not a markdown parser; a fence
//! that appears *inside* an otherwise-valid payload is left alone, and text
//! with no fences passes through untouched.

use crate::error::FormAgentError;
use serde_json::Value;
use tracing::debug;

/// Fence prefixes recognised at the start of a completion, longest first so
/// `"```json"` wins over the bare `"```"`.
const FENCE_PREFIXES: [&str; 2] = ["```json", "```"];

const FENCE_SUFFIX: &str = "```";

/// Parse a raw model completion into a JSON value.
///
/// Trims surrounding whitespace, removes a single pair of code-fence markers
/// if present, and parses the remainder with [`serde_json`]. JSON `null`
/// survives as [`Value::Null`] — an explicit absent-value marker, not an
/// error.
///
/// # Errors
///
/// Returns [`FormAgentError::MalformedModelOutput`] with the **original**
/// (pre-stripping) text when the remainder is not valid JSON.
pub fn normalize(raw: &str) -> Result<Value, FormAgentError> {
    let stripped = strip_fences(raw);

    serde_json::from_str(stripped).map_err(|e| {
        debug!("completion failed to parse as JSON: {e}");
        FormAgentError::MalformedModelOutput {
            raw: raw.to_string(),
        }
    })
}

/// Remove at most one leading and one trailing fence marker.
///
/// Purely positional: no recursion, no language-tag parsing beyond the
/// known `json` prefix, no effect when markers are absent.
fn strip_fences(raw: &str) -> &str {
    let mut text = raw.trim();

    for prefix in FENCE_PREFIXES {
        if let Some(rest) = text.strip_prefix(prefix) {
            text = rest.trim_start();
            break;
        }
    }

    if let Some(rest) = text.strip_suffix(FENCE_SUFFIX) {
        text = rest.trim_end();
    }

    text
}
