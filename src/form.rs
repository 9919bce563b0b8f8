//! Form data model: the structured result of extracting a PDF form.
//!
//! [`FormData`] wraps a `serde_json::Map` compiled with `preserve_order`, so
//! iterating top-level groups always matches the order the model emitted
//! them. That order flows straight into the chat system primer via
//! [`FormData::summary`], and what appears first in a prompt can influence
//! model attention — so it must be deterministic across runs.
//!
//! The reserved `"metadata"` group holds provenance (timestamp, source path,
//! model id, version) and never appears in the summary.

use crate::error::FormAgentError;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Reserved top-level key excluded from summaries.
pub const METADATA_KEY: &str = "metadata";

/// Format version stamped into the metadata group.
pub const FORMAT_VERSION: &str = "1.0.0";

/// Structured form contents: field-group name → scalar value or a nested
/// map of subfield → value. Nesting beyond two levels is not produced by
/// the extraction prompt, but the renderer tolerates it (see [`scalar`]).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct FormData(pub Map<String, Value>);

impl FormData {
    /// Build from a parsed model completion.
    ///
    /// A non-object value (the model answered with an array or a bare
    /// string) is wrapped under a single `"fields"` group so downstream
    /// code can always rely on the mapping shape.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            other => {
                let mut map = Map::new();
                map.insert("fields".to_string(), other);
                Self(map)
            }
        }
    }

    /// Record provenance under the reserved `"metadata"` group.
    pub fn stamp_metadata(&mut self, pdf_path: &Path, model_id: &str) {
        let mut meta = Map::new();
        meta.insert(
            "processed_at".to_string(),
            Value::String(Utc::now().to_rfc3339()),
        );
        meta.insert(
            "pdf_path".to_string(),
            Value::String(pdf_path.display().to_string()),
        );
        meta.insert("model_id".to_string(), Value::String(model_id.to_string()));
        meta.insert(
            "version".to_string(),
            Value::String(FORMAT_VERSION.to_string()),
        );
        self.0.insert(METADATA_KEY.to_string(), Value::Object(meta));
    }

    /// Render a stable textual digest of the form for prompt embedding.
    ///
    /// One line per field in insertion order: nested groups flatten to
    /// `group.subfield: value`, flat entries to `group: value`. The
    /// `"metadata"` group is skipped entirely. Newline-joined, no trailing
    /// newline; identical input always yields byte-identical output.
    pub fn summary(&self) -> String {
        let mut lines = Vec::new();
        for (group, value) in &self.0 {
            if group == METADATA_KEY {
                continue;
            }
            match value {
                Value::Object(subfields) => {
                    for (subkey, subvalue) in subfields {
                        lines.push(format!("{group}.{subkey}: {}", scalar(subvalue)));
                    }
                }
                other => lines.push(format!("{group}: {}", scalar(other))),
            }
        }
        lines.join("\n")
    }

    /// Load previously persisted form data.
    ///
    /// # Errors
    ///
    /// [`FormAgentError::MissingInputFile`] when the file does not exist;
    /// [`FormAgentError::MalformedModelOutput`] when its contents are not
    /// valid JSON.
    pub fn load(path: &Path) -> Result<Self, FormAgentError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                FormAgentError::MissingInputFile {
                    path: path.to_path_buf(),
                }
            } else {
                FormAgentError::Extraction {
                    path: path.to_path_buf(),
                    detail: e.to_string(),
                }
            }
        })?;

        let value: Value =
            serde_json::from_str(&text).map_err(|_| FormAgentError::MalformedModelOutput {
                raw: text,
            })?;
        Ok(Self::from_value(value))
    }

    /// Write the form as indented JSON, atomically (temp file + rename) so
    /// a crash mid-write never leaves a truncated file.
    pub fn save(&self, path: &Path) -> Result<(), FormAgentError> {
        let write_err = |source: std::io::Error| FormAgentError::OutputWriteFailed {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(write_err)?;
            }
        }

        let json = serde_json::to_string_pretty(&self.0).map_err(|e| {
            write_err(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        })?;

        let tmp_path = tmp_sibling(path);
        std::fs::write(&tmp_path, &json).map_err(write_err)?;
        std::fs::rename(&tmp_path, path).map_err(write_err)?;

        debug!("wrote form data to {}", path.display());
        Ok(())
    }
}

/// Render a JSON scalar for a summary line: strings unquoted, everything
/// else in its compact JSON form. Deeper structures (arrays, third-level
/// objects) also fall through to compact JSON so no data is silently lost.
fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn tmp_sibling(path: &Path) -> PathBuf {
    path.with_extension("json.tmp")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> FormData {
        FormData::from_value(json!({
            "applicant": {"name": "Alice", "age": 30},
            "status": "approved",
            "score": null,
            "metadata": {"version": "1.0.0"}
        }))
    }

    #[test]
    fn summary_flattens_nested_groups() {
        let s = sample().summary();
        assert_eq!(
            s,
            "applicant.name: Alice\napplicant.age: 30\nstatus: approved\nscore: null"
        );
    }

    #[test]
    fn summary_is_idempotent() {
        let form = sample();
        assert_eq!(form.summary(), form.summary());
    }

    #[test]
    fn summary_skips_metadata_entirely() {
        let form = FormData::from_value(json!({
            "name": "Alice",
            "metadata": {"version": "1.0.0"}
        }));
        assert_eq!(form.summary(), "name: Alice");
    }

    #[test]
    fn summary_preserves_insertion_order() {
        let form = FormData::from_value(json!({
            "zebra": 1,
            "apple": 2,
            "mango": 3
        }));
        assert_eq!(form.summary(), "zebra: 1\napple: 2\nmango: 3");
    }

    #[test]
    fn non_object_completion_is_wrapped() {
        let form = FormData::from_value(json!(["a", "b"]));
        assert_eq!(form.summary(), r#"fields: ["a","b"]"#);
    }

    #[test]
    fn stamp_metadata_records_provenance() {
        let mut form = sample();
        form.stamp_metadata(Path::new("form.pdf"), "anthropic.claude-3-sonnet");
        let meta = form.0[METADATA_KEY].as_object().unwrap();
        assert_eq!(meta["pdf_path"], "form.pdf");
        assert_eq!(meta["model_id"], "anthropic.claude-3-sonnet");
        assert_eq!(meta["version"], FORMAT_VERSION);
        assert!(meta["processed_at"].as_str().unwrap().contains('T'));
        // Stamping never leaks into the summary.
        assert!(!form.summary().contains("processed_at"));
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("form_output.json");
        let form = sample();
        form.save(&path).unwrap();

        // Indented for human readability.
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\n  "));

        assert_eq!(FormData::load(&path).unwrap(), form);
    }

    #[test]
    fn load_missing_file_is_classified() {
        let err = FormData::load(Path::new("/nonexistent/form_output.json")).unwrap_err();
        assert!(matches!(err, FormAgentError::MissingInputFile { .. }));
    }
}
