//! Form extraction pipeline: PDF text → model → structured [`FormData`].
//!
//! ## Data Flow
//!
//! ```text
//! PDF ──▶ text ──▶ prompt ──▶ model ──▶ normalize ──▶ FormData (+ metadata)
//! ```
//!
//! PDF parsing (via `pdf_extract`) and the model call are external
//! collaborators; the interesting work is what happens to the completion
//! afterwards. A completion that fails JSON normalization is **not** a fatal
//! error here: the raw text is embedded into the result as an explicit
//! `{"error": …}` value so callers can inspect or log exactly what the model
//! said. Only an unreadable PDF aborts the pipeline.

use crate::config::AgentConfig;
use crate::error::FormAgentError;
use crate::form::FormData;
use crate::model::ModelClient;
use crate::normalize::normalize;
use crate::prompts;
use serde_json::{Map, Value};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Extract text from a PDF, page texts joined by newlines.
///
/// CPU-bound and synchronous; callers on an async runtime go through
/// [`extract_form`], which wraps this in `spawn_blocking`.
///
/// # Errors
///
/// [`FormAgentError::Extraction`] when the file is missing, unreadable, or
/// not parseable as a PDF.
pub fn extract_text(pdf_path: &Path) -> Result<String, FormAgentError> {
    pdf_extract::extract_text(pdf_path).map_err(|e| FormAgentError::Extraction {
        path: pdf_path.to_path_buf(),
        detail: e.to_string(),
    })
}

/// Run the full extraction pipeline for one PDF form.
///
/// On success the result carries a `"metadata"` group with provenance
/// (timestamp, source path, model id, format version). When the model's
/// completion is not valid JSON the result is `{"error": <raw text>}` plus
/// metadata, mirroring how the persisted file looks on the happy path.
pub async fn extract_form(
    pdf_path: &Path,
    config: &AgentConfig,
) -> Result<FormData, FormAgentError> {
    let client = config.resolve_client().await;
    extract_form_with_client(pdf_path, client, config).await
}

/// [`extract_form`] with an explicit client, for tests and callers that
/// share one client across calls.
pub async fn extract_form_with_client(
    pdf_path: &Path,
    client: Arc<dyn ModelClient>,
    config: &AgentConfig,
) -> Result<FormData, FormAgentError> {
    let owned_path = pdf_path.to_path_buf();
    let pdf_text = tokio::task::spawn_blocking(move || extract_text(&owned_path))
        .await
        .map_err(|e| FormAgentError::Extraction {
            path: pdf_path.to_path_buf(),
            detail: format!("extraction task failed: {e}"),
        })??;

    info!(
        path = %pdf_path.display(),
        chars = pdf_text.len(),
        "extracted PDF text"
    );

    let prompt = prompts::extraction_prompt(&pdf_text);
    let completion = client.complete(&prompt, &config.completion).await?;

    let mut form = form_from_completion(&completion);
    form.stamp_metadata(pdf_path, &config.model_id);
    Ok(form)
}

/// Normalize a completion into form data, embedding a malformed completion
/// as an `{"error": …}` value instead of failing the pipeline.
fn form_from_completion(completion: &str) -> FormData {
    match normalize(completion) {
        Ok(value) => FormData::from_value(value),
        Err(err) => {
            warn!("model output was not valid JSON; embedding as error value");
            let raw = match err {
                FormAgentError::MalformedModelOutput { raw } => raw,
                other => other.to_string(),
            };
            let mut map = Map::new();
            map.insert("error".to_string(), Value::String(raw));
            FormData(map)
        }
    }
}

/// Extract a form and persist it as indented JSON.
///
/// Returns the extracted data so callers can print or inspect it without
/// re-reading the file.
pub async fn extract_to_file(
    pdf_path: &Path,
    output_path: &Path,
    config: &AgentConfig,
) -> Result<FormData, FormAgentError> {
    let form = extract_form(pdf_path, config).await?;
    form.save(output_path)?;
    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CompletionOptions;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct FixedClient {
        reply: Result<String, String>,
        prompts: Mutex<Vec<String>>,
    }

    impl FixedClient {
        fn new(reply: Result<String, String>) -> Arc<Self> {
            Arc::new(Self {
                reply,
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl ModelClient for FixedClient {
        async fn complete(
            &self,
            prompt: &str,
            _options: &CompletionOptions,
        ) -> Result<String, FormAgentError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply
                .clone()
                .map_err(|detail| FormAgentError::Transport { detail })
        }
    }

    #[test]
    fn valid_completion_becomes_form_data() {
        let form = form_from_completion("```json\n{\"name\": \"Alice\"}\n```");
        assert_eq!(form.summary(), "name: Alice");
    }

    #[test]
    fn malformed_completion_is_embedded_not_fatal() {
        let form = form_from_completion("I could not find any fields.");
        assert_eq!(
            form.0["error"],
            Value::String("I could not find any fields.".to_string())
        );
    }

    #[test]
    fn extract_text_missing_file_is_fatal() {
        let err = extract_text(Path::new("/nonexistent/form.pdf")).unwrap_err();
        match err {
            FormAgentError::Extraction { path, .. } => {
                assert_eq!(path, Path::new("/nonexistent/form.pdf"));
            }
            other => panic!("expected Extraction, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_pdf_aborts_before_model_call() {
        let client = FixedClient::new(Ok("{}".into()));
        let err = extract_form_with_client(
            Path::new("/nonexistent/form.pdf"),
            Arc::clone(&client) as Arc<dyn ModelClient>,
            &AgentConfig::default(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, FormAgentError::Extraction { .. }));
        assert!(client.prompts.lock().unwrap().is_empty());
    }
}
