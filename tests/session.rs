//! Integration tests for the extraction → persistence → conversation flow.
//!
//! No network and no real PDFs: the model collaborator is replaced with a
//! scripted [`ModelClient`] double, which is exactly the seam the library
//! exposes for this purpose. PDF-dependent paths are covered only on their
//! failure side (missing file), since happy-path PDF parsing belongs to the
//! external `pdf_extract` crate.

use async_trait::async_trait;
use pdf2form::{
    normalize, AgentConfig, CompletionOptions, ConversationSession, FormAgentError, FormData,
    ModelClient, Role,
};
use serde_json::json;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Scripted model double: pops canned results, records every prompt.
struct ScriptedClient {
    replies: Mutex<Vec<Result<String, String>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedClient {
    fn new(replies: Vec<Result<String, String>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies),
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn last_prompt(&self) -> String {
        self.prompts.lock().unwrap().last().cloned().unwrap()
    }
}

#[async_trait]
impl ModelClient for ScriptedClient {
    async fn complete(
        &self,
        prompt: &str,
        _options: &CompletionOptions,
    ) -> Result<String, FormAgentError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let mut replies = self.replies.lock().unwrap();
        assert!(!replies.is_empty(), "scripted client ran out of replies");
        replies
            .remove(0)
            .map_err(|detail| FormAgentError::Transport { detail })
    }
}

fn config_with(client: Arc<ScriptedClient>) -> AgentConfig {
    AgentConfig::builder()
        .client(client)
        .build()
        .expect("default config with injected client is valid")
}

fn sample_form() -> FormData {
    FormData::from_value(json!({
        "applicant": {"name": "Alice", "email": "alice@example.com"},
        "status": "submitted",
        "metadata": {"version": "1.0.0"}
    }))
}

// ── Normalization properties ─────────────────────────────────────────────

#[test]
fn fenced_completion_round_trips() {
    let inner = json!({"applicant": {"name": "Bob"}, "score": 7, "notes": null});
    let fenced = format!("```json\n{}\n```", serde_json::to_string_pretty(&inner).unwrap());
    assert_eq!(normalize(&fenced).unwrap(), inner);
}

#[test]
fn prose_completion_is_classified() {
    let err = normalize("I'm not sure about that.").unwrap_err();
    assert!(matches!(err, FormAgentError::MalformedModelOutput { .. }));
}

// ── Summary properties ───────────────────────────────────────────────────

#[test]
fn summary_excludes_metadata_and_is_stable() {
    let form = FormData::from_value(json!({
        "name": "Alice",
        "metadata": {"version": "1.0.0"}
    }));
    assert_eq!(form.summary(), "name: Alice");
    assert_eq!(form.summary(), form.summary());
}

// ── Conversation flow ────────────────────────────────────────────────────

#[tokio::test]
async fn one_exchange_yields_three_turns() {
    let client = ScriptedClient::new(vec![Ok("It was submitted.".into())]);
    let mut session = ConversationSession::with_client(
        &sample_form(),
        Arc::clone(&client) as Arc<dyn ModelClient>,
        &config_with(Arc::clone(&client)),
    );

    let reply = session.ask("What is the status?").await.unwrap();
    assert_eq!(reply, "It was submitted.");

    let roles: Vec<Role> = session.transcript().iter().map(|t| t.role).collect();
    assert_eq!(roles, vec![Role::System, Role::User, Role::Assistant]);
}

#[tokio::test]
async fn failed_exchange_consumes_a_slot_and_stays_as_context() {
    let client = ScriptedClient::new(vec![
        Err("quota exceeded".into()),
        Ok("The applicant is Alice.".into()),
    ]);
    let mut session = ConversationSession::with_client(
        &sample_form(),
        Arc::clone(&client) as Arc<dyn ModelClient>,
        &config_with(Arc::clone(&client)),
    );

    assert!(session.ask("Who applied?").await.is_err());
    assert_eq!(session.transcript().len(), 2);
    assert_eq!(session.transcript()[1].role, Role::User);

    session.ask("Try again: who applied?").await.unwrap();
    assert_eq!(session.transcript().len(), 4);

    // The failed question was re-sent as context in the second prompt.
    let prompt = client.last_prompt();
    assert!(prompt.contains("Human: Who applied?"));
    assert!(prompt.contains("Human: Try again: who applied?"));
    assert!(prompt.ends_with("Assistant: "));
}

#[tokio::test]
async fn primer_embeds_the_form_summary() {
    let client = ScriptedClient::new(vec![Ok("Yes.".into())]);
    let mut session = ConversationSession::with_client(
        &sample_form(),
        Arc::clone(&client) as Arc<dyn ModelClient>,
        &config_with(Arc::clone(&client)),
    );

    session.ask("Is there an email on file?").await.unwrap();

    let prompt = client.last_prompt();
    assert!(prompt.contains("applicant.name: Alice"));
    assert!(prompt.contains("applicant.email: alice@example.com"));
    // Provenance never leaks into prompts.
    assert!(!prompt.contains("version: 1.0.0"));
}

// ── Persistence round trip into a session ────────────────────────────────

#[tokio::test]
async fn saved_form_feeds_a_new_session() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("form_output.json");
    sample_form().save(&path).unwrap();

    let loaded = FormData::load(&path).unwrap();
    assert_eq!(loaded, sample_form());

    let client = ScriptedClient::new(vec![Ok("submitted".into())]);
    let mut session = ConversationSession::with_client(
        &loaded,
        Arc::clone(&client) as Arc<dyn ModelClient>,
        &config_with(Arc::clone(&client)),
    );
    assert_eq!(session.ask("status?").await.unwrap(), "submitted");
}

#[test]
fn chat_requires_the_form_file_to_exist() {
    let err = FormData::load(Path::new("/definitely/not/here/form_output.json")).unwrap_err();
    match err {
        FormAgentError::MissingInputFile { path } => {
            assert!(path.ends_with("form_output.json"));
        }
        other => panic!("expected MissingInputFile, got {other:?}"),
    }
}

// ── Extraction failure surface ───────────────────────────────────────────

#[tokio::test]
async fn extraction_on_missing_pdf_mentions_the_path() {
    let client = ScriptedClient::new(vec![]);
    let config = config_with(Arc::clone(&client));

    let err = pdf2form::extract_form(Path::new("/no/such/form.pdf"), &config)
        .await
        .unwrap_err();

    let msg = err.to_string();
    assert!(msg.contains("/no/such/form.pdf"), "got: {msg}");
    // The model is never consulted when the PDF cannot be read.
    assert!(client.prompts.lock().unwrap().is_empty());
}
