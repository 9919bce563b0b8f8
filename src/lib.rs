//! # pdf2form
//!
//! Extract structured data from PDF forms with an LLM, then chat about it.
//!
//! ## Why this crate?
//!
//! PDF forms rarely carry machine-readable field data — values live in free
//! text, scattered across labels, boxes, and tables. Instead of hand-writing
//! a parser per form layout, this crate extracts the raw text and asks a
//! hosted model (AWS Bedrock) to map it into structured JSON. A conversation
//! session over the extracted data then answers follow-up questions without
//! re-reading the PDF.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Extract    pull page text via pdf_extract (CPU-bound, spawn_blocking)
//!  ├─ 2. Prompt     embed the text in the extraction prompt
//!  ├─ 3. Model      one Bedrock invoke_model call
//!  ├─ 4. Normalize  strip fences, parse JSON, classify failures
//!  └─ 5. Persist    FormData + provenance metadata, indented JSON on disk
//!
//! Chat: user input ─▶ transcript ─▶ rendered prompt ─▶ model ─▶ trimmed
//! reply appended and returned (history is never rolled back on failure)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2form::{extract_form, AgentConfig, ConversationSession};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AgentConfig::default();
//!     let form = extract_form(Path::new("application.pdf"), &config).await?;
//!     println!("{}", form.summary());
//!
//!     let mut session = ConversationSession::start(&form, &config).await;
//!     let answer = session.ask("Who is the applicant?").await?;
//!     println!("{answer}");
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2form` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! pdf2form = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod extract;
pub mod form;
pub mod model;
pub mod normalize;
pub mod prompts;
pub mod session;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{AgentConfig, AgentConfigBuilder, DEFAULT_MODEL_ID, DEFAULT_REGION};
pub use error::FormAgentError;
pub use extract::{extract_form, extract_form_with_client, extract_text, extract_to_file};
pub use form::{FormData, FORMAT_VERSION, METADATA_KEY};
pub use model::{BedrockClient, CompletionOptions, ModelClient};
pub use normalize::normalize;
pub use session::{ConversationSession, ConversationTurn, Role};
