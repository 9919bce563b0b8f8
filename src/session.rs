//! Conversation session: an append-only transcript over form data.
//!
//! A [`ConversationSession`] owns the turn history of one interactive
//! conversation about one extracted form. The session lifecycle maps
//! directly onto Rust ownership: construction seeds the transcript and makes
//! the session ready, and a response is awaited only inside
//! [`ConversationSession::ask`] — the `&mut self` borrow makes concurrent
//! exchanges unrepresentable, so no locking is needed.
//!
//! ## Failed exchanges are not rolled back
//!
//! When the model call fails, the user turn stays in the transcript and no
//! assistant turn is appended. The failed question is therefore re-sent as
//! context on the next exchange. Callers who want rollback semantics must
//! implement them on top.
//!
//! ## Transcript growth
//!
//! By default the transcript grows without bound and each exchange re-sends
//! the full history. [`crate::AgentConfig::max_turns`] opts into evicting
//! the oldest user/assistant turns; the system primer is never evicted.

use crate::config::AgentConfig;
use crate::error::FormAgentError;
use crate::form::FormData;
use crate::model::{CompletionOptions, ModelClient};
use crate::prompts;
use std::sync::Arc;
use tracing::{debug, warn};

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    /// Label used when rendering the turn into a prompt. The system turn is
    /// rendered bare (no label), so only the other two matter here.
    fn prompt_label(self) -> &'static str {
        match self {
            Role::System => "System",
            Role::User => "Human",
            Role::Assistant => "Assistant",
        }
    }
}

/// One entry in the transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationTurn {
    pub role: Role,
    pub text: String,
}

/// An interactive session answering questions about one extracted form.
pub struct ConversationSession {
    transcript: Vec<ConversationTurn>,
    client: Arc<dyn ModelClient>,
    options: CompletionOptions,
    max_turns: Option<usize>,
}

impl ConversationSession {
    /// Start a session: resolve the model client from `config` and seed the
    /// transcript with the system primer built from the form summary.
    pub async fn start(form: &FormData, config: &AgentConfig) -> Self {
        let client = config.resolve_client().await;
        Self::with_client(form, client, config)
    }

    /// Start a session with an explicit client (used by tests and callers
    /// that share one client across sessions).
    pub fn with_client(
        form: &FormData,
        client: Arc<dyn ModelClient>,
        config: &AgentConfig,
    ) -> Self {
        let primer = prompts::system_primer(&form.summary());
        Self {
            transcript: vec![ConversationTurn {
                role: Role::System,
                text: primer,
            }],
            client,
            options: config.completion.clone(),
            max_turns: config.max_turns,
        }
    }

    /// Run one exchange: append the user turn, send the rendered transcript
    /// to the model, store and return the trimmed reply.
    ///
    /// Chat replies are natural language, so only whitespace trimming is
    /// applied — never JSON normalization.
    ///
    /// # Errors
    ///
    /// [`FormAgentError::Transport`] when the model call fails. The user
    /// turn remains in the transcript (see module docs).
    pub async fn ask(&mut self, user_text: &str) -> Result<String, FormAgentError> {
        self.transcript.push(ConversationTurn {
            role: Role::User,
            text: user_text.to_string(),
        });
        self.enforce_cap();

        let prompt = self.render_prompt();
        debug!(
            turns = self.transcript.len(),
            prompt_len = prompt.len(),
            "sending conversation prompt"
        );

        let raw = match self.client.complete(&prompt, &self.options).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("model call failed; user turn retained in transcript");
                return Err(e);
            }
        };

        let reply = raw.trim().to_string();
        self.transcript.push(ConversationTurn {
            role: Role::Assistant,
            text: reply.clone(),
        });
        self.enforce_cap();

        Ok(reply)
    }

    /// The full turn history, system primer first. Chronological, never
    /// reordered or deduplicated.
    pub fn transcript(&self) -> &[ConversationTurn] {
        &self.transcript
    }

    /// Render the transcript into a single prompt: the system primer text,
    /// then each turn as `Human:`/`Assistant:` lines, then a trailing
    /// `Assistant: ` cue so the model knows to continue. Blank-line joined.
    fn render_prompt(&self) -> String {
        let mut parts: Vec<String> = Vec::with_capacity(self.transcript.len() + 1);
        parts.push(self.transcript[0].text.clone());
        for turn in &self.transcript[1..] {
            parts.push(format!("{}: {}", turn.role.prompt_label(), turn.text));
        }
        parts.push("Assistant: ".to_string());
        parts.join("\n\n")
    }

    /// Evict the oldest non-system turns while over the configured cap.
    /// No-op when `max_turns` is unset.
    fn enforce_cap(&mut self) {
        let Some(cap) = self.max_turns else {
            return;
        };
        while self.transcript.len().saturating_sub(1) > cap {
            let evicted = self.transcript.remove(1);
            debug!(role = ?evicted.role, "evicted oldest turn over max_turns cap");
        }
    }
}
