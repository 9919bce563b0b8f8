//! Model invocation: the transport seam between the core and AWS Bedrock.
//!
//! The core never talks to the network directly — it calls
//! [`ModelClient::complete`], a prompt-string-in / completion-string-out
//! contract. [`BedrockClient`] is the production implementation; tests swap
//! in scripted doubles. Keeping the seam this narrow means the conversation
//! and extraction logic cannot accidentally depend on a provider's response
//! schema.
//!
//! ## Wire contract
//!
//! `invoke_model` takes a JSON body and returns a JSON body. Both sides are
//! typed here ([`InvocationRequest`] / [`InvocationResponse`]) so a schema
//! drift fails loudly as a [`FormAgentError::Transport`] instead of a silent
//! field lookup on an untyped blob.

use crate::error::FormAgentError;
use async_trait::async_trait;
use aws_sdk_bedrockruntime::primitives::Blob;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Sampling knobs forwarded with every completion request.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CompletionOptions {
    pub max_tokens: usize,
    pub temperature: f32,
    pub top_p: f32,
    pub stop_sequences: Vec<String>,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        // Slightly warm temperature reads better in conversation while still
        // staying faithful for extraction.
        Self {
            max_tokens: 2000,
            temperature: 0.7,
            top_p: 0.95,
            stop_sequences: vec!["\n\n".to_string()],
        }
    }
}

/// Prompt-in, completion-out. Implementations own all transport concerns
/// (endpoints, credentials, serialisation); any failure surfaces as
/// [`FormAgentError::Transport`].
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn complete(
        &self,
        prompt: &str,
        options: &CompletionOptions,
    ) -> Result<String, FormAgentError>;
}

// ── Bedrock implementation ───────────────────────────────────────────────

/// Request body for the Bedrock text-completion API.
#[derive(Debug, Serialize)]
struct InvocationRequest<'a> {
    prompt: &'a str,
    max_tokens: usize,
    temperature: f32,
    top_p: f32,
    stop_sequences: &'a [String],
}

/// Response body from the Bedrock text-completion API.
///
/// Only the `completion` field matters to us; everything else the service
/// returns is ignored rather than modelled.
#[derive(Debug, Deserialize)]
struct InvocationResponse {
    completion: String,
}

/// Production [`ModelClient`] backed by `aws-sdk-bedrockruntime`.
///
/// Region and model id are explicit constructor inputs — no ambient
/// environment state — so two clients against different regions can coexist
/// and tests can assert on configuration.
pub struct BedrockClient {
    client: aws_sdk_bedrockruntime::Client,
    model_id: String,
}

impl BedrockClient {
    /// Connect to Bedrock in the given region with the given model.
    ///
    /// Credentials come from the standard AWS chain (env vars, profile,
    /// instance role); credential *lookup* is deferred to the first call.
    pub async fn connect(region: impl Into<String>, model_id: impl Into<String>) -> Self {
        let region = region.into();
        let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(region.clone()))
            .load()
            .await;
        let model_id = model_id.into();
        info!(%region, %model_id, "connected Bedrock client");
        Self {
            client: aws_sdk_bedrockruntime::Client::new(&sdk_config),
            model_id,
        }
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }
}

#[async_trait]
impl ModelClient for BedrockClient {
    async fn complete(
        &self,
        prompt: &str,
        options: &CompletionOptions,
    ) -> Result<String, FormAgentError> {
        let request = InvocationRequest {
            prompt,
            max_tokens: options.max_tokens,
            temperature: options.temperature,
            top_p: options.top_p,
            stop_sequences: &options.stop_sequences,
        };
        let body = serde_json::to_vec(&request).map_err(|e| FormAgentError::Transport {
            detail: format!("request serialisation: {e}"),
        })?;

        debug!(prompt_len = prompt.len(), model_id = %self.model_id, "invoking model");

        let response = self
            .client
            .invoke_model()
            .model_id(&self.model_id)
            .content_type("application/json")
            .body(Blob::new(body))
            .send()
            .await
            .map_err(|e| FormAgentError::Transport {
                detail: e.into_service_error().to_string(),
            })?;

        let parsed: InvocationResponse = serde_json::from_slice(response.body().as_ref())
            .map_err(|e| FormAgentError::Transport {
                detail: format!("response did not match the invocation contract: {e}"),
            })?;

        Ok(parsed.completion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_match_documented_values() {
        let opts = CompletionOptions::default();
        assert_eq!(opts.max_tokens, 2000);
        assert_eq!(opts.temperature, 0.7);
        assert_eq!(opts.top_p, 0.95);
        assert_eq!(opts.stop_sequences, vec!["\n\n".to_string()]);
    }

    #[test]
    fn request_body_shape() {
        let opts = CompletionOptions::default();
        let req = InvocationRequest {
            prompt: "Hello",
            max_tokens: opts.max_tokens,
            temperature: opts.temperature,
            top_p: opts.top_p,
            stop_sequences: &opts.stop_sequences,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["prompt"], "Hello");
        assert_eq!(json["max_tokens"], 2000);
        assert_eq!(json["stop_sequences"][0], "\n\n");
    }

    #[test]
    fn response_requires_completion_field() {
        let ok: InvocationResponse =
            serde_json::from_str(r#"{"completion": " hi ", "stop_reason": "stop"}"#).unwrap();
        assert_eq!(ok.completion, " hi ");

        let missing = serde_json::from_str::<InvocationResponse>(r#"{"output": "hi"}"#);
        assert!(missing.is_err());
    }
}
