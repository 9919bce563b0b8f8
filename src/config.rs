//! Configuration for extraction and conversation.
//!
//! All behaviour is controlled through [`AgentConfig`], built via its
//! [`AgentConfigBuilder`]. Keeping every knob in one struct makes it trivial
//! to share a config between the extraction and chat entry points and to
//! diff two runs to understand why their outputs differ.
//!
//! The model client is part of the config rather than ambient global state:
//! callers (and tests) inject any [`ModelClient`] implementation, and only
//! when none is supplied does the library construct a [`BedrockClient`]
//! from `region` + `model_id`.

use crate::error::FormAgentError;
use crate::model::{BedrockClient, CompletionOptions, ModelClient};
use std::fmt;
use std::sync::Arc;

/// Default AWS region for the Bedrock endpoint.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Default Bedrock model identifier.
pub const DEFAULT_MODEL_ID: &str = "anthropic.claude-3-sonnet-20240229-v1:0";

/// Configuration for form extraction and conversation sessions.
///
/// # Example
/// ```rust
/// use pdf2form::AgentConfig;
///
/// let config = AgentConfig::builder()
///     .region("eu-west-1")
///     .max_tokens(4000)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct AgentConfig {
    /// AWS region for the Bedrock endpoint. Default: `us-east-1`.
    pub region: String,

    /// Bedrock model identifier. Default: [`DEFAULT_MODEL_ID`].
    pub model_id: String,

    /// Sampling knobs sent with every completion request.
    pub completion: CompletionOptions,

    /// Pre-constructed model client. Takes precedence over `region` +
    /// `model_id`; this is how tests substitute a scripted double.
    pub client: Option<Arc<dyn ModelClient>>,

    /// Opt-in transcript cap: maximum number of user/assistant turns a
    /// session retains (the system primer is never counted or evicted).
    /// Default: `None`.
    ///
    /// Left unset, the transcript grows without bound and every exchange
    /// re-sends the full history. Setting a cap evicts the oldest
    /// non-system turns once the limit is exceeded, trading exact replay of
    /// long sessions for a bounded prompt size.
    pub max_turns: Option<usize>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            model_id: DEFAULT_MODEL_ID.to_string(),
            completion: CompletionOptions::default(),
            client: None,
            max_turns: None,
        }
    }
}

impl fmt::Debug for AgentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentConfig")
            .field("region", &self.region)
            .field("model_id", &self.model_id)
            .field("completion", &self.completion)
            .field("client", &self.client.as_ref().map(|_| "<dyn ModelClient>"))
            .field("max_turns", &self.max_turns)
            .finish()
    }
}

impl AgentConfig {
    /// Create a new builder for `AgentConfig`.
    pub fn builder() -> AgentConfigBuilder {
        AgentConfigBuilder {
            config: Self::default(),
        }
    }

    /// Resolve the model client: the injected one if present, otherwise a
    /// fresh [`BedrockClient`] for `region` + `model_id`.
    pub async fn resolve_client(&self) -> Arc<dyn ModelClient> {
        if let Some(ref client) = self.client {
            return Arc::clone(client);
        }
        Arc::new(BedrockClient::connect(self.region.clone(), self.model_id.clone()).await)
    }
}

/// Builder for [`AgentConfig`].
#[derive(Debug)]
pub struct AgentConfigBuilder {
    config: AgentConfig,
}

impl AgentConfigBuilder {
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.config.region = region.into();
        self
    }

    pub fn model_id(mut self, model_id: impl Into<String>) -> Self {
        self.config.model_id = model_id.into();
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.completion.max_tokens = n;
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.completion.temperature = t.clamp(0.0, 1.0);
        self
    }

    pub fn top_p(mut self, p: f32) -> Self {
        self.config.completion.top_p = p.clamp(0.0, 1.0);
        self
    }

    pub fn stop_sequences(mut self, stops: Vec<String>) -> Self {
        self.config.completion.stop_sequences = stops;
        self
    }

    pub fn client(mut self, client: Arc<dyn ModelClient>) -> Self {
        self.config.client = Some(client);
        self
    }

    pub fn max_turns(mut self, n: usize) -> Self {
        self.config.max_turns = Some(n);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<AgentConfig, FormAgentError> {
        let c = &self.config;
        if c.completion.max_tokens == 0 {
            return Err(FormAgentError::InvalidConfig(
                "max_tokens must be ≥ 1".into(),
            ));
        }
        if c.region.trim().is_empty() {
            return Err(FormAgentError::InvalidConfig("region must not be empty".into()));
        }
        if let Some(n) = c.max_turns {
            if n < 2 {
                return Err(FormAgentError::InvalidConfig(format!(
                    "max_turns must be ≥ 2 to retain one full exchange, got {n}"
                )));
            }
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let c = AgentConfig::default();
        assert_eq!(c.region, "us-east-1");
        assert_eq!(c.model_id, DEFAULT_MODEL_ID);
        assert!(c.max_turns.is_none());
        assert!(c.client.is_none());
    }

    #[test]
    fn builder_clamps_temperature() {
        let c = AgentConfig::builder().temperature(7.0).build().unwrap();
        assert_eq!(c.completion.temperature, 1.0);
    }

    #[test]
    fn zero_max_tokens_rejected() {
        assert!(AgentConfig::builder().max_tokens(0).build().is_err());
    }

    #[test]
    fn tiny_max_turns_rejected() {
        assert!(AgentConfig::builder().max_turns(1).build().is_err());
        assert!(AgentConfig::builder().max_turns(2).build().is_ok());
    }

    #[test]
    fn debug_elides_client() {
        let dbg = format!("{:?}", AgentConfig::default());
        assert!(dbg.contains("region"));
        assert!(!dbg.contains("BedrockClient"));
    }
}
