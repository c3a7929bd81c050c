use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
   config::ScribeConfig,
   error::{Result, ScribeError},
   prompt::AssembledPrompt,
};

/// Sanitized commit message returned by the model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedMessage {
   text: String,
}

impl GeneratedMessage {
   /// Trim surrounding whitespace and strip every backtick
   pub fn from_raw(raw: &str) -> Self {
      Self { text: raw.trim().replace('`', "").trim().to_string() }
   }

   pub fn as_str(&self) -> &str {
      &self.text
   }
}

/// Transport to a text-generation endpoint
pub trait CompletionBackend {
   /// Send the prompt, returning the raw generated text
   fn complete(&self, prompt: &AssembledPrompt, temperature: f32) -> Result<String>;

   /// Model name, for display
   fn model(&self) -> &str;
}

#[derive(Debug, Serialize)]
struct Message {
   role:    String,
   content: String,
}

#[derive(Debug, Serialize)]
struct ApiRequest {
   model:       String,
   temperature: f32,
   messages:    Vec<Message>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
   #[serde(default)]
   content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Choice {
   message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
   choices: Vec<Choice>,
}

/// OpenAI-compatible `/chat/completions` backend (Gemini, LiteLLM, OpenAI)
pub struct ChatCompletionsBackend {
   client:   reqwest::blocking::Client,
   base_url: String,
   api_key:  String,
   model:    String,
}

impl ChatCompletionsBackend {
   /// Build from config. Fails with [`ScribeError::MissingCredential`] before
   /// any network activity when no API key is configured.
   pub fn from_config(config: &ScribeConfig) -> Result<Self> {
      let api_key = config
         .credential()
         .ok_or(ScribeError::MissingCredential)?
         .to_string();

      let mut builder = reqwest::blocking::Client::builder();
      if let Some(secs) = config.request_timeout_secs {
         builder = builder.timeout(Duration::from_secs(secs));
      }
      if let Some(secs) = config.connect_timeout_secs {
         builder = builder.connect_timeout(Duration::from_secs(secs));
      }

      Ok(Self {
         client: builder.build()?,
         base_url: config.api_base_url.trim_end_matches('/').to_string(),
         api_key,
         model: config.model.clone(),
      })
   }
}

impl CompletionBackend for ChatCompletionsBackend {
   fn complete(&self, prompt: &AssembledPrompt, temperature: f32) -> Result<String> {
      let request = ApiRequest {
         model: self.model.clone(),
         temperature,
         messages: vec![Message { role: "user".to_string(), content: prompt.text() }],
      };

      debug!(model = %self.model, segments = prompt.segments().len(), "sending prompt");
      let response = self
         .client
         .post(format!("{}/chat/completions", self.base_url))
         .header("content-type", "application/json")
         .header("Authorization", format!("Bearer {}", self.api_key))
         .json(&request)
         .send()?;

      let status = response.status();
      let body = response.text()?;
      if !status.is_success() {
         return Err(ScribeError::Other(format!("API request failed (HTTP {status}): {body}")));
      }

      parse_completion(&body)
   }

   fn model(&self) -> &str {
      &self.model
   }
}

/// Extract the first choice's text from a `/chat/completions` response body
fn parse_completion(body: &str) -> Result<String> {
   let response: ApiResponse = serde_json::from_str(body)?;
   response
      .choices
      .into_iter()
      .next()
      .and_then(|choice| choice.message.content)
      .filter(|content| !content.trim().is_empty())
      .ok_or_else(|| ScribeError::Other("API returned no message content".to_string()))
}

/// Turns an assembled prompt into a commit message. Single attempt, no retry.
pub struct CommitMessageGenerator<B: CompletionBackend> {
   backend:     B,
   temperature: f32,
}

impl CommitMessageGenerator<ChatCompletionsBackend> {
   /// Generator for the configured endpoint; fails early without a credential
   pub fn from_config(config: &ScribeConfig) -> Result<Self> {
      Ok(Self::new(ChatCompletionsBackend::from_config(config)?, config.temperature))
   }
}

impl<B: CompletionBackend> CommitMessageGenerator<B> {
   pub const fn new(backend: B, temperature: f32) -> Self {
      Self { backend, temperature }
   }

   pub fn model(&self) -> &str {
      self.backend.model()
   }

   pub const fn backend(&self) -> &B {
      &self.backend
   }

   /// Call the model once. Any failure surfaces as
   /// [`ScribeError::Generation`].
   pub fn generate(&self, prompt: &AssembledPrompt) -> Result<GeneratedMessage> {
      let raw = self
         .backend
         .complete(prompt, self.temperature)
         .map_err(|e| ScribeError::Generation { reason: e.to_string() })?;

      let message = GeneratedMessage::from_raw(&raw);
      if message.as_str().is_empty() {
         return Err(ScribeError::Generation { reason: "model returned an empty message".to_string() });
      }
      Ok(message)
   }
}

#[cfg(test)]
mod tests {
   use super::*;
   use crate::{
      prompt::{GenerationRequest, assemble},
      testing::FakeBackend,
   };

   #[test]
   fn test_sanitize_strips_backticks_and_whitespace() {
      let message = GeneratedMessage::from_raw("\n  ```\nfeat(ui): add `--auto` flag\n```  \n");
      assert_eq!(message.as_str(), "feat(ui): add --auto flag");
      assert!(!message.as_str().contains('`'));
   }

   #[test]
   fn test_generate_returns_sanitized_text() {
      let generator = CommitMessageGenerator::new(FakeBackend::replying("`fix: typo`\n"), 0.7);
      let prompt = assemble(&GenerationRequest::default());
      let message = generator.generate(&prompt).unwrap();
      assert_eq!(message.as_str(), "fix: typo");
      assert_eq!(generator.backend.calls(), 1);
      assert_eq!(generator.backend.last_prompt().as_deref(), Some(prompt.text().as_str()));
   }

   #[test]
   fn test_generate_wraps_backend_errors() {
      let generator =
         CommitMessageGenerator::new(FakeBackend::failing("HTTP 429: quota exceeded"), 0.7);
      let err = generator
         .generate(&assemble(&GenerationRequest::default()))
         .unwrap_err();
      match err {
         ScribeError::Generation { reason } => assert!(reason.contains("quota exceeded")),
         other => panic!("expected Generation, got {other:?}"),
      }
      assert_eq!(generator.backend.calls(), 1);
   }

   #[test]
   fn test_generate_rejects_fence_only_output() {
      let generator = CommitMessageGenerator::new(FakeBackend::replying("```\n```"), 0.7);
      let err = generator
         .generate(&assemble(&GenerationRequest::default()))
         .unwrap_err();
      assert!(matches!(err, ScribeError::Generation { .. }));
   }

   #[test]
   fn test_missing_credential_fails_at_construction() {
      let config = ScribeConfig { api_key: None, ..Default::default() };
      assert!(matches!(
         CommitMessageGenerator::from_config(&config),
         Err(ScribeError::MissingCredential)
      ));
   }

   #[test]
   fn test_from_config_with_key() {
      let config = ScribeConfig {
         api_key: Some("key".to_string()),
         api_base_url: "http://localhost:4000/".to_string(),
         request_timeout_secs: Some(30),
         ..Default::default()
      };
      let generator = CommitMessageGenerator::from_config(&config).unwrap();
      assert_eq!(generator.model(), "gemini-2.5-flash-lite");
      assert_eq!(generator.backend.base_url, "http://localhost:4000");
   }

   #[test]
   fn test_parse_completion() {
      let body = r#"{"choices":[{"index":0,"message":{"role":"assistant","content":"docs: update readme"}}]}"#;
      assert_eq!(parse_completion(body).unwrap(), "docs: update readme");
   }

   #[test]
   fn test_parse_completion_without_content() {
      assert!(parse_completion(r#"{"choices":[]}"#).is_err());
      assert!(parse_completion(r#"{"choices":[{"message":{"content":null}}]}"#).is_err());
      assert!(matches!(parse_completion("not json"), Err(ScribeError::JsonError(_))));
   }
}
