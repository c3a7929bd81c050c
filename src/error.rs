use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScribeError {
   #[error("Not a git repository")]
   NotARepository,

   #[error("Git command failed: {stderr}")]
   VcsCommand { stderr: String },

   #[error("The current branch {branch} has no upstream branch")]
   NoUpstream { branch: String },

   #[error("No API key configured (set GIT_SCRIBE_API_KEY or GEMINI_API_KEY)")]
   MissingCredential,

   #[error("Commit message generation failed: {reason}")]
   Generation { reason: String },

   #[error("Config error: {0}")]
   Config(String),

   #[error("IO error: {0}")]
   IoError(#[from] std::io::Error),

   #[error("JSON error: {0}")]
   JsonError(#[from] serde_json::Error),

   #[error("HTTP error: {0}")]
   HttpError(#[from] reqwest::Error),

   #[error("Prompt error: {0}")]
   PromptError(#[from] dialoguer::Error),

   #[error("{0}")]
   Other(String),
}

impl ScribeError {
   /// Build a `VcsCommand` error from raw process stderr
   pub fn vcs(stderr: impl AsRef<str>) -> Self {
      Self::VcsCommand { stderr: stderr.as_ref().trim().to_string() }
   }
}

pub type Result<T> = std::result::Result<T, ScribeError>;
