use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Result, ScribeError};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScribeConfig {
   /// Base URL of an OpenAI-compatible endpoint (overridden by
   /// `GIT_SCRIBE_API_URL`)
   pub api_base_url: String,

   /// API key for the model endpoint (overridden by `GIT_SCRIBE_API_KEY`, then
   /// `GEMINI_API_KEY`)
   pub api_key: Option<String>,

   pub model:       String,
   pub temperature: f32,

   /// Byte ceiling above which the staged diff is filtered or dropped
   pub max_diff_size: usize,

   /// Extension to prioritize when the diff exceeds `max_diff_size`
   pub filter_extension: String,

   pub remote: String,

   /// Free-text project context, relative to the repository root
   pub project_context_file: PathBuf,

   /// Single-slot log of the most recently assembled prompt
   pub last_prompt_path: PathBuf,

   /// HTTP request timeout in seconds (none: client default)
   pub request_timeout_secs: Option<u64>,

   /// HTTP connection timeout in seconds (none: client default)
   pub connect_timeout_secs: Option<u64>,
}

impl Default for ScribeConfig {
   fn default() -> Self {
      Self {
         api_base_url:         "https://generativelanguage.googleapis.com/v1beta/openai"
            .to_string(),
         api_key:              None,
         model:                "gemini-2.5-flash-lite".to_string(),
         temperature:          0.7,
         max_diff_size:        80000,
         filter_extension:     ".gml".to_string(),
         remote:               "origin".to_string(),
         project_context_file: PathBuf::from(".gitscribe-context"),
         last_prompt_path:     default_data_dir()
            .unwrap_or_else(|| PathBuf::from(".gitscribe"))
            .join("last_prompt.log"),
         request_timeout_secs: None,
         connect_timeout_secs: None,
      }
   }
}

/// User home directory (HOME on Unix, USERPROFILE on Windows)
fn home_dir() -> Option<PathBuf> {
   std::env::var("HOME")
      .or_else(|_| std::env::var("USERPROFILE"))
      .ok()
      .map(PathBuf::from)
}

/// Per-user data directory (~/.gitscribe)
fn default_data_dir() -> Option<PathBuf> {
   home_dir().map(|home| home.join(".gitscribe"))
}

impl ScribeConfig {
   /// Load config from default location (~/.config/git-scribe/config.toml)
   /// Falls back to Default if the file doesn't exist. Environment variables
   /// override config file values:
   /// - `GIT_SCRIBE_API_URL` overrides `api_base_url`
   /// - `GIT_SCRIBE_API_KEY` (or `GEMINI_API_KEY`) overrides `api_key`
   /// - `GIT_SCRIBE_MODEL` overrides `model`
   pub fn load() -> Result<Self> {
      let config_path = if let Ok(custom_path) = std::env::var("GIT_SCRIBE_CONFIG") {
         PathBuf::from(custom_path)
      } else {
         Self::default_config_path().unwrap_or_default()
      };

      let mut config = if config_path.is_file() {
         Self::from_file(&config_path)?
      } else {
         Self::default()
      };

      Self::apply_env_overrides(&mut config);
      Ok(config)
   }

   /// Load config from specific file
   pub fn from_file(path: &Path) -> Result<Self> {
      let contents = std::fs::read_to_string(path)
         .map_err(|e| ScribeError::Config(format!("Failed to read {}: {e}", path.display())))?;
      let mut config: Self = toml::from_str(&contents)
         .map_err(|e| ScribeError::Config(format!("Failed to parse {}: {e}", path.display())))?;

      Self::apply_env_overrides(&mut config);
      Ok(config)
   }

   fn apply_env_overrides(config: &mut Self) {
      if let Ok(api_url) = std::env::var("GIT_SCRIBE_API_URL") {
         config.api_base_url = api_url;
      }

      if let Some(api_key) = std::env::var("GIT_SCRIBE_API_KEY")
         .or_else(|_| std::env::var("GEMINI_API_KEY"))
         .ok()
         .filter(|key| !key.trim().is_empty())
      {
         config.api_key = Some(api_key);
      }

      if let Ok(model) = std::env::var("GIT_SCRIBE_MODEL") {
         config.model = model;
      }
   }

   /// API key, if one is configured and non-blank
   pub fn credential(&self) -> Option<&str> {
      self
         .api_key
         .as_deref()
         .map(str::trim)
         .filter(|key| !key.is_empty())
   }

   /// Get default config path (platform-safe)
   pub fn default_config_path() -> Result<PathBuf> {
      home_dir()
         .map(|home| home.join(".config/git-scribe/config.toml"))
         .ok_or_else(|| {
            ScribeError::Config("No home directory found (tried HOME and USERPROFILE)".to_string())
         })
   }
}
