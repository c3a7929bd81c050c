//! Prompt assembly for commit message generation.
//!
//! The assembled prompt is a pure function of [`GenerationRequest`]; the only
//! side effect here is the best-effort "last prompt" log.

use std::{
   fmt,
   path::{Path, PathBuf},
};

use clap::ValueEnum;
use tracing::{debug, warn};

pub const DIFF_BEGIN: &str = "--- BEGIN GIT DIFF ---";
pub const DIFF_END: &str = "--- END GIT DIFF ---";

const BASE_INSTRUCTION: &str = "You are an expert programmer writing a commit message following \
                                the Conventional Commits specification.\nFormat: \
                                <type>(<scope>): <subject>\nUse types: feat, fix, chore, docs, \
                                style, refactor, perf, test.";

const CONCISE_DIRECTIVE: &str = "STRICT CONSTRAINT: Output ONLY the subject line (first line). Do \
                                 NOT write a body or description. Max 72 chars.";

const DETAILED_DIRECTIVE: &str = "INSTRUCTION: Provide a standard subject line, followed by a \
                                  blank line, and then a detailed bulleted list (-) explaining \
                                  the changes logic.";

const DEFAULT_DIRECTIVE: &str =
   "Keep the subject short. If necessary to explain 'why', add a brief body.";

const TRAILING_DIRECTIVE: &str = "Generate the commit message:";

/// Output shape requested from the model
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, ValueEnum)]
pub enum Style {
   /// Standard subject, brief body only when needed
   #[default]
   Default,
   /// Subject line only
   Concise,
   /// Subject plus bullet points
   Detailed,
}

impl Style {
   pub const ALL: [Self; 3] = [Self::Default, Self::Concise, Self::Detailed];

   pub const fn as_str(self) -> &'static str {
      match self {
         Self::Default => "default",
         Self::Concise => "concise",
         Self::Detailed => "detailed",
      }
   }

   pub const fn directive(self) -> &'static str {
      match self {
         Self::Default => DEFAULT_DIRECTIVE,
         Self::Concise => CONCISE_DIRECTIVE,
         Self::Detailed => DETAILED_DIRECTIVE,
      }
   }
}

impl fmt::Display for Style {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      f.write_str(self.as_str())
   }
}

/// Everything that determines the prompt text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationRequest {
   pub diff_text:       String,
   pub user_context:    String,
   pub project_context: String,
   pub style:           Style,
}

/// Ordered prompt segments, in the order they are sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledPrompt {
   segments: Vec<String>,
}

impl AssembledPrompt {
   pub fn segments(&self) -> &[String] {
      &self.segments
   }

   /// Full prompt text (segments joined by newlines)
   pub fn text(&self) -> String {
      self.segments.join("\n")
   }
}

impl fmt::Display for AssembledPrompt {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      f.write_str(&self.text())
   }
}

/// Build the prompt for `request`.
pub fn assemble(request: &GenerationRequest) -> AssembledPrompt {
   let mut segments = vec![BASE_INSTRUCTION.to_string(), request.style.directive().to_string()];

   let project_context = request.project_context.trim();
   if !project_context.is_empty() {
      segments.push(format!("Project Context: {project_context}"));
   }

   let user_context = request.user_context.trim();
   if !user_context.is_empty() {
      segments.push(format!("User Context: {user_context}"));
   }

   segments.push(DIFF_BEGIN.to_string());
   segments.push(request.diff_text.clone());
   segments.push(DIFF_END.to_string());
   segments.push(TRAILING_DIRECTIVE.to_string());

   AssembledPrompt { segments }
}

/// Overwrite the last-prompt log with `prompt`. Never fails: write errors are
/// logged and dropped.
pub fn persist_last_prompt(path: &Path, prompt: &AssembledPrompt) {
   let write = || -> std::io::Result<()> {
      if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
         std::fs::create_dir_all(parent)?;
      }
      std::fs::write(path, prompt.text())
   };

   match write() {
      Ok(()) => debug!(path = %path.display(), "saved last prompt"),
      Err(e) => warn!(path = %path.display(), error = %e, "failed to save last prompt"),
   }
}

/// Contents of the last-prompt log, if one was written
pub fn read_last_prompt(path: &Path) -> Option<String> {
   std::fs::read_to_string(path).ok()
}

/// Trimmed project context from `root/file`; empty when absent or unreadable
pub fn load_project_context(root: Option<&Path>, file: &Path) -> String {
   let path: PathBuf = root.map_or_else(|| file.to_path_buf(), |root| root.join(file));
   match std::fs::read_to_string(&path) {
      Ok(content) => content.trim().to_string(),
      Err(e) => {
         debug!(path = %path.display(), error = %e, "no project context");
         String::new()
      },
   }
}
