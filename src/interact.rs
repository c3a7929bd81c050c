//! Operator decisions that steer the workflow.
//!
//! The workflow only sees the answers; whether they came from a terminal
//! prompt, auto mode, or a test script is up to the [`Interaction`]
//! implementation.

use dialoguer::{Confirm, Select, theme::ColorfulTheme};

use crate::error::Result;

/// What to do with a generated message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
   Commit,
   Edit,
   Abort,
}

impl Action {
   pub const ALL: [Self; 3] = [Self::Commit, Self::Edit, Self::Abort];

   pub const fn as_str(self) -> &'static str {
      match self {
         Self::Commit => "commit",
         Self::Edit => "edit",
         Self::Abort => "abort",
      }
   }
}

pub trait Interaction {
   /// Staged changes exist alongside unstaged ones; stage everything?
   fn confirm_fold_unstaged(&self) -> Result<bool>;

   /// Nothing is staged; stage all files?
   fn confirm_stage_all(&self) -> Result<bool>;

   fn choose_action(&self, message: &str) -> Result<Action>;

   fn confirm_push(&self) -> Result<bool>;

   /// Push failed for lack of a tracking branch; create `remote/branch`?
   fn confirm_create_upstream(&self, remote: &str, branch: &str) -> Result<bool>;
}

/// Terminal prompts via `dialoguer`
#[derive(Default)]
pub struct TerminalPrompter {
   theme: ColorfulTheme,
}

impl TerminalPrompter {
   pub fn new() -> Self {
      Self::default()
   }

   fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
      Ok(Confirm::with_theme(&self.theme)
         .with_prompt(prompt)
         .default(default)
         .interact()?)
   }
}

impl Interaction for TerminalPrompter {
   fn confirm_fold_unstaged(&self) -> Result<bool> {
      self.confirm("Unstaged changes detected. Stage them too (git add .)?", false)
   }

   fn confirm_stage_all(&self) -> Result<bool> {
      self.confirm("Stage all files (git add .)?", true)
   }

   fn choose_action(&self, _message: &str) -> Result<Action> {
      let labels: Vec<&str> = Action::ALL.iter().map(|a| a.as_str()).collect();
      let idx = Select::with_theme(&self.theme)
         .with_prompt("Action")
         .items(&labels)
         .default(0)
         .interact()?;
      Ok(Action::ALL.get(idx).copied().unwrap_or(Action::Abort))
   }

   fn confirm_push(&self) -> Result<bool> {
      self.confirm("Push changes?", true)
   }

   fn confirm_create_upstream(&self, remote: &str, branch: &str) -> Result<bool> {
      self.confirm(&format!("Create upstream '{remote}/{branch}'?"), true)
   }
}

/// Auto mode: commit, push and create upstreams without asking
#[derive(Debug, Default, Clone, Copy)]
pub struct AutoPilot;

impl Interaction for AutoPilot {
   fn confirm_fold_unstaged(&self) -> Result<bool> {
      Ok(true)
   }

   fn confirm_stage_all(&self) -> Result<bool> {
      Ok(true)
   }

   fn choose_action(&self, _message: &str) -> Result<Action> {
      Ok(Action::Commit)
   }

   fn confirm_push(&self) -> Result<bool> {
      Ok(true)
   }

   fn confirm_create_upstream(&self, _remote: &str, _branch: &str) -> Result<bool> {
      Ok(true)
   }
}
