//! In-memory collaborators for exercising the workflow without git, a
//! terminal, or the network.

use std::{
   cell::{Cell, RefCell},
   collections::HashMap,
   path::PathBuf,
};

use crate::{
   api::CompletionBackend,
   error::{Result, ScribeError},
   git::{VersionControl, web_commit_url},
   interact::{Action, Interaction},
   prompt::AssembledPrompt,
};

#[derive(Debug, Default)]
struct RepoState {
   staged:        String,
   unstaged:      String,
   filtered:      HashMap<String, String>,
   upstream:      bool,
   push_error:    Option<String>,
   commit_error:  Option<String>,
   remote_url:    Option<(String, String)>,
   root:          Option<PathBuf>,
   stage_calls:   usize,
   commits:       Vec<(String, bool)>,
   pushes:        Vec<(String, Option<String>)>,
}

/// Scripted repository: a staged diff, unstaged changes, per-extension
/// filtered diffs, and recorded mutations.
#[derive(Debug, Default)]
pub struct FakeRepo {
   not_a_repo: bool,
   state:      RefCell<RepoState>,
}

impl FakeRepo {
   pub fn with_staged(diff: &str) -> Self {
      let repo = Self::default();
      repo.state.borrow_mut().staged = diff.to_string();
      repo
   }

   pub fn with_unstaged(diff: &str) -> Self {
      let repo = Self::default();
      repo.set_unstaged(diff);
      repo
   }

   pub fn not_a_repo() -> Self {
      Self { not_a_repo: true, ..Self::default() }
   }

   pub fn set_unstaged(&self, diff: &str) {
      self.state.borrow_mut().unstaged = diff.to_string();
   }

   pub fn set_filtered(&self, ext: &str, diff: &str) {
      self
         .state
         .borrow_mut()
         .filtered
         .insert(ext.to_string(), diff.to_string());
   }

   pub fn set_upstream(&self, upstream: bool) {
      self.state.borrow_mut().upstream = upstream;
   }

   pub fn set_push_error(&self, stderr: &str) {
      self.state.borrow_mut().push_error = Some(stderr.to_string());
   }

   pub fn set_commit_error(&self, stderr: &str) {
      self.state.borrow_mut().commit_error = Some(stderr.to_string());
   }

   /// Register `url` for the remote named `name`
   pub fn set_remote_url(&self, name: &str, url: &str) {
      self.state.borrow_mut().remote_url = Some((name.to_string(), url.to_string()));
   }

   pub fn set_root(&self, root: PathBuf) {
      self.state.borrow_mut().root = Some(root);
   }

   pub fn stage_calls(&self) -> usize {
      self.state.borrow().stage_calls
   }

   pub fn commits(&self) -> Vec<(String, bool)> {
      self.state.borrow().commits.clone()
   }

   pub fn pushes(&self) -> Vec<(String, Option<String>)> {
      self.state.borrow().pushes.clone()
   }
}

impl VersionControl for FakeRepo {
   fn is_repository(&self) -> bool {
      !self.not_a_repo
   }

   fn stage_all(&self) -> Result<()> {
      let mut state = self.state.borrow_mut();
      state.stage_calls += 1;
      let unstaged = std::mem::take(&mut state.unstaged);
      if !unstaged.is_empty() {
         if state.staged.is_empty() {
            state.staged = unstaged;
         } else {
            let combined = format!("{}\n{unstaged}", state.staged);
            state.staged = combined;
         }
      }
      Ok(())
   }

   fn staged_diff(
      &self,
      _exclude_extensions: Option<&[String]>,
      only_extensions: Option<&[String]>,
   ) -> Result<String> {
      let state = self.state.borrow();
      Ok(match only_extensions.and_then(|only| only.first()) {
         Some(ext) => state.filtered.get(ext).cloned().unwrap_or_default(),
         None => state.staged.clone(),
      })
   }

   fn has_unstaged_changes(&self) -> bool {
      !self.state.borrow().unstaged.is_empty()
   }

   fn commit(&self, message: &str, edit: bool) -> Result<()> {
      let mut state = self.state.borrow_mut();
      if let Some(stderr) = &state.commit_error {
         return Err(ScribeError::vcs(stderr));
      }
      state.commits.push((message.to_string(), edit));
      state.staged.clear();
      Ok(())
   }

   fn push(&self, remote: &str, branch: Option<&str>) -> Result<String> {
      let mut state = self.state.borrow_mut();
      state
         .pushes
         .push((remote.to_string(), branch.map(str::to_string)));
      if let Some(stderr) = &state.push_error {
         return Err(ScribeError::vcs(stderr));
      }
      match branch {
         Some(_) => state.upstream = true,
         None if !state.upstream => {
            return Err(ScribeError::NoUpstream { branch: "main".to_string() });
         },
         None => {},
      }
      Ok("pushed".to_string())
   }

   fn current_branch(&self) -> Result<String> {
      Ok("main".to_string())
   }

   fn repo_root(&self) -> Option<PathBuf> {
      self.state.borrow().root.clone()
   }

   fn commit_url(&self, remote: &str) -> Option<String> {
      let state = self.state.borrow();
      if state.commits.is_empty() {
         return None;
      }
      let (name, url) = state.remote_url.as_ref()?;
      if name != remote {
         return None;
      }
      web_commit_url(url, "abc123")
   }
}

/// Fixed answers to every operator question, recording what was asked
#[derive(Debug)]
pub struct ScriptedInteraction {
   pub fold_unstaged:   bool,
   pub stage_all:       bool,
   pub action:          Action,
   pub push:            bool,
   pub create_upstream: bool,
   pub asked:           RefCell<Vec<String>>,
}

impl Default for ScriptedInteraction {
   fn default() -> Self {
      Self {
         fold_unstaged:   false,
         stage_all:       false,
         action:          Action::Commit,
         push:            false,
         create_upstream: false,
         asked:           RefCell::new(Vec::new()),
      }
   }
}

impl ScriptedInteraction {
   pub fn questions(&self) -> Vec<String> {
      self.asked.borrow().clone()
   }

   fn ask(&self, question: &str) {
      self.asked.borrow_mut().push(question.to_string());
   }
}

impl Interaction for ScriptedInteraction {
   fn confirm_fold_unstaged(&self) -> Result<bool> {
      self.ask("fold_unstaged");
      Ok(self.fold_unstaged)
   }

   fn confirm_stage_all(&self) -> Result<bool> {
      self.ask("stage_all");
      Ok(self.stage_all)
   }

   fn choose_action(&self, _message: &str) -> Result<Action> {
      self.ask("action");
      Ok(self.action)
   }

   fn confirm_push(&self) -> Result<bool> {
      self.ask("push");
      Ok(self.push)
   }

   fn confirm_create_upstream(&self, _remote: &str, _branch: &str) -> Result<bool> {
      self.ask("create_upstream");
      Ok(self.create_upstream)
   }
}

/// Canned model reply with call accounting
#[derive(Debug)]
pub struct FakeBackend {
   reply:       std::result::Result<String, String>,
   calls:       Cell<usize>,
   last_prompt: RefCell<Option<String>>,
}

impl FakeBackend {
   pub fn replying(text: &str) -> Self {
      Self {
         reply:       Ok(text.to_string()),
         calls:       Cell::new(0),
         last_prompt: RefCell::new(None),
      }
   }

   pub fn failing(reason: &str) -> Self {
      Self { reply: Err(reason.to_string()), ..Self::replying("") }
   }

   pub fn calls(&self) -> usize {
      self.calls.get()
   }

   pub fn last_prompt(&self) -> Option<String> {
      self.last_prompt.borrow().clone()
   }
}

impl CompletionBackend for FakeBackend {
   fn complete(&self, prompt: &AssembledPrompt, _temperature: f32) -> Result<String> {
      self.calls.set(self.calls.get() + 1);
      *self.last_prompt.borrow_mut() = Some(prompt.text());
      self.reply.clone().map_err(ScribeError::Other)
   }

   fn model(&self) -> &str {
      "fake-model"
   }
}
