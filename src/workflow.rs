//! End-to-end commit workflow: acquire the diff, generate a message, commit,
//! and push.

use tracing::{debug, info};

use crate::{
   api::{CommitMessageGenerator, CompletionBackend},
   config::ScribeConfig,
   diff::{self, AcquireOptions},
   error::{Result, ScribeError},
   git::VersionControl,
   interact::{Action, Interaction},
   prompt::{self, GenerationRequest, Style},
   style::{self, Step},
};

#[derive(Debug, Clone, Default)]
pub struct WorkflowOptions {
   /// Stage, commit and push without asking
   pub auto:         bool,
   /// Stage the whole tree before reading the diff
   pub force_stage:  bool,
   pub style:        Style,
   pub user_context: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
   NothingToCommit,
   UserAborted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOutcome {
   Skipped,
   Pushed,
   /// First push lacked a tracking branch; retried with `-u`
   PushedWithUpstream,
   UpstreamDeclined,
   /// Push failed; the commit stays in place
   Failed(String),
}

impl PushOutcome {
   pub const fn is_pushed(&self) -> bool {
      matches!(self, Self::Pushed | Self::PushedWithUpstream)
   }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowOutcome {
   Aborted(AbortReason),
   Committed {
      push:       PushOutcome,
      commit_url: Option<String>,
   },
}

/// Runs one commit cycle against the given collaborators
pub struct WorkflowDriver<'a, B: CompletionBackend> {
   config:      &'a ScribeConfig,
   vcs:         &'a dyn VersionControl,
   generator:   &'a CommitMessageGenerator<B>,
   interaction: &'a dyn Interaction,
}

impl<'a, B: CompletionBackend> WorkflowDriver<'a, B> {
   pub const fn new(
      config: &'a ScribeConfig,
      vcs: &'a dyn VersionControl,
      generator: &'a CommitMessageGenerator<B>,
      interaction: &'a dyn Interaction,
   ) -> Self {
      Self { config, vcs, generator, interaction }
   }

   pub fn run(&self, options: &WorkflowOptions) -> Result<WorkflowOutcome> {
      if !self.vcs.is_repository() {
         return Err(ScribeError::NotARepository);
      }

      let acquire_options = AcquireOptions {
         force_stage:      options.force_stage || options.auto,
         interactive:      !options.auto,
         max_diff_size:    self.config.max_diff_size,
         filter_extension: self.config.filter_extension.clone(),
      };
      let outcome =
         diff::acquire(self.vcs, self.interaction, &acquire_options, &options.user_context)?;
      let Some((bundle, context)) = outcome.into_parts() else {
         style::warn("Nothing to commit. Aborting.");
         return Ok(WorkflowOutcome::Aborted(AbortReason::NothingToCommit));
      };

      let project_context = prompt::load_project_context(
         self.vcs.repo_root().as_deref(),
         &self.config.project_context_file,
      );
      debug!(
         diff_bytes = bundle.size_bytes(),
         filter = bundle.source_filter(),
         has_project_context = !project_context.is_empty(),
         "assembling prompt"
      );

      let request = GenerationRequest {
         diff_text: bundle.into_text(),
         user_context: context,
         project_context,
         style: options.style,
      };
      let assembled = prompt::assemble(&request);
      prompt::persist_last_prompt(&self.config.last_prompt_path, &assembled);

      let message = style::with_spinner_result(
         &format!("Generating commit message with {}...", self.generator.model()),
         || self.generator.generate(&assembled),
      )?;

      println!(
         "{}",
         style::boxed_message(
            &format!("Generated ({})", options.style),
            message.as_str(),
            style::term_width()
         )
      );

      match self.interaction.choose_action(message.as_str())? {
         Action::Abort => {
            style::print_info("Aborted by user.");
            return Ok(WorkflowOutcome::Aborted(AbortReason::UserAborted));
         },
         Action::Edit => self.vcs.commit(message.as_str(), true)?,
         Action::Commit => self.vcs.commit(message.as_str(), false)?,
      }
      style::step_status("Committed.", Step::Done);

      let push = self.push()?;
      let commit_url = if push.is_pushed() {
         self.vcs.commit_url(&self.config.remote)
      } else {
         None
      };
      if let Some(url) = &commit_url {
         style::print_commit_link(url);
      }

      info!(?push, "workflow finished");
      Ok(WorkflowOutcome::Committed { push, commit_url })
   }

   fn push(&self) -> Result<PushOutcome> {
      if !self.interaction.confirm_push()? {
         return Ok(PushOutcome::Skipped);
      }

      let remote = self.config.remote.as_str();
      style::step_status(&format!("Pushing to {remote}..."), Step::Wait);

      match self.vcs.push(remote, None) {
         Ok(_) => {
            style::step_status("Pushed.", Step::Done);
            Ok(PushOutcome::Pushed)
         },
         Err(ScribeError::NoUpstream { branch }) => {
            style::warn(&format!("Branch '{branch}' has no upstream branch."));
            if !self.interaction.confirm_create_upstream(remote, &branch)? {
               return Ok(PushOutcome::UpstreamDeclined);
            }
            match self.vcs.push(remote, Some(&branch)) {
               Ok(_) => {
                  style::step_status(&format!("Pushed and tracking {remote}/{branch}."), Step::Done);
                  Ok(PushOutcome::PushedWithUpstream)
               },
               Err(e) => Ok(push_failed(e)),
            }
         },
         Err(e) => Ok(push_failed(e)),
      }
   }
}

fn push_failed(err: ScribeError) -> PushOutcome {
   let reason = match err {
      ScribeError::VcsCommand { stderr } => stderr,
      other => other.to_string(),
   };
   style::warn(&format!("Push failed: {reason}"));
   PushOutcome::Failed(reason)
}
