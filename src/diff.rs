//! Staged diff acquisition: staging heuristics and the size policy that
//! decides how much of the change set reaches the model.

use tracing::{debug, info};

use crate::{
   error::Result,
   git::VersionControl,
   interact::Interaction,
   style::{self, Step},
};

/// Note appended to the user context when the diff is dropped for size
pub const SIZE_OMISSION_NOTE: &str = "\n(Full diff ignored due to size)";

/// Diff text handed to the prompt assembler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffBundle {
   raw_text:      String,
   size_bytes:    usize,
   source_filter: Option<String>,
}

impl DiffBundle {
   pub fn new(raw_text: String, source_filter: Option<String>) -> Self {
      let size_bytes = raw_text.len();
      Self { raw_text, size_bytes, source_filter }
   }

   pub fn empty() -> Self {
      Self::new(String::new(), None)
   }

   pub fn text(&self) -> &str {
      &self.raw_text
   }

   pub const fn size_bytes(&self) -> usize {
      self.size_bytes
   }

   /// Extension the diff was restricted to, if the size policy filtered it
   pub fn source_filter(&self) -> Option<&str> {
      self.source_filter.as_deref()
   }

   pub const fn is_empty(&self) -> bool {
      self.size_bytes == 0
   }

   pub fn into_text(self) -> String {
      self.raw_text
   }
}

#[derive(Debug, Clone)]
pub struct AcquireOptions {
   /// Stage the whole tree before reading the diff
   pub force_stage:      bool,
   /// Whether the operator can be asked questions
   pub interactive:      bool,
   /// Byte ceiling; larger diffs are filtered, then dropped
   pub max_diff_size:    usize,
   /// Extension kept when the diff exceeds the ceiling
   pub filter_extension: String,
}

/// Terminal state of an acquisition cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquisitionOutcome {
   /// A diff (full or filtered) within the ceiling; context unchanged
   UsableDiff { bundle: DiffBundle, context: String },
   /// The diff was too large to send; context carries the omission note
   EmptyWithManualSummary { context: String },
   /// Nothing staged and nothing (accepted) to stage
   Abort,
}

/// Read the staged diff, staging first or on request, then apply the size
/// policy.
pub fn acquire(
   vcs: &dyn VersionControl,
   interaction: &dyn Interaction,
   options: &AcquireOptions,
   user_context: &str,
) -> Result<AcquisitionOutcome> {
   if options.force_stage {
      style::step_status("Staging all files...", Step::Wait);
      vcs.stage_all()?;
   }

   let mut diff = vcs.staged_diff(None, None)?;

   if !diff.is_empty()
      && options.interactive
      && vcs.has_unstaged_changes()
      && interaction.confirm_fold_unstaged()?
   {
      vcs.stage_all()?;
      diff = vcs.staged_diff(None, None)?;
   }

   if diff.is_empty() {
      style::step_status("No staged changes found.", Step::Wait);
      if !options.interactive || !vcs.has_unstaged_changes() {
         info!("nothing staged and nothing to stage");
         return Ok(AcquisitionOutcome::Abort);
      }
      if !interaction.confirm_stage_all()? {
         return Ok(AcquisitionOutcome::Abort);
      }
      vcs.stage_all()?;
      diff = vcs.staged_diff(None, None)?;
      if diff.is_empty() {
         return Ok(AcquisitionOutcome::Abort);
      }
   }

   apply_size_policy(vcs, DiffBundle::new(diff, None), options, user_context)
}

/// Keep diffs within the ceiling; otherwise try the priority extension, and
/// drop the diff (annotating the context) when that does not fit either.
pub fn apply_size_policy(
   vcs: &dyn VersionControl,
   bundle: DiffBundle,
   options: &AcquireOptions,
   user_context: &str,
) -> Result<AcquisitionOutcome> {
   if bundle.size_bytes() <= options.max_diff_size {
      return Ok(AcquisitionOutcome::UsableDiff { bundle, context: user_context.to_string() });
   }

   style::warn(&format!(
      "Diff is large ({:.1}KB). Using filter {}...",
      bundle.size_bytes() as f64 / 1024.0,
      options.filter_extension
   ));

   let only = [options.filter_extension.clone()];
   let filtered = DiffBundle::new(
      vcs.staged_diff(None, Some(only.as_slice()))?,
      Some(options.filter_extension.clone()),
   );
   debug!(
      full = bundle.size_bytes(),
      filtered = filtered.size_bytes(),
      filter = %options.filter_extension,
      "applied size filter"
   );

   if filtered.is_empty() || filtered.size_bytes() > options.max_diff_size {
      style::warn("Filtered diff unusable; sending context only.");
      return Ok(AcquisitionOutcome::EmptyWithManualSummary {
         context: format!("{user_context}{SIZE_OMISSION_NOTE}"),
      });
   }

   Ok(AcquisitionOutcome::UsableDiff { bundle: filtered, context: user_context.to_string() })
}

impl AcquisitionOutcome {
   /// Diff and context to assemble a prompt from; `None` for [`Self::Abort`]
   pub fn into_parts(self) -> Option<(DiffBundle, String)> {
      match self {
         Self::UsableDiff { bundle, context } => Some((bundle, context)),
         Self::EmptyWithManualSummary { context } => Some((DiffBundle::empty(), context)),
         Self::Abort => None,
      }
   }
}
