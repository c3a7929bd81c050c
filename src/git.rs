use std::{
   path::{Path, PathBuf},
   process::{Command, Output, Stdio},
};

use tracing::debug;

use crate::error::{Result, ScribeError};

/// Operations the commit workflow needs from version control.
///
/// Implemented by [`Git`] for real repositories; tests substitute scripted
/// fakes.
pub trait VersionControl {
   /// Whether the working directory is inside a work tree. Never fails.
   fn is_repository(&self) -> bool;

   /// Stage the entire working tree (`git add .`).
   fn stage_all(&self) -> Result<()>;

   /// Literal diff of staged content, optionally filtered by extension.
   /// A failing diff yields whatever was printed (usually nothing).
   fn staged_diff(
      &self,
      exclude_extensions: Option<&[String]>,
      only_extensions: Option<&[String]>,
   ) -> Result<String>;

   /// True if tracked files are modified or untracked files exist. Failures
   /// read as a clean tree.
   fn has_unstaged_changes(&self) -> bool;

   /// Commit with `message`; with `edit`, open the operator's editor on it.
   fn commit(&self, message: &str, edit: bool) -> Result<()>;

   /// Push the current branch. With `branch`, also set the upstream to
   /// `remote/branch`. Fails with [`ScribeError::NoUpstream`] when the
   /// branch has no tracking branch.
   fn push(&self, remote: &str, branch: Option<&str>) -> Result<String>;

   fn current_branch(&self) -> Result<String>;

   fn repo_root(&self) -> Option<PathBuf>;

   /// Web URL of HEAD on `remote`, if both can be resolved.
   fn commit_url(&self, remote: &str) -> Option<String>;
}

/// `git` subprocess adapter rooted at a working directory
#[derive(Debug, Clone)]
pub struct Git {
   dir: PathBuf,
}

impl Git {
   pub fn new(dir: impl Into<PathBuf>) -> Self {
      Self { dir: dir.into() }
   }

   fn output(&self, args: &[&str]) -> Result<Output> {
      debug!(?args, dir = %self.dir.display(), "running git");
      Command::new("git")
         .args(args)
         .current_dir(&self.dir)
         .output()
         .map_err(|e| ScribeError::vcs(format!("Failed to run git {}: {e}", args.join(" "))))
   }

   /// Run git and return trimmed stdout, failing on non-zero exit
   fn run(&self, args: &[&str]) -> Result<String> {
      let output = self.output(args)?;
      if !output.status.success() {
         return Err(ScribeError::vcs(String::from_utf8_lossy(&output.stderr)));
      }
      Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
   }

   fn remote_url(&self, remote: &str) -> Option<String> {
      self
         .run(&["config", "--get", &format!("remote.{remote}.url")])
         .ok()
         .filter(|url| !url.is_empty())
   }

   fn head_hash(&self) -> Option<String> {
      self
         .run(&["rev-parse", "HEAD"])
         .ok()
         .filter(|hash| !hash.is_empty())
   }

   /// Whether the current branch resolves an `@{u}` tracking branch
   fn has_upstream(&self) -> bool {
      self
         .output(&["rev-parse", "--abbrev-ref", "--symbolic-full-name", "@{u}"])
         .is_ok_and(|output| output.status.success())
   }
}

impl VersionControl for Git {
   fn is_repository(&self) -> bool {
      self
         .run(&["rev-parse", "--is-inside-work-tree"])
         .is_ok_and(|out| out == "true")
   }

   fn stage_all(&self) -> Result<()> {
      self.run(&["add", "."]).map(|_| ())
   }

   fn staged_diff(
      &self,
      exclude_extensions: Option<&[String]>,
      only_extensions: Option<&[String]>,
   ) -> Result<String> {
      let args = staged_diff_args(exclude_extensions, only_extensions);
      let args: Vec<&str> = args.iter().map(String::as_str).collect();
      let output = self.output(&args)?;
      if !output.status.success() {
         debug!(
            stderr = %String::from_utf8_lossy(&output.stderr).trim(),
            "git diff --cached exited non-zero"
         );
      }
      Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
   }

   fn has_unstaged_changes(&self) -> bool {
      let modified = self.run(&["diff", "--name-only"]).unwrap_or_default();
      if !modified.is_empty() {
         return true;
      }
      let untracked = self
         .run(&["ls-files", "--others", "--exclude-standard"])
         .unwrap_or_default();
      !untracked.is_empty()
   }

   fn commit(&self, message: &str, edit: bool) -> Result<()> {
      if !edit {
         return self.run(&["commit", "-m", message]).map(|_| ());
      }

      // The editor needs the terminal, so only stderr is captured
      debug!(dir = %self.dir.display(), "running git commit --edit");
      let output = Command::new("git")
         .args(["commit", "-m", message, "--edit"])
         .current_dir(&self.dir)
         .stdin(Stdio::inherit())
         .stdout(Stdio::inherit())
         .stderr(Stdio::piped())
         .output()
         .map_err(|e| ScribeError::vcs(format!("Failed to run git commit: {e}")))?;

      if !output.status.success() {
         return Err(ScribeError::vcs(String::from_utf8_lossy(&output.stderr)));
      }
      Ok(())
   }

   fn push(&self, remote: &str, branch: Option<&str>) -> Result<String> {
      let output = if let Some(branch) = branch {
         self.output(&["push", "-u", remote, branch])?
      } else {
         if !self.has_upstream() {
            return Err(ScribeError::NoUpstream { branch: self.current_branch()? });
         }
         self.output(&["push"])?
      };

      let stderr = String::from_utf8_lossy(&output.stderr);
      if !output.status.success() {
         if is_no_upstream_message(&stderr) {
            return Err(ScribeError::NoUpstream {
               branch: branch.map_or_else(|| self.current_branch(), |b| Ok(b.to_string()))?,
            });
         }
         return Err(ScribeError::vcs(stderr));
      }

      // git reports push progress on stderr
      let stdout = String::from_utf8_lossy(&output.stdout);
      Ok(format!("{}{}", stdout.trim(), stderr.trim()))
   }

   fn current_branch(&self) -> Result<String> {
      self.run(&["rev-parse", "--abbrev-ref", "HEAD"])
   }

   fn repo_root(&self) -> Option<PathBuf> {
      self
         .run(&["rev-parse", "--show-toplevel"])
         .ok()
         .filter(|root| !root.is_empty())
         .map(PathBuf::from)
   }

   fn commit_url(&self, remote: &str) -> Option<String> {
      let remote = self.remote_url(remote)?;
      let hash = self.head_hash()?;
      web_commit_url(&remote, &hash)
   }
}

/// Build `git diff --cached` arguments with extension pathspecs
fn staged_diff_args(
   exclude_extensions: Option<&[String]>,
   only_extensions: Option<&[String]>,
) -> Vec<String> {
   let mut args = vec!["diff".to_string(), "--cached".to_string()];
   let only = only_extensions.unwrap_or_default();
   let excluded = exclude_extensions.unwrap_or_default();
   if only.is_empty() && excluded.is_empty() {
      return args;
   }

   // Everything after `--` is a pathspec; excludes narrow the includes
   args.push("--".to_string());
   args.extend(only.iter().map(|ext| format!("*{ext}")));
   args.extend(excluded.iter().map(|ext| format!(":(exclude)*{ext}")));
   args
}

fn is_no_upstream_message(stderr: &str) -> bool {
   stderr.contains("no upstream branch")
}

/// Convert a remote address and commit hash into a browsable commit URL.
///
/// SSH (`git@host:owner/repo.git`, `ssh://git@host/owner/repo`) and HTTPS
/// remotes normalize to `https://host/owner/repo`. Bitbucket uses a
/// `/commits/` path; every other host gets `/commit/`.
pub fn web_commit_url(remote: &str, hash: &str) -> Option<String> {
   let remote = remote.trim();
   let hash = hash.trim();
   if remote.is_empty() || hash.is_empty() {
      return None;
   }

   let (host, path) = if let Some(rest) = remote
      .strip_prefix("https://")
      .or_else(|| remote.strip_prefix("http://"))
      .or_else(|| remote.strip_prefix("ssh://"))
   {
      rest.split_once('/')?
   } else if remote.contains("://") {
      // file://, git:// and other transports have no web view
      return None;
   } else if let Some((user_host, path)) = remote.split_once(':') {
      (user_host, path)
   } else {
      return None;
   };

   // Drop credentials (git@, user:token@) and ports
   let host = host.rsplit('@').next().unwrap_or(host);
   let host = host.split(':').next().unwrap_or(host);
   let path = path.trim_matches('/');
   let path = path.strip_suffix(".git").unwrap_or(path);

   if host.is_empty() || path.is_empty() {
      return None;
   }

   let segment = if host.contains("bitbucket") {
      "commits"
   } else {
      "commit"
   };
   Some(format!("https://{host}/{path}/{segment}/{hash}"))
}
